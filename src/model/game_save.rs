use serde::{Deserialize, Serialize};

use crate::model::character::Stats;
use crate::model::inventory::InventoryItem;

/// The unit of save/load. Field names match the backend's save slot.
///
/// Item ids are carried when known but a loaded save may not have them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSave {
    pub current_stage: String,
    #[serde(default)]
    pub choice_history: Vec<String>,
    #[serde(default)]
    pub current_stats: Stats,
    #[serde(default)]
    pub inventory_snapshot: Vec<InventoryItem>,
}

impl GameSave {
    pub fn items_without_id(&self) -> usize {
        self.inventory_snapshot
            .iter()
            .filter(|item| item.id.is_none())
            .count()
    }
}
