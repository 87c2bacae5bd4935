use serde::{Deserialize, Serialize};

use crate::model::character::StatDelta;
use crate::model::inventory::{InventoryDelta, ItemId};

/// Result of a resolved choice.
///
/// `warnings` lists secondary steps that failed; whatever they were meant to
/// change is left as it was, everything applied before them stays applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceOutcome {
    pub next_stage: String,
    pub stat_delta: StatDelta,
    pub inventory_delta: InventoryDelta,
    pub ending_reached: bool,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemUseOutcome {
    pub item_id: ItemId,
    pub inventory_delta: InventoryDelta,
    /// Set when using the item moved the story on.
    pub next_stage: Option<String>,
    pub message: Option<String>,
    pub ending_reached: bool,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestartOutcome {
    pub stage: String,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestoreOutcome {
    pub stage: String,
    /// Restored entries that cannot be used until the inventory is refetched.
    pub items_without_id: usize,
    pub ending_reached: bool,
    pub warnings: Vec<String>,
}
