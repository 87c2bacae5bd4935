use serde::{Deserialize, Serialize};

pub type ItemId = i64;

pub const REWARD_DESCRIPTION: &str = "Reward from story choice";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    /// Absent for entries restored from a save that did not keep ids.
    #[serde(default)]
    pub id: Option<ItemId>,
    pub item_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub used: bool,
}

impl InventoryItem {
    pub fn new(id: ItemId, item_name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            item_name: item_name.into(),
            description: description.into(),
            used: false,
        }
    }

    pub fn is_available(&self) -> bool {
        !self.used
    }
}

/// True if an unused item with this name is held.
pub fn has_unused(inventory: &[InventoryItem], item_name: &str) -> bool {
    inventory
        .iter()
        .any(|item| item.item_name == item_name && item.is_available())
}

pub fn find_by_id(inventory: &[InventoryItem], id: ItemId) -> Option<&InventoryItem> {
    inventory.iter().find(|item| item.id == Some(id))
}

pub fn mark_used(inventory: &mut [InventoryItem], id: ItemId) -> bool {
    match inventory.iter_mut().find(|item| item.id == Some(id)) {
        Some(item) => {
            item.used = true;
            true
        }
        None => false,
    }
}

/// What one operation did to the inventory.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InventoryDelta {
    pub granted: Vec<InventoryItem>,
    pub consumed: Vec<String>,
    pub cleared: bool,
}

impl InventoryDelta {
    pub fn is_empty(&self) -> bool {
        self.granted.is_empty() && self.consumed.is_empty() && !self.cleared
    }
}
