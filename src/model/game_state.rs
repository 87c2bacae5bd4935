use serde::{Deserialize, Serialize};

use crate::error::Operation;
use crate::model::character::Character;
use crate::model::inventory::{self, InventoryItem};
use crate::model::story::{StoryNode, START_STAGE};

/// Everything the client knows about the running game.
///
/// Only the engine mutates it; the UI gets clones through [`GameView`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStore {
    pub character: Option<Character>,
    pub inventory: Vec<InventoryItem>,
    pub node: Option<StoryNode>,
    pub current_stage: String,
    pub game_ended: bool,
    pub error: Option<String>,
    pub is_loading: bool,
    pub is_restarting: bool,
}

impl Default for GameStore {
    fn default() -> Self {
        Self {
            character: None,
            inventory: Vec::new(),
            node: None,
            current_stage: START_STAGE.to_string(),
            game_ended: false,
            error: None,
            is_loading: false,
            is_restarting: false,
        }
    }
}

impl GameStore {
    /// Replaces the current node and stage together.
    pub fn set_node(&mut self, node: StoryNode) {
        self.current_stage = node.stage.clone();
        self.node = Some(node);
    }

    pub fn record_stage(&mut self, stage: &str) {
        if let Some(character) = self.character.as_mut() {
            character.choice_history.push(stage.to_string());
        }
    }

    pub fn has_unused(&self, item_name: &str) -> bool {
        inventory::has_unused(&self.inventory, item_name)
    }

    pub fn is_busy(&self, op: Operation) -> bool {
        match op {
            Operation::Story => self.is_loading || self.is_restarting,
            Operation::Restart => self.is_restarting,
        }
    }

    pub fn set_flag(&mut self, op: Operation, value: bool) {
        match op {
            Operation::Story => self.is_loading = value,
            Operation::Restart => self.is_restarting = value,
        }
    }
}

/// Snapshot of the store handed to the front-end after each operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameView {
    pub state: GameStore,
    pub authenticated: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_node_moves_stage_with_node() {
        let mut store = GameStore::default();
        assert_eq!(store.current_stage, "start");
        store.set_node(StoryNode {
            id: Some(3),
            stage: "start_subway".into(),
            description: "The train stops.".into(),
            options: Vec::new(),
            item_triggers: Vec::new(),
            created_at: None,
        });
        assert_eq!(store.current_stage, "start_subway");
        assert_eq!(store.node.as_ref().map(|n| n.stage.as_str()), Some("start_subway"));
    }

    #[test]
    fn restart_blocks_story_operations() {
        let mut store = GameStore::default();
        store.set_flag(Operation::Restart, true);
        assert!(store.is_busy(Operation::Story));
        assert!(store.is_busy(Operation::Restart));
        store.set_flag(Operation::Restart, false);
        store.set_flag(Operation::Story, true);
        assert!(!store.is_busy(Operation::Restart));
    }
}
