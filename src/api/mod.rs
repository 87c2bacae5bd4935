//! Backend contract consumed by the game core, plus its two adapters.

pub mod http;
pub mod local;
pub mod session;
pub mod wire;

use crate::error::Result;
use crate::model::character::{Character, Stats};
use crate::model::game_save::GameSave;
use crate::model::inventory::{InventoryItem, ItemId};
use crate::model::story::StoryNode;

/// Answer to "does using this item here move the story on".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemStoryResult {
    Triggered {
        node: StoryNode,
        message: Option<String>,
    },
    Unchanged {
        message: Option<String>,
    },
}

/// Everything the core needs from the backend. The backend owns the story
/// graph, accounts and the save slot; responses arrive already normalized.
///
/// Methods take `&mut self` because an adapter may hold the session or, for
/// the offline backend, the whole world.
pub trait GameBackend {
    fn is_authenticated(&self) -> bool;

    fn login(&mut self, email: &str, password: &str) -> Result<()>;
    fn signup(&mut self, username: &str, email: &str, password: &str) -> Result<()>;
    fn logout(&mut self);

    fn fetch_character(&mut self) -> Result<Character>;
    fn update_stats(&mut self, stats: Stats) -> Result<Character>;
    fn reset_character(&mut self) -> Result<()>;

    fn fetch_inventory(&mut self) -> Result<Vec<InventoryItem>>;
    fn add_item(&mut self, item_name: &str, description: &str) -> Result<InventoryItem>;
    fn delete_item(&mut self, id: ItemId) -> Result<()>;
    /// Marks an item used. An already used item is `GameError::ItemAlreadyUsed`.
    fn use_item(&mut self, id: ItemId) -> Result<InventoryItem>;
    fn reset_inventory(&mut self) -> Result<()>;

    fn start_story(&mut self) -> Result<StoryNode>;
    fn fetch_scene(&mut self, stage: &str) -> Result<StoryNode>;
    fn submit_choice(&mut self, current: &str, choice_index: usize) -> Result<StoryNode>;
    fn use_item_in_story(&mut self, current: &str, item_name: &str) -> Result<ItemStoryResult>;

    fn save_game(&mut self, save: &GameSave) -> Result<()>;
    fn load_game(&mut self) -> Result<GameSave>;
}
