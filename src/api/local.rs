use std::fs;
use std::path::Path;

use anyhow::Context;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::api::session::Session;
use crate::api::{GameBackend, ItemStoryResult};
use crate::error::{ApiError, GameError, Result};
use crate::model::character::{Character, Stats, DEFAULT_FEAR, DEFAULT_SANITY};
use crate::model::game_save::GameSave;
use crate::model::inventory::{self, InventoryItem, ItemId};
use crate::model::story::{StoryBook, StoryNode, START_STAGE};

const LOCAL_TOKEN_PREFIX: &str = "local-";

#[derive(Debug, Clone)]
struct Account {
    username: String,
    email: String,
    password: String,
}

/// Offline backend: the whole game world kept in memory over a [`StoryBook`].
///
/// Answers the same way the REST service does, including its error bodies,
/// so the core cannot tell the two apart.
pub struct LocalBackend {
    book: StoryBook,
    session: Session,
    accounts: Vec<Account>,
    character: Character,
    stage: String,
    inventory: Vec<InventoryItem>,
    next_item_id: ItemId,
    save_slot: Option<GameSave>,
    rng: StdRng,
}

impl LocalBackend {
    pub fn new(book: StoryBook) -> Self {
        Self {
            book,
            session: Session::default(),
            accounts: Vec::new(),
            character: Character::new(1, "Wanderer"),
            stage: START_STAGE.to_string(),
            inventory: Vec::new(),
            next_item_id: 1,
            save_slot: None,
            rng: StdRng::from_entropy(),
        }
    }

    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading story file {}", path.display()))?;
        let book: StoryBook = serde_json::from_str(&text)
            .with_context(|| format!("parsing story file {}", path.display()))?;
        log::info!(
            "loaded {} scenes from {}",
            book.scenes.len(),
            path.display()
        );
        Ok(Self::new(book))
    }

    /// Signed in without an account, for offline play.
    pub fn with_guest(mut self, name: &str) -> Self {
        self.character.name = name.to_string();
        self.session.begin(format!("{LOCAL_TOKEN_PREFIX}guest"));
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn with_character(mut self, character: Character) -> Self {
        self.character = character;
        self
    }

    pub fn with_stage(mut self, stage: &str) -> Self {
        self.stage = stage.to_string();
        self
    }

    /// Puts an item straight into the backend inventory.
    pub fn grant(&mut self, item_name: &str) -> InventoryItem {
        let item = InventoryItem::new(self.next_item_id, item_name, "");
        self.next_item_id += 1;
        self.inventory.push(item.clone());
        item
    }

    pub fn character(&self) -> &Character {
        &self.character
    }

    pub fn inventory(&self) -> &[InventoryItem] {
        &self.inventory
    }

    pub fn stage(&self) -> &str {
        &self.stage
    }

    pub fn saved(&self) -> Option<&GameSave> {
        self.save_slot.as_ref()
    }

    fn authorize(&self) -> Result<()> {
        if self.session.is_authenticated() {
            Ok(())
        } else {
            Err(GameError::Auth)
        }
    }

    fn scene(&self, stage: &str) -> Result<StoryNode> {
        self.book
            .scene(stage)
            .cloned()
            .ok_or_else(|| api_error(404, format!("Scene not found for stage: {stage}")))
    }

    fn missing_items(&self, node: &StoryNode, choice_index: usize) -> Vec<String> {
        node.option(choice_index)
            .map(|option| {
                option
                    .requirements()
                    .filter(|name| !inventory::has_unused(&self.inventory, name))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn api_error(status: u16, message: impl Into<String>) -> GameError {
    GameError::Api(ApiError {
        status,
        message: message.into(),
        missing_items: Vec::new(),
    })
}

impl GameBackend for LocalBackend {
    fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    fn login(&mut self, email: &str, password: &str) -> Result<()> {
        let account = self
            .accounts
            .iter()
            .find(|a| a.email == email && a.password == password)
            .ok_or_else(|| api_error(401, "Invalid credentials"))?;
        self.character.name = account.username.clone();
        self.session
            .begin(format!("{LOCAL_TOKEN_PREFIX}{}", account.username));
        Ok(())
    }

    fn signup(&mut self, username: &str, email: &str, password: &str) -> Result<()> {
        if username.is_empty() || email.is_empty() || password.is_empty() {
            return Err(api_error(400, "Missing required fields"));
        }
        if self
            .accounts
            .iter()
            .any(|a| a.email == email || a.username == username)
        {
            return Err(api_error(409, "User already exists"));
        }
        self.accounts.push(Account {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        });
        Ok(())
    }

    fn logout(&mut self) {
        self.session.end();
    }

    fn fetch_character(&mut self) -> Result<Character> {
        self.authorize()?;
        Ok(self.character.clone())
    }

    fn update_stats(&mut self, stats: Stats) -> Result<Character> {
        self.authorize()?;
        self.character.set_stats(stats);
        Ok(self.character.clone())
    }

    fn reset_character(&mut self) -> Result<()> {
        self.authorize()?;
        self.character.fear = DEFAULT_FEAR;
        self.character.sanity = DEFAULT_SANITY;
        self.character.choice_history.clear();
        self.stage = START_STAGE.to_string();
        Ok(())
    }

    fn fetch_inventory(&mut self) -> Result<Vec<InventoryItem>> {
        self.authorize()?;
        Ok(self.inventory.clone())
    }

    fn add_item(&mut self, item_name: &str, description: &str) -> Result<InventoryItem> {
        self.authorize()?;
        if item_name.is_empty() {
            return Err(api_error(400, "Item name is required"));
        }
        let item = InventoryItem::new(self.next_item_id, item_name, description);
        self.next_item_id += 1;
        self.inventory.push(item.clone());
        Ok(item)
    }

    fn delete_item(&mut self, id: ItemId) -> Result<()> {
        self.authorize()?;
        let before = self.inventory.len();
        self.inventory.retain(|item| item.id != Some(id));
        if self.inventory.len() == before {
            return Err(api_error(404, "Item not found"));
        }
        Ok(())
    }

    fn use_item(&mut self, id: ItemId) -> Result<InventoryItem> {
        self.authorize()?;
        let item = self
            .inventory
            .iter_mut()
            .find(|item| item.id == Some(id))
            .ok_or_else(|| api_error(404, "Item not found"))?;
        if item.used {
            return Err(GameError::ItemAlreadyUsed(id));
        }
        item.used = true;
        Ok(item.clone())
    }

    fn reset_inventory(&mut self) -> Result<()> {
        self.authorize()?;
        self.inventory.clear();
        Ok(())
    }

    fn start_story(&mut self) -> Result<StoryNode> {
        self.authorize()?;
        if self.stage == START_STAGE && self.book.scene(START_STAGE).is_none() {
            let picked = self
                .book
                .start_stages
                .choose(&mut self.rng)
                .cloned()
                .ok_or(GameError::NoStoryNode)?;
            log::debug!("assigned starting stage {}", picked);
            self.stage = picked;
        }
        self.book
            .scene(&self.stage)
            .cloned()
            .ok_or(GameError::NoStoryNode)
    }

    fn fetch_scene(&mut self, stage: &str) -> Result<StoryNode> {
        self.authorize()?;
        self.scene(stage)
    }

    fn submit_choice(&mut self, current: &str, choice_index: usize) -> Result<StoryNode> {
        self.authorize()?;
        let node = self.scene(current)?;
        let option = node.option(choice_index).ok_or_else(|| {
            api_error(
                400,
                format!(
                    "Choice index {} out of range. Available options: {}",
                    choice_index,
                    node.options.len()
                ),
            )
        })?;

        let missing = self.missing_items(&node, choice_index);
        if !missing.is_empty() {
            return Err(GameError::Api(ApiError {
                status: 400,
                message: format!("Missing required items: {}", missing.join(", ")),
                missing_items: missing,
            }));
        }

        let next = option
            .next
            .clone()
            .ok_or_else(|| api_error(400, "Selected option has no next stage"))?;
        let next_node = self.scene(&next)?;
        self.stage = next;
        Ok(next_node)
    }

    fn use_item_in_story(&mut self, current: &str, item_name: &str) -> Result<ItemStoryResult> {
        self.authorize()?;
        let node = self
            .book
            .scene(current)
            .cloned()
            .ok_or_else(|| api_error(400, format!("Invalid current node: {current}")))?;

        let Some(trigger) = node.trigger_for(item_name) else {
            return Ok(ItemStoryResult::Unchanged {
                message: Some(format!(
                    "{item_name} was used but no story progression was triggered"
                )),
            });
        };

        let next_node = self
            .book
            .scene(&trigger.next)
            .cloned()
            .ok_or_else(|| api_error(404, format!("Next node not found: {}", trigger.next)))?;
        self.stage = next_node.stage.clone();

        let message = if trigger.message.is_empty() {
            format!("Using {item_name} triggered story progression!")
        } else {
            trigger.message.clone()
        };
        Ok(ItemStoryResult::Triggered {
            node: next_node,
            message: Some(message),
        })
    }

    fn save_game(&mut self, save: &GameSave) -> Result<()> {
        self.authorize()?;
        self.save_slot = Some(save.clone());
        Ok(())
    }

    fn load_game(&mut self) -> Result<GameSave> {
        self.authorize()?;
        self.save_slot
            .clone()
            .ok_or_else(|| api_error(404, "No saved game found"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::story::{ItemTrigger, StoryOption};

    fn scene(stage: &str, options: Vec<StoryOption>) -> StoryNode {
        StoryNode {
            id: None,
            stage: stage.into(),
            description: format!("{stage} description"),
            options,
            item_triggers: Vec::new(),
            created_at: None,
        }
    }

    fn book() -> StoryBook {
        let mut hall = scene(
            "start_city",
            vec![StoryOption {
                text: "Unlock the door".into(),
                next: Some("vault".into()),
                required_item: Some("key".into()),
                ..StoryOption::default()
            }],
        );
        hall.item_triggers.push(ItemTrigger {
            item: "lamp".into(),
            next: "vault".into(),
            message: String::new(),
        });
        StoryBook {
            start_stages: vec!["start_city".into()],
            scenes: vec![hall, scene("vault", Vec::new())],
        }
    }

    #[test]
    fn protected_routes_need_a_session() {
        let mut backend = LocalBackend::new(book());
        assert!(matches!(backend.fetch_character(), Err(GameError::Auth)));
        backend.signup("ada", "ada@example.com", "pw").unwrap();
        backend.login("ada@example.com", "pw").unwrap();
        assert_eq!(backend.fetch_character().unwrap().name, "ada");
    }

    #[test]
    fn placeholder_stage_gets_a_starting_scene() {
        let mut backend = LocalBackend::new(book()).with_guest("Ada").with_seed(7);
        assert_eq!(backend.start_story().unwrap().stage, "start_city");
        assert_eq!(backend.stage(), "start_city");
    }

    #[test]
    fn gated_choice_reports_missing_items() {
        let mut backend = LocalBackend::new(book()).with_guest("Ada");
        match backend.submit_choice("start_city", 0) {
            Err(GameError::Api(api)) => assert_eq!(api.missing_items, vec!["key".to_string()]),
            other => panic!("unexpected {other:?}"),
        }
        backend.grant("key");
        assert_eq!(backend.submit_choice("start_city", 0).unwrap().stage, "vault");
    }

    #[test]
    fn using_an_item_twice_is_rejected() {
        let mut backend = LocalBackend::new(book()).with_guest("Ada");
        let id = backend.grant("lamp").id.unwrap();
        backend.use_item(id).unwrap();
        assert!(matches!(backend.use_item(id), Err(GameError::ItemAlreadyUsed(i)) if i == id));
    }

    #[test]
    fn item_trigger_moves_the_stage() {
        let mut backend = LocalBackend::new(book()).with_guest("Ada");
        match backend.use_item_in_story("start_city", "lamp").unwrap() {
            ItemStoryResult::Triggered { node, message } => {
                assert_eq!(node.stage, "vault");
                assert_eq!(message.as_deref(), Some("Using lamp triggered story progression!"));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(backend.stage(), "vault");
    }

    #[test]
    fn story_file_loads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("story.json");
        fs::write(&path, serde_json::to_string(&book()).unwrap()).unwrap();

        let mut backend = LocalBackend::from_path(&path).unwrap().with_guest("Ada");
        assert_eq!(backend.fetch_scene("vault").unwrap().stage, "vault");

        fs::write(&path, "{ not json").unwrap();
        assert!(LocalBackend::from_path(&path).is_err());
    }

    #[test]
    fn bundled_story_links_are_all_resolvable() {
        let book: StoryBook =
            serde_json::from_str(include_str!("../../stories/city_of_choices.json")).unwrap();

        for stage in &book.start_stages {
            assert!(book.scene(stage).is_some(), "missing start stage {stage}");
        }
        for node in &book.scenes {
            for option in &node.options {
                let next = option.next.as_deref().unwrap();
                assert!(book.scene(next).is_some(), "{} -> {next}", node.stage);
            }
            for trigger in &node.item_triggers {
                assert!(book.scene(&trigger.next).is_some(), "{} -> {}", node.stage, trigger.next);
            }
            if !node.is_ending() {
                assert!(!node.options.is_empty(), "dead end at {}", node.stage);
            }
        }
        assert!(book.scenes.iter().any(|n| n.stage == "ending_lost_forever"));
    }
}
