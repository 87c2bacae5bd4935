#![allow(dead_code)]

use std::collections::HashSet;

use city_of_choices::api::local::LocalBackend;
use city_of_choices::api::{GameBackend, ItemStoryResult};
use city_of_choices::config::settings::ClientSettings;
use city_of_choices::engine::session::GameSession;
use city_of_choices::error::{GameError, Result};
use city_of_choices::model::character::{Character, Stats};
use city_of_choices::model::game_save::GameSave;
use city_of_choices::model::inventory::{InventoryItem, ItemId};
use city_of_choices::model::story::{
    ItemTrigger, StatChanges, StoryBook, StoryNode, StoryOption,
};

pub const GATE: usize = 0;
pub const RUN: usize = 1;
pub const TAKE_LAMP: usize = 2;
pub const WANDER_OFF: usize = 3;
pub const NEEDS_BOTH: usize = 4;

pub fn scene(stage: &str, options: Vec<StoryOption>) -> StoryNode {
    StoryNode {
        id: None,
        stage: stage.into(),
        description: format!("You are at {stage}."),
        options,
        item_triggers: Vec::new(),
        created_at: None,
    }
}

pub fn choice(text: &str, next: &str) -> StoryOption {
    StoryOption {
        text: text.into(),
        next: Some(next.into()),
        ..StoryOption::default()
    }
}

pub fn trigger(item: &str, next: &str) -> ItemTrigger {
    ItemTrigger {
        item: item.into(),
        next: next.into(),
        message: String::new(),
    }
}

/// A small city: one hub with a gated door, a stat-heavy escape, a reward,
/// a way into an ending and two item triggers.
pub fn city_book() -> StoryBook {
    let mut hub = scene(
        "start_city",
        vec![
            StoryOption {
                required_item: Some("key".into()),
                consume_item: true,
                ..choice("Open the gate", "gate_open")
            },
            StoryOption {
                stat_changes: Some(StatChanges {
                    fear: 20,
                    sanity: -5,
                }),
                ..choice("Run", "alley")
            },
            StoryOption {
                reward: Some("lamp".into()),
                ..choice("Take the lamp", "alley")
            },
            choice("Wander off", "ending_lost_forever"),
            StoryOption {
                required_items: vec!["key".into(), "rope".into()],
                ..choice("Climb the wall", "gate_open")
            },
        ],
    );
    hub.item_triggers = vec![trigger("lamp", "cellar"), trigger("map", "ending_lost_forever")];

    StoryBook {
        start_stages: vec!["start_city".into()],
        scenes: vec![
            hub,
            scene("gate_open", vec![choice("Go back", "start_city")]),
            scene("alley", vec![choice("Go back", "start_city"), choice("Run", "alley")]),
            scene("cellar", vec![choice("Climb out", "start_city")]),
            scene("ending_lost_forever", Vec::new()),
        ],
    }
}

/// Forwards to an inner backend, failing the endpoints it is told to.
pub struct FlakyBackend<B> {
    pub inner: B,
    failing: HashSet<&'static str>,
    calls: Vec<&'static str>,
}

impl<B: GameBackend> FlakyBackend<B> {
    pub fn new(inner: B) -> Self {
        Self {
            inner,
            failing: HashSet::new(),
            calls: Vec::new(),
        }
    }

    pub fn fail(&mut self, endpoint: &'static str) {
        self.failing.insert(endpoint);
    }

    pub fn heal(&mut self, endpoint: &'static str) {
        self.failing.remove(endpoint);
    }

    pub fn calls_to(&self, endpoint: &str) -> usize {
        self.calls.iter().filter(|c| **c == endpoint).count()
    }

    fn gate(&mut self, endpoint: &'static str) -> Result<()> {
        self.calls.push(endpoint);
        if self.failing.contains(endpoint) {
            Err(GameError::Network(format!("{endpoint} unreachable")))
        } else {
            Ok(())
        }
    }
}

impl<B: GameBackend> GameBackend for FlakyBackend<B> {
    fn is_authenticated(&self) -> bool {
        self.inner.is_authenticated()
    }

    fn login(&mut self, email: &str, password: &str) -> Result<()> {
        self.gate("login")?;
        self.inner.login(email, password)
    }

    fn signup(&mut self, username: &str, email: &str, password: &str) -> Result<()> {
        self.gate("signup")?;
        self.inner.signup(username, email, password)
    }

    fn logout(&mut self) {
        self.calls.push("logout");
        self.inner.logout();
    }

    fn fetch_character(&mut self) -> Result<Character> {
        self.gate("fetch_character")?;
        self.inner.fetch_character()
    }

    fn update_stats(&mut self, stats: Stats) -> Result<Character> {
        self.gate("update_stats")?;
        self.inner.update_stats(stats)
    }

    fn reset_character(&mut self) -> Result<()> {
        self.gate("reset_character")?;
        self.inner.reset_character()
    }

    fn fetch_inventory(&mut self) -> Result<Vec<InventoryItem>> {
        self.gate("fetch_inventory")?;
        self.inner.fetch_inventory()
    }

    fn add_item(&mut self, item_name: &str, description: &str) -> Result<InventoryItem> {
        self.gate("add_item")?;
        self.inner.add_item(item_name, description)
    }

    fn delete_item(&mut self, id: ItemId) -> Result<()> {
        self.gate("delete_item")?;
        self.inner.delete_item(id)
    }

    fn use_item(&mut self, id: ItemId) -> Result<InventoryItem> {
        self.gate("use_item")?;
        self.inner.use_item(id)
    }

    fn reset_inventory(&mut self) -> Result<()> {
        self.gate("reset_inventory")?;
        self.inner.reset_inventory()
    }

    fn start_story(&mut self) -> Result<StoryNode> {
        self.gate("start_story")?;
        self.inner.start_story()
    }

    fn fetch_scene(&mut self, stage: &str) -> Result<StoryNode> {
        self.gate("fetch_scene")?;
        self.inner.fetch_scene(stage)
    }

    fn submit_choice(&mut self, current: &str, choice_index: usize) -> Result<StoryNode> {
        self.gate("submit_choice")?;
        self.inner.submit_choice(current, choice_index)
    }

    fn use_item_in_story(&mut self, current: &str, item_name: &str) -> Result<ItemStoryResult> {
        self.gate("use_item_in_story")?;
        self.inner.use_item_in_story(current, item_name)
    }

    fn save_game(&mut self, save: &GameSave) -> Result<()> {
        self.gate("save_game")?;
        self.inner.save_game(save)
    }

    fn load_game(&mut self) -> Result<GameSave> {
        self.gate("load_game")?;
        self.inner.load_game()
    }
}

pub type TestSession = GameSession<FlakyBackend<LocalBackend>>;

/// A signed-in session already on `start_city`, after `setup` has shaped
/// the backend.
pub fn started_session(setup: impl FnOnce(&mut LocalBackend)) -> TestSession {
    let mut backend = LocalBackend::new(city_book())
        .with_guest("Ada")
        .with_seed(11)
        .with_stage("start_city");
    setup(&mut backend);

    let mut session =
        GameSession::new(FlakyBackend::new(backend), &ClientSettings::default()).with_seed(5);
    session.start().expect("start");
    session
}

pub fn item_id(session: &TestSession, name: &str) -> ItemId {
    session
        .store()
        .inventory
        .iter()
        .find(|item| item.item_name == name)
        .and_then(|item| item.id)
        .expect("item with id")
}
