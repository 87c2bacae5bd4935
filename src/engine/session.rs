use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::api::GameBackend;
use crate::config::settings::ClientSettings;
use crate::engine::requirements;
use crate::error::{log_error, log_warning, ErrorContext, GameError, Operation, Result};
use crate::model::game_state::{GameStore, GameView};
use crate::model::inventory::{InventoryDelta, ItemId};

/// One player's game: a backend plus the store it keeps in sync.
///
/// The resolvers live in sibling modules as further `impl` blocks.
pub struct GameSession<B: GameBackend> {
    pub(crate) backend: B,
    pub(crate) store: GameStore,
    pub(crate) stat_variance: u8,
    pub(crate) rng: StdRng,
}

impl<B: GameBackend> GameSession<B> {
    pub fn new(backend: B, settings: &ClientSettings) -> Self {
        Self {
            backend,
            store: GameStore::default(),
            stat_variance: settings.stat_variance,
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn store(&self) -> &GameStore {
        &self.store
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn view(&self) -> GameView {
        GameView {
            state: self.store.clone(),
            authenticated: self.backend.is_authenticated(),
        }
    }

    /// Marks `op` in flight for the duration of `f`, refusing re-entry.
    pub(crate) fn guarded<T>(
        &mut self,
        op: Operation,
        f: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        if self.store.is_busy(op) {
            log::warn!("refusing {:?} operation, one is already running", op);
            return Err(GameError::Busy(op));
        }
        self.store.set_flag(op, true);
        let result = f(self);
        self.store.set_flag(op, false);
        result
    }

    /// Critical failure: logged and surfaced on the store.
    pub(crate) fn fail(&mut self, context: &ErrorContext, err: GameError) -> GameError {
        log_error(&err, context);
        self.store.error = Some(err.user_message());
        err
    }

    pub(crate) fn require_session(&mut self, context: &ErrorContext) -> Result<()> {
        if self.backend.is_authenticated() {
            Ok(())
        } else {
            Err(self.fail(context, GameError::Auth))
        }
    }

    /* =========================
       Account
       ========================= */

    pub fn login(&mut self, email: &str, password: &str) -> Result<()> {
        let context = ErrorContext::new("login").with("email", email);
        log::debug!("[{}] logging in", context);
        self.store.error = None;
        self.backend
            .login(email, password)
            .map_err(|err| self.fail(&context, err))
    }

    pub fn signup(&mut self, username: &str, email: &str, password: &str) -> Result<()> {
        let context = ErrorContext::new("signup").with("username", username);
        self.store.error = None;
        self.backend
            .signup(username, email, password)
            .map_err(|err| self.fail(&context, err))
    }

    /// Drops the credential and everything loaded under it.
    pub fn logout(&mut self) {
        self.backend.logout();
        self.store = GameStore::default();
        log::info!("logged out");
    }

    /* =========================
       Loading
       ========================= */

    /// First load after login: character, inventory, then the current scene.
    pub fn start(&mut self) -> Result<Vec<String>> {
        let context = ErrorContext::new("start_game");
        self.guarded(Operation::Story, |session| session.load_start(&context))
    }

    fn load_start(&mut self, context: &ErrorContext) -> Result<Vec<String>> {
        self.require_session(context)?;
        self.store.error = None;
        let mut warnings = Vec::new();

        let character = self
            .backend
            .fetch_character()
            .map_err(|err| self.fail(&context.step("fetch_character"), err))?;
        self.store.character = Some(character);

        match self.backend.fetch_inventory() {
            Ok(items) => self.store.inventory = items,
            Err(err) => warnings.push(log_warning(&err, &context.step("fetch_inventory"))),
        }

        let node = self
            .backend
            .start_story()
            .map_err(|err| self.fail(&context.step("fetch_story_start"), err))?;
        log::info!("story starts at {}", node.stage);
        self.store.set_node(node);
        self.store.game_ended = false;

        let mut delta = InventoryDelta::default();
        self.settle_ending(context, &mut delta, &mut warnings);
        Ok(warnings)
    }

    pub fn refresh_inventory(&mut self) -> Result<()> {
        let context = ErrorContext::new("fetch_inventory");
        self.require_session(&context)?;
        let items = self
            .backend
            .fetch_inventory()
            .map_err(|err| self.fail(&context, err))?;
        self.store.inventory = items;
        Ok(())
    }

    /// Throws an item away for good.
    pub fn discard_item(&mut self, item_id: ItemId) -> Result<()> {
        let context = ErrorContext::new("delete_inventory_item").with("item_id", item_id);
        self.guarded(Operation::Story, |session| {
            session.require_session(&context)?;
            session
                .backend
                .delete_item(item_id)
                .map_err(|err| session.fail(&context, err))?;
            session.store.inventory.retain(|item| item.id != Some(item_id));
            Ok(())
        })
    }

    /* =========================
       Queries
       ========================= */

    /// False only when the option exists and its item requirements fail.
    pub fn can_make_choice(&self, choice_index: usize) -> bool {
        self.missing_items_for_choice(choice_index).is_empty()
    }

    pub fn missing_items_for_choice(&self, choice_index: usize) -> Vec<String> {
        self.store
            .node
            .as_ref()
            .and_then(|node| node.option(choice_index))
            .map(|option| requirements::missing_items(option, &self.store.inventory))
            .unwrap_or_default()
    }

    pub fn can_trigger_story(&self, item_name: &str) -> bool {
        self.store
            .node
            .as_ref()
            .is_some_and(|node| node.trigger_for(item_name).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::local::LocalBackend;
    use crate::model::story::{StoryBook, StoryNode, StoryOption};

    fn session() -> GameSession<LocalBackend> {
        let hall = StoryNode {
            id: None,
            stage: "start_city".into(),
            description: "A hall.".into(),
            options: vec![
                StoryOption {
                    text: "Stay".into(),
                    next: Some("start_city".into()),
                    ..StoryOption::default()
                },
                StoryOption {
                    text: "Go out".into(),
                    next: Some("yard".into()),
                    ..StoryOption::default()
                },
            ],
            item_triggers: Vec::new(),
            created_at: None,
        };
        let yard = StoryNode {
            stage: "yard".into(),
            description: "A yard.".into(),
            options: Vec::new(),
            ..hall.clone()
        };
        let book = StoryBook {
            start_stages: vec!["start_city".into()],
            scenes: vec![hall, yard],
        };
        let mut session = GameSession::new(
            LocalBackend::new(book).with_guest("Ada"),
            &ClientSettings::default(),
        );
        session.start().unwrap();
        session
    }

    #[test]
    fn story_work_is_refused_while_restarting() {
        let mut session = session();
        session.store.set_flag(Operation::Restart, true);

        assert!(matches!(
            session.resolve_choice(0),
            Err(GameError::Busy(Operation::Story))
        ));
        assert!(matches!(
            session.restart(),
            Err(GameError::Busy(Operation::Restart))
        ));
        // The refusal must not clear the flag it found.
        assert!(session.store().is_restarting);
    }

    #[test]
    fn story_work_is_refused_while_loading() {
        let mut session = session();
        session.backend_mut().grant("coin");
        session.refresh_inventory().unwrap();
        let coin = session.store().inventory[0].id.unwrap();
        session.store.set_flag(Operation::Story, true);

        assert!(matches!(
            session.resolve_choice(1),
            Err(GameError::Busy(Operation::Story))
        ));
        assert!(matches!(
            session.resolve_item_use(coin, "coin"),
            Err(GameError::Busy(Operation::Story))
        ));

        assert!(session.store().is_loading);
        assert_eq!(session.store().current_stage, "start_city");
        assert_eq!(session.backend().stage(), "start_city");
        assert!(!session.backend().inventory()[0].used);
        assert!(session.store().has_unused("coin"));
    }

    #[test]
    fn flags_clear_after_a_failure() {
        let mut session = session();
        session.backend_mut().logout();

        assert!(session.resolve_choice(0).unwrap_err().requires_login());
        assert!(!session.store().is_loading);
        assert_eq!(
            session.store().error.as_deref(),
            Some("Your session has expired. Please log in again.")
        );
    }

    #[test]
    fn login_then_start_loads_the_character() {
        let mut session = session();
        session.logout();
        session.backend_mut().signup("ada", "ada@example.com", "pw").unwrap();

        assert!(session.login("ada@example.com", "wrong").is_err());
        assert!(session.store().error.is_some());

        session.login("ada@example.com", "pw").unwrap();
        session.start().unwrap();
        assert_eq!(session.store().character.as_ref().unwrap().name, "ada");
        assert_eq!(session.store().current_stage, "start_city");
    }
}
