use crate::api::GameBackend;
use crate::engine::session::GameSession;
use crate::error::{log_warning, ErrorContext, GameError, Operation, Result};
use crate::model::event_result::RestartOutcome;
use crate::model::inventory::InventoryDelta;

impl<B: GameBackend> GameSession<B> {
    /// Starts the story over from a fresh character and an empty inventory.
    ///
    /// Losing the character (reset or refetch) or the start node aborts and
    /// leaves the game ended; inventory trouble only produces warnings.
    pub fn restart(&mut self) -> Result<RestartOutcome> {
        let character_id = self
            .store
            .character
            .as_ref()
            .map(|c| c.id.to_string())
            .unwrap_or_else(|| "none".into());
        let context = ErrorContext::new("restart_game").with("character_id", character_id);
        self.guarded(Operation::Restart, |session| session.run_restart(&context))
    }

    /// True while a restart is in flight.
    pub fn is_restarting(&self) -> bool {
        self.store.is_restarting
    }

    fn run_restart(&mut self, context: &ErrorContext) -> Result<RestartOutcome> {
        self.require_session(context)?;
        self.store.game_ended = false;
        self.store.error = None;
        let mut warnings = Vec::new();

        if let Err(err) = self.backend.reset_character() {
            return Err(self.abort_restart(&context.step("reset_character"), err));
        }

        if let Err(err) = self.backend.reset_inventory() {
            warnings.push(log_warning(&err, &context.step("reset_inventory")));
        }

        match self.backend.fetch_character() {
            Ok(character) => self.store.character = Some(character),
            Err(err) => return Err(self.abort_restart(&context.step("fetch_character"), err)),
        }

        match self.backend.fetch_inventory() {
            Ok(items) => self.store.inventory = items,
            Err(err) => warnings.push(log_warning(&err, &context.step("fetch_inventory"))),
        }

        let node = match self.backend.start_story() {
            Ok(node) => node,
            Err(err) => return Err(self.abort_restart(&context.step("fetch_story_start"), err)),
        };
        let stage = node.stage.clone();
        self.store.set_node(node);
        log::info!("[{}] restarted at {}", context, stage);

        let mut delta = InventoryDelta::default();
        self.settle_ending(context, &mut delta, &mut warnings);

        Ok(RestartOutcome { stage, warnings })
    }

    fn abort_restart(&mut self, context: &ErrorContext, err: GameError) -> GameError {
        self.store.game_ended = true;
        self.fail(context, err)
    }
}
