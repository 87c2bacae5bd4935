use crate::api::GameBackend;
use crate::engine::session::GameSession;
use crate::error::{log_warning, ErrorContext};
use crate::model::inventory::InventoryDelta;
use crate::model::story::is_ending_stage;

impl<B: GameBackend> GameSession<B> {
    /// Applies the terminal-stage rule to the current stage.
    ///
    /// On an ending the local inventory is cleared and the game marked ended
    /// whatever the backend says; the server-side resets are best-effort and
    /// skipped while a restart is running, since the restart does them itself.
    pub(crate) fn settle_ending(
        &mut self,
        context: &ErrorContext,
        delta: &mut InventoryDelta,
        warnings: &mut Vec<String>,
    ) -> bool {
        if !is_ending_stage(&self.store.current_stage) {
            return false;
        }
        log::info!("[{}] ending reached: {}", context, self.store.current_stage);

        if !self.store.is_restarting {
            if let Err(err) = self.backend.reset_inventory() {
                warnings.push(log_warning(&err, &context.step("reset_inventory")));
            }
            if let Err(err) = self.backend.reset_character() {
                warnings.push(log_warning(&err, &context.step("reset_character")));
            }
        }

        self.store.inventory.clear();
        delta.cleared = true;
        self.store.game_ended = true;
        true
    }
}
