use crate::api::GameBackend;
use crate::engine::session::GameSession;
use crate::error::{log_warning, ErrorContext, GameError, Operation, Result};
use crate::model::event_result::RestoreOutcome;
use crate::model::game_save::GameSave;
use crate::model::inventory::InventoryDelta;

impl<B: GameBackend> GameSession<B> {
    /// Current state as a save. No backend call.
    pub fn snapshot(&self) -> GameSave {
        let character = self.store.character.as_ref();
        GameSave {
            current_stage: self.store.current_stage.clone(),
            choice_history: character
                .map(|c| c.choice_history.clone())
                .unwrap_or_default(),
            current_stats: character.map(|c| c.stats()).unwrap_or_default(),
            inventory_snapshot: self.store.inventory.clone(),
        }
    }

    /// Puts a save back into the store and loads the node for its stage.
    ///
    /// The node is fetched before anything is applied, so a failed fetch
    /// leaves the store as it was. Entries without ids are kept but counted:
    /// they cannot be used until the inventory is refetched.
    pub fn restore(&mut self, save: GameSave) -> Result<RestoreOutcome> {
        let context = ErrorContext::new("restore_game").with("stage", &save.current_stage);
        self.guarded(Operation::Story, |session| session.run_restore(save, &context))
    }

    fn run_restore(&mut self, save: GameSave, context: &ErrorContext) -> Result<RestoreOutcome> {
        self.require_session(context)?;
        self.store.error = None;

        let node = self
            .backend
            .fetch_scene(&save.current_stage)
            .map_err(|err| self.fail(&context.step("fetch_scene"), err))?;

        let mut warnings = Vec::new();
        let items_without_id = save.items_without_id();
        if items_without_id > 0 {
            log::warn!(
                "[{}] {} restored items have no id and cannot be used before a refresh",
                context,
                items_without_id
            );
            warnings.push(format!(
                "{items_without_id} restored items need an inventory refresh before use"
            ));
        }

        match self.store.character.as_mut() {
            Some(character) => {
                character.set_stats(save.current_stats);
                character.choice_history = save.choice_history;
            }
            None => {
                let step = context.step("restore_stats");
                warnings.push(log_warning(&GameError::NoCharacter, &step));
            }
        }
        self.store.inventory = save.inventory_snapshot;
        self.store.set_node(node);
        self.store.game_ended = false;

        let mut delta = InventoryDelta::default();
        let ending_reached = self.settle_ending(context, &mut delta, &mut warnings);

        Ok(RestoreOutcome {
            stage: self.store.current_stage.clone(),
            items_without_id,
            ending_reached,
            warnings,
        })
    }

    pub fn save_game(&mut self) -> Result<GameSave> {
        let context = ErrorContext::new("save_game").with("stage", &self.store.current_stage);
        self.require_session(&context)?;
        let save = self.snapshot();
        self.backend
            .save_game(&save)
            .map_err(|err| self.fail(&context, err))?;
        log::info!("[{}] game saved", context);
        Ok(save)
    }

    pub fn load_game(&mut self) -> Result<RestoreOutcome> {
        let context = ErrorContext::new("load_game");
        self.require_session(&context)?;
        let save = self
            .backend
            .load_game()
            .map_err(|err| self.fail(&context, err))?;
        self.restore(save)
    }
}
