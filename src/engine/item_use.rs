use crate::api::{GameBackend, ItemStoryResult};
use crate::engine::session::GameSession;
use crate::error::{log_warning, ErrorContext, GameError, Operation, Result};
use crate::model::event_result::ItemUseOutcome;
use crate::model::inventory::{self, InventoryDelta, ItemId};

impl<B: GameBackend> GameSession<B> {
    /// Uses an inventory item, moving the story on if the current node has a
    /// trigger for it.
    pub fn resolve_item_use(&mut self, item_id: ItemId, item_name: &str) -> Result<ItemUseOutcome> {
        let context = ErrorContext::new("use_item")
            .with("item_id", item_id)
            .with("item_name", item_name)
            .with("stage", &self.store.current_stage);
        self.guarded(Operation::Story, |session| {
            session.run_item_use(item_id, item_name, &context)
        })
    }

    fn run_item_use(
        &mut self,
        item_id: ItemId,
        item_name: &str,
        context: &ErrorContext,
    ) -> Result<ItemUseOutcome> {
        if self.store.game_ended {
            return Err(GameError::GameEnded);
        }
        if inventory::find_by_id(&self.store.inventory, item_id).is_some_and(|item| item.used) {
            log::debug!("[{}] item already used locally", context);
            return Err(GameError::ItemAlreadyUsed(item_id));
        }
        self.require_session(context)?;
        self.store.error = None;

        match self.backend.use_item(item_id) {
            Ok(_) => {}
            Err(err @ GameError::ItemAlreadyUsed(_)) => {
                log::warn!("[{}] backend reports item already used", context);
                inventory::mark_used(&mut self.store.inventory, item_id);
                return Err(err);
            }
            Err(err) => return Err(self.fail(&context.step("consume_inventory_item"), err)),
        }
        inventory::mark_used(&mut self.store.inventory, item_id);

        let mut inventory_delta = InventoryDelta {
            consumed: vec![item_name.to_string()],
            ..InventoryDelta::default()
        };
        let mut warnings = Vec::new();

        // The item stays used even if this fails.
        let current = self.store.current_stage.clone();
        let story = self
            .backend
            .use_item_in_story(&current, item_name)
            .map_err(|err| self.fail(&context.step("trigger_item_story"), err))?;

        match self.backend.fetch_inventory() {
            Ok(items) => self.store.inventory = items,
            Err(err) => warnings.push(log_warning(&err, &context.step("fetch_inventory"))),
        }

        let (next_stage, message) = match story {
            ItemStoryResult::Triggered { node, message } => {
                let stage = node.stage.clone();
                log::info!("[{}] item moved the story to {}", context, stage);
                self.store.set_node(node);
                self.store.record_stage(&stage);
                (Some(stage), message)
            }
            ItemStoryResult::Unchanged { message } => (None, message),
        };

        let ending_reached = next_stage.is_some()
            && self.settle_ending(context, &mut inventory_delta, &mut warnings);

        Ok(ItemUseOutcome {
            item_id,
            inventory_delta,
            next_stage,
            message,
            ending_reached,
            warnings,
        })
    }
}
