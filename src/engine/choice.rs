use crate::api::GameBackend;
use crate::engine::requirements;
use crate::engine::session::GameSession;
use crate::engine::stats::apply_stat_changes;
use crate::error::{log_warning, ErrorContext, GameError, Operation, Result};
use crate::model::character::StatDelta;
use crate::model::event_result::ChoiceOutcome;
use crate::model::inventory::{self, InventoryDelta, REWARD_DESCRIPTION};
use crate::model::story::{StatChanges, StoryOption};

impl<B: GameBackend> GameSession<B> {
    /// Resolves the player's pick of option `choice_index` on the current node.
    ///
    /// Local checks (range, required items, ended game) run first and leave
    /// the store untouched when they fail. The backend then decides the next
    /// node; a failure there is the only other way this returns `Err`.
    /// Consumption, stats and rewards follow in that order, each best-effort,
    /// and the ending rule runs last.
    pub fn resolve_choice(&mut self, choice_index: usize) -> Result<ChoiceOutcome> {
        let context = ErrorContext::new("make_choice")
            .with("choice_index", choice_index)
            .with("stage", &self.store.current_stage);
        self.guarded(Operation::Story, |session| {
            session.run_choice(choice_index, &context)
        })
    }

    fn run_choice(&mut self, choice_index: usize, context: &ErrorContext) -> Result<ChoiceOutcome> {
        if self.store.game_ended {
            return Err(GameError::GameEnded);
        }
        let node = self.store.node.as_ref().ok_or(GameError::NoStoryNode)?;
        let option = node
            .option(choice_index)
            .cloned()
            .ok_or(GameError::InvalidChoice {
                index: choice_index,
                available: node.options.len(),
            })?;
        requirements::check_requirements(&option, &self.store.inventory)?;
        self.require_session(context)?;

        log::debug!("[{}] submitting choice '{}'", context, option.text);
        self.store.error = None;
        let current = self.store.current_stage.clone();
        let next_node = self
            .backend
            .submit_choice(&current, choice_index)
            .map_err(|err| self.fail(context, err))?;

        let mut warnings = Vec::new();
        let mut inventory_delta = InventoryDelta::default();

        if option.consume_item {
            self.consume_requirements(&option, context, &mut inventory_delta, &mut warnings);
        }

        let stat_delta = match option.stat_changes {
            Some(changes) => self.apply_choice_stats(changes, context, &mut warnings),
            None => StatDelta::default(),
        };

        if let Some(reward) = option.reward.as_deref().filter(|r| !r.is_empty()) {
            self.grant_reward(reward, context, &mut inventory_delta, &mut warnings);
        }

        let next_stage = next_node.stage.clone();
        self.store.set_node(next_node);
        self.store.record_stage(&next_stage);

        let ending_reached = self.settle_ending(context, &mut inventory_delta, &mut warnings);

        Ok(ChoiceOutcome {
            next_stage,
            stat_delta,
            inventory_delta,
            ending_reached,
            warnings,
        })
    }

    /// Uses up one held, unused copy of each required item.
    fn consume_requirements(
        &mut self,
        option: &StoryOption,
        context: &ErrorContext,
        delta: &mut InventoryDelta,
        warnings: &mut Vec<String>,
    ) {
        let step = context.step("consume_inventory_item");
        for name in option.requirements() {
            let id = self
                .store
                .inventory
                .iter()
                .find(|item| item.item_name == name && item.is_available())
                .and_then(|item| item.id);

            let Some(id) = id else {
                log::warn!("[{}] {} has no id, refresh the inventory", step, name);
                warnings.push(format!("could not consume {name}: inventory needs a refresh"));
                continue;
            };

            match self.backend.use_item(id) {
                Ok(_) => {
                    inventory::mark_used(&mut self.store.inventory, id);
                    delta.consumed.push(name.to_string());
                }
                Err(err @ GameError::ItemAlreadyUsed(_)) => {
                    // The backend had it used already; catch up locally.
                    inventory::mark_used(&mut self.store.inventory, id);
                    warnings.push(log_warning(&err, &step));
                }
                Err(err) => warnings.push(log_warning(&err, &step)),
            }
        }
    }

    fn apply_choice_stats(
        &mut self,
        changes: StatChanges,
        context: &ErrorContext,
        warnings: &mut Vec<String>,
    ) -> StatDelta {
        let step = context.step("update_character_stats");
        let Some(before) = self.store.character.as_ref().map(|c| c.stats()) else {
            warnings.push(log_warning(&GameError::NoCharacter, &step));
            return StatDelta::default();
        };

        let target = apply_stat_changes(before, changes, self.stat_variance, &mut self.rng);
        log::debug!(
            "[{}] fear {} -> {}, sanity {} -> {}",
            step,
            before.fear,
            target.fear,
            before.sanity,
            target.sanity
        );

        match self.backend.update_stats(target) {
            Ok(updated) => {
                let Some(character) = self.store.character.as_mut() else {
                    return StatDelta::default();
                };
                let history = std::mem::take(&mut character.choice_history);
                *character = updated;
                character.set_stats(character.stats());
                if character.choice_history.is_empty() {
                    character.choice_history = history;
                }
                StatDelta::between(before, character.stats())
            }
            Err(err) => {
                warnings.push(log_warning(&err, &step));
                StatDelta::default()
            }
        }
    }

    fn grant_reward(
        &mut self,
        reward: &str,
        context: &ErrorContext,
        delta: &mut InventoryDelta,
        warnings: &mut Vec<String>,
    ) {
        let step = context.step("add_inventory_item").with("reward", reward);
        let item = match self.backend.add_item(reward, REWARD_DESCRIPTION) {
            Ok(item) => item,
            Err(err) => {
                warnings.push(log_warning(&err, &step));
                return;
            }
        };
        log::info!("[{}] granted {}", step, item.item_name);
        delta.granted.push(item.clone());

        match self.backend.fetch_inventory() {
            Ok(items) => self.store.inventory = items,
            Err(err) => {
                self.store.inventory.push(item);
                warnings.push(log_warning(&err, &context.step("fetch_inventory")));
            }
        }
    }
}
