use std::sync::mpsc::{self, Receiver, Sender};

use crate::api::GameBackend;
use crate::engine::protocol::{EngineCommand, EngineResponse};
use crate::engine::session::GameSession;
use crate::error::Result;
use crate::model::message::Message;

/// Runs a [`GameSession`] on its own thread. Commands are handled one at a
/// time in arrival order, which is what keeps store mutations serialized.
pub struct Engine<B: GameBackend> {
    rx: Receiver<EngineCommand>,
    tx: Sender<EngineResponse>,
    messages: Vec<Message>,
    session: GameSession<B>,
}

/// Moves `session` onto an engine thread and returns the UI's ends of the
/// channels. The thread exits when the command sender is dropped.
pub fn spawn_engine<B>(session: GameSession<B>) -> (Sender<EngineCommand>, Receiver<EngineResponse>)
where
    B: GameBackend + Send + 'static,
{
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let (resp_tx, resp_rx) = mpsc::channel();

    std::thread::spawn(move || {
        let mut engine = Engine::new(cmd_rx, resp_tx, session);
        engine.run();
    });

    (cmd_tx, resp_rx)
}

impl<B: GameBackend> Engine<B> {
    pub fn new(
        rx: Receiver<EngineCommand>,
        tx: Sender<EngineResponse>,
        session: GameSession<B>,
    ) -> Self {
        Self {
            rx,
            tx,
            messages: Vec::new(),
            session,
        }
    }

    pub fn run(&mut self) {
        let _ = self.tx.send(EngineResponse::StateUpdated(self.session.view()));

        while let Ok(cmd) = self.rx.recv() {
            if let Some(op) = cmd.operation() {
                let _ = self.tx.send(EngineResponse::Working(op));
            }

            let login_required = match self.handle(cmd) {
                Ok(()) => false,
                Err(err) => {
                    self.messages.push(Message::error(err.user_message()));
                    err.requires_login()
                }
            };

            let _ = self
                .tx
                .send(EngineResponse::FullMessageHistory(self.messages.clone()));
            let _ = self.tx.send(EngineResponse::StateUpdated(self.session.view()));
            if login_required {
                let _ = self.tx.send(EngineResponse::LoginRequired);
            }
        }
        log::debug!("engine stopped");
    }

    fn handle(&mut self, cmd: EngineCommand) -> Result<()> {
        match cmd {
            EngineCommand::Login { email, password } => {
                self.session.login(&email, &password)?;
                self.messages.clear();
                self.messages.push(Message::info("Signed in."));
                self.start()
            }

            EngineCommand::Signup {
                username,
                email,
                password,
            } => {
                self.session.signup(&username, &email, &password)?;
                if self.session.backend().is_authenticated() {
                    self.messages.clear();
                    self.messages.push(Message::info("Account created."));
                    self.start()
                } else {
                    self.messages
                        .push(Message::info("Account created, log in to play."));
                    Ok(())
                }
            }

            EngineCommand::Logout => {
                self.session.logout();
                self.messages.clear();
                Ok(())
            }

            EngineCommand::Start => self.start(),

            EngineCommand::Choose(index) => {
                let text = self
                    .session
                    .store()
                    .node
                    .as_ref()
                    .and_then(|node| node.option(index))
                    .map(|option| option.text.clone());

                let outcome = self.session.resolve_choice(index)?;
                if let Some(text) = text {
                    self.messages.push(Message::Player(text));
                }
                self.push_warnings(&outcome.warnings);
                for item in &outcome.inventory_delta.granted {
                    self.messages
                        .push(Message::info(format!("You obtained: {}", item.item_name)));
                }
                self.narrate();
                if outcome.ending_reached {
                    self.messages.push(Message::info("The story has ended."));
                }
                Ok(())
            }

            EngineCommand::UseItem { id, name } => {
                let outcome = self.session.resolve_item_use(id, &name)?;
                self.messages.push(Message::Player(format!("You use the {name}.")));
                if let Some(message) = outcome.message {
                    self.messages.push(Message::info(message));
                }
                self.push_warnings(&outcome.warnings);
                if outcome.next_stage.is_some() {
                    self.narrate();
                }
                if outcome.ending_reached {
                    self.messages.push(Message::info("The story has ended."));
                }
                Ok(())
            }

            EngineCommand::DiscardItem(id) => {
                self.session.discard_item(id)?;
                self.messages.push(Message::info("Item discarded."));
                Ok(())
            }

            EngineCommand::RefreshInventory => self.session.refresh_inventory(),

            EngineCommand::Restart => {
                let outcome = self.session.restart()?;
                self.messages.clear();
                self.push_warnings(&outcome.warnings);
                self.narrate();
                Ok(())
            }

            EngineCommand::Save => {
                self.session.save_game()?;
                self.messages.push(Message::info("Game saved!"));
                Ok(())
            }

            EngineCommand::Load => {
                let outcome = self.session.load_game()?;
                self.messages.push(Message::info("Game loaded!"));
                self.push_warnings(&outcome.warnings);
                self.narrate();
                if outcome.ending_reached {
                    self.messages.push(Message::info("The story has ended."));
                }
                Ok(())
            }
        }
    }

    fn start(&mut self) -> Result<()> {
        let warnings = self.session.start()?;
        self.push_warnings(&warnings);
        self.narrate();
        Ok(())
    }

    fn narrate(&mut self) {
        if let Some(node) = self.session.store().node.as_ref() {
            self.messages.push(Message::Narration {
                stage: node.stage.clone(),
                text: node.description.clone(),
            });
        }
    }

    fn push_warnings(&mut self, warnings: &[String]) {
        self.messages
            .extend(warnings.iter().cloned().map(Message::warning));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::local::LocalBackend;
    use crate::config::settings::ClientSettings;
    use crate::model::game_state::GameView;
    use crate::model::story::{StoryBook, StoryNode, StoryOption};

    fn node(stage: &str, options: Vec<StoryOption>) -> StoryNode {
        StoryNode {
            id: None,
            stage: stage.into(),
            description: format!("You are at {stage}."),
            options,
            item_triggers: Vec::new(),
            created_at: None,
        }
    }

    fn book() -> StoryBook {
        StoryBook {
            start_stages: vec!["start_city".into()],
            scenes: vec![
                node(
                    "start_city",
                    vec![StoryOption {
                        text: "Walk into the fog".into(),
                        next: Some("ending_fog".into()),
                        ..StoryOption::default()
                    }],
                ),
                node("ending_fog", Vec::new()),
            ],
        }
    }

    fn drain(rx: Receiver<EngineResponse>) -> (Vec<Message>, Option<GameView>, bool) {
        let mut messages = Vec::new();
        let mut view = None;
        let mut login_required = false;
        for resp in rx {
            match resp {
                EngineResponse::FullMessageHistory(m) => messages = m,
                EngineResponse::StateUpdated(v) => view = Some(v),
                EngineResponse::LoginRequired => login_required = true,
                EngineResponse::Working(_) => {}
            }
        }
        (messages, view, login_required)
    }

    #[test]
    fn commands_flow_through_to_an_ending() {
        let backend = LocalBackend::new(book()).with_guest("Ada");
        let session = GameSession::new(backend, &ClientSettings::default()).with_seed(1);
        let (tx, rx) = spawn_engine(session);

        tx.send(EngineCommand::Start).unwrap();
        tx.send(EngineCommand::Choose(0)).unwrap();
        drop(tx);

        let (messages, view, login_required) = drain(rx);
        let view = view.unwrap();
        assert!(!login_required);
        assert!(view.state.game_ended);
        assert_eq!(view.state.current_stage, "ending_fog");
        assert!(messages.contains(&Message::Player("Walk into the fog".into())));
        assert_eq!(messages.last(), Some(&Message::info("The story has ended.")));
    }

    #[test]
    fn missing_session_asks_for_login() {
        let backend = LocalBackend::new(book());
        let session = GameSession::new(backend, &ClientSettings::default());
        let (tx, rx) = spawn_engine(session);

        tx.send(EngineCommand::Start).unwrap();
        drop(tx);

        let (messages, view, login_required) = drain(rx);
        assert!(login_required);
        assert!(!view.unwrap().authenticated);
        assert_eq!(
            messages,
            vec![Message::error("Your session has expired. Please log in again.")]
        );
    }
}
