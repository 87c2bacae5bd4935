use crate::error::Operation;
use crate::model::game_state::GameView;
use crate::model::inventory::ItemId;
use crate::model::message::Message;

#[derive(Debug, Clone)]
pub enum EngineCommand {
    Login { email: String, password: String },
    Signup { username: String, email: String, password: String },
    Logout,
    Start,
    Choose(usize),
    UseItem { id: ItemId, name: String },
    DiscardItem(ItemId),
    RefreshInventory,
    Restart,
    Save,
    Load,
}

impl EngineCommand {
    pub fn operation(&self) -> Option<Operation> {
        match self {
            EngineCommand::Start
            | EngineCommand::Choose(_)
            | EngineCommand::UseItem { .. }
            | EngineCommand::DiscardItem(_)
            | EngineCommand::Load => Some(Operation::Story),
            EngineCommand::Restart => Some(Operation::Restart),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub enum EngineResponse {
    /// Sent before a command runs, so the UI can show it is waiting.
    Working(Operation),

    FullMessageHistory(Vec<Message>),

    StateUpdated(GameView),

    /// The session is gone; the UI should ask for credentials again.
    LoginRequired,
}
