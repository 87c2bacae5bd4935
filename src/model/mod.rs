pub mod character;
pub mod event_result;
pub mod game_save;
pub mod game_state;
pub mod inventory;
pub mod message;
pub mod story;
