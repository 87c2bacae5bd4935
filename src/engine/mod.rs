pub mod choice;
mod ending;
pub mod engine;
pub mod item_use;
pub mod persistence;
pub mod protocol;
pub mod requirements;
pub mod restart;
pub mod session;
pub mod stats;
