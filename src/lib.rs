//! Client-side core of City of Choices: keeps a local view of one player's
//! game in step with the story backend.

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod ui;
