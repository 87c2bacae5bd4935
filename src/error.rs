use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::inventory::ItemId;

pub type Result<T> = std::result::Result<T, GameError>;

/// Operation classes guarded against overlapping invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    /// Choice resolution and item use share one loading flag.
    Story,
    Restart,
}

/// Structured error body returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub status: u16,
    pub message: String,
    pub missing_items: Vec<String>,
}

#[derive(Debug, Error)]
pub enum GameError {
    #[error("network error: {0}")]
    Network(String),

    #[error("session expired")]
    Auth,

    #[error("{}", .0.message)]
    Api(ApiError),

    #[error("choice {index} is not available ({available} options)")]
    InvalidChoice { index: usize, available: usize },

    #[error("missing required item: {0}")]
    MissingRequiredItem(String),

    #[error("item {0} has already been used")]
    ItemAlreadyUsed(ItemId),

    #[error("the game has ended, restart to play again")]
    GameEnded,

    #[error("{0:?} operation already in progress")]
    Busy(Operation),

    #[error("no story node loaded")]
    NoStoryNode,

    #[error("no character loaded")]
    NoCharacter,

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl GameError {
    /// Plain message for display.
    pub fn user_message(&self) -> String {
        match self {
            GameError::Network(_) => {
                "Connection lost. Please check your connection and try again.".to_string()
            }
            GameError::Auth => "Your session has expired. Please log in again.".to_string(),
            GameError::Api(api) if !api.missing_items.is_empty() => {
                format!("Missing required items: {}", api.missing_items.join(", "))
            }
            GameError::Api(api) if api.message.is_empty() => {
                "An unexpected error occurred.".to_string()
            }
            GameError::MissingRequiredItem(item) => format!("Missing required items: {item}"),
            other => other.to_string(),
        }
    }

    /// Only transport failures are worth retrying. The caller decides.
    pub fn should_retry(&self) -> bool {
        matches!(self, GameError::Network(_))
    }

    pub fn requires_login(&self) -> bool {
        matches!(self, GameError::Auth)
    }

    /// Local validation failures never reach the backend.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            GameError::InvalidChoice { .. }
                | GameError::MissingRequiredItem(_)
                | GameError::ItemAlreadyUsed(_)
                | GameError::GameEnded
                | GameError::Busy(_)
        )
    }
}

impl From<reqwest::Error> for GameError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            GameError::InvalidResponse(err.to_string())
        } else {
            GameError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for GameError {
    fn from(err: serde_json::Error) -> Self {
        GameError::InvalidResponse(err.to_string())
    }
}

/// Where an error happened, for the log.
#[derive(Debug, Clone)]
pub struct ErrorContext {
    pub action: &'static str,
    pub details: Vec<(&'static str, String)>,
}

impl ErrorContext {
    pub fn new(action: &'static str) -> Self {
        Self {
            action,
            details: Vec::new(),
        }
    }

    pub fn with(mut self, key: &'static str, value: impl fmt::Display) -> Self {
        self.details.push((key, value.to_string()));
        self
    }

    /// Same details, different step of the same operation.
    pub fn step(&self, action: &'static str) -> Self {
        Self {
            action,
            details: self.details.clone(),
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.action)?;
        for (key, value) in &self.details {
            write!(f, " {key}={value}")?;
        }
        Ok(())
    }
}

pub fn log_error(err: &GameError, context: &ErrorContext) {
    log::error!(
        "[{}] {} (network={}, auth={})",
        context,
        err,
        matches!(err, GameError::Network(_)),
        err.requires_login()
    );
}

/// Secondary failure: logged at warn, returned as a warning line.
pub fn log_warning(err: &GameError, context: &ErrorContext) -> String {
    log::warn!("[{}] {}", context, err);
    format!("{}: {}", context.action.replace('_', " "), err.user_message())
}
