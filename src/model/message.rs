#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// One line of the story journal shown in the center panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// Text of the option the player picked, or the item they used.
    Player(String),
    Narration { stage: String, text: String },
    System { severity: Severity, text: String },
}

impl Message {
    pub fn info(text: impl Into<String>) -> Self {
        Message::System {
            severity: Severity::Info,
            text: text.into(),
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Message::System {
            severity: Severity::Warning,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Message::System {
            severity: Severity::Error,
            text: text.into(),
        }
    }
}
