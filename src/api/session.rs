/// Bearer credential for the backend. Login fills it, logout clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    token: Option<String>,
}

impl Session {
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }

    pub fn begin(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    pub fn end(&mut self) {
        self.token = None;
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.as_deref().is_some_and(|t| !t.is_empty())
    }

    pub fn authorization(&self) -> Option<String> {
        self.token().map(|t| format!("Bearer {t}"))
    }
}
