use serde::{Deserialize, Serialize};

pub const STAT_MIN: i32 = 0;
pub const STAT_MAX: i32 = 100;

pub const DEFAULT_FEAR: i32 = 0;
pub const DEFAULT_SANITY: i32 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub fear: i32,
    #[serde(default = "default_sanity")]
    pub sanity: i32,
    #[serde(default)]
    pub choice_history: Vec<String>,
}

fn default_sanity() -> i32 {
    DEFAULT_SANITY
}

impl Character {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            fear: DEFAULT_FEAR,
            sanity: DEFAULT_SANITY,
            choice_history: Vec::new(),
        }
    }

    pub fn stats(&self) -> Stats {
        Stats {
            fear: self.fear,
            sanity: self.sanity,
        }
    }

    /// Overwrites both stats, clamped.
    pub fn set_stats(&mut self, stats: Stats) {
        let stats = stats.clamped();
        self.fear = stats.fear;
        self.sanity = stats.sanity;
    }
}

/// Fear and sanity as a pair, the unit the backend updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Stats {
    pub fear: i32,
    pub sanity: i32,
}

impl Stats {
    pub fn clamped(self) -> Self {
        Self {
            fear: self.fear.clamp(STAT_MIN, STAT_MAX),
            sanity: self.sanity.clamp(STAT_MIN, STAT_MAX),
        }
    }
}

/// Delta actually applied to a character, after clamping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatDelta {
    pub fear: i32,
    pub sanity: i32,
}

impl StatDelta {
    pub fn between(before: Stats, after: Stats) -> Self {
        Self {
            fear: after.fear - before.fear,
            sanity: after.sanity - before.sanity,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.fear == 0 && self.sanity == 0
    }
}
