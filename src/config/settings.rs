use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ClientSettings {
    pub base_url: String,
    pub request_timeout_secs: u64,

    /// Random spread added to each stat change, in points either way. 0 disables it.
    pub stat_variance: u8,

    /// Play against a local story file instead of the REST backend.
    pub offline_story: Option<PathBuf>,

    pub ui_scale: f32,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            request_timeout_secs: 30,
            stat_variance: 0,
            offline_story: None,
            ui_scale: 1.0,
        }
    }
}

impl ClientSettings {
    pub fn api_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
