use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::config::settings::ClientSettings;

pub fn settings_path() -> PathBuf {
    let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("city_of_choices");
    path.push("settings.json");
    path
}

/// Missing or unreadable settings are not an error, defaults apply.
pub fn load_settings() -> ClientSettings {
    load_settings_from(&settings_path())
}

pub fn load_settings_from(path: &Path) -> ClientSettings {
    match fs::read_to_string(path) {
        Ok(text) => serde_json::from_str(&text).unwrap_or_else(|err| {
            log::warn!("ignoring malformed settings at {}: {}", path.display(), err);
            ClientSettings::default()
        }),
        Err(_) => ClientSettings::default(),
    }
}

pub fn save_settings(settings: &ClientSettings) -> anyhow::Result<()> {
    save_settings_to(&settings_path(), settings)
}

pub fn save_settings_to(path: &Path, settings: &ClientSettings) -> anyhow::Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("creating settings directory {}", dir.display()))?;
    }
    let json = serde_json::to_string_pretty(settings)?;
    fs::write(path, json).with_context(|| format!("writing settings to {}", path.display()))?;
    Ok(())
}
