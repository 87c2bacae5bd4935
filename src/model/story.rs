use serde::{Deserialize, Serialize};

pub const ENDING_PREFIX: &str = "ending";

/// Stage a fresh account starts on before the backend assigns a real one.
pub const START_STAGE: &str = "start";

/// Stages whose identifier starts with `ending` are terminal.
pub fn is_ending_stage(stage: &str) -> bool {
    stage.starts_with(ENDING_PREFIX)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryNode {
    #[serde(default)]
    pub id: Option<i64>,
    pub stage: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub options: Vec<StoryOption>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub item_triggers: Vec<ItemTrigger>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl StoryNode {
    pub fn is_ending(&self) -> bool {
        is_ending_stage(&self.stage)
    }

    pub fn option(&self, index: usize) -> Option<&StoryOption> {
        self.options.get(index)
    }

    pub fn trigger_for(&self, item_name: &str) -> Option<&ItemTrigger> {
        self.item_triggers.iter().find(|t| t.item == item_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StoryOption {
    pub text: String,
    /// Informational only, the backend decides where a choice leads.
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub reward: Option<String>,
    #[serde(default)]
    pub stat_changes: Option<StatChanges>,
    #[serde(default)]
    pub consume_item: bool,
    #[serde(default)]
    pub required_item: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub required_items: Vec<String>,
}

impl StoryOption {
    /// Every item name this option needs, single field first.
    pub fn requirements(&self) -> impl Iterator<Item = &str> {
        self.required_item
            .as_deref()
            .filter(|name| !name.is_empty())
            .into_iter()
            .chain(self.required_items.iter().map(String::as_str))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatChanges {
    #[serde(default)]
    pub fear: i32,
    #[serde(default)]
    pub sanity: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemTrigger {
    pub item: String,
    pub next: String,
    #[serde(default)]
    pub message: String,
}

/// A whole story graph, as stored in a story file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoryBook {
    #[serde(default)]
    pub start_stages: Vec<String>,
    pub scenes: Vec<StoryNode>,
}

impl StoryBook {
    pub fn scene(&self, stage: &str) -> Option<&StoryNode> {
        self.scenes.iter().find(|s| s.stage == stage)
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    let value = Option::<T>::deserialize(deserializer)?;
    Ok(value.unwrap_or_default())
}
