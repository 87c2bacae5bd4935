//! Response shapes as the backend actually sends them.
//!
//! Several routes answer either with a wrapper object or with the bare
//! payload; these untagged enums absorb that so nothing past the adapter
//! has to care.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::ItemStoryResult;
use crate::error::{ApiError, GameError};
use crate::model::character::Character;
use crate::model::inventory::InventoryItem;
use crate::model::story::StoryNode;

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct SignupRequest<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    #[serde(default, alias = "token")]
    pub access_token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChoiceRequest<'a> {
    pub current: &'a str,
    pub choice_index: usize,
}

#[derive(Debug, Serialize)]
pub struct UseItemRequest<'a> {
    pub current: &'a str,
    pub item_name: &'a str,
}

#[derive(Debug, Serialize)]
pub struct AddItemRequest<'a> {
    pub item_name: &'a str,
    pub description: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum CharacterResponse {
    Wrapped { character: Character },
    Bare(Character),
}

impl From<CharacterResponse> for Character {
    fn from(resp: CharacterResponse) -> Self {
        match resp {
            CharacterResponse::Wrapped { character } | CharacterResponse::Bare(character) => {
                character
            }
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct InventoryResponse {
    #[serde(default)]
    pub inventory: Vec<InventoryItem>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ItemResponse {
    Wrapped { item: InventoryItem },
    Bare(InventoryItem),
}

impl From<ItemResponse> for InventoryItem {
    fn from(resp: ItemResponse) -> Self {
        match resp {
            ItemResponse::Wrapped { item } | ItemResponse::Bare(item) => item,
        }
    }
}

/// `/game/start` returns the full game bundle, older deployments the node.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum StartResponse {
    Bare(StoryNode),
    Bundle { current_scene: Option<StoryNode> },
}

impl StartResponse {
    pub fn into_node(self) -> Result<StoryNode, GameError> {
        match self {
            StartResponse::Bare(node) => Ok(node),
            StartResponse::Bundle {
                current_scene: Some(node),
            } => Ok(node),
            StartResponse::Bundle {
                current_scene: None,
            } => Err(GameError::NoStoryNode),
        }
    }
}

/// A choice answers with the next node, or with an error body and 200.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ChoiceResponse {
    Node(StoryNode),
    Error(ErrorBody),
}

#[derive(Debug, Deserialize)]
pub struct UseItemResponse {
    #[serde(default)]
    pub node: Option<StoryNode>,
    #[serde(default)]
    pub current_node: Option<StoryNode>,
    #[serde(default)]
    pub message: Option<String>,
}

impl From<UseItemResponse> for ItemStoryResult {
    fn from(resp: UseItemResponse) -> Self {
        match resp.node {
            Some(node) => ItemStoryResult::Triggered {
                node,
                message: resp.message,
            },
            None => ItemStoryResult::Unchanged {
                message: resp.message,
            },
        }
    }
}

/// Error bodies vary by route: `{error, details}`, `{msg}`, `{message}`.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub details: Option<Value>,
    #[serde(default)]
    pub missing_items: Option<Vec<String>>,
}

impl ErrorBody {
    pub fn into_api_error(self, status: u16, fallback: &str) -> ApiError {
        let missing_items = self
            .missing_items
            .or_else(|| {
                self.details
                    .as_ref()
                    .and_then(|d| d.get("missing_items"))
                    .and_then(|v| serde_json::from_value(v.clone()).ok())
            })
            .unwrap_or_default();

        let message = self
            .error
            .or(self.msg)
            .or(self.message)
            .unwrap_or_else(|| fallback.to_string());

        ApiError {
            status,
            message,
            missing_items,
        }
    }
}
