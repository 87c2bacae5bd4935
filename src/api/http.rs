use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::AUTHORIZATION;
use reqwest::{Method, StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::api::session::Session;
use crate::api::wire::{
    AddItemRequest, CharacterResponse, ChoiceRequest, ChoiceResponse, ErrorBody,
    InventoryResponse, ItemResponse, LoginRequest, SignupRequest, StartResponse, TokenResponse,
    UseItemRequest, UseItemResponse,
};
use crate::api::{GameBackend, ItemStoryResult};
use crate::config::settings::ClientSettings;
use crate::error::{ApiError, GameError, Result};
use crate::model::character::{Character, Stats};
use crate::model::game_save::GameSave;
use crate::model::inventory::{InventoryItem, ItemId};
use crate::model::story::StoryNode;

/// REST adapter. Owns the session, so the bearer token is attached here
/// and nowhere else.
pub struct HttpBackend {
    client: Client,
    settings: ClientSettings,
    session: Session,
}

impl HttpBackend {
    pub fn new(settings: ClientSettings) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            settings,
            session: Session::default(),
        }
    }

    pub fn with_session(mut self, session: Session) -> Self {
        self.session = session;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.settings.api_url(path);
        log::debug!("{} {}", method, url);
        self.authorize(self.client.request(method, url))
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        match self.session.authorization() {
            Some(auth) => req.header(AUTHORIZATION, auth),
            None => req,
        }
    }

    /// Base URL plus `segments`, each percent-encoded as one path segment.
    fn segment_url(&self, segments: &[&str]) -> Result<Url> {
        let base = &self.settings.base_url;
        let mut url = Url::parse(base)
            .map_err(|err| GameError::Network(format!("invalid base url {base}: {err}")))?;
        url.path_segments_mut()
            .map_err(|_| GameError::Network(format!("base url {base} cannot take a path")))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T> {
        let text = self.send_raw(req)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Acks may be empty or plain text.
    fn send_ack(&self, req: RequestBuilder) -> Result<()> {
        self.send_raw(req).map(|_| ())
    }

    fn send_raw(&self, req: RequestBuilder) -> Result<String> {
        let resp = req
            .send()
            .map_err(|e| GameError::Network(e.to_string()))?;

        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(GameError::Auth);
        }
        if !status.is_success() {
            let fallback = format!(
                "HTTP {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("request failed")
            );
            let body: ErrorBody = resp.json().unwrap_or_default();
            return Err(GameError::Api(body.into_api_error(status.as_u16(), &fallback)));
        }

        Ok(resp.text()?)
    }
}

impl GameBackend for HttpBackend {
    fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    fn login(&mut self, email: &str, password: &str) -> Result<()> {
        let req = self
            .request(Method::POST, "auth/login")
            .json(&LoginRequest { email, password });

        let resp: TokenResponse = match self.send(req) {
            Err(GameError::Auth) => {
                return Err(GameError::Api(ApiError {
                    status: 401,
                    message: "Invalid credentials".into(),
                    missing_items: Vec::new(),
                }))
            }
            other => other?,
        };

        let token = resp
            .access_token
            .ok_or_else(|| GameError::InvalidResponse("login returned no access_token".into()))?;
        self.session.begin(token);
        log::info!("logged in as {}", email);
        Ok(())
    }

    fn signup(&mut self, username: &str, email: &str, password: &str) -> Result<()> {
        let req = self.request(Method::POST, "auth/signup").json(&SignupRequest {
            username,
            email,
            password,
        });
        let resp: TokenResponse = self.send(req)?;

        // Some deployments log the new account straight in.
        if let Some(token) = resp.access_token {
            self.session.begin(token);
        }
        Ok(())
    }

    fn logout(&mut self) {
        self.session.end();
    }

    fn fetch_character(&mut self) -> Result<Character> {
        let resp: CharacterResponse = self.send(self.request(Method::GET, "characters/me"))?;
        Ok(resp.into())
    }

    fn update_stats(&mut self, stats: Stats) -> Result<Character> {
        let req = self.request(Method::PATCH, "characters/stats").json(&stats);
        let resp: CharacterResponse = self.send(req)?;
        Ok(resp.into())
    }

    fn reset_character(&mut self) -> Result<()> {
        let req = self
            .request(Method::POST, "characters/reset")
            .json(&serde_json::json!({}));
        self.send_ack(req)
    }

    fn fetch_inventory(&mut self) -> Result<Vec<InventoryItem>> {
        let resp: InventoryResponse = self.send(self.request(Method::GET, "inventory/"))?;
        Ok(resp.inventory)
    }

    fn add_item(&mut self, item_name: &str, description: &str) -> Result<InventoryItem> {
        let req = self.request(Method::POST, "inventory/add").json(&AddItemRequest {
            item_name,
            description,
        });
        let resp: ItemResponse = self.send(req)?;
        Ok(resp.into())
    }

    fn delete_item(&mut self, id: ItemId) -> Result<()> {
        self.send_ack(self.request(Method::DELETE, &format!("inventory/{id}")))
    }

    fn use_item(&mut self, id: ItemId) -> Result<InventoryItem> {
        let req = self
            .request(Method::PUT, &format!("inventory/{id}/use"))
            .json(&serde_json::json!({}));

        match self.send::<ItemResponse>(req) {
            Ok(resp) => Ok(resp.into()),
            Err(GameError::Api(api))
                if api.status == 400 && api.message.to_lowercase().contains("already used") =>
            {
                Err(GameError::ItemAlreadyUsed(id))
            }
            Err(err) => Err(err),
        }
    }

    fn reset_inventory(&mut self) -> Result<()> {
        let req = self
            .request(Method::POST, "inventory/reset")
            .json(&serde_json::json!({}));
        self.send_ack(req)
    }

    fn start_story(&mut self) -> Result<StoryNode> {
        let req = self
            .request(Method::POST, "game/start")
            .json(&serde_json::json!({}));
        let resp: StartResponse = self.send(req)?;
        resp.into_node()
    }

    fn fetch_scene(&mut self, stage: &str) -> Result<StoryNode> {
        let url = self.segment_url(&["game", "scene", stage])?;
        log::debug!("GET {}", url);
        self.send(self.authorize(self.client.get(url)))
    }

    fn submit_choice(&mut self, current: &str, choice_index: usize) -> Result<StoryNode> {
        let req = self.request(Method::POST, "game/choice").json(&ChoiceRequest {
            current,
            choice_index,
        });
        match self.send::<ChoiceResponse>(req)? {
            ChoiceResponse::Node(node) => Ok(node),
            ChoiceResponse::Error(body) => Err(GameError::Api(
                body.into_api_error(200, "The story could not continue"),
            )),
        }
    }

    fn use_item_in_story(&mut self, current: &str, item_name: &str) -> Result<ItemStoryResult> {
        let req = self
            .request(Method::POST, "game/use-item")
            .json(&UseItemRequest { current, item_name });
        let resp: UseItemResponse = self.send(req)?;
        Ok(resp.into())
    }

    fn save_game(&mut self, save: &GameSave) -> Result<()> {
        self.send_ack(self.request(Method::POST, "auth/save").json(save))
    }

    fn load_game(&mut self) -> Result<GameSave> {
        self.send(self.request(Method::GET, "auth/load"))
    }
}
