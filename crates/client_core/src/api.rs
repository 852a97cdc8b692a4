//! HTTP client for the remote game server that runs the actual rules.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Serialize};
use shared::{
    domain::UserId,
    error::{ApiError, ErrorCode},
    protocol::{
        Character, CharacterResponse, CreateCharacterRequest, ErrorDetail, GameSessionRequest,
        RollDiceRequest, TurnResponse,
    },
};
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";

#[derive(Debug, Error)]
pub enum ApiFailure {
    #[error(
        "game server returned HTTP {status}{}",
        .detail.as_ref().map(|text| format!(": {text}")).unwrap_or_default()
    )]
    Http { status: u16, detail: Option<String> },
    #[error("{}", .message.as_deref().unwrap_or("the game server rejected the request"))]
    Rejected { message: Option<String> },
    #[error("network error: {0}")]
    Transport(String),
    #[error("malformed server response: {0}")]
    Decode(String),
}

impl ApiFailure {
    pub fn code(&self) -> ErrorCode {
        match self {
            ApiFailure::Http { status: 404, .. } => ErrorCode::NotFound,
            ApiFailure::Http { .. } | ApiFailure::Transport(_) => ErrorCode::Transport,
            ApiFailure::Rejected { .. } => ErrorCode::Rejected,
            ApiFailure::Decode(_) => ErrorCode::Internal,
        }
    }

    pub fn to_api_error(&self) -> ApiError {
        ApiError::new(self.code(), self.to_string())
    }
}

impl From<reqwest::Error> for ApiFailure {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiFailure::Decode(err.to_string())
        } else {
            ApiFailure::Transport(err.to_string())
        }
    }
}

/// What the server returns for a session start or a dice roll.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutcome {
    pub narrative: Option<String>,
    pub character: Option<Character>,
}

impl TryFrom<TurnResponse> for TurnOutcome {
    type Error = ApiFailure;

    fn try_from(response: TurnResponse) -> Result<Self, ApiFailure> {
        if !response.success {
            return Err(ApiFailure::Rejected {
                message: response.message,
            });
        }
        Ok(Self {
            narrative: response.narrative,
            character: response.character,
        })
    }
}

#[async_trait]
pub trait GameApi: Send + Sync {
    async fn create_character(
        &self,
        request: CreateCharacterRequest,
    ) -> Result<Character, ApiFailure>;
    /// The user's active character, or `None` when the server has none.
    async fn fetch_character(&self, user_id: UserId) -> Result<Option<Character>, ApiFailure>;
    async fn start_session(&self, request: GameSessionRequest) -> Result<TurnOutcome, ApiFailure>;
    async fn roll_dice(&self, request: RollDiceRequest) -> Result<TurnOutcome, ApiFailure>;
}

pub struct HttpGameApi {
    http: Client,
    base_url: String,
}

impl HttpGameApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let parsed =
            Url::parse(base_url).with_context(|| format!("invalid game API url '{base_url}'"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(anyhow!(
                "game API url must use http or https, got '{}'",
                parsed.scheme()
            ));
        }
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, ApiFailure>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let url = self.endpoint(path);
        debug!(%url, "POST game api");
        let res = self.http.post(&url).json(body).send().await?;
        Self::decode(res).await
    }

    async fn get<R: DeserializeOwned>(&self, path: &str) -> Result<R, ApiFailure> {
        let url = self.endpoint(path);
        debug!(%url, "GET game api");
        let res = self.http.get(&url).send().await?;
        Self::decode(res).await
    }

    async fn decode<R: DeserializeOwned>(res: Response) -> Result<R, ApiFailure> {
        let status = res.status();
        if !status.is_success() {
            let detail = res.json::<ErrorDetail>().await.ok().map(|body| body.detail);
            return Err(ApiFailure::Http {
                status: status.as_u16(),
                detail,
            });
        }
        Ok(res.json::<R>().await?)
    }
}

#[async_trait]
impl GameApi for HttpGameApi {
    async fn create_character(
        &self,
        request: CreateCharacterRequest,
    ) -> Result<Character, ApiFailure> {
        let response: CharacterResponse = self.post("character", &request).await?;
        if !response.success {
            return Err(ApiFailure::Rejected {
                message: response.message,
            });
        }
        let character = response
            .character
            .ok_or_else(|| ApiFailure::Decode("response has no character record".to_string()))?;
        info!(character_id = character.id.0, name = %character.name, "character created");
        Ok(character)
    }

    async fn fetch_character(&self, user_id: UserId) -> Result<Option<Character>, ApiFailure> {
        let response: CharacterResponse = self.get(&format!("character/{}", user_id.0)).await?;
        if !response.success {
            debug!(user_id = user_id.0, "no active character on server");
            return Ok(None);
        }
        Ok(response.character)
    }

    async fn start_session(&self, request: GameSessionRequest) -> Result<TurnOutcome, ApiFailure> {
        let response: TurnResponse = self.post("game/start", &request).await?;
        TurnOutcome::try_from(response)
    }

    async fn roll_dice(&self, request: RollDiceRequest) -> Result<TurnOutcome, ApiFailure> {
        let response: TurnResponse = self.post("game/roll-dice", &request).await?;
        TurnOutcome::try_from(response)
    }
}

#[cfg(test)]
#[path = "tests/api_tests.rs"]
mod tests;
