//! HTTP implementation of the persistence gateway.
//!
//! Every success body is wrapped in `{"data": ...}`. Failures carry
//! `{"error": "..."}`; when that is missing the operation's default message
//! is used instead.

use async_trait::async_trait;
use cairn_core::checkpoint::{
    Checkpoint, CheckpointFilter, CheckpointMetadataUpdate, NewCheckpoint, RestoreCheckpointOptions,
};
use cairn_core::config::ApiConfig;
use cairn_core::error::{CairnError, Result};
use cairn_core::gateway::PersistenceGateway;
use cairn_core::session::{NewSessionConfig, RestoreSessionOptions, Session, SessionSnapshot, WorkspaceState};
use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const CHECKPOINTS_PATH: [&str; 3] = ["api", "checkpoints", "v1"];
const SESSIONS_PATH: [&str; 3] = ["api", "sessions", "v1"];

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreatedCheckpoint {
    id: String,
}

#[derive(Debug, Deserialize)]
struct CheckpointList {
    #[serde(default)]
    checkpoints: Vec<Checkpoint>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SaveSessionBody<'a> {
    workspace_state: &'a WorkspaceState,
}

/// Gateway that talks to the cairn REST API with `reqwest`.
#[derive(Clone)]
pub struct HttpPersistenceGateway {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl HttpPersistenceGateway {
    /// Builds a gateway from API configuration, applying its request timeout.
    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CairnError::config(format!("Failed to build HTTP client: {}", e)))?;

        let mut gateway = Self::with_client(client, &config.base_url)?;
        gateway.token = config.token.clone();
        Ok(gateway)
    }

    /// Builds a gateway around an existing client.
    pub fn with_client(client: Client, base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| CairnError::config(format!("Invalid API base URL '{}': {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(CairnError::config(format!(
                "API base URL '{}' cannot carry a path",
                base_url
            )));
        }

        Ok(Self {
            client,
            base_url,
            token: None,
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Joins path segments onto the base URL, percent-encoding each one.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn checkpoint_url(&self, tail: &[&str]) -> Url {
        let segments: Vec<&str> = CHECKPOINTS_PATH.iter().chain(tail).copied().collect();
        self.url(&segments)
    }

    fn session_url(&self, tail: &[&str]) -> Url {
        let segments: Vec<&str> = SESSIONS_PATH.iter().chain(tail).copied().collect();
        self.url(&segments)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        tracing::debug!("[HttpGateway] {} {}", method, url);
        let builder = self.client.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Sends the request and returns the raw body of a successful response.
    async fn send(&self, request: RequestBuilder, fallback: &str) -> Result<String> {
        let response = request
            .send()
            .await
            .map_err(|e| CairnError::transport(format!("{}: {}", fallback, e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CairnError::transport(format!("{}: {}", fallback, e)))?;

        if !status.is_success() {
            let message = error_message(&body, fallback);
            tracing::debug!("[HttpGateway] {} -> {}: {}", fallback, status, message);
            return Err(CairnError::gateway(status.as_u16(), message));
        }

        Ok(body)
    }

    async fn send_data<T: DeserializeOwned>(&self, request: RequestBuilder, fallback: &str) -> Result<T> {
        let body = self.send(request, fallback).await?;
        let envelope: Envelope<T> = serde_json::from_str(&body)?;
        Ok(envelope.data)
    }
}

/// Extracts `{"error": "..."}` from a failure body, else `fallback`.
fn error_message(body: &str, fallback: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.error)
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

#[async_trait]
impl PersistenceGateway for HttpPersistenceGateway {
    async fn create_checkpoint(&self, request: &NewCheckpoint) -> Result<String> {
        let created: CreatedCheckpoint = self
            .send_data(
                self.request(Method::POST, self.checkpoint_url(&[])).json(request),
                "Failed to create checkpoint",
            )
            .await?;
        Ok(created.id)
    }

    async fn list_checkpoints(&self, filter: &CheckpointFilter) -> Result<Vec<Checkpoint>> {
        let list: CheckpointList = self
            .send_data(
                self.request(Method::GET, self.checkpoint_url(&[]))
                    .query(&filter.to_query_pairs()),
                "Failed to load checkpoints",
            )
            .await?;
        Ok(list.checkpoints)
    }

    async fn restore_checkpoint(
        &self,
        checkpoint_id: &str,
        options: &RestoreCheckpointOptions,
    ) -> Result<SessionSnapshot> {
        self.send_data(
            self.request(Method::POST, self.checkpoint_url(&[checkpoint_id, "restore"]))
                .json(options),
            "Failed to restore checkpoint",
        )
        .await
    }

    async fn delete_checkpoint(&self, checkpoint_id: &str) -> Result<()> {
        self.send(
            self.request(Method::DELETE, self.checkpoint_url(&[checkpoint_id])),
            "Failed to delete checkpoint",
        )
        .await?;
        Ok(())
    }

    async fn update_checkpoint_metadata(
        &self,
        checkpoint_id: &str,
        update: &CheckpointMetadataUpdate,
    ) -> Result<Checkpoint> {
        self.send_data(
            self.request(Method::PUT, self.checkpoint_url(&[checkpoint_id]))
                .json(update),
            "Failed to update checkpoint",
        )
        .await
    }

    async fn save_session(&self, session_id: &str, workspace_state: &WorkspaceState) -> Result<Session> {
        self.send_data(
            self.request(Method::PUT, self.session_url(&[session_id]))
                .json(&SaveSessionBody { workspace_state }),
            "Failed to save session",
        )
        .await
    }

    async fn restore_session(
        &self,
        session_id: &str,
        options: &RestoreSessionOptions,
    ) -> Result<SessionSnapshot> {
        let mut request = self.request(Method::GET, self.session_url(&[session_id]));
        if let Some(key) = &options.encryption_key {
            request = request.query(&[("encryptionKey", key)]);
        }
        self.send_data(request, "Failed to restore session").await
    }

    async fn create_session(&self, config: &NewSessionConfig) -> Result<Session> {
        self.send_data(
            self.request(Method::POST, self.session_url(&[])).json(config),
            "Failed to create session",
        )
        .await
    }
}
