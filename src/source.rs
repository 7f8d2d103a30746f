//! Record sources
//!
//! Where raw records come from: the remote transform endpoint or a JSON
//! fixture on disk. Both hand back a parsed [`BiProcessTree`]; transport and
//! parse failures surface as errors and no tree is built from them.

use crate::config::ClientConfig;
use crate::error::{BiTreeError, Result};
use crate::record::BiProcessTree;
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl ConversationMessage {
    /// A user turn stamped with the current time (RFC 3339).
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            timestamp: Some(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)),
        }
    }
}

/// Body of `POST /bi/transform`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformRequest {
    pub conversation: Vec<ConversationMessage>,
}

impl TransformRequest {
    pub fn from_query(query: impl Into<String>) -> Self {
        Self {
            conversation: vec![ConversationMessage::user(query)],
        }
    }
}

#[async_trait]
pub trait RecordSource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch(&self, request: &TransformRequest) -> Result<BiProcessTree>;
}

pub struct HttpRecordSource {
    config: ClientConfig,
    client: reqwest::Client,
}

impl HttpRecordSource {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| BiTreeError::Transport(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl RecordSource for HttpRecordSource {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn fetch(&self, request: &TransformRequest) -> Result<BiProcessTree> {
        let url = self.config.transform_url();
        info!("Requesting record from {}", url);

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| BiTreeError::Transport(format!("Transform request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BiTreeError::Transport(format!("Transform endpoint returned {}: {}", status, body)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| BiTreeError::Transport(format!("Failed to read transform response: {}", e)))?;
        debug!("Received {} bytes from {}", body.len(), url);

        BiProcessTree::from_json_str(&body)
    }
}

/// Reads a static JSON fixture; the request is ignored.
pub struct FixtureRecordSource {
    path: PathBuf,
}

impl FixtureRecordSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl RecordSource for FixtureRecordSource {
    fn name(&self) -> &'static str {
        "fixture"
    }

    async fn fetch(&self, _request: &TransformRequest) -> Result<BiProcessTree> {
        debug!("Loading fixture {}", self.path.display());
        let json = tokio::fs::read_to_string(&self.path).await?;
        BiProcessTree::from_json_str(&json)
    }
}
