//! Zenodo deposition client
//!
//! Creates a draft deposition with a pre-reserved DOI. Publishing the
//! deposition (which needs uploaded files) is left to the release workflow
//! that runs inside the repository.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

use crate::archival::{ArchivalService, Deposition, DepositionMetadata};
use crate::error::RemoteError;
use crate::hosting::RemoteResult;

const DEFAULT_API_URL: &str = "https://zenodo.org/api";

/// Zenodo configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct ZenodoConfig {
    /// REST API base URL (use the sandbox URL for dry runs)
    pub api_url: String,
    /// Access token with `deposit:write`
    pub token: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl std::fmt::Debug for ZenodoConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZenodoConfig")
            .field("api_url", &self.api_url)
            .field("token", &"<redacted>")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl ZenodoConfig {
    pub fn new(token: &str) -> Self {
        ZenodoConfig {
            api_url: std::env::var("ZENODO_API_URL")
                .unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            token: token.to_string(),
            timeout_secs: 30,
        }
    }

    /// Config from `ZENODO_ACCESS_TOKEN`; `None` when the token is unset.
    pub fn from_env() -> Option<Self> {
        std::env::var("ZENODO_ACCESS_TOKEN")
            .ok()
            .filter(|t| !t.is_empty())
            .map(|t| Self::new(&t))
    }

    pub fn with_api_url(mut self, api_url: &str) -> Self {
        self.api_url = api_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// Zenodo REST client
pub struct ZenodoClient {
    config: ZenodoConfig,
    http_client: reqwest::Client,
}

#[derive(Deserialize)]
struct DepositionResponse {
    id: u64,
    #[serde(default)]
    doi: Option<String>,
    metadata: ResponseMetadata,
    links: ResponseLinks,
}

#[derive(Deserialize)]
struct ResponseMetadata {
    #[serde(default)]
    prereserve_doi: Option<PrereservedDoi>,
}

#[derive(Deserialize)]
struct PrereservedDoi {
    doi: String,
}

#[derive(Deserialize)]
struct ResponseLinks {
    html: String,
}

impl ZenodoClient {
    pub fn new(config: ZenodoConfig) -> RemoteResult<Self> {
        if config.token.is_empty() {
            return Err(RemoteError::NotConfigured(
                "Zenodo token is empty".to_string(),
            ));
        }

        let http_client = reqwest::Client::builder()
            .user_agent(concat!("repoforge/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| RemoteError::NotConfigured(e.to_string()))?;

        Ok(ZenodoClient {
            config,
            http_client,
        })
    }
}

#[async_trait]
impl ArchivalService for ZenodoClient {
    async fn create_deposition(&self, metadata: &DepositionMetadata) -> RemoteResult<Deposition> {
        let url = format!("{}/deposit/depositions", self.config.api_url);
        debug!(url = url.as_str(), title = metadata.title.as_str(), "zenodo request");

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.config.token)
            .json(&json!({ "metadata": metadata }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(RemoteError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let created: DepositionResponse = response.json().await?;

        // Drafts carry an empty top-level DOI; the reserved one lives in metadata.
        let doi = created
            .metadata
            .prereserve_doi
            .map(|p| p.doi)
            .or(created.doi.filter(|d| !d.is_empty()))
            .ok_or_else(|| {
                RemoteError::Decode(format!("deposition {} has no reserved DOI", created.id))
            })?;

        info!(deposition_id = created.id, doi = doi.as_str(), "reserved DOI");

        Ok(Deposition {
            id: created.id,
            doi,
            url: created.links.html,
        })
    }
}
