//! GitHub REST client
//!
//! Implements [`HostingService`] on top of the GitHub v3 REST API.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::error::RemoteError;
use crate::hosting::*;

const DEFAULT_API_URL: &str = "https://api.github.com";
const DEFAULT_WEB_URL: &str = "https://github.com";

/// GitHub client configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    /// REST API base URL
    pub api_url: String,
    /// Browser base URL used to build repository links
    pub web_url: String,
    /// User that owns the automated repositories
    pub owner: String,
    /// Personal access or installation token
    pub token: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl std::fmt::Debug for GitHubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubConfig")
            .field("api_url", &self.api_url)
            .field("web_url", &self.web_url)
            .field("owner", &self.owner)
            .field("token", &"<redacted>")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for GitHubConfig {
    fn default() -> Self {
        GitHubConfig {
            api_url: std::env::var("GITHUB_API_URL")
                .unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            web_url: DEFAULT_WEB_URL.to_string(),
            owner: std::env::var("GITHUB_OWNER").unwrap_or_default(),
            token: std::env::var("GITHUB_TOKEN").unwrap_or_default(),
            timeout_secs: 30,
        }
    }
}

impl GitHubConfig {
    /// Create a new config from environment variables
    pub fn from_env() -> Self {
        Self::default()
    }

    /// Config for `owner` against the public API
    pub fn new(owner: &str, token: &str) -> Self {
        GitHubConfig {
            api_url: DEFAULT_API_URL.to_string(),
            web_url: DEFAULT_WEB_URL.to_string(),
            owner: owner.to_string(),
            token: token.to_string(),
            timeout_secs: 30,
        }
    }

    /// Point the client at a different API root (GitHub Enterprise, test servers)
    pub fn with_api_url(mut self, api_url: &str) -> Self {
        self.api_url = api_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// GitHub REST client
pub struct GitHubClient {
    config: GitHubConfig,
    http_client: reqwest::Client,
}

#[derive(Deserialize)]
struct GitRef {
    object: GitObject,
}

#[derive(Deserialize)]
struct GitObject {
    sha: String,
}

#[derive(Deserialize)]
struct ContentWriteResponse {
    content: FileMetadata,
}

impl GitHubClient {
    /// Create a new GitHub client
    pub fn new(config: GitHubConfig) -> RemoteResult<Self> {
        if config.token.is_empty() {
            return Err(RemoteError::NotConfigured(
                "GitHub token is empty".to_string(),
            ));
        }
        if config.owner.is_empty() {
            return Err(RemoteError::NotConfigured(
                "GitHub owner is empty".to_string(),
            ));
        }

        let http_client = reqwest::Client::builder()
            .user_agent(concat!("repoforge/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| RemoteError::NotConfigured(e.to_string()))?;

        Ok(GitHubClient {
            config,
            http_client,
        })
    }

    /// Create client from environment variables
    pub fn from_env() -> RemoteResult<Self> {
        Self::new(GitHubConfig::from_env())
    }

    fn repo_path(&self, repo: &str) -> String {
        format!("/repos/{}/{}", self.config.owner, repo)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.config.api_url, path);
        debug!(method = method.as_str(), url = url.as_str(), "github request");
        self.http_client
            .request(method, url)
            .bearer_auth(&self.config.token)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
    }

    /// Map a non-success status to [`RemoteError::Api`], keeping the body.
    async fn ensure_success(response: Response) -> RemoteResult<Response> {
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
        Ok(response)
    }

    async fn parse<T: DeserializeOwned>(response: Response) -> RemoteResult<T> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }

    /// Like [`Self::parse`] but a 404 becomes `Ok(None)`.
    async fn parse_optional<T: DeserializeOwned>(response: Response) -> RemoteResult<Option<T>> {
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Self::parse(response).await.map(Some)
    }
}

#[async_trait]
impl HostingService for GitHubClient {
    fn owner(&self) -> &str {
        &self.config.owner
    }

    fn repository_url(&self, repo: &str) -> String {
        format!("{}/{}/{}", self.config.web_url, self.config.owner, repo)
    }

    async fn get_repository(&self, repo: &str) -> RemoteResult<Option<RepositoryInfo>> {
        let response = self
            .request(Method::GET, &self.repo_path(repo))
            .send()
            .await?;
        Self::parse_optional(response).await
    }

    async fn create_repository(&self, request: &NewRepository) -> RemoteResult<RepositoryInfo> {
        let response = self
            .request(Method::POST, "/user/repos")
            .json(request)
            .send()
            .await?;
        Self::parse(response).await
    }

    async fn update_repository(
        &self,
        repo: &str,
        settings: &RepositorySettings,
    ) -> RemoteResult<()> {
        let response = self
            .request(Method::PATCH, &self.repo_path(repo))
            .json(settings)
            .send()
            .await?;
        Self::ensure_success(response).await?;
        Ok(())
    }

    async fn protect_branch(
        &self,
        repo: &str,
        branch: &str,
        protection: &BranchProtection,
    ) -> RemoteResult<()> {
        let path = format!("{}/branches/{}/protection", self.repo_path(repo), branch);
        let response = self
            .request(Method::PUT, &path)
            .json(protection)
            .send()
            .await?;
        Self::ensure_success(response).await?;
        Ok(())
    }

    async fn get_branch_head(&self, repo: &str, branch: &str) -> RemoteResult<Option<String>> {
        let path = format!("{}/git/ref/heads/{}", self.repo_path(repo), branch);
        let response = self.request(Method::GET, &path).send().await?;
        let git_ref: Option<GitRef> = Self::parse_optional(response).await?;
        Ok(git_ref.map(|r| r.object.sha))
    }

    async fn create_branch(&self, repo: &str, branch: &str, sha: &str) -> RemoteResult<()> {
        let path = format!("{}/git/refs", self.repo_path(repo));
        let response = self
            .request(Method::POST, &path)
            .json(&json!({
                "ref": format!("refs/heads/{}", branch),
                "sha": sha,
            }))
            .send()
            .await?;

        if response.status() == StatusCode::UNPROCESSABLE_ENTITY {
            return Err(RemoteError::AlreadyExists(format!("branch {}", branch)));
        }
        Self::ensure_success(response).await?;
        Ok(())
    }

    async fn get_file(
        &self,
        repo: &str,
        path: &str,
        branch: &str,
    ) -> RemoteResult<Option<FileMetadata>> {
        let url_path = format!("{}/contents/{}", self.repo_path(repo), path);
        let response = self
            .request(Method::GET, &url_path)
            .query(&[("ref", branch)])
            .send()
            .await?;
        Self::parse_optional(response).await
    }

    async fn put_file(&self, repo: &str, write: &FileWrite) -> RemoteResult<FileMetadata> {
        let url_path = format!("{}/contents/{}", self.repo_path(repo), write.path);

        let mut body = json!({
            "message": write.message,
            "content": BASE64.encode(write.content.as_bytes()),
            "branch": write.branch,
        });
        if let Some(sha) = &write.sha {
            body["sha"] = json!(sha);
        }

        let response = self
            .request(Method::PUT, &url_path)
            .json(&body)
            .send()
            .await?;

        if response.status() == StatusCode::CONFLICT {
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteError::Conflict {
                path: write.path.clone(),
                body,
            });
        }
        let stored: ContentWriteResponse = Self::parse(response).await?;
        Ok(stored.content)
    }

    async fn create_pull_request(
        &self,
        repo: &str,
        request: &NewPullRequest,
    ) -> RemoteResult<PullRequest> {
        let path = format!("{}/pulls", self.repo_path(repo));
        let response = self
            .request(Method::POST, &path)
            .json(request)
            .send()
            .await?;
        Self::parse(response).await
    }

    async fn create_release(&self, repo: &str, request: &NewRelease) -> RemoteResult<Release> {
        let path = format!("{}/releases", self.repo_path(repo));
        let response = self
            .request(Method::POST, &path)
            .json(request)
            .send()
            .await?;
        Self::parse(response).await
    }

    async fn list_tags(&self, repo: &str) -> RemoteResult<Vec<Tag>> {
        let path = format!("{}/tags", self.repo_path(repo));
        let response = self.request(Method::GET, &path).send().await?;
        Self::parse(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_github_config_new() {
        let config = GitHubConfig::new("octo-lab", "ghp_secret");
        assert_eq!(config.api_url, "https://api.github.com");
        assert_eq!(config.owner, "octo-lab");
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_github_config_debug_redacts_token() {
        let config = GitHubConfig::new("octo-lab", "ghp_secret");
        let printed = format!("{:?}", config);
        assert!(!printed.contains("ghp_secret"));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn test_with_api_url_trims_trailing_slash() {
        let config = GitHubConfig::new("o", "t").with_api_url("http://127.0.0.1:9000/");
        assert_eq!(config.api_url, "http://127.0.0.1:9000");
    }

    #[test]
    fn test_client_requires_token() {
        let config = GitHubConfig::new("octo-lab", "");
        assert!(matches!(
            GitHubClient::new(config),
            Err(RemoteError::NotConfigured(_))
        ));
    }

    #[test]
    fn test_repository_url() {
        let client = GitHubClient::new(GitHubConfig::new("octo-lab", "t")).unwrap();
        assert_eq!(
            client.repository_url("demo"),
            "https://github.com/octo-lab/demo"
        );
    }
}
