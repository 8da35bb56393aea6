//! Code-hosting service abstraction
//!
//! `HostingService` covers the slice of the hosting REST API the automation
//! engine needs: repository CRUD, branch refs and protection, file contents,
//! pull requests, releases and tags. `GitHubClient` is the production
//! implementation; `fakes::MemoryHostingService` backs the tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::RemoteError;

/// Result type for remote operations
pub type RemoteResult<T> = std::result::Result<T, RemoteError>;

/// Repository as reported by the hosting service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryInfo {
    pub name: String,
    pub full_name: String,
    pub html_url: String,
    #[serde(default)]
    pub default_branch: Option<String>,
}

/// Payload for creating a repository.
#[derive(Debug, Clone, Serialize)]
pub struct NewRepository {
    pub name: String,
    pub description: String,
    pub private: bool,
    pub auto_init: bool,
    pub has_issues: bool,
    pub has_projects: bool,
    pub has_wiki: bool,
    pub allow_squash_merge: bool,
    pub allow_merge_commit: bool,
    pub allow_rebase_merge: bool,
    pub delete_branch_on_merge: bool,
}

impl NewRepository {
    /// Public, auto-initialised repository with every collaboration feature on.
    pub fn public(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            private: false,
            auto_init: true,
            has_issues: true,
            has_projects: true,
            has_wiki: true,
            allow_squash_merge: true,
            allow_merge_commit: true,
            allow_rebase_merge: true,
            delete_branch_on_merge: true,
        }
    }
}

/// Partial repository settings update. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RepositorySettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_issues: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_projects: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_wiki: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_branch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_auto_merge: Option<bool>,
}

/// Required status checks for a protected branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequiredStatusChecks {
    pub strict: bool,
    pub contexts: Vec<String>,
}

/// Required review policy for a protected branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequiredReviews {
    pub required_approving_review_count: u32,
    pub dismiss_stale_reviews: bool,
}

/// Branch protection rule set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BranchProtection {
    pub required_status_checks: Option<RequiredStatusChecks>,
    pub enforce_admins: bool,
    pub required_pull_request_reviews: Option<RequiredReviews>,
    /// Always serialised as `null`: no push restrictions.
    pub restrictions: Option<serde_json::Value>,
}

impl BranchProtection {
    /// Status checks plus a single approving review, admins exempt.
    pub fn reviewed(contexts: &[&str]) -> Self {
        Self {
            required_status_checks: Some(RequiredStatusChecks {
                strict: true,
                contexts: contexts.iter().map(|c| c.to_string()).collect(),
            }),
            enforce_admins: false,
            required_pull_request_reviews: Some(RequiredReviews {
                required_approving_review_count: 1,
                dismiss_stale_reviews: true,
            }),
            restrictions: None,
        }
    }
}

/// Metadata of a stored file; `sha` is the content hash used for conditional writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetadata {
    pub path: String,
    pub sha: String,
}

/// A create-or-replace file write.
///
/// When `sha` is `Some`, the write replaces exactly that stored version and is
/// rejected if the file moved on in the meantime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileWrite {
    pub branch: String,
    pub path: String,
    pub content: String,
    pub message: String,
    pub sha: Option<String>,
}

/// Pull request request body.
#[derive(Debug, Clone, Serialize)]
pub struct NewPullRequest {
    pub title: String,
    pub body: String,
    pub head: String,
    pub base: String,
    pub maintainer_can_modify: bool,
}

/// Created pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub html_url: String,
}

/// Release request body.
#[derive(Debug, Clone, Serialize)]
pub struct NewRelease {
    pub tag_name: String,
    pub target_commitish: String,
    pub name: String,
    pub body: String,
    pub draft: bool,
    pub prerelease: bool,
}

/// Published release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    pub tag_name: String,
    pub html_url: String,
}

/// A git tag, newest first when listed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
}

/// Code-hosting REST API operations used by the automation engine.
///
/// All repository arguments are bare names; the owner is part of the
/// implementation's configuration. Reads that hit a missing resource return
/// `Ok(None)` rather than an error.
#[async_trait]
pub trait HostingService: Send + Sync {
    /// Owner (user or organisation) every repository lives under.
    fn owner(&self) -> &str;

    /// Browser URL of a repository.
    fn repository_url(&self, repo: &str) -> String;

    async fn get_repository(&self, repo: &str) -> RemoteResult<Option<RepositoryInfo>>;

    async fn create_repository(&self, request: &NewRepository) -> RemoteResult<RepositoryInfo>;

    async fn update_repository(&self, repo: &str, settings: &RepositorySettings)
        -> RemoteResult<()>;

    async fn protect_branch(
        &self,
        repo: &str,
        branch: &str,
        protection: &BranchProtection,
    ) -> RemoteResult<()>;

    /// Commit SHA at the tip of `branch`, or `None` if the branch is missing.
    async fn get_branch_head(&self, repo: &str, branch: &str) -> RemoteResult<Option<String>>;

    /// Create `branch` pointing at `sha`. Fails with `RemoteError::AlreadyExists`
    /// when the ref is already present.
    async fn create_branch(&self, repo: &str, branch: &str, sha: &str) -> RemoteResult<()>;

    /// Current metadata of `path` on `branch`, or `None` if absent.
    async fn get_file(&self, repo: &str, path: &str, branch: &str)
        -> RemoteResult<Option<FileMetadata>>;

    /// Create or replace a file; returns the metadata of the stored version.
    async fn put_file(&self, repo: &str, write: &FileWrite) -> RemoteResult<FileMetadata>;

    async fn create_pull_request(
        &self,
        repo: &str,
        request: &NewPullRequest,
    ) -> RemoteResult<PullRequest>;

    async fn create_release(&self, repo: &str, request: &NewRelease) -> RemoteResult<Release>;

    /// Tags, most recent first.
    async fn list_tags(&self, repo: &str) -> RemoteResult<Vec<Tag>>;
}
