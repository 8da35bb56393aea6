//! Domain-level error taxonomy for repoforge.

use forge_remote::RemoteError;

/// Errors raised by automation steps and configuration handling.
#[derive(Debug, thiserror::Error)]
pub enum AutomationError {
    #[error("remote service error: {0}")]
    Remote(#[from] RemoteError),

    #[error("repository setup failed for {repo}: {reason}")]
    RepositorySetup { repo: String, reason: String },

    #[error("branch {branch} has no head commit in {repo}")]
    MissingBranchHead { repo: String, branch: String },

    #[error("failed to render {artifact}: {reason}")]
    Render { artifact: String, reason: String },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("no release tag follows {latest}")]
    VersionExhausted { latest: String },

    #[error("archival service is not configured")]
    ArchivalNotConfigured,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for repoforge operations.
pub type Result<T> = std::result::Result<T, AutomationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_error_converts() {
        let err: AutomationError = RemoteError::Api {
            status: 500,
            body: "boom".to_string(),
        }
        .into();
        assert!(err.to_string().contains("remote service error"));
        assert!(err.to_string().contains("500"));
    }

    #[test]
    fn test_missing_branch_head_display() {
        let err = AutomationError::MissingBranchHead {
            repo: "demo".to_string(),
            branch: "main".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("main"));
        assert!(msg.contains("demo"));
    }
}
