//! Idempotent upload of generated files.
//!
//! Writes follow the hosting service's conditional-replace protocol: the
//! target branch must exist, the current file metadata is read first, and an
//! existing file is only replaced by naming the exact version (its content
//! hash) being overwritten. Identical content is written again; there is no
//! diff suppression.

use forge_remote::{FileMetadata, FileWrite, HostingService};
use tracing::warn;

use crate::domain::error::{AutomationError, Result};
use crate::obs;

/// A rendered file bound for a branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub branch: String,
    pub path: String,
    pub message: String,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishKind {
    Created,
    Updated,
}

/// What a successful write produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Published {
    pub kind: PublishKind,
    pub file: FileMetadata,
}

pub struct ArtifactPublisher<'a> {
    hosting: &'a dyn HostingService,
}

impl<'a> ArtifactPublisher<'a> {
    pub fn new(hosting: &'a dyn HostingService) -> Self {
        Self { hosting }
    }

    /// Write `artifact`, returning whether it was created or replaced.
    pub async fn try_publish(&self, repo: &str, artifact: &Artifact) -> Result<Published> {
        if self
            .hosting
            .get_branch_head(repo, &artifact.branch)
            .await?
            .is_none()
        {
            return Err(AutomationError::MissingBranchHead {
                repo: repo.to_string(),
                branch: artifact.branch.clone(),
            });
        }

        let existing = self
            .hosting
            .get_file(repo, &artifact.path, &artifact.branch)
            .await?;
        let kind = if existing.is_some() {
            PublishKind::Updated
        } else {
            PublishKind::Created
        };

        let write = FileWrite {
            branch: artifact.branch.clone(),
            path: artifact.path.clone(),
            content: artifact.content.clone(),
            message: artifact.message.clone(),
            sha: existing.map(|meta| meta.sha),
        };
        let file = self.hosting.put_file(repo, &write).await?;

        obs::emit_artifact_published(
            repo,
            &artifact.branch,
            &artifact.path,
            kind == PublishKind::Updated,
        );
        Ok(Published { kind, file })
    }

    /// Write `artifact`; failures are logged and reported as `false`.
    pub async fn publish(&self, repo: &str, artifact: &Artifact) -> bool {
        match self.try_publish(repo, artifact).await {
            Ok(_) => true,
            Err(e) => {
                warn!(
                    repository = %repo,
                    branch = %artifact.branch,
                    path = %artifact.path,
                    error = %e,
                    "artifact not published"
                );
                false
            }
        }
    }
}
