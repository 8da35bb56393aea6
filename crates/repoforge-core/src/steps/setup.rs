//! Repository setup: ensure the repository exists, normalise its settings and
//! protect the default branch.

use forge_remote::{BranchProtection, NewRepository, RepositorySettings};
use tracing::{info, warn};

use super::StepContext;
use crate::branching::DEFAULT_BRANCH;
use crate::domain::error::{AutomationError, Result};
use crate::domain::StepReport;

/// Status checks required on the default branch.
pub const REQUIRED_CHECKS: [&str; 2] = ["continuous-integration", "quality-assurance"];

pub async fn run(ctx: &StepContext<'_>) -> Result<StepReport> {
    let repo = ctx.repository;

    let (repository, created) = match ctx.hosting.get_repository(repo).await? {
        Some(existing) => (existing, false),
        None => {
            info!(repository = %repo, "repository not found, creating");
            let description = format!("Research code repository: {}", repo);
            let created = ctx
                .hosting
                .create_repository(&NewRepository::public(repo, &description))
                .await
                .map_err(|e| AutomationError::RepositorySetup {
                    repo: repo.to_string(),
                    reason: e.to_string(),
                })?;
            (created, true)
        }
    };

    let settings = RepositorySettings {
        has_issues: Some(true),
        has_projects: Some(true),
        has_wiki: Some(true),
        default_branch: Some(DEFAULT_BRANCH.to_string()),
        allow_auto_merge: None,
    };
    if let Err(e) = ctx.hosting.update_repository(repo, &settings).await {
        warn!(repository = %repo, error = %e, "repository settings not applied");
    }

    let protected = match ctx
        .hosting
        .protect_branch(
            repo,
            DEFAULT_BRANCH,
            &BranchProtection::reviewed(&REQUIRED_CHECKS),
        )
        .await
    {
        Ok(()) => true,
        Err(e) => {
            warn!(
                repository = %repo,
                branch = DEFAULT_BRANCH,
                error = %e,
                "branch protection not applied"
            );
            false
        }
    };

    Ok(StepReport::Setup {
        repository,
        created,
        protected,
    })
}
