//! Branch layout: cut the working branches from `main`, then apply the plan's
//! extra protections and auto-merge policy.

use forge_remote::{BranchProtection, RemoteError, RepositorySettings};
use tracing::{debug, warn};

use super::setup::REQUIRED_CHECKS;
use super::StepContext;
use crate::branching::{self, DEFAULT_BRANCH, WORKING_BRANCHES};
use crate::domain::error::{AutomationError, Result};
use crate::domain::StepReport;

pub async fn run(ctx: &StepContext<'_>) -> Result<StepReport> {
    let repo = ctx.repository;
    let plan = branching::resolve(ctx.config.branch_strategy);

    let head = ctx
        .hosting
        .get_branch_head(repo, DEFAULT_BRANCH)
        .await?
        .ok_or_else(|| AutomationError::MissingBranchHead {
            repo: repo.to_string(),
            branch: DEFAULT_BRANCH.to_string(),
        })?;

    let mut created = Vec::new();
    for branch in WORKING_BRANCHES {
        match ctx.hosting.create_branch(repo, branch, &head).await {
            Ok(()) => {
                debug!(repository = %repo, branch, "branch created");
                created.push(branch.to_string());
            }
            Err(RemoteError::AlreadyExists(_)) => {
                warn!(repository = %repo, branch, "branch already exists");
            }
            Err(e) => {
                warn!(repository = %repo, branch, error = %e, "branch not created");
            }
        }
    }

    for branch in plan.extra_protected() {
        if !matches!(ctx.hosting.get_branch_head(repo, branch).await, Ok(Some(_))) {
            continue;
        }
        let protection = BranchProtection::reviewed(&REQUIRED_CHECKS);
        if let Err(e) = ctx.hosting.protect_branch(repo, branch, &protection).await {
            warn!(repository = %repo, branch, error = %e, "branch protection not applied");
        }
    }

    if plan.auto_merge {
        let settings = RepositorySettings {
            allow_auto_merge: Some(true),
            ..Default::default()
        };
        if let Err(e) = ctx.hosting.update_repository(repo, &settings).await {
            warn!(repository = %repo, error = %e, "auto-merge not enabled");
        }
    }

    Ok(StepReport::Branches { plan, created })
}
