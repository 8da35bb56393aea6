//! Pull request from the content branch into the default branch.

use forge_remote::{NewPullRequest, PullRequest};

use super::StepContext;
use crate::branching::{CONTENT_BRANCH, DEFAULT_BRANCH};
use crate::domain::error::Result;
use crate::templates;

pub struct PullRequestManager;

impl PullRequestManager {
    pub fn request(ctx: &StepContext<'_>) -> NewPullRequest {
        let render = ctx.render_context();
        NewPullRequest {
            title: templates::pull_request_title(&render),
            body: templates::pull_request_body(&render),
            head: CONTENT_BRANCH.to_string(),
            base: DEFAULT_BRANCH.to_string(),
            maintainer_can_modify: true,
        }
    }

    pub async fn open(ctx: &StepContext<'_>) -> Result<PullRequest> {
        let pr = ctx
            .hosting
            .create_pull_request(ctx.repository, &Self::request(ctx))
            .await?;
        Ok(pr)
    }
}
