//! Semantically versioned release of the default branch.

use forge_remote::{NewRelease, Release};
use tracing::debug;

use super::StepContext;
use crate::branching::DEFAULT_BRANCH;
use crate::domain::error::{AutomationError, Result};
use crate::templates;
use crate::versioning;

pub struct ReleaseManager;

impl ReleaseManager {
    /// Tag for the next release, from the most recent tag in the repository.
    pub async fn next_tag(ctx: &StepContext<'_>) -> Result<String> {
        let tags = ctx.hosting.list_tags(ctx.repository).await?;
        let latest = tags.first().map(|t| t.name.as_str());
        let tag = versioning::release_tag(latest, ctx.config.automation_level)
            .ok_or_else(|| AutomationError::VersionExhausted {
                latest: latest.unwrap_or_default().to_string(),
            })?;
        debug!(repository = %ctx.repository, ?latest, tag = %tag, "release tag computed");
        Ok(tag)
    }

    /// Publish a release; `doi` is linked from the notes when one was issued.
    pub async fn publish(ctx: &StepContext<'_>, doi: Option<&str>) -> Result<Release> {
        let tag = Self::next_tag(ctx).await?;
        let render = ctx.render_context();
        let request = NewRelease {
            name: templates::release_name(&render, &tag),
            body: templates::release_body(&render, &tag, doi),
            tag_name: tag,
            target_commitish: DEFAULT_BRANCH.to_string(),
            draft: false,
            prerelease: false,
        };
        let release = ctx.hosting.create_release(ctx.repository, &request).await?;
        Ok(release)
    }
}
