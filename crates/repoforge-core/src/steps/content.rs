//! Content generation: render the artifact set and publish it.

use super::StepContext;
use crate::domain::error::Result;
use crate::domain::StepReport;
use crate::publisher::ArtifactPublisher;
use crate::templates;

/// Rendering errors abort the step; a failed upload only drops that file
/// from the published list.
pub async fn run(ctx: &StepContext<'_>) -> Result<StepReport> {
    let artifacts = templates::render_artifacts(&ctx.render_context())?;
    let publisher = ArtifactPublisher::new(ctx.hosting);

    let mut published = Vec::with_capacity(artifacts.len());
    for artifact in &artifacts {
        if publisher.publish(ctx.repository, artifact).await {
            published.push(artifact.path.clone());
        }
    }

    Ok(StepReport::Content { published })
}
