//! Bookkeeping steps: CI workflows, quality gates, monitoring.
//!
//! These register identifiers on the result without touching the remote.

use tracing::warn;

use super::StepContext;
use crate::domain::error::Result;
use crate::domain::{AutomationResult, StepReport};
use crate::templates::{workflow_path, WORKFLOWS};

pub const QUALITY_GATES: [&str; 4] = [
    "code_quality",
    "documentation_completeness",
    "research_integrity",
    "security_scan",
];

pub const MONITORS: [&str; 4] = [
    "repository_traffic_tracking",
    "automation_pipeline_monitoring",
    "quality_metrics_analysis",
    "collaboration_impact_measurement",
];

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Register the workflows, warning about any whose file was not published.
pub fn cicd(ctx: &StepContext<'_>, result: &AutomationResult) -> Result<StepReport> {
    for workflow in WORKFLOWS {
        let path = workflow_path(workflow);
        if !result.artifacts_created.contains(&path) {
            warn!(repository = %ctx.repository, workflow, "workflow file was not published");
        }
    }
    Ok(StepReport::Registered {
        items: owned(&WORKFLOWS),
    })
}

/// Register the quality gates; none when the `quality_gates` switch is off.
pub fn quality_gates(ctx: &StepContext<'_>) -> Result<StepReport> {
    let items = if ctx.config.quality_gates {
        owned(&QUALITY_GATES)
    } else {
        Vec::new()
    };
    Ok(StepReport::Registered { items })
}

pub fn monitoring(_ctx: &StepContext<'_>) -> Result<StepReport> {
    Ok(StepReport::Registered {
        items: owned(&MONITORS),
    })
}
