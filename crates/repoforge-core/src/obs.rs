//! Structured observability hooks for repository automation.
//!
//! This module provides:
//! - A repository-scoped tracing span for instrumenting a run
//! - Emission functions for lifecycle events: start, step outcomes, published
//!   artifacts, finish
//!
//! Events are emitted at `info!` level (warnings for failed steps and
//! unpublished artifacts). Set `RUST_LOG` to filter.

use tracing::{info, warn};

use crate::domain::StepKind;

/// Repository-scoped span; attach it to a run with
/// [`Instrument::instrument`](tracing::Instrument::instrument) so every event
/// below carries `owner` and `repository`.
pub fn repo_span(owner: &str, repository: &str) -> tracing::Span {
    tracing::info_span!(
        "repoforge.repository",
        owner = %owner,
        repository = %repository
    )
}

/// Emit event: automation started for a repository.
pub fn emit_automation_started(repository: &str, level: &str, strategy: &str) {
    info!(
        event = "automation.started",
        repository = %repository,
        level = %level,
        strategy = %strategy,
    );
}

pub fn emit_step_completed(repository: &str, step: StepKind) {
    info!(event = "step.completed", repository = %repository, step = step.name());
}

/// Emit event: step failed. `fatal` is true for mandatory steps.
pub fn emit_step_failed(
    repository: &str,
    step: StepKind,
    fatal: bool,
    error: &dyn std::fmt::Display,
) {
    warn!(
        event = "step.failed",
        repository = %repository,
        step = step.name(),
        fatal = fatal,
        error = %error,
    );
}

pub fn emit_step_skipped(repository: &str, step: StepKind, reason: &str) {
    info!(
        event = "step.skipped",
        repository = %repository,
        step = step.name(),
        reason = %reason,
    );
}

/// Emit event: a generated artifact was written to a branch.
pub fn emit_artifact_published(repository: &str, branch: &str, path: &str, updated: bool) {
    info!(
        event = "artifact.published",
        repository = %repository,
        branch = %branch,
        path = %path,
        updated = updated,
    );
}

/// Emit event: automation finished with duration and verdict.
pub fn emit_automation_finished(
    repository: &str,
    duration_ms: u64,
    completed_steps: usize,
    success: bool,
) {
    info!(
        event = "automation.finished",
        repository = %repository,
        duration_ms = duration_ms,
        completed_steps = completed_steps,
        success = success,
    );
}
