//! Orchestration engine.
//!
//! Runs the fixed step sequence against one repository and accumulates an
//! [`AutomationResult`]. Mandatory steps abort the run on failure; the
//! feature-gated steps and monitoring record their failure and move on.
//! Every remote call is awaited before the next one starts.

use std::sync::Arc;
use std::time::Instant;

use forge_remote::{ArchivalService, HostingService};
use tracing::Instrument;

use crate::config::AutomationConfig;
use crate::domain::error::{AutomationError, Result};
use crate::domain::{AutomationResult, PrincipalInfo, StepKind, StepReport};
use crate::obs;
use crate::steps::{self, DoiIssuer, PullRequestManager, ReleaseManager, StepContext};

pub struct AutomationEngine {
    hosting: Arc<dyn HostingService>,
    archival: Option<Arc<dyn ArchivalService>>,
    config: AutomationConfig,
    principal: PrincipalInfo,
}

impl AutomationEngine {
    pub fn new(
        hosting: Arc<dyn HostingService>,
        config: AutomationConfig,
        principal: PrincipalInfo,
    ) -> Self {
        Self {
            hosting,
            archival: None,
            config,
            principal,
        }
    }

    pub fn with_archival(mut self, archival: Arc<dyn ArchivalService>) -> Self {
        self.archival = Some(archival);
        self
    }

    fn context<'a>(&'a self, repository: &'a str) -> StepContext<'a> {
        StepContext {
            repository,
            hosting: self.hosting.as_ref(),
            archival: self.archival.as_deref(),
            config: &self.config,
            principal: &self.principal,
        }
    }

    /// Why DOI issuance cannot run, if it cannot.
    fn doi_skip_reason(&self) -> Option<&'static str> {
        if !self.config.auto_doi {
            Some("auto_doi disabled")
        } else if !self.config.has_archival_credential() {
            Some("no archival credential configured")
        } else if self.archival.is_none() {
            Some("no archival client configured")
        } else {
            None
        }
    }

    /// Automate one repository. Never fails: errors end up on the result.
    pub async fn run(&self, repository: &str) -> AutomationResult {
        let span = obs::repo_span(self.hosting.owner(), repository);
        self.run_steps(repository).instrument(span).await
    }

    async fn run_steps(&self, repository: &str) -> AutomationResult {
        let started = Instant::now();
        let ctx = self.context(repository);
        let mut result = AutomationResult::new(repository, &self.config);

        obs::emit_automation_started(
            repository,
            self.config.automation_level.as_str(),
            self.config.branch_strategy.as_str(),
        );

        if self.run_mandatory(&ctx, &mut result).await {
            self.run_optional(&ctx, &mut result).await;

            let monitoring = steps::pipeline::monitoring(&ctx);
            record_soft(&mut result, StepKind::MonitoringAnalytics, monitoring);

            result.finish_success();
        }

        result.duration_ms = started.elapsed().as_millis() as u64;
        obs::emit_automation_finished(
            repository,
            result.duration_ms,
            result.completed_steps.len(),
            result.success,
        );
        result
    }

    /// Returns false as soon as one mandatory step fails.
    async fn run_mandatory(&self, ctx: &StepContext<'_>, result: &mut AutomationResult) -> bool {
        let outcome = steps::setup::run(ctx).await;
        if !record_mandatory(result, StepKind::Setup, outcome) {
            return false;
        }
        let outcome = steps::branches::run(ctx).await;
        if !record_mandatory(result, StepKind::BranchStrategy, outcome) {
            return false;
        }
        let outcome = steps::content::run(ctx).await;
        if !record_mandatory(result, StepKind::ContentGeneration, outcome) {
            return false;
        }
        let outcome = steps::pipeline::cicd(ctx, result);
        if !record_mandatory(result, StepKind::CicdPipeline, outcome) {
            return false;
        }
        let outcome = steps::pipeline::quality_gates(ctx);
        record_mandatory(result, StepKind::QualityGates, outcome)
    }

    async fn run_optional(&self, ctx: &StepContext<'_>, result: &mut AutomationResult) {
        match (self.doi_skip_reason(), ctx.archival) {
            (None, Some(archival)) => {
                let outcome = DoiIssuer::new(archival)
                    .issue(ctx)
                    .await
                    .map(StepReport::Doi);
                record_soft(result, StepKind::DoiIssuance, outcome);
            }
            (reason, _) => {
                skip(
                    result,
                    StepKind::DoiIssuance,
                    reason.unwrap_or("no archival client configured"),
                );
            }
        }

        if self.config.auto_pr {
            let outcome = PullRequestManager::open(ctx)
                .await
                .map(StepReport::PullRequest);
            record_soft(result, StepKind::AutomatedPr, outcome);
        } else {
            skip(result, StepKind::AutomatedPr, "auto_pr disabled");
        }

        if self.config.auto_release {
            let doi = result.doi.clone();
            let outcome = ReleaseManager::publish(ctx, doi.as_deref())
                .await
                .map(StepReport::Release);
            record_soft(result, StepKind::AutomatedRelease, outcome);
        } else {
            skip(result, StepKind::AutomatedRelease, "auto_release disabled");
        }
    }
}

fn record_mandatory(
    result: &mut AutomationResult,
    step: StepKind,
    outcome: Result<StepReport>,
) -> bool {
    match outcome {
        Ok(report) => {
            obs::emit_step_completed(&result.repository, step);
            result.record_completed(step, report);
            true
        }
        Err(e) => {
            obs::emit_step_failed(&result.repository, step, true, &e);
            result.record_fatal(step, &format!("{} failed: {}", step, e));
            false
        }
    }
}

fn record_soft(result: &mut AutomationResult, step: StepKind, outcome: Result<StepReport>) {
    match outcome {
        Ok(report) => {
            obs::emit_step_completed(&result.repository, step);
            result.record_completed(step, report);
        }
        Err(e) => {
            obs::emit_step_failed(&result.repository, step, false, &e);
            result.record_failed(step, &e.to_string());
        }
    }
}

fn skip(result: &mut AutomationResult, step: StepKind, reason: &str) {
    obs::emit_step_skipped(&result.repository, step, reason);
    result.record_skipped(step, reason);
}

/// Build an engine from configuration, validating it first.
pub fn build_engine(
    hosting: Arc<dyn HostingService>,
    archival: Option<Arc<dyn ArchivalService>>,
    config: AutomationConfig,
    principal: PrincipalInfo,
) -> Result<AutomationEngine> {
    config.validate()?;
    if config.auto_doi && config.has_archival_credential() && archival.is_none() {
        return Err(AutomationError::ArchivalNotConfigured);
    }
    let engine = AutomationEngine::new(hosting, config, principal);
    Ok(match archival {
        Some(archival) => engine.with_archival(archival),
        None => engine,
    })
}
