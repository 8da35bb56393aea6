//! Per-repository automation result and step bookkeeping.

use std::fmt;

use forge_remote::{Deposition, PullRequest, Release, RepositoryInfo};
use serde::{Deserialize, Serialize};

use crate::branching::BranchStrategyPlan;
use crate::config::{AutomationConfig, AutomationLevel, BranchStrategy};

/// The fixed automation steps, in execution order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Setup,
    BranchStrategy,
    ContentGeneration,
    CicdPipeline,
    QualityGates,
    DoiIssuance,
    AutomatedPr,
    AutomatedRelease,
    MonitoringAnalytics,
}

impl StepKind {
    /// Steps whose failure aborts the remaining sequence.
    pub const MANDATORY: [StepKind; 5] = [
        StepKind::Setup,
        StepKind::BranchStrategy,
        StepKind::ContentGeneration,
        StepKind::CicdPipeline,
        StepKind::QualityGates,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            StepKind::Setup => "setup",
            StepKind::BranchStrategy => "branch_strategy",
            StepKind::ContentGeneration => "content_generation",
            StepKind::CicdPipeline => "cicd_pipeline",
            StepKind::QualityGates => "quality_gates",
            StepKind::DoiIssuance => "doi_issuance",
            StepKind::AutomatedPr => "automated_pr",
            StepKind::AutomatedRelease => "automated_release",
            StepKind::MonitoringAnalytics => "monitoring_analytics",
        }
    }

    pub fn is_mandatory(&self) -> bool {
        Self::MANDATORY.contains(self)
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a single step ended.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepStatus {
    Completed,
    Failed { reason: String },
    Skipped { reason: String },
}

/// Outcome of one step, kept in execution order on the result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StepOutcome {
    pub step: StepKind,
    #[serde(flatten)]
    pub status: StepStatus,
}

impl StepOutcome {
    pub fn passed(&self) -> bool {
        self.status == StepStatus::Completed
    }
}

/// Data produced by a successful step, folded into the result by the engine.
#[derive(Debug, Clone)]
pub enum StepReport {
    Setup {
        repository: RepositoryInfo,
        created: bool,
        protected: bool,
    },
    Branches {
        plan: BranchStrategyPlan,
        created: Vec<String>,
    },
    Content {
        published: Vec<String>,
    },
    /// Identifiers registered by bookkeeping steps (workflows, gates, monitors).
    Registered {
        items: Vec<String>,
    },
    Doi(Deposition),
    PullRequest(PullRequest),
    Release(Release),
}

/// Accumulated outcome of automating one repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutomationResult {
    pub repository: String,
    pub automation_level: AutomationLevel,
    pub branch_strategy: BranchStrategy,
    pub completed_steps: Vec<StepKind>,
    pub outcomes: Vec<StepOutcome>,
    pub artifacts_created: Vec<String>,
    pub branches_created: Vec<String>,
    pub urls_generated: Vec<String>,
    pub registered: Vec<String>,
    pub repository_url: Option<String>,
    pub doi: Option<String>,
    pub pull_request_number: Option<u64>,
    pub pull_request_url: Option<String>,
    pub release_tag: Option<String>,
    pub release_url: Option<String>,
    pub success: bool,
    pub error: Option<String>,
    pub duration_ms: u64,
}

impl AutomationResult {
    pub fn new(repository: &str, config: &AutomationConfig) -> Self {
        Self {
            repository: repository.to_string(),
            automation_level: config.automation_level,
            branch_strategy: config.branch_strategy,
            completed_steps: Vec::new(),
            outcomes: Vec::new(),
            artifacts_created: Vec::new(),
            branches_created: Vec::new(),
            urls_generated: Vec::new(),
            registered: Vec::new(),
            repository_url: None,
            doi: None,
            pull_request_number: None,
            pull_request_url: None,
            release_tag: None,
            release_url: None,
            success: false,
            error: None,
            duration_ms: 0,
        }
    }

    /// Completed step names in execution order.
    pub fn completed_step_names(&self) -> Vec<&'static str> {
        self.completed_steps.iter().map(|s| s.name()).collect()
    }

    pub fn outcome(&self, step: StepKind) -> Option<&StepOutcome> {
        self.outcomes.iter().find(|o| o.step == step)
    }

    pub fn is_completed(&self, step: StepKind) -> bool {
        self.completed_steps.contains(&step)
    }

    /// Record a completed step and fold its report into the result.
    pub fn record_completed(&mut self, step: StepKind, report: StepReport) {
        self.completed_steps.push(step);
        self.outcomes.push(StepOutcome {
            step,
            status: StepStatus::Completed,
        });

        match report {
            StepReport::Setup { repository, .. } => {
                self.repository_url = Some(repository.html_url);
            }
            StepReport::Branches { created, .. } => {
                self.artifacts_created.extend(created.iter().cloned());
                self.branches_created.extend(created);
            }
            StepReport::Content { published } => {
                self.artifacts_created.extend(published);
            }
            StepReport::Registered { items } => {
                self.registered.extend(items);
            }
            StepReport::Doi(deposition) => {
                self.doi = Some(deposition.doi);
            }
            StepReport::PullRequest(pr) => {
                self.pull_request_number = Some(pr.number);
                self.pull_request_url = Some(pr.html_url);
            }
            StepReport::Release(release) => {
                self.release_tag = Some(release.tag_name);
                self.release_url = Some(release.html_url);
            }
        }
    }

    /// Record a non-fatal failure; `success` and `error` are untouched.
    pub fn record_failed(&mut self, step: StepKind, reason: &str) {
        self.outcomes.push(StepOutcome {
            step,
            status: StepStatus::Failed {
                reason: reason.to_string(),
            },
        });
    }

    pub fn record_skipped(&mut self, step: StepKind, reason: &str) {
        self.outcomes.push(StepOutcome {
            step,
            status: StepStatus::Skipped {
                reason: reason.to_string(),
            },
        });
    }

    /// Record a mandatory-step failure: the run is over and unsuccessful.
    pub fn record_fatal(&mut self, step: StepKind, reason: &str) {
        self.record_failed(step, reason);
        self.success = false;
        self.error = Some(reason.to_string());
    }

    /// Mark the run successful and attach the repository links.
    pub fn finish_success(&mut self) {
        self.success = true;
        if let Some(url) = &self.repository_url {
            self.urls_generated = vec![
                url.clone(),
                format!("{}/actions", url),
                format!("{}/releases", url),
            ];
        }
    }

    /// Steps that ran and failed without aborting the run.
    pub fn soft_failures(&self) -> Vec<&StepOutcome> {
        self.outcomes
            .iter()
            .filter(|o| !o.step.is_mandatory() && matches!(o.status, StepStatus::Failed { .. }))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result() -> AutomationResult {
        AutomationResult::new("demo", &AutomationConfig::new("lab", "t"))
    }

    #[test]
    fn test_step_names_are_snake_case() {
        assert_eq!(StepKind::Setup.name(), "setup");
        assert_eq!(StepKind::CicdPipeline.name(), "cicd_pipeline");
        assert_eq!(
            serde_json::to_string(&StepKind::MonitoringAnalytics).unwrap(),
            "\"monitoring_analytics\""
        );
    }

    #[test]
    fn test_mandatory_classification() {
        assert!(StepKind::QualityGates.is_mandatory());
        assert!(!StepKind::DoiIssuance.is_mandatory());
        assert!(!StepKind::MonitoringAnalytics.is_mandatory());
    }

    #[test]
    fn test_fatal_failure_keeps_completed_steps() {
        let mut r = result();
        r.record_completed(
            StepKind::Setup,
            StepReport::Setup {
                repository: RepositoryInfo {
                    name: "demo".to_string(),
                    full_name: "lab/demo".to_string(),
                    html_url: "https://github.test/lab/demo".to_string(),
                    default_branch: None,
                },
                created: false,
                protected: true,
            },
        );
        r.record_fatal(StepKind::BranchStrategy, "no main");

        assert!(!r.success);
        assert_eq!(r.error.as_deref(), Some("no main"));
        assert_eq!(r.completed_step_names(), vec!["setup"]);
        assert!(!r.outcome(StepKind::BranchStrategy).unwrap().passed());
    }

    #[test]
    fn test_soft_failure_does_not_touch_error() {
        let mut r = result();
        r.record_failed(StepKind::AutomatedPr, "422");
        assert!(r.error.is_none());
        assert_eq!(r.soft_failures().len(), 1);
    }

    #[test]
    fn test_finish_success_generates_urls() {
        let mut r = result();
        r.repository_url = Some("https://github.test/lab/demo".to_string());
        r.finish_success();
        assert!(r.success);
        assert_eq!(r.urls_generated.len(), 3);
        assert!(r.urls_generated[1].ends_with("/actions"));
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let outcome = StepOutcome {
            step: StepKind::DoiIssuance,
            status: StepStatus::Skipped {
                reason: "no credential".to_string(),
            },
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["step"], "doi_issuance");
        assert_eq!(json["status"], "skipped");
        assert_eq!(json["reason"], "no credential");
    }
}
