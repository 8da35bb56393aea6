//! repoforge core library
//!
//! Orchestrates the automated setup of research-code repositories: branch
//! layout, generated content, DOI issuance, pull requests and releases.

pub mod batch;
pub mod branching;
pub mod config;
pub mod domain;
pub mod engine;
pub mod obs;
pub mod publisher;
pub mod steps;
pub mod telemetry;
pub mod templates;
pub mod versioning;

pub use batch::{BatchOutcome, BatchRunner};
pub use branching::{resolve as resolve_branch_strategy, BranchStrategyPlan};
pub use config::{AutomationConfig, AutomationLevel, BranchStrategy, ConfigFile};
pub use domain::{
    AutomationError, AutomationResult, BatchStatus, PrincipalInfo, Result, StepKind, StepOutcome,
    StepReport, StepStatus,
};
pub use engine::{build_engine, AutomationEngine};
pub use publisher::{Artifact, ArtifactPublisher, PublishKind, Published};
pub use telemetry::init_tracing;
pub use versioning::{next_tag, release_tag, VersionTag, INITIAL_RELEASE};
