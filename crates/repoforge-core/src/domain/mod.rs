//! Domain models for repoforge.
//!
//! - `PrincipalInfo`: identity attached to generated artifacts and metadata
//! - `AutomationResult`: outcome of automating one repository
//! - `BatchStatus`: aggregate over a batch of repositories

pub mod error;
pub mod principal;
pub mod result;
pub mod status;

pub use error::{AutomationError, Result};
pub use principal::PrincipalInfo;
pub use result::{AutomationResult, StepKind, StepOutcome, StepReport, StepStatus};
pub use status::BatchStatus;
