//! Sequential batch driver.

use serde::Serialize;
use tracing::{info, warn};

use crate::domain::{AutomationResult, BatchStatus};
use crate::engine::AutomationEngine;

/// Results of a batch, in input order, plus the aggregate status.
#[derive(Debug, Clone, Serialize)]
pub struct BatchOutcome {
    pub status: BatchStatus,
    pub results: Vec<AutomationResult>,
}

impl BatchOutcome {
    pub fn all_succeeded(&self) -> bool {
        self.results.iter().all(|r| r.success)
    }
}

pub struct BatchRunner<'a> {
    engine: &'a AutomationEngine,
}

impl<'a> BatchRunner<'a> {
    pub fn new(engine: &'a AutomationEngine) -> Self {
        Self { engine }
    }

    /// Automate each repository in turn. A failed repository is recorded and
    /// the batch carries on with the next one.
    pub async fn run<S: AsRef<str>>(&self, repositories: &[S]) -> BatchOutcome {
        let mut status = BatchStatus::new();
        let mut results = Vec::with_capacity(repositories.len());

        info!(batch_id = %status.batch_id, repositories = repositories.len(), "batch started");
        for repo in repositories {
            let result = self.engine.run(repo.as_ref()).await;
            if let Some(error) = &result.error {
                warn!(
                    repository = %result.repository,
                    error = %error,
                    "repository automation failed"
                );
            }
            status.record(&result);
            results.push(result);
        }
        info!(
            batch_id = %status.batch_id,
            succeeded = status.succeeded_count(),
            failed = status.failed_count(),
            "batch finished"
        );

        BatchOutcome { status, results }
    }
}
