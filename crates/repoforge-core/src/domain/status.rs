//! Aggregate status across a batch of repositories.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::result::AutomationResult;

/// Running totals for one batch invocation.
///
/// Created at process start and appended to once per repository; the final
/// report is rendered from it after the last repository.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BatchStatus {
    pub batch_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub repositories_processed: Vec<String>,
    pub dois_generated: Vec<String>,
    /// `repo:branch`
    pub branches_created: Vec<String>,
    /// `repo#number`
    pub prs_created: Vec<String>,
    /// `repo@tag`
    pub releases_published: Vec<String>,
    pub errors: Vec<(String, String)>,
}

impl Default for BatchStatus {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchStatus {
    pub fn new() -> Self {
        Self {
            batch_id: Uuid::new_v4(),
            started_at: Utc::now(),
            repositories_processed: Vec::new(),
            dois_generated: Vec::new(),
            branches_created: Vec::new(),
            prs_created: Vec::new(),
            releases_published: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Fold one repository's result into the totals.
    pub fn record(&mut self, result: &AutomationResult) {
        let repo = &result.repository;
        self.repositories_processed.push(repo.clone());

        if let Some(doi) = &result.doi {
            self.dois_generated.push(doi.clone());
        }
        self.branches_created.extend(
            result
                .branches_created
                .iter()
                .map(|b| format!("{}:{}", repo, b)),
        );
        if let Some(number) = result.pull_request_number {
            self.prs_created.push(format!("{}#{}", repo, number));
        }
        if let Some(tag) = &result.release_tag {
            self.releases_published.push(format!("{}@{}", repo, tag));
        }
        if let Some(error) = &result.error {
            self.errors.push((repo.clone(), error.clone()));
        }
    }

    pub fn failed_count(&self) -> usize {
        self.errors.len()
    }

    pub fn succeeded_count(&self) -> usize {
        self.repositories_processed.len() - self.errors.len()
    }

    pub fn has_failures(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Render the aggregate markdown report printed at the end of a batch.
    pub fn render_report(&self) -> String {
        let mut out = String::new();
        out.push_str("# Repository Automation Report\n\n");
        out.push_str(&format!("- batch: `{}`\n", self.batch_id));
        out.push_str(&format!(
            "- started: {}\n",
            self.started_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));
        out.push_str(&format!(
            "- repositories: {} processed, {} succeeded, {} failed\n",
            self.repositories_processed.len(),
            self.succeeded_count(),
            self.failed_count()
        ));
        out.push_str(&format!(
            "- DOIs: {}\n- branches: {}\n- pull requests: {}\n- releases: {}\n",
            self.dois_generated.len(),
            self.branches_created.len(),
            self.prs_created.len(),
            self.releases_published.len()
        ));

        push_section(&mut out, "DOIs", &self.dois_generated);
        push_section(&mut out, "Branches", &self.branches_created);
        push_section(&mut out, "Pull Requests", &self.prs_created);
        push_section(&mut out, "Releases", &self.releases_published);

        if !self.errors.is_empty() {
            out.push_str("\n## Errors\n");
            for (repo, error) in &self.errors {
                out.push_str(&format!("- `{}`: {}\n", repo, error));
            }
        }
        out
    }
}

fn push_section(out: &mut String, title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    out.push_str(&format!("\n## {}\n", title));
    for item in items {
        out.push_str(&format!("- `{}`\n", item));
    }
}
