//! Automation configuration.
//!
//! [`AutomationConfig`] is built once per process (from a TOML file, CLI flags
//! and environment credentials) and never mutated afterwards.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::error::{AutomationError, Result};
use crate::domain::principal::PrincipalInfo;

/// Intensity tier controlling optional behaviour and version increments.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AutomationLevel {
    Basic,
    Professional,
    #[default]
    ResearchGrade,
    Enterprise,
}

impl AutomationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AutomationLevel::Basic => "basic",
            AutomationLevel::Professional => "professional",
            AutomationLevel::ResearchGrade => "research_grade",
            AutomationLevel::Enterprise => "enterprise",
        }
    }
}

impl fmt::Display for AutomationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AutomationLevel {
    type Err = AutomationError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "basic" => Ok(AutomationLevel::Basic),
            "professional" => Ok(AutomationLevel::Professional),
            "research_grade" => Ok(AutomationLevel::ResearchGrade),
            "enterprise" => Ok(AutomationLevel::Enterprise),
            other => Err(AutomationError::Config(format!(
                "unknown automation level '{}'",
                other
            ))),
        }
    }
}

/// Named branching policy.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BranchStrategy {
    Gitflow,
    GithubFlow,
    #[default]
    ResearchFlow,
}

impl BranchStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            BranchStrategy::Gitflow => "gitflow",
            BranchStrategy::GithubFlow => "github_flow",
            BranchStrategy::ResearchFlow => "research_flow",
        }
    }
}

impl fmt::Display for BranchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BranchStrategy {
    type Err = AutomationError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "gitflow" | "git_flow" => Ok(BranchStrategy::Gitflow),
            "github_flow" => Ok(BranchStrategy::GithubFlow),
            "research_flow" => Ok(BranchStrategy::ResearchFlow),
            other => Err(AutomationError::Config(format!(
                "unknown branch strategy '{}'",
                other
            ))),
        }
    }
}

/// Immutable per-run automation settings.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AutomationConfig {
    /// Hosting service credential (required).
    #[serde(skip_serializing)]
    pub hosting_token: String,
    /// Archival service credential; DOI issuance is skipped without it.
    #[serde(skip_serializing)]
    pub archival_token: Option<String>,
    /// User that owns the automated repositories.
    pub owner: String,
    pub automation_level: AutomationLevel,
    pub branch_strategy: BranchStrategy,
    pub auto_release: bool,
    pub auto_doi: bool,
    pub auto_pr: bool,
    pub semantic_versioning: bool,
    pub quality_gates: bool,
}

impl Default for AutomationConfig {
    fn default() -> Self {
        Self {
            hosting_token: String::new(),
            archival_token: None,
            owner: String::new(),
            automation_level: AutomationLevel::default(),
            branch_strategy: BranchStrategy::default(),
            auto_release: true,
            auto_doi: true,
            auto_pr: true,
            semantic_versioning: true,
            quality_gates: true,
        }
    }
}

impl fmt::Debug for AutomationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AutomationConfig")
            .field("hosting_token", &"<redacted>")
            .field(
                "archival_token",
                &self.archival_token.as_ref().map(|_| "<redacted>"),
            )
            .field("owner", &self.owner)
            .field("automation_level", &self.automation_level)
            .field("branch_strategy", &self.branch_strategy)
            .field("auto_release", &self.auto_release)
            .field("auto_doi", &self.auto_doi)
            .field("auto_pr", &self.auto_pr)
            .field("semantic_versioning", &self.semantic_versioning)
            .field("quality_gates", &self.quality_gates)
            .finish()
    }
}

impl AutomationConfig {
    pub fn new(owner: &str, hosting_token: &str) -> Self {
        Self {
            owner: owner.to_string(),
            hosting_token: hosting_token.to_string(),
            ..Default::default()
        }
    }

    pub fn with_archival_token(mut self, token: &str) -> Self {
        self.archival_token = Some(token.to_string());
        self
    }

    /// True when an archival credential is present and non-empty.
    pub fn has_archival_credential(&self) -> bool {
        self.archival_token
            .as_deref()
            .map(|t| !t.trim().is_empty())
            .unwrap_or(false)
    }

    /// Reject configurations the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.hosting_token.trim().is_empty() {
            return Err(AutomationError::Config(
                "hosting token is required".to_string(),
            ));
        }
        if self.owner.trim().is_empty() {
            return Err(AutomationError::Config(
                "repository owner is required".to_string(),
            ));
        }
        Ok(())
    }
}

/// On-disk configuration: automation settings plus the principal identity.
///
/// ```toml
/// owner = "octo-lab"
/// automation_level = "professional"
/// branch_strategy = "github_flow"
/// auto_doi = false
///
/// [principal]
/// name = "Ada Lovelace"
/// institution = "Analytical Engines Ltd"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ConfigFile {
    #[serde(flatten)]
    pub automation: AutomationConfig,
    pub principal: PrincipalInfo,
}

impl ConfigFile {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| AutomationError::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_follow_research_profile() {
        let config = AutomationConfig::default();
        assert_eq!(config.automation_level, AutomationLevel::ResearchGrade);
        assert_eq!(config.branch_strategy, BranchStrategy::ResearchFlow);
        assert!(config.auto_release && config.auto_doi && config.auto_pr);
        assert!(config.semantic_versioning && config.quality_gates);
    }

    #[test]
    fn test_level_from_str_accepts_dashes_and_case() {
        assert_eq!(
            "Research-Grade".parse::<AutomationLevel>().unwrap(),
            AutomationLevel::ResearchGrade
        );
        assert_eq!(
            "basic".parse::<AutomationLevel>().unwrap(),
            AutomationLevel::Basic
        );
        assert!("ultra".parse::<AutomationLevel>().is_err());
    }

    #[test]
    fn test_strategy_from_str() {
        assert_eq!(
            "github-flow".parse::<BranchStrategy>().unwrap(),
            BranchStrategy::GithubFlow
        );
        assert_eq!(
            "gitflow".parse::<BranchStrategy>().unwrap(),
            BranchStrategy::Gitflow
        );
        assert!("trunk".parse::<BranchStrategy>().is_err());
    }

    #[test]
    fn test_debug_redacts_credentials() {
        let config = AutomationConfig::new("lab", "ghp_secret").with_archival_token("zen_secret");
        let printed = format!("{:?}", config);
        assert!(!printed.contains("ghp_secret"));
        assert!(!printed.contains("zen_secret"));
    }

    #[test]
    fn test_archival_credential_must_be_non_empty() {
        let config = AutomationConfig::new("lab", "t").with_archival_token("  ");
        assert!(!config.has_archival_credential());
        assert!(AutomationConfig::new("lab", "t")
            .with_archival_token("z")
            .has_archival_credential());
    }

    #[test]
    fn test_validate_requires_token_and_owner() {
        assert!(AutomationConfig::new("lab", "").validate().is_err());
        assert!(AutomationConfig::new("", "t").validate().is_err());
        assert!(AutomationConfig::new("lab", "t").validate().is_ok());
    }

    #[test]
    fn test_config_file_from_toml() {
        let raw = r#"
            owner = "octo-lab"
            automation_level = "basic"
            branch_strategy = "github_flow"
            auto_doi = false

            [principal]
            name = "Ada Lovelace"
            orcid = "0000-0002-1825-0097"
        "#;
        let file = ConfigFile::from_toml_str(raw).unwrap();
        assert_eq!(file.automation.owner, "octo-lab");
        assert_eq!(file.automation.automation_level, AutomationLevel::Basic);
        assert_eq!(file.automation.branch_strategy, BranchStrategy::GithubFlow);
        assert!(!file.automation.auto_doi);
        assert!(file.automation.auto_pr);
        assert_eq!(file.principal.name, "Ada Lovelace");
    }

    #[test]
    fn test_config_file_rejects_unknown_level() {
        let err = ConfigFile::from_toml_str("automation_level = \"mega\"").unwrap_err();
        assert!(matches!(err, AutomationError::Config(_)));
    }

    #[test]
    fn test_config_file_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("repoforge.toml");
        std::fs::write(&path, "owner = \"lab\"\nauto_pr = false\n").unwrap();

        let file = ConfigFile::load(&path).unwrap();
        assert_eq!(file.automation.owner, "lab");
        assert!(!file.automation.auto_pr);
        assert_eq!(file.principal, PrincipalInfo::default());
    }
}
