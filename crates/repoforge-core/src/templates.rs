//! Rendering of generated repository content.
//!
//! Every artifact is a pure function of a [`RenderContext`]. Structured files
//! (`CITATION.cff`, `.automation/config.yml`) go through `serde_yaml`; the
//! markdown and workflow bodies are plain text.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::branching::{CONTENT_BRANCH, MANUSCRIPT_BRANCH};
use crate::config::AutomationConfig;
use crate::domain::error::{AutomationError, Result};
use crate::domain::principal::PrincipalInfo;
use crate::publisher::Artifact;

pub const WORKFLOW_FULL_AUTOMATION: &str = "full_automation.yml";
pub const WORKFLOW_RELEASE: &str = "automated_release.yml";
pub const WORKFLOW_QUALITY: &str = "quality_assurance.yml";

/// Workflow identifiers registered by the CI pipeline step, in order.
pub const WORKFLOWS: [&str; 3] = [WORKFLOW_FULL_AUTOMATION, WORKFLOW_RELEASE, WORKFLOW_QUALITY];

/// Repository-relative path of a workflow file.
pub fn workflow_path(workflow: &str) -> String {
    format!(".github/workflows/{}", workflow)
}

const LICENSE: &str = "CC-BY-4.0";
const CITATION_VERSION: &str = "1.0.0";

/// Everything a template may interpolate.
#[derive(Debug, Clone)]
pub struct RenderContext<'a> {
    pub repository: &'a str,
    pub owner: &'a str,
    pub repository_url: String,
    pub config: &'a AutomationConfig,
    pub principal: &'a PrincipalInfo,
    pub generated_at: DateTime<Utc>,
}

impl<'a> RenderContext<'a> {
    pub fn new(
        repository: &'a str,
        repository_url: String,
        config: &'a AutomationConfig,
        principal: &'a PrincipalInfo,
    ) -> Self {
        Self {
            repository,
            owner: &config.owner,
            repository_url,
            config,
            principal,
            generated_at: Utc::now(),
        }
    }

    /// Pin the timestamp, for reproducible output.
    pub fn at(mut self, generated_at: DateTime<Utc>) -> Self {
        self.generated_at = generated_at;
        self
    }

    pub fn date(&self) -> NaiveDate {
        self.generated_at.date_naive()
    }

    fn keywords(&self) -> Vec<String> {
        vec![
            "research software".to_string(),
            "automation".to_string(),
            "reproducibility".to_string(),
            self.owner.to_string(),
        ]
    }
}

/// `research_grade` -> `Research Grade`.
fn title_case(value: &str) -> String {
    value
        .split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn enabled(flag: bool) -> &'static str {
    if flag {
        "Enabled"
    } else {
        "Disabled"
    }
}

fn principal_block(principal: &PrincipalInfo) -> String {
    let mut out = format!("**{}**  \n", principal.display_name());
    if !principal.title.is_empty() {
        out.push_str(&format!("{}  \n", principal.title));
    }
    if !principal.institution.is_empty() {
        out.push_str(&format!("{}  \n", principal.institution));
    }
    if !principal.email.is_empty() {
        out.push_str(&format!(
            "Email: [{0}](mailto:{0})  \n",
            principal.email
        ));
    }
    if let Some(url) = principal.orcid_url() {
        out.push_str(&format!("ORCID: [{0}]({0})  \n", url));
    }
    out
}

fn to_yaml<T: Serialize>(artifact: &str, value: &T) -> Result<String> {
    serde_yaml::to_string(value).map_err(|e| AutomationError::Render {
        artifact: artifact.to_string(),
        reason: e.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Markdown documents
// ---------------------------------------------------------------------------

pub fn readme(ctx: &RenderContext<'_>) -> String {
    let config = ctx.config;
    let mut out = format!(
        "# {repo}\n\n\
         [![Automation](https://img.shields.io/badge/automation-{level}-brightgreen.svg)]({url}/actions)\n\
         [![Releases](https://img.shields.io/badge/releases-automated-blue.svg)]({url}/releases)\n\n\
         Research code repository maintained by an automated pipeline: generated\n\
         documentation, continuous integration, quality gates, persistent identifiers\n\
         and semantically versioned releases.\n\n\
         - **Principal investigator:** {pi}\n\
         - **Institution:** {institution}\n\
         - **Automation level:** {level_title}\n\
         - **Branch strategy:** {strategy_title}\n\n",
        repo = ctx.repository,
        url = ctx.repository_url,
        level = config.automation_level.as_str().replace('_', "--"),
        pi = ctx.principal.display_name(),
        institution = ctx.principal.institution,
        level_title = title_case(config.automation_level.as_str()),
        strategy_title = title_case(config.branch_strategy.as_str()),
    );

    out.push_str("## Branches\n\n");
    out.push_str("| Branch | Purpose |\n|--------|---------|\n");
    out.push_str("| `main` | Released, protected code |\n");
    out.push_str("| `develop` | Integration of generated content and ongoing work |\n");
    out.push_str("| `research/enhancement` | Exploratory research changes |\n");
    out.push_str("| `manuscript/auto-generation` | Manuscript drafts |\n\n");

    out.push_str("## Workflows\n\n");
    out.push_str(&format!(
        "1. `{}`: validation, content checks and release triggers\n",
        WORKFLOW_FULL_AUTOMATION
    ));
    out.push_str(&format!(
        "2. `{}`: semantic version tags and release notes\n",
        WORKFLOW_RELEASE
    ));
    out.push_str(&format!(
        "3. `{}`: code quality, documentation completeness, research integrity, security scan\n\n",
        WORKFLOW_QUALITY
    ));

    out.push_str("## Features\n\n");
    out.push_str(&format!(
        "| Feature | Status |\n|---------|--------|\n\
         | Automated releases | {} |\n\
         | DOI issuance | {} |\n\
         | Automated pull requests | {} |\n\
         | Semantic versioning | {} |\n\
         | Quality gates | {} |\n\n",
        enabled(config.auto_release),
        enabled(config.auto_doi),
        enabled(config.auto_pr),
        enabled(config.semantic_versioning),
        enabled(config.quality_gates),
    ));

    out.push_str("## Principal Investigator\n\n");
    out.push_str(&principal_block(ctx.principal));
    out.push_str("\n## Citation\n\n");
    out.push_str("See [`CITATION.cff`](CITATION.cff) for citation metadata.\n\n");
    out.push_str(&format!(
        "---\n\n*Generated on {} by repoforge.*\n",
        ctx.date()
    ));
    out
}

pub fn manuscript(ctx: &RenderContext<'_>) -> String {
    let principal = ctx.principal;
    format!(
        "# Automated Research Pipeline: {repo}\n\n\
         ## Abstract\n\n\
         This manuscript describes the automated pipeline maintaining the research\n\
         repository \"{repo}\". Continuous integration, quality gates and\n\
         persistent identifiers are combined to make the published code reproducible\n\
         and citable.\n\n\
         **Keywords:** {keywords}\n\n\
         ---\n\n\
         ## Authors and Affiliations\n\n\
         {authors}\n\
         ---\n\n\
         ## Introduction\n\n\
         Research code is easier to trust when its history, checks and releases are\n\
         produced the same way every time. This repository follows the\n\
         `{strategy}` branching model with `{level}` automation.\n\n\
         ## Methods\n\n\
         ### Pipeline\n\n\
         1. Repository setup and protection of `main`\n\
         2. Branch layout and working branches\n\
         3. Generated documentation, citation metadata and workflows\n\
         4. Quality gates on every pull request\n\
         5. DOI reservation and semantically versioned releases\n\n\
         ## Results\n\n\
         _To be completed by the authors._\n\n\
         ## Discussion\n\n\
         _To be completed by the authors._\n\n\
         ## Data Availability\n\n\
         Source code: {url}\n\n\
         ---\n\n\
         *Draft generated on {date}.*\n",
        repo = ctx.repository,
        keywords = ctx.keywords().join(", "),
        authors = principal_block(principal),
        strategy = ctx.config.branch_strategy,
        level = ctx.config.automation_level,
        url = ctx.repository_url,
        date = ctx.date(),
    )
}

pub fn data_management(ctx: &RenderContext<'_>) -> String {
    let principal = ctx.principal;
    format!(
        "# Research Data Management Plan\n\n\
         ## {repo}\n\n\
         - **Principal investigator:** {pi}\n\
         - **Institution:** {institution}\n\
         - **Generated:** {date}\n\
         - **Automation level:** {level}\n\n\
         ---\n\n\
         ## 1. Data Types\n\n\
         - Research code with automated validation\n\
         - Documentation in Markdown\n\
         - Manuscript drafts under version control\n\
         - Citation and archival metadata\n\
         - Workflow configuration\n\n\
         ## 2. Quality Control\n\n\
         Every change to `main` passes the quality gates defined in\n\
         `{qa}`: code quality, documentation completeness,\n\
         research integrity and a security scan.\n\n\
         ## 3. Preservation and Sharing\n\n\
         Releases are archived with a persistent identifier (DOI issuance: {doi}).\n\
         Content is licensed under {license}.\n\n\
         ## 4. Responsibilities\n\n\
         Data stewardship: {pi}{contact}.\n",
        repo = ctx.repository,
        pi = principal.display_name(),
        institution = principal.institution,
        date = ctx.date(),
        level = title_case(ctx.config.automation_level.as_str()),
        qa = workflow_path(WORKFLOW_QUALITY),
        doi = enabled(ctx.config.auto_doi),
        license = LICENSE,
        contact = if principal.email.is_empty() {
            String::new()
        } else {
            format!(" ({})", principal.email)
        },
    )
}

// ---------------------------------------------------------------------------
// Structured files
// ---------------------------------------------------------------------------

#[derive(Serialize)]
#[serde(rename_all = "kebab-case")]
struct CitationAuthor {
    family_names: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    given_names: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    affiliation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    orcid: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "kebab-case")]
struct Citation {
    cff_version: &'static str,
    message: String,
    title: String,
    #[serde(rename = "type")]
    kind: &'static str,
    authors: Vec<CitationAuthor>,
    keywords: Vec<String>,
    license: &'static str,
    repository_code: String,
    date_released: String,
    version: &'static str,
    #[serde(rename = "abstract")]
    summary: String,
}

fn non_empty(value: &str) -> Option<String> {
    (!value.trim().is_empty()).then(|| value.to_string())
}

pub fn citation(ctx: &RenderContext<'_>) -> Result<String> {
    let principal = ctx.principal;
    let (family_names, given_names) = principal.split_name();
    let citation = Citation {
        cff_version: "1.2.0",
        message: "If you use this software, please cite it using these metadata.".to_string(),
        title: format!("{}: automated research pipeline", ctx.repository),
        kind: "software",
        authors: vec![CitationAuthor {
            family_names,
            given_names,
            email: non_empty(&principal.email),
            affiliation: non_empty(&principal.institution),
            orcid: principal.orcid_url(),
        }],
        keywords: ctx.keywords(),
        license: LICENSE,
        repository_code: ctx.repository_url.clone(),
        date_released: ctx.date().to_string(),
        version: CITATION_VERSION,
        summary: format!(
            "Research code repository {} maintained by {}.",
            ctx.repository,
            principal.display_name()
        ),
    };
    to_yaml("CITATION.cff", &citation)
}

#[derive(Serialize)]
struct AutomationSection<'a> {
    level: &'a str,
    branch_strategy: &'a str,
    auto_release: bool,
    auto_doi: bool,
    auto_pr: bool,
    semantic_versioning: bool,
    quality_gates: bool,
}

#[derive(Serialize)]
struct ResearchSection<'a> {
    principal_investigator: &'a PrincipalInfo,
}

#[derive(Serialize)]
struct RepositorySection<'a> {
    name: &'a str,
    owner: &'a str,
    automation_enabled: bool,
    last_updated: String,
}

#[derive(Serialize)]
struct AutomationFile<'a> {
    automation: AutomationSection<'a>,
    research: ResearchSection<'a>,
    repository: RepositorySection<'a>,
}

pub fn automation_config(ctx: &RenderContext<'_>) -> Result<String> {
    let config = ctx.config;
    let file = AutomationFile {
        automation: AutomationSection {
            level: config.automation_level.as_str(),
            branch_strategy: config.branch_strategy.as_str(),
            auto_release: config.auto_release,
            auto_doi: config.auto_doi,
            auto_pr: config.auto_pr,
            semantic_versioning: config.semantic_versioning,
            quality_gates: config.quality_gates,
        },
        research: ResearchSection {
            principal_investigator: ctx.principal,
        },
        repository: RepositorySection {
            name: ctx.repository,
            owner: ctx.owner,
            automation_enabled: true,
            last_updated: ctx.generated_at.to_rfc3339(),
        },
    };
    to_yaml(".automation/config.yml", &file)
}

// ---------------------------------------------------------------------------
// Workflows
// ---------------------------------------------------------------------------

fn workflow_env(ctx: &RenderContext<'_>) -> String {
    format!(
        "env:\n  \
           REPO_NAME: \"{}\"\n  \
           REPO_OWNER: \"{}\"\n  \
           PI_NAME: \"{}\"\n  \
           AUTOMATION_LEVEL: \"{}\"\n  \
           BRANCH_STRATEGY: \"{}\"\n\n",
        ctx.repository,
        ctx.owner,
        ctx.principal.name.replace('"', "'"),
        ctx.config.automation_level,
        ctx.config.branch_strategy,
    )
}

const FULL_AUTOMATION_JOBS: &str = r#"jobs:
  automation-init:
    name: Automation initialization
    runs-on: ubuntu-latest
    outputs:
      should_release: ${{ steps.config.outputs.should_release }}
    steps:
      - uses: actions/checkout@v4
        with:
          fetch-depth: 0
      - name: Configure automation
        id: config
        run: |
          should_release="false"
          if [[ "${{ github.ref }}" == "refs/heads/main" && "${{ github.event_name }}" == "push" ]]; then
            should_release="true"
          fi
          echo "should_release=$should_release" >> "$GITHUB_OUTPUT"

  continuous-integration:
    name: continuous-integration
    runs-on: ubuntu-latest
    needs: automation-init
    steps:
      - uses: actions/checkout@v4
      - name: Validate repository layout
        run: |
          for f in README.md CITATION.cff; do
            test -f "$f" || { echo "missing $f"; exit 1; }
          done
      - name: Validate YAML
        run: |
          pip install yamllint
          yamllint -d relaxed .github/workflows CITATION.cff

  content-check:
    name: Content check
    runs-on: ubuntu-latest
    needs: continuous-integration
    steps:
      - uses: actions/checkout@v4
      - name: Principal investigator metadata present
        run: grep -q "$PI_NAME" README.md CITATION.cff
"#;

pub fn full_automation_workflow(ctx: &RenderContext<'_>) -> String {
    let mut out = String::from(
        "name: Full automation pipeline\n\n\
         on:\n  \
           push:\n    branches: [main, develop, 'research/**', 'manuscript/**']\n  \
           pull_request:\n    branches: [main, develop]\n  \
           schedule:\n    - cron: '0 2 * * *'\n  \
           workflow_dispatch:\n\n",
    );
    out.push_str(&workflow_env(ctx));
    out.push_str(FULL_AUTOMATION_JOBS);
    out
}

const RELEASE_JOBS: &str = r#"jobs:
  release:
    name: Automated release
    runs-on: ubuntu-latest
    permissions:
      contents: write
    steps:
      - uses: actions/checkout@v4
        with:
          fetch-depth: 0
      - name: Compute next version
        id: version
        run: |
          current=$(git describe --tags --abbrev=0 2>/dev/null | sed 's/^v//' || true)
          current=${current:-0.0.0}
          case "$AUTOMATION_LEVEL" in
            basic) next=$(echo "$current" | awk -F. '{$3 = $3 + 1} 1' OFS=.) ;;
            *)     next=$(echo "$current" | awk -F. '{$2 = $2 + 1; $3 = 0} 1' OFS=.) ;;
          esac
          echo "tag=v$next" >> "$GITHUB_OUTPUT"
      - name: Create release
        env:
          GH_TOKEN: ${{ secrets.GITHUB_TOKEN }}
        run: |
          gh release create "${{ steps.version.outputs.tag }}" \
            --target main \
            --title "$REPO_NAME ${{ steps.version.outputs.tag }}" \
            --generate-notes
"#;

pub fn release_workflow(ctx: &RenderContext<'_>) -> String {
    let mut out = String::from(
        "name: Automated release\n\n\
         on:\n  \
           push:\n    branches: [main]\n  \
           workflow_dispatch:\n\n",
    );
    out.push_str(&workflow_env(ctx));
    out.push_str(RELEASE_JOBS);
    out
}

const QUALITY_JOBS: &str = r#"jobs:
  quality-assurance:
    name: quality-assurance
    runs-on: ubuntu-latest
    steps:
      - uses: actions/checkout@v4
      - name: Code quality
        run: |
          pip install flake8
          flake8 . --count --select=E9,F63,F7,F82 --show-source --statistics || true
      - name: Documentation completeness
        run: |
          for f in README.md CITATION.cff DATA_MANAGEMENT.md; do
            test -f "$f" || { echo "missing $f"; exit 1; }
          done
      - name: Research integrity
        run: grep -q "cff-version" CITATION.cff
      - name: Security scan
        run: |
          pip install bandit
          bandit -r . -q || true
"#;

pub fn quality_workflow(ctx: &RenderContext<'_>) -> String {
    let mut out = String::from(
        "name: Quality assurance\n\n\
         on:\n  \
           pull_request:\n    branches: [main, develop]\n  \
           workflow_dispatch:\n\n",
    );
    out.push_str(&workflow_env(ctx));
    out.push_str(QUALITY_JOBS);
    out
}

// ---------------------------------------------------------------------------
// Pull request and release text
// ---------------------------------------------------------------------------

pub fn pull_request_title(ctx: &RenderContext<'_>) -> String {
    format!("Automated enhancement: {} research pipeline", ctx.repository)
}

pub fn pull_request_body(ctx: &RenderContext<'_>) -> String {
    let config = ctx.config;
    format!(
        "# Automated research pipeline\n\n\
         This pull request merges the generated documentation, citation metadata and\n\
         workflows from `develop` into `main`.\n\n\
         ## Principal investigator\n\n\
         {pi}\n\
         ## Configuration\n\n\
         - **Automation level:** {level}\n\
         - **Branch strategy:** {strategy}\n\
         - **Quality gates:** {gates}\n\
         - **DOI issuance:** {doi}\n\
         - **Semantic versioning:** {semver}\n\n\
         ## Review checklist\n\n\
         1. Review the generated documentation and workflows\n\
         2. Confirm the quality checks pass\n\
         3. Verify the research team information\n\
         4. Approve and merge to activate the pipeline\n",
        pi = principal_block(ctx.principal),
        level = config.automation_level,
        strategy = config.branch_strategy,
        gates = enabled(config.quality_gates),
        doi = enabled(config.auto_doi),
        semver = enabled(config.semantic_versioning),
    )
}

pub fn release_name(ctx: &RenderContext<'_>, tag: &str) -> String {
    format!("{} {}", ctx.repository, tag)
}

pub fn release_body(ctx: &RenderContext<'_>, tag: &str, doi: Option<&str>) -> String {
    let principal = ctx.principal;
    let mut out = format!(
        "# {} {}\n\n\
         - **Principal investigator:** {}\n\
         - **Institution:** {}\n\
         - **Released:** {}\n\n\
         ## Links\n\n\
         - Repository: {}\n",
        ctx.repository,
        tag,
        principal.display_name(),
        principal.institution,
        ctx.date(),
        ctx.repository_url,
    );
    if let Some(url) = principal.orcid_url() {
        out.push_str(&format!("- ORCID: {}\n", url));
    }
    if let Some(doi) = doi {
        out.push_str(&format!("- DOI: https://doi.org/{}\n", doi));
    }
    out.push_str("\n*Automatically generated release.*\n");
    out
}

// ---------------------------------------------------------------------------
// Artifact set
// ---------------------------------------------------------------------------

/// Render the full set of generated files, in publication order.
pub fn render_artifacts(ctx: &RenderContext<'_>) -> Result<Vec<Artifact>> {
    let on_develop = |path: &str, message: &str, content: String| Artifact {
        branch: CONTENT_BRANCH.to_string(),
        path: path.to_string(),
        message: message.to_string(),
        content,
    };

    Ok(vec![
        on_develop("README.md", "docs: generate README", readme(ctx)),
        on_develop("CITATION.cff", "docs: generate citation metadata", citation(ctx)?),
        on_develop(
            &workflow_path(WORKFLOW_FULL_AUTOMATION),
            "ci: add full automation workflow",
            full_automation_workflow(ctx),
        ),
        on_develop(
            &workflow_path(WORKFLOW_RELEASE),
            "ci: add automated release workflow",
            release_workflow(ctx),
        ),
        on_develop(
            &workflow_path(WORKFLOW_QUALITY),
            "ci: add quality assurance workflow",
            quality_workflow(ctx),
        ),
        on_develop(
            "DATA_MANAGEMENT.md",
            "docs: generate data management plan",
            data_management(ctx),
        ),
        on_develop(
            ".automation/config.yml",
            "chore: record automation configuration",
            automation_config(ctx)?,
        ),
        Artifact {
            branch: MANUSCRIPT_BRANCH.to_string(),
            path: "MANUSCRIPT.md".to_string(),
            message: "docs: generate manuscript draft".to_string(),
            content: manuscript(ctx),
        },
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AutomationLevel, BranchStrategy};
    use chrono::TimeZone;

    fn principal() -> PrincipalInfo {
        PrincipalInfo {
            name: "Ada Lovelace".to_string(),
            credentials: "PhD".to_string(),
            title: "Principal Investigator".to_string(),
            institution: "Analytical Engines Ltd".to_string(),
            email: "ada@example.org".to_string(),
            orcid: Some("0000-0002-1825-0097".to_string()),
        }
    }

    fn config() -> AutomationConfig {
        let mut config = AutomationConfig::new("lab", "t");
        config.automation_level = AutomationLevel::Professional;
        config.branch_strategy = BranchStrategy::Gitflow;
        config.auto_doi = false;
        config
    }

    fn ctx<'a>(config: &'a AutomationConfig, principal: &'a PrincipalInfo) -> RenderContext<'a> {
        RenderContext::new(
            "demo",
            "https://github.test/lab/demo".to_string(),
            config,
            principal,
        )
        .at(Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap())
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("research_grade"), "Research Grade");
        assert_eq!(title_case("gitflow"), "Gitflow");
    }

    #[test]
    fn test_readme_mentions_principal_and_settings() {
        let (config, principal) = (config(), principal());
        let readme = readme(&ctx(&config, &principal));
        assert!(readme.starts_with("# demo\n"));
        assert!(readme.contains("Ada Lovelace, PhD"));
        assert!(readme.contains("**Automation level:** Professional"));
        assert!(readme.contains("| DOI issuance | Disabled |"));
        assert!(readme.contains("https://orcid.org/0000-0002-1825-0097"));
    }

    #[test]
    fn test_citation_is_valid_cff_yaml() {
        let (config, principal) = (config(), principal());
        let raw = citation(&ctx(&config, &principal)).unwrap();
        let doc: serde_yaml::Value = serde_yaml::from_str(&raw).unwrap();

        assert_eq!(doc["cff-version"].as_str(), Some("1.2.0"));
        assert_eq!(doc["type"].as_str(), Some("software"));
        assert_eq!(doc["date-released"].as_str(), Some("2025-03-14"));
        assert_eq!(doc["authors"][0]["family-names"].as_str(), Some("Lovelace"));
        assert_eq!(doc["authors"][0]["given-names"].as_str(), Some("Ada"));
        assert_eq!(
            doc["repository-code"].as_str(),
            Some("https://github.test/lab/demo")
        );
    }

    #[test]
    fn test_citation_omits_missing_contact_fields() {
        let config = config();
        let principal = PrincipalInfo::default();
        let raw = citation(&ctx(&config, &principal)).unwrap();
        assert!(!raw.contains("orcid"));
        assert!(!raw.contains("email"));
    }

    #[test]
    fn test_automation_config_round_trips_flags() {
        let (config, principal) = (config(), principal());
        let raw = automation_config(&ctx(&config, &principal)).unwrap();
        let doc: serde_yaml::Value = serde_yaml::from_str(&raw).unwrap();

        assert_eq!(doc["automation"]["level"].as_str(), Some("professional"));
        assert_eq!(doc["automation"]["branch_strategy"].as_str(), Some("gitflow"));
        assert_eq!(doc["automation"]["auto_doi"].as_bool(), Some(false));
        assert_eq!(doc["repository"]["name"].as_str(), Some("demo"));
        assert_eq!(
            doc["research"]["principal_investigator"]["name"].as_str(),
            Some("Ada Lovelace")
        );
    }

    #[test]
    fn test_workflows_carry_env_and_github_expressions() {
        let (config, principal) = (config(), principal());
        let ctx = ctx(&config, &principal);
        let full = full_automation_workflow(&ctx);
        assert!(full.contains("REPO_NAME: \"demo\""));
        assert!(full.contains("${{ github.ref }}"));

        let doc: serde_yaml::Value = serde_yaml::from_str(&quality_workflow(&ctx)).unwrap();
        assert!(doc["jobs"]["quality-assurance"].is_mapping());
        let doc: serde_yaml::Value = serde_yaml::from_str(&release_workflow(&ctx)).unwrap();
        assert_eq!(doc["env"]["AUTOMATION_LEVEL"].as_str(), Some("professional"));
    }

    #[test]
    fn test_render_artifacts_layout() {
        let (config, principal) = (config(), principal());
        let artifacts = render_artifacts(&ctx(&config, &principal)).unwrap();
        let paths: Vec<_> = artifacts.iter().map(|a| a.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "README.md",
                "CITATION.cff",
                ".github/workflows/full_automation.yml",
                ".github/workflows/automated_release.yml",
                ".github/workflows/quality_assurance.yml",
                "DATA_MANAGEMENT.md",
                ".automation/config.yml",
                "MANUSCRIPT.md",
            ]
        );
        assert!(artifacts[..7].iter().all(|a| a.branch == "develop"));
        assert_eq!(artifacts[7].branch, "manuscript/auto-generation");
    }

    #[test]
    fn test_release_body_links_doi_when_present() {
        let (config, principal) = (config(), principal());
        let ctx = ctx(&config, &principal);
        let with_doi = release_body(&ctx, "v1.0.0", Some("10.5281/zenodo.1001"));
        assert!(with_doi.contains("https://doi.org/10.5281/zenodo.1001"));
        assert!(!release_body(&ctx, "v1.0.0", None).contains("DOI"));
    }
}
