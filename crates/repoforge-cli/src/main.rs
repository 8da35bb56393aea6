//! repoforge - research repository automation CLI
//!
//! ## Commands
//!
//! - `run`: automate one or more repositories (branches, content, DOI, PR, release)
//! - `plan`: show the branch layout of a strategy
//! - `next-version`: compute the next release tag

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};

use forge_remote::{
    ArchivalService, GitHubClient, GitHubConfig, HostingService, ZenodoClient, ZenodoConfig,
};
use repoforge_core::branching::{self, WORKING_BRANCHES};
use repoforge_core::{
    build_engine, next_tag, AutomationConfig, AutomationLevel, AutomationResult, BatchRunner,
    BranchStrategy, ConfigFile, PrincipalInfo, StepStatus,
};

#[derive(Parser)]
#[command(name = "repoforge")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Research repository automation", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Automate repositories, one after another
    Run(RunArgs),

    /// Print the branch layout of a strategy
    Plan {
        #[arg(short, long, default_value = "research_flow")]
        strategy: BranchStrategy,
    },

    /// Compute the next release tag
    NextVersion {
        /// Latest existing tag (e.g. v1.2.3); omitted means no release yet
        #[arg(long)]
        latest: Option<String>,

        #[arg(short, long, default_value = "research_grade")]
        level: AutomationLevel,
    },
}

#[derive(Args)]
struct RunArgs {
    /// Repository names, under the configured owner
    #[arg(required = true)]
    repositories: Vec<String>,

    /// TOML configuration file (automation settings and `[principal]`)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Repository owner (overrides the config file)
    #[arg(long)]
    owner: Option<String>,

    /// Automation level: basic, professional, research_grade, enterprise
    #[arg(short, long)]
    level: Option<AutomationLevel>,

    /// Branch strategy: gitflow, github_flow, research_flow
    #[arg(short, long)]
    strategy: Option<BranchStrategy>,

    /// Skip DOI issuance
    #[arg(long)]
    no_doi: bool,

    /// Skip the automated pull request
    #[arg(long)]
    no_pr: bool,

    /// Skip the automated release
    #[arg(long)]
    no_release: bool,

    /// Print results as JSON instead of the text report
    #[arg(long)]
    output_json: bool,

    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    github_token: Option<String>,

    #[arg(long, env = "ZENODO_ACCESS_TOKEN", hide_env_values = true)]
    zenodo_token: Option<String>,

    /// GitHub API root (GitHub Enterprise, test servers)
    #[arg(long, env = "GITHUB_API_URL")]
    api_url: Option<String>,

    /// HTTP timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    repoforge_core::init_tracing(cli.json, level);

    match cli.command {
        Commands::Run(args) => cmd_run(args).await,
        Commands::Plan { strategy } => cmd_plan(strategy),
        Commands::NextVersion { latest, level } => {
            let tag = next_tag(latest.as_deref(), level)
                .with_context(|| format!("No release tag follows {:?}", latest))?;
            println!("{}", tag);
            Ok(())
        }
    }
}

/// Merge the config file (if any) with command-line overrides.
fn resolve_config(args: &RunArgs) -> Result<(AutomationConfig, PrincipalInfo)> {
    let file = match &args.config {
        Some(path) => ConfigFile::load(path)
            .with_context(|| format!("Failed to load config file {:?}", path))?,
        None => ConfigFile::default(),
    };

    let mut config = file.automation;
    if let Some(owner) = &args.owner {
        config.owner = owner.clone();
    }
    if let Some(token) = &args.github_token {
        config.hosting_token = token.clone();
    }
    if let Some(token) = &args.zenodo_token {
        config.archival_token = Some(token.clone());
    }
    if let Some(level) = args.level {
        config.automation_level = level;
    }
    if let Some(strategy) = args.strategy {
        config.branch_strategy = strategy;
    }
    if args.no_doi {
        config.auto_doi = false;
    }
    if args.no_pr {
        config.auto_pr = false;
    }
    if args.no_release {
        config.auto_release = false;
    }

    config.validate().context("Invalid configuration")?;
    Ok((config, file.principal))
}

fn hosting_config(config: &AutomationConfig, args: &RunArgs) -> GitHubConfig {
    let github =
        GitHubConfig::new(&config.owner, &config.hosting_token).with_timeout(args.timeout);
    match &args.api_url {
        Some(api_url) => github.with_api_url(api_url),
        None => github,
    }
}

/// Zenodo settings, when an archival credential is configured.
fn archival_config(config: &AutomationConfig, args: &RunArgs) -> Option<ZenodoConfig> {
    if !config.has_archival_credential() {
        return None;
    }
    let token = config.archival_token.as_deref().unwrap_or_default();
    Some(ZenodoConfig::new(token).with_timeout(args.timeout))
}

async fn cmd_run(args: RunArgs) -> Result<()> {
    let (config, principal) = resolve_config(&args)?;

    let hosting: Arc<dyn HostingService> = Arc::new(
        GitHubClient::new(hosting_config(&config, &args))
            .context("Failed to build GitHub client")?,
    );

    let archival: Option<Arc<dyn ArchivalService>> = match archival_config(&config, &args) {
        Some(zenodo) => {
            let client: Arc<dyn ArchivalService> =
                Arc::new(ZenodoClient::new(zenodo).context("Failed to build Zenodo client")?);
            Some(client)
        }
        None => None,
    };

    info!(
        owner = %config.owner,
        level = %config.automation_level,
        strategy = %config.branch_strategy,
        repositories = args.repositories.len(),
        "starting automation"
    );
    let engine = build_engine(hosting, archival, config, principal)?;
    let outcome = BatchRunner::new(&engine).run(&args.repositories).await;

    if args.output_json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        for result in &outcome.results {
            print_summary(result);
        }
        println!("{}", outcome.status.render_report());
    }

    if !outcome.all_succeeded() {
        anyhow::bail!(
            "{} of {} repositories failed",
            outcome.status.failed_count(),
            outcome.results.len()
        );
    }
    Ok(())
}

fn print_summary(result: &AutomationResult) {
    let verdict = if result.success { "ok" } else { "FAILED" };
    println!(
        "[{}] {} ({} steps, {} ms)",
        verdict,
        result.repository,
        result.completed_steps.len(),
        result.duration_ms
    );
    if let Some(url) = &result.repository_url {
        println!("  repository: {}", url);
    }
    if let Some(doi) = &result.doi {
        println!("  doi:        {}", doi);
    }
    if let (Some(number), Some(url)) = (result.pull_request_number, &result.pull_request_url) {
        println!("  pr:         #{} {}", number, url);
    }
    if let (Some(tag), Some(url)) = (&result.release_tag, &result.release_url) {
        println!("  release:    {} {}", tag, url);
    }
    for outcome in &result.outcomes {
        match &outcome.status {
            StepStatus::Completed => {}
            StepStatus::Failed { reason } => {
                println!("  failed:     {} ({})", outcome.step, reason)
            }
            StepStatus::Skipped { reason } => {
                println!("  skipped:    {} ({})", outcome.step, reason)
            }
        }
    }
    if let Some(error) = &result.error {
        println!("  error:      {}", error);
    }
    println!();
}

fn cmd_plan(strategy: BranchStrategy) -> Result<()> {
    let plan = branching::resolve(strategy);
    println!("Strategy:   {}", plan.strategy);
    println!("Branches:   {}", plan.branches.join(", "));
    println!("Protected:  {}", plan.protected.join(", "));
    println!("Auto-merge: {}", plan.auto_merge);
    println!("Working:    {}", WORKING_BRANCHES.join(", "));
    Ok(())
}
