use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use backlog_sync::config::RunConfig;
use backlog_sync::github::GitHubClient;
use backlog_sync::models::IssueOutcome;
use backlog_sync::reconcile::Reconciler;
use backlog_sync::{backlog, models::TierSet};

#[derive(Parser)]
#[command(name = "backlog-sync")]
#[command(about = "Create GitHub issues from a tiered feature backlog")]
struct Cli {
    /// Target repository as owner/repo
    #[arg(long)]
    repo: String,

    /// GitHub personal access token with repo scope
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: String,

    /// Path to the backlog markdown file (e.g. FeatureIdeas.md)
    #[arg(long)]
    path: PathBuf,

    /// GitHub username to assign to created issues
    #[arg(long)]
    assignee: Option<String>,

    /// Preview every mutation without performing any
    #[arg(long)]
    dry_run: bool,
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "backlog_sync=info".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let markdown = std::fs::read_to_string(&cli.path)
        .with_context(|| format!("failed to read {}", cli.path.display()))?;

    let config = RunConfig::new(&cli.repo)
        .assignee(cli.assignee)
        .dry_run(cli.dry_run)
        .tier_set(TierSet::default());

    let (features, bullets) = backlog::parse(&markdown, &config.tier_set)?;
    tracing::info!(features = features.len(), repo = %cli.repo, "parsed backlog");

    let client = GitHubClient::new(&cli.repo, &cli.token)?;
    let report = Reconciler::new(&client, &config)
        .run(&features, &bullets)
        .await?;

    if !report.labels_created.is_empty() {
        println!("Labels created: {}", report.labels_created.join(", "));
    }
    if !report.milestones_created.is_empty() {
        println!("Milestones created: {}", report.milestones_created.join(", "));
    }
    for feature in &report.outcomes {
        match feature.outcome {
            IssueOutcome::Created { number } => {
                println!("[CREATED] #{} {}", number, feature.title)
            }
            IssueOutcome::SkippedExisting { number } => {
                println!("[SKIP] issue exists: #{} — {}", number, feature.title)
            }
            IssueOutcome::WouldCreate => {
                println!("[DRY-RUN] would create: {} ({})", feature.title, feature.tier)
            }
        }
    }
    println!(
        "{} created, {} skipped, {} would create",
        report.created(),
        report.skipped(),
        report.would_create()
    );

    Ok(())
}
