use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use url::Url;

use review_harvester_lib::application::{CrawlCommand, CrawlController};
use review_harvester_lib::crawling::CrawlOrchestrator;
use review_harvester_lib::infrastructure::config::AppConfig;
use review_harvester_lib::infrastructure::logging::log_system_info;
use review_harvester_lib::infrastructure::{
    ChannelNotifier, ConfigManager, Exporter, Notification, Notifier, SnapshotPage,
    TracingNotifier, init_logging_with_config, load_snapshots,
};

#[derive(Parser, Debug)]
#[command(name = "review-harvester", version, about = "Harvest paginated product reviews")]
struct Cli {
    /// Configuration file (defaults to the user config directory)
    #[arg(long, global = true, env = "REVIEW_HARVESTER_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl a directory of saved page snapshots as if paginating live
    Replay(ReplayArgs),
}

#[derive(Args, Debug)]
struct ReplayArgs {
    /// Directory of `*.html` snapshots, rendered in file name order
    #[arg(long)]
    pages: PathBuf,

    /// Location the snapshots were saved from
    #[arg(long, default_value = "https://www.daraz.com.np/products/replay.html")]
    location: Url,

    /// Export directory (overrides the configured one)
    #[arg(long)]
    out: Option<PathBuf>,

    /// Stop after this many pages
    #[arg(long)]
    max_pages: Option<u32>,

    /// Skip image URL collection
    #[arg(long)]
    no_images: bool,

    /// Simulated render latency after each click, in milliseconds
    #[arg(long, default_value_t = 300)]
    latency_ms: u64,

    /// Drop all pacing delays
    #[arg(long)]
    fast: bool,
}

async fn load_config(path: Option<PathBuf>) -> Result<AppConfig> {
    match path {
        Some(path) => ConfigManager::with_path(path).load_config().await,
        None => ConfigManager::new()?.initialize_on_first_run().await,
    }
}

async fn replay(mut config: AppConfig, args: ReplayArgs) -> Result<()> {
    let snapshots = load_snapshots(&args.pages).await?;
    anyhow::ensure!(!snapshots.is_empty(), "No *.html snapshots in {}", args.pages.display());

    if let Some(out) = args.out {
        config.output.directory.clone_from(&out);
        config.output.fallback_directory = out;
    }
    if args.max_pages.is_some() {
        config.crawl.max_pages = args.max_pages;
    }
    if args.no_images {
        config.crawl.with_images = false;
    }
    if args.fast {
        config.crawl.delay_min_ms = 0;
        config.crawl.delay_max_ms = 0;
        config.timing.pre_extract_delay_min_ms = 0;
        config.timing.pre_extract_delay_max_ms = 0;
        config.timing.settle_delay_ms = 0;
    }

    info!("Replaying {} snapshots as {}", snapshots.len(), args.location);
    let page = SnapshotPage::new(args.location, snapshots)
        .with_render_latency(Duration::from_millis(args.latency_ms));
    let orchestrator = CrawlOrchestrator::new(Arc::new(page), &config.parsing, config.timing.clone())
        .context("Invalid page contract configuration")?;
    let exporter = Exporter::from_config(&config.output, &config.timing);

    let (notifier, mut notifications) = ChannelNotifier::new();
    let controller = CrawlController::new(Arc::new(orchestrator), exporter, Arc::new(notifier));
    let (commands, controller) = controller.spawn();

    commands
        .send(CrawlCommand::Start(config.crawl.clone()))
        .await
        .context("Controller stopped before the crawl started")?;

    let stop = commands.clone();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = stop.send(CrawlCommand::Stop).await;
        }
    });

    while let Some(notification) = notifications.recv().await {
        let done = matches!(
            notification,
            Notification::Completed { .. } | Notification::Rejected { .. }
        );
        TracingNotifier.notify(notification);
        if done {
            break;
        }
    }

    interrupt.abort();
    drop(commands);
    let reports = controller.await.context("Controller task failed")?;
    println!("{}", serde_json::to_string_pretty(&reports)?);
    anyhow::ensure!(
        reports.iter().all(|report| report.save.is_saved()),
        "Export failed; see the log for details"
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config).await?;
    init_logging_with_config(&config.logging)?;
    log_system_info();

    match cli.command {
        Command::Replay(args) => replay(config, args).await,
    }
}
