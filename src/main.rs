use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

use arz_scraper::app::ports::DocumentFetcher;
use arz_scraper::config::{CliOverrides, Config};
use arz_scraper::constants::{self, DEFAULT_CONFIG_PATH};
use arz_scraper::infra::ReqwestFetcher;
use arz_scraper::names::NameLookup;
use arz_scraper::pipeline::{Orchestrator, Pipeline, RunReport};
use arz_scraper::{logging, metrics};

#[derive(Parser)]
#[command(name = "arz_scraper")]
#[command(about = "Scrape currency, gold and crypto prices into one JSON snapshot")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch all sources and write the snapshot (default)
    Run(RunArgs),
    /// List the known sources and their URLs
    Sources {
        /// Config file to read source URLs from
        #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,
    },
}

#[derive(Args, Default)]
struct RunArgs {
    /// Config file (TOML); missing file means defaults
    #[arg(long)]
    config: Option<PathBuf>,
    /// Where to write the snapshot
    #[arg(long)]
    output: Option<PathBuf>,
    /// Country code to English name lookup (JSON)
    #[arg(long)]
    names: Option<PathBuf>,
    /// Specific sources to run (comma-separated). Available: currency, gold, crypto
    #[arg(long)]
    sources: Option<String>,
    /// Per-source fetch timeout in seconds, 0 to disable
    #[arg(long)]
    timeout_secs: Option<u64>,
}

fn load_config(path: &std::path::Path) -> anyhow::Result<Config> {
    let mut config = Config::load(path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;
    config.apply_env().context("Invalid ARZ_* environment override")?;
    Ok(config)
}

fn print_report(report: &RunReport) {
    println!("\n📊 Snapshot {}:", report.generated_at);
    for source in &report.sources {
        match &source.error {
            None => println!(
                "   {:<9} {:>4} records  ({} ms)",
                source.source_id, source.records, source.elapsed_ms
            ),
            Some(e) => println!("   {:<9} failed: {}", source.source_id, e),
        }
    }
    println!("   Total records: {}", report.total_records);
    println!("✅ {} written", report.output_path.display());
}

async fn run(args: RunArgs) -> anyhow::Result<()> {
    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let mut config = load_config(&config_path)?;
    config.apply_cli(CliOverrides {
        output_path: args.output,
        names_path: args.names,
        timeout_secs: args.timeout_secs,
    });

    logging::init_logging(&config.log_dir).context("Failed to initialize logging")?;
    metrics::init_metrics();

    // Loaded before any fetch; a missing or malformed table aborts the run
    let names = NameLookup::load(&config.names_path).with_context(|| {
        format!("Error loading {}", config.names_path.display())
    })?;
    info!("Loaded {} country names", names.len());

    let selected: Vec<String> = args
        .sources
        .map(|list| {
            list.split(',')
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default();

    let fetcher: Arc<dyn DocumentFetcher> = Arc::new(
        ReqwestFetcher::new(&config.user_agent, config.timeout())
            .context("Failed to build HTTP client")?,
    );
    let orchestrator = Orchestrator::new(fetcher, Arc::new(names))
        .with_fetch_timeout(config.timeout())
        .with_config_sources(&config, &selected);

    if orchestrator.source_ids().is_empty() {
        warn!("No known sources selected; writing an empty snapshot");
    }

    let report = match Pipeline::run(&orchestrator, &config.output_path).await {
        Ok(report) => report,
        Err(e) => {
            error!("Snapshot run failed: {}", e);
            return Err(e).context("Failed to write snapshot");
        }
    };

    if let Some(url) = &config.pushgateway_url {
        metrics::push_summary(url, &report).await;
    }

    print_report(&report);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Run(RunArgs::default())) {
        Commands::Run(args) => run(args).await,
        Commands::Sources { config } => {
            let config = load_config(&config)?;
            for source_id in constants::SOURCE_ORDER {
                println!(
                    "{:<9} {}",
                    source_id,
                    config.source_url(source_id).unwrap_or_default()
                );
            }
            Ok(())
        }
    }
}
