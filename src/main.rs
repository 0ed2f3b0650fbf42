//! Pledge-Harvest main entry point
//!
//! This is the command-line interface for the Pledge-Harvest feed crawler.

use anyhow::{bail, Context};
use clap::Parser;
use pledge_harvest::config::{load_config_with_hash, validate, Config};
use pledge_harvest::crawler::Coordinator;
use pledge_harvest::output::{print_statistics, write_json};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Pledge-Harvest: a polite crowdfunding discovery-feed harvester
///
/// Walks the discovery feed of one category, fetches each new project page,
/// and writes up to ITEMS nested records to OUTPUT as indented JSON.
#[derive(Parser, Debug)]
#[command(name = "pledge-harvest")]
#[command(version)]
#[command(about = "A polite crowdfunding discovery-feed harvester", long_about = None)]
struct Cli {
    /// Number of records to collect
    #[arg(value_name = "ITEMS")]
    items: usize,

    /// Path of the JSON document to write
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Emit the project page as fetched instead of plain text
    #[arg(long)]
    raw_text: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = load(&cli)?;
    if cli.raw_text {
        config.extraction.plain_text = false;
    }

    let coordinator = Coordinator::new(config, cli.items)
        .context("Failed to initialize crawler")?
        .with_checkpoint(&cli.output);
    let report = coordinator.run().await.context("Crawl failed")?;

    write_json(&report.result, &cli.output)
        .with_context(|| format!("Failed to write {}", cli.output.display()))?;
    tracing::info!(
        "Wrote {} record(s) to {}",
        report.result.len(),
        cli.output.display()
    );

    if !cli.quiet {
        println!();
        print_statistics(&report.stats, &report.reason);
    }

    if report.is_aborted() {
        bail!("Crawl aborted: {}", report.reason);
    }

    Ok(())
}

/// Loads the configuration file if one was given, defaults otherwise
fn load(cli: &Cli) -> anyhow::Result<Config> {
    let Some(path) = &cli.config else {
        tracing::info!("No configuration file given, using defaults");
        let config = Config::default();
        validate(&config).context("Default configuration is invalid")?;
        return Ok(config);
    };

    tracing::info!("Loading configuration from: {}", path.display());
    let (config, hash) = load_config_with_hash(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);

    Ok(config)
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("pledge_harvest=info,warn"),
            1 => EnvFilter::new("pledge_harvest=debug,info"),
            2 => EnvFilter::new("pledge_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
