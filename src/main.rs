//! Sitemapper main entry point
//!
//! This is the command-line interface for the sitemapper crawler.

use anyhow::Context;
use clap::Parser;
use sitemapper::config::{load_config_with_hash, validate, Config, TerminationStrategy};
use sitemapper::output::{write_report, ReportFormat};
use sitemapper::{parse_seed, Crawler};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Sitemapper: a concurrent same-host sitemap builder
///
/// Sitemapper crawls every page reachable from a seed URL without leaving the
/// seed's host, and reports each page's links and static assets.
#[derive(Parser, Debug)]
#[command(name = "sitemapper")]
#[command(version)]
#[command(about = "A concurrent same-host sitemap builder", long_about = None)]
struct Cli {
    /// URL to start crawling from (http:// is assumed when no scheme is given)
    #[arg(value_name = "SEED")]
    seed: String,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Override the number of fetch workers
    #[arg(long, value_name = "N")]
    fetch_workers: Option<usize>,

    /// Override the number of index workers
    #[arg(long, value_name = "N")]
    index_workers: Option<usize>,

    /// Override the termination strategy
    #[arg(long, value_enum)]
    termination: Option<TerminationStrategy>,

    /// Report format
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    format: ReportFormat,

    /// Write the report to a file instead of stdout
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and seed and show what would be crawled without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::debug!("No configuration file given, using defaults");
            Config::default()
        }
    };
    apply_overrides(&mut config, &cli);
    validate(&config).context("Invalid configuration")?;

    if cli.dry_run {
        return handle_dry_run(&config, &cli.seed);
    }

    handle_crawl(config, &cli).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr so a report written to stdout stays clean.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sitemapper=info,warn"),
            1 => EnvFilter::new("sitemapper=debug,info"),
            2 => EnvFilter::new("sitemapper=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Applies command-line overrides on top of the loaded configuration
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(n) = cli.fetch_workers {
        config.crawler.fetch_workers = n;
    }
    if let Some(n) = cli.index_workers {
        config.crawler.index_workers = n;
    }
    if let Some(termination) = cli.termination {
        config.crawler.termination = termination;
    }
}

/// Handles the --dry-run mode: shows the effective configuration and seed
fn handle_dry_run(config: &Config, seed: &str) -> anyhow::Result<()> {
    let seed = parse_seed(seed)?;

    println!("=== Sitemapper Dry Run ===\n");

    println!("Seed: {}", seed);

    println!("\nCrawler Configuration:");
    println!("  Fetch workers: {}", config.crawler.fetch_workers);
    println!("  Index workers: {}", config.crawler.index_workers);
    println!(
        "  Page queue capacity: {}",
        config.crawler.page_queue_capacity
    );
    println!("  Termination: {:?}", config.crawler.termination);
    if config.crawler.termination == TerminationStrategy::Debounce {
        println!("  Debounce interval: {}ms", config.crawler.debounce_ms);
        println!("  Monitor tick: {}ms", config.crawler.monitor_tick_ms);
    }

    println!("\nHTTP:");
    println!("  User agent: {}", config.user_agent.header_value());
    println!("  Timeout: {}s", config.http.timeout_secs);
    println!("  Connect timeout: {}s", config.http.connect_timeout_secs);
    println!("  Max redirects: {}", config.http.max_redirects);

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would crawl {} without leaving {}",
        seed,
        seed.host_str().unwrap_or_default()
    );

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, cli: &Cli) -> anyhow::Result<()> {
    tracing::info!(
        "Fetch workers: {}, Index workers: {}, Termination: {:?}",
        config.crawler.fetch_workers,
        config.crawler.index_workers,
        config.crawler.termination
    );

    let crawler = Crawler::with_http(config)?;
    let site = match crawler.crawl(&cli.seed).await {
        Ok(site) => site,
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e.into());
        }
    };

    write_report(&site, cli.format, cli.output.as_deref())?;
    if let Some(path) = &cli.output {
        tracing::info!("Report written to: {}", path.display());
    }

    Ok(())
}
