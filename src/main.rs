//! HN-Harvester main entry point
//!
//! This is the command-line interface for the HN-Harvester crawler.

use anyhow::Context;
use clap::Parser;
use hn_harvester::config::{read_config_with_hash, validate, Config};
use hn_harvester::crawler::crawl;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// HN-Harvester: downloads front-page stories and the links discussed under them
///
/// The crawler polls the aggregator's home page, creates one directory per new
/// story, and downloads the story's landing page, its discussion page and every
/// outbound link found in the comments. It runs until interrupted.
#[derive(Parser, Debug)]
#[command(name = "hn-harvester")]
#[command(version)]
#[command(about = "Crawl news.ycombinator.com stories and their comment links", long_about = None)]
struct Cli {
    /// Optional TOML configuration file; flags below override its values
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Number of concurrent story dispatchers
    #[arg(short, long)]
    parsers: Option<usize>,

    /// Number of concurrent download workers
    #[arg(short, long)]
    downloaders: Option<usize>,

    /// Write logs to this file instead of stderr
    #[arg(short, long, value_name = "FILE")]
    logfile: Option<PathBuf>,

    /// Per-request timeout in seconds
    #[arg(short, long)]
    timeout: Option<u64>,

    /// Seconds to wait between discovery cycles
    #[arg(short, long = "refresh-timeout")]
    refresh_timeout: Option<u64>,

    /// Directory to store downloaded stories in
    #[arg(short, long, value_name = "DIR")]
    basedir: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Print the effective configuration and exit
    #[arg(long)]
    dry_run: bool,
}

impl Cli {
    /// Applies command-line overrides on top of a loaded configuration
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(parsers) = self.parsers {
            config.crawler.parsers = parsers;
        }
        if let Some(downloaders) = self.downloaders {
            config.crawler.downloaders = downloaders;
        }
        if let Some(timeout) = self.timeout {
            config.crawler.timeout = timeout;
        }
        if let Some(refresh) = self.refresh_timeout {
            config.crawler.refresh_interval = refresh;
        }
        if let Some(basedir) = &self.basedir {
            config.output.base_dir = basedir.clone();
        }
        if let Some(logfile) = &self.logfile {
            config.output.log_file = Some(logfile.clone());
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (mut config, config_hash) = match &cli.config {
        Some(path) => {
            let (config, hash) = read_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            (config, Some(hash))
        }
        None => (Config::default(), None),
    };
    cli.apply_overrides(&mut config);
    validate(&config).context("Invalid configuration")?;

    setup_logging(cli.verbose, cli.quiet, config.output.log_file.as_deref())?;

    if let (Some(path), Some(hash)) = (&cli.config, &config_hash) {
        tracing::info!("Configuration loaded from {} (hash: {})", path.display(), hash);
    }

    if cli.dry_run {
        print_config(&config);
        return Ok(());
    }

    tracing::info!(
        "Start crawler of {} ({} parsers, {} downloaders, timeout {}s, refresh {}s)",
        config.site.home_page,
        config.crawler.parsers,
        config.crawler.downloaders,
        config.crawler.timeout,
        config.crawler.refresh_interval
    );

    tokio::select! {
        result = crawl(config) => {
            if let Err(e) = &result {
                tracing::error!("Crawler stopped: {}", e);
            }
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("USER INTERRUPTION");
        }
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool, log_file: Option<&Path>) -> anyhow::Result<()> {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("hn_harvester=info,warn"),
            1 => EnvFilter::new("hn_harvester=debug,info"),
            2 => EnvFilter::new("hn_harvester=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false);

    match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => builder.init(),
    }

    Ok(())
}

/// Handles --dry-run: shows the configuration the crawler would run with
fn print_config(config: &Config) {
    println!("=== HN-Harvester Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Dispatchers: {}", config.crawler.parsers);
    println!("  Download workers: {}", config.crawler.downloaders);
    println!("  Request timeout: {}s", config.crawler.timeout);
    println!("  Refresh interval: {}s", config.crawler.refresh_interval);
    println!(
        "  Aggregator rate limit: {} req/s",
        config.crawler.requests_per_second
    );
    println!("  Seen-story window: {}", config.crawler.seen_capacity);
    println!("  User agent: {}", config.crawler.user_agent);

    println!("\nSite:");
    println!("  Home page: {}", config.site.home_page);

    println!("\nOutput:");
    println!("  Base directory: {}", config.output.base_dir.display());
    match &config.output.log_file {
        Some(path) => println!("  Log file: {}", path.display()),
        None => println!("  Log file: (stderr)"),
    }

    println!("\n✓ Configuration is valid");
}
