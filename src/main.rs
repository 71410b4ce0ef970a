//! Sitegrab main entry point
//!
//! This is the command-line interface for the Sitegrab site crawler.

use anyhow::{bail, Context};
use clap::Parser;
use sitegrab::config::{load_config, validate, Config};
use sitegrab::crawler::run_crawl;
use sitegrab::output::{load_statistics, print_snapshot_statistics, print_statistics};
use sitegrab::url::map_url;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Sitegrab: a resumable, deduplicating site crawler
///
/// Sitegrab crawls every page reachable from a seed URL through same-site
/// links and mirrors them into an output directory. Progress is kept in
/// `site_metadata.json`, so running the same command again resumes the crawl.
#[derive(Parser, Debug)]
#[command(name = "sitegrab")]
#[command(version = "1.0.0")]
#[command(about = "A resumable, deduplicating site crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Seed URL (overrides the config file)
    #[arg(long)]
    url: Option<String>,

    /// Output directory (overrides the config file)
    #[arg(long, value_name = "DIR")]
    out: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Start a fresh crawl, discarding the previous snapshot
    #[arg(long)]
    fresh: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics from the output directory and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = resolve_config(&cli)?;

    if cli.dry_run {
        handle_dry_run(&config)
    } else if cli.stats {
        handle_stats(&config)
    } else {
        handle_crawl(config, cli.fresh).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sitegrab=info,warn"),
            1 => EnvFilter::new("sitegrab=debug,info"),
            2 => EnvFilter::new("sitegrab=trace,debug"),
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

/// Builds the effective configuration from the config file and CLI overrides
fn resolve_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match (&cli.config, &cli.url) {
        (Some(path), _) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("failed to load {}", path.display()))?
        }
        (None, Some(url)) => Config::for_site(url.as_str(), "out"),
        (None, None) => bail!("either a CONFIG file or --url is required"),
    };

    if let Some(url) = &cli.url {
        config.crawl.url = url.clone();
    }
    if let Some(out) = &cli.out {
        config.crawl.output_dir = out.clone();
    }

    validate(&config).context("invalid configuration")?;
    Ok(config)
}

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    let crawl = &config.crawl;
    let output_dir = Path::new(&crawl.output_dir);

    println!("=== Sitegrab Dry Run ===\n");

    println!("Crawl:");
    println!("  Seed URL: {}", crawl.url);
    println!("  Output directory: {}", output_dir.display());
    println!("  Traversal: {:?}", crawl.traversal);
    println!("  Max depth: {}", describe_limit(u64::from(crawl.depth)));
    println!("  Max pages: {}", describe_limit(u64::from(crawl.max_pages)));
    println!("  Max time: {}", describe_limit(crawl.max_time));

    println!("\nFetch:");
    println!("  Timeout: {}s", config.fetch.timeout_secs);
    println!("  Connect timeout: {}s", config.fetch.connect_timeout_secs);
    println!("  Max retries: {}", config.fetch.max_retries);

    let seed = url::Url::parse(&crawl.url)?;
    println!(
        "\nSeed page would be written to: {}",
        map_url(&seed).under(output_dir).display()
    );

    let snapshot = load_statistics(output_dir)?;
    if snapshot.fetched > 0 || snapshot.unfetched > 0 {
        println!(
            "Would resume: {} pages fetched, {} URLs pending",
            snapshot.fetched, snapshot.unfetched
        );
    } else {
        println!("No previous snapshot, would start from the seed");
    }

    println!("\n✓ Configuration is valid");
    Ok(())
}

fn describe_limit(value: u64) -> String {
    if value == 0 {
        "unlimited".to_string()
    } else {
        value.to_string()
    }
}

/// Handles the --stats mode: shows statistics from the output directory
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    let output_dir = Path::new(&config.crawl.output_dir);
    println!("Output directory: {}\n", output_dir.display());

    let stats = load_statistics(output_dir)?;
    print_snapshot_statistics(&stats);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, fresh: bool) -> anyhow::Result<()> {
    if fresh {
        tracing::info!("Starting fresh crawl (ignoring previous state)");
    } else {
        tracing::info!("Starting crawl (will resume if a snapshot exists)");
    }

    match run_crawl(config, fresh).await {
        Ok(stats) => {
            tracing::info!("Crawl completed successfully");
            print_statistics(&stats);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
