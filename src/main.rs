//! Article-Relay main entry point
//!
//! This is the command-line interface for the Article-Relay homepage poller.

use article_relay::config::{load_config_with_hash, validate, Config};
use article_relay::crawler::run_relay;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Article-Relay: polls a news homepage and forwards new articles
///
/// Article-Relay fetches the configured homepage at a human pace, extracts
/// every new article it links to and posts the articles to a storage
/// service. It runs until interrupted with Ctrl-C.
#[derive(Parser, Debug)]
#[command(name = "article-relay")]
#[command(version)]
#[command(about = "Polls a news homepage and forwards new articles", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show the effective settings without polling
    #[arg(long)]
    dry_run: bool,

    /// Override the delivery endpoint from the config file
    #[arg(long, value_name = "URL")]
    endpoint: Option<String>,

    /// Override the scan interval (seconds) from the config file
    #[arg(long, value_name = "SECS")]
    scan_interval: Option<u64>,

    /// Override the maximum number of articles processed per poll
    #[arg(long, value_name = "N")]
    max_per_poll: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => (cfg, hash),
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    apply_overrides(&mut config, &cli);
    if let Err(e) = validate(&config) {
        tracing::error!("Invalid command-line override: {}", e);
        return Err(e.into());
    }

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    match run_relay(config).await {
        Ok(()) => {
            tracing::info!("Relay stopped");
            Ok(())
        }
        Err(e) => {
            tracing::error!("Relay failed to start: {}", e);
            Err(e.into())
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("article_relay=info,warn"),
            1 => EnvFilter::new("article_relay=debug,info"),
            2 => EnvFilter::new("article_relay=trace,debug"),
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

/// Applies command-line overrides on top of the file configuration
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(endpoint) = &cli.endpoint {
        config.delivery.endpoint = endpoint.clone();
    }
    if let Some(scan_interval) = cli.scan_interval {
        config.poll.scan_interval = scan_interval;
    }
    if let Some(max_per_poll) = cli.max_per_poll {
        config.poll.max_articles_per_poll = max_per_poll;
    }
}

/// Handles the --dry-run mode: shows what the relay would do
fn handle_dry_run(config: &Config) {
    println!("=== Article-Relay Dry Run ===\n");

    println!("Site:");
    println!("  Homepage: {}", config.site.base_url);
    println!("  Domain: {}", config.site.domain);
    println!("  Default author: {}", config.site.name);

    println!("\nDelivery:");
    println!("  Endpoint: {}", config.delivery.endpoint);

    println!("\nPolling:");
    println!("  Scan interval: {}s", config.poll.scan_interval);
    println!("  Max articles per poll: {}", config.poll.max_articles_per_poll);
    println!("  Failure backoff: {}s", config.poll.failure_backoff);

    println!("\nPacing:");
    println!(
        "  Request delay: {}-{}ms",
        config.pacing.request_delay.min, config.pacing.request_delay.max
    );
    println!(
        "  Article delay: {}-{}ms",
        config.pacing.article_delay.min, config.pacing.article_delay.max
    );
    println!(
        "  Delivery delay: {}-{}ms",
        config.pacing.delivery_delay.min, config.pacing.delivery_delay.max
    );

    println!("\nHTTP:");
    println!("  Timeout: {}s", config.http.timeout);
    println!("  User agent: {}", config.http.user_agent);
    println!("  Accept-Language: {}", config.http.accept_language);
    println!("  Referer: {}", config.http.referer);

    println!("\n✓ Configuration is valid");
}
