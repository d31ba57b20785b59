//! pagemirror main entry point
//!
//! This is the command-line interface for the pagemirror static site builder.

use clap::Parser;
use pagemirror::config::{load_config_with_hash, Config, CrawlJob, EngineKind};
use pagemirror::crawler::crawl;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// pagemirror: render a site's pages into a static mirror
///
/// pagemirror visits a fixed list of paths under one host with several
/// concurrent sessions, rewrites the host's origin to a target domain and
/// writes every page into a directory tree ready to be served as is.
#[derive(Parser, Debug)]
#[command(name = "pagemirror")]
#[command(version = "1.0.0")]
#[command(about = "Render a site's pages into a static mirror", long_about = None)]
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

    /// Override the configured render engine (http or browser)
    #[arg(long, value_name = "ENGINE")]
    engine: Option<EngineKind>,

    /// Validate config and show where each path would be written without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let mut config = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if let Some(engine) = cli.engine {
        config.crawl.engine = engine;
    }

    if cli.dry_run {
        handle_dry_run(&config)?;
    } else {
        handle_crawl(config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("pagemirror=info,warn"),
            1 => EnvFilter::new("pagemirror=debug,info"),
            2 => EnvFilter::new("pagemirror=trace,debug"),
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

/// Handles the --dry-run mode: prints the resolved job and its output files
fn handle_dry_run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let job = CrawlJob::from_config(config)?;

    println!("=== pagemirror Dry Run ===\n");

    println!("Crawl:");
    println!("  Host: {}", job.host);
    println!("  Engine: {}", job.engine);
    println!("  Concurrency: {}", job.concurrency);
    println!("  Retries per URL: {}", job.max_retries);
    println!("  Delay: {:?}", job.delay);
    println!("  Navigation timeout: {:?}", job.navigation_timeout);
    println!("  User agent: {}", job.user_agent);

    println!("\nOutput:");
    println!("  Root: {}", job.output_root.display());
    println!("  Domain: {}", job.domain);
    println!("  Header: {} bytes", job.html_prefix.len());

    println!("\nPaths ({}):", job.paths.len());
    for path in &job.paths {
        let location = job.output_location(path);
        println!("  {} -> {}", job.page_url(path), location.file.display());
    }

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        "Mirroring {} into {} with {} lanes",
        config.crawl.host,
        config.output.root.display(),
        config.crawl.concurrency
    );

    match crawl(config).await {
        Ok(report) => {
            tracing::info!(
                "Crawl completed successfully: {} pages written",
                report.pages_written
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
