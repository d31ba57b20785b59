//! Crawler module for mirroring pages
//!
//! This module contains the core crawling logic, including:
//! - The shared work queue the fetch lanes pull from
//! - Single-attempt page fetching through a rendering session
//! - Bounded per-URL retries
//! - Lane coordination and resource cleanup

mod coordinator;
mod fetcher;
mod retry;
mod scheduler;

pub use coordinator::{run_crawl, Coordinator, CrawlReport};
pub use fetcher::{Fetch, FetchError, PageFetcher, PageRequest};
pub use retry::{RetryState, RetryingFetchStep};
pub use scheduler::WorkQueue;

use crate::config::{Config, CrawlJob};
use crate::render::launch_engine;
use crate::MirrorError;

/// Runs a complete crawl from configuration
///
/// This is the main entry point for building a mirror. It will:
/// 1. Resolve the configuration into a crawl job
/// 2. Launch the configured render engine
/// 3. Fetch every path across the configured number of lanes
/// 4. Release all sessions and the engine
///
/// # Arguments
///
/// * `config` - The validated configuration
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Every path was mirrored
/// * `Err(MirrorError)` - The crawl failed
///
/// # Example
///
/// ```no_run
/// use pagemirror::config::load_config;
/// use pagemirror::crawler::crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("mirror.toml"))?;
/// crawl(config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn crawl(config: Config) -> Result<CrawlReport, MirrorError> {
    let job = CrawlJob::from_config(&config)?;
    let engine = launch_engine(&job).await?;
    run_crawl(job, engine).await
}
