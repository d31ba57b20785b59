//! Crawler coordinator - lane orchestration
//!
//! This module runs a whole crawl:
//! - Opening one rendering session per concurrency slot
//! - Running one fetch lane per session against the shared work queue
//! - Stopping every lane on the first fatal error
//! - Closing all sessions and the engine however the crawl ends

use crate::config::CrawlJob;
use crate::crawler::fetcher::{PageFetcher, PageRequest};
use crate::crawler::retry::RetryingFetchStep;
use crate::crawler::scheduler::WorkQueue;
use crate::render::RenderEngine;
use crate::MirrorError;
use futures::future::try_join_all;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// What a finished crawl did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlReport {
    /// Pages written to the mirror
    pub pages_written: usize,

    /// Attempts beyond the first, summed over all pages
    pub retries: u32,

    pub elapsed: Duration,
}

/// Per-lane tallies, merged into the report
#[derive(Debug, Default)]
struct LaneStats {
    pages: usize,
    retries: u32,
}

/// Main crawler coordinator structure
pub struct Coordinator {
    job: Arc<CrawlJob>,
    engine: Box<dyn RenderEngine>,
    queue: WorkQueue,
    step: RetryingFetchStep,
}

impl Coordinator {
    /// Creates a coordinator for `job` that renders through `engine`
    pub fn new(job: CrawlJob, engine: Box<dyn RenderEngine>) -> Self {
        let queue = WorkQueue::new(&job.paths);
        let step = RetryingFetchStep::new(job.max_retries);
        Self {
            job: Arc::new(job),
            engine,
            queue,
            step,
        }
    }

    /// Runs the crawl to completion or to the first fatal error
    ///
    /// Sessions are closed and the engine is shut down on every exit path,
    /// including when a session fails to open. Lanes still running when
    /// another lane fails are dropped at their next await point; files they
    /// already wrote stay on disk.
    pub async fn run(self) -> Result<CrawlReport, MirrorError> {
        tracing::info!("Crawling: start");
        let start_time = Instant::now();

        let result = self.run_lanes().await;

        if let Err(e) = self.engine.shutdown().await {
            tracing::warn!("Failed to shut down render engine: {}", e);
        }

        let stats = result?;
        let report = CrawlReport {
            pages_written: stats.iter().map(|s| s.pages).sum(),
            retries: stats.iter().map(|s| s.retries).sum(),
            elapsed: start_time.elapsed(),
        };

        tracing::info!(
            "Crawling: end ({} pages, {} retries, {:?})",
            report.pages_written,
            report.retries,
            report.elapsed
        );
        Ok(report)
    }

    async fn run_lanes(&self) -> Result<Vec<LaneStats>, MirrorError> {
        let mut fetchers = Vec::with_capacity(self.job.concurrency);

        for lane in 0..self.job.concurrency {
            match self.engine.open_session(&self.job.user_agent).await {
                Ok(session) => fetchers.push(PageFetcher::new(session, Arc::clone(&self.job))),
                Err(e) => {
                    tracing::error!("Failed to open session for lane {}: {}", lane, e);
                    close_all(&mut fetchers).await;
                    return Err(e.into());
                }
            }
        }
        tracing::debug!("Opened {} sessions", fetchers.len());

        let lanes = fetchers
            .iter_mut()
            .enumerate()
            .map(|(lane, fetcher)| self.run_lane(lane, fetcher));
        let result = try_join_all(lanes).await;

        close_all(&mut fetchers).await;

        if let Err(e) = &result {
            tracing::error!(
                "Crawl aborted with {} paths unclaimed: {}",
                self.queue.len(),
                e
            );
        }
        result
    }

    /// Pulls paths from the queue until it is empty
    async fn run_lane(&self, lane: usize, fetcher: &mut PageFetcher) -> Result<LaneStats, MirrorError> {
        let mut stats = LaneStats::default();

        while let Some(path) = self.queue.pop() {
            let request = PageRequest::new(&self.job, path)?;

            tracing::info!("Crawling: [Start] {}", request.url);
            let attempts = self.step.run(&mut *fetcher, &request).await?;
            tracing::info!("Crawling: [Finished] {}", request.url);

            stats.pages += 1;
            stats.retries += attempts - 1;
        }

        tracing::debug!("Lane {} drained the queue", lane);
        Ok(stats)
    }
}

async fn close_all(fetchers: &mut [PageFetcher]) {
    for fetcher in fetchers.iter_mut() {
        if let Err(e) = fetcher.close().await {
            tracing::warn!("Failed to close session: {}", e);
        }
    }
}

/// Runs a crawl job against an already launched engine
///
/// # Arguments
///
/// * `job` - The resolved crawl job
/// * `engine` - The render engine; shut down before this returns
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Every path was written to the mirror
/// * `Err(MirrorError)` - A path exhausted its retries, or a session could not be opened
pub async fn run_crawl(
    job: CrawlJob,
    engine: Box<dyn RenderEngine>,
) -> Result<CrawlReport, MirrorError> {
    Coordinator::new(job, engine).run().await
}
