//! Page fetcher implementation
//!
//! This module drives one rendering session through a single fetch attempt:
//! - Navigating with a bounded timeout
//! - Pausing for the configured delay to pace requests
//! - Rejecting documents that are not `text/html`
//! - Rewriting and writing the page into the mirror

use crate::config::CrawlJob;
use crate::output::OutputRecord;
use crate::render::{RenderError, RenderSession};
use crate::MirrorError;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Why a fetch attempt failed
#[derive(Debug, Error)]
pub enum FetchError {
    /// The document is not HTML
    #[error("{url} page is not text/html type (got '{content_type}')")]
    NotHtml { url: String, content_type: String },

    /// Navigation timed out or the engine reported an error
    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    /// The page could not be written to the mirror
    #[error("cannot write crawler output file {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl FetchError {
    /// Whether another attempt at the same URL may succeed
    ///
    /// Content and navigation failures are retried; a write failure points
    /// at the local environment and is never retried.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::Write { .. })
    }

    fn navigation(url: &Url, error: RenderError) -> Self {
        Self::Navigation {
            url: url.to_string(),
            reason: error.to_string(),
        }
    }
}

/// A crawl path paired with the URL it is rendered from
///
/// The URL is only used to drive the session and to find the origin to
/// rewrite; the output file is derived from `path` as configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub path: String,
    pub url: Url,
}

impl PageRequest {
    /// Resolves `path` against the job's host
    pub fn new(job: &CrawlJob, path: String) -> Result<Self, MirrorError> {
        let raw = job.page_url(&path);
        let url = Url::parse(&raw).map_err(|source| MirrorError::UrlParse { url: raw, source })?;
        Ok(Self { path, url })
    }
}

/// One attempt at turning a page request into a mirrored file
#[async_trait]
pub trait Fetch: Send {
    async fn fetch(&mut self, request: &PageRequest) -> Result<(), FetchError>;
}

/// Fetches pages through one rendering session
pub struct PageFetcher {
    session: Box<dyn RenderSession>,
    job: Arc<CrawlJob>,
}

impl PageFetcher {
    pub fn new(session: Box<dyn RenderSession>, job: Arc<CrawlJob>) -> Self {
        Self { session, job }
    }

    /// Closes the underlying session
    pub async fn close(&mut self) -> Result<(), RenderError> {
        self.session.close().await
    }

    async fn navigate(&mut self, url: &Url) -> Result<(), FetchError> {
        let timeout = self.job.navigation_timeout;
        match tokio::time::timeout(timeout, self.session.navigate(url.as_str())).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(FetchError::navigation(url, e)),
            Err(_) => Err(FetchError::Navigation {
                url: url.to_string(),
                reason: format!("timed out after {}", format_duration(timeout)),
            }),
        }
    }
}

#[async_trait]
impl Fetch for PageFetcher {
    async fn fetch(&mut self, request: &PageRequest) -> Result<(), FetchError> {
        let url = &request.url;
        self.navigate(url).await?;

        if !self.job.delay.is_zero() {
            tokio::time::sleep(self.job.delay).await;
        }

        let document = self
            .session
            .document()
            .await
            .map_err(|e| FetchError::navigation(url, e))?;

        if !document.is_html() {
            return Err(FetchError::NotHtml {
                url: url.to_string(),
                content_type: document.content_type,
            });
        }

        let record = OutputRecord::build(
            &document.html,
            url,
            self.job.output_location(&request.path),
            &self.job.domain,
            &self.job.html_prefix,
        );

        record.write().await.map_err(|source| FetchError::Write {
            path: record.location.file.clone(),
            source,
        })?;

        tracing::debug!(
            "Wrote {} ({} bytes)",
            record.location.file.display(),
            record.contents.len()
        );
        Ok(())
    }
}

fn format_duration(duration: Duration) -> String {
    if duration.subsec_millis() == 0 {
        format!("{}s", duration.as_secs())
    } else {
        format!("{}ms", duration.as_millis())
    }
}
