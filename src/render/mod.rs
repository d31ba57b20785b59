//! Page rendering engines
//!
//! The crawler only needs one capability from a renderer: navigate a
//! session to a URL, then read back the document's content type and HTML.
//! Two engines implement it:
//! - [`HttpEngine`], a plain HTTP GET through reqwest (the default)
//! - `BrowserEngine`, headless Chromium via chromiumoxide (`browser` feature)

#[cfg(feature = "browser")]
mod browser;
mod http;

#[cfg(feature = "browser")]
pub use browser::BrowserEngine;
pub use http::{build_http_client, HttpEngine};

use crate::config::{CrawlJob, EngineKind};
use async_trait::async_trait;
use thiserror::Error;

/// Errors reported by a rendering engine
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to launch render engine: {0}")]
    Launch(String),

    #[error("Failed to open session: {0}")]
    Session(String),

    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Failed to extract document: {0}")]
    Extract(String),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Render engine unavailable: {0}")]
    Unsupported(String),
}

/// The rendered state of the current page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    /// MIME type of the document, e.g. `text/html`
    pub content_type: String,

    /// The document markup
    pub html: String,
}

impl RenderedDocument {
    pub fn is_html(&self) -> bool {
        self.content_type == "text/html"
    }
}

/// A source of rendering sessions
#[async_trait]
pub trait RenderEngine: Send + Sync {
    /// Opens a new session that identifies itself with `user_agent`
    async fn open_session(&self, user_agent: &str)
        -> Result<Box<dyn RenderSession>, RenderError>;

    /// Releases the engine; sessions must be closed first
    async fn shutdown(&self) -> Result<(), RenderError>;
}

/// One independent page (a browser tab, or an HTTP client)
#[async_trait]
pub trait RenderSession: Send {
    /// Loads `url` into the session
    async fn navigate(&mut self, url: &str) -> Result<(), RenderError>;

    /// Reads back the document loaded by the last navigation
    async fn document(&mut self) -> Result<RenderedDocument, RenderError>;

    async fn close(&mut self) -> Result<(), RenderError>;
}

/// Starts the engine selected by the job
pub async fn launch_engine(job: &CrawlJob) -> Result<Box<dyn RenderEngine>, RenderError> {
    tracing::debug!("Launching {} render engine", job.engine);
    match job.engine {
        EngineKind::Http => Ok(Box::new(HttpEngine::new())),
        EngineKind::Browser => launch_browser(job).await,
    }
}

#[cfg(feature = "browser")]
async fn launch_browser(job: &CrawlJob) -> Result<Box<dyn RenderEngine>, RenderError> {
    Ok(Box::new(BrowserEngine::launch(&job.browser).await?))
}

#[cfg(not(feature = "browser"))]
async fn launch_browser(_job: &CrawlJob) -> Result<Box<dyn RenderEngine>, RenderError> {
    Err(RenderError::Unsupported(
        "built without the `browser` feature".to_string(),
    ))
}

/// Reduces a `Content-Type` header value to its MIME essence
///
/// `text/html; charset=utf-8` becomes `text/html`.
pub fn mime_essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_essence() {
        assert_eq!(mime_essence("text/html"), "text/html");
        assert_eq!(mime_essence("text/html; charset=utf-8"), "text/html");
        assert_eq!(mime_essence(" Text/HTML ;charset=UTF-8"), "text/html");
        assert_eq!(mime_essence("application/json"), "application/json");
        assert_eq!(mime_essence(""), "");
    }

    #[test]
    fn test_is_html() {
        let doc = RenderedDocument {
            content_type: "text/html".to_string(),
            html: String::new(),
        };
        assert!(doc.is_html());

        let doc = RenderedDocument {
            content_type: "application/xhtml+xml".to_string(),
            html: String::new(),
        };
        assert!(!doc.is_html());
    }

    #[cfg(not(feature = "browser"))]
    #[tokio::test]
    async fn test_browser_engine_requires_feature() {
        use crate::config::BrowserLaunchConfig;
        use std::time::Duration;

        let job = CrawlJob {
            host: "https://site.test".to_string(),
            paths: vec!["/".to_string()],
            output_root: "/out".into(),
            delay: Duration::ZERO,
            navigation_timeout: Duration::from_secs(10),
            user_agent: "MirrorBot/1.0".to_string(),
            html_prefix: String::new(),
            concurrency: 1,
            max_retries: 0,
            domain: "https://mirror.test".to_string(),
            engine: EngineKind::Browser,
            browser: BrowserLaunchConfig::default(),
        };

        let result = launch_engine(&job).await;
        assert!(matches!(result, Err(RenderError::Unsupported(_))));
    }
}
