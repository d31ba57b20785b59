//! Headless Chromium render engine
//!
//! One browser process is launched per crawl; every session is a tab in it.
//! The document is read back from the live DOM after navigation, so pages
//! that build their markup with scripts are captured as rendered.

use super::{RenderEngine, RenderError, RenderSession, RenderedDocument};
use crate::config::BrowserLaunchConfig;
use async_trait::async_trait;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

const CONTENT_TYPE_SCRIPT: &str = "document.contentType";
const INNER_HTML_SCRIPT: &str = "document.documentElement.innerHTML";

/// Engine backed by a single Chromium process
pub struct BrowserEngine {
    browser: Mutex<Browser>,
    handler: JoinHandle<()>,
}

impl BrowserEngine {
    /// Launches Chromium with the configured options
    pub async fn launch(options: &BrowserLaunchConfig) -> Result<Self, RenderError> {
        let mut builder = BrowserConfig::builder();
        if !options.headless {
            builder = builder.with_head();
        }
        if options.no_sandbox {
            builder = builder.no_sandbox();
        }
        if let Some(executable) = &options.executable {
            builder = builder.chrome_executable(executable);
        }
        for arg in &options.args {
            builder = builder.arg(arg.clone());
        }

        let config = builder.build().map_err(RenderError::Launch)?;
        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| RenderError::Launch(e.to_string()))?;

        // Drive the CDP connection until the browser goes away
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        tracing::info!("Launched headless browser");
        Ok(Self {
            browser: Mutex::new(browser),
            handler,
        })
    }
}

#[async_trait]
impl RenderEngine for BrowserEngine {
    async fn open_session(
        &self,
        user_agent: &str,
    ) -> Result<Box<dyn RenderSession>, RenderError> {
        let page = {
            let browser = self.browser.lock().await;
            browser
                .new_page("about:blank")
                .await
                .map_err(|e| RenderError::Session(e.to_string()))?
        };

        if let Err(e) = page.set_user_agent(user_agent).await {
            let _ = page.close().await;
            return Err(RenderError::Session(e.to_string()));
        }

        Ok(Box::new(BrowserSession { page: Some(page) }))
    }

    async fn shutdown(&self) -> Result<(), RenderError> {
        let mut browser = self.browser.lock().await;
        let closed = browser
            .close()
            .await
            .map_err(|e| RenderError::Launch(format!("failed to close browser: {}", e)));
        if let Err(e) = browser.wait().await {
            tracing::warn!("Failed to wait for browser process: {}", e);
        }
        self.handler.abort();
        tracing::info!("Closed headless browser");
        closed.map(|_| ())
    }
}

/// A single browser tab
struct BrowserSession {
    page: Option<Page>,
}

impl BrowserSession {
    fn page(&self) -> Result<&Page, RenderError> {
        self.page
            .as_ref()
            .ok_or_else(|| RenderError::Session("tab already closed".to_string()))
    }
}

#[async_trait]
impl RenderSession for BrowserSession {
    async fn navigate(&mut self, url: &str) -> Result<(), RenderError> {
        self.page()?
            .goto(url)
            .await
            .map(|_| ())
            .map_err(|e| RenderError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })
    }

    async fn document(&mut self) -> Result<RenderedDocument, RenderError> {
        let page = self.page()?;

        let content_type: String = page
            .evaluate(CONTENT_TYPE_SCRIPT)
            .await
            .map_err(|e| RenderError::Extract(e.to_string()))?
            .into_value()
            .map_err(|e| RenderError::Extract(e.to_string()))?;

        // Non-HTML documents are rejected by the caller; skip reading them
        if content_type != "text/html" {
            return Ok(RenderedDocument {
                content_type,
                html: String::new(),
            });
        }

        let html: String = page
            .evaluate(INNER_HTML_SCRIPT)
            .await
            .map_err(|e| RenderError::Extract(e.to_string()))?
            .into_value()
            .map_err(|e| RenderError::Extract(e.to_string()))?;

        Ok(RenderedDocument { content_type, html })
    }

    async fn close(&mut self) -> Result<(), RenderError> {
        match self.page.take() {
            Some(page) => page
                .close()
                .await
                .map_err(|e| RenderError::Session(e.to_string())),
            None => Ok(()),
        }
    }
}
