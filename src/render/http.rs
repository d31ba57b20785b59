//! HTTP render engine
//!
//! Renders pages without executing scripts: navigation is a GET request and
//! the document is the response body as served. Each session owns its own
//! client so sessions never share connection state.

use super::{mime_essence, RenderEngine, RenderError, RenderSession, RenderedDocument};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Builds an HTTP client that identifies itself with `user_agent`
///
/// Redirects are followed the way a browser would. The overall request
/// deadline is enforced by the caller's navigation timeout, so only the
/// connect phase is bounded here.
pub fn build_http_client(user_agent: &str) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Engine handing out one reqwest client per session
#[derive(Debug, Default)]
pub struct HttpEngine;

impl HttpEngine {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RenderEngine for HttpEngine {
    async fn open_session(
        &self,
        user_agent: &str,
    ) -> Result<Box<dyn RenderSession>, RenderError> {
        let client = build_http_client(user_agent)?;
        Ok(Box::new(HttpSession {
            client,
            current: None,
        }))
    }

    async fn shutdown(&self) -> Result<(), RenderError> {
        Ok(())
    }
}

/// A session backed by a single HTTP client
struct HttpSession {
    client: Client,
    current: Option<RenderedDocument>,
}

#[async_trait]
impl RenderSession for HttpSession {
    async fn navigate(&mut self, url: &str) -> Result<(), RenderError> {
        self.current = None;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| RenderError::Navigation {
                url: url.to_string(),
                message: classify_request_error(&e),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RenderError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(mime_essence)
            .unwrap_or_default();

        let html = response.text().await.map_err(|e| RenderError::Navigation {
            url: url.to_string(),
            message: format!("failed to read body: {}", e),
        })?;

        self.current = Some(RenderedDocument { content_type, html });
        Ok(())
    }

    async fn document(&mut self) -> Result<RenderedDocument, RenderError> {
        self.current
            .take()
            .ok_or_else(|| RenderError::Extract("no document loaded".to_string()))
    }

    async fn close(&mut self) -> Result<(), RenderError> {
        self.current = None;
        Ok(())
    }
}

fn classify_request_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "request timeout".to_string()
    } else if e.is_connect() {
        format!("connection failed: {}", e)
    } else {
        e.to_string()
    }
}
