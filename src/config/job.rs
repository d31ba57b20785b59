//! Resolved, immutable crawl job
//!
//! A [`CrawlJob`] is built once from a validated [`Config`] and shared
//! read-only by every fetch lane for the lifetime of a crawl.

use crate::config::types::{BrowserLaunchConfig, Config, EngineKind};
use crate::config::validation::{normalize_host, validate, validate_path};
use crate::output::{map_output_path, OutputLocation};
use crate::ConfigError;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Everything a crawl needs, resolved from configuration
#[derive(Debug, Clone)]
pub struct CrawlJob {
    /// Origin being crawled, without a trailing slash
    pub host: String,

    /// Ordered paths to visit
    pub paths: Vec<String>,

    /// Directory the mirror is written under
    pub output_root: PathBuf,

    /// Pause after each successful navigation
    pub delay: Duration,

    /// Upper bound on one navigation
    pub navigation_timeout: Duration,

    pub user_agent: String,

    /// Header written before every page
    pub html_prefix: String,

    /// Number of concurrent fetch lanes
    pub concurrency: usize,

    /// Retries per URL after the first failed attempt
    pub max_retries: u32,

    /// Replacement for the crawled origin
    pub domain: String,

    pub engine: EngineKind,

    pub browser: BrowserLaunchConfig,
}

impl CrawlJob {
    /// Validates a configuration and resolves it into a crawl job
    ///
    /// Inline paths come first, followed by the entries of `paths-file`
    /// when one is configured.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlJob)` - The resolved job
    /// * `Err(ConfigError)` - Validation failed, or the paths file could not be read
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        validate(config)?;

        let mut paths = config.crawl.paths.clone();

        if let Some(file) = &config.crawl.paths_file {
            paths.extend(read_paths_file(file)?);
        }

        if paths.is_empty() {
            return Err(ConfigError::Validation(
                "no paths to crawl".to_string(),
            ));
        }

        Ok(Self {
            host: normalize_host(&config.crawl.host).to_string(),
            paths,
            output_root: config.output.root.clone(),
            delay: Duration::from_millis(config.crawl.delay_ms),
            navigation_timeout: Duration::from_millis(config.crawl.navigation_timeout_ms),
            user_agent: config.user_agent.value.clone(),
            html_prefix: config.output.html_prefix.clone(),
            concurrency: config.crawl.concurrency as usize,
            max_retries: config.crawl.retry_count,
            domain: config.output.domain.clone(),
            engine: config.crawl.engine,
            browser: config.browser.clone(),
        })
    }

    /// Builds the full URL for a crawl path
    pub fn page_url(&self, path: &str) -> String {
        format!("{}{}", self.host, path)
    }

    /// Where the page for a crawl path is written
    ///
    /// Mapping works on the path exactly as configured, so the file name
    /// keeps spaces and non-ASCII characters rather than their
    /// percent-encoded form.
    pub fn output_location(&self, path: &str) -> OutputLocation {
        let mapped = map_output_path(&self.page_url(path), &self.host);
        OutputLocation::resolve(&self.output_root, &mapped)
    }
}

/// Reads a newline-separated list of paths, skipping blanks and `#` comments
fn read_paths_file(file: &Path) -> Result<Vec<String>, ConfigError> {
    let content = std::fs::read_to_string(file)?;
    parse_paths(&content)
}

fn parse_paths(content: &str) -> Result<Vec<String>, ConfigError> {
    let mut paths = Vec::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        validate_path(line)?;
        paths.push(line.to_string());
    }

    Ok(paths)
}
