//! pagemirror: a static site mirror builder
//!
//! This crate renders a fixed list of paths under one host with a pool of
//! concurrent rendering sessions, rewrites the host's origin to a target
//! domain, and writes every page into a mirrored directory tree.

pub mod config;
pub mod crawler;
pub mod output;
pub mod render;

use thiserror::Error;

pub use crawler::FetchError;
pub use render::RenderError;

/// Main error type for pagemirror operations
#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Render engine error: {0}")]
    Render(#[from] RenderError),

    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("URL parse error for {url}: {source}")]
    UrlParse {
        url: String,
        source: ::url::ParseError,
    },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for pagemirror operations
pub type Result<T> = std::result::Result<T, MirrorError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::{Config, CrawlJob};
pub use output::{map_output_path, rewrite_origin, OutputRecord};
