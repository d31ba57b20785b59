//! Configuration module for pagemirror
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files, and resolving them into an immutable [`CrawlJob`].
//!
//! # Example
//!
//! ```no_run
//! use pagemirror::config::{load_config, CrawlJob};
//! use std::path::Path;
//!
//! let config = load_config(Path::new("mirror.toml")).unwrap();
//! let job = CrawlJob::from_config(&config).unwrap();
//! println!("Mirroring {} paths from {}", job.paths.len(), job.host);
//! ```

mod job;
mod parser;
mod types;
mod validation;

// Re-export types
pub use job::CrawlJob;
pub use types::{
    BrowserLaunchConfig, Config, CrawlConfig, EngineKind, OutputConfig, UserAgentConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
