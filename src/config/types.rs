use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Main configuration structure for pagemirror
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawl: CrawlConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub browser: BrowserLaunchConfig,
}

/// Crawl behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CrawlConfig {
    /// Origin to crawl, e.g. `https://example.com`
    pub host: String,

    /// Paths to visit, each beginning with `/`
    #[serde(default)]
    pub paths: Vec<String>,

    /// Optional newline-separated file of additional paths
    pub paths_file: Option<PathBuf>,

    /// Number of concurrent rendering sessions
    pub concurrency: u32,

    /// Retries per URL after the first failed attempt
    #[serde(default)]
    pub retry_count: u32,

    /// Pause after each successful navigation (milliseconds)
    #[serde(default)]
    pub delay_ms: u64,

    /// Upper bound on a single navigation (milliseconds)
    #[serde(default = "default_navigation_timeout_ms")]
    pub navigation_timeout_ms: u64,

    /// Rendering engine used for every session
    #[serde(default)]
    pub engine: EngineKind,
}

fn default_navigation_timeout_ms() -> u64 {
    10_000
}

/// User agent sent by every rendering session
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    pub value: String,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Directory the mirror tree is written under
    pub root: PathBuf,

    /// String written verbatim before every page
    #[serde(default)]
    pub html_prefix: String,

    /// Replacement for the crawled origin inside saved pages
    pub domain: String,
}

/// Launch options handed to the headless browser engine
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BrowserLaunchConfig {
    /// Chromium binary; autodetected when unset
    pub executable: Option<PathBuf>,

    #[serde(default = "default_headless")]
    pub headless: bool,

    #[serde(default)]
    pub no_sandbox: bool,

    /// Extra command line arguments for the browser process
    #[serde(default)]
    pub args: Vec<String>,
}

fn default_headless() -> bool {
    true
}

impl Default for BrowserLaunchConfig {
    fn default() -> Self {
        Self {
            executable: None,
            headless: default_headless(),
            no_sandbox: false,
            args: Vec::new(),
        }
    }
}

/// Which rendering engine drives the sessions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    /// Plain HTTP GET through reqwest
    #[default]
    Http,

    /// Headless Chromium (requires the `browser` feature)
    Browser,
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http => write!(f, "http"),
            Self::Browser => write!(f, "browser"),
        }
    }
}

impl FromStr for EngineKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "http" => Ok(Self::Http),
            "browser" => Ok(Self::Browser),
            other => Err(format!(
                "unknown engine '{}', expected 'http' or 'browser'",
                other
            )),
        }
    }
}
