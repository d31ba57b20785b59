use crate::config::types::{Config, CrawlConfig, OutputConfig, UserAgentConfig};
use crate::ConfigError;
use url::Url;

/// Upper bound on concurrent rendering sessions
const MAX_CONCURRENCY: u32 = 64;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawl_config(&config.crawl)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawl configuration
fn validate_crawl_config(config: &CrawlConfig) -> Result<(), ConfigError> {
    validate_host(&config.host)?;

    if config.concurrency < 1 || config.concurrency > MAX_CONCURRENCY {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and {}, got {}",
            MAX_CONCURRENCY, config.concurrency
        )));
    }

    if config.navigation_timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "navigation_timeout_ms must be greater than 0".to_string(),
        ));
    }

    if config.paths.is_empty() && config.paths_file.is_none() {
        return Err(ConfigError::Validation(
            "at least one path or a paths_file is required".to_string(),
        ));
    }

    for path in &config.paths {
        validate_path(path)?;
    }

    Ok(())
}

/// Validates that the host is a bare http(s) origin
///
/// A single trailing `/` is tolerated; anything else after the authority
/// (path, query, fragment) is rejected, as is any spelling that differs
/// from the origin's canonical form. Path mapping strips the host as a
/// literal prefix, so the two must match exactly.
pub(crate) fn validate_host(host: &str) -> Result<(), ConfigError> {
    let trimmed = normalize_host(host);
    let url = Url::parse(trimmed)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid host '{}': {}", host, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "host '{}' must use the http or https scheme",
            host
        )));
    }

    if url.path() != "/" || url.query().is_some() || url.fragment().is_some() {
        return Err(ConfigError::Validation(format!(
            "host '{}' must be an origin without path, query or fragment",
            host
        )));
    }

    let origin = url.origin().ascii_serialization();
    if origin != trimmed {
        return Err(ConfigError::Validation(format!(
            "host '{}' must be written in canonical form '{}'",
            host, origin
        )));
    }

    Ok(())
}

/// Strips one trailing `/` from a host origin
pub(crate) fn normalize_host(host: &str) -> &str {
    host.strip_suffix('/').unwrap_or(host)
}

/// Validates a single crawl path
pub(crate) fn validate_path(path: &str) -> Result<(), ConfigError> {
    if !path.starts_with('/') {
        return Err(ConfigError::Validation(format!(
            "path '{}' must begin with '/'",
            path
        )));
    }

    if path.split('/').any(|segment| segment == "..") {
        return Err(ConfigError::Validation(format!(
            "path '{}' must not contain '..' segments",
            path
        )));
    }
    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.value.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user agent cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.root.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "output root cannot be empty".to_string(),
        ));
    }

    if config.domain.is_empty() {
        return Err(ConfigError::Validation(
            "output domain cannot be empty".to_string(),
        ));
    }

    Ok(())
}
