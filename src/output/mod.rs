//! Output module for building the static mirror
//!
//! This module handles:
//! - Mapping crawled URLs onto files under the output root
//! - Rewriting the crawled origin to the mirror's domain
//! - Persisting finished pages to disk

mod paths;
mod rewrite;

pub use paths::{map_output_path, OutputLocation};
pub use rewrite::rewrite_origin;

use url::Url;

/// A finished page and where it goes
#[derive(Debug, Clone)]
pub struct OutputRecord {
    pub location: OutputLocation,

    /// Header followed by the rewritten HTML
    pub contents: String,
}

impl OutputRecord {
    /// Builds the record for a rendered page
    ///
    /// # Arguments
    ///
    /// * `html` - Raw HTML extracted from the page
    /// * `page_url` - The URL the HTML was rendered from; its origin is rewritten
    /// * `location` - Where the page goes under the mirror root
    /// * `domain` - Replacement for the page's origin
    /// * `header` - String written before the HTML
    pub fn build(
        html: &str,
        page_url: &Url,
        location: OutputLocation,
        domain: &str,
        header: &str,
    ) -> Self {
        Self {
            location,
            contents: rewrite_origin(html, page_url, domain, header),
        }
    }

    /// Ensures the directory exists and writes the file
    pub async fn write(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.location.dir).await?;
        tokio::fs::write(&self.location.file, self.contents.as_bytes()).await
    }
}
