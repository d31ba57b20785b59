//! Mapping crawled URLs onto files in the mirror tree

use std::path::{Path, PathBuf};

/// Default document for directory-style URLs
const INDEX_FILE: &str = "index.html";

/// Converts a crawled URL into a path relative to the output root
///
/// The host is stripped from the front of the URL. A trailing `/` gets
/// `index.html` appended; a final segment without a `.` is treated as a
/// directory and gets `/index.html`; anything else is kept as is.
///
/// # Example
///
/// ```
/// use pagemirror::map_output_path;
///
/// assert_eq!(map_output_path("https://site.test/a/b", "https://site.test"), "/a/b/index.html");
/// ```
pub fn map_output_path(url: &str, host: &str) -> String {
    let mut path = url.strip_prefix(host).unwrap_or(url).to_string();

    if path.ends_with('/') {
        path.push_str(INDEX_FILE);
    } else if !last_segment(&path).contains('.') {
        path.push('/');
        path.push_str(INDEX_FILE);
    }

    path
}

fn last_segment(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Where one page lands on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLocation {
    /// The file to write
    pub file: PathBuf,

    /// The directory that must exist before writing
    pub dir: PathBuf,
}

impl OutputLocation {
    /// Joins a mapped path onto the output root
    ///
    /// The mapped path always starts with `/`; it is appended to the root
    /// rather than replacing it.
    pub fn resolve(output_root: &Path, mapped: &str) -> Self {
        let file = output_root.join(mapped.trim_start_matches('/'));
        let dir = file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| output_root.to_path_buf());
        Self { file, dir }
    }
}
