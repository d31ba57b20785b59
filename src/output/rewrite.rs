//! Origin rewriting for saved pages

use url::Url;

/// Rewrites a page so it can be served from `domain`
///
/// Every literal occurrence of the page's origin (scheme, host and any
/// non-default port) is replaced with `domain`, and `header` is written in
/// front of the result. The HTML is treated as plain text.
///
/// # Example
///
/// ```
/// use pagemirror::rewrite_origin;
/// use url::Url;
///
/// let page = Url::parse("https://example.com/x").unwrap();
/// let out = rewrite_origin(r#"<a href="https://example.com/x">"#, &page, "https://mirror.test", "<!-- m -->");
/// assert_eq!(out, r#"<!-- m --><a href="https://mirror.test/x">"#);
/// ```
pub fn rewrite_origin(html: &str, page_url: &Url, domain: &str, header: &str) -> String {
    let origin = page_url.origin().ascii_serialization();
    let rewritten = html.replace(&origin, domain);

    let mut output = String::with_capacity(header.len() + rewritten.len());
    output.push_str(header);
    output.push_str(&rewritten);
    output
}
