//! Integration tests for the crawler
//!
//! These tests use wiremock to stand up the crawled site and run full
//! crawls through the HTTP engine into a temporary mirror directory.

use pagemirror::config::{
    load_config, BrowserLaunchConfig, Config, CrawlConfig, CrawlJob, EngineKind, OutputConfig,
    UserAgentConfig,
};
use pagemirror::crawler::{crawl, run_crawl};
use pagemirror::render::{RenderEngine, RenderError, RenderSession, RenderedDocument};
use pagemirror::{FetchError, MirrorError};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const HEADER: &str = "<!-- mirrored -->";
const MIRROR: &str = "https://mirror.test";

/// Creates a test configuration crawling `host` into `root`
fn create_test_config(host: &str, paths: &[&str], root: &Path, retry_count: u32) -> Config {
    Config {
        crawl: CrawlConfig {
            host: host.to_string(),
            paths: paths.iter().map(|p| p.to_string()).collect(),
            paths_file: None,
            concurrency: 1,
            retry_count,
            delay_ms: 10, // Very short for testing
            navigation_timeout_ms: 2_000,
            engine: EngineKind::Http,
        },
        user_agent: UserAgentConfig {
            value: "MirrorBot/1.0".to_string(),
        },
        output: OutputConfig {
            root: root.to_path_buf(),
            html_prefix: HEADER.to_string(),
            domain: MIRROR.to_string(),
        },
        browser: BrowserLaunchConfig::default(),
    }
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html; charset=utf-8")
}

#[tokio::test]
async fn test_full_crawl_mirrors_pages() {
    let mock_server = MockServer::start().await;
    let host = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("user-agent", "MirrorBot/1.0"))
        .respond_with(html(format!(
            r#"<a href="{host}/about">About</a><img src="{host}/logo.png">"#
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/about"))
        .respond_with(html(format!(r#"<a href="{host}/">Home</a>"#)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(&host, &["/", "/about"], dir.path(), 0);

    let report = crawl(config).await.expect("crawl should succeed");
    assert_eq!(report.pages_written, 2);

    let index = std::fs::read_to_string(dir.path().join("index.html")).unwrap();
    assert_eq!(
        index,
        format!(r#"{HEADER}<a href="{MIRROR}/about">About</a><img src="{MIRROR}/logo.png">"#)
    );

    let about = std::fs::read_to_string(dir.path().join("about/index.html")).unwrap();
    assert_eq!(about, format!(r#"{HEADER}<a href="{MIRROR}/">Home</a>"#));
    assert!(!about.contains(&host));
}

#[tokio::test]
async fn test_concurrent_lanes_cover_every_path() {
    let mock_server = MockServer::start().await;
    let host = mock_server.uri();

    Mock::given(method("GET"))
        .respond_with(html("<p>page</p>".to_string()))
        .expect(8)
        .mount(&mock_server)
        .await;

    let paths = [
        "/", "/a", "/b/", "/c.html", "/d/e", "/d/f/", "/g", "/h.htm",
    ];
    let dir = tempfile::tempdir().unwrap();
    let mut config = create_test_config(&host, &paths, dir.path(), 0);
    config.crawl.concurrency = 3;

    let report = crawl(config).await.expect("crawl should succeed");
    assert_eq!(report.pages_written, paths.len());

    for file in [
        "index.html",
        "a/index.html",
        "b/index.html",
        "c.html",
        "d/e/index.html",
        "d/f/index.html",
        "g/index.html",
        "h.htm",
    ] {
        assert!(dir.path().join(file).is_file(), "missing {}", file);
    }
}

#[tokio::test]
async fn test_transient_failure_is_retried() {
    let mock_server = MockServer::start().await;
    let host = mock_server.uri();

    // First request fails, later ones succeed
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(html("<p>recovered</p>".to_string()))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(&host, &["/flaky"], dir.path(), 2);

    let report = crawl(config).await.expect("crawl should succeed");
    assert_eq!(report.retries, 1);

    let page = std::fs::read_to_string(dir.path().join("flaky/index.html")).unwrap();
    assert_eq!(page, format!("{HEADER}<p>recovered</p>"));
}

#[tokio::test]
async fn test_non_html_page_fails_crawl() {
    let mock_server = MockServer::start().await;
    let host = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/report"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("%PDF-1.7")
                .insert_header("content-type", "application/pdf"),
        )
        .expect(3)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(&host, &["/report"], dir.path(), 2);

    let result = crawl(config).await;
    assert!(matches!(
        result,
        Err(MirrorError::Fetch(FetchError::NotHtml { .. }))
    ));
    assert!(!dir.path().join("report/index.html").exists());
}

#[tokio::test]
async fn test_earlier_pages_survive_a_failed_crawl() {
    let mock_server = MockServer::start().await;
    let host = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html("<p>home</p>".to_string()))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(&host, &["/", "/missing"], dir.path(), 0);

    let result = crawl(config).await;
    assert!(matches!(
        result,
        Err(MirrorError::Fetch(FetchError::Navigation { .. }))
    ));
    assert!(dir.path().join("index.html").is_file());
}

#[tokio::test]
async fn test_crawl_from_config_file() {
    let mock_server = MockServer::start().await;
    let host = mock_server.uri();

    Mock::given(method("GET"))
        .respond_with(html(format!(r#"<link href="{host}/site.css">"#)))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("webroot");
    std::fs::write(dir.path().join("paths.txt"), "# pages\n/docs/\n/docs/intro\n").unwrap();

    let config_path = dir.path().join("mirror.toml");
    std::fs::write(
        &config_path,
        format!(
            r#"
[crawl]
host = "{host}"
paths = ["/"]
paths-file = "paths.txt"
concurrency = 2

[user-agent]
value = "MirrorBot/1.0"

[output]
root = "{root}"
html-prefix = "<!DOCTYPE html>"
domain = "https://mirror.test"
"#,
            root = root.display()
        ),
    )
    .unwrap();

    let config = load_config(&config_path).unwrap();
    let report = crawl(config).await.expect("crawl should succeed");
    assert_eq!(report.pages_written, 3);

    let intro = std::fs::read_to_string(root.join("docs/intro/index.html")).unwrap();
    assert_eq!(intro, format!(r#"<!DOCTYPE html><link href="{MIRROR}/site.css">"#));
}

#[tokio::test]
async fn test_crawl_writes_where_dry_run_reports() {
    let mock_server = MockServer::start().await;
    let host = mock_server.uri();

    Mock::given(method("GET"))
        .respond_with(html("<p>page</p>".to_string()))
        .expect(3)
        .mount(&mock_server)
        .await;

    let paths = ["/a b", "/café", "/notes/résumé.html"];
    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(&host, &paths, dir.path(), 0);
    let planned: Vec<_> = {
        let job = CrawlJob::from_config(&config).unwrap();
        paths.iter().map(|p| job.output_location(p).file).collect()
    };

    crawl(config).await.expect("crawl should succeed");

    for file in &planned {
        assert!(file.is_file(), "missing {}", file.display());
    }
    assert!(dir.path().join("a b/index.html").is_file());
    assert!(dir.path().join("café/index.html").is_file());
    assert!(dir.path().join("notes/résumé.html").is_file());
}

/// Engine whose documents are never HTML, counting session lifecycle calls
#[derive(Default)]
struct ScriptedEngine {
    opened: Arc<AtomicUsize>,
    closed: Arc<AtomicUsize>,
    attempts: Arc<AtomicUsize>,
    shutdown: Arc<AtomicUsize>,
}

struct ScriptedSession {
    closed: Arc<AtomicUsize>,
    attempts: Arc<AtomicUsize>,
}

#[async_trait::async_trait]
impl RenderEngine for ScriptedEngine {
    async fn open_session(
        &self,
        _user_agent: &str,
    ) -> Result<Box<dyn RenderSession>, RenderError> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedSession {
            closed: Arc::clone(&self.closed),
            attempts: Arc::clone(&self.attempts),
        }))
    }

    async fn shutdown(&self) -> Result<(), RenderError> {
        self.shutdown.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait::async_trait]
impl RenderSession for ScriptedSession {
    async fn navigate(&mut self, _url: &str) -> Result<(), RenderError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn document(&mut self) -> Result<RenderedDocument, RenderError> {
        Ok(RenderedDocument {
            content_type: "image/svg+xml".to_string(),
            html: String::new(),
        })
    }

    async fn close(&mut self) -> Result<(), RenderError> {
        self.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[tokio::test]
async fn test_failed_crawl_releases_all_sessions() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = create_test_config("https://site.test", &["/logo"], dir.path(), 3);
    config.crawl.concurrency = 4;
    config.crawl.delay_ms = 0;
    let job = CrawlJob::from_config(&config).unwrap();

    let engine = ScriptedEngine::default();
    let opened = Arc::clone(&engine.opened);
    let closed = Arc::clone(&engine.closed);
    let attempts = Arc::clone(&engine.attempts);
    let shutdown = Arc::clone(&engine.shutdown);

    let result = run_crawl(job, Box::new(engine)).await;

    assert!(matches!(
        result,
        Err(MirrorError::Fetch(FetchError::NotHtml { .. }))
    ));
    assert_eq!(attempts.load(Ordering::SeqCst), 4);
    assert_eq!(opened.load(Ordering::SeqCst), 4);
    assert_eq!(closed.load(Ordering::SeqCst), 4);
    assert_eq!(shutdown.load(Ordering::SeqCst), 1);
}
