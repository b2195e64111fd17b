//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and run the full
//! crawl cycle end-to-end into a temporary output directory.

use anchor_crawl::config::Config;
use anchor_crawl::crawler::{crawl, Coordinator};
use anchor_crawl::{MirrorError, SkipReason};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// One-pixel PNG header bytes; enough to be served as an image
const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.as_bytes().to_vec(), "text/html; charset=utf-8")
}

async fn mount_page(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html(body))
        .mount(server)
        .await;
}

fn test_config() -> Config {
    let mut config = Config::default();
    config.user_agent.crawler_name = "TestBot".to_string();
    config.crawler.request_timeout_secs = 5;
    config.crawler.connect_timeout_secs = 2;
    config
}

fn read(root: &Path, rel: &str) -> String {
    std::fs::read_to_string(root.join(rel))
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", rel, e))
}

/// Every file under `root`, keyed by relative path
fn snapshot(root: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    fn walk(root: &Path, dir: &Path, out: &mut BTreeMap<PathBuf, Vec<u8>>) {
        for entry in std::fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                walk(root, &path, out);
            } else {
                let rel = path.strip_prefix(root).unwrap().to_path_buf();
                out.insert(rel, std::fs::read(&path).unwrap());
            }
        }
    }

    let mut out = BTreeMap::new();
    walk(root, root, &mut out);
    out
}

#[tokio::test]
async fn test_index_about_and_summary() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        r#"<html><head><title>Home</title></head><body>
            <nav><a href="/">Home</a></nav>
            <main><h1>Welcome Home</h1><p>Start here, then read <a href="/about">about us</a>.</p></main>
        </body></html>"#,
    )
    .await;

    mount_page(
        &server,
        "/about",
        r#"<html><head><title>About</title></head><body>
            <main><h1>About This Site</h1><p>We write things down.</p></main>
        </body></html>"#,
    )
    .await;

    let out = TempDir::new().unwrap();
    let report = crawl(&format!("{}/", server.uri()), out.path(), test_config())
        .await
        .expect("Crawl failed");

    assert_eq!(report.pages_written, 2);
    assert_eq!(report.pages_skipped(), 0);
    assert_eq!(report.summaries_written, 1);

    let index = read(out.path(), "index.md");
    assert!(index.contains("Welcome Home"));
    assert!(index.contains("Start here"));

    let about = read(out.path(), "about.md");
    assert!(about.contains("About This Site"));
    assert!(about.contains("We write things down."));

    let summary = read(out.path(), "_summary.md");
    assert!(summary.contains("Path: `/`"));
    assert!(summary.contains("- [About This Site](about.md)"));
    assert!(summary.contains("- [Welcome Home](index.md)"));
}

#[tokio::test]
async fn test_page_without_content_region_is_skipped() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        r#"<html><body><main><p>Home</p><a href="/blank">Blank</a></main></body></html>"#,
    )
    .await;
    mount_page(&server, "/blank", "<html><head><title>Blank</title></head><body>  </body></html>").await;

    let out = TempDir::new().unwrap();
    let report = crawl(&format!("{}/", server.uri()), out.path(), test_config())
        .await
        .unwrap();

    assert_eq!(report.pages_written, 1);
    assert_eq!(report.skipped_for(SkipReason::ExtractionEmpty), 1);
    assert!(out.path().join("index.md").exists());
    assert!(!out.path().join("blank.md").exists());
}

#[tokio::test]
async fn test_failed_image_dropped_others_inlined() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        r#"<html><body>
            <header><img src="/logo.png" alt="Logo"></header>
            <main>
                <h1>Gallery Page</h1>
                <img src="/ok.png" alt="Fine">
                <img src="/missing.png" alt="Gone">
            </main>
        </body></html>"#,
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/ok.png"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(PNG_BYTES.to_vec(), "image/png"),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/missing.png"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    // The logo sits outside the content region and must never be requested
    Mock::given(method("GET"))
        .and(path("/logo.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(PNG_BYTES.to_vec()))
        .expect(0)
        .mount(&server)
        .await;

    let out = TempDir::new().unwrap();
    let report = crawl(&format!("{}/", server.uri()), out.path(), test_config())
        .await
        .unwrap();

    assert_eq!(report.pages_written, 1);
    assert_eq!(report.images_inlined, 1);
    assert_eq!(report.images_dropped, 1);

    let index = read(out.path(), "index.md");
    assert!(index.contains("Gallery Page"));
    assert!(index.contains("data:image/png;base64,iVBORw0KGgo="));
    assert!(!index.contains("missing.png"));
    assert!(!index.contains("ok.png"));
    assert!(!index.contains("logo.png"));
}

#[tokio::test]
async fn test_each_identity_fetched_at_most_once() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        r#"<html><body><main>
            <p>Links</p>
            <a href="/docs">Docs</a>
            <a href="/docs/">Docs again</a>
            <a href="/docs#install">Install</a>
            <a href="/docs?utm_source=newsletter">Tracked</a>
            <a href="https://elsewhere.example/page">Elsewhere</a>
            <a href="mailto:team@example.com">Mail</a>
        </main></body></html>"#,
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/docs"))
        .respond_with(html(
            r#"<html><body><main><p>Docs body</p><a href="/">Back</a><a href="/docs">Self</a></main></body></html>"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let out = TempDir::new().unwrap();
    let report = crawl(&format!("{}/", server.uri()), out.path(), test_config())
        .await
        .unwrap();

    assert_eq!(report.pages_written, 2);
    assert_eq!(report.cross_domain_links, 1);
    assert!(out.path().join("docs.md").exists());
}

#[tokio::test]
async fn test_depth_first_order_and_nested_summaries() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        r#"<html><body><main><p>Root</p><a href="/guide/a">A</a><a href="/guide/b">B</a></main></body></html>"#,
    )
    .await;
    mount_page(
        &server,
        "/guide/a",
        r#"<html><body><main><h2>Guide Part A</h2><a href="/guide/a/deep">Deeper</a></main></body></html>"#,
    )
    .await;
    mount_page(
        &server,
        "/guide/b",
        r#"<html><body><main><h2>Guide Part B</h2></main></body></html>"#,
    )
    .await;
    mount_page(
        &server,
        "/guide/a/deep",
        r#"<html><body><article><p>Deep content</p></article></body></html>"#,
    )
    .await;

    let out = TempDir::new().unwrap();
    let report = crawl(&format!("{}/", server.uri()), out.path(), test_config())
        .await
        .unwrap();

    // Last discovered link is processed first
    assert_eq!(
        report.written_paths,
        vec![
            PathBuf::from("index.md"),
            PathBuf::from("guide/b.md"),
            PathBuf::from("guide/a.md"),
            PathBuf::from("guide/a/deep.md"),
        ]
    );

    let root = read(out.path(), "_summary.md");
    assert!(root.contains("- [guide/](guide/_summary.md)"));

    let guide = read(out.path(), "guide/_summary.md");
    assert!(guide.contains("Path: `/guide`"));
    assert!(guide.contains("- [Guide Part A](a.md)"));
    assert!(guide.contains("- [Guide Part B](b.md)"));
    assert!(guide.contains("- [a/](a/_summary.md)"));

    let deep = read(out.path(), "guide/a/_summary.md");
    assert!(deep.contains("- [deep](deep.md)"));
}

#[tokio::test]
async fn test_rerun_is_byte_identical() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        r#"<html><body><main><h1>Stable Home</h1><img src="/pic.png"><a href="/blog/post?id=7">Post</a></main></body></html>"#,
    )
    .await;
    mount_page(
        &server,
        "/blog/post",
        r#"<html><body><main><h1>Stable Post</h1><p>Same every time.</p></main></body></html>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/pic.png"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(PNG_BYTES.to_vec(), "image/png"),
        )
        .mount(&server)
        .await;

    let seed = format!("{}/", server.uri());

    let first = TempDir::new().unwrap();
    crawl(&seed, first.path(), test_config()).await.unwrap();
    let first_snapshot = snapshot(first.path());

    // Second run over the same tree overwrites in place
    crawl(&seed, first.path(), test_config()).await.unwrap();
    assert_eq!(snapshot(first.path()), first_snapshot);

    // A fresh tree comes out identical too
    let second = TempDir::new().unwrap();
    crawl(&seed, second.path(), test_config()).await.unwrap();
    assert_eq!(snapshot(second.path()), first_snapshot);

    assert!(first_snapshot
        .keys()
        .any(|p| p.starts_with("blog") && p.to_string_lossy().contains("post-")));
}

#[tokio::test]
async fn test_page_limit_stops_crawl() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        r#"<html><body><main><p>Root</p><a href="/one">1</a><a href="/two">2</a><a href="/three">3</a></main></body></html>"#,
    )
    .await;
    for route in ["/one", "/two", "/three"] {
        mount_page(&server, route, "<html><body><main><p>Leaf</p></main></body></html>").await;
    }

    let mut config = test_config();
    config.crawler.max_pages = Some(2);
    config.output.summaries = false;

    let out = TempDir::new().unwrap();
    let report = Coordinator::new(&format!("{}/", server.uri()), out.path(), config)
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(report.pages_written, 2);
    assert_eq!(report.pages_remaining, 2);
    assert!(!out.path().join("_summary.md").exists());
}

#[tokio::test]
async fn test_non_html_and_http_errors_are_skipped() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        r#"<html><body><main><p>Root</p><a href="/data.json">Data</a><a href="/gone">Gone</a></main></body></html>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/data.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(b"{}".to_vec(), "application/json"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let out = TempDir::new().unwrap();
    let report = crawl(&format!("{}/", server.uri()), out.path(), test_config())
        .await
        .unwrap();

    assert_eq!(report.pages_written, 1);
    assert_eq!(report.skipped_for(SkipReason::NotHtml), 1);
    assert_eq!(report.skipped_for(SkipReason::FetchFailed), 1);
}

#[tokio::test]
async fn test_seed_failure_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let out = TempDir::new().unwrap();
    let result = crawl(&format!("{}/", server.uri()), out.path(), test_config()).await;

    match result {
        Err(MirrorError::SeedUnavailable { reason, .. }) => assert!(reason.contains("503")),
        other => panic!("Expected seed failure, got {:?}", other.map(|r| r.pages_written)),
    }
}

#[tokio::test]
async fn test_redirect_stored_under_requested_identity() {
    let server = MockServer::start().await;

    // /new is discovered first, so /old is popped first
    mount_page(
        &server,
        "/",
        r#"<html><body><main><p>Root</p><a href="/new">New</a><a href="/old">Old</a></main></body></html>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/new/"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/new/"))
        .respond_with(html(
            r#"<html><body><main><h1>Moved Page</h1><a href="/">Home</a></main></body></html>"#,
        ))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(html("<html><body><main><p>Fetched twice</p></main></body></html>"))
        .expect(0)
        .mount(&server)
        .await;

    let out = TempDir::new().unwrap();
    let report = crawl(&format!("{}/", server.uri()), out.path(), test_config())
        .await
        .unwrap();

    assert_eq!(
        report.written_paths,
        vec![PathBuf::from("index.md"), PathBuf::from("old.md")]
    );
    assert_eq!(report.pages_skipped(), 0);
    assert!(read(out.path(), "old.md").contains("Moved Page"));
    assert!(!out.path().join("new.md").exists());
}

#[tokio::test]
async fn test_summary_write_failure_does_not_fail_crawl() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        r#"<html><body><main><h1>Only Page</h1></main></body></html>"#,
    )
    .await;

    let out = TempDir::new().unwrap();
    // A directory where the root anchor should go makes its write fail
    std::fs::create_dir(out.path().join("_summary.md")).unwrap();

    let report = crawl(&format!("{}/", server.uri()), out.path(), test_config())
        .await
        .expect("Crawl should survive a failed anchor write");

    assert_eq!(report.pages_written, 1);
    assert_eq!(report.summaries_written, 0);
    assert_eq!(report.summaries_failed, 1);
    assert!(out.path().join("index.md").is_file());
}
