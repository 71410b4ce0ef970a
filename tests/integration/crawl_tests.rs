//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and tempfile for
//! scratch output directories, and run the full crawl cycle end-to-end.

use sitegrab::config::{Config, Traversal};
use sitegrab::crawler::run_crawl;
use sitegrab::state::{PageOutcome, StopReason};
use sitegrab::storage::{FrontierStore, SNAPSHOT_FILENAME};
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration crawling the mock server into `dir`
fn create_test_config(server: &MockServer, dir: &TempDir) -> Config {
    Config::for_site(
        format!("{}/", server.uri()),
        dir.path().to_string_lossy(),
    )
}

/// Mounts a GET handler answering `route` with an HTML body
async fn mount_page(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .expect(1)
        .mount(server)
        .await;
}

fn open_snapshot(dir: &Path) -> FrontierStore {
    FrontierStore::open(dir, Traversal::default()).expect("snapshot should load")
}

fn read_page(dir: &Path, relative: &str) -> String {
    std::fs::read_to_string(dir.join(relative))
        .unwrap_or_else(|e| panic!("{} should exist: {}", relative, e))
}

/// Paths requested from the server, in order
async fn requested_paths(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|r| r.url.path().to_string())
        .collect()
}

#[tokio::test]
async fn test_full_crawl_writes_every_page() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(
        &server,
        "/",
        r#"<html><head><title>Home</title></head><body>
            <a href="/a">A</a>
            <a href="/b">B</a>
        </body></html>"#,
    )
    .await;
    mount_page(&server, "/a", r#"<html><body>A <a href="/">home</a></body></html>"#).await;
    mount_page(&server, "/b", "<html><body>B</body></html>").await;

    let stats = run_crawl(create_test_config(&server, &dir), false)
        .await
        .expect("crawl should succeed");

    assert_eq!(stats.stop_reason, Some(StopReason::FrontierExhausted));
    assert_eq!(stats.count(PageOutcome::Fetched), 3);
    assert_eq!(stats.links_discovered, 2);
    assert_eq!(stats.pending, 0);

    assert!(read_page(dir.path(), "index.html").contains("Home"));
    assert!(read_page(dir.path(), "a.html").contains("A"));
    assert!(read_page(dir.path(), "b.html").contains("B"));

    let snapshot = open_snapshot(dir.path());
    assert_eq!(snapshot.fetched().len(), 3);
    assert!(snapshot.unfetched().is_empty());
    let a_url = format!("{}/a", server.uri());
    assert!(snapshot.fetched().values().any(|r| r.url == a_url));
}

#[tokio::test]
async fn test_duplicate_content_written_once() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(
        &server,
        "/",
        r#"<a href="/p1">1</a><a href="/p2">2</a>"#,
    )
    .await;
    mount_page(&server, "/p1", "<html>same</html>").await;
    mount_page(&server, "/p2", "<html>same</html>").await;

    let stats = run_crawl(create_test_config(&server, &dir), false)
        .await
        .unwrap();

    assert_eq!(stats.count(PageOutcome::Fetched), 2);
    assert_eq!(stats.count(PageOutcome::Duplicate), 1);
    assert_eq!(stats.network_fetches(), 3);

    assert!(dir.path().join("p1.html").exists());
    assert!(!dir.path().join("p2.html").exists());

    let snapshot = open_snapshot(dir.path());
    assert_eq!(snapshot.fetched().len(), 2);
    let urls: Vec<&str> = snapshot.fetched().values().map(|r| r.url.as_str()).collect();
    assert!(urls.contains(&format!("{}/p1", server.uri()).as_str()));
    assert!(!urls.contains(&format!("{}/p2", server.uri()).as_str()));
    assert!(snapshot.unfetched().is_empty());
}

#[tokio::test]
async fn test_not_found_is_dropped_and_not_retried() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(
        &server,
        "/",
        r#"<a href="/missing">gone</a><a href="/ok">ok</a>"#,
    )
    .await;
    mount_page(&server, "/ok", r#"<a href="/missing">gone again</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = create_test_config(&server, &dir);
    config.crawl.depth = 2;

    let stats = run_crawl(config, false).await.unwrap();

    assert_eq!(stats.count(PageOutcome::NotFound), 1);
    assert!(!dir.path().join("missing.html").exists());

    let snapshot = open_snapshot(dir.path());
    assert!(snapshot.unfetched().is_empty());
    assert_eq!(snapshot.fetched().len(), 2);
}

#[tokio::test]
async fn test_rerun_reads_pages_from_disk() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&server, "/", r#"<a href="/a">A</a><a href="/b">B</a>"#).await;
    mount_page(&server, "/a", "<html>a</html>").await;
    mount_page(&server, "/b", "<html>b</html>").await;

    run_crawl(create_test_config(&server, &dir), false)
        .await
        .unwrap();
    server.verify().await;

    // Second run must not touch the network
    server.reset().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let stats = run_crawl(create_test_config(&server, &dir), false)
        .await
        .unwrap();

    assert_eq!(stats.network_fetches(), 0);
    assert_eq!(stats.count(PageOutcome::Cached), 1);
    assert_eq!(stats.stop_reason, Some(StopReason::FrontierExhausted));
    assert!(open_snapshot(dir.path()).unfetched().is_empty());
}

#[tokio::test]
async fn test_max_pages_stops_crawl() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let links: String = (1..=5)
        .map(|i| format!(r#"<a href="/p{}">{}</a>"#, i, i))
        .collect();
    mount_page(&server, "/", &links).await;
    for i in 1..=5 {
        Mock::given(method("GET"))
            .and(path(format!("/p{}", i)))
            .respond_with(ResponseTemplate::new(200).set_body_string(format!("page {}", i)))
            .mount(&server)
            .await;
    }

    let mut config = create_test_config(&server, &dir);
    config.crawl.max_pages = 2;

    let stats = run_crawl(config, false).await.unwrap();

    assert_eq!(stats.stop_reason, Some(StopReason::MaxPages));
    assert_eq!(stats.network_fetches(), 2);
    assert_eq!(stats.pending, 4);
    assert_eq!(requested_paths(&server).await, vec!["/", "/p1"]);

    // The rest stays on the frontier for the next run
    let snapshot = open_snapshot(dir.path());
    assert_eq!(snapshot.unfetched().len(), 4);
    assert!(snapshot
        .unfetched()
        .contains(&format!("{}/p5", server.uri())));
}

#[tokio::test]
async fn test_max_time_stops_crawl() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"<a href="/later">later</a>"#)
                .set_delay(Duration::from_millis(1200)),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/later"))
        .respond_with(ResponseTemplate::new(200).set_body_string("later"))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = create_test_config(&server, &dir);
    config.crawl.max_time = 1;

    let stats = run_crawl(config, false).await.unwrap();

    assert_eq!(stats.stop_reason, Some(StopReason::MaxTime));
    assert!(open_snapshot(dir.path())
        .unfetched()
        .contains(&format!("{}/later", server.uri())));
}

#[tokio::test]
async fn test_depth_limit() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&server, "/", r#"<a href="/a">A</a>"#).await;
    mount_page(&server, "/a", r#"<a href="/deep">deeper</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/deep"))
        .respond_with(ResponseTemplate::new(200).set_body_string("deep"))
        .expect(0)
        .mount(&server)
        .await;

    let stats = run_crawl(create_test_config(&server, &dir), false)
        .await
        .unwrap();

    assert_eq!(stats.network_fetches(), 2);
    assert!(!dir.path().join("deep.html").exists());
    assert!(open_snapshot(dir.path()).unfetched().is_empty());
}

#[tokio::test]
async fn test_unlimited_depth_follows_chain() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&server, "/", r#"<a href="/a">A</a>"#).await;
    mount_page(&server, "/a", r#"<a href="/b">B</a>"#).await;
    mount_page(&server, "/b", r#"<a href="/c">C</a>"#).await;
    mount_page(&server, "/c", "end").await;

    let mut config = create_test_config(&server, &dir);
    config.crawl.depth = 0;

    let stats = run_crawl(config, false).await.unwrap();

    assert_eq!(stats.count(PageOutcome::Fetched), 4);
    assert!(dir.path().join("c.html").exists());
}

#[tokio::test]
async fn test_depth_first_traversal_order() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&server, "/", r#"<a href="/a">A</a><a href="/b">B</a>"#).await;
    mount_page(&server, "/a", r#"<a href="/a1">A1</a>"#).await;
    mount_page(&server, "/b", "b").await;
    mount_page(&server, "/a1", "a1").await;

    let mut config = create_test_config(&server, &dir);
    config.crawl.depth = 2;
    config.crawl.traversal = Traversal::DepthFirst;

    run_crawl(config, false).await.unwrap();

    assert_eq!(requested_paths(&server).await, vec!["/", "/b", "/a", "/a1"]);
}

#[tokio::test]
async fn test_breadth_first_traversal_order() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&server, "/", r#"<a href="/a">A</a><a href="/b">B</a>"#).await;
    mount_page(&server, "/a", r#"<a href="/a1">A1</a>"#).await;
    mount_page(&server, "/b", "b").await;
    mount_page(&server, "/a1", "a1").await;

    let mut config = create_test_config(&server, &dir);
    config.crawl.depth = 2;

    run_crawl(config, false).await.unwrap();

    assert_eq!(requested_paths(&server).await, vec!["/", "/a", "/b", "/a1"]);
}

#[tokio::test]
async fn test_transient_failure_is_retried() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&server, "/", r#"<a href="/flaky">flaky</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/flaky", "recovered").await;

    let stats = run_crawl(create_test_config(&server, &dir), false)
        .await
        .unwrap();

    assert_eq!(stats.count(PageOutcome::Failed), 1);
    assert_eq!(stats.retries, 1);
    assert_eq!(stats.parked, 0);
    assert_eq!(read_page(dir.path(), "flaky.html"), "recovered");
    assert!(open_snapshot(dir.path()).unfetched().is_empty());
}

#[tokio::test]
async fn test_persistent_failure_is_parked() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&server, "/", r#"<a href="/down">down</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let mut config = create_test_config(&server, &dir);
    config.fetch.max_retries = 2;

    let stats = run_crawl(config, false).await.unwrap();

    assert_eq!(stats.stop_reason, Some(StopReason::FrontierExhausted));
    assert_eq!(stats.count(PageOutcome::Failed), 3);
    assert_eq!(stats.retries, 2);
    assert_eq!(stats.parked, 1);

    // Parked URLs are kept for the next run
    let snapshot = open_snapshot(dir.path());
    assert!(snapshot
        .unfetched()
        .contains(&format!("{}/down", server.uri())));
    assert!(!dir.path().join("down.html").exists());
}

#[tokio::test]
async fn test_resume_from_snapshot() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    // A previous run fetched the seed and left one URL behind
    std::fs::write(dir.path().join("index.html"), "<html>old home</html>").unwrap();
    let snapshot = serde_json::json!({
        "fetched": {
            "abc": {"filepath": dir.path().join("index.html").to_string_lossy(), "url": format!("{}/", server.uri())}
        },
        "unfetched": [format!("{}/later", server.uri())]
    });
    std::fs::write(
        dir.path().join(SNAPSHOT_FILENAME),
        serde_json::to_string(&snapshot).unwrap(),
    )
    .unwrap();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("new home"))
        .expect(0)
        .mount(&server)
        .await;
    mount_page(&server, "/later", "<html>later</html>").await;

    let stats = run_crawl(create_test_config(&server, &dir), false)
        .await
        .unwrap();

    assert_eq!(stats.count(PageOutcome::Cached), 1);
    assert_eq!(stats.count(PageOutcome::Fetched), 1);
    assert_eq!(read_page(dir.path(), "index.html"), "<html>old home</html>");
    assert_eq!(read_page(dir.path(), "later.html"), "<html>later</html>");

    let snapshot = open_snapshot(dir.path());
    assert_eq!(snapshot.fetched().len(), 2);
    assert!(snapshot.fetched().contains_key("abc"));
    assert!(snapshot.unfetched().is_empty());
}

#[tokio::test]
async fn test_fresh_run_ignores_snapshot() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    std::fs::write(
        dir.path().join(SNAPSHOT_FILENAME),
        format!(r#"{{"fetched": {{}}, "unfetched": ["{}/stale"]}}"#, server.uri()),
    )
    .unwrap();

    mount_page(&server, "/", "<html>home</html>").await;
    Mock::given(method("GET"))
        .and(path("/stale"))
        .respond_with(ResponseTemplate::new(200).set_body_string("stale"))
        .expect(0)
        .mount(&server)
        .await;

    let stats = run_crawl(create_test_config(&server, &dir), true)
        .await
        .unwrap();

    assert_eq!(stats.network_fetches(), 1);
    assert!(open_snapshot(dir.path()).unfetched().is_empty());
}

#[tokio::test]
async fn test_query_string_page_path() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&server, "/", r#"<a href="/search?x=1&amp;y=2">search</a>"#).await;
    mount_page(&server, "/search", "<html>results</html>").await;

    run_crawl(create_test_config(&server, &dir), false)
        .await
        .unwrap();

    assert_eq!(
        read_page(dir.path(), "search/x-1y-2.html"),
        "<html>results</html>"
    );
}

#[tokio::test]
async fn test_off_site_links_are_ignored() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(
        &server,
        "/",
        r#"<a href="https://elsewhere.example/">away</a>
           <a href="relative">relative</a>
           <a href="/here">here</a>"#,
    )
    .await;
    mount_page(&server, "/here", "here").await;

    let stats = run_crawl(create_test_config(&server, &dir), false)
        .await
        .unwrap();

    assert_eq!(stats.links_discovered, 1);
    assert_eq!(requested_paths(&server).await, vec!["/", "/here"]);
}

#[tokio::test]
async fn test_restored_seed_retry_keeps_seed_depth() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    // A previous run parked the seed
    std::fs::write(
        dir.path().join(SNAPSHOT_FILENAME),
        format!(r#"{{"fetched": {{}}, "unfetched": ["{}/"]}}"#, server.uri()),
    )
    .unwrap();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/", r#"<a href="/a">A</a>"#).await;
    mount_page(&server, "/a", "<html>a</html>").await;

    let stats = run_crawl(create_test_config(&server, &dir), false)
        .await
        .unwrap();

    assert_eq!(stats.retries, 1);
    assert_eq!(stats.links_discovered, 1);
    assert_eq!(requested_paths(&server).await, vec!["/", "/", "/a"]);
    assert_eq!(read_page(dir.path(), "a.html"), "<html>a</html>");
    assert!(open_snapshot(dir.path()).unfetched().is_empty());
}

#[tokio::test]
async fn test_non_ascii_paths_are_transliterated() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(
        &server,
        "/",
        r#"<a href="/Crème Brûlée">dessert</a><a href="/s?q=café au lait">drink</a>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path_regex("^/Cr"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>dessert</html>"))
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/s", "<html>drink</html>").await;

    run_crawl(create_test_config(&server, &dir), false)
        .await
        .unwrap();

    assert_eq!(read_page(dir.path(), "creme-brulee.html"), "<html>dessert</html>");
    assert_eq!(read_page(dir.path(), "s/q-cafe-au-lait.html"), "<html>drink</html>");
}
