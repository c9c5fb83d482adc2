//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end over real HTTP.

use sitemapper::config::{Config, TerminationStrategy};
use sitemapper::output::{render_report, ReportFormat};
use sitemapper::{crawl, Crawler};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration with a small worker pool and short timeouts
fn create_test_config() -> Config {
    let mut config = Config::default();
    config.crawler.fetch_workers = 4;
    config.crawler.index_workers = 2;
    config.user_agent.crawler_name = "TestBot".to_string();
    config.user_agent.crawler_version = "1.0.0".to_string();
    config.user_agent.contact_url = Some("https://example.com/contact".to_string());
    config.http.timeout_secs = 5;
    config.http.connect_timeout_secs = 2;
    config
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!("<html><body>{}</body></html>", body))
        .insert_header("content-type", "text/html")
}

/// Mounts a GET handler that must be hit exactly once
async fn mount_page(server: &MockServer, page: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(response)
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_crawl_single_host() {
    // Start a mock server
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        html(&format!(
            r#"<a href="{}/page1">Page 1</a>
               <a href="/page2">Page 2</a>
               <a href="https://external.example.org/">Elsewhere</a>"#,
            base_url
        )),
    )
    .await;
    mount_page(
        &mock_server,
        "/page1",
        html(r#"<a href="/">Home</a><a href="page2">Page 2</a>"#),
    )
    .await;
    mount_page(
        &mock_server,
        "/page2",
        html(r#"<a href="/page1#top">Page 1</a>"#),
    )
    .await;

    let site = crawl(&base_url, create_test_config()).await.unwrap();

    assert_eq!(site.paths().collect::<Vec<_>>(), vec!["/", "/page1", "/page2"]);
    assert!(site.unfetched().next().is_none());

    let root_links: Vec<String> = site
        .page("/")
        .unwrap()
        .links()
        .iter()
        .map(|u| u.path().to_string())
        .collect();
    assert_eq!(root_links, vec!["/page1", "/page2"]);

    assert_eq!(site.stats().pages_fetched, 3);
    assert_eq!(site.stats().fetch_failures, 0);

    // Each mock verifies its expect(1) when the server drops
}

#[tokio::test]
async fn test_user_agent_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(header(
            "user-agent",
            "TestBot/1.0.0 (+https://example.com/contact)",
        ))
        .respond_with(html("no links"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let site = crawl(&mock_server.uri(), create_test_config()).await.unwrap();
    assert!(site.page("/").is_some());
}

#[tokio::test]
async fn test_crawl_with_missing_page() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        html(r#"<a href="/exists">Exists</a><a href="/missing">Missing</a>"#),
    )
    .await;
    mount_page(&mock_server, "/exists", html("")).await;
    mount_page(&mock_server, "/missing", ResponseTemplate::new(404)).await;

    let site = crawl(&mock_server.uri(), create_test_config()).await.unwrap();

    assert_eq!(site.len(), 3);
    assert!(site.page("/exists").is_some());
    assert!(site.get("/missing").unwrap().is_placeholder());
    assert_eq!(site.stats().fetch_failures, 1);

    let report = render_report(&site, ReportFormat::Text).unwrap();
    assert!(report.contains("\t/missing\n\t\tN/A (not fetched)"));
}

#[tokio::test]
async fn test_crawl_records_assets() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        html(
            r#"<img src="/images/logo.png">
               <script src="/js/app.js"></script>
               <img src="https://cdn.example.org/remote.png">"#,
        ),
    )
    .await;

    let site = crawl(&mock_server.uri(), create_test_config()).await.unwrap();

    let assets: Vec<String> = site
        .page("/")
        .unwrap()
        .assets()
        .iter()
        .map(|u| u.path().to_string())
        .collect();
    assert_eq!(assets.len(), 2);
    assert!(assets.contains(&"/images/logo.png".to_string()));
    assert!(assets.contains(&"/js/app.js".to_string()));

    // Assets are recorded, never fetched
    assert_eq!(site.len(), 1);
}

#[tokio::test]
async fn test_non_html_page_indexed_empty() {
    let mock_server = MockServer::start().await;

    mount_page(&mock_server, "/", html(r#"<a href="/data.json">Data</a>"#)).await;
    mount_page(
        &mock_server,
        "/data.json",
        ResponseTemplate::new(200)
            .set_body_string(r#"{"href": "/never-followed"}"#)
            .insert_header("content-type", "application/json"),
    )
    .await;

    let site = crawl(&mock_server.uri(), create_test_config()).await.unwrap();

    let data = site.page("/data.json").unwrap();
    assert!(data.links().is_empty());
    assert_eq!(site.stats().parse_failures, 1);
    assert_eq!(site.len(), 2);
}

#[tokio::test]
async fn test_redirect_followed() {
    let mock_server = MockServer::start().await;

    mount_page(&mock_server, "/", html(r#"<a href="/old">Old</a>"#)).await;
    mount_page(
        &mock_server,
        "/old",
        ResponseTemplate::new(301).insert_header("location", "/new/"),
    )
    .await;
    mount_page(&mock_server, "/new/", html(r#"<a href="child">Child</a>"#)).await;
    mount_page(&mock_server, "/new/child", html("")).await;

    let site = crawl(&mock_server.uri(), create_test_config()).await.unwrap();

    // The redirected page is stored under the path that was linked; its relative links
    // resolve against where it ended up
    let old = site.page("/old").unwrap();
    assert_eq!(old.links()[0].path(), "/new/child");
    assert!(site.page("/new/child").is_some());
    assert!(!site.contains("/new/"));
}

#[tokio::test]
async fn test_debounce_crawl_over_http() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        html(r#"<a href="/a">A</a><a href="/b">B</a>"#),
    )
    .await;
    mount_page(&mock_server, "/a", html(r#"<a href="/b">B</a>"#)).await;
    mount_page(&mock_server, "/b", html(r#"<a href="/">Home</a>"#)).await;

    let mut config = create_test_config();
    config.crawler.termination = TerminationStrategy::Debounce;
    config.crawler.debounce_ms = 200;
    config.crawler.monitor_tick_ms = 10;

    let crawler = Crawler::with_http(config).unwrap();
    let site = crawler.crawl(&mock_server.uri()).await.unwrap();

    assert_eq!(site.paths().collect::<Vec<_>>(), vec!["/", "/a", "/b"]);
}

#[tokio::test]
async fn test_seed_without_scheme() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/", html("")).await;

    let address = mock_server.address().to_string();
    let site = crawl(&address, create_test_config()).await.unwrap();

    assert_eq!(site.domain().scheme(), "http");
    assert!(site.page("/").is_some());
}

#[tokio::test]
async fn test_json_report_from_crawl() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/", html(r#"<a href="/about">About</a>"#)).await;
    mount_page(&mock_server, "/about", html("")).await;

    let site = crawl(&mock_server.uri(), create_test_config()).await.unwrap();
    let json = render_report(&site, ReportFormat::Json).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["entries"]["/about"]["status"], "indexed");
    assert_eq!(value["stats"]["pages_indexed"], 2);
}
