//! Integration tests for the crawl engine
//!
//! These tests drive the full worker pipeline against an in-memory site, so every
//! scenario is deterministic and needs no network.

use async_trait::async_trait;
use sitemapper::config::{Config, TerminationStrategy};
use sitemapper::crawler::{FetchedDocument, Fetcher, HtmlParser, PageParser, ParsedPage};
use sitemapper::{Crawler, FetchError, ParseError, Site};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use url::Url;

const ORIGIN: &str = "http://site.test";

/// Serves HTML pages from a map of path to body and counts every request
struct GraphFetcher {
    pages: HashMap<String, String>,
    fetches: Mutex<HashMap<String, usize>>,
}

impl GraphFetcher {
    /// Builds a site where each page is a list of `<a href>` targets
    fn new(graph: &[(&str, &[&str])]) -> Self {
        let pages = graph
            .iter()
            .map(|(path, links)| {
                let anchors: String = links
                    .iter()
                    .map(|href| format!(r#"<a href="{}">link</a>"#, href))
                    .collect();
                (
                    path.to_string(),
                    format!("<html><body>{}</body></html>", anchors),
                )
            })
            .collect();

        Self {
            pages,
            fetches: Mutex::new(HashMap::new()),
        }
    }

    fn with_page(mut self, path: &str, body: &str) -> Self {
        self.pages.insert(path.to_string(), body.to_string());
        self
    }

    fn fetch_count(&self, path: &str) -> usize {
        self.fetches
            .lock()
            .unwrap()
            .get(path)
            .copied()
            .unwrap_or_default()
    }

    fn total_fetches(&self) -> usize {
        self.fetches.lock().unwrap().values().sum()
    }
}

#[async_trait]
impl Fetcher for GraphFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedDocument, FetchError> {
        *self
            .fetches
            .lock()
            .unwrap()
            .entry(url.path().to_string())
            .or_default() += 1;

        // Give other workers a chance to interleave
        tokio::task::yield_now().await;

        match self.pages.get(url.path()) {
            Some(body) => Ok(FetchedDocument {
                url: url.clone(),
                final_url: url.clone(),
                status: 200,
                content_type: Some("text/html; charset=utf-8".to_string()),
                body: body.clone(),
            }),
            None => Err(FetchError::Status {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}

/// Delegates to [`HtmlParser`] but panics on one path
struct PanickingParser {
    path: &'static str,
}

impl PageParser for PanickingParser {
    fn parse(&self, document: &FetchedDocument) -> Result<ParsedPage, ParseError> {
        if document.url.path() == self.path {
            panic!("parser exploded on {}", self.path);
        }
        HtmlParser.parse(document)
    }
}

fn test_config(fetch_workers: usize, index_workers: usize) -> Config {
    let mut config = Config::default();
    config.crawler.fetch_workers = fetch_workers;
    config.crawler.index_workers = index_workers;
    config
}

async fn run_crawl(fetcher: Arc<GraphFetcher>, config: Config) -> Site {
    let crawler = Crawler::new(config, fetcher, Arc::new(HtmlParser)).unwrap();
    crawler.crawl(ORIGIN).await.unwrap()
}

fn paths(site: &Site) -> Vec<&str> {
    site.paths().collect()
}

#[tokio::test]
async fn test_crawl_small_graph() {
    let fetcher = Arc::new(GraphFetcher::new(&[
        ("/", &["/a", "/b"]),
        ("/a", &["/", "/c"]),
        ("/b", &[]),
        ("/c", &[]),
    ]));

    let site = run_crawl(Arc::clone(&fetcher), test_config(4, 4)).await;

    assert_eq!(paths(&site), vec!["/", "/a", "/b", "/c"]);
    for path in ["/", "/a", "/b", "/c"] {
        assert_eq!(
            fetcher.fetch_count(path),
            1,
            "{} fetched more than once",
            path
        );
        assert!(site.page(path).is_some());
    }

    let root = site.page("/").unwrap();
    let links: Vec<&str> = root.links().iter().map(|u| u.path()).collect();
    assert_eq!(links, vec!["/a", "/b"]);
    assert_eq!(site.stats().pages_indexed, 4);
}

#[tokio::test]
async fn test_external_links_not_followed() {
    let fetcher = Arc::new(GraphFetcher::new(&[
        (
            "/",
            &[
                "https://elsewhere.test/page",
                "http://site.test:8080/other",
                "/local",
            ],
        ),
        ("/local", &[]),
    ]));

    let site = run_crawl(Arc::clone(&fetcher), test_config(2, 2)).await;

    assert_eq!(paths(&site), vec!["/", "/local"]);
    assert_eq!(fetcher.total_fetches(), 2);
    assert_eq!(site.page("/").unwrap().links().len(), 1);
}

#[tokio::test]
async fn test_shared_link_fetched_once() {
    // Every page links to /shared, and to each other
    let fetcher = Arc::new(GraphFetcher::new(&[
        ("/", &["/p1", "/p2", "/p3", "/shared"]),
        ("/p1", &["/shared", "/p2", "/p3"]),
        ("/p2", &["/shared", "/p1", "/p3"]),
        ("/p3", &["/shared", "/p1", "/p2"]),
        ("/shared", &["/"]),
    ]));

    let site = run_crawl(Arc::clone(&fetcher), test_config(8, 8)).await;

    assert_eq!(site.len(), 5);
    assert_eq!(fetcher.fetch_count("/shared"), 1);
    assert_eq!(fetcher.total_fetches(), 5);
    assert!(site.stats().duplicate_links > 0);
}

#[tokio::test]
async fn test_recrawl_same_content() {
    let graph: &[(&str, &[&str])] = &[
        ("/", &["/docs", "/blog"]),
        ("/docs", &["/docs/intro", "/docs/api"]),
        ("/docs/intro", &["/docs/api", "/"]),
        ("/docs/api", &["/blog"]),
        ("/blog", &["/blog/1", "/blog/2"]),
        ("/blog/1", &["/blog/2"]),
        ("/blog/2", &["/blog/1"]),
    ];

    let first = run_crawl(Arc::new(GraphFetcher::new(graph)), test_config(3, 5)).await;
    let second = run_crawl(Arc::new(GraphFetcher::new(graph)), test_config(7, 2)).await;

    assert_eq!(first.len(), 7);
    assert!(first.same_content(&second));
}

#[tokio::test]
async fn test_single_worker_each() {
    let fetcher = Arc::new(GraphFetcher::new(&[
        ("/", &["/a"]),
        ("/a", &["/b"]),
        ("/b", &["/c"]),
        ("/c", &[]),
    ]));

    let site = run_crawl(fetcher, test_config(1, 1)).await;
    assert_eq!(paths(&site), vec!["/", "/a", "/b", "/c"]);
}

#[tokio::test]
async fn test_debounce_termination() {
    let fetcher = Arc::new(GraphFetcher::new(&[
        ("/", &["/a", "/b"]),
        ("/a", &["/b"]),
        ("/b", &["/"]),
    ]));

    let mut config = test_config(3, 3);
    config.crawler.termination = TerminationStrategy::Debounce;
    config.crawler.debounce_ms = 100;
    config.crawler.monitor_tick_ms = 5;

    let site = run_crawl(Arc::clone(&fetcher), config).await;

    assert_eq!(paths(&site), vec!["/", "/a", "/b"]);
    assert_eq!(fetcher.total_fetches(), 3);
}

#[tokio::test]
async fn test_failed_fetch_leaves_placeholder() {
    // /gone is linked but not served
    let fetcher = Arc::new(GraphFetcher::new(&[
        ("/", &["/gone", "/here"]),
        ("/here", &[]),
    ]));

    let site = run_crawl(Arc::clone(&fetcher), test_config(2, 2)).await;

    assert_eq!(paths(&site), vec!["/", "/gone", "/here"]);
    assert!(site.get("/gone").unwrap().is_placeholder());
    assert_eq!(site.unfetched().collect::<Vec<_>>(), vec!["/gone"]);
    assert_eq!(site.stats().fetch_failures, 1);
    assert_eq!(fetcher.fetch_count("/gone"), 1);
}

#[tokio::test]
async fn test_unreachable_seed() {
    let fetcher = Arc::new(GraphFetcher::new(&[]));

    let site = run_crawl(Arc::clone(&fetcher), test_config(2, 2)).await;

    assert_eq!(paths(&site), vec!["/"]);
    assert!(site.get("/").unwrap().is_placeholder());
}

#[tokio::test]
async fn test_small_page_queue_completes() {
    // A wide fan-out with a page queue of one forces fetch workers to wait on indexing
    let children: Vec<String> = (0..40).map(|i| format!("/item/{}", i)).collect();
    let child_refs: Vec<&str> = children.iter().map(String::as_str).collect();
    let mut graph: Vec<(&str, &[&str])> = vec![("/", child_refs.as_slice())];
    for child in &child_refs {
        graph.push((*child, &["/"]));
    }
    let fetcher = Arc::new(GraphFetcher::new(&graph));

    let mut config = test_config(6, 1);
    config.crawler.page_queue_capacity = 1;

    let site = run_crawl(Arc::clone(&fetcher), config).await;

    assert_eq!(site.len(), 41);
    assert_eq!(fetcher.total_fetches(), 41);
}

#[tokio::test]
async fn test_assets_recorded() {
    let fetcher = Arc::new(GraphFetcher::new(&[]).with_page(
        "/",
        r#"<html><head>
            <link rel="stylesheet" href="/style.css">
            <script src="/app.js"></script>
        </head><body>
            <img src="/logo.png">
            <img src="https://cdn.test/remote.png">
        </body></html>"#,
    ));

    let site = run_crawl(fetcher, test_config(1, 1)).await;

    let root = site.page("/").unwrap();
    let mut assets: Vec<&str> = root.assets().iter().map(|u| u.path()).collect();
    assets.sort();
    assert_eq!(assets, vec!["/app.js", "/logo.png", "/style.css"]);
    assert!(root.links().is_empty());
}

#[tokio::test]
async fn test_parser_panic_still_terminates() {
    let fetcher = Arc::new(GraphFetcher::new(&[
        ("/", &["/boom", "/fine"]),
        ("/boom", &[]),
        ("/fine", &[]),
    ]));

    let crawler = panicking_crawler(&fetcher, test_config(3, 2));

    let site = tokio::time::timeout(std::time::Duration::from_secs(10), crawler.crawl(ORIGIN))
        .await
        .expect("crawl did not terminate")
        .unwrap();

    assert!(site.page("/fine").is_some());
    assert!(site.get("/boom").unwrap().is_placeholder());
}

fn panicking_crawler(fetcher: &Arc<GraphFetcher>, config: Config) -> Crawler {
    Crawler::new(
        config,
        Arc::clone(fetcher) as Arc<dyn Fetcher>,
        Arc::new(PanickingParser { path: "/boom" }),
    )
    .unwrap()
}

#[tokio::test]
async fn test_parser_panic_with_single_fetch_worker() {
    // The only fetch worker panics while /fine and /also still wait in the request queue
    let fetcher = Arc::new(GraphFetcher::new(&[
        ("/", &["/boom", "/fine", "/also"]),
        ("/boom", &[]),
        ("/fine", &[]),
        ("/also", &[]),
    ]));
    let crawler = panicking_crawler(&fetcher, test_config(1, 1));

    let site = tokio::time::timeout(std::time::Duration::from_secs(10), crawler.crawl(ORIGIN))
        .await
        .expect("crawl did not terminate")
        .unwrap();

    assert_eq!(paths(&site), vec!["/", "/also", "/boom", "/fine"]);
    assert!(site.page("/fine").is_some());
    assert!(site.page("/also").is_some());
    assert!(site.get("/boom").unwrap().is_placeholder());
    assert_eq!(fetcher.total_fetches(), 4);
}

#[tokio::test]
async fn test_parser_panic_with_single_fetch_worker_debounce() {
    let fetcher = Arc::new(GraphFetcher::new(&[
        ("/", &["/boom", "/fine"]),
        ("/boom", &[]),
        ("/fine", &[]),
    ]));
    let mut config = test_config(1, 1);
    config.crawler.termination = TerminationStrategy::Debounce;
    config.crawler.debounce_ms = 100;
    config.crawler.monitor_tick_ms = 5;
    let crawler = panicking_crawler(&fetcher, config);

    let site = tokio::time::timeout(std::time::Duration::from_secs(10), crawler.crawl(ORIGIN))
        .await
        .expect("crawl did not terminate")
        .unwrap();

    assert!(site.page("/fine").is_some());
    assert!(site.get("/boom").unwrap().is_placeholder());
}
