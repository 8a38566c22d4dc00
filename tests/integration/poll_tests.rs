//! Integration tests for the poll loop
//!
//! These tests use wiremock to stand in for both the news site and the
//! storage service and run full poll iterations end-to-end.

use article_relay::config::{
    Config, DelayRange, DeliveryConfig, HttpConfig, PacingConfig, PollConfig, SiteConfig,
};
use article_relay::crawler::{
    build_http_client, extract_article_links, Coordinator, HttpFetcher, Sleeper,
};
use article_relay::delivery::{ArticleSink, HttpSink};
use article_relay::{DeliveryResult, PollState, SeenSet};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

const ARTICLE_PATH: &str = "/2024/05/01/tech/story/index.html";

/// Records requested waits instead of sleeping
#[derive(Default)]
struct RecordingSleeper {
    slept: Mutex<Vec<Duration>>,
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.slept.lock().unwrap().push(duration);
    }
}

/// Creates a test configuration pointing both the site and the sink at mock servers
fn create_test_config(site: &MockServer, sink: &MockServer) -> Config {
    let domain = url::Url::parse(&site.uri())
        .expect("Failed to parse base URL")
        .host_str()
        .expect("Failed to extract host")
        .to_string();

    Config {
        site: SiteConfig {
            base_url: site.uri(),
            domain,
            name: "CNN".to_string(),
        },
        delivery: DeliveryConfig {
            endpoint: format!("{}/api/articles", sink.uri()),
        },
        poll: PollConfig {
            scan_interval: 300,
            max_articles_per_poll: 15,
            failure_backoff: 60,
        },
        pacing: PacingConfig {
            request_delay: DelayRange::new(1_500, 3_000),
            article_delay: DelayRange::new(6_000, 10_000),
            delivery_delay: DelayRange::NONE,
        },
        http: HttpConfig {
            timeout: 5,
            ..HttpConfig::default()
        },
    }
}

fn create_coordinator(config: Config, sleeper: Arc<RecordingSleeper>) -> Coordinator {
    let client = build_http_client(&config.http).expect("Failed to build client");
    let fetcher = Arc::new(HttpFetcher::new(client.clone(), &config.http));
    let sink = Arc::new(HttpSink::new(client, config.delivery.endpoint.clone()));

    Coordinator::from_parts(config, fetcher, sink, sleeper, SeenSet::new())
        .expect("Failed to create coordinator")
}

/// A 50-character paragraph without boilerplate keywords
fn paragraph(i: usize) -> String {
    let prefix = format!("Story paragraph {} reports that ", i);
    format!("{}{}", prefix, "x".repeat(50 - prefix.len()))
}

fn article_html() -> String {
    let paragraphs: String = (1..=5).map(|i| format!("<p>{}</p>", paragraph(i))).collect();
    format!(
        r#"<html><head>
            <meta property="article:published_time" content="2024-05-01T12:00:00Z">
            <script>var tracking = "subscribe newsletter";</script>
        </head><body>
            <nav><a href="/">Home</a></nav>
            <h1>Big News</h1>
            <article>{}</article>
            <footer><p>Subscribe to our newsletter for more stories like this one.</p></footer>
        </body></html>"#,
        paragraphs
    )
}

/// Values of a received header, rejoined after wiremock's comma split
fn received_header(request: &Request, name: &str) -> Option<String> {
    request
        .headers
        .iter()
        .find(|(header, _)| header.as_str() == name)
        .map(|(_, values)| {
            values
                .iter()
                .map(|value| value.as_str())
                .collect::<Vec<_>>()
                .join(",")
        })
}

async fn mount_homepage(site: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            r#"<html><body>
                <a href="{}?iid=hp">Story</a>
                <a href="/politics">Politics</a>
                <a href="mailto:tips@cnn.com">Tips</a>
            </body></html>"#,
            ARTICLE_PATH
        )))
        .mount(site)
        .await;
}

async fn mount_article(site: &MockServer) {
    Mock::given(method("GET"))
        .and(path(ARTICLE_PATH))
        .and(header("referer", "https://www.google.com/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(article_html()))
        .mount(site)
        .await;
}

async fn mount_sink(sink: &MockServer, status: u16) {
    Mock::given(method("POST"))
        .and(path("/api/articles"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(status))
        .mount(sink)
        .await;
}

#[test]
fn test_homepage_link_resolves_against_site() {
    let html = r#"<html><body><a href="/2024/05/01/tech/story/index.html">Story</a></body></html>"#;
    let base_url = url::Url::parse("https://www.cnn.com").unwrap();

    let links = extract_article_links(html, &base_url, "cnn.com");

    assert_eq!(links.len(), 1);
    assert!(links.contains("https://www.cnn.com/2024/05/01/tech/story/index.html"));
}

#[tokio::test]
async fn test_full_poll_delivers_article() {
    let site = MockServer::start().await;
    let sink = MockServer::start().await;
    mount_homepage(&site).await;
    mount_article(&site).await;
    mount_sink(&sink, 201).await;

    let config = create_test_config(&site, &sink);
    let sleeper = Arc::new(RecordingSleeper::default());
    let mut coordinator = create_coordinator(config, sleeper.clone());

    let next = coordinator.run_iteration().await;

    assert_eq!(next, PollState::Sleeping(Duration::from_secs(300)));

    let article_url = format!("{}{}", site.uri(), ARTICLE_PATH);
    assert!(coordinator.seen().contains(&article_url));
    assert_eq!(coordinator.seen().len(), 1);

    let requests = sink.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["url"], article_url.as_str());
    assert_eq!(body["title"], "Big News");
    assert_eq!(body["author"], "CNN");
    assert_eq!(body["date"], "2024-05-01T12:00:00Z");

    let expected: Vec<String> = (1..=5).map(paragraph).collect();
    assert_eq!(body["content"], expected.join("\n\n").as_str());

    // every page request carries the browser language and referer
    let page_requests = site.received_requests().await.unwrap();
    assert_eq!(page_requests.len(), 2);
    for request in &page_requests {
        assert_eq!(
            received_header(request, "accept-language").as_deref(),
            Some("en-US,en;q=0.9")
        );
        assert_eq!(
            received_header(request, "referer").as_deref(),
            Some("https://www.google.com/")
        );
    }

    // homepage jitter, then inter-article delay and article jitter
    let slept = sleeper.slept.lock().unwrap().clone();
    assert_eq!(slept.len(), 3);
    assert!(slept[0] >= Duration::from_millis(1_500) && slept[0] <= Duration::from_millis(3_000));
    assert!(slept[1] >= Duration::from_millis(6_000) && slept[1] <= Duration::from_millis(10_000));
    assert!(slept[2] >= Duration::from_millis(1_500) && slept[2] <= Duration::from_millis(3_000));
}

#[tokio::test]
async fn test_conflict_marks_article_seen() {
    let site = MockServer::start().await;
    let sink = MockServer::start().await;
    mount_homepage(&site).await;
    mount_article(&site).await;
    mount_sink(&sink, 409).await;

    let config = create_test_config(&site, &sink);
    let endpoint = config.delivery.endpoint.clone();
    let mut coordinator = create_coordinator(config, Arc::new(RecordingSleeper::default()));

    coordinator.run_iteration().await;

    let article_url = format!("{}{}", site.uri(), ARTICLE_PATH);
    assert!(coordinator.seen().contains(&article_url));

    // The sink keeps answering 409 for this article
    let record = article_relay::crawler::extract_article(&article_html(), &article_url, "CNN")
        .expect("fixture is an article");
    let direct = HttpSink::new(reqwest::Client::new(), endpoint);
    assert_eq!(direct.deliver(&record).await, DeliveryResult::AlreadyExists);

    // A second poll does not deliver it again
    coordinator.run_iteration().await;
    assert_eq!(coordinator.seen().len(), 1);
    assert_eq!(sink.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_rejected_delivery_is_retried_next_poll() {
    let site = MockServer::start().await;
    let sink = MockServer::start().await;
    mount_homepage(&site).await;
    mount_article(&site).await;
    mount_sink(&sink, 500).await;

    let config = create_test_config(&site, &sink);
    let mut coordinator = create_coordinator(config, Arc::new(RecordingSleeper::default()));

    coordinator.run_iteration().await;
    assert!(coordinator.seen().is_empty());

    coordinator.run_iteration().await;
    assert!(coordinator.seen().is_empty());
    assert_eq!(sink.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_homepage_503_schedules_backoff() {
    let site = MockServer::start().await;
    let sink = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&site)
        .await;
    mount_sink(&sink, 201).await;

    let config = create_test_config(&site, &sink);
    let mut coordinator = create_coordinator(config, Arc::new(RecordingSleeper::default()));

    let next = coordinator.run_iteration().await;

    assert_eq!(next, PollState::FailureBackoff(Duration::from_secs(60)));
    assert_eq!(coordinator.state(), next);
    assert!(coordinator.seen().is_empty());
    assert!(sink.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unreachable_sink_keeps_polling() {
    let site = MockServer::start().await;
    let sink = MockServer::start().await;
    mount_homepage(&site).await;
    mount_article(&site).await;

    let mut config = create_test_config(&site, &sink);
    config.delivery.endpoint = "http://127.0.0.1:1/api/articles".to_string();
    let mut coordinator = create_coordinator(config, Arc::new(RecordingSleeper::default()));

    let next = coordinator.run_iteration().await;

    assert_eq!(next, PollState::Sleeping(Duration::from_secs(300)));
    assert!(coordinator.seen().is_empty());
}

#[tokio::test]
async fn test_non_article_page_is_skipped() {
    let site = MockServer::start().await;
    let sink = MockServer::start().await;
    mount_homepage(&site).await;
    mount_sink(&sink, 201).await;

    Mock::given(method("GET"))
        .and(path(ARTICLE_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><body><h1>Live video</h1><p>Watch now.</p></body></html>"),
        )
        .mount(&site)
        .await;

    let config = create_test_config(&site, &sink);
    let mut coordinator = create_coordinator(config, Arc::new(RecordingSleeper::default()));

    let next = coordinator.run_iteration().await;

    assert_eq!(next, PollState::Sleeping(Duration::from_secs(300)));
    assert!(coordinator.seen().is_empty());
    assert!(sink.received_requests().await.unwrap().is_empty());
}
