//! HTTP fetcher implementation
//!
//! This module handles all page requests for the relay:
//! - Building one HTTP client that looks like ordinary browser traffic
//!   (browser user agent, `Accept` header, cookie store, compression)
//! - GET requests carrying `Accept-Language` and a search-engine `Referer`
//! - Classifying transport failures
//!
//! Pacing is deliberately not applied here; callers pause before each
//! request so homepage, article and delivery calls can be paced differently.

use crate::config::HttpConfig;
use crate::RelayError;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, REFERER};
use reqwest::Client;
use std::time::Duration;

const BROWSER_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8";

/// A page as returned by the server
///
/// Any status code is a valid fetch; interpreting it is the caller's job.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub final_url: String,

    /// HTTP status code
    pub status_code: u16,

    /// Page body content
    pub body: String,
}

impl FetchedPage {
    /// Returns true for a plain 200 response
    pub fn is_ok(&self) -> bool {
        self.status_code == 200
    }
}

/// Uniform interface over outbound page requests
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches a URL, returning the status and body or a transport error
    async fn fetch(&self, url: &str) -> Result<FetchedPage, RelayError>;
}

/// Builds an HTTP client with browser-like defaults
///
/// The client keeps connections alive and stores cookies, so it should be
/// built once and shared between the page fetcher and the delivery client.
///
/// # Example
///
/// ```no_run
/// use article_relay::config::HttpConfig;
/// use article_relay::crawler::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(BROWSER_ACCEPT));

    Client::builder()
        .user_agent(config.user_agent.as_str())
        .default_headers(headers)
        .timeout(Duration::from_secs(config.timeout))
        .connect_timeout(Duration::from_secs(config.timeout.min(10)))
        .cookie_store(true)
        .gzip(true)
        .brotli(true)
        .build()
}

/// `PageFetcher` backed by a shared reqwest client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    accept_language: String,
    referer: String,
}

impl HttpFetcher {
    /// Creates a fetcher that adds the configured `Accept-Language` and
    /// `Referer` to every request
    pub fn new(client: Client, config: &HttpConfig) -> Self {
        Self {
            client,
            accept_language: config.accept_language.clone(),
            referer: config.referer.clone(),
        }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, RelayError> {
        let response = self
            .client
            .get(url)
            .header(ACCEPT_LANGUAGE, self.accept_language.as_str())
            .header(REFERER, self.referer.as_str())
            .send()
            .await
            .map_err(|e| RelayError::from_transport(url, e))?;

        let status_code = response.status().as_u16();
        let final_url = response.url().to_string();

        let body = response
            .text()
            .await
            .map_err(|e| RelayError::from_transport(url, e))?;

        tracing::trace!("GET {} -> {} ({} bytes)", url, status_code, body.len());

        Ok(FetchedPage {
            final_url,
            status_code,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

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

    fn test_config(timeout: u64) -> HttpConfig {
        HttpConfig {
            timeout,
            ..HttpConfig::default()
        }
    }

    fn test_fetcher(timeout: u64) -> HttpFetcher {
        let config = test_config(timeout);
        HttpFetcher::new(build_http_client(&config).unwrap(), &config)
    }

    #[test]
    fn test_build_http_client() {
        assert!(build_http_client(&HttpConfig::default()).is_ok());
    }

    #[tokio::test]
    async fn test_fetch_sends_browser_headers() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>home</html>"))
            .expect(1)
            .mount(&server)
            .await;

        let page = test_fetcher(5).fetch(&server.uri()).await.unwrap();

        assert!(page.is_ok());
        assert_eq!(page.body, "<html>home</html>");

        let requests = server.received_requests().await.unwrap();
        assert_eq!(
            received_header(&requests[0], "accept-language").as_deref(),
            Some("en-US,en;q=0.9")
        );
        assert_eq!(
            received_header(&requests[0], "referer").as_deref(),
            Some("https://www.google.com/")
        );
        assert!(received_header(&requests[0], "accept")
            .unwrap_or_default()
            .starts_with("text/html"));
    }

    #[tokio::test]
    async fn test_fetch_sends_browser_user_agent() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        test_fetcher(5).fetch(&server.uri()).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        let user_agent = received_header(&requests[0], "user-agent").unwrap_or_default();
        assert!(user_agent.starts_with("Mozilla/5.0"));
    }

    #[tokio::test]
    async fn test_fetch_reports_final_url_after_redirect() {
        let server = MockServer::start().await;
        let target = format!("{}/2024/05/01/tech/story/index.html", server.uri());

        Mock::given(method("GET"))
            .and(path("/old-story"))
            .respond_with(ResponseTemplate::new(301).insert_header("location", target.as_str()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/2024/05/01/tech/story/index.html"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>story</html>"))
            .mount(&server)
            .await;

        let url = format!("{}/old-story", server.uri());
        let page = test_fetcher(5).fetch(&url).await.unwrap();

        assert!(page.is_ok());
        assert_eq!(page.final_url, target);
        assert_eq!(page.body, "<html>story</html>");
    }

    #[tokio::test]
    async fn test_non_success_status_is_not_an_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("blocked"))
            .mount(&server)
            .await;

        let page = test_fetcher(5).fetch(&server.uri()).await.unwrap();

        assert!(!page.is_ok());
        assert_eq!(page.status_code, 503);
        assert_eq!(page.body, "blocked");
    }

    #[tokio::test]
    async fn test_timeout_is_classified() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .mount(&server)
            .await;

        let result = test_fetcher(1).fetch(&server.uri()).await;

        assert!(matches!(result, Err(RelayError::Timeout { .. })));
    }

    #[tokio::test]
    async fn test_connection_failure_is_http_error() {
        let result = test_fetcher(2).fetch("http://127.0.0.1:1/").await;

        assert!(matches!(result, Err(RelayError::Http { .. })));
    }
}
