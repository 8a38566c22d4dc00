use crate::crawler::ArticleRecord;
use crate::delivery::{ArticleSink, DeliveryResult};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;

/// Sink that POSTs records as JSON to the storage service endpoint
#[derive(Debug, Clone)]
pub struct HttpSink {
    client: Client,
    endpoint: String,
}

impl HttpSink {
    pub fn new(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl ArticleSink for HttpSink {
    async fn deliver(&self, record: &ArticleRecord) -> DeliveryResult {
        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .json(record)
            .send()
            .await;

        match response {
            Ok(response) => DeliveryResult::from_status(response.status().as_u16()),
            Err(e) => DeliveryResult::Unreachable(e.to_string()),
        }
    }
}
