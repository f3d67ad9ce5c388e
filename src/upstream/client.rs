//! Upstream HTTP client
//!
//! One shared `reqwest::Client` for every third-party call, with the base
//! URLs kept in configuration so they can be redirected. JSON APIs go
//! through `get_json`, RSS feeds through `get_text`.

use std::time::Duration;

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::upstream::UpstreamError;

const USER_AGENT: &str = concat!("FreebieApi/", env!("CARGO_PKG_VERSION"));

/// Base URLs and credentials for the third-party services.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub coingecko_base_url: String,
    pub quotable_base_url: String,
    pub reddit_base_url: String,
    pub openweather_base_url: String,
    /// Switches weather from wttr.in to OpenWeatherMap when set
    pub openweather_api_key: Option<String>,
    pub wttr_base_url: String,
    pub youtube_oembed_url: String,
    pub duckduckgo_base_url: String,
    /// Host serving the BBC RSS feeds
    pub news_feed_base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            coingecko_base_url: "https://api.coingecko.com/api/v3".to_string(),
            quotable_base_url: "https://api.quotable.io".to_string(),
            reddit_base_url: "https://www.reddit.com".to_string(),
            openweather_base_url: "https://api.openweathermap.org/data/2.5".to_string(),
            openweather_api_key: None,
            wttr_base_url: "https://wttr.in".to_string(),
            youtube_oembed_url: "https://www.youtube.com/oembed".to_string(),
            duckduckgo_base_url: "https://api.duckduckgo.com".to_string(),
            news_feed_base_url: "https://feeds.bbci.co.uk".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Thin JSON client over `reqwest`.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: Client,
    config: UpstreamConfig,
}

impl UpstreamClient {
    /// Creates a client with the configured timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(config: UpstreamConfig) -> Result<Self, UpstreamError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| UpstreamError::Request(e.to_string()))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &UpstreamConfig {
        &self.config
    }

    /// GETs `url` with `query` and decodes a JSON body.
    #[instrument(skip(self, query), level = "debug")]
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, UpstreamError> {
        self.send(url, query)
            .await?
            .json::<T>()
            .await
            .map_err(|e| UpstreamError::Parse(e.to_string()))
    }

    /// GETs `url` with `query` and returns the body as text.
    #[instrument(skip(self, query), level = "debug")]
    pub async fn get_text(&self, url: &str, query: &[(&str, &str)]) -> Result<String, UpstreamError> {
        self.send(url, query)
            .await?
            .text()
            .await
            .map_err(|e| UpstreamError::Parse(e.to_string()))
    }

    async fn send(&self, url: &str, query: &[(&str, &str)]) -> Result<Response, UpstreamError> {
        let response = self.client.get(url).query(query).send().await?;

        let status = response.status();
        if !status.is_success() {
            debug!(%status, "upstream returned non-success status");
            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(UpstreamError::NotFound(url.to_string()));
            }
            return Err(UpstreamError::Status(status.as_u16()));
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_get_json_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ping"))
            .and(query_param("q", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .mount(&server)
            .await;

        let client = UpstreamClient::new(UpstreamConfig::default()).unwrap();
        let body: Value = client
            .get_json(&format!("{}/ping", server.uri()), &[("q", "1")])
            .await
            .unwrap();
        assert_eq!(body["ok"], Value::Bool(true));
    }

    #[tokio::test]
    async fn test_get_json_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = UpstreamClient::new(UpstreamConfig::default()).unwrap();
        let result: Result<Value, _> = client.get_json(&server.uri(), &[]).await;
        assert!(matches!(result, Err(UpstreamError::Status(503))));
    }

    #[tokio::test]
    async fn test_get_json_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let client = UpstreamClient::new(UpstreamConfig::default()).unwrap();
        let result: Result<Value, _> = client.get_json(&server.uri(), &[]).await;
        assert!(matches!(result, Err(UpstreamError::Parse(_))));
    }

    #[tokio::test]
    async fn test_get_text_returns_raw_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/news/rss.xml"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<rss></rss>"))
            .mount(&server)
            .await;

        let client = UpstreamClient::new(UpstreamConfig::default()).unwrap();
        let body = client
            .get_text(&format!("{}/news/rss.xml", server.uri()), &[])
            .await
            .unwrap();
        assert_eq!(body, "<rss></rss>");
    }

    #[tokio::test]
    async fn test_get_text_maps_404() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = UpstreamClient::new(UpstreamConfig::default()).unwrap();
        let result = client.get_text(&server.uri(), &[]).await;
        assert!(matches!(result, Err(UpstreamError::NotFound(_))));
    }
}
