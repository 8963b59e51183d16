//! Series API HTTP Client
//!
//! reqwest client for the local series API. Each request is bounded by the
//! configured timeout; there are no retries.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use super::SeriesSource;

/// Configuration for the HTTP source
#[derive(Debug, Clone)]
pub struct HttpSourceConfig {
    /// Base URL of the series API (e.g., "http://127.0.0.1:8000")
    pub base_url: String,
    /// Per-request timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for HttpSourceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            timeout_ms: 7000,
        }
    }
}

/// Series source backed by the local HTTP API
pub struct HttpSource {
    client: Client,
    config: HttpSourceConfig,
}

impl HttpSource {
    /// Create a new HTTP source with the given configuration
    pub fn new(config: HttpSourceConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(FetchError::Request)?;

        Ok(Self { client, config })
    }

    fn url(&self, path_and_query: &str) -> String {
        format!(
            "{}{}",
            self.config.base_url.trim_end_matches('/'),
            path_and_query
        )
    }

    /// GET a JSON body, reporting why it failed
    pub async fn get_json(&self, path_and_query: &str) -> Result<Value, FetchError> {
        let url = self.url(path_and_query);

        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout
            } else if e.is_connect() {
                FetchError::Unavailable
            } else {
                FetchError::Request(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        response.json::<Value>().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout
            } else {
                FetchError::Decode(e.to_string())
            }
        })
    }
}

#[async_trait]
impl SeriesSource for HttpSource {
    fn name(&self) -> &str {
        &self.config.base_url
    }

    async fn fetch(&self, path_and_query: &str) -> Option<Value> {
        match self.get_json(path_and_query).await {
            Ok(body) => Some(body),
            Err(e) => {
                tracing::debug!(path = %path_and_query, error = %e, "Fetch failed");
                None
            }
        }
    }
}

/// Reasons a fetch produced no data
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Series API unavailable")]
    Unavailable,

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP {0}")]
    Status(u16),

    #[error("Request timeout")]
    Timeout,

    #[error("Invalid JSON body: {0}")]
    Decode(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::get, Json, Router};
    use serde_json::json;

    async fn spawn_api() -> String {
        let app = Router::new()
            .route(
                "/selic",
                get(|| async { Json(json!([{"date": "2024-01-01", "value": "11.25"}])) }),
            )
            .route("/broken", get(|| async { StatusCode::INTERNAL_SERVER_ERROR }))
            .route("/text", get(|| async { "not json" }))
            .route(
                "/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(2)).await;
                    Json(json!([]))
                }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        format!("http://{}", addr)
    }

    fn source(base_url: String, timeout_ms: u64) -> HttpSource {
        HttpSource::new(HttpSourceConfig {
            base_url,
            timeout_ms,
        })
        .unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = HttpSourceConfig::default();
        assert_eq!(config.base_url, "http://127.0.0.1:8000");
        assert_eq!(config.timeout_ms, 7000);
    }

    #[test]
    fn test_url_joins_base_and_path() {
        let source = source("http://127.0.0.1:8000/".to_string(), 1000);
        assert_eq!(source.url("/selic?n=720"), "http://127.0.0.1:8000/selic?n=720");
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let base = spawn_api().await;
        let source = source(base, 1000);

        let body = source.fetch("/selic?n=720").await.unwrap();
        assert_eq!(body[0]["value"], "11.25");
    }

    #[tokio::test]
    async fn test_http_error_is_no_data() {
        let base = spawn_api().await;
        let source = source(base, 1000);

        assert!(matches!(source.get_json("/broken").await, Err(FetchError::Status(500))));
        assert!(source.fetch("/broken").await.is_none());
        assert!(source.fetch("/missing").await.is_none());
    }

    #[tokio::test]
    async fn test_non_json_is_no_data() {
        let base = spawn_api().await;
        let source = source(base, 1000);

        assert!(matches!(source.get_json("/text").await, Err(FetchError::Decode(_))));
        assert!(source.fetch("/text").await.is_none());
    }

    #[tokio::test]
    async fn test_timeout_is_no_data() {
        let base = spawn_api().await;
        let source = source(base, 200);

        assert!(matches!(source.get_json("/slow").await, Err(FetchError::Timeout)));
        assert!(source.fetch("/slow").await.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_is_no_data() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let source = source(format!("http://{}", addr), 500);
        assert!(source.fetch("/selic?n=720").await.is_none());
    }
}
