//! External content fetcher
//!
//! Outbound HTTP GET for `external-link` and `rest-api` sources. One shared
//! `reqwest::Client` carries the configured User-Agent and timeout; each call
//! sets its own Accept header.
//!
//! Redirects follow reqwest defaults. A non-2xx status is an error.

use reqwest::{header, Client, Response};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Accept header for page fetches
pub const TEXT_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Accept header for REST fetches
pub const JSON_ACCEPT: &str = "application/json";

/// Fetch error
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FetchError {
    /// Server answered outside 200-299
    #[error("GET {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// Body was not what the call expected (e.g. invalid JSON)
    #[error("GET {url} returned an unparseable body: {message}")]
    Parse { url: String, message: String },

    /// Connection, DNS, TLS or timeout failure
    #[error("GET {url} failed: {message}")]
    Network { url: String, message: String },

    /// HTTP client could not be constructed
    #[error("HTTP client setup failed: {0}")]
    Client(String),
}

/// Outbound HTTP fetcher
#[derive(Debug, Clone)]
pub struct ExternalFetcher {
    http_client: Client,
}

impl ExternalFetcher {
    /// Create a fetcher with a fixed User-Agent and per-request timeout
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, FetchError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_str(user_agent)
                .map_err(|e| FetchError::Client(format!("invalid user agent: {}", e)))?,
        );

        let http_client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self { http_client })
    }

    /// GET `url` and return the body as text
    pub async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let response = self.get(url, TEXT_ACCEPT).await?;

        let body = response.text().await.map_err(|e| FetchError::Parse {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        debug!(url = %url, chars = body.chars().count(), "Fetched text");
        Ok(body)
    }

    /// GET `url`, parse the body as JSON and return it pretty-printed
    pub async fn fetch_json(&self, url: &str) -> Result<String, FetchError> {
        let response = self.get(url, JSON_ACCEPT).await?;

        let body = response.text().await.map_err(|e| FetchError::Parse {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        let value: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| FetchError::Parse {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let pretty = serde_json::to_string_pretty(&value).map_err(|e| FetchError::Parse {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        debug!(url = %url, chars = pretty.chars().count(), "Fetched JSON");
        Ok(pretty)
    }

    async fn get(&self, url: &str, accept: &'static str) -> Result<Response, FetchError> {
        let response = self
            .http_client
            .get(url)
            .header(header::ACCEPT, accept)
            .send()
            .await
            .map_err(|e| FetchError::Network {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status().as_u16();
        if !(200..300).contains(&status) {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        Ok(response)
    }
}
