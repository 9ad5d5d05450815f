//! HTTP transport boundary shared by all consumers.
//!
//! One `POST` per batch: a form body with the encoded `data_list` and the
//! `gzip=1` flag. Everything above this layer deals in events; everything
//! below it is reqwest.

use crate::error::Result;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// Identity string sent with every request.
pub const USER_AGENT: &str = "SensorsAnalytics Rust SDK";

/// Configuration for the HTTP transport.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Connect and read timeout.
    pub timeout: Duration,
    /// Extra headers added to every request.
    pub headers: HashMap<String, String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            headers: HashMap::new(),
        }
    }
}

/// Thin wrapper around a pooled [`reqwest::Client`] bound to one server URL.
pub struct HttpTransport {
    client: reqwest::Client,
    server_url: String,
    headers: HashMap<String, String>,
}

impl HttpTransport {
    pub fn new(server_url: impl Into<String>) -> Self {
        Self::with_config(server_url, HttpConfig::default())
    }

    pub fn with_config(server_url: impl Into<String>, config: HttpConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.timeout)
            .build()
            .unwrap();

        Self {
            client,
            server_url: server_url.into(),
            headers: config.headers,
        }
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    /// POST one encoded batch. Returns the raw status and body; the caller
    /// decides what counts as success.
    pub async fn request(&self, data_list: &str) -> Result<(u16, String)> {
        debug!("posting batch ({} encoded bytes) to {}", data_list.len(), self.server_url);

        let mut request = self
            .client
            .post(&self.server_url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .form(&[("data_list", data_list), ("gzip", "1")]);

        for (name, value) in &self.headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        debug!("server responded with {}", status);
        Ok((status, body))
    }
}
