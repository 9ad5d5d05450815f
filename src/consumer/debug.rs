//! Debug-mode consumer for validating data import.
//!
//! Sends through the endpoint's `/debug` path so the server checks each
//! record and reports the outcome. With `write_data` set the record is also
//! imported; without it the `Dry-Run: true` header asks for validation only.
//! Not intended for production traffic.

use crate::consumer::http::{HttpConfig, HttpTransport};
use crate::consumer::Consumer;
use crate::encode::encode;
use crate::error::{Result, SensorsAnalyticsError};
use crate::event::Event;
use async_trait::async_trait;
use tracing::{info, warn};

/// Transmits every event through the debug endpoint and reports whether the
/// server considered it valid.
///
/// Any response status of 300 or above, and any transport failure, raises
/// [`SensorsAnalyticsError::DebugMode`].
pub struct DebugConsumer {
    transport: HttpTransport,
}

impl DebugConsumer {
    /// Build a debug consumer for the given endpoint. The URL path is
    /// replaced with `/debug`; an unparseable URL fails fast with
    /// [`SensorsAnalyticsError::IllegalData`].
    pub fn new(server_url: &str, write_data: bool) -> Result<Self> {
        Self::with_config(server_url, write_data, HttpConfig::default())
    }

    pub fn with_config(server_url: &str, write_data: bool, mut config: HttpConfig) -> Result<Self> {
        let mut url = reqwest::Url::parse(server_url).map_err(|e| {
            SensorsAnalyticsError::illegal(format!("invalid server url '{server_url}': {e}"))
        })?;
        url.set_path("/debug");

        if !write_data {
            config.headers.insert("Dry-Run".to_string(), "true".to_string());
        }

        Ok(Self {
            transport: HttpTransport::with_config(url, config),
        })
    }
}

#[async_trait]
impl Consumer for DebugConsumer {
    async fn send(&self, event: Event) -> Result<()> {
        let message = serde_json::to_string(&event)?;
        let data = encode(std::slice::from_ref(&event))?;

        let (status, body) = match self.transport.request(&data).await {
            Ok(response) => response,
            Err(SensorsAnalyticsError::Connection(e)) => {
                return Err(SensorsAnalyticsError::DebugMode(format!(
                    "could not connect to Sensors Analytics, with error \"{e}\""
                )));
            }
            Err(e) => return Err(e),
        };

        if status == 200 {
            info!("valid message: {message}");
        } else {
            warn!("invalid message: {message}");
            warn!("response code: {status}");
            warn!("response body: {body}");
        }

        if status >= 300 {
            return Err(SensorsAnalyticsError::DebugMode(format!(
                "server responded with {status} returning: '{body}'"
            )));
        }
        Ok(())
    }
}
