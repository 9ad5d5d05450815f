//! Immediate, one-request-per-event consumer.

use crate::consumer::http::{HttpConfig, HttpTransport};
use crate::consumer::Consumer;
use crate::encode::encode;
use crate::error::{Result, SensorsAnalyticsError};
use crate::event::Event;
use async_trait::async_trait;
use tracing::debug;

/// Transmits every event synchronously as a single-event batch.
///
/// `send` succeeds only on an exact 200 response; any other status raises
/// [`SensorsAnalyticsError::Server`], and transport failures raise
/// [`SensorsAnalyticsError::Connection`].
pub struct DefaultConsumer {
    transport: HttpTransport,
}

impl DefaultConsumer {
    pub fn new(server_url: impl Into<String>) -> Self {
        Self::with_config(server_url, HttpConfig::default())
    }

    pub fn with_config(server_url: impl Into<String>, config: HttpConfig) -> Self {
        Self {
            transport: HttpTransport::with_config(server_url, config),
        }
    }
}

#[async_trait]
impl Consumer for DefaultConsumer {
    async fn send(&self, event: Event) -> Result<()> {
        let data = encode(std::slice::from_ref(&event))?;
        let (status, body) = self.transport.request(&data).await?;

        if status != 200 {
            return Err(SensorsAnalyticsError::Server { status, body });
        }

        debug!("event delivered");
        Ok(())
    }
}
