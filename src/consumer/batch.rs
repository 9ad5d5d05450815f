//! Buffered bulk consumer.

use crate::consumer::http::{HttpConfig, HttpTransport};
use crate::consumer::Consumer;
use crate::encode::encode;
use crate::error::{Result, SensorsAnalyticsError};
use crate::event::Event;
use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

/// Hard upper bound on events per request.
pub const MAX_FLUSH_BULK: usize = 50;

/// Buffers events and transmits them in chunks of at most the configured
/// flush threshold.
///
/// The `send` call that fills the buffer to the threshold pays the flush
/// latency; there are no background timers. The buffer is mutex-protected,
/// so one consumer can be shared across tasks.
///
/// On a chunk failure the error propagates unchanged: chunks transmitted
/// before the failure are already drained from the buffer, the failed chunk
/// and everything after it stay buffered for a later [`flush`](Consumer::flush).
pub struct BatchConsumer {
    transport: HttpTransport,
    flush_bulk: usize,
    buffer: Mutex<Vec<Event>>,
}

impl BatchConsumer {
    /// Consumer with the maximum flush threshold of [`MAX_FLUSH_BULK`].
    pub fn new(server_url: impl Into<String>) -> Self {
        Self::with_flush_bulk(server_url, MAX_FLUSH_BULK)
    }

    /// Consumer with a custom flush threshold, clamped to
    /// `1..=MAX_FLUSH_BULK`.
    pub fn with_flush_bulk(server_url: impl Into<String>, flush_bulk: usize) -> Self {
        Self::with_config(server_url, flush_bulk, HttpConfig::default())
    }

    pub fn with_config(
        server_url: impl Into<String>,
        flush_bulk: usize,
        config: HttpConfig,
    ) -> Self {
        Self {
            transport: HttpTransport::with_config(server_url, config),
            flush_bulk: flush_bulk.clamp(1, MAX_FLUSH_BULK),
            buffer: Mutex::new(Vec::new()),
        }
    }

    /// Effective flush threshold after clamping.
    pub fn flush_bulk(&self) -> usize {
        self.flush_bulk
    }

    /// Number of events currently buffered.
    pub async fn pending(&self) -> usize {
        self.buffer.lock().await.len()
    }

    async fn flush_buffer(&self, buffer: &mut Vec<Event>) -> Result<()> {
        while !buffer.is_empty() {
            let count = buffer.len().min(self.flush_bulk);
            let data = encode(&buffer[..count])?;
            let (status, body) = self.transport.request(&data).await?;

            if status != 200 {
                return Err(SensorsAnalyticsError::Server { status, body });
            }

            buffer.drain(..count);
            debug!("flushed {} events, {} still buffered", count, buffer.len());
        }
        Ok(())
    }
}

#[async_trait]
impl Consumer for BatchConsumer {
    async fn send(&self, event: Event) -> Result<()> {
        let mut buffer = self.buffer.lock().await;
        buffer.push(event);

        if buffer.len() >= self.flush_bulk {
            self.flush_buffer(&mut buffer).await?;
        }
        Ok(())
    }

    async fn flush(&self) -> Result<()> {
        let mut buffer = self.buffer.lock().await;
        self.flush_buffer(&mut buffer).await
    }
}
