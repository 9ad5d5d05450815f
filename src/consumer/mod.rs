//! Consumers decide when and how assembled events reach the transport.
//!
//! Three implementations are provided:
//!
//! - [`DefaultConsumer`] - transmits each event immediately
//! - [`BatchConsumer`] - buffers events and transmits them in bulk
//! - [`DebugConsumer`] - sends through the debug endpoint for server-side
//!   validation feedback
//!
//! Validation never happens here; a consumer only ever sees records built by
//! [`EventBuilder`](crate::builder::EventBuilder), so the only failures at
//! this level are transport and server errors. None of them are retried.

pub mod batch;
pub mod debug;
pub mod default;
pub mod http;

pub use batch::{BatchConsumer, MAX_FLUSH_BULK};
pub use debug::DebugConsumer;
pub use default::DefaultConsumer;
pub use http::{HttpConfig, HttpTransport};

use crate::error::Result;
use crate::event::Event;
use async_trait::async_trait;

/// Abstract interface for event delivery.
#[async_trait]
pub trait Consumer: Send + Sync {
    /// Accept one assembled event for delivery.
    async fn send(&self, event: Event) -> Result<()>;

    /// Transmit anything still buffered. No-op for unbuffered consumers.
    async fn flush(&self) -> Result<()> {
        Ok(())
    }
}
