//! Sensors Analytics SDK for Rust.
//!
//! Submits user-behavior analytics data (tracking events and profile
//! updates) to a Sensors Analytics collection endpoint. Records are
//! validated against the endpoint's naming and typing rules, batched
//! according to the chosen consumer, gzip-compressed and transmitted over
//! HTTP.
//!
//! # Quick Start
//!
//! ```no_run
//! use sensors_analytics_sdk::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<()> {
//! // SENSORS_ANALYTICS_URL is the data collection URI from the admin console.
//! let consumer = DefaultConsumer::new("http://sa_host.com:8006/sa?token=xxx");
//! let sa = SensorsAnalytics::new(Arc::new(consumer));
//!
//! sa.track("abcdefg", "ServerStart", Properties::new().with("sex", "female")).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Consumers
//!
//! Three delivery strategies are provided; all of them share the same
//! [`Consumer`](consumer::Consumer) interface:
//!
//! - [`DefaultConsumer`](consumer::DefaultConsumer) - one request per event,
//!   synchronous
//! - [`BatchConsumer`](consumer::BatchConsumer) - buffers up to a flush
//!   threshold (at most 50) and sends in bulk
//! - [`DebugConsumer`](consumer::DebugConsumer) - sends through the debug
//!   endpoint to verify data imports correctly; development use only
//!
//! # Errors
//!
//! Production code should handle [`SensorsAnalyticsError::IllegalData`],
//! [`SensorsAnalyticsError::Connection`] and
//! [`SensorsAnalyticsError::Server`]. The SDK never retries on its own;
//! retry policy belongs to the caller.

pub mod builder;
pub mod client;
pub mod consumer;
pub mod encode;
pub mod error;
pub mod event;
pub mod validate;

pub use client::SensorsAnalytics;
pub use error::{Result, SensorsAnalyticsError};
pub use event::{Event, EventType, Properties, PropertyValue};

/// Library identity reported as `$lib` on every record.
pub const LIB_NAME: &str = "Rust";

/// SDK version reported as `$lib_version` on every record.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    pub use crate::client::SensorsAnalytics;
    pub use crate::consumer::{BatchConsumer, Consumer, DebugConsumer, DefaultConsumer};
    pub use crate::error::{Result, SensorsAnalyticsError};
    pub use crate::event::{Event, EventType, Properties, PropertyValue};
}
