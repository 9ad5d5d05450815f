//! Error types and result alias for the Sensors Analytics SDK.
//!
//! This module defines [`SensorsAnalyticsError`] and the [`Result`] type alias
//! used throughout the library. Production callers are expected to handle
//! `IllegalData`, `Connection` and `Server`; `DebugMode` only occurs when a
//! [`DebugConsumer`](crate::consumer::DebugConsumer) is in use.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SensorsAnalyticsError {
    /// Malformed input: a distinct id, event name, property key or property
    /// value that violates the naming or typing rules. Never retry these.
    #[error("illegal data: {0}")]
    IllegalData(String),

    /// The transport failed to complete the request (connection refused,
    /// timeout, DNS failure). May be transient.
    #[error("could not connect to Sensors Analytics, with error \"{0}\"")]
    Connection(#[from] reqwest::Error),

    /// The live endpoint rejected the batch with a non-200 status.
    #[error("could not write to Sensors Analytics, server responded with {status} returning: '{body}'")]
    Server { status: u16, body: String },

    /// Any failure reported while sending through the debug endpoint.
    #[error("debug mode error: {0}")]
    DebugMode(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SensorsAnalyticsError>;

impl SensorsAnalyticsError {
    /// Create an `IllegalData` error from any displayable message.
    pub fn illegal(message: impl Into<String>) -> Self {
        Self::IllegalData(message.into())
    }
}
