//! Error types for the student API client and dashboard.
//!
//! # Design
//! Every non-2xx response lands in `Http` with the raw status code and body,
//! because the body text is what gets surfaced to the user. `MissingId` is
//! raised before any request is built, so a caller can rely on no network
//! traffic having happened when it sees that variant.

use thiserror::Error;

/// Errors returned by `StudentClient` build/parse methods and transports.
#[derive(Debug, Error)]
pub enum ApiError {
    /// An id-addressed operation was called without an id.
    #[error("Missing student identifier")]
    MissingId,

    /// The server answered outside the 2xx range.
    #[error("API request failed ({status}){}", detail(.body))]
    Http { status: u16, body: String },

    /// The response body did not have the expected shape.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The host could not complete the HTTP round-trip.
    #[error("transport failed: {0}")]
    Transport(String),
}

fn detail(body: &str) -> String {
    if body.is_empty() {
        String::new()
    } else {
        format!(": {body}")
    }
}

/// Errors raised while reading configuration from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be a positive integer, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },
}
