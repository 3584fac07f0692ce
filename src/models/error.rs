//! Error types for onedist.
//!
//! Taxonomy:
//! - Caller contract violations, raised before any network call
//! - Server-side failures (non-2xx status, unreadable or unexpected bodies)
//! - Transport and configuration failures

use thiserror::Error;

/// Top-level error type for onedist.
#[derive(Debug, Error)]
pub enum OneDistError {
    // ═══════════════════════════════════════════════════════════════════
    // CALLER: rejected before anything is sent
    // ═══════════════════════════════════════════════════════════════════

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    // ═══════════════════════════════════════════════════════════════════
    // SERVER: the request went out, the answer was not usable
    // ═══════════════════════════════════════════════════════════════════

    #[error("HTTP error (status {status}): {body}")]
    Http { status: u16, body: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    // ═══════════════════════════════════════════════════════════════════
    // INFRASTRUCTURE
    // ═══════════════════════════════════════════════════════════════════

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] super::ConfigError),
}

impl OneDistError {
    /// Shorthand for a `MalformedResponse` error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse(message.into())
    }

    /// HTTP status carried by this error, if it came from a non-2xx response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Result type alias for onedist.
pub type Result<T> = std::result::Result<T, OneDistError>;
