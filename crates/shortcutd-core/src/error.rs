//! Application error types with rich context

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Application error types organized by layer/domain
#[derive(Debug, Error)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Common/Infrastructure Errors
    // ─────────────────────────────────────────────────────────────
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    // ─────────────────────────────────────────────────────────────
    // Control Bus Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to bind control socket on port {port}: {reason}")]
    Bind { port: u16, reason: String },

    #[error("Control protocol error: {message}")]
    Protocol { message: String },

    #[error("Channel send error: {message}")]
    ChannelSend { message: String },

    #[error("Channel closed unexpectedly")]
    ChannelClosed,

    // ─────────────────────────────────────────────────────────────
    // Pin Backend Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Launcher does not support pinned shortcuts")]
    PinUnsupported,

    #[error("Pin request failed: {message}")]
    Pin { message: String },

    // ─────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },
}

// ─────────────────────────────────────────────────────────────────
// Convenience Constructors
// ─────────────────────────────────────────────────────────────────

impl Error {
    pub fn bind(port: u16, reason: impl Into<String>) -> Self {
        Self::Bind {
            port,
            reason: reason.into(),
        }
    }

    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    pub fn channel_send(message: impl Into<String>) -> Self {
        Self::ChannelSend {
            message: message.into(),
        }
    }

    pub fn pin(message: impl Into<String>) -> Self {
        Self::Pin {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Check if this is a recoverable error
    ///
    /// Recoverable errors abort at most the current job; the service loop
    /// keeps running. Anything else should take the process down.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::Protocol { .. }
                | Error::ChannelSend { .. }
                | Error::Pin { .. }
                | Error::PinUnsupported
                | Error::Json(_)
        )
    }
}
