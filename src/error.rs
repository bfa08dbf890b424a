//! Error types for memtext
//!
//! Provides a unified error type for all client operations.

use thiserror::Error;

/// Result type alias using McError
pub type Result<T> = std::result::Result<T, McError>;

/// Unified error type for memtext operations
///
/// A cache miss is never an error: single fetches return `Ok(None)` and
/// multi fetches simply leave the key out of the returned map.
#[derive(Debug, Error)]
pub enum McError {
    // -------------------------------------------------------------------------
    // Lifecycle Errors
    // -------------------------------------------------------------------------
    /// No transport attached: never connected, closed, or released to the pool.
    #[error("not initialized")]
    NotInitialized,

    // -------------------------------------------------------------------------
    // Transport Errors
    // -------------------------------------------------------------------------
    /// Connect/send/receive/close failure, timeouts included.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    /// The raw reply line, verbatim, when it did not match what the command expects.
    #[error("{0}")]
    Protocol(String),

    /// A reply line after which the rest of the reply can no longer be
    /// located: an oversized `VALUE` length, or trailing data where `END`
    /// was expected. The connection is out of frame.
    #[error("{0}")]
    Framing(String),

    // -------------------------------------------------------------------------
    // Local Errors
    // -------------------------------------------------------------------------
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl McError {
    /// Builds a protocol error carrying the raw reply line.
    pub(crate) fn reply(line: &[u8]) -> Self {
        McError::Protocol(String::from_utf8_lossy(line).into_owned())
    }

    pub(crate) fn framing(line: &[u8]) -> Self {
        McError::Framing(String::from_utf8_lossy(line).into_owned())
    }

    /// Returns true for connect/send/receive failures.
    pub fn is_transport(&self) -> bool {
        matches!(self, McError::Io(_))
    }

    /// Returns true for errors that leave the connection out of frame.
    pub fn breaks_framing(&self) -> bool {
        matches!(self, McError::Io(_) | McError::Framing(_))
    }
}
