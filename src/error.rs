//! Error types for benchwire
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using BenchwireError
pub type Result<T> = std::result::Result<T, BenchwireError>;

/// Unified error type for benchwire operations
#[derive(Debug, Error)]
pub enum BenchwireError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Decode Errors
    // -------------------------------------------------------------------------
    /// Malformed frame or unknown message type. The stream is considered
    /// desynchronized; the connection should be closed, not resynchronized.
    #[error("Decode error: {0}")]
    Decode(String),

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    /// The peer replied with ERROR, an unexpected message type, or more
    /// frames than the exchange allows.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Operation requires a bound peer but none is connected.
    #[error("Not connected")]
    NotConnected,

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}
