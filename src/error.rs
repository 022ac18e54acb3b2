//! Error types for confkv
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using ConfKvError
pub type Result<T> = std::result::Result<T, ConfKvError>;

/// Unified error type for confkv operations
#[derive(Debug, Error)]
pub enum ConfKvError {
    // -------------------------------------------------------------------------
    // Argument Errors
    // -------------------------------------------------------------------------
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Start index {index} out of range for buffer of {len} bytes")]
    StartOutOfRange { index: usize, len: usize },

    // -------------------------------------------------------------------------
    // Configuration Text Errors
    // -------------------------------------------------------------------------
    #[error("Syntax error at byte {offset}: {message}")]
    Syntax { message: String, offset: usize },

    // -------------------------------------------------------------------------
    // KeyStore Errors
    // -------------------------------------------------------------------------
    #[error("Keystore capacity exceeded: at most {max} entries")]
    CapacityExceeded { max: usize },

    #[error("Truncated keystore data: {needed} more bytes needed at offset {offset}")]
    Truncated { offset: usize, needed: usize },

    #[error("Key hash mismatch for {key:?}: stored {stored:#010x}, computed {computed:#010x}")]
    HashMismatch {
        key: String,
        stored: u32,
        computed: u32,
    },

    #[error("Key not found")]
    KeyNotFound,

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
