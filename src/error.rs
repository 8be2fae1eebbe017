//! Error types for the lexpand library.
//!
//! All fallible operations return [`Result`], whose error side is the
//! [`LexpandError`] enum. The variants follow the failure classes of the
//! system: malformed data ([`LexpandError::Format`]), failures reported by the
//! query backend ([`LexpandError::Backend`]), broken connections
//! ([`LexpandError::Connection`]) and invalid configuration
//! ([`LexpandError::Config`]).
//!
//! # Examples
//!
//! ```
//! use lexpand::error::{LexpandError, Result};
//!
//! fn example_operation() -> Result<()> {
//!     Err(LexpandError::format("signature must start with '(('"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use thiserror::Error;

/// The main error type for lexpand operations.
#[derive(Error, Debug)]
pub enum LexpandError {
    /// I/O errors (file operations, sockets, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Malformed signatures, backend replies or snapshots
    #[error("Format error: {0}")]
    Format(String),

    /// The backend answered with an `error` field
    #[error("Backend error: {0}")]
    Backend(String),

    /// The channel was closed mid-frame or is not established
    #[error("Connection error: {0}")]
    Connection(String),

    /// Invalid configuration or a violated precondition
    #[error("Configuration error: {0}")]
    Config(String),

    /// Inconsistent thesaurus tables
    #[error("Thesaurus error: {0}")]
    Thesaurus(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Snapshot serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),
}

/// Result type alias for operations that may fail with LexpandError.
pub type Result<T> = std::result::Result<T, LexpandError>;

impl LexpandError {
    /// Create a new format error.
    pub fn format<S: Into<String>>(msg: S) -> Self {
        LexpandError::Format(msg.into())
    }

    /// Create a new backend error.
    pub fn backend<S: Into<String>>(msg: S) -> Self {
        LexpandError::Backend(msg.into())
    }

    /// Create a new connection error.
    pub fn connection<S: Into<String>>(msg: S) -> Self {
        LexpandError::Connection(msg.into())
    }

    /// Create a new configuration error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        LexpandError::Config(msg.into())
    }

    /// Create a new thesaurus error.
    pub fn thesaurus<S: Into<String>>(msg: S) -> Self {
        LexpandError::Thesaurus(msg.into())
    }

    /// Create a new serialization error.
    pub fn serialization<S: Into<String>>(msg: S) -> Self {
        LexpandError::Serialization(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        LexpandError::Other(msg.into())
    }

    /// Whether the error leaves the backend channel unusable.
    pub fn is_terminal_for_channel(&self) -> bool {
        matches!(
            self,
            LexpandError::Connection(_) | LexpandError::Io(_) | LexpandError::Format(_)
        )
    }
}
