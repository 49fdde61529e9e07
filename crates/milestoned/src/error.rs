//! Error types for milestoned.
//!
//! This module defines all error types used throughout the milestoned crate,
//! providing detailed context for debugging and user-friendly error messages.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for milestoned operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Record store errors ===
    /// Failed to read the milestone collection file.
    #[error("failed to read milestone store at {path}: {source}")]
    StoreRead {
        /// Path to the collection file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write the milestone collection file.
    #[error("failed to write milestone store at {path}: {source}")]
    StoreWrite {
        /// Path to the collection file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === File store errors ===
    /// Failed to write an uploaded file to disk.
    #[error("failed to write upload {path}: {source}")]
    UploadWrite {
        /// Path the upload was being written to.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Configuration errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Request errors ===
    /// Decoding a multipart request body failed.
    #[error("multipart decode failed: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),

    /// The server bind address could not be parsed.
    #[error("invalid bind address {addr}: {source}")]
    BindAddress {
        /// The offending address string.
        addr: String,
        /// The underlying error.
        #[source]
        source: std::net::AddrParseError,
    },

    // === I/O errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // === Serialization errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for milestoned operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Create a store-read error for the given path.
    #[must_use]
    pub fn store_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::StoreRead {
            path: path.into(),
            source,
        }
    }

    /// Create a store-write error for the given path.
    #[must_use]
    pub fn store_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::StoreWrite {
            path: path.into(),
            source,
        }
    }

    /// Check if this error is a configuration problem.
    #[must_use]
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::ConfigLoad(_) | Self::ConfigValidation { .. })
    }
}
