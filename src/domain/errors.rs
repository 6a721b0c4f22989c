//! Domain error types
//!
//! This module defines the error hierarchy for confluence-dump.
//! Errors are domain-specific and don't expose third-party types.

use thiserror::Error;

/// Main error type
///
/// This is the primary error type used throughout the library.
/// It wraps the client and converter errors and adds the configuration
/// and I/O failures the orchestrator can hit.
#[derive(Debug, Error)]
pub enum DumpError {
    /// Configuration-related errors (fatal, raised before any network I/O)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Confluence API errors
    #[error("Confluence error: {0}")]
    Confluence(#[from] ConfluenceError),

    /// Document conversion errors
    #[error("Conversion error: {0}")]
    Conversion(#[from] ConvertError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl DumpError {
    /// Whether this error should stop the whole run rather than a single page
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            DumpError::Configuration(_)
                | DumpError::Validation(_)
                | DumpError::Confluence(ConfluenceError::Authentication(_))
        )
    }
}

/// Confluence-specific errors
///
/// Errors that occur when talking to the Confluence REST API.
/// These errors don't expose the HTTP client types.
#[derive(Debug, Error)]
pub enum ConfluenceError {
    /// Failed to connect to the site
    #[error("Failed to connect to Confluence: {0}")]
    ConnectionFailed(String),

    /// Credentials rejected (401/403)
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Page, space or attachment not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limit exceeded (429)
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    /// Server error (5xx)
    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    /// Client error (4xx)
    #[error("Client error: {status} - {message}")]
    ClientError { status: u16, message: String },

    /// Response body did not have the expected shape
    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),

    /// Timeout
    #[error("Request timeout: {0}")]
    Timeout(String),
}

impl ConfluenceError {
    /// Whether a retry has a chance to succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ConfluenceError::ConnectionFailed(_)
                | ConfluenceError::RateLimited(_)
                | ConfluenceError::ServerError { .. }
                | ConfluenceError::Timeout(_)
        )
    }
}

/// Document converter errors
#[derive(Debug, Error)]
pub enum ConvertError {
    /// `pandoc` could not be started
    #[error("pandoc is not available: {0}")]
    PandocUnavailable(String),

    /// `pandoc` exited with a failure status
    #[error("pandoc failed: {0}")]
    PandocFailed(String),

    /// Writing an output file failed
    #[error("Failed to write {path}: {message}")]
    Write { path: String, message: String },
}

// Conversion from std::io::Error
impl From<std::io::Error> for DumpError {
    fn from(err: std::io::Error) -> Self {
        DumpError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for DumpError {
    fn from(err: serde_json::Error) -> Self {
        DumpError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for DumpError {
    fn from(err: toml::de::Error) -> Self {
        DumpError::Configuration(format!("TOML parse error: {err}"))
    }
}
