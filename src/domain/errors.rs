//! Domain error types
//!
//! This module defines the error hierarchy for Cubex.
//! All errors are domain-specific and don't expose third-party types.

use thiserror::Error;

/// Main Cubex error type
///
/// This is the primary error type used throughout the application.
/// It wraps specific error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum CubexError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Reporting API errors
    #[error("Reporting API error: {0}")]
    CubeApi(#[from] CubeApiError),

    /// Output directory or file write failures
    #[error("Filesystem error: {0}")]
    Filesystem(String),

    /// Checkpoint file errors (unreadable or malformed marker)
    #[error("Checkpoint error: {0}")]
    Checkpoint(String),

    /// Export process errors
    #[error("Export error: {0}")]
    Export(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl CubexError {
    /// Whether the error means the credentials were rejected.
    ///
    /// Authentication failures are fatal for the whole run: without a token
    /// no further request can succeed.
    pub fn is_authentication(&self) -> bool {
        matches!(self, CubexError::CubeApi(CubeApiError::AuthenticationFailed(_)))
    }
}

/// Reporting API errors
///
/// Errors that occur when talking to the reporting service.
/// These errors don't expose HTTP client types.
#[derive(Debug, Error)]
pub enum CubeApiError {
    /// Failed to connect to the reporting service
    #[error("Failed to connect to reporting service: {0}")]
    ConnectionFailed(String),

    /// Credentials rejected, or a request was refused for lack of a valid token
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The service kept answering "Continue wait" until the retry policy ran out
    #[error("Query still processing after {attempts} attempt(s)")]
    StillProcessing { attempts: u32 },

    /// Application-level error reported in the response body
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Invalid response from the service
    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),

    /// Server error (5xx)
    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    /// Client error (4xx)
    #[error("Client error: {status} - {message}")]
    ClientError { status: u16, message: String },

    /// Timeout
    #[error("Request timeout: {0}")]
    Timeout(String),
}

// Conversion from std::io::Error
impl From<std::io::Error> for CubexError {
    fn from(err: std::io::Error) -> Self {
        CubexError::Filesystem(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for CubexError {
    fn from(err: serde_json::Error) -> Self {
        CubexError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for CubexError {
    fn from(err: toml::de::Error) -> Self {
        CubexError::Configuration(format!("TOML parse error: {err}"))
    }
}
