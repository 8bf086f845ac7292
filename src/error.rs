//! Error types for firewall-list.
//!
//! Library code never terminates the process. Every failure is returned as an
//! [`Error`] and the binary maps it to an exit code in one place.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for firewall-list operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for firewall-list.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Usage and Configuration Errors
    // ========================================================================
    /// A required argument was missing or malformed.
    #[error("{0}")]
    Usage(String),

    /// Configuration could not be loaded or is invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
        /// Source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    // ========================================================================
    // Authentication Errors
    // ========================================================================
    /// No credential source could produce an access token.
    #[error("Authentication failed: {message}")]
    AuthenticationFailed {
        /// Error message
        message: String,
        /// Source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A credentials file exists but could not be used.
    #[error("Invalid credentials file '{path}': {message}")]
    InvalidCredentials {
        /// Path to the credentials file
        path: PathBuf,
        /// Error message
        message: String,
    },

    /// The OAuth token endpoint rejected the grant.
    #[error("Token endpoint '{endpoint}' returned {status}: {message}")]
    TokenExchange {
        /// Token endpoint URL
        endpoint: String,
        /// HTTP status code
        status: u16,
        /// Error message
        message: String,
    },

    // ========================================================================
    // Compute API Errors
    // ========================================================================
    /// The compute API returned a non-success response.
    #[error("Compute API error {status}: {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error message from the provider
        message: String,
    },

    /// The request never produced a usable response.
    #[error("HTTP request to '{url}' failed: {source}")]
    Transport {
        /// Request URL
        url: String,
        /// Source error
        #[source]
        source: reqwest::Error,
    },

    // ========================================================================
    // Output Errors
    // ========================================================================
    /// The output file could not be created.
    #[error("Failed to create file '{path}': {source}")]
    CreateOutput {
        /// Output path
        path: PathBuf,
        /// Source error
        #[source]
        source: std::io::Error,
    },

    /// Writing or flushing CSV output failed.
    #[error("Failed to write CSV output: {0}")]
    Write(#[from] csv::Error),

    /// Other I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Creates a new usage error.
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage(message.into())
    }

    /// Creates a new configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new authentication error without a source.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::AuthenticationFailed {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new authentication error wrapping a lower-level failure.
    pub fn authentication_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::AuthenticationFailed {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a new invalid credentials error.
    pub fn invalid_credentials(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::InvalidCredentials {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new compute API error.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Creates a new transport error.
    pub fn transport(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Transport {
            url: url.into(),
            source,
        }
    }

    /// Returns true if this error happened while acquiring credentials.
    pub fn is_authentication(&self) -> bool {
        matches!(
            self,
            Error::AuthenticationFailed { .. }
                | Error::InvalidCredentials { .. }
                | Error::TokenExchange { .. }
        )
    }

    /// Returns the error code for CLI exit status.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Usage(_) | Error::Config { .. } => 1,
            e if e.is_authentication() => 3,
            Error::Api { .. } | Error::Transport { .. } => 4,
            Error::CreateOutput { .. } | Error::Write(_) | Error::Io(_) => 5,
            _ => 1,
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Config {
            message: format!("{:#}", err),
            source: None,
        }
    }
}
