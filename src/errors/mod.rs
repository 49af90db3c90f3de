//! Error types for the Drive reader.

use reqwest::StatusCode;
use thiserror::Error;

/// Result type for Drive reader operations.
pub type DriveResult<T> = Result<T, DriveError>;

/// Top-level error type for the Drive reader.
#[derive(Debug, Error)]
pub enum DriveError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Access token could not be obtained.
    #[error("Authentication error: {0}")]
    Authentication(#[from] AuthenticationError),

    /// The HTTP exchange itself failed.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// The API answered with a status outside the success range.
    #[error("Server returned HTTP status {}", status_number(.0))]
    Status(StatusCode),

    /// A successful response did not have the expected shape.
    #[error("{0}")]
    Response(#[from] ResponseError),

    /// A requested resource does not exist.
    #[error("{0}")]
    Resource(#[from] ResourceError),
}

impl DriveError {
    /// Creates a configuration error.
    pub fn configuration(msg: impl Into<String>) -> Self {
        DriveError::Configuration(ConfigurationError::InvalidConfiguration(msg.into()))
    }

    /// Creates a not found error for a file name.
    pub fn not_found(file_name: impl Into<String>) -> Self {
        DriveError::Resource(ResourceError::FileNotFound(file_name.into()))
    }

    /// Returns the HTTP status code if the error carries one.
    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            DriveError::Status(status) => Some(*status),
            _ => None,
        }
    }

    /// Returns true if the failure came from the token refresh.
    pub fn is_authentication(&self) -> bool {
        matches!(self, DriveError::Authentication(_))
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// Missing credentials.
    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Missing scope.
    #[error("Missing scope: {0}")]
    MissingScope(String),
}

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthenticationError {
    /// No refresh token is installed and the access token is absent or stale.
    #[error("No refresh token is set")]
    MissingRefreshToken,

    /// Refresh failed.
    #[error("Token refresh failed: {0}")]
    RefreshFailed(String),

    /// Invalid grant.
    #[error("Invalid grant: {0}")]
    InvalidGrant(String),

    /// Invalid token.
    #[error("Invalid token: {0}")]
    InvalidToken(String),
}

/// Errors for successful responses with an unexpected payload.
#[derive(Debug, Error)]
pub enum ResponseError {
    /// A list response did not include a `files` array.
    #[error("Response did not include a file list")]
    MissingFileList,

    /// A content response had an empty body.
    #[error("No data returned for file{}", file_suffix(.file_name))]
    NoData {
        /// File name supplied by the caller, if any.
        file_name: Option<String>,
    },

    /// Deserialization error.
    #[error("Deserialization error: {0}")]
    DeserializationError(String),
}

/// Resource errors.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// No file matched a name query.
    #[error("File not found: “{0}”")]
    FileNotFound(String),
}

/// Transport errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network error.
    #[error("Network error: {0}")]
    Network(String),

    /// Timeout error.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// HTTP error.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Request could not be built.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout(err.to_string())
        } else if err.is_connect() {
            TransportError::Network(err.to_string())
        } else {
            TransportError::Http(err.to_string())
        }
    }
}

fn status_number(status: &StatusCode) -> u16 {
    status.as_u16()
}

fn file_suffix(file_name: &Option<String>) -> String {
    match file_name {
        Some(name) => format!(" {}", name),
        None => String::new(),
    }
}
