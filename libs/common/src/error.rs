//! Custom error types for the common library
//!
//! This module defines the error taxonomy shared by every part of the client.
//! None of these errors is fatal: each one carries a notice that can be shown
//! to the user, after which the current screen stays usable.

use thiserror::Error;

/// Notice shown when a failed response carries no readable message
pub const GENERIC_FAILURE_NOTICE: &str = "Something went wrong. Please try again.";

/// Custom error type for client operations
#[derive(Error, Debug)]
pub enum ClientError {
    /// The user or the platform refused access to a device capability
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// The platform has no such capability at all
    #[error("Capability unsupported: {0}")]
    CapabilityUnsupported(String),

    /// A granted device failed while in use (stream ended, no fix, encoder error)
    #[error("Device error: {0}")]
    Device(String),

    /// Input rejected before any request was made
    #[error("Validation error: {0}")]
    Validation(String),

    /// Transport failure while talking to the backend
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// Non-2xx response with a readable message
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// Non-2xx response whose body could not be parsed
    #[error("Server error ({status})")]
    UnknownServer { status: u16 },

    /// 2xx response whose body did not have the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// An operation needed a session but nobody is signed in
    #[error("Not signed in")]
    Unauthenticated,

    /// Local persistence failure
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ClientError {
    /// Message suitable for a transient notice
    pub fn user_message(&self) -> String {
        match self {
            ClientError::PermissionDenied(what) => {
                format!("Permission denied: {}. Please check your settings.", what)
            }
            ClientError::CapabilityUnsupported(what) => {
                format!("{} is not supported on this device.", what)
            }
            ClientError::Device(msg) | ClientError::Validation(msg) => msg.clone(),
            ClientError::Network(_) => "Network error. Please try again.".to_string(),
            ClientError::Server { message, .. } => message.clone(),
            ClientError::UnknownServer { .. } | ClientError::InvalidResponse(_) => {
                GENERIC_FAILURE_NOTICE.to_string()
            }
            ClientError::Unauthenticated => "Please log in to continue.".to_string(),
            ClientError::Storage(_) => "Could not access local storage.".to_string(),
            ClientError::Configuration(msg) => msg.clone(),
        }
    }

    /// Whether the backend answered, as opposed to a local or transport failure
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            ClientError::Server { .. } | ClientError::UnknownServer { .. }
        )
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::InvalidResponse(err.to_string())
        } else {
            ClientError::Network(err)
        }
    }
}

/// Type alias for Result with ClientError
pub type ClientResult<T> = Result<T, ClientError>;

/// Custom error type for the durable key-value store
#[derive(Error, Debug)]
pub enum StorageError {
    /// Reading or writing the backing file failed
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file or a stored value is not valid JSON
    #[error("Storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Type alias for Result with StorageError
pub type StorageResult<T> = Result<T, StorageError>;
