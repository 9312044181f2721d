//! Custom error types for the media service

use common::ClientError;
use thiserror::Error;

use crate::capability::CapabilityError;
use crate::models::ContentKind;
use crate::recorder::CaptureState;

/// Custom error type for capture operations
///
/// Apart from `Recording`, which drops the broken recording, a failed
/// operation leaves the capture state unchanged and can be retried.
#[derive(Error, Debug)]
pub enum CaptureError {
    /// The device stream could not be acquired
    #[error(transparent)]
    Capability(#[from] CapabilityError),

    #[error("{kind} content does not support {operation}")]
    UnsupportedKind {
        kind: ContentKind,
        operation: &'static str,
    },

    #[error("Cannot {operation} while {state}")]
    InvalidState {
        operation: &'static str,
        state: CaptureState,
    },

    /// The recorder task ended abnormally
    #[error("Recording failed: {0}")]
    Recording(String),

    #[error("Could not encode image: {0}")]
    Encoding(String),

    #[error("Could not read {path}: {reason}")]
    File { path: String, reason: String },

    #[error("File is too large ({size} bytes, limit {limit} bytes)")]
    FileTooLarge { size: u64, limit: u64 },

    #[error("Unsupported file type {mime} for {kind} content")]
    UnsupportedFileType { mime: String, kind: ContentKind },
}

impl From<CaptureError> for ClientError {
    fn from(err: CaptureError) -> Self {
        match err {
            CaptureError::Capability(CapabilityError::Denied { capability, .. }) => {
                ClientError::PermissionDenied(capability.to_string().to_lowercase())
            }
            CaptureError::Capability(CapabilityError::Unsupported(capability)) => {
                ClientError::CapabilityUnsupported(capability.to_string())
            }
            CaptureError::Capability(failed @ CapabilityError::Failed { .. }) => {
                ClientError::Device(failed.to_string())
            }
            CaptureError::Recording(_) | CaptureError::Encoding(_) => {
                ClientError::Device(err.to_string())
            }
            other => ClientError::Validation(other.to_string()),
        }
    }
}
