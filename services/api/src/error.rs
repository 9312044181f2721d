//! Custom error types for submissions

use common::ClientError;
use thiserror::Error;

/// A submission that cannot be built from the current form
///
/// Checked in declaration order; no request is sent while any of these holds.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter a title")]
    EmptyTitle,

    #[error("Location is required. Please allow location access or enter coordinates manually.")]
    MissingLocation,

    #[error("Your location is out of date. Please refresh it before submitting.")]
    StaleLocation,

    #[error("Please enter some text")]
    EmptyText,

    #[error("Please record or select a file first")]
    MissingPayload,
}

/// Custom error type for the submission orchestrator
#[derive(Error, Debug)]
pub enum SubmissionError {
    /// Refused before any network call
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// Transport, backend or session failure
    #[error(transparent)]
    Client(#[from] ClientError),
}

impl SubmissionError {
    /// Message for the transient notice; form state is kept either way
    pub fn user_message(&self) -> String {
        match self {
            SubmissionError::Invalid(err) => err.to_string(),
            SubmissionError::Client(err) => err.user_message(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, SubmissionError::Invalid(_))
    }
}

/// Type alias for submission results
pub type SubmissionResult<T> = Result<T, SubmissionError>;
