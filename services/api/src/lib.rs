//! Contribution workflow for the Corpus client
//!
//! Category listing, the upload workflow and the submission orchestrator,
//! plus the profile screen's backend calls. [`AppState`] wires them to one
//! backend client and session.

pub mod categories;
pub mod error;
pub mod models;
pub mod profile;
pub mod state;
pub mod submission;
pub mod workflow;

pub use categories::{CategoryDirectory, CategoryListing, category_icon};
pub use error::{SubmissionError, SubmissionResult, ValidationError};
pub use models::{Category, ExportJob, SubmissionReceipt, UserStats};
pub use profile::{ContactDetails, ProfileService};
pub use state::AppState;
pub use submission::{SubmissionDraft, SubmissionOrchestrator, SubmissionRequest};
pub use workflow::UploadWorkflow;
