//! Authentication for the Corpus client
//!
//! A thin client over the backend's OTP and password login endpoints, plus
//! the persisted session every other component reads its bearer token from.

pub mod models;
pub mod session;
pub mod validation;

pub use models::{Session, User};
pub use session::{SessionHandle, SessionManager};
