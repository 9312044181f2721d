//! Authentication models

pub mod session;
pub mod user;

// Re-export for convenience
pub use session::{LoginMethod, LoginRequest, LoginResponse, Session, VerifyOtpRequest};
pub use user::User;
