//! Session model and the login payloads exchanged with the backend

use serde::{Deserialize, Serialize};

use super::user::User;

/// The signed-in session: bearer token plus user identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: User,
}

/// Successful login response
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub user: User,
}

impl From<LoginResponse> for Session {
    fn from(response: LoginResponse) -> Self {
        Self {
            token: response.access_token,
            user: response.user,
        }
    }
}

/// How the user proves their identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoginMethod {
    Otp,
    Password,
}

/// Body of `POST /users/login`
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub phone_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub login_method: LoginMethod,
}

/// Body of `POST /users/verify-otp`
#[derive(Debug, Clone, Serialize)]
pub struct VerifyOtpRequest {
    pub phone_number: String,
    pub otp: String,
}
