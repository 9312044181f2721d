//! Session management for the signed-in user
//!
//! The session is the only state shared by every part of the client. It is
//! read through [`SessionHandle`]; only [`SessionManager`]'s login and logout
//! operations mutate it. The token and user are mirrored into durable storage
//! under two fixed keys so the next run starts signed in.

use common::error::{ClientError, ClientResult, StorageError, StorageResult};
use common::http::BackendClient;
use common::storage::KeyValueStore;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::models::{LoginMethod, LoginRequest, LoginResponse, Session, User, VerifyOtpRequest};
use crate::validation;

/// Storage key of the bearer token
pub const TOKEN_KEY: &str = "token";
/// Storage key of the JSON-encoded user
pub const USER_KEY: &str = "user";

const LOGIN_PATH: &str = "/users/login";
const VERIFY_OTP_PATH: &str = "/users/verify-otp";

/// Read-only view of the current session
#[derive(Clone, Default)]
pub struct SessionHandle {
    current: Arc<RwLock<Option<Session>>>,
}

impl SessionHandle {
    /// Snapshot of the current session, if any
    pub async fn current(&self) -> Option<Session> {
        self.current.read().await.clone()
    }

    /// Bearer token of the current session
    pub async fn token(&self) -> Option<String> {
        self.current
            .read()
            .await
            .as_ref()
            .map(|session| session.token.clone())
    }

    /// Bearer token, or `Unauthenticated` when nobody is signed in
    pub async fn require_token(&self) -> ClientResult<String> {
        self.token().await.ok_or(ClientError::Unauthenticated)
    }

    pub async fn is_authenticated(&self) -> bool {
        self.current.read().await.is_some()
    }
}

/// Session manager for logging in, out, and restoring a persisted session
#[derive(Clone)]
pub struct SessionManager {
    client: BackendClient,
    store: Arc<dyn KeyValueStore>,
    handle: SessionHandle,
}

impl SessionManager {
    /// Create a new session manager with no active session
    pub fn new(client: BackendClient, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            client,
            store,
            handle: SessionHandle::default(),
        }
    }

    /// Read-only handle for the other components
    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }

    /// Restore the session persisted by a previous run
    ///
    /// Both keys must be present; a half-written, unreadable or corrupt
    /// session is treated as signed out.
    pub async fn restore(&self) -> ClientResult<Option<Session>> {
        let (token, user) = match self.read_persisted().await {
            Ok(pair) => pair,
            Err(StorageError::Serialization(e)) => {
                warn!("Ignoring unreadable session storage: {}", e);
                (None, None)
            }
            Err(e) => return Err(e.into()),
        };

        let session = match (token, user) {
            (Some(token), Some(user)) => match serde_json::from_str::<User>(&user) {
                Ok(user) => Some(Session { token, user }),
                Err(e) => {
                    warn!("Ignoring unreadable persisted user: {}", e);
                    None
                }
            },
            _ => None,
        };

        if let Some(session) = &session {
            info!("Restored session for user: {}", session.user.id);
        }

        *self.handle.current.write().await = session.clone();
        Ok(session)
    }

    async fn read_persisted(&self) -> StorageResult<(Option<String>, Option<String>)> {
        Ok((self.store.get(TOKEN_KEY).await?, self.store.get(USER_KEY).await?))
    }

    /// Ask the backend to send a one-time password to `phone_number`
    pub async fn request_otp(&self, phone_number: &str) -> ClientResult<()> {
        validation::validate_phone_number(phone_number).map_err(ClientError::Validation)?;
        info!("Requesting OTP");

        let body = LoginRequest {
            phone_number: phone_number.trim().to_string(),
            password: None,
            login_method: LoginMethod::Otp,
        };

        self.client
            .send(self.client.post(LOGIN_PATH, None).json(&body))
            .await?;

        info!("OTP sent successfully");
        Ok(())
    }

    /// Complete an OTP login
    pub async fn verify_otp(&self, phone_number: &str, otp: &str) -> ClientResult<Session> {
        validation::validate_phone_number(phone_number).map_err(ClientError::Validation)?;
        validation::validate_otp(otp).map_err(ClientError::Validation)?;
        info!("Verifying OTP");

        let body = VerifyOtpRequest {
            phone_number: phone_number.trim().to_string(),
            otp: otp.trim().to_string(),
        };

        let response: LoginResponse = self
            .client
            .send_json(self.client.post(VERIFY_OTP_PATH, None).json(&body))
            .await?;

        self.establish(response.into()).await
    }

    /// Log in with phone number and password
    pub async fn login_with_password(
        &self,
        phone_number: &str,
        password: &str,
    ) -> ClientResult<Session> {
        validation::validate_password_login(phone_number, password)
            .map_err(ClientError::Validation)?;
        info!("Password login attempt");

        let body = LoginRequest {
            phone_number: phone_number.trim().to_string(),
            password: Some(password.to_string()),
            login_method: LoginMethod::Password,
        };

        let response: LoginResponse = self
            .client
            .send_json(self.client.post(LOGIN_PATH, None).json(&body))
            .await?;

        self.establish(response.into()).await
    }

    /// Drop the session locally and from durable storage
    pub async fn logout(&self) -> ClientResult<()> {
        let previous = self.handle.current.write().await.take();
        if let Some(session) = previous {
            info!("Logging out user: {}", session.user.id);
        }

        self.store.delete(TOKEN_KEY).await?;
        self.store.delete(USER_KEY).await?;
        Ok(())
    }

    async fn establish(&self, session: Session) -> ClientResult<Session> {
        let user_json = serde_json::to_string(&session.user)
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;

        self.store.set(TOKEN_KEY, &session.token).await?;
        self.store.set(USER_KEY, &user_json).await?;
        *self.handle.current.write().await = Some(session.clone());

        info!("Login successful for user: {}", session.user.id);
        Ok(session)
    }
}
