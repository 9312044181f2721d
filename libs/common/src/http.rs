//! HTTP client for the contribution backend
//!
//! Wraps a shared `reqwest::Client` with the configured base URL, bearer
//! authentication and the uniform handling of non-2xx responses: the JSON body
//! is searched for a `detail` or `message` field, otherwise the error carries
//! no message and the caller shows a generic notice.

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

/// Backend connection shared by every component
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: Client,
    base_url: String,
}

impl BackendClient {
    /// Initialize a new backend client
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }

        let http = builder
            .build()
            .map_err(|e| ClientError::Configuration(format!("Invalid HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for a backend path
    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Start a GET request, authenticated when a token is given
    pub fn get(&self, path: &str, token: Option<&str>) -> RequestBuilder {
        Self::authorize(self.http.get(self.url(path)), token)
    }

    /// Start a POST request, authenticated when a token is given
    pub fn post(&self, path: &str, token: Option<&str>) -> RequestBuilder {
        Self::authorize(self.http.post(self.url(path)), token)
    }

    fn authorize(request: RequestBuilder, token: Option<&str>) -> RequestBuilder {
        match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Send a request and return the response if it is a 2xx
    pub async fn send(&self, request: RequestBuilder) -> ClientResult<Response> {
        let response = request.send().await.map_err(ClientError::Network)?;
        let status = response.status();
        debug!("{} {}", status.as_u16(), response.url());

        if status.is_success() {
            Ok(response)
        } else {
            Err(error_from_response(response).await)
        }
    }

    /// Send a request and decode a 2xx JSON body
    pub async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> ClientResult<T> {
        let response = self.send(request).await?;
        let body = response.bytes().await.map_err(ClientError::Network)?;
        serde_json::from_slice(&body).map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }

    /// Check that the backend answers at all
    pub async fn health_check(&self) -> ClientResult<bool> {
        let response = self
            .http
            .get(self.url("/"))
            .send()
            .await
            .map_err(ClientError::Network)?;
        Ok(!response.status().is_server_error())
    }
}

/// Turn a non-2xx response into a `Server` or `UnknownServer` error
pub async fn error_from_response(response: Response) -> ClientError {
    let status = response.status().as_u16();

    let body = match response.bytes().await {
        Ok(body) => body,
        Err(e) => {
            warn!("Failed to read error body for status {}: {}", status, e);
            return ClientError::UnknownServer { status };
        }
    };

    match extract_error_message(&body) {
        Some(message) => ClientError::Server { status, message },
        None => {
            warn!("Unreadable error body for status {}", status);
            ClientError::UnknownServer { status }
        }
    }
}

/// Find a human-readable message in an error body
///
/// Accepts `{"detail": "..."}`, `{"message": "..."}` and the validation form
/// `{"detail": [{"msg": "..."}, ...]}`.
pub fn extract_error_message(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;

    let from_field = |field: &str| -> Option<String> {
        match value.get(field)? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Array(items) => {
                let messages: Vec<&str> = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(Value::as_str))
                    .collect();
                (!messages.is_empty()).then(|| messages.join("; "))
            }
            _ => None,
        }
    };

    from_field("detail").or_else(|| from_field("message"))
}
