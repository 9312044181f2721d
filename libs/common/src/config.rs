//! Client configuration
//!
//! Settings are layered: built-in defaults first, then `CORPUS_*` environment
//! variables (for example `CORPUS_API_BASE_URL` or
//! `CORPUS_GEOLOCATION_TIMEOUT_MS`).

use crate::error::{ClientError, ClientResult};
use config::{Config, Environment};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "https://backend2.swecha.org";
pub const DEFAULT_CATEGORIES_PATH: &str = "/api/v1/categories/";
pub const DEFAULT_CONTENT_PATH_PREFIX: &str = "/content";
pub const DEFAULT_GEOLOCATION_TIMEOUT_MS: u64 = 12_000;
pub const DEFAULT_GEOLOCATION_MAX_AGE_MS: u64 = 300_000;
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

const ENV_PREFIX: &str = "CORPUS";
const STORAGE_DIR_NAME: &str = "corpus-client";
const STORAGE_FILE_NAME: &str = "session.json";

/// Configuration for the backend connection and device behaviour
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Backend origin, without a trailing slash
    pub api_base_url: String,
    /// Path of the category listing endpoint
    pub categories_path: String,
    /// Prefix of the per-kind submission endpoints (`{prefix}/{kind}`)
    pub content_path_prefix: String,
    /// Location of the durable session file; defaults to the user data dir
    pub storage_path: Option<PathBuf>,
    /// Optional overall request timeout; the HTTP stack default applies otherwise
    pub request_timeout_secs: Option<u64>,
    pub geolocation_timeout_ms: u64,
    /// Maximum age of a device fix that may be reused or submitted
    pub geolocation_max_age_ms: u64,
    pub geolocation_high_accuracy: bool,
    /// Upper bound for files picked from disk
    pub max_upload_bytes: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            categories_path: DEFAULT_CATEGORIES_PATH.to_string(),
            content_path_prefix: DEFAULT_CONTENT_PATH_PREFIX.to_string(),
            storage_path: None,
            request_timeout_secs: None,
            geolocation_timeout_ms: DEFAULT_GEOLOCATION_TIMEOUT_MS,
            geolocation_max_age_ms: DEFAULT_GEOLOCATION_MAX_AGE_MS,
            geolocation_high_accuracy: true,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl ClientConfig {
    /// Create a new ClientConfig from defaults and environment variables
    ///
    /// # Environment Variables
    /// - `CORPUS_API_BASE_URL`: backend origin (default: "https://backend2.swecha.org")
    /// - `CORPUS_CATEGORIES_PATH`: category listing path (default: "/api/v1/categories/")
    /// - `CORPUS_CONTENT_PATH_PREFIX`: submission path prefix (default: "/content")
    /// - `CORPUS_STORAGE_PATH`: session file location
    /// - `CORPUS_REQUEST_TIMEOUT_SECS`: request timeout in seconds
    /// - `CORPUS_GEOLOCATION_TIMEOUT_MS`: geolocation timeout (default: 12000)
    /// - `CORPUS_GEOLOCATION_MAX_AGE_MS`: geolocation cache age (default: 300000)
    /// - `CORPUS_GEOLOCATION_HIGH_ACCURACY`: request a precise fix (default: true)
    /// - `CORPUS_MAX_UPLOAD_BYTES`: file size limit (default: 10 MiB)
    pub fn from_env() -> ClientResult<Self> {
        let defaults = ClientConfig::default();

        let settings = Config::builder()
            .set_default("api_base_url", defaults.api_base_url)
            .and_then(|b| b.set_default("categories_path", defaults.categories_path))
            .and_then(|b| b.set_default("content_path_prefix", defaults.content_path_prefix))
            .and_then(|b| b.set_default("geolocation_timeout_ms", defaults.geolocation_timeout_ms))
            .and_then(|b| b.set_default("geolocation_max_age_ms", defaults.geolocation_max_age_ms))
            .and_then(|b| {
                b.set_default(
                    "geolocation_high_accuracy",
                    defaults.geolocation_high_accuracy,
                )
            })
            .and_then(|b| b.set_default("max_upload_bytes", defaults.max_upload_bytes))
            .map_err(|e| ClientError::Configuration(e.to_string()))?
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .map_err(|e| ClientError::Configuration(e.to_string()))?;

        let mut config: ClientConfig = settings
            .try_deserialize()
            .map_err(|e| ClientError::Configuration(e.to_string()))?;
        config.api_base_url = config.api_base_url.trim_end_matches('/').to_string();

        if config.api_base_url.is_empty() {
            return Err(ClientError::Configuration(
                "api_base_url must not be empty".to_string(),
            ));
        }

        Ok(config)
    }

    /// Same configuration pointed at another backend
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.api_base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Resolve the session file, falling back to the platform data directory
    pub fn storage_file(&self) -> ClientResult<PathBuf> {
        if let Some(path) = &self.storage_path {
            return Ok(path.clone());
        }

        dirs::data_dir()
            .map(|dir| dir.join(STORAGE_DIR_NAME).join(STORAGE_FILE_NAME))
            .ok_or_else(|| {
                ClientError::Configuration("No data directory available for storage".to_string())
            })
    }

    pub fn geolocation_timeout(&self) -> Duration {
        Duration::from_millis(self.geolocation_timeout_ms)
    }

    pub fn geolocation_max_age(&self) -> Duration {
        Duration::from_millis(self.geolocation_max_age_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}
