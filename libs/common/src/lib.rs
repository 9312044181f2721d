//! Common library for the Corpus contribution client
//!
//! This crate provides shared functionality used across the client's
//! services: the error taxonomy, configuration, the durable key-value store
//! and the HTTP connection to the contribution backend.

pub mod config;
pub mod de;
pub mod error;
pub mod http;
pub mod storage;

pub use config::ClientConfig;
pub use error::{ClientError, ClientResult, StorageError, StorageResult};
pub use http::BackendClient;
pub use storage::{FileStore, KeyValueStore, MemoryStore};

/// Example usage of the backend client
///
/// ```rust,no_run
/// use common::{BackendClient, ClientConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = ClientConfig::from_env()?;
///     let client = BackendClient::new(&config)?;
///     let is_healthy = client.health_check().await?;
///     println!("Backend health check: {}", is_healthy);
///     Ok(())
/// }
/// ```
pub fn example_usage() {}
