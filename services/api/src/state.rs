//! Client state shared across screens

use auth::{SessionHandle, SessionManager};
use common::error::ClientResult;
use common::{BackendClient, ClientConfig, FileStore, KeyValueStore};
use media::{
    ContentKind, GeolocationProvider, LocationAcquirer, MediaDevices, PositionOptions,
    PreviewRegistry,
};
use std::sync::Arc;
use tracing::info;

use crate::categories::CategoryDirectory;
use crate::profile::ProfileService;
use crate::submission::SubmissionOrchestrator;
use crate::workflow::UploadWorkflow;

/// Client state shared across screens
#[derive(Clone)]
pub struct AppState {
    pub config: ClientConfig,
    pub sessions: SessionManager,
    pub categories: CategoryDirectory,
    pub submissions: SubmissionOrchestrator,
    pub profile: ProfileService,
    pub previews: PreviewRegistry,
    pub devices: Arc<dyn MediaDevices>,
    pub geolocation: Arc<dyn GeolocationProvider>,
}

impl AppState {
    /// Wire every component to one backend client and session
    pub fn new(
        config: ClientConfig,
        store: Arc<dyn KeyValueStore>,
        devices: Arc<dyn MediaDevices>,
        geolocation: Arc<dyn GeolocationProvider>,
    ) -> ClientResult<Self> {
        let client = BackendClient::new(&config)?;
        let sessions = SessionManager::new(client.clone(), store);
        let handle = sessions.handle();

        Ok(Self {
            categories: CategoryDirectory::new(client.clone(), handle.clone(), &config),
            submissions: SubmissionOrchestrator::new(client.clone(), handle.clone(), &config),
            profile: ProfileService::new(client, handle),
            sessions,
            previews: PreviewRegistry::new(),
            devices,
            geolocation,
            config,
        })
    }

    /// State backed by the session file from the configuration
    pub fn with_file_store(
        config: ClientConfig,
        devices: Arc<dyn MediaDevices>,
        geolocation: Arc<dyn GeolocationProvider>,
    ) -> ClientResult<Self> {
        let path = config.storage_file()?;
        info!("Using session file {}", path.display());
        Self::new(config, Arc::new(FileStore::new(path)), devices, geolocation)
    }

    pub fn session(&self) -> SessionHandle {
        self.sessions.handle()
    }

    /// Open the upload screen of a category
    pub fn upload(
        &self,
        category_id: impl Into<String>,
        kind: ContentKind,
    ) -> Result<UploadWorkflow, media::CaptureError> {
        let location = LocationAcquirer::new(
            self.geolocation.clone(),
            PositionOptions::from_config(&self.config),
        );

        UploadWorkflow::new(
            category_id,
            kind,
            location,
            self.devices.clone(),
            self.previews.clone(),
            self.submissions.clone(),
            self.config.max_upload_bytes,
        )
    }
}
