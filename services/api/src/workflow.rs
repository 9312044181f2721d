//! Upload workflow for one category
//!
//! One screen serves all four content kinds. The location is acquired once
//! per screen and survives switching between kinds; the capture session is
//! rebuilt for every kind switch. Leaving the screen releases the device
//! streams and preview handles and forgets the location.

use media::{
    CaptureError, CaptureSession, ContentKind, CoordinateError, Geolocation, LocationAcquirer,
    LocationError, MediaDevices, PreviewRegistry, TextStats,
};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::error::SubmissionResult;
use crate::models::SubmissionReceipt;
use crate::submission::{SubmissionDraft, SubmissionOrchestrator};

pub struct UploadWorkflow {
    category_id: String,
    kind: ContentKind,
    title: String,
    text: String,
    location: LocationAcquirer,
    capture: Option<CaptureSession>,
    devices: Arc<dyn MediaDevices>,
    previews: PreviewRegistry,
    orchestrator: SubmissionOrchestrator,
    max_upload_bytes: u64,
}

impl UploadWorkflow {
    pub fn new(
        category_id: impl Into<String>,
        kind: ContentKind,
        location: LocationAcquirer,
        devices: Arc<dyn MediaDevices>,
        previews: PreviewRegistry,
        orchestrator: SubmissionOrchestrator,
        max_upload_bytes: u64,
    ) -> Result<Self, CaptureError> {
        let capture = Self::capture_for(kind, &devices, &previews)?;
        Ok(Self {
            category_id: category_id.into(),
            kind,
            title: String::new(),
            text: String::new(),
            location,
            capture,
            devices,
            previews,
            orchestrator,
            max_upload_bytes,
        })
    }

    fn capture_for(
        kind: ContentKind,
        devices: &Arc<dyn MediaDevices>,
        previews: &PreviewRegistry,
    ) -> Result<Option<CaptureSession>, CaptureError> {
        if kind.is_binary() {
            CaptureSession::new(kind, devices.clone(), previews.clone()).map(Some)
        } else {
            Ok(None)
        }
    }

    pub fn category_id(&self) -> &str {
        &self.category_id
    }

    pub fn kind(&self) -> ContentKind {
        self.kind
    }

    /// Switch to another content kind, dropping whatever was captured
    pub async fn switch_kind(&mut self, kind: ContentKind) -> Result<(), CaptureError> {
        if kind == self.kind {
            return Ok(());
        }

        if let Some(mut capture) = self.capture.take() {
            capture.reset().await;
        }
        self.capture = Self::capture_for(kind, &self.devices, &self.previews)?;
        self.kind = kind;
        info!("Switched upload to {} content", kind);
        Ok(())
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn text_stats(&self) -> TextStats {
        TextStats::of(&self.text)
    }

    pub fn location(&self) -> &LocationAcquirer {
        &self.location
    }

    pub async fn locate(&mut self) -> Result<Geolocation, LocationError> {
        self.location.acquire_location().await
    }

    pub fn enter_location(
        &mut self,
        latitude: &str,
        longitude: &str,
    ) -> Result<Geolocation, CoordinateError> {
        self.location.submit_manual_location(latitude, longitude)
    }

    /// Capture session of the current kind; text has none
    pub fn capture(&self) -> Option<&CaptureSession> {
        self.capture.as_ref()
    }

    /// Location and capture borrowed apart, so both can be driven at once
    pub fn parts_mut(&mut self) -> (&mut LocationAcquirer, Option<&mut CaptureSession>) {
        (&mut self.location, self.capture.as_mut())
    }

    pub fn capture_mut(&mut self) -> Result<&mut CaptureSession, CaptureError> {
        let kind = self.kind;
        self.capture.as_mut().ok_or(CaptureError::UnsupportedKind {
            kind,
            operation: "capture",
        })
    }

    pub async fn start_recording(&mut self) -> Result<(), CaptureError> {
        self.capture_mut()?.start_recording().await
    }

    pub async fn stop_recording(&mut self) -> Result<(), CaptureError> {
        self.capture_mut()?.stop_recording().await
    }

    pub async fn capture_snapshot(&mut self) -> Result<(), CaptureError> {
        self.capture_mut()?.capture_snapshot().await
    }

    pub async fn select_file(&mut self, path: &Path) -> Result<(), CaptureError> {
        let max_bytes = self.max_upload_bytes;
        self.capture_mut()?.select_file(path, max_bytes).await
    }

    /// Discard the captured payload; false when there was nothing to discard
    pub fn discard(&mut self) -> bool {
        self.capture.as_mut().is_some_and(CaptureSession::discard)
    }

    pub fn draft(&self) -> SubmissionDraft {
        SubmissionDraft {
            category_id: self.category_id.clone(),
            kind: self.kind,
            title: self.title.clone(),
            text: self.text.clone(),
            payload: self.capture.as_ref().and_then(CaptureSession::blob),
            location: self.location.location(),
        }
    }

    /// Submit the form
    ///
    /// On success the payload is released and the title, text and location
    /// are cleared. On failure nothing changes so the user can resubmit.
    pub async fn submit(&mut self) -> SubmissionResult<SubmissionReceipt> {
        let receipt = self.orchestrator.submit_draft(self.draft()).await?;

        if let Some(capture) = self.capture.as_mut() {
            capture.complete();
        }
        self.title.clear();
        self.text.clear();
        self.location.clear();
        Ok(receipt)
    }

    /// Leave the screen, releasing devices and preview handles
    pub async fn leave(mut self) {
        if let Some(capture) = self.capture.as_mut() {
            capture.reset().await;
        }
        self.location.clear();
        info!("Left upload for category {}", self.category_id);
    }
}
