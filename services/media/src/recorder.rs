//! Capture session state machine
//!
//! ```text
//! Idle --start_recording--> Recording --stop_recording--> Stopped(blob)
//!   ^                                                       |    |
//!   +---------------------------discard---------------------+    +--complete--> Submitted
//! ```
//!
//! Images skip the recording cycle: a snapshot or a picked file moves the
//! session straight to `Stopped`. Device acquisition failures leave the state
//! untouched. The preview handle of a payload is revoked on discard, reset,
//! completion and drop.

use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{Instant, interval_at};
use tracing::{debug, info, warn};

use crate::capability::{MediaDevices, MediaStream, StreamConstraints};
use crate::error::CaptureError;
use crate::models::{ContentKind, MediaBlob};
use crate::preview::{PreviewHandle, PreviewRegistry};
use crate::selection::FileSelector;
use crate::snapshot::SnapshotEncoder;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    Idle,
    Recording,
    Stopped,
    Submitted,
}

impl fmt::Display for CaptureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CaptureState::Idle => "idle",
            CaptureState::Recording => "recording",
            CaptureState::Stopped => "stopped",
            CaptureState::Submitted => "submitted",
        })
    }
}

/// Observable state of a capture session, comparable across sessions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureSnapshot {
    pub kind: ContentKind,
    pub state: CaptureState,
    pub elapsed_seconds: u64,
    pub payload_bytes: Option<usize>,
    pub preview: Option<PreviewHandle>,
}

struct ActiveRecording {
    stop: oneshot::Sender<()>,
    pump: JoinHandle<Vec<Vec<u8>>>,
    ticker: JoinHandle<()>,
}

impl ActiveRecording {
    /// Signal the pump to stop the stream and stop counting
    fn halt(self) -> JoinHandle<Vec<Vec<u8>>> {
        let _ = self.stop.send(());
        self.ticker.abort();
        self.pump
    }
}

/// Capture of one binary payload on the upload screen
pub struct CaptureSession {
    kind: ContentKind,
    devices: Arc<dyn MediaDevices>,
    previews: PreviewRegistry,
    state: CaptureState,
    elapsed: Arc<AtomicU64>,
    active: Option<ActiveRecording>,
    blob: Option<Arc<MediaBlob>>,
    preview: Option<PreviewHandle>,
}

impl CaptureSession {
    /// New idle session; text has nothing to capture
    pub fn new(
        kind: ContentKind,
        devices: Arc<dyn MediaDevices>,
        previews: PreviewRegistry,
    ) -> Result<Self, CaptureError> {
        if !kind.is_binary() {
            return Err(CaptureError::UnsupportedKind {
                kind,
                operation: "capture",
            });
        }

        Ok(Self {
            kind,
            devices,
            previews,
            state: CaptureState::Idle,
            elapsed: Arc::new(AtomicU64::new(0)),
            active: None,
            blob: None,
            preview: None,
        })
    }

    pub fn kind(&self) -> ContentKind {
        self.kind
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed.load(Ordering::Relaxed)
    }

    /// The finished payload, once in `Stopped`
    pub fn blob(&self) -> Option<Arc<MediaBlob>> {
        self.blob.clone()
    }

    pub fn preview(&self) -> Option<PreviewHandle> {
        self.preview
    }

    /// Resolve the preview handle for playback
    pub fn playback(&self) -> Option<Arc<MediaBlob>> {
        self.preview.and_then(|handle| self.previews.resolve(handle))
    }

    pub fn snapshot(&self) -> CaptureSnapshot {
        CaptureSnapshot {
            kind: self.kind,
            state: self.state,
            elapsed_seconds: self.elapsed_seconds(),
            payload_bytes: self.blob.as_ref().map(|blob| blob.len()),
            preview: self.preview,
        }
    }

    /// Acquire the microphone (and camera for video) and start buffering
    pub async fn start_recording(&mut self) -> Result<(), CaptureError> {
        let constraints =
            StreamConstraints::for_recording(self.kind).ok_or(CaptureError::UnsupportedKind {
                kind: self.kind,
                operation: "recording",
            })?;

        if self.state != CaptureState::Idle {
            return Err(CaptureError::InvalidState {
                operation: "start recording",
                state: self.state,
            });
        }

        let stream = self.devices.open_stream(constraints).await.map_err(|e| {
            warn!("Failed to start {} recording: {}", self.kind, e);
            e
        })?;

        self.elapsed.store(0, Ordering::Relaxed);
        let (stop_tx, stop_rx) = oneshot::channel();
        self.active = Some(ActiveRecording {
            stop: stop_tx,
            pump: tokio::spawn(pump_chunks(stream, stop_rx)),
            ticker: spawn_ticker(self.elapsed.clone()),
        });
        self.state = CaptureState::Recording;

        info!("{} recording started", self.kind);
        Ok(())
    }

    /// Finish the recording into one blob and release the device
    ///
    /// Does nothing unless a recording is in progress.
    pub async fn stop_recording(&mut self) -> Result<(), CaptureError> {
        let Some(active) = self.active.take() else {
            debug!("stop_recording ignored while {}", self.state);
            return Ok(());
        };

        let chunks = match active.halt().await {
            Ok(chunks) => chunks,
            Err(e) => {
                self.state = CaptureState::Idle;
                self.elapsed.store(0, Ordering::Relaxed);
                return Err(CaptureError::Recording(e.to_string()));
            }
        };

        let mime_type = self.kind.recording_mime_type().unwrap_or("application/octet-stream");
        let file_name = format!("{}-recording.webm", self.kind);
        let blob = MediaBlob::new(chunks.concat(), mime_type, file_name);

        info!(
            bytes = blob.len(),
            seconds = self.elapsed_seconds(),
            "{} recording completed",
            self.kind
        );
        self.set_payload(blob);
        Ok(())
    }

    /// Take a still photo through a short-lived camera stream
    pub async fn capture_snapshot(&mut self) -> Result<(), CaptureError> {
        if self.kind != ContentKind::Image {
            return Err(CaptureError::UnsupportedKind {
                kind: self.kind,
                operation: "snapshots",
            });
        }

        let mut stream = self
            .devices
            .open_stream(StreamConstraints::snapshot())
            .await?;
        let frame = stream.grab_frame().await;
        stream.stop();

        let blob = SnapshotEncoder::encode(frame?)?;
        self.set_payload(blob);
        info!("Snapshot captured");
        Ok(())
    }

    /// Use an existing file as the payload, replacing any previous one
    pub async fn select_file(&mut self, path: &Path, max_bytes: u64) -> Result<(), CaptureError> {
        if self.state == CaptureState::Recording {
            return Err(CaptureError::InvalidState {
                operation: "select a file",
                state: self.state,
            });
        }

        let blob = FileSelector::load(path, self.kind, max_bytes).await?;
        self.set_payload(blob);
        Ok(())
    }

    /// Throw away the finished payload and return to `Idle`
    ///
    /// Returns false (and changes nothing) unless the session is `Stopped`.
    pub fn discard(&mut self) -> bool {
        if self.state != CaptureState::Stopped {
            debug!("discard ignored while {}", self.state);
            return false;
        }

        self.clear_payload();
        self.state = CaptureState::Idle;
        info!("{} capture discarded", self.kind);
        true
    }

    /// Mark the payload as submitted and release it
    pub fn complete(&mut self) {
        if self.state == CaptureState::Stopped {
            self.clear_payload();
            self.state = CaptureState::Submitted;
        }
    }

    /// Return to `Idle` from any state, releasing the device and the preview
    pub async fn reset(&mut self) {
        if let Some(active) = self.active.take() {
            if let Err(e) = active.halt().await {
                debug!("Recorder task ended abnormally during reset: {}", e);
            }
        }
        self.clear_payload();
        self.state = CaptureState::Idle;
    }

    fn set_payload(&mut self, blob: MediaBlob) {
        self.release_preview();
        let blob = Arc::new(blob);
        self.preview = Some(self.previews.create(blob.clone()));
        self.blob = Some(blob);
        self.state = CaptureState::Stopped;
    }

    fn clear_payload(&mut self) {
        self.release_preview();
        self.blob = None;
        self.elapsed.store(0, Ordering::Relaxed);
    }

    fn release_preview(&mut self) {
        if let Some(handle) = self.preview.take() {
            self.previews.revoke(handle);
        }
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        if let Some(active) = self.active.take() {
            // The pump stops the stream once it sees the signal
            drop(active.halt());
        }
        self.release_preview();
    }
}

/// Buffer chunks until told to stop, then release the stream
async fn pump_chunks(
    mut stream: Box<dyn MediaStream>,
    mut stop: oneshot::Receiver<()>,
) -> Vec<Vec<u8>> {
    let mut chunks = Vec::new();
    let mut source_ended = false;

    loop {
        tokio::select! {
            _ = &mut stop => break,
            chunk = stream.next_chunk() => match chunk {
                Some(chunk) if !chunk.is_empty() => chunks.push(chunk),
                Some(_) => {}
                None => {
                    source_ended = true;
                    break;
                }
            },
        }
    }

    if source_ended {
        debug!("Media source ended before stop was requested");
        let _ = stop.await;
    }

    stream.stop();
    chunks
}

fn spawn_ticker(elapsed: Arc<AtomicU64>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let period = Duration::from_secs(1);
        let mut ticks = interval_at(Instant::now() + period, period);
        loop {
            ticks.tick().await;
            elapsed.fetch_add(1, Ordering::Relaxed);
        }
    })
}
