//! Device capabilities the client asks the platform for
//!
//! Microphone, camera and geolocation access are modelled as requests that
//! either grant a handle or are refused with a reason. A browser shell, a
//! mobile shell or the CLI plug in their own implementations; the CLI ships
//! with the "not available" ones below.

use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

use crate::location::{Coordinates, LocationError, PositionOptions};
use crate::models::ContentKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Microphone,
    Camera,
    Geolocation,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Capability::Microphone => "Microphone",
            Capability::Camera => "Camera",
            Capability::Geolocation => "Geolocation",
        })
    }
}

/// Why a capability request did not yield a usable handle
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CapabilityError {
    #[error("{capability} permission denied: {reason}")]
    Denied {
        capability: Capability,
        reason: String,
    },

    #[error("{0} is not available")]
    Unsupported(Capability),

    #[error("{capability} failed: {reason}")]
    Failed {
        capability: Capability,
        reason: String,
    },
}

/// Tracks requested from the media devices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConstraints {
    pub audio: bool,
    pub video: bool,
}

impl StreamConstraints {
    /// Audio-only for audio recordings, audio plus video for video recordings
    pub fn for_recording(kind: ContentKind) -> Option<Self> {
        match kind {
            ContentKind::Audio => Some(Self {
                audio: true,
                video: false,
            }),
            ContentKind::Video => Some(Self {
                audio: true,
                video: true,
            }),
            _ => None,
        }
    }

    /// Camera only, for a still snapshot
    pub fn snapshot() -> Self {
        Self {
            audio: false,
            video: true,
        }
    }

    /// The capability a refusal of these constraints is reported against
    pub fn primary_capability(&self) -> Capability {
        if self.video {
            Capability::Camera
        } else {
            Capability::Microphone
        }
    }
}

/// One uncompressed RGBA frame grabbed from a camera track
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// Grants access to microphone and camera streams
#[async_trait]
pub trait MediaDevices: Send + Sync {
    async fn open_stream(
        &self,
        constraints: StreamConstraints,
    ) -> Result<Box<dyn MediaStream>, CapabilityError>;
}

/// A live device stream
///
/// Implementations must release the device both on [`MediaStream::stop`] and
/// when dropped, and tolerate `stop` being called more than once.
#[async_trait]
pub trait MediaStream: Send {
    /// Next encoded chunk; `None` once the source has ended
    async fn next_chunk(&mut self) -> Option<Vec<u8>>;

    /// Grab the current video frame
    async fn grab_frame(&mut self) -> Result<RawFrame, CapabilityError>;

    /// Stop every track of the stream
    fn stop(&mut self);
}

/// Answers "where is the device right now"
#[async_trait]
pub trait GeolocationProvider: Send + Sync {
    async fn current_position(&self, options: &PositionOptions)
    -> Result<Coordinates, LocationError>;
}

/// Media devices for platforms without microphone or camera access
#[derive(Debug, Default, Clone, Copy)]
pub struct NoMediaDevices;

#[async_trait]
impl MediaDevices for NoMediaDevices {
    async fn open_stream(
        &self,
        constraints: StreamConstraints,
    ) -> Result<Box<dyn MediaStream>, CapabilityError> {
        Err(CapabilityError::Unsupported(
            constraints.primary_capability(),
        ))
    }
}

/// Geolocation for platforms without a positioning API
#[derive(Debug, Default, Clone, Copy)]
pub struct NoGeolocation;

#[async_trait]
impl GeolocationProvider for NoGeolocation {
    async fn current_position(
        &self,
        _options: &PositionOptions,
    ) -> Result<Coordinates, LocationError> {
        Err(LocationError::Unsupported)
    }
}
