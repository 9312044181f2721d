//! Media capture and geolocation for contributions
//!
//! Device access goes through the traits in [`capability`]; everything else
//! (recording state, snapshots, file selection, preview handles, location
//! fallback) is plain Rust driven by those traits.

pub mod capability;
pub mod error;
pub mod location;
pub mod models;
pub mod preview;
pub mod recorder;
pub mod selection;
pub mod snapshot;

pub use capability::{
    Capability, CapabilityError, GeolocationProvider, MediaDevices, MediaStream, NoGeolocation,
    NoMediaDevices, RawFrame, StreamConstraints,
};
pub use error::CaptureError;
pub use location::{
    CoordinateError, Coordinates, Geolocation, LocationAcquirer, LocationError, LocationSource,
    PositionOptions,
};
pub use models::{ContentKind, MediaBlob, TextStats, format_elapsed};
pub use preview::{PreviewHandle, PreviewRegistry};
pub use recorder::{CaptureSession, CaptureSnapshot, CaptureState};
pub use selection::FileSelector;
