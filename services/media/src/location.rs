//! Geolocation acquisition with manual fallback
//!
//! A device fix is requested once per call, bounded by a client-side timeout.
//! When the platform cannot supply a fix the user types coordinates in
//! instead; those are range-checked before they replace the stored location.

use common::config::ClientConfig;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::{Instant, timeout};
use tracing::{info, warn};

use crate::capability::{Capability, GeolocationProvider};

pub const LATITUDE_RANGE: (f64, f64) = (-90.0, 90.0);
pub const LONGITUDE_RANGE: (f64, f64) = (-180.0, 180.0);

/// Options passed with every position request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionOptions {
    pub high_accuracy: bool,
    pub timeout: Duration,
    /// How old a previous device fix may be and still be reused
    pub max_cache_age: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: Duration::from_millis(common::config::DEFAULT_GEOLOCATION_TIMEOUT_MS),
            max_cache_age: Duration::from_millis(common::config::DEFAULT_GEOLOCATION_MAX_AGE_MS),
        }
    }
}

impl PositionOptions {
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            high_accuracy: config.geolocation_high_accuracy,
            timeout: config.geolocation_timeout(),
            max_cache_age: config.geolocation_max_age(),
        }
    }
}

/// Raw reading from the positioning capability
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
    /// Accuracy radius in metres, when the platform reports one
    pub accuracy: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationSource {
    Device,
    Manual,
}

/// A validated latitude/longitude pair attached to a submission
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geolocation {
    latitude: f64,
    longitude: f64,
    source: LocationSource,
    acquired_at: Instant,
}

impl Geolocation {
    pub fn new(
        latitude: f64,
        longitude: f64,
        source: LocationSource,
    ) -> Result<Self, CoordinateError> {
        check_range(latitude, LATITUDE_RANGE, CoordinateError::LatitudeOutOfRange)?;
        check_range(longitude, LONGITUDE_RANGE, CoordinateError::LongitudeOutOfRange)?;

        Ok(Self {
            latitude,
            longitude,
            source,
            acquired_at: Instant::now(),
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn source(&self) -> LocationSource {
        self.source
    }

    pub fn age(&self) -> Duration {
        self.acquired_at.elapsed()
    }

    /// Device fixes expire after `max_age`; manual entries stay valid until cleared
    pub fn is_fresh(&self, max_age: Duration) -> bool {
        match self.source {
            LocationSource::Manual => true,
            LocationSource::Device => self.age() <= max_age,
        }
    }
}

fn check_range(
    value: f64,
    (min, max): (f64, f64),
    error: fn(f64) -> CoordinateError,
) -> Result<(), CoordinateError> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(error(value))
    }
}

/// Failure of a device position request
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocationError {
    #[error("Location permission denied")]
    PermissionDenied,

    #[error("Location information is unavailable")]
    PositionUnavailable,

    #[error("Location request timed out")]
    Timeout,

    #[error("Geolocation is not supported")]
    Unsupported,

    #[error("Unknown location error: {0}")]
    Unknown(String),
}

impl LocationError {
    pub fn user_message(&self) -> &'static str {
        match self {
            LocationError::PermissionDenied => {
                "Location access was denied. Please allow location access or enter coordinates manually."
            }
            LocationError::PositionUnavailable => {
                "Your location could not be determined. Please enter coordinates manually."
            }
            LocationError::Timeout => {
                "Getting your location took too long. Please retry or enter coordinates manually."
            }
            LocationError::Unsupported => {
                "This device does not support location. Please enter coordinates manually."
            }
            LocationError::Unknown(_) => {
                "An unknown error occurred while getting your location. Please enter coordinates manually."
            }
        }
    }
}

impl From<LocationError> for common::ClientError {
    fn from(err: LocationError) -> Self {
        match err {
            LocationError::PermissionDenied => {
                common::ClientError::PermissionDenied("location".to_string())
            }
            LocationError::Unsupported => {
                common::ClientError::CapabilityUnsupported(Capability::Geolocation.to_string())
            }
            other => common::ClientError::Device(other.user_message().to_string()),
        }
    }
}

/// Rejected manual coordinates
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoordinateError {
    #[error("Latitude must be a number")]
    InvalidLatitude,

    #[error("Longitude must be a number")]
    InvalidLongitude,

    #[error("Latitude {0} is outside -90 to 90")]
    LatitudeOutOfRange(f64),

    #[error("Longitude {0} is outside -180 to 180")]
    LongitudeOutOfRange(f64),
}

impl From<CoordinateError> for common::ClientError {
    fn from(err: CoordinateError) -> Self {
        common::ClientError::Validation(err.to_string())
    }
}

/// Owns the location of one upload screen
pub struct LocationAcquirer {
    provider: Arc<dyn GeolocationProvider>,
    options: PositionOptions,
    location: Option<Geolocation>,
    last_error: Option<LocationError>,
}

impl LocationAcquirer {
    pub fn new(provider: Arc<dyn GeolocationProvider>, options: PositionOptions) -> Self {
        Self {
            provider,
            options,
            location: None,
            last_error: None,
        }
    }

    pub fn options(&self) -> &PositionOptions {
        &self.options
    }

    /// Request a device fix
    ///
    /// A stored device fix younger than the max cache age is returned without
    /// asking the platform again. On failure the stored location is left as it
    /// was and the caller should offer manual entry.
    pub async fn acquire_location(&mut self) -> Result<Geolocation, LocationError> {
        if let Some(cached) = self.location.filter(|loc| {
            loc.source() == LocationSource::Device && loc.age() <= self.options.max_cache_age
        }) {
            return Ok(cached);
        }

        let result = match timeout(
            self.options.timeout,
            self.provider.current_position(&self.options),
        )
        .await
        {
            Err(_) => Err(LocationError::Timeout),
            Ok(Err(e)) => Err(e),
            Ok(Ok(coords)) => {
                Geolocation::new(coords.latitude, coords.longitude, LocationSource::Device)
                    .map_err(|e| {
                        warn!("Discarding invalid device fix: {}", e);
                        LocationError::PositionUnavailable
                    })
            }
        };

        match result {
            Ok(location) => {
                info!(
                    latitude = location.latitude(),
                    longitude = location.longitude(),
                    "Device location acquired"
                );
                self.location = Some(location);
                self.last_error = None;
                Ok(location)
            }
            Err(e) => {
                warn!("Location acquisition failed: {}", e);
                self.last_error = Some(e.clone());
                Err(e)
            }
        }
    }

    /// Explicit user-triggered retry; never scheduled automatically
    pub async fn retry(&mut self) -> Result<Geolocation, LocationError> {
        self.acquire_location().await
    }

    /// Accept coordinates typed by the user
    pub fn submit_manual_location(
        &mut self,
        latitude: &str,
        longitude: &str,
    ) -> Result<Geolocation, CoordinateError> {
        let lat = parse_coordinate(latitude).ok_or(CoordinateError::InvalidLatitude)?;
        let lng = parse_coordinate(longitude).ok_or(CoordinateError::InvalidLongitude)?;
        let location = Geolocation::new(lat, lng, LocationSource::Manual)?;

        info!(latitude = lat, longitude = lng, "Manual location accepted");
        self.location = Some(location);
        self.last_error = None;
        Ok(location)
    }

    pub fn location(&self) -> Option<Geolocation> {
        self.location
    }

    pub fn last_error(&self) -> Option<&LocationError> {
        self.last_error.as_ref()
    }

    /// True once acquisition has failed and nothing usable is stored
    pub fn needs_manual_entry(&self) -> bool {
        self.location.is_none() && self.last_error.is_some()
    }

    pub fn clear(&mut self) {
        self.location = None;
        self.last_error = None;
    }
}

fn parse_coordinate(input: &str) -> Option<f64> {
    input.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
