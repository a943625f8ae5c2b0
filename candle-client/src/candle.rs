//! Candle data model.
//!
//! A candle is one anonymous emotional data point on the map. Wire field names
//! match the hosted `markers` table (`position` is a two-element float array,
//! `timestamp` is the legacy name of the server creation instant).

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// Web-Mercator latitude clamp. Positions beyond this cannot be projected.
pub const MAX_LATITUDE: f64 = 85.0511;

/// Maximum longitude magnitude.
pub const MAX_LONGITUDE: f64 = 180.0;

/// Error types for candle values.
#[derive(Debug, thiserror::Error)]
pub enum PositionError {
    /// Latitude outside the projectable range
    #[error("Latitude {0} outside [-{MAX_LATITUDE}, {MAX_LATITUDE}]")]
    InvalidLatitude(f64),

    /// Longitude outside the valid range
    #[error("Longitude {0} outside [-{MAX_LONGITUDE}, {MAX_LONGITUDE}]")]
    InvalidLongitude(f64),
}

/// A (latitude, longitude) pair within Web-Mercator bounds.
///
/// Serialized as `[lat, lon]` to match the backing store's float array column.
/// Deserialization clamps latitude so historical out-of-range seed rows still
/// load; explicit construction via [`Position::new`] is strict.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(try_from = "[f64; 2]", into = "[f64; 2]")]
pub struct Position {
    /// Latitude in degrees, within ±85.0511
    pub lat: f64,
    /// Longitude in degrees, within ±180
    pub lon: f64,
}

impl Position {
    /// Create a position, rejecting out-of-range or non-finite coordinates.
    pub fn new(lat: f64, lon: f64) -> Result<Self, PositionError> {
        if !lat.is_finite() || lat.abs() > MAX_LATITUDE {
            return Err(PositionError::InvalidLatitude(lat));
        }
        if !lon.is_finite() || lon.abs() > MAX_LONGITUDE {
            return Err(PositionError::InvalidLongitude(lon));
        }
        Ok(Self { lat, lon })
    }

    /// Create a position, clamping coordinates into range.
    pub fn clamped(lat: f64, lon: f64) -> Result<Self, PositionError> {
        if !lat.is_finite() {
            return Err(PositionError::InvalidLatitude(lat));
        }
        if !lon.is_finite() {
            return Err(PositionError::InvalidLongitude(lon));
        }
        Ok(Self {
            lat: lat.clamp(-MAX_LATITUDE, MAX_LATITUDE),
            lon: lon.clamp(-MAX_LONGITUDE, MAX_LONGITUDE),
        })
    }
}

impl TryFrom<[f64; 2]> for Position {
    type Error = PositionError;

    fn try_from([lat, lon]: [f64; 2]) -> Result<Self, Self::Error> {
        Self::clamped(lat, lon)
    }
}

impl From<Position> for [f64; 2] {
    fn from(p: Position) -> Self {
        [p.lat, p.lon]
    }
}

/// One placed candle, as returned by the persistence backend.
///
/// Immutable once created; deletable only by its owner. `user_timestamp` is
/// the creator-reported wall-clock instant and stays a raw string because it
/// is untrusted input, parsed leniently at aggregation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct Candle {
    /// Opaque unique identifier, assigned by the persistence layer
    pub id: String,
    /// Map position
    pub position: Position,
    /// Leaf (or legacy main) emotion name; may be absent on malformed rows
    #[serde(default)]
    pub emotion: Option<String>,
    /// Server-assigned creation instant ("timestamp" on the wire)
    #[serde(default, alias = "timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    /// Creator-reported local instant at creation
    #[serde(default)]
    pub user_timestamp: Option<String>,
    /// Anonymous identity of the creator
    #[serde(default)]
    pub user_id: Option<String>,
}

impl Candle {
    /// The emotion name, normalized: `None` when missing or blank.
    pub fn emotion_name(&self) -> Option<&str> {
        self.emotion
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Payload for creating a candle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct NewCandle {
    /// Fully specified leaf emotion
    pub emotion: String,
    /// Confirmed map position
    pub position: Position,
    /// Creator-local RFC 3339 instant
    pub user_timestamp: String,
}

impl NewCandle {
    /// Create a payload stamped with the caller's current local instant.
    pub fn new(emotion: impl Into<String>, position: Position) -> Self {
        Self {
            emotion: emotion.into(),
            position,
            user_timestamp: Local::now().to_rfc3339(),
        }
    }

    /// Override the creator-local instant (tests, replays).
    pub fn with_user_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.user_timestamp = timestamp.into();
        self
    }
}
