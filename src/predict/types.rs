use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// Identity of the object being predicted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SatelliteInfo {
    pub name: String,
    pub norad_id: String,
}

impl SatelliteInfo {
    pub fn new(name: impl Into<String>, norad_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            norad_id: norad_id.into(),
        }
    }
}

/// Half-open detection window `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// `None` when `start + duration` is not representable.
    pub fn starting_at(start: DateTime<Utc>, duration: Duration) -> Option<Self> {
        start
            .checked_add_signed(duration)
            .map(|end| Self { start, end })
    }
}

/// A predicted pass over the observer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PassRecord {
    pub satellite: String,
    pub norad_id: String,
    pub rise: DateTime<Utc>,
    pub peak: DateTime<Utc>,
    pub set: DateTime<Utc>,
    pub peak_elevation_deg: f64,
    /// `None` until the eclipse classifier has run.
    pub eclipsed: Option<bool>,
}
