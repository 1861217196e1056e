use chrono::{DateTime, Utc};

use crate::predict::error::PropagationError;
use crate::predict::geometry::{elevation_angle, Location, Position};

/// Anything that can place an object in space at a given instant.
///
/// Satellites and the illuminating body are both position sources, so the
/// samplers and classifiers that consume them are written once.
pub trait PositionSource {
    fn position_at(&self, timestamp: DateTime<Utc>) -> Result<Position, PropagationError>;
}

impl<F> PositionSource for F
where
    F: Fn(DateTime<Utc>) -> Result<Position, PropagationError>,
{
    fn position_at(&self, timestamp: DateTime<Utc>) -> Result<Position, PropagationError> {
        self(timestamp)
    }
}

/// A pass boundary as reported by the propagator's own event search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassEvent {
    pub rise: DateTime<Utc>,
    pub set: DateTime<Utc>,
    pub peak_time: Option<DateTime<Utc>>,
    pub peak_elevation_deg: Option<f64>,
}

/// Propagator capabilities consumed by the pass detector.
pub trait Propagator: PositionSource {
    /// Elevation of the object seen from `location`. The default goes through
    /// [`PositionSource::position_at`] and the frame-matching geometry.
    fn elevation_at(&self, location: &Location, timestamp: DateTime<Utc>) -> Result<f64, PropagationError> {
        self.position_at(timestamp)
            .map(|position| elevation_angle(&position, location))
    }

    /// The next pass after `after` whose culmination exceeds `min_elevation_deg`.
    ///
    /// `Ok(None)` means no such pass rises before `limit`. If `after` falls
    /// inside a pass, that pass is returned with its true rise time.
    fn next_pass_after(
        &self,
        location: &Location,
        after: DateTime<Utc>,
        min_elevation_deg: f64,
        limit: DateTime<Utc>,
    ) -> Result<Option<PassEvent>, PropagationError>;
}
