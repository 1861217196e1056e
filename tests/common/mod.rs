//! Synthetic propagators with closed-form elevation curves.

use chrono::{DateTime, Duration, TimeZone, Utc};
use satpass::predict::{
    elevation_angle, Location, PassEvent, Position, PositionSource, PropagationError, Propagator,
};
use std::f64::consts::PI;

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 20, 6, 0, 0).unwrap()
}

pub fn at_seconds(s: f64) -> DateTime<Utc> {
    t0() + Duration::milliseconds((s * 1000.0).round() as i64)
}

pub fn seconds_since_t0(t: DateTime<Utc>) -> f64 {
    (t - t0()).num_milliseconds() as f64 / 1000.0
}

/// Circular equatorial orbit in a frame that does not rotate under an
/// observer at latitude 0, longitude 0. Culminates at zenith once per period.
pub struct EquatorialOrbit {
    pub radius_km: f64,
    pub period_s: f64,
    /// Seconds after t0 of the first culmination.
    pub first_culmination_s: f64,
    /// Whether next_pass_after reports the culmination itself.
    pub reports_peak: bool,
}

impl EquatorialOrbit {
    pub fn new(first_culmination_s: f64) -> Self {
        Self {
            radius_km: 6878.137,
            period_s: 95.0 * 60.0,
            first_culmination_s,
            reports_peak: true,
        }
    }

    pub fn observer() -> Location {
        Location::new(0.0, 0.0, 0.0).unwrap()
    }

    fn angular_rate(&self) -> f64 {
        2.0 * PI / self.period_s
    }

    /// Half-width in seconds of the above-horizon arc.
    pub fn half_pass_s(&self) -> f64 {
        let a = Self::observer().position_ecef_km()[0];
        (a / self.radius_km).acos() / self.angular_rate()
    }

    pub fn culmination_s(&self, k: i64) -> f64 {
        self.first_culmination_s + k as f64 * self.period_s
    }
}

impl PositionSource for EquatorialOrbit {
    fn position_at(&self, t: DateTime<Utc>) -> Result<Position, PropagationError> {
        let phase = (seconds_since_t0(t) - self.first_culmination_s) * self.angular_rate();
        Ok(Position::Inertial([
            self.radius_km * phase.cos(),
            self.radius_km * phase.sin(),
            0.0,
        ]))
    }
}

impl Propagator for EquatorialOrbit {
    fn next_pass_after(
        &self,
        _location: &Location,
        after: DateTime<Utc>,
        _min_elevation_deg: f64,
        limit: DateTime<Utc>,
    ) -> Result<Option<PassEvent>, PropagationError> {
        let half = self.half_pass_s();
        let after_s = seconds_since_t0(after);
        let k = ((after_s - half - self.first_culmination_s) / self.period_s).ceil() as i64;
        let peak_s = self.culmination_s(k);
        let rise = at_seconds(peak_s - half);
        if rise > limit {
            return Ok(None);
        }
        let peak = at_seconds(peak_s);
        Ok(Some(PassEvent {
            rise,
            set: at_seconds(peak_s + half),
            peak_time: self.reports_peak.then_some(peak),
            peak_elevation_deg: self
                .reports_peak
                .then(|| elevation_angle(&self.position_at(peak).unwrap(), &Self::observer())),
        }))
    }
}

/// Wraps a propagator whose event search always fails with `error`.
pub struct BrokenEventSearch<P> {
    pub inner: P,
    pub error: PropagationError,
}

impl<P: PositionSource> PositionSource for BrokenEventSearch<P> {
    fn position_at(&self, t: DateTime<Utc>) -> Result<Position, PropagationError> {
        self.inner.position_at(t)
    }
}

impl<P: Propagator> Propagator for BrokenEventSearch<P> {
    fn next_pass_after(
        &self,
        _location: &Location,
        _after: DateTime<Utc>,
        _min_elevation_deg: f64,
        _limit: DateTime<Utc>,
    ) -> Result<Option<PassEvent>, PropagationError> {
        Err(self.error.clone())
    }
}
