use chrono::{DateTime, Utc};

use crate::predict::error::PropagationError;
use crate::predict::geometry::Position;
use crate::predict::propagation::PositionSource;

pub const SUN_DISTANCE_KM: f64 = 149_600_000.0;
const DAYS_PER_YEAR: f64 = 365.25;
const EPOCH_2000_UNIX: i64 = 946_684_800; // 2000-01-01T00:00:00Z
const SECONDS_PER_DAY: i64 = 86_400;

/// Low-fidelity Sun: a circular orbit in the equatorial plane, advancing once
/// per whole day since 2000-01-01T00:00Z. Good enough to tell day side from
/// night side, nothing more.
#[derive(Debug, Clone, Copy, Default)]
pub struct CircularSun;

impl CircularSun {
    pub fn position_km(&self, timestamp: DateTime<Utc>) -> [f64; 3] {
        let days = (timestamp.timestamp() - EPOCH_2000_UNIX).div_euclid(SECONDS_PER_DAY) as f64;
        let mean_anomaly = 2.0 * std::f64::consts::PI * days / DAYS_PER_YEAR;
        [
            SUN_DISTANCE_KM * mean_anomaly.cos(),
            SUN_DISTANCE_KM * mean_anomaly.sin(),
            0.0,
        ]
    }
}

impl PositionSource for CircularSun {
    fn position_at(&self, timestamp: DateTime<Utc>) -> Result<Position, PropagationError> {
        Ok(Position::Inertial(self.position_km(timestamp)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn epoch_places_sun_on_x_axis() {
        let epoch = Utc.with_ymd_and_hms(2000, 1, 1, 18, 0, 0).unwrap();
        let p = CircularSun.position_km(epoch);
        assert_eq!(p, [SUN_DISTANCE_KM, 0.0, 0.0]);
    }

    #[test]
    fn quarter_year_rotates_ninety_degrees() {
        let epoch = Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap();
        let p = CircularSun.position_km(epoch + Duration::days(365) / 4 + Duration::hours(7));
        let angle = p[1].atan2(p[0]).to_degrees();
        // 91 whole days
        assert!((angle - 91.0 * 360.0 / 365.25).abs() < 1e-9);
        let r = (p[0] * p[0] + p[1] * p[1]).sqrt();
        assert!((r - SUN_DISTANCE_KM).abs() < 1e-3);
    }

    #[test]
    fn days_before_epoch_round_down() {
        let before = Utc.with_ymd_and_hms(1999, 12, 31, 23, 0, 0).unwrap();
        let p = CircularSun.position_km(before);
        let angle = p[1].atan2(p[0]).to_degrees();
        assert!((angle + 360.0 / 365.25).abs() < 1e-9);
    }

    #[test]
    fn position_is_inertial() {
        let p = CircularSun.position_at(Utc::now()).unwrap();
        assert!(p.is_inertial());
    }
}
