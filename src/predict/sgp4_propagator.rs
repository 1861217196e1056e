use chrono::{DateTime, Duration, Utc};
use sgp4::{Constants, Elements};

use crate::predict::error::{PredictError, PropagationError};
use crate::predict::geometry::{elevation_angle, Location, Position};
use crate::predict::propagation::{PassEvent, PositionSource, Propagator};
use crate::predict::sampling::stepped;
use crate::predict::types::SatelliteInfo;

const COARSE_STEP_SECONDS: i64 = 60; // 1 minute for initial scan
const FINE_STEP_SECONDS: i64 = 1; // 1 second for refinement
const HORIZON_ELEVATION: f64 = 0.0;
const SEARCH_HORIZON_HOURS: i64 = 24;

/// SGP4 propagation of a single TLE.
pub struct Sgp4Propagator {
    elements: Elements,
    constants: Constants,
}

impl Sgp4Propagator {
    pub fn from_tle(name: Option<String>, line1: &str, line2: &str) -> Result<Self, PredictError> {
        let label = name.clone().unwrap_or_else(|| "unnamed".to_string());
        let elements = Elements::from_tle(name, line1.as_bytes(), line2.as_bytes()).map_err(|e| {
            PredictError::InvalidTle {
                satellite: label.clone(),
                message: e.to_string(),
            }
        })?;
        let constants = Constants::from_elements(&elements).map_err(|e| PredictError::InvalidTle {
            satellite: label,
            message: e.to_string(),
        })?;
        Ok(Self {
            elements,
            constants,
        })
    }

    pub fn info(&self) -> SatelliteInfo {
        let norad_id = self.elements.norad_id.to_string();
        let name = self
            .elements
            .object_name
            .clone()
            .unwrap_or_else(|| format!("NORAD {}", norad_id));
        SatelliteInfo { name, norad_id }
    }

    pub fn epoch(&self) -> DateTime<Utc> {
        self.elements.datetime.and_utc()
    }

    /// Position in the TEME frame, km.
    pub fn teme_position_km(&self, timestamp: DateTime<Utc>) -> Result<[f64; 3], PropagationError> {
        let minutes = self
            .elements
            .datetime_to_minutes_since_epoch(&timestamp.naive_utc())
            .map_err(|e| PropagationError::out_of_range(e.to_string()))?;
        let prediction = self.constants.propagate(minutes)?;
        if prediction.position.iter().any(|c| !c.is_finite()) {
            return Err(PropagationError::numerical(format!(
                "non-finite position at {}",
                timestamp
            )));
        }
        Ok(prediction.position)
    }

    /// Position rotated into the Earth-fixed frame by Greenwich sidereal time.
    pub fn fixed_position_at(&self, timestamp: DateTime<Utc>) -> Result<Position, PropagationError> {
        let teme = self.teme_position_km(timestamp)?;
        let sidereal =
            sgp4::iau_epoch_to_sidereal_time(sgp4::julian_years_since_j2000(&timestamp.naive_utc()));
        Ok(Position::Fixed(teme_to_ecef_position(teme, sidereal)))
    }

    fn is_up(&self, location: &Location, t: DateTime<Utc>) -> Result<bool, PropagationError> {
        Ok(self.elevation_at(location, t)? >= HORIZON_ELEVATION)
    }

    /// Step backwards from a visible instant to the rise of its pass.
    fn rise_before(&self, location: &Location, visible: DateTime<Utc>) -> Result<DateTime<Utc>, PropagationError> {
        let step = Duration::seconds(COARSE_STEP_SECONDS);
        let floor = visible - Duration::hours(SEARCH_HORIZON_HOURS);
        let mut later = visible;
        let mut cursor = visible - step;
        while cursor >= floor {
            if !self.is_up(location, cursor)? {
                return self.refine_crossing(location, cursor, later, true);
            }
            later = cursor;
            cursor -= step;
        }
        Err(PropagationError::out_of_range(format!(
            "object has been above the horizon for {} hours before {}",
            SEARCH_HORIZON_HOURS, visible
        )))
    }

    /// Step forwards from a visible instant to the set of its pass.
    fn set_after(&self, location: &Location, visible: DateTime<Utc>) -> Result<DateTime<Utc>, PropagationError> {
        let step = Duration::seconds(COARSE_STEP_SECONDS);
        let ceiling = visible + Duration::hours(SEARCH_HORIZON_HOURS);
        let mut earlier = visible;
        for cursor in stepped(visible + step, ceiling, step) {
            if !self.is_up(location, cursor)? {
                return self.refine_crossing(location, earlier, cursor, false);
            }
            earlier = cursor;
        }
        Err(PropagationError::out_of_range(format!(
            "object does not set within {} hours of {}",
            SEARCH_HORIZON_HOURS, visible
        )))
    }

    /// Binary search to find exact horizon crossing time
    fn refine_crossing(
        &self,
        location: &Location,
        before: DateTime<Utc>,
        after: DateTime<Utc>,
        is_aos: bool, // true = rising, false = setting
    ) -> Result<DateTime<Utc>, PropagationError> {
        let mut low = before;
        let mut high = after;

        while (high - low).num_seconds() > FINE_STEP_SECONDS {
            let mid = low + (high - low) / 2;
            let above = self.is_up(location, mid)?;
            if above == is_aos {
                high = mid;
            } else {
                low = mid;
            }
        }

        Ok(high)
    }

    /// Coarse scan for the highest minute, then ternary search around it.
    fn culmination(
        &self,
        location: &Location,
        rise: DateTime<Utc>,
        set: DateTime<Utc>,
    ) -> Result<(DateTime<Utc>, f64), PropagationError> {
        let step = Duration::seconds(COARSE_STEP_SECONDS);
        let mut best = (rise, self.elevation_at(location, rise)?);
        for t in stepped(rise, set, step).chain(std::iter::once(set)) {
            let el = self.elevation_at(location, t)?;
            if el > best.1 {
                best = (t, el);
            }
        }

        let mut low = (best.0 - step).max(rise);
        let mut high = (best.0 + step).min(set);
        while (high - low).num_seconds() > FINE_STEP_SECONDS {
            let third = (high - low) / 3;
            let m1 = low + third;
            let m2 = high - third;
            if self.elevation_at(location, m1)? < self.elevation_at(location, m2)? {
                low = m1;
            } else {
                high = m2;
            }
        }

        let mid = low + (high - low) / 2;
        let el = self.elevation_at(location, mid)?;
        if el > best.1 {
            best = (mid, el);
        }
        Ok(best)
    }
}

impl PositionSource for Sgp4Propagator {
    fn position_at(&self, timestamp: DateTime<Utc>) -> Result<Position, PropagationError> {
        self.teme_position_km(timestamp).map(Position::Inertial)
    }
}

impl Propagator for Sgp4Propagator {
    fn elevation_at(&self, location: &Location, timestamp: DateTime<Utc>) -> Result<f64, PropagationError> {
        self.fixed_position_at(timestamp)
            .map(|position| elevation_angle(&position, location))
    }

    fn next_pass_after(
        &self,
        location: &Location,
        after: DateTime<Utc>,
        min_elevation_deg: f64,
        limit: DateTime<Utc>,
    ) -> Result<Option<PassEvent>, PropagationError> {
        let step = Duration::seconds(COARSE_STEP_SECONDS);
        let mut cursor = after;

        while cursor <= limit {
            let rise = if self.is_up(location, cursor)? {
                self.rise_before(location, cursor)?
            } else {
                let mut found = None;
                let mut previous = cursor;
                for t in stepped(cursor + step, limit + step, step) {
                    if self.is_up(location, t)? {
                        found = Some(self.refine_crossing(location, previous, t, true)?);
                        break;
                    }
                    previous = t;
                }
                match found {
                    Some(rise) => rise,
                    None => return Ok(None),
                }
            };
            if rise > limit {
                return Ok(None);
            }

            let set = self.set_after(location, rise.max(cursor))?;
            let (peak_time, peak_elevation_deg) = self.culmination(location, rise, set)?;

            if peak_elevation_deg >= min_elevation_deg {
                return Ok(Some(PassEvent {
                    rise,
                    set,
                    peak_time: Some(peak_time),
                    peak_elevation_deg: Some(peak_elevation_deg),
                }));
            }
            log::debug!(
                "pass {} - {} culminates at {:.1} deg, below {:.1} deg",
                rise,
                set,
                peak_elevation_deg,
                min_elevation_deg
            );
            cursor = set + Duration::seconds(FINE_STEP_SECONDS);
        }

        Ok(None)
    }
}

pub fn teme_to_ecef_position(pos_teme: [f64; 3], gmst: f64) -> [f64; 3] {
    let cos_gmst = gmst.cos();
    let sin_gmst = gmst.sin();
    [
        pos_teme[0] * cos_gmst + pos_teme[1] * sin_gmst,
        -pos_teme[0] * sin_gmst + pos_teme[1] * cos_gmst,
        pos_teme[2],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predict::pass_finder::{passes_by_event_search, passes_by_sampling};
    use crate::predict::types::TimeWindow;

    const ISS_LINE1: &str = "1 25544U 98067A   20194.88612269 -.00002218  00000-0 -31515-4 0  9992";
    const ISS_LINE2: &str = "2 25544  51.6461 221.2784 0001413  89.1723 280.4612 15.49507896236008";

    fn iss() -> Sgp4Propagator {
        Sgp4Propagator::from_tle(Some("ISS (ZARYA)".into()), ISS_LINE1, ISS_LINE2).unwrap()
    }

    fn station() -> Location {
        Location::new(40.7128, -74.006, 10.0).unwrap()
    }

    fn day_after_epoch(prop: &Sgp4Propagator) -> TimeWindow {
        TimeWindow::starting_at(prop.epoch(), Duration::hours(24)).unwrap()
    }

    #[test]
    fn info_comes_from_elements() {
        let info = iss().info();
        assert_eq!(info.norad_id, "25544");
        assert_eq!(info.name, "ISS (ZARYA)");
    }

    #[test]
    fn malformed_tle_is_rejected() {
        let result = Sgp4Propagator::from_tle(None, "1 garbage", ISS_LINE2);
        assert!(matches!(result, Err(PredictError::InvalidTle { .. })));
    }

    #[test]
    fn low_earth_orbit_radius() {
        let prop = iss();
        let r = prop.teme_position_km(prop.epoch()).unwrap();
        let radius = (r[0] * r[0] + r[1] * r[1] + r[2] * r[2]).sqrt();
        assert!(radius > 6600.0 && radius < 6900.0, "radius {}", radius);
        assert!(prop.position_at(prop.epoch()).unwrap().is_inertial());
    }

    #[test]
    fn sidereal_rotation_preserves_radius() {
        let r = [7000.0, 1000.0, -200.0];
        let rotated = teme_to_ecef_position(r, 1.234);
        let norm = |v: [f64; 3]| (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
        assert!((norm(r) - norm(rotated)).abs() < 1e-9);
        assert_eq!(rotated[2], r[2]);
    }

    #[test]
    fn event_search_passes_are_ordered_and_consistent() {
        let prop = iss();
        let window = day_after_epoch(&prop);
        let passes =
            passes_by_event_search(&prop, &prop.info(), &station(), &window, 10.0).unwrap();
        assert!(!passes.is_empty());
        for pass in &passes {
            assert!(pass.rise <= pass.peak && pass.peak <= pass.set, "{:?}", pass);
            assert!(pass.peak_elevation_deg >= 10.0);
            assert!(pass.rise >= window.start);
        }
        for pair in passes.windows(2) {
            assert!(pair[0].set < pair[1].rise);
        }
    }

    #[test]
    fn event_boundaries_sit_on_the_horizon() {
        let prop = iss();
        let window = day_after_epoch(&prop);
        let event = prop
            .next_pass_after(&station(), window.start, 0.0, window.end)
            .unwrap()
            .unwrap();
        let before_rise = prop
            .elevation_at(&station(), event.rise - Duration::seconds(2))
            .unwrap();
        let at_rise = prop.elevation_at(&station(), event.rise).unwrap();
        assert!(before_rise < 0.0 && at_rise >= 0.0);
        let at_set = prop.elevation_at(&station(), event.set).unwrap();
        assert!(at_set < 0.0);
    }

    #[test]
    fn strategies_agree_within_one_cadence() {
        let prop = iss();
        let window = day_after_epoch(&prop);
        let info = prop.info();
        let by_events = passes_by_event_search(&prop, &info, &station(), &window, 0.0).unwrap();
        let by_sampling = passes_by_sampling(&prop, &info, &station(), &window, 0.0);

        let cadence = Duration::seconds(61);
        for a in by_events.iter().filter(|p| p.peak_elevation_deg >= 5.0 && p.set < window.end) {
            let b = by_sampling
                .iter()
                .find(|b| (b.rise - a.rise).abs() <= cadence)
                .unwrap_or_else(|| panic!("no sampled pass near {:?}", a));
            assert!((b.set - a.set).abs() <= cadence, "{:?} vs {:?}", a, b);
            assert!(b.peak_elevation_deg <= a.peak_elevation_deg + 0.05);
        }
    }
}
