use chrono::{DateTime, Duration, Utc};

use crate::predict::error::PropagationError;
use crate::predict::geometry::Location;
use crate::predict::propagation::Propagator;
use crate::predict::sampling::{even_samples, stepped};
use crate::predict::types::{PassRecord, SatelliteInfo, TimeWindow};

const SAMPLE_STEP_SECONDS: i64 = 60; // threshold sampling cadence
const PEAK_SAMPLES: usize = 50;
const RESUME_AFTER_SET_SECONDS: i64 = 1;

/// Find all passes of one object over `window`.
///
/// The propagator's own event search is tried first. If it fails for any
/// reason the whole window is scanned again by threshold sampling and only
/// that result is returned.
pub fn predict_passes<P: Propagator + ?Sized>(
    propagator: &P,
    satellite: &SatelliteInfo,
    location: &Location,
    window: &TimeWindow,
    min_elevation_deg: f64,
) -> Vec<PassRecord> {
    match passes_by_event_search(propagator, satellite, location, window, min_elevation_deg) {
        Ok(passes) => passes,
        Err(e) => {
            if e.is_validity_limit() {
                log::warn!(
                    "{}: event search hit the propagation limit ({}), falling back to sampling",
                    satellite.name,
                    e.message
                );
            } else {
                log::warn!(
                    "{}: event search failed ({}), falling back to sampling",
                    satellite.name,
                    e
                );
            }
            passes_by_sampling(propagator, satellite, location, window, min_elevation_deg)
        }
    }
}

/// Walk the window pass by pass using [`Propagator::next_pass_after`].
///
/// Passes already in progress at `window.start` are skipped, not truncated.
pub fn passes_by_event_search<P: Propagator + ?Sized>(
    propagator: &P,
    satellite: &SatelliteInfo,
    location: &Location,
    window: &TimeWindow,
    min_elevation_deg: f64,
) -> Result<Vec<PassRecord>, PropagationError> {
    let mut passes = Vec::new();
    let mut cursor = window.start;
    let resume = Duration::seconds(RESUME_AFTER_SET_SECONDS);

    while cursor < window.end {
        let event = match propagator.next_pass_after(location, cursor, min_elevation_deg, window.end)? {
            Some(event) => event,
            None => break,
        };

        if event.rise > window.end {
            break;
        }
        if event.set < event.rise {
            return Err(PropagationError::numerical(format!(
                "pass sets at {} before it rises at {}",
                event.set, event.rise
            )));
        }

        let next_cursor = event.set.max(cursor) + resume;

        if event.rise < window.start {
            cursor = next_cursor;
            continue;
        }

        let (peak, peak_elevation_deg) = match (event.peak_time, event.peak_elevation_deg) {
            (Some(t), Some(el)) => (t.clamp(event.rise, event.set), el),
            _ => refine_peak(propagator, location, event.rise, event.set).ok_or_else(|| {
                PropagationError::numerical(format!(
                    "no position could be resolved between {} and {}",
                    event.rise, event.set
                ))
            })?,
        };

        if peak_elevation_deg < min_elevation_deg {
            log::debug!(
                "{}: pass rising at {} peaks at {:.3}°, below {:.3}°",
                satellite.name,
                event.rise,
                peak_elevation_deg,
                min_elevation_deg
            );
        } else {
            passes.push(record(satellite, event.rise, peak, event.set, peak_elevation_deg));
        }
        cursor = next_cursor;
    }

    Ok(passes)
}

/// Scan `[window.start, window.end]` once a minute and cut passes where the
/// elevation crosses `min_elevation_deg`.
///
/// Samples the propagator cannot resolve are skipped and leave the in-pass
/// state untouched.
pub fn passes_by_sampling<P: Propagator + ?Sized>(
    propagator: &P,
    satellite: &SatelliteInfo,
    location: &Location,
    window: &TimeWindow,
    min_elevation_deg: f64,
) -> Vec<PassRecord> {
    let step = Duration::seconds(SAMPLE_STEP_SECONDS);
    let mut passes = Vec::new();
    let mut open: Option<OpenPass> = None;

    for t in stepped(window.start, window.end, step) {
        let elevation = match propagator.elevation_at(location, t) {
            Ok(el) => el,
            Err(e) => {
                log::debug!("{}: skipping sample at {}: {}", satellite.name, t, e);
                continue;
            }
        };

        if elevation >= min_elevation_deg {
            match open.as_mut() {
                Some(pass) => pass.observe(t, elevation),
                None => open = Some(OpenPass::new(t, elevation)),
            }
        } else if let Some(pass) = open.take() {
            passes.push(pass.close(satellite, t - step));
        }
    }

    if let Some(pass) = open {
        passes.push(pass.close(satellite, window.end));
    }

    passes
}

/// Highest of 50 evenly spaced elevations over `[rise, set]`; the first
/// sample wins ties. `None` if no sample could be resolved.
pub fn refine_peak<P: Propagator + ?Sized>(
    propagator: &P,
    location: &Location,
    rise: DateTime<Utc>,
    set: DateTime<Utc>,
) -> Option<(DateTime<Utc>, f64)> {
    let mut best: Option<(DateTime<Utc>, f64)> = None;
    for t in even_samples(rise, set, PEAK_SAMPLES).iter() {
        let Ok(elevation) = propagator.elevation_at(location, t) else {
            continue;
        };
        if best.map_or(true, |(_, max)| elevation > max) {
            best = Some((t, elevation));
        }
    }
    best
}

struct OpenPass {
    rise: DateTime<Utc>,
    peak: DateTime<Utc>,
    peak_elevation_deg: f64,
}

impl OpenPass {
    fn new(t: DateTime<Utc>, elevation: f64) -> Self {
        Self {
            rise: t,
            peak: t,
            peak_elevation_deg: elevation,
        }
    }

    fn observe(&mut self, t: DateTime<Utc>, elevation: f64) {
        if elevation > self.peak_elevation_deg {
            self.peak = t;
            self.peak_elevation_deg = elevation;
        }
    }

    fn close(self, satellite: &SatelliteInfo, set: DateTime<Utc>) -> PassRecord {
        record(satellite, self.rise, self.peak, set.max(self.peak), self.peak_elevation_deg)
    }
}

fn record(
    satellite: &SatelliteInfo,
    rise: DateTime<Utc>,
    peak: DateTime<Utc>,
    set: DateTime<Utc>,
    peak_elevation_deg: f64,
) -> PassRecord {
    PassRecord {
        satellite: satellite.name.clone(),
        norad_id: satellite.norad_id.clone(),
        rise,
        peak,
        set,
        peak_elevation_deg,
        eclipsed: None,
    }
}
