use chrono::Duration;

use crate::predict::geometry::{is_eclipsed_at, EARTH_RADIUS_KM};
use crate::predict::propagation::PositionSource;
use crate::predict::sampling::samples_per_cadence;
use crate::predict::types::PassRecord;

const SAMPLE_CADENCE_SECONDS: i64 = 60;

/// Whether the object is in Earth's shadow at any sampled instant of the pass.
///
/// One sample per minute of the pass, at least five. Samples where either
/// source fails, or where the two positions are not both inertial, are
/// skipped. Returns `false` when nothing could be sampled.
pub fn classify_pass_eclipse<O, I>(pass: &PassRecord, object: &O, illuminator: &I) -> bool
where
    O: PositionSource + ?Sized,
    I: PositionSource + ?Sized,
{
    let schedule = samples_per_cadence(pass.rise, pass.set, Duration::seconds(SAMPLE_CADENCE_SECONDS));
    for t in schedule.iter() {
        let positions = object
            .position_at(t)
            .and_then(|obj| illuminator.position_at(t).map(|sun| (obj, sun)));
        let (obj, sun) = match positions {
            Ok(p) => p,
            Err(e) => {
                log::debug!("{}: eclipse sample at {} skipped: {}", pass.satellite, t, e);
                continue;
            }
        };
        match is_eclipsed_at(&obj, &sun, EARTH_RADIUS_KM) {
            Ok(true) => return true,
            Ok(false) => {}
            Err(e) => log::debug!("{}: eclipse sample at {} skipped: {}", pass.satellite, t, e),
        }
    }
    false
}

/// Classify every pass in place, setting its `eclipsed` flag.
pub fn classify_passes<O, I>(passes: &mut [PassRecord], object: &O, illuminator: &I)
where
    O: PositionSource + ?Sized,
    I: PositionSource + ?Sized,
{
    for pass in passes.iter_mut() {
        pass.eclipsed = Some(classify_pass_eclipse(pass, object, illuminator));
    }
}
