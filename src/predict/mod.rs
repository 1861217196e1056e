mod eclipse;
mod error;
mod geometry;
mod pass_finder;
mod propagation;
mod sampling;
mod sgp4_propagator;
mod sun;
mod types;

pub use eclipse::{classify_pass_eclipse, classify_passes};
pub use error::{GeometryError, LocationError, PredictError, PropagationError, PropagationErrorKind};
pub use geometry::{
    elevation_angle, elevation_ellipsoidal, elevation_spherical, is_eclipsed, is_eclipsed_at,
    observer_fixed_position, Location, Position, EARTH_RADIUS_KM,
};
pub use pass_finder::{passes_by_event_search, passes_by_sampling, predict_passes, refine_peak};
pub use propagation::{PassEvent, PositionSource, Propagator};
pub use sampling::{even_samples, samples_per_cadence, EvenSamples, MIN_SAMPLES};
pub use sgp4_propagator::Sgp4Propagator;
pub use sun::CircularSun;
pub use types::{PassRecord, SatelliteInfo, TimeWindow};
