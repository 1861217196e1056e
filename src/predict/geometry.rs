use serde::{Deserialize, Serialize};

use crate::predict::error::{GeometryError, LocationError};

// WGS-84
pub const WGS84_A_KM: f64 = 6378.137;
pub const WGS84_E2: f64 = 0.00669437999014;

/// Mean Earth radius used by the shadow test.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Margin added to the shadow half-angle in the coarse cone test.
const SHADOW_CONE_MARGIN_RAD: f64 = 0.01;

/// Geodetic observer location.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub altitude_m: f64,
}

impl Default for Location {
    fn default() -> Self {
        Self {
            latitude_deg: 0.0,
            longitude_deg: 0.0,
            altitude_m: 0.0,
        }
    }
}

impl Location {
    pub fn new(latitude_deg: f64, longitude_deg: f64, altitude_m: f64) -> Result<Self, LocationError> {
        if !latitude_deg.is_finite() || !(-90.0..=90.0).contains(&latitude_deg) {
            return Err(LocationError::Latitude(latitude_deg));
        }
        if !longitude_deg.is_finite() {
            return Err(LocationError::Longitude(longitude_deg));
        }
        if !altitude_m.is_finite() || altitude_m < -500.0 {
            return Err(LocationError::Altitude(altitude_m));
        }
        let longitude_deg = if (-180.0..=180.0).contains(&longitude_deg) {
            longitude_deg
        } else {
            (longitude_deg + 180.0).rem_euclid(360.0) - 180.0
        };
        Ok(Self {
            latitude_deg,
            longitude_deg,
            altitude_m,
        })
    }

    /// Parse `"lat, lon"` as found in the station configuration.
    pub fn from_coordinates(coordinates: &str, altitude_m: Option<f64>) -> Option<Self> {
        let parts: Vec<_> = coordinates.split(',').map(|s| s.trim()).collect();
        if parts.len() < 2 {
            return None;
        }
        let lat = parts[0].parse().ok()?;
        let lon = parts[1].parse().ok()?;
        Self::new(lat, lon, altitude_m.unwrap_or(0.0)).ok()
    }

    pub fn lat_rad(&self) -> f64 {
        self.latitude_deg.to_radians()
    }

    pub fn lon_rad(&self) -> f64 {
        self.longitude_deg.to_radians()
    }

    /// Earth-fixed Cartesian position on the oblate ellipsoid.
    pub fn position_ecef_km(&self) -> [f64; 3] {
        let lat = self.lat_rad();
        let lon = self.lon_rad();
        let sin_lat = lat.sin();
        let cos_lat = lat.cos();
        let sin_lon = lon.sin();
        let cos_lon = lon.cos();
        let n = WGS84_A_KM / (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt();
        let alt_km = self.altitude_m / 1000.0;
        let x = (n + alt_km) * cos_lat * cos_lon;
        let y = (n + alt_km) * cos_lat * sin_lon;
        let z = (n * (1.0 - WGS84_E2) + alt_km) * sin_lat;
        [x, y, z]
    }
}

/// A position in kilometres, tagged with the frame it is expressed in.
///
/// Inertial positions are Earth-centred and non-rotating; fixed positions
/// rotate with the Earth. No rotation between the two is modelled here, so
/// each variant is routed to its own elevation formula.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Position {
    Inertial([f64; 3]),
    Fixed([f64; 3]),
}

impl Position {
    pub fn km(&self) -> [f64; 3] {
        match self {
            Position::Inertial(v) | Position::Fixed(v) => *v,
        }
    }

    pub fn is_inertial(&self) -> bool {
        matches!(self, Position::Inertial(_))
    }
}

pub fn observer_fixed_position(location: &Location) -> [f64; 3] {
    location.position_ecef_km()
}

/// Elevation of `position` above the observer's horizon, in degrees.
///
/// Degenerate geometry falls back to 90° when the object coincides with the
/// observer and to 0° when the observer vector vanishes.
pub fn elevation_angle(position: &Position, location: &Location) -> f64 {
    let result = match position {
        Position::Inertial(r) => elevation_spherical(*r, location),
        Position::Fixed(r) => elevation_ellipsoidal(*r, location),
    };
    match result {
        Ok(el) => el,
        Err(GeometryError::ZeroLineOfSight) => 90.0,
        Err(_) => 0.0,
    }
}

/// Spherical-normal shortcut: local vertical is the observer position normalised.
pub fn elevation_spherical(object_km: [f64; 3], location: &Location) -> Result<f64, GeometryError> {
    let obs = observer_fixed_position(location);
    let dr = sub(object_km, obs);
    let distance = norm(dr);
    if distance == 0.0 {
        return Err(GeometryError::ZeroLineOfSight);
    }
    let obs_mag = norm(obs);
    if obs_mag == 0.0 {
        return Err(GeometryError::ZeroObserverVector);
    }
    let up = scale(obs, 1.0 / obs_mag);
    Ok(clamped_asin_deg(dot(dr, up) / distance))
}

/// Ellipsoid-consistent variant: local vertical is the geodetic normal.
pub fn elevation_ellipsoidal(object_km: [f64; 3], location: &Location) -> Result<f64, GeometryError> {
    let obs = observer_fixed_position(location);
    let dr = sub(object_km, obs);
    let distance = norm(dr);
    if distance == 0.0 {
        return Err(GeometryError::ZeroLineOfSight);
    }
    if norm(obs) == 0.0 {
        return Err(GeometryError::ZeroObserverVector);
    }
    let (_, _, up) = ecef_to_enu(dr, location.lat_rad(), location.lon_rad());
    Ok(clamped_asin_deg(up / distance))
}

/// Rotate an Earth-fixed offset into the observer's east/north/up axes.
pub fn ecef_to_enu(dr: [f64; 3], lat_rad: f64, lon_rad: f64) -> (f64, f64, f64) {
    let sin_lat = lat_rad.sin();
    let cos_lat = lat_rad.cos();
    let sin_lon = lon_rad.sin();
    let cos_lon = lon_rad.cos();

    let east = -sin_lon * dr[0] + cos_lon * dr[1];
    let north = -sin_lat * cos_lon * dr[0] - sin_lat * sin_lon * dr[1] + cos_lat * dr[2];
    let up = cos_lat * cos_lon * dr[0] + cos_lat * sin_lon * dr[1] + sin_lat * dr[2];
    (east, north, up)
}

/// Umbra test for an object and the illuminator, both Earth-centred inertial.
///
/// Two first-order approximations of the shadow cone are applied in turn: a
/// coarse angular test with a fixed margin, then a projection onto the
/// Earth-illuminator axis with a linearly tapered shadow radius. They do not
/// fully agree near the terminator.
pub fn is_eclipsed(object_km: [f64; 3], illuminator_km: [f64; 3], earth_radius_km: f64) -> bool {
    let sat_distance = norm(object_km);
    if sat_distance < earth_radius_km {
        return true;
    }

    let sun_distance = norm(illuminator_km);
    let sat_unit = scale(object_km, 1.0 / sat_distance);
    let sun_unit = scale(illuminator_km, 1.0 / sun_distance);

    let cos_sep = dot(sat_unit, sun_unit);
    if cos_sep >= 0.0 {
        return false;
    }

    // Angle from the anti-illuminator direction.
    let angle = (-cos_sep).clamp(-1.0, 1.0).acos();
    let shadow_half_angle = (earth_radius_km / sun_distance).clamp(-1.0, 1.0).asin();
    if angle < shadow_half_angle + SHADOW_CONE_MARGIN_RAD {
        return true;
    }

    let projection_length = cos_sep * sat_distance;
    let projection_distance = projection_length.abs();
    if projection_length < 0.0 && projection_distance > earth_radius_km {
        let projection = scale(sun_unit, projection_length);
        let perp_distance = norm(sub(object_km, projection));
        let shadow_radius = earth_radius_km * (1.0 - projection_distance / sun_distance);
        if perp_distance < shadow_radius {
            return true;
        }
    }

    false
}

/// Frame-checked wrapper around [`is_eclipsed`].
pub fn is_eclipsed_at(
    object: &Position,
    illuminator: &Position,
    earth_radius_km: f64,
) -> Result<bool, GeometryError> {
    match (object, illuminator) {
        (Position::Inertial(obj), Position::Inertial(sun)) => {
            Ok(is_eclipsed(*obj, *sun, earth_radius_km))
        }
        _ => Err(GeometryError::FrameMismatch),
    }
}

fn clamped_asin_deg(sin_el: f64) -> f64 {
    sin_el.clamp(-1.0, 1.0).asin().to_degrees()
}

fn sub(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn scale(a: [f64; 3], k: f64) -> [f64; 3] {
    [a[0] * k, a[1] * k, a[2] * k]
}

fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn norm(a: [f64; 3]) -> f64 {
    dot(a, a).sqrt()
}
