//! Geodesy engine.
//!
//! Pure great-circle math used by the parking navigator: haversine distance,
//! initial bearing and the relative bearing that rotates the on-screen arrow.
//! All functions are total over valid coordinates (lat in [-90, 90], lng in
//! [-180, 180]); callers guard the ranges.

pub mod tracker;

pub use tracker::{
    FusedReading, HeadingSample, HeadingSource, PositionFix, PositionSource, PositionTracker,
};

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// A geographic coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Great-circle (haversine) distance between two points, in meters.
#[inline]
pub fn distance_meters(a: GeoPoint, b: GeoPoint) -> f64 {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let delta_phi = (b.lat - a.lat).to_radians();
    let delta_lambda = (b.lng - a.lng).to_radians();

    let h = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_METERS * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Initial bearing from `a` to `b` in degrees clockwise from north,
/// normalized to `[0, 360)`.
#[inline]
pub fn initial_bearing_degrees(a: GeoPoint, b: GeoPoint) -> f64 {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let delta_lambda = (b.lng - a.lng).to_radians();

    let y = delta_lambda.sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * delta_lambda.cos();
    y.atan2(x).to_degrees().rem_euclid(360.0)
}

/// Rotation for a directional indicator so it points at the target
/// regardless of which way the device faces: `(bearing - heading) mod 360`.
#[inline]
pub fn relative_bearing_degrees(bearing: f64, heading: f64) -> f64 {
    (bearing - heading).rem_euclid(360.0)
}

/// Human-readable distance: meters below 1 km, otherwise kilometers with one
/// decimal.
pub fn format_distance(meters: f64) -> String {
    if meters > 1000.0 {
        format!("{:.1}km", meters / 1000.0)
    } else {
        format!("{}m", meters.round() as i64)
    }
}
