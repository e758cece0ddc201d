//! Great-circle distance between track points

use crate::models::TrackPoint;

/// Mean Earth radius in meters
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Haversine distance between two points, in meters.
///
/// Treats the Earth as a sphere of radius 6371 km. Against the WGS84
/// ellipsoid this is off by up to about 0.5%, which is fine for recreational
/// tracks but not for surveying.
pub fn distance(p1: &TrackPoint, p2: &TrackPoint) -> f64 {
    haversine(p1.latitude, p1.longitude, p2.latitude, p2.longitude)
}

/// Haversine distance between two (lat, lon) pairs in degrees, in meters
pub fn haversine(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let d_lat = lat2_rad - lat1_rad;
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + lat1_rad.cos() * lat2_rad.cos() * (d_lon / 2.0).sin().powi(2);
    // clamp: rounding can push `a` just above 1 for antipodal points
    let c = 2.0 * a.sqrt().min(1.0).asin();

    EARTH_RADIUS_METERS * c
}
