use geo::{Distance, Geodesic, Point};
use std::f64::consts::PI;

/// Geodesic distance in meters on the WGS84 ellipsoid between two (lat, lon) pairs.
pub fn geodesic_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    Geodesic.distance(Point::new(lon1, lat1), Point::new(lon2, lat2))
}

/// Heading in radians of the segment from the first to the second coordinate,
/// counter-clockwise from east.
///
/// Longitude is scaled by the cosine of the mean latitude so that headings match
/// what a walker sees on the ground inside a neighbourhood sized area.
pub fn heading(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let mean_lat = ((lat1 + lat2) / 2.0).to_radians();
    let dx = (lon2 - lon1) * mean_lat.cos();
    let dy = lat2 - lat1;
    dy.atan2(dx)
}

/// Signed change of heading wrapped into (-pi, pi].
pub fn normalize_angle(angle: f64) -> f64 {
    let mut wrapped = angle % (2.0 * PI);
    if wrapped > PI {
        wrapped -= 2.0 * PI;
    } else if wrapped <= -PI {
        wrapped += 2.0 * PI;
    }
    wrapped
}

/// Magnitude of the turn between an incoming and an outgoing heading.
pub fn turning_magnitude(heading_in: f64, heading_out: f64) -> f64 {
    normalize_angle(heading_out - heading_in).abs()
}

pub fn is_valid_coordinate(lat: f64, lon: f64) -> bool {
    lat.is_finite() && lon.is_finite() && (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon)
}
