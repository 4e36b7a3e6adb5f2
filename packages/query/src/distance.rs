//! Great-circle distance on the WGS84 ellipsoid.

use er_congestion_hospital_models::{Coordinate, round2};
use geo::{Distance, Geodesic, Point};

/// Geodesic distance between two points in kilometres, rounded to 2
/// decimals.
#[must_use]
pub fn distance_km(from: Coordinate, to: Coordinate) -> f64 {
    let from = Point::new(from.longitude, from.latitude);
    let to = Point::new(to.longitude, to.latitude);
    round2(Geodesic.distance(from, to) / 1_000.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon).unwrap()
    }

    #[test]
    fn identical_points_are_zero() {
        let city_hall = coord(37.5665, 126.978);
        assert!(distance_km(city_hall, city_hall).abs() < f64::EPSILON);
    }

    #[test]
    fn seoul_to_busan_is_about_325_km() {
        let seoul = coord(37.5665, 126.978);
        let busan = coord(35.1796, 129.0756);
        let km = distance_km(seoul, busan);
        assert!((320.0..330.0).contains(&km), "{km}");
    }

    #[test]
    fn is_symmetric_and_rounded() {
        let a = coord(37.5665, 126.978);
        let b = coord(37.5796, 126.999);
        let ab = distance_km(a, b);
        assert!((ab - distance_km(b, a)).abs() < f64::EPSILON);
        assert!((ab * 100.0 - (ab * 100.0).round()).abs() < 1e-6);
    }
}
