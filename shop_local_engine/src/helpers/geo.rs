//! Great-circle distance for the nearby-shops query.
//!
//! SQLite has no spherical-distance SQL function, so candidate shops are fetched and filtered here instead of in the
//! query predicate.

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance between two WGS84 coordinates, in kilometres.
pub fn haversine_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();
    EARTH_RADIUS_KM * c
}

/// Whether `(lat, lng)` lies within `radius_km` of the origin point.
pub fn within_radius(origin_lat: f64, origin_lng: f64, lat: f64, lng: f64, radius_km: f64) -> bool {
    haversine_km(origin_lat, origin_lng, lat, lng) <= radius_km
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn zero_distance() {
        assert!(haversine_km(19.076, 72.8777, 19.076, 72.8777) < 1e-9);
    }

    #[test]
    fn mumbai_to_pune() {
        // ~120 km as the crow flies
        let d = haversine_km(19.076, 72.8777, 18.5204, 73.8567);
        assert!((d - 120.0).abs() < 5.0, "distance was {d}");
    }

    #[test]
    fn radius_check() {
        // Two points ~1.1 km apart in Mumbai
        assert!(within_radius(19.076, 72.8777, 19.086, 72.8777, 2.0));
        assert!(!within_radius(19.076, 72.8777, 19.086, 72.8777, 1.0));
    }
}
