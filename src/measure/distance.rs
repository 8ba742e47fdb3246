//! Great-circle distance and display helpers

use super::GeoPoint;

/// Mean Earth radius used for the haversine formula
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Straight-line (great-circle) distance in kilometers using the haversine formula
pub fn great_circle_distance_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let d_lat = (b.lat() - a.lat()).to_radians();
    let d_lon = (b.lon() - a.lon()).to_radians();
    let lat1 = a.lat().to_radians();
    let lat2 = b.lat().to_radians();

    let s = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    // Rounding can push `s` a hair outside [0, 1] for antipodal points
    let s = s.clamp(0.0, 1.0);
    let c = 2.0 * s.sqrt().atan2((1.0 - s).sqrt());

    EARTH_RADIUS_KM * c
}

/// Format a distance: 0 decimals from 100 km, 1 decimal from 10 km, 2 below
pub fn fmt_km(km: f64) -> String {
    let decimals = if km >= 100.0 {
        0
    } else if km >= 10.0 {
        1
    } else {
        2
    };
    format!("{km:.decimals$} km")
}

/// `lon` shifted by a full turn when that brings it within 180° of `reference`
pub fn lon_near(reference: f64, lon: f64) -> f64 {
    let d = lon - reference;
    if d > 180.0 {
        lon - 360.0
    } else if d < -180.0 {
        lon + 360.0
    } else {
        lon
    }
}

/// Midpoint along the shorter longitude arc, used to anchor the distance popup
pub fn midpoint(a: GeoPoint, b: GeoPoint) -> GeoPoint {
    let b_lon = lon_near(a.lon(), b.lon());
    GeoPoint::new((a.lat() + b.lat()) / 2.0, (a.lon() + b_lon) / 2.0)
}

/// "lat, lon" with five decimals
pub fn fmt_coords(p: GeoPoint) -> String {
    format!("{:.5}, {:.5}", p.lat(), p.lon())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn bengaluru() -> GeoPoint {
        GeoPoint::new(12.9716, 77.5946)
    }

    fn chennai() -> GeoPoint {
        GeoPoint::new(13.0827, 80.2707)
    }

    #[test]
    fn test_distance_to_self_is_zero() {
        for p in [
            bengaluru(),
            GeoPoint::new(90.0, 0.0),
            GeoPoint::new(-33.8688, 151.2093),
            GeoPoint::new(0.0, -180.0),
        ] {
            assert_eq!(great_circle_distance_km(p, p), 0.0);
        }
    }

    #[test]
    fn test_distance_is_symmetric() {
        let pairs = [
            (bengaluru(), chennai()),
            (GeoPoint::new(51.5074, -0.1278), GeoPoint::new(40.7128, -74.0060)),
            (GeoPoint::new(-89.0, 179.0), GeoPoint::new(89.0, -179.0)),
        ];
        for (a, b) in pairs {
            assert_eq!(
                great_circle_distance_km(a, b),
                great_circle_distance_km(b, a)
            );
        }
    }

    #[test]
    fn test_bengaluru_to_chennai() {
        let d = great_circle_distance_km(bengaluru(), chennai());
        assert!((d - 290.0).abs() <= 5.0, "got {d}");
    }

    #[test]
    fn test_distance_grows_with_separation() {
        let origin = GeoPoint::new(0.0, 0.0);
        let mut previous = 0.0;
        for lon in [0.5, 1.0, 10.0, 45.0, 90.0, 179.0] {
            let d = great_circle_distance_km(origin, GeoPoint::new(0.0, lon));
            assert!(d > previous);
            previous = d;
        }
    }

    #[test]
    fn test_quarter_meridian() {
        let d = great_circle_distance_km(GeoPoint::new(0.0, 0.0), GeoPoint::new(90.0, 0.0));
        assert_relative_eq!(d, EARTH_RADIUS_KM * std::f64::consts::FRAC_PI_2, epsilon = 1e-6);
    }

    #[test]
    fn test_antipodal_points() {
        let d = great_circle_distance_km(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 180.0));
        assert_relative_eq!(d, EARTH_RADIUS_KM * std::f64::consts::PI, epsilon = 1e-6);
    }

    #[test]
    fn test_fmt_km_precision_bands() {
        assert_eq!(fmt_km(5.234), "5.23 km");
        assert_eq!(fmt_km(42.1), "42.1 km");
        assert_eq!(fmt_km(123.9), "124 km");
        assert_eq!(fmt_km(0.0), "0.00 km");
        assert_eq!(fmt_km(10.0), "10.0 km");
        assert_eq!(fmt_km(100.0), "100 km");
    }

    #[test]
    fn test_midpoint_and_coords() {
        let m = midpoint(bengaluru(), chennai());
        assert_relative_eq!(m.lat(), (12.9716 + 13.0827) / 2.0);
        assert_relative_eq!(m.lon(), (77.5946 + 80.2707) / 2.0);
        assert_eq!(fmt_coords(bengaluru()), "12.97160, 77.59460");
    }

    #[test]
    fn test_midpoint_across_antimeridian() {
        let east = GeoPoint::new(0.0, 179.0);
        let west = GeoPoint::from_position(walkers::lat_lon(0.0, 181.0));
        assert_relative_eq!(west.lon(), -179.0);

        for (a, b) in [(east, west), (west, east)] {
            let m = midpoint(a, b);
            assert_relative_eq!(m.lon().abs(), 180.0);
            assert_relative_eq!(m.lat(), 0.0);
        }
        assert_relative_eq!(great_circle_distance_km(east, west), 222.39, epsilon = 0.01);
    }

    #[test]
    fn test_lon_near() {
        assert_eq!(lon_near(179.0, -179.0), 181.0);
        assert_eq!(lon_near(-179.0, 179.0), -181.0);
        assert_eq!(lon_near(10.0, 20.0), 20.0);
        assert_eq!(lon_near(-90.0, 90.0), 90.0);
    }
}
