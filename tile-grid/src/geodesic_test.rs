//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use crate::geodesic::{direct_projection, distance, initial_bearing, inverse, GeodesicError};
use crate::grid::GeoPoint;

const PERTH: (f64, f64) = (-32.2138204, 115.0387413);
const ADELAIDE: (f64, f64) = (-35.0913820, 138.0738741);

#[test]
fn test_perth_adelaide() {
    let d = distance(PERTH.0, PERTH.1, ADELAIDE.0, ADELAIDE.1).unwrap();
    assert!((d - 2_155_488.464).abs() < 1.0, "distance {}", d);

    let bearing = initial_bearing(PERTH.0, PERTH.1, ADELAIDE.0, ADELAIDE.1).unwrap();
    assert!((bearing - 104.826238).abs() < 1e-5, "bearing {}", bearing);
    let back = initial_bearing(ADELAIDE.0, ADELAIDE.1, PERTH.0, PERTH.1).unwrap();
    assert!((back - 271.936395).abs() < 1e-5, "bearing {}", back);
}

#[test]
fn test_equator_and_meridian() {
    let d = distance(0.0, 0.0, 0.0, 1.0).unwrap();
    assert!((d - 111_319.491).abs() < 0.01);
    assert_eq!(initial_bearing(0.0, 0.0, 0.0, 1.0).unwrap(), 90.0);

    let d = distance(0.0, 0.0, 1.0, 0.0).unwrap();
    assert!((d - 110_574.389).abs() < 0.01);
    assert_eq!(initial_bearing(0.0, 0.0, 1.0, 0.0).unwrap(), 0.0);
    assert_eq!(initial_bearing(1.0, 0.0, 0.0, 0.0).unwrap(), 180.0);
}

#[test]
fn test_symmetry() {
    let points = [
        PERTH,
        ADELAIDE,
        (51.4778, -0.0015),
        (40.7128, -74.0060),
        (-33.8688, 151.2093),
        (64.1466, -21.9426),
        (-54.8019, -68.3030),
        (1.3521, 103.8198),
    ];
    for a in points.iter() {
        for b in points.iter() {
            let ab = distance(a.0, a.1, b.0, b.1).unwrap();
            let ba = distance(b.0, b.1, a.0, a.1).unwrap();
            if ab == 0.0 {
                assert_eq!(ba, 0.0);
            } else {
                assert!(((ab - ba) / ab).abs() < 1e-6, "{:?} {:?}", a, b);
            }
        }
    }
}

#[test]
fn test_coincident() {
    for p in [PERTH, ADELAIDE, (0.0, 0.0), (89.9, 179.9), (-45.0, -45.0)].iter() {
        assert_eq!(distance(p.0, p.1, p.0, p.1), Ok(0.0));
        assert_eq!(
            initial_bearing(p.0, p.1, p.0, p.1),
            Err(GeodesicError::CoincidentPoints)
        );
        assert_eq!(
            inverse(p.0, p.1, p.0, p.1),
            Err(GeodesicError::CoincidentPoints)
        );
    }
}

#[test]
fn test_near_antipodal() {
    assert_eq!(
        distance(0.0, 0.0, 0.5, 179.7),
        Err(GeodesicError::NoConvergence { iterations: 200 })
    );
    assert!(initial_bearing(0.0, 0.0, 0.5, 179.7).is_err());
}

#[test]
fn test_flinders_peak() {
    // Vincenty's classic Flinders Peak -> Buninyong example
    let pt = direct_projection(-37.95103342, 144.42486789, 306.86815833, 54972.271).unwrap();
    assert!((pt.lat - -37.65282114).abs() < 1e-7, "lat {}", pt.lat);
    assert!((pt.lon - 143.92649553).abs() < 1e-7, "lon {}", pt.lon);

    let inv = inverse(-37.95103342, 144.42486789, -37.65282114, 143.92649553).unwrap();
    assert!((inv.distance - 54972.271).abs() < 0.01);
    assert!((inv.initial_bearing - 306.868159).abs() < 1e-5);
}

#[test]
fn test_direct_inverse_consistency() {
    let cases = [
        (PERTH, 90.0, 1_000_000.0),
        ((51.5, -0.12), 45.0, 5_000_000.0),
        ((10.0, 20.0), 200.0, 9_000_000.0),
        ((-60.0, -70.0), 315.0, 3_000_000.0),
        ((0.0, 0.0), 0.0, 10_000_000.0),
        ((-32.0, 115.0), 135.0, 2_000_000.0),
        ((70.0, 10.0), 270.0, 500.0),
        ((-5.0, 170.0), 80.0, 4_000_000.0),
    ];
    for (start, azimuth, d) in cases.iter() {
        let end = direct_projection(start.0, start.1, *azimuth, *d).unwrap();
        let back = distance(start.0, start.1, end.lat, end.lon).unwrap();
        assert!((back - d).abs() < 1.0, "{:?} {} {}: {}", start, azimuth, d, back);
    }
}

#[test]
fn test_bearing_round_trip() {
    let end = direct_projection(PERTH.0, PERTH.1, 90.0, 1_000_000.0).unwrap();
    assert!((end.lat - -31.770790739).abs() < 1e-6);
    assert!((end.lon - 125.612138027).abs() < 1e-6);
    let bearing = initial_bearing(PERTH.0, PERTH.1, end.lat, end.lon).unwrap();
    assert!((bearing - 90.0).abs() < 1e-6);
}

#[test]
fn test_azimuth_normalization() {
    let a = direct_projection(-32.0, 115.0, -45.0, 2_000_000.0).unwrap();
    let b = direct_projection(-32.0, 115.0, 315.0, 2_000_000.0).unwrap();
    let c = direct_projection(-32.0, 115.0, 675.0, 2_000_000.0).unwrap();
    assert!((a.lat - b.lat).abs() < 1e-9 && (a.lon - b.lon).abs() < 1e-9);
    assert!((c.lat - b.lat).abs() < 1e-9 && (c.lon - b.lon).abs() < 1e-9);
    assert!((b.lat - -18.544856709).abs() < 1e-6);
    assert!((b.lon - 101.704489368).abs() < 1e-6);
}

#[test]
fn test_zero_distance() {
    let pt = direct_projection(PERTH.0, PERTH.1, 123.0, 0.0).unwrap();
    assert_eq!(pt, GeoPoint::new(PERTH.0, PERTH.1));
}

#[test]
fn test_geopoint_methods() {
    let perth = GeoPoint::new(PERTH.0, PERTH.1);
    let adelaide = GeoPoint::new(ADELAIDE.0, ADELAIDE.1);
    assert_eq!(
        perth.distance_to(&adelaide),
        distance(PERTH.0, PERTH.1, ADELAIDE.0, ADELAIDE.1)
    );
    let bearing = perth.bearing_to(&adelaide).unwrap();
    let projected = perth
        .project(bearing, perth.distance_to(&adelaide).unwrap())
        .unwrap();
    assert!((projected.lat - adelaide.lat).abs() < 1e-6);
    assert!((projected.lon - adelaide.lon).abs() < 1e-6);
}
