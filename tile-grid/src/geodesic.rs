//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

//! Geodesic calculations on the WGS 84 ellipsoid
//!
//! Distances and bearings are solved with Vincenty's inverse formula, point
//! projection with Vincenty's direct formula. Bearings are degrees clockwise
//! from true north in `[0, 360)`, both as results of [`initial_bearing`] and as
//! input of [`direct_projection`].

use crate::grid::GeoPoint;
use std::f64::consts::PI;
use thiserror::Error;

/// WGS 84 semi-major axis in meters
pub const SEMI_MAJOR_AXIS: f64 = 6378137.0;
/// WGS 84 flattening (1/298.25722210)
pub const FLATTENING: f64 = 0.003352810681;
/// Semi-minor axis derived from `SEMI_MAJOR_AXIS` and `FLATTENING`
pub const SEMI_MINOR_AXIS: f64 = SEMI_MAJOR_AXIS * (1.0 - FLATTENING);

const INVERSE_MAX_ITERATIONS: u32 = 200;
const INVERSE_THRESHOLD: f64 = 1e-12;
const DIRECT_MAX_ITERATIONS: u32 = 1000;
const DIRECT_TOLERANCE: f64 = 1e-9;

#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum GeodesicError {
    /// Iteration limit reached, typically for nearly antipodal points
    #[error("geodesic calculation did not converge within {iterations} iterations")]
    NoConvergence { iterations: u32 },
    #[error("bearing between coincident points is undefined")]
    CoincidentPoints,
}

/// Solution of the inverse geodesic problem
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Inverse {
    /// Ellipsoidal distance in meters
    pub distance: f64,
    /// Forward azimuth at the start point in degrees
    pub initial_bearing: f64,
    /// Forward azimuth at the end point in degrees
    pub final_bearing: f64,
}

/// Distance in meters between two points.
///
/// Coincident points have a distance of exactly 0.
pub fn distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> Result<f64, GeodesicError> {
    Ok(vincenty_inverse(lat1, lon1, lat2, lon2)?.map_or(0.0, |sol| sol.distance))
}

/// Forward azimuth from point 1 to point 2 in degrees `[0, 360)`
pub fn initial_bearing(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> Result<f64, GeodesicError> {
    vincenty_inverse(lat1, lon1, lat2, lon2)?
        .map(|sol| sol.initial_bearing)
        .ok_or(GeodesicError::CoincidentPoints)
}

/// Distance, initial and final bearing with a single solve
pub fn inverse(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> Result<Inverse, GeodesicError> {
    vincenty_inverse(lat1, lon1, lat2, lon2)?.ok_or(GeodesicError::CoincidentPoints)
}

/// Point reached from a start point travelling `distance` meters along the
/// geodesic with the given initial `azimuth` in degrees.
pub fn direct_projection(
    lat1: f64,
    lon1: f64,
    azimuth: f64,
    distance: f64,
) -> Result<GeoPoint, GeodesicError> {
    if distance == 0.0 {
        return Ok(GeoPoint::new(lat1, lon1));
    }
    let alpha1 = azimuth.to_radians().rem_euclid(2.0 * PI);
    let (sin_alpha1, cos_alpha1) = alpha1.sin_cos();

    let tan_u1 = (1.0 - FLATTENING) * lat1.to_radians().tan();
    let u1 = tan_u1.atan();
    let (sin_u1, cos_u1) = u1.sin_cos();
    let sigma1 = tan_u1.atan2(cos_alpha1);
    let sin_alpha = cos_u1 * sin_alpha1;
    let cos_sq_alpha = 1.0 - sin_alpha * sin_alpha;
    let (a_coef, b_coef) = series_coefficients(cos_sq_alpha);

    let sigma_start = distance / (SEMI_MINOR_AXIS * a_coef);
    let mut sigma = sigma_start;
    let mut iterations = 0;
    loop {
        let cos_2sigma_m = (2.0 * sigma1 + sigma).cos();
        let last_sigma = sigma;
        sigma = sigma_start + delta_sigma(b_coef, sigma.sin(), sigma.cos(), cos_2sigma_m);
        iterations += 1;
        if ((last_sigma - sigma) / sigma).abs() <= DIRECT_TOLERANCE {
            break;
        }
        if iterations >= DIRECT_MAX_ITERATIONS {
            return Err(GeodesicError::NoConvergence { iterations });
        }
    }

    let (sin_sigma, cos_sigma) = sigma.sin_cos();
    let cos_2sigma_m = (2.0 * sigma1 + sigma).cos();
    let tmp = sin_u1 * sin_sigma - cos_u1 * cos_sigma * cos_alpha1;
    let lat2 = (sin_u1 * cos_sigma + cos_u1 * sin_sigma * cos_alpha1)
        .atan2((1.0 - FLATTENING) * (sin_alpha * sin_alpha + tmp * tmp).sqrt());
    let lambda = (sin_sigma * sin_alpha1).atan2(cos_u1 * cos_sigma - sin_u1 * sin_sigma * cos_alpha1);
    let c = FLATTENING / 16.0 * cos_sq_alpha * (4.0 + FLATTENING * (4.0 - 3.0 * cos_sq_alpha));
    let omega = lambda
        - (1.0 - c)
            * FLATTENING
            * sin_alpha
            * (sigma
                + c * sin_sigma
                    * (cos_2sigma_m + c * cos_sigma * (-1.0 + 2.0 * cos_2sigma_m * cos_2sigma_m)));

    Ok(GeoPoint::new(lat2.to_degrees(), lon1 + omega.to_degrees()))
}

impl GeoPoint {
    /// Ellipsoidal distance in meters to `other`
    pub fn distance_to(&self, other: &GeoPoint) -> Result<f64, GeodesicError> {
        distance(self.lat, self.lon, other.lat, other.lon)
    }
    /// Initial bearing in degrees towards `other`
    pub fn bearing_to(&self, other: &GeoPoint) -> Result<f64, GeodesicError> {
        initial_bearing(self.lat, self.lon, other.lat, other.lon)
    }
    /// Point `distance` meters away in direction `azimuth`
    pub fn project(&self, azimuth: f64, distance: f64) -> Result<GeoPoint, GeodesicError> {
        direct_projection(self.lat, self.lon, azimuth, distance)
    }
}

/// `None` for coincident points
fn vincenty_inverse(
    lat1: f64,
    lon1: f64,
    lat2: f64,
    lon2: f64,
) -> Result<Option<Inverse>, GeodesicError> {
    let u1 = ((1.0 - FLATTENING) * lat1.to_radians().tan()).atan();
    let u2 = ((1.0 - FLATTENING) * lat2.to_radians().tan()).atan();
    let l = (lon2 - lon1).to_radians();
    let (sin_u1, cos_u1) = u1.sin_cos();
    let (sin_u2, cos_u2) = u2.sin_cos();

    let mut lambda = l;
    let mut converged = false;
    let (mut sin_sigma, mut cos_sigma, mut sigma) = (0.0, 0.0, 0.0);
    let (mut cos_sq_alpha, mut cos_2sigma_m) = (0.0, 0.0);
    for _ in 0..INVERSE_MAX_ITERATIONS {
        let (sin_lambda, cos_lambda) = lambda.sin_cos();
        let t1 = cos_u2 * sin_lambda;
        let t2 = cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda;
        sin_sigma = (t1 * t1 + t2 * t2).sqrt();
        if sin_sigma == 0.0 {
            return Ok(None);
        }
        cos_sigma = sin_u1 * sin_u2 + cos_u1 * cos_u2 * cos_lambda;
        sigma = sin_sigma.atan2(cos_sigma);
        let sin_alpha = cos_u1 * cos_u2 * sin_lambda / sin_sigma;
        cos_sq_alpha = 1.0 - sin_alpha * sin_alpha;
        // equatorial line
        cos_2sigma_m = if cos_sq_alpha != 0.0 {
            cos_sigma - 2.0 * sin_u1 * sin_u2 / cos_sq_alpha
        } else {
            0.0
        };
        let c = FLATTENING / 16.0 * cos_sq_alpha * (4.0 + FLATTENING * (4.0 - 3.0 * cos_sq_alpha));
        let lambda_prev = lambda;
        lambda = l
            + (1.0 - c)
                * FLATTENING
                * sin_alpha
                * (sigma
                    + c * sin_sigma
                        * (cos_2sigma_m + c * cos_sigma * (-1.0 + 2.0 * cos_2sigma_m * cos_2sigma_m)));
        if (lambda - lambda_prev).abs() < INVERSE_THRESHOLD {
            converged = true;
            break;
        }
    }
    if !converged {
        return Err(GeodesicError::NoConvergence {
            iterations: INVERSE_MAX_ITERATIONS,
        });
    }

    let (a_coef, b_coef) = series_coefficients(cos_sq_alpha);
    let distance =
        SEMI_MINOR_AXIS * a_coef * (sigma - delta_sigma(b_coef, sin_sigma, cos_sigma, cos_2sigma_m));

    let (sin_lambda, cos_lambda) = lambda.sin_cos();
    let alpha1 = (cos_u2 * sin_lambda).atan2(cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda);
    let alpha2 = (cos_u1 * sin_lambda).atan2(-sin_u1 * cos_u2 + cos_u1 * sin_u2 * cos_lambda);

    Ok(Some(Inverse {
        distance,
        initial_bearing: normalize_bearing(alpha1.to_degrees()),
        final_bearing: normalize_bearing(alpha2.to_degrees()),
    }))
}

/// Vincenty's A and B for the given cos²α
fn series_coefficients(cos_sq_alpha: f64) -> (f64, f64) {
    let a2 = SEMI_MAJOR_AXIS * SEMI_MAJOR_AXIS;
    let b2 = SEMI_MINOR_AXIS * SEMI_MINOR_AXIS;
    let u_sq = cos_sq_alpha * (a2 - b2) / b2;
    let a_coef = 1.0 + u_sq / 16384.0 * (4096.0 + u_sq * (-768.0 + u_sq * (320.0 - 175.0 * u_sq)));
    let b_coef = u_sq / 1024.0 * (256.0 + u_sq * (-128.0 + u_sq * (74.0 - 47.0 * u_sq)));
    (a_coef, b_coef)
}

fn delta_sigma(b_coef: f64, sin_sigma: f64, cos_sigma: f64, cos_2sigma_m: f64) -> f64 {
    let cos2 = cos_2sigma_m * cos_2sigma_m;
    b_coef
        * sin_sigma
        * (cos_2sigma_m
            + b_coef / 4.0
                * (cos_sigma * (-1.0 + 2.0 * cos2)
                    - b_coef / 6.0
                        * cos_2sigma_m
                        * (-3.0 + 4.0 * sin_sigma * sin_sigma)
                        * (-3.0 + 4.0 * cos2)))
}

fn normalize_bearing(degrees: f64) -> f64 {
    let bearing = degrees.rem_euclid(360.0);
    // rem_euclid rounds tiny negative values up to 360
    if bearing >= 360.0 {
        0.0
    } else {
        bearing
    }
}
