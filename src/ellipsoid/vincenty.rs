//! Vincenty's direct and inverse solutions of the geodesic problem.

use std::f64::consts::{PI, TAU};

use super::Ellipsoid;
use crate::error::GeodesyError;

/// Iteration cap for the λ (inverse) and σ (direct) loops.
pub const MAX_ITERATIONS: usize = 100;

/// Convergence threshold on the change of λ or σ, in radians.
pub const TOLERANCE: f64 = 1e-12;

/// Destination of the direct problem, degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DirectSolution {
    pub lon: f64,
    pub lat: f64,
    /// Forward azimuth at the destination.
    pub azimuth: f64,
}

struct InverseSolution {
    distance: f64,
    initial_azimuth: f64,
    final_azimuth: f64,
}

impl InverseSolution {
    const COINCIDENT: Self = Self {
        distance: 0.0,
        initial_azimuth: 0.0,
        final_azimuth: 0.0,
    };
}

fn normalize_azimuth(azimuth: f64) -> f64 {
    let azimuth = azimuth.rem_euclid(TAU);
    if azimuth >= TAU {
        0.0
    } else {
        azimuth
    }
}

/// (A, B) series terms from u² = cos²α · e'².
fn series_terms(u_sq: f64) -> (f64, f64) {
    let big_a = 1.0 + u_sq / 16384.0 * (4096.0 + u_sq * (-768.0 + u_sq * (320.0 - 175.0 * u_sq)));
    let big_b = u_sq / 1024.0 * (256.0 + u_sq * (-128.0 + u_sq * (74.0 - 47.0 * u_sq)));
    (big_a, big_b)
}

fn delta_sigma(big_b: f64, sin_sigma: f64, cos_sigma: f64, cos_2sigma_m: f64) -> f64 {
    let cos2_sq = cos_2sigma_m * cos_2sigma_m;
    big_b
        * sin_sigma
        * (cos_2sigma_m
            + big_b / 4.0
                * (cos_sigma * (-1.0 + 2.0 * cos2_sq)
                    - big_b / 6.0
                        * cos_2sigma_m
                        * (-3.0 + 4.0 * sin_sigma * sin_sigma)
                        * (-3.0 + 4.0 * cos2_sq)))
}

impl Ellipsoid {
    fn reduced_latitude(&self, lat: f64) -> (f64, f64) {
        let tan_u = (1.0 - self.f) * lat.tan();
        let cos_u = 1.0 / (1.0 + tan_u * tan_u).sqrt();
        (tan_u * cos_u, cos_u)
    }

    fn solve_inverse(
        &self,
        lon1: f64,
        lat1: f64,
        lon2: f64,
        lat2: f64,
    ) -> Result<InverseSolution, GeodesyError> {
        let f = self.f;
        let l = lon2 - lon1;
        let (sin_u1, cos_u1) = self.reduced_latitude(lat1);
        let (sin_u2, cos_u2) = self.reduced_latitude(lat2);

        let mut lambda = l;
        for _ in 0..MAX_ITERATIONS {
            let sin_lambda = lambda.sin();
            let cos_lambda = lambda.cos();
            let t1 = cos_u2 * sin_lambda;
            let t2 = cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda;
            let sin_sigma = (t1 * t1 + t2 * t2).sqrt();
            if sin_sigma == 0.0 {
                return Ok(InverseSolution::COINCIDENT);
            }
            let cos_sigma = sin_u1 * sin_u2 + cos_u1 * cos_u2 * cos_lambda;
            let sigma = sin_sigma.atan2(cos_sigma);
            let sin_alpha = cos_u1 * cos_u2 * sin_lambda / sin_sigma;
            let cos_sq_alpha = 1.0 - sin_alpha * sin_alpha;

            // Equatorial line: cos²α = 0 makes this 0/0.
            let mut cos_2sigma_m = cos_sigma - 2.0 * sin_u1 * sin_u2 / cos_sq_alpha;
            if !cos_2sigma_m.is_finite() {
                cos_2sigma_m = 0.0;
            }

            let c = f / 16.0 * cos_sq_alpha * (4.0 + f * (4.0 - 3.0 * cos_sq_alpha));
            let lambda_prev = lambda;
            lambda = l
                + (1.0 - c)
                    * f
                    * sin_alpha
                    * (sigma
                        + c * sin_sigma
                            * (cos_2sigma_m
                                + c * cos_sigma * (-1.0 + 2.0 * cos_2sigma_m * cos_2sigma_m)));

            if (lambda - lambda_prev).abs() <= TOLERANCE {
                let u_sq = cos_sq_alpha * self.ep2;
                let (big_a, big_b) = series_terms(u_sq);
                let distance =
                    self.b * big_a * (sigma - delta_sigma(big_b, sin_sigma, cos_sigma, cos_2sigma_m));
                let initial_azimuth = t1.atan2(t2);
                let final_azimuth =
                    (cos_u1 * sin_lambda).atan2(-sin_u1 * cos_u2 + cos_u1 * sin_u2 * cos_lambda);
                return Ok(InverseSolution {
                    distance,
                    initial_azimuth: normalize_azimuth(initial_azimuth),
                    final_azimuth: normalize_azimuth(final_azimuth),
                });
            }
        }
        Err(GeodesyError::ConvergenceFailure {
            iterations: MAX_ITERATIONS,
        })
    }

    /// Geodesic distance in metres between two points given in radians.
    pub fn distance_metres_radians(
        &self,
        lon1: f64,
        lat1: f64,
        lon2: f64,
        lat2: f64,
    ) -> Result<f64, GeodesyError> {
        Ok(self.solve_inverse(lon1, lat1, lon2, lat2)?.distance)
    }

    /// Initial azimuth in radians, clockwise from north in [0, 2π).
    pub fn azimuth_radians(
        &self,
        lon1: f64,
        lat1: f64,
        lon2: f64,
        lat2: f64,
    ) -> Result<f64, GeodesyError> {
        Ok(self.solve_inverse(lon1, lat1, lon2, lat2)?.initial_azimuth)
    }

    /// Azimuth at the second point, continuing the geodesic, in radians.
    pub fn final_azimuth_radians(
        &self,
        lon1: f64,
        lat1: f64,
        lon2: f64,
        lat2: f64,
    ) -> Result<f64, GeodesyError> {
        Ok(self.solve_inverse(lon1, lat1, lon2, lat2)?.final_azimuth)
    }

    pub fn distance_metres(
        &self,
        lon1: f64,
        lat1: f64,
        lon2: f64,
        lat2: f64,
    ) -> Result<f64, GeodesyError> {
        self.distance_metres_radians(
            lon1.to_radians(),
            lat1.to_radians(),
            lon2.to_radians(),
            lat2.to_radians(),
        )
    }

    /// Initial azimuth in degrees in [0, 360).
    pub fn azimuth(&self, lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> Result<f64, GeodesyError> {
        let azimuth = self.azimuth_radians(
            lon1.to_radians(),
            lat1.to_radians(),
            lon2.to_radians(),
            lat2.to_radians(),
        )?;
        Ok(azimuth.to_degrees())
    }

    /// Solve the direct problem in radians: start point, azimuth and distance
    /// to (lon, lat, final azimuth).
    pub fn direct_radians(
        &self,
        lon1: f64,
        lat1: f64,
        azimuth: f64,
        distance: f64,
    ) -> Result<(f64, f64, f64), GeodesyError> {
        let f = self.f;
        let sin_alpha1 = azimuth.sin();
        let cos_alpha1 = azimuth.cos();
        let (sin_u1, cos_u1) = self.reduced_latitude(lat1);
        let tan_u1 = sin_u1 / cos_u1;

        let sigma1 = tan_u1.atan2(cos_alpha1);
        let sin_alpha = cos_u1 * sin_alpha1;
        let cos_sq_alpha = 1.0 - sin_alpha * sin_alpha;
        let u_sq = cos_sq_alpha * self.ep2;
        let (big_a, big_b) = series_terms(u_sq);

        let sigma0 = distance / (self.b * big_a);
        let mut sigma = sigma0;
        let mut converged = false;
        for _ in 0..MAX_ITERATIONS {
            let cos_2sigma_m = (2.0 * sigma1 + sigma).cos();
            let sin_sigma = sigma.sin();
            let cos_sigma = sigma.cos();
            let sigma_prev = sigma;
            sigma = sigma0 + delta_sigma(big_b, sin_sigma, cos_sigma, cos_2sigma_m);
            if (sigma - sigma_prev).abs() <= TOLERANCE {
                converged = true;
                break;
            }
        }
        if !converged {
            return Err(GeodesyError::ConvergenceFailure {
                iterations: MAX_ITERATIONS,
            });
        }
        let sin_sigma = sigma.sin();
        let cos_sigma = sigma.cos();
        let cos_2sigma_m = (2.0 * sigma1 + sigma).cos();

        let x = sin_u1 * sin_sigma - cos_u1 * cos_sigma * cos_alpha1;
        let lat2 = (sin_u1 * cos_sigma + cos_u1 * sin_sigma * cos_alpha1)
            .atan2((1.0 - f) * (sin_alpha * sin_alpha + x * x).sqrt());
        let lambda =
            (sin_sigma * sin_alpha1).atan2(cos_u1 * cos_sigma - sin_u1 * sin_sigma * cos_alpha1);
        let c = f / 16.0 * cos_sq_alpha * (4.0 + f * (4.0 - 3.0 * cos_sq_alpha));
        let l = lambda
            - (1.0 - c)
                * f
                * sin_alpha
                * (sigma
                    + c * sin_sigma
                        * (cos_2sigma_m + c * cos_sigma * (-1.0 + 2.0 * cos_2sigma_m * cos_2sigma_m)));
        let lon2 = (lon1 + l + PI).rem_euclid(TAU) - PI;
        let final_azimuth = normalize_azimuth(sin_alpha.atan2(-x));
        Ok((lon2, lat2, final_azimuth))
    }

    /// Direct problem in degrees.
    pub fn direct(
        &self,
        lon: f64,
        lat: f64,
        azimuth: f64,
        distance: f64,
    ) -> Result<DirectSolution, GeodesyError> {
        let (lon2, lat2, azimuth2) =
            self.direct_radians(lon.to_radians(), lat.to_radians(), azimuth.to_radians(), distance)?;
        Ok(DirectSolution {
            lon: lon2.to_degrees(),
            lat: lat2.to_degrees(),
            azimuth: azimuth2.to_degrees(),
        })
    }
}
