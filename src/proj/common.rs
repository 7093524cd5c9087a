//! Common helpers for projection math (latitude functions, parameter access).

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use crate::crs::ProjectedCrs;
use crate::ellipsoid::Ellipsoid;
use crate::error::ProjError;
use crate::parameter::{ParameterName, FALSE_EASTING, FALSE_NORTHING, SCALE_FACTOR};

const PHI_ITERATIONS: usize = 15;
const PHI_TOLERANCE: f64 = 1e-14;

/// m(φ) = cos φ / sqrt(1 - e² sin² φ)
pub fn msfn(phi: f64, e2: f64) -> f64 {
    let sin_phi = phi.sin();
    phi.cos() / (1.0 - e2 * sin_phi * sin_phi).sqrt()
}

/// t(φ) = tan(π/4 - φ/2) / ((1 - e sin φ) / (1 + e sin φ))^(e/2)
pub fn tsfn(phi: f64, e: f64) -> f64 {
    let esin = e * phi.sin();
    (FRAC_PI_4 - phi / 2.0).tan() / ((1.0 - esin) / (1.0 + esin)).powf(e / 2.0)
}

/// Inverse of [`tsfn`] by fixed-point iteration.
pub fn phi_from_ts(ts: f64, e: f64) -> f64 {
    let half_e = e / 2.0;
    let mut phi = FRAC_PI_2 - 2.0 * ts.atan();
    for _ in 0..PHI_ITERATIONS {
        let esin = e * phi.sin();
        let next = FRAC_PI_2 - 2.0 * (ts * ((1.0 - esin) / (1.0 + esin)).powf(half_e)).atan();
        let delta = next - phi;
        phi = next;
        if delta.abs() < PHI_TOLERANCE {
            break;
        }
    }
    phi
}

/// Authalic q(φ) used by equal-area projections.
pub fn qsfn(phi: f64, e: f64) -> f64 {
    let sin_phi = phi.sin();
    if e < 1e-7 {
        return 2.0 * sin_phi;
    }
    let esin = e * sin_phi;
    (1.0 - e * e) * (sin_phi / (1.0 - esin * esin) - (0.5 / e) * ((1.0 - esin) / (1.0 + esin)).ln())
}

/// Meridional arc length from the equator to latitude phi, series in the
/// third flattening n.
pub fn meridional_arc(ellipsoid: &Ellipsoid, phi: f64) -> f64 {
    let n = ellipsoid.third_flattening();
    let n2 = n * n;
    let n3 = n2 * n;
    let n4 = n3 * n;

    let a2 = -3.0 / 2.0 * n + 9.0 / 16.0 * n3;
    let a4 = 15.0 / 16.0 * n2 - 15.0 / 32.0 * n4;
    let a6 = -35.0 / 48.0 * n3;
    let a8 = 315.0 / 512.0 * n4;

    rectifying_radius(ellipsoid)
        * (phi
            + a2 * (2.0 * phi).sin()
            + a4 * (4.0 * phi).sin()
            + a6 * (6.0 * phi).sin()
            + a8 * (8.0 * phi).sin())
}

/// Latitude whose meridional arc is `arc` (footpoint latitude).
pub fn latitude_from_arc(ellipsoid: &Ellipsoid, arc: f64) -> f64 {
    let n = ellipsoid.third_flattening();
    let n2 = n * n;
    let n3 = n2 * n;
    let n4 = n3 * n;
    let mu = arc / rectifying_radius(ellipsoid);

    mu + (3.0 / 2.0 * n - 27.0 / 32.0 * n3) * (2.0 * mu).sin()
        + (21.0 / 16.0 * n2 - 55.0 / 32.0 * n4) * (4.0 * mu).sin()
        + (151.0 / 96.0 * n3) * (6.0 * mu).sin()
        + (1097.0 / 512.0 * n4) * (8.0 * mu).sin()
}

/// A = a/(1+n)·(1 + n²/4 + n⁴/64)
fn rectifying_radius(ellipsoid: &Ellipsoid) -> f64 {
    let n2 = ellipsoid.third_flattening().powi(2);
    ellipsoid.semi_major_axis() / (1.0 + ellipsoid.third_flattening()) * (1.0 + n2 / 4.0 + n2 * n2 / 64.0)
}

/// Typed access to the parameters of a projected CRS, already normalized to
/// radians and metres.
pub struct ParameterReader<'a> {
    crs: &'a ProjectedCrs,
}

impl<'a> ParameterReader<'a> {
    pub fn new(crs: &'a ProjectedCrs) -> Self {
        Self { crs }
    }

    pub fn ellipsoid(&self) -> Ellipsoid {
        self.crs.geographic().datum().ellipsoid().clone()
    }

    pub fn value_or(&self, name: &ParameterName, default: f64) -> f64 {
        self.crs.parameters().get_normalized(name).unwrap_or(default)
    }

    pub fn required(&self, name: &ParameterName) -> Result<f64, ProjError> {
        self.crs.parameters().get_normalized(name).ok_or_else(|| {
            let parameter = name.primary().map_or("?", |p| p.name());
            ProjError::InvalidParameter(format!(
                "{} requires {parameter}",
                self.crs.method().name()
            ))
        })
    }

    pub fn scale_factor(&self) -> f64 {
        self.value_or(&SCALE_FACTOR, 1.0)
    }

    pub fn false_origin(&self) -> (f64, f64) {
        (
            self.value_or(&FALSE_EASTING, 0.0),
            self.value_or(&FALSE_NORTHING, 0.0),
        )
    }
}
