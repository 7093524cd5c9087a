//! Transverse Mercator, Krüger n-series to 6th order (Karney 2011).
//!
//! Registered as `Transverse_Mercator`; UTM zones are instances of it.

use crate::crs::ProjectedCrs;
use crate::ellipsoid::Ellipsoid;
use crate::error::ProjError;
use crate::parameter::{CENTRAL_MERIDIAN, LATITUDE_OF_ORIGIN};
use crate::proj::common::ParameterReader;
use crate::proj::Projection;

/// Coefficients of n¹..n⁶ in the forward series terms α₁..α₆.
const ALPHA: [[f64; 6]; 6] = [
    [1.0 / 2.0, -2.0 / 3.0, 5.0 / 16.0, 41.0 / 180.0, -127.0 / 288.0, 7891.0 / 37800.0],
    [0.0, 13.0 / 48.0, -3.0 / 5.0, 557.0 / 1440.0, 281.0 / 630.0, -1983433.0 / 1935360.0],
    [0.0, 0.0, 61.0 / 240.0, -103.0 / 140.0, 15061.0 / 26880.0, 167603.0 / 181440.0],
    [0.0, 0.0, 0.0, 49561.0 / 161280.0, -179.0 / 168.0, 6601661.0 / 7257600.0],
    [0.0, 0.0, 0.0, 0.0, 34729.0 / 80640.0, -3418889.0 / 1995840.0],
    [0.0, 0.0, 0.0, 0.0, 0.0, 212378941.0 / 319334400.0],
];

/// Coefficients of n¹..n⁶ in the inverse series terms β₁..β₆.
const BETA: [[f64; 6]; 6] = [
    [1.0 / 2.0, -2.0 / 3.0, 37.0 / 96.0, -1.0 / 360.0, -81.0 / 512.0, 96199.0 / 604800.0],
    [0.0, 1.0 / 48.0, 1.0 / 15.0, -437.0 / 1440.0, 46.0 / 105.0, -1118711.0 / 3870720.0],
    [0.0, 0.0, 17.0 / 480.0, -37.0 / 840.0, -209.0 / 4480.0, 5569.0 / 90720.0],
    [0.0, 0.0, 0.0, 4397.0 / 161280.0, -11.0 / 504.0, -830251.0 / 7257600.0],
    [0.0, 0.0, 0.0, 0.0, 4583.0 / 161280.0, -108847.0 / 3991680.0],
    [0.0, 0.0, 0.0, 0.0, 0.0, 20648693.0 / 638668800.0],
];

const MAX_TAU_ITERATIONS: usize = 15;

#[derive(Debug)]
pub struct TransverseMercator {
    ellipsoid: Ellipsoid,
    lon0: f64,
    false_easting: f64,
    false_northing: f64,
    /// k0 times the rectifying radius.
    scale: f64,
    alpha: [f64; 6],
    beta: [f64; 6],
    /// Rectifying latitude of the origin.
    xi0: f64,
}

impl TransverseMercator {
    pub fn new(
        ellipsoid: Ellipsoid,
        lon0: f64,
        lat0: f64,
        k0: f64,
        false_easting: f64,
        false_northing: f64,
    ) -> Self {
        let n = ellipsoid.third_flattening();
        let rectifying_radius =
            ellipsoid.semi_major_axis() / (1.0 + n) * (1.0 + n.powi(2) / 4.0 + n.powi(4) / 64.0);
        Self {
            lon0,
            false_easting,
            false_northing,
            scale: k0 * rectifying_radius,
            alpha: ALPHA.map(|row| polynomial(n, &row)),
            beta: BETA.map(|row| polynomial(n, &row)),
            xi0: rectifying_latitude(lat0, n),
            ellipsoid,
        }
    }

    /// Projection factory for the method registry.
    pub fn from_crs(crs: &ProjectedCrs) -> Result<Box<dyn Projection>, ProjError> {
        let params = ParameterReader::new(crs);
        let (false_easting, false_northing) = params.false_origin();
        Ok(Box::new(Self::new(
            params.ellipsoid(),
            params.value_or(&CENTRAL_MERIDIAN, 0.0),
            params.value_or(&LATITUDE_OF_ORIGIN, 0.0),
            params.scale_factor(),
            false_easting,
            false_northing,
        )))
    }

    /// UTM zone on WGS 84.
    pub fn utm_zone(zone: u8, north: bool) -> Self {
        let false_northing = if north { 0.0 } else { 10_000_000.0 };
        Self::new(
            Ellipsoid::wgs84(),
            utm_central_meridian(zone).to_radians(),
            0.0,
            0.9996,
            500_000.0,
            false_northing,
        )
    }
}

/// Central meridian of a UTM zone in degrees.
pub fn utm_central_meridian(zone: u8) -> f64 {
    f64::from(zone) * 6.0 - 183.0
}

/// Σ cᵢ nⁱ⁺¹, Horner form.
fn polynomial(n: f64, coefficients: &[f64; 6]) -> f64 {
    coefficients.iter().rev().fold(0.0, |acc, c| acc * n + c) * n
}

/// Rectifying latitude μ(φ) as a series in n.
fn rectifying_latitude(phi: f64, n: f64) -> f64 {
    let (n2, n3, n4) = (n * n, n * n * n, n * n * n * n);
    phi - (1.5 * n - 9.0 / 16.0 * n3) * (2.0 * phi).sin()
        + (15.0 / 16.0 * n2 - 15.0 / 32.0 * n4) * (4.0 * phi).sin()
        - 35.0 / 48.0 * n3 * (6.0 * phi).sin()
        + 315.0 / 512.0 * n4 * (8.0 * phi).sin()
}

/// tan φ to tan χ, χ the conformal latitude.
fn conformal_tangent(tau: f64, e: f64) -> f64 {
    let sec = tau.hypot(1.0);
    let sigma = (e * (e * tau / sec).atanh()).sinh();
    tau * sigma.hypot(1.0) - sigma * sec
}

/// Inverse of [`conformal_tangent`] by Newton's method.
fn geodetic_tangent(tau_prime: f64, e: f64) -> f64 {
    let one_minus_e2 = 1.0 - e * e;
    let mut tau = tau_prime;
    for _ in 0..MAX_TAU_ITERATIONS {
        let estimate = conformal_tangent(tau, e);
        let step = (tau_prime - estimate) * (1.0 + one_minus_e2 * tau * tau)
            / (one_minus_e2 * tau.hypot(1.0) * estimate.hypot(1.0));
        tau += step;
        if step.abs() < 1e-12 * (1.0 + tau.abs()) {
            break;
        }
    }
    tau
}

impl Projection for TransverseMercator {
    fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64), ProjError> {
        let (sin_dlam, cos_dlam) = (lon - self.lon0).sin_cos();
        let tau_prime = conformal_tangent(lat.tan(), self.ellipsoid.eccentricity());

        let xi0 = tau_prime.atan2(cos_dlam);
        let eta0 = (sin_dlam / tau_prime.hypot(cos_dlam)).asinh();

        let (xi, eta) = self.alpha.iter().zip(1_u8..).fold((xi0, eta0), |(xi, eta), (a, j)| {
            let k = 2.0 * f64::from(j);
            (
                xi + a * (k * xi0).sin() * (k * eta0).cosh(),
                eta + a * (k * xi0).cos() * (k * eta0).sinh(),
            )
        });

        Ok((
            self.false_easting + self.scale * eta,
            self.false_northing + self.scale * (xi - self.xi0),
        ))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError> {
        let eta = (x - self.false_easting) / self.scale;
        let xi = (y - self.false_northing) / self.scale + self.xi0;

        let (xi_prime, eta_prime) = self.beta.iter().zip(1_u8..).fold((xi, eta), |(xp, ep), (b, j)| {
            let k = 2.0 * f64::from(j);
            (
                xp - b * (k * xi).sin() * (k * eta).cosh(),
                ep - b * (k * xi).cos() * (k * eta).sinh(),
            )
        });

        let sinh_eta = eta_prime.sinh();
        let (sin_xi, cos_xi) = xi_prime.sin_cos();
        let tau_prime = sin_xi / sinh_eta.hypot(cos_xi);
        let tau = geodetic_tangent(tau_prime, self.ellipsoid.eccentricity());

        Ok((self.lon0 + sinh_eta.atan2(cos_xi), tau.atan()))
    }

    fn ellipsoid(&self) -> &Ellipsoid {
        &self.ellipsoid
    }
}
