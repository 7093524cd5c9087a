//! Stereographic projections: Polar (variants A and B) and Oblique.
//!
//! Oblique Stereographic is the double projection of EPSG method 9809:
//! ellipsoid to conformal sphere, then the spherical stereographic.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use crate::crs::ProjectedCrs;
use crate::ellipsoid::Ellipsoid;
use crate::error::ProjError;
use crate::parameter::{CENTRAL_MERIDIAN, LATITUDE_OF_ORIGIN, STANDARD_PARALLEL_1};
use crate::proj::common::{msfn, phi_from_ts, tsfn, ParameterReader};
use crate::proj::Projection;

const POLE_TOLERANCE: f64 = 1e-10;

/// Polar Stereographic projection.
#[derive(Debug)]
pub struct PolarStereographic {
    ellipsoid: Ellipsoid,
    lon0: f64,
    north: bool,
    false_easting: f64,
    false_northing: f64,
    // ρ = akm · t
    akm: f64,
}

impl PolarStereographic {
    /// Variant A: scale factor k0 at the pole.
    pub fn variant_a(
        ellipsoid: Ellipsoid,
        lon0: f64,
        north: bool,
        k0: f64,
        false_easting: f64,
        false_northing: f64,
    ) -> Self {
        let e = ellipsoid.eccentricity();
        let ep = ((1.0 + e).powf(1.0 + e) * (1.0 - e).powf(1.0 - e)).sqrt();
        let akm = 2.0 * ellipsoid.semi_major_axis() * k0 / ep;
        Self {
            ellipsoid,
            lon0,
            north,
            false_easting,
            false_northing,
            akm,
        }
    }

    /// Variant B: scale is true along the standard parallel lat_ts, whose
    /// sign selects the pole.
    pub fn variant_b(
        ellipsoid: Ellipsoid,
        lon0: f64,
        lat_ts: f64,
        false_easting: f64,
        false_northing: f64,
    ) -> Self {
        let north = lat_ts >= 0.0;
        if (lat_ts.abs() - FRAC_PI_2).abs() < POLE_TOLERANCE {
            return Self::variant_a(ellipsoid, lon0, north, 1.0, false_easting, false_northing);
        }
        let e = ellipsoid.eccentricity();
        let m_c = msfn(lat_ts.abs(), ellipsoid.eccentricity_squared());
        let t_c = tsfn(lat_ts.abs(), e);
        let akm = ellipsoid.semi_major_axis() * m_c / t_c;
        Self {
            ellipsoid,
            lon0,
            north,
            false_easting,
            false_northing,
            akm,
        }
    }

    pub fn from_crs_variant_a(crs: &ProjectedCrs) -> Result<Box<dyn Projection>, ProjError> {
        let params = ParameterReader::new(crs);
        let (false_easting, false_northing) = params.false_origin();
        let lat0 = params.value_or(&LATITUDE_OF_ORIGIN, FRAC_PI_2);
        if (lat0.abs() - FRAC_PI_2).abs() > POLE_TOLERANCE {
            return Err(ProjError::InvalidParameter(format!(
                "Polar Stereographic variant A needs a polar origin, got {}°",
                lat0.to_degrees()
            )));
        }
        Ok(Box::new(Self::variant_a(
            params.ellipsoid(),
            params.value_or(&CENTRAL_MERIDIAN, 0.0),
            lat0 > 0.0,
            params.scale_factor(),
            false_easting,
            false_northing,
        )))
    }

    pub fn from_crs_variant_b(crs: &ProjectedCrs) -> Result<Box<dyn Projection>, ProjError> {
        let params = ParameterReader::new(crs);
        let (false_easting, false_northing) = params.false_origin();
        Ok(Box::new(Self::variant_b(
            params.ellipsoid(),
            params.value_or(&CENTRAL_MERIDIAN, 0.0),
            params.required(&STANDARD_PARALLEL_1)?,
            false_easting,
            false_northing,
        )))
    }
}

impl Projection for PolarStereographic {
    fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64), ProjError> {
        let e = self.ellipsoid.eccentricity();
        let dlam = lon - self.lon0;
        if self.north {
            let rho = self.akm * tsfn(lat, e);
            Ok((
                self.false_easting + rho * dlam.sin(),
                self.false_northing - rho * dlam.cos(),
            ))
        } else {
            let rho = self.akm * tsfn(-lat, e);
            Ok((
                self.false_easting + rho * dlam.sin(),
                self.false_northing + rho * dlam.cos(),
            ))
        }
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError> {
        let e = self.ellipsoid.eccentricity();
        let dx = x - self.false_easting;
        let dy = y - self.false_northing;
        let t = dx.hypot(dy) / self.akm;
        if self.north {
            Ok((self.lon0 + dx.atan2(-dy), phi_from_ts(t, e)))
        } else {
            Ok((self.lon0 + dx.atan2(dy), -phi_from_ts(t, e)))
        }
    }

    fn ellipsoid(&self) -> &Ellipsoid {
        &self.ellipsoid
    }
}

/// Oblique Stereographic (double projection through the conformal sphere).
#[derive(Debug)]
pub struct ObliqueStereographic {
    ellipsoid: Ellipsoid,
    lon0: f64,
    false_easting: f64,
    false_northing: f64,
    // Conformal sphere constants
    n: f64,
    c: f64,
    sin_chi0: f64,
    cos_chi0: f64,
    two_rk: f64, // 2·R·k0
}

impl ObliqueStereographic {
    pub fn new(
        ellipsoid: Ellipsoid,
        lon0: f64,
        lat0: f64,
        k0: f64,
        false_easting: f64,
        false_northing: f64,
    ) -> Self {
        let e = ellipsoid.eccentricity();
        let e2 = ellipsoid.eccentricity_squared();
        let a = ellipsoid.semi_major_axis();
        let sin0 = lat0.sin();
        let w_den = 1.0 - e2 * sin0 * sin0;

        // R = sqrt(ρ₀·ν₀)
        let rho0 = a * (1.0 - e2) / w_den.powf(1.5);
        let nu0 = a / w_den.sqrt();
        let r = (rho0 * nu0).sqrt();

        let n = (1.0 + e2 * lat0.cos().powi(4) / (1.0 - e2)).sqrt();
        let s1 = (1.0 + sin0) / (1.0 - sin0);
        let s2 = (1.0 - e * sin0) / (1.0 + e * sin0);
        let w1 = (s1 * s2.powf(e)).powf(n);
        let sin_chi00 = (w1 - 1.0) / (w1 + 1.0);
        let c = (n + sin0) * (1.0 - sin_chi00) / ((n - sin0) * (1.0 + sin_chi00));
        let w2 = c * w1;
        let chi0 = ((w2 - 1.0) / (w2 + 1.0)).asin();

        Self {
            ellipsoid,
            lon0,
            false_easting,
            false_northing,
            n,
            c,
            sin_chi0: chi0.sin(),
            cos_chi0: chi0.cos(),
            two_rk: 2.0 * r * k0,
        }
    }

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

    /// Geodetic latitude to conformal latitude χ.
    fn conformal_latitude(&self, lat: f64) -> f64 {
        let e = self.ellipsoid.eccentricity();
        let sin_lat = lat.sin();
        let sa = (1.0 + sin_lat) / (1.0 - sin_lat);
        let sb = (1.0 - e * sin_lat) / (1.0 + e * sin_lat);
        let w = self.c * (sa * sb.powf(e)).powf(self.n);
        ((w - 1.0) / (w + 1.0)).asin()
    }

    /// Conformal latitude back to geodetic latitude by iterating on the
    /// isometric latitude ψ.
    fn geodetic_latitude(&self, chi: f64) -> f64 {
        let e = self.ellipsoid.eccentricity();
        let e2 = self.ellipsoid.eccentricity_squared();
        let sin_chi = chi.sin();
        let psi = 0.5 * ((1.0 + sin_chi) / (self.c * (1.0 - sin_chi))).ln() / self.n;
        let mut phi = 2.0 * psi.exp().atan() - FRAC_PI_2;
        for _ in 0..15 {
            let sin_phi = phi.sin();
            let psi_i = ((phi / 2.0 + FRAC_PI_4).tan()
                * ((1.0 - e * sin_phi) / (1.0 + e * sin_phi)).powf(e / 2.0))
            .ln();
            let delta = (psi_i - psi) * phi.cos() * (1.0 - e2 * sin_phi * sin_phi) / (1.0 - e2);
            phi -= delta;
            if delta.abs() < 1e-12 {
                break;
            }
        }
        phi
    }
}

impl Projection for ObliqueStereographic {
    fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64), ProjError> {
        let chi = self.conformal_latitude(lat);
        let dlam = self.n * (lon - self.lon0);
        let (sin_chi, cos_chi) = chi.sin_cos();
        let cos_dlam = dlam.cos();

        let b = 1.0 + sin_chi * self.sin_chi0 + cos_chi * self.cos_chi0 * cos_dlam;
        if b <= POLE_TOLERANCE {
            return Err(ProjError::TransformFailed(
                "point is antipodal to the stereographic origin".to_string(),
            ));
        }
        let x = self.false_easting + self.two_rk * cos_chi * dlam.sin() / b;
        let y = self.false_northing
            + self.two_rk * (sin_chi * self.cos_chi0 - cos_chi * self.sin_chi0 * cos_dlam) / b;
        Ok((x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError> {
        let dx = x - self.false_easting;
        let dy = y - self.false_northing;
        let rho = dx.hypot(dy);
        if rho < POLE_TOLERANCE {
            let chi0 = self.sin_chi0.atan2(self.cos_chi0);
            return Ok((self.lon0, self.geodetic_latitude(chi0)));
        }

        // Spherical stereographic inverse on the conformal sphere.
        let c = 2.0 * (rho / self.two_rk).atan();
        let (sin_c, cos_c) = c.sin_cos();
        let chi = (cos_c * self.sin_chi0 + dy * sin_c * self.cos_chi0 / rho).asin();
        let dlam = (dx * sin_c).atan2(rho * self.cos_chi0 * cos_c - dy * self.sin_chi0 * sin_c);

        Ok((self.lon0 + dlam / self.n, self.geodetic_latitude(chi)))
    }

    fn ellipsoid(&self) -> &Ellipsoid {
        &self.ellipsoid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn assert_round_trip(proj: &dyn Projection, cases: &[(f64, f64)]) {
        for &(lon_deg, lat_deg) in cases {
            let (lon, lat) = (lon_deg.to_radians(), lat_deg.to_radians());
            let (x, y) = proj.forward(lon, lat).unwrap();
            let (lon2, lat2) = proj.inverse(x, y).unwrap();
            assert_relative_eq!(lon2, lon, epsilon = 1e-9);
            assert_relative_eq!(lat2, lat, epsilon = 1e-9);
        }
    }

    fn rd_new() -> ObliqueStereographic {
        ObliqueStereographic::new(
            Ellipsoid::bessel_1841(),
            (5.0 + 23.0 / 60.0 + 15.5 / 3600.0_f64).to_radians(),
            (52.0 + 9.0 / 60.0 + 22.178 / 3600.0_f64).to_radians(),
            0.999_907_9,
            155_000.0,
            463_000.0,
        )
    }

    #[test]
    fn test_ups_north_reference() {
        // EPSG Guidance Note 7-2, Polar Stereographic variant A.
        let ups = PolarStereographic::variant_a(
            Ellipsoid::wgs84(),
            0.0,
            true,
            0.994,
            2_000_000.0,
            2_000_000.0,
        );
        let (x, y) = ups
            .forward(44.0_f64.to_radians(), 73.0_f64.to_radians())
            .unwrap();
        assert_relative_eq!(x, 3_320_416.747, epsilon = 1e-3);
        assert_relative_eq!(y, 632_668.431, epsilon = 1e-3);
        assert_round_trip(&ups, &[(44.0, 73.0), (-135.0, 85.0), (179.0, 60.0)]);
    }

    #[test]
    fn test_antarctic_variant_b_reference() {
        // EPSG Guidance Note 7-2, Polar Stereographic variant B.
        let proj = PolarStereographic::variant_b(
            Ellipsoid::wgs84(),
            70.0_f64.to_radians(),
            (-71.0_f64).to_radians(),
            6_000_000.0,
            6_000_000.0,
        );
        let (x, y) = proj
            .forward(120.0_f64.to_radians(), (-75.0_f64).to_radians())
            .unwrap();
        assert_relative_eq!(x, 7_255_380.793, epsilon = 1e-3);
        assert_relative_eq!(y, 7_053_389.561, epsilon = 1e-3);
        assert_round_trip(&proj, &[(120.0, -75.0), (0.0, -65.0), (-90.0, -88.0)]);
    }

    #[test]
    fn test_pole_maps_to_false_origin() {
        let proj = PolarStereographic::variant_b(
            Ellipsoid::wgs84(),
            (-45.0_f64).to_radians(),
            70.0_f64.to_radians(),
            0.0,
            0.0,
        );
        let (x, y) = proj.forward(0.3, FRAC_PI_2).unwrap();
        assert_relative_eq!(x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(y, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_rd_new_reference() {
        // EPSG Guidance Note 7-2, Oblique Stereographic (Amersfoort / RD New).
        let proj = rd_new();
        let (x, y) = proj
            .forward(6.0_f64.to_radians(), 53.0_f64.to_radians())
            .unwrap();
        assert_relative_eq!(x, 196_105.283, epsilon = 1e-3);
        assert_relative_eq!(y, 557_057.739, epsilon = 1e-3);
    }

    #[test]
    fn test_rd_new_round_trip() {
        let proj = rd_new();
        assert_round_trip(&proj, &[(6.0, 53.0), (4.9, 52.37), (5.5, 51.44), (3.4, 50.8)]);
        let (lon, lat) = proj.inverse(155_000.0, 463_000.0).unwrap();
        assert_relative_eq!(lon, (5.0 + 23.0 / 60.0 + 15.5 / 3600.0_f64).to_radians(), epsilon = 1e-12);
        assert_relative_eq!(lat, (52.0 + 9.0 / 60.0 + 22.178 / 3600.0_f64).to_radians(), epsilon = 1e-9);
    }
}
