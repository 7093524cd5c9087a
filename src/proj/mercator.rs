//! Mercator projection: ellipsoidal 1SP/2SP variants and Popular
//! Visualisation Pseudo Mercator.
//!
//! Ellipsoidal:
//!   forward: x = a·k₀·(λ - λ₀), y = -a·k₀·ln(tsfn(φ, e))
//!   inverse: λ = λ₀ + x/(a·k₀), φ = phi_from_ts(exp(-y/(a·k₀)), e)
//!
//! Pseudo Mercator applies the spherical formulas to ellipsoidal coordinates
//! with R = a:
//!   forward: x = a·(λ - λ₀), y = a·ln(tan(π/4 + φ/2))
//!   inverse: λ = λ₀ + x/a, φ = 2·atan(exp(y/a)) - π/2

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use crate::crs::ProjectedCrs;
use crate::ellipsoid::Ellipsoid;
use crate::error::ProjError;
use crate::parameter::{CENTRAL_MERIDIAN, STANDARD_PARALLEL_1};
use crate::proj::common::{msfn, phi_from_ts, tsfn, ParameterReader};
use crate::proj::Projection;

/// Ellipsoidal Mercator.
#[derive(Debug)]
pub struct Mercator {
    ellipsoid: Ellipsoid,
    lon0: f64,
    k0: f64,
    false_easting: f64,
    false_northing: f64,
}

impl Mercator {
    /// Variant A: scale factor at the equator given directly.
    pub fn new_1sp(
        ellipsoid: Ellipsoid,
        lon0: f64,
        k0: f64,
        false_easting: f64,
        false_northing: f64,
    ) -> Self {
        Self {
            ellipsoid,
            lon0,
            k0,
            false_easting,
            false_northing,
        }
    }

    /// Variant B: scale is true on the standard parallel ±lat_ts.
    pub fn new_2sp(
        ellipsoid: Ellipsoid,
        lon0: f64,
        lat_ts: f64,
        false_easting: f64,
        false_northing: f64,
    ) -> Self {
        let k0 = msfn(lat_ts, ellipsoid.eccentricity_squared());
        Self::new_1sp(ellipsoid, lon0, k0, false_easting, false_northing)
    }

    pub fn from_crs_1sp(crs: &ProjectedCrs) -> Result<Box<dyn Projection>, ProjError> {
        let params = ParameterReader::new(crs);
        let (false_easting, false_northing) = params.false_origin();
        Ok(Box::new(Self::new_1sp(
            params.ellipsoid(),
            params.value_or(&CENTRAL_MERIDIAN, 0.0),
            params.scale_factor(),
            false_easting,
            false_northing,
        )))
    }

    pub fn from_crs_2sp(crs: &ProjectedCrs) -> Result<Box<dyn Projection>, ProjError> {
        let params = ParameterReader::new(crs);
        let (false_easting, false_northing) = params.false_origin();
        Ok(Box::new(Self::new_2sp(
            params.ellipsoid(),
            params.value_or(&CENTRAL_MERIDIAN, 0.0),
            params.required(&STANDARD_PARALLEL_1)?,
            false_easting,
            false_northing,
        )))
    }

    pub fn scale_factor(&self) -> f64 {
        self.k0
    }
}

impl Projection for Mercator {
    fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64), ProjError> {
        if (lat.abs() - FRAC_PI_2).abs() < 1e-10 {
            return Err(ProjError::TransformFailed(
                "Mercator is undefined at the poles".to_string(),
            ));
        }
        let a = self.ellipsoid.semi_major_axis();
        let e = self.ellipsoid.eccentricity();
        let x = a * self.k0 * (lon - self.lon0) + self.false_easting;
        let y = a * self.k0 * (-tsfn(lat, e).ln()) + self.false_northing;
        Ok((x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError> {
        let a = self.ellipsoid.semi_major_axis();
        let e = self.ellipsoid.eccentricity();
        let lon = self.lon0 + (x - self.false_easting) / (a * self.k0);
        let ts = (-(y - self.false_northing) / (a * self.k0)).exp();
        Ok((lon, phi_from_ts(ts, e)))
    }

    fn ellipsoid(&self) -> &Ellipsoid {
        &self.ellipsoid
    }
}

/// Latitude where Pseudo Mercator becomes square, atan(sinh(π)).
const MAX_LAT_PSEUDO: f64 = 1.484_422_229_745_332_4;

/// Popular Visualisation Pseudo Mercator (EPSG method 1024).
#[derive(Debug)]
pub struct PseudoMercator {
    ellipsoid: Ellipsoid,
    lon0: f64,
    false_easting: f64,
    false_northing: f64,
}

impl PseudoMercator {
    pub fn new(ellipsoid: Ellipsoid, lon0: f64, false_easting: f64, false_northing: f64) -> Self {
        Self {
            ellipsoid,
            lon0,
            false_easting,
            false_northing,
        }
    }

    pub fn from_crs(crs: &ProjectedCrs) -> Result<Box<dyn Projection>, ProjError> {
        let params = ParameterReader::new(crs);
        let (false_easting, false_northing) = params.false_origin();
        Ok(Box::new(Self::new(
            params.ellipsoid(),
            params.value_or(&CENTRAL_MERIDIAN, 0.0),
            false_easting,
            false_northing,
        )))
    }
}

impl Projection for PseudoMercator {
    fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64), ProjError> {
        let a = self.ellipsoid.semi_major_axis();
        let lat = lat.clamp(-MAX_LAT_PSEUDO, MAX_LAT_PSEUDO);
        let x = a * (lon - self.lon0) + self.false_easting;
        let y = a * (FRAC_PI_4 + lat / 2.0).tan().ln() + self.false_northing;
        Ok((x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError> {
        let a = self.ellipsoid.semi_major_axis();
        let lon = self.lon0 + (x - self.false_easting) / a;
        let lat = 2.0 * ((y - self.false_northing) / a).exp().atan() - FRAC_PI_2;
        Ok((lon, lat))
    }

    fn ellipsoid(&self) -> &Ellipsoid {
        &self.ellipsoid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    const CITIES: &[(f64, f64)] = &[
        (0.0, 0.0),
        (10.0, 45.0),
        (-73.9857, 40.7484),
        (139.6917, 35.6895),
        (151.2, -33.9),
    ];

    #[test]
    fn test_pseudo_mercator_reference() {
        let proj = PseudoMercator::new(Ellipsoid::wgs84(), 0.0, 0.0, 0.0);
        let (x, y) = proj.forward(PI, 0.0).unwrap();
        assert_relative_eq!(x, 20_037_508.342_789_244, epsilon = 0.01);
        assert_relative_eq!(y, 0.0, epsilon = 1e-9);
        // The clamp keeps the poles finite and the map square.
        let (_, y) = proj.forward(0.0, FRAC_PI_2).unwrap();
        assert_relative_eq!(y, 20_037_508.342_789_244, epsilon = 0.01);
    }

    #[test]
    fn test_pseudo_mercator_round_trip() {
        let proj = PseudoMercator::new(Ellipsoid::wgs84(), 0.0, 0.0, 0.0);
        for &(lon_deg, lat_deg) in CITIES {
            let (lon, lat) = (lon_deg.to_radians(), lat_deg.to_radians());
            let (x, y) = proj.forward(lon, lat).unwrap();
            let (lon2, lat2) = proj.inverse(x, y).unwrap();
            assert_relative_eq!(lon2, lon, epsilon = 1e-12);
            assert_relative_eq!(lat2, lat, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_1sp_round_trip() {
        let proj = Mercator::new_1sp(Ellipsoid::wgs84(), 0.0, 0.997, 3_900_000.0, 900_000.0);
        for &(lon_deg, lat_deg) in CITIES {
            let (lon, lat) = (lon_deg.to_radians(), lat_deg.to_radians());
            let (x, y) = proj.forward(lon, lat).unwrap();
            let (lon2, lat2) = proj.inverse(x, y).unwrap();
            assert_relative_eq!(lon2, lon, epsilon = 1e-12);
            assert_relative_eq!(lat2, lat, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_2sp_scale_on_standard_parallel() {
        // EPSG Guidance Note 7-2 example for Mercator variant B (Pulkovo 1942).
        let krassowsky =
            Ellipsoid::from_inverse_flattening(7024, "Krassowsky 1940", 6_378_245.0, 298.3);
        let proj = Mercator::new_2sp(krassowsky, 51.0_f64.to_radians(), 42.0_f64.to_radians(), 0.0, 0.0);
        assert_relative_eq!(proj.scale_factor(), 0.744_260_894, epsilon = 1e-9);
        let (x, y) = proj
            .forward(53.0_f64.to_radians(), 53.0_f64.to_radians())
            .unwrap();
        assert_relative_eq!(x, 165_704.29, epsilon = 0.01);
        assert_relative_eq!(y, 5_171_848.07, epsilon = 0.01);
    }

    #[test]
    fn test_pole_is_rejected() {
        let proj = Mercator::new_1sp(Ellipsoid::wgs84(), 0.0, 1.0, 0.0, 0.0);
        assert!(proj.forward(0.0, FRAC_PI_2).is_err());
    }
}
