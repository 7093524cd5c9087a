//! Equidistant Cylindrical (EPSG method 1028), Plate Carrée when the
//! standard parallel is the equator.
//!
//! forward: x = ν₁·cos(φ₁)·(λ - λ₀), y = M(φ) - M(φ₀)
//! inverse: λ = λ₀ + x/(ν₁·cos(φ₁)), φ = footpoint(y + M(φ₀))

use crate::crs::ProjectedCrs;
use crate::ellipsoid::Ellipsoid;
use crate::error::ProjError;
use crate::parameter::{CENTRAL_MERIDIAN, LATITUDE_OF_ORIGIN, STANDARD_PARALLEL_1};
use crate::proj::common::{latitude_from_arc, meridional_arc, ParameterReader};
use crate::proj::Projection;

#[derive(Debug)]
pub struct Equirectangular {
    ellipsoid: Ellipsoid,
    lon0: f64,
    // ν₁·cos φ₁
    parallel_radius: f64,
    m0: f64,
    false_easting: f64,
    false_northing: f64,
}

impl Equirectangular {
    pub fn new(
        ellipsoid: Ellipsoid,
        lon0: f64,
        lat0: f64,
        lat_ts: f64,
        false_easting: f64,
        false_northing: f64,
    ) -> Self {
        let parallel_radius = ellipsoid.prime_vertical_radius(lat_ts) * lat_ts.cos();
        let m0 = meridional_arc(&ellipsoid, lat0);
        Self {
            ellipsoid,
            lon0,
            parallel_radius,
            m0,
            false_easting,
            false_northing,
        }
    }

    pub fn from_crs(crs: &ProjectedCrs) -> Result<Box<dyn Projection>, ProjError> {
        let params = ParameterReader::new(crs);
        let (false_easting, false_northing) = params.false_origin();
        let lat_ts = params.value_or(&STANDARD_PARALLEL_1, 0.0);
        if lat_ts.cos().abs() < 1e-10 {
            return Err(ProjError::InvalidParameter(
                "Equidistant Cylindrical standard parallel at a pole".to_string(),
            ));
        }
        Ok(Box::new(Self::new(
            params.ellipsoid(),
            params.value_or(&CENTRAL_MERIDIAN, 0.0),
            params.value_or(&LATITUDE_OF_ORIGIN, 0.0),
            lat_ts,
            false_easting,
            false_northing,
        )))
    }
}

impl Projection for Equirectangular {
    fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64), ProjError> {
        let x = self.parallel_radius * (lon - self.lon0) + self.false_easting;
        let y = meridional_arc(&self.ellipsoid, lat) - self.m0 + self.false_northing;
        Ok((x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError> {
        let lon = self.lon0 + (x - self.false_easting) / self.parallel_radius;
        let lat = latitude_from_arc(&self.ellipsoid, y - self.false_northing + self.m0);
        Ok((lon, lat))
    }

    fn ellipsoid(&self) -> &Ellipsoid {
        &self.ellipsoid
    }
}
