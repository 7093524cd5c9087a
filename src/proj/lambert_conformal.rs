//! Lambert Conic Conformal projection, 1SP and 2SP variants.
//!
//! EPSG methods 9801 and 9802.

use crate::crs::ProjectedCrs;
use crate::ellipsoid::Ellipsoid;
use crate::error::ProjError;
use crate::parameter::{CENTRAL_MERIDIAN, LATITUDE_OF_ORIGIN, STANDARD_PARALLEL_1, STANDARD_PARALLEL_2};
use crate::proj::common::{msfn, phi_from_ts, tsfn, ParameterReader};
use crate::proj::Projection;

#[derive(Debug)]
pub struct LambertConformalConic {
    ellipsoid: Ellipsoid,
    e: f64,
    lon0: f64,
    /// Cone constant n.
    cone: f64,
    /// a·F, so that ρ = a·F·tⁿ.
    radius_scale: f64,
    rho0: f64,
    false_easting: f64,
    false_northing: f64,
}

impl LambertConformalConic {
    /// Two standard parallels; lat0 is the latitude of the false origin.
    pub fn new_2sp(
        ellipsoid: Ellipsoid,
        lon0: f64,
        lat0: f64,
        lat1: f64,
        lat2: f64,
        false_easting: f64,
        false_northing: f64,
    ) -> Self {
        let (e, e2) = (ellipsoid.eccentricity(), ellipsoid.eccentricity_squared());
        let (m1, t1) = (msfn(lat1, e2), tsfn(lat1, e));
        let cone = if (lat1 - lat2).abs() > 1e-10 {
            (m1 / msfn(lat2, e2)).ln() / (t1 / tsfn(lat2, e)).ln()
        } else {
            lat1.sin()
        };
        let f = m1 / (cone * t1.powf(cone));
        Self::from_cone(ellipsoid, lon0, lat0, cone, f, false_easting, false_northing)
    }

    /// One standard parallel at the natural origin, scaled by k0.
    pub fn new_1sp(
        ellipsoid: Ellipsoid,
        lon0: f64,
        lat0: f64,
        k0: f64,
        false_easting: f64,
        false_northing: f64,
    ) -> Self {
        let cone = lat0.sin();
        let m0 = msfn(lat0, ellipsoid.eccentricity_squared());
        let t0 = tsfn(lat0, ellipsoid.eccentricity());
        let f = k0 * m0 / (cone * t0.powf(cone));
        Self::from_cone(ellipsoid, lon0, lat0, cone, f, false_easting, false_northing)
    }

    fn from_cone(
        ellipsoid: Ellipsoid,
        lon0: f64,
        lat0: f64,
        cone: f64,
        f: f64,
        false_easting: f64,
        false_northing: f64,
    ) -> Self {
        let e = ellipsoid.eccentricity();
        let radius_scale = ellipsoid.semi_major_axis() * f;
        Self {
            e,
            lon0,
            cone,
            radius_scale,
            rho0: radius_scale * tsfn(lat0, e).powf(cone),
            false_easting,
            false_northing,
            ellipsoid,
        }
    }

    pub fn from_crs_1sp(crs: &ProjectedCrs) -> Result<Box<dyn Projection>, ProjError> {
        let params = ParameterReader::new(crs);
        let (false_easting, false_northing) = params.false_origin();
        let lat0 = params.required(&LATITUDE_OF_ORIGIN)?;
        if lat0.abs() < 1e-10 {
            return Err(ProjError::InvalidParameter(
                "Lambert Conic Conformal 1SP needs a non-equatorial origin".to_string(),
            ));
        }
        Ok(Box::new(Self::new_1sp(
            params.ellipsoid(),
            params.value_or(&CENTRAL_MERIDIAN, 0.0),
            lat0,
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
            params.value_or(&LATITUDE_OF_ORIGIN, 0.0),
            params.required(&STANDARD_PARALLEL_1)?,
            params.required(&STANDARD_PARALLEL_2)?,
            false_easting,
            false_northing,
        )))
    }

    pub fn cone_constant(&self) -> f64 {
        self.cone
    }
}

impl Projection for LambertConformalConic {
    fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64), ProjError> {
        let rho = self.radius_scale * tsfn(lat, self.e).powf(self.cone);
        let (sin_theta, cos_theta) = (self.cone * (lon - self.lon0)).sin_cos();
        Ok((
            self.false_easting + rho * sin_theta,
            self.false_northing + self.rho0 - rho * cos_theta,
        ))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError> {
        // A southern cone (n < 0) is mirrored through the apex so ρ / (a·F)
        // stays positive.
        let sign = self.cone.signum();
        let dx = sign * (x - self.false_easting);
        let dy = sign * (self.rho0 - (y - self.false_northing));

        let t = (sign * dx.hypot(dy) / self.radius_scale).powf(self.cone.recip());
        Ok((self.lon0 + dx.atan2(dy) / self.cone, phi_from_ts(t, self.e)))
    }

    fn ellipsoid(&self) -> &Ellipsoid {
        &self.ellipsoid
    }
}
