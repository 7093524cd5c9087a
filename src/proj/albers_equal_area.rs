//! Albers Equal Area Conic projection.
//!
//! EPSG method 9822.

use crate::crs::ProjectedCrs;
use crate::ellipsoid::Ellipsoid;
use crate::error::ProjError;
use crate::parameter::{CENTRAL_MERIDIAN, LATITUDE_OF_ORIGIN, STANDARD_PARALLEL_1, STANDARD_PARALLEL_2};
use crate::proj::common::{msfn, qsfn, ParameterReader};
use crate::proj::Projection;

const MAX_Q_ITERATIONS: usize = 15;

#[derive(Debug)]
pub struct AlbersEqualArea {
    ellipsoid: Ellipsoid,
    e: f64,
    lon0: f64,
    /// Cone constant n.
    cone: f64,
    /// C = m₁² + n·q₁.
    c: f64,
    rho0: f64,
    false_easting: f64,
    false_northing: f64,
}

impl AlbersEqualArea {
    pub fn new(
        ellipsoid: Ellipsoid,
        lon0: f64,
        lat0: f64,
        lat1: f64,
        lat2: f64,
        false_easting: f64,
        false_northing: f64,
    ) -> Self {
        let (e, e2) = (ellipsoid.eccentricity(), ellipsoid.eccentricity_squared());
        let (m1, q1) = (msfn(lat1, e2), qsfn(lat1, e));
        let cone = if (lat1 - lat2).abs() > 1e-10 {
            (m1.powi(2) - msfn(lat2, e2).powi(2)) / (qsfn(lat2, e) - q1)
        } else {
            lat1.sin()
        };
        let c = m1.powi(2) + cone * q1;
        let mut projection = Self {
            e,
            lon0,
            cone,
            c,
            rho0: 0.0,
            false_easting,
            false_northing,
            ellipsoid,
        };
        projection.rho0 = projection.rho(qsfn(lat0, e));
        projection
    }

    pub fn from_crs(crs: &ProjectedCrs) -> Result<Box<dyn Projection>, ProjError> {
        let params = ParameterReader::new(crs);
        let (false_easting, false_northing) = params.false_origin();
        let lat1 = params.required(&STANDARD_PARALLEL_1)?;
        let lat2 = params.required(&STANDARD_PARALLEL_2)?;
        if (lat1 + lat2).abs() < 1e-10 {
            return Err(ProjError::InvalidParameter(
                "Albers standard parallels are symmetric about the equator".to_string(),
            ));
        }
        Ok(Box::new(Self::new(
            params.ellipsoid(),
            params.value_or(&CENTRAL_MERIDIAN, 0.0),
            params.value_or(&LATITUDE_OF_ORIGIN, 0.0),
            lat1,
            lat2,
            false_easting,
            false_northing,
        )))
    }

    /// Radius of the parallel with authalic value q.
    fn rho(&self, q: f64) -> f64 {
        self.ellipsoid.semi_major_axis() * (self.c - self.cone * q).abs().sqrt() / self.cone
    }

    /// Latitude whose authalic value is q, by Newton's method.
    fn latitude_from_q(&self, q: f64) -> f64 {
        let one_minus_e2 = 1.0 - self.e * self.e;
        let mut lat = (q / 2.0).clamp(-1.0, 1.0).asin();
        for _ in 0..MAX_Q_ITERATIONS {
            let (sin_lat, cos_lat) = lat.sin_cos();
            let w = 1.0 - (self.e * sin_lat).powi(2);
            let slope = 2.0 * one_minus_e2 * cos_lat / (w * w);
            if slope.abs() < 1e-15 {
                break;
            }
            let step = (q - qsfn(lat, self.e)) / slope;
            lat += step;
            if step.abs() < 1e-12 {
                break;
            }
        }
        lat
    }
}

impl Projection for AlbersEqualArea {
    fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64), ProjError> {
        let rho = self.rho(qsfn(lat, self.e));
        let (sin_theta, cos_theta) = (self.cone * (lon - self.lon0)).sin_cos();
        Ok((
            self.false_easting + rho * sin_theta,
            self.false_northing + self.rho0 - rho * cos_theta,
        ))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError> {
        let sign = self.cone.signum();
        let dx = sign * (x - self.false_easting);
        let dy = sign * (self.rho0 - (y - self.false_northing));

        let scaled = dx.hypot(dy) * self.cone / self.ellipsoid.semi_major_axis();
        let q = (self.c - scaled * scaled) / self.cone;
        Ok((self.lon0 + dx.atan2(dy) / self.cone, self.latitude_from_q(q)))
    }

    fn ellipsoid(&self) -> &Ellipsoid {
        &self.ellipsoid
    }
}
