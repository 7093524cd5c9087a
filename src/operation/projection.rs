use std::sync::Arc;

use tracing::debug;

use super::{CoordinatesOperation, CoordinatesOperationPoint};
use crate::ellipsoid::Ellipsoid;
use crate::proj::Projection;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProjectionDirection {
    /// Geographic radians to projected metres.
    Forward,
    /// Projected metres to geographic radians.
    Inverse,
}

/// Runs a map projection as an operation step.
///
/// A point the projection rejects comes out as NaN.
#[derive(Debug)]
pub struct ProjectionOperation {
    label: String,
    projection: Arc<dyn Projection>,
    direction: ProjectionDirection,
}

impl ProjectionOperation {
    pub fn new(
        method_name: &str,
        projection: Arc<dyn Projection>,
        direction: ProjectionDirection,
    ) -> Self {
        let label = match direction {
            ProjectionDirection::Forward => method_name.to_string(),
            ProjectionDirection::Inverse => format!("inverse {method_name}"),
        };
        Self {
            label,
            projection,
            direction,
        }
    }

    pub fn direction(&self) -> ProjectionDirection {
        self.direction
    }
}

impl CoordinatesOperation for ProjectionOperation {
    fn perform(&self, point: &mut CoordinatesOperationPoint) {
        let result = match self.direction {
            ProjectionDirection::Forward => self.projection.forward(point.x, point.y),
            ProjectionDirection::Inverse => self.projection.inverse(point.x, point.y),
        };
        match result {
            Ok((x, y)) => {
                point.x = x;
                point.y = y;
            }
            Err(err) => {
                debug!(operation = %self.label, x = point.x, y = point.y, "projection failed: {err}");
                point.x = f64::NAN;
                point.y = f64::NAN;
            }
        }
    }

    fn name(&self) -> &str {
        &self.label
    }
}

/// Geodetic (radians, height in metres) to geocentric Cartesian metres, or back.
#[derive(Debug)]
pub struct GeocentricConversion {
    label: String,
    ellipsoid: Ellipsoid,
    direction: ProjectionDirection,
}

impl GeocentricConversion {
    pub fn new(ellipsoid: Ellipsoid, direction: ProjectionDirection) -> Self {
        let label = match direction {
            ProjectionDirection::Forward => format!("{} geodetic->geocentric", ellipsoid.name()),
            ProjectionDirection::Inverse => format!("{} geocentric->geodetic", ellipsoid.name()),
        };
        Self {
            label,
            ellipsoid,
            direction,
        }
    }
}

impl CoordinatesOperation for GeocentricConversion {
    fn perform(&self, point: &mut CoordinatesOperationPoint) {
        match self.direction {
            ProjectionDirection::Forward => {
                let [x, y, z] = self.ellipsoid.to_cartesian_radians(point.x, point.y, point.z);
                *point = CoordinatesOperationPoint::with_z(x, y, z);
            }
            ProjectionDirection::Inverse => {
                let (lon, lat, h) = self.ellipsoid.to_geodetic_radians(point.x, point.y, point.z);
                *point = CoordinatesOperationPoint::with_z(lon, lat, h);
            }
        }
    }

    fn name(&self) -> &str {
        &self.label
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProjError;
    use approx::assert_relative_eq;

    #[derive(Debug)]
    struct Rejecting(Ellipsoid);

    impl Projection for Rejecting {
        fn forward(&self, _lon: f64, _lat: f64) -> Result<(f64, f64), ProjError> {
            Err(ProjError::TransformFailed("outside domain".to_string()))
        }

        fn inverse(&self, _x: f64, _y: f64) -> Result<(f64, f64), ProjError> {
            Err(ProjError::TransformFailed("outside domain".to_string()))
        }

        fn ellipsoid(&self) -> &Ellipsoid {
            &self.0
        }
    }

    #[test]
    fn test_failed_projection_writes_nan() {
        let op = ProjectionOperation::new(
            "rejecting",
            Arc::new(Rejecting(Ellipsoid::wgs84())),
            ProjectionDirection::Forward,
        );
        let mut point = CoordinatesOperationPoint::new(0.1, 0.2);
        op.perform(&mut point);
        assert!(point.x.is_nan() && point.y.is_nan());
    }

    #[test]
    fn test_inverse_label() {
        let op = ProjectionOperation::new(
            "rejecting",
            Arc::new(Rejecting(Ellipsoid::wgs84())),
            ProjectionDirection::Inverse,
        );
        assert_eq!(op.name(), "inverse rejecting");
    }

    #[test]
    fn test_geocentric_round_trip() {
        let forward = GeocentricConversion::new(Ellipsoid::wgs84(), ProjectionDirection::Forward);
        let inverse = GeocentricConversion::new(Ellipsoid::wgs84(), ProjectionDirection::Inverse);
        let start = CoordinatesOperationPoint::with_z(0.3, 0.8, 250.0);
        let mut point = start;
        forward.perform(&mut point);
        assert!(point.x > 1_000_000.0);
        inverse.perform(&mut point);
        assert_relative_eq!(point.x, start.x, epsilon = 1e-12);
        assert_relative_eq!(point.y, start.y, epsilon = 1e-12);
        assert_relative_eq!(point.z, start.z, epsilon = 1e-4);
    }
}
