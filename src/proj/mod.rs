pub mod albers_equal_area;
pub mod common;
pub mod equirectangular;
pub mod lambert_conformal;
pub mod mercator;
pub mod pipeline;
pub mod resolver;
pub mod stereographic;
pub mod transverse_mercator;

use std::fmt;

use crate::ellipsoid::Ellipsoid;
use crate::error::ProjError;

pub use resolver::OperationResolver;

/// Trait for map projections supporting forward and inverse transforms.
///
/// Geographic coordinates are radians relative to the prime meridian of the
/// base geographic CRS, projected coordinates are metres.
pub trait Projection: Send + Sync + fmt::Debug {
    /// Forward: (lon_rad, lat_rad) -> (easting, northing)
    fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64), ProjError>;

    /// Inverse: (easting, northing) -> (lon_rad, lat_rad)
    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError>;

    /// False for forward-only projections; the resolver will not build an
    /// operation that needs their inverse.
    fn has_inverse(&self) -> bool {
        true
    }

    fn ellipsoid(&self) -> &Ellipsoid;
}
