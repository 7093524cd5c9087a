//! Coordinate reference systems and the operations between them.
//!
//! Build CRS values from [`crs`], then ask an [`OperationResolver`] for the
//! [`Operation`] that moves points from one to the other. Resolved
//! operations are cached per (source, target) and invalidated when a
//! grid shift between the affected geographic CRS changes.

pub mod config;
pub mod crs;
pub mod cs;
pub mod digest;
pub mod ellipsoid;
pub mod error;
pub mod method;
pub mod operation;
pub mod parameter;
pub mod proj;

pub use config::ResolverConfig;
pub use crs::{
    CompoundCrs, CoordinateSystem, CoordinateSystemType, CrsKey, CrsRegistry, EngineeringCrs,
    GeocentricCrs, GeographicCrs, HorizontalCrs, ProjectedCrs, VerticalCrs,
};
pub use ellipsoid::Ellipsoid;
pub use error::{CrsError, GeodesyError, ProjError};
pub use method::CoordinateOperationMethod;
pub use operation::{CoordinatesOperation, CoordinatesOperationPoint, Operation};
pub use parameter::{ParameterValue, ParameterValues};
pub use proj::{OperationResolver, Projection};
