//! Composable coordinate operations.
//!
//! An operation mutates a point in place. The resolver flattens the steps it
//! builds into an [`Operation`]: nothing, a single step, or a chain.

mod chain;
pub mod grid_shift;
mod projection;

use std::fmt;
use std::sync::Arc;

pub use chain::ChainedCoordinatesOperation;
pub use grid_shift::{GridShiftRegistry, HorizontalShiftChain, HorizontalShiftOperation};
pub use projection::{GeocentricConversion, ProjectionDirection, ProjectionOperation};

/// A mutable coordinate tuple. Units depend on the step being applied.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CoordinatesOperationPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl CoordinatesOperationPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, z: 0.0 }
    }

    pub fn with_z(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// A single transformation step.
pub trait CoordinatesOperation: Send + Sync + fmt::Debug {
    fn perform(&self, point: &mut CoordinatesOperationPoint);

    /// Short label used in logs.
    fn name(&self) -> &str;
}

pub type OperationList = Vec<Arc<dyn CoordinatesOperation>>;

/// Multiply x and y, and z for geocentric coordinates, by a constant factor.
#[derive(Clone, Debug)]
pub struct ScaleOperation {
    label: String,
    factor: f64,
    scale_z: bool,
}

impl ScaleOperation {
    pub fn new(label: impl Into<String>, factor: f64) -> Self {
        Self {
            label: label.into(),
            factor,
            scale_z: false,
        }
    }

    /// Scale all three components.
    pub fn xyz(label: impl Into<String>, factor: f64) -> Self {
        Self {
            label: label.into(),
            factor,
            scale_z: true,
        }
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }
}

impl CoordinatesOperation for ScaleOperation {
    fn perform(&self, point: &mut CoordinatesOperationPoint) {
        point.x *= self.factor;
        point.y *= self.factor;
        if self.scale_z {
            point.z *= self.factor;
        }
    }

    fn name(&self) -> &str {
        &self.label
    }
}

/// Add a constant to the longitude (x). Used for prime meridian changes.
#[derive(Clone, Debug)]
pub struct LongitudeOffset {
    label: String,
    offset: f64,
}

impl LongitudeOffset {
    pub fn new(label: impl Into<String>, offset: f64) -> Self {
        Self {
            label: label.into(),
            offset,
        }
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }
}

impl CoordinatesOperation for LongitudeOffset {
    fn perform(&self, point: &mut CoordinatesOperationPoint) {
        point.x += self.offset;
    }

    fn name(&self) -> &str {
        &self.label
    }
}

/// Resolved operation between two CRS.
///
/// `Identity` is also what the resolver caches for "no operation", so a
/// repeated lookup of an unsupported pair does not rebuild anything.
#[derive(Clone, Debug)]
pub enum Operation {
    Identity,
    Step(Arc<dyn CoordinatesOperation>),
    Chain(Arc<ChainedCoordinatesOperation>),
}

impl Operation {
    /// Flatten a step list: empty is `Identity`, one step stays a step.
    pub fn from_steps(mut steps: OperationList) -> Self {
        match steps.len() {
            0 => Operation::Identity,
            1 => match steps.pop() {
                Some(step) => Operation::Step(step),
                None => Operation::Identity,
            },
            _ => Operation::Chain(Arc::new(ChainedCoordinatesOperation::new(steps))),
        }
    }

    pub fn perform(&self, point: &mut CoordinatesOperationPoint) {
        match self {
            Operation::Identity => {}
            Operation::Step(step) => step.perform(point),
            Operation::Chain(chain) => chain.perform(point),
        }
    }

    pub fn perform_all(&self, points: &mut [CoordinatesOperationPoint]) {
        if self.is_identity() {
            return;
        }
        for point in points.iter_mut() {
            self.perform(point);
        }
    }

    pub fn is_identity(&self) -> bool {
        matches!(self, Operation::Identity)
    }

    /// Number of atomic steps.
    pub fn step_count(&self) -> usize {
        match self {
            Operation::Identity => 0,
            Operation::Step(_) => 1,
            Operation::Chain(chain) => chain.len(),
        }
    }

    /// True when both handles point at the same built operation.
    pub fn ptr_eq(&self, other: &Operation) -> bool {
        match (self, other) {
            (Operation::Identity, Operation::Identity) => true,
            (Operation::Step(a), Operation::Step(b)) => Arc::ptr_eq(a, b),
            (Operation::Chain(a), Operation::Chain(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn scale(factor: f64) -> Arc<dyn CoordinatesOperation> {
        Arc::new(ScaleOperation::new(format!("x{factor}"), factor))
    }

    #[test]
    fn test_from_steps_flattens() {
        assert!(Operation::from_steps(Vec::new()).is_identity());
        assert!(matches!(Operation::from_steps(vec![scale(2.0)]), Operation::Step(_)));
        let chain = Operation::from_steps(vec![scale(2.0), scale(3.0)]);
        assert!(matches!(chain, Operation::Chain(_)));
        assert_eq!(chain.step_count(), 2);
    }

    #[test]
    fn test_identity_is_idempotent() {
        let mut point = CoordinatesOperationPoint::with_z(1.5, -2.5, 10.0);
        Operation::Identity.perform(&mut point);
        Operation::Identity.perform(&mut point);
        assert_eq!(point, CoordinatesOperationPoint::with_z(1.5, -2.5, 10.0));
    }

    #[test]
    fn test_scale_leaves_z() {
        let mut point = CoordinatesOperationPoint::with_z(2.0, 4.0, 7.0);
        ScaleOperation::new("half", 0.5).perform(&mut point);
        assert_eq!(point, CoordinatesOperationPoint::with_z(1.0, 2.0, 7.0));
        ScaleOperation::xyz("double", 2.0).perform(&mut point);
        assert_eq!(point, CoordinatesOperationPoint::with_z(2.0, 4.0, 14.0));
    }

    #[test]
    fn test_longitude_offset() {
        let mut point = CoordinatesOperationPoint::new(0.0, 48.8);
        LongitudeOffset::new("paris->greenwich", 2.337_229_166_666_667).perform(&mut point);
        assert_relative_eq!(point.x, 2.337_229_166_666_667);
        assert_relative_eq!(point.y, 48.8);
    }

    #[test]
    fn test_perform_all() {
        let op = Operation::from_steps(vec![scale(10.0), scale(0.5)]);
        let mut points = vec![
            CoordinatesOperationPoint::new(1.0, 2.0),
            CoordinatesOperationPoint::new(-3.0, 4.0),
        ];
        op.perform_all(&mut points);
        assert_relative_eq!(points[0].x, 5.0);
        assert_relative_eq!(points[1].y, 20.0);
    }

    #[test]
    fn test_ptr_eq() {
        let op = Operation::from_steps(vec![scale(2.0), scale(3.0)]);
        let shared = op.clone();
        let rebuilt = Operation::from_steps(vec![scale(2.0), scale(3.0)]);
        assert!(op.ptr_eq(&shared));
        assert!(!op.ptr_eq(&rebuilt));
        assert!(Operation::Identity.ptr_eq(&Operation::Identity));
    }
}
