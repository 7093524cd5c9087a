use super::{CoordinatesOperation, CoordinatesOperationPoint, OperationList};

/// Ordered list of steps, every step applied in list order.
#[derive(Debug)]
pub struct ChainedCoordinatesOperation {
    label: String,
    steps: OperationList,
}

impl ChainedCoordinatesOperation {
    pub fn new(steps: OperationList) -> Self {
        let label = steps
            .iter()
            .map(|step| step.name())
            .collect::<Vec<_>>()
            .join(" | ");
        Self { label, steps }
    }

    pub fn steps(&self) -> &OperationList {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl CoordinatesOperation for ChainedCoordinatesOperation {
    fn perform(&self, point: &mut CoordinatesOperationPoint) {
        for step in &self.steps {
            step.perform(point);
        }
    }

    fn name(&self) -> &str {
        &self.label
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::{LongitudeOffset, ScaleOperation};
    use std::sync::Arc;

    #[test]
    fn test_chain_applies_in_order() {
        let chain = ChainedCoordinatesOperation::new(vec![
            Arc::new(LongitudeOffset::new("+1", 1.0)),
            Arc::new(ScaleOperation::new("x10", 10.0)),
        ]);
        let mut point = CoordinatesOperationPoint::new(1.0, 1.0);
        chain.perform(&mut point);
        // (1 + 1) * 10, not 1 * 10 + 1
        assert_eq!(point.x, 20.0);
        assert_eq!(point.y, 10.0);
        assert_eq!(chain.name(), "+1 | x10");
    }

    #[test]
    fn test_nan_flows_through() {
        let chain = ChainedCoordinatesOperation::new(vec![
            Arc::new(ScaleOperation::new("nan", f64::NAN)),
            Arc::new(LongitudeOffset::new("+1", 1.0)),
        ]);
        let mut point = CoordinatesOperationPoint::new(1.0, 1.0);
        chain.perform(&mut point);
        assert!(point.x.is_nan());
        assert!(!point.is_finite());
    }
}
