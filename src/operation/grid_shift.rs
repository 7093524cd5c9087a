//! Pluggable horizontal shifts between geographic CRS pairs.
//!
//! Shift data providers live outside this crate; they are registered here
//! per ordered (source, target) pair and tried in insertion order.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::trace;

use super::{CoordinatesOperation, CoordinatesOperationPoint};
use crate::crs::{CrsKey, GeographicCrs};

/// A shift that may or may not cover a given point. Coordinates are degrees.
pub trait HorizontalShiftOperation: Send + Sync + fmt::Debug {
    /// Shift `point` in place and return true, or leave it untouched and
    /// return false when the point is outside the shift's coverage.
    fn attempt_shift(&self, point: &mut CoordinatesOperationPoint) -> bool;
}

/// Snapshot of the shifts registered for one pair. The first shift that
/// succeeds wins; when none does the point passes through unchanged.
#[derive(Debug)]
pub struct HorizontalShiftChain {
    label: String,
    shifts: Vec<Arc<dyn HorizontalShiftOperation>>,
}

impl HorizontalShiftChain {
    pub fn new(label: impl Into<String>, shifts: Vec<Arc<dyn HorizontalShiftOperation>>) -> Self {
        Self {
            label: label.into(),
            shifts,
        }
    }

    pub fn len(&self) -> usize {
        self.shifts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shifts.is_empty()
    }
}

impl CoordinatesOperation for HorizontalShiftChain {
    fn perform(&self, point: &mut CoordinatesOperationPoint) {
        for (index, shift) in self.shifts.iter().enumerate() {
            if shift.attempt_shift(point) {
                trace!(chain = %self.label, index, "grid shift applied");
                return;
            }
        }
    }

    fn name(&self) -> &str {
        &self.label
    }
}

pub type CrsPair = (CrsKey, CrsKey);

/// Side table of shifts per ordered geographic pair.
#[derive(Default)]
pub struct GridShiftRegistry {
    shifts: RwLock<HashMap<CrsPair, Vec<Arc<dyn HorizontalShiftOperation>>>>,
}

impl GridShiftRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(
        &self,
        source: &GeographicCrs,
        target: &GeographicCrs,
        shift: Arc<dyn HorizontalShiftOperation>,
    ) -> CrsPair {
        let pair = (source.key(), target.key());
        self.shifts.write().entry(pair).or_default().push(shift);
        pair
    }

    /// Remove one registered shift, matched by identity.
    pub fn remove(
        &self,
        source: &GeographicCrs,
        target: &GeographicCrs,
        shift: &Arc<dyn HorizontalShiftOperation>,
    ) -> Option<CrsPair> {
        let pair = (source.key(), target.key());
        let mut table = self.shifts.write();
        let list = table.get_mut(&pair)?;
        let position = list.iter().position(|s| Arc::ptr_eq(s, shift))?;
        list.remove(position);
        if list.is_empty() {
            table.remove(&pair);
        }
        Some(pair)
    }

    pub fn len(&self, source: &GeographicCrs, target: &GeographicCrs) -> usize {
        self.shifts
            .read()
            .get(&(source.key(), target.key()))
            .map_or(0, Vec::len)
    }

    /// Snapshot the shifts for a pair, None when nothing is registered.
    pub fn chain(&self, source: &GeographicCrs, target: &GeographicCrs) -> Option<HorizontalShiftChain> {
        let table = self.shifts.read();
        let shifts = table.get(&(source.key(), target.key()))?;
        if shifts.is_empty() {
            return None;
        }
        Some(HorizontalShiftChain::new(
            format!("grid shift {} -> {}", source.name(), target.name()),
            shifts.clone(),
        ))
    }
}

impl fmt::Debug for GridShiftRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridShiftRegistry")
            .field("pairs", &self.shifts.read().len())
            .finish()
    }
}
