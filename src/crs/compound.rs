use std::sync::Arc;

use md5::{Digest, Md5};
use once_cell::sync::OnceCell;

use super::{CoordinateSystem, CrsIdentity, GeographicCrs, ProjectedCrs, VerticalCrs};
use crate::digest::Md5Digest;

/// Horizontal component of a compound CRS.
#[derive(Clone, Debug)]
pub enum HorizontalCrs {
    Geographic(Arc<GeographicCrs>),
    Projected(Arc<ProjectedCrs>),
}

impl HorizontalCrs {
    pub fn to_coordinate_system(&self) -> CoordinateSystem {
        match self {
            HorizontalCrs::Geographic(crs) => CoordinateSystem::Geographic(Arc::clone(crs)),
            HorizontalCrs::Projected(crs) => CoordinateSystem::Projected(Arc::clone(crs)),
        }
    }

    fn equals(&self, other: &Self) -> bool {
        match (self, other) {
            (HorizontalCrs::Geographic(a), HorizontalCrs::Geographic(b)) => a.equals(b),
            (HorizontalCrs::Projected(a), HorizontalCrs::Projected(b)) => a.equals(b),
            _ => false,
        }
    }

    fn equals_exact(&self, other: &Self) -> bool {
        match (self, other) {
            (HorizontalCrs::Geographic(a), HorizontalCrs::Geographic(b)) => a.equals_exact(b),
            (HorizontalCrs::Projected(a), HorizontalCrs::Projected(b)) => a.equals_exact(b),
            _ => false,
        }
    }

    fn is_same(&self, other: &Self) -> bool {
        match (self, other) {
            (HorizontalCrs::Geographic(a), HorizontalCrs::Geographic(b)) => a.is_same(b),
            (HorizontalCrs::Projected(a), HorizontalCrs::Projected(b)) => a.is_same(b),
            _ => false,
        }
    }

    fn update_digest(&self, hasher: &mut Md5) {
        match self {
            HorizontalCrs::Geographic(crs) => crs.update_digest(hasher),
            HorizontalCrs::Projected(crs) => crs.update_digest(hasher),
        }
    }
}

/// Horizontal CRS plus heights. Transformations act on the horizontal part.
#[derive(Clone, Debug)]
pub struct CompoundCrs {
    identity: CrsIdentity,
    horizontal: HorizontalCrs,
    vertical: Arc<VerticalCrs>,
    digest: OnceCell<Md5Digest>,
}

impl CompoundCrs {
    /// Axes are the horizontal axes followed by the vertical axis.
    pub fn new(
        id: u32,
        name: impl Into<String>,
        horizontal: HorizontalCrs,
        vertical: Arc<VerticalCrs>,
    ) -> Self {
        let mut axes = match &horizontal {
            HorizontalCrs::Geographic(crs) => crs.axes().to_vec(),
            HorizontalCrs::Projected(crs) => crs.axes().to_vec(),
        };
        axes.extend_from_slice(vertical.axes());
        Self {
            identity: CrsIdentity::new(id, name, axes),
            horizontal,
            vertical,
            digest: OnceCell::new(),
        }
    }

    pub fn horizontal(&self) -> &HorizontalCrs {
        &self.horizontal
    }

    pub fn vertical(&self) -> &Arc<VerticalCrs> {
        &self.vertical
    }

    pub fn equals(&self, other: &Self) -> bool {
        self.horizontal.equals(&other.horizontal) && self.vertical.equals(&other.vertical)
    }

    pub fn equals_exact(&self, other: &Self) -> bool {
        self.identity.equals_exact(&other.identity)
            && self.horizontal.equals_exact(&other.horizontal)
            && self.vertical.equals_exact(&other.vertical)
    }

    pub fn is_same(&self, other: &Self) -> bool {
        self.horizontal.is_same(&other.horizontal) && self.vertical.is_same(&other.vertical)
    }

    pub fn update_digest(&self, hasher: &mut Md5) {
        hasher.update(b"compound");
        self.horizontal.update_digest(hasher);
        self.vertical.update_digest(hasher);
    }
}

crs_common!(CompoundCrs);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cs::{LinearUnit, VerticalDatum};

    fn navd88() -> Arc<VerticalCrs> {
        Arc::new(VerticalCrs::new(
            5703,
            "NAVD88 height",
            Arc::new(VerticalDatum::new(5103, "North American Vertical Datum 1988")),
            LinearUnit::metre(),
        ))
    }

    #[test]
    fn test_axes_concatenate() {
        let compound = CompoundCrs::new(
            5498,
            "NAD83 + NAVD88 height",
            HorizontalCrs::Geographic(Arc::new(GeographicCrs::nad83())),
            navd88(),
        );
        let names: Vec<&str> = compound.axes().iter().map(|a| a.name().name()).collect();
        assert_eq!(names, ["Lon", "Lat", "Gravity-related height"]);
    }

    #[test]
    fn test_horizontal_delegation() {
        let nad83 = Arc::new(GeographicCrs::nad83());
        let compound = CoordinateSystem::from(CompoundCrs::new(
            5498,
            "NAD83 + NAVD88 height",
            HorizontalCrs::Geographic(Arc::clone(&nad83)),
            navd88(),
        ));
        let horizontal = compound.horizontal();
        assert!(horizontal.equals(&CoordinateSystem::Geographic(nad83)));
        assert_ne!(horizontal.key(), compound.key());
    }
}
