//! Coordinate reference system model.
//!
//! Every CRS variant carries a [`CrsIdentity`] header and three comparison
//! levels:
//!
//! - `equals`: same defining quantities (datum, units, method, parameters),
//!   metadata ignored
//! - `equals_exact`: `equals` plus id, name, authority, area, axes and the
//!   deprecated flag
//! - `is_same`: physical equivalence within tolerance, used to de-duplicate
//!   registry entries
//!
//! [`CoordinateSystem`] is the closed set of variants the resolver
//! dispatches on.

use std::fmt;
use std::sync::Arc;

use md5::{Digest, Md5};

use crate::cs::{Area, Authority, Axis};
use crate::digest::{finish, Md5Digest};

pub use compound::{CompoundCrs, HorizontalCrs};
pub use engineering::EngineeringCrs;
pub use geocentric::GeocentricCrs;
pub use geographic::GeographicCrs;
pub use projected::ProjectedCrs;
pub use registry::CrsRegistry;
pub use vertical::VerticalCrs;

/// Metadata shared by every CRS.
#[derive(Clone, Debug)]
pub struct CrsIdentity {
    id: u32,
    name: String,
    axes: Vec<Axis>,
    area: Option<Area>,
    authority: Option<Authority>,
    deprecated: bool,
}

impl CrsIdentity {
    /// An EPSG authority is derived for positive ids.
    pub fn new(id: u32, name: impl Into<String>, axes: Vec<Axis>) -> Self {
        Self {
            id,
            name: name.into(),
            axes,
            area: None,
            authority: (id > 0).then(|| Authority::epsg(id)),
            deprecated: false,
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn axes(&self) -> &[Axis] {
        &self.axes
    }

    pub fn area(&self) -> Option<&Area> {
        self.area.as_ref()
    }

    pub fn authority(&self) -> Option<&Authority> {
        self.authority.as_ref()
    }

    pub fn is_deprecated(&self) -> bool {
        self.deprecated
    }

    pub fn equals_exact(&self, other: &Self) -> bool {
        self.id == other.id
            && self.name == other.name
            && self.axes == other.axes
            && self.area == other.area
            && self.authority == other.authority
            && self.deprecated == other.deprecated
    }
}

/// Cache key of a CRS: its id plus the digest of its defining quantities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CrsKey {
    pub id: u32,
    pub digest: Md5Digest,
}

/// `id:hex-digest`, as printed in logs.
impl fmt::Display for CrsKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.id, hex::encode(self.digest))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CoordinateSystemType {
    Geographic,
    Projected,
    Geocentric,
    Vertical,
    Engineering,
    Compound,
}

impl fmt::Display for CoordinateSystemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CoordinateSystemType::Geographic => "geographic",
            CoordinateSystemType::Projected => "projected",
            CoordinateSystemType::Geocentric => "geocentric",
            CoordinateSystemType::Vertical => "vertical",
            CoordinateSystemType::Engineering => "engineering",
            CoordinateSystemType::Compound => "compound",
        };
        f.write_str(name)
    }
}

/// Identity accessors, builders and digest-derived keys shared by the CRS
/// structs. Each struct has `identity` and `digest` fields and an inherent
/// `update_digest`.
macro_rules! crs_common {
    ($crs:ty) => {
        impl $crs {
            pub fn identity(&self) -> &$crate::crs::CrsIdentity {
                &self.identity
            }

            pub fn id(&self) -> u32 {
                self.identity.id()
            }

            pub fn name(&self) -> &str {
                self.identity.name()
            }

            pub fn axes(&self) -> &[$crate::cs::Axis] {
                self.identity.axes()
            }

            pub fn area(&self) -> Option<&$crate::cs::Area> {
                self.identity.area()
            }

            pub fn authority(&self) -> Option<&$crate::cs::Authority> {
                self.identity.authority()
            }

            pub fn is_deprecated(&self) -> bool {
                self.identity.is_deprecated()
            }

            pub fn with_area(mut self, area: $crate::cs::Area) -> Self {
                self.identity.area = Some(area);
                self
            }

            pub fn with_authority(mut self, authority: $crate::cs::Authority) -> Self {
                self.identity.authority = Some(authority);
                self
            }

            pub fn with_axes(mut self, axes: Vec<$crate::cs::Axis>) -> Self {
                self.identity.axes = axes;
                self
            }

            pub fn with_deprecated(mut self, deprecated: bool) -> Self {
                self.identity.deprecated = deprecated;
                self
            }

            /// Rounded MD5 of the defining quantities, computed once.
            pub fn md5_digest(&self) -> $crate::digest::Md5Digest {
                *self.digest.get_or_init(|| {
                    let mut hasher = <::md5::Md5 as ::md5::Digest>::new();
                    self.update_digest(&mut hasher);
                    $crate::digest::finish(hasher)
                })
            }

            pub fn key(&self) -> $crate::crs::CrsKey {
                $crate::crs::CrsKey {
                    id: self.identity.id(),
                    digest: self.md5_digest(),
                }
            }
        }
    };
}

mod compound;
mod engineering;
mod geocentric;
mod geographic;
mod projected;
mod registry;
mod vertical;

/// Any CRS, shared by `Arc`. Cloning is shallow.
#[derive(Clone, Debug)]
pub enum CoordinateSystem {
    Geographic(Arc<GeographicCrs>),
    Projected(Arc<ProjectedCrs>),
    Geocentric(Arc<GeocentricCrs>),
    Vertical(Arc<VerticalCrs>),
    Engineering(Arc<EngineeringCrs>),
    Compound(Arc<CompoundCrs>),
}

impl CoordinateSystem {
    pub fn crs_type(&self) -> CoordinateSystemType {
        match self {
            CoordinateSystem::Geographic(_) => CoordinateSystemType::Geographic,
            CoordinateSystem::Projected(_) => CoordinateSystemType::Projected,
            CoordinateSystem::Geocentric(_) => CoordinateSystemType::Geocentric,
            CoordinateSystem::Vertical(_) => CoordinateSystemType::Vertical,
            CoordinateSystem::Engineering(_) => CoordinateSystemType::Engineering,
            CoordinateSystem::Compound(_) => CoordinateSystemType::Compound,
        }
    }

    pub fn identity(&self) -> &CrsIdentity {
        match self {
            CoordinateSystem::Geographic(crs) => crs.identity(),
            CoordinateSystem::Projected(crs) => crs.identity(),
            CoordinateSystem::Geocentric(crs) => crs.identity(),
            CoordinateSystem::Vertical(crs) => crs.identity(),
            CoordinateSystem::Engineering(crs) => crs.identity(),
            CoordinateSystem::Compound(crs) => crs.identity(),
        }
    }

    pub fn id(&self) -> u32 {
        self.identity().id()
    }

    pub fn name(&self) -> &str {
        self.identity().name()
    }

    pub fn equals(&self, other: &Self) -> bool {
        match (self, other) {
            (CoordinateSystem::Geographic(a), CoordinateSystem::Geographic(b)) => a.equals(b),
            (CoordinateSystem::Projected(a), CoordinateSystem::Projected(b)) => a.equals(b),
            (CoordinateSystem::Geocentric(a), CoordinateSystem::Geocentric(b)) => a.equals(b),
            (CoordinateSystem::Vertical(a), CoordinateSystem::Vertical(b)) => a.equals(b),
            (CoordinateSystem::Engineering(a), CoordinateSystem::Engineering(b)) => a.equals(b),
            (CoordinateSystem::Compound(a), CoordinateSystem::Compound(b)) => a.equals(b),
            _ => false,
        }
    }

    pub fn equals_exact(&self, other: &Self) -> bool {
        match (self, other) {
            (CoordinateSystem::Geographic(a), CoordinateSystem::Geographic(b)) => a.equals_exact(b),
            (CoordinateSystem::Projected(a), CoordinateSystem::Projected(b)) => a.equals_exact(b),
            (CoordinateSystem::Geocentric(a), CoordinateSystem::Geocentric(b)) => a.equals_exact(b),
            (CoordinateSystem::Vertical(a), CoordinateSystem::Vertical(b)) => a.equals_exact(b),
            (CoordinateSystem::Engineering(a), CoordinateSystem::Engineering(b)) => {
                a.equals_exact(b)
            }
            (CoordinateSystem::Compound(a), CoordinateSystem::Compound(b)) => a.equals_exact(b),
            _ => false,
        }
    }

    pub fn is_same(&self, other: &Self) -> bool {
        match (self, other) {
            (CoordinateSystem::Geographic(a), CoordinateSystem::Geographic(b)) => a.is_same(b),
            (CoordinateSystem::Projected(a), CoordinateSystem::Projected(b)) => a.is_same(b),
            (CoordinateSystem::Geocentric(a), CoordinateSystem::Geocentric(b)) => a.is_same(b),
            (CoordinateSystem::Vertical(a), CoordinateSystem::Vertical(b)) => a.is_same(b),
            (CoordinateSystem::Engineering(a), CoordinateSystem::Engineering(b)) => a.is_same(b),
            (CoordinateSystem::Compound(a), CoordinateSystem::Compound(b)) => a.is_same(b),
            _ => false,
        }
    }

    pub fn update_digest(&self, hasher: &mut Md5) {
        match self {
            CoordinateSystem::Geographic(crs) => crs.update_digest(hasher),
            CoordinateSystem::Projected(crs) => crs.update_digest(hasher),
            CoordinateSystem::Geocentric(crs) => crs.update_digest(hasher),
            CoordinateSystem::Vertical(crs) => crs.update_digest(hasher),
            CoordinateSystem::Engineering(crs) => crs.update_digest(hasher),
            CoordinateSystem::Compound(crs) => crs.update_digest(hasher),
        }
    }

    pub fn md5_digest(&self) -> Md5Digest {
        let mut hasher = Md5::new();
        self.update_digest(&mut hasher);
        finish(hasher)
    }

    pub fn key(&self) -> CrsKey {
        match self {
            CoordinateSystem::Geographic(crs) => crs.key(),
            CoordinateSystem::Projected(crs) => crs.key(),
            CoordinateSystem::Geocentric(crs) => crs.key(),
            CoordinateSystem::Vertical(crs) => crs.key(),
            CoordinateSystem::Engineering(crs) => crs.key(),
            CoordinateSystem::Compound(crs) => crs.key(),
        }
    }

    /// The horizontal part of a compound CRS, any other CRS unchanged.
    pub fn horizontal(&self) -> CoordinateSystem {
        match self {
            CoordinateSystem::Compound(crs) => crs.horizontal().to_coordinate_system(),
            other => other.clone(),
        }
    }
}

macro_rules! from_crs {
    ($variant:ident, $crs:ty) => {
        impl From<Arc<$crs>> for CoordinateSystem {
            fn from(crs: Arc<$crs>) -> Self {
                CoordinateSystem::$variant(crs)
            }
        }

        impl From<$crs> for CoordinateSystem {
            fn from(crs: $crs) -> Self {
                CoordinateSystem::$variant(Arc::new(crs))
            }
        }
    };
}

from_crs!(Geographic, GeographicCrs);
from_crs!(Projected, ProjectedCrs);
from_crs!(Geocentric, GeocentricCrs);
from_crs!(Vertical, VerticalCrs);
from_crs!(Engineering, EngineeringCrs);
from_crs!(Compound, CompoundCrs);
