use md5::{Digest, Md5};
use once_cell::sync::OnceCell;

use super::CrsIdentity;
use crate::cs::{Axis, LinearUnit};
use crate::digest::Md5Digest;

/// Local plane coordinates with no geodetic anchor; only the unit matters.
#[derive(Clone, Debug)]
pub struct EngineeringCrs {
    identity: CrsIdentity,
    unit: LinearUnit,
    digest: OnceCell<Md5Digest>,
}

impl EngineeringCrs {
    pub fn new(id: u32, name: impl Into<String>, unit: LinearUnit) -> Self {
        Self {
            identity: CrsIdentity::new(id, name, Axis::projected()),
            unit,
            digest: OnceCell::new(),
        }
    }

    pub fn unit(&self) -> &LinearUnit {
        &self.unit
    }

    pub fn equals(&self, other: &Self) -> bool {
        self.unit.equals(&other.unit)
    }

    pub fn equals_exact(&self, other: &Self) -> bool {
        self.identity.equals_exact(&other.identity) && self.unit.equals_exact(&other.unit)
    }

    pub fn is_same(&self, other: &Self) -> bool {
        self.unit.is_same(&other.unit)
    }

    pub fn update_digest(&self, hasher: &mut Md5) {
        hasher.update(b"engineering");
        self.unit.update_digest(hasher);
    }
}

crs_common!(EngineeringCrs);
