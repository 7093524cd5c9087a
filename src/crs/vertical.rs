use std::sync::Arc;

use md5::{Digest, Md5};
use once_cell::sync::OnceCell;

use super::CrsIdentity;
use crate::cs::{Axis, LinearUnit, VerticalDatum};
use crate::digest::Md5Digest;

/// Heights above a vertical datum.
#[derive(Clone, Debug)]
pub struct VerticalCrs {
    identity: CrsIdentity,
    datum: Arc<VerticalDatum>,
    unit: LinearUnit,
    digest: OnceCell<Md5Digest>,
}

impl VerticalCrs {
    pub fn new(id: u32, name: impl Into<String>, datum: Arc<VerticalDatum>, unit: LinearUnit) -> Self {
        Self {
            identity: CrsIdentity::new(id, name, Axis::vertical()),
            datum,
            unit,
            digest: OnceCell::new(),
        }
    }

    pub fn datum(&self) -> &Arc<VerticalDatum> {
        &self.datum
    }

    pub fn unit(&self) -> &LinearUnit {
        &self.unit
    }

    pub fn equals(&self, other: &Self) -> bool {
        self.datum.equals(&other.datum) && self.unit.equals(&other.unit)
    }

    pub fn equals_exact(&self, other: &Self) -> bool {
        self.identity.equals_exact(&other.identity)
            && self.datum.equals_exact(&other.datum)
            && self.unit.equals_exact(&other.unit)
    }

    pub fn is_same(&self, other: &Self) -> bool {
        self.datum.is_same(&other.datum) && self.unit.is_same(&other.unit)
    }

    pub fn update_digest(&self, hasher: &mut Md5) {
        hasher.update(b"vertical");
        self.datum.update_digest(hasher);
        self.unit.update_digest(hasher);
    }
}

crs_common!(VerticalCrs);
