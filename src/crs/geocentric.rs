use std::sync::Arc;

use md5::{Digest, Md5};
use once_cell::sync::OnceCell;

use super::CrsIdentity;
use crate::cs::{Axis, GeodeticDatum, LinearUnit};
use crate::digest::Md5Digest;

/// Earth-centred cartesian X/Y/Z on a geodetic datum.
#[derive(Clone, Debug)]
pub struct GeocentricCrs {
    identity: CrsIdentity,
    datum: Arc<GeodeticDatum>,
    unit: LinearUnit,
    digest: OnceCell<Md5Digest>,
}

impl GeocentricCrs {
    pub fn new(id: u32, name: impl Into<String>, datum: Arc<GeodeticDatum>, unit: LinearUnit) -> Self {
        Self {
            identity: CrsIdentity::new(id, name, Axis::geocentric()),
            datum,
            unit,
            digest: OnceCell::new(),
        }
    }

    pub fn wgs84() -> Self {
        Self::new(4978, "WGS 84", Arc::new(GeodeticDatum::wgs84()), LinearUnit::metre())
    }

    pub fn datum(&self) -> &Arc<GeodeticDatum> {
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
        hasher.update(b"geocentric");
        self.datum.update_digest(hasher);
        self.unit.update_digest(hasher);
    }
}

crs_common!(GeocentricCrs);
