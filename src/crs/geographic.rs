use std::sync::Arc;

use md5::{Digest, Md5};
use once_cell::sync::OnceCell;

use super::CrsIdentity;
use crate::cs::{AngularUnit, Axis, GeodeticDatum, PrimeMeridian};
use crate::digest::Md5Digest;
use crate::ellipsoid::Ellipsoid;

/// Longitude/latitude on a geodetic datum.
#[derive(Clone, Debug)]
pub struct GeographicCrs {
    identity: CrsIdentity,
    datum: Arc<GeodeticDatum>,
    unit: AngularUnit,
    digest: OnceCell<Md5Digest>,
}

impl GeographicCrs {
    pub fn new(id: u32, name: impl Into<String>, datum: Arc<GeodeticDatum>, unit: AngularUnit) -> Self {
        Self {
            identity: CrsIdentity::new(id, name, Axis::geographic()),
            datum,
            unit,
            digest: OnceCell::new(),
        }
    }

    pub fn wgs84() -> Self {
        Self::new(4326, "WGS 84", Arc::new(GeodeticDatum::wgs84()), AngularUnit::degree())
    }

    pub fn nad83() -> Self {
        Self::new(4269, "NAD83", Arc::new(GeodeticDatum::nad83()), AngularUnit::degree())
    }

    pub fn nad27() -> Self {
        Self::new(4267, "NAD27", Arc::new(GeodeticDatum::nad27()), AngularUnit::degree())
    }

    pub fn datum(&self) -> &Arc<GeodeticDatum> {
        &self.datum
    }

    pub fn unit(&self) -> &AngularUnit {
        &self.unit
    }

    pub fn ellipsoid(&self) -> &Ellipsoid {
        self.datum.ellipsoid()
    }

    pub fn prime_meridian(&self) -> &PrimeMeridian {
        self.datum.prime_meridian()
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
        hasher.update(b"geographic");
        self.datum.update_digest(hasher);
        self.unit.update_digest(hasher);
    }
}

crs_common!(GeographicCrs);
