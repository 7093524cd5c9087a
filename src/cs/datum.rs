use md5::{Digest, Md5};

use super::{normalize_name, Authority, PrimeMeridian};
use crate::digest::digest_name;
use crate::ellipsoid::Ellipsoid;

/// Horizontal datum: an ellipsoid anchored at a prime meridian.
#[derive(Clone, Debug)]
pub struct GeodeticDatum {
    id: u32,
    name: String,
    ellipsoid: Ellipsoid,
    prime_meridian: PrimeMeridian,
    authority: Option<Authority>,
    deprecated: bool,
}

impl GeodeticDatum {
    pub fn new(
        id: u32,
        name: impl Into<String>,
        ellipsoid: Ellipsoid,
        prime_meridian: PrimeMeridian,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            ellipsoid,
            prime_meridian,
            authority: (id > 0).then(|| Authority::epsg(id)),
            deprecated: false,
        }
    }

    pub fn wgs84() -> Self {
        Self::new(
            6326,
            "World Geodetic System 1984",
            Ellipsoid::wgs84(),
            PrimeMeridian::greenwich(),
        )
    }

    pub fn nad83() -> Self {
        Self::new(
            6269,
            "North American Datum 1983",
            Ellipsoid::grs80(),
            PrimeMeridian::greenwich(),
        )
    }

    pub fn nad27() -> Self {
        Self::new(
            6267,
            "North American Datum 1927",
            Ellipsoid::clarke_1866(),
            PrimeMeridian::greenwich(),
        )
    }

    pub fn with_deprecated(mut self, deprecated: bool) -> Self {
        self.deprecated = deprecated;
        self
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ellipsoid(&self) -> &Ellipsoid {
        &self.ellipsoid
    }

    pub fn prime_meridian(&self) -> &PrimeMeridian {
        &self.prime_meridian
    }

    pub fn authority(&self) -> Option<&Authority> {
        self.authority.as_ref()
    }

    pub fn is_deprecated(&self) -> bool {
        self.deprecated
    }

    pub fn equals(&self, other: &Self) -> bool {
        normalize_name(&self.name) == normalize_name(&other.name)
            && self.ellipsoid.equals(&other.ellipsoid)
            && self.prime_meridian.equals(&other.prime_meridian)
    }

    pub fn equals_exact(&self, other: &Self) -> bool {
        self.id == other.id
            && self.name == other.name
            && self.authority == other.authority
            && self.deprecated == other.deprecated
            && self.ellipsoid.equals_exact(&other.ellipsoid)
            && self.prime_meridian.equals_exact(&other.prime_meridian)
    }

    /// Two datums are the same when their names agree and they realise the
    /// same figure. The name carries the realisation, which the ellipsoid
    /// alone cannot tell apart.
    pub fn is_same(&self, other: &Self) -> bool {
        normalize_name(&self.name) == normalize_name(&other.name)
            && self.ellipsoid.is_same(&other.ellipsoid)
            && self.prime_meridian.is_same(&other.prime_meridian)
    }

    pub fn update_digest(&self, hasher: &mut Md5) {
        hasher.update(b"datum");
        digest_name(hasher, &self.name);
        self.ellipsoid.update_digest(hasher);
        self.prime_meridian.update_digest(hasher);
    }
}

/// Reference surface for heights.
#[derive(Clone, Debug)]
pub struct VerticalDatum {
    id: u32,
    name: String,
    authority: Option<Authority>,
    deprecated: bool,
}

impl VerticalDatum {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            authority: (id > 0).then(|| Authority::epsg(id)),
            deprecated: false,
        }
    }

    pub fn with_deprecated(mut self, deprecated: bool) -> Self {
        self.deprecated = deprecated;
        self
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn authority(&self) -> Option<&Authority> {
        self.authority.as_ref()
    }

    pub fn is_deprecated(&self) -> bool {
        self.deprecated
    }

    pub fn equals(&self, other: &Self) -> bool {
        normalize_name(&self.name) == normalize_name(&other.name)
    }

    pub fn equals_exact(&self, other: &Self) -> bool {
        self.id == other.id
            && self.name == other.name
            && self.authority == other.authority
            && self.deprecated == other.deprecated
    }

    pub fn is_same(&self, other: &Self) -> bool {
        self.equals(other)
    }

    pub fn update_digest(&self, hasher: &mut Md5) {
        hasher.update(b"vdatum");
        digest_name(hasher, &self.name);
    }
}
