use md5::{Digest, Md5};

use super::{is_same_value, normalize_name, Authority};
use crate::digest::digest_f64;

/// Reference meridian, longitude in degrees east of Greenwich.
#[derive(Clone, Debug)]
pub struct PrimeMeridian {
    id: u32,
    name: String,
    longitude: f64,
    authority: Option<Authority>,
    deprecated: bool,
}

impl PrimeMeridian {
    pub fn new(id: u32, name: impl Into<String>, longitude: f64) -> Self {
        Self {
            id,
            name: name.into(),
            longitude,
            authority: (id > 0).then(|| Authority::epsg(id)),
            deprecated: false,
        }
    }

    pub fn greenwich() -> Self {
        Self::new(8901, "Greenwich", 0.0)
    }

    pub fn paris() -> Self {
        Self::new(8903, "Paris", 2.337_229_166_666_667)
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

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn authority(&self) -> Option<&Authority> {
        self.authority.as_ref()
    }

    pub fn is_deprecated(&self) -> bool {
        self.deprecated
    }

    pub fn equals(&self, other: &Self) -> bool {
        self.longitude == other.longitude && normalize_name(&self.name) == normalize_name(&other.name)
    }

    pub fn equals_exact(&self, other: &Self) -> bool {
        self.equals(other)
            && self.id == other.id
            && self.name == other.name
            && self.authority == other.authority
            && self.deprecated == other.deprecated
    }

    pub fn is_same(&self, other: &Self) -> bool {
        is_same_value(self.longitude, other.longitude)
    }

    pub fn update_digest(&self, hasher: &mut Md5) {
        hasher.update(b"primem");
        digest_f64(hasher, self.longitude);
    }
}
