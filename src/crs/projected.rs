use std::sync::Arc;

use md5::{Digest, Md5};
use once_cell::sync::OnceCell;

use super::{CrsIdentity, GeographicCrs};
use crate::cs::{Axis, LinearUnit};
use crate::digest::{digest_name, Md5Digest};
use crate::error::CrsError;
use crate::method::{self, CoordinateOperationMethod};
use crate::parameter::ParameterValues;
use crate::proj::Projection;

/// A geographic CRS mapped to the plane by a projection method.
#[derive(Clone, Debug)]
pub struct ProjectedCrs {
    identity: CrsIdentity,
    geographic: Arc<GeographicCrs>,
    method: Arc<CoordinateOperationMethod>,
    parameters: ParameterValues,
    unit: LinearUnit,
    projection: OnceCell<Arc<dyn Projection>>,
    digest: OnceCell<Md5Digest>,
}

impl ProjectedCrs {
    /// Resolve `method_name` through the global method registry.
    pub fn new(
        id: u32,
        name: impl Into<String>,
        geographic: Arc<GeographicCrs>,
        method_name: &str,
        parameters: ParameterValues,
        unit: LinearUnit,
    ) -> Self {
        let method = method::registry().get_or_create(method_name, &parameters);
        Self::with_method(id, name, geographic, method, parameters, unit)
    }

    pub fn with_method(
        id: u32,
        name: impl Into<String>,
        geographic: Arc<GeographicCrs>,
        method: Arc<CoordinateOperationMethod>,
        parameters: ParameterValues,
        unit: LinearUnit,
    ) -> Self {
        Self {
            identity: CrsIdentity::new(id, name, Axis::projected()),
            geographic,
            method,
            parameters,
            unit,
            projection: OnceCell::new(),
            digest: OnceCell::new(),
        }
    }

    pub fn geographic(&self) -> &Arc<GeographicCrs> {
        &self.geographic
    }

    pub fn method(&self) -> &Arc<CoordinateOperationMethod> {
        &self.method
    }

    pub fn parameters(&self) -> &ParameterValues {
        &self.parameters
    }

    pub fn unit(&self) -> &LinearUnit {
        &self.unit
    }

    /// The projection for this CRS, built by the method factory on first use
    /// and shared afterwards. Failures are not memoized.
    pub fn projection(&self) -> Result<Arc<dyn Projection>, CrsError> {
        self.projection
            .get_or_try_init(|| self.method.create_projection(self).map(Arc::from))
            .cloned()
    }

    pub fn equals(&self, other: &Self) -> bool {
        self.geographic.equals(&other.geographic)
            && self.method.equals(&other.method)
            && self.parameters.equals(&other.parameters)
            && self.unit.equals(&other.unit)
    }

    pub fn equals_exact(&self, other: &Self) -> bool {
        self.identity.equals_exact(&other.identity)
            && self.geographic.equals_exact(&other.geographic)
            && self.method.equals(&other.method)
            && self.parameters.equals(&other.parameters)
            && self.unit.equals_exact(&other.unit)
    }

    pub fn is_same(&self, other: &Self) -> bool {
        self.geographic.is_same(&other.geographic)
            && self.method.equals(&other.method)
            && self.parameters.is_same(&other.parameters)
            && self.unit.is_same(&other.unit)
    }

    pub fn update_digest(&self, hasher: &mut Md5) {
        hasher.update(b"projected");
        self.geographic.update_digest(hasher);
        digest_name(hasher, self.method.normalized_name());
        self.parameters.update_digest(hasher);
        self.unit.update_digest(hasher);
    }
}

crs_common!(ProjectedCrs);
