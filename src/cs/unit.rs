//! Units of measure and the operation-list builders the resolver uses to
//! convert between them.

use std::f64::consts::PI;
use std::sync::Arc;

use md5::{Digest, Md5};

use super::{is_same_value, normalize_name, Authority};
use crate::digest::digest_f64;
use crate::operation::{OperationList, ScaleOperation};

const RADIANS_PER_DEGREE: f64 = PI / 180.0;

#[derive(Clone, Debug)]
pub struct AngularUnit {
    id: u32,
    name: String,
    /// Radians per unit.
    conversion_factor: f64,
    authority: Option<Authority>,
    deprecated: bool,
}

impl AngularUnit {
    pub fn new(id: u32, name: impl Into<String>, conversion_factor: f64) -> Self {
        Self {
            id,
            name: name.into(),
            conversion_factor,
            authority: (id > 0).then(|| Authority::epsg(id)),
            deprecated: false,
        }
    }

    pub fn degree() -> Self {
        Self::new(9122, "degree", RADIANS_PER_DEGREE)
    }

    pub fn radian() -> Self {
        Self::new(9101, "radian", 1.0)
    }

    pub fn grad() -> Self {
        Self::new(9105, "grad", PI / 200.0)
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

    pub fn conversion_factor(&self) -> f64 {
        self.conversion_factor
    }

    pub fn authority(&self) -> Option<&Authority> {
        self.authority.as_ref()
    }

    pub fn is_deprecated(&self) -> bool {
        self.deprecated
    }

    pub fn is_degree(&self) -> bool {
        is_same_value(self.conversion_factor, RADIANS_PER_DEGREE)
    }

    pub fn is_radian(&self) -> bool {
        is_same_value(self.conversion_factor, 1.0)
    }

    pub fn to_radians(&self, value: f64) -> f64 {
        value * self.conversion_factor
    }

    pub fn from_radians(&self, value: f64) -> f64 {
        value / self.conversion_factor
    }

    pub fn to_degrees(&self, value: f64) -> f64 {
        self.to_radians(value).to_degrees()
    }

    pub fn from_degrees(&self, value: f64) -> f64 {
        self.from_radians(value.to_radians())
    }

    pub fn add_to_degrees(&self, ops: &mut OperationList) {
        if !self.is_degree() {
            let factor = self.conversion_factor / RADIANS_PER_DEGREE;
            ops.push(Arc::new(ScaleOperation::new(format!("{}->degree", self.name), factor)));
        }
    }

    pub fn add_from_degrees(&self, ops: &mut OperationList) {
        if !self.is_degree() {
            let factor = RADIANS_PER_DEGREE / self.conversion_factor;
            ops.push(Arc::new(ScaleOperation::new(format!("degree->{}", self.name), factor)));
        }
    }

    pub fn add_to_radians(&self, ops: &mut OperationList) {
        if !self.is_radian() {
            ops.push(Arc::new(ScaleOperation::new(
                format!("{}->radian", self.name),
                self.conversion_factor,
            )));
        }
    }

    pub fn add_from_radians(&self, ops: &mut OperationList) {
        if !self.is_radian() {
            ops.push(Arc::new(ScaleOperation::new(
                format!("radian->{}", self.name),
                1.0 / self.conversion_factor,
            )));
        }
    }

    /// Direct conversion into `target`, nothing when the factors agree.
    pub fn add_to_unit(&self, target: &AngularUnit, ops: &mut OperationList) {
        if !self.is_same(target) {
            ops.push(Arc::new(ScaleOperation::new(
                format!("{}->{}", self.name, target.name),
                self.conversion_factor / target.conversion_factor,
            )));
        }
    }

    pub fn equals(&self, other: &Self) -> bool {
        self.conversion_factor == other.conversion_factor
            && normalize_name(&self.name) == normalize_name(&other.name)
    }

    pub fn equals_exact(&self, other: &Self) -> bool {
        self.equals(other)
            && self.id == other.id
            && self.name == other.name
            && self.authority == other.authority
            && self.deprecated == other.deprecated
    }

    pub fn is_same(&self, other: &Self) -> bool {
        is_same_value(self.conversion_factor, other.conversion_factor)
    }

    pub fn update_digest(&self, hasher: &mut Md5) {
        hasher.update(b"angular");
        digest_f64(hasher, self.conversion_factor);
    }
}

#[derive(Clone, Debug)]
pub struct LinearUnit {
    id: u32,
    name: String,
    /// Metres per unit.
    conversion_factor: f64,
    authority: Option<Authority>,
    deprecated: bool,
}

impl LinearUnit {
    pub fn new(id: u32, name: impl Into<String>, conversion_factor: f64) -> Self {
        Self {
            id,
            name: name.into(),
            conversion_factor,
            authority: (id > 0).then(|| Authority::epsg(id)),
            deprecated: false,
        }
    }

    pub fn metre() -> Self {
        Self::new(9001, "metre", 1.0)
    }

    pub fn kilometre() -> Self {
        Self::new(9036, "kilometre", 1000.0)
    }

    pub fn foot() -> Self {
        Self::new(9002, "foot", 0.3048)
    }

    pub fn us_survey_foot() -> Self {
        Self::new(9003, "US survey foot", 1200.0 / 3937.0)
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

    pub fn conversion_factor(&self) -> f64 {
        self.conversion_factor
    }

    pub fn authority(&self) -> Option<&Authority> {
        self.authority.as_ref()
    }

    pub fn is_deprecated(&self) -> bool {
        self.deprecated
    }

    pub fn is_metre(&self) -> bool {
        is_same_value(self.conversion_factor, 1.0)
    }

    pub fn to_metres(&self, value: f64) -> f64 {
        value * self.conversion_factor
    }

    pub fn from_metres(&self, value: f64) -> f64 {
        value / self.conversion_factor
    }

    pub fn add_to_metres(&self, ops: &mut OperationList) {
        if !self.is_metre() {
            ops.push(Arc::new(ScaleOperation::new(
                format!("{}->metre", self.name),
                self.conversion_factor,
            )));
        }
    }

    pub fn add_from_metres(&self, ops: &mut OperationList) {
        if !self.is_metre() {
            ops.push(Arc::new(ScaleOperation::new(
                format!("metre->{}", self.name),
                1.0 / self.conversion_factor,
            )));
        }
    }

    /// Direct conversion into `target`, nothing when the factors agree.
    pub fn add_to_unit(&self, target: &LinearUnit, ops: &mut OperationList) {
        if !self.is_same(target) {
            ops.push(Arc::new(ScaleOperation::new(
                format!("{}->{}", self.name, target.name),
                self.conversion_factor / target.conversion_factor,
            )));
        }
    }

    pub fn equals(&self, other: &Self) -> bool {
        self.conversion_factor == other.conversion_factor
            && normalize_name(&self.name) == normalize_name(&other.name)
    }

    pub fn equals_exact(&self, other: &Self) -> bool {
        self.equals(other)
            && self.id == other.id
            && self.name == other.name
            && self.authority == other.authority
            && self.deprecated == other.deprecated
    }

    pub fn is_same(&self, other: &Self) -> bool {
        is_same_value(self.conversion_factor, other.conversion_factor)
    }

    pub fn update_digest(&self, hasher: &mut Md5) {
        hasher.update(b"linear");
        digest_f64(hasher, self.conversion_factor);
    }
}
