//! Reference ellipsoid and the geodesy formulas that run on it.
//!
//! Angles at the public boundary are degrees unless the method name ends in
//! `_radians`. All formulas work in radians internally.

mod cartesian;
mod corrections;
mod vincenty;

pub use vincenty::{DirectSolution, MAX_ITERATIONS, TOLERANCE};

use md5::{Digest, Md5};

use crate::cs::{is_same_value, normalize_name, Authority};
use crate::digest::digest_f64;
use crate::error::CrsError;

/// Reference ellipsoid.
///
/// Exactly one of semi-minor axis and inverse flattening defines the shape;
/// the other is derived once in the constructor.
#[derive(Clone, Debug)]
pub struct Ellipsoid {
    id: u32,
    name: String,
    /// Semi-major axis (metres)
    a: f64,
    /// Semi-minor axis (metres)
    b: f64,
    /// Inverse flattening, 0 for a sphere
    inverse_flattening: f64,
    /// Flattening (dimensionless)
    f: f64,
    /// First eccentricity
    e: f64,
    /// First eccentricity squared
    e2: f64,
    /// Second eccentricity squared: e² / (1 - e²)
    ep2: f64,
    /// Third flattening: f / (2 - f)
    n: f64,
    authority: Option<Authority>,
    deprecated: bool,
}

impl Ellipsoid {
    /// Build from the semi-major axis and exactly one of semi-minor axis or
    /// inverse flattening.
    pub fn new(
        id: u32,
        name: impl Into<String>,
        semi_major_axis: f64,
        semi_minor_axis: Option<f64>,
        inverse_flattening: Option<f64>,
    ) -> Result<Self, CrsError> {
        let name = name.into();
        if !(semi_major_axis.is_finite() && semi_major_axis > 0.0) {
            return Err(CrsError::InvalidEllipsoid {
                name,
                reason: format!("semi-major axis must be positive, got {semi_major_axis}"),
            });
        }
        match (semi_minor_axis, inverse_flattening) {
            (Some(b), None) => {
                if !(b > 0.0 && b <= semi_major_axis) {
                    return Err(CrsError::InvalidEllipsoid {
                        name,
                        reason: format!("semi-minor axis {b} outside (0, {semi_major_axis}]"),
                    });
                }
                Ok(Self::from_semi_minor_axis(id, name, semi_major_axis, b))
            }
            (None, Some(rf)) => {
                if rf.is_nan() || (rf != 0.0 && rf < 1.0) {
                    return Err(CrsError::InvalidEllipsoid {
                        name,
                        reason: format!("inverse flattening {rf} must be 0 or >= 1"),
                    });
                }
                Ok(Self::from_inverse_flattening(id, name, semi_major_axis, rf))
            }
            (Some(_), Some(_)) => Err(CrsError::InvalidEllipsoid {
                name,
                reason: "both semi-minor axis and inverse flattening supplied".to_string(),
            }),
            (None, None) => Err(CrsError::InvalidEllipsoid {
                name,
                reason: "one of semi-minor axis or inverse flattening is required".to_string(),
            }),
        }
    }

    /// An inverse flattening of 0 (or infinity) describes a sphere.
    pub fn from_inverse_flattening(id: u32, name: impl Into<String>, a: f64, rf: f64) -> Self {
        let f = if rf == 0.0 || rf.is_infinite() { 0.0 } else { 1.0 / rf };
        let rf = if f == 0.0 { 0.0 } else { rf };
        Self::with_shape(id, name.into(), a, a * (1.0 - f), rf, f)
    }

    pub fn from_semi_minor_axis(id: u32, name: impl Into<String>, a: f64, b: f64) -> Self {
        let f = (a - b) / a;
        let rf = if f == 0.0 { 0.0 } else { a / (a - b) };
        Self::with_shape(id, name.into(), a, b, rf, f)
    }

    pub fn sphere(id: u32, name: impl Into<String>, radius: f64) -> Self {
        Self::from_semi_minor_axis(id, name, radius, radius)
    }

    fn with_shape(id: u32, name: String, a: f64, b: f64, inverse_flattening: f64, f: f64) -> Self {
        let e2 = 2.0 * f - f * f;
        Self {
            id,
            name,
            a,
            b,
            inverse_flattening,
            f,
            e: e2.sqrt(),
            e2,
            ep2: e2 / (1.0 - e2),
            n: f / (2.0 - f),
            authority: (id > 0).then(|| Authority::epsg(id)),
            deprecated: false,
        }
    }

    pub fn wgs84() -> Self {
        Self::from_inverse_flattening(7030, "WGS 84", 6_378_137.0, 298.257_223_563)
    }

    pub fn grs80() -> Self {
        Self::from_inverse_flattening(7019, "GRS 1980", 6_378_137.0, 298.257_222_101)
    }

    pub fn clarke_1866() -> Self {
        Self::from_semi_minor_axis(7008, "Clarke 1866", 6_378_206.4, 6_356_583.8)
    }

    pub fn international_1924() -> Self {
        Self::from_inverse_flattening(7022, "International 1924", 6_378_388.0, 297.0)
    }

    pub fn bessel_1841() -> Self {
        Self::from_inverse_flattening(7004, "Bessel 1841", 6_377_397.155, 299.152_812_8)
    }

    pub fn with_authority(mut self, authority: Authority) -> Self {
        self.authority = Some(authority);
        self
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

    pub fn semi_major_axis(&self) -> f64 {
        self.a
    }

    pub fn semi_minor_axis(&self) -> f64 {
        self.b
    }

    pub fn inverse_flattening(&self) -> f64 {
        self.inverse_flattening
    }

    pub fn flattening(&self) -> f64 {
        self.f
    }

    pub fn eccentricity(&self) -> f64 {
        self.e
    }

    pub fn eccentricity_squared(&self) -> f64 {
        self.e2
    }

    pub fn second_eccentricity_squared(&self) -> f64 {
        self.ep2
    }

    pub fn third_flattening(&self) -> f64 {
        self.n
    }

    pub fn is_sphere(&self) -> bool {
        self.f == 0.0
    }

    pub fn equals(&self, other: &Self) -> bool {
        self.a == other.a
            && self.b == other.b
            && normalize_name(&self.name) == normalize_name(&other.name)
    }

    pub fn equals_exact(&self, other: &Self) -> bool {
        self.equals(other)
            && self.id == other.id
            && self.name == other.name
            && self.inverse_flattening == other.inverse_flattening
            && self.authority == other.authority
            && self.deprecated == other.deprecated
    }

    pub fn is_same(&self, other: &Self) -> bool {
        is_same_value(self.a, other.a) && is_same_value(self.b, other.b)
    }

    pub fn update_digest(&self, hasher: &mut Md5) {
        hasher.update(b"ellipsoid");
        digest_f64(hasher, self.a);
        digest_f64(hasher, self.inverse_flattening);
    }
}
