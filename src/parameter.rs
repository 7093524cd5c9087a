//! Projection parameter names and values.
//!
//! Names are matched on their normalized form. A [`MultiParameterName`]
//! groups the historical synonyms of one logical parameter; lookups try each
//! synonym in turn.

use std::collections::{BTreeMap, HashMap};

use md5::{Digest, Md5};
use once_cell::sync::Lazy;

use crate::cs::{is_same_value, normalize_name, AngularUnit, LinearUnit};
use crate::digest::{digest_f64, digest_name};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnitKind {
    Angular,
    Linear,
    Scale,
}

#[derive(Clone, Debug)]
pub struct SingleParameterName {
    id: u32,
    name: String,
    normalized: String,
    unit_kind: Option<UnitKind>,
}

impl SingleParameterName {
    pub fn new(id: u32, name: impl Into<String>, unit_kind: Option<UnitKind>) -> Self {
        let name = name.into();
        let normalized = normalize_name(&name);
        Self {
            id,
            name,
            normalized,
            unit_kind,
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    pub fn unit_kind(&self) -> Option<UnitKind> {
        self.unit_kind
    }
}

impl PartialEq for SingleParameterName {
    fn eq(&self, other: &Self) -> bool {
        self.normalized == other.normalized
    }
}

/// Synonyms for one logical parameter. The first name is canonical.
#[derive(Clone, Debug)]
pub struct MultiParameterName {
    names: Vec<SingleParameterName>,
}

impl MultiParameterName {
    pub fn new(names: Vec<SingleParameterName>) -> Self {
        Self { names }
    }

    pub fn names(&self) -> &[SingleParameterName] {
        &self.names
    }
}

#[derive(Clone, Debug)]
pub enum ParameterName {
    Single(SingleParameterName),
    Multi(MultiParameterName),
}

impl ParameterName {
    pub fn single(id: u32, name: &str, unit_kind: UnitKind) -> Self {
        ParameterName::Single(SingleParameterName::new(id, name, Some(unit_kind)))
    }

    /// Build a synonym group sharing one unit kind.
    pub fn multi(unit_kind: UnitKind, names: &[(u32, &str)]) -> Self {
        ParameterName::Multi(MultiParameterName::new(
            names
                .iter()
                .map(|&(id, name)| SingleParameterName::new(id, name, Some(unit_kind)))
                .collect(),
        ))
    }

    pub fn names(&self) -> &[SingleParameterName] {
        match self {
            ParameterName::Single(name) => std::slice::from_ref(name),
            ParameterName::Multi(multi) => multi.names(),
        }
    }

    /// Canonical name. A synonym group always has at least one entry.
    pub fn primary(&self) -> Option<&SingleParameterName> {
        self.names().first()
    }

    pub fn unit_kind(&self) -> Option<UnitKind> {
        self.primary().and_then(SingleParameterName::unit_kind)
    }

    pub fn matches(&self, name: &str) -> bool {
        let normalized = normalize_name(name);
        self.names().iter().any(|n| n.normalized == normalized)
    }
}

pub static LATITUDE_OF_ORIGIN: Lazy<ParameterName> = Lazy::new(|| {
    ParameterName::multi(
        UnitKind::Angular,
        &[
            (8801, "Latitude_Of_Origin"),
            (8801, "Latitude of natural origin"),
            (8821, "Latitude of false origin"),
            (8811, "Latitude of projection centre"),
            (0, "Latitude_Of_Center"),
        ],
    )
});

pub static CENTRAL_MERIDIAN: Lazy<ParameterName> = Lazy::new(|| {
    ParameterName::multi(
        UnitKind::Angular,
        &[
            (8802, "Central_Meridian"),
            (8802, "Longitude of natural origin"),
            (8822, "Longitude of false origin"),
            (8833, "Longitude of origin"),
            (8812, "Longitude of projection centre"),
            (0, "Longitude_Of_Center"),
        ],
    )
});

pub static STANDARD_PARALLEL_1: Lazy<ParameterName> = Lazy::new(|| {
    ParameterName::multi(
        UnitKind::Angular,
        &[
            (8823, "Standard_Parallel_1"),
            (8823, "Latitude of 1st standard parallel"),
            (8832, "Latitude of standard parallel"),
        ],
    )
});

pub static STANDARD_PARALLEL_2: Lazy<ParameterName> = Lazy::new(|| {
    ParameterName::multi(
        UnitKind::Angular,
        &[
            (8824, "Standard_Parallel_2"),
            (8824, "Latitude of 2nd standard parallel"),
        ],
    )
});

pub static SCALE_FACTOR: Lazy<ParameterName> = Lazy::new(|| {
    ParameterName::multi(
        UnitKind::Scale,
        &[
            (8805, "Scale_Factor"),
            (8805, "Scale factor at natural origin"),
            (8815, "Scale factor on initial line"),
        ],
    )
});

pub static FALSE_EASTING: Lazy<ParameterName> = Lazy::new(|| {
    ParameterName::multi(
        UnitKind::Linear,
        &[(8806, "False_Easting"), (8826, "Easting at false origin")],
    )
});

pub static FALSE_NORTHING: Lazy<ParameterName> = Lazy::new(|| {
    ParameterName::multi(
        UnitKind::Linear,
        &[(8807, "False_Northing"), (8827, "Northing at false origin")],
    )
});

/// Every synonym of the built-in parameters, normalized, to its group.
static KNOWN_PARAMETERS: Lazy<HashMap<String, &'static ParameterName>> = Lazy::new(|| {
    let groups: [&'static ParameterName; 7] = [
        &*LATITUDE_OF_ORIGIN,
        &*CENTRAL_MERIDIAN,
        &*STANDARD_PARALLEL_1,
        &*STANDARD_PARALLEL_2,
        &*SCALE_FACTOR,
        &*FALSE_EASTING,
        &*FALSE_NORTHING,
    ];
    groups
        .into_iter()
        .flat_map(|group| group.names().iter().map(move |n| (n.normalized.clone(), group)))
        .collect()
});

/// The built-in parameter `name` is a synonym of, if any.
pub fn known_parameter(name: &str) -> Option<&'static ParameterName> {
    KNOWN_PARAMETERS.get(&normalize_name(name)).copied()
}

#[derive(Clone, Debug)]
pub enum ParameterUnit {
    Angular(AngularUnit),
    Linear(LinearUnit),
    Scale,
}

/// A value in its original unit, plus the same value in radians, metres or
/// unity so that projections never deal with units.
#[derive(Clone, Debug)]
pub struct ParameterValue {
    value: f64,
    unit: ParameterUnit,
    normalized: f64,
}

impl ParameterValue {
    pub fn angular(value: f64, unit: AngularUnit) -> Self {
        let normalized = unit.to_radians(value);
        Self {
            value,
            unit: ParameterUnit::Angular(unit),
            normalized,
        }
    }

    pub fn degrees(value: f64) -> Self {
        Self::angular(value, AngularUnit::degree())
    }

    pub fn linear(value: f64, unit: LinearUnit) -> Self {
        let normalized = unit.to_metres(value);
        Self {
            value,
            unit: ParameterUnit::Linear(unit),
            normalized,
        }
    }

    pub fn metres(value: f64) -> Self {
        Self::linear(value, LinearUnit::metre())
    }

    pub fn scale(value: f64) -> Self {
        Self {
            value,
            unit: ParameterUnit::Scale,
            normalized: value,
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn unit(&self) -> &ParameterUnit {
        &self.unit
    }

    /// Radians, metres, or the plain value for scale factors.
    pub fn normalized(&self) -> f64 {
        self.normalized
    }

    pub fn equals(&self, other: &Self) -> bool {
        self.value == other.value && self.normalized == other.normalized
    }

    pub fn is_same(&self, other: &Self) -> bool {
        is_same_value(self.normalized, other.normalized)
    }
}

/// Parameter values of one projected CRS, keyed by normalized name.
#[derive(Clone, Debug, Default)]
pub struct ParameterValues {
    values: BTreeMap<String, (SingleParameterName, ParameterValue)>,
}

impl ParameterValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store under the canonical name of `name`.
    pub fn insert(&mut self, name: &ParameterName, value: ParameterValue) {
        if let Some(primary) = name.primary() {
            self.values
                .insert(primary.normalized.clone(), (primary.clone(), value));
        }
    }

    /// Store under a name read from a definition. Synonyms of a built-in
    /// parameter land under its canonical name; other names are kept as is.
    pub fn insert_named(&mut self, name: &str, value: ParameterValue) {
        if let Some(group) = known_parameter(name) {
            self.insert(group, value);
            return;
        }
        let single = SingleParameterName::new(0, name, None);
        self.values
            .insert(single.normalized.clone(), (single, value));
    }

    pub fn with(mut self, name: &ParameterName, value: ParameterValue) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &ParameterName) -> Option<&ParameterValue> {
        name.names()
            .iter()
            .find_map(|n| self.values.get(&n.normalized))
            .map(|(_, value)| value)
    }

    pub fn get_normalized(&self, name: &ParameterName) -> Option<f64> {
        self.get(name).map(ParameterValue::normalized)
    }

    pub fn contains(&self, name: &ParameterName) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SingleParameterName, &ParameterValue)> {
        self.values.values().map(|(name, value)| (name, value))
    }

    pub fn equals(&self, other: &Self) -> bool {
        self.values.len() == other.values.len()
            && self
                .values
                .iter()
                .zip(other.values.iter())
                .all(|((ka, (_, va)), (kb, (_, vb)))| ka == kb && va.equals(vb))
    }

    pub fn is_same(&self, other: &Self) -> bool {
        self.values.len() == other.values.len()
            && self
                .values
                .iter()
                .zip(other.values.iter())
                .all(|((ka, (_, va)), (kb, (_, vb)))| ka == kb && va.is_same(vb))
    }

    pub fn update_digest(&self, hasher: &mut Md5) {
        hasher.update(b"parameters");
        for (key, (_, value)) in &self.values {
            digest_name(hasher, key);
            digest_f64(hasher, value.normalized);
        }
    }
}
