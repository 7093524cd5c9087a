use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::debug;

use super::CoordinateSystem;

#[derive(Default)]
struct Entries {
    crs: Vec<CoordinateSystem>,
    by_id: HashMap<u32, usize>,
}

/// In-memory CRS store. Definitions that are physically the same share one
/// entry, so every caller resolving them hits the same operation cache keys.
#[derive(Default)]
pub struct CrsRegistry {
    entries: RwLock<Entries>,
}

impl CrsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `crs`, or return the existing entry it `is_same` as. A positive
    /// id not yet known is recorded as an alias of the existing entry.
    pub fn insert(&self, crs: impl Into<CoordinateSystem>) -> CoordinateSystem {
        let crs = crs.into();
        let id = crs.id();
        let mut entries = self.entries.write();

        if let Some(index) = entries.crs.iter().position(|existing| existing.is_same(&crs)) {
            if id > 0 {
                entries.by_id.entry(id).or_insert(index);
            }
            debug!(id, name = crs.name(), "CRS de-duplicated");
            return entries.crs[index].clone();
        }

        let index = entries.crs.len();
        entries.crs.push(crs.clone());
        if id > 0 {
            entries.by_id.insert(id, index);
        }
        crs
    }

    pub fn get(&self, id: u32) -> Option<CoordinateSystem> {
        let entries = self.entries.read();
        entries.by_id.get(&id).map(|&index| entries.crs[index].clone())
    }

    pub fn find_same(&self, crs: &CoordinateSystem) -> Option<CoordinateSystem> {
        self.entries
            .read()
            .crs
            .iter()
            .find(|existing| existing.is_same(crs))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.read().crs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().crs.is_empty()
    }
}

impl std::fmt::Debug for CrsRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let entries = self.entries.read();
        f.debug_struct("CrsRegistry")
            .field("crs", &entries.crs.len())
            .field("ids", &entries.by_id.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::crs::{GeocentricCrs, GeographicCrs, ProjectedCrs};
    use crate::cs::{AngularUnit, GeodeticDatum, LinearUnit};
    use crate::parameter::{
        ParameterValue, ParameterValues, CENTRAL_MERIDIAN, FALSE_EASTING, FALSE_NORTHING,
        LATITUDE_OF_ORIGIN, SCALE_FACTOR,
    };

    #[test]
    fn test_same_definition_is_shared() {
        let registry = CrsRegistry::new();
        let first = registry.insert(GeographicCrs::wgs84());
        let alias = registry.insert(GeographicCrs::new(
            104_326,
            "WGS 84 (alias)",
            Arc::new(GeodeticDatum::wgs84()),
            AngularUnit::degree(),
        ));
        assert_eq!(registry.len(), 1);
        assert_eq!(alias.id(), 4326);
        assert_eq!(registry.get(104_326).map(|c| c.id()), Some(first.id()));
    }

    #[test]
    fn test_distinct_definitions_kept() {
        let registry = CrsRegistry::new();
        registry.insert(GeographicCrs::wgs84());
        registry.insert(GeographicCrs::nad27());
        registry.insert(GeocentricCrs::wgs84());
        assert_eq!(registry.len(), 3);
        assert!(registry.get(4267).is_some());
        assert!(registry.get(9999).is_none());
        let deprecated = CoordinateSystem::from(GeographicCrs::nad27().with_deprecated(true));
        assert_eq!(registry.find_same(&deprecated).map(|c| c.id()), Some(4267));
    }

    #[test]
    fn test_epsg_parameter_names_share_entry() {
        let canonical = ProjectedCrs::new(
            32618,
            "WGS 84 / UTM zone 18N",
            Arc::new(GeographicCrs::wgs84()),
            "Transverse_Mercator",
            ParameterValues::new()
                .with(&LATITUDE_OF_ORIGIN, ParameterValue::degrees(0.0))
                .with(&CENTRAL_MERIDIAN, ParameterValue::degrees(-75.0))
                .with(&SCALE_FACTOR, ParameterValue::scale(0.9996))
                .with(&FALSE_EASTING, ParameterValue::metres(500_000.0))
                .with(&FALSE_NORTHING, ParameterValue::metres(0.0)),
            LinearUnit::metre(),
        );
        let mut epsg_names = ParameterValues::new();
        epsg_names.insert_named("Latitude of natural origin", ParameterValue::degrees(0.0));
        epsg_names.insert_named("Longitude of natural origin", ParameterValue::degrees(-75.0));
        epsg_names.insert_named("Scale factor at natural origin", ParameterValue::scale(0.9996));
        epsg_names.insert_named("False easting", ParameterValue::metres(500_000.0));
        epsg_names.insert_named("False northing", ParameterValue::metres(0.0));
        let from_definition = ProjectedCrs::new(
            32618,
            "WGS 84 / UTM zone 18N",
            Arc::new(GeographicCrs::wgs84()),
            "Transverse Mercator",
            epsg_names,
            LinearUnit::metre(),
        );

        assert!(canonical.equals(&from_definition));
        assert!(canonical.is_same(&from_definition));
        assert_eq!(canonical.key(), from_definition.key());

        let registry = CrsRegistry::new();
        let first = registry.insert(canonical);
        let second = registry.insert(from_definition);
        assert_eq!(registry.len(), 1);
        match (&first, &second) {
            (CoordinateSystem::Projected(a), CoordinateSystem::Projected(b)) => {
                assert!(Arc::ptr_eq(a, b))
            }
            _ => unreachable!(),
        }
    }
}
