//! Operation resolution with a per-pair cache.
//!
//! Lookups take the cache read lock only. A miss builds the pipeline with no
//! lock held, then inserts under the write lock unless another thread got
//! there first, in which case that thread's operation is returned so every
//! caller shares one instance.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, trace, warn};

use crate::config::ResolverConfig;
use crate::crs::{CoordinateSystem, CrsKey, GeographicCrs};
use crate::error::CrsError;
use crate::operation::grid_shift::CrsPair;
use crate::operation::{GridShiftRegistry, HorizontalShiftOperation, Operation};
use crate::proj::pipeline::PipelineBuilder;

struct CacheEntry {
    operation: Operation,
    grid_pair: Option<CrsPair>,
}

pub struct OperationResolver {
    config: ResolverConfig,
    cache: RwLock<HashMap<(CrsKey, CrsKey), CacheEntry>>,
    grid_shifts: GridShiftRegistry,
    // Bumped on every grid change; a build that straddles a change is not cached.
    generation: AtomicU64,
}

impl OperationResolver {
    pub fn new(config: ResolverConfig) -> Self {
        Self {
            config,
            cache: RwLock::new(HashMap::new()),
            grid_shifts: GridShiftRegistry::new(),
            generation: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Operation turning `source` coordinates into `target` coordinates.
    ///
    /// `None` when the two CRS are equal, when no step is needed, or when no
    /// operation can be built. Build failures are logged; in strict mode
    /// they are also returned by [`try_get_coordinates_operation`].
    ///
    /// [`try_get_coordinates_operation`]: Self::try_get_coordinates_operation
    pub fn get_coordinates_operation(
        &self,
        source: &CoordinateSystem,
        target: &CoordinateSystem,
    ) -> Option<Operation> {
        self.try_get_coordinates_operation(source, target)
            .unwrap_or_else(|err| {
                warn!(source = source.name(), target = target.name(), "no coordinate operation: {err}");
                None
            })
    }

    pub fn try_get_coordinates_operation(
        &self,
        source: &CoordinateSystem,
        target: &CoordinateSystem,
    ) -> Result<Option<Operation>, CrsError> {
        let source = source.horizontal();
        let target = target.horizontal();
        if source.equals(&target) {
            return Ok(None);
        }

        let key = (source.key(), target.key());
        if let Some(entry) = self.cache.read().get(&key) {
            trace!(source = source.name(), target = target.name(), "operation cache hit");
            return Ok(non_identity(&entry.operation));
        }

        let generation = self.generation.load(Ordering::Acquire);
        let entry = match PipelineBuilder::new(&self.grid_shifts).build(&source, &target) {
            Ok(pipeline) => CacheEntry {
                operation: Operation::from_steps(pipeline.steps),
                grid_pair: pipeline.grid_pair,
            },
            Err(err) if self.config.strict => return Err(err),
            Err(err) => {
                warn!(
                    source = source.name(),
                    target = target.name(),
                    "no coordinate operation, caching identity: {err}"
                );
                CacheEntry {
                    operation: Operation::Identity,
                    grid_pair: None,
                }
            }
        };

        debug!(
            source = %key.0,
            target = %key.1,
            steps = entry.operation.step_count(),
            "operation built"
        );
        let operation = self.insert(key, entry, generation);
        debug!(
            source = source.name(),
            target = target.name(),
            steps = operation.step_count(),
            "operation resolved"
        );
        Ok(non_identity(&operation))
    }

    fn insert(&self, key: (CrsKey, CrsKey), entry: CacheEntry, generation: u64) -> Operation {
        let mut cache = self.cache.write();
        if let Some(existing) = cache.get(&key) {
            return existing.operation.clone();
        }
        if self.generation.load(Ordering::Acquire) != generation {
            return entry.operation;
        }
        let operation = entry.operation.clone();
        cache.insert(key, entry);
        operation
    }

    /// Register a shift for the ordered pair and drop cached operations that
    /// went through that pair.
    pub fn add_grid_shift(
        &self,
        source: &GeographicCrs,
        target: &GeographicCrs,
        shift: Arc<dyn HorizontalShiftOperation>,
    ) {
        let pair = self.grid_shifts.add(source, target, shift);
        self.invalidate(pair);
    }

    /// Returns false when `shift` was not registered for the pair.
    pub fn remove_grid_shift(
        &self,
        source: &GeographicCrs,
        target: &GeographicCrs,
        shift: &Arc<dyn HorizontalShiftOperation>,
    ) -> bool {
        match self.grid_shifts.remove(source, target, shift) {
            Some(pair) => {
                self.invalidate(pair);
                true
            }
            None => false,
        }
    }

    pub fn grid_shift_count(&self, source: &GeographicCrs, target: &GeographicCrs) -> usize {
        self.grid_shifts.len(source, target)
    }

    fn invalidate(&self, pair: CrsPair) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        let mut cache = self.cache.write();
        let before = cache.len();
        cache.retain(|_, entry| entry.grid_pair != Some(pair));
        debug!(dropped = before - cache.len(), "grid shifts changed, cache invalidated");
    }

    pub fn cached_len(&self) -> usize {
        self.cache.read().len()
    }

    pub fn clear_cache(&self) {
        self.cache.write().clear();
    }
}

impl Default for OperationResolver {
    fn default() -> Self {
        Self::new(ResolverConfig::default())
    }
}

impl fmt::Debug for OperationResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationResolver")
            .field("config", &self.config)
            .field("cached", &self.cache.read().len())
            .field("grid_shifts", &self.grid_shifts)
            .finish()
    }
}

fn non_identity(operation: &Operation) -> Option<Operation> {
    (!operation.is_identity()).then(|| operation.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crs::{CompoundCrs, HorizontalCrs, ProjectedCrs, VerticalCrs};
    use crate::cs::{AngularUnit, GeodeticDatum, LinearUnit, PrimeMeridian, VerticalDatum};
    use crate::ellipsoid::Ellipsoid;
    use crate::error::ProjError;
    use crate::method::CoordinateOperationMethod;
    use crate::operation::CoordinatesOperationPoint;
    use crate::parameter::{
        ParameterValue, ParameterValues, CENTRAL_MERIDIAN, FALSE_EASTING, FALSE_NORTHING,
        LATITUDE_OF_ORIGIN, SCALE_FACTOR, STANDARD_PARALLEL_1, STANDARD_PARALLEL_2,
    };
    use crate::proj::Projection;
    use approx::assert_relative_eq;
    use rayon::prelude::*;

    fn wgs84() -> CoordinateSystem {
        GeographicCrs::wgs84().into()
    }

    fn utm(zone: u8) -> Arc<ProjectedCrs> {
        let lon0 = -183.0 + 6.0 * f64::from(zone);
        Arc::new(ProjectedCrs::new(
            32600 + u32::from(zone),
            format!("WGS 84 / UTM zone {zone}N"),
            Arc::new(GeographicCrs::wgs84()),
            "Transverse_Mercator",
            ParameterValues::new()
                .with(&LATITUDE_OF_ORIGIN, ParameterValue::degrees(0.0))
                .with(&CENTRAL_MERIDIAN, ParameterValue::degrees(lon0))
                .with(&SCALE_FACTOR, ParameterValue::scale(0.9996))
                .with(&FALSE_EASTING, ParameterValue::metres(500_000.0))
                .with(&FALSE_NORTHING, ParameterValue::metres(0.0)),
            LinearUnit::metre(),
        ))
    }

    fn texas_south_central_ftus() -> Arc<ProjectedCrs> {
        Arc::new(ProjectedCrs::new(
            2278,
            "NAD83 / Texas South Central (ftUS)",
            Arc::new(GeographicCrs::nad83()),
            "Lambert_Conformal_Conic",
            ParameterValues::new()
                .with(&LATITUDE_OF_ORIGIN, ParameterValue::degrees(27.833_333_333_333_33))
                .with(&CENTRAL_MERIDIAN, ParameterValue::degrees(-99.0))
                .with(&STANDARD_PARALLEL_1, ParameterValue::degrees(30.283_333_333_333_33))
                .with(&STANDARD_PARALLEL_2, ParameterValue::degrees(28.383_333_333_333_33))
                .with(
                    &FALSE_EASTING,
                    ParameterValue::linear(1_968_500.0, LinearUnit::us_survey_foot()),
                )
                .with(
                    &FALSE_NORTHING,
                    ParameterValue::linear(13_123_333.333, LinearUnit::us_survey_foot()),
                ),
            LinearUnit::us_survey_foot(),
        ))
    }

    #[test]
    fn test_equal_crs_has_no_operation() {
        let resolver = OperationResolver::default();
        assert!(resolver.get_coordinates_operation(&wgs84(), &wgs84()).is_none());
        assert_eq!(resolver.cached_len(), 0);
    }

    #[test]
    fn test_cache_returns_same_instance() {
        let resolver = OperationResolver::default();
        let target = CoordinateSystem::Projected(utm(32));
        let first = resolver.get_coordinates_operation(&wgs84(), &target).unwrap();
        let second = resolver.get_coordinates_operation(&wgs84(), &target).unwrap();
        assert!(first.ptr_eq(&second));
        assert_eq!(resolver.cached_len(), 1);

        // A separately built but identical CRS hits the same entry.
        let rebuilt = CoordinateSystem::Projected(utm(32));
        let third = resolver.get_coordinates_operation(&wgs84(), &rebuilt).unwrap();
        assert!(first.ptr_eq(&third));
    }

    #[test]
    fn test_concurrent_resolution_shares_one_operation() {
        let resolver = OperationResolver::default();
        let target = CoordinateSystem::Projected(utm(33));
        let operations: Vec<Operation> = (0..64)
            .into_par_iter()
            .map(|_| resolver.get_coordinates_operation(&wgs84(), &target).unwrap())
            .collect();
        let cached = resolver.get_coordinates_operation(&wgs84(), &target).unwrap();
        assert!(operations.iter().all(|op| op.ptr_eq(&cached)));
        assert_eq!(resolver.cached_len(), 1);
    }

    #[test]
    fn test_geographic_to_utm_round_trip() {
        let resolver = OperationResolver::default();
        let utm33 = CoordinateSystem::Projected(utm(33));
        let forward = resolver.get_coordinates_operation(&wgs84(), &utm33).unwrap();
        let inverse = resolver.get_coordinates_operation(&utm33, &wgs84()).unwrap();

        let mut point = CoordinatesOperationPoint::new(15.0, 52.0);
        forward.perform(&mut point);
        assert_relative_eq!(point.x, 500_000.0, epsilon = 1e-6);

        let start = CoordinatesOperationPoint::new(612_345.678, 5_761_234.567);
        let mut point = start;
        inverse.perform(&mut point);
        assert!(point.x > 16.0 && point.x < 17.0, "longitude {}", point.x);
        forward.perform(&mut point);
        assert_relative_eq!(point.x, start.x, epsilon = 1e-7);
        assert_relative_eq!(point.y, start.y, epsilon = 1e-7);
    }

    #[test]
    fn test_projected_to_projected_with_units() {
        let resolver = OperationResolver::default();
        let texas = CoordinateSystem::Projected(texas_south_central_ftus());
        let utm14 = CoordinateSystem::Projected(utm(14));
        let there = resolver.get_coordinates_operation(&texas, &utm14).unwrap();
        let back = resolver.get_coordinates_operation(&utm14, &texas).unwrap();

        let start = CoordinatesOperationPoint::new(3_000_000.0, 13_800_000.0);
        let mut point = start;
        there.perform(&mut point);
        assert!(point.x > 0.0 && point.y > 3_000_000.0);
        back.perform(&mut point);
        assert_relative_eq!(point.x, start.x, epsilon = 1e-7);
        assert_relative_eq!(point.y, start.y, epsilon = 1e-7);
    }

    #[test]
    fn test_unsupported_pair_caches_identity() {
        let resolver = OperationResolver::default();
        let vertical = CoordinateSystem::from(VerticalCrs::new(
            5703,
            "NAVD88 height",
            Arc::new(VerticalDatum::new(5103, "North American Vertical Datum 1988")),
            LinearUnit::metre(),
        ));
        assert!(resolver.get_coordinates_operation(&wgs84(), &vertical).is_none());
        assert_eq!(resolver.cached_len(), 1);
        assert!(resolver.get_coordinates_operation(&wgs84(), &vertical).is_none());
        assert_eq!(resolver.cached_len(), 1);
    }

    #[test]
    fn test_strict_mode_propagates_and_caches_nothing() {
        let resolver = OperationResolver::new(ResolverConfig::strict());
        let unknown = CoordinateSystem::from(ProjectedCrs::new(
            0,
            "Bonne",
            Arc::new(GeographicCrs::wgs84()),
            "Bonne",
            ParameterValues::new(),
            LinearUnit::metre(),
        ));
        let result = resolver.try_get_coordinates_operation(&wgs84(), &unknown);
        assert!(matches!(result, Err(CrsError::MissingProjection(_))));
        assert_eq!(resolver.cached_len(), 0);
        assert!(resolver.get_coordinates_operation(&wgs84(), &unknown).is_none());
    }

    #[derive(Debug)]
    struct ForwardOnly(Ellipsoid);

    impl Projection for ForwardOnly {
        fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64), ProjError> {
            Ok((lon, lat))
        }

        fn inverse(&self, _x: f64, _y: f64) -> Result<(f64, f64), ProjError> {
            Err(ProjError::InverseUnsupported("forward only".to_string()))
        }

        fn has_inverse(&self) -> bool {
            false
        }

        fn ellipsoid(&self) -> &Ellipsoid {
            &self.0
        }
    }

    fn forward_only(crs: &ProjectedCrs) -> Result<Box<dyn Projection>, ProjError> {
        Ok(Box::new(ForwardOnly(crs.geographic().ellipsoid().clone())))
    }

    #[test]
    fn test_missing_inverse() {
        let method = Arc::new(CoordinateOperationMethod::new(
            0,
            "Forward only",
            Vec::new(),
            Some(forward_only),
        ));
        let projected = CoordinateSystem::from(ProjectedCrs::with_method(
            0,
            "forward only",
            Arc::new(GeographicCrs::wgs84()),
            method,
            ParameterValues::new(),
            LinearUnit::metre(),
        ));
        let resolver = OperationResolver::new(ResolverConfig::strict());
        assert!(resolver.try_get_coordinates_operation(&wgs84(), &projected).is_ok());
        assert!(matches!(
            resolver.try_get_coordinates_operation(&projected, &wgs84()),
            Err(CrsError::MissingInverse(name)) if name == "Forward only"
        ));
    }

    #[derive(Debug)]
    struct Offset(f64);

    impl HorizontalShiftOperation for Offset {
        fn attempt_shift(&self, point: &mut CoordinatesOperationPoint) -> bool {
            point.x += self.0;
            true
        }
    }

    #[test]
    fn test_grid_shift_invalidates_cache() {
        let resolver = OperationResolver::default();
        let nad27 = GeographicCrs::nad27();
        let wgs = GeographicCrs::wgs84();
        let source = CoordinateSystem::from(nad27.clone());
        let target = CoordinateSystem::from(wgs.clone());
        let utm14 = CoordinateSystem::Projected(utm(14));

        // Same units and meridian: nothing to do until a shift exists.
        assert!(resolver.get_coordinates_operation(&source, &target).is_none());
        let before = resolver.get_coordinates_operation(&source, &utm14).unwrap();
        let unrelated = resolver.get_coordinates_operation(&wgs84(), &utm14).unwrap();
        assert_eq!(resolver.cached_len(), 3);

        let shift: Arc<dyn HorizontalShiftOperation> = Arc::new(Offset(0.5));
        resolver.add_grid_shift(&nad27, &wgs, Arc::clone(&shift));
        assert_eq!(resolver.cached_len(), 1);
        assert_eq!(resolver.grid_shift_count(&nad27, &wgs), 1);

        let shifted = resolver.get_coordinates_operation(&source, &target).unwrap();
        let mut point = CoordinatesOperationPoint::new(-98.0, 30.0);
        shifted.perform(&mut point);
        assert_relative_eq!(point.x, -97.5);

        let after = resolver.get_coordinates_operation(&source, &utm14).unwrap();
        assert!(!before.ptr_eq(&after));
        assert!(unrelated.ptr_eq(&resolver.get_coordinates_operation(&wgs84(), &utm14).unwrap()));

        assert!(resolver.remove_grid_shift(&nad27, &wgs, &shift));
        assert!(!resolver.remove_grid_shift(&nad27, &wgs, &shift));
        assert!(resolver.get_coordinates_operation(&source, &target).is_none());
    }

    #[test]
    fn test_prime_meridian_change() {
        let resolver = OperationResolver::default();
        let ntf_paris = CoordinateSystem::from(GeographicCrs::new(
            4807,
            "NTF (Paris)",
            Arc::new(GeodeticDatum::new(
                6807,
                "Nouvelle Triangulation Francaise (Paris)",
                Ellipsoid::from_inverse_flattening(7011, "Clarke 1880 (IGN)", 6_378_249.2, 293.466_021_293_6),
                PrimeMeridian::paris(),
            )),
            AngularUnit::degree(),
        ));
        let operation = resolver.get_coordinates_operation(&ntf_paris, &wgs84()).unwrap();
        let mut point = CoordinatesOperationPoint::new(0.0, 48.85);
        operation.perform(&mut point);
        assert_relative_eq!(point.x, 2.337_229_166_666_667, epsilon = 1e-12);
        assert_relative_eq!(point.y, 48.85);
    }

    #[test]
    fn test_compound_uses_horizontal_component() {
        let resolver = OperationResolver::default();
        let compound = CoordinateSystem::from(CompoundCrs::new(
            0,
            "UTM 32N + height",
            HorizontalCrs::Projected(utm(32)),
            Arc::new(VerticalCrs::new(
                5714,
                "MSL height",
                Arc::new(VerticalDatum::new(5100, "Mean Sea Level")),
                LinearUnit::metre(),
            )),
        ));
        let via_compound = resolver.get_coordinates_operation(&wgs84(), &compound).unwrap();
        let direct = resolver
            .get_coordinates_operation(&wgs84(), &CoordinateSystem::Projected(utm(32)))
            .unwrap();
        assert!(via_compound.ptr_eq(&direct));

        let mut point = CoordinatesOperationPoint::with_z(9.0, 48.0, 250.0);
        via_compound.perform(&mut point);
        assert_relative_eq!(point.z, 250.0);
    }
}
