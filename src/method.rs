//! Projection method registry.
//!
//! Methods are keyed by normalized name. A few historical names are
//! ambiguous and are rewritten from the parameters actually supplied before
//! the alias table is consulted.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use tracing::debug;

use crate::crs::ProjectedCrs;
use crate::cs::{normalize_name, Authority};
use crate::error::{CrsError, ProjError};
use crate::parameter::{
    ParameterName, ParameterValues, CENTRAL_MERIDIAN, FALSE_EASTING, FALSE_NORTHING,
    LATITUDE_OF_ORIGIN, SCALE_FACTOR, STANDARD_PARALLEL_1, STANDARD_PARALLEL_2,
};
use crate::proj::albers_equal_area::AlbersEqualArea;
use crate::proj::equirectangular::Equirectangular;
use crate::proj::lambert_conformal::LambertConformalConic;
use crate::proj::mercator::{Mercator, PseudoMercator};
use crate::proj::stereographic::{ObliqueStereographic, PolarStereographic};
use crate::proj::transverse_mercator::TransverseMercator;
use crate::proj::Projection;

/// Builds the projection of a projected CRS from its parameters.
pub type ProjectionFactory = fn(&ProjectedCrs) -> Result<Box<dyn Projection>, ProjError>;

#[derive(Clone)]
pub struct CoordinateOperationMethod {
    id: u32,
    name: String,
    normalized: String,
    parameters: Vec<ParameterName>,
    authority: Option<Authority>,
    factory: Option<ProjectionFactory>,
}

impl CoordinateOperationMethod {
    pub fn new(
        id: u32,
        name: impl Into<String>,
        parameters: Vec<ParameterName>,
        factory: Option<ProjectionFactory>,
    ) -> Self {
        let name = name.into();
        let normalized = normalize_name(&name);
        Self {
            id,
            name,
            normalized,
            parameters,
            authority: (id > 0).then(|| Authority::epsg(id)),
            factory,
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn normalized_name(&self) -> &str {
        &self.normalized
    }

    /// Formal parameters, in definition order.
    pub fn parameters(&self) -> &[ParameterName] {
        &self.parameters
    }

    pub fn authority(&self) -> Option<&Authority> {
        self.authority.as_ref()
    }

    pub fn has_factory(&self) -> bool {
        self.factory.is_some()
    }

    pub fn create_projection(&self, crs: &ProjectedCrs) -> Result<Box<dyn Projection>, CrsError> {
        let factory = self
            .factory
            .ok_or_else(|| CrsError::MissingProjection(self.name.clone()))?;
        Ok(factory(crs)?)
    }

    /// Authorities decide when both carry one; otherwise the normalized
    /// names do.
    pub fn equals(&self, other: &Self) -> bool {
        match (&self.authority, &other.authority) {
            (Some(a), Some(b)) => a == b,
            _ => self.normalized == other.normalized,
        }
    }
}

impl fmt::Debug for CoordinateOperationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoordinateOperationMethod")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("parameters", &self.parameters.len())
            .field("has_factory", &self.factory.is_some())
            .finish()
    }
}

/// Normalized-name table of known methods plus their aliases.
pub struct MethodRegistry {
    methods: RwLock<HashMap<String, Arc<CoordinateOperationMethod>>>,
    aliases: RwLock<HashMap<String, String>>,
}

static REGISTRY: Lazy<MethodRegistry> = Lazy::new(MethodRegistry::with_builtins);

/// The process-wide registry used by [`ProjectedCrs::new`].
pub fn registry() -> &'static MethodRegistry {
    &REGISTRY
}

impl MethodRegistry {
    pub fn empty() -> Self {
        Self {
            methods: RwLock::new(HashMap::new()),
            aliases: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_builtins() -> Self {
        let registry = Self::empty();
        let origin = || {
            vec![
                LATITUDE_OF_ORIGIN.clone(),
                CENTRAL_MERIDIAN.clone(),
                SCALE_FACTOR.clone(),
                FALSE_EASTING.clone(),
                FALSE_NORTHING.clone(),
            ]
        };
        let two_parallels = || {
            vec![
                LATITUDE_OF_ORIGIN.clone(),
                CENTRAL_MERIDIAN.clone(),
                STANDARD_PARALLEL_1.clone(),
                STANDARD_PARALLEL_2.clone(),
                FALSE_EASTING.clone(),
                FALSE_NORTHING.clone(),
            ]
        };
        let one_parallel = || {
            vec![
                CENTRAL_MERIDIAN.clone(),
                STANDARD_PARALLEL_1.clone(),
                FALSE_EASTING.clone(),
                FALSE_NORTHING.clone(),
            ]
        };

        let mut equidistant = one_parallel();
        equidistant.insert(0, LATITUDE_OF_ORIGIN.clone());

        for method in [
            builtin(9807, "Transverse_Mercator", origin(), TransverseMercator::from_crs),
            builtin(9804, "Mercator_1SP", origin(), Mercator::from_crs_1sp),
            builtin(9805, "Mercator_2SP", one_parallel(), Mercator::from_crs_2sp),
            builtin(
                1024,
                "Popular_Visualisation_Pseudo_Mercator",
                origin(),
                PseudoMercator::from_crs,
            ),
            builtin(
                9801,
                "Lambert_Conic_Conformal_1SP",
                origin(),
                LambertConformalConic::from_crs_1sp,
            ),
            builtin(
                9802,
                "Lambert_Conic_Conformal_2SP",
                two_parallels(),
                LambertConformalConic::from_crs_2sp,
            ),
            builtin(9822, "Albers_Equal_Area", two_parallels(), AlbersEqualArea::from_crs),
            builtin(9809, "Oblique_Stereographic", origin(), ObliqueStereographic::from_crs),
            builtin(
                9810,
                "Polar_Stereographic_variant_A",
                origin(),
                PolarStereographic::from_crs_variant_a,
            ),
            builtin(
                9829,
                "Polar_Stereographic_variant_B",
                one_parallel(),
                PolarStereographic::from_crs_variant_b,
            ),
            builtin(1028, "Equidistant_Cylindrical", equidistant, Equirectangular::from_crs),
        ] {
            registry.register(method);
        }

        for (alias, canonical) in [
            ("Gauss_Kruger", "Transverse_Mercator"),
            ("Transverse_Mercator_Complex", "Transverse_Mercator"),
            ("Mercator_variant_A", "Mercator_1SP"),
            ("Mercator_variant_B", "Mercator_2SP"),
            ("Pseudo_Mercator", "Popular_Visualisation_Pseudo_Mercator"),
            ("Web_Mercator", "Popular_Visualisation_Pseudo_Mercator"),
            ("Mercator_Auxiliary_Sphere", "Popular_Visualisation_Pseudo_Mercator"),
            ("Lambert_Conformal_Conic_1SP", "Lambert_Conic_Conformal_1SP"),
            ("Lambert_Conformal_Conic_2SP", "Lambert_Conic_Conformal_2SP"),
            ("Albers_Conic_Equal_Area", "Albers_Equal_Area"),
            ("Albers", "Albers_Equal_Area"),
            ("Double_Stereographic", "Oblique_Stereographic"),
            ("Polar_Stereographic", "Polar_Stereographic_variant_A"),
            ("Stereographic_North_Pole", "Polar_Stereographic_variant_B"),
            ("Stereographic_South_Pole", "Polar_Stereographic_variant_B"),
            ("Equirectangular", "Equidistant_Cylindrical"),
            ("Plate_Carree", "Equidistant_Cylindrical"),
        ] {
            registry.register_alias(alias, canonical);
        }
        registry
    }

    /// Add or replace a method under its normalized name.
    pub fn register(&self, method: CoordinateOperationMethod) -> Arc<CoordinateOperationMethod> {
        let method = Arc::new(method);
        debug!(method = %method.name, "registering projection method");
        self.methods
            .write()
            .insert(method.normalized.clone(), Arc::clone(&method));
        method
    }

    pub fn register_alias(&self, alias: &str, canonical: &str) {
        self.aliases
            .write()
            .insert(normalize_name(alias), normalize_name(canonical));
    }

    /// Normalized name `name` resolves to, given the parameters a definition
    /// supplies.
    pub fn resolve_name(&self, name: &str, parameters: &ParameterValues) -> String {
        let normalized = rewrite(normalize_name(name), parameters);
        self.aliases
            .read()
            .get(&normalized)
            .cloned()
            .unwrap_or(normalized)
    }

    pub fn get(&self, name: &str, parameters: &ParameterValues) -> Option<Arc<CoordinateOperationMethod>> {
        let resolved = self.resolve_name(name, parameters);
        self.methods.read().get(&resolved).cloned()
    }

    /// Known method, or a factory-less placeholder registered on first use so
    /// that later definitions share it.
    pub fn get_or_create(&self, name: &str, parameters: &ParameterValues) -> Arc<CoordinateOperationMethod> {
        let resolved = self.resolve_name(name, parameters);
        if let Some(method) = self.methods.read().get(&resolved) {
            return Arc::clone(method);
        }
        let mut methods = self.methods.write();
        Arc::clone(methods.entry(resolved).or_insert_with(|| {
            debug!(method = name, "unknown projection method, no factory");
            Arc::new(CoordinateOperationMethod::new(0, name, Vec::new(), None))
        }))
    }

    pub fn len(&self) -> usize {
        self.methods.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.read().is_empty()
    }
}

impl Default for MethodRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl fmt::Debug for MethodRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodRegistry")
            .field("methods", &self.methods.read().len())
            .field("aliases", &self.aliases.read().len())
            .finish()
    }
}

fn builtin(
    id: u32,
    name: &str,
    parameters: Vec<ParameterName>,
    factory: ProjectionFactory,
) -> CoordinateOperationMethod {
    CoordinateOperationMethod::new(id, name, parameters, Some(factory))
}

/// Names whose meaning depends on the parameters present.
fn rewrite(normalized: String, parameters: &ParameterValues) -> String {
    match normalized.as_str() {
        "stereographicnorthpole" if parameters.len() == 5 => "obliquestereographic".to_string(),
        "stereographicsouthpole" if parameters.len() == 5 => "polarstereographicvariantb".to_string(),
        "lambertconformalconic" => {
            if parameters.contains(&STANDARD_PARALLEL_2) {
                "lambertconicconformal2sp".to_string()
            } else {
                "lambertconicconformal1sp".to_string()
            }
        }
        "mercator" => {
            if parameters.contains(&STANDARD_PARALLEL_1) {
                "mercator2sp".to_string()
            } else {
                "mercator1sp".to_string()
            }
        }
        _ => normalized,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameter::ParameterValue;

    fn params(names: &[&str]) -> ParameterValues {
        let mut values = ParameterValues::new();
        for name in names {
            values.insert_named(name, ParameterValue::degrees(0.0));
        }
        values
    }

    #[test]
    fn test_lambert_disambiguation() {
        let registry = MethodRegistry::with_builtins();
        let two = params(&["Standard_Parallel_1", "Standard_Parallel_2", "Central_Meridian"]);
        let one = params(&["Latitude_Of_Origin", "Central_Meridian", "Scale_Factor"]);
        assert_eq!(
            registry.resolve_name("Lambert_Conformal_Conic", &two),
            "lambertconicconformal2sp"
        );
        assert_eq!(
            registry.resolve_name("Lambert_Conformal_Conic", &one),
            "lambertconicconformal1sp"
        );
        assert_eq!(
            registry.get("Lambert_Conformal_Conic", &two).unwrap().id(),
            9802
        );
    }

    #[test]
    fn test_mercator_disambiguation() {
        let registry = MethodRegistry::with_builtins();
        let with_parallel = params(&["Standard_Parallel_1", "Central_Meridian"]);
        let without = params(&["Scale_Factor", "Central_Meridian"]);
        assert_eq!(registry.get("Mercator", &with_parallel).unwrap().id(), 9805);
        assert_eq!(registry.get("Mercator", &without).unwrap().id(), 9804);
    }

    #[test]
    fn test_stereographic_pole_disambiguation() {
        let registry = MethodRegistry::with_builtins();
        let five = params(&["a", "b", "c", "d", "e"]);
        let four = params(&["a", "b", "c", "d"]);
        assert_eq!(
            registry.get("Stereographic_North_Pole", &five).unwrap().id(),
            9809
        );
        assert_eq!(
            registry.get("Stereographic_South_Pole", &five).unwrap().id(),
            9829
        );
        assert_eq!(
            registry.get("Stereographic_North_Pole", &four).unwrap().id(),
            9829
        );
    }

    #[test]
    fn test_aliases() {
        let registry = MethodRegistry::with_builtins();
        let none = ParameterValues::new();
        assert_eq!(registry.get("Gauss-Kruger", &none).unwrap().id(), 9807);
        assert_eq!(registry.get("Web Mercator", &none).unwrap().id(), 1024);
        assert_eq!(registry.get("Plate_Carree", &none).unwrap().id(), 1028);
        assert_eq!(registry.get("Double_Stereographic", &none).unwrap().id(), 9809);
        assert!(registry.get("Sinusoidal", &none).is_none());
    }

    #[test]
    fn test_unknown_method_is_shared_placeholder() {
        let registry = MethodRegistry::with_builtins();
        let none = ParameterValues::new();
        let first = registry.get_or_create("Van_der_Grinten_I", &none);
        let second = registry.get_or_create("van der grinten i", &none);
        assert!(Arc::ptr_eq(&first, &second));
        assert!(!first.has_factory());
    }

    #[test]
    fn test_method_equality() {
        let by_code = CoordinateOperationMethod::new(9807, "Transverse Mercator", Vec::new(), None);
        let renamed = CoordinateOperationMethod::new(9807, "Gauss-Kruger", Vec::new(), None);
        let other_code = CoordinateOperationMethod::new(9808, "Transverse Mercator", Vec::new(), None);
        let unnamed = CoordinateOperationMethod::new(0, "transverse_mercator", Vec::new(), None);
        assert!(by_code.equals(&renamed));
        assert!(!by_code.equals(&other_code));
        assert!(by_code.equals(&unnamed));
    }

    #[test]
    fn test_builtin_parameter_lists() {
        let registry = MethodRegistry::with_builtins();
        let tm = registry.get("Transverse_Mercator", &ParameterValues::new()).unwrap();
        let names: Vec<&str> = tm
            .parameters()
            .iter()
            .filter_map(|p| p.primary().map(|n| n.name()))
            .collect();
        assert_eq!(names.len(), 5);
        assert!(CENTRAL_MERIDIAN.matches(names[1]));
        assert!(tm.has_factory());
    }
}
