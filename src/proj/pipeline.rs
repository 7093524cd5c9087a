//! Pipeline rules: which steps turn coordinates of one CRS into another.
//!
//! Geographic coordinates travel in degrees around grid shifts and in
//! radians around projections. Projected coordinates travel in metres.

use std::sync::Arc;

use crate::crs::{CoordinateSystem, GeocentricCrs, GeographicCrs, ProjectedCrs};
use crate::cs::{AngularUnit, LinearUnit};
use crate::error::CrsError;
use crate::operation::grid_shift::CrsPair;
use crate::operation::{
    GeocentricConversion, GridShiftRegistry, LongitudeOffset, OperationList, ProjectionDirection,
    ProjectionOperation, ScaleOperation,
};

/// Steps for one CRS pair plus the geographic pair whose grid shifts they
/// depend on, if any.
#[derive(Debug, Default)]
pub struct Pipeline {
    pub steps: OperationList,
    pub grid_pair: Option<CrsPair>,
}

pub struct PipelineBuilder<'a> {
    grid_shifts: &'a GridShiftRegistry,
}

impl<'a> PipelineBuilder<'a> {
    pub fn new(grid_shifts: &'a GridShiftRegistry) -> Self {
        Self { grid_shifts }
    }

    /// Compound CRS must already be reduced to their horizontal part.
    pub fn build(&self, source: &CoordinateSystem, target: &CoordinateSystem) -> Result<Pipeline, CrsError> {
        use CoordinateSystem as Cs;

        let mut pipeline = Pipeline::default();
        match (source, target) {
            (Cs::Geographic(from), Cs::Geographic(to)) => {
                self.add_geographic(from, from.unit(), to, to.unit(), &mut pipeline);
            }
            (Cs::Geographic(from), Cs::Projected(to)) => {
                self.add_geographic(from, from.unit(), to.geographic(), &AngularUnit::radian(), &mut pipeline);
                add_projection(to, ProjectionDirection::Forward, &mut pipeline.steps)?;
                to.unit().add_from_metres(&mut pipeline.steps);
            }
            (Cs::Projected(from), Cs::Geographic(to)) => {
                from.unit().add_to_metres(&mut pipeline.steps);
                add_projection(from, ProjectionDirection::Inverse, &mut pipeline.steps)?;
                self.add_geographic(from.geographic(), &AngularUnit::radian(), to, to.unit(), &mut pipeline);
            }
            (Cs::Projected(from), Cs::Projected(to)) => {
                from.unit().add_to_metres(&mut pipeline.steps);
                add_projection(from, ProjectionDirection::Inverse, &mut pipeline.steps)?;
                let radian = AngularUnit::radian();
                self.add_geographic(from.geographic(), &radian, to.geographic(), &radian, &mut pipeline);
                add_projection(to, ProjectionDirection::Forward, &mut pipeline.steps)?;
                to.unit().add_from_metres(&mut pipeline.steps);
            }
            (Cs::Geographic(from), Cs::Geocentric(to)) if from.datum().is_same(to.datum()) => {
                add_to_geocentric(from, to, &mut pipeline.steps);
            }
            (Cs::Geocentric(from), Cs::Geographic(to)) if from.datum().is_same(to.datum()) => {
                add_from_geocentric(from, to, &mut pipeline.steps);
            }
            (Cs::Engineering(from), Cs::Engineering(to)) => {
                from.unit().add_to_unit(to.unit(), &mut pipeline.steps);
            }
            _ => {
                return Err(CrsError::UnsupportedCombination {
                    from: source.crs_type(),
                    to: target.crs_type(),
                })
            }
        }
        Ok(pipeline)
    }

    /// Geographic to geographic, entering in `from_unit` and leaving in
    /// `to_unit`. Registered grid shifts run in degrees after the prime
    /// meridian change.
    fn add_geographic(
        &self,
        from: &GeographicCrs,
        from_unit: &AngularUnit,
        to: &GeographicCrs,
        to_unit: &AngularUnit,
        pipeline: &mut Pipeline,
    ) {
        let steps = &mut pipeline.steps;
        if from.equals(to) {
            from_unit.add_to_unit(to_unit, steps);
            return;
        }

        pipeline.grid_pair = Some((from.key(), to.key()));
        let offset = from.prime_meridian().longitude() - to.prime_meridian().longitude();
        let label = || format!("{} -> {} meridian", from.prime_meridian().name(), to.prime_meridian().name());

        if let Some(chain) = self.grid_shifts.chain(from, to) {
            from_unit.add_to_degrees(steps);
            if offset != 0.0 {
                steps.push(Arc::new(LongitudeOffset::new(label(), offset)));
            }
            steps.push(Arc::new(chain));
            to_unit.add_from_degrees(steps);
        } else if offset != 0.0 {
            if from_unit.is_radian() && to_unit.is_radian() {
                steps.push(Arc::new(LongitudeOffset::new(label(), offset.to_radians())));
            } else {
                from_unit.add_to_degrees(steps);
                steps.push(Arc::new(LongitudeOffset::new(label(), offset)));
                to_unit.add_from_degrees(steps);
            }
        } else {
            from_unit.add_to_unit(to_unit, steps);
        }
    }
}

fn add_projection(
    crs: &ProjectedCrs,
    direction: ProjectionDirection,
    steps: &mut OperationList,
) -> Result<(), CrsError> {
    let projection = crs.projection()?;
    let method = crs.method().name();
    if direction == ProjectionDirection::Inverse && !projection.has_inverse() {
        return Err(CrsError::MissingInverse(method.to_string()));
    }
    steps.push(Arc::new(ProjectionOperation::new(method, projection, direction)));
    Ok(())
}

/// Geocentric conversion works on Greenwich longitudes in radians.
fn add_to_geocentric(from: &GeographicCrs, to: &GeocentricCrs, steps: &mut OperationList) {
    from.unit().add_to_radians(steps);
    let meridian = from.prime_meridian().longitude();
    if meridian != 0.0 {
        steps.push(Arc::new(LongitudeOffset::new(
            format!("{} -> Greenwich meridian", from.prime_meridian().name()),
            meridian.to_radians(),
        )));
    }
    steps.push(Arc::new(GeocentricConversion::new(
        from.ellipsoid().clone(),
        ProjectionDirection::Forward,
    )));
    add_xyz_from_metres(to.unit(), steps);
}

fn add_from_geocentric(from: &GeocentricCrs, to: &GeographicCrs, steps: &mut OperationList) {
    add_xyz_to_metres(from.unit(), steps);
    steps.push(Arc::new(GeocentricConversion::new(
        to.ellipsoid().clone(),
        ProjectionDirection::Inverse,
    )));
    let meridian = to.prime_meridian().longitude();
    if meridian != 0.0 {
        steps.push(Arc::new(LongitudeOffset::new(
            format!("Greenwich -> {} meridian", to.prime_meridian().name()),
            -meridian.to_radians(),
        )));
    }
    to.unit().add_from_radians(steps);
}

fn add_xyz_to_metres(unit: &LinearUnit, steps: &mut OperationList) {
    if !unit.is_metre() {
        steps.push(Arc::new(ScaleOperation::xyz(
            format!("{}->metre", unit.name()),
            unit.conversion_factor(),
        )));
    }
}

fn add_xyz_from_metres(unit: &LinearUnit, steps: &mut OperationList) {
    if !unit.is_metre() {
        steps.push(Arc::new(ScaleOperation::xyz(
            format!("metre->{}", unit.name()),
            1.0 / unit.conversion_factor(),
        )));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crs::{EngineeringCrs, VerticalCrs};
    use crate::cs::{GeodeticDatum, PrimeMeridian, VerticalDatum};
    use crate::ellipsoid::Ellipsoid;
    use crate::operation::{CoordinatesOperationPoint, Operation};
    use approx::assert_relative_eq;

    fn build(source: impl Into<CoordinateSystem>, target: impl Into<CoordinateSystem>) -> Result<Pipeline, CrsError> {
        let grid_shifts = GridShiftRegistry::new();
        PipelineBuilder::new(&grid_shifts).build(&source.into(), &target.into())
    }

    fn ntf_paris(unit: AngularUnit) -> GeographicCrs {
        GeographicCrs::new(
            4807,
            "NTF (Paris)",
            Arc::new(GeodeticDatum::new(
                6807,
                "Nouvelle Triangulation Francaise (Paris)",
                Ellipsoid::from_inverse_flattening(7011, "Clarke 1880 (IGN)", 6_378_249.2, 293.466_021_293_6),
                PrimeMeridian::paris(),
            )),
            unit,
        )
    }

    #[test]
    fn test_degrees_to_radians_is_one_step() {
        let radians = GeographicCrs::new(
            0,
            "WGS 84 radians",
            Arc::new(GeodeticDatum::wgs84()),
            AngularUnit::radian(),
        );
        let pipeline = build(GeographicCrs::wgs84(), radians).unwrap();
        assert_eq!(pipeline.steps.len(), 1);
        assert!(pipeline.grid_pair.is_none());
    }

    #[test]
    fn test_datum_change_consults_grid_table() {
        let pipeline = build(GeographicCrs::nad27(), GeographicCrs::wgs84()).unwrap();
        // Same unit, same meridian, nothing registered: no steps, but the
        // result depends on the NAD27 -> WGS 84 grid table.
        assert!(pipeline.steps.is_empty());
        assert_eq!(
            pipeline.grid_pair,
            Some((GeographicCrs::nad27().key(), GeographicCrs::wgs84().key()))
        );
    }

    #[test]
    fn test_prime_meridian_shift_in_grads() {
        let pipeline = build(ntf_paris(AngularUnit::grad()), GeographicCrs::wgs84()).unwrap();
        let operation = Operation::from_steps(pipeline.steps);
        // Paris meridian, 0 grad, is 2°20'14.025" east of Greenwich.
        let mut point = CoordinatesOperationPoint::new(0.0, 54.0);
        operation.perform(&mut point);
        assert_relative_eq!(point.x, 2.337_229_166_666_667, epsilon = 1e-12);
        assert_relative_eq!(point.y, 48.6, epsilon = 1e-12);
    }

    #[test]
    fn test_geocentric_round_trip() {
        let to_xyz = Operation::from_steps(build(GeographicCrs::wgs84(), GeocentricCrs::wgs84()).unwrap().steps);
        let to_geo = Operation::from_steps(build(GeocentricCrs::wgs84(), GeographicCrs::wgs84()).unwrap().steps);
        let mut point = CoordinatesOperationPoint::with_z(10.0, 45.0, 120.0);
        to_xyz.perform(&mut point);
        assert_relative_eq!(point.z, 4_487_433.262, epsilon = 1e-3);
        to_geo.perform(&mut point);
        assert_relative_eq!(point.x, 10.0, epsilon = 1e-10);
        assert_relative_eq!(point.y, 45.0, epsilon = 1e-10);
        assert_relative_eq!(point.z, 120.0, epsilon = 1e-4);
    }

    #[test]
    fn test_geocentric_needs_same_datum() {
        let result = build(GeographicCrs::nad27(), GeocentricCrs::wgs84());
        assert!(matches!(result, Err(CrsError::UnsupportedCombination { .. })));
    }

    #[test]
    fn test_engineering_unit_conversion() {
        let metres = EngineeringCrs::new(0, "site", LinearUnit::metre());
        let feet = EngineeringCrs::new(0, "site ft", LinearUnit::foot());
        let operation = Operation::from_steps(build(metres, feet).unwrap().steps);
        let mut point = CoordinatesOperationPoint::new(0.3048, 3.048);
        operation.perform(&mut point);
        assert_relative_eq!(point.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(point.y, 10.0, epsilon = 1e-12);
    }

    #[test]
    fn test_vertical_is_unsupported() {
        let vertical = VerticalCrs::new(
            5703,
            "NAVD88 height",
            Arc::new(VerticalDatum::new(5103, "North American Vertical Datum 1988")),
            LinearUnit::metre(),
        );
        match build(GeographicCrs::wgs84(), vertical) {
            Err(CrsError::UnsupportedCombination { from, to }) => {
                assert_eq!(from.to_string(), "geographic");
                assert_eq!(to.to_string(), "vertical");
            }
            other => panic!("expected unsupported combination, got {other:?}"),
        }
    }
}
