use super::normalize_name;

/// Name of a coordinate axis, compared by its normalized form.
#[derive(Clone, Debug)]
pub struct AxisName {
    id: u32,
    name: String,
    normalized: String,
}

impl AxisName {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        let name = name.into();
        let normalized = normalize_name(&name);
        Self {
            id,
            name,
            normalized,
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
}

impl PartialEq for AxisName {
    fn eq(&self, other: &Self) -> bool {
        self.normalized == other.normalized
    }
}

impl Eq for AxisName {}

/// One axis of a CRS. Axis order defines coordinate component order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Axis {
    name: AxisName,
    direction: String,
}

impl Axis {
    pub fn new(name: AxisName, direction: impl Into<String>) -> Self {
        Self {
            name,
            direction: direction.into(),
        }
    }

    pub fn named(name: &str, direction: &str) -> Self {
        Self::new(AxisName::new(0, name), direction)
    }

    pub fn name(&self) -> &AxisName {
        &self.name
    }

    pub fn direction(&self) -> &str {
        &self.direction
    }

    /// Longitude, latitude.
    pub fn geographic() -> Vec<Axis> {
        vec![Self::named("Lon", "east"), Self::named("Lat", "north")]
    }

    /// Easting, northing.
    pub fn projected() -> Vec<Axis> {
        vec![Self::named("X", "east"), Self::named("Y", "north")]
    }

    pub fn geocentric() -> Vec<Axis> {
        vec![
            Self::named("Geocentric X", "geocentricX"),
            Self::named("Geocentric Y", "geocentricY"),
            Self::named("Geocentric Z", "geocentricZ"),
        ]
    }

    pub fn vertical() -> Vec<Axis> {
        vec![Self::named("Gravity-related height", "up")]
    }
}
