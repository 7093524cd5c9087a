/// Area of use of a CRS: a named longitude/latitude box in degrees.
#[derive(Clone, Debug, PartialEq)]
pub struct Area {
    name: String,
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
}

impl Area {
    pub fn new(name: impl Into<String>, min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            name: name.into(),
            min_x: min_x.min(max_x),
            min_y: min_y.min(max_y),
            max_x: min_x.max(max_x),
            max_y: min_y.max(max_y),
        }
    }

    pub fn world() -> Self {
        Self::new("World", -180.0, -90.0, 180.0, 90.0)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// (min_x, min_y, max_x, max_y)
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        (self.min_x, self.min_y, self.max_x, self.max_y)
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }
}
