use std::fmt;

/// Organisation + code that defines an object, e.g. `EPSG:4326`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Authority {
    name: String,
    code: String,
}

impl Authority {
    pub fn new(name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
        }
    }

    pub fn epsg(id: u32) -> Self {
        Self::new("EPSG", id.to_string())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    /// Numeric code, when the code is an integer.
    pub fn id(&self) -> Option<u32> {
        self.code.parse().ok()
    }

    pub fn is_epsg(&self) -> bool {
        self.name.eq_ignore_ascii_case("EPSG")
    }
}

impl fmt::Display for Authority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epsg_display() {
        let authority = Authority::epsg(4326);
        assert_eq!(authority.to_string(), "EPSG:4326");
        assert_eq!(authority.id(), Some(4326));
        assert!(authority.is_epsg());
    }

    #[test]
    fn test_non_numeric_code() {
        let authority = Authority::new("ESRI", "WGS_1984_Web_Mercator");
        assert_eq!(authority.id(), None);
        assert!(!authority.is_epsg());
    }
}
