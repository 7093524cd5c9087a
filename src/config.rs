//! Resolver configuration.

use serde::Deserialize;

use crate::error::CrsError;

/// Options for [`OperationResolver`](crate::proj::OperationResolver).
///
/// ```toml
/// strict = true
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolverConfig {
    /// Return resolution errors to the caller instead of logging them and
    /// caching "no operation".
    pub strict: bool,
}

impl ResolverConfig {
    pub fn strict() -> Self {
        Self { strict: true }
    }

    pub fn from_toml_str(text: &str) -> Result<Self, CrsError> {
        toml::from_str(text).map_err(|e| CrsError::Config(e.to_string()))
    }
}
