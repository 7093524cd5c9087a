//! Descriptive value types shared by every coordinate reference system.

pub mod area;
pub mod authority;
pub mod axis;
pub mod datum;
pub mod prime_meridian;
pub mod unit;

pub use area::Area;
pub use authority::Authority;
pub use axis::{Axis, AxisName};
pub use datum::{GeodeticDatum, VerticalDatum};
pub use prime_meridian::PrimeMeridian;
pub use unit::{AngularUnit, LinearUnit};

/// Relative tolerance used by the `is_same` comparisons.
pub const SAME_TOLERANCE: f64 = 1e-12;

/// Normalize a name for lookup: keep ASCII alphanumerics, lowercase them.
///
/// `"Lambert_Conic_Conformal_(2SP)"` becomes `"lambertconicconformal2sp"`.
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Compare two quantities with a tolerance scaled to their magnitude.
pub fn is_same_value(a: f64, b: f64) -> bool {
    if a == b {
        return true;
    }
    let scale = a.abs().max(b.abs()).max(1.0);
    (a - b).abs() <= SAME_TOLERANCE * scale
}
