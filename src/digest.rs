//! MD5 fingerprints of CRS defining quantities.
//!
//! Numeric values are rounded before hashing so that two definitions that
//! differ only by floating-point noise produce the same digest.

use md5::{Digest, Md5};

use crate::cs::normalize_name;

/// Values are rounded to 1e-9 of their unit before hashing.
pub const DIGEST_SCALE: f64 = 1e9;

pub type Md5Digest = [u8; 16];

pub fn digest_f64(hasher: &mut Md5, value: f64) {
    let rounded = (value * DIGEST_SCALE).round() as i64;
    hasher.update(rounded.to_le_bytes());
}

/// Hash a name in normalized form, NUL terminated.
pub fn digest_name(hasher: &mut Md5, name: &str) {
    hasher.update(normalize_name(name).as_bytes());
    hasher.update([0u8]);
}

pub fn finish(hasher: Md5) -> Md5Digest {
    let mut digest = [0u8; 16];
    digest.copy_from_slice(&hasher.finalize());
    digest
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digest_of(value: f64) -> Md5Digest {
        let mut hasher = Md5::new();
        digest_f64(&mut hasher, value);
        finish(hasher)
    }

    #[test]
    fn test_rounding_absorbs_noise() {
        assert_eq!(digest_of(0.1 + 0.2), digest_of(0.3));
        assert_ne!(digest_of(0.3), digest_of(0.300_001));
    }

    #[test]
    fn test_negative_zero() {
        assert_eq!(digest_of(-0.0), digest_of(0.0));
    }
}
