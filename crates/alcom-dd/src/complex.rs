//! Complex edge weights.

use num_complex::Complex64;

/// Magnitudes below this are treated as exactly zero.
pub const TOLERANCE: f64 = 1e-13;

/// Resolution of the integer keys used for structural hashing.
const KEY_SCALE: f64 = 1e12;

pub const ZERO: Complex64 = Complex64::new(0.0, 0.0);
pub const ONE: Complex64 = Complex64::new(1.0, 0.0);

#[inline]
pub fn is_zero(c: Complex64) -> bool {
    c.norm() < TOLERANCE
}

/// Hashable key for a weight with magnitude at most one per component.
///
/// Values closer than the key resolution share a key. Larger inputs saturate
/// the integer range and collide, so callers keying a compute table must
/// normalize first.
#[inline]
pub fn key(c: Complex64) -> (i64, i64) {
    #[allow(clippy::cast_possible_truncation)]
    let quantize = |x: f64| (x * KEY_SCALE).round() as i64;
    (quantize(c.re), quantize(c.im))
}
