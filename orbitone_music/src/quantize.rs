// Quantizers: complex snapshot -> (sector, duration).
//
// The phase quantizer splits a full turn into `base` equal sectors and
// reports which one a value's angle falls in. The magnitude quantizer maps
// |z| to a small positive integer through two rescales and a ceiling.
//
// The magnitude rescale runs as two explicit steps (`rescale` into
// [0, new_max], then `* old_max / new_max`), not the algebraically equal
// one-liner. Existing pieces depend on the exact rounding of that order.
//
// Non-finite input (NaN/∞ out of a degenerate map) quantizes to 0 for both
// sector and duration.

use crate::complex::ComplexValue;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

pub const DEFAULT_SECTOR_BASE: u32 = 12;
pub const DEFAULT_OLD_MAX: f64 = 2.5;
pub const DEFAULT_NEW_MAX: f64 = 8.0;

/// Tuning for turning a complex snapshot into a note.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuantizerParams {
    /// Number of phase sectors per full turn.
    pub sector_base: u32,
    /// Upper bound of the magnitude domain.
    pub old_max: f64,
    /// Upper bound of the intermediate magnitude range.
    pub new_max: f64,
}

impl Default for QuantizerParams {
    fn default() -> Self {
        QuantizerParams {
            sector_base: DEFAULT_SECTOR_BASE,
            old_max: DEFAULT_OLD_MAX,
            new_max: DEFAULT_NEW_MAX,
        }
    }
}

impl QuantizerParams {
    pub fn sector(&self, z: ComplexValue) -> u32 {
        sector(z, self.sector_base)
    }

    pub fn duration(&self, z: ComplexValue) -> u32 {
        duration(z, self.old_max, self.new_max)
    }
}

/// Convert an angle in radians to a fraction of a full turn.
///
/// Negative angles wrap by adding one turn, so atan2 output in (−π, π]
/// lands in [0, 1). An input of exactly 2π yields 1.0.
pub fn rad_to_cycle(rad: f64) -> f64 {
    let cycles = rad / TAU;
    if cycles < 0.0 { cycles + 1.0 } else { cycles }
}

/// Phase sector of `z` among `base` equal slices of a full turn.
///
/// Always in `[0, base)`. The origin has angle 0 and so sector 0, whatever
/// the signs of its zeros; NaN/∞ input and `base == 0` also give 0.
pub fn sector(z: ComplexValue, base: u32) -> u32 {
    if base == 0 || !z.is_finite() {
        return 0;
    }
    // atan2 of a signed zero is ±π.
    if z.re == 0.0 && z.im == 0.0 {
        return 0;
    }
    let turns = rad_to_cycle(z.arg());
    // A tiny negative angle wraps to 1.0 - ε, which can round up to exactly 1.0.
    ((base as f64 * turns) as u32).min(base - 1)
}

/// Linearly map `x` from `[old_min, old_max]` onto `[new_min, new_max]`.
pub fn rescale(x: f64, old_min: f64, old_max: f64, new_min: f64, new_max: f64) -> f64 {
    (((x - old_min) * (new_max - new_min)) / (old_max - old_min)) + new_min
}

/// Duration value for `z`: `ceil(rescale(|z|, 0, old_max, 0, new_max) * old_max / new_max)`.
///
/// Zero is a legal result (only at the origin). NaN/∞ input gives 0.
pub fn duration(z: ComplexValue, old_max: f64, new_max: f64) -> u32 {
    if !z.is_finite() {
        return 0;
    }
    let x = rescale(z.norm(), 0.0, old_max, 0.0, new_max) * old_max / new_max;
    // `as` saturates and maps NaN to 0.
    x.ceil() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn c(re: f64, im: f64) -> ComplexValue {
        ComplexValue::new(re, im)
    }

    #[test]
    fn test_rad_to_cycle() {
        assert_eq!(rad_to_cycle(0.0), 0.0);
        assert_eq!(rad_to_cycle(PI / 2.0), 0.25);
        assert_eq!(rad_to_cycle(PI), 0.5);
        assert_eq!(rad_to_cycle(2.0 * PI), 1.0);
        assert_eq!(rad_to_cycle(-PI / 2.0), 0.75);
    }

    #[test]
    fn test_sector_quarters() {
        assert_eq!(sector(c(1.0, 0.0), 4), 0);
        assert_eq!(sector(c(0.0, 1.0), 4), 1);
        assert_eq!(sector(c(-1.0, 0.0), 4), 2);
        assert_eq!(sector(c(0.0, -1.0), 4), 3);
    }

    #[test]
    fn test_sector_default_base() {
        assert_eq!(sector(c(1.0, 0.0), DEFAULT_SECTOR_BASE), 0);
        assert_eq!(sector(c(0.0, 1.0), DEFAULT_SECTOR_BASE), 3);
        assert_eq!(sector(c(0.0, -1.0), 5), 3); // 0.75 * 5 = 3.75
    }

    #[test]
    fn test_sector_origin_is_zero() {
        assert_eq!(sector(c(0.0, 0.0), 12), 0);
        assert_eq!(sector(c(-0.0, 0.0), 12), 0);
        assert_eq!(sector(c(-0.0, -0.0), 12), 0);
        assert_eq!(sector(c(0.0, -0.0), 21), 0);
    }

    #[test]
    fn test_sector_non_finite_is_zero() {
        assert_eq!(sector(c(f64::NAN, 1.0), 12), 0);
        assert_eq!(sector(c(f64::INFINITY, -1.0), 12), 0);
    }

    #[test]
    fn test_sector_tiny_negative_angle_stays_in_range() {
        assert_eq!(sector(c(1.0, -1e-300), 21), 20);
    }

    #[test]
    fn test_sector_always_below_base() {
        for base in [1u32, 2, 5, 12, 21, 24] {
            for k in 0..720 {
                let angle = (k as f64) * PI / 360.0 - PI;
                for radius in [1e-9, 0.5, 1.0, 3.7, 1e9] {
                    let s = sector(from_angle(radius, angle), base);
                    assert!(s < base, "base {base}, angle {angle}: got {s}");
                }
            }
        }
    }

    fn from_angle(radius: f64, angle: f64) -> ComplexValue {
        crate::complex::from_polar(radius, angle)
    }

    #[test]
    fn test_rescale() {
        assert_eq!(rescale(1.25, 0.0, 2.5, 0.0, 8.0), 4.0);
        assert_eq!(rescale(0.0, -1.0, 1.0, 0.0, 10.0), 5.0);
    }

    #[test]
    fn test_duration_defaults() {
        assert_eq!(duration(c(1.0, 0.0), DEFAULT_OLD_MAX, DEFAULT_NEW_MAX), 1);
        assert_eq!(duration(c(0.0, -0.5), DEFAULT_OLD_MAX, DEFAULT_NEW_MAX), 1);
        assert_eq!(duration(c(1.1, -1.1), DEFAULT_OLD_MAX, DEFAULT_NEW_MAX), 2);
    }

    #[test]
    fn test_duration_zero_at_origin() {
        assert_eq!(duration(c(0.0, 0.0), DEFAULT_OLD_MAX, DEFAULT_NEW_MAX), 0);
    }

    #[test]
    fn test_duration_non_finite_is_zero() {
        assert_eq!(duration(c(f64::NAN, 0.0), DEFAULT_OLD_MAX, DEFAULT_NEW_MAX), 0);
        assert_eq!(duration(c(0.0, f64::NEG_INFINITY), 3.5, 16.0), 0);
    }

    #[test]
    fn test_duration_monotonic_in_magnitude() {
        for (old_max, new_max) in [(2.5, 8.0), (3.5, 16.0), (2.5, 16.0)] {
            let mut last = 0;
            for k in 0..2000 {
                let d = duration(c(k as f64 * 0.005, 0.0), old_max, new_max);
                assert!(d >= last, "magnitude {} dropped from {last} to {d}", k as f64 * 0.005);
                last = d;
            }
        }
    }

    #[test]
    fn test_params_default() {
        let params = QuantizerParams::default();
        assert_eq!(params.sector_base, 12);
        assert_eq!(params.sector(c(-1.0, 0.0)), 6);
        assert_eq!(params.duration(c(1.0, 0.0)), 1);
    }
}
