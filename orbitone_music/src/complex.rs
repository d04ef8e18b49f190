// Complex values and the dynamical maps iterated over them.
//
// `ComplexValue` is `num_complex::Complex64`: an immutable re/im pair with
// the usual arithmetic, `norm()` for magnitude and `arg()` for phase. Every
// operation returns a new value, nothing is mutated in place.
//
// A `DynamicalMap` is the recurrence `(iterate, parameter) -> next iterate`
// that the circle sampler walks. Any pure closure of that shape is a map, so
// callers can pass their own recurrences; `StandardMap` names the two maps the
// built-in compositions use and is what the JSON config refers to.
//
// Maps must be deterministic and side-effect free. NaN/∞ coming out of a map
// (for example `1/z²` at z = 0) is not guarded here; see quantize.rs for how
// those values are turned into notes.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A point in the complex plane.
pub type ComplexValue = Complex64;

/// The complex number with the given polar coordinates.
pub fn from_polar(radius: f64, phase_rad: f64) -> ComplexValue {
    ComplexValue::new(radius * phase_rad.cos(), radius * phase_rad.sin())
}

/// True if `a` and `b` are closer than `tol` in the complex plane.
pub fn approx_eq(a: ComplexValue, b: ComplexValue, tol: f64) -> bool {
    (a - b).norm() < tol
}

/// A pure recurrence `z_{n+1} = f(z_n, c)` over the complex plane.
pub trait DynamicalMap {
    fn step(&self, iterate: ComplexValue, parameter: ComplexValue) -> ComplexValue;
}

impl<F> DynamicalMap for F
where
    F: Fn(ComplexValue, ComplexValue) -> ComplexValue,
{
    fn step(&self, iterate: ComplexValue, parameter: ComplexValue) -> ComplexValue {
        self(iterate, parameter)
    }
}

/// `z² + c`, the Mandelbrot/Julia recurrence.
pub fn quadratic(z: ComplexValue, c: ComplexValue) -> ComplexValue {
    z * z + c
}

/// `1/z² − c`. Blows up to NaN/∞ when an iterate lands on zero.
pub fn reciprocal_quadratic(z: ComplexValue, c: ComplexValue) -> ComplexValue {
    ComplexValue::new(1.0, 0.0) / (z * z) - c
}

/// The named maps available to configs and presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StandardMap {
    /// `z² + c`
    Quadratic,
    /// `1/z² − c`
    ReciprocalQuadratic,
}

impl StandardMap {
    pub const ALL: [StandardMap; 2] = [StandardMap::Quadratic, StandardMap::ReciprocalQuadratic];

    pub fn name(self) -> &'static str {
        match self {
            StandardMap::Quadratic => "quadratic",
            StandardMap::ReciprocalQuadratic => "reciprocal_quadratic",
        }
    }
}

impl DynamicalMap for StandardMap {
    fn step(&self, iterate: ComplexValue, parameter: ComplexValue) -> ComplexValue {
        match self {
            StandardMap::Quadratic => quadratic(iterate, parameter),
            StandardMap::ReciprocalQuadratic => reciprocal_quadratic(iterate, parameter),
        }
    }
}

impl fmt::Display for StandardMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
