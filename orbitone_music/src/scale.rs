// Scale indexing: turning an unbounded integer index into a pitch.
//
// A scale is an ordered list of pitch classes relative to a root of 0
// (natural minor = 0 2 3 5 7 8 10). Indexing past either end wraps around,
// and in octave-aware mode every full wrap adds or subtracts 12 semitones,
// so index 7 of a seven-note scale is the root an octave up and index −1
// is the top degree an octave down.
//
// The free functions work on any pitch slice and fail with `EmptyScale` when
// given nothing to index. `Scale` is the validated form (non-empty, no
// duplicate pitches) that the chord assembler holds; its operations cannot
// fail. Scales are never mutated after construction: transposition and
// rotation build new ones.
//
// Also here: mode rotation, skip-step melodies, and the mod-12 helpers used
// for pitch-class sets.

use crate::error::{MusicError, Result};
use crate::note::is_rest;
use serde::{Deserialize, Serialize};

/// Index into `pitches` with wraparound in both directions.
///
/// Position and octave use floor division, so negative indices count down
/// from the top of the scale. With `octave_aware` the result moves 12
/// semitones per wrap: `wrap(s, k + len, true) == wrap(s, k, true) + 12`.
/// Pitches beyond the `i32` range saturate at its ends.
pub fn wrap(pitches: &[i32], index: i32, octave_aware: bool, root: i32) -> Result<i32> {
    if pitches.is_empty() {
        return Err(MusicError::EmptyScale);
    }
    Ok(wrap_non_empty(pitches, index, octave_aware, root))
}

fn wrap_non_empty(pitches: &[i32], index: i32, octave_aware: bool, root: i32) -> i32 {
    let len = pitches.len() as i64;
    let index = index as i64;
    let position = index.rem_euclid(len) as usize;
    let octave = index.div_euclid(len);
    let pitch = root as i64 + pitches[position] as i64;
    let pitch = if octave_aware { pitch + 12 * octave } else { pitch };
    pitch.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Move every pitch up (or down) by `t` semitones.
pub fn transpose(pitches: &[i32], t: i32) -> Vec<i32> {
    pitches.iter().map(|p| p + t).collect()
}

/// The `m`th mode of `pitches`, counting modes from 1 (m = 1 is the original).
///
/// Element `k` is `wrap(pitches, (m - 1) + k, octave_aware)`, so with
/// `octave_aware` the rotated-in degrees continue upward an octave.
pub fn mode(pitches: &[i32], m: i32, octave_aware: bool) -> Result<Vec<i32>> {
    (0..pitches.len() as i32)
        .map(|k| wrap(pitches, (m - 1) + k, octave_aware, 0))
        .collect()
}

/// Every mode of `pitches`, in order from mode 1.
pub fn modes_all(pitches: &[i32], octave_aware: bool) -> Result<Vec<Vec<i32>>> {
    (1..=pitches.len() as i32)
        .map(|m| mode(pitches, m, octave_aware))
        .collect()
}

/// Pitch classes relative to the first element, in the original order (not sorted).
///
/// `[54, 60, 53]` becomes `[0, 6, 11]`.
pub fn transpose_to_zero(pitches: &[i32]) -> Vec<i32> {
    let Some(&first) = pitches.first() else {
        return Vec::new();
    };
    pitches.iter().map(|&p| add_mod12(p, 12 - first)).collect()
}

/// Walk the scale by relative steps, starting from index 0.
///
/// Each step adds to a running index which is then wrapped into the scale.
/// Rest values pass through unchanged and do not move the index.
pub fn skip_step(pitches: &[i32], steps: &[i32], octave_aware: bool) -> Result<Vec<i32>> {
    let mut index = 0i32;
    steps
        .iter()
        .map(|&step| {
            if is_rest(step) {
                Ok(step)
            } else {
                index += step;
                wrap(pitches, index, octave_aware, 0)
            }
        })
        .collect()
}

/// `(p + x) mod 12`, always in `0..12`.
pub fn add_mod12(p: i32, x: i32) -> i32 {
    (p + x).rem_euclid(12)
}

/// The pitch class that adds to `p` to make an octave: 11 → 1, 0 → 0.
pub fn inv_mod12(p: i32) -> i32 {
    (12 - p.rem_euclid(12)).rem_euclid(12)
}

/// A validated scale: non-empty, no repeated pitches, order preserved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<i32>", into = "Vec<i32>")]
pub struct Scale {
    pitches: Vec<i32>,
}

impl Scale {
    /// Build a scale. Repeated pitches keep their first occurrence.
    pub fn new(pitches: impl IntoIterator<Item = i32>) -> Result<Self> {
        let mut unique: Vec<i32> = Vec::new();
        for p in pitches {
            if !unique.contains(&p) {
                unique.push(p);
            }
        }
        if unique.is_empty() {
            return Err(MusicError::EmptyScale);
        }
        Ok(Scale { pitches: unique })
    }

    /// For the built-in tables, which are known to be non-empty and unique.
    pub(crate) fn from_table(pitches: &[i32]) -> Scale {
        debug_assert!(!pitches.is_empty());
        Scale {
            pitches: pitches.to_vec(),
        }
    }

    pub fn pitches(&self) -> &[i32] {
        &self.pitches
    }

    pub fn len(&self) -> usize {
        self.pitches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pitches.is_empty()
    }

    /// Total version of [`wrap`]: a `Scale` is never empty.
    pub fn wrap(&self, index: i32, octave_aware: bool, root: i32) -> i32 {
        wrap_non_empty(&self.pitches, index, octave_aware, root)
    }

    pub fn transpose(&self, t: i32) -> Scale {
        Scale {
            pitches: transpose(&self.pitches, t),
        }
    }

    /// The `m`th mode (1-based). Rotation never repeats a pitch, with or without octaves.
    pub fn mode(&self, m: i32, octave_aware: bool) -> Scale {
        let pitches = (0..self.len() as i32)
            .map(|k| self.wrap((m - 1) + k, octave_aware, 0))
            .collect();
        Scale { pitches }
    }

    pub fn modes_all(&self, octave_aware: bool) -> Vec<Scale> {
        (1..=self.len() as i32)
            .map(|m| self.mode(m, octave_aware))
            .collect()
    }

    /// See [`transpose_to_zero`]. Returns a plain list since two pitches an
    /// octave apart collapse onto the same class.
    pub fn transpose_to_zero(&self) -> Vec<i32> {
        transpose_to_zero(&self.pitches)
    }
}

impl TryFrom<Vec<i32>> for Scale {
    type Error = MusicError;

    fn try_from(pitches: Vec<i32>) -> Result<Self> {
        Scale::new(pitches)
    }
}

impl From<Scale> for Vec<i32> {
    fn from(scale: Scale) -> Self {
        scale.pitches
    }
}
