// Named scale tables.
//
// Pitch classes relative to a root of 0, in ascending order. The diatonic
// family covers major and the three minor forms; the Messiaen modes of
// limited transposition are the symmetric scales the built-in presets lean on.

use crate::error::{MusicError, Result};
use crate::scale::Scale;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const MAJOR: [i32; 7] = [0, 2, 4, 5, 7, 9, 11];
pub const NATURAL_MINOR: [i32; 7] = [0, 2, 3, 5, 7, 8, 10];
pub const MELODIC_MINOR_ASCENDING: [i32; 7] = [0, 2, 3, 5, 7, 9, 11];
pub const MELODIC_MINOR_DESCENDING: [i32; 7] = [0, 2, 3, 5, 7, 8, 10];
pub const HARMONIC_MINOR: [i32; 7] = [0, 2, 3, 5, 7, 8, 11];

/// Messiaen's seven modes of limited transposition, index 0 = mode 1.
pub const MESSIAEN_MODES: [&[i32]; 7] = [
    &[0, 2, 4, 6, 8, 10],              // whole tone, 2 transpositions
    &[0, 1, 3, 4, 6, 7, 9, 10],        // octatonic, 3 transpositions
    &[0, 2, 3, 4, 6, 7, 8, 10, 11],    // 4 transpositions
    &[0, 1, 2, 5, 6, 7, 10, 11],       // 6 transpositions
    &[0, 1, 5, 6, 10, 11],             // 6 transpositions
    &[0, 2, 4, 5, 6, 8, 10, 11],       // 6 transpositions
    &[0, 1, 2, 3, 5, 6, 7, 8, 10, 11], // 6 transpositions
];

fn table(pitches: &[i32]) -> Scale {
    Scale::from_table(pitches)
}

pub fn major() -> Scale {
    table(&MAJOR)
}

pub fn natural_minor() -> Scale {
    table(&NATURAL_MINOR)
}

pub fn melodic_minor_ascending() -> Scale {
    table(&MELODIC_MINOR_ASCENDING)
}

pub fn melodic_minor_descending() -> Scale {
    table(&MELODIC_MINOR_DESCENDING)
}

pub fn harmonic_minor() -> Scale {
    table(&HARMONIC_MINOR)
}

/// Messiaen mode `n`, for `n` in 1..=7.
pub fn messiaen_mode(n: u8) -> Result<Scale> {
    match n {
        1..=7 => Ok(table(MESSIAEN_MODES[n as usize - 1])),
        _ => Err(MusicError::invalid(format!("no Messiaen mode {n}, expected 1..=7"))),
    }
}

/// A scale table selectable by name in configs and on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleName {
    Major,
    NaturalMinor,
    MelodicMinorAscending,
    MelodicMinorDescending,
    HarmonicMinor,
    MessiaenMode1,
    MessiaenMode2,
    MessiaenMode3,
    MessiaenMode4,
    MessiaenMode5,
    MessiaenMode6,
    MessiaenMode7,
}

impl ScaleName {
    pub const ALL: [ScaleName; 12] = [
        ScaleName::Major,
        ScaleName::NaturalMinor,
        ScaleName::MelodicMinorAscending,
        ScaleName::MelodicMinorDescending,
        ScaleName::HarmonicMinor,
        ScaleName::MessiaenMode1,
        ScaleName::MessiaenMode2,
        ScaleName::MessiaenMode3,
        ScaleName::MessiaenMode4,
        ScaleName::MessiaenMode5,
        ScaleName::MessiaenMode6,
        ScaleName::MessiaenMode7,
    ];

    pub fn pitches(self) -> &'static [i32] {
        match self {
            ScaleName::Major => &MAJOR,
            ScaleName::NaturalMinor => &NATURAL_MINOR,
            ScaleName::MelodicMinorAscending => &MELODIC_MINOR_ASCENDING,
            ScaleName::MelodicMinorDescending => &MELODIC_MINOR_DESCENDING,
            ScaleName::HarmonicMinor => &HARMONIC_MINOR,
            ScaleName::MessiaenMode1 => MESSIAEN_MODES[0],
            ScaleName::MessiaenMode2 => MESSIAEN_MODES[1],
            ScaleName::MessiaenMode3 => MESSIAEN_MODES[2],
            ScaleName::MessiaenMode4 => MESSIAEN_MODES[3],
            ScaleName::MessiaenMode5 => MESSIAEN_MODES[4],
            ScaleName::MessiaenMode6 => MESSIAEN_MODES[5],
            ScaleName::MessiaenMode7 => MESSIAEN_MODES[6],
        }
    }

    pub fn scale(self) -> Scale {
        table(self.pitches())
    }

    pub fn name(self) -> &'static str {
        match self {
            ScaleName::Major => "major",
            ScaleName::NaturalMinor => "natural_minor",
            ScaleName::MelodicMinorAscending => "melodic_minor_ascending",
            ScaleName::MelodicMinorDescending => "melodic_minor_descending",
            ScaleName::HarmonicMinor => "harmonic_minor",
            ScaleName::MessiaenMode1 => "messiaen_mode1",
            ScaleName::MessiaenMode2 => "messiaen_mode2",
            ScaleName::MessiaenMode3 => "messiaen_mode3",
            ScaleName::MessiaenMode4 => "messiaen_mode4",
            ScaleName::MessiaenMode5 => "messiaen_mode5",
            ScaleName::MessiaenMode6 => "messiaen_mode6",
            ScaleName::MessiaenMode7 => "messiaen_mode7",
        }
    }
}

impl fmt::Display for ScaleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ScaleName {
    type Err = MusicError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase().replace(['-', ' '], "_");
        ScaleName::ALL
            .into_iter()
            .find(|n| n.name() == wanted)
            .ok_or_else(|| MusicError::invalid(format!("unknown scale '{s}'")))
    }
}
