// Note values: what the chord assembler emits and the part layer schedules.
//
// `NoteEvent` is the bare (pitch, duration) pair produced from one complex
// snapshot. `ChordGroup` is the set of simultaneous notes from one trajectory.
// `Note` adds a MIDI velocity for the timeline/MIDI layer.
//
// Pitches are MIDI note numbers held as `i32` so that scale arithmetic can
// go out of the 0–127 range and back without clamping; the MIDI writer drops
// whatever is still out of range at the end. A rest is a pitch far above the
// MIDI range (`REST`), which lets rests survive transposition unchanged.
//
// Durations are in ticks of the part timeline (16 per 4/4 measure by default).

use serde::{Deserialize, Serialize};

/// Pitch value standing for silence.
pub const REST: i32 = 20_000;

/// Anything above this is treated as a rest, even after transposition.
pub const REST_THRESHOLD: i32 = 2_000;

/// Velocity used when none is given.
pub const DEFAULT_VELOCITY: u8 = 64;

pub fn is_rest(pitch: i32) -> bool {
    pitch > REST_THRESHOLD
}

/// One quantized note: a pitch and a duration (always ≥ 1 when built by the assembler).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NoteEvent {
    pub pitch: i32,
    pub duration: i32,
}

impl NoteEvent {
    pub fn new(pitch: i32, duration: i32) -> Self {
        NoteEvent { pitch, duration }
    }
}

/// Notes sounding together, none of them within a semitone of another.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChordGroup {
    pub notes: Vec<NoteEvent>,
}

impl ChordGroup {
    pub fn new() -> Self {
        ChordGroup::default()
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NoteEvent> {
        self.notes.iter()
    }

    pub fn pitches(&self) -> Vec<i32> {
        self.notes.iter().map(|n| n.pitch).collect()
    }

    /// Longest member duration, 0 for an empty group.
    pub fn duration(&self) -> i32 {
        self.notes.iter().map(|n| n.duration).max().unwrap_or(0)
    }
}

impl<'a> IntoIterator for &'a ChordGroup {
    type Item = &'a NoteEvent;
    type IntoIter = std::slice::Iter<'a, NoteEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.notes.iter()
    }
}

/// A note with velocity, as placed on a part timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Note {
    pub pitch: i32,
    pub duration: i32,
    pub velocity: u8,
}

impl Note {
    pub fn new(pitch: i32, duration: i32) -> Self {
        Note {
            pitch,
            duration,
            velocity: DEFAULT_VELOCITY,
        }
    }

    pub fn with_velocity(pitch: i32, duration: i32, velocity: u8) -> Self {
        Note {
            pitch,
            duration,
            velocity,
        }
    }

    pub fn rest(duration: i32) -> Self {
        Note::new(REST, duration)
    }

    pub fn is_rest(&self) -> bool {
        is_rest(self.pitch)
    }
}

impl From<NoteEvent> for Note {
    fn from(event: NoteEvent) -> Self {
        Note::new(event.pitch, event.duration)
    }
}

impl From<&ChordGroup> for Vec<Note> {
    fn from(group: &ChordGroup) -> Self {
        group.notes.iter().copied().map(Note::from).collect()
    }
}

const NAMES_SHARP: [&str; 12] = ["C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B"];
const NAMES_FLAT: [&str; 12] = ["C", "Db", "D", "Eb", "E", "F", "Gb", "G", "Ab", "A", "Bb", "B"];

/// MIDI octave number (middle C, 60, is octave 4).
pub fn midi_octave(pitch: i32) -> i32 {
    pitch.div_euclid(12) - 1
}

/// Pitch class 0–11 of a MIDI pitch.
pub fn pitch_class(pitch: i32) -> i32 {
    pitch.rem_euclid(12)
}

/// Note name with octave using sharps, e.g. 61 → "C#4".
pub fn pitch_name(pitch: i32) -> String {
    format!("{}{}", NAMES_SHARP[pitch_class(pitch) as usize], midi_octave(pitch))
}

/// Parse a note name such as "C4", "c#3" or "Eb7" into a MIDI pitch.
pub fn parse_pitch(name: &str) -> Option<i32> {
    let digits_at = name.find(|c: char| c.is_ascii_digit() || c == '-')?;
    let (letter, octave) = name.split_at(digits_at);
    let octave: i32 = octave.parse().ok()?;
    let pc = parse_pitch_class(letter)?;
    Some((octave + 1) * 12 + pc)
}

/// Pitch class of a bare note name ("F#", "bb", "E").
pub fn parse_pitch_class(name: &str) -> Option<i32> {
    let mut chars = name.chars();
    let letter = chars.next()?.to_ascii_uppercase();
    let accidental: String = chars.collect();
    let canonical = format!("{letter}{accidental}");
    let table = if accidental == "b" { &NAMES_FLAT } else { &NAMES_SHARP };
    table.iter().position(|&n| n == canonical).map(|pc| pc as i32)
}
