// Orbitone: chord material from complex-dynamics orbits.
//
// Seeds are spread evenly on a circle in the complex plane and iterated
// under a dynamical map (z² + c, 1/z² − c, or any closure). Iterates at
// chosen depths are snapshotted, and each snapshot is quantized into a note:
// its phase picks a sector that indexes a musical scale, its magnitude picks
// a duration. The notes from one orbit form a chord, with near-duplicate
// pitches removed.
//
// Architecture:
// - complex.rs: Complex values, the `DynamicalMap` trait, the standard maps
// - sampler.rs: Circle seeding, orbit iteration, depth snapshots (lazy or rayon)
// - quantize.rs: Phase → sector and magnitude → duration
// - scale.rs: Scale indexing with octave wrap, transposition, modes
// - scales.rs: Named scale tables (diatonic, Messiaen modes)
// - chord.rs: Trajectory → chord group with semitone-cluster removal
// - note.rs: Note values, rests, pitch names
// - pattern.rs: Cycles and note builders for hand-written material
// - part.rs: Tick timeline for one MIDI channel
// - midi.rs: Format-0 MIDI file output
// - config.rs: JSON composition config and built-in presets
// - compose.rs: Runs the sampling passes of a config into a part
// - error.rs: Crate error type
//
// Everything is deterministic: the same config always gives the same file.

pub mod chord;
pub mod complex;
pub mod compose;
pub mod config;
pub mod error;
pub mod midi;
pub mod note;
pub mod part;
pub mod pattern;
pub mod quantize;
pub mod sampler;
pub mod scale;
pub mod scales;

pub use error::{MusicError, Result};
