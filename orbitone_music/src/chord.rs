// Chord assembly: one trajectory in, one group of simultaneous notes out.
//
// Each recorded sample becomes a note: its phase sector indexes
// (octave-aware) into the scale transposed to the chosen root, and its
// magnitude gives the duration. Notes are kept in trajectory order unless
// they land within a semitone of a note already kept, in which case the
// sample is dropped outright (its duration is not merged anywhere). The
// first sample is always kept.
//
// Durations of 0 (a sample exactly at the origin, or NaN/∞ input) are raised
// to 1: an emitted note always has a duration of at least one tick.

use crate::complex::ComplexValue;
use crate::note::{ChordGroup, NoteEvent};
use crate::quantize::QuantizerParams;
use crate::sampler::Trajectory;
use crate::scale::Scale;

/// Largest pitch distance (semitones) at which a new note counts as a duplicate.
pub const CLUSTER_SEMITONES: u32 = 1;

/// Converts trajectories into chord groups for one scale, root and tuning.
#[derive(Debug, Clone)]
pub struct ChordAssembler {
    /// The scale already transposed by the root.
    rooted: Scale,
    params: QuantizerParams,
}

impl ChordAssembler {
    pub fn new(scale: &Scale, scale_root: i32, params: QuantizerParams) -> Self {
        ChordAssembler {
            rooted: scale.transpose(scale_root),
            params,
        }
    }

    pub fn params(&self) -> &QuantizerParams {
        &self.params
    }

    /// The note a single sample maps to, before deduplication.
    pub fn note_for(&self, sample: ComplexValue) -> NoteEvent {
        let sector = self.params.sector(sample);
        let pitch = self.rooted.wrap(sector as i32, true, 0);
        let duration = self.params.duration(sample).max(1);
        NoteEvent::new(pitch, i32::try_from(duration).unwrap_or(i32::MAX))
    }

    /// Build the chord group for `trajectory`. Empty trajectories give an empty group.
    pub fn assemble(&self, trajectory: Trajectory) -> ChordGroup {
        let mut group = ChordGroup::new();
        for sample in trajectory.samples {
            let note = self.note_for(sample);
            let nearest = group
                .notes
                .iter()
                .map(|kept| kept.pitch.abs_diff(note.pitch))
                .min();
            match nearest {
                Some(distance) if distance <= CLUSTER_SEMITONES => {}
                _ => group.notes.push(note),
            }
        }
        group
    }
}

/// One-shot assembly with the default magnitude bounds.
pub fn assemble(trajectory: Trajectory, scale: &Scale, sector_base: u32, scale_root: i32) -> ChordGroup {
    let params = QuantizerParams {
        sector_base,
        ..QuantizerParams::default()
    };
    ChordAssembler::new(scale, scale_root, params).assemble(trajectory)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::complex::from_polar;
    use crate::scales;

    fn trajectory(samples: Vec<ComplexValue>) -> Trajectory {
        Trajectory {
            seed_index: 0,
            samples,
        }
    }

    #[test]
    fn test_natural_minor_phase_zero() {
        let scale = scales::natural_minor();
        let group = assemble(trajectory(vec![ComplexValue::new(1.0, 0.0)]), &scale, 21, 40);
        assert_eq!(group.notes, vec![NoteEvent::new(40, 1)]);
    }

    #[test]
    fn test_sectors_walk_the_scale() {
        // Base 21 over a 7-note scale spans three octaves.
        let scale = scales::natural_minor();
        let assembler = ChordAssembler::new(&scale, 40, QuantizerParams { sector_base: 21, ..Default::default() });
        let sector_angle = std::f64::consts::TAU / 21.0;

        // Sector 7 (just past its start) is the root an octave up.
        let note = assembler.note_for(from_polar(1.0, sector_angle * 7.5));
        assert_eq!(note.pitch, 52);
        // Sector 9 is the minor third an octave up.
        let note = assembler.note_for(from_polar(1.0, sector_angle * 9.5));
        assert_eq!(note.pitch, 55);
    }

    #[test]
    fn test_first_note_always_kept() {
        let scale = scales::natural_minor();
        let group = assemble(trajectory(vec![from_polar(0.3, 2.0)]), &scale, 12, 60);
        assert_eq!(group.len(), 1);
    }

    #[test]
    fn test_empty_trajectory_gives_empty_group() {
        let scale = scales::natural_minor();
        let group = assemble(trajectory(vec![]), &scale, 12, 60);
        assert!(group.is_empty());
    }

    #[test]
    fn test_near_duplicates_dropped() {
        // Chromatic scale with base 12: each sector is one semitone.
        let chromatic = Scale::new(0..12).unwrap();
        let step = std::f64::consts::TAU / 12.0;
        let samples = vec![
            from_polar(1.0, step * 0.5), // C
            from_polar(2.0, step * 1.5), // C#, within a semitone: dropped
            from_polar(1.0, step * 0.5), // C again: dropped
            from_polar(1.0, step * 2.5), // D, two semitones away: kept
            from_polar(1.0, step * 4.5), // E
        ];
        let group = assemble(trajectory(samples), &chromatic, 12, 60);
        assert_eq!(group.pitches(), vec![60, 62, 64]);
    }

    #[test]
    fn test_dropped_note_duration_is_lost() {
        let chromatic = Scale::new(0..12).unwrap();
        let step = std::f64::consts::TAU / 12.0;
        let samples = vec![from_polar(0.5, step * 0.5), from_polar(2.4, step * 1.5)];
        let group = assemble(trajectory(samples), &chromatic, 12, 60);
        assert_eq!(group.notes, vec![NoteEvent::new(60, 1)]);
    }

    #[test]
    fn test_no_two_notes_within_a_semitone() {
        let scale = scales::messiaen_mode(2).unwrap();
        let assembler = ChordAssembler::new(&scale, 37, QuantizerParams { sector_base: 22, ..Default::default() });
        for k in 0..200 {
            let samples: Vec<ComplexValue> = (0..6)
                .map(|j| from_polar(0.2 + j as f64 * 0.3, (k * 7 + j * 13) as f64 * 0.137))
                .collect();
            let group = assembler.assemble(trajectory(samples));
            for (i, a) in group.notes.iter().enumerate() {
                for b in &group.notes[i + 1..] {
                    assert!(a.pitch.abs_diff(b.pitch) > 1, "{:?}", group.notes);
                }
            }
        }
    }

    #[test]
    fn test_degenerate_samples_still_sound() {
        let scale = scales::natural_minor();
        let group = assemble(
            trajectory(vec![ComplexValue::new(f64::NAN, f64::NAN), ComplexValue::new(0.0, 0.0)]),
            &scale,
            21,
            40,
        );
        // Both quantize to sector 0, so the second is a duplicate.
        assert_eq!(group.notes, vec![NoteEvent::new(40, 1)]);
    }

    #[test]
    fn test_durations_at_least_one() {
        let scale = scales::major();
        let assembler = ChordAssembler::new(&scale, 60, QuantizerParams::default());
        assert_eq!(assembler.note_for(ComplexValue::new(0.0, 0.0)).duration, 1);
        assert_eq!(assembler.note_for(ComplexValue::new(2.0, 0.0)).duration, 2);
    }
}
