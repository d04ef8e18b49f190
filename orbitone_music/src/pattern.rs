// Integer patterns and note builders.
//
// `Cyc` is an endless cycle over a fixed list of values (plus an optional
// root offset), the usual way of feeding a repeating rhythm or velocity
// pattern into a builder. It never returns `None` and reports an unbounded
// `size_hint`, the same way `std::iter::repeat` does.
//
// `NoteBuilder` zips pitch, duration and velocity streams into notes and
// stops as soon as any stream runs out, so it is finite exactly when one of
// its inputs is. `MultiNoteBuilder` does the same across several note
// streams, yielding one chord per step.
//
// Cycles remember their position: cloning a `Cyc` mid-way continues from
// the same place.

use crate::error::{MusicError, Result};
use crate::note::{DEFAULT_VELOCITY, Note};
use std::iter::{FusedIterator, Repeat, repeat};

/// An infinite cycle through `elements`, each offset by `root`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cyc {
    elements: Vec<i32>,
    root: i32,
    position: usize,
}

impl Cyc {
    pub fn new(elements: impl IntoIterator<Item = i32>) -> Result<Self> {
        let elements: Vec<i32> = elements.into_iter().collect();
        if elements.is_empty() {
            return Err(MusicError::invalid("a cycle needs at least one element"));
        }
        Ok(Cyc {
            elements,
            root: 0,
            position: 0,
        })
    }

    pub fn with_root(mut self, root: i32) -> Self {
        self.root = root;
        self
    }

    /// Number of values in one period.
    pub fn period(&self) -> usize {
        self.elements.len()
    }
}

impl Iterator for Cyc {
    type Item = i32;

    fn next(&mut self) -> Option<i32> {
        let value = self.root + self.elements[self.position];
        self.position = (self.position + 1) % self.elements.len();
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::MAX, None)
    }
}

impl FusedIterator for Cyc {}

/// Builds notes from pitch, duration and velocity streams.
#[derive(Debug, Clone)]
pub struct NoteBuilder<P, D, V = Repeat<u8>> {
    pitches: P,
    durations: D,
    velocities: V,
}

impl<P, D> NoteBuilder<P, D>
where
    P: Iterator<Item = i32>,
    D: Iterator<Item = i32>,
{
    /// Notes at the default velocity.
    pub fn new(pitches: P, durations: D) -> Self {
        NoteBuilder {
            pitches,
            durations,
            velocities: repeat(DEFAULT_VELOCITY),
        }
    }

    pub fn with_velocities<V>(self, velocities: V) -> NoteBuilder<P, D, V>
    where
        V: Iterator<Item = u8>,
    {
        NoteBuilder {
            pitches: self.pitches,
            durations: self.durations,
            velocities,
        }
    }
}

impl<P> NoteBuilder<P, Repeat<i32>>
where
    P: Iterator<Item = i32>,
{
    /// Every note the same length.
    pub fn fixed_duration(pitches: P, duration: i32) -> Self {
        NoteBuilder::new(pitches, repeat(duration))
    }
}

impl<P, D, V> Iterator for NoteBuilder<P, D, V>
where
    P: Iterator<Item = i32>,
    D: Iterator<Item = i32>,
    V: Iterator<Item = u8>,
{
    type Item = Note;

    fn next(&mut self) -> Option<Note> {
        let pitch = self.pitches.next()?;
        let duration = self.durations.next()?;
        let velocity = self.velocities.next()?;
        Some(Note::with_velocity(pitch, duration, velocity))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let (p_lo, p_hi) = self.pitches.size_hint();
        let (d_lo, d_hi) = self.durations.size_hint();
        let (v_lo, v_hi) = self.velocities.size_hint();
        let hi = [p_hi, d_hi, v_hi].into_iter().flatten().min();
        (p_lo.min(d_lo).min(v_lo), hi)
    }
}

/// Zips several note streams into chords, ending with the shortest stream.
///
/// On the step where one stream runs dry, notes already pulled from the
/// other streams that step are discarded, and the builder stays finished.
#[derive(Debug, Clone)]
pub struct MultiNoteBuilder<I> {
    streams: Vec<I>,
}

impl<I: Iterator<Item = Note>> MultiNoteBuilder<I> {
    pub fn new(streams: impl IntoIterator<Item = I>) -> Self {
        MultiNoteBuilder {
            streams: streams.into_iter().collect(),
        }
    }
}

impl<I: Iterator<Item = Note>> Iterator for MultiNoteBuilder<I> {
    type Item = Vec<Note>;

    fn next(&mut self) -> Option<Vec<Note>> {
        if self.streams.is_empty() {
            return None;
        }
        let chord: Option<Vec<Note>> = self.streams.iter_mut().map(Iterator::next).collect();
        if chord.is_none() {
            self.streams.clear();
        }
        chord
    }
}

impl<I: Iterator<Item = Note>> FusedIterator for MultiNoteBuilder<I> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cyc_wraps() {
        let cyc = Cyc::new(0..9).unwrap();
        let taken: Vec<i32> = cyc.take(10).collect();
        assert_eq!(taken, vec![0, 1, 2, 3, 4, 5, 6, 7, 8, 0]);
    }

    #[test]
    fn test_cyc_root() {
        let cyc = Cyc::new([0, 1, 2, 3]).unwrap().with_root(48);
        let taken: Vec<i32> = cyc.take(10).collect();
        assert_eq!(taken, vec![48, 49, 50, 51, 48, 49, 50, 51, 48, 49]);
    }

    #[test]
    fn test_cyc_keeps_position() {
        let mut cyc = Cyc::new([0, 1, 2, 3]).unwrap().with_root(40);
        assert_eq!(cyc.next(), Some(40));
        assert_eq!(cyc.next(), Some(41));
        let mut resumed = cyc.clone();
        assert_eq!(resumed.next(), Some(42));
        assert_eq!(resumed.next(), Some(43));
        assert_eq!(resumed.next(), Some(40));
        assert_eq!(cyc.next(), Some(42));
    }

    #[test]
    fn test_cyc_rejects_empty() {
        assert!(Cyc::new(Vec::new()).is_err());
    }

    #[test]
    fn test_note_builder_finite_with_finite_pitches() {
        let durations = Cyc::new([2, 1]).unwrap();
        let notes: Vec<Note> = NoteBuilder::new([60, 62, 64].into_iter(), durations).collect();
        assert_eq!(
            notes,
            vec![Note::new(60, 2), Note::new(62, 1), Note::new(64, 2)]
        );
    }

    #[test]
    fn test_note_builder_velocities() {
        let pitches = Cyc::new([60, 67]).unwrap();
        let notes: Vec<Note> = NoteBuilder::fixed_duration(pitches, 4)
            .with_velocities([100u8, 80].into_iter())
            .collect();
        assert_eq!(
            notes,
            vec![Note::with_velocity(60, 4, 100), Note::with_velocity(67, 4, 80)]
        );
    }

    #[test]
    fn test_note_builder_size_hint() {
        let builder = NoteBuilder::fixed_duration([1, 2, 3].into_iter(), 1);
        assert_eq!(builder.size_hint(), (3, Some(3)));
    }

    #[test]
    fn test_multi_note_builder() {
        let upper = NoteBuilder::fixed_duration(Cyc::new([72, 74]).unwrap(), 2);
        let lower = NoteBuilder::fixed_duration(Cyc::new([48]).unwrap(), 2);
        let chords: Vec<Vec<Note>> = MultiNoteBuilder::new([upper, lower]).take(2).collect();
        assert_eq!(chords.len(), 2);
        assert_eq!(chords[1], vec![Note::new(74, 2), Note::new(48, 2)]);
    }

    #[test]
    fn test_multi_note_builder_ends_with_shortest() {
        let a = NoteBuilder::fixed_duration(vec![60, 62, 64].into_iter(), 1);
        let b = NoteBuilder::fixed_duration(vec![48].into_iter(), 1);
        assert_eq!(MultiNoteBuilder::new([a, b]).count(), 1);
    }

    #[test]
    fn test_multi_note_builder_stays_finished() {
        let short = NoteBuilder::fixed_duration(vec![60].into_iter(), 1);
        let long = NoteBuilder::fixed_duration(Cyc::new([48]).unwrap(), 1);
        let mut chords = MultiNoteBuilder::new([
            Box::new(short) as Box<dyn Iterator<Item = Note>>,
            Box::new(long),
        ]);
        assert_eq!(chords.next(), Some(vec![Note::new(60, 1), Note::new(48, 1)]));
        assert_eq!(chords.next(), None);
        assert_eq!(chords.next(), None);
    }
}
