// A part: notes and chords laid out on one MIDI channel's tick timeline.
//
// The part keeps a running cursor. Adding material without an explicit tick
// places it at the cursor and advances the cursor by the material's length:
// sequential notes advance by each note's duration, a chord by its longest
// member. This is how a stream of chord groups turns into a timeline with no
// timing decisions in the generator itself.
//
// Chords are normalized by default (every member gets the chord's longest
// duration). Rests and zero-length notes never produce events. Storage is
// keyed by start tick, so adding at an occupied tick replaces what was there.
//
// `tick_offset` shifts the whole part when exporting, so a finished part
// can be moved as a block. Events come out of `events()` as absolute ticks;
// midi.rs turns them into a file.

use crate::error::{MusicError, Result};
use crate::note::{ChordGroup, Note};
use std::collections::BTreeMap;

/// Default timeline resolution: sixteenth notes in 4/4.
pub const DEFAULT_TICKS_PER_MEASURE: u64 = 16;

/// What happens at a timed event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    ProgramChange { program: u8 },
    ControlChange { controller: u8, value: u8 },
    NoteOn { pitch: i32, velocity: u8 },
    NoteOff { pitch: i32 },
}

impl EventKind {
    /// Ordering among events sharing a tick: setup first, then releases, then attacks.
    pub fn priority(&self) -> u8 {
        match self {
            EventKind::ProgramChange { .. } | EventKind::ControlChange { .. } => 0,
            EventKind::NoteOff { .. } => 1,
            EventKind::NoteOn { .. } => 2,
        }
    }
}

/// A channel event at an absolute tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimedEvent {
    pub tick: u64,
    pub channel: u8,
    pub kind: EventKind,
}

#[derive(Debug, Clone)]
pub struct Part {
    channel: u8,
    program: u8,
    /// Channel volume (CC 7) sent before any notes, if set.
    pub volume: Option<u8>,
    pub ticks_per_measure: u64,
    pub tick_offset: u64,
    cursor: u64,
    notes: BTreeMap<u64, Note>,
    chords: BTreeMap<u64, Vec<Note>>,
}

impl Part {
    /// A part on MIDI `channel` (0–15) playing General MIDI `program` (0–127).
    pub fn new(channel: u8, program: u8) -> Result<Self> {
        if channel > 15 {
            return Err(MusicError::invalid(format!("MIDI channel {channel} outside 0..=15")));
        }
        if program > 127 {
            return Err(MusicError::invalid(format!("MIDI program {program} outside 0..=127")));
        }
        Ok(Part {
            channel,
            program,
            volume: None,
            ticks_per_measure: DEFAULT_TICKS_PER_MEASURE,
            tick_offset: 0,
            cursor: 0,
            notes: BTreeMap::new(),
            chords: BTreeMap::new(),
        })
    }

    /// A part whose program is looked up by instrument name (see [`gm_program`]).
    pub fn with_instrument(channel: u8, instrument: &str) -> Result<Self> {
        let program = gm_program(instrument)
            .ok_or_else(|| MusicError::invalid(format!("unknown instrument '{instrument}'")))?;
        Part::new(channel, program)
    }

    pub fn channel(&self) -> u8 {
        self.channel
    }

    pub fn program(&self) -> u8 {
        self.program
    }

    /// Tick where the next unplaced material will start.
    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    pub fn note_count(&self) -> usize {
        self.notes.len()
    }

    pub fn chord_count(&self) -> usize {
        self.chords.len()
    }

    pub fn chords(&self) -> impl Iterator<Item = (u64, &[Note])> {
        self.chords.iter().map(|(&tick, notes)| (tick, notes.as_slice()))
    }

    /// Place notes one after another starting at `tick`.
    pub fn add_notes_at(&mut self, tick: u64, notes: impl IntoIterator<Item = Note>) {
        self.cursor = tick;
        for note in notes {
            self.notes.insert(self.cursor, note);
            self.cursor += note.duration.max(0) as u64;
        }
    }

    pub fn add_notes(&mut self, notes: impl IntoIterator<Item = Note>) {
        self.add_notes_at(self.cursor, notes);
    }

    pub fn add_note(&mut self, note: Note) {
        self.add_notes([note]);
    }

    /// Place notes sequentially from the start of measure `measure` (0-based).
    pub fn add_at_measure(&mut self, measure: u64, notes: impl IntoIterator<Item = Note>) {
        self.add_notes_at(measure * self.ticks_per_measure, notes);
    }

    /// Place a chord at `tick` and move the cursor past it. Empty chords are ignored.
    pub fn add_chord_at(&mut self, tick: u64, chord: Vec<Note>, normalize: bool) {
        let Some(length) = chord.iter().map(|n| n.duration).max() else {
            return;
        };
        let chord = if normalize {
            chord
                .into_iter()
                .map(|n| Note::with_velocity(n.pitch, length, n.velocity))
                .collect()
        } else {
            chord
        };
        self.cursor = tick + length.max(0) as u64;
        self.chords.insert(tick, chord);
    }

    pub fn add_chord(&mut self, chord: Vec<Note>, normalize: bool) {
        self.add_chord_at(self.cursor, chord, normalize);
    }

    /// Place a chord group from the assembler at the cursor, normalized.
    pub fn add_group(&mut self, group: &ChordGroup) {
        self.add_chord(group.into(), true);
    }

    /// Sequential notes sounding at `tick` (chords are not included).
    pub fn concurrent_notes(&self, tick: u64) -> Vec<(u64, Note)> {
        self.notes
            .range(..=tick)
            .filter(|(start, note)| *start + note.duration.max(0) as u64 > tick)
            .map(|(&start, &note)| (start, note))
            .collect()
    }

    /// Last tick at which anything in the part is still sounding.
    pub fn end_tick(&self) -> u64 {
        let note_end = self
            .notes
            .iter()
            .map(|(&t, n)| t + n.duration.max(0) as u64);
        let chord_end = self
            .chords
            .iter()
            .flat_map(|(&t, c)| c.iter().map(move |n| t + n.duration.max(0) as u64));
        note_end.chain(chord_end).max().unwrap_or(0) + self.tick_offset
    }

    /// All channel events, offset by `tick_offset`, sorted by tick.
    pub fn events(&self) -> Vec<TimedEvent> {
        let at = |tick: u64, kind: EventKind| TimedEvent {
            tick: self.tick_offset + tick,
            channel: self.channel,
            kind,
        };
        let mut events = vec![at(0, EventKind::ProgramChange { program: self.program })];
        if let Some(value) = self.volume {
            events.push(at(0, EventKind::ControlChange { controller: 7, value }));
        }

        let sequential = self.notes.iter().map(|(&t, n)| (t, n));
        let chorded = self
            .chords
            .iter()
            .flat_map(|(&t, chord)| chord.iter().map(move |n| (t, n)));
        for (tick, note) in chorded.chain(sequential) {
            // Rests and notes without length make no sound.
            if note.is_rest() || note.duration <= 0 {
                continue;
            }
            let end = tick + note.duration as u64;
            events.push(at(tick, EventKind::NoteOn { pitch: note.pitch, velocity: note.velocity }));
            events.push(at(end, EventKind::NoteOff { pitch: note.pitch }));
        }

        events.sort_by_key(|e| (e.tick, e.kind.priority()));
        events
    }
}

/// General MIDI program number for a common instrument name, or a bare number.
pub fn gm_program(name: &str) -> Option<u8> {
    let name = name.trim().to_lowercase();
    if let Ok(program) = name.parse::<u8>() {
        return (program <= 127).then_some(program);
    }
    let program = match name.as_str() {
        "piano" | "acoustic grand piano" => 0,
        "bright piano" => 1,
        "electric piano" => 4,
        "harpsichord" => 6,
        "celesta" => 8,
        "glockenspiel" => 9,
        "music box" => 10,
        "vibraphone" => 11,
        "marimba" => 12,
        "xylophone" => 13,
        "tubular bells" => 14,
        "organ" => 19,
        "accordion" => 21,
        "guitar" | "nylon guitar" => 24,
        "steel guitar" => 25,
        "bass" | "acoustic bass" => 32,
        "violin" => 40,
        "viola" => 41,
        "cello" => 42,
        "contrabass" => 43,
        "harp" => 46,
        "strings" => 48,
        "choir" => 52,
        "trumpet" => 56,
        "trombone" => 57,
        "horn" | "french horn" => 60,
        "oboe" => 68,
        "clarinet" => 71,
        "flute" => 73,
        "pad" => 88,
        _ => return None,
    };
    Some(program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::note::NoteEvent;

    #[test]
    fn test_sequential_notes_advance_cursor() {
        let mut part = Part::new(0, 0).unwrap();
        part.add_notes([Note::new(60, 4), Note::rest(2), Note::new(64, 3)]);
        assert_eq!(part.cursor(), 9);
        assert_eq!(part.note_count(), 3);
        assert_eq!(part.end_tick(), 9);
    }

    #[test]
    fn test_chord_normalized_and_advances_by_longest() {
        let mut part = Part::new(0, 0).unwrap();
        part.add_chord(vec![Note::new(60, 1), Note::new(64, 3)], true);
        part.add_chord(vec![Note::new(62, 2)], true);

        let chords: Vec<(u64, &[Note])> = part.chords().collect();
        assert_eq!(chords.len(), 2);
        assert_eq!(chords[0].0, 0);
        assert!(chords[0].1.iter().all(|n| n.duration == 3));
        assert_eq!(chords[1].0, 3);
        assert_eq!(part.cursor(), 5);
    }

    #[test]
    fn test_chord_without_normalize_keeps_durations() {
        let mut part = Part::new(0, 0).unwrap();
        part.add_chord(vec![Note::new(60, 1), Note::new(64, 3)], false);
        let (_, chord) = part.chords().next().unwrap();
        assert_eq!(chord[0].duration, 1);
        assert_eq!(part.cursor(), 3);
    }

    #[test]
    fn test_empty_chord_ignored() {
        let mut part = Part::new(0, 0).unwrap();
        part.add_group(&ChordGroup::new());
        assert_eq!(part.chord_count(), 0);
        assert_eq!(part.cursor(), 0);
    }

    #[test]
    fn test_add_group() {
        let mut part = Part::new(2, 0).unwrap();
        let group = ChordGroup {
            notes: vec![NoteEvent::new(40, 1), NoteEvent::new(47, 2)],
        };
        part.add_group(&group);
        assert_eq!(part.cursor(), 2);
    }

    #[test]
    fn test_add_at_measure() {
        let mut part = Part::new(0, 0).unwrap();
        part.add_at_measure(2, [Note::new(60, 4)]);
        assert_eq!(part.concurrent_notes(32).len(), 1);
        assert_eq!(part.concurrent_notes(35).len(), 1);
        assert!(part.concurrent_notes(36).is_empty());
        assert!(part.concurrent_notes(31).is_empty());
    }

    #[test]
    fn test_events_sorted_and_rests_skipped() {
        let mut part = Part::new(1, 52).unwrap();
        part.volume = Some(100);
        part.add_notes([Note::new(60, 2), Note::rest(1), Note::new(60, 2)]);
        let events = part.events();

        assert_eq!(events[0].kind, EventKind::ProgramChange { program: 52 });
        assert_eq!(events[1].kind, EventKind::ControlChange { controller: 7, value: 100 });
        let note_events: Vec<(u64, EventKind)> = events[2..].iter().map(|e| (e.tick, e.kind)).collect();
        assert_eq!(
            note_events,
            vec![
                (0, EventKind::NoteOn { pitch: 60, velocity: 64 }),
                (2, EventKind::NoteOff { pitch: 60 }),
                (3, EventKind::NoteOn { pitch: 60, velocity: 64 }),
                (5, EventKind::NoteOff { pitch: 60 }),
            ]
        );
        assert!(events.iter().all(|e| e.channel == 1));
    }

    #[test]
    fn test_note_off_precedes_note_on_at_same_tick() {
        let mut part = Part::new(0, 0).unwrap();
        part.add_chord(vec![Note::new(60, 2)], true);
        part.add_chord(vec![Note::new(60, 2)], true);
        let at_two: Vec<EventKind> = part.events().iter().filter(|e| e.tick == 2).map(|e| e.kind).collect();
        assert_eq!(
            at_two,
            vec![
                EventKind::NoteOff { pitch: 60 },
                EventKind::NoteOn { pitch: 60, velocity: 64 },
            ]
        );
    }

    #[test]
    fn test_zero_length_notes_are_silent() {
        let mut part = Part::new(0, 0).unwrap();
        part.add_note(Note::new(60, 0));
        part.add_chord(vec![Note::new(62, 0), Note::new(64, 2)], false);
        part.add_note(Note::new(65, -3));
        let notes: Vec<EventKind> = part
            .events()
            .iter()
            .map(|e| e.kind)
            .filter(|k| k.priority() > 0)
            .collect();
        assert_eq!(
            notes,
            vec![
                EventKind::NoteOn { pitch: 64, velocity: 64 },
                EventKind::NoteOff { pitch: 64 },
            ]
        );
        assert_eq!(part.cursor(), 2);
    }

    #[test]
    fn test_tick_offset() {
        let mut part = Part::new(0, 0).unwrap();
        part.tick_offset = 16;
        part.add_note(Note::new(60, 1));
        let events = part.events();
        assert_eq!(events[0].tick, 16);
        assert_eq!(events.last().unwrap().tick, 17);
        assert_eq!(part.end_tick(), 17);
    }

    #[test]
    fn test_invalid_channel_and_program() {
        assert!(Part::new(16, 0).is_err());
        assert!(Part::new(0, 128).is_err());
        assert!(Part::with_instrument(0, "kazoo").is_err());
    }

    #[test]
    fn test_gm_program() {
        assert_eq!(gm_program("piano"), Some(0));
        assert_eq!(gm_program(" Choir "), Some(52));
        assert_eq!(gm_program("73"), Some(73));
        assert_eq!(gm_program("200"), None);
        assert_eq!(gm_program("theremin"), None);
    }
}
