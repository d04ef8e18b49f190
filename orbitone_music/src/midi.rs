// MIDI output from parts.
//
// Merges the events of every part into one Standard MIDI File track (SMF
// format 0) at 4 ticks per quarter note, so one part tick is a sixteenth.
// The track opens with a name, a C major key signature and the tempo; each
// part contributes its program change, optional channel volume and notes.
//
// Pitches outside the MIDI range are dropped here, with a warning, rather
// than clamped into it. Velocities above 127 are clamped.
//
// Uses the `midly` crate for MIDI writing.

use crate::error::{MusicError, Result};
use crate::part::{EventKind, Part, TimedEvent};
use midly::{
    Format, Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind,
    num::{u4, u7, u15, u24, u28},
};
use std::path::Path;

/// Ticks per quarter note in MIDI output.
pub const TICKS_PER_QUARTER: u16 = 4;

/// Accepted tempo range. The low end keeps microseconds-per-quarter within 24 bits.
pub const MIN_TEMPO_BPM: u32 = 4;
pub const MAX_TEMPO_BPM: u32 = 1000;

const TRACK_NAME: &[u8] = b"orbitone";
const MAX_DELTA: u64 = 0x0FFF_FFFF;

/// Convert parts to MIDI and write to a file.
pub fn write_midi(parts: &[Part], tempo_bpm: u32, path: &Path) -> Result<()> {
    let buf = to_bytes(parts, tempo_bpm)?;
    std::fs::write(path, &buf)?;
    Ok(())
}

/// Convert parts to the bytes of a format-0 MIDI file.
pub fn to_bytes(parts: &[Part], tempo_bpm: u32) -> Result<Vec<u8>> {
    let smf = parts_to_smf(parts, tempo_bpm)?;
    let mut buf = Vec::new();
    smf.write_std(&mut buf)?;
    Ok(buf)
}

/// Convert parts to an in-memory single-track SMF.
pub fn parts_to_smf(parts: &[Part], tempo_bpm: u32) -> Result<Smf<'static>> {
    if !(MIN_TEMPO_BPM..=MAX_TEMPO_BPM).contains(&tempo_bpm) {
        return Err(MusicError::invalid(format!(
            "tempo {tempo_bpm} bpm outside {MIN_TEMPO_BPM}..={MAX_TEMPO_BPM}"
        )));
    }

    let mut smf = Smf::new(Header::new(
        Format::SingleTrack,
        Timing::Metrical(u15::new(TICKS_PER_QUARTER)),
    ));

    let mut track: Track<'static> = vec![
        meta(MetaMessage::TrackName(TRACK_NAME)),
        meta(MetaMessage::KeySignature(0, false)),
        meta(MetaMessage::Tempo(u24::new(60_000_000 / tempo_bpm))),
    ];

    let mut events: Vec<TimedEvent> = parts.iter().flat_map(Part::events).collect();
    events.sort_by_key(|e| (e.tick, e.kind.priority()));

    let mut last_tick: u64 = 0;
    let mut dropped = 0usize;
    for event in events {
        let Some(message) = to_message(event.kind) else {
            if matches!(event.kind, EventKind::NoteOn { .. }) {
                dropped += 1;
            }
            continue;
        };
        let delta = event.tick - last_tick;
        if delta > MAX_DELTA {
            return Err(MusicError::invalid(format!(
                "gap of {delta} ticks before tick {} does not fit a MIDI delta",
                event.tick
            )));
        }
        track.push(TrackEvent {
            delta: u28::new(delta as u32),
            kind: TrackEventKind::Midi {
                channel: u4::new(event.channel),
                message,
            },
        });
        last_tick = event.tick;
    }
    if dropped > 0 {
        tracing::warn!(dropped, "notes outside the MIDI pitch range were left out");
    }

    track.push(meta(MetaMessage::EndOfTrack));
    smf.tracks.push(track);
    Ok(smf)
}

fn meta(message: MetaMessage<'static>) -> TrackEvent<'static> {
    TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(message),
    }
}

fn key(pitch: i32) -> Option<u7> {
    u8::try_from(pitch).ok().filter(|&p| p <= 127).map(u7::new)
}

fn to_message(kind: EventKind) -> Option<MidiMessage> {
    let message = match kind {
        EventKind::ProgramChange { program } => MidiMessage::ProgramChange {
            program: u7::new(program.min(127)),
        },
        EventKind::ControlChange { controller, value } => MidiMessage::Controller {
            controller: u7::new(controller.min(127)),
            value: u7::new(value.min(127)),
        },
        EventKind::NoteOn { pitch, velocity } => MidiMessage::NoteOn {
            key: key(pitch)?,
            vel: u7::new(velocity.min(127)),
        },
        EventKind::NoteOff { pitch } => MidiMessage::NoteOff {
            key: key(pitch)?,
            vel: u7::new(0),
        },
    };
    Some(message)
}
