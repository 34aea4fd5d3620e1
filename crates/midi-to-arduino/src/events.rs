//! Flattening of a parsed Standard MIDI File into per-track raw events.
//!
//! Only the events the converter cares about keep their payload. Everything
//! else is kept as [`EventKind::Other`] so its delta time still moves the
//! track clock forward.

use midly::{MetaMessage, MidiMessage, Smf, Timing, TrackEventKind};
use std::path::Path;

use crate::error::{ConvertError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// New tempo in microseconds per quarter note
    Tempo(u32),
    NoteOn { pitch: u8, velocity: u8 },
    NoteOff { pitch: u8 },
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawEvent {
    /// Ticks since the previous event of the same track
    pub delta: u32,
    pub kind: EventKind,
}

impl RawEvent {
    pub fn new(delta: u32, kind: EventKind) -> Self {
        Self { delta, kind }
    }
}

/// Decoded input: one event list per track plus the file's time base
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventStream {
    pub ticks_per_quarter: u32,
    pub tracks: Vec<Vec<RawEvent>>,
}

impl EventStream {
    pub fn new(ticks_per_quarter: u32, tracks: Vec<Vec<RawEvent>>) -> Self {
        Self {
            ticks_per_quarter,
            tracks,
        }
    }

    /// Read and decode a MIDI file from disk
    pub fn open(path: &Path) -> Result<Self> {
        let data = std::fs::read(path).map_err(|source| ConvertError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::parse_named(&data, &path.display().to_string())
    }

    /// Decode an in-memory Standard MIDI File
    pub fn parse(data: &[u8]) -> Result<Self> {
        Self::parse_named(data, "<memory>")
    }

    fn parse_named(data: &[u8], origin: &str) -> Result<Self> {
        let smf = Smf::parse(data).map_err(|source| ConvertError::Decode {
            origin: origin.to_string(),
            source,
        })?;

        Ok(Self::from_smf(&smf))
    }

    pub fn from_smf(smf: &Smf) -> Self {
        let ticks_per_quarter = match smf.header.timing {
            Timing::Metrical(tpq) => tpq.as_int() as u32,
            // Timecode files have no quarter note; approximate like a 4/4 beat
            Timing::Timecode(fps, subframe) => (fps.as_f32() * subframe as f32 * 4.0) as u32,
        }
        .max(1);

        let tracks = smf
            .tracks
            .iter()
            .map(|track| {
                track
                    .iter()
                    .map(|event| RawEvent::new(event.delta.as_int(), classify(&event.kind)))
                    .collect()
            })
            .collect();

        Self {
            ticks_per_quarter,
            tracks,
        }
    }
}

fn classify(kind: &TrackEventKind) -> EventKind {
    match kind {
        TrackEventKind::Meta(MetaMessage::Tempo(tempo)) => EventKind::Tempo(tempo.as_int()),
        TrackEventKind::Midi { message, .. } => match *message {
            MidiMessage::NoteOn { key, vel } if vel.as_int() > 0 => EventKind::NoteOn {
                pitch: key.as_int(),
                velocity: vel.as_int(),
            },
            // Running-status files release notes with a zero-velocity note-on
            MidiMessage::NoteOn { key, .. } | MidiMessage::NoteOff { key, .. } => {
                EventKind::NoteOff { pitch: key.as_int() }
            }
            _ => EventKind::Other,
        },
        _ => EventKind::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use midly::num::{u15, u24, u28, u4, u7};
    use midly::{Format, Header, TrackEvent};

    fn smf_bytes(events: Vec<TrackEvent<'static>>) -> Vec<u8> {
        let mut smf = Smf::new(Header::new(Format::SingleTrack, Timing::Metrical(u15::new(96))));
        smf.tracks.push(events);
        let mut out = Vec::new();
        smf.write_std(&mut out).unwrap();
        out
    }

    fn midi(delta: u32, message: MidiMessage) -> TrackEvent<'static> {
        TrackEvent {
            delta: u28::new(delta),
            kind: TrackEventKind::Midi {
                channel: u4::new(0),
                message,
            },
        }
    }

    #[test]
    fn test_parse_classifies_events() {
        let bytes = smf_bytes(vec![
            TrackEvent {
                delta: u28::new(0),
                kind: TrackEventKind::Meta(MetaMessage::Tempo(u24::new(400_000))),
            },
            midi(0, MidiMessage::ProgramChange { program: u7::new(5) }),
            midi(10, MidiMessage::NoteOn { key: u7::new(60), vel: u7::new(90) }),
            midi(20, MidiMessage::NoteOn { key: u7::new(60), vel: u7::new(0) }),
            midi(5, MidiMessage::NoteOff { key: u7::new(62), vel: u7::new(64) }),
        ]);

        let stream = EventStream::parse(&bytes).unwrap();
        assert_eq!(stream.ticks_per_quarter, 96);
        assert_eq!(stream.tracks.len(), 1);

        let kinds: Vec<_> = stream.tracks[0].iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds[..5],
            [
                EventKind::Tempo(400_000),
                EventKind::Other,
                EventKind::NoteOn { pitch: 60, velocity: 90 },
                EventKind::NoteOff { pitch: 60 },
                EventKind::NoteOff { pitch: 62 },
            ]
        );
        assert_eq!(stream.tracks[0][3].delta, 20);
    }

    #[test]
    fn test_parse_garbage_is_decode_error() {
        let err = EventStream::parse(b"definitely not a midi file").unwrap_err();
        assert!(matches!(err, ConvertError::Decode { ref origin, .. } if origin == "<memory>"));
    }

    #[test]
    fn test_open_missing_file_is_io_error() {
        let err = EventStream::open(Path::new("/nonexistent/song.mid")).unwrap_err();
        assert!(matches!(err, ConvertError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/song.mid"));
    }
}
