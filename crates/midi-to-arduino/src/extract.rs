use std::collections::HashMap;

use crate::context::RunContext;
use crate::error::Warning;
use crate::events::{EventKind, EventStream};
use crate::note::Note;
use crate::tempo::TempoChange;

/// Notes and tempo changes pulled out of every track, still in tick time
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub notes: Vec<Note>,
    pub tempo_changes: Vec<TempoChange>,
}

/// Collect notes and tempo changes from all tracks.
///
/// Each track keeps its own tick clock. A note-on is closed by the first
/// note-off of the same pitch that follows it in the same track; note-ons
/// still open at the end of the track keep a zero duration.
pub fn extract(stream: &EventStream, ctx: &mut RunContext) -> Extraction {
    let mut extraction = Extraction::default();

    for (track_idx, track) in stream.tracks.iter().enumerate() {
        let mut now: u64 = 0;
        // pitch -> indices into extraction.notes still waiting for a release
        let mut pending: HashMap<u8, Vec<usize>> = HashMap::new();

        for event in track {
            now += event.delta as u64;

            match event.kind {
                EventKind::Tempo(0) => {
                    ctx.warn(Warning::ZeroTempo {
                        track: track_idx,
                        tick: now,
                    });
                }
                EventKind::Tempo(micros_per_quarter) => {
                    extraction.tempo_changes.push(TempoChange::new(now, micros_per_quarter));
                }
                EventKind::NoteOn { pitch, velocity } => {
                    ctx.velocity.observe(velocity);
                    pending.entry(pitch).or_default().push(extraction.notes.len());
                    extraction.notes.push(Note::new(now, 0, pitch, velocity));
                }
                EventKind::NoteOff { pitch } => {
                    if let Some(open) = pending.remove(&pitch) {
                        for idx in open {
                            let note = &mut extraction.notes[idx];
                            note.duration_ticks = now - note.start_ticks;
                        }
                    }
                }
                EventKind::Other => {}
            }
        }

        let mut unreleased: Vec<usize> = pending.into_values().flatten().collect();
        unreleased.sort_unstable();
        for idx in unreleased {
            let note = &extraction.notes[idx];
            ctx.warn(Warning::NoMatchingRelease {
                track: track_idx,
                pitch: note.pitch,
                tick: note.start_ticks,
            });
        }
    }

    log::debug!(
        "extracted {} notes and {} tempo changes from {} tracks",
        extraction.notes.len(),
        extraction.tempo_changes.len(),
        stream.tracks.len()
    );

    extraction
}
