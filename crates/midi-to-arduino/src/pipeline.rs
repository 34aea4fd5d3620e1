use serde::Serialize;
use std::path::Path;

use crate::config::ConvertConfig;
use crate::context::{RunContext, VelocityRange};
use crate::error::{Result, Warning};
use crate::events::EventStream;
use crate::extract::extract;
use crate::note::Channel;
use crate::resolve::{assign_hints, resolve};
use crate::sketch::{Sketch, SketchWriter, Truncation};
use crate::tempo::{TempoMap, TimeConverter};

/// Advisory numbers about a conversion, printed by the CLI and optionally
/// written out as JSON
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostics {
    pub tempo_bpm: Vec<f64>,
    pub output_tempo_bpm: u32,
    pub velocity_range: VelocityRange,
    pub channel_usage: Vec<ChannelUsage>,
    pub simultaneous_groups: usize,
    pub extracted_notes: usize,
    pub resolved_notes: usize,
    pub emitted_notes: usize,
    pub truncation: Option<Truncation>,
    pub code_length: usize,
    pub warnings: Vec<Warning>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChannelUsage {
    pub channel: Channel,
    pub pin: u8,
    pub notes: usize,
}

#[derive(Debug, Clone)]
pub struct Conversion {
    pub sketch: Sketch,
    pub diagnostics: Diagnostics,
}

/// Run every stage over an already decoded stream
pub fn convert(stream: &EventStream, config: &ConvertConfig) -> Conversion {
    let mut ctx = RunContext::new();

    let extraction = extract(stream, &mut ctx);
    let tempo_map = TempoMap::new(extraction.tempo_changes);
    let converter = TimeConverter::new(&tempo_map, stream.ticks_per_quarter);

    let mut notes = extraction.notes;
    let extracted_notes = notes.len();
    for note in notes.iter_mut() {
        note.start_ms = converter.ticks_to_ms(note.start_ticks);
    }
    assign_hints(&mut notes, config.mode, &mut ctx);

    let resolved = resolve(notes, config.mode, &mut ctx);

    // The sketch divides by its tempo, so it must stay positive
    let output_tempo_bpm = config
        .tempo_bpm
        .filter(|&bpm| bpm > 0)
        .unwrap_or_else(|| tempo_map.initial().bpm() as u32)
        .max(1);
    let sketch = SketchWriter::new(config, stream.ticks_per_quarter, output_tempo_bpm).write(&resolved);

    let diagnostics = Diagnostics {
        tempo_bpm: tempo_map.bpm_list(),
        output_tempo_bpm,
        velocity_range: ctx.velocity,
        channel_usage: Channel::ALL
            .iter()
            .map(|&channel| ChannelUsage {
                channel,
                pin: channel.pin(),
                notes: ctx.usage_of(channel),
            })
            .collect(),
        simultaneous_groups: ctx.simultaneous_groups,
        extracted_notes,
        resolved_notes: resolved.len(),
        emitted_notes: sketch.note_count(),
        truncation: sketch.truncation,
        code_length: sketch.len(),
        warnings: ctx.warnings,
    };

    Conversion { sketch, diagnostics }
}

/// Read, decode and convert a MIDI file
pub fn convert_file(path: &Path, config: &ConvertConfig) -> Result<Conversion> {
    let stream = EventStream::open(path)?;
    Ok(convert(&stream, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{EventKind, RawEvent};
    use crate::resolve::PolyphonyMode;

    fn on(delta: u32, pitch: u8, velocity: u8) -> RawEvent {
        RawEvent::new(delta, EventKind::NoteOn { pitch, velocity })
    }

    fn off(delta: u32, pitch: u8) -> RawEvent {
        RawEvent::new(delta, EventKind::NoteOff { pitch })
    }

    #[test]
    fn test_convert_chord_and_melody() {
        let stream = EventStream::new(
            480,
            vec![
                vec![RawEvent::new(0, EventKind::Tempo(500_000))],
                vec![
                    on(0, 60, 100),
                    on(0, 64, 40),
                    on(0, 67, 70),
                    off(480, 60),
                    off(0, 64),
                    off(0, 67),
                    on(0, 72, 90),
                    off(240, 72),
                ],
            ],
        );

        let conversion = convert(&stream, &ConvertConfig::default());
        let diag = &conversion.diagnostics;

        assert_eq!(diag.tempo_bpm, vec![120.0]);
        assert_eq!(diag.output_tempo_bpm, 130);
        assert_eq!(diag.extracted_notes, 4);
        assert_eq!(diag.resolved_notes, 3);
        assert_eq!(diag.emitted_notes, 3);
        assert_eq!(diag.simultaneous_groups, 1);
        assert_eq!(diag.velocity_range, VelocityRange { min: 40, max: 100 });
        assert!(diag.truncation.is_none());

        let symbols: Vec<&str> = conversion
            .sketch
            .entries
            .iter()
            .map(|e| e.symbol.as_str())
            .collect();
        assert_eq!(symbols, vec!["NOTE_C4", "NOTE_G4", "NOTE_C5"]);
        assert_eq!(conversion.sketch.entries[2].code, 8);
    }

    #[test]
    fn test_source_tempo_when_no_override() {
        let stream = EventStream::new(
            96,
            vec![vec![RawEvent::new(0, EventKind::Tempo(600_000)), on(0, 60, 80), off(96, 60)]],
        );
        let config = ConvertConfig {
            tempo_bpm: None,
            mode: PolyphonyMode::SingleChannel,
            ..Default::default()
        };

        let conversion = convert(&stream, &config);
        assert_eq!(conversion.diagnostics.output_tempo_bpm, 100);
        assert!(conversion.sketch.source.contains("int tempo = 100;"));
        assert_eq!(conversion.sketch.entries[0].channel, Channel::LargePassive);
    }

    #[test]
    fn test_zero_tempo_falls_back_to_default() {
        let stream = EventStream::new(
            480,
            vec![vec![RawEvent::new(0, EventKind::Tempo(0)), on(0, 60, 80), off(480, 60)]],
        );
        let config = ConvertConfig {
            tempo_bpm: None,
            ..Default::default()
        };

        let conversion = convert(&stream, &config);
        assert_eq!(conversion.diagnostics.tempo_bpm, vec![120.0]);
        assert_eq!(conversion.diagnostics.output_tempo_bpm, 120);
        assert!(conversion.sketch.source.contains("int tempo = 120;"));
        assert_eq!(conversion.diagnostics.warnings.len(), 1);
    }

    #[test]
    fn test_zero_tempo_override_uses_source_tempo() {
        let stream = EventStream::new(
            96,
            vec![vec![RawEvent::new(0, EventKind::Tempo(600_000)), on(0, 60, 80), off(96, 60)]],
        );
        let config = ConvertConfig {
            tempo_bpm: Some(0),
            ..Default::default()
        };

        let conversion = convert(&stream, &config);
        assert_eq!(conversion.diagnostics.output_tempo_bpm, 100);
    }

    #[test]
    fn test_sub_one_bpm_source_tempo_is_clamped() {
        // 100 seconds per quarter is 0.6 BPM
        let stream = EventStream::new(96, vec![vec![RawEvent::new(0, EventKind::Tempo(100_000_000))]]);
        let config = ConvertConfig {
            tempo_bpm: None,
            ..Default::default()
        };

        let conversion = convert(&stream, &config);
        assert_eq!(conversion.diagnostics.output_tempo_bpm, 1);
        assert!(conversion.sketch.source.contains("int tempo = 1;"));
    }

    #[test]
    fn test_single_channel_usage_counts_only_its_pin() {
        let stream = EventStream::new(
            480,
            vec![vec![
                on(0, 60, 20),
                on(0, 64, 120),
                off(480, 60),
                off(0, 64),
                on(0, 67, 70),
                off(480, 67),
            ]],
        );
        let config = ConvertConfig {
            mode: PolyphonyMode::SingleChannel,
            ..Default::default()
        };

        let conversion = convert(&stream, &config);
        let usage: Vec<usize> = conversion
            .diagnostics
            .channel_usage
            .iter()
            .map(|u| u.notes)
            .collect();
        assert_eq!(usage, vec![0, 3, 0]);
    }

    #[test]
    fn test_empty_stream_still_renders() {
        let conversion = convert(&EventStream::new(480, Vec::new()), &ConvertConfig::default());
        assert_eq!(conversion.diagnostics.emitted_notes, 0);
        assert!(conversion.sketch.source.contains("int melody[] = {\n};"));
    }
}
