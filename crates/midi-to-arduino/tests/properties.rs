//! Property-based checks of the conversion stages using proptest.

use proptest::prelude::*;

use midi_to_arduino::context::RunContext;
use midi_to_arduino::duration::{code_ticks, duration_code, SUBDIVISIONS};
use midi_to_arduino::resolve::{clusters, resolve, SINGLE_CHANNEL};
use midi_to_arduino::sketch::TRUNCATION_MARKER;
use midi_to_arduino::{
    Channel, ConvertConfig, Note, PolyphonyMode, SketchWriter, TempoChange, TempoMap, TimeConverter,
};

fn tempo_changes() -> impl Strategy<Value = Vec<TempoChange>> {
    prop::collection::vec(
        (0u64..100_000, 100_000u32..2_000_000).prop_map(|(t, m)| TempoChange::new(t, m)),
        0..8,
    )
}

fn channel() -> impl Strategy<Value = Channel> {
    prop::sample::select(Channel::ALL.to_vec())
}

fn notes() -> impl Strategy<Value = Vec<Note>> {
    prop::collection::vec(
        (0.0f64..200.0, 0u8..128, 1u8..128, channel()).prop_map(|(start_ms, pitch, velocity, channel)| {
            let mut note = Note::new(0, 480, pitch, velocity);
            note.start_ms = start_ms;
            note.channel = channel;
            note
        }),
        0..40,
    )
}

proptest! {
    /// Later ticks never map to earlier times.
    #[test]
    fn tick_conversion_is_monotonic(
        changes in tempo_changes(),
        tpq in 1u32..2_000,
        ticks in prop::collection::vec(0u64..200_000, 2..20),
    ) {
        let converter = TimeConverter::new(&TempoMap::new(changes), tpq);
        let mut ticks = ticks;
        ticks.sort_unstable();
        for pair in ticks.windows(2) {
            prop_assert!(converter.ticks_to_ms(pair[0]) <= converter.ticks_to_ms(pair[1]));
        }
    }

    /// Decoding a code back to ticks and matching again gives the same code.
    #[test]
    fn duration_code_is_idempotent(duration in 0u64..4_000, tpq in 96u32..=960) {
        let code = duration_code(duration, tpq);
        let ticks = code_ticks(code, tpq).round() as u64;
        prop_assert_eq!(duration_code(ticks, tpq), code);
    }

    /// Codes are always a known subdivision, possibly negated.
    #[test]
    fn duration_code_is_a_subdivision(duration in 0u64..10_000, tpq in 1u32..2_000) {
        let code = duration_code(duration, tpq);
        prop_assert!(SUBDIVISIONS.contains(&code.abs()));
    }

    /// Primary mode keeps at most two notes per cluster, on distinct channels.
    #[test]
    fn primary_mode_bounds_each_cluster(notes in notes()) {
        let mut sorted = notes.clone();
        sorted.sort_by(|a, b| a.start_ms.total_cmp(&b.start_ms));
        let expected: usize = clusters(&sorted).iter().map(|r| r.len().min(2)).sum();

        let mut ctx = RunContext::new();
        let resolved = resolve(notes, PolyphonyMode::Primary, &mut ctx);
        prop_assert_eq!(resolved.len(), expected);

        // Survivors of a cluster are emitted next to each other
        let mut idx = 0;
        for range in clusters(&sorted) {
            let kept = range.len().min(2);
            if kept == 2 {
                prop_assert_ne!(resolved[idx].channel, resolved[idx + 1].channel);
            }
            idx += kept;
        }
    }

    /// Single-channel mode keeps one note per cluster, all on the same pin.
    #[test]
    fn single_channel_mode_is_uniform(notes in notes()) {
        let mut sorted = notes.clone();
        sorted.sort_by(|a, b| a.start_ms.total_cmp(&b.start_ms));
        let cluster_count = clusters(&sorted).len();

        let mut ctx = RunContext::new();
        let resolved = resolve(notes, PolyphonyMode::SingleChannel, &mut ctx);
        prop_assert_eq!(resolved.len(), cluster_count);
        prop_assert!(resolved.iter().all(|n| n.channel == SINGLE_CHANNEL));
    }

    /// The sketch never grows past the ceiling and always closes its tables.
    #[test]
    fn sketch_respects_ceiling(
        notes in notes(),
        room in 0usize..1_500,
        max_notes in 0usize..50,
    ) {
        let base = ConvertConfig { max_notes, ..Default::default() };
        let scaffold = SketchWriter::new(&base, 480, 130).write(&[]).len();
        let config = ConvertConfig {
            max_code_length: scaffold + TRUNCATION_MARKER.len() + 1 + room,
            headroom: 0,
            ..base
        };

        let sketch = SketchWriter::new(&config, 480, 130).write(&notes);
        prop_assert!(sketch.len() <= config.ceiling());
        prop_assert!(sketch.note_count() <= max_notes);
        prop_assert_eq!(sketch.is_truncated(), sketch.source.contains(TRUNCATION_MARKER));
        prop_assert_eq!(sketch.source.matches('{').count(), sketch.source.matches('}').count());
        prop_assert!(sketch.source.ends_with("}\n"), "sketch source must end with a closing brace and newline");
    }
}
