//! Arduino sketch rendering under a size ceiling.
//!
//! The sketch is a fixed scaffold (pitch table, tempo, pin constants, playback
//! routine) around two parallel tables: `melody` holds `pitch, code` pairs and
//! `pins` holds one pin per note. Notes are appended one at a time while the
//! size of the complete sketch stays under the ceiling, so a truncated sketch
//! is shorter but still closes every declaration.

use serde::Serialize;

use crate::config::ConvertConfig;
use crate::duration::duration_code;
use crate::note::{Channel, Note};
use crate::pitch::{is_playable, pitch_symbol, PITCH_DEFINES};

pub const TRUNCATION_MARKER: &str = "// Note: Melody truncated due to memory or code size limit";

/// Why emission stopped before the last note
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Truncation {
    /// The next note would have pushed the sketch over the size ceiling
    SizeBudget,
    /// The configured note count was reached
    NoteLimit,
}

/// One row of the output tables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableEntry {
    pub symbol: String,
    pub code: i32,
    pub channel: Channel,
}

impl TableEntry {
    fn melody_line(&self, number: usize) -> String {
        format!("  {},{}, // {}", self.symbol, self.code, number)
    }

    fn pin_line(&self) -> String {
        format!("  {},", self.channel.pin())
    }

    /// Characters this entry adds to the sketch, newlines included
    fn cost(&self, number: usize) -> usize {
        self.melody_line(number).len() + 1 + self.pin_line().len() + 1
    }
}

#[derive(Debug, Clone)]
pub struct Sketch {
    pub source: String,
    pub entries: Vec<TableEntry>,
    pub truncation: Option<Truncation>,
}

impl Sketch {
    pub fn note_count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_truncated(&self) -> bool {
        self.truncation.is_some()
    }

    pub fn len(&self) -> usize {
        self.source.len()
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }
}

/// Renders resolved notes into a sketch
pub struct SketchWriter<'a> {
    config: &'a ConvertConfig,
    ticks_per_quarter: u32,
    tempo_bpm: u32,
}

impl<'a> SketchWriter<'a> {
    pub fn new(config: &'a ConvertConfig, ticks_per_quarter: u32, tempo_bpm: u32) -> Self {
        Self {
            config,
            ticks_per_quarter,
            tempo_bpm,
        }
    }

    /// Emit notes in order until they run out or a limit is hit.
    ///
    /// Notes outside the playable frequency range are skipped without
    /// counting. When a note is refused, trailing entries are dropped until
    /// the truncation marker fits too, so the finished sketch never exceeds
    /// the ceiling once the scaffold itself fits.
    pub fn write(&self, notes: &[Note]) -> Sketch {
        let ceiling = self.config.ceiling();
        let mut used = self.scaffold_len();
        let mut entries = Vec::new();
        let mut costs = Vec::new();
        let mut truncation = None;

        for note in notes {
            if !is_playable(note.frequency) {
                continue;
            }

            if entries.len() >= self.config.max_notes {
                truncation = Some(Truncation::NoteLimit);
                break;
            }

            let entry = TableEntry {
                symbol: pitch_symbol(note.pitch),
                code: duration_code(note.duration_ticks, self.ticks_per_quarter),
                channel: note.channel,
            };
            let cost = entry.cost(entries.len() + 1);
            if used + cost > ceiling {
                truncation = Some(Truncation::SizeBudget);
                break;
            }

            used += cost;
            costs.push(cost);
            entries.push(entry);
        }

        if truncation.is_some() {
            let marker = TRUNCATION_MARKER.len() + 1;
            while used + marker > ceiling {
                match costs.pop() {
                    Some(cost) => {
                        used -= cost;
                        entries.pop();
                    }
                    None => break,
                }
            }
        }

        if let Some(reason) = truncation {
            log::warn!(
                "Melody truncated after {} notes ({:?}, ceiling {} characters)",
                entries.len(),
                reason,
                ceiling
            );
        }

        let source = self.render(&entries, truncation.is_some());
        Sketch {
            source,
            entries,
            truncation,
        }
    }

    /// Size of a sketch with empty tables and no marker
    fn scaffold_len(&self) -> usize {
        self.render(&[], false).len()
    }

    fn render(&self, entries: &[TableEntry], truncated: bool) -> String {
        let mut lines = self.header();

        lines.push("int melody[] = {".to_string());
        lines.extend(
            entries
                .iter()
                .enumerate()
                .map(|(idx, entry)| entry.melody_line(idx + 1)),
        );
        lines.push("};".to_string());
        if truncated {
            lines.push(TRUNCATION_MARKER.to_string());
        }

        lines.push(String::new());
        lines.push("int pins[] = {".to_string());
        lines.extend(entries.iter().map(TableEntry::pin_line));
        lines.push("};".to_string());

        lines.extend(self.playback_routine());

        let mut source = lines.join("\n");
        source.push('\n');
        source
    }

    fn header(&self) -> Vec<String> {
        let mut lines = vec!["// Arduino code generated from MIDI file".to_string()];
        if let Some(timestamp) = &self.config.timestamp {
            lines.push(format!("// Generated by midi-to-arduino on {}", timestamp));
        }
        lines.push(String::new());

        lines.extend(
            PITCH_DEFINES
                .iter()
                .map(|(name, freq)| format!("#define {:<8} {}", name, freq)),
        );

        lines.push(String::new());
        lines.push(format!("int tempo = {};", self.tempo_bpm));
        lines.push(String::new());
        lines.extend(
            Channel::ALL
                .iter()
                .map(|c| format!("const int {} = {};", c.constant_name(), c.pin())),
        );
        lines.push(String::new());
        lines
    }

    fn playback_routine(&self) -> Vec<String> {
        let mut lines: Vec<String> = [
            "",
            "int notes = sizeof(melody) / sizeof(melody[0]) / 2;",
            "",
            "int wholenote = (60000 * 4) / tempo;",
            "",
            "int noteDuration(int divider) {",
            "  if (divider > 0) {",
            "    return wholenote / divider;",
            "  }",
            "  return wholenote / abs(divider) * 3 / 2;",
            "}",
            "",
            "void setup() {",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        lines.extend(
            Channel::ALL
                .iter()
                .map(|c| format!("  pinMode({}, OUTPUT);", c.constant_name())),
        );

        lines.extend(
            [
                "",
                "  for (int i = 0; i < notes * 2; i += 2) {",
                "    int note1 = melody[i];",
                "    int duration1 = noteDuration(melody[i + 1]);",
                "    int pin1 = pins[i / 2];",
                "",
                "    int note2 = REST;",
                "    int duration2 = 0;",
                "    int pin2 = pin1;",
                "    if (i + 2 < notes * 2 && abs(melody[i + 2] - melody[i]) < 5) {",
                "      note2 = melody[i + 2];",
                "      duration2 = noteDuration(melody[i + 3]);",
                "      pin2 = pins[(i + 2) / 2];",
                "      if (pin2 == pin1) {",
                "        pin2 = (pin1 == 9 ? 10 : pin1 == 10 ? 11 : 9);",
                "      }",
                "      i += 2;",
                "    }",
                "",
                "    if (note1 != REST) {",
                "      tone(pin1, note1, duration1 * 0.9);",
                "    }",
                "    if (note2 != REST) {",
                "      tone(pin2, note2, duration2 * 0.9);",
                "    }",
                "",
                "    int minDuration = duration2 > 0 ? min(duration1, duration2) : duration1;",
            ]
            .iter()
            .map(|s| s.to_string()),
        );
        lines.push(format!("    delay(minDuration + {});", self.config.inter_note_delay_ms));
        lines.extend(
            [
                "    noTone(pin1);",
                "    if (note2 != REST) noTone(pin2);",
                "  }",
                "}",
                "",
                "void loop() {",
                "  // No repeat",
                "}",
            ]
            .iter()
            .map(|s| s.to_string()),
        );
        lines
    }
}
