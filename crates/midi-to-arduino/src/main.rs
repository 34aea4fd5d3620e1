use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};

use midi_to_arduino::{convert_file, ConvertConfig, Diagnostics, PolyphonyMode};

#[derive(Parser, Debug)]
#[command(name = "midi-to-arduino")]
#[command(about = "Convert MIDI files to Arduino piezo sketches", long_about = None)]
struct Args {
    /// Path to the MIDI file (default: uses first .mid file in current directory)
    #[arg(short, long)]
    midi: Option<PathBuf>,

    /// Output file path (default: `<midi-name>/<midi-name>.ino`)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the sketch to stdout instead of a file
    #[arg(long)]
    stdout: bool,

    /// Suppress informational messages (only errors)
    #[arg(short, long)]
    quiet: bool,

    /// JSON config file; flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Maximum number of notes in the melody
    #[arg(short = 'n', long)]
    max_notes: Option<usize>,

    /// Size limit of the generated sketch in characters
    #[arg(long)]
    max_code_length: Option<usize>,

    /// Pause after each note in milliseconds
    #[arg(short = 'd', long)]
    inter_note_delay: Option<u32>,

    /// Playback tempo written into the sketch
    #[arg(
        short,
        long,
        conflicts_with = "source_tempo",
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    tempo: Option<u32>,

    /// Use the MIDI file's first tempo for playback
    #[arg(long)]
    source_tempo: bool,

    /// One buzzer only: first note of each chord, all on pin 10
    #[arg(short, long)]
    single_channel: bool,

    /// Write conversion diagnostics as JSON to this path
    #[arg(long)]
    report_json: Option<PathBuf>,
}

impl Args {
    fn load_config(&self) -> Result<ConvertConfig> {
        let mut config = match &self.config {
            Some(path) => ConvertConfig::from_file(path)?,
            None => ConvertConfig::default(),
        };

        if let Some(max_notes) = self.max_notes {
            config.max_notes = max_notes;
        }
        if let Some(max_code_length) = self.max_code_length {
            config.max_code_length = max_code_length;
        }
        if let Some(delay) = self.inter_note_delay {
            config.inter_note_delay_ms = delay;
        }
        if self.source_tempo {
            config.tempo_bpm = None;
        } else if let Some(tempo) = self.tempo {
            config.tempo_bpm = Some(tempo);
        }
        if self.single_channel {
            config.mode = PolyphonyMode::SingleChannel;
        }
        config.timestamp = Some(chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string());

        Ok(config)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.quiet { "error" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();

    // Find MIDI file
    let midi_path = if let Some(path) = &args.midi {
        if !path.exists() {
            anyhow::bail!("MIDI file not found: {}", path.display());
        }
        path.clone()
    } else {
        find_first_midi_file()?
    };

    let output_path = match &args.output {
        Some(path) => path.clone(),
        None => default_sketch_path(&midi_path),
    };

    let config = args.load_config()?;

    log::info!("Processing MIDI file: {}", midi_path.display());

    let conversion = convert_file(&midi_path, &config)?;
    log_diagnostics(&conversion.diagnostics);

    if let Some(report_path) = &args.report_json {
        let json = serde_json::to_string_pretty(&conversion.diagnostics)
            .context("Failed to serialize diagnostics")?;
        fs::write(report_path, format!("{}\n", json))
            .with_context(|| format!("Failed to write {}", report_path.display()))?;
    }

    if args.stdout {
        print!("{}", conversion.sketch.source);
    } else {
        if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&output_path, &conversion.sketch.source)
            .with_context(|| format!("Failed to write {}", output_path.display()))?;

        log::info!("Sketch saved to {}", output_path.display());
    }

    Ok(())
}

fn log_diagnostics(diag: &Diagnostics) {
    log::info!("Tempo events (BPM): {:?}", diag.tempo_bpm);
    log::info!(
        "Velocity range: {}..={}",
        diag.velocity_range.min,
        diag.velocity_range.max
    );
    for usage in &diag.channel_usage {
        log::info!("Pin {} ({:?}): {} notes", usage.pin, usage.channel, usage.notes);
    }
    log::info!("Total notes in melody: {}", diag.emitted_notes);
    log::info!("Tempo (BPM): {}", diag.output_tempo_bpm);
    log::info!("Simultaneous note groups: {}", diag.simultaneous_groups);
    log::info!("Code length: {} characters", diag.code_length);
}

/// Arduino wants each sketch in a folder of the same name
fn default_sketch_path(midi_path: &Path) -> PathBuf {
    let stem = midi_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("sketch");
    PathBuf::from(stem).join(format!("{}.ino", stem))
}

fn find_first_midi_file() -> Result<PathBuf> {
    let entries = fs::read_dir(".").context("Failed to read current directory")?;

    for entry in entries {
        let entry = entry?;
        let path = entry.path();

        if path.extension().and_then(|s| s.to_str()) == Some("mid") {
            return Ok(path);
        }
    }

    anyhow::bail!("No MIDI files found in current directory")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tempo_must_be_positive() {
        assert!(Args::try_parse_from(["midi-to-arduino", "--tempo", "0"]).is_err());

        let args = Args::try_parse_from(["midi-to-arduino", "--tempo", "90"]).unwrap();
        assert_eq!(args.tempo, Some(90));
    }

    #[test]
    fn test_tempo_conflicts_with_source_tempo() {
        assert!(Args::try_parse_from(["midi-to-arduino", "-t", "90", "--source-tempo"]).is_err());
    }
}
