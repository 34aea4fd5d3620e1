use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ConvertError, Result};
use crate::resolve::PolyphonyMode;

/// Tunables for a conversion. Missing fields in a config file keep their
/// defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    /// Size limit for the whole sketch, in characters
    pub max_code_length: usize,
    /// Reserved below `max_code_length`, never filled with notes
    pub headroom: usize,
    /// Pause after each note (or pair of notes), in milliseconds
    pub inter_note_delay_ms: u32,
    pub max_notes: usize,
    /// Playback tempo written into the sketch. `None` uses the file's first tempo.
    pub tempo_bpm: Option<u32>,
    pub mode: PolyphonyMode,
    /// Written into the sketch header when set
    pub timestamp: Option<String>,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            max_code_length: 69_000,
            headroom: 1_000,
            inter_note_delay_ms: 50,
            max_notes: 200,
            tempo_bpm: Some(130),
            mode: PolyphonyMode::Primary,
            timestamp: None,
        }
    }
}

impl ConvertConfig {
    /// Read a JSON config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path).map_err(|source| ConvertError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&data).map_err(|source| ConvertError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Largest sketch the serializer may produce
    pub fn ceiling(&self) -> usize {
        self.max_code_length.saturating_sub(self.headroom)
    }
}
