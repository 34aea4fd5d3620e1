use std::path::PathBuf;

/// Errors that abort a conversion before any sketch is produced
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("Failed to decode MIDI data from {origin}: {source}")]
    Decode {
        origin: String,
        #[source]
        source: midly::Error,
    },

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConvertError>;

/// Non-fatal anomalies collected while converting
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// A note-on was never released; its duration falls back to zero ticks
    NoMatchingRelease { track: usize, pitch: u8, tick: u64 },
    /// A tempo event of zero microseconds per quarter; it is ignored
    ZeroTempo { track: usize, tick: u64 },
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::NoMatchingRelease { track, pitch, tick } => write!(
                f,
                "track {}: note {} at tick {} has no matching note-off",
                track, pitch, tick
            ),
            Warning::ZeroTempo { track, tick } => {
                write!(f, "track {}: ignoring zero tempo at tick {}", track, tick)
            }
        }
    }
}
