//! MIDI to Arduino converter library
//!
//! Turns a Standard MIDI File into a self-contained Arduino sketch that plays
//! the melody on up to three piezo buzzers. The pipeline runs in four stages:
//!
//! - **extract**: notes and tempo changes in tick time, per track
//! - **tempo**: tick to millisecond conversion over the tempo map
//! - **resolve**: cluster simultaneous notes and pick buzzer channels
//! - **sketch**: render the tables under a size ceiling, truncating cleanly

pub mod config;
pub mod context;
pub mod duration;
pub mod error;
pub mod events;
pub mod extract;
pub mod note;
pub mod pipeline;
pub mod pitch;
pub mod resolve;
pub mod sketch;
pub mod tempo;

// Re-export main types for convenience
pub use config::ConvertConfig;
pub use error::{ConvertError, Result, Warning};
pub use events::{EventKind, EventStream, RawEvent};
pub use note::{Channel, Note};
pub use pipeline::{convert, convert_file, Conversion, Diagnostics};
pub use resolve::PolyphonyMode;
pub use sketch::{Sketch, SketchWriter, Truncation};
pub use tempo::{TempoChange, TempoMap, TimeConverter};
