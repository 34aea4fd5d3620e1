use serde::Serialize;

use crate::pitch;

/// Output line a note is played on. Each one drives a piezo on its own pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    SmallPassive,
    LargePassive,
    LargeActive,
}

impl Channel {
    /// Canonical order, also the order free channels are handed out in
    pub const ALL: [Channel; 3] = [
        Channel::SmallPassive,
        Channel::LargePassive,
        Channel::LargeActive,
    ];

    pub fn pin(self) -> u8 {
        match self {
            Channel::SmallPassive => 9,
            Channel::LargePassive => 10,
            Channel::LargeActive => 11,
        }
    }

    /// Name of the sketch constant holding this channel's pin
    pub fn constant_name(self) -> &'static str {
        match self {
            Channel::SmallPassive => "pinSmallPassive",
            Channel::LargePassive => "pinLargePassive",
            Channel::LargeActive => "pinLargeActive",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Channel::SmallPassive => 0,
            Channel::LargePassive => 1,
            Channel::LargeActive => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    pub start_ticks: u64,
    /// Zero when the note-on was never released
    pub duration_ticks: u64,
    pub pitch: u8,
    pub velocity: u8,
    pub frequency: f64,
    pub channel: Channel,
    /// Filled in by the time converter
    pub start_ms: f64,
}

impl Note {
    pub fn new(start_ticks: u64, duration_ticks: u64, pitch: u8, velocity: u8) -> Self {
        Self {
            start_ticks,
            duration_ticks,
            pitch,
            velocity,
            frequency: pitch::frequency(pitch),
            channel: Channel::SmallPassive,
            start_ms: 0.0,
        }
    }
}
