use serde::Serialize;

use crate::error::Warning;
use crate::note::Channel;

/// Observed velocity bounds over every note-on of the piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VelocityRange {
    pub min: u8,
    pub max: u8,
}

impl Default for VelocityRange {
    fn default() -> Self {
        Self { min: 127, max: 0 }
    }
}

impl VelocityRange {
    pub fn observe(&mut self, velocity: u8) {
        self.min = self.min.min(velocity);
        self.max = self.max.max(velocity);
    }

    /// Zero until at least one velocity has been observed
    pub fn spread(&self) -> u8 {
        self.max.saturating_sub(self.min)
    }
}

/// Counters and warnings owned by a single conversion run
#[derive(Debug, Clone, Default)]
pub struct RunContext {
    pub velocity: VelocityRange,
    /// Notes per channel, indexed by [`Channel::index`]
    pub channel_usage: [usize; 3],
    pub simultaneous_groups: usize,
    pub warnings: Vec<Warning>,
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count_channel(&mut self, channel: Channel) {
        self.channel_usage[channel.index()] += 1;
    }

    pub fn warn(&mut self, warning: Warning) {
        log::warn!("{}", warning);
        self.warnings.push(warning);
    }

    pub fn usage_of(&self, channel: Channel) -> usize {
        self.channel_usage[channel.index()]
    }
}
