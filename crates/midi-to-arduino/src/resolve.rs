//! Polyphony reduction: group notes that start together and decide which of
//! them reach a buzzer, and on which channel.

use serde::{Deserialize, Serialize};
use std::ops::Range;

use crate::context::{RunContext, VelocityRange};
use crate::note::{Channel, Note};

/// Notes whose start lies within this many milliseconds of a cluster's first
/// note are treated as simultaneous
pub const CLUSTER_TOLERANCE_MS: f64 = 5.0;

/// Below this velocity spread, velocity says little about a note and pitch
/// class picks the channel instead
const NARROW_VELOCITY_SPREAD: u8 = 10;

/// Channel every note is forced onto in single-channel mode
pub const SINGLE_CHANNEL: Channel = Channel::LargePassive;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PolyphonyMode {
    /// Up to two notes per cluster on distinct channels
    #[default]
    Primary,
    /// First note of each cluster only, all on one channel
    SingleChannel,
}

/// Channel a note would like before clustering
pub fn channel_hint(pitch: u8, velocity: u8, range: VelocityRange) -> Channel {
    if range.spread() < NARROW_VELOCITY_SPREAD {
        match pitch % 3 {
            0 => Channel::SmallPassive,
            1 => Channel::LargePassive,
            _ => Channel::LargeActive,
        }
    } else if velocity < 50 {
        Channel::SmallPassive
    } else if velocity < 90 {
        Channel::LargePassive
    } else {
        Channel::LargeActive
    }
}

/// Give every note its starting channel and count notes per channel.
/// Single-channel mode puts everything on [`SINGLE_CHANNEL`] up front.
pub fn assign_hints(notes: &mut [Note], mode: PolyphonyMode, ctx: &mut RunContext) {
    for note in notes.iter_mut() {
        note.channel = match mode {
            PolyphonyMode::Primary => channel_hint(note.pitch, note.velocity, ctx.velocity),
            PolyphonyMode::SingleChannel => SINGLE_CHANNEL,
        };
        ctx.count_channel(note.channel);
    }
}

/// Index ranges of simultaneous notes in a start-sorted slice.
///
/// A note joins the open cluster when it is within tolerance of the cluster's
/// first note. The anchor never moves, so a dense run of onsets can be split
/// even when neighbours across the split are within tolerance of each other.
pub fn clusters(notes: &[Note]) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let mut start = 0;

    while start < notes.len() {
        let anchor = notes[start].start_ms;
        let mut end = start + 1;
        while end < notes.len() && (notes[end].start_ms - anchor).abs() < CLUSTER_TOLERANCE_MS {
            end += 1;
        }
        ranges.push(start..end);
        start = end;
    }

    ranges
}

/// Cluster-time channel assignment for the notes selected from one cluster.
///
/// The first note keeps its hint when it is allowed, otherwise it takes the
/// first allowed channel. Later notes take the remaining allowed channels in
/// order so no two share one.
pub fn reassign_channels(selected: &mut [Note], allowed: &[Channel]) {
    let mut available: Vec<Channel> = allowed.to_vec();

    for (idx, note) in selected.iter_mut().enumerate() {
        if idx == 0 {
            if !available.contains(&note.channel) {
                if let Some(&default) = available.first() {
                    note.channel = default;
                }
            }
            available.retain(|&c| c != note.channel);
        } else if !available.is_empty() {
            note.channel = available.remove(0);
        }
    }
}

/// Keep the two loudest notes of a cluster, earlier notes first on ties
fn select_primary(cluster: &[Note]) -> Vec<Note> {
    let mut by_velocity: Vec<Note> = cluster.to_vec();
    by_velocity.sort_by(|a, b| b.velocity.cmp(&a.velocity));
    by_velocity.truncate(2);

    reassign_channels(&mut by_velocity, &Channel::ALL);
    by_velocity
}

fn select_single(cluster: &[Note]) -> Vec<Note> {
    let mut first = cluster[0].clone();
    first.channel = SINGLE_CHANNEL;
    vec![first]
}

/// Sort notes by start time and reduce each cluster according to `mode`
pub fn resolve(mut notes: Vec<Note>, mode: PolyphonyMode, ctx: &mut RunContext) -> Vec<Note> {
    notes.sort_by(|a, b| a.start_ms.total_cmp(&b.start_ms));

    let mut resolved = Vec::with_capacity(notes.len());
    for range in clusters(&notes) {
        let cluster = &notes[range];
        if cluster.len() > 1 {
            ctx.simultaneous_groups += 1;
        }

        match mode {
            PolyphonyMode::Primary => resolved.extend(select_primary(cluster)),
            PolyphonyMode::SingleChannel => resolved.extend(select_single(cluster)),
        }
    }

    log::debug!(
        "resolved {} notes down to {} ({} simultaneous groups)",
        notes.len(),
        resolved.len(),
        ctx.simultaneous_groups
    );

    resolved
}
