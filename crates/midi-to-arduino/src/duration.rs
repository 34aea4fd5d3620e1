/// Subdivisions of a whole note a sketch can express, in match order
pub const SUBDIVISIONS: [i32; 4] = [4, 8, 16, 32];

/// Code used when nothing in [`SUBDIVISIONS`] fits
pub const FALLBACK_CODE: i32 = 8;

const TOLERANCE: f64 = 0.05;
const DOTTED: f64 = 1.5;

/// Pick the signed duration code for a note length.
///
/// Each subdivision is tried plain and then dotted; the first length within
/// 5% wins. Dotted lengths give the negated code. Lengths matching nothing
/// (including unreleased, zero-length notes) fall back to an eighth.
pub fn duration_code(duration_ticks: u64, ticks_per_quarter: u32) -> i32 {
    let actual = duration_ticks as f64;

    for divider in SUBDIVISIONS {
        let expected = whole_note_ticks(ticks_per_quarter) / divider as f64;
        if (actual - expected).abs() < expected * TOLERANCE {
            return divider;
        }

        let dotted = expected * DOTTED;
        if (actual - dotted).abs() < dotted * TOLERANCE {
            return -divider;
        }
    }

    FALLBACK_CODE
}

/// Nominal tick length of a duration code
pub fn code_ticks(code: i32, ticks_per_quarter: u32) -> f64 {
    let plain = whole_note_ticks(ticks_per_quarter) / code.unsigned_abs() as f64;
    if code < 0 {
        plain * DOTTED
    } else {
        plain
    }
}

fn whole_note_ticks(ticks_per_quarter: u32) -> f64 {
    ticks_per_quarter as f64 * 4.0
}
