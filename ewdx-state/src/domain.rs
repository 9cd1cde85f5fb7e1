//! Validated value domains shared by both protocol generations
//!
//! Every controllable parameter with a restricted range has exactly one table
//! or range here. The controller clamps requests through these functions
//! before encoding, whichever generation the device speaks.

use std::ops::RangeInclusive;

/// Receiver gain steps in dB: -3 to +42 in 3 dB steps.
pub const GAIN_STEPS_DB: [i32; 16] = [
    -3, 0, 3, 6, 9, 12, 15, 18, 21, 24, 27, 30, 33, 36, 39, 42,
];

/// Transmitter trim range in dB.
pub const TRIM_RANGE_DB: RangeInclusive<i32> = -12..=6;

/// Tunable RF range in kHz.
pub const FREQUENCY_RANGE_KHZ: RangeInclusive<u32> = 470_200..=1_999_000;

/// Generation-2 receiver low-cut filter corner frequencies in Hz (0 = off).
pub const LOW_CUT_HZ: [i32; 6] = [0, 60, 80, 100, 120, 160];

/// Generation-2 analog output level in dB: -24 to +18 in 6 dB steps.
pub const OUTPUT_LEVEL_DB: [i32; 8] = [-24, -18, -12, -6, 0, 6, 12, 18];

/// Display brightness levels.
pub const BRIGHTNESS_RANGE: RangeInclusive<i64> = 1..=5;

/// Longest channel or bay name a device stores.
pub const NAME_MAX_CHARS: usize = 8;

/// Index of the table entry closest to `value`; ties resolve to the lower entry.
fn nearest_index(table: &[i32], value: i64) -> usize {
    table
        .iter()
        .enumerate()
        .fold((0usize, i64::MAX), |(best, best_distance), (index, &entry)| {
            let distance = (i64::from(entry) - value).abs();
            if distance < best_distance {
                (index, distance)
            } else {
                (best, best_distance)
            }
        })
        .0
}

/// Nearest member of a table.
pub fn nearest(table: &[i32], value: i64) -> i32 {
    table.get(nearest_index(table, value)).copied().unwrap_or_default()
}

/// Clamp a requested gain to the nearest step; out-of-range values land on the endpoints.
pub fn clamp_gain(db: i64) -> i32 {
    nearest(&GAIN_STEPS_DB, db)
}

/// Walk the gain table from the step nearest `current_db`, saturating at both ends.
pub fn step_gain(current_db: i64, increase: bool, steps: u32) -> i32 {
    let last = GAIN_STEPS_DB.len() - 1;
    let start = nearest_index(&GAIN_STEPS_DB, current_db);
    let steps = steps as usize;
    let index = if increase {
        start.saturating_add(steps).min(last)
    } else {
        start.saturating_sub(steps)
    };
    GAIN_STEPS_DB[index]
}

/// Clamp a trim request to [`TRIM_RANGE_DB`].
pub fn clamp_trim(db: i64) -> i32 {
    let clamped = db.clamp(
        i64::from(*TRIM_RANGE_DB.start()),
        i64::from(*TRIM_RANGE_DB.end()),
    );
    clamped as i32
}

/// Clamp a frequency request to [`FREQUENCY_RANGE_KHZ`].
pub fn clamp_frequency(khz: i64) -> u32 {
    let clamped = khz.clamp(
        i64::from(*FREQUENCY_RANGE_KHZ.start()),
        i64::from(*FREQUENCY_RANGE_KHZ.end()),
    );
    clamped as u32
}

/// Nearest supported low-cut corner frequency.
pub fn nearest_low_cut_hz(hz: i64) -> i32 {
    nearest(&LOW_CUT_HZ, hz)
}

/// Nearest supported output level.
pub fn nearest_output_level(db: i64) -> i32 {
    nearest(&OUTPUT_LEVEL_DB, db)
}

/// Clamp a brightness request to [`BRIGHTNESS_RANGE`].
pub fn clamp_brightness(level: i64) -> i64 {
    level.clamp(*BRIGHTNESS_RANGE.start(), *BRIGHTNESS_RANGE.end())
}

/// Truncate a name to [`NAME_MAX_CHARS`] characters.
pub fn truncate_name(name: &str) -> String {
    name.chars().take(NAME_MAX_CHARS).collect()
}
