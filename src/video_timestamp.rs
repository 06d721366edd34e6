//! Wall-clock time for video frames.
//!
//! Recordings carry their start time in the file name as a run of fourteen
//! digits (`YYYYMMDDhhmmss`); every frame time is derived from that and the
//! stream's frame rate.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use once_cell::sync::Lazy;
use regex::Regex;

pub const FALLBACK_FPS: f64 = 30.0;

static START_STAMP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([0-9]{4})([0-9]{2})([0-9]{2})([0-9]{2})([0-9]{2})([0-9]{2})").expect("valid regex"));

static UNSAFE_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9_.-]+").expect("valid regex"));

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot parse timestamp from filename")]
pub struct TimestampNotFound;

pub fn parse_video_start(stem: &str) -> Result<NaiveDateTime, TimestampNotFound> {
    let captures = START_STAMP.captures(stem).ok_or(TimestampNotFound)?;
    let field = |i: usize| -> Result<u32, TimestampNotFound> {
        captures[i].parse().map_err(|_| TimestampNotFound)
    };

    let year = captures[1].parse::<i32>().map_err(|_| TimestampNotFound)?;
    let (month, day) = (field(2)?, field(3)?);
    let (hour, minute, second) = (field(4)?, field(5)?, field(6)?);

    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, minute, second))
        .ok_or(TimestampNotFound)
}

/// Reported frame rates of zero, negative or NaN fall back to 30 fps.
pub fn effective_fps(reported: f64) -> f64 {
    if reported.is_finite() && reported > 0.0 {
        reported
    } else {
        FALLBACK_FPS
    }
}

/// `None` when the offset leaves chrono's representable range, as happens
/// with absurdly small reported frame rates.
pub fn frame_timestamp(start: NaiveDateTime, frame_index: u64, fps: f64) -> Option<NaiveDateTime> {
    let offset_micros = (frame_index as f64 / fps * 1_000_000.0).round();
    if !(offset_micros.abs() < i64::MAX as f64) {
        return None;
    }
    start.checked_add_signed(TimeDelta::microseconds(offset_micros as i64))
}

pub fn format_clock(timestamp: NaiveDateTime) -> String {
    timestamp.format("%H:%M:%S").to_string()
}

pub fn compact_stamp(start: NaiveDateTime) -> String {
    start.format("%Y%m%d_%H%M%S").to_string()
}

pub fn safe_stem(stem: &str) -> String {
    UNSAFE_CHARS.replace_all(stem, "_").into_owned()
}
