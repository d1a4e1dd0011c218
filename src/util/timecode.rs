// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Timestamp formatting for the playback readout.
//!
//! Parts are always ordered starting with hours: `[h, m, s]` when only
//! seconds are known, `[h, m, s, f]` once a frame rate is available.

/// Split a frame count into `[hours, minutes, seconds, frames]`.
///
/// A non-positive or non-finite `frame_rate` yields all zeros.
pub fn format_time_in_frames(total_frames: u64, frame_rate: f64) -> [u64; 4] {
    if !(frame_rate.is_finite() && frame_rate > 0.0) {
        return [0; 4];
    }

    let total = total_frames as f64;
    let total_seconds = (total / frame_rate).floor() as u64;
    let frames = (total % frame_rate).floor() as u64;
    let [hours, minutes, seconds] = format_time_in_seconds(total_seconds);
    [hours, minutes, seconds, frames]
}

/// Split a number of seconds into `[hours, minutes, seconds]`.
pub fn format_time_in_seconds(total_seconds: u64) -> [u64; 3] {
    let total_minutes = total_seconds / 60;
    [total_minutes / 60, total_minutes % 60, total_seconds % 60]
}

/// Render time parts as `HH:MM:SS[:FF]`, dropping a zero hour part.
pub fn format_timestamp(parts: &[u64]) -> String {
    parts
        .iter()
        .enumerate()
        .filter(|(i, n)| **n > 0 || *i > 0)
        .map(|(_, n)| format!("{:02}", n))
        .collect::<Vec<_>>()
        .join(":")
}

/// ISO 8601 duration for the hour/minute/second parts, e.g. `PT0H1M5S`.
pub fn iso_duration(parts: &[u64]) -> String {
    let part = |i: usize| parts.get(i).copied().unwrap_or(0);
    format!("PT{}H{}M{}S", part(0), part(1), part(2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seconds_split() {
        assert_eq!(format_time_in_seconds(0), [0, 0, 0]);
        assert_eq!(format_time_in_seconds(65), [0, 1, 5]);
        assert_eq!(format_time_in_seconds(3725), [1, 2, 5]);
    }

    #[test]
    fn test_frames_split() {
        // 2 minutes, 3 seconds and 7 frames at 30 fps
        let total = (2 * 60 + 3) * 30 + 7;
        assert_eq!(format_time_in_frames(total, 30.0), [0, 2, 3, 7]);
        assert_eq!(format_time_in_frames(10, 0.0), [0, 0, 0, 0]);
    }

    #[test]
    fn test_timestamp_drops_zero_hours_only() {
        assert_eq!(format_timestamp(&[0, 0, 5]), "00:05");
        assert_eq!(format_timestamp(&[1, 0, 5]), "01:00:05");
        assert_eq!(format_timestamp(&[0, 2, 3, 7]), "02:03:07");
    }

    #[test]
    fn test_iso_duration() {
        assert_eq!(iso_duration(&[0, 1, 5]), "PT0H1M5S");
        assert_eq!(iso_duration(&[2, 0, 0, 12]), "PT2H0M0S");
    }
}
