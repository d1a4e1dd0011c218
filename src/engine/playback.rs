// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Video playback clock.
//!
//! Tracks the playback position reported by the external player, forwards
//! presented-frame reports to the [`FrameRateEstimator`] and turns seek
//! requests into clamped target times.

use crate::engine::fps::FrameRateEstimator;
use crate::models::annotation::FrameKey;
use crate::util::timecode::{format_time_in_frames, format_time_in_seconds};

/// Playback position, rate and duration of the loaded video.
#[derive(Debug, Clone)]
pub struct Playback {
    duration: f64,
    current_time: f64,
    playback_rate: f64,
    fps: FrameRateEstimator,
}

impl Playback {
    /// Clock at time zero, rate 1. A negative or non-finite duration
    /// becomes zero.
    pub fn new(duration: f64, fps: FrameRateEstimator) -> Self {
        Self {
            duration: if duration.is_finite() { duration.max(0.0) } else { 0.0 },
            current_time: 0.0,
            playback_rate: 1.0,
            fps,
        }
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn playback_rate(&self) -> f64 {
        self.playback_rate
    }

    pub fn set_playback_rate(&mut self, rate: f64) {
        if rate.is_finite() && rate > 0.0 {
            self.playback_rate = rate;
        }
    }

    /// Key for the annotations of the frame on screen.
    pub fn frame_key(&self) -> FrameKey {
        FrameKey::from_time(self.current_time)
    }

    pub fn fps(&self) -> &FrameRateEstimator {
        &self.fps
    }

    /// Estimated frame rate, once known.
    pub fn estimated_fps(&self) -> Option<f64> {
        self.fps.current_estimate()
    }

    /// Report from the player that a frame was presented.
    ///
    /// Returns the updated fps estimate when the sample was accepted.
    pub fn on_frame_presented(&mut self, media_time: f64, presented_frames: u64, has_focus: bool) -> Option<f64> {
        self.current_time = media_time;
        self.fps
            .sample(media_time, presented_frames, self.playback_rate, has_focus)
    }

    /// Whether the player should keep reporting presented frames.
    pub fn wants_frame_reports(&self) -> bool {
        self.fps.wants_samples()
    }

    /// Jump to `seconds`, or step `frames` frames from the current position
    /// once the frame rate is known. The target is clamped to the video.
    pub fn seek_to(&mut self, seconds: f64, frames: Option<i64>) -> f64 {
        let target = match (self.fps.current_estimate(), frames) {
            (Some(fps), Some(frames)) if fps > 0.0 => self.current_time + frames as f64 / fps,
            _ => seconds,
        };

        let target = if target.is_finite() {
            target.clamp(0.0, self.duration)
        } else {
            self.current_time
        };

        self.current_time = target;
        self.fps.on_seek();
        log::debug!("Seeked to {:.3}s", target);
        target
    }

    /// Start of the `step`-second bucket `direction` buckets away from the
    /// current one.
    pub fn bucket_target(&self, step: f64, direction: i64) -> f64 {
        if !(step.is_finite() && step > 0.0) {
            return self.current_time;
        }
        ((self.current_time / step).floor() + direction as f64) * step
    }

    /// Seek by whole buckets of `step` seconds.
    pub fn skip_buckets(&mut self, step: f64, direction: i64) -> f64 {
        let target = self.bucket_target(step, direction);
        self.seek_to(target, None)
    }

    /// Readout parts for a time in seconds: frames when the rate is known,
    /// whole seconds otherwise.
    pub fn time_parts(&self, value: f64) -> Vec<u64> {
        let value = value.max(0.0);
        match self.fps.current_estimate() {
            Some(fps) if fps > 0.0 => format_time_in_frames((value * fps).round() as u64, fps).to_vec(),
            _ => format_time_in_seconds(value.round() as u64).to_vec(),
        }
    }

    pub fn duration_parts(&self) -> Vec<u64> {
        self.time_parts(self.duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::timecode::format_timestamp;

    fn playing_at_30(duration: f64) -> Playback {
        let mut playback = Playback::new(duration, FrameRateEstimator::new());
        for n in 0..60u64 {
            playback.on_frame_presented(n as f64 / 30.0, n, true);
        }
        playback
    }

    #[test]
    fn test_frame_reports_update_time_and_fps() {
        let playback = playing_at_30(120.0);
        assert_eq!(playback.estimated_fps(), Some(30.0));
        assert!(!playback.wants_frame_reports());
        assert!((playback.current_time() - 59.0 / 30.0).abs() < 1e-9);
        assert_eq!(playback.frame_key(), FrameKey::from_time(59.0 / 30.0));
    }

    #[test]
    fn test_playback_rate_scales_estimate() {
        let mut playback = Playback::new(120.0, FrameRateEstimator::new());
        playback.set_playback_rate(0.0);
        playback.set_playback_rate(f64::NAN);
        assert_eq!(playback.playback_rate(), 1.0);

        playback.set_playback_rate(2.0);
        for n in 0..60u64 {
            playback.on_frame_presented(n as f64 / 30.0, n, true);
        }
        assert_eq!(playback.estimated_fps(), Some(15.0));
    }

    #[test]
    fn test_seek_is_clamped() {
        let mut playback = Playback::new(10.0, FrameRateEstimator::new());
        assert_eq!(playback.seek_to(25.0, None), 10.0);
        assert_eq!(playback.seek_to(-3.0, None), 0.0);
        assert_eq!(playback.seek_to(f64::NAN, None), 0.0);
    }

    #[test]
    fn test_frame_step_needs_fps() {
        let mut playback = Playback::new(10.0, FrameRateEstimator::new());
        playback.seek_to(2.0, None);
        // Without an estimate the seconds argument wins.
        assert_eq!(playback.seek_to(2.0, Some(1)), 2.0);

        let mut playback = playing_at_30(10.0);
        playback.seek_to(1.0, None);
        let stepped = playback.seek_to(1.0, Some(3));
        assert!((stepped - 1.1).abs() < 1e-9);
        let back = playback.seek_to(stepped, Some(-6));
        assert!((back - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_seek_notifies_estimator() {
        let mut playback = Playback::new(10.0, FrameRateEstimator::new());
        for n in 0..5u64 {
            playback.on_frame_presented(n as f64 / 30.0, n, true);
        }
        assert_eq!(playback.fps().sample_count(), 4);
        playback.seek_to(5.0, None);
        assert_eq!(playback.fps().sample_count(), 3);
        assert_eq!(playback.on_frame_presented(5.0, 150, true), None);
    }

    #[test]
    fn test_bucket_skipping() {
        let mut playback = Playback::new(600.0, FrameRateEstimator::new());
        playback.seek_to(12.3, None);
        assert_eq!(playback.bucket_target(5.0, 1), 15.0);
        assert_eq!(playback.bucket_target(5.0, -1), 5.0);
        assert_eq!(playback.bucket_target(60.0, 1), 60.0);
        assert_eq!(playback.skip_buckets(5.0, -1), 5.0);
        assert_eq!(playback.skip_buckets(5.0, -1), 0.0);
        assert_eq!(playback.skip_buckets(5.0, -1), 0.0);
    }

    #[test]
    fn test_time_parts_switch_to_frames() {
        let playback = Playback::new(65.0, FrameRateEstimator::new());
        assert_eq!(format_timestamp(&playback.duration_parts()), "01:05");

        let playback = playing_at_30(65.0);
        assert_eq!(playback.time_parts(65.0), vec![0, 1, 5, 0]);
        assert_eq!(format_timestamp(&playback.time_parts(2.5)), "00:02:15");
    }
}
