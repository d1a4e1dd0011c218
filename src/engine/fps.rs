// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Frame-rate estimation from presented-frame callbacks.
//!
//! Video containers do not reliably report their frame rate, so it is
//! derived from playback instead. Each presented frame reports the media
//! time and the running count of presented frames. The time advanced per
//! frame between two reports is one sample; the estimate is the rounded
//! reciprocal of the sample mean, corrected for the playback rate.
//!
//! Samples are dropped while the window lacks focus (callbacks are
//! throttled in the background) and across seeks (the delta would span
//! two unrelated positions). Once the window is full the estimate is
//! considered stable and the driver can stop feeding it.

use std::collections::VecDeque;

/// Number of samples after which the estimate is considered stable.
pub const DEFAULT_WINDOW: usize = 50;

/// Estimates a video's frame rate from the media time between presented
/// frames, averaged over a bounded window of samples.
#[derive(Debug, Clone)]
pub struct FrameRateEstimator {
    window: VecDeque<f64>,
    capacity: usize,
    last_media_time: Option<f64>,
    last_frame_number: Option<u64>,
    seeked: bool,
    estimate: Option<f64>,
}

impl Default for FrameRateEstimator {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_WINDOW)
    }
}

impl FrameRateEstimator {
    /// Estimator with the default 50-sample window.
    pub fn new() -> Self {
        Self::default()
    }

    /// Estimator that stabilizes after `capacity` samples (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            window: VecDeque::with_capacity(capacity),
            capacity,
            last_media_time: None,
            last_frame_number: None,
            seeked: false,
            estimate: None,
        }
    }

    /// Feed one presented-frame report.
    ///
    /// Returns the updated estimate when the sample was accepted and `None`
    /// when it was dropped. The reference point always moves to this report.
    pub fn sample(
        &mut self,
        media_time: f64,
        presented_frames: u64,
        playback_rate: f64,
        has_focus: bool,
    ) -> Option<f64> {
        let delta = match (self.last_media_time, self.last_frame_number) {
            (Some(last_time), Some(last_frame)) => {
                let d_time = (media_time - last_time).abs();
                let d_frames = presented_frames.abs_diff(last_frame) as f64;
                d_time / d_frames
            }
            _ => f64::NAN,
        };

        let accepted = delta.is_finite()
            && delta > 0.0
            && delta < 1.0
            && has_focus
            && !self.seeked
            && playback_rate.is_finite()
            && playback_rate > 0.0
            && !self.is_stable();

        self.seeked = false;
        self.last_media_time = Some(media_time);
        self.last_frame_number = Some(presented_frames);

        if !accepted {
            log::trace!("Dropped frame-time sample {}", delta);
            return None;
        }

        self.window.push_back(delta);
        let mean = self.window.iter().sum::<f64>() / self.window.len() as f64;
        let fps = (1.0 / mean).round() / playback_rate;
        self.estimate = Some(fps);

        if self.is_stable() {
            log::debug!("Frame rate settled at {} fps", fps);
        }

        Some(fps)
    }

    /// Playback jumped: drop the last sample and ignore the next report.
    pub fn on_seek(&mut self) {
        self.window.pop_back();
        self.seeked = true;
    }

    pub fn current_estimate(&self) -> Option<f64> {
        self.estimate
    }

    /// True once the sample window is full.
    pub fn is_stable(&self) -> bool {
        self.window.len() >= self.capacity
    }

    /// Whether the frame callback driver should keep re-arming itself.
    pub fn wants_samples(&self) -> bool {
        !self.is_stable()
    }

    pub fn sample_count(&self) -> usize {
        self.window.len()
    }

    /// Forget everything, e.g. when another video is loaded.
    pub fn reset(&mut self) {
        *self = Self::with_capacity(self.capacity);
    }
}
