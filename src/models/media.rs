// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Loaded media description.

use crate::util::geometry::Size;

/// What kind of media is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

/// Intrinsic properties of the loaded media.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MediaInfo {
    pub kind: MediaKind,
    /// Size in pixels of the original, unscaled media.
    pub size: Size,
    /// Duration in seconds; zero for images.
    pub duration: f64,
}

impl MediaInfo {
    pub fn image(width: f64, height: f64) -> Self {
        Self {
            kind: MediaKind::Image,
            size: Size::new(width, height),
            duration: 0.0,
        }
    }

    pub fn video(width: f64, height: f64, duration: f64) -> Self {
        Self {
            kind: MediaKind::Video,
            size: Size::new(width, height),
            duration,
        }
    }

    pub fn is_video(&self) -> bool {
        self.kind == MediaKind::Video
    }
}
