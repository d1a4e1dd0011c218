// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Viewport transform between screen and media coordinates.
//!
//! The media is first laid out to fit the viewer (letterboxed on one
//! axis). That fitted layout is the *base*: its scale and top-left corner
//! are remembered, and zoom/pan are expressed relative to it. Annotation
//! coordinates go through [`ViewportTransform::screen_to_media`] when they
//! are written and [`ViewportTransform::media_to_screen`] when they are
//! drawn, so they stay pinned to the media whatever the zoom and pan.

use crate::error::{EngineError, EngineResult};
use crate::util::geometry::{clamp, Bounds, Point, Size};

/// Largest zoom allowed, relative to the intrinsic media size.
pub const MAX_SCALE: f64 = 3.0;

/// Scale change per wheel notch.
pub const ZOOM_INCREMENT: f64 = 0.04;

/// Relative distance to the fitted scale below which zooming out snaps
/// back to the fitted layout.
const SNAP_EPSILON: f64 = 1e-9;

/// Snapshot of every value the transform depends on.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ViewportState {
    pub viewer_width: f64,
    pub viewer_height: f64,
    /// Intrinsic media size.
    pub media_width: f64,
    pub media_height: f64,
    pub aspect_ratio: f64,
    pub scale: f64,
    pub min_scale: f64,
    pub base_scale: f64,
    pub base_top: f64,
    pub base_left: f64,
    /// On-screen position of the media's top-left corner.
    pub media_top: f64,
    pub media_left: f64,
    /// On-screen size of the media.
    pub display_width: f64,
    pub display_height: f64,
}

/// Where a pan gesture started.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanAnchor {
    pub pointer: Point,
    pub media_top: f64,
    pub media_left: f64,
}

/// Pan and zoom state of one viewer, with the mapping between screen
/// pixels and annotation coordinates.
#[derive(Debug, Clone)]
pub struct ViewportTransform {
    state: ViewportState,
    max_scale: f64,
    zoom_increment: f64,
}

impl Default for ViewportTransform {
    fn default() -> Self {
        Self::with_limits(MAX_SCALE, ZOOM_INCREMENT)
    }
}

impl ViewportTransform {
    /// Transform with the default scale ceiling and zoom step.
    pub fn new() -> Self {
        Self::default()
    }

    /// Transform with a custom scale ceiling and per-step zoom increment.
    pub fn with_limits(max_scale: f64, zoom_increment: f64) -> Self {
        Self {
            state: ViewportState {
                aspect_ratio: 1.0,
                scale: 1.0,
                min_scale: 1.0,
                ..ViewportState::default()
            },
            max_scale,
            zoom_increment,
        }
    }

    /// Update the viewer size and refit when media is already known.
    pub fn set_viewer_size(&mut self, viewer: Size) -> EngineResult<()> {
        if !viewer.is_usable() {
            return Err(EngineError::invalid_state(format!(
                "viewer size {}x{} is not usable",
                viewer.width, viewer.height
            )));
        }

        self.state.viewer_width = viewer.width;
        self.state.viewer_height = viewer.height;

        if self.media_size().is_usable() {
            self.fit_to_container()?;
        }
        Ok(())
    }

    /// Record the intrinsic media size, typically once metadata has loaded,
    /// and refit when the viewer size is known.
    pub fn set_media_size(&mut self, media: Size) -> EngineResult<()> {
        if !media.is_usable() {
            return Err(EngineError::invalid_state(format!(
                "media size {}x{} is not usable",
                media.width, media.height
            )));
        }

        self.state.media_width = media.width;
        self.state.media_height = media.height;
        self.state.aspect_ratio = media.aspect_ratio();

        if self.viewer_size().is_usable() {
            self.fit_to_container()?;
        }
        Ok(())
    }

    /// Set both sizes and reset to the fitted layout.
    pub fn fit_to(&mut self, viewer: Size, media: Size) -> EngineResult<()> {
        if !viewer.is_usable() || !media.is_usable() {
            return Err(EngineError::invalid_state(
                "cannot fit media before both sizes are known",
            ));
        }
        self.state.viewer_width = viewer.width;
        self.state.viewer_height = viewer.height;
        self.set_media_size(media)
    }

    /// Reset scale and position so the whole media fits the viewer.
    pub fn fit_to_container(&mut self) -> EngineResult<()> {
        if !self.viewer_size().is_usable() || !self.media_size().is_usable() {
            return Err(EngineError::invalid_state(
                "cannot fit media before both sizes are known",
            ));
        }

        let s = &mut self.state;
        let viewer_aspect = s.viewer_width / s.viewer_height;
        let (height, width, top, left);

        if s.aspect_ratio < viewer_aspect {
            height = s.viewer_height;
            width = height * s.aspect_ratio;
            top = 0.0;
            left = (s.viewer_width - width) / 2.0;
        } else {
            width = s.viewer_width;
            height = width / s.aspect_ratio;
            top = (s.viewer_height - height) / 2.0;
            left = 0.0;
        }

        s.scale = height / s.media_height;
        s.min_scale = s.scale;
        s.base_scale = s.scale;
        s.display_height = height;
        s.display_width = width;
        s.media_top = top;
        s.media_left = left;
        s.base_top = top;
        s.base_left = left;

        log::debug!(
            "Fitted {}x{} media at scale {:.4}, offset ({:.1}, {:.1})",
            s.media_width,
            s.media_height,
            s.scale,
            left,
            top
        );
        Ok(())
    }

    /// Zoom one wheel step around the cursor, keeping the media point under
    /// it in place. Returns the new scale.
    pub fn zoom_at(&mut self, cursor_x: f64, cursor_y: f64, wheel_delta_y: f64) -> EngineResult<f64> {
        self.ensure_fitted("zoom")?;
        ensure_finite("zoom", &[cursor_x, cursor_y, wheel_delta_y])?;

        let direction = if wheel_delta_y == 0.0 {
            0.0
        } else {
            -clamp(wheel_delta_y, -1.0, 1.0).signum()
        };

        let old_scale = self.state.scale;
        let min_scale = self.state.min_scale;
        let new_scale = clamp(
            old_scale + direction * self.zoom_increment,
            min_scale,
            self.upper_scale(),
        );

        if new_scale - min_scale <= SNAP_EPSILON * min_scale {
            self.fit_to_container()?;
            return Ok(self.state.scale);
        }

        let s = &mut self.state;
        let rel_left = cursor_x - s.media_left;
        let rel_top = cursor_y - s.media_top;
        let ds = new_scale / old_scale;

        s.scale = new_scale;
        s.display_height = new_scale * s.media_height;
        s.display_width = s.display_height * s.aspect_ratio;
        s.media_left += rel_left * (1.0 - ds);
        s.media_top += rel_top * (1.0 - ds);

        Ok(new_scale)
    }

    /// Move the media by a raw screen delta.
    pub fn pan(&mut self, dx: f64, dy: f64) -> EngineResult<()> {
        self.ensure_fitted("pan")?;
        ensure_finite("pan", &[dx, dy])?;
        self.state.media_left += dx;
        self.state.media_top += dy;
        Ok(())
    }

    /// Remember the pointer and media position at the start of a pan.
    pub fn begin_pan(&self, pointer: Point) -> PanAnchor {
        PanAnchor {
            pointer,
            media_top: self.state.media_top,
            media_left: self.state.media_left,
        }
    }

    /// Place the media so it has moved as far as the pointer has since
    /// `anchor` was taken.
    pub fn pan_to(&mut self, anchor: &PanAnchor, pointer: Point) -> EngineResult<()> {
        self.ensure_fitted("pan")?;
        ensure_finite(
            "pan",
            &[pointer.x, pointer.y, anchor.pointer.x, anchor.pointer.y, anchor.media_left, anchor.media_top],
        )?;
        self.state.media_left = anchor.media_left + pointer.x - anchor.pointer.x;
        self.state.media_top = anchor.media_top + pointer.y - anchor.pointer.y;
        Ok(())
    }

    /// `(scale factor, dx, dy)` of the screen mapping.
    fn offsets(&self) -> (f64, f64, f64) {
        let s = &self.state;
        let factor = s.scale / s.base_scale;
        let dx = s.media_left - s.base_left * factor;
        let dy = s.media_top - s.base_top * factor;
        (factor, dx, dy)
    }

    /// Map a screen point to the coordinates annotations are stored in.
    /// Exact inverse of [`media_to_screen`](Self::media_to_screen).
    pub fn screen_to_media(&self, screen: Point) -> EngineResult<Point> {
        self.ensure_fitted("map screen coordinates")?;
        let (factor, dx, dy) = self.offsets();
        Ok(Point::new((screen.x - dx) / factor, (screen.y - dy) / factor))
    }

    /// Map stored annotation coordinates back to the screen.
    pub fn media_to_screen(&self, media: Point) -> EngineResult<Point> {
        self.ensure_fitted("map media coordinates")?;
        let (factor, dx, dy) = self.offsets();
        Ok(Point::new(media.x * factor + dx, media.y * factor + dy))
    }

    /// Visible part of the media, in screen coordinates.
    pub fn limits(&self) -> Bounds {
        let s = &self.state;
        Bounds {
            left: s.media_left.max(0.0),
            top: s.media_top.max(0.0),
            right: s.viewer_width.min(s.media_left + s.display_width),
            bottom: s.viewer_height.min(s.media_top + s.display_height),
        }
    }

    /// Whether a screen point lies strictly inside the visible media.
    pub fn in_limits(&self, screen: Point) -> bool {
        self.limits().contains_strict(screen)
    }

    /// Constrain a screen point to the visible media.
    pub fn clamp_point(&self, screen: Point) -> Point {
        self.limits().clamp_point(screen)
    }

    /// True once the media has been fitted at least once.
    pub fn is_fitted(&self) -> bool {
        self.state.base_scale > 0.0 && self.state.base_scale.is_finite()
    }

    fn ensure_fitted(&self, what: &str) -> EngineResult<()> {
        if self.is_fitted() {
            Ok(())
        } else {
            Err(EngineError::invalid_state(format!(
                "cannot {} before media is loaded",
                what
            )))
        }
    }

    /// Zoom ceiling; never below the fitted scale of very small media.
    fn upper_scale(&self) -> f64 {
        self.max_scale.max(self.state.min_scale)
    }

    pub fn state(&self) -> ViewportState {
        self.state
    }

    pub fn scale(&self) -> f64 {
        self.state.scale
    }

    pub fn min_scale(&self) -> f64 {
        self.state.min_scale
    }

    pub fn max_scale(&self) -> f64 {
        self.max_scale
    }

    /// Screen position of the media's top-left corner.
    pub fn media_position(&self) -> Point {
        Point::new(self.state.media_left, self.state.media_top)
    }

    /// On-screen size of the media.
    pub fn media_dimensions(&self) -> Size {
        Size::new(self.state.display_width, self.state.display_height)
    }

    pub fn viewer_size(&self) -> Size {
        Size::new(self.state.viewer_width, self.state.viewer_height)
    }

    /// Intrinsic media size.
    pub fn media_size(&self) -> Size {
        Size::new(self.state.media_width, self.state.media_height)
    }
}

fn ensure_finite(what: &str, values: &[f64]) -> EngineResult<()> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(EngineError::rejected(format!("cannot {} with non-finite input", what)))
    }
}
