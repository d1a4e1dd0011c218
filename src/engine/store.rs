// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Per-frame rectangle annotations.
//!
//! Rectangles are grouped by [`FrameKey`] in insertion order. At most one
//! rectangle is being created at a time; its progress is tracked by
//! [`DraftState`]:
//!
//! ```text
//! Idle --arm--> Armed --begin_drawing--> Drawing --finish_drawing--> Naming
//! Naming --commit_name--> Idle (rectangle settled)
//! Drawing | Naming --cancel_active--> Idle (rectangle discarded)
//! ```
//!
//! Each rectangle being named or shown with its name holds a label checked
//! out of the store's [`ResourcePool`].

use std::collections::BTreeMap;

use crate::engine::pool::ResourcePool;
use crate::engine::viewport::ViewportTransform;
use crate::error::{EngineError, EngineResult};
use crate::models::annotation::{sanitize_name, FrameKey, Rectangle};
use crate::util::geometry::{Bounds, Point};

/// A pooled name label that can be bound to a rectangle.
pub trait NameLabel {
    /// Load the label with the rectangle it is shown next to.
    fn attach(&mut self, rect: &Rectangle);
}

/// Progress of the rectangle currently being created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DraftState {
    #[default]
    Idle,
    /// The next valid click starts a rectangle.
    Armed,
    /// The free corner follows the pointer.
    Drawing { key: FrameKey, index: usize },
    /// Waiting for a name in the label `label`.
    Naming {
        key: FrameKey,
        index: usize,
        label: usize,
    },
}

/// Result of [`AnnotationStore::finish_drawing`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawOutcome {
    /// The rectangle now waits for a name in this label.
    Naming { label: usize },
    /// The rectangle had no area and was dropped.
    Discarded,
}

/// Geometry and style for drawing one rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderedRect {
    pub index: usize,
    /// Normalized bounds in screen coordinates.
    pub bounds: Bounds,
    pub color: [u8; 3],
    pub stroke_alpha: f32,
    pub fill_alpha: f32,
}

/// Rectangles keyed by frame, the single in-progress draft, and the pool
/// of name labels shown for the frame on screen.
pub struct AnnotationStore<L> {
    frames: BTreeMap<FrameKey, Vec<Rectangle>>,
    draft: DraftState,
    labels: ResourcePool<L>,
}

impl<L: NameLabel> AnnotationStore<L> {
    /// Empty store drawing its labels from `labels`.
    pub fn new(labels: ResourcePool<L>) -> Self {
        Self {
            frames: BTreeMap::new(),
            draft: DraftState::Idle,
            labels,
        }
    }

    pub fn draft(&self) -> DraftState {
        self.draft
    }

    /// Allow the next click inside the media to start a rectangle.
    pub fn arm(&mut self) -> EngineResult<()> {
        match self.draft {
            DraftState::Idle => {
                self.draft = DraftState::Armed;
                log::debug!("Armed rectangle creation");
                Ok(())
            }
            DraftState::Armed => Ok(()),
            _ => Err(EngineError::invalid_state(
                "a rectangle is already being created",
            )),
        }
    }

    /// Start a rectangle at a screen point. The point must lie inside the
    /// visible media; otherwise the store stays armed.
    pub fn begin_drawing(
        &mut self,
        key: FrameKey,
        viewport: &ViewportTransform,
        screen: Point,
    ) -> EngineResult<usize> {
        if self.draft != DraftState::Armed {
            return Err(EngineError::invalid_state(
                "rectangle creation is not armed",
            ));
        }
        if !viewport.in_limits(screen) {
            return Err(EngineError::rejected(format!(
                "({:.1}, {:.1}) is outside the visible media",
                screen.x, screen.y
            )));
        }

        let at = viewport.screen_to_media(screen)?;
        let rects = self.frames.entry(key).or_default();
        rects.push(Rectangle::new(at));
        let index = rects.len() - 1;

        self.draft = DraftState::Drawing { key, index };
        log::debug!("Started rectangle {} at ({:.1}, {:.1})", index, at.x, at.y);
        Ok(index)
    }

    /// Move the free corner of the rectangle being drawn to the pointer,
    /// held inside the visible media. Returns whether a rectangle moved.
    pub fn update_drawing(&mut self, viewport: &ViewportTransform, screen: Point) -> EngineResult<bool> {
        let DraftState::Drawing { key, index } = self.draft else {
            return Ok(false);
        };

        let corner = viewport.screen_to_media(viewport.clamp_point(screen))?;
        match self.rect_mut(key, index) {
            Some(rect) => {
                rect.set_corner(corner);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Stop dragging and ask for a name, checking out a label for it.
    pub fn finish_drawing(&mut self) -> EngineResult<DrawOutcome> {
        let DraftState::Drawing { key, index } = self.draft else {
            return Err(EngineError::invalid_state("no rectangle is being drawn"));
        };

        let degenerate = self
            .rect_mut(key, index)
            .map(|rect| rect.is_degenerate())
            .unwrap_or(true);
        if degenerate {
            self.remove(key, index);
            self.draft = DraftState::Idle;
            log::debug!("Discarded zero-area rectangle");
            return Ok(DrawOutcome::Discarded);
        }

        let Some(rect) = self.frames.get_mut(&key).and_then(|r| r.get_mut(index)) else {
            self.draft = DraftState::Idle;
            return Ok(DrawOutcome::Discarded);
        };
        let (label, resource) = self.labels.acquire();
        resource.attach(rect);
        rect.label = Some(label);

        self.draft = DraftState::Naming { key, index, label };
        Ok(DrawOutcome::Naming { label })
    }

    /// Name the rectangle waiting in [`DraftState::Naming`] and settle it.
    ///
    /// An empty name (after sanitizing) is rejected and the rectangle keeps
    /// waiting. Returns the stored name.
    pub fn commit_name(&mut self, text: &str) -> EngineResult<String> {
        let DraftState::Naming { key, index, label } = self.draft else {
            return Err(EngineError::invalid_state("no rectangle is waiting for a name"));
        };

        let name = sanitize_name(text);
        if name.is_empty() {
            return Err(EngineError::rejected("annotation name is empty"));
        }

        if let Some(rect) = self.frames.get_mut(&key).and_then(|r| r.get_mut(index)) {
            rect.name = Some(name.clone());
            if let Some(resource) = self.labels.get_mut(label) {
                resource.attach(rect);
            }
        }

        self.draft = DraftState::Idle;
        log::info!("Named rectangle {} \"{}\"", index, name);
        Ok(name)
    }

    /// Abandon whatever is in progress. A rectangle being drawn or named is
    /// removed and its label returned. Returns whether anything changed.
    pub fn cancel_active(&mut self) -> bool {
        match self.draft {
            DraftState::Idle => return false,
            DraftState::Armed => {}
            DraftState::Drawing { key, index } => {
                self.remove(key, index);
            }
            DraftState::Naming { key, index, label } => {
                self.labels.release(label);
                self.remove(key, index);
            }
        }

        self.draft = DraftState::Idle;
        log::debug!("Cancelled rectangle creation");
        true
    }

    /// Flag the smallest rectangle of `key` strictly containing the screen
    /// point as hovered, clearing every other flag.
    pub fn hit_test(
        &mut self,
        key: FrameKey,
        viewport: &ViewportTransform,
        screen: Point,
    ) -> EngineResult<Option<usize>> {
        let Some(rects) = self.frames.get_mut(&key) else {
            return Ok(None);
        };

        let mut hovered = None;
        let mut best_area = f64::INFINITY;

        for (i, rect) in rects.iter_mut().enumerate() {
            let bounds = screen_bounds(viewport, rect)?;
            let area = bounds.area();
            if bounds.contains_strict(screen) && area < best_area {
                hovered = Some(i);
                best_area = area;
            }
            rect.hovered = false;
        }

        if let Some(i) = hovered {
            rects[i].hovered = true;
        }
        Ok(hovered)
    }

    /// Draw list for one frame, in z-order.
    pub fn render_list(&self, key: FrameKey, viewport: &ViewportTransform) -> EngineResult<Vec<RenderedRect>> {
        let drawing = match self.draft {
            DraftState::Drawing { key: k, index } if k == key => Some(index),
            _ => None,
        };

        self.rectangles_for_frame(key)
            .iter()
            .enumerate()
            .map(|(index, rect)| {
                let (stroke_alpha, fill_alpha) = if drawing == Some(index) {
                    (1.0, 0.0)
                } else if rect.hovered {
                    (1.0, 0.75)
                } else {
                    (0.5, 0.25)
                };
                Ok(RenderedRect {
                    index,
                    bounds: screen_bounds(viewport, rect)?,
                    color: rect.color(),
                    stroke_alpha,
                    fill_alpha,
                })
            })
            .collect()
    }

    /// Screen position of a rectangle's label: its first corner.
    pub fn label_anchor(&self, key: FrameKey, index: usize, viewport: &ViewportTransform) -> EngineResult<Point> {
        let rect = self
            .rectangles_for_frame(key)
            .get(index)
            .ok_or_else(|| EngineError::invalid_state(format!("no rectangle {} in frame", index)))?;
        viewport.media_to_screen(rect.anchor())
    }

    /// Check out a label for every rectangle of `key` that lacks one.
    pub fn show_labels(&mut self, key: FrameKey) {
        let Some(rects) = self.frames.get_mut(&key) else {
            return;
        };
        for rect in rects.iter_mut().filter(|r| r.label.is_none()) {
            let (label, resource) = self.labels.acquire();
            resource.attach(rect);
            rect.label = Some(label);
        }
    }

    /// Return every label to the pool. A rectangle still waiting for its
    /// name is discarded first.
    pub fn hide_labels(&mut self) {
        if matches!(self.draft, DraftState::Naming { .. }) {
            self.cancel_active();
        }
        self.labels.release_all();
        for rect in self.frames.values_mut().flatten() {
            rect.label = None;
        }
    }

    /// Drop all annotations and labels.
    pub fn clear(&mut self) {
        self.cancel_active();
        self.hide_labels();
        self.frames.clear();
    }

    /// Rectangles of one frame, in insertion order.
    pub fn rectangles_for_frame(&self, key: FrameKey) -> &[Rectangle] {
        self.frames.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Frames holding at least one rectangle.
    pub fn frame_keys(&self) -> impl Iterator<Item = FrameKey> + '_ {
        self.frames
            .iter()
            .filter(|(_, rects)| !rects.is_empty())
            .map(|(key, _)| *key)
    }

    pub fn labels(&self) -> &ResourcePool<L> {
        &self.labels
    }

    pub fn labels_mut(&mut self) -> &mut ResourcePool<L> {
        &mut self.labels
    }

    fn rect_mut(&mut self, key: FrameKey, index: usize) -> Option<&mut Rectangle> {
        self.frames.get_mut(&key).and_then(|rects| rects.get_mut(index))
    }

    fn remove(&mut self, key: FrameKey, index: usize) {
        if let Some(rects) = self.frames.get_mut(&key) {
            if index < rects.len() {
                rects.remove(index);
            }
        }
    }
}

fn screen_bounds(viewport: &ViewportTransform, rect: &Rectangle) -> EngineResult<Bounds> {
    let b = rect.bounds();
    let top_left = viewport.media_to_screen(Point::new(b.left, b.top))?;
    let bottom_right = viewport.media_to_screen(Point::new(b.right, b.bottom))?;
    Ok(Bounds::from_corners(top_left, bottom_right))
}

impl<L> std::fmt::Debug for AnnotationStore<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnnotationStore")
            .field("frames", &self.frames)
            .field("draft", &self.draft)
            .field("labels", &self.labels)
            .finish()
    }
}
