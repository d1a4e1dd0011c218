// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! One viewing session: the loaded media, its viewport and annotations.
//!
//! The session turns raw input events into engine calls. It works out the
//! current [`FrameKey`] from the playback clock and passes it explicitly to
//! the annotation store, and moves labels along when the frame changes.

use crate::engine::fps::FrameRateEstimator;
use crate::engine::playback::Playback;
use crate::engine::pool::ResourcePool;
use crate::engine::store::{AnnotationStore, DraftState, DrawOutcome, NameLabel, RenderedRect};
use crate::engine::viewport::{PanAnchor, ViewportTransform};
use crate::error::{EngineError, EngineResult};
use crate::models::annotation::{FrameKey, Rectangle};
use crate::models::media::MediaInfo;
use crate::util::geometry::{Point, Size};

/// What a click on the media did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Nothing was armed or being drawn.
    Ignored,
    /// A rectangle was started at this index.
    Started(usize),
    /// The rectangle being drawn was finished.
    Finished(DrawOutcome),
}

/// Loaded media together with its viewport, annotations and, for videos,
/// the playback clock.
pub struct Session<L> {
    viewport: ViewportTransform,
    annotations: AnnotationStore<L>,
    media: Option<MediaInfo>,
    playback: Option<Playback>,
    fps_window: usize,
}

impl<L: NameLabel> Session<L> {
    /// Session with nothing loaded. `fps_window` sizes the frame-rate
    /// estimator of every video loaded later.
    pub fn new(viewport: ViewportTransform, labels: ResourcePool<L>, fps_window: usize) -> Self {
        Self {
            viewport,
            annotations: AnnotationStore::new(labels),
            media: None,
            playback: None,
            fps_window,
        }
    }

    /// Show an image. Existing annotations are dropped.
    pub fn load_image(&mut self, width: f64, height: f64) -> EngineResult<()> {
        self.load(MediaInfo::image(width, height))
    }

    /// Show a video once its metadata is known. Existing annotations are
    /// dropped and frame-rate estimation starts over.
    pub fn load_video(&mut self, width: f64, height: f64, duration: f64) -> EngineResult<()> {
        self.load(MediaInfo::video(width, height, duration))
    }

    fn load(&mut self, media: MediaInfo) -> EngineResult<()> {
        if !media.size.is_usable() {
            return Err(EngineError::invalid_state(format!(
                "media size {}x{} is not usable",
                media.size.width, media.size.height
            )));
        }

        self.annotations.clear();
        self.playback = media.is_video().then(|| {
            Playback::new(media.duration, FrameRateEstimator::with_capacity(self.fps_window))
        });
        self.media = Some(media);
        self.viewport.set_media_size(media.size)?;

        log::info!(
            "Loaded {:?} media {}x{}",
            media.kind,
            media.size.width,
            media.size.height
        );
        Ok(())
    }

    /// Forget the media and everything drawn on it.
    pub fn unload(&mut self) {
        self.annotations.clear();
        self.playback = None;
        self.media = None;
    }

    /// The viewer changed size (window resize or fullscreen toggle); the
    /// media is refitted.
    pub fn resize_viewer(&mut self, width: f64, height: f64) -> EngineResult<()> {
        self.viewport.set_viewer_size(Size::new(width, height))
    }

    /// Back to the fitted layout.
    pub fn reset_view(&mut self) -> EngineResult<()> {
        self.viewport.fit_to_container()
    }

    /// One wheel step anchored at `cursor`. Returns the new scale.
    pub fn zoom_at(&mut self, cursor: Point, wheel_delta_y: f64) -> EngineResult<f64> {
        self.viewport.zoom_at(cursor.x, cursor.y, wheel_delta_y)
    }

    /// Move the media by a raw screen delta.
    pub fn pan(&mut self, dx: f64, dy: f64) -> EngineResult<()> {
        self.viewport.pan(dx, dy)
    }

    /// Record where a pan gesture starts.
    pub fn begin_pan(&self, pointer: Point) -> PanAnchor {
        self.viewport.begin_pan(pointer)
    }

    /// Continue a pan gesture started with [`begin_pan`](Self::begin_pan).
    pub fn pan_to(&mut self, anchor: &PanAnchor, pointer: Point) -> EngineResult<()> {
        self.viewport.pan_to(anchor, pointer)
    }

    /// Key of the annotations on screen.
    pub fn frame_key(&self) -> FrameKey {
        self.playback
            .as_ref()
            .map(Playback::frame_key)
            .unwrap_or(FrameKey::Still)
    }

    /// Arm rectangle creation. Needs loaded media.
    pub fn arm(&mut self) -> EngineResult<()> {
        if self.media.is_none() {
            return Err(EngineError::invalid_state("no media loaded"));
        }
        self.annotations.arm()
    }

    /// A click on the viewer: finishes the rectangle being drawn, or starts
    /// one when armed.
    pub fn click(&mut self, screen: Point) -> EngineResult<ClickOutcome> {
        match self.annotations.draft() {
            DraftState::Drawing { .. } => {
                let outcome = self.annotations.finish_drawing()?;
                Ok(ClickOutcome::Finished(outcome))
            }
            DraftState::Armed => {
                let key = self.frame_key();
                let index = self.annotations.begin_drawing(key, &self.viewport, screen)?;
                Ok(ClickOutcome::Started(index))
            }
            DraftState::Idle | DraftState::Naming { .. } => Ok(ClickOutcome::Ignored),
        }
    }

    /// The pointer moved: drag the rectangle being drawn and refresh the
    /// hover flag. Returns the hovered rectangle.
    pub fn pointer_moved(&mut self, screen: Point) -> EngineResult<Option<usize>> {
        if !self.viewport.is_fitted() {
            return Ok(None);
        }
        self.annotations.update_drawing(&self.viewport, screen)?;
        let key = self.frame_key();
        self.annotations.hit_test(key, &self.viewport, screen)
    }

    /// Name the rectangle being named. An empty name is rejected and
    /// naming continues.
    pub fn commit_name(&mut self, text: &str) -> EngineResult<String> {
        self.annotations.commit_name(text)
    }

    /// Drop the rectangle being drawn or named, or disarm.
    pub fn cancel_active(&mut self) -> bool {
        self.annotations.cancel_active()
    }

    pub fn rectangles_for_current_frame(&self) -> &[Rectangle] {
        self.annotations.rectangles_for_frame(self.frame_key())
    }

    /// What to draw for the frame on screen. Empty until media is fitted.
    pub fn render_list(&self) -> EngineResult<Vec<RenderedRect>> {
        if !self.viewport.is_fitted() {
            return Ok(Vec::new());
        }
        self.annotations.render_list(self.frame_key(), &self.viewport)
    }

    /// Screen position of the label of rectangle `index`.
    pub fn label_anchor(&self, index: usize) -> EngineResult<Point> {
        self.annotations
            .label_anchor(self.frame_key(), index, &self.viewport)
    }

    /// Report from the player that a frame was presented. Labels follow the
    /// frame when its key changes. Returns the updated fps estimate.
    pub fn on_frame_presented(&mut self, media_time: f64, presented_frames: u64, has_focus: bool) -> Option<f64> {
        let before = self.frame_key();
        let estimate = self
            .playback
            .as_mut()?
            .on_frame_presented(media_time, presented_frames, has_focus);
        self.follow_frame(before);
        estimate
    }

    /// Seek the video. See [`Playback::seek_to`].
    pub fn seek_to(&mut self, seconds: f64, frames: Option<i64>) -> EngineResult<f64> {
        let before = self.frame_key();
        let target = self
            .playback
            .as_mut()
            .ok_or_else(|| EngineError::invalid_state("no video loaded"))?
            .seek_to(seconds, frames);
        self.follow_frame(before);
        Ok(target)
    }

    /// Seek by whole buckets of `step` seconds.
    pub fn skip_buckets(&mut self, step: f64, direction: i64) -> EngineResult<f64> {
        let target = self
            .playback
            .as_ref()
            .ok_or_else(|| EngineError::invalid_state("no video loaded"))?
            .bucket_target(step, direction);
        self.seek_to(target, None)
    }

    fn follow_frame(&mut self, before: FrameKey) {
        let after = self.frame_key();
        if after == before {
            return;
        }
        // An armed tool carries over to the new frame.
        if matches!(
            self.annotations.draft(),
            DraftState::Drawing { .. } | DraftState::Naming { .. }
        ) {
            self.annotations.cancel_active();
        }
        self.annotations.hide_labels();
        self.annotations.show_labels(after);
    }

    pub fn media(&self) -> Option<&MediaInfo> {
        self.media.as_ref()
    }

    pub fn playback(&self) -> Option<&Playback> {
        self.playback.as_ref()
    }

    pub fn viewport(&self) -> &ViewportTransform {
        &self.viewport
    }

    pub fn annotations(&self) -> &AnnotationStore<L> {
        &self.annotations
    }

    pub fn annotations_mut(&mut self) -> &mut AnnotationStore<L> {
        &mut self.annotations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Tag {
        text: String,
    }

    impl NameLabel for Tag {
        fn attach(&mut self, rect: &Rectangle) {
            self.text = rect.name.clone().unwrap_or_default();
        }
    }

    fn session() -> Session<Tag> {
        let mut session = Session::new(
            ViewportTransform::new(),
            ResourcePool::new(|_| Tag::default(), |t: &mut Tag| t.text.clear(), |_: &mut Tag| {}),
            50,
        );
        session.resize_viewer(800.0, 600.0).unwrap();
        session
    }

    fn annotate(session: &mut Session<Tag>, from: (f64, f64), to: (f64, f64), name: &str) {
        session.arm().unwrap();
        session.click(Point::new(from.0, from.1)).unwrap();
        session.pointer_moved(Point::new(to.0, to.1)).unwrap();
        session.click(Point::new(to.0, to.1)).unwrap();
        session.commit_name(name).unwrap();
    }

    #[test]
    fn test_arm_needs_media() {
        let mut session = session();
        assert!(matches!(session.arm(), Err(EngineError::InvalidState(_))));
        assert!(session.render_list().unwrap().is_empty());
        assert_eq!(session.pointer_moved(Point::new(1.0, 1.0)).unwrap(), None);
    }

    #[test]
    fn test_image_annotation_flow() {
        let mut session = session();
        session.load_image(800.0, 600.0).unwrap();
        assert_eq!(session.frame_key(), FrameKey::Still);

        session.arm().unwrap();
        assert_eq!(session.click(Point::new(10.0, 10.0)).unwrap(), ClickOutcome::Started(0));
        // The pointer sits on the free corner, which is not strictly inside.
        assert_eq!(session.pointer_moved(Point::new(60.0, 80.0)).unwrap(), None);
        let ClickOutcome::Finished(DrawOutcome::Naming { .. }) = session.click(Point::new(60.0, 80.0)).unwrap() else {
            panic!("expected naming");
        };
        // Clicks while naming do nothing.
        assert_eq!(session.click(Point::new(5.0, 5.0)).unwrap(), ClickOutcome::Ignored);
        session.commit_name("Red Car").unwrap();

        let rects = session.rectangles_for_current_frame();
        assert_eq!(rects.len(), 1);
        assert_eq!(rects[0].name.as_deref(), Some("red-car"));
        assert_eq!(session.render_list().unwrap().len(), 1);
        assert_eq!(session.pointer_moved(Point::new(30.0, 30.0)).unwrap(), Some(0));
    }

    #[test]
    fn test_loading_media_clears_annotations() {
        let mut session = session();
        session.load_image(800.0, 600.0).unwrap();
        annotate(&mut session, (10.0, 10.0), (50.0, 50.0), "a");
        assert_eq!(session.annotations().labels().active_count(), 1);

        // A bad size is refused without touching what is there.
        assert!(session.load_image(0.0, 600.0).is_err());
        assert_eq!(session.rectangles_for_current_frame().len(), 1);

        session.load_image(1024.0, 768.0).unwrap();
        assert!(session.rectangles_for_current_frame().is_empty());
        assert_eq!(session.annotations().labels().active_count(), 0);
    }

    #[test]
    fn test_video_annotations_follow_frames() {
        let mut session = session();
        session.load_video(1280.0, 720.0, 60.0).unwrap();
        assert!(session.playback().is_some());

        session.seek_to(1.0, None).unwrap();
        annotate(&mut session, (100.0, 200.0), (200.0, 300.0), "first");
        let at_one = session.frame_key();

        session.seek_to(2.0, None).unwrap();
        assert_ne!(session.frame_key(), at_one);
        assert!(session.rectangles_for_current_frame().is_empty());
        assert_eq!(session.annotations().labels().active_count(), 0);

        session.seek_to(1.0, None).unwrap();
        assert_eq!(session.rectangles_for_current_frame().len(), 1);
        assert_eq!(session.annotations().labels().active_count(), 1);
        let label = session.rectangles_for_current_frame()[0].label;
        let text = label
            .and_then(|id| session.annotations().labels().get(id))
            .map(|t| t.text.clone());
        assert_eq!(text.as_deref(), Some("first"));
    }

    #[test]
    fn test_seek_cancels_draft() {
        let mut session = session();
        session.load_video(1280.0, 720.0, 60.0).unwrap();
        session.arm().unwrap();
        session.click(Point::new(100.0, 200.0)).unwrap();

        session.seek_to(3.0, None).unwrap();
        assert_eq!(session.annotations().draft(), DraftState::Idle);
        assert_eq!(session.annotations().frame_keys().count(), 0);
    }

    #[test]
    fn test_frame_change_keeps_tool_armed() {
        let mut session = session();
        session.load_video(1280.0, 720.0, 60.0).unwrap();

        session.arm().unwrap();
        session.seek_to(2.0, None).unwrap();
        assert_eq!(session.annotations().draft(), DraftState::Armed);
        assert_eq!(session.click(Point::new(400.0, 300.0)).unwrap(), ClickOutcome::Started(0));
        assert!(session.cancel_active());

        session.arm().unwrap();
        session.on_frame_presented(1.0 / 30.0, 1, true);
        assert_ne!(session.frame_key(), FrameKey::from_time(2.0));
        assert_eq!(session.annotations().draft(), DraftState::Armed);
        assert!(matches!(
            session.click(Point::new(400.0, 300.0)).unwrap(),
            ClickOutcome::Started(_)
        ));
    }

    #[test]
    fn test_seek_without_video_is_invalid() {
        let mut session = session();
        session.load_image(800.0, 600.0).unwrap();
        assert!(matches!(session.seek_to(1.0, None), Err(EngineError::InvalidState(_))));
        assert!(session.on_frame_presented(0.1, 3, true).is_none());
    }

    #[test]
    fn test_skip_buckets_moves_in_steps() {
        let mut session = session();
        session.load_video(640.0, 360.0, 30.0).unwrap();
        session.seek_to(7.0, None).unwrap();
        assert_eq!(session.skip_buckets(5.0, 1).unwrap(), 10.0);
        assert_eq!(session.skip_buckets(5.0, -1).unwrap(), 5.0);
        assert_eq!(session.skip_buckets(60.0, 1).unwrap(), 30.0);
    }

    #[test]
    fn test_resize_refits() {
        let mut session = session();
        session.load_image(1600.0, 1200.0).unwrap();
        assert!((session.viewport().scale() - 0.5).abs() < 1e-9);
        session.zoom_at(Point::new(400.0, 300.0), -1.0).unwrap();
        session.resize_viewer(400.0, 300.0).unwrap();
        assert!((session.viewport().scale() - 0.25).abs() < 1e-9);
        assert_eq!(session.viewport().min_scale(), session.viewport().scale());
    }
}
