// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! ANNOVIEW - media annotation viewer engine.
//!
//! Maps screen pixels to media coordinates under pan and zoom, keeps
//! per-frame rectangle annotations with hover hit-testing, pools the
//! name-label resources drawn next to them and estimates the frame rate
//! of a playing video. Rendering and input are left to the caller.

pub mod engine;
pub mod error;
pub mod io;
pub mod models;
pub mod util;

pub use engine::{
    fps::FrameRateEstimator,
    playback::Playback,
    pool::ResourcePool,
    session::Session,
    store::{AnnotationStore, DrawOutcome, DraftState, NameLabel, RenderedRect},
    viewport::{ViewportState, ViewportTransform},
};
pub use error::{EngineError, EngineResult};
