// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Viewport transform and annotation engine.

pub mod fps;
pub mod playback;
pub mod pool;
pub mod session;
pub mod store;
pub mod viewport;
