// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! UI components for the ANNOVIEW application.

pub mod canvas;
pub mod name_tag;
pub mod properties;
pub mod toolbar;
