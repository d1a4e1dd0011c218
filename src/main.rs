// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! ANNOVIEW - Media Annotation Viewer
//!
//! Desktop shell around the annoview engine: open an image, zoom and pan
//! it, and mark regions with named rectangles.

mod app;
mod ui;

use annoview::io::config::load_from_env;
use anyhow::Result;
use app::AnnoviewApp;

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    let config = load_from_env()?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.window_width, config.window_height])
            .with_min_inner_size([800.0, 600.0])
            .with_title("ANNOVIEW - Media Annotation Viewer"),
        ..Default::default()
    };

    eframe::run_native(
        "ANNOVIEW",
        options,
        Box::new(move |_cc| Ok(Box::new(AnnoviewApp::new(&config)))),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
