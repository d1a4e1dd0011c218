// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Media file loading.
//!
//! Decodes still images into RGBA pixels ready to be turned into a texture.

use anyhow::{Context, Result};
use std::path::Path;

/// File extensions accepted by [`load_image`].
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tif", "tiff"];

/// A decoded image.
pub struct LoadedImage {
    pub width: u32,
    pub height: u32,
    /// Unmultiplied RGBA, row-major.
    pub pixels: Vec<u8>,
}

/// Whether the path has an image extension we can decode.
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Decode an image file into RGBA pixels.
pub fn load_image(path: &Path) -> Result<LoadedImage> {
    if !is_supported_image(path) {
        anyhow::bail!("Unsupported file type: {}", path.display());
    }

    let img = image::open(path).with_context(|| format!("Failed to decode {}", path.display()))?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();

    log::debug!("Decoded {} ({}x{})", path.display(), width, height);

    Ok(LoadedImage {
        width,
        height,
        pixels: rgba.into_raw(),
    })
}
