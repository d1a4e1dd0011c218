// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Viewer configuration.
//!
//! Settings are read from a YAML or JSON file picked by extension. Any
//! field left out takes its default.

use crate::engine::fps::DEFAULT_WINDOW;
use crate::engine::viewport::{ViewportTransform, MAX_SCALE, ZOOM_INCREMENT};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "ANNOVIEW_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Zoom ceiling relative to the intrinsic media size.
    pub max_scale: f64,
    /// Scale change per wheel notch.
    pub zoom_increment: f64,
    /// Samples after which the frame-rate estimate is settled.
    pub fps_window: usize,
    pub window_width: f32,
    pub window_height: f32,
    /// Bucket size for coarse seeking, in seconds.
    pub seek_step_seconds: f64,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            max_scale: MAX_SCALE,
            zoom_increment: ZOOM_INCREMENT,
            fps_window: DEFAULT_WINDOW,
            window_width: 1280.0,
            window_height: 720.0,
            seek_step_seconds: 5.0,
        }
    }
}

impl ViewerConfig {
    pub fn validate(&self) -> Result<()> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(self.max_scale) {
            anyhow::bail!("max_scale must be positive, got {}", self.max_scale);
        }
        if !positive(self.zoom_increment) {
            anyhow::bail!("zoom_increment must be positive, got {}", self.zoom_increment);
        }
        if self.fps_window == 0 {
            anyhow::bail!("fps_window must be at least 1");
        }
        if !positive(self.seek_step_seconds) {
            anyhow::bail!("seek_step_seconds must be positive, got {}", self.seek_step_seconds);
        }
        Ok(())
    }

    /// A viewport using the configured zoom limits.
    pub fn viewport(&self) -> ViewportTransform {
        ViewportTransform::with_limits(self.max_scale, self.zoom_increment)
    }
}

/// Parse a YAML document.
pub fn parse_yaml(text: &str) -> Result<ViewerConfig> {
    let config: ViewerConfig = serde_yaml::from_str(text)?;
    config.validate()?;
    Ok(config)
}

/// Parse a JSON document.
pub fn parse_json(text: &str) -> Result<ViewerConfig> {
    let config: ViewerConfig = serde_json::from_str(text)?;
    config.validate()?;
    Ok(config)
}

/// Load configuration from a `.yaml`/`.yml` or `.json` file.
pub fn load_config(path: &Path) -> Result<ViewerConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;

    let extension = path.extension().and_then(|s| s.to_str());
    let config = match extension {
        Some("yaml") | Some("yml") => parse_yaml(&text),
        Some("json") => parse_json(&text),
        _ => anyhow::bail!("Unsupported config extension: {:?}", extension),
    }
    .with_context(|| format!("Invalid config {}", path.display()))?;

    log::info!("Loaded config from {}", path.display());
    Ok(config)
}

/// Configuration named by `ANNOVIEW_CONFIG`, or the defaults.
pub fn load_from_env() -> Result<ViewerConfig> {
    match std::env::var_os(CONFIG_ENV) {
        Some(path) => load_config(Path::new(&path)),
        None => Ok(ViewerConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_engine_constants() {
        let config = ViewerConfig::default();
        assert_eq!(config.max_scale, 3.0);
        assert_eq!(config.zoom_increment, 0.04);
        assert_eq!(config.fps_window, 50);
        assert!(config.validate().is_ok());
        assert_eq!(config.viewport().max_scale(), 3.0);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = parse_yaml("max_scale: 5.0\nfps_window: 20\n").unwrap();
        assert_eq!(config.max_scale, 5.0);
        assert_eq!(config.fps_window, 20);
        assert_eq!(config.zoom_increment, ZOOM_INCREMENT);
        assert_eq!(config.window_width, 1280.0);
    }

    #[test]
    fn test_json_and_validation() {
        let config = parse_json(r#"{"zoom_increment": 0.1}"#).unwrap();
        assert_eq!(config.zoom_increment, 0.1);

        assert!(parse_json(r#"{"zoom_increment": 0.0}"#).is_err());
        assert!(parse_yaml("max_scale: -1\n").is_err());
        assert!(parse_yaml("fps_window: 0\n").is_err());
    }

    #[test]
    fn test_load_config_by_extension() {
        let dir = std::env::temp_dir();
        let id = std::process::id();
        let yaml = dir.join(format!("annoview-config-{}.yml", id));
        let toml = dir.join(format!("annoview-config-{}.toml", id));
        std::fs::write(&yaml, "seek_step_seconds: 10\n").unwrap();
        std::fs::write(&toml, "seek_step_seconds = 10\n").unwrap();

        let loaded = load_config(&yaml);
        let refused = load_config(&toml);
        std::fs::remove_file(&yaml).ok();
        std::fs::remove_file(&toml).ok();

        assert_eq!(loaded.unwrap().seek_step_seconds, 10.0);
        assert!(refused.is_err());
    }
}
