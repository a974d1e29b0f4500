//! Optional JSON run configuration. Every field is optional; anything missing
//! falls back to the reference deployment defaults.
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use wui_core::{vegetation_threshold, Thresholds, TileLayout};

/// Circular analysis window the vegetation counts were computed over.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VegetationWindow {
    pub radius_m: f64,
    pub resolution_m: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MapperConfig {
    pub input_root: Option<PathBuf>,
    pub output_root: Option<PathBuf>,
    pub thresholds: Thresholds,
    /// When set, replaces `thresholds.vegetation_pixels` with half the pixel
    /// count of this window.
    pub vegetation_window: Option<VegetationWindow>,
}

impl MapperConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Cannot read config {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config {}", path.display()))
    }

    pub fn thresholds(&self) -> Result<Thresholds> {
        let mut thresholds = self.thresholds.clone();
        if let Some(w) = self.vegetation_window {
            thresholds.vegetation_pixels = vegetation_threshold(w.radius_m, w.resolution_m)
                .with_context(|| format!("Invalid vegetation window {w:?}"))?;
        }
        Ok(thresholds)
    }

    /// Resolve the directory layout; command-line roots win over the file.
    pub fn layout(&self, input_root: Option<&Path>, output_root: Option<&Path>) -> TileLayout {
        let defaults = TileLayout::default();
        TileLayout::new(
            input_root
                .map(Path::to_path_buf)
                .or_else(|| self.input_root.clone())
                .unwrap_or(defaults.input_root),
            output_root
                .map(Path::to_path_buf)
                .or_else(|| self.output_root.clone())
                .unwrap_or(defaults.output_root),
        )
    }
}
