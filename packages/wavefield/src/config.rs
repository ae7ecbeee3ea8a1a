//! Viewer configuration.
//!
//! Optional JSON file passed with `--config`. Every field has a default, so a
//! file only needs the keys it wants to change. CLI flags override file values.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::controls::ControlPanel;
use crate::page::Page;
use crate::visualiser::{PlaybackState, VisualiserState};
use crate::wave::WaveParameters;

fn default_width() -> u32 {
    1280
}

fn default_height() -> u32 {
    720
}

fn default_fps() -> f32 {
    60.0
}

fn default_duration() -> f32 {
    5.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerConfig {
    /// Window or output width in pixels.
    #[serde(default = "default_width")]
    pub width: u32,

    /// Window or output height in pixels.
    #[serde(default = "default_height")]
    pub height: u32,

    /// Page mounted at startup.
    #[serde(default)]
    pub page: Page,

    /// Initial wave parameters (explore page only).
    #[serde(default)]
    pub params: WaveParameters,

    #[serde(default)]
    pub playback: PlaybackState,

    /// Frames per second for offline rendering.
    #[serde(default = "default_fps")]
    pub fps: f32,

    /// Seconds rendered offline.
    #[serde(default = "default_duration")]
    pub duration: f32,

    /// Output directory for offline frames.
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            page: Page::default(),
            params: WaveParameters::default(),
            playback: PlaybackState::default(),
            fps: default_fps(),
            duration: default_duration(),
            output_dir: None,
        }
    }
}

impl ViewerConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_json(&content).with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Parse, validate and quantize a JSON config.
    pub fn from_json(json: &str) -> Result<Self> {
        let mut config: ViewerConfig = serde_json::from_str(json).context("Failed to parse config JSON")?;
        config.validate()?;
        ControlPanel::new().sanitize(&mut config.params);
        Ok(config)
    }

    /// Load `path` if given, otherwise defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let config = Self::from_file(path)?;
                log::info!("Loaded config from {}", path.display());
                Ok(config)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            bail!("Output size must be non-zero, got {}x{}", self.width, self.height);
        }
        if !(self.fps.is_finite() && self.fps > 0.0) {
            bail!("FPS must be positive, got {}", self.fps);
        }
        if !(self.duration.is_finite() && self.duration >= 0.0) {
            bail!("Duration must be non-negative, got {}", self.duration);
        }
        Ok(())
    }

    /// Mount the configured page with the configured initial state.
    pub fn build_state(&self) -> VisualiserState {
        VisualiserState::with_state(self.page, self.params, self.playback)
    }
}
