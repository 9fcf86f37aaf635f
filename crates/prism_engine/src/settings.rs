//! Engine configuration
//!
//! Serde-derived settings with sane defaults, loadable from TOML. Every
//! field is optional in the file; missing sections fall back to their
//! defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The settings file could not be read
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),

    /// The settings file is not valid TOML for this schema
    #[error("failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level engine settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Render pipeline behavior
    pub pipeline: PipelineSettings,
    /// Scene pre-allocation
    pub scene: SceneSettings,
}

impl EngineSettings {
    /// Parse settings from a TOML string
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// Load settings from a TOML file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }
}

/// Render pipeline behavior knobs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    /// Log a debug message every frame the pipeline is empty
    pub log_empty_frames: bool,

    /// Warn when a render stage exceeds this many milliseconds
    pub slow_stage_warn_ms: Option<f32>,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            log_empty_frames: true,
            slow_stage_warn_ms: None,
        }
    }
}

/// Scene pre-allocation hints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneSettings {
    /// Member capacity reserved when a scene is created from settings
    pub renderable_capacity: usize,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            renderable_capacity: 64,
        }
    }
}
