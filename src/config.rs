//! JSON runtime configuration for batch runs of the pipeline.

use crate::grid::Sampling;
use crate::io::GridFormat;
use crate::shift::ShiftParams;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Uniform sampling of one input axis.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct AxisConfig {
    pub count: usize,
    #[serde(default = "default_delta")]
    pub delta: f32,
    #[serde(default)]
    pub first: f32,
}

fn default_delta() -> f32 {
    1.0
}

impl AxisConfig {
    pub fn to_sampling(self) -> Result<Sampling, String> {
        Sampling::new(self.count, self.delta, self.first).map_err(|e| e.to_string())
    }
}

/// Input grid pair: file locations, dimensions, and on-disk format.
#[derive(Clone, Debug, Deserialize)]
pub struct InputConfig {
    pub fixed_path: PathBuf,
    pub moving_path: PathBuf,
    pub axis1: AxisConfig,
    pub axis2: AxisConfig,
    #[serde(default)]
    pub format: GridFormat,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct OutputConfig {
    pub dir: Option<PathBuf>,
    #[serde(default)]
    pub format: GridFormat,
}

/// Top-level configuration consumed by batch drivers.
#[derive(Clone, Debug, Deserialize)]
pub struct RuntimeConfig {
    pub input: InputConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub shift: ShiftParams,
    /// Whitening width applied to both inputs before estimation; `None`
    /// skips whitening.
    pub whiten_sigma: Option<f32>,
    /// Search radius (physical units) for the decomposition stage; `None`
    /// skips decomposition.
    pub search_radius: Option<f32>,
}

pub fn load_config(path: &Path) -> Result<RuntimeConfig, String> {
    let contents = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    let config: RuntimeConfig = serde_json::from_str(&contents)
        .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))?;
    Ok(config)
}
