use crate::error::{GeometryError, GeometryResult};
use crate::geometry::{Tessellation, DEFAULT_SEGMENTS_PER_QUADRANT, MAX_SEGMENTS_PER_QUADRANT};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Read-only settings shared by a builder and everything it creates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurveConfig {
    /// Chord resolution used when callers do not pass one. Zero selects
    /// `segments_per_quadrant`.
    pub default_resolution: f64,
    pub segments_per_quadrant: u32,
    pub max_segments_per_quadrant: u32,
}

impl Default for CurveConfig {
    fn default() -> Self {
        Self {
            default_resolution: 0.0,
            segments_per_quadrant: DEFAULT_SEGMENTS_PER_QUADRANT,
            max_segments_per_quadrant: MAX_SEGMENTS_PER_QUADRANT,
        }
    }
}

impl CurveConfig {
    /// Same as [`CurveConfig::default`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the chord resolution used when callers do not pass one.
    pub fn with_default_resolution(mut self, resolution: f64) -> Self {
        self.default_resolution = resolution;
        self
    }

    /// Set the segment count per quarter circle used at resolution zero.
    pub fn with_segments_per_quadrant(mut self, segments: u32) -> Self {
        self.segments_per_quadrant = segments;
        self
    }

    /// Set the cap on segments per quarter circle.
    pub fn with_max_segments_per_quadrant(mut self, segments: u32) -> Self {
        self.max_segments_per_quadrant = segments;
        self
    }

    /// Tessellation at the default resolution.
    pub fn tessellation(&self) -> Tessellation {
        self.tessellation_at(self.default_resolution)
    }

    /// Tessellation at `resolution` with this config's segment counts.
    pub fn tessellation_at(&self, resolution: f64) -> Tessellation {
        Tessellation {
            resolution,
            segments_per_quadrant: self.segments_per_quadrant,
            max_segments_per_quadrant: self.max_segments_per_quadrant,
        }
    }

    /// Range-check the resolution and segment counts.
    pub fn validate(&self) -> GeometryResult<()> {
        self.tessellation().validate().map_err(|err| match err {
            GeometryError::Range {
                parameter: "tessellation resolution",
                value,
            } => GeometryError::Range {
                parameter: "default resolution",
                value,
            },
            other => other,
        })
    }

    /// Load a config from a JSON file. Missing files yield the defaults.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(Self::default());
        }

        let data = fs::read(path).with_context(|| format!("read curve config {}", path.display()))?;
        let config: CurveConfig =
            serde_json::from_slice(&data).context("deserialize curve config")?;
        config
            .validate()
            .with_context(|| format!("validate curve config {}", path.display()))?;
        Ok(config)
    }

    /// Persist the config as pretty JSON, creating the parent directory.
    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create config directory {}", parent.display()))?;
        }

        let data = serde_json::to_vec_pretty(self).context("serialize curve config")?;
        fs::write(path, data).with_context(|| format!("write curve config {}", path.display()))
    }
}
