//! # Terrain Configuration
//!
//! Authoring parameters for a chunked terrain world, loaded once at startup
//! from JSON. Every field has a default, so a config file only needs to name
//! the values it changes:
//!
//! ```
//! use voxel_nav_terrain::config::TerrainConfig;
//!
//! let config = TerrainConfig::from_json_str(r#"{ "size_xz": 2, "resolution": 6 }"#).unwrap();
//! assert_eq!(config.size_xz, 2);
//! assert_eq!(config.size_y, 3);
//! ```

use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::{TerrainError, TerrainResult};

/// Largest accepted lattice resolution. Extraction keeps a dense
/// `(resolution + 4)³` accumulator per chunk.
pub const MAX_RESOLUTION: u32 = 256;

/// Largest accepted number of chunks in one grid.
pub const MAX_CHUNKS: u64 = 1 << 20;

/// Parameters describing the world grid, its terrain and its workers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Number of chunks along the X and Z axes.
    pub size_xz: u32,
    /// Number of chunks along the Y axis.
    pub size_y: u32,
    /// Base height of the noise ground, in world units.
    pub ground_height: f32,
    /// Amplitude of the noise added on top of `ground_height`.
    pub noise_scale: f32,
    /// Frequency applied to world X/Z before sampling the noise.
    pub noise_frequency: f32,
    /// Seed of the Perlin generator.
    pub noise_seed: u32,
    /// Edge length of one chunk in world units.
    pub chunk_scale: f32,
    /// Lattice cells per chunk axis.
    pub resolution: u32,
    /// Radius used by `WorldGrid::hit`.
    pub build_radius: f32,
    /// Multiplier applied to generated texture coordinates.
    pub material_scale: f32,
    /// Number of background extraction workers.
    pub worker_threads: usize,
    /// Also link each crossing face's diagonal in the navigation graph.
    pub connect_face_diagonals: bool,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            size_xz: 10,
            size_y: 3,
            ground_height: 3.0,
            noise_scale: 1.0,
            noise_frequency: 1.0,
            noise_seed: 0,
            chunk_scale: 10.0,
            resolution: 10,
            build_radius: 2.0,
            material_scale: 1.0,
            worker_threads: 4,
            connect_face_diagonals: false,
        }
    }
}

impl TerrainConfig {
    /// Parses and validates a JSON document.
    pub fn from_json_str(raw: &str) -> TerrainResult<Self> {
        let config: TerrainConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON file.
    pub fn load(path: impl AsRef<Path>) -> TerrainResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| TerrainError::io(path, e))?;
        let config = Self::from_json_str(&raw)?;
        info!("Loaded terrain config from {}", path.display());
        Ok(config)
    }

    /// Checks that every value can drive a world grid.
    pub fn validate(&self) -> TerrainResult<()> {
        if self.size_xz == 0 {
            return Err(invalid("size_xz", "must be at least 1"));
        }
        if self.size_y == 0 {
            return Err(invalid("size_y", "must be at least 1"));
        }
        if self.resolution == 0 {
            return Err(invalid("resolution", "must be at least 1"));
        }
        if self.resolution > MAX_RESOLUTION {
            return Err(invalid(
                "resolution",
                &format!("must be at most {MAX_RESOLUTION}"),
            ));
        }
        if self.chunk_count_u64() > MAX_CHUNKS {
            return Err(invalid(
                "size_xz",
                &format!("grid must hold at most {MAX_CHUNKS} chunks"),
            ));
        }
        if !(self.chunk_scale.is_finite() && self.chunk_scale > 0.0) {
            return Err(invalid("chunk_scale", "must be a positive number"));
        }
        if !(self.build_radius.is_finite() && self.build_radius >= 0.0) {
            return Err(invalid("build_radius", "must be a non-negative number"));
        }
        if self.worker_threads == 0 {
            return Err(invalid("worker_threads", "must be at least 1"));
        }
        Ok(())
    }

    /// Total number of chunks in the grid.
    pub fn chunk_count(&self) -> usize {
        self.chunk_count_u64() as usize
    }

    fn chunk_count_u64(&self) -> u64 {
        let xz = u64::from(self.size_xz);
        xz.saturating_mul(u64::from(self.size_y)).saturating_mul(xz)
    }
}

fn invalid(field: &'static str, reason: &str) -> TerrainError {
    TerrainError::InvalidConfig {
        field,
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = TerrainConfig::from_json_str("{}").unwrap();
        assert_eq!(config, TerrainConfig::default());
        assert_eq!(config.chunk_count(), 300);
    }

    #[test]
    fn zero_resolution_is_rejected() {
        let err = TerrainConfig::from_json_str(r#"{ "resolution": 0 }"#).unwrap_err();
        assert!(matches!(
            err,
            TerrainError::InvalidConfig { field: "resolution", .. }
        ));
    }

    #[test]
    fn oversized_resolution_is_rejected() {
        let err = TerrainConfig::from_json_str(r#"{ "resolution": 3000000 }"#).unwrap_err();
        assert!(matches!(
            err,
            TerrainError::InvalidConfig { field: "resolution", .. }
        ));

        let largest = format!(r#"{{ "resolution": {MAX_RESOLUTION} }}"#);
        assert!(TerrainConfig::from_json_str(&largest).is_ok());
    }

    #[test]
    fn oversized_grid_is_rejected() {
        let config = TerrainConfig {
            size_xz: u32::MAX,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(TerrainError::InvalidConfig { field: "size_xz", .. })
        ));
    }

    #[test]
    fn malformed_json_is_a_json_error() {
        let err = TerrainConfig::from_json_str("{ size_xz: ").unwrap_err();
        assert!(matches!(err, TerrainError::Json(_)));
    }

    #[test]
    fn load_reports_missing_file() {
        let err = TerrainConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, TerrainError::Io { .. }));
    }
}
