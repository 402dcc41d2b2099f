//! Error types for the fallible edges of the terrain engine.
//!
//! Only configuration, persistence, and snapshot restore can fail. Expected
//! runtime outcomes such as a face without a crossing, a search without a
//! path, or an edit issued while the grid is busy are reported through
//! `Option` and `bool` returns instead.

use std::path::PathBuf;

/// Errors raised while configuring, saving, or restoring terrain.
#[derive(Debug, thiserror::Error)]
pub enum TerrainError {
    /// Reading or writing a file failed.
    #[error("I/O failure on {path}: {source}")]
    Io {
        /// File being accessed.
        path: PathBuf,
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// A document could not be encoded or decoded.
    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    /// A configuration value is out of range.
    #[error("Invalid configuration value for `{field}`: {reason}")]
    InvalidConfig {
        /// Name of the offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// A chunk coordinate lies outside the grid.
    #[error("No chunk at grid coordinate {x}, {y}, {z}")]
    UnknownChunk {
        #[allow(missing_docs)]
        x: i32,
        #[allow(missing_docs)]
        y: i32,
        #[allow(missing_docs)]
        z: i32,
    },

    /// A snapshot was taken from a differently shaped grid.
    #[error("Snapshot does not fit this grid: expected {expected}, found {found}")]
    SnapshotMismatch {
        /// Shape of this grid.
        expected: String,
        /// Shape recorded in the snapshot.
        found: String,
    },
}

/// Result alias used throughout the crate.
pub type TerrainResult<T> = Result<T, TerrainError>;

impl TerrainError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TerrainError::Io {
            path: path.into(),
            source,
        }
    }
}
