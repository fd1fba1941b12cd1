//! Error types for model export.

use geobrep_mesh::MeshError;
use thiserror::Error;

/// Errors that can occur while writing or reloading a model.
#[derive(Error, Debug)]
pub enum ExportError {
    /// I/O error reading or writing a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot JSON could not be encoded or decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A snapshot refers to an entity or vertex it does not hold.
    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),

    /// A snapshot surface mesh is invalid.
    #[error("Invalid mesh: {0}")]
    Mesh(#[from] MeshError),
}

/// Result type for export operations.
pub type Result<T> = std::result::Result<T, ExportError>;
