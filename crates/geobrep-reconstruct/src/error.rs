//! Error types for reconstruction.
//!
//! Only structural violations are errors. Recoverable inconsistencies are
//! recorded as [`geobrep_topo::Inspection`] entries on the model instead.

use geobrep_mesh::MeshError;
use thiserror::Error;

/// Errors that abort the reconstruction of a model.
#[derive(Debug, Error)]
pub enum ReconstructError {
    /// An input mesh could not be built.
    #[error("invalid mesh: {0}")]
    Mesh(#[from] MeshError),

    /// Invalid reconstruction parameters or input description.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An input index points past the end of its table.
    #[error("{what} index {index} out of range ({len} available)")]
    InvalidReference {
        /// What the index refers to.
        what: &'static str,
        /// The invalid index.
        index: usize,
        /// Size of the referenced table.
        len: usize,
    },

    /// A line trace was started from a vertex that is not a corner.
    #[error("surface '{surface}': cannot start a line at vertex {vertex}, it is not a corner")]
    LineStartNotFound {
        /// Surface name.
        surface: String,
        /// Surface-local vertex.
        vertex: u32,
    },

    /// Border walking never reached a corner.
    #[error("surface '{surface}': border walk from vertex {vertex} never reaches a corner")]
    OpenBorder {
        /// Surface name.
        surface: String,
        /// Surface-local vertex where the walk stopped.
        vertex: u32,
    },

    /// No tetrahedron lies on the requested side of a region's key triangle.
    #[error("region '{region}': cannot find starting facet on surface '{surface}'")]
    StartingFacetNotFound {
        /// Region name.
        region: String,
        /// Surface name.
        surface: String,
    },

    /// The oriented shell of a region encloses no volume.
    #[error("region '{region}': degenerate signed volume {volume:e}")]
    DegenerateVolume {
        /// Region name.
        region: String,
        /// Total signed volume.
        volume: f64,
    },
}

/// Result type for reconstruction operations.
pub type Result<T> = std::result::Result<T, ReconstructError>;
