//! Error types for mesh construction.

use thiserror::Error;

/// Errors that can occur while building a mesh.
#[derive(Debug, Error)]
pub enum MeshError {
    /// A polygon or polyhedron references a vertex that does not exist.
    #[error("invalid vertex index {index} (mesh has {vertex_count} vertices)")]
    InvalidIndex {
        /// The invalid index.
        index: u32,
        /// Total number of vertices in the mesh.
        vertex_count: usize,
    },

    /// An element repeats one of its vertices.
    #[error("degenerate {element} {index}: vertex {vertex} appears twice")]
    DegenerateElement {
        /// Element kind ("triangle" or "tetrahedron").
        element: &'static str,
        /// Element index.
        index: usize,
        /// The repeated vertex.
        vertex: u32,
    },
}

/// Result type for mesh operations.
pub type Result<T> = std::result::Result<T, MeshError>;
