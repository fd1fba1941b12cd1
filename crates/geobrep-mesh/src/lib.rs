#![warn(missing_docs)]

//! Meshes consumed by the geobrep reconstruction engine.
//!
//! - [`TriangulatedSurface`]: an indexed triangle patch with polygon
//!   adjacency, border-edge enumeration and border walking
//!   (`next_on_border` / `previous_on_border`).
//! - [`TetrahedralSolid`]: an indexed tetrahedral mesh with a
//!   facet-from-vertices index and polyhedron adjacency.
//! - [`colocated_index_mapping`]: tolerance-based point colocation over a
//!   hash grid.

pub mod error;
pub mod search;
pub mod solid;
pub mod surface;

pub use error::{MeshError, Result};
pub use search::{colocated_index_mapping, ColocatedInfo, PointSearch};
pub use solid::{PolyhedronFacet, TetrahedralSolid};
pub use surface::{PolygonEdge, TriangulatedSurface};
