#![warn(missing_docs)]

//! Topology reconstruction and orientation for geoscience meshes.
//!
//! Turns independently meshed surface patches, or a tetrahedral mesh with
//! surfaces on its facets, into a [`geobrep_topo::BRepModel`] with shared
//! vertices, corners, lines, blocks and their relations, then resolves
//! which way every surface faces for each region it bounds.
//!
//! # Stages
//!
//! 1. [`VertexDeduplicator`]: geometric colocation of patch vertices.
//! 2. [`CornerDetector`]: corners where the surface fan changes along a
//!    border.
//! 3. [`LineTracer`]: border polylines between corners, shared between
//!    adjoining surfaces.
//! 4. [`FacetMatcher`] / [`BlockTopologyBuilder`]: surface triangles
//!    resolved to volume facets, blocks flood-filled between them.
//! 5. [`OrientationSolver`]: consistent signs per region, checked against
//!    the enclosed volume.
//!
//! # Example
//!
//! ```no_run
//! use geobrep_reconstruct::{reconstruct_from_surfaces, ReconstructionParams, SurfaceModelInput};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let input = SurfaceModelInput::from_json(&std::fs::read_to_string("model.json")?)?;
//! let params = ReconstructionParams::default();
//! let mut reconstruction = reconstruct_from_surfaces(&input, &params)?;
//! let sides = reconstruction.orient(&params)?;
//! println!("{} universe surfaces", sides.universe.len());
//! # Ok(())
//! # }
//! ```

pub mod corners;
pub mod dedup;
pub mod error;
pub mod facets;
pub mod input;
pub mod lines;
pub mod orientation;
pub mod params;
pub mod pipeline;

pub use corners::CornerDetector;
pub use dedup::{ColocationMap, VertexDeduplicator};
pub use error::{ReconstructError, Result};
pub use facets::{BlockTopologyBuilder, FacetMatcher};
pub use input::{
    BlockDescription, RegionSeed, SurfaceModelInput, SurfacePatch, VolumeModelInput,
    VolumeSurface, VolumeVertex,
};
pub use lines::{check_uncut_internal_lines, LineMatch, LineTracer, TracedLine};
pub use orientation::{OrientationSolver, RegionSigns, RegionSurfaceSide};
pub use params::ReconstructionParams;
pub use pipeline::{
    reconstruct_from_surfaces, reconstruct_from_volume, Reconstruction, UNDEFINED_BOUNDARY,
    UNIVERSE,
};
