#![warn(missing_docs)]

//! Writers for reconstructed models.
//!
//! The reconstruction engine knows nothing about output formats; each
//! writer here only reads the finished [`geobrep_topo::BRepModel`] and, when
//! it needs orientation, a [`geobrep_reconstruct::RegionSurfaceSide`].
//!
//! - [`snapshot`]: a neutral, index-based JSON image of the model that can
//!   be reloaded.
//! - [`model3d`]: GOCAD Model3d (`.ml`).

pub mod error;
pub mod model3d;
pub mod snapshot;

pub use error::{ExportError, Result};
pub use model3d::{save_model3d, write_model3d, UNCLASSIFIED_SURFACES};
pub use snapshot::ModelSnapshot;
