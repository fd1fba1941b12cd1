#![warn(missing_docs)]

//! Boundary-representation model for geoscience reconstruction.
//!
//! The model is a tagged-entity arena: one [`slotmap::SlotMap`] per entity
//! kind ([`Corner`], [`Line`], [`Surface`], [`Block`], [`Collection`]),
//! a [`VertexIdentifier`] relating every component-local vertex to a
//! model-wide [`UniqueVertexId`], and ordered relationship registries.
//!
//! Entities are append-only: once created they are never removed, only
//! related to each other.

pub mod component;
pub mod ids;
pub mod inspection;
pub mod model;
pub mod vertex;

pub use component::{Block, Collection, CollectionKind, Corner, Line, Surface};
pub use ids::{
    BlockId, CollectionId, ComponentId, ComponentKind, ComponentVertex, CornerId, LineId,
    SurfaceId, UniqueVertexId,
};
pub use inspection::{Inspection, InspectionReport};
pub use model::{BRepModel, Incidence, Region};
pub use vertex::VertexIdentifier;
