//! Entity data stored in the model arenas.

use geobrep_math::Point3;
use geobrep_mesh::TriangulatedSurface;
use serde::{Deserialize, Serialize};

use crate::ids::{CornerId, SurfaceId};

/// A topological junction holding a single point.
#[derive(Debug, Clone)]
pub struct Corner {
    /// Corner position.
    pub point: Point3,
}

/// A polyline bounded by two corners (the same corner for a closed loop).
#[derive(Debug, Clone)]
pub struct Line {
    /// Ordered points; local vertex `i` is `points[i]`.
    pub points: Vec<Point3>,
    /// Start and end corner.
    pub corners: [CornerId; 2],
}

impl Line {
    /// Number of vertices.
    pub fn nb_vertices(&self) -> usize {
        self.points.len()
    }

    /// Number of segments.
    pub fn nb_edges(&self) -> usize {
        self.points.len().saturating_sub(1)
    }

    /// True when the line starts and ends at the same corner.
    pub fn is_closed(&self) -> bool {
        self.corners[0] == self.corners[1]
    }
}

/// A triangulated patch.
#[derive(Debug, Clone)]
pub struct Surface {
    /// Name given by the input.
    pub name: String,
    /// Surface mesh; local vertex indices are mesh vertex indices.
    pub mesh: TriangulatedSurface,
}

/// A volumetric region.
#[derive(Debug, Clone)]
pub struct Block {
    /// Name given by the input, or generated.
    pub name: String,
    /// Tetrahedra of the source solid making up this block. Empty when the
    /// block was only described by its boundary surfaces.
    pub polyhedra: Vec<usize>,
    /// Source solid vertices of this block; local vertex `i` is `vertices[i]`.
    pub vertices: Vec<u32>,
}

/// Geological role of a collection of surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionKind {
    /// Outer boundary of the model, facing the universe.
    ModelBoundary,
    /// Stratigraphic horizon.
    Horizon,
    /// Fault.
    Fault,
}

impl CollectionKind {
    /// Classify a free-form feature label.
    ///
    /// `"boundary"`, `"lease"` and `"voi"` label model boundaries, anything
    /// containing `"fault"` is a fault, everything else a horizon.
    pub fn from_feature(feature: &str) -> Self {
        let lower = feature.to_ascii_lowercase();
        if lower.contains("fault") {
            CollectionKind::Fault
        } else if matches!(lower.as_str(), "boundary" | "lease" | "voi")
            || lower.contains("model_boundary")
        {
            CollectionKind::ModelBoundary
        } else {
            CollectionKind::Horizon
        }
    }

    /// Label used by writers.
    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionKind::ModelBoundary => "boundary",
            CollectionKind::Horizon => "top",
            CollectionKind::Fault => "fault",
        }
    }
}

/// A named group of surfaces sharing a geological role.
#[derive(Debug, Clone)]
pub struct Collection {
    /// Collection name.
    pub name: String,
    /// Geological role.
    pub kind: CollectionKind,
    /// Member surfaces, in insertion order.
    pub surfaces: Vec<SurfaceId>,
}
