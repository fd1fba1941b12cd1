//! Neutral input descriptions.
//!
//! These carry what a dialect reader extracts from a file, before any
//! topology exists: patch geometry for surface-based models, and a
//! tetrahedral mesh plus surface triangles for volume-based models.

use serde::{Deserialize, Serialize};

/// One independently described triangulated patch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfacePatch {
    /// Patch name.
    pub name: String,
    /// Geological feature label; patches sharing a label form a collection.
    #[serde(default)]
    pub feature: String,
    /// Vertex coordinates.
    pub points: Vec<[f64; 3]>,
    /// Triangles over `points`.
    pub triangles: Vec<[u32; 3]>,
}

/// A block given by the patches around it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockDescription {
    /// Block name.
    pub name: String,
    /// Patch indices. A patch listed twice cuts through the block.
    pub surfaces: Vec<usize>,
}

/// A model described by surface patches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceModelInput {
    /// Model name.
    pub name: String,
    /// Patches.
    pub patches: Vec<SurfacePatch>,
    /// Blocks.
    #[serde(default)]
    pub blocks: Vec<BlockDescription>,
    /// Patch indices bounding the universe, if given explicitly.
    #[serde(default)]
    pub universe: Option<Vec<usize>>,
}

impl SurfaceModelInput {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// A vertex of a volume mesh.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumeVertex {
    /// A new physical point.
    Point([f64; 3]),
    /// A duplicate of an earlier vertex: same physical point, distinct index.
    Shared(usize),
}

/// A surface of a volume model, given over volume vertex indices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeSurface {
    /// Surface name.
    pub name: String,
    /// Geological feature label.
    #[serde(default)]
    pub feature: String,
    /// Triangles over volume vertex indices. Any vertex of a shared group
    /// may be used.
    pub triangles: Vec<[usize; 3]>,
}

/// Where a region starts: the side of a surface's first triangle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionSeed {
    /// Region name.
    pub name: String,
    /// Surface index.
    pub surface: usize,
    /// `true` for the side the first triangle's normal points to.
    pub side: bool,
}

/// A model described by a tetrahedral mesh and its surfaces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeModelInput {
    /// Model name.
    pub name: String,
    /// Vertices.
    pub vertices: Vec<VolumeVertex>,
    /// Tetrahedra over vertex indices.
    pub tetrahedra: Vec<[u32; 4]>,
    /// Surfaces.
    pub surfaces: Vec<VolumeSurface>,
    /// Region seeds. When empty, every connected region becomes a block.
    #[serde(default)]
    pub regions: Vec<RegionSeed>,
}

impl VolumeModelInput {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
