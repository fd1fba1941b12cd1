//! The boundary-representation model arena.

use std::collections::BTreeMap;

use geobrep_math::Point3;
use geobrep_mesh::TriangulatedSurface;
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

use crate::component::{Block, Collection, CollectionKind, Corner, Line, Surface};
use crate::ids::{
    BlockId, CollectionId, ComponentId, ComponentKind, ComponentVertex, CornerId, LineId,
    SurfaceId, UniqueVertexId,
};
use crate::inspection::{Inspection, InspectionReport};
use crate::vertex::VertexIdentifier;

/// How a lower-dimensional component relates to a higher-dimensional one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Incidence {
    /// The component lies on the border of the other.
    Boundary,
    /// The component cuts through the interior of the other.
    Internal,
}

/// A region that surfaces can bound: a block or the universe around the
/// model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Region {
    /// A block of the model.
    Block(BlockId),
    /// The unbounded outside of the model.
    Universe,
}

/// A boundary-representation model.
///
/// Entity tables are public for reading; entities are created through the
/// `add_*` methods so their vertices get registered.
#[derive(Debug, Clone, Default)]
pub struct BRepModel {
    /// Model name.
    pub name: String,
    /// Corner arena.
    pub corners: SlotMap<CornerId, Corner>,
    /// Line arena.
    pub lines: SlotMap<LineId, Line>,
    /// Surface arena.
    pub surfaces: SlotMap<SurfaceId, Surface>,
    /// Block arena.
    pub blocks: SlotMap<BlockId, Block>,
    /// Collection arena.
    pub collections: SlotMap<CollectionId, Collection>,
    vertices: VertexIdentifier,
    line_surface: BTreeMap<(LineId, SurfaceId), Incidence>,
    surface_block: BTreeMap<(SurfaceId, BlockId), Incidence>,
    inspection: InspectionReport,
}

impl BRepModel {
    /// Create an empty model.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Add a corner at `point`.
    pub fn add_corner(&mut self, point: Point3) -> CornerId {
        let id = self.corners.insert(Corner { point });
        self.vertices.register_component(id.into(), 1);
        id
    }

    /// Add a line through `points`, bounded by `corners`.
    pub fn add_line(&mut self, points: Vec<Point3>, corners: [CornerId; 2]) -> LineId {
        let nb_vertices = points.len();
        let id = self.lines.insert(Line { points, corners });
        self.vertices.register_component(id.into(), nb_vertices);
        id
    }

    /// Add a surface.
    pub fn add_surface(&mut self, name: impl Into<String>, mesh: TriangulatedSurface) -> SurfaceId {
        let nb_vertices = mesh.nb_vertices();
        let id = self.surfaces.insert(Surface {
            name: name.into(),
            mesh,
        });
        self.vertices.register_component(id.into(), nb_vertices);
        id
    }

    /// Add a block made of the given solid tetrahedra and vertices.
    pub fn add_block(
        &mut self,
        name: impl Into<String>,
        polyhedra: Vec<usize>,
        vertices: Vec<u32>,
    ) -> BlockId {
        let nb_vertices = vertices.len();
        let id = self.blocks.insert(Block {
            name: name.into(),
            polyhedra,
            vertices,
        });
        self.vertices.register_component(id.into(), nb_vertices);
        id
    }

    /// Add an empty collection.
    pub fn add_collection(&mut self, name: impl Into<String>, kind: CollectionKind) -> CollectionId {
        self.collections.insert(Collection {
            name: name.into(),
            kind,
            surfaces: Vec::new(),
        })
    }

    /// Add a surface to a collection. Returns false if it was already a
    /// member or the collection does not exist.
    pub fn add_surface_to_collection(&mut self, collection: CollectionId, surface: SurfaceId) -> bool {
        match self.collections.get_mut(collection) {
            Some(c) if !c.surfaces.contains(&surface) => {
                c.surfaces.push(surface);
                true
            }
            _ => false,
        }
    }

    /// Collections containing a surface, in collection order.
    pub fn collections_of_surface(&self, surface: SurfaceId) -> Vec<CollectionId> {
        self.collections
            .iter()
            .filter(|(_, c)| c.surfaces.contains(&surface))
            .map(|(id, _)| id)
            .collect()
    }

    /// Number of collections of a kind.
    pub fn nb_collections_of_kind(&self, kind: CollectionKind) -> usize {
        self.collections.values().filter(|c| c.kind == kind).count()
    }

    /// Surfaces bounding the universe: members of every model-boundary
    /// collection, in collection then insertion order, without repeats.
    pub fn model_boundaries(&self) -> Vec<SurfaceId> {
        let mut result = Vec::new();
        for collection in self.collections.values() {
            if collection.kind != CollectionKind::ModelBoundary {
                continue;
            }
            for &surface in &collection.surfaces {
                if !result.contains(&surface) {
                    result.push(surface);
                }
            }
        }
        result
    }

    /// Surfaces bounding a region (block boundaries or model boundaries).
    pub fn region_boundaries(&self, region: Region) -> Vec<SurfaceId> {
        match region {
            Region::Block(block) => self.block_boundaries(block),
            Region::Universe => self.model_boundaries(),
        }
    }

    /// Vertex identification table.
    pub fn vertices(&self) -> &VertexIdentifier {
        &self.vertices
    }

    /// Mutable vertex identification table.
    pub fn vertices_mut(&mut self) -> &mut VertexIdentifier {
        &mut self.vertices
    }

    /// Unique vertex of a component vertex.
    pub fn unique_vertex(&self, component_vertex: ComponentVertex) -> Option<UniqueVertexId> {
        self.vertices.unique_vertex(component_vertex)
    }

    /// Assign a component vertex to a unique vertex.
    pub fn set_unique_vertex(
        &mut self,
        component_vertex: ComponentVertex,
        unique_vertex: UniqueVertexId,
    ) -> Option<UniqueVertexId> {
        self.vertices.set_unique_vertex(component_vertex, unique_vertex)
    }

    /// Corner sitting on a unique vertex, if any.
    pub fn corner_of_unique_vertex(&self, unique_vertex: UniqueVertexId) -> Option<CornerId> {
        self.vertices
            .component_vertices_of_kind(unique_vertex, ComponentKind::Corner)
            .find_map(|cmv| match cmv.component {
                ComponentId::Corner(id) => Some(id),
                _ => None,
            })
    }

    /// Unique vertex of a corner.
    pub fn corner_unique_vertex(&self, corner: CornerId) -> Option<UniqueVertexId> {
        self.vertices.unique_vertex(ComponentVertex::new(corner, 0))
    }

    /// Relate a line to a surface, returning the previous relation.
    pub fn add_line_surface_relation(
        &mut self,
        line: LineId,
        surface: SurfaceId,
        incidence: Incidence,
    ) -> Option<Incidence> {
        self.line_surface.insert((line, surface), incidence)
    }

    /// Relation between a line and a surface.
    pub fn line_surface_relation(&self, line: LineId, surface: SurfaceId) -> Option<Incidence> {
        self.line_surface.get(&(line, surface)).copied()
    }

    /// Every line-surface relation, ordered by line then surface.
    pub fn line_surface_relations(
        &self,
    ) -> impl Iterator<Item = (LineId, SurfaceId, Incidence)> + '_ {
        self.line_surface.iter().map(|(&(l, s), &i)| (l, s, i))
    }

    /// Surfaces related to a line, ordered by surface id.
    pub fn surfaces_of_line(&self, line: LineId) -> Vec<(SurfaceId, Incidence)> {
        self.line_surface
            .iter()
            .filter(|((l, _), _)| *l == line)
            .map(|(&(_, s), &i)| (s, i))
            .collect()
    }

    /// Lines related to a surface, ordered by line id.
    pub fn lines_of_surface(&self, surface: SurfaceId) -> Vec<(LineId, Incidence)> {
        self.line_surface
            .iter()
            .filter(|((_, s), _)| *s == surface)
            .map(|(&(l, _), &i)| (l, i))
            .collect()
    }

    /// Relate a surface to a block, returning the previous relation.
    pub fn add_surface_block_relation(
        &mut self,
        surface: SurfaceId,
        block: BlockId,
        incidence: Incidence,
    ) -> Option<Incidence> {
        self.surface_block.insert((surface, block), incidence)
    }

    /// Relation between a surface and a block.
    pub fn surface_block_relation(&self, surface: SurfaceId, block: BlockId) -> Option<Incidence> {
        self.surface_block.get(&(surface, block)).copied()
    }

    /// Every surface-block relation, ordered by surface then block.
    pub fn surface_block_relations(
        &self,
    ) -> impl Iterator<Item = (SurfaceId, BlockId, Incidence)> + '_ {
        self.surface_block.iter().map(|(&(s, b), &i)| (s, b, i))
    }

    /// Blocks related to a surface, ordered by block id.
    pub fn blocks_of_surface(&self, surface: SurfaceId) -> Vec<(BlockId, Incidence)> {
        self.surface_block
            .iter()
            .filter(|((s, _), _)| *s == surface)
            .map(|(&(_, b), &i)| (b, i))
            .collect()
    }

    /// Boundary surfaces of a block, ordered by surface id.
    pub fn block_boundaries(&self, block: BlockId) -> Vec<SurfaceId> {
        self.block_surfaces(block, Incidence::Boundary)
    }

    /// Internal surfaces of a block, ordered by surface id.
    pub fn block_internals(&self, block: BlockId) -> Vec<SurfaceId> {
        self.block_surfaces(block, Incidence::Internal)
    }

    /// Number of surface-block relations of a given kind.
    pub fn nb_surface_block_relations(&self, incidence: Incidence) -> usize {
        self.surface_block.values().filter(|&&i| i == incidence).count()
    }

    /// Recorded inspection entries.
    pub fn inspection(&self) -> &InspectionReport {
        &self.inspection
    }

    /// Record an inspection entry.
    pub fn record_inspection(&mut self, inspection: Inspection) {
        self.inspection.push(inspection);
    }

    /// True when a recoverable inconsistency was recorded.
    pub fn needs_inspection(&self) -> bool {
        self.inspection.needs_inspection()
    }

    fn block_surfaces(&self, block: BlockId, incidence: Incidence) -> Vec<SurfaceId> {
        self.surface_block
            .iter()
            .filter(|((_, b), &i)| *b == block && i == incidence)
            .map(|(&(s, _), _)| s)
            .collect()
    }
}
