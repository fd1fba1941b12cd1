//! Index-based JSON image of a model.
//!
//! Entity ids are replaced by their position in iteration order, and unique
//! vertices by their index, so a snapshot reloads into an equivalent model.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use geobrep_math::Point3;
use geobrep_mesh::TriangulatedSurface;
use geobrep_topo::{
    BRepModel, BlockId, CollectionKind, ComponentId, ComponentVertex, CornerId, Incidence, LineId,
    SurfaceId, UniqueVertexId,
};
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ExportError, Result};

/// A corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CornerRecord {
    /// Position.
    pub point: [f64; 3],
    /// Unique vertex index.
    pub unique_vertex: Option<usize>,
}

/// A line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineRecord {
    /// Polyline points.
    pub points: Vec<[f64; 3]>,
    /// Start and end corner indices.
    pub corners: [usize; 2],
    /// Unique vertex index of each point.
    pub unique_vertices: Vec<Option<usize>>,
}

/// A surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceRecord {
    /// Name.
    pub name: String,
    /// Mesh points.
    pub points: Vec<[f64; 3]>,
    /// Mesh triangles.
    pub triangles: Vec<[u32; 3]>,
    /// Unique vertex index of each point.
    pub unique_vertices: Vec<Option<usize>>,
}

/// A block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockRecord {
    /// Name.
    pub name: String,
    /// Tetrahedra of the source volume mesh.
    pub polyhedra: Vec<usize>,
    /// Vertices of the source volume mesh.
    pub vertices: Vec<u32>,
    /// Unique vertex index of each vertex.
    pub unique_vertices: Vec<Option<usize>>,
}

/// A collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionRecord {
    /// Name.
    pub name: String,
    /// Geological role.
    pub kind: CollectionKind,
    /// Surface indices.
    pub surfaces: Vec<usize>,
}

/// A relation between two entities, by index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationRecord {
    /// Lower-dimensional entity.
    pub from: usize,
    /// Higher-dimensional entity.
    pub to: usize,
    /// Kind of relation.
    pub incidence: Incidence,
}

/// Serializable image of a [`BRepModel`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSnapshot {
    /// Model name.
    pub name: String,
    /// Number of unique vertices.
    pub nb_unique_vertices: usize,
    /// Corners.
    pub corners: Vec<CornerRecord>,
    /// Lines.
    pub lines: Vec<LineRecord>,
    /// Surfaces.
    pub surfaces: Vec<SurfaceRecord>,
    /// Blocks.
    pub blocks: Vec<BlockRecord>,
    /// Collections.
    pub collections: Vec<CollectionRecord>,
    /// Line to surface relations.
    pub line_surface: Vec<RelationRecord>,
    /// Surface to block relations.
    pub surface_block: Vec<RelationRecord>,
    /// Inspection messages at capture time. Informational only, they are
    /// not restored by [`ModelSnapshot::into_model`].
    #[serde(default)]
    pub inspection: Vec<String>,
}

fn coords(p: &Point3) -> [f64; 3] {
    [p.x, p.y, p.z]
}

fn unique_indices(model: &BRepModel, component: ComponentId) -> Vec<Option<usize>> {
    model
        .vertices()
        .unique_vertices_of(component)
        .iter()
        .map(|uv| uv.map(UniqueVertexId::index))
        .collect()
}

fn invalid(what: &str, index: usize, len: usize) -> ExportError {
    ExportError::InvalidSnapshot(format!("{what} index {index} out of range ({len} available)"))
}

fn lookup<T: Copy>(ids: &[T], what: &str, index: usize) -> Result<T> {
    ids.get(index).copied().ok_or_else(|| invalid(what, index, ids.len()))
}

impl ModelSnapshot {
    /// Capture a model.
    pub fn from_model(model: &BRepModel) -> Self {
        let corner_index: HashMap<CornerId, usize> =
            model.corners.keys().enumerate().map(|(i, id)| (id, i)).collect();
        let line_index: HashMap<LineId, usize> =
            model.lines.keys().enumerate().map(|(i, id)| (id, i)).collect();
        let surface_index: HashMap<SurfaceId, usize> =
            model.surfaces.keys().enumerate().map(|(i, id)| (id, i)).collect();
        let block_index: HashMap<BlockId, usize> =
            model.blocks.keys().enumerate().map(|(i, id)| (id, i)).collect();

        let corners = model
            .corners
            .iter()
            .map(|(id, corner)| CornerRecord {
                point: coords(&corner.point),
                unique_vertex: model.corner_unique_vertex(id).map(UniqueVertexId::index),
            })
            .collect();
        let lines = model
            .lines
            .iter()
            .map(|(id, line)| LineRecord {
                points: line.points.iter().map(coords).collect(),
                corners: line.corners.map(|c| corner_index[&c]),
                unique_vertices: unique_indices(model, id.into()),
            })
            .collect();
        let surfaces = model
            .surfaces
            .iter()
            .map(|(id, surface)| SurfaceRecord {
                name: surface.name.clone(),
                points: surface.mesh.points().iter().map(coords).collect(),
                triangles: surface.mesh.triangles().to_vec(),
                unique_vertices: unique_indices(model, id.into()),
            })
            .collect();
        let blocks = model
            .blocks
            .iter()
            .map(|(id, block)| BlockRecord {
                name: block.name.clone(),
                polyhedra: block.polyhedra.clone(),
                vertices: block.vertices.clone(),
                unique_vertices: unique_indices(model, id.into()),
            })
            .collect();
        let collections = model
            .collections
            .values()
            .map(|collection| CollectionRecord {
                name: collection.name.clone(),
                kind: collection.kind,
                surfaces: collection.surfaces.iter().map(|s| surface_index[s]).collect(),
            })
            .collect();
        let line_surface = model
            .line_surface_relations()
            .map(|(line, surface, incidence)| RelationRecord {
                from: line_index[&line],
                to: surface_index[&surface],
                incidence,
            })
            .collect();
        let surface_block = model
            .surface_block_relations()
            .map(|(surface, block, incidence)| RelationRecord {
                from: surface_index[&surface],
                to: block_index[&block],
                incidence,
            })
            .collect();

        Self {
            name: model.name.clone(),
            nb_unique_vertices: model.vertices().nb_unique_vertices(),
            corners,
            lines,
            surfaces,
            blocks,
            collections,
            line_surface,
            surface_block,
            inspection: model
                .inspection()
                .entries()
                .iter()
                .map(|entry| entry.describe(model))
                .collect(),
        }
    }

    /// Rebuild the model.
    pub fn into_model(self) -> Result<BRepModel> {
        let mut model = BRepModel::new(self.name);
        let uv_count = self.nb_unique_vertices;
        if uv_count > 0 {
            model.vertices_mut().create_unique_vertices(uv_count);
        }
        let unique = |model: &BRepModel, index: usize| {
            model
                .vertices()
                .unique_vertex_at(index)
                .ok_or_else(|| invalid("unique vertex", index, uv_count))
        };
        let assign = |model: &mut BRepModel, component: ComponentId, uvs: &[Option<usize>]| {
            for (local, uv) in uvs.iter().enumerate() {
                if let Some(index) = *uv {
                    let uv = unique(&*model, index)?;
                    model.set_unique_vertex(
                        ComponentVertex {
                            component,
                            vertex: local as u32,
                        },
                        uv,
                    );
                }
            }
            Ok::<(), ExportError>(())
        };

        let mut corners = Vec::with_capacity(self.corners.len());
        for record in self.corners {
            let corner = model.add_corner(Point3::from(record.point));
            if let Some(index) = record.unique_vertex {
                let uv = unique(&model, index)?;
                model.set_unique_vertex(ComponentVertex::new(corner, 0), uv);
            }
            corners.push(corner);
        }

        let mut lines = Vec::with_capacity(self.lines.len());
        for record in self.lines {
            let ends = [
                lookup(&corners, "corner", record.corners[0])?,
                lookup(&corners, "corner", record.corners[1])?,
            ];
            let points = record.points.into_iter().map(Point3::from).collect();
            let line = model.add_line(points, ends);
            assign(&mut model, line.into(), &record.unique_vertices)?;
            lines.push(line);
        }

        let mut surfaces = Vec::with_capacity(self.surfaces.len());
        for record in self.surfaces {
            let points = record.points.into_iter().map(Point3::from).collect();
            let mesh = TriangulatedSurface::new(points, record.triangles)?;
            let surface = model.add_surface(record.name, mesh);
            assign(&mut model, surface.into(), &record.unique_vertices)?;
            surfaces.push(surface);
        }

        let mut blocks = Vec::with_capacity(self.blocks.len());
        for record in self.blocks {
            let block = model.add_block(record.name, record.polyhedra, record.vertices);
            assign(&mut model, block.into(), &record.unique_vertices)?;
            blocks.push(block);
        }

        for record in self.collections {
            let collection = model.add_collection(record.name, record.kind);
            for index in record.surfaces {
                model.add_surface_to_collection(collection, lookup(&surfaces, "surface", index)?);
            }
        }
        for relation in self.line_surface {
            model.add_line_surface_relation(
                lookup(&lines, "line", relation.from)?,
                lookup(&surfaces, "surface", relation.to)?,
                relation.incidence,
            );
        }
        for relation in self.surface_block {
            model.add_surface_block_relation(
                lookup(&surfaces, "surface", relation.from)?,
                lookup(&blocks, "block", relation.to)?,
                relation.incidence,
            );
        }
        Ok(model)
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize from JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Write the snapshot of `model` to a JSON file.
    pub fn save(model: &BRepModel, path: impl AsRef<Path>) -> Result<()> {
        let snapshot = Self::from_model(model);
        let writer = BufWriter::new(File::create(path.as_ref())?);
        serde_json::to_writer_pretty(writer, &snapshot)?;
        info!(path = %path.as_ref().display(), surfaces = snapshot.surfaces.len(), "Snapshot saved");
        Ok(())
    }

    /// Read a JSON snapshot file and rebuild its model.
    pub fn load(path: impl AsRef<Path>) -> Result<BRepModel> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&json)?.into_model()
    }
}
