//! End-to-end reconstruction of a model from a neutral input description.

use geobrep_math::{BoundingBox3, Point3, Tolerance};
use geobrep_mesh::{TetrahedralSolid, TriangulatedSurface};
use geobrep_topo::{
    BRepModel, CollectionKind, ComponentId, ComponentVertex, Incidence, SurfaceId, UniqueVertexId,
};
use hashbrown::HashMap;
use tracing::{debug, info};

use crate::corners::CornerDetector;
use crate::dedup::VertexDeduplicator;
use crate::error::{ReconstructError, Result};
use crate::facets::{BlockTopologyBuilder, FacetMatcher};
use crate::input::{SurfaceModelInput, VolumeModelInput, VolumeVertex};
use crate::lines::{check_uncut_internal_lines, is_on_line, LineTracer};
use crate::orientation::{OrientationSolver, RegionSurfaceSide};
use crate::params::ReconstructionParams;

/// Collection gathering the surfaces found to bound the model when the
/// input names none.
pub const UNDEFINED_BOUNDARY: &str = "undefined_boundary";

/// Collection gathering the surfaces explicitly listed as the universe.
pub const UNIVERSE: &str = "universe";

/// A reconstructed model and the tolerance it was built with.
#[derive(Debug, Clone)]
pub struct Reconstruction {
    /// The model.
    pub model: BRepModel,
    /// Colocation tolerance used.
    pub tolerance: Tolerance,
}

impl Reconstruction {
    /// Orient every surface for each region it bounds.
    pub fn orient(&mut self, params: &ReconstructionParams) -> Result<RegionSurfaceSide> {
        OrientationSolver::solve(&mut self.model, params)
    }
}

/// Reconstruct a model from independently described surface patches.
pub fn reconstruct_from_surfaces(
    input: &SurfaceModelInput,
    params: &ReconstructionParams,
) -> Result<Reconstruction> {
    params.validate()?;
    let mut model = BRepModel::new(input.name.clone());

    let mut surfaces = Vec::with_capacity(input.patches.len());
    let mut bbox = BoundingBox3::empty();
    for patch in &input.patches {
        let points: Vec<Point3> = patch.points.iter().map(|&p| Point3::from(p)).collect();
        let mesh = TriangulatedSurface::new(points, patch.triangles.clone())?;
        bbox = bbox.union(&mesh.bounding_box());
        surfaces.push(model.add_surface(patch.name.clone(), mesh));
    }
    let tolerance = params.tolerance_for(&bbox);
    info!(
        model = %input.name,
        surfaces = surfaces.len(),
        tolerance = tolerance.linear,
        "Reconstructing from surfaces"
    );

    let colocation = VertexDeduplicator::new(tolerance).deduplicate_surfaces(&model, &surfaces);

    // Border vertices of a cluster share one unique vertex.
    let mut cluster_vertices: Vec<Option<UniqueVertexId>> = vec![None; colocation.nb_clusters()];
    for (cluster, shared) in cluster_vertices.iter_mut().enumerate() {
        for &cmv in colocation.members(cluster) {
            if !is_border_vertex(&model, cmv) {
                continue;
            }
            let uv = *shared.get_or_insert_with(|| model.vertices_mut().create_unique_vertex());
            model.set_unique_vertex(cmv, uv);
        }
    }

    CornerDetector::detect(&mut model, &surfaces);
    if params.close_cornerless_loops {
        CornerDetector::close_cornerless_loops(&mut model, &surfaces)?;
    }
    LineTracer::new(&mut model, tolerance).trace_surfaces(&surfaces)?;

    // Interior vertices only join a cluster's unique vertex when it lies
    // on a line; crossing patches otherwise stay apart.
    for (cluster, &shared) in cluster_vertices.iter().enumerate() {
        let on_line = shared.filter(|&uv| is_on_line(&model, uv));
        for &cmv in colocation.members(cluster) {
            if is_border_vertex(&model, cmv) {
                continue;
            }
            let uv = match on_line {
                Some(uv) => uv,
                None => model.vertices_mut().create_unique_vertex(),
            };
            model.set_unique_vertex(cmv, uv);
        }
    }
    check_uncut_internal_lines(&mut model);

    let features: Vec<&str> = input.patches.iter().map(|p| p.feature.as_str()).collect();
    add_feature_collections(&mut model, &surfaces, &features);

    for block in &input.blocks {
        let id = model.add_block(block.name.clone(), Vec::new(), Vec::new());
        let mut counts: Vec<usize> = vec![0; surfaces.len()];
        for &index in &block.surfaces {
            let count = counts.get_mut(index).ok_or(ReconstructError::InvalidReference {
                what: "block surface",
                index,
                len: surfaces.len(),
            })?;
            *count += 1;
        }
        for (index, &count) in counts.iter().enumerate() {
            let incidence = match count {
                0 => continue,
                1 => Incidence::Boundary,
                _ => Incidence::Internal,
            };
            model.add_surface_block_relation(surfaces[index], id, incidence);
        }
        debug!(block = %block.name, surfaces = block.surfaces.len(), "Block described");
    }

    if let Some(universe) = &input.universe {
        let collection = model.add_collection(UNIVERSE, CollectionKind::ModelBoundary);
        for &index in universe {
            let surface = *surfaces.get(index).ok_or(ReconstructError::InvalidReference {
                what: "universe surface",
                index,
                len: surfaces.len(),
            })?;
            model.add_surface_to_collection(collection, surface);
        }
    } else if model.nb_collections_of_kind(CollectionKind::ModelBoundary) == 0 {
        add_undefined_boundary(&mut model);
    }

    log_summary(&model);
    Ok(Reconstruction { model, tolerance })
}

/// Reconstruct a model from a tetrahedral mesh and the surfaces meshed
/// on its facets.
pub fn reconstruct_from_volume(
    input: &VolumeModelInput,
    params: &ReconstructionParams,
) -> Result<Reconstruction> {
    params.validate()?;
    let mut model = BRepModel::new(input.name.clone());

    let nb_vertices = input.vertices.len();
    let mut points = Vec::with_capacity(nb_vertices);
    let mut cluster_of = Vec::with_capacity(nb_vertices);
    let mut cluster_members: Vec<Vec<u32>> = Vec::new();
    for (index, vertex) in input.vertices.iter().enumerate() {
        let (cluster, point) = match *vertex {
            VolumeVertex::Point(p) => {
                cluster_members.push(Vec::new());
                (cluster_members.len() - 1, Point3::from(p))
            }
            VolumeVertex::Shared(original) if original < index => {
                (cluster_of[original], points[original])
            }
            VolumeVertex::Shared(original) => {
                return Err(ReconstructError::InvalidReference {
                    what: "shared vertex",
                    index: original,
                    len: index,
                })
            }
        };
        cluster_members[cluster].push(index as u32);
        cluster_of.push(cluster);
        points.push(point);
    }
    let cluster_points: Vec<Point3> = cluster_members
        .iter()
        .map(|members| points[members[0] as usize])
        .collect();

    let solid = TetrahedralSolid::new(points, input.tetrahedra.clone())?;
    let tolerance = params.tolerance_for(&solid.bounding_box());
    info!(
        model = %input.name,
        tetrahedra = solid.nb_polyhedra(),
        clusters = cluster_members.len(),
        tolerance = tolerance.linear,
        "Reconstructing from volume"
    );

    let cluster_uvs: Vec<UniqueVertexId> = cluster_members
        .iter()
        .map(|_| model.vertices_mut().create_unique_vertex())
        .collect();

    let matcher = FacetMatcher::new(&solid, &cluster_members);
    let mut builder = BlockTopologyBuilder::new(&solid);
    let mut surfaces = Vec::with_capacity(input.surfaces.len());
    for description in &input.surfaces {
        let mut local_of: HashMap<usize, u32> = HashMap::new();
        let mut local_clusters = Vec::new();
        let mut cluster_triangles = Vec::with_capacity(description.triangles.len());
        let mut triangles = Vec::with_capacity(description.triangles.len());
        for triangle in &description.triangles {
            let mut clusters = [0usize; 3];
            let mut local = [0u32; 3];
            for k in 0..3 {
                let vertex = triangle[k];
                let cluster = *cluster_of.get(vertex).ok_or(ReconstructError::InvalidReference {
                    what: "volume vertex",
                    index: vertex,
                    len: nb_vertices,
                })?;
                clusters[k] = cluster;
                local[k] = *local_of.entry(cluster).or_insert_with(|| {
                    local_clusters.push(cluster);
                    (local_clusters.len() - 1) as u32
                });
            }
            cluster_triangles.push(clusters);
            triangles.push(local);
        }
        let mesh_points = local_clusters.iter().map(|&c| cluster_points[c]).collect();
        let mesh = TriangulatedSurface::new(mesh_points, triangles)?;
        let surface = model.add_surface(description.name.clone(), mesh);
        for (local, &cluster) in local_clusters.iter().enumerate() {
            model.set_unique_vertex(ComponentVertex::new(surface, local as u32), cluster_uvs[cluster]);
        }
        builder.match_surface(&mut model, &matcher, surface, &cluster_triangles);
        surfaces.push(surface);
    }

    let blocks = if input.regions.is_empty() {
        builder.discover_blocks(&mut model)
    } else {
        let mut blocks = Vec::with_capacity(input.regions.len());
        for seed in &input.regions {
            let surface = *surfaces.get(seed.surface).ok_or(ReconstructError::InvalidReference {
                what: "region surface",
                index: seed.surface,
                len: surfaces.len(),
            })?;
            let start = builder.seed_polyhedron(&model, surface, seed.side).ok_or_else(|| {
                ReconstructError::StartingFacetNotFound {
                    region: seed.name.clone(),
                    surface: model.surfaces[surface].name.clone(),
                }
            })?;
            if builder.is_visited(start) {
                return Err(ReconstructError::InvalidInput(format!(
                    "region '{}' starts inside an already built block",
                    seed.name
                )));
            }
            blocks.push(builder.build_block(&mut model, &seed.name, start));
        }
        blocks
    };
    for block in blocks {
        let vertices = model.blocks[block].vertices.clone();
        for (local, vertex) in vertices.into_iter().enumerate() {
            let uv = cluster_uvs[cluster_of[vertex as usize]];
            model.set_unique_vertex(ComponentVertex::new(block, local as u32), uv);
        }
    }

    let features: Vec<&str> = input.surfaces.iter().map(|s| s.feature.as_str()).collect();
    add_feature_collections(&mut model, &surfaces, &features);
    if model.nb_collections_of_kind(CollectionKind::ModelBoundary) == 0 {
        add_undefined_boundary(&mut model);
    }

    CornerDetector::detect(&mut model, &surfaces);
    if params.close_cornerless_loops {
        CornerDetector::close_cornerless_loops(&mut model, &surfaces)?;
    }
    LineTracer::new(&mut model, tolerance).trace_surfaces(&surfaces)?;
    check_uncut_internal_lines(&mut model);

    log_summary(&model);
    Ok(Reconstruction { model, tolerance })
}

fn is_border_vertex(model: &BRepModel, cmv: ComponentVertex) -> bool {
    match cmv.component {
        ComponentId::Surface(surface) => model.surfaces[surface].mesh.is_vertex_on_border(cmv.vertex),
        _ => false,
    }
}

/// Group surfaces sharing a non-empty feature label into collections, in
/// first-appearance order.
fn add_feature_collections(model: &mut BRepModel, surfaces: &[SurfaceId], features: &[&str]) {
    let mut collections = HashMap::new();
    for (&surface, &feature) in surfaces.iter().zip(features) {
        if feature.is_empty() {
            continue;
        }
        let collection = *collections.entry(feature).or_insert_with(|| {
            model.add_collection(feature, CollectionKind::from_feature(feature))
        });
        model.add_surface_to_collection(collection, surface);
    }
}

/// Collect surfaces bounding exactly one block into a model boundary.
fn add_undefined_boundary(model: &mut BRepModel) {
    let outer: Vec<SurfaceId> = model
        .surfaces
        .keys()
        .filter(|&surface| {
            model
                .blocks_of_surface(surface)
                .iter()
                .filter(|(_, incidence)| *incidence == Incidence::Boundary)
                .count()
                == 1
        })
        .collect();
    if outer.is_empty() {
        return;
    }
    let collection = model.add_collection(UNDEFINED_BOUNDARY, CollectionKind::ModelBoundary);
    for surface in outer {
        model.add_surface_to_collection(collection, surface);
    }
}

fn log_summary(model: &BRepModel) {
    info!(
        corners = model.corners.len(),
        lines = model.lines.len(),
        surfaces = model.surfaces.len(),
        blocks = model.blocks.len(),
        collections = model.collections.len(),
        inspections = model.inspection().len(),
        "Model reconstructed"
    );
}
