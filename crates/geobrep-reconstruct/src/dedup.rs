//! Geometric colocation of component vertices.
//!
//! Purely geometric: points within tolerance land in the same cluster
//! whatever their connectivity. Which clusters become shared unique
//! vertices is decided later, from topology.

use geobrep_math::{Point3, Tolerance};
use geobrep_mesh::colocated_index_mapping;
use geobrep_topo::{BRepModel, ComponentVertex, SurfaceId};
use hashbrown::HashMap;
use tracing::debug;

/// Clusters of colocated component vertices.
#[derive(Debug, Clone, Default)]
pub struct ColocationMap {
    representatives: Vec<Point3>,
    members: Vec<Vec<ComponentVertex>>,
    cluster_of: HashMap<ComponentVertex, usize>,
}

impl ColocationMap {
    /// Number of clusters.
    pub fn nb_clusters(&self) -> usize {
        self.representatives.len()
    }

    /// Cluster of a component vertex, if it was part of the input.
    pub fn cluster(&self, component_vertex: ComponentVertex) -> Option<usize> {
        self.cluster_of.get(&component_vertex).copied()
    }

    /// Component vertices of a cluster, in input order.
    pub fn members(&self, cluster: usize) -> &[ComponentVertex] {
        &self.members[cluster]
    }

    /// Representative point of a cluster (its first member's position).
    pub fn representative(&self, cluster: usize) -> &Point3 {
        &self.representatives[cluster]
    }
}

/// Merges coincident points from independently described patches.
#[derive(Debug, Clone, Copy)]
pub struct VertexDeduplicator {
    tolerance: Tolerance,
}

impl VertexDeduplicator {
    /// Create a deduplicator with the given colocation tolerance.
    pub fn new(tolerance: Tolerance) -> Self {
        Self { tolerance }
    }

    /// Tolerance in use.
    pub fn tolerance(&self) -> Tolerance {
        self.tolerance
    }

    /// Cluster points tagged with their component vertex.
    pub fn deduplicate(&self, vertices: &[(ComponentVertex, Point3)]) -> ColocationMap {
        let points: Vec<Point3> = vertices.iter().map(|(_, p)| *p).collect();
        let info = colocated_index_mapping(&points, self.tolerance);

        let mut members = vec![Vec::new(); info.nb_unique_points()];
        let mut cluster_of = HashMap::with_capacity(vertices.len());
        for ((cmv, _), &cluster) in vertices.iter().zip(&info.colocated_mapping) {
            members[cluster].push(*cmv);
            cluster_of.insert(*cmv, cluster);
        }
        debug!(
            points = vertices.len(),
            clusters = info.nb_unique_points(),
            tolerance = self.tolerance.linear,
            "Vertices deduplicated"
        );
        ColocationMap {
            representatives: info.unique_points,
            members,
            cluster_of,
        }
    }

    /// Cluster every vertex of the given surfaces, in surface then vertex
    /// order.
    pub fn deduplicate_surfaces(&self, model: &BRepModel, surfaces: &[SurfaceId]) -> ColocationMap {
        let mut vertices = Vec::new();
        for &surface in surfaces {
            let mesh = &model.surfaces[surface].mesh;
            for (v, p) in mesh.points().iter().enumerate() {
                vertices.push((ComponentVertex::new(surface, v as u32), *p));
            }
        }
        self.deduplicate(&vertices)
    }
}
