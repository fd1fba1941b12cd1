//! Matching surface triangles to volume facets and building blocks.
//!
//! Surface triangles are given over vertex clusters. A cluster holds every
//! volume vertex at the same physical point (several when the volume mesh
//! duplicates vertices along a surface), so a triangle matches every facet
//! whose vertices come from the cross product of its three clusters.
//!
//! Blocks are flood-filled over tetrahedra, never crossing a matched facet.
//! Counting how often each surface's facets are met from inside a block
//! classifies the relation: once per triangle is a boundary, twice per
//! triangle (met from both sides) is internal.

use std::collections::BTreeMap;

use geobrep_math::{triangle_normal, Point3};
use geobrep_mesh::{PolyhedronFacet, TetrahedralSolid};
use geobrep_topo::{BRepModel, BlockId, Incidence, Inspection, SurfaceId};
use hashbrown::hash_map::Entry;
use hashbrown::HashMap;
use tracing::{debug, info, warn};

/// Resolves cluster triangles to volume facets.
#[derive(Debug, Clone, Copy)]
pub struct FacetMatcher<'a> {
    solid: &'a TetrahedralSolid,
    cluster_vertices: &'a [Vec<u32>],
}

impl<'a> FacetMatcher<'a> {
    /// Create a matcher. `cluster_vertices[c]` lists the volume vertices of
    /// cluster `c`.
    pub fn new(solid: &'a TetrahedralSolid, cluster_vertices: &'a [Vec<u32>]) -> Self {
        Self {
            solid,
            cluster_vertices,
        }
    }

    /// Every facet matching the cluster triangle, in either winding,
    /// sorted. Empty when nothing matches or a cluster is unknown.
    pub fn facets_from_clusters(&self, triangle: [usize; 3]) -> Vec<usize> {
        let [Some(a), Some(b), Some(c)] = triangle.map(|cluster| self.cluster_vertices.get(cluster))
        else {
            return Vec::new();
        };
        let mut facets = Vec::new();
        for &va in a {
            for &vb in b {
                for &vc in c {
                    if let Some(facet) = self.solid.facet_from_vertices([va, vb, vc]) {
                        facets.push(facet);
                    }
                }
            }
        }
        facets.sort_unstable();
        facets.dedup();
        facets
    }
}

/// Builds blocks over a tetrahedral solid and relates them to surfaces.
#[derive(Debug, Clone)]
pub struct BlockTopologyBuilder<'a> {
    solid: &'a TetrahedralSolid,
    facet_owner: HashMap<usize, SurfaceId>,
    triangle_counts: BTreeMap<SurfaceId, usize>,
    key_facets: BTreeMap<SurfaceId, Vec<usize>>,
    visited: Vec<bool>,
}

impl<'a> BlockTopologyBuilder<'a> {
    /// Create a builder with no matched surface and no visited tetrahedron.
    pub fn new(solid: &'a TetrahedralSolid) -> Self {
        Self {
            solid,
            facet_owner: HashMap::new(),
            triangle_counts: BTreeMap::new(),
            key_facets: BTreeMap::new(),
            visited: vec![false; solid.nb_polyhedra()],
        }
    }

    /// Claim the facets matching every triangle of `surface`.
    ///
    /// `triangles` are the surface triangles over clusters, in surface
    /// order. Unmatched triangles and facets already claimed by another
    /// surface are recorded for inspection; the first claim is kept.
    pub fn match_surface(
        &mut self,
        model: &mut BRepModel,
        matcher: &FacetMatcher<'_>,
        surface: SurfaceId,
        triangles: &[[usize; 3]],
    ) {
        let mut unmatched = 0usize;
        for (triangle, &clusters) in triangles.iter().enumerate() {
            let facets = matcher.facets_from_clusters(clusters);
            if facets.is_empty() {
                unmatched += 1;
                model.record_inspection(Inspection::NonConformalTriangle { surface, triangle });
            }
            for &facet in &facets {
                match self.facet_owner.entry(facet) {
                    Entry::Vacant(slot) => {
                        slot.insert(surface);
                    }
                    Entry::Occupied(slot) if *slot.get() != surface => {
                        let owner = *slot.get();
                        warn!(
                            surface = %model.surfaces[surface].name,
                            owner = %model.surfaces[owner].name,
                            triangle,
                            "Facet already assigned to another surface"
                        );
                        model.record_inspection(Inspection::DuplicateFacetAssignment {
                            surface,
                            owner,
                            triangle,
                        });
                    }
                    Entry::Occupied(_) => {}
                }
            }
            if triangle == 0 {
                self.key_facets.insert(surface, facets);
            }
        }
        if unmatched > 0 {
            warn!(
                surface = %model.surfaces[surface].name,
                unmatched,
                "Surface triangles match no volume facet"
            );
        }
        self.triangle_counts.insert(surface, triangles.len());
    }

    /// True when a tetrahedron already belongs to a block.
    pub fn is_visited(&self, polyhedron: usize) -> bool {
        self.visited.get(polyhedron).copied().unwrap_or(false)
    }

    /// Tetrahedron on the requested side of `surface`'s first triangle.
    ///
    /// `side = true` asks for the tetrahedron lying where the triangle's
    /// right-hand normal points, `false` for the other one.
    pub fn seed_polyhedron(&self, model: &BRepModel, surface: SurfaceId, side: bool) -> Option<usize> {
        let mesh = &model.surfaces.get(surface)?.mesh;
        if mesh.nb_polygons() == 0 {
            return None;
        }
        let [p0, p1, p2] = mesh.triangle_points(0);
        let normal = triangle_normal(&p0, &p1, &p2);
        for &facet in self.key_facets.get(&surface)? {
            for around in self.solid.polyhedra_around_facet(facet) {
                let apex: &Point3 = self
                    .solid
                    .point(self.solid.polyhedron_facet_opposite_vertex(*around));
                let height = normal.dot(&(apex - p0));
                if (side && height > 0.0) || (!side && height < 0.0) {
                    return Some(around.polyhedron);
                }
            }
        }
        None
    }

    /// Flood-fill a block from `start` and register its surface relations.
    pub fn build_block(&mut self, model: &mut BRepModel, name: &str, start: usize) -> BlockId {
        let mut polyhedra = Vec::new();
        let mut met: BTreeMap<SurfaceId, usize> = BTreeMap::new();
        let mut stack = vec![start];
        self.visited[start] = true;
        while let Some(polyhedron) = stack.pop() {
            polyhedra.push(polyhedron);
            for facet in 0..4 {
                let pf = PolyhedronFacet::new(polyhedron, facet);
                if let Some(&surface) = self.facet_owner.get(&self.solid.polyhedron_facet(pf)) {
                    *met.entry(surface).or_default() += 1;
                    continue;
                }
                if let Some(adjacent) = self.solid.polyhedron_adjacent(pf) {
                    if !self.visited[adjacent] {
                        self.visited[adjacent] = true;
                        stack.push(adjacent);
                    }
                }
            }
        }
        polyhedra.sort_unstable();

        let mut vertices: Vec<u32> = polyhedra
            .iter()
            .flat_map(|&p| self.solid.polyhedron_vertices(p))
            .collect();
        vertices.sort_unstable();
        vertices.dedup();

        let nb_polyhedra = polyhedra.len();
        let block = model.add_block(name, polyhedra, vertices);
        for (surface, facets) in met {
            let triangles = self.triangle_counts.get(&surface).copied().unwrap_or(0);
            let incidence = if facets == triangles {
                Incidence::Boundary
            } else if facets == 2 * triangles {
                Incidence::Internal
            } else {
                warn!(
                    block = name,
                    surface = %model.surfaces[surface].name,
                    facets,
                    triangles,
                    "Non-conformal surface, block relation needs inspection"
                );
                model.record_inspection(Inspection::NonConformalBlock {
                    surface,
                    block,
                    facets,
                    triangles,
                });
                if 2 * facets < 3 * triangles {
                    Incidence::Boundary
                } else {
                    Incidence::Internal
                }
            };
            debug!(block = name, surface = %model.surfaces[surface].name, ?incidence, "Block relation");
            model.add_surface_block_relation(surface, block, incidence);
        }
        info!(block = name, polyhedra = nb_polyhedra, "Block built");
        block
    }

    /// Turn every connected region not yet visited into a block named
    /// `block_<n>`, in tetrahedron order.
    pub fn discover_blocks(&mut self, model: &mut BRepModel) -> Vec<BlockId> {
        let mut blocks = Vec::new();
        for polyhedron in 0..self.visited.len() {
            if self.visited[polyhedron] {
                continue;
            }
            let name = format!("block_{}", blocks.len() + 1);
            blocks.push(self.build_block(model, &name, polyhedron));
        }
        blocks
    }
}
