//! Indexed tetrahedral mesh with a facet index.
//!
//! Facet `f` of a tetrahedron is the triangle opposite its local vertex
//! `f`. Every distinct vertex triple used as a facet gets one facet id,
//! shared by the one or two tetrahedra around it, so a facet can be looked
//! up from its vertices in any order.

use geobrep_math::{BoundingBox3, Point3};
use hashbrown::HashMap;

use crate::error::{MeshError, Result};

/// Local vertices of each tetrahedron facet, facet `f` being opposite vertex `f`.
const TETRAHEDRON_FACET_VERTICES: [[usize; 3]; 4] = [[1, 3, 2], [0, 2, 3], [3, 1, 0], [0, 1, 2]];

/// Facet `facet` of tetrahedron `polyhedron`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PolyhedronFacet {
    /// Tetrahedron index.
    pub polyhedron: usize,
    /// Local facet index in `0..4`.
    pub facet: usize,
}

impl PolyhedronFacet {
    /// Create a polyhedron facet reference.
    pub fn new(polyhedron: usize, facet: usize) -> Self {
        Self { polyhedron, facet }
    }
}

/// A tetrahedral volume mesh.
#[derive(Debug, Clone)]
pub struct TetrahedralSolid {
    points: Vec<Point3>,
    tetrahedra: Vec<[u32; 4]>,
    polyhedron_facets: Vec<[usize; 4]>,
    facets_around: Vec<Vec<PolyhedronFacet>>,
    facet_index: HashMap<[u32; 3], usize>,
}

impl TetrahedralSolid {
    /// Build a solid from points and tetrahedra, indexing every facet.
    pub fn new(points: Vec<Point3>, tetrahedra: Vec<[u32; 4]>) -> Result<Self> {
        let vertex_count = points.len();
        for (index, tet) in tetrahedra.iter().enumerate() {
            for (i, &v) in tet.iter().enumerate() {
                if v as usize >= vertex_count {
                    return Err(MeshError::InvalidIndex {
                        index: v,
                        vertex_count,
                    });
                }
                if tet[i + 1..].contains(&v) {
                    return Err(MeshError::DegenerateElement {
                        element: "tetrahedron",
                        index,
                        vertex: v,
                    });
                }
            }
        }

        let mut facet_index: HashMap<[u32; 3], usize> = HashMap::new();
        let mut facets_around: Vec<Vec<PolyhedronFacet>> = Vec::new();
        let mut polyhedron_facets = Vec::with_capacity(tetrahedra.len());
        for (polyhedron, tet) in tetrahedra.iter().enumerate() {
            let mut ids = [0usize; 4];
            for (facet, local) in TETRAHEDRON_FACET_VERTICES.iter().enumerate() {
                let key = sorted_triple([tet[local[0]], tet[local[1]], tet[local[2]]]);
                let id = *facet_index.entry(key).or_insert_with(|| {
                    facets_around.push(Vec::new());
                    facets_around.len() - 1
                });
                facets_around[id].push(PolyhedronFacet::new(polyhedron, facet));
                ids[facet] = id;
            }
            polyhedron_facets.push(ids);
        }

        Ok(Self {
            points,
            tetrahedra,
            polyhedron_facets,
            facets_around,
            facet_index,
        })
    }

    /// Number of vertices.
    pub fn nb_vertices(&self) -> usize {
        self.points.len()
    }

    /// Number of tetrahedra.
    pub fn nb_polyhedra(&self) -> usize {
        self.tetrahedra.len()
    }

    /// Number of distinct facets.
    pub fn nb_facets(&self) -> usize {
        self.facets_around.len()
    }

    /// Position of a vertex.
    pub fn point(&self, vertex: u32) -> &Point3 {
        &self.points[vertex as usize]
    }

    /// Vertices of a tetrahedron.
    pub fn polyhedron_vertices(&self, polyhedron: usize) -> [u32; 4] {
        self.tetrahedra[polyhedron]
    }

    /// Facet id of a polyhedron facet.
    pub fn polyhedron_facet(&self, facet: PolyhedronFacet) -> usize {
        self.polyhedron_facets[facet.polyhedron][facet.facet]
    }

    /// Vertices of a polyhedron facet.
    pub fn polyhedron_facet_vertices(&self, facet: PolyhedronFacet) -> [u32; 3] {
        let tet = &self.tetrahedra[facet.polyhedron];
        let local = TETRAHEDRON_FACET_VERTICES[facet.facet];
        [tet[local[0]], tet[local[1]], tet[local[2]]]
    }

    /// The tetrahedron vertex not on the given facet.
    pub fn polyhedron_facet_opposite_vertex(&self, facet: PolyhedronFacet) -> u32 {
        self.tetrahedra[facet.polyhedron][facet.facet]
    }

    /// Tetrahedra sharing a facet (one on the mesh border, two inside).
    pub fn polyhedra_around_facet(&self, facet: usize) -> &[PolyhedronFacet] {
        &self.facets_around[facet]
    }

    /// The tetrahedron across a facet, if any.
    pub fn polyhedron_adjacent(&self, facet: PolyhedronFacet) -> Option<usize> {
        let id = self.polyhedron_facet(facet);
        match self.facets_around[id].as_slice() {
            [a, b] if a.polyhedron == facet.polyhedron => Some(b.polyhedron),
            [a, b] if b.polyhedron == facet.polyhedron => Some(a.polyhedron),
            _ => None,
        }
    }

    /// Facet id whose vertices are exactly `vertices`, in any order.
    pub fn facet_from_vertices(&self, vertices: [u32; 3]) -> Option<usize> {
        self.facet_index.get(&sorted_triple(vertices)).copied()
    }

    /// Bounding box of all vertices.
    pub fn bounding_box(&self) -> BoundingBox3 {
        BoundingBox3::from_points(&self.points)
    }
}

fn sorted_triple(mut vertices: [u32; 3]) -> [u32; 3] {
    vertices.sort_unstable();
    vertices
}
