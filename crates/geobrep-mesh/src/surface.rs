//! Indexed triangle patch with adjacency and border walking.
//!
//! Edges are addressed per polygon: edge `e` of a triangle goes from its
//! local vertex `e` to local vertex `(e + 1) % 3`. Two triangles are
//! adjacent when they share an edge used by exactly two triangles; an edge
//! used by a single triangle is a border edge. Edges used by more than two
//! triangles are neither.

use geobrep_math::{BoundingBox3, Point3};
use hashbrown::HashMap;

use crate::error::{MeshError, Result};

/// Directed edge of a polygon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PolygonEdge {
    /// Polygon index.
    pub polygon: usize,
    /// Local edge index in `0..3`.
    pub edge: usize,
}

impl PolygonEdge {
    /// Create a polygon edge reference.
    pub fn new(polygon: usize, edge: usize) -> Self {
        Self { polygon, edge }
    }
}

/// A triangulated surface patch.
#[derive(Debug, Clone)]
pub struct TriangulatedSurface {
    points: Vec<Point3>,
    triangles: Vec<[u32; 3]>,
    adjacents: Vec<[Option<usize>; 3]>,
    borders: Vec<[bool; 3]>,
    border_vertices: Vec<bool>,
    directed_edges: HashMap<(u32, u32), PolygonEdge>,
}

impl TriangulatedSurface {
    /// Build a surface from points and triangles, computing adjacency.
    pub fn new(points: Vec<Point3>, triangles: Vec<[u32; 3]>) -> Result<Self> {
        let vertex_count = points.len();
        for (index, tri) in triangles.iter().enumerate() {
            for (i, &v) in tri.iter().enumerate() {
                if v as usize >= vertex_count {
                    return Err(MeshError::InvalidIndex {
                        index: v,
                        vertex_count,
                    });
                }
                if tri[(i + 1) % 3] == v {
                    return Err(MeshError::DegenerateElement {
                        element: "triangle",
                        index,
                        vertex: v,
                    });
                }
            }
        }

        let mut undirected: HashMap<(u32, u32), Vec<PolygonEdge>> = HashMap::new();
        let mut directed_edges = HashMap::new();
        for (polygon, tri) in triangles.iter().enumerate() {
            for edge in 0..3 {
                let (a, b) = (tri[edge], tri[(edge + 1) % 3]);
                let polygon_edge = PolygonEdge::new(polygon, edge);
                directed_edges.entry((a, b)).or_insert(polygon_edge);
                undirected
                    .entry(normalize_edge(a, b))
                    .or_default()
                    .push(polygon_edge);
            }
        }

        let mut adjacents = vec![[None; 3]; triangles.len()];
        let mut borders = vec![[false; 3]; triangles.len()];
        let mut border_vertices = vec![false; vertex_count];
        for (&(a, b), edges) in &undirected {
            match edges.as_slice() {
                [single] => {
                    borders[single.polygon][single.edge] = true;
                    border_vertices[a as usize] = true;
                    border_vertices[b as usize] = true;
                }
                [first, second] => {
                    adjacents[first.polygon][first.edge] = Some(second.polygon);
                    adjacents[second.polygon][second.edge] = Some(first.polygon);
                }
                _ => {}
            }
        }

        Ok(Self {
            points,
            triangles,
            adjacents,
            borders,
            border_vertices,
            directed_edges,
        })
    }

    /// Number of vertices.
    pub fn nb_vertices(&self) -> usize {
        self.points.len()
    }

    /// Number of triangles.
    pub fn nb_polygons(&self) -> usize {
        self.triangles.len()
    }

    /// All vertex positions.
    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    /// Position of a vertex.
    pub fn point(&self, vertex: u32) -> &Point3 {
        &self.points[vertex as usize]
    }

    /// All triangles.
    pub fn triangles(&self) -> &[[u32; 3]] {
        &self.triangles
    }

    /// Vertices of a triangle.
    pub fn polygon_vertices(&self, polygon: usize) -> [u32; 3] {
        self.triangles[polygon]
    }

    /// Positions of a triangle's vertices, in winding order.
    pub fn triangle_points(&self, polygon: usize) -> [Point3; 3] {
        let [a, b, c] = self.triangles[polygon];
        [*self.point(a), *self.point(b), *self.point(c)]
    }

    /// Start and end vertex of a polygon edge.
    pub fn polygon_edge_vertices(&self, edge: PolygonEdge) -> [u32; 2] {
        let tri = &self.triangles[edge.polygon];
        [tri[edge.edge], tri[(edge.edge + 1) % 3]]
    }

    /// The polygon across an edge, if exactly one exists.
    pub fn polygon_adjacent(&self, edge: PolygonEdge) -> Option<usize> {
        self.adjacents[edge.polygon][edge.edge]
    }

    /// True when the edge belongs to a single polygon.
    pub fn is_edge_on_border(&self, edge: PolygonEdge) -> bool {
        self.borders[edge.polygon][edge.edge]
    }

    /// True when the vertex touches at least one border edge.
    pub fn is_vertex_on_border(&self, vertex: u32) -> bool {
        self.border_vertices[vertex as usize]
    }

    /// Polygon edge running from `from` to `to`, in that direction.
    pub fn polygon_edge_from_vertices(&self, from: u32, to: u32) -> Option<PolygonEdge> {
        self.directed_edges.get(&(from, to)).copied()
    }

    /// All border edges, ordered by polygon then local edge.
    pub fn border_edges(&self) -> Vec<PolygonEdge> {
        let mut edges = Vec::new();
        for (polygon, flags) in self.borders.iter().enumerate() {
            for (edge, &on_border) in flags.iter().enumerate() {
                if on_border {
                    edges.push(PolygonEdge::new(polygon, edge));
                }
            }
        }
        edges
    }

    /// Border edge starting where `edge` ends.
    ///
    /// Rotates around the end vertex through adjacent polygons. Returns
    /// `None` if `edge` is not on the border or if the walk meets a
    /// non-manifold edge or an inconsistently oriented neighbor.
    pub fn next_on_border(&self, edge: PolygonEdge) -> Option<PolygonEdge> {
        if !self.is_edge_on_border(edge) {
            return None;
        }
        let [_, pivot] = self.polygon_edge_vertices(edge);
        let mut polygon = edge.polygon;
        let mut candidate = (edge.edge + 1) % 3;
        for _ in 0..=self.triangles.len() {
            let current = PolygonEdge::new(polygon, candidate);
            if self.is_edge_on_border(current) {
                return Some(current);
            }
            let next_polygon = self.polygon_adjacent(current)?;
            let [_, other] = self.polygon_edge_vertices(current);
            let shared = self.local_edge(next_polygon, other, pivot)?;
            polygon = next_polygon;
            candidate = (shared + 1) % 3;
        }
        None
    }

    /// Border edge ending where `edge` starts.
    ///
    /// Mirror of [`Self::next_on_border`], rotating around the start vertex.
    pub fn previous_on_border(&self, edge: PolygonEdge) -> Option<PolygonEdge> {
        if !self.is_edge_on_border(edge) {
            return None;
        }
        let [pivot, _] = self.polygon_edge_vertices(edge);
        let mut polygon = edge.polygon;
        let mut candidate = (edge.edge + 2) % 3;
        for _ in 0..=self.triangles.len() {
            let current = PolygonEdge::new(polygon, candidate);
            if self.is_edge_on_border(current) {
                return Some(current);
            }
            let next_polygon = self.polygon_adjacent(current)?;
            let [other, _] = self.polygon_edge_vertices(current);
            let shared = self.local_edge(next_polygon, pivot, other)?;
            polygon = next_polygon;
            candidate = (shared + 2) % 3;
        }
        None
    }

    /// Bounding box of all vertices.
    pub fn bounding_box(&self) -> BoundingBox3 {
        BoundingBox3::from_points(&self.points)
    }

    fn local_edge(&self, polygon: usize, from: u32, to: u32) -> Option<usize> {
        let tri = &self.triangles[polygon];
        (0..3).find(|&e| tri[e] == from && tri[(e + 1) % 3] == to)
    }
}

fn normalize_edge(a: u32, b: u32) -> (u32, u32) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}
