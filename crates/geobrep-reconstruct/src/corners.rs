//! Corner detection from surface connectivity.
//!
//! A border vertex is a corner when the set of surfaces around it differs
//! from the set around its neighbor along the border. For a border edge
//! `(v0, v1)`:
//!
//! - sets of different size: the endpoint with the larger set is a corner;
//! - same size, different members: both endpoints are corners;
//! - identical sets: the border runs through without a corner.
//!
//! Corners are created once per unique vertex; detecting the same junction
//! again returns the existing corner.

use std::collections::BTreeSet;

use geobrep_math::Point3;
use geobrep_mesh::PolygonEdge;
use geobrep_topo::{
    BRepModel, ComponentId, ComponentKind, ComponentVertex, CornerId, SurfaceId, UniqueVertexId,
};
use hashbrown::HashSet;
use tracing::{debug, info};

use crate::error::{ReconstructError, Result};

/// Detects topological corners on surface borders.
#[derive(Debug, Clone, Copy, Default)]
pub struct CornerDetector;

impl CornerDetector {
    /// Surfaces having a vertex on `unique_vertex`.
    pub fn incident_surfaces(model: &BRepModel, unique_vertex: UniqueVertexId) -> BTreeSet<SurfaceId> {
        model
            .vertices()
            .component_vertices_of_kind(unique_vertex, ComponentKind::Surface)
            .filter_map(|cmv| match cmv.component {
                ComponentId::Surface(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    /// Endpoints of a border edge that are corners.
    ///
    /// Endpoints without a unique vertex never qualify.
    pub fn corners_at_border_edge(
        model: &BRepModel,
        surface: SurfaceId,
        edge: PolygonEdge,
    ) -> Vec<UniqueVertexId> {
        let [v0, v1] = model.surfaces[surface].mesh.polygon_edge_vertices(edge);
        let (Some(u0), Some(u1)) = (
            model.unique_vertex(ComponentVertex::new(surface, v0)),
            model.unique_vertex(ComponentVertex::new(surface, v1)),
        ) else {
            return Vec::new();
        };
        let s0 = Self::incident_surfaces(model, u0);
        let s1 = Self::incident_surfaces(model, u1);
        if s0.len() > s1.len() {
            vec![u0]
        } else if s0.len() < s1.len() {
            vec![u1]
        } else if s0 != s1 {
            vec![u0, u1]
        } else {
            Vec::new()
        }
    }

    /// Corner on `unique_vertex`, created at `point` if it does not exist.
    pub fn create_corner(model: &mut BRepModel, unique_vertex: UniqueVertexId, point: Point3) -> CornerId {
        if let Some(existing) = model.corner_of_unique_vertex(unique_vertex) {
            return existing;
        }
        let corner = model.add_corner(point);
        model.set_unique_vertex(ComponentVertex::new(corner, 0), unique_vertex);
        debug!(%unique_vertex, "Corner created");
        corner
    }

    /// Scan every border edge of `surfaces` and create the corners found.
    ///
    /// Returns the distinct corners found, in detection order.
    pub fn detect(model: &mut BRepModel, surfaces: &[SurfaceId]) -> Vec<CornerId> {
        let mut found = Vec::new();
        let mut seen = HashSet::new();
        for &surface in surfaces {
            let candidates: Vec<(UniqueVertexId, Point3)> = {
                let mesh = &model.surfaces[surface].mesh;
                let mut candidates = Vec::new();
                for edge in mesh.border_edges() {
                    for uv in Self::corners_at_border_edge(model, surface, edge) {
                        let local = model
                            .vertices()
                            .component_vertices_in(uv, surface.into())
                            .next();
                        if let Some(v) = local {
                            candidates.push((uv, *mesh.point(v)));
                        }
                    }
                }
                candidates
            };
            for (uv, point) in candidates {
                let corner = Self::create_corner(model, uv, point);
                if seen.insert(corner) {
                    found.push(corner);
                }
            }
        }
        info!(corners = found.len(), "Corners detected");
        found
    }

    /// Give every cornerless border loop a corner at its smallest unique
    /// vertex, so the loop can be traced as a closed line.
    pub fn close_cornerless_loops(model: &mut BRepModel, surfaces: &[SurfaceId]) -> Result<Vec<CornerId>> {
        let mut created = Vec::new();
        for &surface in surfaces {
            let promotions = Self::cornerless_loop_vertices(model, surface)?;
            for (uv, point) in promotions {
                if model.corner_of_unique_vertex(uv).is_none() {
                    created.push(Self::create_corner(model, uv, point));
                }
            }
        }
        if !created.is_empty() {
            info!(corners = created.len(), "Corners added on closed border loops");
        }
        Ok(created)
    }

    fn cornerless_loop_vertices(
        model: &BRepModel,
        surface: SurfaceId,
    ) -> Result<Vec<(UniqueVertexId, Point3)>> {
        let data = &model.surfaces[surface];
        let mesh = &data.mesh;
        let border = mesh.border_edges();
        let mut visited = HashSet::new();
        let mut promotions = Vec::new();
        for &start in &border {
            if visited.contains(&start) {
                continue;
            }
            let mut loop_vertices = Vec::new();
            let mut current = start;
            loop {
                if !visited.insert(current) {
                    break;
                }
                let [v0, v1] = mesh.polygon_edge_vertices(current);
                loop_vertices.push(v0);
                current = mesh
                    .next_on_border(current)
                    .ok_or_else(|| ReconstructError::OpenBorder {
                        surface: data.name.clone(),
                        vertex: v1,
                    })?;
                if current == start {
                    break;
                }
            }
            let unique: Vec<(UniqueVertexId, u32)> = loop_vertices
                .iter()
                .filter_map(|&v| {
                    model
                        .unique_vertex(ComponentVertex::new(surface, v))
                        .map(|uv| (uv, v))
                })
                .collect();
            if unique
                .iter()
                .any(|(uv, _)| model.corner_of_unique_vertex(*uv).is_some())
            {
                continue;
            }
            if let Some(&(uv, v)) = unique.iter().min_by_key(|(uv, _)| *uv) {
                promotions.push((uv, *mesh.point(v)));
            }
        }
        Ok(promotions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geobrep_mesh::TriangulatedSurface;

    /// Unit square split along its diagonal, vertices 0..4 counter-clockwise.
    fn square(x0: f64) -> TriangulatedSurface {
        TriangulatedSurface::new(
            vec![
                Point3::new(x0, 0.0, 0.0),
                Point3::new(x0 + 1.0, 0.0, 0.0),
                Point3::new(x0 + 1.0, 1.0, 0.0),
                Point3::new(x0, 1.0, 0.0),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        )
        .unwrap()
    }

    /// Two unit squares side by side sharing the edge x = 1, every vertex
    /// given a unique vertex.
    fn two_squares() -> (BRepModel, SurfaceId, SurfaceId) {
        let mut model = BRepModel::new("m");
        let a = model.add_surface("a", square(0.0));
        let b = model.add_surface("b", square(1.0));
        let ids = model.vertices_mut();
        let uvs: Vec<UniqueVertexId> = (0..6).map(|_| ids.create_unique_vertex()).collect();
        // a: 0 1 2 3 -> u0 u1 u2 u3 ; b: 0 1 2 3 -> u1 u4 u5 u2
        for (v, uv) in [uvs[0], uvs[1], uvs[2], uvs[3]].into_iter().enumerate() {
            model.set_unique_vertex(ComponentVertex::new(a, v as u32), uv);
        }
        for (v, uv) in [uvs[1], uvs[4], uvs[5], uvs[2]].into_iter().enumerate() {
            model.set_unique_vertex(ComponentVertex::new(b, v as u32), uv);
        }
        (model, a, b)
    }

    #[test]
    fn test_larger_set_is_corner() {
        let (model, a, _) = two_squares();
        let edge = model.surfaces[a].mesh.polygon_edge_from_vertices(0, 1).unwrap();
        let u1 = model.unique_vertex(ComponentVertex::new(a, 1)).unwrap();
        assert_eq!(CornerDetector::corners_at_border_edge(&model, a, edge), vec![u1]);
    }

    #[test]
    fn test_identical_sets_are_not_corners() {
        let (model, a, _) = two_squares();
        let edge = model.surfaces[a].mesh.polygon_edge_from_vertices(3, 0).unwrap();
        assert!(CornerDetector::corners_at_border_edge(&model, a, edge).is_empty());
    }

    #[test]
    fn test_detect_is_idempotent() {
        let (mut model, a, b) = two_squares();
        let first = CornerDetector::detect(&mut model, &[a, b]);
        assert_eq!(first.len(), 2);
        let second = CornerDetector::detect(&mut model, &[a, b]);
        assert_eq!(first, second);
        assert_eq!(model.corners.len(), 2);
    }

    #[test]
    fn test_cornerless_loop_through_non_manifold_edge_fails() {
        // The diagonal 0-2 is shared by three triangles.
        let mesh = TriangulatedSurface::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
                Point3::new(0.5, 0.5, 1.0),
            ],
            vec![[0, 1, 2], [0, 2, 3], [0, 2, 4]],
        )
        .unwrap();
        let mut model = BRepModel::new("m");
        let a = model.add_surface("hinged", mesh);
        let err = CornerDetector::close_cornerless_loops(&mut model, &[a]).unwrap_err();
        assert!(matches!(err, ReconstructError::OpenBorder { ref surface, .. } if surface == "hinged"));
        assert!(model.corners.is_empty());
    }

    #[test]
    fn test_cornerless_loop_gets_smallest_vertex() {
        let mut model = BRepModel::new("m");
        let a = model.add_surface("a", square(0.0));
        let first = model.vertices_mut().create_unique_vertices(4);
        for v in 0..4u32 {
            let uv = model.vertices().unique_vertex_at(first.index() + v as usize).unwrap();
            model.set_unique_vertex(ComponentVertex::new(a, v), uv);
        }
        assert!(CornerDetector::detect(&mut model, &[a]).is_empty());
        let created = CornerDetector::close_cornerless_loops(&mut model, &[a]).unwrap();
        assert_eq!(created.len(), 1);
        assert_eq!(model.corner_unique_vertex(created[0]), Some(first));
        // A second pass finds the loop closed.
        assert!(CornerDetector::close_cornerless_loops(&mut model, &[a])
            .unwrap()
            .is_empty());
    }
}
