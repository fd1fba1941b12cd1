//! Line tracing along surface borders.
//!
//! A line is traced from a border edge starting at a corner, following
//! `next_on_border` until the next corner. Traced lines are matched against
//! lines already created between the same corners, forward first, then
//! reversed, so adjoining surfaces describing the same curve share one
//! line.

use std::collections::BTreeMap;

use geobrep_math::{Point3, Tolerance};
use geobrep_mesh::PolygonEdge;
use geobrep_topo::{
    BRepModel, ComponentKind, ComponentVertex, CornerId, Incidence, Inspection, LineId, SurfaceId,
    UniqueVertexId,
};
use tracing::{debug, info, warn};

use crate::corners::CornerDetector;
use crate::error::{ReconstructError, Result};

/// A border polyline traced on one surface between two corners.
#[derive(Debug, Clone, PartialEq)]
pub struct TracedLine {
    /// Surface the line was traced on.
    pub surface: SurfaceId,
    /// Surface-local vertices, in tracing order.
    pub vertices: Vec<u32>,
    /// Unique vertex of each traced vertex, if assigned.
    pub unique_vertices: Vec<Option<UniqueVertexId>>,
    /// Positions of the traced vertices.
    pub points: Vec<Point3>,
    /// Start and end corner.
    pub corners: [CornerId; 2],
}

/// How a traced line was reconciled with existing lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineMatch {
    /// No existing line matched; a new one was created.
    Created(LineId),
    /// An existing line runs the same way.
    Same(LineId),
    /// An existing line runs the opposite way.
    Reversed(LineId),
}

impl LineMatch {
    /// The matched or created line.
    pub fn line(&self) -> LineId {
        match *self {
            LineMatch::Created(id) | LineMatch::Same(id) | LineMatch::Reversed(id) => id,
        }
    }
}

/// Traces and deduplicates lines on surface borders.
pub struct LineTracer<'m> {
    model: &'m mut BRepModel,
    tolerance: Tolerance,
    corners_to_lines: BTreeMap<(CornerId, CornerId), Vec<LineId>>,
}

impl<'m> LineTracer<'m> {
    /// Create a tracer over `model`, indexing the lines it already holds.
    pub fn new(model: &'m mut BRepModel, tolerance: Tolerance) -> Self {
        let mut corners_to_lines: BTreeMap<(CornerId, CornerId), Vec<LineId>> = BTreeMap::new();
        for (id, line) in &model.lines {
            corners_to_lines
                .entry((line.corners[0], line.corners[1]))
                .or_default()
                .push(id);
        }
        Self {
            model,
            tolerance,
            corners_to_lines,
        }
    }

    /// Trace the border of `surface` from `start` until a corner.
    pub fn trace(&self, surface: SurfaceId, start: PolygonEdge) -> Result<TracedLine> {
        let data = &self.model.surfaces[surface];
        let mesh = &data.mesh;
        let unique_vertex = |v: u32| self.model.unique_vertex(ComponentVertex::new(surface, v));
        let corner_at = |v: u32| unique_vertex(v).and_then(|uv| self.model.corner_of_unique_vertex(uv));

        let [first, _] = mesh.polygon_edge_vertices(start);
        let start_corner = match corner_at(first) {
            Some(corner) if mesh.is_edge_on_border(start) => corner,
            _ => {
                return Err(ReconstructError::LineStartNotFound {
                    surface: data.name.clone(),
                    vertex: first,
                })
            }
        };

        let max_vertices = mesh.nb_polygons() * 3 + 1;
        let mut vertices = vec![first];
        let mut current = start;
        let end_corner = loop {
            let [_, end] = mesh.polygon_edge_vertices(current);
            vertices.push(end);
            if let Some(corner) = corner_at(end) {
                break corner;
            }
            let open_border = || ReconstructError::OpenBorder {
                surface: data.name.clone(),
                vertex: end,
            };
            if vertices.len() > max_vertices {
                return Err(open_border());
            }
            current = mesh.next_on_border(current).ok_or_else(open_border)?;
        };

        Ok(TracedLine {
            surface,
            unique_vertices: vertices.iter().map(|&v| unique_vertex(v)).collect(),
            points: vertices.iter().map(|&v| *mesh.point(v)).collect(),
            vertices,
            corners: [start_corner, end_corner],
        })
    }

    /// Reuse an existing line equal to `traced` (same or reversed point
    /// sequence within tolerance), or create a new one.
    pub fn find_or_create_line(&mut self, traced: &TracedLine) -> LineMatch {
        let [c0, c1] = traced.corners;
        if let Some(line) = self.find_equal_line((c0, c1), &traced.points, false) {
            return LineMatch::Same(line);
        }
        if let Some(line) = self.find_equal_line((c1, c0), &traced.points, true) {
            return LineMatch::Reversed(line);
        }

        let line = self.model.add_line(traced.points.clone(), traced.corners);
        for (i, uv) in traced.unique_vertices.iter().enumerate() {
            if let Some(uv) = uv {
                self.model
                    .set_unique_vertex(ComponentVertex::new(line, i as u32), *uv);
            }
        }
        self.corners_to_lines.entry((c0, c1)).or_default().push(line);
        debug!(
            surface = %self.model.surfaces[traced.surface].name,
            vertices = traced.points.len(),
            "Line created"
        );
        LineMatch::Created(line)
    }

    /// Trace every line on the border of `surface` and register the
    /// line-surface relations: a line traced once bounds the surface, a
    /// line traced twice (once per side) is internal to it.
    pub fn trace_surface(&mut self, surface: SurfaceId) -> Result<Vec<LineMatch>> {
        let starts: Vec<PolygonEdge> = {
            let mesh = &self.model.surfaces[surface].mesh;
            mesh.border_edges()
                .into_iter()
                .filter(|&edge| {
                    let [v0, _] = mesh.polygon_edge_vertices(edge);
                    self.model
                        .unique_vertex(ComponentVertex::new(surface, v0))
                        .and_then(|uv| self.model.corner_of_unique_vertex(uv))
                        .is_some()
                })
                .collect()
        };

        let mut matches = Vec::with_capacity(starts.len());
        let mut counts: BTreeMap<LineId, usize> = BTreeMap::new();
        for start in starts {
            let traced = self.trace(surface, start)?;
            let found = self.find_or_create_line(&traced);
            *counts.entry(found.line()).or_default() += 1;
            matches.push(found);
        }

        for (line, count) in counts {
            let incidence = match count {
                1 => Incidence::Boundary,
                2 => Incidence::Internal,
                _ => {
                    warn!(
                        surface = %self.model.surfaces[surface].name,
                        count,
                        "Line traced an unexpected number of times on surface border"
                    );
                    self.model.record_inspection(Inspection::UnexpectedLineIncidence {
                        line,
                        surface,
                        count,
                    });
                    Incidence::Internal
                }
            };
            self.model.add_line_surface_relation(line, surface, incidence);
        }
        Ok(matches)
    }

    /// Trace the borders of every given surface, in order.
    pub fn trace_surfaces(&mut self, surfaces: &[SurfaceId]) -> Result<()> {
        for &surface in surfaces {
            self.trace_surface(surface)?;
        }
        info!(lines = self.model.lines.len(), "Lines traced");
        Ok(())
    }

    fn find_equal_line(
        &self,
        key: (CornerId, CornerId),
        points: &[Point3],
        reversed: bool,
    ) -> Option<LineId> {
        let candidates = self.corners_to_lines.get(&key)?;
        candidates.iter().copied().find(|&id| {
            let existing = &self.model.lines[id].points;
            existing.len() == points.len()
                && existing.iter().enumerate().all(|(i, p)| {
                    let j = if reversed { points.len() - 1 - i } else { i };
                    self.tolerance.points_equal(p, &points[j])
                })
        })
    }
}

/// Find lines running through the interior of surfaces they are not
/// related to, and register them as internal.
///
/// A surface contains a line when every line segment is an edge of the
/// surface mesh between vertices carrying the segment's unique vertices.
/// The surface is not cut; each case is logged and recorded for
/// inspection. Returns the number of relations added.
pub fn check_uncut_internal_lines(model: &mut BRepModel) -> usize {
    let mut found = Vec::new();
    for (line, _) in &model.lines {
        let Some(uvs) = model
            .vertices()
            .unique_vertices_of(line.into())
            .iter()
            .copied()
            .collect::<Option<Vec<UniqueVertexId>>>()
        else {
            continue;
        };
        if uvs.len() < 2 {
            continue;
        }
        let candidates = CornerDetector::incident_surfaces(model, uvs[0]);
        for surface in candidates {
            if model.line_surface_relation(line, surface).is_some() {
                continue;
            }
            if surface_contains_polyline(model, surface, &uvs) {
                found.push((line, surface));
            }
        }
    }

    for &(line, surface) in &found {
        warn!(
            surface = %model.surfaces[surface].name,
            "Surface should be cut along an internal line"
        );
        model.add_line_surface_relation(line, surface, Incidence::Internal);
        model.record_inspection(Inspection::UncutInternalLine { line, surface });
    }
    found.len()
}

fn surface_contains_polyline(model: &BRepModel, surface: SurfaceId, uvs: &[UniqueVertexId]) -> bool {
    let mesh = &model.surfaces[surface].mesh;
    let ids = model.vertices();
    uvs.windows(2).all(|segment| {
        ids.component_vertices_in(segment[0], surface.into()).any(|a| {
            ids.component_vertices_in(segment[1], surface.into()).any(|b| {
                mesh.polygon_edge_from_vertices(a, b).is_some()
                    || mesh.polygon_edge_from_vertices(b, a).is_some()
            })
        })
    })
}

/// True when some line vertex sits on `unique_vertex`.
pub(crate) fn is_on_line(model: &BRepModel, unique_vertex: UniqueVertexId) -> bool {
    model
        .vertices()
        .has_component_of_kind(unique_vertex, ComponentKind::Line)
}
