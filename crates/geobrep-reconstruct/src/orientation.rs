//! Surface orientation per region.
//!
//! Every line shared by two surfaces tells whether the two windings agree:
//! a consistent pair runs the shared segment in opposite directions. Signs
//! are propagated breadth-first from the smallest surface id of a region,
//! then the whole set is flipped if the shell it describes encloses a
//! negative volume.
//!
//! A sign of `true` keeps the stored winding. After validation, `true`
//! means the stored normal points out of the shell, which is out of a
//! block and into the model for the universe.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use geobrep_math::{tetrahedron_signed_volume, BoundingBox3, Point3};
use geobrep_topo::{BRepModel, BlockId, Inspection, Region, SurfaceId, UniqueVertexId};
use tracing::{debug, info, warn};

use crate::error::{ReconstructError, Result};
use crate::params::ReconstructionParams;

/// Which way each surface faces for each region it bounds.
///
/// `true` when the surface's stored normal points out of the region.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegionSurfaceSide {
    /// Sides for (block, surface) pairs.
    pub regions: BTreeMap<(BlockId, SurfaceId), bool>,
    /// Sides for surfaces bounding the universe.
    pub universe: BTreeMap<SurfaceId, bool>,
}

impl RegionSurfaceSide {
    /// Side of `surface` for `region`, if it bounds the region.
    pub fn side(&self, region: Region, surface: SurfaceId) -> Option<bool> {
        match region {
            Region::Block(block) => self.block_side(block, surface),
            Region::Universe => self.universe_side(surface),
        }
    }

    /// Side of `surface` for a block.
    pub fn block_side(&self, block: BlockId, surface: SurfaceId) -> Option<bool> {
        self.regions.get(&(block, surface)).copied()
    }

    /// Side of `surface` for the universe.
    pub fn universe_side(&self, surface: SurfaceId) -> Option<bool> {
        self.universe.get(&surface).copied()
    }
}

/// Signs resolved for one region's surface set.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionSigns {
    /// Surfaces of the region, sorted.
    pub surfaces: Vec<SurfaceId>,
    /// `true` when the matching surface's stored normal points out of the
    /// shell.
    pub outward: Vec<bool>,
    /// Surfaces propagation could not reach. They keep `true`.
    pub unreached: Vec<SurfaceId>,
    /// Enclosed volume after correction.
    pub volume: f64,
}

/// Resolves consistent surface signs from shared-line evidence.
#[derive(Debug, Clone)]
pub struct OrientationSolver<'m> {
    model: &'m BRepModel,
    degenerate_volume_ratio: f64,
    paired_signs: BTreeMap<(SurfaceId, SurfaceId), bool>,
}

impl<'m> OrientationSolver<'m> {
    /// Collect pairwise evidence from every line of `model`.
    pub fn new(model: &'m BRepModel, degenerate_volume_ratio: f64) -> Self {
        let mut paired_signs = BTreeMap::new();
        for (line, _) in &model.lines {
            let uvs = model.vertices().unique_vertices_of(line.into());
            let (Some(Some(u0)), Some(Some(u1))) = (uvs.first(), uvs.get(1)) else {
                continue;
            };
            let observed: Vec<(SurfaceId, bool)> = model
                .surfaces_of_line(line)
                .into_iter()
                .filter_map(|(surface, _)| {
                    edge_direction(model, surface, *u0, *u1).map(|dir| (surface, dir))
                })
                .collect();
            for (i, &(a, dir_a)) in observed.iter().enumerate() {
                for &(b, dir_b) in &observed[i + 1..] {
                    let key = (a.min(b), a.max(b));
                    paired_signs.entry(key).or_insert(dir_a != dir_b);
                }
            }
        }
        debug!(pairs = paired_signs.len(), "Pairwise orientation collected");
        Self {
            model,
            degenerate_volume_ratio,
            paired_signs,
        }
    }

    /// Whether two surfaces are consistently oriented, if known.
    pub fn relative_sign(&self, a: SurfaceId, b: SurfaceId) -> Option<bool> {
        self.paired_signs.get(&(a.min(b), a.max(b))).copied()
    }

    /// Propagate signs from `surfaces[0]` over the pairwise table.
    ///
    /// Returns the sign of each surface and whether it was reached.
    pub fn propagate(&self, surfaces: &[SurfaceId]) -> (Vec<bool>, Vec<bool>) {
        let mut signs = vec![true; surfaces.len()];
        let mut reached = vec![false; surfaces.len()];
        if surfaces.is_empty() {
            return (signs, reached);
        }
        reached[0] = true;
        let mut queue = VecDeque::from([0usize]);
        while let Some(current) = queue.pop_front() {
            for other in 0..surfaces.len() {
                if reached[other] {
                    continue;
                }
                if let Some(consistent) = self.relative_sign(surfaces[current], surfaces[other]) {
                    signs[other] = if consistent {
                        signs[current]
                    } else {
                        !signs[current]
                    };
                    reached[other] = true;
                    queue.push_back(other);
                }
            }
        }
        (signs, reached)
    }

    /// Signed volume enclosed by the surfaces, winding flipped where the
    /// sign is `false`, measured from `apex`.
    pub fn signed_volume(&self, surfaces: &[SurfaceId], signs: &[bool], apex: &Point3) -> f64 {
        let mut volume = 0.0;
        for (&surface, &sign) in surfaces.iter().zip(signs) {
            let mesh = &self.model.surfaces[surface].mesh;
            for polygon in 0..mesh.nb_polygons() {
                let [p0, p1, p2] = mesh.triangle_points(polygon);
                volume += if sign {
                    tetrahedron_signed_volume(apex, &p0, &p1, &p2)
                } else {
                    tetrahedron_signed_volume(apex, &p0, &p2, &p1)
                };
            }
        }
        volume
    }

    /// Resolve the outward signs of a region's boundary surfaces.
    pub fn solve_region(&self, region: Region) -> Result<RegionSigns> {
        let surfaces: Vec<SurfaceId> = self
            .model
            .region_boundaries(region)
            .into_iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        match surfaces.len() {
            0 => {
                return Ok(RegionSigns {
                    surfaces,
                    outward: Vec::new(),
                    unreached: Vec::new(),
                    volume: 0.0,
                })
            }
            1 => {
                return Ok(RegionSigns {
                    surfaces,
                    outward: vec![true],
                    unreached: Vec::new(),
                    volume: 0.0,
                })
            }
            _ => {}
        }

        let (mut signs, reached) = self.propagate(&surfaces);
        let mut kept_surfaces = Vec::new();
        let mut kept_signs = Vec::new();
        let mut unreached = Vec::new();
        let mut bbox = BoundingBox3::empty();
        for (i, &surface) in surfaces.iter().enumerate() {
            if reached[i] {
                kept_surfaces.push(surface);
                kept_signs.push(signs[i]);
                bbox = bbox.union(&self.model.surfaces[surface].mesh.bounding_box());
            } else {
                unreached.push(surface);
            }
        }

        let apex = self.model.surfaces[surfaces[0]].mesh.bounding_box().center();
        let mut volume = self.signed_volume(&kept_surfaces, &kept_signs, &apex);
        let diagonal = bbox.diagonal().norm();
        if volume.abs() <= self.degenerate_volume_ratio * diagonal.powi(3) {
            return Err(ReconstructError::DegenerateVolume {
                region: self.region_name(region),
                volume,
            });
        }
        if volume < 0.0 {
            for (i, sign) in signs.iter_mut().enumerate() {
                if reached[i] {
                    *sign = !*sign;
                }
            }
            volume = -volume;
        }
        debug!(region = %self.region_name(region), surfaces = surfaces.len(), volume, "Region oriented");
        Ok(RegionSigns {
            surfaces,
            outward: signs,
            unreached,
            volume,
        })
    }

    fn region_name(&self, region: Region) -> String {
        match region {
            Region::Block(block) => self.model.blocks[block].name.clone(),
            Region::Universe => "universe".to_string(),
        }
    }

    /// Orient every block and the universe of `model`.
    ///
    /// Surfaces left unreached are recorded for inspection on the model.
    pub fn solve(model: &mut BRepModel, params: &ReconstructionParams) -> Result<RegionSurfaceSide> {
        let mut sides = RegionSurfaceSide::default();
        let mut undetermined = Vec::new();
        {
            let solver = OrientationSolver::new(model, params.degenerate_volume_ratio);
            for block in model.blocks.keys() {
                let signs = solver.solve_region(Region::Block(block))?;
                for (&surface, &outward) in signs.surfaces.iter().zip(&signs.outward) {
                    sides.regions.insert((block, surface), outward);
                }
                undetermined.extend(signs.unreached.into_iter().map(|s| (Region::Block(block), s)));
            }
            // Shell signs face out of the model, away from the universe. A
            // lone universe surface keeps its fixed `true`.
            let signs = solver.solve_region(Region::Universe)?;
            let single = signs.surfaces.len() == 1;
            for (&surface, &outward) in signs.surfaces.iter().zip(&signs.outward) {
                sides.universe.insert(surface, if single { outward } else { !outward });
            }
            undetermined.extend(signs.unreached.into_iter().map(|s| (Region::Universe, s)));
        }

        for (region, surface) in undetermined {
            warn!(
                ?region,
                surface = %model.surfaces[surface].name,
                "Surface sign could not be propagated"
            );
            model.record_inspection(Inspection::UndeterminedSign { region, surface });
        }
        info!(
            blocks = model.blocks.len(),
            universe = sides.universe.len(),
            "Orientation solved"
        );
        Ok(sides)
    }
}

/// Direction in which `surface` holds the edge between two unique
/// vertices: `Some(true)` for `u0 -> u1`, `Some(false)` for the reverse,
/// `None` when absent or present both ways.
fn edge_direction(
    model: &BRepModel,
    surface: SurfaceId,
    u0: UniqueVertexId,
    u1: UniqueVertexId,
) -> Option<bool> {
    let mesh = &model.surfaces[surface].mesh;
    let ids = model.vertices();
    let mut forward = false;
    let mut backward = false;
    for a in ids.component_vertices_in(u0, surface.into()) {
        for b in ids.component_vertices_in(u1, surface.into()) {
            forward |= mesh.polygon_edge_from_vertices(a, b).is_some();
            backward |= mesh.polygon_edge_from_vertices(b, a).is_some();
        }
    }
    match (forward, backward) {
        (true, false) => Some(true),
        (false, true) => Some(false),
        _ => None,
    }
}
