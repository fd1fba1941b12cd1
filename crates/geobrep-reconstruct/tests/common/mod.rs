//! Structured box models shared by the scenario tests.
//!
//! The box spans `[0, 2] x [0, 1] x [0, 2]` and is cut by a horizon at
//! `z = 1`. Every patch is a regular grid of step 0.5 whose cells are split
//! along the diagonal joining their lowest and highest corner, which is
//! also how a Kuhn subdivision splits the faces of a cube. Surface patches
//! therefore match the facets of the tetrahedral grid exactly.

#![allow(dead_code)]

use geobrep_math::{tetrahedron_signed_volume, Point3};
use geobrep_reconstruct::{
    BlockDescription, RegionSurfaceSide, SurfaceModelInput, SurfacePatch, VolumeModelInput,
    VolumeSurface, VolumeVertex,
};
use geobrep_topo::{BRepModel, BlockId, SurfaceId};

pub const STEP: f64 = 0.5;
pub const NX: usize = 4;
pub const NY: usize = 2;
pub const NZ: usize = 4;

pub const BOTTOM: usize = 0;
pub const TOP: usize = 1;
pub const HORIZON: usize = 2;

/// A planar grid patch: `origin + i * STEP * u + j * STEP * v`.
#[derive(Debug, Clone)]
pub struct GridPatch {
    pub name: &'static str,
    pub feature: &'static str,
    pub origin: [f64; 3],
    pub u: [f64; 3],
    pub v: [f64; 3],
    pub nu: usize,
    pub nv: usize,
}

impl GridPatch {
    pub fn nb_points(&self) -> usize {
        (self.nu + 1) * (self.nv + 1)
    }

    pub fn point(&self, i: usize, j: usize) -> [f64; 3] {
        let (a, b) = (i as f64 * STEP, j as f64 * STEP);
        [0, 1, 2].map(|k| self.origin[k] + a * self.u[k] + b * self.v[k])
    }

    pub fn points(&self) -> Vec<[f64; 3]> {
        let mut points = Vec::with_capacity(self.nb_points());
        for j in 0..=self.nv {
            for i in 0..=self.nu {
                points.push(self.point(i, j));
            }
        }
        points
    }

    /// Triangles over local indices. `flipped` reverses the winding;
    /// `anti_diagonal` splits cell (0, 0) the other way.
    pub fn triangles(&self, flipped: bool, anti_diagonal: bool) -> Vec<[u32; 3]> {
        let index = |i: usize, j: usize| (j * (self.nu + 1) + i) as u32;
        let mut triangles = Vec::new();
        for j in 0..self.nv {
            for i in 0..self.nu {
                let (p00, p10, p11, p01) = (index(i, j), index(i + 1, j), index(i + 1, j + 1), index(i, j + 1));
                if anti_diagonal && i == 0 && j == 0 {
                    triangles.push([p10, p01, p00]);
                    triangles.push([p10, p11, p01]);
                } else {
                    triangles.push([p00, p10, p11]);
                    triangles.push([p00, p11, p01]);
                }
            }
        }
        if flipped {
            for t in &mut triangles {
                t.swap(1, 2);
            }
        }
        triangles
    }
}

const X: [f64; 3] = [1.0, 0.0, 0.0];
const Y: [f64; 3] = [0.0, 1.0, 0.0];
const Z: [f64; 3] = [0.0, 0.0, 1.0];

/// The eleven patches of the box, bottom, top and horizon first, then the
/// walls below and above the horizon.
pub fn box_patches() -> Vec<GridPatch> {
    let patch = |name, feature, origin, u, v, nu, nv| GridPatch {
        name,
        feature,
        origin,
        u,
        v,
        nu,
        nv,
    };
    vec![
        patch("bottom", "boundary", [0.0, 0.0, 0.0], X, Y, NX, NY),
        patch("top", "boundary", [0.0, 0.0, 2.0], X, Y, NX, NY),
        patch("horizon", "horizon", [0.0, 0.0, 1.0], X, Y, NX, NY),
        patch("wall_x0_lower", "boundary", [0.0, 0.0, 0.0], Y, Z, NY, 2),
        patch("wall_x0_upper", "boundary", [0.0, 0.0, 1.0], Y, Z, NY, 2),
        patch("wall_x2_lower", "boundary", [2.0, 0.0, 0.0], Y, Z, NY, 2),
        patch("wall_x2_upper", "boundary", [2.0, 0.0, 1.0], Y, Z, NY, 2),
        patch("wall_y0_lower", "boundary", [0.0, 0.0, 0.0], X, Z, NX, 2),
        patch("wall_y0_upper", "boundary", [0.0, 0.0, 1.0], X, Z, NX, 2),
        patch("wall_y1_lower", "boundary", [0.0, 1.0, 0.0], X, Z, NX, 2),
        patch("wall_y1_upper", "boundary", [0.0, 1.0, 1.0], X, Z, NX, 2),
    ]
}

/// Patch indices of the block below and above the horizon.
pub fn box_blocks() -> Vec<BlockDescription> {
    vec![
        BlockDescription {
            name: "lower".into(),
            surfaces: vec![BOTTOM, HORIZON, 3, 5, 7, 9],
        },
        BlockDescription {
            name: "upper".into(),
            surfaces: vec![TOP, HORIZON, 4, 6, 8, 10],
        },
    ]
}

/// A partial fault at `z = 0.5` over `x` in `[0, 1]`, ending inside the
/// lower block.
pub fn partial_fault() -> GridPatch {
    GridPatch {
        name: "fault",
        feature: "fault",
        origin: [0.0, 0.0, 0.5],
        u: X,
        v: Y,
        nu: 2,
        nv: NY,
    }
}

pub fn surface_input(patches: &[GridPatch], flipped: &[usize]) -> SurfaceModelInput {
    SurfaceModelInput {
        name: "box".into(),
        patches: patches
            .iter()
            .enumerate()
            .map(|(index, patch)| SurfacePatch {
                name: patch.name.into(),
                feature: patch.feature.into(),
                points: patch.points(),
                triangles: patch.triangles(flipped.contains(&index), false),
            })
            .collect(),
        blocks: box_blocks(),
        universe: None,
    }
}

/// Index of grid vertex `(i, j, k)` in the tetrahedral grid.
pub fn grid_index(i: usize, j: usize, k: usize) -> usize {
    (k * (NY + 1) + j) * (NX + 1) + i
}

fn grid_coords(point: [f64; 3]) -> (usize, usize, usize) {
    let c = point.map(|x| (x / STEP).round() as usize);
    (c[0], c[1], c[2])
}

/// Options for [`volume_input`].
#[derive(Debug, Clone, Default)]
pub struct VolumeOptions {
    /// Patches stored with reversed winding.
    pub flipped: Vec<usize>,
    /// Patches whose first cell is split along the other diagonal.
    pub anti_diagonal: Vec<usize>,
    /// Duplicate every vertex on the horizon for the cells above it.
    pub shared_horizon: bool,
}

/// The tetrahedral grid of the box, six Kuhn tetrahedra per cell, with
/// the given patches as surfaces.
pub fn volume_input(patches: &[GridPatch], options: &VolumeOptions) -> VolumeModelInput {
    let mut vertices = Vec::new();
    for k in 0..=NZ {
        for j in 0..=NY {
            for i in 0..=NX {
                vertices.push(VolumeVertex::Point([i as f64 * STEP, j as f64 * STEP, k as f64 * STEP]));
            }
        }
    }
    let horizon_k = NZ / 2;
    let mut duplicate = vec![usize::MAX; vertices.len()];
    if options.shared_horizon {
        for j in 0..=NY {
            for i in 0..=NX {
                let original = grid_index(i, j, horizon_k);
                duplicate[original] = vertices.len();
                vertices.push(VolumeVertex::Shared(original));
            }
        }
    }

    const AXES: [[usize; 3]; 3] = [[1, 0, 0], [0, 1, 0], [0, 0, 1]];
    const ORDERS: [[usize; 3]; 6] = [[0, 1, 2], [0, 2, 1], [1, 0, 2], [1, 2, 0], [2, 0, 1], [2, 1, 0]];
    let mut tetrahedra = Vec::new();
    for k in 0..NZ {
        for j in 0..NY {
            for i in 0..NX {
                let upper = options.shared_horizon && k >= horizon_k;
                for order in ORDERS {
                    let mut c = [i, j, k];
                    let mut tet = [0u32; 4];
                    for (n, slot) in tet.iter_mut().enumerate() {
                        if n > 0 {
                            let axis = AXES[order[n - 1]];
                            c = [c[0] + axis[0], c[1] + axis[1], c[2] + axis[2]];
                        }
                        let mut index = grid_index(c[0], c[1], c[2]);
                        if upper && c[2] == horizon_k {
                            index = duplicate[index];
                        }
                        *slot = index as u32;
                    }
                    tetrahedra.push(tet);
                }
            }
        }
    }

    let surfaces = patches
        .iter()
        .enumerate()
        .map(|(index, patch)| {
            let points = patch.points();
            let upper = patch.origin[2] >= 1.0 && index != HORIZON;
            let triangles = patch
                .triangles(
                    options.flipped.contains(&index),
                    options.anti_diagonal.contains(&index),
                )
                .into_iter()
                .map(|t| {
                    t.map(|local| {
                        let (i, j, k) = grid_coords(points[local as usize]);
                        let index = grid_index(i, j, k);
                        if options.shared_horizon && upper && k == horizon_k {
                            duplicate[index]
                        } else {
                            index
                        }
                    })
                })
                .collect();
            VolumeSurface {
                name: patch.name.into(),
                feature: patch.feature.into(),
                triangles,
            }
        })
        .collect();

    VolumeModelInput {
        name: "box".into(),
        vertices,
        tetrahedra,
        surfaces,
        regions: Vec::new(),
    }
}

/// Volume enclosed by `surfaces`, each counted with its stored winding when
/// `outward` says so and reversed otherwise.
pub fn enclosed_volume(model: &BRepModel, surfaces: &[(SurfaceId, bool)]) -> f64 {
    let apex = Point3::new(0.3, 0.7, 0.9);
    let mut volume = 0.0;
    for &(surface, outward) in surfaces {
        let mesh = &model.surfaces[surface].mesh;
        for polygon in 0..mesh.nb_polygons() {
            let [p0, p1, p2] = mesh.triangle_points(polygon);
            volume += if outward {
                tetrahedron_signed_volume(&apex, &p0, &p1, &p2)
            } else {
                tetrahedron_signed_volume(&apex, &p0, &p2, &p1)
            };
        }
    }
    volume
}

/// Volume of a block as described by its oriented boundary.
pub fn block_volume(model: &BRepModel, sides: &RegionSurfaceSide, block: BlockId) -> f64 {
    let oriented: Vec<(SurfaceId, bool)> = model
        .block_boundaries(block)
        .into_iter()
        .map(|s| (s, sides.block_side(block, s).unwrap_or(true)))
        .collect();
    enclosed_volume(model, &oriented)
}

/// Volume of the whole model seen from the universe: normals pointing out
/// of the universe point into the model.
pub fn universe_volume(model: &BRepModel, sides: &RegionSurfaceSide) -> f64 {
    let oriented: Vec<(SurfaceId, bool)> = sides.universe.iter().map(|(&s, &side)| (s, !side)).collect();
    enclosed_volume(model, &oriented)
}

pub fn surface_named(model: &BRepModel, name: &str) -> SurfaceId {
    model
        .surfaces
        .iter()
        .find(|(_, s)| s.name == name)
        .map(|(id, _)| id)
        .unwrap()
}

pub fn block_named(model: &BRepModel, name: &str) -> BlockId {
    model
        .blocks
        .iter()
        .find(|(_, b)| b.name == name)
        .map(|(id, _)| id)
        .unwrap()
}
