//! Small models for the writer tests.
//!
//! Two unit cubes stacked along `z` and split by a horizon at `z = 1`, one
//! quad per face. Quads are split along the diagonal joining their lowest
//! and highest corner, as the faces of a Kuhn subdivision are.

#![allow(dead_code)]

use geobrep_reconstruct::{
    BlockDescription, SurfaceModelInput, SurfacePatch, VolumeModelInput, VolumeSurface,
    VolumeVertex,
};
use geobrep_topo::{BRepModel, BlockId, SurfaceId};

pub const HORIZON: usize = 2;
pub const FAULT: usize = 11;

const X: [f64; 3] = [1.0, 0.0, 0.0];
const Y: [f64; 3] = [0.0, 1.0, 0.0];
const Z: [f64; 3] = [0.0, 0.0, 1.0];

/// Quad `origin + a * u + b * v` for `a, b` in `[0, size]`.
fn quad(name: &str, feature: &str, origin: [f64; 3], u: [f64; 3], v: [f64; 3], size: f64) -> SurfacePatch {
    let corner = |a: f64, b: f64| [0, 1, 2].map(|k| origin[k] + a * size * u[k] + b * size * v[k]);
    SurfacePatch {
        name: name.into(),
        feature: feature.into(),
        points: vec![corner(0.0, 0.0), corner(1.0, 0.0), corner(1.0, 1.0), corner(0.0, 1.0)],
        triangles: vec![[0, 1, 2], [0, 2, 3]],
    }
}

/// Bottom, top and horizon, then the walls below and above the horizon.
pub fn stacked_cubes() -> Vec<SurfacePatch> {
    vec![
        quad("bottom", "boundary", [0.0, 0.0, 0.0], X, Y, 1.0),
        quad("top", "boundary", [0.0, 0.0, 2.0], X, Y, 1.0),
        quad("horizon", "horizon", [0.0, 0.0, 1.0], X, Y, 1.0),
        quad("wall_x0_lower", "boundary", [0.0, 0.0, 0.0], Y, Z, 1.0),
        quad("wall_x0_upper", "boundary", [0.0, 0.0, 1.0], Y, Z, 1.0),
        quad("wall_x1_lower", "boundary", [1.0, 0.0, 0.0], Y, Z, 1.0),
        quad("wall_x1_upper", "boundary", [1.0, 0.0, 1.0], Y, Z, 1.0),
        quad("wall_y0_lower", "boundary", [0.0, 0.0, 0.0], X, Z, 1.0),
        quad("wall_y0_upper", "boundary", [0.0, 0.0, 1.0], X, Z, 1.0),
        quad("wall_y1_lower", "boundary", [0.0, 1.0, 0.0], X, Z, 1.0),
        quad("wall_y1_upper", "boundary", [0.0, 1.0, 1.0], X, Z, 1.0),
    ]
}

/// A fault floating inside the lower cube, touching no other surface.
pub fn floating_fault() -> SurfacePatch {
    quad("fault", "fault", [0.25, 0.25, 0.5], X, Y, 0.5)
}

/// Surface model of the stacked cubes. With `fault`, the floating fault is
/// listed twice in the lower block, which makes it internal there.
pub fn cubes_input(fault: bool) -> SurfaceModelInput {
    let mut patches = stacked_cubes();
    let mut lower = vec![0, HORIZON, 3, 5, 7, 9];
    if fault {
        patches.push(floating_fault());
        lower.extend([FAULT, FAULT]);
    }
    SurfaceModelInput {
        name: "cubes".into(),
        patches,
        blocks: vec![
            BlockDescription {
                name: "lower".into(),
                surfaces: lower,
            },
            BlockDescription {
                name: "upper".into(),
                surfaces: vec![1, HORIZON, 4, 6, 8, 10],
            },
        ],
        universe: None,
    }
}

/// Unit cube cut into the six Kuhn tetrahedra around its main diagonal,
/// with its six faces as boundary surfaces.
pub fn kuhn_cube() -> VolumeModelInput {
    let index = |x: usize, y: usize, z: usize| x + 2 * y + 4 * z;
    let mut vertices = Vec::with_capacity(8);
    for z in 0..2 {
        for y in 0..2 {
            for x in 0..2 {
                vertices.push(VolumeVertex::Point([x as f64, y as f64, z as f64]));
            }
        }
    }

    const ORDERS: [[usize; 3]; 6] = [[0, 1, 2], [0, 2, 1], [1, 0, 2], [1, 2, 0], [2, 0, 1], [2, 1, 0]];
    let tetrahedra = ORDERS
        .iter()
        .map(|order| {
            let mut c = [0usize; 3];
            let mut tet = [index(0, 0, 0) as u32; 4];
            for (n, &axis) in order.iter().enumerate() {
                c[axis] = 1;
                tet[n + 1] = index(c[0], c[1], c[2]) as u32;
            }
            tet
        })
        .collect();

    // Each face as two triangles sharing its low-high diagonal.
    let face = |name: &str, corners: [[usize; 3]; 4]| {
        let [p00, p10, p11, p01] = corners.map(|[x, y, z]| index(x, y, z));
        VolumeSurface {
            name: name.into(),
            feature: "boundary".into(),
            triangles: vec![[p00, p10, p11], [p00, p11, p01]],
        }
    };
    let surfaces = vec![
        face("bottom", [[0, 0, 0], [1, 0, 0], [1, 1, 0], [0, 1, 0]]),
        face("top", [[0, 0, 1], [1, 0, 1], [1, 1, 1], [0, 1, 1]]),
        face("x0", [[0, 0, 0], [0, 1, 0], [0, 1, 1], [0, 0, 1]]),
        face("x1", [[1, 0, 0], [1, 1, 0], [1, 1, 1], [1, 0, 1]]),
        face("y0", [[0, 0, 0], [1, 0, 0], [1, 0, 1], [0, 0, 1]]),
        face("y1", [[0, 1, 0], [1, 1, 0], [1, 1, 1], [0, 1, 1]]),
    ];

    VolumeModelInput {
        name: "cube".into(),
        vertices,
        tetrahedra,
        surfaces,
        regions: Vec::new(),
    }
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
