//! GOCAD Model3d export.
//!
//! The file lists the collections (`TSURF`), the surfaces with a key
//! triangle each (`TFACE`), and the regions as signed surface numbers, then
//! one `GOCAD TSurf` section per collection carrying the meshes.
//!
//! A region number is written `+id` when the region lies on the side the
//! surface's stored normal points to and `-id` otherwise. Internal surfaces
//! of a block are written on both sides.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use geobrep_reconstruct::RegionSurfaceSide;
use geobrep_topo::{BRepModel, CollectionKind, ComponentVertex, Region, SurfaceId};
use hashbrown::HashMap;
use tracing::{info, warn};

use crate::error::Result;

/// Name of the section holding surfaces that belong to no collection.
pub const UNCLASSIFIED_SURFACES: &str = "unclassified_surfaces";

/// First vertex number of every `GOCAD TSurf` section.
const OFFSET_START: usize = 1;

/// Signed numbers per line in `REGION` records.
const NUMBERS_PER_LINE: usize = 5;

/// A `TSURF` entry: a collection or the unclassified surfaces.
struct SurfaceGroup {
    name: String,
    kind: &'static str,
    surfaces: Vec<SurfaceId>,
}

/// Collections in file order: model boundaries, faults, horizons, then
/// the surfaces no collection holds.
fn surface_groups(model: &BRepModel) -> Vec<SurfaceGroup> {
    let mut groups = Vec::new();
    for kind in [
        CollectionKind::ModelBoundary,
        CollectionKind::Fault,
        CollectionKind::Horizon,
    ] {
        for collection in model.collections.values().filter(|c| c.kind == kind) {
            groups.push(SurfaceGroup {
                name: collection.name.clone(),
                kind: kind.as_str(),
                surfaces: collection.surfaces.clone(),
            });
        }
    }
    let unclassified: Vec<SurfaceId> = model
        .surfaces
        .keys()
        .filter(|&s| model.collections_of_surface(s).is_empty())
        .collect();
    if !unclassified.is_empty() {
        groups.push(SurfaceGroup {
            name: UNCLASSIFIED_SURFACES.to_string(),
            kind: CollectionKind::ModelBoundary.as_str(),
            surfaces: unclassified,
        });
    }
    groups
}

/// Writes `+id`/`-id` numbers five per line, closing the list with `0`.
struct SignedList<'w, W: Write> {
    writer: &'w mut W,
    count: usize,
}

impl<'w, W: Write> SignedList<'w, W> {
    fn start(writer: &'w mut W, header: &str) -> Result<Self> {
        write!(writer, "{header}\n  ")?;
        Ok(Self { writer, count: 0 })
    }

    fn push(&mut self, sign: char, id: usize) -> Result<()> {
        write!(self.writer, "{sign}{id}  ")?;
        self.count += 1;
        if self.count % NUMBERS_PER_LINE == 0 {
            write!(self.writer, "\n  ")?;
        }
        Ok(())
    }

    fn finish(self) -> Result<()> {
        writeln!(self.writer, "0")?;
        Ok(())
    }
}

fn sign(side: Option<bool>) -> char {
    if side == Some(true) {
        '-'
    } else {
        '+'
    }
}

fn write_header<W: Write>(writer: &mut W, name: &str) -> Result<()> {
    writeln!(writer, "HEADER {{")?;
    writeln!(writer, "name:{name}")?;
    writeln!(writer, "}}")?;
    writeln!(writer, "GOCAD_ORIGINAL_COORDINATE_SYSTEM")?;
    writeln!(writer, "NAME Default")?;
    writeln!(writer, "AXIS_NAME X Y Z")?;
    writeln!(writer, "AXIS_UNIT m m m")?;
    writeln!(writer, "ZPOSITIVE Elevation")?;
    writeln!(writer, "END_ORIGINAL_COORDINATE_SYSTEM")?;
    Ok(())
}

/// Write `model` as a GOCAD Model3d.
///
/// `sides` comes from
/// [`OrientationSolver::solve`](geobrep_reconstruct::OrientationSolver::solve);
/// a missing entry is written as `+`.
pub fn write_model3d<W: Write>(
    model: &BRepModel,
    sides: &RegionSurfaceSide,
    writer: &mut W,
) -> Result<()> {
    let groups = surface_groups(model);

    writeln!(writer, "GOCAD Model3d 1")?;
    write_header(writer, &model.name)?;
    for group in &groups {
        writeln!(writer, "TSURF {}", group.name)?;
    }

    let mut next_id = 1usize;
    let mut tfaces: HashMap<SurfaceId, usize> = HashMap::new();
    // Surfaces each group exports, in TFACE order.
    let mut parts: Vec<Vec<SurfaceId>> = Vec::with_capacity(groups.len());
    for group in &groups {
        let mut owned = Vec::with_capacity(group.surfaces.len());
        for &surface in &group.surfaces {
            if tfaces.contains_key(&surface) {
                warn!(
                    surface = %model.surfaces[surface].name,
                    collection = %group.name,
                    "Surface belongs to several collections, exported once"
                );
                continue;
            }
            writeln!(writer, "TFACE {next_id} {} {}", group.kind, group.name)?;
            let mesh = &model.surfaces[surface].mesh;
            if mesh.nb_polygons() > 0 {
                for p in mesh.triangle_points(0) {
                    writeln!(writer, "  {} {} {}", p.x, p.y, p.z)?;
                }
            }
            tfaces.insert(surface, next_id);
            owned.push(surface);
            next_id += 1;
        }
        parts.push(owned);
    }

    let mut universe = SignedList::start(writer, &format!("REGION {next_id}  Universe"))?;
    for surface in model.region_boundaries(Region::Universe) {
        if let Some(&id) = tfaces.get(&surface) {
            universe.push(sign(sides.universe_side(surface)), id)?;
        }
    }
    universe.finish()?;
    next_id += 1;

    for (block, data) in &model.blocks {
        let mut region = SignedList::start(writer, &format!("REGION {next_id} {}", data.name))?;
        for surface in model.block_boundaries(block) {
            if let Some(&id) = tfaces.get(&surface) {
                region.push(sign(sides.block_side(block, surface)), id)?;
            }
        }
        for surface in model.block_internals(block) {
            if let Some(&id) = tfaces.get(&surface) {
                region.push('+', id)?;
                region.push('-', id)?;
            }
        }
        region.finish()?;
        next_id += 1;
    }
    writeln!(writer, "END")?;

    for (group, surfaces) in groups.iter().zip(&parts) {
        write_tsurf(model, group, surfaces, writer)?;
    }
    Ok(())
}

/// One `GOCAD TSurf` section: the surfaces numbered under the group with
/// shared vertex numbering, then the border stones and borders.
fn write_tsurf<W: Write>(
    model: &BRepModel,
    group: &SurfaceGroup,
    surfaces: &[SurfaceId],
    writer: &mut W,
) -> Result<()> {
    writeln!(writer, "GOCAD TSurf 1")?;
    write_header(writer, &group.name)?;
    writeln!(writer, "GEOLOGICAL_FEATURE {}", group.name)?;
    writeln!(writer, "GEOLOGICAL_TYPE {}", group.kind)?;

    let mut offset = OFFSET_START;
    let mut borders: Vec<[usize; 2]> = Vec::new();
    for &surface in surfaces {
        let mesh = &model.surfaces[surface].mesh;
        writeln!(writer, "TFACE")?;
        for (v, p) in mesh.points().iter().enumerate() {
            writeln!(writer, "VRTX {} {} {} {}", offset + v, p.x, p.y, p.z)?;
        }
        for t in mesh.triangles() {
            writeln!(
                writer,
                "TRGL {} {} {}",
                offset + t[0] as usize,
                offset + t[1] as usize,
                offset + t[2] as usize
            )?;
        }

        // A border starts at a corner and runs along the border edge
        // arriving there, backwards.
        for edge in mesh.border_edges() {
            let [v0, v1] = mesh.polygon_edge_vertices(edge);
            let at_corner = model
                .unique_vertex(ComponentVertex::new(surface, v1))
                .and_then(|uv| model.corner_of_unique_vertex(uv))
                .is_some();
            if at_corner {
                borders.push([offset + v1 as usize, offset + v0 as usize]);
            }
        }
        offset += mesh.nb_vertices();
    }

    for [stone, _] in &borders {
        writeln!(writer, "BSTONE {stone}")?;
    }
    for (i, [stone, next]) in borders.iter().enumerate() {
        writeln!(writer, "BORDER {} {stone} {next}", offset + i)?;
    }
    writeln!(writer, "END")?;
    Ok(())
}

/// Write `model` as a GOCAD Model3d file.
pub fn save_model3d(
    model: &BRepModel,
    sides: &RegionSurfaceSide,
    path: impl AsRef<Path>,
) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path.as_ref())?);
    write_model3d(model, sides, &mut writer)?;
    writer.flush()?;
    info!(path = %path.as_ref().display(), surfaces = model.surfaces.len(), blocks = model.blocks.len(), "Model3d written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use geobrep_math::Point3;
    use geobrep_mesh::TriangulatedSurface;
    use geobrep_topo::Incidence;

    fn square(z: f64) -> TriangulatedSurface {
        TriangulatedSurface::new(
            vec![
                Point3::new(0.0, 0.0, z),
                Point3::new(1.0, 0.0, z),
                Point3::new(1.0, 1.0, z),
                Point3::new(0.0, 1.0, z),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        )
        .unwrap()
    }

    fn render(model: &BRepModel, sides: &RegionSurfaceSide) -> String {
        let mut out = Vec::new();
        write_model3d(model, sides, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_signed_region_list() {
        let mut out = Vec::new();
        let mut list = SignedList::start(&mut out, "REGION 7 r").unwrap();
        for id in 1..=6 {
            list.push(if id % 2 == 0 { '-' } else { '+' }, id).unwrap();
        }
        list.finish().unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "REGION 7 r\n  +1  -2  +3  -4  +5  \n  -6  0\n"
        );
    }

    #[test]
    fn test_sections_and_signs() {
        let mut model = BRepModel::new("m");
        let bottom = model.add_surface("bottom", square(0.0));
        let fin = model.add_surface("fin", square(0.5));
        let block = model.add_block("b", Vec::new(), Vec::new());
        model.add_surface_block_relation(bottom, block, Incidence::Boundary);
        model.add_surface_block_relation(fin, block, Incidence::Internal);
        let boundary = model.add_collection("box", CollectionKind::ModelBoundary);
        model.add_surface_to_collection(boundary, bottom);

        let mut sides = RegionSurfaceSide::default();
        sides.regions.insert((block, bottom), true);
        sides.universe.insert(bottom, false);
        let text = render(&model, &sides);

        assert!(text.starts_with("GOCAD Model3d 1\nHEADER {\nname:m\n}\n"));
        assert!(text.contains("TSURF box\nTSURF unclassified_surfaces\n"));
        assert!(text.contains("TFACE 1 boundary box\n  0 0 0\n  1 0 0\n  1 1 0\n"));
        assert!(text.contains("TFACE 2 boundary unclassified_surfaces\n"));
        assert!(text.contains("REGION 3  Universe\n  +1  0\n"));
        assert!(text.contains("REGION 4 b\n  -1  +2  -2  0\n"));
        assert_eq!(text.matches("GOCAD TSurf 1").count(), 2);
        assert!(text.contains("VRTX 4 0 1 0\nTRGL 1 2 3\nTRGL 1 3 4\n"));
        // No corners, no borders.
        assert!(!text.contains("BSTONE"));
        assert!(text.trim_end().ends_with("END"));
    }

    #[test]
    fn test_borders_start_at_corners() {
        let mut model = BRepModel::new("m");
        let surface = model.add_surface("s", square(0.0));
        let collection = model.add_collection("h", CollectionKind::Horizon);
        model.add_surface_to_collection(collection, surface);
        let uv = model.vertices_mut().create_unique_vertex();
        model.set_unique_vertex(ComponentVertex::new(surface, 2), uv);
        let corner = model.add_corner(Point3::new(1.0, 1.0, 0.0));
        model.set_unique_vertex(ComponentVertex::new(corner, 0), uv);

        let text = render(&model, &RegionSurfaceSide::default());
        // Border edge 1 -> 2 arrives at the corner.
        assert!(text.contains("TFACE 1 top h\n"));
        assert!(text.contains("BSTONE 3\nBORDER 5 3 2\nEND\n"));
    }

    #[test]
    fn test_surface_in_two_collections_is_numbered_once() {
        let mut model = BRepModel::new("m");
        let surface = model.add_surface("s", square(0.0));
        let fault = model.add_collection("f", CollectionKind::Fault);
        let horizon = model.add_collection("h", CollectionKind::Horizon);
        model.add_surface_to_collection(fault, surface);
        model.add_surface_to_collection(horizon, surface);

        let text = render(&model, &RegionSurfaceSide::default());
        let numbered = text.matches("\nTFACE ").count();
        let meshes = text.matches("\nTFACE\n").count();
        assert_eq!(numbered, 1);
        assert_eq!(numbered, meshes);
        assert_eq!(text.matches("\nVRTX 1 ").count(), 1);
        assert!(text.contains("TSURF f\nTSURF h\nTFACE 1 fault f\n"));
        assert!(text.contains("REGION 2  Universe\n  0\n"));
        assert_eq!(text.matches("GOCAD TSurf 1").count(), 2);
    }

    #[test]
    fn test_shared_surface_keeps_later_meshes_aligned() {
        let mut model = BRepModel::new("m");
        let shared = model.add_surface("shared", square(0.0));
        let top = model.add_surface("top", square(1.0));
        let fault = model.add_collection("f", CollectionKind::Fault);
        let horizon = model.add_collection("h", CollectionKind::Horizon);
        model.add_surface_to_collection(fault, shared);
        model.add_surface_to_collection(horizon, shared);
        model.add_surface_to_collection(horizon, top);

        let text = render(&model, &RegionSurfaceSide::default());
        assert!(text.contains("TFACE 1 fault f\n"));
        assert!(text.contains("TFACE 2 top h\n  0 0 1\n"));
        assert_eq!(text.matches("\nTFACE\n").count(), 2);
        // The horizon section only carries the top surface.
        let horizon_section = text.split("GEOLOGICAL_FEATURE h\n").nth(1).unwrap();
        assert!(horizon_section.starts_with("GEOLOGICAL_TYPE top\nTFACE\nVRTX 1 0 0 1\n"));
        assert_eq!(horizon_section.matches("\nVRTX ").count(), 4);
    }
}
