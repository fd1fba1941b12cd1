//! Recoverable inconsistencies found during reconstruction.
//!
//! None of these abort a reconstruction. The best-effort result is kept and
//! the condition is recorded so consumers can decide whether to trust it.

use crate::ids::{BlockId, LineId, SurfaceId};
use crate::model::{BRepModel, Region};

/// One condition requiring manual inspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inspection {
    /// A surface triangle matches no facet of the volumetric mesh.
    NonConformalTriangle {
        /// Surface owning the triangle.
        surface: SurfaceId,
        /// Triangle index in the surface mesh.
        triangle: usize,
    },
    /// A facet already claimed by another surface was matched again.
    DuplicateFacetAssignment {
        /// Surface whose triangle matched the facet second.
        surface: SurfaceId,
        /// Surface that kept the facet.
        owner: SurfaceId,
        /// Triangle index in `surface`.
        triangle: usize,
    },
    /// Matched facets of a surface in a block are neither one nor two per
    /// surface triangle.
    NonConformalBlock {
        /// Surface touching the block.
        surface: SurfaceId,
        /// Block being built.
        block: BlockId,
        /// Facets of the surface reached from inside the block.
        facets: usize,
        /// Triangles of the surface.
        triangles: usize,
    },
    /// A line was traced on a surface border neither once nor twice.
    UnexpectedLineIncidence {
        /// Traced line.
        line: LineId,
        /// Surface it was traced on.
        surface: SurfaceId,
        /// Number of times it was traced.
        count: usize,
    },
    /// A surface contains every segment of a line it is not cut along.
    UncutInternalLine {
        /// Line running through the surface.
        line: LineId,
        /// Surface not split by the line.
        surface: SurfaceId,
    },
    /// Orientation propagation never reached this surface.
    UndeterminedSign {
        /// Region being oriented.
        region: Region,
        /// Surface left at the default sign.
        surface: SurfaceId,
    },
}

impl Inspection {
    /// Human-readable message naming surfaces and blocks by name and lines
    /// by their position in `model`.
    pub fn describe(&self, model: &BRepModel) -> String {
        let surface = |id: &SurfaceId| {
            model
                .surfaces
                .get(*id)
                .map_or_else(|| "unknown surface".to_string(), |s| format!("surface '{}'", s.name))
        };
        let block = |id: &BlockId| {
            model
                .blocks
                .get(*id)
                .map_or_else(|| "unknown block".to_string(), |b| format!("block '{}'", b.name))
        };
        let line = |id: &LineId| match model.lines.keys().position(|l| l == *id) {
            Some(index) => format!("line #{index}"),
            None => "unknown line".to_string(),
        };
        let region = |r: &Region| match r {
            Region::Block(id) => block(id),
            Region::Universe => "the universe".to_string(),
        };

        match self {
            Inspection::NonConformalTriangle {
                surface: s,
                triangle,
            } => format!("triangle {triangle} of {} matches no volume facet", surface(s)),
            Inspection::DuplicateFacetAssignment {
                surface: s,
                owner,
                triangle,
            } => format!(
                "triangle {triangle} of {} matches a facet already owned by {}",
                surface(s),
                surface(owner)
            ),
            Inspection::NonConformalBlock {
                surface: s,
                block: b,
                facets,
                triangles,
            } => format!(
                "{} touches {} with {facets} facets for {triangles} triangles",
                surface(s),
                block(b)
            ),
            Inspection::UnexpectedLineIncidence {
                line: l,
                surface: s,
                count,
            } => format!("{} traced {count} times on {}", line(l), surface(s)),
            Inspection::UncutInternalLine { line: l, surface: s } => {
                format!("{} should be cut along {}", surface(s), line(l))
            }
            Inspection::UndeterminedSign { region: r, surface: s } => format!(
                "sign of {} in {} could not be determined",
                surface(s),
                region(r)
            ),
        }
    }
}

/// Ordered list of inspection entries.
#[derive(Debug, Clone, Default)]
pub struct InspectionReport {
    entries: Vec<Inspection>,
}

impl InspectionReport {
    /// Record an entry.
    pub fn push(&mut self, inspection: Inspection) {
        self.entries.push(inspection);
    }

    /// True when at least one entry was recorded.
    pub fn needs_inspection(&self) -> bool {
        !self.entries.is_empty()
    }

    /// Recorded entries, in recording order.
    pub fn entries(&self) -> &[Inspection] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
