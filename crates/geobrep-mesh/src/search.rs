//! Tolerance-based point colocation.
//!
//! Points are bucketed in a uniform hash grid whose cell size equals the
//! tolerance, so every point within tolerance of a query lies in one of the
//! 27 cells around it. A zero tolerance degenerates to exact coordinate
//! hashing.

use geobrep_math::{Point3, Tolerance};
use hashbrown::HashMap;

type CellKey = (i64, i64, i64);

/// Incremental spatial index answering "which stored point is within
/// tolerance of this one".
#[derive(Debug, Clone)]
pub struct PointSearch {
    tolerance: Tolerance,
    points: Vec<Point3>,
    cells: HashMap<CellKey, Vec<usize>>,
}

impl PointSearch {
    /// Create an empty index.
    pub fn new(tolerance: Tolerance) -> Self {
        Self {
            tolerance,
            points: Vec::new(),
            cells: HashMap::new(),
        }
    }

    /// Store a point, returning its index.
    pub fn insert(&mut self, point: Point3) -> usize {
        let index = self.points.len();
        self.points.push(point);
        self.cells.entry(self.cell_of(&point)).or_default().push(index);
        index
    }

    /// Stored point at `index`.
    pub fn point(&self, index: usize) -> &Point3 {
        &self.points[index]
    }

    /// Number of stored points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Smallest stored index within tolerance of `point` (inclusive).
    pub fn find(&self, point: &Point3) -> Option<usize> {
        if self.tolerance.linear == 0.0 {
            return self
                .cells
                .get(&self.cell_of(point))
                .and_then(|ids| ids.iter().copied().find(|&id| self.points[id] == *point));
        }
        let (cx, cy, cz) = self.cell_of(point);
        let mut best: Option<usize> = None;
        for dx in -1..=1i64 {
            for dy in -1..=1i64 {
                for dz in -1..=1i64 {
                    let key = (
                        cx.saturating_add(dx),
                        cy.saturating_add(dy),
                        cz.saturating_add(dz),
                    );
                    let Some(ids) = self.cells.get(&key) else {
                        continue;
                    };
                    for &id in ids {
                        if self.tolerance.points_equal(&self.points[id], point)
                            && best.map_or(true, |b| id < b)
                        {
                            best = Some(id);
                        }
                    }
                }
            }
        }
        best
    }

    fn cell_of(&self, p: &Point3) -> CellKey {
        let eps = self.tolerance.linear;
        if eps == 0.0 {
            // +0.0 and -0.0 must share a cell.
            let bits = |v: f64| (v + 0.0).to_bits() as i64;
            return (bits(p.x), bits(p.y), bits(p.z));
        }
        // `as` saturates, so far-away coordinates still land in a cell.
        (
            (p.x / eps).floor() as i64,
            (p.y / eps).floor() as i64,
            (p.z / eps).floor() as i64,
        )
    }
}

/// Result of [`colocated_index_mapping`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColocatedInfo {
    /// One representative point per cluster, in cluster order.
    pub unique_points: Vec<Point3>,
    /// Cluster index of every input point.
    pub colocated_mapping: Vec<usize>,
}

impl ColocatedInfo {
    /// Number of clusters.
    pub fn nb_unique_points(&self) -> usize {
        self.unique_points.len()
    }

    /// Number of input points merged into an earlier cluster.
    pub fn nb_colocated_points(&self) -> usize {
        self.colocated_mapping.len() - self.unique_points.len()
    }
}

/// Partition points into clusters of colocated points.
///
/// Points are processed in input order. A point joins the earliest cluster
/// whose representative (the cluster's first point) lies within tolerance,
/// inclusive; otherwise it starts a new cluster. The result depends only on
/// the input order, never on hashing.
pub fn colocated_index_mapping(points: &[Point3], tolerance: Tolerance) -> ColocatedInfo {
    let mut search = PointSearch::new(tolerance);
    let mut colocated_mapping = Vec::with_capacity(points.len());
    for p in points {
        let cluster = match search.find(p) {
            Some(existing) => existing,
            None => search.insert(*p),
        };
        colocated_mapping.push(cluster);
    }
    ColocatedInfo {
        unique_points: search.points,
        colocated_mapping,
    }
}
