#![warn(missing_docs)]

//! Math types for the geobrep reconstruction engine.
//!
//! Thin wrappers around nalgebra providing the handful of geometric
//! primitives the reconstruction needs: points, vectors, axis-aligned
//! boxes, a model-relative distance tolerance and signed volumes.

use nalgebra::Vector3;

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// Default factor applied to the smallest bounding-box diagonal component
/// to derive the colocation tolerance of a model.
pub const DEFAULT_EPSILON_FACTOR: f64 = 1e-7;

/// Axis-aligned bounding box in 3D.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox3 {
    /// Minimum corner.
    pub min: Point3,
    /// Maximum corner.
    pub max: Point3,
}

impl BoundingBox3 {
    /// Create a bounding box from min and max corners.
    pub fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    /// Create an empty (inverted) box suitable for expansion.
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// Smallest box containing every given point.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3>) -> Self {
        let mut bbox = Self::empty();
        for p in points {
            bbox.add_point(p);
        }
        bbox
    }

    /// True when no point was ever added.
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Expand this box to include a point.
    pub fn add_point(&mut self, p: &Point3) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.min.z = self.min.z.min(p.z);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
        self.max.z = self.max.z.max(p.z);
    }

    /// Smallest box containing both boxes.
    pub fn union(&self, other: &BoundingBox3) -> Self {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        let mut bbox = *self;
        bbox.add_point(&other.min);
        bbox.add_point(&other.max);
        bbox
    }

    /// Box center. The origin for an empty box.
    pub fn center(&self) -> Point3 {
        if self.is_empty() {
            return Point3::origin();
        }
        nalgebra::center(&self.min, &self.max)
    }

    /// Diagonal vector `max - min`. Zero for an empty box.
    pub fn diagonal(&self) -> Vec3 {
        if self.is_empty() {
            return Vec3::zeros();
        }
        self.max - self.min
    }
}

impl Default for BoundingBox3 {
    fn default() -> Self {
        Self::empty()
    }
}

/// Distance tolerance used to decide whether two points are colocated.
///
/// Comparisons are inclusive: two points exactly `linear` apart are equal.
/// A zero tolerance means exact coordinate equality.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    /// Linear distance tolerance in model units.
    pub linear: f64,
}

impl Tolerance {
    /// Tolerance requiring exact coordinate equality.
    pub const EXACT: Self = Self { linear: 0.0 };

    /// Create a tolerance from a distance. Negative values clamp to zero.
    pub fn new(linear: f64) -> Self {
        Self {
            linear: linear.max(0.0),
        }
    }

    /// Derive a tolerance from a model extent: `factor` times the smallest
    /// component of the bounding-box diagonal.
    pub fn from_bounding_box(bbox: &BoundingBox3, factor: f64) -> Self {
        let d = bbox.diagonal();
        Self::new(factor * d.x.min(d.y).min(d.z))
    }

    /// Check if two points are coincident within tolerance.
    pub fn points_equal(&self, a: &Point3, b: &Point3) -> bool {
        (a - b).norm() <= self.linear
    }

    /// Check if a scalar distance is within tolerance of zero.
    pub fn is_zero(&self, d: f64) -> bool {
        d.abs() <= self.linear
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::EXACT
    }
}

/// Signed volume of the tetrahedron `(a, b, c, d)`.
///
/// Positive when `d` lies on the side the right-handed normal of `(a, b, c)`
/// points to. Equivalently, positive when the normal of `(b, c, d)` points
/// away from `a`.
pub fn tetrahedron_signed_volume(a: &Point3, b: &Point3, c: &Point3, d: &Point3) -> f64 {
    (b - a).dot(&(c - a).cross(&(d - a))) / 6.0
}

/// Non-normalized normal of triangle `(a, b, c)` by the right-hand rule.
pub fn triangle_normal(a: &Point3, b: &Point3, c: &Point3) -> Vec3 {
    (b - a).cross(&(c - a))
}
