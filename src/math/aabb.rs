//! Axis-aligned bounding box over block coordinates

use crate::core::error::Error;
use crate::core::types::{IVec3, Result, Vec3};

/// Axis of a block region
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Parse an axis keyword ("x", "y" or "z")
    pub fn parse(keyword: &str) -> Result<Self> {
        match keyword.to_ascii_lowercase().as_str() {
            "x" => Ok(Axis::X),
            "y" => Ok(Axis::Y),
            "z" => Ok(Axis::Z),
            other => Err(Error::Format(format!("unrecognized axis '{}'", other))),
        }
    }

    /// Lowercase axis name
    pub fn name(self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        }
    }
}

/// Axis-aligned bounding box defined by min and max block corners.
///
/// `min` is inclusive and `max` is exclusive, so `size() == max - min` and a
/// box covering a single voxel has `max == min + 1` on every axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Aabb {
    pub min: IVec3,
    pub max: IVec3,
}

impl Aabb {
    /// Create AABB from min and max corners
    pub fn new(min: IVec3, max: IVec3) -> Self {
        Self { min, max }
    }

    /// Create AABB from an origin corner and a per-axis size
    pub fn from_origin_size(origin: IVec3, size: IVec3) -> Self {
        Self {
            min: origin,
            max: origin + size,
        }
    }

    /// Get size (max - min)
    pub fn size(&self) -> IVec3 {
        self.max - self.min
    }

    /// Get real-valued center point (not required to be integral)
    pub fn center(&self) -> Vec3 {
        (self.min.as_vec3() + self.max.as_vec3()) * 0.5
    }

    /// Extent along one axis
    pub fn extent(&self, axis: Axis) -> i32 {
        let size = self.size();
        match axis {
            Axis::X => size.x,
            Axis::Y => size.y,
            Axis::Z => size.z,
        }
    }

    /// Number of voxel positions covered, zero for degenerate boxes
    pub fn volume(&self) -> u64 {
        let size = self.size();
        if size.x <= 0 || size.y <= 0 || size.z <= 0 {
            return 0;
        }
        size.x as u64 * size.y as u64 * size.z as u64
    }

    /// Check if the box covers no voxels on some axis
    pub fn is_empty(&self) -> bool {
        self.volume() == 0
    }

    /// A structure box is placeable when every extent is strictly positive
    pub fn is_placeable(&self) -> bool {
        let size = self.size();
        size.x > 0 && size.z > 0 && size.y > 0
    }

    /// Check if a block position is inside the box (max exclusive)
    pub fn contains(&self, p: IVec3) -> bool {
        p.x >= self.min.x && p.x < self.max.x &&
        p.y >= self.min.y && p.y < self.max.y &&
        p.z >= self.min.z && p.z < self.max.z
    }

    /// Check if two boxes share at least one voxel
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x && self.max.x > other.min.x &&
        self.min.y < other.max.y && self.max.y > other.min.y &&
        self.min.z < other.max.z && self.max.z > other.min.z
    }

    /// Intersection of two boxes, or `None` when they are disjoint
    pub fn intersection(&self, other: &Aabb) -> Option<Aabb> {
        let min = self.min.max(other.min);
        let max = self.max.min(other.max);
        let result = Aabb::new(min, max);
        if result.is_empty() { None } else { Some(result) }
    }

    /// Expand the box to include the voxel at `point`
    pub fn expand_to(&mut self, point: IVec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point + IVec3::ONE);
    }

    /// Split the box along `axis` at coordinate `at`, producing two abutting
    /// boxes `[min, at)` and `[at, max)` that cover the original exactly once.
    pub fn split_at(&self, axis: Axis, at: i32) -> (Aabb, Aabb) {
        let mut lower = *self;
        let mut upper = *self;
        match axis {
            Axis::X => {
                lower.max.x = at;
                upper.min.x = at;
            }
            Axis::Y => {
                lower.max.y = at;
                upper.min.y = at;
            }
            Axis::Z => {
                lower.max.z = at;
                upper.min.z = at;
            }
        }
        (lower, upper)
    }

    /// Iterate every block position in the box
    pub fn iter_blocks(self) -> impl Iterator<Item = IVec3> {
        let (min, max) = (self.min, self.max);
        (min.y..max.y).flat_map(move |y| {
            (min.z..max.z).flat_map(move |z| {
                (min.x..max.x).map(move |x| IVec3::new(x, y, z))
            })
        })
    }
}
