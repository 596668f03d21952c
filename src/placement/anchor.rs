//! Anchor math for the paste-by-center convention

use crate::core::error::Error;
use crate::core::types::{IVec3, Result, Vec3};
use crate::math::Aabb;

/// Which point of a structure's bounding box is mapped onto the target point
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlacementMode {
    /// The structure's minimum corner lands on the target
    Origin,
    /// The structure's center lands on the target
    Center,
    /// Center on the horizontal axes, minimum corner vertically
    BottomCenter,
}

impl PlacementMode {
    /// Parse a placement-mode keyword
    pub fn parse(keyword: &str) -> Result<Self> {
        match keyword.to_ascii_lowercase().as_str() {
            "origin" => Ok(PlacementMode::Origin),
            "center" => Ok(PlacementMode::Center),
            "bottom-center" | "bottom_center" => Ok(PlacementMode::BottomCenter),
            other => Err(Error::Format(format!(
                "unrecognized placement mode '{}'",
                other
            ))),
        }
    }

    /// Lowercase mode name
    pub fn name(self) -> &'static str {
        match self {
            PlacementMode::Origin => "origin",
            PlacementMode::Center => "center",
            PlacementMode::BottomCenter => "bottom-center",
        }
    }
}

/// Compute the coordinate handed to the paste primitive so the structure
/// lands with the requested anchor semantics.
///
/// The paste primitive positions a structure by its center, so every mode is
/// expressed as an offset from center. All arithmetic is real-valued and the
/// result is rounded exactly once, at the end; rounding any earlier shifts
/// odd-sized structures by a voxel. Rounding is half-up (`floor(v + 0.5)`),
/// which commutes with integer translation and therefore agrees with
/// [`paste_center_offset`](crate::voxel::world::paste_center_offset) at any
/// coordinate sign.
pub fn compute_paste_anchor(bounds: Aabb, target: Vec3, mode: PlacementMode) -> IVec3 {
    let center = bounds.center();
    let min = bounds.min.as_vec3();
    let anchor = match mode {
        PlacementMode::Center => target,
        PlacementMode::Origin => target + (center - min),
        PlacementMode::BottomCenter => {
            Vec3::new(target.x, target.y + (center.y - min.y), target.z)
        }
    };
    (anchor + 0.5).floor().as_ivec3()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxel::world::paste_center_offset;

    #[test]
    fn test_center_mode_is_identity() {
        let bounds = Aabb::new(IVec3::new(-3, 10, 7), IVec3::new(12, 15, 20));
        for target in [
            Vec3::new(0.0, 64.0, 0.0),
            Vec3::new(-17.0, 3.0, 255.0),
            Vec3::new(10.0, 64.0, -5.0),
        ] {
            assert_eq!(
                compute_paste_anchor(bounds, target, PlacementMode::Center),
                target.as_ivec3()
            );
        }
    }

    #[test]
    fn test_origin_round_trips_through_paste_offset() {
        // Pasting at the computed anchor must put bounds.min on the target,
        // including odd sizes where center math is fractional.
        for size in [
            IVec3::new(3, 2, 3),
            IVec3::new(5, 3, 7),
            IVec3::new(4, 4, 4),
            IVec3::new(1, 1, 1),
            IVec3::new(9, 2, 16),
        ] {
            let bounds = Aabb::from_origin_size(IVec3::new(2, 5, -8), size);
            let target = IVec3::new(10, 64, -5);
            let anchor = compute_paste_anchor(bounds, target.as_vec3(), PlacementMode::Origin);
            let pasted_min = anchor - paste_center_offset(size);
            assert_eq!(pasted_min, target, "size {:?}", size);
        }
    }

    #[test]
    fn test_bottom_center_mixes_axes() {
        let bounds = Aabb::from_origin_size(IVec3::ZERO, IVec3::new(4, 6, 4));
        let target = Vec3::new(100.0, 64.0, -40.0);
        let anchor = compute_paste_anchor(bounds, target, PlacementMode::BottomCenter);
        // Horizontal axes keep the center convention, Y gets the origin shift
        assert_eq!(anchor, IVec3::new(100, 67, -40));
    }

    #[test]
    fn test_input_bounds_not_mutated() {
        let bounds = Aabb::new(IVec3::ZERO, IVec3::new(3, 3, 3));
        let copy = bounds;
        let _ = compute_paste_anchor(bounds, Vec3::new(1.0, 2.0, 3.0), PlacementMode::Origin);
        assert_eq!(bounds, copy);
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!(PlacementMode::parse("origin").unwrap(), PlacementMode::Origin);
        assert_eq!(
            PlacementMode::parse("Bottom-Center").unwrap(),
            PlacementMode::BottomCenter
        );
        assert!(PlacementMode::parse("top").is_err());
    }
}
