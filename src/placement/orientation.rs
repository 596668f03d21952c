//! Facing-dependent placement offsets

use crate::core::types::{IVec3, UVec3};
use crate::math::CardinalDirection;

/// Compute the paste target so the structure's footprint extends away from
/// `reference` in the direction the reference object faces.
///
/// `size` is the structure's footprint in voxel counts, not bounding deltas.
/// East and West swap the X/Z footprint to account for the quarter-turn the
/// paste step applies. The sign conventions were established against the
/// storage backend's coordinate handedness and are preserved exactly;
/// unrecognized facing keywords are rejected at the parse boundary
/// ([`CardinalDirection::parse`]).
pub fn compute_facing_offset(
    reference: IVec3,
    facing: CardinalDirection,
    size: UVec3,
) -> IVec3 {
    let sx = size.x as i32;
    let sz = size.z as i32;
    match facing {
        CardinalDirection::North => {
            IVec3::new(reference.x + (sx - 1), reference.y, reference.z + (sz - 1))
        }
        CardinalDirection::South => {
            IVec3::new(reference.x - (sx - 1), reference.y, reference.z - (sz - 1))
        }
        CardinalDirection::East => {
            IVec3::new(reference.x - (sz - 1), reference.y, reference.z + (sx - 1))
        }
        CardinalDirection::West => {
            IVec3::new(reference.x + (sz - 1), reference.y, reference.z - (sx - 1))
        }
    }
}
