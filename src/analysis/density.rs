//! Non-air density counting

use crate::core::types::IVec3;
use crate::math::Aabb;
use crate::voxel::BlockVolume;

/// Count occupied (non-air) voxels within `region`.
///
/// Iterates every coordinate in the region and classifies each voxel by
/// direct block lookup. O(volume) and deliberately brute force: the backing
/// formats guarantee no sparse index, so none is assumed. Positions the
/// volume holds no data for are treated as absent and not counted, never as
/// an error.
pub fn count_non_air<V: BlockVolume + ?Sized>(volume: &V, region: Aabb) -> u64 {
    let mut count = 0u64;
    for y in region.min.y..region.max.y {
        for z in region.min.z..region.max.z {
            for x in region.min.x..region.max.x {
                if let Some(block) = volume.block_at(IVec3::new(x, y, z)) {
                    if !block.is_air() {
                        count += 1;
                    }
                }
            }
        }
    }
    count
}
