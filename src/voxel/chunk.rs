//! Chunk system for 16x16 column regions of world storage

use std::collections::HashMap;

use crate::core::types::IVec3;
use crate::math::Aabb;
use crate::voxel::block::Block;

/// Horizontal size of a chunk column in blocks
pub const CHUNK_SIZE: i32 = 16;

/// Integer coordinate identifying a chunk column in the world grid.
/// Chunks subdivide the horizontal plane only; columns are unbounded in Y.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChunkCoord {
    pub x: i32,
    pub z: i32,
}

impl ChunkCoord {
    /// Create a new chunk coordinate
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Convert a block position to the coordinate of its chunk column
    pub fn from_block_pos(pos: IVec3) -> Self {
        Self {
            x: pos.x.div_euclid(CHUNK_SIZE),
            z: pos.z.div_euclid(CHUNK_SIZE),
        }
    }

    /// World-space block origin (minimum corner at y = 0) of this column
    pub fn block_origin(&self) -> IVec3 {
        IVec3::new(self.x * CHUNK_SIZE, 0, self.z * CHUNK_SIZE)
    }
}

/// Convert a block position to chunk-local coordinates
/// (x and z in 0..CHUNK_SIZE, y unchanged)
pub fn local_pos(pos: IVec3) -> IVec3 {
    IVec3::new(
        pos.x.rem_euclid(CHUNK_SIZE),
        pos.y,
        pos.z.rem_euclid(CHUNK_SIZE),
    )
}

/// Number of chunk columns a block region spans, zero for empty regions
pub fn chunks_spanned(bounds: Aabb) -> u64 {
    if bounds.is_empty() {
        return 0;
    }
    let min = ChunkCoord::from_block_pos(bounds.min);
    let max = ChunkCoord::from_block_pos(bounds.max - IVec3::ONE);
    (max.x - min.x + 1) as u64 * (max.z - min.z + 1) as u64
}

/// A single 16x16 column of sparse voxel data
pub struct Chunk {
    /// Coordinate of this chunk column in the world grid
    pub coord: ChunkCoord,
    /// Populated voxels by chunk-local position; absent means air
    blocks: HashMap<IVec3, Block>,
    /// Whether this chunk has been modified since last save
    pub modified: bool,
}

impl Chunk {
    /// Create a new empty chunk at the given coordinate
    pub fn new(coord: ChunkCoord) -> Self {
        Self {
            coord,
            blocks: HashMap::new(),
            modified: false,
        }
    }

    /// Block at a chunk-local position, or `None` for air
    pub fn get(&self, local: IVec3) -> Option<Block> {
        self.blocks.get(&local).copied()
    }

    /// Write a block at a chunk-local position; air clears the voxel
    pub fn set(&mut self, local: IVec3, block: Block) {
        if block.is_air() {
            self.blocks.remove(&local);
        } else {
            self.blocks.insert(local, block);
        }
    }

    /// Number of populated voxels
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Check if the chunk holds no voxels
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Iterate populated voxels as (local position, block)
    pub fn iter_blocks(&self) -> impl Iterator<Item = (IVec3, Block)> + '_ {
        self.blocks.iter().map(|(pos, block)| (*pos, *block))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_block_pos() {
        assert_eq!(
            ChunkCoord::from_block_pos(IVec3::new(0, 64, 0)),
            ChunkCoord::new(0, 0)
        );
        assert_eq!(
            ChunkCoord::from_block_pos(IVec3::new(15, 0, 16)),
            ChunkCoord::new(0, 1)
        );
        // Negative coordinates floor toward -infinity
        assert_eq!(
            ChunkCoord::from_block_pos(IVec3::new(-1, 0, -16)),
            ChunkCoord::new(-1, -1)
        );
        assert_eq!(
            ChunkCoord::from_block_pos(IVec3::new(-17, 0, -33)),
            ChunkCoord::new(-2, -3)
        );
    }

    #[test]
    fn test_block_origin_round_trip() {
        let coord = ChunkCoord::new(5, -3);
        assert_eq!(ChunkCoord::from_block_pos(coord.block_origin()), coord);
    }

    #[test]
    fn test_local_pos() {
        assert_eq!(local_pos(IVec3::new(17, 64, -1)), IVec3::new(1, 64, 15));
        assert_eq!(local_pos(IVec3::new(-16, 0, 31)), IVec3::new(0, 0, 15));
    }

    #[test]
    fn test_chunks_spanned() {
        // 20 blocks wide in x crosses two columns, 16 in z stays in one
        let bounds = Aabb::new(IVec3::ZERO, IVec3::new(20, 40, 16));
        assert_eq!(chunks_spanned(bounds), 2);

        // Exactly one column
        let one = Aabb::new(IVec3::ZERO, IVec3::new(16, 1, 16));
        assert_eq!(chunks_spanned(one), 1);

        // Straddles the origin
        let neg = Aabb::new(IVec3::new(-1, 0, -1), IVec3::new(1, 1, 1));
        assert_eq!(chunks_spanned(neg), 4);

        assert_eq!(chunks_spanned(Aabb::default()), 0);
    }

    #[test]
    fn test_set_get_and_air_clear() {
        let mut chunk = Chunk::new(ChunkCoord::new(0, 0));
        let local = IVec3::new(3, 70, 12);

        chunk.set(local, Block::new(2));
        assert_eq!(chunk.get(local), Some(Block::new(2)));
        assert_eq!(chunk.len(), 1);

        chunk.set(local, Block::AIR);
        assert_eq!(chunk.get(local), None);
        assert!(chunk.is_empty());
    }
}
