//! Voxel data: blocks, structures, chunks, and worlds

pub mod block;
pub mod chunk;
pub mod structure;
pub mod world;

pub use block::{AIR_BLOCK_NAME, Block};
pub use chunk::{CHUNK_SIZE, Chunk, ChunkCoord};
pub use structure::{Entity, Structure};
pub use world::World;

use crate::core::types::IVec3;
use crate::math::Aabb;

/// Read access to a bounded volume of blocks.
///
/// Implemented by structures and by world dimensions so density counting can
/// run against either.
pub trait BlockVolume {
    /// Bounds of the populated region, in the volume's own coordinates
    fn bounds(&self) -> Aabb;

    /// Block at `pos`, or `None` where the volume holds no data
    fn block_at(&self, pos: IVec3) -> Option<Block>;
}
