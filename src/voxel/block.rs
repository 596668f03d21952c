//! Block value type

use bytemuck::{Pod, Zeroable};
use rkyv::{Archive, Deserialize, Serialize};

/// Palette name of the empty/air block
pub const AIR_BLOCK_NAME: &str = "minecraft:air";

/// A single block as an index into its owner's palette - exactly 2 bytes.
///
/// Index 0 is always the air block.
#[repr(C)]
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable, Archive, Deserialize, Serialize,
)]
pub struct Block(pub u16);

impl Block {
    /// The empty/air block (palette index 0)
    pub const AIR: Block = Block(0);

    /// Create a block from a palette index
    pub fn new(id: u16) -> Self {
        Block(id)
    }

    /// Check if this block is air
    pub fn is_air(self) -> bool {
        self.0 == 0
    }
}
