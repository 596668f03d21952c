//! World container: dimensions of chunk columns plus the paste primitive

use std::collections::HashMap;

use log::debug;

use crate::core::error::Error;
use crate::core::types::{IVec3, Result};
use crate::math::Aabb;
use crate::voxel::BlockVolume;
use crate::voxel::block::{AIR_BLOCK_NAME, Block};
use crate::voxel::chunk::{Chunk, ChunkCoord, local_pos};
use crate::voxel::structure::{Entity, Structure};

/// Offset from a structure's minimum corner to its paste center.
///
/// The paste primitive positions structures by their center. Half-voxel
/// centers round up, matching the half-up rounding in the placement
/// calculator; the two must agree or origin-anchored pastes drift by one
/// voxel on odd sizes.
pub fn paste_center_offset(size: IVec3) -> IVec3 {
    (size + IVec3::ONE).div_euclid(IVec3::splat(2))
}

/// One named dimension: a map of chunk columns plus its entities
#[derive(Default)]
pub struct Dimension {
    chunks: HashMap<ChunkCoord, Chunk>,
    modified: Vec<ChunkCoord>,
    entities: Vec<Entity>,
    entities_modified: bool,
}

impl Dimension {
    /// Create a new empty dimension
    pub fn new() -> Self {
        Self::default()
    }

    /// Get immutable reference to a chunk by coordinate
    pub fn get_chunk(&self, coord: ChunkCoord) -> Option<&Chunk> {
        self.chunks.get(&coord)
    }

    /// Get mutable reference to a chunk by coordinate
    pub fn get_chunk_mut(&mut self, coord: ChunkCoord) -> Option<&mut Chunk> {
        self.chunks.get_mut(&coord)
    }

    /// Insert a chunk without marking it modified (used by the loader)
    pub fn insert_chunk(&mut self, chunk: Chunk) {
        self.chunks.insert(chunk.coord, chunk);
    }

    /// Get the number of loaded chunks
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Get an iterator over all loaded chunk coordinates
    pub fn loaded_coords(&self) -> impl Iterator<Item = &ChunkCoord> {
        self.chunks.keys()
    }

    /// Stored block at a world position, or `None` for air/absent
    pub fn block_at(&self, pos: IVec3) -> Option<Block> {
        self.chunks
            .get(&ChunkCoord::from_block_pos(pos))
            .and_then(|chunk| chunk.get(local_pos(pos)))
    }

    /// Write a block at a world position, creating the chunk if needed
    pub fn set_block(&mut self, pos: IVec3, block: Block) {
        let coord = ChunkCoord::from_block_pos(pos);
        let chunk = self
            .chunks
            .entry(coord)
            .or_insert_with(|| Chunk::new(coord));
        chunk.set(local_pos(pos), block);
        self.mark_modified(coord);
    }

    /// Entities living in this dimension (world-space positions)
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Add an entity and flag the entity list for saving
    pub fn push_entity(&mut self, entity: Entity) {
        self.entities.push(entity);
        self.entities_modified = true;
    }

    pub(crate) fn set_entities(&mut self, entities: Vec<Entity>) {
        self.entities = entities;
        self.entities_modified = false;
    }

    /// Mark a chunk as modified (needs to be saved)
    pub fn mark_modified(&mut self, coord: ChunkCoord) {
        if !self.modified.contains(&coord) {
            self.modified.push(coord);
        }
        if let Some(chunk) = self.chunks.get_mut(&coord) {
            chunk.modified = true;
        }
    }

    /// Take the list of modified chunks and clear the internal list
    pub fn take_modified(&mut self) -> Vec<ChunkCoord> {
        std::mem::take(&mut self.modified)
    }

    /// Whether the entity list has unsaved changes
    pub fn entities_modified(&self) -> bool {
        self.entities_modified
    }

    /// Take the entity dirty flag, clearing it
    pub fn take_entities_modified(&mut self) -> bool {
        std::mem::take(&mut self.entities_modified)
    }

    /// Bounding box of all populated voxels, degenerate when empty
    pub fn populated_bounds(&self) -> Aabb {
        let mut bounds: Option<Aabb> = None;
        for chunk in self.chunks.values() {
            let origin = chunk.coord.block_origin();
            for (local, _) in chunk.iter_blocks() {
                let pos = IVec3::new(origin.x + local.x, local.y, origin.z + local.z);
                match &mut bounds {
                    Some(b) => b.expand_to(pos),
                    None => bounds = Some(Aabb::new(pos, pos + IVec3::ONE)),
                }
            }
        }
        bounds.unwrap_or_default()
    }
}

impl BlockVolume for Dimension {
    fn bounds(&self) -> Aabb {
        self.populated_bounds()
    }

    fn block_at(&self, pos: IVec3) -> Option<Block> {
        Dimension::block_at(self, pos)
    }
}

/// A loaded world: named dimensions sharing one block palette.
///
/// Exclusively owned by the caller for the duration of an operation.
/// Mutations become durable only after an explicit save through the storage
/// layer.
pub struct World {
    name: String,
    palette: Vec<String>,
    dimensions: HashMap<String, Dimension>,
}

impl World {
    /// Create a new empty world with an air-only palette
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            palette: vec![AIR_BLOCK_NAME.to_string()],
            dimensions: HashMap::new(),
        }
    }

    pub(crate) fn from_parts(
        name: String,
        palette: Vec<String>,
        dimensions: HashMap<String, Dimension>,
    ) -> Self {
        Self {
            name,
            palette,
            dimensions,
        }
    }

    /// World name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Block palette; index 0 is air
    pub fn palette(&self) -> &[String] {
        &self.palette
    }

    /// Create a dimension if it does not exist yet
    pub fn create_dimension(&mut self, name: &str) -> &mut Dimension {
        self.dimensions.entry(name.to_string()).or_default()
    }

    /// Look up a dimension by name
    pub fn dimension(&self, name: &str) -> Result<&Dimension> {
        self.dimensions
            .get(name)
            .ok_or_else(|| Error::NotFound(format!("dimension '{}' not found", name)))
    }

    /// Look up a dimension by name, mutably
    pub fn dimension_mut(&mut self, name: &str) -> Result<&mut Dimension> {
        self.dimensions
            .get_mut(name)
            .ok_or_else(|| Error::NotFound(format!("dimension '{}' not found", name)))
    }

    /// Sorted dimension names
    pub fn dimension_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.dimensions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Palette index for a block name, registering it on first use
    pub fn ensure_palette(&mut self, name: &str) -> Result<Block> {
        if let Some(index) = self.palette.iter().position(|n| n == name) {
            return Ok(Block(index as u16));
        }
        if self.palette.len() > u16::MAX as usize {
            return Err(Error::Format(format!(
                "world palette is full; cannot register '{}'",
                name
            )));
        }
        self.palette.push(name.to_string());
        Ok(Block((self.palette.len() - 1) as u16))
    }

    /// Stored block at a world position; absent voxels read as air
    pub fn get_block(&self, dimension: &str, pos: IVec3) -> Result<Block> {
        Ok(self.dimension(dimension)?.block_at(pos).unwrap_or(Block::AIR))
    }

    /// Write a block at a world position
    pub fn set_block(&mut self, dimension: &str, pos: IVec3, block: Block) -> Result<()> {
        self.dimension_mut(dimension)?.set_block(pos, block);
        Ok(())
    }

    /// Paste primitive: rotate `structure` about the vertical axis, then
    /// translate so its paste center lands on `location`.
    ///
    /// Dense payloads write their whole box including air; sparse payloads
    /// write only populated voxels. Entities are carried along with the same
    /// translation. Rotation must be a quarter-turn; anything else fails and
    /// is left to the executor's fallback.
    pub fn paste(
        &mut self,
        dimension: &str,
        structure: &Structure,
        location: IVec3,
        rotation_degrees: f32,
    ) -> Result<()> {
        self.dimension(dimension)?;
        let rotated = structure.rotated(rotation_degrees)?;
        let bounds = rotated.checked_bounds()?;
        let shift = (location - paste_center_offset(bounds.size())) - bounds.min;

        // Remap the structure palette into the world palette up front.
        // Index 0 is air by convention regardless of its recorded name.
        let mut id_map = Vec::with_capacity(rotated.palette.len());
        for (index, name) in rotated.palette.iter().enumerate() {
            if index == 0 {
                id_map.push(Block::AIR);
            } else {
                id_map.push(self.ensure_palette(name)?);
            }
        }

        let dim = self.dimension_mut(dimension)?;
        let mut written = 0u64;
        for pos in bounds.iter_blocks() {
            if let Some(block) = rotated.block_at(pos) {
                dim.set_block(pos + shift, id_map[block.0 as usize]);
                written += 1;
            }
        }
        for entity in &rotated.entities {
            dim.push_entity(Entity {
                name: entity.name.clone(),
                pos: entity.pos + shift.as_vec3(),
            });
        }
        debug!(
            "pasted {} voxels and {} entities into '{}' at {},{},{} (rotation {}°)",
            written,
            rotated.entities.len(),
            dimension,
            (bounds.min + shift).x,
            (bounds.min + shift).y,
            (bounds.min + shift).z,
            rotation_degrees
        );
        Ok(())
    }
}
