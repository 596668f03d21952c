//! Structure payloads: serialized rectangular voxel regions

use std::collections::HashMap;

use crate::core::error::Error;
use crate::core::types::{IVec3, Result, UVec3, Vec3};
use crate::math::Aabb;
use crate::voxel::BlockVolume;
use crate::voxel::block::Block;

/// Tolerance when snapping a paste rotation to a quarter-turn, in degrees
const ROTATION_TOLERANCE: f32 = 1e-3;

/// An entity carried by a structure. Positions are real-valued and live in
/// the structure's own coordinate space.
#[derive(Clone, Debug, PartialEq)]
pub struct Entity {
    pub name: String,
    pub pos: Vec3,
}

/// Block payload of a structure.
///
/// Dense payloads declare their dimensions as metadata and store every voxel
/// including air; sparse payloads store only populated voxels and derive
/// their extents by scanning.
#[derive(Clone, Debug, PartialEq)]
pub enum Payload {
    Dense {
        origin: IVec3,
        dims: UVec3,
        /// x-major, then z, then y: `index = (y * dims.z + z) * dims.x + x`
        blocks: Vec<Block>,
    },
    Sparse(HashMap<IVec3, Block>),
}

/// A loaded structure: palette, block payload, and entities.
///
/// Exclusively owned by whichever operation loaded it; drop after use.
#[derive(Clone, Debug, PartialEq)]
pub struct Structure {
    /// Block names; index 0 is always the air block
    pub palette: Vec<String>,
    pub payload: Payload,
    pub entities: Vec<Entity>,
}

fn check_palette(palette: &[String]) -> Result<()> {
    if palette.is_empty() {
        return Err(Error::Format(
            "palette must contain at least the air entry".to_string(),
        ));
    }
    Ok(())
}

fn dense_index(dims: UVec3, local: IVec3) -> usize {
    ((local.y as u32 * dims.z + local.z as u32) * dims.x + local.x as u32) as usize
}

/// Voxel count of a dense box, without overflowing on hostile dimensions
fn dense_volume(dims: UVec3) -> u64 {
    dims.x as u64 * dims.y as u64 * dims.z as u64
}

impl Structure {
    /// Create a dense structure filled with air
    pub fn dense_filled(origin: IVec3, dims: UVec3, palette: Vec<String>) -> Result<Self> {
        check_palette(&palette)?;
        let volume = usize::try_from(dense_volume(dims)).map_err(|_| {
            Error::Format(format!(
                "dimensions {}x{}x{} exceed addressable volume",
                dims.x, dims.y, dims.z
            ))
        })?;
        Ok(Self {
            palette,
            payload: Payload::Dense {
                origin,
                dims,
                blocks: vec![Block::AIR; volume],
            },
            entities: Vec::new(),
        })
    }

    /// Create a dense structure from an existing block vector
    pub fn from_dense(
        origin: IVec3,
        dims: UVec3,
        palette: Vec<String>,
        blocks: Vec<Block>,
    ) -> Result<Self> {
        check_palette(&palette)?;
        let volume = dense_volume(dims);
        if blocks.len() as u64 != volume {
            return Err(Error::Format(format!(
                "dense payload holds {} blocks but dimensions {}x{}x{} require {}",
                blocks.len(),
                dims.x,
                dims.y,
                dims.z,
                volume
            )));
        }
        Ok(Self {
            palette,
            payload: Payload::Dense {
                origin,
                dims,
                blocks,
            },
            entities: Vec::new(),
        })
    }

    /// Create an empty sparse structure
    pub fn sparse(palette: Vec<String>) -> Result<Self> {
        check_palette(&palette)?;
        Ok(Self {
            palette,
            payload: Payload::Sparse(HashMap::new()),
            entities: Vec::new(),
        })
    }

    /// Axis-aligned extents: declared dimensions for dense payloads, a scan
    /// of populated voxels for sparse ones. Empty payloads report a
    /// degenerate box; see [`Structure::checked_bounds`].
    pub fn bounds(&self) -> Aabb {
        match &self.payload {
            Payload::Dense { origin, dims, .. } => {
                Aabb::from_origin_size(*origin, dims.as_ivec3())
            }
            Payload::Sparse(blocks) => {
                let mut iter = blocks.keys();
                let Some(first) = iter.next() else {
                    return Aabb::default();
                };
                let mut bounds = Aabb::new(*first, *first + IVec3::ONE);
                for pos in iter {
                    bounds.expand_to(*pos);
                }
                bounds
            }
        }
    }

    /// Bounds of a structure that actually holds voxels
    pub fn checked_bounds(&self) -> Result<Aabb> {
        let bounds = self.bounds();
        if bounds.is_empty() {
            return Err(Error::NotFound(
                "structure contains no voxel dimension".to_string(),
            ));
        }
        Ok(bounds)
    }

    /// Footprint in voxel counts per axis
    pub fn size(&self) -> UVec3 {
        self.bounds().size().max(IVec3::ZERO).as_uvec3()
    }

    /// Block at `pos`, or `None` where the structure holds no data
    pub fn block_at(&self, pos: IVec3) -> Option<Block> {
        match &self.payload {
            Payload::Dense {
                origin,
                dims,
                blocks,
            } => {
                let bounds = Aabb::from_origin_size(*origin, dims.as_ivec3());
                if !bounds.contains(pos) {
                    return None;
                }
                Some(blocks[dense_index(*dims, pos - *origin)])
            }
            Payload::Sparse(blocks) => blocks.get(&pos).copied(),
        }
    }

    /// Write a block. Dense payloads reject positions outside their declared
    /// dimensions; sparse payloads grow, and writing air clears the voxel.
    pub fn set_block(&mut self, pos: IVec3, block: Block) -> Result<()> {
        match &mut self.payload {
            Payload::Dense {
                origin,
                dims,
                blocks,
            } => {
                let bounds = Aabb::from_origin_size(*origin, dims.as_ivec3());
                if !bounds.contains(pos) {
                    return Err(Error::Format(format!(
                        "position {},{},{} outside dense structure bounds",
                        pos.x, pos.y, pos.z
                    )));
                }
                blocks[dense_index(*dims, pos - *origin)] = block;
                Ok(())
            }
            Payload::Sparse(blocks) => {
                if block.is_air() {
                    blocks.remove(&pos);
                } else {
                    blocks.insert(pos, block);
                }
                Ok(())
            }
        }
    }

    /// Add an entity (position in structure space)
    pub fn push_entity(&mut self, entity: Entity) {
        self.entities.push(entity);
    }

    /// Rotate the structure about the vertical axis in quarter-turns.
    ///
    /// `rotation_degrees` must be within tolerance of a multiple of 90°;
    /// anything else fails rather than being coerced. The rotated structure
    /// keeps the same minimum corner, with its X/Z footprint swapped for odd
    /// quarter-turns.
    pub fn rotated(&self, rotation_degrees: f32) -> Result<Structure> {
        let norm = rotation_degrees.rem_euclid(360.0);
        let quarters = ((norm / 90.0).round() as i32).rem_euclid(4);
        let mut residual = (norm - quarters as f32 * 90.0).abs();
        if residual > 180.0 {
            residual = 360.0 - residual;
        }
        if residual > ROTATION_TOLERANCE {
            return Err(Error::Paste(format!(
                "rotation {}° is not a quarter-turn about the vertical axis",
                rotation_degrees
            )));
        }
        if quarters == 0 {
            return Ok(self.clone());
        }

        let bounds = self.bounds();
        if bounds.is_empty() {
            return Ok(self.clone());
        }
        let min = bounds.min;
        let size = bounds.size();
        let (sx, sz) = (size.x, size.z);

        let map_block = |local: IVec3| -> IVec3 {
            match quarters {
                1 => IVec3::new(sz - 1 - local.z, local.y, local.x),
                2 => IVec3::new(sx - 1 - local.x, local.y, sz - 1 - local.z),
                _ => IVec3::new(local.z, local.y, sx - 1 - local.x),
            }
        };
        let map_real = |local: Vec3| -> Vec3 {
            match quarters {
                1 => Vec3::new(sz as f32 - local.z, local.y, local.x),
                2 => Vec3::new(sx as f32 - local.x, local.y, sz as f32 - local.z),
                _ => Vec3::new(local.z, local.y, sx as f32 - local.x),
            }
        };

        let payload = match &self.payload {
            Payload::Dense { dims, blocks, .. } => {
                let new_dims = if quarters == 2 {
                    *dims
                } else {
                    UVec3::new(dims.z, dims.y, dims.x)
                };
                let mut rotated = vec![Block::AIR; blocks.len()];
                for local in Aabb::from_origin_size(IVec3::ZERO, dims.as_ivec3()).iter_blocks() {
                    rotated[dense_index(new_dims, map_block(local))] =
                        blocks[dense_index(*dims, local)];
                }
                Payload::Dense {
                    origin: min,
                    dims: new_dims,
                    blocks: rotated,
                }
            }
            Payload::Sparse(blocks) => {
                let rotated = blocks
                    .iter()
                    .map(|(pos, block)| (min + map_block(*pos - min), *block))
                    .collect();
                Payload::Sparse(rotated)
            }
        };

        let entities = self
            .entities
            .iter()
            .map(|e| Entity {
                name: e.name.clone(),
                pos: min.as_vec3() + map_real(e.pos - min.as_vec3()),
            })
            .collect();

        Ok(Structure {
            palette: self.palette.clone(),
            payload,
            entities,
        })
    }

    /// Extract `region` into an independent dense structure.
    ///
    /// Voxels the source does not populate come out as air; entities are kept
    /// when the voxel under them falls inside the region. Positions are
    /// unchanged, so extraction never shifts content.
    pub fn extract(&self, region: Aabb) -> Result<Structure> {
        if region.is_empty() {
            return Err(Error::Format(
                "extraction region covers no voxels".to_string(),
            ));
        }
        let dims = region.size().as_uvec3();
        let mut blocks = vec![Block::AIR; region.volume() as usize];
        for pos in region.iter_blocks() {
            if let Some(block) = self.block_at(pos) {
                blocks[dense_index(dims, pos - region.min)] = block;
            }
        }
        let entities = self
            .entities
            .iter()
            .filter(|e| region.contains(e.pos.floor().as_ivec3()))
            .cloned()
            .collect();
        Ok(Structure {
            palette: self.palette.clone(),
            payload: Payload::Dense {
                origin: region.min,
                dims,
                blocks,
            },
            entities,
        })
    }
}

impl BlockVolume for Structure {
    fn bounds(&self) -> Aabb {
        Structure::bounds(self)
    }

    fn block_at(&self, pos: IVec3) -> Option<Block> {
        Structure::block_at(self, pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxel::block::AIR_BLOCK_NAME;

    fn test_palette() -> Vec<String> {
        vec![AIR_BLOCK_NAME.to_string(), "minecraft:stone".to_string()]
    }

    fn solid(origin: IVec3, dims: UVec3) -> Structure {
        let volume = (dims.x * dims.y * dims.z) as usize;
        Structure::from_dense(origin, dims, test_palette(), vec![Block::new(1); volume]).unwrap()
    }

    #[test]
    fn test_from_dense_length_mismatch() {
        let result = Structure::from_dense(
            IVec3::ZERO,
            UVec3::new(2, 2, 2),
            test_palette(),
            vec![Block::AIR; 3],
        );
        assert!(matches!(result, Err(Error::Format(_))));
    }

    #[test]
    fn test_from_dense_huge_dims_is_format_error() {
        // 2000^3 voxels overflow u32; must reject, not panic or allocate
        let result = Structure::from_dense(
            IVec3::ZERO,
            UVec3::new(2000, 2000, 2000),
            test_palette(),
            vec![Block::AIR; 8],
        );
        assert!(matches!(result, Err(Error::Format(_))));
    }

    #[test]
    fn test_empty_palette_rejected() {
        assert!(matches!(
            Structure::sparse(Vec::new()),
            Err(Error::Format(_))
        ));
    }

    #[test]
    fn test_dense_bounds_from_metadata() {
        let s = solid(IVec3::new(10, 64, -5), UVec3::new(5, 3, 7));
        let bounds = s.checked_bounds().unwrap();
        assert_eq!(bounds.min, IVec3::new(10, 64, -5));
        assert_eq!(bounds.size(), IVec3::new(5, 3, 7));
    }

    #[test]
    fn test_sparse_bounds_from_scan() {
        let mut s = Structure::sparse(test_palette()).unwrap();
        s.set_block(IVec3::new(-2, 5, 1), Block::new(1)).unwrap();
        s.set_block(IVec3::new(3, 7, -4), Block::new(1)).unwrap();
        let bounds = s.checked_bounds().unwrap();
        assert_eq!(bounds.min, IVec3::new(-2, 5, -4));
        assert_eq!(bounds.max, IVec3::new(4, 8, 2));
    }

    #[test]
    fn test_empty_structure_has_no_bounds() {
        let s = Structure::sparse(test_palette()).unwrap();
        assert!(matches!(s.checked_bounds(), Err(Error::NotFound(_))));

        let d = Structure::dense_filled(IVec3::ZERO, UVec3::new(0, 4, 4), test_palette()).unwrap();
        assert!(matches!(d.checked_bounds(), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_block_at_outside_is_none() {
        let s = solid(IVec3::ZERO, UVec3::new(2, 2, 2));
        assert_eq!(s.block_at(IVec3::new(1, 1, 1)), Some(Block::new(1)));
        assert_eq!(s.block_at(IVec3::new(2, 0, 0)), None);
    }

    #[test]
    fn test_sparse_set_air_clears() {
        let mut s = Structure::sparse(test_palette()).unwrap();
        let pos = IVec3::new(1, 2, 3);
        s.set_block(pos, Block::new(1)).unwrap();
        assert_eq!(s.block_at(pos), Some(Block::new(1)));
        s.set_block(pos, Block::AIR).unwrap();
        assert_eq!(s.block_at(pos), None);
    }

    #[test]
    fn test_rotated_rejects_non_quarter() {
        let s = solid(IVec3::ZERO, UVec3::new(2, 1, 3));
        assert!(matches!(s.rotated(45.0), Err(Error::Paste(_))));
        assert!(s.rotated(90.0).is_ok());
        assert!(s.rotated(-90.0).is_ok());
        assert!(s.rotated(360.0).is_ok());
    }

    #[test]
    fn test_rotated_quarter_swaps_footprint() {
        let mut s = Structure::dense_filled(IVec3::ZERO, UVec3::new(3, 1, 2), test_palette())
            .unwrap();
        s.set_block(IVec3::new(2, 0, 0), Block::new(1)).unwrap();

        let r = s.rotated(90.0).unwrap();
        let bounds = r.bounds();
        assert_eq!(bounds.min, IVec3::ZERO);
        assert_eq!(bounds.size(), IVec3::new(2, 1, 3));
        // (x=2, z=0) maps to (sz-1-z, x) = (1, 2)
        assert_eq!(r.block_at(IVec3::new(1, 0, 2)), Some(Block::new(1)));
    }

    #[test]
    fn test_rotated_four_quarters_is_identity() {
        let mut s = Structure::dense_filled(IVec3::new(4, 0, -2), UVec3::new(3, 2, 5), test_palette())
            .unwrap();
        s.set_block(IVec3::new(4, 1, -2), Block::new(1)).unwrap();
        s.set_block(IVec3::new(6, 0, 2), Block::new(1)).unwrap();
        s.push_entity(Entity {
            name: "minecraft:armor_stand".to_string(),
            pos: Vec3::new(4.5, 0.0, -1.5),
        });

        let mut r = s.clone();
        for _ in 0..4 {
            r = r.rotated(90.0).unwrap();
        }
        assert_eq!(r, s);
    }

    #[test]
    fn test_rotated_entity_follows_blocks() {
        let mut s = Structure::dense_filled(IVec3::ZERO, UVec3::new(4, 1, 2), test_palette())
            .unwrap();
        // Entity stands on the voxel at (3, 0, 0)
        s.push_entity(Entity {
            name: "e".to_string(),
            pos: Vec3::new(3.5, 0.0, 0.5),
        });
        let r = s.rotated(90.0).unwrap();
        // Voxel (3, 0) maps to (1, 3); entity should sit at its center
        assert_eq!(r.entities[0].pos, Vec3::new(1.5, 0.0, 3.5));
    }

    #[test]
    fn test_extract_preserves_content() {
        let mut s = solid(IVec3::ZERO, UVec3::new(4, 2, 4));
        s.set_block(IVec3::new(0, 0, 0), Block::AIR).unwrap();

        let region = Aabb::new(IVec3::ZERO, IVec3::new(2, 2, 4));
        let part = s.extract(region).unwrap();
        assert_eq!(part.bounds(), region);
        assert_eq!(part.block_at(IVec3::new(0, 0, 0)), Some(Block::AIR));
        assert_eq!(part.block_at(IVec3::new(1, 1, 3)), Some(Block::new(1)));
        assert_eq!(part.block_at(IVec3::new(2, 0, 0)), None);
    }

    #[test]
    fn test_extract_empty_region_fails() {
        let s = solid(IVec3::ZERO, UVec3::new(2, 2, 2));
        let region = Aabb::new(IVec3::ZERO, IVec3::new(0, 2, 2));
        assert!(matches!(s.extract(region), Err(Error::Format(_))));
    }

    #[test]
    fn test_extract_filters_entities() {
        let mut s = solid(IVec3::ZERO, UVec3::new(4, 1, 1));
        s.push_entity(Entity {
            name: "keep".to_string(),
            pos: Vec3::new(0.5, 0.0, 0.5),
        });
        s.push_entity(Entity {
            name: "drop".to_string(),
            pos: Vec3::new(3.5, 0.0, 0.5),
        });
        let part = s
            .extract(Aabb::new(IVec3::ZERO, IVec3::new(2, 1, 1)))
            .unwrap();
        assert_eq!(part.entities.len(), 1);
        assert_eq!(part.entities[0].name, "keep");
    }
}
