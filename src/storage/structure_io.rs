//! Structure serialization and disk I/O
//!
//! A structure file is an rkyv-archived [`StructureData`] record compressed
//! with LZ4 (size-prepended). Dense payloads declare their dimensions in the
//! header; sparse payloads carry only populated voxels and are scanned for
//! bounds on load.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use log::debug;
use rkyv::{Archive, Deserialize, Serialize};

use crate::core::error::Error;
use crate::core::types::{IVec3, Result, UVec3, Vec3};
use crate::math::Aabb;
use crate::voxel::block::Block;
use crate::voxel::structure::{Entity, Payload, Structure};

/// Bumped on any change to the on-disk record layout
const FORMAT_VERSION: u32 = 1;

/// File extension for serialized structures
pub const STRUCTURE_EXT: &str = "vxs";

#[derive(Archive, Deserialize, Serialize)]
pub(crate) struct EntityData {
    pub name: String,
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

#[derive(Archive, Deserialize, Serialize)]
struct SparseBlockData {
    x: i32,
    y: i32,
    z: i32,
    id: u16,
}

/// Serializable structure record
#[derive(Archive, Deserialize, Serialize)]
struct StructureData {
    version: u32,
    origin_x: i32,
    origin_y: i32,
    origin_z: i32,
    /// Block names; index 0 is the air block
    palette: Vec<String>,
    /// Declared dense dimensions; all zero marks a sparse payload
    dims_x: u32,
    dims_y: u32,
    dims_z: u32,
    /// Dense voxels, x-major then z then y; empty for sparse payloads
    dense_blocks: Vec<u16>,
    /// Populated voxels of a sparse payload; empty for dense ones
    sparse_blocks: Vec<SparseBlockData>,
    entities: Vec<EntityData>,
}

fn encode(structure: &Structure) -> StructureData {
    let (origin, dims, dense_blocks, sparse_blocks) = match &structure.payload {
        Payload::Dense {
            origin,
            dims,
            blocks,
        } => (
            *origin,
            *dims,
            blocks.iter().map(|b| b.0).collect(),
            Vec::new(),
        ),
        Payload::Sparse(blocks) => {
            let mut entries: Vec<SparseBlockData> = blocks
                .iter()
                .map(|(pos, block)| SparseBlockData {
                    x: pos.x,
                    y: pos.y,
                    z: pos.z,
                    id: block.0,
                })
                .collect();
            // Stable on-disk order regardless of map iteration
            entries.sort_by_key(|e| (e.y, e.z, e.x));
            (structure.bounds().min, UVec3::ZERO, Vec::new(), entries)
        }
    };
    StructureData {
        version: FORMAT_VERSION,
        origin_x: origin.x,
        origin_y: origin.y,
        origin_z: origin.z,
        palette: structure.palette.clone(),
        dims_x: dims.x,
        dims_y: dims.y,
        dims_z: dims.z,
        dense_blocks,
        sparse_blocks,
        entities: structure
            .entities
            .iter()
            .map(|e| EntityData {
                name: e.name.clone(),
                x: e.pos.x,
                y: e.pos.y,
                z: e.pos.z,
            })
            .collect(),
    }
}

fn decode(data: StructureData) -> Result<Structure> {
    if data.version > FORMAT_VERSION {
        return Err(Error::Format(format!(
            "structure format version {} is newer than supported {}",
            data.version, FORMAT_VERSION
        )));
    }
    let dims = UVec3::new(data.dims_x, data.dims_y, data.dims_z);
    let origin = IVec3::new(data.origin_x, data.origin_y, data.origin_z);

    let mut structure = if dims == UVec3::ZERO {
        if !data.dense_blocks.is_empty() {
            return Err(Error::Format(
                "dense blocks present but no dimensions declared".to_string(),
            ));
        }
        let mut blocks = HashMap::with_capacity(data.sparse_blocks.len());
        for entry in &data.sparse_blocks {
            blocks.insert(IVec3::new(entry.x, entry.y, entry.z), Block(entry.id));
        }
        let mut s = Structure::sparse(data.palette)?;
        s.payload = Payload::Sparse(blocks);
        s
    } else {
        if dims.x == 0 || dims.y == 0 || dims.z == 0 {
            return Err(Error::Format(format!(
                "malformed dimension metadata {}x{}x{}",
                dims.x, dims.y, dims.z
            )));
        }
        if !data.sparse_blocks.is_empty() {
            return Err(Error::Format(
                "structure declares both dense and sparse payloads".to_string(),
            ));
        }
        let blocks = data.dense_blocks.iter().map(|id| Block(*id)).collect();
        Structure::from_dense(origin, dims, data.palette, blocks)?
    };

    structure.entities = data
        .entities
        .into_iter()
        .map(|e| Entity {
            pos: Vec3::new(e.x, e.y, e.z),
            name: e.name,
        })
        .collect();
    Ok(structure)
}

fn to_bytes(data: &StructureData) -> Result<Vec<u8>> {
    let bytes = rkyv::to_bytes::<rkyv::rancor::Error>(data)
        .map_err(|e| Error::Format(format!("structure serialization failed: {}", e)))?;
    Ok(bytes.to_vec())
}

/// Serialize a structure to bytes (uncompressed)
pub fn serialize_structure(structure: &Structure) -> Result<Vec<u8>> {
    to_bytes(&encode(structure))
}

/// Deserialize a structure from bytes (uncompressed)
pub fn deserialize_structure(data: &[u8]) -> Result<Structure> {
    let archived = rkyv::access::<ArchivedStructureData, rkyv::rancor::Error>(data)
        .map_err(|e| Error::Format(format!("invalid structure data: {}", e)))?;
    let record: StructureData = rkyv::deserialize::<StructureData, rkyv::rancor::Error>(archived)
        .map_err(|e| Error::Format(format!("invalid structure data: {}", e)))?;
    decode(record)
}

/// Compress a serialized structure using LZ4
pub fn compress_structure(structure: &Structure) -> Result<Vec<u8>> {
    Ok(lz4_flex::compress_prepend_size(&serialize_structure(
        structure,
    )?))
}

/// Decompress and deserialize a structure
pub fn decompress_structure(data: &[u8]) -> Result<Structure> {
    let decompressed = lz4_flex::decompress_size_prepended(data)
        .map_err(|e| Error::Format(format!("LZ4 decompression failed: {}", e)))?;
    deserialize_structure(&decompressed)
}

/// File path for a structure with the given stem
pub fn structure_path(dir: &Path, stem: &str) -> PathBuf {
    dir.join(format!("{}.{}", stem, STRUCTURE_EXT))
}

/// Save a structure to disk (compressed)
pub fn save_structure(path: &Path, structure: &Structure) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let compressed = compress_structure(structure)?;
    std::fs::write(path, compressed)?;
    Ok(())
}

/// Load a structure from disk
pub fn load_structure(path: &Path) -> Result<Structure> {
    if !path.exists() {
        return Err(Error::NotFound(format!(
            "structure file {} does not exist",
            path.display()
        )));
    }
    let compressed = std::fs::read(path)?;
    decompress_structure(&compressed)
}

/// Load a structure only long enough to report its bounds.
///
/// The transient payload is dropped before returning; there are no other
/// side effects.
pub fn extract_bounds(path: &Path) -> Result<Aabb> {
    let structure = load_structure(path)?;
    let bounds = structure.checked_bounds()?;
    debug!(
        "{}: bounds {},{},{} .. {},{},{}",
        path.display(),
        bounds.min.x,
        bounds.min.y,
        bounds.min.z,
        bounds.max.x,
        bounds.max.y,
        bounds.max.z
    );
    Ok(bounds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxel::block::AIR_BLOCK_NAME;

    fn test_palette() -> Vec<String> {
        vec![AIR_BLOCK_NAME.to_string(), "minecraft:stone".to_string()]
    }

    fn sample_dense() -> Structure {
        let mut s = Structure::dense_filled(
            IVec3::new(4, 60, -3),
            UVec3::new(3, 2, 4),
            test_palette(),
        )
        .unwrap();
        s.set_block(IVec3::new(4, 60, -3), Block::new(1)).unwrap();
        s.set_block(IVec3::new(6, 61, 0), Block::new(1)).unwrap();
        s.push_entity(Entity {
            name: "minecraft:armor_stand".to_string(),
            pos: Vec3::new(4.5, 60.0, -2.5),
        });
        s
    }

    #[test]
    fn test_dense_roundtrip() {
        let original = sample_dense();
        let bytes = compress_structure(&original).unwrap();
        let loaded = decompress_structure(&bytes).unwrap();
        assert_eq!(loaded, original);
    }

    #[test]
    fn test_sparse_roundtrip() {
        let mut original = Structure::sparse(test_palette()).unwrap();
        original.set_block(IVec3::new(-9, 3, 12), Block::new(1)).unwrap();
        original.set_block(IVec3::new(40, -2, 7), Block::new(1)).unwrap();

        let bytes = compress_structure(&original).unwrap();
        let loaded = decompress_structure(&bytes).unwrap();
        assert_eq!(loaded, original);
        assert_eq!(loaded.bounds(), original.bounds());
    }

    #[test]
    fn test_save_load_and_extract_bounds() {
        let dir = tempfile::tempdir().unwrap();
        let path = structure_path(dir.path(), "gazebo");
        let original = sample_dense();

        save_structure(&path, &original).unwrap();
        let loaded = load_structure(&path).unwrap();
        assert_eq!(loaded, original);

        let bounds = extract_bounds(&path).unwrap();
        assert_eq!(bounds, original.checked_bounds().unwrap());
    }

    #[test]
    fn test_load_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_structure(&structure_path(dir.path(), "missing"));
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_extract_bounds_of_empty_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = structure_path(dir.path(), "empty");
        let empty = Structure::sparse(test_palette()).unwrap();
        save_structure(&path, &empty).unwrap();
        assert!(matches!(extract_bounds(&path), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_malformed_dense_length_is_format_error() {
        let data = StructureData {
            version: FORMAT_VERSION,
            origin_x: 0,
            origin_y: 0,
            origin_z: 0,
            palette: test_palette(),
            dims_x: 2,
            dims_y: 2,
            dims_z: 2,
            dense_blocks: vec![1, 1, 1],
            sparse_blocks: Vec::new(),
            entities: Vec::new(),
        };
        let bytes = to_bytes(&data).unwrap();
        assert!(matches!(
            deserialize_structure(&bytes),
            Err(Error::Format(_))
        ));
    }

    #[test]
    fn test_huge_declared_dims_is_format_error() {
        // Crafted header whose volume overflows u32 must decode to an error
        let data = StructureData {
            version: FORMAT_VERSION,
            origin_x: 0,
            origin_y: 0,
            origin_z: 0,
            palette: test_palette(),
            dims_x: 2000,
            dims_y: 2000,
            dims_z: 2000,
            dense_blocks: vec![1, 1],
            sparse_blocks: Vec::new(),
            entities: Vec::new(),
        };
        let bytes = to_bytes(&data).unwrap();
        assert!(matches!(
            deserialize_structure(&bytes),
            Err(Error::Format(_))
        ));
    }

    #[test]
    fn test_both_payloads_is_format_error() {
        let data = StructureData {
            version: FORMAT_VERSION,
            origin_x: 0,
            origin_y: 0,
            origin_z: 0,
            palette: test_palette(),
            dims_x: 1,
            dims_y: 1,
            dims_z: 1,
            dense_blocks: vec![1],
            sparse_blocks: vec![SparseBlockData {
                x: 0,
                y: 0,
                z: 0,
                id: 1,
            }],
            entities: Vec::new(),
        };
        let bytes = to_bytes(&data).unwrap();
        assert!(matches!(
            deserialize_structure(&bytes),
            Err(Error::Format(_))
        ));
    }

    #[test]
    fn test_garbage_bytes_is_format_error() {
        assert!(matches!(
            decompress_structure(&[0x01, 0x02, 0x03]),
            Err(Error::Format(_))
        ));
    }

    #[test]
    fn test_newer_version_rejected() {
        let data = StructureData {
            version: FORMAT_VERSION + 1,
            origin_x: 0,
            origin_y: 0,
            origin_z: 0,
            palette: test_palette(),
            dims_x: 0,
            dims_y: 0,
            dims_z: 0,
            dense_blocks: Vec::new(),
            sparse_blocks: Vec::new(),
            entities: Vec::new(),
        };
        let bytes = to_bytes(&data).unwrap();
        assert!(matches!(
            deserialize_structure(&bytes),
            Err(Error::Format(_))
        ));
    }
}
