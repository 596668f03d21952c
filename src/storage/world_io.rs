//! World directory layout and chunk I/O
//!
//! A world is a directory holding `manifest.json` (name, format version,
//! palette, dimension list) and one subdirectory per dimension with a
//! `chunk_<x>_<z>.vxc` file per 16x16 column plus an optional `entities.vxe`
//! list. Chunk files are rkyv-archived records compressed with LZ4. Saving
//! writes modified chunks only and rewrites the manifest.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use log::{debug, info};
use rkyv::{Archive, Deserialize, Serialize};
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};

use crate::core::error::Error;
use crate::core::types::{IVec3, Result, Vec3};
use crate::storage::structure_io::EntityData;
use crate::voxel::block::Block;
use crate::voxel::chunk::{Chunk, ChunkCoord};
use crate::voxel::structure::Entity;
use crate::voxel::world::{Dimension, World};

/// Bumped on any change to the directory layout or chunk record
const WORLD_FORMAT_VERSION: u32 = 1;

/// World metadata stored as manifest.json
#[derive(Debug, SerdeSerialize, SerdeDeserialize)]
struct WorldManifest {
    name: String,
    version: u32,
    /// Block names; index 0 is the air block
    palette: Vec<String>,
    dimensions: Vec<String>,
}

#[derive(Archive, Deserialize, Serialize)]
struct ChunkBlockData {
    x: i32,
    y: i32,
    z: i32,
    id: u16,
}

/// Serializable chunk record (positions are chunk-local)
#[derive(Archive, Deserialize, Serialize)]
struct ChunkData {
    coord_x: i32,
    coord_z: i32,
    blocks: Vec<ChunkBlockData>,
}

#[derive(Archive, Deserialize, Serialize)]
struct DimensionEntities {
    entities: Vec<EntityData>,
}

/// Path of the world manifest
pub fn manifest_path(root: &Path) -> PathBuf {
    root.join("manifest.json")
}

/// File path for a chunk column
pub fn chunk_path(root: &Path, dimension: &str, coord: ChunkCoord) -> PathBuf {
    root.join(dimension)
        .join(format!("chunk_{}_{}.vxc", coord.x, coord.z))
}

fn entities_path(root: &Path, dimension: &str) -> PathBuf {
    root.join(dimension).join("entities.vxe")
}

/// Serialize a chunk to compressed bytes
fn compress_chunk(chunk: &Chunk) -> Result<Vec<u8>> {
    let mut blocks: Vec<ChunkBlockData> = chunk
        .iter_blocks()
        .map(|(local, block)| ChunkBlockData {
            x: local.x,
            y: local.y,
            z: local.z,
            id: block.0,
        })
        .collect();
    // Stable on-disk order regardless of map iteration
    blocks.sort_by_key(|b| (b.y, b.z, b.x));
    let data = ChunkData {
        coord_x: chunk.coord.x,
        coord_z: chunk.coord.z,
        blocks,
    };
    let bytes = rkyv::to_bytes::<rkyv::rancor::Error>(&data)
        .map_err(|e| Error::Format(format!("chunk serialization failed: {}", e)))?;
    Ok(lz4_flex::compress_prepend_size(&bytes))
}

/// Decompress and deserialize a chunk
fn decompress_chunk(data: &[u8]) -> Result<Chunk> {
    let decompressed = lz4_flex::decompress_size_prepended(data)
        .map_err(|e| Error::Format(format!("LZ4 decompression failed: {}", e)))?;
    let archived = rkyv::access::<ArchivedChunkData, rkyv::rancor::Error>(&decompressed)
        .map_err(|e| Error::Format(format!("invalid chunk data: {}", e)))?;
    let record: ChunkData = rkyv::deserialize::<ChunkData, rkyv::rancor::Error>(archived)
        .map_err(|e| Error::Format(format!("invalid chunk data: {}", e)))?;

    let mut chunk = Chunk::new(ChunkCoord::new(record.coord_x, record.coord_z));
    for entry in &record.blocks {
        chunk.set(IVec3::new(entry.x, entry.y, entry.z), Block(entry.id));
    }
    Ok(chunk)
}

fn write_manifest(root: &Path, world: &World) -> Result<()> {
    let manifest = WorldManifest {
        name: world.name().to_string(),
        version: WORLD_FORMAT_VERSION,
        palette: world.palette().to_vec(),
        dimensions: world
            .dimension_names()
            .into_iter()
            .map(str::to_string)
            .collect(),
    };
    let json = serde_json::to_string_pretty(&manifest)
        .map_err(|e| Error::Format(format!("manifest serialization failed: {}", e)))?;
    std::fs::create_dir_all(root)?;
    std::fs::write(manifest_path(root), json)?;
    Ok(())
}

/// Create a new world directory with the given dimensions
pub fn create_world(root: &Path, name: &str, dimensions: &[&str]) -> Result<World> {
    let mut world = World::new(name);
    for dimension in dimensions {
        world.create_dimension(dimension);
        std::fs::create_dir_all(root.join(dimension))?;
    }
    write_manifest(root, &world)?;
    info!("created world '{}' at {}", name, root.display());
    Ok(world)
}

/// Load a world from its directory
pub fn load_world(root: &Path) -> Result<World> {
    let manifest_file = manifest_path(root);
    if !manifest_file.exists() {
        return Err(Error::NotFound(format!(
            "world manifest {} does not exist",
            manifest_file.display()
        )));
    }
    let json = std::fs::read_to_string(&manifest_file)?;
    let manifest: WorldManifest = serde_json::from_str(&json)
        .map_err(|e| Error::Format(format!("malformed world manifest: {}", e)))?;
    if manifest.version > WORLD_FORMAT_VERSION {
        return Err(Error::Format(format!(
            "world format version {} is newer than supported {}",
            manifest.version, WORLD_FORMAT_VERSION
        )));
    }
    if manifest.palette.is_empty() {
        return Err(Error::Format(
            "world manifest has an empty palette".to_string(),
        ));
    }

    let mut dimensions = HashMap::new();
    for name in &manifest.dimensions {
        let mut dimension = Dimension::new();
        let dir = root.join(name);
        if dir.is_dir() {
            for entry in std::fs::read_dir(&dir)? {
                let path = entry?.path();
                if path.extension().and_then(|e| e.to_str()) != Some("vxc") {
                    continue;
                }
                let compressed = std::fs::read(&path)?;
                let chunk = decompress_chunk(&compressed)?;
                dimension.insert_chunk(chunk);
            }
            let entities_file = entities_path(root, name);
            if entities_file.exists() {
                let compressed = std::fs::read(&entities_file)?;
                let decompressed = lz4_flex::decompress_size_prepended(&compressed)
                    .map_err(|e| Error::Format(format!("LZ4 decompression failed: {}", e)))?;
                let archived = rkyv::access::<ArchivedDimensionEntities, rkyv::rancor::Error>(
                    &decompressed,
                )
                .map_err(|e| Error::Format(format!("invalid entity data: {}", e)))?;
                let record: DimensionEntities =
                    rkyv::deserialize::<DimensionEntities, rkyv::rancor::Error>(archived)
                        .map_err(|e| Error::Format(format!("invalid entity data: {}", e)))?;
                dimension.set_entities(
                    record
                        .entities
                        .into_iter()
                        .map(|e| Entity {
                            pos: Vec3::new(e.x, e.y, e.z),
                            name: e.name,
                        })
                        .collect(),
                );
            }
        }
        debug!("loaded dimension '{}': {} chunks", name, dimension.chunk_count());
        dimensions.insert(name.clone(), dimension);
    }

    Ok(World::from_parts(
        manifest.name,
        manifest.palette,
        dimensions,
    ))
}

/// Save modified chunks and entities, then rewrite the manifest.
///
/// Worlds mutated in memory are invisible on disk until this runs.
pub fn save_world(root: &Path, world: &mut World) -> Result<()> {
    let mut written = 0usize;
    let names: Vec<String> = world.dimension_names().iter().map(|s| s.to_string()).collect();
    for name in &names {
        let dim = world.dimension_mut(name)?;
        let modified = dim.take_modified();
        if !modified.is_empty() {
            if let Err(err) = std::fs::create_dir_all(root.join(name)) {
                for &coord in &modified {
                    dim.mark_modified(coord);
                }
                return Err(err.into());
            }
        }
        for (index, &coord) in modified.iter().enumerate() {
            let path = chunk_path(root, name, coord);
            let result = match dim.get_chunk_mut(coord) {
                Some(chunk) if !chunk.is_empty() => {
                    let write = compress_chunk(chunk)
                        .and_then(|compressed| std::fs::write(&path, compressed).map_err(Error::from));
                    if write.is_ok() {
                        chunk.modified = false;
                        written += 1;
                    }
                    write
                }
                _ => {
                    // Chunk emptied or dropped since it was touched
                    if path.exists() {
                        std::fs::remove_file(&path).map_err(Error::from)
                    } else {
                        Ok(())
                    }
                }
            };
            if let Err(err) = result {
                // Unwritten chunks stay dirty so the next save retries them
                for &pending in &modified[index..] {
                    dim.mark_modified(pending);
                }
                return Err(err);
            }
        }
        if dim.entities_modified() {
            std::fs::create_dir_all(root.join(name))?;
            let record = DimensionEntities {
                entities: dim
                    .entities()
                    .iter()
                    .map(|e| EntityData {
                        name: e.name.clone(),
                        x: e.pos.x,
                        y: e.pos.y,
                        z: e.pos.z,
                    })
                    .collect(),
            };
            let bytes = rkyv::to_bytes::<rkyv::rancor::Error>(&record)
                .map_err(|e| Error::Format(format!("entity serialization failed: {}", e)))?;
            std::fs::write(
                entities_path(root, name),
                lz4_flex::compress_prepend_size(&bytes),
            )?;
            dim.take_entities_modified();
        }
    }
    write_manifest(root, world)?;
    debug!("saved {} chunks to {}", written, root.display());
    Ok(())
}
