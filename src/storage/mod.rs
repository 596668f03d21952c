//! On-disk formats for structures and worlds

pub mod structure_io;
pub mod world_io;

pub use structure_io::{extract_bounds, load_structure, save_structure, structure_path};
pub use world_io::{create_world, load_world, save_world};
