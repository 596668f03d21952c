//! Voxstamp - structure placement and splitting for chunked voxel worlds

pub mod analysis;
pub mod core;
pub mod math;
pub mod placement;
pub mod storage;
pub mod voxel;
