//! Placement math and the paste executor

pub mod anchor;
pub mod orientation;
pub mod paste;

pub use anchor::{PlacementMode, compute_paste_anchor};
pub use orientation::compute_facing_offset;
pub use paste::paste_structure;
