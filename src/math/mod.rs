//! Math primitives for block regions and orientations

pub mod aabb;
pub mod direction;

pub use aabb::{Aabb, Axis};
pub use direction::CardinalDirection;
