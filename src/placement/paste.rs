//! Paste executor with the no-rotation fallback

use log::warn;

use crate::core::error::Error;
use crate::core::types::{IVec3, Result};
use crate::voxel::{Structure, World};

/// Paste `structure` into `dimension` with its paste center at `anchor`.
///
/// Applies the rotation about the vertical axis, then translates. If the
/// rotated paste fails for any reason it is retried once with rotation forced
/// to 0 before giving up; the fallback is logged, never silent. Writes become
/// durable only after the caller saves the world.
pub fn paste_structure(
    world: &mut World,
    dimension: &str,
    structure: &Structure,
    anchor: IVec3,
    rotation_degrees: f32,
) -> Result<()> {
    match world.paste(dimension, structure, anchor, rotation_degrees) {
        Ok(()) => Ok(()),
        Err(err) if rotation_degrees != 0.0 => {
            warn!(
                "rotated paste ({}°) failed: {}; retrying without rotation",
                rotation_degrees, err
            );
            world
                .paste(dimension, structure, anchor, 0.0)
                .map_err(|fallback| {
                    Error::Paste(format!(
                        "fallback without rotation also failed: {}",
                        fallback
                    ))
                })
        }
        Err(err) => Err(match err {
            Error::Paste(_) => err,
            other => Error::Paste(other.to_string()),
        }),
    }
}
