//! Bisecting oversized structures into two sub-volumes

use log::{debug, info};

use crate::analysis::density::count_non_air;
use crate::core::error::Error;
use crate::core::types::Result;
use crate::math::{Aabb, Axis};
use crate::voxel::Structure;
use crate::voxel::chunk::chunks_spanned;

/// Thresholds controlling when and where a structure is split
#[derive(Clone, Copy, Debug)]
pub struct SplitOptions {
    /// Maximum non-air count a structure may have without being split
    pub threshold: u64,
    /// Minimum number of chunk columns a structure must span to be split,
    /// regardless of density
    pub min_chunk_count: u64,
    /// Split axis override; auto-picks the larger of X/Z when `None`
    pub axis: Option<Axis>,
}

/// The two sub-volumes produced by a split, each tagged with its non-air
/// count. Computed once per split request; labels only, never used to
/// rebalance the split point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SplitResult {
    pub axis: Axis,
    pub first: (Aabb, u64),
    pub second: (Aabb, u64),
}

/// Outcome of a split request
pub enum SplitOutcome {
    /// The structure did not need splitting and is returned unchanged
    Kept(Structure),
    /// Two disjoint halves, smaller-coordinate side first
    Split {
        first: Structure,
        second: Structure,
        result: SplitResult,
    },
}

/// Split `structure` in two along one axis when it is too dense to handle
/// whole.
///
/// A structure at or under `threshold` non-air blocks is kept unchanged, as
/// is one spanning fewer than `min_chunk_count` chunk columns; density alone
/// never forces a split on a spatially tiny structure. The axis defaults to
/// the larger of the X/Z extents; Y is never auto-selected so builds are not
/// cut through their vertical middle. The chosen axis is bisected at the
/// integer midpoint into two abutting halves that cover the original exactly
/// once. Extraction failure aborts the whole split; no partial outputs.
pub fn split(structure: Structure, opts: &SplitOptions) -> Result<SplitOutcome> {
    let bounds = structure.checked_bounds()?;
    let non_air = count_non_air(&structure, bounds);
    let chunk_count = chunks_spanned(bounds);

    if non_air <= opts.threshold {
        info!(
            "structure holds {} non-air blocks (<= threshold {}); no split needed",
            non_air, opts.threshold
        );
        return Ok(SplitOutcome::Kept(structure));
    }
    if chunk_count < opts.min_chunk_count {
        info!(
            "structure holds {} non-air blocks but spans only {} chunks (< {}); keeping whole",
            non_air, chunk_count, opts.min_chunk_count
        );
        return Ok(SplitOutcome::Kept(structure));
    }

    let axis = opts.axis.unwrap_or_else(|| {
        if bounds.extent(Axis::X) >= bounds.extent(Axis::Z) {
            Axis::X
        } else {
            Axis::Z
        }
    });
    if bounds.extent(axis) < 2 {
        return Err(Error::Split(format!(
            "cannot bisect axis {} with extent {}",
            axis.name(),
            bounds.extent(axis)
        )));
    }

    let (low, high) = match axis {
        Axis::X => (bounds.min.x, bounds.max.x),
        Axis::Y => (bounds.min.y, bounds.max.y),
        Axis::Z => (bounds.min.z, bounds.max.z),
    };
    let mid = (low + high).div_euclid(2);
    let (first_box, second_box) = bounds.split_at(axis, mid);

    let first = structure
        .extract(first_box)
        .map_err(|e| Error::Split(format!("failed to extract lower half: {}", e)))?;
    let second = structure
        .extract(second_box)
        .map_err(|e| Error::Split(format!("failed to extract upper half: {}", e)))?;

    let first_count = count_non_air(&first, first_box);
    let second_count = count_non_air(&second, second_box);
    debug!(
        "split {} non-air blocks along {} at {}: {} / {}",
        non_air,
        axis.name(),
        mid,
        first_count,
        second_count
    );

    Ok(SplitOutcome::Split {
        first,
        second,
        result: SplitResult {
            axis,
            first: (first_box, first_count),
            second: (second_box, second_count),
        },
    })
}
