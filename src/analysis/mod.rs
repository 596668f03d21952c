//! Density analysis and structure splitting

pub mod density;
pub mod split;

pub use density::count_non_air;
pub use split::{SplitOptions, SplitOutcome, SplitResult, split};
