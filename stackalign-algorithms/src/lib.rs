//! # stackalign-algorithms
//!
//! The point-set registration engine: density clustering, nearest-neighbor
//! indexes, cluster-pair transformation estimation, correspondence
//! matching, and group-consistency optimization, plus the end-to-end
//! [`register`] pipeline.

pub mod clustering;
pub mod estimation;
pub mod grouping;
pub mod matching;
pub mod nearest_neighbor;
pub mod registration;

// Re-export commonly used items
pub use clustering::*;
pub use estimation::*;
pub use grouping::*;
pub use matching::*;
pub use nearest_neighbor::*;
pub use registration::*;
