//! A static, bucketed k-d tree for fixed-radius and all-pairs neighbor search.
//!
//! Splits are made on the axis of maximum spread at the median point, and every node carries
//! the tight bounding box of its points for pruning.

#![warn(missing_docs)]

mod bbox;
mod builder;
mod index;
mod node;
mod pairs;
mod r#trait;
mod traversal;

pub use bbox::BoundingBox;
pub use builder::{DistanceMode, KDTreeBuilder, KDTreeOptions, DEFAULT_BUCKET_SIZE};
pub use index::KDTree;
pub use node::KDNode;
pub use r#trait::KDTreeIndex;
pub use traversal::Node;
