use crate::kdtree::bbox::BoundingBox;
use crate::r#type::IndexableFloat;

/// A node of the tree, stored in the tree's flat node arena.
///
/// Children are referenced by their position in the arena. The root is always at position 0.
#[derive(Debug, Clone, PartialEq)]
pub enum KDNode<N: IndexableFloat> {
    /// An internal node splitting its points along `axis`.
    ///
    /// Every point on the left has a coordinate `<= split_value` on `axis`, every point on the
    /// right a coordinate `>= split_value`. Coordinates equal to the split value are assigned by
    /// point index.
    Internal {
        /// The split axis
        axis: usize,
        /// The median coordinate on `axis`
        split_value: N,
        /// Arena position of the left child
        left: usize,
        /// Arena position of the right child
        right: usize,
        /// Bounding box of all points below this node
        bbox: BoundingBox<N>,
    },
    /// A bucket of points, given as the range `start..end` of the tree's index permutation.
    Leaf {
        /// First position in the index permutation
        start: usize,
        /// One past the last position in the index permutation
        end: usize,
        /// Bounding box of the bucket
        bbox: BoundingBox<N>,
    },
}

impl<N: IndexableFloat> KDNode<N> {
    /// The tight bounding box of all points below this node.
    #[inline]
    pub fn bbox(&self) -> &BoundingBox<N> {
        match self {
            KDNode::Internal { bbox, .. } | KDNode::Leaf { bbox, .. } => bbox,
        }
    }

    /// Returns `true` if this is a bucket leaf.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self, KDNode::Leaf { .. })
    }
}
