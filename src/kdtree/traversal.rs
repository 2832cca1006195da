//! Utilities to traverse the KDTree structure.

use std::marker::PhantomData;

use crate::kdtree::bbox::BoundingBox;
use crate::kdtree::node::KDNode;
use crate::kdtree::KDTreeIndex;
use crate::r#type::IndexableFloat;

/// A view onto a single node of a tree, for manual traversal.
#[derive(Debug)]
pub struct Node<'a, N: IndexableFloat, T: KDTreeIndex<N>> {
    /// The tree that this node is a reference onto
    tree: &'a T,

    /// Position of this node in the tree's node arena.
    pos: usize,

    phantom: PhantomData<N>,
}

impl<N: IndexableFloat, T: KDTreeIndex<N>> Clone for Node<'_, N, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<N: IndexableFloat, T: KDTreeIndex<N>> Copy for Node<'_, N, T> {}

impl<'a, N: IndexableFloat, T: KDTreeIndex<N>> Node<'a, N, T> {
    fn new(tree: &'a T, pos: usize) -> Self {
        Self {
            tree,
            pos,
            phantom: PhantomData,
        }
    }

    pub(crate) fn from_root(tree: &'a T) -> Option<Self> {
        if tree.nodes().is_empty() {
            None
        } else {
            Some(Self::new(tree, 0))
        }
    }

    #[inline]
    fn node(&self) -> &'a KDNode<N> {
        &self.tree.nodes()[self.pos]
    }

    /// The tight bounding box of all points below this node.
    pub fn bbox(&self) -> &'a BoundingBox<N> {
        self.node().bbox()
    }

    /// Returns `true` if this is a leaf node without children.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.node().is_leaf()
    }

    /// Returns `true` if this is an intermediate node with children.
    #[inline]
    pub fn is_parent(&self) -> bool {
        !self.is_leaf()
    }

    /// The split axis of an intermediate node.
    pub fn axis(&self) -> Option<usize> {
        match self.node() {
            KDNode::Internal { axis, .. } => Some(*axis),
            KDNode::Leaf { .. } => None,
        }
    }

    /// The split value of an intermediate node.
    pub fn split_value(&self) -> Option<N> {
        match self.node() {
            KDNode::Internal { split_value, .. } => Some(*split_value),
            KDNode::Leaf { .. } => None,
        }
    }

    /// The two children of this node, left first, or `None` for a leaf.
    pub fn children(&self) -> Option<[Node<'a, N, T>; 2]> {
        match self.node() {
            KDNode::Internal { left, right, .. } => Some([
                Node::new(self.tree, *left),
                Node::new(self.tree, *right),
            ]),
            KDNode::Leaf { .. } => None,
        }
    }

    /// The original point indices in this bucket. This is only valid when this is a leaf node,
    /// which you can check with `Self::is_leaf`.
    pub fn indices(&self) -> &'a [u32] {
        debug_assert!(self.is_leaf());
        match self.node() {
            KDNode::Leaf { start, end, .. } => &self.tree.indices()[*start..*end],
            KDNode::Internal { .. } => &[],
        }
    }
}

#[cfg(test)]
mod test {
    use crate::kdtree::{KDTreeBuilder, KDTreeIndex};
    use crate::test::random_coords;

    #[test]
    fn children_split_on_value() {
        let coords = random_coords(200, 2, 11);
        let tree = KDTreeBuilder::<f32>::new_with_bucket_size(2, 8)
            .build(&coords, 200)
            .unwrap();

        let root = tree.root().unwrap();
        assert!(root.is_parent());
        let axis = root.axis().unwrap();
        let split_value = root.split_value().unwrap();
        let [left, right] = root.children().unwrap();

        assert!(left.bbox().max()[axis] <= split_value);
        assert!(right.bbox().min()[axis] >= split_value);
        assert_eq!(root.bbox().min()[axis], left.bbox().min()[axis]);
        assert_eq!(root.bbox().max()[axis], right.bbox().max()[axis]);
    }

    #[test]
    fn single_leaf_root() {
        let coords = random_coords(5, 3, 1);
        let tree = KDTreeBuilder::<f32>::new_with_bucket_size(3, 10)
            .build(&coords, 5)
            .unwrap();
        let root = tree.root().unwrap();
        assert!(root.is_leaf());
        assert_eq!(root.axis(), None);
        assert!(root.children().is_none());
        assert_eq!(root.indices(), &[0, 1, 2, 3, 4]);
    }
}
