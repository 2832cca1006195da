use crate::kdtree::node::KDNode;
use crate::kdtree::KDTreeOptions;
use crate::points::PointSet;
use crate::r#type::IndexableFloat;

/// A static k-d tree over a borrowed [`PointSet`].
///
/// Usually this will be created via [`KDTreeBuilder`][crate::kdtree::KDTreeBuilder]. The tree
/// owns its node arena and a permutation of point indices; each leaf is a contiguous range of
/// that permutation. It is immutable once built and can be queried from many threads at once.
#[derive(Debug, Clone, PartialEq)]
pub struct KDTree<'a, N: IndexableFloat> {
    pub(crate) points: PointSet<'a, N>,
    pub(crate) ids: Vec<u32>,
    pub(crate) nodes: Vec<KDNode<N>>,
    pub(crate) options: KDTreeOptions,
}

impl<'a, N: IndexableFloat> KDTree<'a, N> {
    /// The point set this tree was built over.
    pub fn point_set(&self) -> PointSet<'a, N> {
        self.points
    }
}

#[cfg(test)]
mod test {
    use crate::kdtree::{KDTreeBuilder, KDTreeIndex};

    #[test]
    fn empty_tree_has_no_root() {
        let tree = KDTreeBuilder::<f32>::new(3).build(&[], 0).unwrap();
        assert!(tree.root().is_none());
        assert_eq!(tree.num_items(), 0);
        assert!(tree.nodes().is_empty());
    }

    #[test]
    fn tree_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<super::KDTree<'static, f32>>();
    }
}
