use tinyvec::TinyVec;
use tracing::trace;

use crate::error::{KDTreeError, Result};
use crate::kdtree::node::KDNode;
use crate::kdtree::pairs::PairSearch;
use crate::kdtree::{DistanceMode, KDTree, KDTreeOptions, Node};
use crate::points::{sq_dist, PointSet};
use crate::r#type::IndexableFloat;
use crate::results::{PairResults, RadiusResults};

/// A trait for searching and accessing data out of a KDTree.
pub trait KDTreeIndex<N: IndexableFloat>: Sized {
    /// The point set this tree indexes
    fn points(&self) -> &PointSet<'_, N>;

    /// The permutation of point indices; each leaf owns a contiguous range of it
    fn indices(&self) -> &[u32];

    /// The node arena, with the root at position 0. Empty when the tree holds no points.
    fn nodes(&self) -> &[KDNode<N>];

    /// Access the options this tree was built with
    fn options(&self) -> &KDTreeOptions;

    /// The number of items in this KDTree
    fn num_items(&self) -> usize {
        self.points().len()
    }

    /// The dimension of the indexed points
    fn dim(&self) -> usize {
        self.points().dim()
    }

    /// The bucket size of this KDTree
    fn bucket_size(&self) -> usize {
        self.options().bucket_size
    }

    /// Search the index for items within a given radius of `center`.
    ///
    /// Distances are reported in the form configured by [`KDTreeOptions::distance_mode`].
    /// A negative radius gives no results; a zero radius gives only points coincident with
    /// `center`.
    fn search(&self, center: &[N], radius: N) -> Result<RadiusResults<N>> {
        let mut results = RadiusResults::new();
        self.search_into(center, radius, &mut results)?;
        Ok(results)
    }

    /// Search the index for items within a given radius, reporting squared distances.
    fn search_squared(&self, center: &[N], radius: N) -> Result<RadiusResults<N>> {
        let mut results = RadiusResults::new();
        self.search_squared_into(center, radius, &mut results)?;
        Ok(results)
    }

    /// Like [`search`][Self::search], writing into a reusable buffer.
    ///
    /// On error the buffer is left untouched.
    fn search_into(&self, center: &[N], radius: N, results: &mut RadiusResults<N>) -> Result<()> {
        radius_search(self, center, radius, self.options().distance_mode, results)
    }

    /// Like [`search_squared`][Self::search_squared], writing into a reusable buffer.
    fn search_squared_into(
        &self,
        center: &[N],
        radius: N,
        results: &mut RadiusResults<N>,
    ) -> Result<()> {
        radius_search(self, center, radius, DistanceMode::Squared, results)
    }

    /// Find all pairs of indexed points within `radius` of each other.
    ///
    /// Each unordered pair is reported once, smaller index first, with its euclidean distance.
    fn neighbor_search(&self, radius: N) -> PairResults<N> {
        let mut results = PairResults::new();
        self.neighbor_search_into(radius, &mut results);
        results
    }

    /// Like [`neighbor_search`][Self::neighbor_search], writing into a reusable buffer.
    fn neighbor_search_into(&self, radius: N, results: &mut PairResults<N>) {
        results.clear();
        if let Some(search) = PairSearch::new(self, radius) {
            search.run(results);
        }
        trace!(?radius, num_pairs = results.len(), "neighbor search");
    }

    /// Find all pairs within `radius` by the parallel pair search on the rayon thread pool.
    ///
    /// The result equals that of [`neighbor_search`][Self::neighbor_search], in the same order.
    #[cfg(feature = "rayon")]
    fn par_neighbor_search(&self, radius: N) -> PairResults<N> {
        let mut results = PairResults::new();
        if let Some(search) = PairSearch::new(self, radius) {
            search.par_run(&mut results);
        }
        trace!(?radius, num_pairs = results.len(), "parallel neighbor search");
        results
    }

    /// Find all pairs within `radius` by comparing every pair of points, without using the
    /// tree. This is O(n²) and serves as a reference for [`neighbor_search`][Self::neighbor_search].
    fn neighbor_simple_search(&self, radius: N) -> PairResults<N> {
        let mut results = PairResults::new();
        self.neighbor_simple_search_into(radius, &mut results);
        results
    }

    /// Like [`neighbor_simple_search`][Self::neighbor_simple_search], writing into a reusable
    /// buffer.
    fn neighbor_simple_search_into(&self, radius: N, results: &mut PairResults<N>) {
        results.clear();
        if !is_valid_radius(radius) {
            return;
        }
        let r2 = radius * radius;
        let points = self.points();
        for i in 0..points.len() {
            let a = points.point(i);
            for j in i + 1..points.len() {
                let d = sq_dist(a, points.point(j));
                if d <= r2 {
                    results.push(i as u32, j as u32, d.sqrt());
                }
            }
        }
        trace!(?radius, num_pairs = results.len(), "simple neighbor search");
    }

    /// Access the root node of the KDTree for manual traversal. `None` if the tree is empty.
    fn root(&self) -> Option<Node<'_, N, Self>> {
        Node::from_root(self)
    }
}

impl<N: IndexableFloat> KDTreeIndex<N> for KDTree<'_, N> {
    fn points(&self) -> &PointSet<'_, N> {
        &self.points
    }

    fn indices(&self) -> &[u32] {
        &self.ids
    }

    fn nodes(&self) -> &[KDNode<N>] {
        &self.nodes
    }

    fn options(&self) -> &KDTreeOptions {
        &self.options
    }
}

/// Negative and NaN radii match nothing.
#[inline]
pub(crate) fn is_valid_radius<N: IndexableFloat>(radius: N) -> bool {
    radius >= N::zero()
}

pub(crate) fn check_center<N: IndexableFloat>(dim: usize, center: &[N]) -> Result<()> {
    if center.len() != dim {
        return Err(KDTreeError::Shape(format!(
            "Expected a {}-dimensional center, got {} coordinates.",
            dim,
            center.len()
        )));
    }
    Ok(())
}

fn radius_search<N: IndexableFloat, T: KDTreeIndex<N>>(
    tree: &T,
    center: &[N],
    radius: N,
    distance_mode: DistanceMode,
    results: &mut RadiusResults<N>,
) -> Result<()> {
    check_center(tree.dim(), center)?;
    results.clear();

    let nodes = tree.nodes();
    if nodes.is_empty() || !is_valid_radius(radius) {
        return Ok(());
    }

    let points = tree.points();
    let ids = tree.indices();
    let r2 = radius * radius;

    // Use TinyVec to avoid heap allocations
    let mut stack: TinyVec<[usize; 64]> = TinyVec::new();
    stack.push(0);

    // depth-first search, pruning every subtree whose box is out of reach
    while let Some(pos) = stack.pop() {
        let node = &nodes[pos];
        if node.bbox().min_sq_dist_to_point(center) > r2 {
            continue;
        }

        match node {
            KDNode::Leaf { start, end, .. } => {
                for &id in &ids[*start..*end] {
                    let d = sq_dist(points.point(id as usize), center);
                    if d <= r2 {
                        let distance = match distance_mode {
                            DistanceMode::Linear => d.sqrt(),
                            DistanceMode::Squared => d,
                        };
                        results.push(id, distance);
                    }
                }
            }
            KDNode::Internal { left, right, .. } => {
                // Note: these are pushed in backwards order to what gets popped
                stack.push(*right);
                stack.push(*left);
            }
        }
    }

    trace!(?radius, num_results = results.len(), "radius search");
    Ok(())
}
