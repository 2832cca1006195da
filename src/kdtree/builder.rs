use std::cmp::{self, Ordering};
use std::marker::PhantomData;

use tracing::debug;

use crate::error::{KDTreeError, Result};
use crate::kdtree::bbox::BoundingBox;
use crate::kdtree::node::KDNode;
use crate::kdtree::KDTree;
use crate::points::PointSet;
use crate::r#type::IndexableFloat;

/// The default bucket size used by [`KDTreeBuilder::new`].
///
/// A bucket size of 1 has the least overhead for single-center queries. All-pairs search benefits
/// from larger buckets (around 10).
pub const DEFAULT_BUCKET_SIZE: usize = 1;

/// Which form of distance a radius query reports.
///
/// Comparisons inside the tree always use squared distances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DistanceMode {
    /// Report euclidean distances.
    #[default]
    Linear,
    /// Report squared euclidean distances, saving a square root per result.
    Squared,
}

/// Configuration of a [`KDTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KDTreeOptions {
    /// The maximum number of points in a leaf bucket. Must be at least 1.
    pub bucket_size: usize,
    /// The distance form reported by [`KDTreeIndex::search`][crate::kdtree::KDTreeIndex::search].
    pub distance_mode: DistanceMode,
}

impl Default for KDTreeOptions {
    fn default() -> Self {
        Self {
            bucket_size: DEFAULT_BUCKET_SIZE,
            distance_mode: DistanceMode::default(),
        }
    }
}

impl KDTreeOptions {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.bucket_size < 1 {
            return Err(KDTreeError::InvalidInput(format!(
                "Bucket size must be at least 1, got {}.",
                self.bucket_size
            )));
        }
        Ok(())
    }
}

/// A builder to create a [`KDTree`].
///
/// ```
/// use kd_radius::kdtree::{KDTreeBuilder, KDTreeIndex};
///
/// let coords = [0., 0., 1., 0., 5., 5.];
/// let tree = KDTreeBuilder::<f32>::new(2).build(&coords, 3).unwrap();
/// let result = tree.search(&[0., 0.], 1.5).unwrap();
/// assert_eq!(result.indices(), &[0, 1]);
/// ```
#[derive(Debug, Clone)]
pub struct KDTreeBuilder<N: IndexableFloat> {
    dim: usize,
    options: KDTreeOptions,
    phantom: PhantomData<N>,
}

impl<N: IndexableFloat> KDTreeBuilder<N> {
    /// Create a new builder for points of dimension `dim` with the default bucket size.
    pub fn new(dim: usize) -> Self {
        Self::from_options(dim, KDTreeOptions::default())
    }

    /// Create a new builder for points of dimension `dim` with the provided bucket size.
    pub fn new_with_bucket_size(dim: usize, bucket_size: usize) -> Self {
        Self::from_options(
            dim,
            KDTreeOptions {
                bucket_size,
                ..Default::default()
            },
        )
    }

    /// Create a new builder with the provided options.
    pub fn from_options(dim: usize, options: KDTreeOptions) -> Self {
        Self {
            dim,
            options,
            phantom: PhantomData,
        }
    }

    /// Set the distance form reported by radius queries.
    pub fn distance_mode(mut self, distance_mode: DistanceMode) -> Self {
        self.options.distance_mode = distance_mode;
        self
    }

    /// The dimension of the points this builder accepts.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Access the options of this builder.
    pub fn options(&self) -> &KDTreeOptions {
        &self.options
    }

    /// Build a tree over `count` points stored row-major in `coords`.
    pub fn build<'a>(&self, coords: &'a [N], count: usize) -> Result<KDTree<'a, N>> {
        self.validate()?;
        let points = PointSet::try_new(coords, self.dim, count)?;
        self.finish(points)
    }

    /// Build a tree over an existing [`PointSet`].
    ///
    /// Only an internal index permutation is reordered; the caller's coordinates are untouched.
    pub fn finish<'a>(&self, points: PointSet<'a, N>) -> Result<KDTree<'a, N>> {
        self.validate()?;
        if points.dim() != self.dim {
            return Err(KDTreeError::Shape(format!(
                "Expected points of dimension {}, got {}.",
                self.dim,
                points.dim()
            )));
        }

        let num_items = points.len();
        let mut ids: Vec<u32> = (0..num_items as u32).collect();
        let mut nodes = Vec::new();
        if num_items > 0 {
            build_node(
                &points,
                &mut ids,
                0,
                self.options.bucket_size,
                &mut nodes,
            );
        }

        debug!(
            num_items,
            dim = self.dim,
            bucket_size = self.options.bucket_size,
            num_nodes = nodes.len(),
            "built kd-tree"
        );

        Ok(KDTree {
            points,
            ids,
            nodes,
            options: self.options,
        })
    }

    fn validate(&self) -> Result<()> {
        if self.dim < 1 {
            return Err(KDTreeError::InvalidInput(format!(
                "Dimension must be at least 1, got {}.",
                self.dim
            )));
        }
        self.options.validate()
    }
}

/// Recursively partition `ids` into the node arena, returning the arena position of the new node.
///
/// `offset` is the position of `ids[0]` within the full permutation.
fn build_node<N: IndexableFloat>(
    points: &PointSet<'_, N>,
    ids: &mut [u32],
    offset: usize,
    bucket_size: usize,
    nodes: &mut Vec<KDNode<N>>,
) -> usize {
    let bbox = BoundingBox::from_ids(points, ids);
    let node_index = nodes.len();
    let len = ids.len();

    if len <= bucket_size {
        nodes.push(KDNode::Leaf {
            start: offset,
            end: offset + len,
            bbox,
        });
        return node_index;
    }

    let axis = bbox.widest_axis();

    // The median key is the last one of the left half. Splitting by position keeps both halves
    // non-empty even when every coordinate on `axis` is equal.
    let m = (len - 1) >> 1;
    select(ids, points, axis, m, 0, len - 1);
    let split_value = points.coord(ids[m] as usize, axis);

    nodes.push(KDNode::Internal {
        axis,
        split_value,
        left: 0,
        right: 0,
        bbox,
    });

    let (left_ids, right_ids) = ids.split_at_mut(m + 1);
    let left = build_node(points, left_ids, offset, bucket_size, nodes);
    let right = build_node(points, right_ids, offset + m + 1, bucket_size, nodes);

    if let KDNode::Internal {
        left: left_child,
        right: right_child,
        ..
    } = &mut nodes[node_index]
    {
        *left_child = left;
        *right_child = right;
    }

    node_index
}

/// Order points by their coordinate on `axis`, breaking ties by point index.
#[inline]
fn cmp_key<N: IndexableFloat>(points: &PointSet<'_, N>, axis: usize, a: u32, b: u32) -> Ordering {
    let ca = points.coord(a as usize, axis);
    let cb = points.coord(b as usize, axis);
    IndexableFloat::total_cmp(&ca, &cb).then(a.cmp(&b))
}

/// Custom Floyd-Rivest selection algorithm: reorder ids so that `[left..k-1]` items have smaller
/// keys than the k-th item and `[k+1..=right]` items have larger keys.
fn select<N: IndexableFloat>(
    ids: &mut [u32],
    points: &PointSet<'_, N>,
    axis: usize,
    k: usize,
    mut left: usize,
    mut right: usize,
) {
    while right > left {
        if right - left > 600 {
            let n = (right - left + 1) as f64;
            let m = (k - left + 1) as f64;
            let z = f64::ln(n);
            let s = 0.5 * f64::exp((2.0 * z) / 3.0);
            let sd = 0.5
                * f64::sqrt((z * s * (n - s)) / n)
                * (if m - n / 2.0 < 0.0 { -1.0 } else { 1.0 });
            let new_left = cmp::max(left, f64::floor(k as f64 - (m * s) / n + sd) as usize);
            let new_right = cmp::min(
                right,
                f64::floor(k as f64 + ((n - m) * s) / n + sd) as usize,
            );
            select(ids, points, axis, k, new_left, new_right);
        }

        let t = ids[k];
        let mut i = left;
        let mut j = right;

        ids.swap(left, k);
        if cmp_key(points, axis, ids[right], t) == Ordering::Greater {
            ids.swap(left, right);
        }

        while i < j {
            ids.swap(i, j);
            i += 1;
            j -= 1;
            while cmp_key(points, axis, ids[i], t) == Ordering::Less {
                i += 1;
            }
            while cmp_key(points, axis, ids[j], t) == Ordering::Greater {
                j -= 1;
            }
        }

        if ids[left] == t {
            ids.swap(left, j);
        } else {
            j += 1;
            ids.swap(j, right);
        }

        match j.cmp(&k) {
            Ordering::Equal => break,
            Ordering::Less => left = j + 1,
            Ordering::Greater => right = j - 1,
        }
    }
}
