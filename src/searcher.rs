//! A stateful search object mirroring the classic `set_data` / `search` / `get_indices`
//! workflow.
//!
//! [`NeighborSearcher`] owns its result buffers and keeps the latest results until the next
//! successful query of the same kind. Every call validates its input before touching the tree or
//! the stored results, so a failed call leaves the previous state intact.

use tracing::debug;

use crate::error::{KDTreeError, Result};
use crate::kdtree::{KDTree, KDTreeBuilder, KDTreeIndex, KDTreeOptions};
use crate::points::PointSet;
use crate::r#type::{CoordType, IndexableFloat};
use crate::results::{PairResults, RadiusResults};

/// Build once over a borrowed point buffer, then run many radius and all-pairs queries.
///
/// ```
/// use kd_radius::NeighborSearcher;
///
/// let coords = [0., 0., 0., 0.5, 0., 0., 3., 3., 3.];
/// let mut searcher = NeighborSearcher::new(3, 1).unwrap();
/// searcher.set_data(&coords, 3).unwrap();
///
/// searcher.search_center_radius(&[0., 0., 0.], 1.).unwrap();
/// assert_eq!(searcher.get_indices(), &[0, 1]);
///
/// searcher.neighbor_search(1.).unwrap();
/// assert_eq!(searcher.neighbor_get_pairs(), &[[0, 1]]);
/// assert_eq!(searcher.neighbor_get_radii(), &[0.5]);
/// ```
#[derive(Debug, Clone)]
pub struct NeighborSearcher<'a, N: IndexableFloat = f32> {
    builder: KDTreeBuilder<N>,
    tree: Option<KDTree<'a, N>>,
    radius_results: RadiusResults<N>,
    pair_results: PairResults<N>,
}

impl<'a, N: IndexableFloat> NeighborSearcher<'a, N> {
    /// Create a searcher for points of dimension `dim` stored in buckets of `bucket_size`.
    pub fn new(dim: usize, bucket_size: usize) -> Result<Self> {
        Self::from_options(
            dim,
            KDTreeOptions {
                bucket_size,
                ..Default::default()
            },
        )
    }

    /// Create a searcher with the provided tree options.
    pub fn from_options(dim: usize, options: KDTreeOptions) -> Result<Self> {
        if dim < 1 {
            return Err(rejected(KDTreeError::InvalidInput(format!(
                "Dimension must be at least 1, got {}.",
                dim
            ))));
        }
        options.validate().map_err(rejected)?;

        Ok(Self {
            builder: KDTreeBuilder::from_options(dim, options),
            tree: None,
            radius_results: RadiusResults::new(),
            pair_results: PairResults::new(),
        })
    }

    /// The dimension of the points this searcher accepts.
    pub fn dim(&self) -> usize {
        self.builder.dim()
    }

    /// Returns `true` once a point set has been specified.
    pub fn is_built(&self) -> bool {
        self.tree.is_some()
    }

    /// The current tree, if a point set has been specified.
    pub fn tree(&self) -> Option<&KDTree<'a, N>> {
        self.tree.as_ref()
    }

    /// Specify `count` points stored row-major in `coords` and build the tree.
    ///
    /// Fails with [`KDTreeError::Shape`] unless `count > 0` and `coords.len() == count * dim`.
    pub fn set_data(&mut self, coords: &'a [N], count: usize) -> Result<()> {
        check_count(count)?;
        let points = PointSet::try_new(coords, self.dim(), count).map_err(rejected)?;
        self.install(points)
    }

    /// Specify the points as an `N x dim` array with the given `shape`.
    pub fn set_coords(&mut self, coords: &'a [N], shape: &[usize]) -> Result<()> {
        if shape.len() != 2 || shape[1] != self.dim() {
            return Err(rejected(KDTreeError::Shape(format!(
                "Expected a Nx{} array, got shape {:?}.",
                self.dim(),
                shape
            ))));
        }
        self.set_data(coords, shape[0])
    }

    /// Specify the points as a raw byte buffer of `coord_type` elements.
    ///
    /// Fails with [`KDTreeError::Type`] if `coord_type` differs from this searcher's coordinate
    /// type. The buffer is viewed in place, without copying.
    pub fn set_data_bytes(
        &mut self,
        data: &'a [u8],
        coord_type: CoordType,
        count: usize,
    ) -> Result<()> {
        check_count(count)?;
        let points =
            PointSet::try_from_bytes(data, coord_type, self.dim(), count).map_err(rejected)?;
        self.install(points)
    }

    fn install(&mut self, points: PointSet<'a, N>) -> Result<()> {
        let tree = self.builder.finish(points).map_err(rejected)?;
        self.tree = Some(tree);
        self.radius_results.clear();
        self.pair_results.clear();
        Ok(())
    }

    /// Find all points within `radius` of `center`.
    ///
    /// Results are retrieved with [`get_indices`][Self::get_indices] and
    /// [`get_radii`][Self::get_radii].
    pub fn search_center_radius(&mut self, center: &[N], radius: N) -> Result<()> {
        let tree = self.tree.as_ref().ok_or(KDTreeError::NotBuilt).map_err(rejected)?;
        tree.search_into(center, radius, &mut self.radius_results)
            .map_err(rejected)
    }

    /// Indices of the points found by the last radius search.
    pub fn get_indices(&self) -> &[u32] {
        self.radius_results.indices()
    }

    /// Distances from the center of the points found by the last radius search, parallel to
    /// [`get_indices`][Self::get_indices].
    pub fn get_radii(&self) -> &[N] {
        self.radius_results.distances()
    }

    /// Find all pairs of points within `radius` of each other.
    pub fn neighbor_search(&mut self, radius: N) -> Result<()> {
        let tree = self.tree.as_ref().ok_or(KDTreeError::NotBuilt).map_err(rejected)?;
        tree.neighbor_search_into(radius, &mut self.pair_results);
        Ok(())
    }

    /// Find all pairs of points within `radius` by brute force, without using the tree.
    pub fn neighbor_simple_search(&mut self, radius: N) -> Result<()> {
        let tree = self.tree.as_ref().ok_or(KDTreeError::NotBuilt).map_err(rejected)?;
        tree.neighbor_simple_search_into(radius, &mut self.pair_results);
        Ok(())
    }

    /// The flat `[a0, b0, a1, b1, ...]` indices of the pairs found by the last all-pairs search.
    ///
    /// Reshape to `M x 2`, or use [`neighbor_get_pairs`][Self::neighbor_get_pairs].
    pub fn neighbor_get_indices(&self) -> &[u32] {
        self.pair_results.indices()
    }

    /// The pairs found by the last all-pairs search.
    pub fn neighbor_get_pairs(&self) -> &[[u32; 2]] {
        self.pair_results.pairs()
    }

    /// The distance of each pair found by the last all-pairs search.
    pub fn neighbor_get_radii(&self) -> &[N] {
        self.pair_results.distances()
    }

    /// The full results of the last radius search.
    pub fn radius_results(&self) -> &RadiusResults<N> {
        &self.radius_results
    }

    /// The full results of the last all-pairs search.
    pub fn pair_results(&self) -> &PairResults<N> {
        &self.pair_results
    }
}

fn check_count(count: usize) -> Result<()> {
    if count == 0 {
        return Err(rejected(KDTreeError::Shape(
            "Expected at least one point.".to_string(),
        )));
    }
    Ok(())
}

fn rejected(err: KDTreeError) -> KDTreeError {
    debug!(%err, "rejected input");
    err
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test::random_coords;

    #[test]
    fn queries_before_data_fail() {
        let mut searcher = NeighborSearcher::<f32>::new(3, 10).unwrap();
        assert_eq!(
            searcher.search_center_radius(&[0., 0., 0.], 1.),
            Err(KDTreeError::NotBuilt)
        );
        assert_eq!(searcher.neighbor_search(1.), Err(KDTreeError::NotBuilt));
        assert_eq!(searcher.neighbor_simple_search(1.), Err(KDTreeError::NotBuilt));
        assert!(!searcher.is_built());
    }

    #[test]
    fn rejects_invalid_configuration() {
        assert!(matches!(
            NeighborSearcher::<f32>::new(0, 1),
            Err(KDTreeError::InvalidInput(_))
        ));
        assert!(matches!(
            NeighborSearcher::<f32>::new(3, 0),
            Err(KDTreeError::InvalidInput(_))
        ));
    }

    #[test]
    fn rejects_bad_shapes() {
        let coords = [0.0f32; 6];
        let mut searcher = NeighborSearcher::new(3, 1).unwrap();
        assert!(matches!(
            searcher.set_data(&coords, 0),
            Err(KDTreeError::Shape(_))
        ));
        assert!(matches!(
            searcher.set_data(&coords, 3),
            Err(KDTreeError::Shape(_))
        ));
        assert!(matches!(
            searcher.set_coords(&coords, &[6]),
            Err(KDTreeError::Shape(_))
        ));
        assert!(matches!(
            searcher.set_coords(&coords, &[3, 2]),
            Err(KDTreeError::Shape(_))
        ));
        assert!(!searcher.is_built());

        searcher.set_coords(&coords, &[2, 3]).unwrap();
        assert!(searcher.is_built());
    }

    #[test]
    fn rejects_wrong_precision() {
        let wide = [0.0f64; 6];
        let coords = [0.0f32, 0.0, 0.0, 1.0, 1.0, 1.0];
        let mut searcher = NeighborSearcher::<f32>::new(3, 1).unwrap();

        let bytes: &[u8] = bytemuck::cast_slice(&wide);
        assert_eq!(
            searcher.set_data_bytes(bytes, CoordType::Float64, 2),
            Err(KDTreeError::Type {
                expected: CoordType::Float32,
                actual: CoordType::Float64,
            })
        );

        let bytes: &[u8] = bytemuck::cast_slice(&coords);
        searcher
            .set_data_bytes(bytes, CoordType::Float32, 2)
            .unwrap();
        searcher.neighbor_search(2.0).unwrap();
        assert_eq!(searcher.neighbor_get_pairs(), &[[0, 1]]);
    }

    #[test]
    fn failed_calls_keep_previous_results() {
        let coords = random_coords(100, 3, 9);
        let short = [0.0f32; 5];
        let mut searcher = NeighborSearcher::new(3, 4).unwrap();
        searcher.set_data(&coords, 100).unwrap();

        searcher.search_center_radius(&coords[0..3], 0.3).unwrap();
        let indices = searcher.get_indices().to_vec();
        let radii = searcher.get_radii().to_vec();
        assert!(!indices.is_empty());

        assert!(matches!(
            searcher.search_center_radius(&[0.5, 0.5], 0.3),
            Err(KDTreeError::Shape(_))
        ));
        assert_eq!(searcher.get_indices(), &indices[..]);
        assert_eq!(searcher.get_radii(), &radii[..]);

        assert!(searcher.set_data(&short, 2).is_err());
        assert_eq!(searcher.tree().unwrap().num_items(), 100);
        assert_eq!(searcher.get_indices(), &indices[..]);
    }

    #[test]
    fn flat_indices_reshape_to_pairs() {
        let coords = random_coords(200, 2, 4);
        let mut searcher = NeighborSearcher::new(2, 10).unwrap();
        searcher.set_data(&coords, 200).unwrap();
        searcher.neighbor_search(0.1).unwrap();

        let flat = searcher.neighbor_get_indices();
        let pairs = searcher.neighbor_get_pairs();
        assert_eq!(flat.len(), 2 * pairs.len());
        assert_eq!(pairs.len(), searcher.neighbor_get_radii().len());
        for (chunk, pair) in flat.chunks(2).zip(pairs) {
            assert_eq!(chunk, pair);
        }

        let tree_pairs = searcher.pair_results().clone();
        searcher.neighbor_simple_search(0.1).unwrap();
        assert_eq!(searcher.pair_results().len(), tree_pairs.len());
    }
}
