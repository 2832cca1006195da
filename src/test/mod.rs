//! Shared fixtures and brute-force cross-checks.

use std::collections::HashSet;

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::kdtree::{KDTreeBuilder, KDTreeIndex};
use crate::points::{sq_dist, PointSet};
use crate::NeighborSearcher;

/// `count` uniformly random points in `[0, 1)^dim`, reproducible from `seed`.
pub(crate) fn random_coords(count: usize, dim: usize, seed: u64) -> Vec<f32> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count * dim).map(|_| rng.gen::<f32>()).collect()
}

fn brute_force_radius(points: &PointSet<'_, f32>, center: &[f32], radius: f32) -> HashSet<u32> {
    let r2 = radius * radius;
    (0..points.len())
        .filter(|&i| sq_dist(points.point(i), center) <= r2)
        .map(|i| i as u32)
        .collect()
}

fn brute_force_pairs(points: &PointSet<'_, f32>, radius: f32) -> HashSet<[u32; 2]> {
    let r2 = radius * radius;
    let mut pairs = HashSet::new();
    for i in 0..points.len() {
        for j in i + 1..points.len() {
            if sq_dist(points.point(i), points.point(j)) <= r2 {
                pairs.insert([i as u32, j as u32]);
            }
        }
    }
    pairs
}

#[test]
fn fixed_radius_scenario() {
    let (count, dim, bucket_size, radius) = (1000, 3, 10, 0.05f32);
    let coords = random_coords(count, dim, 42);

    let mut searcher = NeighborSearcher::new(dim, bucket_size).unwrap();
    searcher.set_data(&coords, count).unwrap();
    let points = searcher.tree().unwrap().point_set();

    searcher.neighbor_search(radius).unwrap();
    let tree_count = searcher.neighbor_get_radii().len();
    searcher.neighbor_simple_search(radius).unwrap();
    let simple_count = searcher.neighbor_get_radii().len();
    assert_eq!(tree_count, simple_count);
    assert_eq!(tree_count, brute_force_pairs(&points, radius).len());

    let center = points.point(0);
    searcher.search_center_radius(center, radius).unwrap();
    let expected = brute_force_radius(&points, center, radius);
    assert_eq!(searcher.get_indices().len(), expected.len());
    assert!(searcher.get_indices().contains(&0));
}

#[test]
fn radius_search_matches_brute_force() {
    let mut rng = StdRng::seed_from_u64(1);
    for (count, dim, bucket_size) in [(1, 1, 1), (50, 1, 3), (500, 2, 1), (500, 3, 10), (300, 6, 7)]
    {
        let coords = random_coords(count, dim, count as u64 + dim as u64);
        let tree = KDTreeBuilder::new_with_bucket_size(dim, bucket_size)
            .build(&coords, count)
            .unwrap();

        for _ in 0..20 {
            let center: Vec<f32> = (0..dim).map(|_| rng.gen_range(-0.2..1.2)).collect();
            let radius = rng.gen_range(0.0..0.4);
            let result = tree.search(&center, radius).unwrap();
            let found: HashSet<u32> = result.indices().iter().copied().collect();
            assert_eq!(found.len(), result.len(), "no duplicate results");
            assert_eq!(found, brute_force_radius(tree.points(), &center, radius));
        }
    }
}

#[test]
fn empty_point_set() {
    let tree = KDTreeBuilder::<f32>::new_with_bucket_size(3, 10)
        .build(&[], 0)
        .unwrap();
    assert!(tree.search(&[0., 0., 0.], 1.).unwrap().is_empty());
    assert!(tree.neighbor_search(1.).is_empty());
    assert!(tree.neighbor_simple_search(1.).is_empty());
}

#[test]
fn coincident_points() {
    let coords = vec![0.25f32; 2 * 30];
    let tree = KDTreeBuilder::new_with_bucket_size(2, 4)
        .build(&coords, 30)
        .unwrap();

    assert_eq!(tree.neighbor_search(0.).len(), 30 * 29 / 2);
    assert_eq!(tree.search(&[0.25, 0.25], 0.).unwrap().len(), 30);
    assert!(tree.search(&[0.5, 0.25], 0.1).unwrap().is_empty());
}

#[test]
fn nan_coordinates_never_match() {
    let coords = [0.0f32, 0.0, f32::NAN, 0.0, 0.1, 0.0];
    let tree = KDTreeBuilder::new(2).build(&coords, 3).unwrap();
    let result = tree.search(&[0., 0.], 1.).unwrap();
    assert_eq!(result.indices(), &[0, 2]);
    assert_eq!(tree.neighbor_search(1.).pairs(), &[[0, 2]]);
}

proptest! {
    #[test]
    fn pair_search_matches_brute_force(
        count in 0usize..200,
        dim in 1usize..5,
        bucket_size in 1usize..16,
        radius in 0.0f32..0.5,
        seed in any::<u64>(),
    ) {
        let coords = random_coords(count, dim, seed);
        let tree = KDTreeBuilder::new_with_bucket_size(dim, bucket_size)
            .build(&coords, count)
            .unwrap();

        let result = tree.neighbor_search(radius);
        let pairs: HashSet<[u32; 2]> = result.pairs().iter().copied().collect();
        prop_assert_eq!(pairs.len(), result.len());
        prop_assert!(result.pairs().iter().all(|[a, b]| a < b));
        prop_assert_eq!(pairs, brute_force_pairs(tree.points(), radius));
    }

    #[test]
    fn leaves_partition_points(
        count in 0usize..300,
        dim in 1usize..4,
        bucket_size in 1usize..20,
        seed in any::<u64>(),
    ) {
        let coords = random_coords(count, dim, seed);
        let tree = KDTreeBuilder::new_with_bucket_size(dim, bucket_size)
            .build(&coords, count)
            .unwrap();

        let mut seen = vec![0usize; count];
        let mut stack: Vec<_> = tree.root().into_iter().collect();
        while let Some(node) = stack.pop() {
            match node.children() {
                Some([left, right]) => {
                    stack.push(left);
                    stack.push(right);
                }
                None => {
                    prop_assert!(node.indices().len() <= bucket_size);
                    for &id in node.indices() {
                        seen[id as usize] += 1;
                    }
                }
            }
        }
        prop_assert!(seen.iter().all(|&n| n == 1));
    }
}
