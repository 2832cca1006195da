//! Fixed-radius all-pairs search over a single tree.
//!
//! The search walks pairs of nodes with an explicit work stack, starting from the root paired
//! with itself. A node paired with itself checks its contents against themselves; two distinct
//! nodes cover disjoint sets of points, so no pair is produced twice.

#[cfg(feature = "rayon")]
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use tinyvec::ArrayVec;

use crate::kdtree::node::KDNode;
use crate::kdtree::r#trait::is_valid_radius;
use crate::kdtree::KDTreeIndex;
use crate::points::{sq_dist, PointSet};
use crate::r#type::IndexableFloat;
use crate::results::PairResults;

/// A unit of work, given as positions in the node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Task {
    /// All pairs with both points below this node.
    Within(usize),
    /// All pairs with one point below each of two distinct nodes.
    Between(usize, usize),
}

impl Default for Task {
    fn default() -> Self {
        Task::Within(0)
    }
}

type Subtasks = ArrayVec<[Task; 4]>;

pub(crate) struct PairSearch<'t, N: IndexableFloat> {
    points: &'t PointSet<'t, N>,
    ids: &'t [u32],
    nodes: &'t [KDNode<N>],
    r2: N,
}

impl<'t, N: IndexableFloat> PairSearch<'t, N> {
    /// `None` if the tree is empty or the radius can match nothing.
    pub(crate) fn new<T: KDTreeIndex<N>>(tree: &'t T, radius: N) -> Option<Self> {
        if tree.nodes().is_empty() || !is_valid_radius(radius) {
            return None;
        }
        Some(Self {
            points: tree.points(),
            ids: tree.indices(),
            nodes: tree.nodes(),
            r2: radius * radius,
        })
    }

    pub(crate) fn run(&self, results: &mut PairResults<N>) {
        self.run_from(Task::Within(0), results);
    }

    /// Process `task` depth-first, subtasks in order.
    fn run_from(&self, task: Task, results: &mut PairResults<N>) {
        let mut stack = vec![task];
        while let Some(task) = stack.pop() {
            let subtasks = self.expand(task, results);
            // Note: these are pushed in backwards order to what gets popped
            stack.extend(subtasks.iter().rev().copied());
        }
    }

    /// Split the top of the recursion into independent tasks, run them on the rayon pool and
    /// concatenate their results in task order.
    #[cfg(feature = "rayon")]
    pub(crate) fn par_run(&self, results: &mut PairResults<N>) {
        let target = rayon::current_num_threads() * 8;
        let mut frontier = vec![Task::Within(0)];

        loop {
            let mut next = Vec::with_capacity(frontier.len() * 4);
            let mut expanded = false;
            for &task in &frontier {
                if self.is_terminal(task) {
                    next.push(task);
                } else {
                    // Non-terminal tasks never emit pairs, only subtasks
                    next.extend(self.expand(task, results).iter().copied());
                    expanded = true;
                }
            }
            frontier = next;
            if !expanded || frontier.len() >= target {
                break;
            }
        }

        let mut buffers: Vec<PairResults<N>> = frontier
            .par_iter()
            .map(|&task| {
                let mut buffer = PairResults::new();
                self.run_from(task, &mut buffer);
                buffer
            })
            .collect();

        for buffer in buffers.iter_mut() {
            results.append(buffer);
        }
    }

    /// A task is terminal when it tests points directly instead of producing subtasks.
    #[cfg(feature = "rayon")]
    fn is_terminal(&self, task: Task) -> bool {
        match task {
            Task::Within(a) => self.nodes[a].is_leaf(),
            Task::Between(a, b) => self.nodes[a].is_leaf() && self.nodes[b].is_leaf(),
        }
    }

    /// Either test the points of a terminal task into `results`, or return its subtasks.
    fn expand(&self, task: Task, results: &mut PairResults<N>) -> Subtasks {
        let mut subtasks = Subtasks::new();
        match task {
            Task::Within(a) => match &self.nodes[a] {
                KDNode::Leaf { start, end, .. } => self.pairs_within(*start, *end, results),
                KDNode::Internal { left, right, .. } => {
                    subtasks.push(Task::Within(*left));
                    subtasks.push(Task::Within(*right));
                    subtasks.push(Task::Between(*left, *right));
                }
            },
            Task::Between(a, b) => {
                let (node_a, node_b) = (&self.nodes[a], &self.nodes[b]);
                if node_a.bbox().min_sq_dist_to_box(node_b.bbox()) > self.r2 {
                    return subtasks;
                }
                match (node_a, node_b) {
                    (
                        KDNode::Leaf {
                            start: start_a,
                            end: end_a,
                            ..
                        },
                        KDNode::Leaf {
                            start: start_b,
                            end: end_b,
                            ..
                        },
                    ) => self.pairs_between(*start_a..*end_a, *start_b..*end_b, results),
                    (KDNode::Internal { left, right, .. }, KDNode::Leaf { .. }) => {
                        subtasks.push(Task::Between(*left, b));
                        subtasks.push(Task::Between(*right, b));
                    }
                    (KDNode::Leaf { .. }, KDNode::Internal { left, right, .. }) => {
                        subtasks.push(Task::Between(a, *left));
                        subtasks.push(Task::Between(a, *right));
                    }
                    (
                        KDNode::Internal {
                            left: left_a,
                            right: right_a,
                            ..
                        },
                        KDNode::Internal {
                            left: left_b,
                            right: right_b,
                            ..
                        },
                    ) => {
                        subtasks.push(Task::Between(*left_a, *left_b));
                        subtasks.push(Task::Between(*left_a, *right_b));
                        subtasks.push(Task::Between(*right_a, *left_b));
                        subtasks.push(Task::Between(*right_a, *right_b));
                    }
                }
            }
        }
        subtasks
    }

    /// All unordered pairs inside one bucket.
    fn pairs_within(&self, start: usize, end: usize, results: &mut PairResults<N>) {
        let bucket = &self.ids[start..end];
        for (i, &a) in bucket.iter().enumerate() {
            let point_a = self.points.point(a as usize);
            for &b in &bucket[i + 1..] {
                self.test(a, point_a, b, results);
            }
        }
    }

    /// All pairs with one point in each of two buckets.
    fn pairs_between(
        &self,
        range_a: std::ops::Range<usize>,
        range_b: std::ops::Range<usize>,
        results: &mut PairResults<N>,
    ) {
        for &a in &self.ids[range_a] {
            let point_a = self.points.point(a as usize);
            for &b in &self.ids[range_b.clone()] {
                self.test(a, point_a, b, results);
            }
        }
    }

    #[inline]
    fn test(&self, a: u32, point_a: &[N], b: u32, results: &mut PairResults<N>) {
        let d = sq_dist(point_a, self.points.point(b as usize));
        if d <= self.r2 {
            results.push(a, b, d.sqrt());
        }
    }
}
