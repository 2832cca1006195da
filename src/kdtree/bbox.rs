use crate::points::PointSet;
use crate::r#type::IndexableFloat;

/// A tight axis-aligned bounding box in `dim` dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundingBox<N: IndexableFloat> {
    min: Box<[N]>,
    max: Box<[N]>,
}

impl<N: IndexableFloat> BoundingBox<N> {
    /// The minimal box enclosing the points at `ids`.
    ///
    /// NaN coordinates never widen the box.
    pub(crate) fn from_ids(points: &PointSet<'_, N>, ids: &[u32]) -> Self {
        let dim = points.dim();
        let mut min = vec![N::infinity(); dim];
        let mut max = vec![N::neg_infinity(); dim];
        for &id in ids {
            for (axis, &value) in points.point(id as usize).iter().enumerate() {
                if value < min[axis] {
                    min[axis] = value;
                }
                if value > max[axis] {
                    max[axis] = value;
                }
            }
        }
        Self {
            min: min.into_boxed_slice(),
            max: max.into_boxed_slice(),
        }
    }

    /// The lower corner.
    #[inline]
    pub fn min(&self) -> &[N] {
        &self.min
    }

    /// The upper corner.
    #[inline]
    pub fn max(&self) -> &[N] {
        &self.max
    }

    /// The extent `max - min` along `axis`.
    #[inline]
    pub fn spread(&self, axis: usize) -> N {
        self.max[axis] - self.min[axis]
    }

    /// The axis of maximum spread. Ties go to the lowest axis.
    pub fn widest_axis(&self) -> usize {
        let mut best_axis = 0;
        let mut best_spread = N::neg_infinity();
        for axis in 0..self.min.len() {
            let spread = self.spread(axis);
            if spread > best_spread {
                best_spread = spread;
                best_axis = axis;
            }
        }
        best_axis
    }

    /// Minimum squared distance from `point` to any point of this box.
    #[inline]
    pub fn min_sq_dist_to_point(&self, point: &[N]) -> N {
        let mut dist = N::zero();
        for (axis, &k) in point.iter().enumerate() {
            let d = axis_dist(k, self.min[axis], self.max[axis]);
            dist = dist + d * d;
        }
        dist
    }

    /// Minimum squared distance between any point of this box and any point of `other`.
    #[inline]
    pub fn min_sq_dist_to_box(&self, other: &Self) -> N {
        let mut dist = N::zero();
        for axis in 0..self.min.len() {
            let d = if other.min[axis] > self.max[axis] {
                other.min[axis] - self.max[axis]
            } else if self.min[axis] > other.max[axis] {
                self.min[axis] - other.max[axis]
            } else {
                N::zero()
            };
            dist = dist + d * d;
        }
        dist
    }
}

/// 1D distance from a value to a range.
#[inline]
fn axis_dist<N: IndexableFloat>(k: N, min: N, max: N) -> N {
    if k < min {
        min - k
    } else if k <= max {
        N::zero()
    } else {
        k - max
    }
}
