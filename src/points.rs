//! A borrowed, immutable view over caller-supplied point coordinates.

use bytemuck::try_cast_slice;

use crate::error::{KDTreeError, Result};
use crate::r#type::{CoordType, IndexableFloat};

/// An immutable view over `count` points of `dim` coordinates each, stored row-major in a flat
/// buffer.
///
/// The view never copies or reorders the caller's coordinates. Points are identified by their
/// position in the buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointSet<'a, N: IndexableFloat> {
    coords: &'a [N],
    dim: usize,
    count: usize,
}

impl<'a, N: IndexableFloat> PointSet<'a, N> {
    /// Create a new view, validating that `coords.len() == count * dim`.
    pub fn try_new(coords: &'a [N], dim: usize, count: usize) -> Result<Self> {
        if dim < 1 {
            return Err(KDTreeError::InvalidInput(format!(
                "Dimension must be at least 1, got {}.",
                dim
            )));
        }
        let expected = count.checked_mul(dim).ok_or_else(|| {
            KDTreeError::Shape(format!("{} points of dimension {} overflow", count, dim))
        })?;
        if coords.len() != expected {
            return Err(KDTreeError::Shape(format!(
                "Expected {} coordinates for {} points of dimension {}, got {}.",
                expected,
                count,
                dim,
                coords.len()
            )));
        }
        if count > u32::MAX as usize {
            return Err(KDTreeError::Shape(format!(
                "At most {} points are supported, got {}.",
                u32::MAX,
                count
            )));
        }

        Ok(Self { coords, dim, count })
    }

    /// Create a new view over a raw byte buffer holding coordinates of type `coord_type`.
    ///
    /// Fails with [`KDTreeError::Type`] when `coord_type` is not `N`, and with
    /// [`KDTreeError::Shape`] when the buffer is misaligned or not a whole number of elements.
    pub fn try_from_bytes(
        data: &'a [u8],
        coord_type: CoordType,
        dim: usize,
        count: usize,
    ) -> Result<Self> {
        if coord_type != N::COORD_TYPE {
            return Err(KDTreeError::Type {
                expected: N::COORD_TYPE,
                actual: coord_type,
            });
        }
        let coords: &[N] = try_cast_slice(data).map_err(|err| {
            KDTreeError::Shape(format!("Cannot view buffer as {:?}: {}", coord_type, err))
        })?;
        Self::try_new(coords, dim, count)
    }

    /// The dimensionality of each point.
    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// The number of points.
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Returns `true` if the set holds no points.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// The underlying flat coordinate buffer.
    #[inline]
    pub fn coords(&self) -> &'a [N] {
        self.coords
    }

    /// The coordinates of the point at `index`.
    #[inline]
    pub fn point(&self, index: usize) -> &'a [N] {
        &self.coords[index * self.dim..(index + 1) * self.dim]
    }

    /// A single coordinate of the point at `index`.
    #[inline]
    pub(crate) fn coord(&self, index: usize, axis: usize) -> N {
        self.coords[index * self.dim + axis]
    }
}

/// Squared euclidean distance between two points of equal dimension.
#[inline]
pub fn sq_dist<N: IndexableFloat>(a: &[N], b: &[N]) -> N {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b).fold(N::zero(), |acc, (&a, &b)| {
        let d = a - b;
        acc + d * d
    })
}
