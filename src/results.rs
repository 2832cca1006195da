//! Reusable result buffers for radius and pair queries.
//!
//! A buffer is cleared at the start of every query that writes into it, so one buffer can serve
//! many queries without reallocating. Each concurrent caller needs its own buffer.

use bytemuck::cast_slice;

use crate::r#type::IndexableFloat;

/// Results of a radius query: parallel sequences of point indices and distances.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RadiusResults<N: IndexableFloat> {
    indices: Vec<u32>,
    distances: Vec<N>,
}

impl<N: IndexableFloat> RadiusResults<N> {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self {
            indices: Vec::new(),
            distances: Vec::new(),
        }
    }

    /// Create an empty buffer with room for `capacity` results.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            indices: Vec::with_capacity(capacity),
            distances: Vec::with_capacity(capacity),
        }
    }

    /// Indices of the matching points. `indices()[i]` corresponds to `distances()[i]`.
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Distances of the matching points from the query center.
    pub fn distances(&self) -> &[N] {
        &self.distances
    }

    /// The number of results.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Returns `true` if there are no results.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Iterate over `(index, distance)` results.
    pub fn iter(&self) -> impl Iterator<Item = (u32, N)> + '_ {
        self.indices.iter().copied().zip(self.distances.iter().copied())
    }

    /// Remove all results, keeping the allocation.
    pub fn clear(&mut self) {
        self.indices.clear();
        self.distances.clear();
    }

    /// Consume the buffer, returning the index and distance vectors.
    pub fn into_parts(self) -> (Vec<u32>, Vec<N>) {
        (self.indices, self.distances)
    }

    #[inline]
    pub(crate) fn push(&mut self, index: u32, distance: N) {
        self.indices.push(index);
        self.distances.push(distance);
    }
}

/// Results of an all-pairs query.
///
/// Pairs are stored flat as `[a0, b0, a1, b1, ...]` with `a < b` in every pair.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PairResults<N: IndexableFloat> {
    indices: Vec<u32>,
    distances: Vec<N>,
}

impl<N: IndexableFloat> PairResults<N> {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self {
            indices: Vec::new(),
            distances: Vec::new(),
        }
    }

    /// The flat pair indices, of length `2 * len()`.
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// The same memory as [`indices`][Self::indices], viewed as `len()` pairs.
    pub fn pairs(&self) -> &[[u32; 2]] {
        cast_slice(&self.indices)
    }

    /// The distance between the points of each pair.
    pub fn distances(&self) -> &[N] {
        &self.distances
    }

    /// The number of pairs.
    pub fn len(&self) -> usize {
        self.distances.len()
    }

    /// Returns `true` if there are no pairs.
    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }

    /// Iterate over `(a, b, distance)` results.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32, N)> + '_ {
        self.pairs()
            .iter()
            .zip(self.distances.iter())
            .map(|(&[a, b], &d)| (a, b, d))
    }

    /// Remove all results, keeping the allocation.
    pub fn clear(&mut self) {
        self.indices.clear();
        self.distances.clear();
    }

    /// Consume the buffer, returning the flat index and distance vectors.
    pub fn into_parts(self) -> (Vec<u32>, Vec<N>) {
        (self.indices, self.distances)
    }

    /// Push a pair in either order; it is stored with the smaller index first.
    #[inline]
    pub(crate) fn push(&mut self, a: u32, b: u32, distance: N) {
        let (a, b) = if a < b { (a, b) } else { (b, a) };
        self.indices.push(a);
        self.indices.push(b);
        self.distances.push(distance);
    }

    /// Move all pairs of `other` to the end of this buffer.
    #[cfg_attr(not(feature = "rayon"), allow(dead_code))]
    pub(crate) fn append(&mut self, other: &mut Self) {
        self.indices.append(&mut other.indices);
        self.distances.append(&mut other.distances);
    }
}
