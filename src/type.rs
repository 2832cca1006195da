use std::cmp::Ordering;
use std::fmt::Debug;

use num_traits::Float;

/// A trait for types that can be used for indexed coordinates.
///
/// This trait is sealed and cannot be implemented for external types. Only `f32` (the boundary
/// contract) and `f64` are supported.
pub trait IndexableFloat:
    private::Sealed + Float + Debug + Default + Send + Sync + bytemuck::Pod
{
    /// The runtime tag of this coordinate type
    const COORD_TYPE: CoordType;
    /// The number of bytes per element
    const BYTES_PER_ELEMENT: usize;

    /// A total order over all values, including NaN, so that median selection is deterministic.
    fn total_cmp(&self, other: &Self) -> Ordering;
}

impl IndexableFloat for f32 {
    const COORD_TYPE: CoordType = CoordType::Float32;
    const BYTES_PER_ELEMENT: usize = 4;

    #[inline]
    fn total_cmp(&self, other: &Self) -> Ordering {
        f32::total_cmp(self, other)
    }
}

impl IndexableFloat for f64 {
    const COORD_TYPE: CoordType = CoordType::Float64;
    const BYTES_PER_ELEMENT: usize = 8;

    #[inline]
    fn total_cmp(&self, other: &Self) -> Ordering {
        f64::total_cmp(self, other)
    }
}

/// An enum over the allowed coordinate types in the spatial index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoordType {
    Float32,
    Float64,
}

impl CoordType {
    /// The number of bytes per element of this coordinate type.
    pub fn bytes_per_element(&self) -> usize {
        match self {
            CoordType::Float32 => f32::BYTES_PER_ELEMENT,
            CoordType::Float64 => f64::BYTES_PER_ELEMENT,
        }
    }
}

// https://rust-lang.github.io/api-guidelines/future-proofing.html#sealed-traits-protect-against-downstream-implementations-c-sealed
mod private {
    pub trait Sealed {}

    impl Sealed for f32 {}
    impl Sealed for f64 {}
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn total_cmp_orders_nan_last() {
        assert_eq!(IndexableFloat::total_cmp(&1.0f32, &f32::NAN), Ordering::Less);
        assert_eq!(IndexableFloat::total_cmp(&2.0f64, &1.0), Ordering::Greater);
    }

    #[test]
    fn coord_type_sizes() {
        assert_eq!(CoordType::Float32.bytes_per_element(), 4);
        assert_eq!(CoordType::Float64.bytes_per_element(), 8);
        assert_eq!(f32::COORD_TYPE, CoordType::Float32);
    }
}
