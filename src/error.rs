use std::fmt::Debug;
use thiserror::Error;

use crate::r#type::CoordType;

/// Enum with all errors in this crate.
///
/// Every variant describes invalid caller input. Validation runs before a tree or a result buffer
/// is touched, so a failed call never leaves partial state behind.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KDTreeError {
    /// Wrong array rank, dimension or length.
    #[error("Shape error: {0}")]
    Shape(String),

    /// Coordinates were supplied with the wrong element precision.
    #[error("Type error: expected {expected:?} coordinates, got {actual:?}")]
    Type {
        /// The coordinate type the tree was configured with.
        expected: CoordType,
        /// The coordinate type the caller supplied.
        actual: CoordType,
    },

    /// Invalid configuration, such as a zero dimension or bucket size.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A query was issued before any point set was specified.
    #[error("No point set specified")]
    NotBuilt,
}

pub type Result<T> = std::result::Result<T, KDTreeError>;
