#![doc = include_str!("../README.md")]

mod error;
pub mod kdtree;
mod points;
mod results;
mod searcher;
mod r#type;

pub use error::{KDTreeError, Result};
pub use points::{sq_dist, PointSet};
pub use r#type::{CoordType, IndexableFloat};
pub use results::{PairResults, RadiusResults};
pub use searcher::NeighborSearcher;

#[cfg(test)]
pub(crate) mod test;
