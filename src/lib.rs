//! A dynamic R*-tree spatial index over points in any number of dimensions.
//!
//! Points carry a caller-assigned [`PointId`] and are inserted one at a time. The tree keeps
//! itself balanced with the R* heuristics: least-enlargement subtree choice, forced reinsertion
//! of a node's farthest entries on first overflow, and margin-driven splits.
//!
//! ```
//! use rstar_index::rtree::{RStarParams, RStarTreeBuilder};
//!
//! let mut builder = RStarTreeBuilder::new_with_params(RStarParams::new(8).unwrap());
//! for i in 0..100u64 {
//!     builder.add(i, vec![(i % 10) as f64, (i / 10) as f64, 0.5]);
//! }
//! let mut tree = builder.finish().unwrap();
//! tree.insert(100, vec![-1., -1., 0.]).unwrap();
//!
//! assert_eq!(tree.num_points(), 101);
//! assert_eq!(tree.root().key().minima(), &[-1., -1., 0.]);
//! ```

mod error;
mod rectangle;
pub mod rtree;
mod r#type;

pub use error::{RStarIndexError, Result};
pub use r#type::{IndexableNum, PointId, PointMap};
pub use rectangle::{
    are_bounds_rectangular, bounding_box, bounding_box_points, coord_to_vec, empty_rectangle,
    point_to_center_distance_squared, rectangle_perimeter, Rectangle,
};

#[cfg(test)]
pub(crate) mod test;
