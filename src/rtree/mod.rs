//! An incremental R*-tree over points.
//!
//! Points are inserted one at a time. Each insertion descends to the leaf that needs the least
//! overlap and volume enlargement; overflowing nodes either reinsert their farthest entries once
//! per level per insertion, or split along the axis with the smallest total margin.

mod builder;
pub mod choose;
mod index;
mod level;
mod node;
mod params;
pub mod split;
mod traversal;
pub mod util;

pub use builder::RStarTreeBuilder;
pub use index::RStarTree;
pub use level::LevelActions;
pub use node::Node;
pub use params::{RStarParams, DEFAULT_MAX_ENTRIES};
pub use traversal::Nodes;
