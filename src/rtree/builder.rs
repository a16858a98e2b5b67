use geo_traits::CoordTrait;

use crate::error::Result;
use crate::r#type::{IndexableNum, PointId};
use crate::rectangle::coord_to_vec;
use crate::rtree::index::RStarTree;
use crate::rtree::params::RStarParams;

/// A builder to create an [`RStarTree`].
///
/// Points are buffered in insertion order; [`RStarTreeBuilder::finish`] seeds the root leaf with
/// the first `M - 1` of them and inserts the rest one at a time.
///
/// ```
/// use rstar_index::rtree::RStarTreeBuilder;
///
/// let mut builder = RStarTreeBuilder::<f64>::new();
/// builder.add(0, vec![0., 0.]);
/// builder.add(1, vec![1., 1.]);
/// builder.add(2, vec![2., 2.]);
/// let tree = builder.finish().unwrap();
/// assert_eq!(tree.num_points(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct RStarTreeBuilder<N: IndexableNum> {
    params: RStarParams,
    points: Vec<(PointId, Vec<N>)>,
}

impl<N: IndexableNum> RStarTreeBuilder<N> {
    /// Create a new builder with the default parameters.
    pub fn new() -> Self {
        Self::new_with_params(RStarParams::default())
    }

    /// Create a new builder with the provided parameters.
    pub fn new_with_params(params: RStarParams) -> Self {
        Self {
            params,
            points: vec![],
        }
    }

    /// Access the parameters the tree will be built with.
    pub fn params(&self) -> &RStarParams {
        &self.params
    }

    /// Add a point. Coordinates are validated when the tree is built.
    #[inline]
    pub fn add(&mut self, id: PointId, coord: Vec<N>) {
        self.points.push((id, coord));
    }

    /// Add any [`CoordTrait`] implementation as a point.
    #[inline]
    pub fn add_coord(&mut self, id: PointId, coord: &impl CoordTrait<T = N>) {
        self.add(id, coord_to_vec(coord));
    }

    /// Consume this builder, inserting every added point.
    ///
    /// Fails with [`crate::RStarIndexError::InvalidNode`] if no point was added, or with the
    /// first validation error among the points.
    pub fn finish(self) -> Result<RStarTree<N>> {
        log::debug!(
            "building R*-tree from {} points with {:?}",
            self.points.len(),
            self.params
        );
        RStarTree::try_new(self.params, self.points)
    }
}

impl<N: IndexableNum> Default for RStarTreeBuilder<N> {
    fn default() -> Self {
        Self::new()
    }
}
