//! Split heuristics for overflowing nodes.
//!
//! Both leaf and internal splits run in two phases. First, the split axis is the one with the
//! smallest sum of group margins over every candidate distribution. Then, along that axis, the
//! distribution with the smallest `(overlap, total volume)` wins.

#[cfg(feature = "rayon")]
use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::error::Result;
use crate::r#type::{IndexableNum, PointId};
use crate::rectangle::{bounding_box, bounding_box_points, empty_rectangle, Rectangle};
use crate::rtree::node::{Node, NodeContents};
use crate::rtree::params::RStarParams;
use crate::rtree::util::{cmp_coord, position_min};

/// Which bound of the children's keys an internal split ordered them by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitOrdering {
    /// Sorted by `minima[axis]`.
    Lower,
    /// Sorted by `maxima[axis]`.
    Upper,
}

/// The leaf's points as `(id, coordinates)`, stably sorted along `axis`.
fn points_along<N: IndexableNum>(node: &Node<N>, axis: usize) -> Vec<(PointId, &[N])> {
    let mut points: Vec<(PointId, &[N])> = node
        .points()
        .into_iter()
        .flatten()
        .map(|(id, coord)| (*id, coord.as_slice()))
        .collect();
    points.sort_by(|a, b| cmp_coord(a.1[axis], b.1[axis]));
    points
}

/// The children's keys, stably sorted along `axis` by the given bound.
fn keys_along<N: IndexableNum>(
    node: &Node<N>,
    axis: usize,
    ordering: SplitOrdering,
) -> Vec<&Rectangle<N>> {
    let mut keys: Vec<&Rectangle<N>> = node.children().iter().map(Node::key).collect();
    keys.sort_by(|a, b| match ordering {
        SplitOrdering::Lower => cmp_coord(a.minima()[axis], b.minima()[axis]),
        SplitOrdering::Upper => cmp_coord(a.maxima()[axis], b.maxima()[axis]),
    });
    keys
}

fn points_key<N: IndexableNum>(points: &[(PointId, &[N])], dimension: usize) -> Rectangle<N> {
    bounding_box_points(points.iter().map(|(_, coord)| *coord))
        .unwrap_or_else(|| empty_rectangle(dimension))
}

fn keys_key<N: IndexableNum>(keys: &[&Rectangle<N>], dimension: usize) -> Rectangle<N> {
    bounding_box(keys.iter().copied()).unwrap_or_else(|| empty_rectangle(dimension))
}

/// Evaluate `margin` on every axis, in axis order.
fn axis_margins<N, F>(dimension: usize, margin: F) -> Vec<N>
where
    N: IndexableNum,
    F: Fn(usize) -> N + Send + Sync,
{
    #[cfg(feature = "rayon")]
    {
        (0..dimension).into_par_iter().map(margin).collect()
    }

    #[cfg(not(feature = "rayon"))]
    {
        (0..dimension).map(margin).collect()
    }
}

/// The axis along which to split an overflowing leaf.
pub fn choose_split_axis_leaf<N: IndexableNum>(node: &Node<N>, params: &RStarParams) -> usize {
    let dimension = node.key().dimension();
    let margins = axis_margins(dimension, |axis| {
        let sorted = points_along(node, axis);
        params
            .split_group_sizes()
            .fold(N::zero(), |acc, k| {
                let first = points_key(&sorted[..k], dimension);
                let second = points_key(&sorted[k..], dimension);
                acc + first.perimeter() + second.perimeter()
            })
    });
    position_min(margins).unwrap_or(0)
}

/// The size of the first group when splitting an overflowing leaf along `axis`.
pub fn choose_split_index_leaf<N: IndexableNum>(
    node: &Node<N>,
    axis: usize,
    params: &RStarParams,
) -> usize {
    let dimension = node.key().dimension();
    let sorted = points_along(node, axis);
    let sizes: Vec<usize> = params.split_group_sizes().collect();
    let scores = sizes.iter().map(|&k| {
        let first = points_key(&sorted[..k], dimension);
        let second = points_key(&sorted[k..], dimension);
        (
            first.intersection_volume(&second),
            first.volume() + second.volume(),
        )
    });
    position_min(scores).map_or(params.min_entries(), |best| sizes[best])
}

/// The axis along which to split an overflowing internal node.
///
/// Each distribution contributes the margins of both the by-lower-bound and by-upper-bound
/// groupings.
pub fn choose_split_axis<N: IndexableNum>(node: &Node<N>, params: &RStarParams) -> usize {
    let dimension = node.key().dimension();
    let margins = axis_margins(dimension, |axis| {
        let by_lower = keys_along(node, axis, SplitOrdering::Lower);
        let by_upper = keys_along(node, axis, SplitOrdering::Upper);
        params
            .split_group_sizes()
            .fold(N::zero(), |acc, k| {
                acc + keys_key(&by_lower[..k], dimension).perimeter()
                    + keys_key(&by_lower[k..], dimension).perimeter()
                    + keys_key(&by_upper[..k], dimension).perimeter()
                    + keys_key(&by_upper[k..], dimension).perimeter()
            })
    });
    position_min(margins).unwrap_or(0)
}

/// The size of the first group, and the ordering it applies to, when splitting an overflowing
/// internal node along `axis`.
pub fn choose_split_index<N: IndexableNum>(
    node: &Node<N>,
    axis: usize,
    params: &RStarParams,
) -> (usize, SplitOrdering) {
    let dimension = node.key().dimension();
    let by_lower = keys_along(node, axis, SplitOrdering::Lower);
    let by_upper = keys_along(node, axis, SplitOrdering::Upper);

    let mut candidates = vec![];
    let mut scores = vec![];
    for k in params.split_group_sizes() {
        for (ordering, keys) in [
            (SplitOrdering::Lower, &by_lower),
            (SplitOrdering::Upper, &by_upper),
        ] {
            let first = keys_key(&keys[..k], dimension);
            let second = keys_key(&keys[k..], dimension);
            candidates.push((k, ordering));
            scores.push((
                first.intersection_volume(&second),
                first.volume() + second.volume(),
            ));
        }
    }

    position_min(scores).map_or((params.min_entries(), SplitOrdering::Lower), |best| {
        candidates[best]
    })
}

/// Split an overflowing node (holding `M + 1` entries) into two nodes of the same kind.
pub(crate) fn split_node<N: IndexableNum>(
    node: Node<N>,
    params: &RStarParams,
) -> Result<(Node<N>, Node<N>)> {
    debug_assert_eq!(node.entry_count(), params.max_entries() + 1);

    if node.is_leaf() {
        let axis = choose_split_axis_leaf(&node, params);
        let index = choose_split_index_leaf(&node, axis, params);
        log::debug!("splitting leaf along axis {} at {}", axis, index);

        let NodeContents::Leaf(points) = node.into_contents() else {
            unreachable!("checked is_leaf above");
        };
        let mut first: Vec<(PointId, Vec<N>)> = points.into_iter().collect();
        first.sort_by(|a, b| cmp_coord(a.1[axis], b.1[axis]));
        let second = first.split_off(index);
        Ok((
            Node::new_leaf(first.into_iter().collect())?,
            Node::new_leaf(second.into_iter().collect())?,
        ))
    } else {
        let axis = choose_split_axis(&node, params);
        let (index, ordering) = choose_split_index(&node, axis, params);
        log::debug!(
            "splitting internal node along axis {} at {} ({:?} bound)",
            axis,
            index,
            ordering
        );

        let NodeContents::Internal(mut first) = node.into_contents() else {
            unreachable!("checked is_leaf above");
        };
        first.sort_by(|a, b| match ordering {
            SplitOrdering::Lower => cmp_coord(a.key().minima()[axis], b.key().minima()[axis]),
            SplitOrdering::Upper => cmp_coord(a.key().maxima()[axis], b.key().maxima()[axis]),
        });
        let second = first.split_off(index);
        Ok((Node::new_internal(first)?, Node::new_internal(second)?))
    }
}
