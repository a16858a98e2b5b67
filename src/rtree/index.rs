//! The dynamic R*-tree and its insertion protocol.

use geo_traits::CoordTrait;

use crate::error::{RStarIndexError, Result};
use crate::r#type::{IndexableNum, PointId, PointMap};
use crate::rectangle::{check_dimension, coord_to_vec, point_to_center_distance_squared, Rectangle};
use crate::rtree::choose::choose_subtree;
use crate::rtree::level::LevelActions;
use crate::rtree::node::Node;
use crate::rtree::params::RStarParams;
use crate::rtree::split::split_node;
use crate::rtree::util::{cmp_coord, InsertionPath};

/// An entry waiting to be placed in the tree.
#[derive(Debug, Clone)]
enum Entry<N: IndexableNum> {
    /// A point, which always lands in a leaf.
    Point { id: PointId, coord: Vec<N> },
    /// A subtree removed by forced reinsertion. `height` is the height above the leaves of the
    /// node that must receive it.
    Child { node: Node<N>, height: usize },
}

impl<N: IndexableNum> Entry<N> {
    fn key(&self) -> Rectangle<N> {
        match self {
            Self::Point { coord, .. } => Rectangle::new_unchecked(coord.clone(), coord.clone()),
            Self::Child { node, .. } => node.key().clone(),
        }
    }

    fn target_height(&self) -> usize {
        match self {
            Self::Point { .. } => 0,
            Self::Child { height, .. } => *height,
        }
    }
}

/// A dynamic R*-tree over points in `d` dimensions.
///
/// The tree owns its root node. Points are added one at a time with [`RStarTree::insert`], which
/// descends to the best leaf, and on overflow either reinserts the entries farthest from the
/// node's center (once per level per insertion call) or splits the node, propagating splits
/// towards the root.
///
/// ```
/// use rstar_index::rtree::{RStarParams, RStarTree};
///
/// let params = RStarParams::new(4).unwrap();
/// let points = (0..20u64).map(|i| (i, vec![i as f64, (i * 7 % 5) as f64]));
/// let tree = RStarTree::try_new(params, points).unwrap();
/// assert_eq!(tree.num_points(), 20);
/// assert!(tree.height() > 1);
/// ```
#[derive(Debug, Clone)]
pub struct RStarTree<N: IndexableNum> {
    root: Node<N>,
    params: RStarParams,
    dimension: usize,
    level_actions: LevelActions,
}

impl<N: IndexableNum> RStarTree<N> {
    /// Create a tree from an initial, non-empty batch of points.
    ///
    /// The first `M - 1` points form the root leaf; the rest are inserted one at a time.
    pub fn try_new(
        params: RStarParams,
        points: impl IntoIterator<Item = (PointId, Vec<N>)>,
    ) -> Result<Self> {
        let mut points = points.into_iter();
        let initial: PointMap<N> = points
            .by_ref()
            .take(params.max_entries() - 1)
            .collect();
        let root = Node::new_leaf(initial)?;

        let mut tree = Self {
            dimension: root.key().dimension(),
            root,
            params,
            level_actions: LevelActions::new(),
        };
        for (id, coord) in points {
            tree.insert(id, coord)?;
        }
        Ok(tree)
    }

    /// The root node, for read-only traversal.
    pub fn root(&self) -> &Node<N> {
        &self.root
    }

    /// The fan-out parameters of this tree.
    pub fn params(&self) -> &RStarParams {
        &self.params
    }

    /// The number of axes of every indexed point.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// The levels that had forced reinsertion during the most recent insertion call.
    pub fn level_actions(&self) -> &LevelActions {
        &self.level_actions
    }

    /// The number of levels. A tree that is a single leaf has height 1.
    pub fn height(&self) -> usize {
        let mut height = 1;
        let mut node = &self.root;
        while let Some(child) = node.children().first() {
            height += 1;
            node = child;
        }
        height
    }

    /// Insert a point.
    ///
    /// Fails with [`RStarIndexError::DimensionMismatch`] or [`RStarIndexError::InvalidBounds`]
    /// before touching the tree if `coord` is not a valid point of this tree's dimension.
    pub fn insert(&mut self, id: PointId, coord: Vec<N>) -> Result<()> {
        check_dimension(self.dimension, coord.len())?;
        Rectangle::point(&coord)?;

        self.level_actions.reset();
        let mut pending = vec![Entry::Point { id, coord }];
        while let Some(entry) = pending.pop() {
            self.insert_entry(entry, &mut pending)?;
        }
        Ok(())
    }

    /// Insert any [`CoordTrait`] implementation as a point.
    pub fn insert_coord(&mut self, id: PointId, coord: &impl CoordTrait<T = N>) -> Result<()> {
        self.insert(id, coord_to_vec(coord))
    }

    /// Place one entry at its level, then treat any overflow it causes. Entries removed by
    /// forced reinsertion are pushed onto `pending`.
    fn insert_entry(&mut self, entry: Entry<N>, pending: &mut Vec<Entry<N>>) -> Result<()> {
        let target_level = self.height() - 1 - entry.target_height();
        let (path, level) = choose_subtree(&self.root, &entry.key(), target_level);
        debug_assert_eq!(level, target_level);

        let max_entries = self.params.max_entries();
        let overflowing = {
            let node = self.node_mut(&path)?;
            match entry {
                Entry::Point { id, coord } => node.add_point(id, coord)?,
                Entry::Child { node: child, .. } => node.add_child(child)?,
            }
            node.entry_count() > max_entries
        };

        if overflowing {
            self.treat_overflow(path, pending)
        } else {
            self.adjust_keys(&path)
        }
    }

    /// Resolve an overflow at `path`, walking up the path for as long as splits overflow the
    /// parent.
    ///
    /// A non-root node whose level has not yet been treated during this call gets forced
    /// reinsertion, which always ends the walk. Otherwise the node is split.
    fn treat_overflow(&mut self, mut path: InsertionPath, pending: &mut Vec<Entry<N>>) -> Result<()> {
        loop {
            let level = path.len();
            if level != 0 && !self.level_actions.is_treated(level) {
                self.level_actions.mark_treated(level);
                log::trace!("level {} treated", level);
                return self.reinsert(&path, pending);
            }

            self.split(&path)?;
            if path.pop().is_none() {
                // The root was split
                return Ok(());
            }
            if self.node_mut(&path)?.entry_count() <= self.params.max_entries() {
                return self.adjust_keys(&path);
            }
        }
    }

    /// Remove the `p` entries farthest from the center of the node at `path` and queue them so
    /// that the closest of them is reinserted first.
    fn reinsert(&mut self, path: &[usize], pending: &mut Vec<Entry<N>>) -> Result<()> {
        let count = self.params.reinsert_count();
        let height = self.height() - 1 - path.len();
        let node = self.node_mut(path)?;
        let key = node.key().clone();

        let removed: Vec<Entry<N>> = if node.is_leaf() {
            let mut by_distance: Vec<(PointId, N)> = node
                .points()
                .into_iter()
                .flatten()
                .map(|(id, coord)| (*id, point_to_center_distance_squared(coord, &key)))
                .collect();
            by_distance.sort_by(|a, b| cmp_coord(b.1, a.1));

            by_distance
                .into_iter()
                .take(count)
                .map(|(id, _)| {
                    node.remove_point(id)
                        .map(|coord| Entry::Point { id, coord })
                })
                .collect::<Result<_>>()?
        } else {
            let mut by_distance: Vec<(usize, N)> = node
                .children()
                .iter()
                .enumerate()
                .map(|(position, child)| (position, key.center_distance_squared(child.key())))
                .collect();
            by_distance.sort_by(|a, b| cmp_coord(b.1, a.1));

            // Farthest first; take from the highest position down so positions stay valid.
            let mut farthest: Vec<(usize, usize)> = by_distance
                .into_iter()
                .take(count)
                .enumerate()
                .map(|(rank, (position, _))| (rank, position))
                .collect();
            farthest.sort_by(|a, b| b.1.cmp(&a.1));
            let mut taken: Vec<(usize, Node<N>)> = farthest
                .into_iter()
                .map(|(rank, position)| (rank, node.take_child(position)))
                .collect();
            taken.sort_by_key(|(rank, _)| *rank);
            taken
                .into_iter()
                .map(|(_, child)| Entry::Child {
                    node: child,
                    height,
                })
                .collect()
        };

        log::debug!(
            "forced reinsertion of {} entries at level {}",
            removed.len(),
            path.len()
        );
        self.adjust_keys(path)?;
        pending.extend(removed);
        Ok(())
    }

    /// Split the node at `path`, replacing it in its parent by the two halves, or growing a new
    /// root above them.
    fn split(&mut self, path: &[usize]) -> Result<()> {
        let params = self.params;
        match path.split_last() {
            None => {
                let root = std::mem::replace(&mut self.root, Node::null());
                let (first, second) = split_node(root, &params)?;
                self.root = Node::new_internal(vec![first, second])?;
                self.level_actions.push_root();
                log::debug!("root split, height is now {}", self.height());
            }
            Some((&position, parent_path)) => {
                let parent = self.node_mut(parent_path)?;
                let node = parent.take_child(position);
                let (first, second) = split_node(node, &params)?;
                parent.add_child(first)?;
                parent.add_child(second)?;
            }
        }
        Ok(())
    }

    /// Recompute the keys of every strict ancestor of the node at `path`, bottom-up.
    fn adjust_keys(&mut self, path: &[usize]) -> Result<()> {
        for depth in (0..path.len()).rev() {
            self.node_mut(&path[..depth])?.update_bounding_key();
        }
        Ok(())
    }

    fn node_mut(&mut self, path: &[usize]) -> Result<&mut Node<N>> {
        path.iter()
            .try_fold(&mut self.root, |node, &position| node.child_mut(position))
            .ok_or_else(|| {
                RStarIndexError::KeyNotFound(format!("No node at insertion path {:?}.", path))
            })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test::{check_invariants, random_points};

    fn small_params() -> RStarParams {
        RStarParams::try_new(4, 2, 1).unwrap()
    }

    fn leaf(points: &[(PointId, [f64; 2])]) -> Node<f64> {
        Node::new_leaf(points.iter().map(|(id, c)| (*id, c.to_vec())).collect()).unwrap()
    }

    fn tree_with_root(root: Node<f64>, params: RStarParams) -> RStarTree<f64> {
        RStarTree {
            dimension: root.key().dimension(),
            root,
            params,
            level_actions: LevelActions::new(),
        }
    }

    /// Points around `[2, 1.5]`. Their squared distances from that center are 6.25 (id 0), 4.25
    /// (id 1), 3.25 (id 4), 2.25 (id 2) and 1.25 (id 3).
    const SPREAD: [(PointId, [f64; 2]); 5] = [
        (0, [0., 0.]),
        (1, [4., 1.]),
        (2, [2., 3.]),
        (3, [1., 2.]),
        (4, [3., 0.]),
    ];

    fn pending_keys(pending: &[Entry<f64>]) -> Vec<Vec<f64>> {
        pending.iter().rev().map(|entry| entry.key().minima().to_vec()).collect()
    }

    #[test]
    fn try_new_builds_root_leaf_from_first_points() {
        let params = small_params();
        let tree = RStarTree::try_new(params, vec![(1, vec![0., 0.]), (2, vec![1., 1.])]).unwrap();
        assert!(tree.root().is_leaf());
        assert_eq!(tree.height(), 1);
        assert_eq!(tree.num_points(), 2);
        assert_eq!(tree.dimension(), 2);
    }

    #[test]
    fn try_new_rejects_empty_input() {
        let err = RStarTree::<f64>::try_new(small_params(), vec![]).unwrap_err();
        assert!(matches!(err, RStarIndexError::InvalidNode(_)));
    }

    #[test]
    fn insert_rejects_bad_points_without_mutating() {
        let mut tree =
            RStarTree::try_new(small_params(), vec![(1, vec![0., 0.]), (2, vec![1., 1.])]).unwrap();
        let err = tree.insert(3, vec![0., 0., 0.]).unwrap_err();
        assert_eq!(
            err,
            RStarIndexError::DimensionMismatch {
                expected: 2,
                actual: 3
            }
        );
        let err = tree.insert(3, vec![f64::NAN, 0.]).unwrap_err();
        assert!(matches!(err, RStarIndexError::InvalidBounds(_)));
        assert_eq!(tree.num_points(), 2);
    }

    #[test]
    fn insert_grows_every_ancestor_key() {
        let params = small_params();
        let points: Vec<_> = (0..8u64).map(|i| (i, vec![i as f64, i as f64])).collect();
        let mut tree = RStarTree::try_new(params, points).unwrap();
        assert!(tree.height() >= 2);
        check_invariants(&tree);

        // Far outside the current root key, into whichever leaf has room.
        let before = tree.root().key().clone();
        tree.insert(100, vec![-50., -50.]).unwrap();
        assert_ne!(tree.root().key(), &before);
        assert_eq!(tree.root().key().minima(), &[-50., -50.]);
        check_invariants(&tree);
    }

    #[test]
    fn root_leaf_overflow_splits_without_reinsertion() {
        let params = small_params();
        let points: Vec<_> = (0..4u64).map(|i| (i, vec![i as f64, 0.5 * i as f64])).collect();
        let mut tree = RStarTree::try_new(params, points).unwrap();
        assert!(tree.root().is_leaf());
        assert_eq!(tree.root().point_count(), 4);

        tree.insert(4, vec![4., 2.]).unwrap();
        assert_eq!(tree.height(), 2);
        assert_eq!(tree.root().child_count(), 2);
        assert_eq!(tree.level_actions().treated_levels().count(), 0);
        check_invariants(&tree);
    }

    #[test]
    fn non_root_overflow_reinserts_before_splitting() {
        let params = RStarParams::try_new(4, 1, 1).unwrap();
        let points = random_points(200, 2, 3);
        let mut tree = RStarTree::try_new(params, points[..3].to_vec()).unwrap();

        // Leaves can only multiply through non-root overflows, and the first overflow of a level
        // within a call is always treated by forced reinsertion.
        let mut calls_with_reinsertion = 0;
        for (id, coord) in points[3..].iter().cloned() {
            tree.insert(id, coord).unwrap();
            assert!(!tree.level_actions().is_treated(0));
            if tree.level_actions().treated_levels().next().is_some() {
                calls_with_reinsertion += 1;
            }
        }
        assert!(tree.height() > 2);
        assert!(calls_with_reinsertion > 0);
        check_invariants(&tree);
    }

    #[test]
    fn overflow_evicts_farthest_point_into_sibling() {
        let crowded = leaf(&SPREAD[..4]);
        let sibling = leaf(&[(5, [-1., -1.]), (6, [-2., 0.5])]);
        let root = Node::new_internal(vec![crowded, sibling]).unwrap();
        let mut tree = tree_with_root(root, small_params());

        // Lands in the first leaf, which already holds M points.
        tree.insert(4, vec![3., 0.]).unwrap();

        assert_eq!(tree.level_actions().treated_levels().collect::<Vec<_>>(), vec![1]);
        assert_eq!(tree.height(), 2);
        let leaves = tree.root().children();
        let ids = |node: &Node<f64>| node.points().unwrap().keys().copied().collect::<Vec<_>>();
        // Point 0 is farthest from the overflowing leaf's center and moves to the sibling.
        assert_eq!(ids(&leaves[0]), vec![1, 2, 3, 4]);
        assert_eq!(ids(&leaves[1]), vec![0, 5, 6]);
        assert_eq!(leaves[0].key().minima(), &[1., 0.]);
        check_invariants(&tree);
    }

    #[test]
    fn leaf_reinsertion_queues_farthest_closest_first() {
        let params = RStarParams::try_new(4, 1, 3).unwrap();
        let root = Node::new_internal(vec![leaf(&SPREAD), leaf(&[(9, [10., 10.])])]).unwrap();
        let mut tree = tree_with_root(root, params);

        let mut pending = vec![];
        tree.reinsert(&[0], &mut pending).unwrap();

        // Ids 0, 1 and 4 are removed, and popping yields the closest of them first.
        assert_eq!(
            pending_keys(&pending),
            vec![vec![3., 0.], vec![4., 1.], vec![0., 0.]]
        );
        assert!(pending
            .iter()
            .all(|entry| matches!(entry, Entry::Point { .. })));

        let remaining = &tree.root().children()[0];
        assert_eq!(
            remaining.points().unwrap().keys().copied().collect::<Vec<_>>(),
            vec![2, 3]
        );
        assert_eq!(remaining.key().minima(), &[1., 2.]);
        assert_eq!(tree.root().key().minima(), &[1., 2.]);
    }

    #[test]
    fn internal_reinsertion_queues_subtrees_at_their_height() {
        let params = RStarParams::try_new(4, 1, 3).unwrap();
        let crowded =
            Node::new_internal(SPREAD.iter().map(|point| leaf(&[*point])).collect()).unwrap();
        let far = Node::new_internal(vec![leaf(&[(9, [10., 10.])])]).unwrap();
        let root = Node::new_internal(vec![crowded, far]).unwrap();
        let mut tree = tree_with_root(root, params);
        assert_eq!(tree.height(), 3);

        let mut pending = vec![];
        tree.reinsert(&[0], &mut pending).unwrap();

        assert_eq!(
            pending_keys(&pending),
            vec![vec![3., 0.], vec![4., 1.], vec![0., 0.]]
        );
        assert!(pending
            .iter()
            .all(|entry| matches!(entry, Entry::Child { height: 1, .. })));

        let remaining: Vec<_> = tree.root().children()[0]
            .children()
            .iter()
            .map(|child| child.key().minima().to_vec())
            .collect();
        assert_eq!(remaining, vec![vec![2., 3.], vec![1., 2.]]);
    }

    #[test]
    fn random_insertions_keep_invariants() {
        for (max_entries, dimension) in [(4, 2), (8, 3), (32, 2), (6, 1)] {
            let params = RStarParams::new(max_entries).unwrap();
            let points = random_points(500, dimension, 42);
            let mut tree = RStarTree::try_new(params, points[..1].to_vec()).unwrap();
            for (id, coord) in points[1..].iter().cloned() {
                tree.insert(id, coord).unwrap();
                assert!(tree.root().entry_count() <= max_entries);
            }
            assert_eq!(tree.num_points(), 500);
            check_invariants(&tree);
        }
    }

    #[test]
    fn clustered_insertions_keep_invariants() {
        // Many identical and collinear points produce flat keys.
        let params = RStarParams::new(6).unwrap();
        let points: Vec<_> = (0..300u64)
            .map(|i| (i, vec![(i % 7) as f64, 0.]))
            .collect();
        let tree = RStarTree::try_new(params, points).unwrap();
        assert_eq!(tree.num_points(), 300);
        check_invariants(&tree);
    }

    #[test]
    fn insertion_is_deterministic() {
        let params = RStarParams::new(8).unwrap();
        let points = random_points(200, 2, 7);
        let a = RStarTree::try_new(params, points.clone()).unwrap();
        let b = RStarTree::try_new(params, points).unwrap();
        let keys_a: Vec<_> = a.nodes().map(|(level, node)| (level, node.key().clone())).collect();
        let keys_b: Vec<_> = b.nodes().map(|(level, node)| (level, node.key().clone())).collect();
        assert_eq!(keys_a, keys_b);
    }

    #[test]
    fn insert_coord_accepts_geo_types() {
        let mut tree =
            RStarTree::try_new(small_params(), vec![(1, vec![0., 0.]), (2, vec![1., 1.])]).unwrap();
        tree.insert_coord(3, &geo_0_31::Coord { x: 2., y: 3. })
            .unwrap();
        assert_eq!(tree.num_points(), 3);
        assert_eq!(tree.root().key().maxima(), &[2., 3.]);
    }
}
