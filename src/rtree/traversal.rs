//! Utilities to traverse the R*-tree structure.

use crate::r#type::{IndexableNum, PointId};
use crate::rtree::choose::path_to_subtree;
use crate::rtree::index::RStarTree;
use crate::rtree::node::Node;

/// A depth-first, pre-order iterator over the nodes of a tree, yielding each node with its
/// level. The root is level 0.
#[derive(Debug, Clone)]
pub struct Nodes<'a, N: IndexableNum> {
    stack: Vec<(usize, &'a Node<N>)>,
}

impl<'a, N: IndexableNum> Nodes<'a, N> {
    fn new(root: &'a Node<N>) -> Self {
        Self {
            stack: vec![(0, root)],
        }
    }
}

impl<'a, N: IndexableNum> Iterator for Nodes<'a, N> {
    type Item = (usize, &'a Node<N>);

    fn next(&mut self) -> Option<Self::Item> {
        let (level, node) = self.stack.pop()?;
        // Reversed so that the first child is visited first
        self.stack
            .extend(node.children().iter().rev().map(|child| (level + 1, child)));
        Some((level, node))
    }
}

impl<N: IndexableNum> RStarTree<N> {
    /// Iterate over every node in depth-first pre-order, with its level.
    pub fn nodes(&self) -> Nodes<'_, N> {
        Nodes::new(self.root())
    }

    /// Iterate over the leaves, left to right.
    pub fn leaves(&self) -> impl Iterator<Item = &Node<N>> {
        self.nodes()
            .map(|(_, node)| node)
            .filter(|node| node.is_leaf())
    }

    /// Iterate over every indexed point as `(id, coordinates)`.
    pub fn points(&self) -> impl Iterator<Item = (PointId, &[N])> {
        self.leaves()
            .flat_map(|leaf| leaf.points().into_iter().flatten())
            .map(|(id, coord)| (*id, coord.as_slice()))
    }

    /// The total number of indexed points.
    pub fn num_points(&self) -> usize {
        self.leaves().map(Node::point_count).sum()
    }

    /// The nodes from the root down to `target`, found by key containment.
    ///
    /// See [`path_to_subtree`] for the exact search and its limits.
    pub fn path_to(&self, target: &Node<N>) -> Vec<&Node<N>> {
        path_to_subtree(self.root(), target)
    }
}

#[cfg(test)]
mod test {
    use crate::rtree::{RStarParams, RStarTree};
    use crate::test::random_points;

    #[test]
    fn nodes_visits_pre_order() {
        let params = RStarParams::new(4).unwrap();
        let tree = RStarTree::try_new(params, random_points(60, 2, 11)).unwrap();

        let nodes: Vec<_> = tree.nodes().collect();
        assert_eq!(nodes[0].0, 0);
        assert!(std::ptr::eq(nodes[0].1, tree.root()));

        // The first child of the root comes right after it.
        assert_eq!(nodes[1].0, 1);
        assert!(std::ptr::eq(nodes[1].1, &tree.root().children()[0]));

        let leaf_levels: Vec<usize> = nodes
            .iter()
            .filter(|(_, node)| node.is_leaf())
            .map(|(level, _)| *level)
            .collect();
        assert!(leaf_levels.iter().all(|level| *level == tree.height() - 1));
        assert_eq!(leaf_levels.len(), tree.leaves().count());
    }

    #[test]
    fn points_and_num_points_agree() {
        let params = RStarParams::new(5).unwrap();
        let input = random_points(100, 3, 5);
        let tree = RStarTree::try_new(params, input.clone()).unwrap();

        assert_eq!(tree.num_points(), 100);
        let mut ids: Vec<_> = tree.points().map(|(id, _)| id).collect();
        ids.sort_unstable();
        assert_eq!(ids, (0..100).collect::<Vec<_>>());
        for (id, coord) in tree.points() {
            assert_eq!(coord, input[id as usize].1.as_slice());
        }
    }

    #[test]
    fn path_to_every_leaf() {
        let params = RStarParams::new(4).unwrap();
        let tree = RStarTree::try_new(params, random_points(40, 2, 9)).unwrap();

        for leaf in tree.leaves() {
            let path = tree.path_to(leaf);
            // Overlapping siblings can mislead the search, but a found path always ends at a
            // node with the target's key.
            if let Some(last) = path.last() {
                assert_eq!(last.key(), leaf.key());
                assert!(std::ptr::eq(path[0], tree.root()));
            }
        }
        assert_eq!(tree.path_to(tree.root()).len(), 1);
    }
}
