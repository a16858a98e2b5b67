//! Subtree selection and ancestor search.

use crate::r#type::IndexableNum;
use crate::rectangle::Rectangle;
use crate::rtree::node::Node;
use crate::rtree::util::{position_min, InsertionPath};

/// The total volume by which the child at `candidate` would overlap its siblings after being
/// enlarged to cover `entry`.
pub fn overlap_enlargement_required<N: IndexableNum>(
    parent: &Node<N>,
    candidate: usize,
    entry: &Rectangle<N>,
) -> N {
    let children = parent.children();
    let enlarged = children[candidate].key().union(entry);
    children
        .iter()
        .enumerate()
        .filter(|(position, _)| *position != candidate)
        .fold(N::zero(), |acc, (_, sibling)| {
            acc + enlarged.intersection_volume(sibling.key())
        })
}

/// The volume `candidate`'s key would gain by covering `entry`.
pub fn volume_enlargement_required<N: IndexableNum>(candidate: &Node<N>, entry: &Rectangle<N>) -> N {
    candidate.key().union(entry).volume() - candidate.key().volume()
}

/// Descend from `root` towards the node that should receive `entry`.
///
/// The descent stops at a leaf or at `target_level`, whichever comes first. Children of a node
/// whose children are all leaves are ranked by `(overlap enlargement, volume enlargement,
/// volume)`; otherwise by `(volume enlargement, volume)`. Ties keep the first child.
///
/// Returns the path of child positions and the level of the chosen node.
pub fn choose_subtree<N: IndexableNum>(
    root: &Node<N>,
    entry: &Rectangle<N>,
    target_level: usize,
) -> (InsertionPath, usize) {
    let mut path = InsertionPath::new();
    let mut node = root;
    let mut level = 0;

    while !node.is_leaf() && level < target_level {
        let children = node.children();
        let chosen = if node.all_children_are_leaves() {
            position_min(children.iter().enumerate().map(|(position, child)| {
                (
                    overlap_enlargement_required(node, position, entry),
                    volume_enlargement_required(child, entry),
                    child.key().volume(),
                )
            }))
        } else {
            position_min(children.iter().map(|child| {
                (
                    volume_enlargement_required(child, entry),
                    child.key().volume(),
                )
            }))
        };
        let Some(chosen) = chosen else {
            break;
        };

        log::trace!("choose_subtree: child {} at level {}", chosen, level + 1);
        path.push(chosen);
        node = &children[chosen];
        level += 1;
    }

    (path, level)
}

/// The nodes from `root` to `target` inclusive, located by key geometry alone.
///
/// At each internal node, the descent follows the first child whose key is a proper superset (in
/// the corner sense of [`Rectangle::is_proper_superset`]) of `target`'s key, and stops once it
/// reaches a node with the same key. Returns an empty vector if no such descent exists. When
/// sibling keys overlap this can follow a node that is not actually an ancestor of `target`.
pub fn path_to_subtree<'a, N: IndexableNum>(root: &'a Node<N>, target: &Node<N>) -> Vec<&'a Node<N>> {
    let mut path = vec![root];
    if root.key() == target.key() {
        return path;
    }

    let mut current = root;
    loop {
        let next = current
            .children()
            .iter()
            .find(|child| child.key().is_proper_superset(target.key()));
        let Some(next) = next else {
            return vec![];
        };

        path.push(next);
        if next.key() == target.key() {
            return path;
        }
        current = next;
    }
}
