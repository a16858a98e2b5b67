//! Shared fixtures for unit tests.

use std::collections::BTreeSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::r#type::{IndexableNum, PointId};
use crate::rectangle::{bounding_box, bounding_box_points};
use crate::rtree::{Node, RStarTree};

/// `n` points with ids `0..n` and coordinates uniform in `[-100, 100)`, from a fixed seed.
pub(crate) fn random_points(n: usize, dimension: usize, seed: u64) -> Vec<(PointId, Vec<f64>)> {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut rng = StdRng::seed_from_u64(seed);
    (0..n as PointId)
        .map(|id| {
            let coord = (0..dimension).map(|_| rng.gen_range(-100.0..100.0)).collect();
            (id, coord)
        })
        .collect()
}

/// Assert every structural invariant of a tree.
///
/// Every key is tight, every leaf sits at the same depth, every non-root node holds between `m`
/// and `M` entries, the root at most `M`, and no point id appears twice.
pub(crate) fn check_invariants<N: IndexableNum>(tree: &RStarTree<N>) {
    let params = tree.params();
    let leaf_level = tree.height() - 1;
    let mut ids = BTreeSet::new();

    for (level, node) in tree.nodes() {
        assert_tight_key(node);
        assert!(
            node.entry_count() <= params.max_entries(),
            "node at level {} holds {} entries",
            level,
            node.entry_count()
        );
        if level > 0 {
            assert!(
                node.entry_count() >= params.min_entries(),
                "node at level {} holds {} entries",
                level,
                node.entry_count()
            );
        }
        assert_eq!(node.key().dimension(), tree.dimension());

        if node.is_leaf() {
            assert_eq!(level, leaf_level, "leaves must share one depth");
            for id in node.points().into_iter().flat_map(|points| points.keys()) {
                assert!(ids.insert(*id), "point {} appears twice", id);
            }
        }
    }

    assert_eq!(ids.len(), tree.num_points());
}

fn assert_tight_key<N: IndexableNum>(node: &Node<N>) {
    let expected = match node.points() {
        Some(points) => bounding_box_points(points.values()),
        None => bounding_box(node.children().iter().map(Node::key)),
    };
    assert_eq!(Some(node.key()), expected.as_ref());
}
