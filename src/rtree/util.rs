//! Utilities shared by subtree selection and splitting.

use std::cmp::Ordering;

use tinyvec::TinyVec;

use crate::r#type::IndexableNum;

/// Child positions from the root down to a node. An empty path is the root itself.
pub type InsertionPath = TinyVec<[usize; 16]>;

/// The position of the smallest key, keeping the first on ties.
///
/// Keys are compared with `PartialOrd`, so tuples are compared lexicographically. Returns `None`
/// for an empty iterator.
pub(crate) fn position_min<K: PartialOrd>(keys: impl IntoIterator<Item = K>) -> Option<usize> {
    let mut best: Option<(usize, K)> = None;
    for (position, key) in keys.into_iter().enumerate() {
        match &best {
            Some((_, best_key)) if key >= *best_key => {}
            _ => best = Some((position, key)),
        }
    }
    best.map(|(position, _)| position)
}

/// Total order on coordinates for sorting. Incomparable values (NaN) compare as equal; validated
/// points never carry them.
#[inline]
pub(crate) fn cmp_coord<N: IndexableNum>(a: N, b: N) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}
