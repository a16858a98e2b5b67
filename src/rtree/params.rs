use crate::error::{RStarIndexError, Result};

/// The default maximum number of entries per node used by [`RStarParams::default`].
pub const DEFAULT_MAX_ENTRIES: usize = 32;

/// Fan-out parameters of one tree.
///
/// These are fixed for the lifetime of a tree, so trees with different fan-out can coexist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RStarParams {
    max_entries: usize,
    min_entries: usize,
    reinsert_count: usize,
}

impl RStarParams {
    /// Derive `m = floor(0.4 * M)` and `p = floor(0.3 * M)` (each at least 1) from the maximum
    /// number of entries per node.
    pub fn new(max_entries: usize) -> Result<Self> {
        let min_entries = (max_entries * 2 / 5).max(1);
        let reinsert_count = (max_entries * 3 / 10).max(1);
        Self::try_new(max_entries, min_entries, reinsert_count)
    }

    /// Create parameters from explicit `M`, `m` and `p`.
    pub fn try_new(max_entries: usize, min_entries: usize, reinsert_count: usize) -> Result<Self> {
        if min_entries == 0 {
            return Err(RStarIndexError::InvalidParameters(
                "min_entries must be at least 1.".to_string(),
            ));
        }
        if 2 * min_entries > max_entries {
            return Err(RStarIndexError::InvalidParameters(format!(
                "max_entries ({}) must be at least twice min_entries ({}).",
                max_entries, min_entries
            )));
        }
        if reinsert_count == 0 || reinsert_count > max_entries + 1 - min_entries {
            return Err(RStarIndexError::InvalidParameters(format!(
                "reinsert_count ({}) must be between 1 and {}.",
                reinsert_count,
                max_entries + 1 - min_entries
            )));
        }

        Ok(Self {
            max_entries,
            min_entries,
            reinsert_count,
        })
    }

    /// `M`, the maximum number of entries per node.
    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// `m`, the minimum number of entries in each group of a split.
    pub fn min_entries(&self) -> usize {
        self.min_entries
    }

    /// `p`, the number of entries removed and reinserted by forced reinsertion.
    pub fn reinsert_count(&self) -> usize {
        self.reinsert_count
    }

    /// The sizes of the first group of every candidate split distribution.
    pub(crate) fn split_group_sizes(&self) -> impl Iterator<Item = usize> {
        let m = self.min_entries;
        (1..self.max_entries - 2 * m + 2).map(move |j| m - 1 + j)
    }
}

impl Default for RStarParams {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            min_entries: 12,
            reinsert_count: 9,
        }
    }
}
