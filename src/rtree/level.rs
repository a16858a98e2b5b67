/// Per-insertion record of which tree levels have already had forced reinsertion.
///
/// Level 0 is the root. The record is scratch state for one public insertion call and is reset at
/// the start of the next one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelActions {
    treated: Vec<bool>,
}

impl LevelActions {
    pub(crate) fn new() -> Self {
        Self {
            treated: vec![false],
        }
    }

    /// Forget every level, leaving `{0: false}`.
    pub(crate) fn reset(&mut self) {
        self.treated.clear();
        self.treated.push(false);
    }

    /// Returns `true` if forced reinsertion already ran at `level` during this call.
    pub fn is_treated(&self, level: usize) -> bool {
        self.treated.get(level).copied().unwrap_or(false)
    }

    pub(crate) fn mark_treated(&mut self, level: usize) {
        if self.treated.len() <= level {
            self.treated.resize(level + 1, false);
        }
        self.treated[level] = true;
    }

    /// The root was split: every existing level is now one deeper below a fresh, untreated root.
    pub(crate) fn push_root(&mut self) {
        self.treated.insert(0, false);
    }

    /// The levels treated so far, in increasing order.
    pub fn treated_levels(&self) -> impl Iterator<Item = usize> + '_ {
        self.treated
            .iter()
            .enumerate()
            .filter_map(|(level, treated)| treated.then_some(level))
    }
}

impl Default for LevelActions {
    fn default() -> Self {
        Self::new()
    }
}
