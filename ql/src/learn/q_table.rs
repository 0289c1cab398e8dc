use anyhow::Result;

use crate::prelude::{Action, QValue, StateIndexer};

/// Flat value table holding one [QValue] per (state, action) pair.
///
/// The table is sized once by its [StateIndexer] and never resized. All access goes through the indexer,
/// so raw offsets stay internal. A table is only meaningful for the exact game dimensions it was created for.
///
/// The table is a single owned resource: the learner borrows it mutably while training, the player
/// borrows it shared while playing - never both at the same time.
pub struct QTable<I: StateIndexer> {
    indexer: I,
    values: Vec<QValue>,
}

impl<I: StateIndexer> QTable<I> {
    /// Creates a zero-initialized table covering all slots of `indexer`
    pub fn new(indexer: I) -> Self {
        let values = vec![0.0; indexer.size()];
        Self { indexer, values }
    }

    pub fn get(
        &self,
        state: &I::S,
        action: I::A,
    ) -> QValue {
        self.values[self.indexer.index(state, action)]
    }

    pub fn set(
        &mut self,
        state: &I::S,
        action: I::A,
        value: QValue,
    ) {
        let idx = self.indexer.index(state, action);
        self.values[idx] = value;
    }

    /// Number of (state, action) slots
    pub fn size(&self) -> usize {
        self.values.len()
    }

    pub fn indexer(&self) -> &I {
        &self.indexer
    }

    /// Values of all actions in `state`, ordered by [Action::numeric]
    pub fn action_values(&self, state: &I::S) -> Result<Vec<QValue>> {
        (0..<I::A as Action>::ACTION_SPACE)
            .map(|a| Ok(self.get(state, <I::A as Action>::try_from_numeric(a)?)))
            .collect()
    }

    /// Number of slots holding a value different from the initial zero
    pub fn visited_slots(&self) -> usize {
        self.values.iter().filter(|&&v| v != 0.0).count()
    }
}
