use anyhow::Result;
use itertools::Itertools;
use rand::prelude::*;

use crate::prelude::{Action, ModelActionType, QValue, QlError};

/// Where a chosen action came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoiceKind {
    /// the single best valued action
    Greedy,
    /// a random pick among equally best valued actions
    TieBreak,
    /// a random pick for the sake of exploration
    Exploration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Choice<A: Action> {
    pub action: A,
    pub kind: ChoiceKind,
}

/// Action selection on top of a set of action values.
///
/// All random decisions of learning and playing run through here:
/// - ties between equally best valued actions are broken uniformly at random
/// - when exploring, a uniformly random action is taken with probability `exploration_rate`
///
/// Seed the underlying generator to get reproducible runs.
pub struct ActionPolicy<R: Rng = StdRng> {
    rng: R,
    exploration_rate: f64,
}

impl ActionPolicy<StdRng> {
    /// Seeded with `seed`, or from system entropy if there is none
    pub fn from_seed(
        seed: Option<u64>,
        exploration_rate: f64,
    ) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::new(rng, exploration_rate)
    }
}

impl<R: Rng> ActionPolicy<R> {
    pub fn new(
        rng: R,
        exploration_rate: f64,
    ) -> Self {
        assert!((0.0..=1.0).contains(&exploration_rate), "exploration rate must be a probability");
        Self { rng, exploration_rate }
    }

    pub fn exploration_rate(&self) -> f64 {
        self.exploration_rate
    }

    /// Uniformly random action out of the whole action space
    pub fn random_action<A: Action>(&mut self) -> Result<A> {
        A::try_from_numeric(self.rng.gen_range(0..A::ACTION_SPACE))
    }

    /// Chooses an action based on `values`, which holds one value per action ordered by [Action::numeric].
    ///
    /// A tie for the best value is always broken randomly. Otherwise, if `explore` is set, a random action
    /// is taken with probability `exploration_rate`, else the best valued one.
    pub fn choose_action<A: Action>(
        &mut self,
        values: &[QValue],
        explore: bool,
    ) -> Result<Choice<A>> {
        if values.len() != A::ACTION_SPACE as usize {
            return Err(QlError(format!("expected {} action values, got {}", A::ACTION_SPACE, values.len())).into());
        }

        let max = values.iter().copied().fold(QValue::NEG_INFINITY, QValue::max);
        let best = values.iter().positions(|&v| v == max).collect_vec();

        if best.len() > 1 {
            let pick = best[self.rng.gen_range(0..best.len())];
            Ok(Choice { action: A::try_from_numeric(pick as ModelActionType)?, kind: ChoiceKind::TieBreak })
        } else if explore && self.rng.gen_bool(self.exploration_rate) {
            Ok(Choice { action: self.random_action()?, kind: ChoiceKind::Exploration })
        } else {
            let best = best.first().ok_or_else(|| QlError::from("no comparable action value"))?;
            Ok(Choice { action: A::try_from_numeric(*best as ModelActionType)?, kind: ChoiceKind::Greedy })
        }
    }
}
