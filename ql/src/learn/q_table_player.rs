use anyhow::Result;
use rand::prelude::*;

use crate::learn::EpisodeEnd;
use crate::learn::policy::{ActionPolicy, ChoiceKind};
use crate::learn::q_table::QTable;
use crate::prelude::{Action, Environment, StateIndexer};

pub struct Parameter {
    /// Episodes still running after that many steps are cut off
    pub max_steps_per_episode: usize,
    /// Random generator seed (for tie-breaks); `None` = seed from system entropy
    pub seed: Option<u64>,
}

impl Default for Parameter {
    fn default() -> Self {
        Self {
            max_steps_per_episode: 1_000_000,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision<A: Action> {
    pub action: A,
    pub kind: ChoiceKind,
    pub reward: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeSummary<A: Action> {
    pub decisions: Vec<Decision<A>>,
    pub total_reward: f32,
    pub end: EpisodeEnd,
}

impl<A: Action> EpisodeSummary<A> {
    pub fn steps(&self) -> usize {
        self.decisions.len()
    }

    pub fn actions(&self) -> Vec<A> {
        self.decisions.iter().map(|d| d.action).collect()
    }

    pub fn tie_breaks(&self) -> usize {
        self.decisions.iter().filter(|d| d.kind == ChoiceKind::TieBreak).count()
    }

    /// Step number (0-based) of the first decision taken by a random tie-break
    pub fn first_tie_break(&self) -> Option<usize> {
        self.decisions.iter().position(|d| d.kind == ChoiceKind::TieBreak)
    }
}

/// Plays episodes strictly greedy against a learned [QTable], which stays untouched.
///
/// Ties between equally valued actions are the only random part.
pub struct QTablePlayer<E: Environment, R: Rng = StdRng> {
    param: Parameter,
    environment: E,
    policy: ActionPolicy<R>,
}

impl<E: Environment> QTablePlayer<E> {
    pub fn new(
        environment: E,
        param: Parameter,
    ) -> Self {
        let policy = ActionPolicy::from_seed(param.seed, 0.0);
        Self::with_policy(environment, param, policy)
    }
}

impl<E: Environment, R: Rng> QTablePlayer<E, R> {
    pub fn with_policy(
        environment: E,
        param: Parameter,
        policy: ActionPolicy<R>,
    ) -> Self {
        Self { param, environment, policy }
    }

    pub fn environment(&self) -> &E {
        &self.environment
    }

    /// Plays one episode from the initial state until a terminal reward shows up.
    ///
    /// Every state reached is handed to `on_frame` together with its step number (1-based) and the step reward.
    /// The `done` flag of a step does not end the episode here.
    pub fn play_episode<I, F>(
        &mut self,
        table: &QTable<I>,
        mut on_frame: F,
    ) -> Result<EpisodeSummary<E::A>>
    where
        I: StateIndexer<S = E::S, A = E::A>,
        F: FnMut(usize, &E::S, f32) -> Result<()>,
    {
        let mut state = self.environment.initial_state();
        let mut decisions = Vec::new();
        let mut total_reward = 0.0;

        while decisions.len() < self.param.max_steps_per_episode {
            let values = table.action_values(&state)?;
            let choice = self.policy.choose_action(&values, false)?;

            let (next_state, reward, _) = self.environment.step(&state, choice.action);
            total_reward += reward;
            decisions.push(Decision { action: choice.action, kind: choice.kind, reward });
            on_frame(decisions.len(), &next_state, reward)?;

            if self.environment.is_terminal_reward(reward) {
                return Ok(Self::summarize(decisions, total_reward, EpisodeEnd::Terminal { reward }));
            }
            state = next_state;
        }

        Ok(Self::summarize(decisions, total_reward, EpisodeEnd::StepLimit))
    }

    fn summarize(
        decisions: Vec<Decision<E::A>>,
        total_reward: f32,
        end: EpisodeEnd,
    ) -> EpisodeSummary<E::A> {
        let summary = EpisodeSummary { decisions, total_reward, end };
        log::info!(
            "played episode: {} steps, total reward: {}, end: {:?}, tie-breaks: {}",
            summary.steps(),
            summary.total_reward,
            summary.end,
            summary.tie_breaks()
        );
        summary
    }
}
