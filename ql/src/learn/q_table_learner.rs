use anyhow::Result;
use rand::prelude::*;

use crate::learn::EpisodeEnd;
use crate::learn::policy::ActionPolicy;
use crate::learn::q_table::QTable;
use crate::prelude::{Environment, QValue, StateIndexer};
use crate::util::fmt_count;

pub struct Parameter {
    /// Discount factor for future rewards
    pub gamma: f32,
    /// Chance of taking a random action instead of the best one during learning
    pub exploration_rate: f64,
    /// Number of episodes learned in one call of [QTableLearner::learn]
    pub episodes_per_round: usize,
    /// Episodes still running after that many steps are cut off
    pub max_steps_per_episode: usize,
    /// Whether the `done` flag of a step closes an episode, like a terminal reward does.
    /// Otherwise only terminal rewards close an episode.
    pub done_ends_episode: bool,
    /// Log learning progress after that many episodes
    pub stats_after_episodes: usize,
    /// Random generator seed; `None` = seed from system entropy
    pub seed: Option<u64>,
}

impl Default for Parameter {
    fn default() -> Self {
        Self {
            gamma: 0.8,
            exploration_rate: 0.2,
            episodes_per_round: 250_000,
            max_steps_per_episode: 1_000_000,
            done_ends_episode: false,
            stats_after_episodes: 50_000,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeStats {
    pub steps: usize,
    pub total_reward: f32,
    pub end: EpisodeEnd,
}

/// Aggregated statistics over a number of learned episodes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoundStats {
    pub episodes: usize,
    pub steps: usize,
    /// episodes closed by a positive terminal reward
    pub won: usize,
    /// episodes closed by a negative (or zero) terminal reward
    pub lost: usize,
    /// episodes closed by the `done` flag
    pub done: usize,
    /// episodes cut off by the step limit
    pub step_limited: usize,
    pub reward_sum: f64,
}

impl RoundStats {
    pub fn add(&mut self, episode: &EpisodeStats) {
        self.episodes += 1;
        self.steps += episode.steps;
        self.reward_sum += episode.total_reward as f64;
        match episode.end {
            EpisodeEnd::Terminal { reward } if reward > 0.0 => self.won += 1,
            EpisodeEnd::Terminal { .. } => self.lost += 1,
            EpisodeEnd::Done => self.done += 1,
            EpisodeEnd::StepLimit => self.step_limited += 1,
        }
    }

    pub fn mean_episode_reward(&self) -> f64 {
        match self.episodes {
            0 => 0.0,
            n => self.reward_sum / n as f64,
        }
    }
}

/**
    Tabular one-step Q-learning.

    Every episode starts from the environment's initial state with a random action.
    After each step the value of the previous (state, action) pair gets replaced (no blending with the old value):
    - by the raw reward, if the step ended the episode
    - by `reward + gamma * max_a' Q(next_state, a')` otherwise

    The next action is taken by the [ActionPolicy]: greedy with respect to the next state's values,
    random on a tie or with the configured exploration rate.
 */
pub struct QTableLearner<E: Environment, R: Rng = StdRng> {
    param: Parameter,
    environment: E,
    policy: ActionPolicy<R>,
    episode_count: usize,
}

impl<E: Environment> QTableLearner<E> {
    pub fn new(
        environment: E,
        param: Parameter,
    ) -> Self {
        let policy = ActionPolicy::from_seed(param.seed, param.exploration_rate);
        Self::with_policy(environment, param, policy)
    }
}

impl<E: Environment, R: Rng> QTableLearner<E, R> {
    pub fn with_policy(
        environment: E,
        param: Parameter,
        policy: ActionPolicy<R>,
    ) -> Self {
        assert!(param.max_steps_per_episode > 0);
        Self {
            param,
            environment,
            policy,
            episode_count: 0,
        }
    }

    pub fn environment(&self) -> &E {
        &self.environment
    }

    /// Number of episodes learned so far
    pub fn episode_count(&self) -> usize {
        self.episode_count
    }

    /// Learns `episodes_per_round` episodes
    pub fn learn<I>(
        &mut self,
        table: &mut QTable<I>,
    ) -> Result<RoundStats>
    where
        I: StateIndexer<S = E::S, A = E::A>,
    {
        let mut round = RoundStats::default();
        let mut interval = RoundStats::default();

        for _ in 0..self.param.episodes_per_round {
            let episode = self.learn_episode(table)?;
            round.add(&episode);
            interval.add(&episode);

            if self.param.stats_after_episodes > 0 && self.episode_count % self.param.stats_after_episodes == 0 {
                log::info!(
                    "episode {}: last {} episodes won: {}, lost: {}, mean reward: {:.2}, mean steps: {:.1}",
                    fmt_count(self.episode_count),
                    fmt_count(interval.episodes),
                    fmt_count(interval.won),
                    fmt_count(interval.lost),
                    interval.mean_episode_reward(),
                    interval.steps as f64 / interval.episodes as f64
                );
                interval = RoundStats::default();
            }
        }

        log::info!(
            "learned {} episodes ({} steps): won {}, lost {}, done {}, cut off {}; {} of {} table slots visited",
            fmt_count(round.episodes),
            fmt_count(round.steps),
            fmt_count(round.won),
            fmt_count(round.lost),
            fmt_count(round.done),
            fmt_count(round.step_limited),
            fmt_count(table.visited_slots()),
            fmt_count(table.size())
        );

        Ok(round)
    }

    /// Learns a single episode from the initial state until it ends
    pub fn learn_episode<I>(
        &mut self,
        table: &mut QTable<I>,
    ) -> Result<EpisodeStats>
    where
        I: StateIndexer<S = E::S, A = E::A>,
    {
        let mut state = self.environment.initial_state();
        let mut action: E::A = self.policy.random_action()?;
        let mut total_reward = 0.0;

        for step in 1..=self.param.max_steps_per_episode {
            let (next_state, reward, done) = self.environment.step(&state, action);
            total_reward += reward;

            let end = if self.environment.is_terminal_reward(reward) {
                Some(EpisodeEnd::Terminal { reward })
            } else if done && self.param.done_ends_episode {
                Some(EpisodeEnd::Done)
            } else {
                None
            };

            if let Some(end) = end {
                table.set(&state, action, reward);
                return Ok(self.finish_episode(EpisodeStats { steps: step, total_reward, end }));
            }

            let next_values = table.action_values(&next_state)?;
            let max_next_value = next_values.iter().copied().fold(QValue::NEG_INFINITY, QValue::max);
            table.set(&state, action, reward + self.param.gamma * max_next_value);

            action = self.policy.choose_action(&next_values, true)?.action;
            state = next_state;
        }

        Ok(self.finish_episode(EpisodeStats {
            steps: self.param.max_steps_per_episode,
            total_reward,
            end: EpisodeEnd::StepLimit,
        }))
    }

    fn finish_episode(&mut self, stats: EpisodeStats) -> EpisodeStats {
        self.episode_count += 1;
        log::trace!("episode {} finished: {:?}", self.episode_count, stats);
        stats
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::Action;
    use crate::test_environment::{CorridorEnvironment, CorridorState, REWARD_FALL, REWARD_GOAL, REWARD_STEP, WalkAction};

    use super::*;

    fn param() -> Parameter {
        Parameter {
            episodes_per_round: 500,
            stats_after_episodes: 100,
            seed: Some(4711),
            ..Parameter::default()
        }
    }

    #[test]
    fn test_terminal_steps_write_raw_reward() -> Result<()> {
        // from the start the goal is one step east, the edge one step west
        let env = CorridorEnvironment::new(3, 1);
        let mut table = QTable::new(env.indexer());
        let mut learner = QTableLearner::new(env, param());

        let mut falls = 0;
        for _ in 0..50 {
            let stats = learner.learn_episode(&mut table)?;
            if stats.end == (EpisodeEnd::Terminal { reward: REWARD_FALL }) {
                falls += 1;
            }
        }

        assert_eq!(table.get(&CorridorState { pos: 1 }, WalkAction::East), REWARD_GOAL);
        if falls > 0 {
            assert_eq!(table.get(&CorridorState { pos: 0 }, WalkAction::West), REWARD_FALL);
        }
        Ok(())
    }

    #[test]
    fn test_bootstrapped_update() -> Result<()> {
        let env = CorridorEnvironment::new(5, 2);
        let mut table = QTable::new(env.indexer());
        table.set(&CorridorState { pos: 3 }, WalkAction::East, 10.0);
        table.set(&CorridorState { pos: 3 }, WalkAction::West, 2.0);
        table.set(&CorridorState { pos: 1 }, WalkAction::East, 1.0);
        table.set(&CorridorState { pos: 1 }, WalkAction::West, 1.0);

        let mut learner = QTableLearner::new(env, Parameter { max_steps_per_episode: 1, ..param() });
        for _ in 0..20 {
            let stats = learner.learn_episode(&mut table)?;
            assert_eq!(stats.end, EpisodeEnd::StepLimit);
        }
        let start = CorridorState { pos: 2 };
        assert_eq!(table.get(&start, WalkAction::East), REWARD_STEP + 0.8 * 10.0);
        assert_eq!(table.get(&start, WalkAction::West), REWARD_STEP + 0.8 * 1.0);
        Ok(())
    }

    #[test]
    fn test_learns_to_walk_to_the_goal() -> Result<()> {
        let env = CorridorEnvironment::new(8, 3);
        let mut table = QTable::new(env.indexer());
        let mut learner = QTableLearner::new(env, param());

        let stats = learner.learn(&mut table)?;
        assert_eq!(stats.episodes, 500);
        assert_eq!(stats.won + stats.lost + stats.done + stats.step_limited, 500);
        assert_eq!(learner.episode_count(), 500);
        assert!(stats.won > 0);

        for pos in 1..7 {
            let state = CorridorState { pos };
            let values = table.action_values(&state)?;
            assert!(
                values[WalkAction::East.numeric() as usize] > values[WalkAction::West.numeric() as usize],
                "east should be preferred at {pos}: {values:?}"
            );
        }
        Ok(())
    }

    #[test]
    fn test_done_flag_ends_episode_only_when_configured() -> Result<()> {
        let env = CorridorEnvironment::new(3, 1);
        let mut table = QTable::new(env.indexer());
        let mut learner = QTableLearner::new(env, Parameter { done_ends_episode: true, ..param() });
        let stats = learner.learn(&mut table)?;
        // in the corridor every `done` step carries a terminal reward, which takes precedence
        assert_eq!(stats.done, 0);
        assert_eq!(stats.won + stats.lost, stats.episodes);
        Ok(())
    }
}
