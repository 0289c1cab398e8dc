pub mod policy;
pub mod q_table;
pub mod q_table_learner;
pub mod q_table_player;

/// How an episode came to an end
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EpisodeEnd {
    /// Closed by one of the environment's terminal rewards
    Terminal { reward: f32 },
    /// Closed by the `done` flag of a step (only when configured so)
    Done,
    /// Cut off after the maximum number of steps per episode
    StepLimit,
}
