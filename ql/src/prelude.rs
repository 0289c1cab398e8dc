use std::fmt::{Display, Formatter};
use std::hash::Hash;

use anyhow::Result;
use console_engine::screen::Screen;

/// Data type we use to encode an `Action` as a numeric value.
pub type ModelActionType = u8;

/// Data type of a value (expected future reward) stored per (state, action) pair
pub type QValue = f32;

pub trait Action: Display + Sized + Clone + Copy + Hash + PartialEq + Eq {
    /// Number of possible actions
    const ACTION_SPACE: ModelActionType;
    /// Identifying the Action as a unique value in range (0..Self::ACTION_SPACE)
    fn numeric(&self) -> ModelActionType;
    fn try_from_numeric(value: ModelActionType) -> Result<Self>;
}

/// Learning environment, modeling the world of a learning agent.
///
/// The environment itself holds no episode state. It hands out a fresh initial state and advances
/// a given state by one time step, producing a new state value each time.
pub trait Environment {
    type S: Clone + DebugVisualizer;
    type A: Action;

    /// A fresh copy of the defined starting point of an episode
    fn initial_state(&self) -> Self::S;

    /// Performs one time/action-step.
    ///
    /// Applies the given `action` to `state` and returns:
    ///   - next state
    ///   - immediate reward earned during performing that step
    ///   - done flag (as reported by the game mechanics)
    ///
    fn step(
        &self,
        state: &Self::S,
        action: Self::A,
    ) -> (Self::S, f32, bool);

    /// Whether `reward` is one of the terminal rewards, which close an episode
    fn is_terminal_reward(
        &self,
        reward: f32,
    ) -> bool;
}

/// Maps a (state, action) pair onto a unique slot in a flat value table
pub trait StateIndexer {
    type S;
    type A: Action;

    /// Number of addressable (state, action) slots
    fn size(&self) -> usize;

    /// Slot of the (`state`, `action`) pair in range `0..self.size()`
    fn index(
        &self,
        state: &Self::S,
        action: Self::A,
    ) -> usize;
}

pub trait DebugVisualizer {
    fn one_line_info(&self) -> String;
    fn render_to_console(&self) -> Screen;
}


#[derive(Debug)]
pub struct QlError(pub String);

impl QlError {
    pub fn from(msg: &str) -> Self { QlError(msg.to_string()) }
}

impl Display for QlError {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for QlError {}
