#![cfg(test)]

use std::fmt::{Display, Formatter};

use anyhow::Result;
use console_engine::pixel;
use console_engine::screen::Screen;

use crate::prelude::{Action, DebugVisualizer, Environment, ModelActionType, QlError, StateIndexer};

pub const REWARD_GOAL: f32 = 10.0;
pub const REWARD_FALL: f32 = -10.0;
pub const REWARD_STEP: f32 = -1.0;

/// A quite simple corridor walk.
///
/// The walker starts at `start` within a corridor of `len` cells.
/// Stepping onto the east end is the goal, stepping off the west end is a fall.
/// Both end the episode.
#[derive(Clone, Copy, Debug)]
pub struct CorridorEnvironment {
    pub len: usize,
    pub start: usize,
}

impl CorridorEnvironment {
    pub fn new(len: usize, start: usize) -> Self {
        assert!(start > 0 && start < len - 1);
        Self { len, start }
    }

    pub fn indexer(&self) -> CorridorIndexer {
        CorridorIndexer { len: self.len }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CorridorState {
    pub pos: usize,
}

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum WalkAction {
    West,
    East,
}

impl Display for WalkAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl Action for WalkAction {
    const ACTION_SPACE: ModelActionType = 2;

    fn numeric(&self) -> ModelActionType {
        match self {
            WalkAction::West => 0,
            WalkAction::East => 1,
        }
    }

    fn try_from_numeric(value: ModelActionType) -> Result<Self> {
        match value {
            0 => Ok(WalkAction::West),
            1 => Ok(WalkAction::East),
            _ => Err(QlError(format!("value {} out of range", value)).into()),
        }
    }
}

impl Environment for CorridorEnvironment {
    type S = CorridorState;
    type A = WalkAction;

    fn initial_state(&self) -> Self::S {
        CorridorState { pos: self.start }
    }

    fn step(&self, state: &Self::S, action: Self::A) -> (Self::S, f32, bool) {
        match action {
            WalkAction::West if state.pos == 0 => (*state, REWARD_FALL, true),
            WalkAction::West => (CorridorState { pos: state.pos - 1 }, REWARD_STEP, false),
            WalkAction::East if state.pos + 1 == self.len - 1 => (CorridorState { pos: state.pos + 1 }, REWARD_GOAL, true),
            WalkAction::East => (CorridorState { pos: state.pos + 1 }, REWARD_STEP, false),
        }
    }

    fn is_terminal_reward(&self, reward: f32) -> bool {
        reward == REWARD_GOAL || reward == REWARD_FALL
    }
}

pub struct CorridorIndexer {
    len: usize,
}

impl StateIndexer for CorridorIndexer {
    type S = CorridorState;
    type A = WalkAction;

    fn size(&self) -> usize {
        self.len * WalkAction::ACTION_SPACE as usize
    }

    fn index(&self, state: &CorridorState, action: WalkAction) -> usize {
        assert!(state.pos < self.len, "position {} outside of corridor", state.pos);
        state.pos + self.len * action.numeric() as usize
    }
}

impl DebugVisualizer for CorridorState {
    fn one_line_info(&self) -> String {
        format!("Corridor: walker at {}", self.pos)
    }

    fn render_to_console(&self) -> Screen {
        let mut screen = Screen::new_empty(self.pos as u32 + 1, 1);
        screen.set_pxl(self.pos as i32, 0, pixel::pxl('●'));
        screen
    }
}
