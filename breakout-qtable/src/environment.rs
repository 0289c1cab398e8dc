use std::fmt::{Display, Formatter};

use anyhow::Result;
use ql::prelude::{Action, Environment, ModelActionType, QlError};

use crate::mechanics::{GameConfig, GameState, PaddleControl, REWARD_LOSE, REWARD_WIN, time_step, Transition};
use crate::state_indexer::BreakoutStateIndexer;

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum BreakoutAction {
    MoveLeft,
    MoveRight,
}

impl Action for BreakoutAction {
    const ACTION_SPACE: ModelActionType = 2;

    fn numeric(&self) -> ModelActionType {
        match self {
            BreakoutAction::MoveLeft => 0,
            BreakoutAction::MoveRight => 1,
        }
    }

    fn try_from_numeric(value: ModelActionType) -> Result<Self> {
        match value {
            0 => Ok(BreakoutAction::MoveLeft),
            1 => Ok(BreakoutAction::MoveRight),
            _ => Err(QlError(format!("value {} out of range", value)).into()),
        }
    }
}

impl Display for BreakoutAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// The breakout game as a learning environment.
///
/// Every episode starts from the same initial state.
pub struct BreakoutEnvironment {
    config: GameConfig,
    initial_state: GameState,
}

impl BreakoutEnvironment {
    pub fn new(config: GameConfig) -> Self {
        let initial_state = GameState::new(&config);
        Self { config, initial_state }
    }

    /// Environment starting its episodes from a custom `initial_state`, which must fit `config`'s grid and paddle
    pub fn with_initial_state(config: GameConfig, initial_state: GameState) -> Self {
        assert_eq!(config.grid_size, initial_state.grid_size);
        assert_eq!(config.paddle_width, initial_state.paddle_width);
        Self { config, initial_state }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Indexer for a table covering all states of this environment
    pub fn indexer(&self) -> BreakoutStateIndexer {
        BreakoutStateIndexer::new(&self.config)
    }

    pub fn transition(&self, state: &GameState, action: BreakoutAction) -> Transition {
        time_step(state, Self::map_model_action_to_paddle_control(action))
    }

    fn map_model_action_to_paddle_control(action: BreakoutAction) -> PaddleControl {
        match action {
            BreakoutAction::MoveLeft => PaddleControl::Left,
            BreakoutAction::MoveRight => PaddleControl::Right,
        }
    }
}

impl Environment for BreakoutEnvironment {
    type S = GameState;
    type A = BreakoutAction;

    fn initial_state(&self) -> Self::S {
        self.initial_state
    }

    fn step(&self, state: &Self::S, action: Self::A) -> (Self::S, f32, bool) {
        let transition = self.transition(state, action);
        (transition.state, transition.reward, transition.terminal)
    }

    fn is_terminal_reward(&self, reward: f32) -> bool {
        reward == REWARD_WIN || reward == REWARD_LOSE
    }
}
