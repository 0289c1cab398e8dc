#![allow(dead_code)]

use log::LevelFilter;
use nalgebra::{Point2, Vector2};

use breakout_qtable::environment::BreakoutEnvironment;
use breakout_qtable::mechanics::{GameConfig, GameState};

pub const LEARNER_SEED: u64 = 4711;

/// Logging for integration tests; safe to call from every test
pub fn init_logging() {
    let _ = env_logger::builder()
        .format_timestamp_secs()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .is_test(true)
        .try_init();
}

/// A grid small enough to keep a table of a few million slots
pub fn small_config() -> GameConfig {
    GameConfig {
        grid_size: Vector2::new(8, 10),
        paddle_width: 3,
        paddle_start: Point2::new(2, 1),
        ball_start: Point2::new(4.0, 4.0),
        ..GameConfig::default()
    }
}

/// Ball falling straight down far right of the paddle: every episode is lost after two steps, whatever the agent does
pub fn hopeless_environment() -> BreakoutEnvironment {
    small_environment(Point2::new(6.5, 3.5), Vector2::new(0.0, -1.0), |_| {})
}

/// Only block 0 is left and the ball is just about to hit it: a block hit followed by a win
pub fn last_block_environment() -> BreakoutEnvironment {
    small_environment(Point2::new(0.5, 7.5), Vector2::new(0.0, 1.0), |state| {
        state.blocks.iter_mut().skip(1).for_each(|b| b.destroyed = true);
    })
}

/// Ball bouncing off the right wall right above the paddle row, then missing the paddle
pub fn wall_then_miss_environment() -> BreakoutEnvironment {
    small_environment(Point2::new(7.5, 2.5), Vector2::new(0.6, -0.8), |_| {})
}

/// [small_config] game with the paddle at the left wall and the ball placed as given
fn small_environment(ball_position: Point2<f32>, ball_velocity: Vector2<f32>, customize: fn(&mut GameState)) -> BreakoutEnvironment {
    let config = small_config();
    let mut state = GameState::new(&config);
    state.paddle_position.x = 0;
    state.ball_position = ball_position;
    state.ball_velocity = ball_velocity;
    customize(&mut state);
    BreakoutEnvironment::with_initial_state(config, state)
}
