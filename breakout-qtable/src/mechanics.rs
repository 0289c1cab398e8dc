use nalgebra::{Point2, Vector2};

/// Number of block slots.
/// It is part of the state index, so changing it invalidates every learned table.
pub const MAX_BLOCKS: usize = 10;

pub const REWARD_WIN: f32 = 100.0;
pub const REWARD_LOSE: f32 = -50.0;
pub const REWARD_BLOCK_HIT: f32 = 50.0;
pub const REWARD_STEP: f32 = -1.0;

/// max squared distance between ball and block position to probe for a block contact
const BLOCK_CONTACT_DISTANCE_SQUARED: f32 = 2.0;
/// fractions of the ball's move vector, where block contacts are probed
const BLOCK_CONTACT_PROBES: [f32; 5] = [0.001, 0.201, 0.401, 0.601, 0.801];
/// share of the ball's offset from the paddle center, which is added to the ball direction on a paddle bounce
const PADDLE_STEERING_FACTOR: f32 = 0.5;

#[derive(Clone, Debug, PartialEq)]
pub struct GameConfig {
    pub grid_size: Vector2<i32>,
    pub paddle_width: i32,
    pub paddle_start: Point2<i32>,
    pub ball_start: Point2<f32>,
    /// in degrees, counter-clockwise from the positive x-axis
    pub ball_start_angle: f32,
    /// deliberately coarse approximation of π, used for angle conversion and heading discretization
    pub pi: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_size: Vector2::new(15, 20),
            paddle_width: 3,
            paddle_start: Point2::new(4, 2),
            ball_start: Point2::new(6.0, 10.0),
            ball_start_angle: -30.0,
            pi: 3.14,
        }
    }
}

impl GameConfig {
    pub fn deg_to_rad(&self, deg: f32) -> f32 {
        deg * self.pi / 180.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Block {
    pub position: Point2<i32>,
    pub destroyed: bool,
}

/// One instant of the game.
///
/// x = 0 = left side; y = 0 = bottom
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GameState {
    pub ball_position: Point2<f32>,
    pub ball_velocity: Vector2<f32>,
    pub paddle_position: Point2<i32>,
    pub grid_size: Vector2<i32>,
    pub paddle_width: i32,
    pub blocks: [Block; MAX_BLOCKS],
}

impl GameState {
    pub fn new(config: &GameConfig) -> Self {
        let angle = config.deg_to_rad(config.ball_start_angle);
        let grid = config.grid_size;
        Self {
            ball_position: config.ball_start,
            ball_velocity: Vector2::new(angle.cos(), angle.sin()),
            paddle_position: config.paddle_start,
            grid_size: grid,
            paddle_width: config.paddle_width,
            blocks: std::array::from_fn(|i| {
                let i = i as i32;
                Block {
                    position: Point2::new(i % grid.x, grid.y - 2 - i / grid.x - i / 4 * 2),
                    destroyed: false,
                }
            }),
        }
    }

    pub fn paddle_max_x(&self) -> i32 {
        self.grid_size.x - self.paddle_width
    }

    pub fn alive_blocks(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter().filter(|b| !b.destroyed)
    }

    fn move_paddle(&mut self, control: PaddleControl) {
        let delta = match control {
            PaddleControl::Left => -1,
            PaddleControl::Right => 1,
        };
        self.paddle_position.x = (self.paddle_position.x + delta).clamp(0, self.paddle_max_x());
    }

    fn ball_target(&self) -> Point2<f32> {
        self.ball_position + self.ball_velocity
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaddleControl {
    Left,
    Right,
}

/// The rule, which determined the outcome of a time step
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepEvent {
    BlockHit { block: usize },
    Win,
    /// ball bounced off a side wall or the ceiling
    WallReflection,
    PaddleBounce,
    Miss,
    Advance,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transition {
    pub state: GameState,
    pub reward: f32,
    /// set for a win or a miss, but also for a wall reflection
    pub terminal: bool,
    pub event: StepEvent,
}

type Rule = fn(&GameState) -> Option<Transition>;

/// Ordered by priority. The first rule yielding a transition wins; a plain advance of the ball is the fallback.
const RULES: [Rule; 4] = [block_contact, all_blocks_destroyed, wall_reflection, paddle_contact];

/// Physically moves the game one time step forward.
///
/// The paddle always moves first, the ball's fate is decided by the first matching rule afterwards.
/// `state` remains untouched.
pub fn time_step(state: &GameState, control: PaddleControl) -> Transition {
    let mut state = *state;
    state.move_paddle(control);
    RULES.iter()
        .find_map(|rule| rule(&state))
        .unwrap_or_else(|| advance(&state))
}

fn cell_of(position: &Point2<f32>) -> Point2<i32> {
    Point2::new(position.x as i32, position.y as i32)
}

fn squared_distance(cell: &Point2<i32>, position: &Point2<f32>) -> f32 {
    (cell.x as f32 - position.x).powi(2) + (cell.y as f32 - position.y).powi(2)
}

/// Probes a few points along the ball's move vector against each nearby block.
/// Only one block is hit per step; the probing is coarse, so a contact may go unnoticed.
fn block_contact(state: &GameState) -> Option<Transition> {
    let ball = state.ball_position;
    let velocity = state.ball_velocity;

    let (idx, probe) = state.blocks.iter()
        .enumerate()
        .filter(|(_, block)| !block.destroyed)
        .filter(|(_, block)| squared_distance(&block.position, &ball) <= BLOCK_CONTACT_DISTANCE_SQUARED)
        .find_map(|(idx, block)| {
            BLOCK_CONTACT_PROBES.iter()
                .map(|&t| ball + velocity * t)
                .find(|probe| cell_of(probe) == block.position)
                .map(|probe| (idx, probe))
        })?;

    let mut next = *state;
    next.blocks[idx].destroyed = true;
    // reflect on the axis where the probe is farther off the cell center
    if (probe.x.fract() - 0.5).powi(2) >= (probe.y.fract() - 0.5).powi(2) {
        next.ball_velocity.x = -next.ball_velocity.x;
    } else {
        next.ball_velocity.y = -next.ball_velocity.y;
    }
    Some(Transition { state: next, reward: REWARD_BLOCK_HIT, terminal: false, event: StepEvent::BlockHit { block: idx } })
}

fn all_blocks_destroyed(state: &GameState) -> Option<Transition> {
    state.blocks.iter()
        .all(|b| b.destroyed)
        .then(|| Transition { state: *state, reward: REWARD_WIN, terminal: true, event: StepEvent::Win })
}

/// Reflects the ball on side walls and ceiling without moving it. This ends the step as `terminal`.
fn wall_reflection(state: &GameState) -> Option<Transition> {
    let target = state.ball_target();
    let hit_side_wall = target.x <= 0.0 || target.x >= state.grid_size.x as f32;
    let hit_ceiling = target.y >= state.grid_size.y as f32;
    if !hit_side_wall && !hit_ceiling {
        return None;
    }

    let mut next = *state;
    if hit_side_wall {
        next.ball_velocity.x = -next.ball_velocity.x;
    }
    if hit_ceiling {
        next.ball_velocity.y = -next.ball_velocity.y;
    }
    Some(Transition { state: next, reward: REWARD_STEP, terminal: true, event: StepEvent::WallReflection })
}

/// Ball reaching the paddle row either bounces off the paddle (steered by the hit offset) or is lost.
fn paddle_contact(state: &GameState) -> Option<Transition> {
    let target = cell_of(&state.ball_target());
    if target.y != state.paddle_position.y {
        return None;
    }

    let offset = target.x - state.paddle_position.x;
    if (-1..=state.paddle_width).contains(&offset) {
        let paddle_center_x = state.paddle_position.x as f32 + state.paddle_width as f32 / 2.0;
        let mut next = *state;
        next.ball_velocity.y = -next.ball_velocity.y;
        next.ball_velocity.x += (state.ball_position.x - paddle_center_x) * PADDLE_STEERING_FACTOR;
        next.ball_velocity = next.ball_velocity.normalize();
        Some(Transition { state: next, reward: REWARD_STEP, terminal: false, event: StepEvent::PaddleBounce })
    } else {
        Some(Transition { state: *state, reward: REWARD_LOSE, terminal: true, event: StepEvent::Miss })
    }
}

fn advance(state: &GameState) -> Transition {
    let mut next = *state;
    next.ball_position = state.ball_target();
    Transition { state: next, reward: REWARD_STEP, terminal: false, event: StepEvent::Advance }
}
