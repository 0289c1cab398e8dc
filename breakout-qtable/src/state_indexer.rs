use nalgebra::Vector2;
use ql::prelude::{Action, StateIndexer};

use crate::environment::BreakoutAction;
use crate::mechanics::{Block, GameConfig, GameState, MAX_BLOCKS};

/// Number of discrete ball headings
pub const HEADING_BUCKETS: usize = 10;

/// Discrete components of a (state, action) pair, least significant first
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct IndexComponents {
    pub ball_x: usize,
    pub ball_y: usize,
    pub heading: usize,
    pub alive_blocks: usize,
    pub paddle_x: usize,
    pub action: usize,
}

impl IndexComponents {
    fn as_array(&self) -> [usize; 6] {
        [self.ball_x, self.ball_y, self.heading, self.alive_blocks, self.paddle_x, self.action]
    }
}

/// Flattens a [GameState] plus [BreakoutAction] into a single table slot (mixed radix).
///
/// | component              | radix                         |
/// |------------------------|-------------------------------|
/// | ball x (truncated)     | grid width                    |
/// | ball y (truncated)     | grid height                   |
/// | ball heading bucket    | [HEADING_BUCKETS]             |
/// | alive blocks bitmask   | 2^[MAX_BLOCKS]                |
/// | paddle x               | grid width - paddle width + 1 |
/// | action                 | 2                             |
///
/// The ball must be inside the grid. That holds for every state, except the one delivered along with a miss,
/// which must not be indexed.
#[derive(Clone, Debug, PartialEq)]
pub struct BreakoutStateIndexer {
    grid_size: Vector2<i32>,
    radices: [usize; 6],
    pi: f32,
}

impl BreakoutStateIndexer {
    pub fn new(config: &GameConfig) -> Self {
        assert!(config.grid_size.x > 0 && config.grid_size.y > 0);
        assert!(config.paddle_width > 0 && config.paddle_width <= config.grid_size.x);
        let radices = [
            config.grid_size.x as usize,
            config.grid_size.y as usize,
            HEADING_BUCKETS,
            1 << MAX_BLOCKS,
            (config.grid_size.x - config.paddle_width + 1) as usize,
            BreakoutAction::ACTION_SPACE as usize,
        ];
        Self { grid_size: config.grid_size, radices, pi: config.pi }
    }

    pub fn components(&self, state: &GameState, action: BreakoutAction) -> IndexComponents {
        debug_assert_eq!(state.grid_size, self.grid_size, "state does not fit the table dimensions");
        IndexComponents {
            ball_x: grid_coordinate(state.ball_position.x, "ball x"),
            ball_y: grid_coordinate(state.ball_position.y, "ball y"),
            heading: heading_bucket(&state.ball_velocity, self.pi),
            alive_blocks: alive_blocks_mask(&state.blocks),
            paddle_x: grid_coordinate(state.paddle_position.x as f32, "paddle x"),
            action: action.numeric() as usize,
        }
    }

    /// Positional sum of the components; each component is weighted by the product of all radices before it
    pub fn flatten(&self, components: &IndexComponents) -> usize {
        components.as_array().iter()
            .zip(self.radices)
            .fold((0, 1), |(sum, weight), (&component, radix)| {
                assert!(component < radix, "index component {component} out of range 0..{radix} in {components:?}");
                (sum + component * weight, weight * radix)
            })
            .0
    }
}

impl StateIndexer for BreakoutStateIndexer {
    type S = GameState;
    type A = BreakoutAction;

    fn size(&self) -> usize {
        self.radices.iter().product()
    }

    fn index(&self, state: &GameState, action: BreakoutAction) -> usize {
        self.flatten(&self.components(state, action))
    }
}

fn grid_coordinate(value: f32, what: &str) -> usize {
    let truncated = value as i32;
    assert!(truncated >= 0, "{what} {value} outside of the grid");
    truncated as usize
}

/// Discrete heading of the ball's direction: the angle, normalized into `[0, 2π)`, falls into one of
/// [HEADING_BUCKETS] equally wide sectors.
pub fn heading_bucket(velocity: &Vector2<f32>, pi: f32) -> usize {
    let mut angle = velocity.y.atan2(velocity.x);
    if angle < 0.0 {
        angle += 2.0 * pi;
    }
    angle_bucket(angle, pi)
}

pub fn angle_bucket(angle: f32, pi: f32) -> usize {
    let sector = 2.0 * pi / HEADING_BUCKETS as f32;
    (0..HEADING_BUCKETS)
        .find(|&i| angle <= (i + 1) as f32 * sector)
        .unwrap_or(0)
}

/// Bit `i` is set, when block `i` is still alive
pub fn alive_blocks_mask(blocks: &[Block; MAX_BLOCKS]) -> usize {
    blocks.iter()
        .enumerate()
        .filter(|(_, b)| !b.destroyed)
        .fold(0, |mask, (i, _)| mask | 1 << i)
}

#[cfg(test)]
mod tests {
    use itertools::iproduct;
    use nalgebra::Point2;
    use rstest::rstest;

    use super::*;

    fn small_config() -> GameConfig {
        GameConfig {
            grid_size: Vector2::new(3, 2),
            paddle_width: 2,
            paddle_start: Point2::new(0, 0),
            ball_start: Point2::new(1.0, 1.0),
            ..GameConfig::default()
        }
    }

    #[rstest]
    #[case(GameConfig::default(), 79_872_000)]
    #[case(small_config(), 3 * 2 * 10 * 1024 * 2 * 2)]
    fn test_size(#[case] config: GameConfig, #[case] expected: usize) {
        let indexer = BreakoutStateIndexer::new(&config);
        let w = config.grid_size.x as usize;
        let h = config.grid_size.y as usize;
        let p = config.paddle_width as usize;
        assert_eq!(indexer.size(), expected);
        assert_eq!(indexer.size(), w * h * 10 * 1024 * (w - p + 1) * 2);
    }

    #[test]
    fn test_flatten_is_injective_and_in_range() {
        let indexer = BreakoutStateIndexer::new(&small_config());
        let size = indexer.size();
        let mut seen = vec![false; size];
        for (ball_x, ball_y, heading, alive_blocks, paddle_x, action) in iproduct!(0..3, 0..2, 0..10, 0..1024, 0..2, 0..2) {
            let idx = indexer.flatten(&IndexComponents { ball_x, ball_y, heading, alive_blocks, paddle_x, action });
            assert!(idx < size);
            assert!(!seen[idx], "index {idx} produced twice");
            seen[idx] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_component_weights() {
        let indexer = BreakoutStateIndexer::new(&GameConfig::default());
        let unit = |c: IndexComponents| indexer.flatten(&c);
        let zero = IndexComponents { ball_x: 0, ball_y: 0, heading: 0, alive_blocks: 0, paddle_x: 0, action: 0 };
        assert_eq!(unit(zero), 0);
        assert_eq!(unit(IndexComponents { ball_x: 1, ..zero }), 1);
        assert_eq!(unit(IndexComponents { ball_y: 1, ..zero }), 15);
        assert_eq!(unit(IndexComponents { heading: 1, ..zero }), 15 * 20);
        assert_eq!(unit(IndexComponents { alive_blocks: 1, ..zero }), 15 * 20 * 10);
        assert_eq!(unit(IndexComponents { paddle_x: 1, ..zero }), 15 * 20 * 10 * 1024);
        assert_eq!(unit(IndexComponents { action: 1, ..zero }), 15 * 20 * 10 * 1024 * 13);
    }

    #[test]
    fn test_index_of_initial_state() {
        let config = GameConfig::default();
        let indexer = BreakoutStateIndexer::new(&config);
        let state = GameState::new(&config);

        let components = indexer.components(&state, BreakoutAction::MoveRight);
        assert_eq!(components, IndexComponents { ball_x: 6, ball_y: 10, heading: 9, alive_blocks: 1023, paddle_x: 4, action: 1 });

        let idx = indexer.index(&state, BreakoutAction::MoveRight);
        assert_eq!(idx, indexer.index(&state, BreakoutAction::MoveRight));
        assert_ne!(idx, indexer.index(&state, BreakoutAction::MoveLeft));
        assert!(idx < indexer.size());
    }

    #[rstest]
    #[case(Vector2::new(1.0, 0.0), 0)]
    #[case(Vector2::new(1.0, 0.5), 0)]
    #[case(Vector2::new(0.0, 1.0), 2)]
    #[case(Vector2::new(- 1.0, 0.0), 5)]
    #[case(Vector2::new(- 1.0, - 0.01), 5)]
    #[case(Vector2::new(0.0, - 1.0), 7)]
    #[case(Vector2::new(1.0, - 0.1), 9)]
    fn test_heading_bucket(#[case] velocity: Vector2<f32>, #[case] expected: usize) {
        assert_eq!(heading_bucket(&velocity, 3.14), expected);
    }

    #[test]
    fn test_angle_bucket_constant_within_sector() {
        let pi = 3.14;
        let sector = 2.0 * pi / HEADING_BUCKETS as f32;
        for bucket in 0..HEADING_BUCKETS {
            for fraction in [0.05, 0.3, 0.5, 0.7, 0.95] {
                let angle = (bucket as f32 + fraction) * sector;
                assert_eq!(angle_bucket(angle, pi), bucket, "angle {angle}");
            }
        }
    }

    #[test]
    fn test_angle_bucket_total() {
        let steps = 10_000;
        for i in 0..steps {
            let angle = i as f32 * 2.0 * 3.14 / steps as f32;
            assert!(angle_bucket(angle, 3.14) < HEADING_BUCKETS);
        }
    }

    #[test]
    fn test_alive_blocks_mask() {
        let mut state = GameState::new(&GameConfig::default());
        assert_eq!(alive_blocks_mask(&state.blocks), 0b11_1111_1111);
        state.blocks[0].destroyed = true;
        state.blocks[9].destroyed = true;
        assert_eq!(alive_blocks_mask(&state.blocks), 0b01_1111_1110);
        state.blocks.iter_mut().for_each(|b| b.destroyed = true);
        assert_eq!(alive_blocks_mask(&state.blocks), 0);
    }

    #[rstest]
    #[case(Point2::new(15.2, 5.0))]
    #[case(Point2::new(5.0, 20.0))]
    #[case(Point2::new(- 1.5, 5.0))]
    #[should_panic]
    fn test_ball_outside_grid_is_rejected(#[case] position: Point2<f32>) {
        let config = GameConfig::default();
        let indexer = BreakoutStateIndexer::new(&config);
        let mut state = GameState::new(&config);
        state.ball_position = position;
        indexer.index(&state, BreakoutAction::MoveLeft);
    }
}
