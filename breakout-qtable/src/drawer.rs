use console_engine::pixel;
use console_engine::screen::Screen;
use ql::prelude::DebugVisualizer;

use crate::mechanics::GameState;

const BLOCK_GLYPH: char = 'x';
const BALL_GLYPH: char = 'o';
const PADDLE_GLYPH: char = '-';
const BORDER_GLYPH: char = '|';

/// Draws the grid framed by a border column on each side.
/// Row 0 of the game is the bottom line of the screen.
impl DebugVisualizer for GameState {
    fn one_line_info(&self) -> String {
        format!(
            "ball: ({:.2}, {:.2}) heading {:.0}°, paddle x: {}, blocks alive: {}",
            self.ball_position.x,
            self.ball_position.y,
            self.ball_velocity.y.atan2(self.ball_velocity.x).to_degrees(),
            self.paddle_position.x,
            self.alive_blocks().count()
        )
    }

    fn render_to_console(&self) -> Screen {
        let width = self.grid_size.x;
        let height = self.grid_size.y;
        let mut screen = Screen::new_empty(width as u32 + 2, height as u32);
        screen.clear();

        let mut put = |x: i32, y: i32, glyph: char| {
            if (0..width).contains(&x) && (0..height).contains(&y) {
                screen.set_pxl(x + 1, height - 1 - y, pixel::pxl(glyph));
            }
        };

        for block in self.alive_blocks() {
            put(block.position.x, block.position.y, BLOCK_GLYPH);
        }
        put(self.ball_position.x as i32, self.ball_position.y as i32, BALL_GLYPH);
        for x in self.paddle_position.x..self.paddle_position.x + self.paddle_width {
            put(x, self.paddle_position.y, PADDLE_GLYPH);
        }

        for row in 0..height {
            screen.set_pxl(0, row, pixel::pxl(BORDER_GLYPH));
            screen.set_pxl(width + 1, row, pixel::pxl(BORDER_GLYPH));
        }
        screen
    }
}
