use std::io::Write;
use std::thread;
use std::time::Duration;

use anyhow::Result;

use breakout_qtable::environment::BreakoutEnvironment;
use breakout_qtable::mechanics::GameConfig;
use ql::learn::q_table::QTable;
use ql::learn::q_table_learner::{self, QTableLearner};
use ql::learn::q_table_player::{self, QTablePlayer};
use ql::log::init_logging;
use ql::prelude::DebugVisualizer;
use ql::util::fmt_count;

const FRAME_DELAY: Duration = Duration::from_millis(20);
const CLEAR_TERMINAL: &str = "\x1b[2J\x1b[H";

/// Alternates forever between learning a round of episodes and showing one greedy episode on the console
fn main() -> Result<()> {
    init_logging();

    let config = GameConfig::default();
    let mut table = QTable::new(BreakoutEnvironment::new(config.clone()).indexer());
    log::info!("q-table with {} slots", fmt_count(table.size()));

    let mut learner = QTableLearner::new(BreakoutEnvironment::new(config.clone()), q_table_learner::Parameter::default());
    let mut player = QTablePlayer::new(BreakoutEnvironment::new(config), q_table_player::Parameter::default());

    loop {
        learner.learn(&mut table)?;

        let episodes = learner.episode_count();
        player.play_episode(&table, |step, state, reward| {
            let mut stdout = std::io::stdout();
            write!(stdout, "{CLEAR_TERMINAL}")?;
            writeln!(stdout, "learned episodes: {}, step {step}, reward {reward}", fmt_count(episodes))?;
            writeln!(stdout, "{}", state.one_line_info())?;
            stdout.flush()?;
            state.render_to_console().draw();
            thread::sleep(FRAME_DELAY);
            Ok(())
        })?;
    }
}
