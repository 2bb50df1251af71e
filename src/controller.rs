//! Application controller.
//!
//! Owns the terminal and runs the main loop: draw, poll input, feed the
//! elapsed wall-clock time to the game so its delayed steps and timers move.

use std::io::{self, Stdout};
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;

use crate::app::AppState;
use crate::event::{apply_action, handle_event, poll_event};
use crate::ui::glyphs::Glyphs;
use crate::ui::render;

/// Input poll timeout, also the redraw rate of the timers.
const TICK_RATE: Duration = Duration::from_millis(50);

/// The main application controller.
pub struct App {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    state: AppState,
    glyphs: Glyphs,
    tick_rate: Duration,
}

impl App {
    /// Switches the terminal to raw mode on the alternate screen.
    pub fn new(state: AppState, glyphs: Glyphs) -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(Self {
            terminal,
            state,
            glyphs,
            tick_rate: TICK_RATE,
        })
    }

    /// Runs the main application loop until the player quits.
    pub fn run(&mut self) -> Result<()> {
        info!(game = self.state.game.title(), "session started");
        let mut last_tick = Instant::now();

        loop {
            let glyphs = &self.glyphs;
            let state = &self.state;
            self.terminal.draw(|frame| render(frame, state, glyphs))?;

            if let Some(event) = poll_event(self.tick_rate) {
                let action = handle_event(event, &self.state.mode, self.state.show_help);
                if !apply_action(&mut self.state, action) {
                    break;
                }
            }

            feed_elapsed(&mut self.state, &mut last_tick, Instant::now());
        }

        let score = self.state.game.score();
        info!(score = score.score, mistakes = score.mistakes, "session ended");
        Ok(())
    }
}

impl Drop for App {
    fn drop(&mut self) {
        // Restore terminal
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// Feeds the wall-clock time since `last_tick` into the game.
fn feed_elapsed(state: &mut AppState, last_tick: &mut Instant, now: Instant) {
    state.tick(now.saturating_duration_since(*last_tick));
    *last_tick = now;
}

/// Runs the interactive game until the player quits.
pub fn run_app(state: AppState, glyphs: Glyphs) -> Result<()> {
    let mut app = App::new(state, glyphs)?;
    app.run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::Game;
    use crate::config::GameConfig;
    use crate::model::{Alphabet, Base, Sequence};
    use crate::source::FixedSource;
    use crate::stage::SynthesisStage;
    use crate::synthesis::SynthesisGame;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn state() -> AppState {
        let seq = Sequence::parse(Alphabet::Dna, "TAC").unwrap();
        let game = SynthesisGame::new(
            &GameConfig::default(),
            Box::new(FixedSource::new(seq)),
            StdRng::seed_from_u64(1),
        )
        .unwrap();
        AppState::new(Game::Synthesis(game))
    }

    #[test]
    fn test_feed_elapsed_moves_timers() {
        let mut state = state();
        let start = Instant::now();
        let mut last_tick = start;

        feed_elapsed(&mut state, &mut last_tick, start + Duration::from_millis(1100));
        assert_eq!(last_tick, start + Duration::from_millis(1100));
        let score = state.game.score();
        assert_eq!(score.stage_time_remaining, 14);
        assert_eq!(score.global_elapsed, 1);

        // A clock reading from the past moves nothing
        feed_elapsed(&mut state, &mut last_tick, start);
        assert_eq!(state.game.score().global_elapsed, 1);
    }

    #[test]
    fn test_feed_elapsed_runs_delayed_steps() {
        let mut state = state();
        for base in [Base::A, Base::U, Base::G] {
            state.place_base(base);
        }
        let start = Instant::now();
        let mut last_tick = start;

        feed_elapsed(&mut state, &mut last_tick, start + Duration::from_millis(1999));
        assert_eq!(state.game.stage_label(), SynthesisStage::Transcription.to_string());
        feed_elapsed(&mut state, &mut last_tick, start + Duration::from_millis(2000));
        assert_eq!(state.game.stage_label(), SynthesisStage::Translation.to_string());
        assert_eq!(state.pool_cursor, 0);
    }
}
