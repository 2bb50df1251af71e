//! Terminal application state.
//!
//! Wraps the running game together with what only the terminal needs: the
//! slot cursor, the highlighted tRNA, the command line and the last message.

use std::collections::VecDeque;
use std::time::Duration;

use tracing::{debug, error};

use crate::engine::{Action, GameEvent, MessageKind, Outcome, Payload, Simulation};
use crate::model::Base;
use crate::replication::ReplicationGame;
use crate::scoring::ScoreState;
use crate::source::SourceError;
use crate::stage::{Stage, SynthesisStage};
use crate::synthesis::SynthesisGame;

/// Events kept for the history panel.
const HISTORY_LEN: usize = 8;

/// The game being played.
pub enum Game {
    Replication(ReplicationGame),
    Synthesis(SynthesisGame),
}

impl Game {
    pub fn title(&self) -> &'static str {
        match self {
            Game::Replication(_) => "DNA Replication",
            Game::Synthesis(_) => "Protein Synthesis",
        }
    }

    pub fn handle(&mut self, action: Action) -> Outcome {
        match self {
            Game::Replication(game) => game.handle(action),
            Game::Synthesis(game) => game.handle(action),
        }
    }

    pub fn advance(&mut self, dt: Duration) {
        match self {
            Game::Replication(game) => game.advance(dt),
            Game::Synthesis(game) => game.advance(dt),
        }
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        match self {
            Game::Replication(game) => game.drain_events(),
            Game::Synthesis(game) => game.drain_events(),
        }
    }

    pub fn restart(&mut self) -> Result<(), SourceError> {
        match self {
            Game::Replication(game) => game.restart(),
            Game::Synthesis(game) => game.restart(),
        }
    }

    pub fn score(&self) -> ScoreState {
        match self {
            Game::Replication(game) => game.score(),
            Game::Synthesis(game) => game.score(),
        }
    }

    pub fn stage_label(&self) -> String {
        match self {
            Game::Replication(game) => game.stage().to_string(),
            Game::Synthesis(game) => game.stage().to_string(),
        }
    }

    pub fn instruction(&self) -> &'static str {
        match self {
            Game::Replication(game) => game.stage().instruction(),
            Game::Synthesis(game) => game.stage().instruction(),
        }
    }

    pub fn is_complete(&self) -> bool {
        match self {
            Game::Replication(game) => game.is_complete(),
            Game::Synthesis(game) => game.is_complete(),
        }
    }

    /// Number of slots the cursor can move over.
    fn slot_count(&self) -> usize {
        match self {
            Game::Replication(game) => game
                .active_strand()
                .map_or(0, |strand| game.ledger(strand).len()),
            Game::Synthesis(game) => game.transcript().len(),
        }
    }

    /// The slot the player has to fill next.
    fn current_target(&self) -> Option<usize> {
        match self {
            Game::Replication(game) => game
                .active_strand()
                .and_then(|strand| game.ledger(strand).current_target())
                .map(|slot| slot.index),
            Game::Synthesis(game) => game.transcript().current_target().map(|slot| slot.index),
        }
    }
}

/// Input mode of the terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppMode {
    Normal,
    /// Typing a `:` command.
    Command(String),
}

/// Everything the renderer needs.
pub struct AppState {
    pub game: Game,
    pub mode: AppMode,
    /// Slot under the cursor.
    pub slot_cursor: usize,
    /// Highlighted tRNA in the pool.
    pub pool_cursor: usize,
    pub show_help: bool,
    pub should_quit: bool,
    pub message: Option<(String, MessageKind)>,
    pub history: VecDeque<String>,
}

impl AppState {
    pub fn new(game: Game) -> Self {
        let mut state = Self {
            game,
            mode: AppMode::Normal,
            slot_cursor: 0,
            pool_cursor: 0,
            show_help: false,
            should_quit: false,
            message: None,
            history: VecDeque::with_capacity(HISTORY_LEN),
        };
        state.collect_events();
        state
    }

    /// Moves game time forward and picks up what happened.
    pub fn tick(&mut self, dt: Duration) {
        self.game.advance(dt);
        self.collect_events();
    }

    /// Pulls pending game events into the message line and history.
    pub fn collect_events(&mut self) {
        for event in self.game.drain_events() {
            match &event {
                GameEvent::MessageRaised { text, kind } => {
                    self.message = Some((text.clone(), *kind));
                }
                GameEvent::StageChanged { .. } => {
                    self.slot_cursor = 0;
                    self.pool_cursor = 0;
                }
                GameEvent::SlotFilled { .. } => {
                    if let Some(target) = self.game.current_target() {
                        self.slot_cursor = target;
                    }
                }
                GameEvent::TimerTick { .. } | GameEvent::ScoreChanged { .. } => continue,
                GameEvent::ProcessComplete { .. } => {}
            }
            if self.history.len() == HISTORY_LEN {
                self.history.pop_front();
            }
            self.history.push_back(event.to_string());
        }
    }

    fn submit(&mut self, action: Action) -> Outcome {
        debug!(?action, "player action");
        let outcome = self.game.handle(action);
        self.collect_events();
        outcome
    }

    /// Toggles the enzyme shown at `position` in the toolbox.
    pub fn toggle_tool(&mut self, position: usize) {
        if let Game::Replication(game) = &self.game {
            if let Some(&enzyme) = game.toolbox().get(position) {
                self.submit(Action::ToggleTool(enzyme));
            }
        }
    }

    /// Enter: deploy in replication, offer the highlighted tRNA in translation.
    pub fn confirm(&mut self) {
        match &self.game {
            Game::Replication(_) => {
                self.submit(Action::Deploy);
            }
            Game::Synthesis(game) if game.stage() == SynthesisStage::Translation => {
                if let Some(trna) = game.pool().get(self.pool_cursor).cloned() {
                    self.submit(Action::BeginDrag(Payload::Trna(trna)));
                    self.submit(Action::DropOnSite);
                }
            }
            Game::Synthesis(_) => {}
        }
    }

    /// Drops `base` on the slot under the cursor.
    pub fn place_base(&mut self, base: Base) {
        self.submit(Action::BeginDrag(Payload::Base(base)));
        let index = self.slot_cursor;
        self.submit(Action::DropOnSlot { index });
    }

    pub fn slot_left(&mut self) {
        self.slot_cursor = self.slot_cursor.saturating_sub(1);
    }

    pub fn slot_right(&mut self) {
        let count = self.game.slot_count();
        if self.slot_cursor + 1 < count {
            self.slot_cursor += 1;
        }
    }

    pub fn pool_up(&mut self) {
        self.pool_cursor = self.pool_cursor.saturating_sub(1);
    }

    pub fn pool_down(&mut self) {
        let len = match &self.game {
            Game::Synthesis(game) => game.pool().len(),
            Game::Replication(_) => 0,
        };
        if self.pool_cursor + 1 < len {
            self.pool_cursor += 1;
        }
    }

    pub fn restart(&mut self) {
        match self.game.restart() {
            Ok(()) => {
                self.slot_cursor = 0;
                self.pool_cursor = 0;
                self.history.clear();
                self.collect_events();
            }
            Err(err) => {
                error!(%err, "restart failed");
                self.message = Some((format!("Cannot restart: {err}"), MessageKind::Error));
            }
        }
    }

    pub fn show_help(&mut self) {
        self.show_help = true;
    }

    pub fn dismiss_help(&mut self) {
        self.show_help = false;
    }

    pub fn enter_command_mode(&mut self) {
        self.mode = AppMode::Command(String::new());
    }

    pub fn command_input(&mut self, c: char) {
        if let AppMode::Command(buffer) = &mut self.mode {
            buffer.push(c);
        }
    }

    pub fn command_backspace(&mut self) {
        if let AppMode::Command(buffer) = &mut self.mode {
            if buffer.pop().is_none() {
                self.mode = AppMode::Normal;
            }
        }
    }

    pub fn cancel_command(&mut self) {
        self.mode = AppMode::Normal;
    }

    /// Runs the typed command: `q` quits, `h` shows help, `r` restarts.
    pub fn execute_command(&mut self) {
        let AppMode::Command(buffer) = std::mem::replace(&mut self.mode, AppMode::Normal) else {
            return;
        };
        match buffer.trim() {
            "q" | "quit" => self.should_quit = true,
            "h" | "help" => self.show_help(),
            "r" | "restart" => self.restart(),
            "" => {}
            other => {
                self.message = Some((format!("Unknown command: {other}"), MessageKind::Error));
            }
        }
    }
}
