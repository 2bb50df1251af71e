//! Keyboard event handling.
//!
//! - `1`-`4`: toggle the enzyme in that toolbox position
//! - `Enter`: deploy the selected enzymes, or offer the highlighted tRNA
//! - `a`/`c`/`g`/`t`/`u`: place a nucleotide on the slot under the cursor
//! - `h`/`l` or arrows: move the slot cursor
//! - `j`/`k` or arrows: move in the tRNA pool
//! - `r`: restart with a new sequence
//! - `?`: show help
//! - `:`: enter command mode (`:q` quits, `:h` help, `:r` restart)
//! - `Ctrl+C`: quit

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use std::time::Duration;

use crate::app::{AppMode, AppState};
use crate::model::Base;

/// Actions that can be triggered by keyboard input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Key not recognized
    None,
    Quit,
    /// Toggle the enzyme at this toolbox position
    ToggleTool(usize),
    /// Deploy or offer
    Confirm,
    PlaceBase(Base),
    SlotLeft,
    SlotRight,
    PoolUp,
    PoolDown,
    Restart,
    ShowHelp,
    DismissHelp,
    EnterCommandMode,
    CommandChar(char),
    ExecuteCommand,
    CancelCommand,
    CommandBackspace,
    /// Terminal resized
    Resize(u16, u16),
}

/// Polls for an event with a timeout.
///
/// Returns `None` if no event occurred within the timeout.
pub fn poll_event(timeout: Duration) -> Option<Event> {
    if event::poll(timeout).ok()? {
        event::read().ok()
    } else {
        None
    }
}

/// Converts a crossterm event to an Action based on current app mode.
pub fn handle_event(event: Event, mode: &AppMode, show_help: bool) -> Action {
    match event {
        Event::Key(key_event) => handle_key_event(key_event, mode, show_help),
        Event::Resize(width, height) => Action::Resize(width, height),
        _ => Action::None,
    }
}

fn handle_key_event(key: KeyEvent, mode: &AppMode, show_help: bool) -> Action {
    // Any key dismisses the help overlay
    if show_help {
        return Action::DismissHelp;
    }

    match mode {
        AppMode::Normal => handle_normal_mode(key),
        AppMode::Command(_) => handle_command_mode(key),
    }
}

fn handle_normal_mode(key: KeyEvent) -> Action {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Action::Quit;
    }

    match key.code {
        KeyCode::Char(c @ '1'..='4') => Action::ToggleTool(c as usize - '1' as usize),
        KeyCode::Enter | KeyCode::Char(' ') => Action::Confirm,

        KeyCode::Char(c @ ('a' | 'c' | 'g' | 't' | 'u' | 'A' | 'C' | 'G' | 'T' | 'U')) => {
            Base::from_char(c).map_or(Action::None, Action::PlaceBase)
        }

        KeyCode::Char('h') | KeyCode::Left => Action::SlotLeft,
        KeyCode::Char('l') | KeyCode::Right => Action::SlotRight,
        KeyCode::Char('k') | KeyCode::Up => Action::PoolUp,
        KeyCode::Char('j') | KeyCode::Down => Action::PoolDown,

        KeyCode::Char('r') => Action::Restart,
        KeyCode::Char('?') => Action::ShowHelp,
        KeyCode::Char(':') => Action::EnterCommandMode,

        _ => Action::None,
    }
}

fn handle_command_mode(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Enter => Action::ExecuteCommand,
        KeyCode::Esc => Action::CancelCommand,
        KeyCode::Backspace => Action::CommandBackspace,
        KeyCode::Char(c) => Action::CommandChar(c),
        _ => Action::None,
    }
}

/// Applies an action to the application state.
///
/// Returns `true` if the application should continue, `false` if it should quit.
pub fn apply_action(state: &mut AppState, action: Action) -> bool {
    match action {
        Action::None => {}
        Action::Quit => {
            state.should_quit = true;
        }
        Action::ToggleTool(position) => {
            state.toggle_tool(position);
        }
        Action::Confirm => {
            state.confirm();
        }
        Action::PlaceBase(base) => {
            state.place_base(base);
        }
        Action::SlotLeft => {
            state.slot_left();
        }
        Action::SlotRight => {
            state.slot_right();
        }
        Action::PoolUp => {
            state.pool_up();
        }
        Action::PoolDown => {
            state.pool_down();
        }
        Action::Restart => {
            state.restart();
        }
        Action::ShowHelp => {
            state.show_help();
        }
        Action::DismissHelp => {
            state.dismiss_help();
        }
        Action::EnterCommandMode => {
            state.enter_command_mode();
        }
        Action::CommandChar(c) => {
            state.command_input(c);
        }
        Action::ExecuteCommand => {
            state.execute_command();
        }
        Action::CancelCommand => {
            state.cancel_command();
        }
        Action::CommandBackspace => {
            state.command_backspace();
        }
        Action::Resize(_, _) => {
            // Layout is recomputed on every draw
        }
    }

    !state.should_quit
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_tool_keys() {
        let mode = AppMode::Normal;
        assert_eq!(handle_key_event(key(KeyCode::Char('1')), &mode, false), Action::ToggleTool(0));
        assert_eq!(handle_key_event(key(KeyCode::Char('4')), &mode, false), Action::ToggleTool(3));
        assert_eq!(handle_key_event(key(KeyCode::Char('5')), &mode, false), Action::None);
        assert_eq!(handle_key_event(key(KeyCode::Enter), &mode, false), Action::Confirm);
    }

    #[test]
    fn test_base_keys() {
        let mode = AppMode::Normal;
        assert_eq!(
            handle_key_event(key(KeyCode::Char('a')), &mode, false),
            Action::PlaceBase(Base::A)
        );
        assert_eq!(
            handle_key_event(key(KeyCode::Char('U')), &mode, false),
            Action::PlaceBase(Base::U)
        );
        // 'g' is a base, not a navigation prefix
        assert_eq!(
            handle_key_event(key(KeyCode::Char('g')), &mode, false),
            Action::PlaceBase(Base::G)
        );
    }

    #[test]
    fn test_navigation() {
        let mode = AppMode::Normal;
        assert_eq!(handle_key_event(key(KeyCode::Char('h')), &mode, false), Action::SlotLeft);
        assert_eq!(handle_key_event(key(KeyCode::Right), &mode, false), Action::SlotRight);
        assert_eq!(handle_key_event(key(KeyCode::Char('j')), &mode, false), Action::PoolDown);
        assert_eq!(handle_key_event(key(KeyCode::Up), &mode, false), Action::PoolUp);
    }

    #[test]
    fn test_command_mode_input() {
        let mode = AppMode::Command(String::new());
        assert_eq!(handle_key_event(key(KeyCode::Char('q')), &mode, false), Action::CommandChar('q'));
        assert_eq!(handle_key_event(key(KeyCode::Enter), &mode, false), Action::ExecuteCommand);
        assert_eq!(handle_key_event(key(KeyCode::Esc), &mode, false), Action::CancelCommand);
    }

    #[test]
    fn test_ctrl_c_quit() {
        let mode = AppMode::Normal;
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(handle_key_event(key, &mode, false), Action::Quit);
    }

    #[test]
    fn test_dismiss_help() {
        let mode = AppMode::Normal;
        assert_eq!(handle_key_event(key(KeyCode::Char('x')), &mode, true), Action::DismissHelp);
        assert_eq!(handle_key_event(key(KeyCode::Esc), &mode, true), Action::DismissHelp);
    }
}
