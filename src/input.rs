//! Key bindings: arrows, vim (hjkl) and wasd.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use twenty48tui::engine::{BoardSize, Direction};

/// Action from a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Move(Direction),
    Undo,
    NewGame,
    SetSize(BoardSize),
    SizeUp,
    SizeDown,
    Confirm,
    Quit,
    /// Leave immediately (Ctrl-C), skipping the quit menu.
    Exit,
    None,
}

/// Map key event to game action.
pub fn key_to_action(key: KeyEvent) -> Action {
    let KeyEvent { code, modifiers, .. } = key;
    if modifiers == KeyModifiers::CONTROL {
        return match code {
            KeyCode::Char('c') => Action::Exit,
            _ => Action::None,
        };
    }
    let no_mod = modifiers.is_empty() || modifiers == KeyModifiers::SHIFT;
    if !no_mod {
        return Action::None;
    }
    match code {
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Left | KeyCode::Char('h' | 'a') => Action::Move(Direction::Left),
        KeyCode::Right | KeyCode::Char('l' | 'd') => Action::Move(Direction::Right),
        KeyCode::Up | KeyCode::Char('k' | 'w') => Action::Move(Direction::Up),
        KeyCode::Down | KeyCode::Char('j' | 's') => Action::Move(Direction::Down),
        KeyCode::Char('u') | KeyCode::Backspace => Action::Undo,
        KeyCode::Char('n' | 'r') => Action::NewGame,
        KeyCode::Char(c @ '3'..='6') => BoardSize::new(c as usize - '0' as usize)
            .map(Action::SetSize)
            .unwrap_or(Action::None),
        KeyCode::Char(']' | '+' | '=') => Action::SizeUp,
        KeyCode::Char('[' | '-') => Action::SizeDown,
        KeyCode::Enter | KeyCode::Char(' ') => Action::Confirm,
        _ => Action::None,
    }
}
