use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::game::Direction;

/// What a key press asks the host to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Request a new heading for the next tick
    Steer(Direction),
    /// Start a new game
    Restart,
    Quit,
    None,
}

/// Maps raw key events to game intents
///
/// Arrow keys, WASD and vi keys (hjkl) steer, R restarts, Q/Esc/Ctrl+C quit.
/// Key releases are ignored so a held key counts once per press.
#[derive(Debug, Default, Clone, Copy)]
pub struct InputHandler;

impl InputHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn handle_key_event(&self, key: KeyEvent) -> KeyAction {
        if key.kind == KeyEventKind::Release {
            return KeyAction::None;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('c') | KeyCode::Char('C') => KeyAction::Quit,
                _ => KeyAction::None,
            };
        }

        if let Some(direction) = steer_direction(key.code) {
            return KeyAction::Steer(direction);
        }

        match key.code {
            KeyCode::Esc => KeyAction::Quit,
            KeyCode::Char(c) => match c.to_ascii_lowercase() {
                'q' => KeyAction::Quit,
                'r' => KeyAction::Restart,
                _ => KeyAction::None,
            },
            _ => KeyAction::None,
        }
    }
}

fn steer_direction(code: KeyCode) -> Option<Direction> {
    let direction = match code {
        KeyCode::Up => Direction::Up,
        KeyCode::Down => Direction::Down,
        KeyCode::Left => Direction::Left,
        KeyCode::Right => Direction::Right,
        KeyCode::Char(c) => match c.to_ascii_lowercase() {
            'w' | 'k' => Direction::Up,
            's' | 'j' => Direction::Down,
            'a' | 'h' => Direction::Left,
            'd' | 'l' => Direction::Right,
            _ => return None,
        },
        _ => return None,
    };
    Some(direction)
}
