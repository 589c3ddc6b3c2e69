use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::game::{Command, Direction, GamePhase};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    GameAction(Command),
    Quit,
    None,
}

/// Maps keys and gestures to game commands for the current phase.
///
/// Steering only gets through while the game is running; everything else
/// is swallowed apart from start/pause, reset and quit.
pub struct InputHandler;

impl InputHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn handle_key_event(&self, key: KeyEvent, phase: GamePhase) -> KeyAction {
        // Handle Ctrl+C
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return KeyAction::Quit;
        }

        match key.code {
            KeyCode::Char(' ') => match phase {
                GamePhase::Idle | GamePhase::Over => KeyAction::GameAction(Command::Start),
                GamePhase::Running | GamePhase::Paused => {
                    KeyAction::GameAction(Command::TogglePause)
                }
            },
            KeyCode::Char('p') | KeyCode::Char('P') => match phase {
                GamePhase::Running | GamePhase::Paused => {
                    KeyAction::GameAction(Command::TogglePause)
                }
                GamePhase::Idle | GamePhase::Over => KeyAction::None,
            },
            KeyCode::Char('r') | KeyCode::Char('R') => KeyAction::GameAction(Command::Reset),
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => KeyAction::Quit,
            code => match direction_for_key(code) {
                Some(direction) => self.steer(direction, phase),
                None => KeyAction::None,
            },
        }
    }

    /// Turn a finished swipe into a steering command
    pub fn handle_swipe(&self, direction: Direction, phase: GamePhase) -> KeyAction {
        self.steer(direction, phase)
    }

    fn steer(&self, direction: Direction, phase: GamePhase) -> KeyAction {
        if phase == GamePhase::Running {
            KeyAction::GameAction(Command::Turn(direction))
        } else {
            KeyAction::None
        }
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}

fn direction_for_key(code: KeyCode) -> Option<Direction> {
    match code {
        // Arrow keys
        KeyCode::Up => Some(Direction::Up),
        KeyCode::Down => Some(Direction::Down),
        KeyCode::Left => Some(Direction::Left),
        KeyCode::Right => Some(Direction::Right),

        // WASD
        KeyCode::Char('w') | KeyCode::Char('W') => Some(Direction::Up),
        KeyCode::Char('s') | KeyCode::Char('S') => Some(Direction::Down),
        KeyCode::Char('a') | KeyCode::Char('A') => Some(Direction::Left),
        KeyCode::Char('d') | KeyCode::Char('D') => Some(Direction::Right),

        _ => None,
    }
}
