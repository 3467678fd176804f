//! Keyboard mapping for the input adapter
//!
//! Arrow keys and WASD move, Space jumps, P or Escape toggles pause. Key
//! names are `KeyboardEvent.key` values.

use crate::sim::{Direction, Intent};

/// Movement direction bound to a key, if any
pub fn direction_for_key(key: &str) -> Option<Direction> {
    match key {
        "ArrowUp" | "w" | "W" => Some(Direction::Up),
        "ArrowDown" | "s" | "S" => Some(Direction::Down),
        "ArrowLeft" | "a" | "A" => Some(Direction::Left),
        "ArrowRight" | "d" | "D" => Some(Direction::Right),
        _ => None,
    }
}

/// Intent for a key press, if the key is bound
pub fn intent_for_key(key: &str) -> Option<Intent> {
    if let Some(dir) = direction_for_key(key) {
        return Some(Intent::Move(dir));
    }
    match key {
        " " | "Spacebar" => Some(Intent::Jump),
        "p" | "P" | "Escape" => Some(Intent::PauseToggle),
        _ => None,
    }
}
