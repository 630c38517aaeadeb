//! Front-panel input events

use serde::{Deserialize, Serialize};

/// The six front-panel keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKey {
    Up,
    Down,
    Left,
    Right,
    Ok,
    Back,
}

/// Kind of key event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    #[default]
    Press,
    Release,
    Repeat,
}

/// One event delivered through the input queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputEvent {
    pub key: InputKey,
    #[serde(default, rename = "type")]
    pub kind: InputType,
}

impl InputEvent {
    /// Create an event
    pub fn new(key: InputKey, kind: InputType) -> Self {
        Self { key, kind }
    }

    /// Shorthand for a press
    pub fn press(key: InputKey) -> Self {
        Self::new(key, InputType::Press)
    }

    /// Press and Repeat act; Release does not
    pub fn is_actionable(&self) -> bool {
        matches!(self.kind, InputType::Press | InputType::Repeat)
    }
}

impl std::fmt::Display for InputKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            InputKey::Up => "UP",
            InputKey::Down => "DOWN",
            InputKey::Left => "LEFT",
            InputKey::Right => "RIGHT",
            InputKey::Ok => "OK",
            InputKey::Back => "BACK",
        };
        write!(f, "{}", name)
    }
}
