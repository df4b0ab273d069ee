//! Key mapping for game commands
//!
//! Converts key events to the two commands the game understands.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use thiserror::Error;
use tracing::warn;

use crate::config::KeyConfig;

/// Commands triggered from the keyboard
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Leave immediately
    Quit,
    /// Flip between paused and running
    TogglePause,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum KeyParseError {
    #[error("Empty key name")]
    Empty,

    #[error("Unknown key name: {0}")]
    Unknown(String),
}

/// Parse a key name such as `"enter"`, `"esc"`, `"space"`, `"f5"` or a
/// single character like `"p"`
pub fn parse_key(name: &str) -> Result<KeyCode, KeyParseError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(KeyParseError::Empty);
    }

    let mut chars = trimmed.chars();
    if let (Some(ch), None) = (chars.next(), chars.next()) {
        return Ok(KeyCode::Char(ch.to_ascii_lowercase()));
    }

    let lower = trimmed.to_lowercase();
    let code = match lower.as_str() {
        "enter" | "return" => KeyCode::Enter,
        "esc" | "escape" => KeyCode::Esc,
        "space" => KeyCode::Char(' '),
        "tab" => KeyCode::Tab,
        "backspace" => KeyCode::Backspace,
        "delete" | "del" => KeyCode::Delete,
        "insert" | "ins" => KeyCode::Insert,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "pageup" => KeyCode::PageUp,
        "pagedown" => KeyCode::PageDown,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        other => match other.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
            Some(n @ 1..=12) => KeyCode::F(n),
            _ => return Err(KeyParseError::Unknown(trimmed.to_string())),
        },
    };
    Ok(code)
}

/// Maps key presses to commands
#[derive(Clone, Debug)]
pub struct KeyMapper {
    toggle: KeyCode,
    quit: KeyCode,
}

impl Default for KeyMapper {
    fn default() -> Self {
        Self::new(KeyCode::Enter, KeyCode::Esc)
    }
}

impl KeyMapper {
    pub fn new(toggle: KeyCode, quit: KeyCode) -> Self {
        Self { toggle, quit }
    }

    /// Build from configured key names, falling back to the defaults for
    /// names that do not parse
    pub fn from_config(keys: &KeyConfig) -> Self {
        let defaults = Self::default();
        let toggle = parse_key(&keys.toggle).unwrap_or_else(|e| {
            warn!("toggle key: {}; using {:?}", e, defaults.toggle);
            defaults.toggle
        });
        let quit = parse_key(&keys.quit).unwrap_or_else(|e| {
            warn!("quit key: {}; using {:?}", e, defaults.quit);
            defaults.quit
        });
        Self::new(toggle, quit)
    }

    /// Map a key press to a command
    pub fn map(&self, event: &KeyEvent) -> Option<Command> {
        // Raw mode swallows SIGINT, so Ctrl+C always quits
        if event.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(event.code, KeyCode::Char('c') | KeyCode::Char('C'))
        {
            return Some(Command::Quit);
        }

        let code = normalize(event.code);
        if code == self.quit {
            Some(Command::Quit)
        } else if code == self.toggle {
            Some(Command::TogglePause)
        } else {
            None
        }
    }
}

fn normalize(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(ch) => KeyCode::Char(ch.to_ascii_lowercase()),
        other => other,
    }
}
