//! Key handling for the interactive view.
//!
//! Maps a key press to a `KeyAction` that the App executes, keeping the
//! decision separate from the side effects.

use crossterm::event::{KeyCode, KeyModifiers};

/// Action to execute for a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// No action needed
    None,
    /// Re-fetch usage now
    Refresh,
    /// Leave the app
    Quit,
}

/// Resolve a key press
pub fn resolve_key(code: KeyCode, modifiers: KeyModifiers) -> KeyAction {
    match code {
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => KeyAction::Quit,
        KeyCode::Char('q') | KeyCode::Esc => KeyAction::Quit,
        KeyCode::Char('r') | KeyCode::Char('R') => KeyAction::Refresh,
        _ => KeyAction::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quit_keys() {
        assert_eq!(resolve_key(KeyCode::Char('q'), KeyModifiers::NONE), KeyAction::Quit);
        assert_eq!(resolve_key(KeyCode::Esc, KeyModifiers::NONE), KeyAction::Quit);
        assert_eq!(
            resolve_key(KeyCode::Char('c'), KeyModifiers::CONTROL),
            KeyAction::Quit
        );
    }

    #[test]
    fn test_refresh_and_other_keys() {
        assert_eq!(
            resolve_key(KeyCode::Char('r'), KeyModifiers::NONE),
            KeyAction::Refresh
        );
        assert_eq!(resolve_key(KeyCode::Char('c'), KeyModifiers::NONE), KeyAction::None);
        assert_eq!(resolve_key(KeyCode::Enter, KeyModifiers::NONE), KeyAction::None);
    }
}
