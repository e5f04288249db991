//! Key naming and control keys for terminal events.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Out-of-band commands that never reach the simulation as directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction {
    Quit,
    TogglePause,
    Step,
    Restart,
}

/// Lower-case key name as used by key bindings (`a`, `space`, `left`, ...).
pub fn key_name(key: &KeyEvent) -> Option<String> {
    let name = match key.code {
        KeyCode::Char(' ') => "space".to_string(),
        KeyCode::Char(c) => c.to_lowercase().collect(),
        KeyCode::Left => "left".to_string(),
        KeyCode::Right => "right".to_string(),
        KeyCode::Up => "up".to_string(),
        KeyCode::Down => "down".to_string(),
        KeyCode::Enter => "enter".to_string(),
        KeyCode::Tab => "tab".to_string(),
        KeyCode::Backspace => "backspace".to_string(),
        KeyCode::Esc => "escape".to_string(),
        _ => return None,
    };
    Some(name)
}

/// Map a key press to a control action.
pub fn control_action(key: &KeyEvent) -> Option<ControlAction> {
    if should_quit(key) {
        return Some(ControlAction::Quit);
    }
    match key.code {
        KeyCode::Char('p') | KeyCode::Char('P') | KeyCode::Esc => Some(ControlAction::TogglePause),
        KeyCode::Char('n') | KeyCode::Char('N') => Some(ControlAction::Step),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(ControlAction::Restart),
        _ => None,
    }
}

/// Check if key should quit the game.
pub fn should_quit(key: &KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q'))
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(code: KeyCode) -> Option<String> {
        key_name(&KeyEvent::from(code))
    }

    #[test]
    fn test_movement_key_names() {
        assert_eq!(name(KeyCode::Left).as_deref(), Some("left"));
        assert_eq!(name(KeyCode::Char('H')).as_deref(), Some("h"));
        assert_eq!(name(KeyCode::Char(' ')).as_deref(), Some("space"));
        assert_eq!(name(KeyCode::Down).as_deref(), Some("down"));
        assert_eq!(name(KeyCode::F(5)), None);
    }

    #[test]
    fn test_control_keys() {
        assert_eq!(
            control_action(&KeyEvent::from(KeyCode::Char('p'))),
            Some(ControlAction::TogglePause)
        );
        assert_eq!(
            control_action(&KeyEvent::from(KeyCode::Esc)),
            Some(ControlAction::TogglePause)
        );
        assert_eq!(
            control_action(&KeyEvent::from(KeyCode::Char('n'))),
            Some(ControlAction::Step)
        );
        assert_eq!(
            control_action(&KeyEvent::from(KeyCode::Char('R'))),
            Some(ControlAction::Restart)
        );
        assert_eq!(control_action(&KeyEvent::from(KeyCode::Char('a'))), None);
    }

    #[test]
    fn test_quit_keys() {
        assert!(should_quit(&KeyEvent::from(KeyCode::Char('q'))));
        assert!(should_quit(&KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL
        )));
        assert!(!should_quit(&KeyEvent::from(KeyCode::Char('x'))));
        assert_eq!(
            control_action(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(ControlAction::Quit)
        );
    }
}
