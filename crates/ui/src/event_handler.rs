use chatreel_core::{InputMap, NavAction, PointerButton};
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

/// Lines moved by one mouse wheel notch
const WHEEL_LINES: usize = 3;

/// Actions that can be triggered by terminal events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Forward to the navigator
    Navigate(NavAction),
    ScrollUp { lines: usize },
    ScrollDown { lines: usize },
    PageUp,
    PageDown,
    Quit,
}

/// Event handler for the player
pub struct EventHandler;

impl EventHandler {
    /// Name a key the way DOM `KeyboardEvent.key` does
    pub fn dom_key(code: KeyCode) -> Option<String> {
        match code {
            KeyCode::Down => Some("ArrowDown".to_string()),
            KeyCode::Right => Some("ArrowRight".to_string()),
            KeyCode::Up => Some("ArrowUp".to_string()),
            KeyCode::Left => Some("ArrowLeft".to_string()),
            KeyCode::Char(c) => Some(c.to_string()),
            _ => None,
        }
    }

    /// Handle a keyboard event
    pub fn handle_key_event(event: KeyEvent, input: &InputMap) -> Option<KeyAction> {
        if event.kind != KeyEventKind::Press {
            return None;
        }

        match event.code {
            KeyCode::Char('c') if event.modifiers.contains(KeyModifiers::CONTROL) => Some(KeyAction::Quit),
            KeyCode::Char('q') | KeyCode::Esc => Some(KeyAction::Quit),
            KeyCode::PageUp => Some(KeyAction::PageUp),
            KeyCode::PageDown => Some(KeyAction::PageDown),
            code => Self::dom_key(code).and_then(|key| input.key(&key)).map(KeyAction::Navigate),
        }
    }

    pub fn handle_mouse_event(event: MouseEvent, input: &InputMap) -> Option<KeyAction> {
        match event.kind {
            MouseEventKind::Down(button) => {
                let button = match button {
                    MouseButton::Left => PointerButton::Primary,
                    MouseButton::Right => PointerButton::Secondary,
                    MouseButton::Middle => PointerButton::Middle,
                };
                input.pointer(button).map(KeyAction::Navigate)
            }
            MouseEventKind::ScrollUp => Some(KeyAction::ScrollUp { lines: WHEEL_LINES }),
            MouseEventKind::ScrollDown => Some(KeyAction::ScrollDown { lines: WHEEL_LINES }),
            _ => None,
        }
    }

    pub fn handle_event(event: &Event, input: &InputMap) -> Option<KeyAction> {
        match event {
            Event::Key(key_event) => Self::handle_key_event(*key_event, input),
            Event::Mouse(mouse_event) => Self::handle_mouse_event(*mouse_event, input),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn click(button: MouseButton) -> MouseEvent {
        MouseEvent { kind: MouseEventKind::Down(button), column: 0, row: 0, modifiers: KeyModifiers::NONE }
    }

    #[test]
    fn test_arrows_navigate() {
        let input = InputMap::default();
        assert_eq!(
            EventHandler::handle_key_event(key(KeyCode::Down), &input),
            Some(KeyAction::Navigate(NavAction::Advance))
        );
        assert_eq!(
            EventHandler::handle_key_event(key(KeyCode::Right), &input),
            Some(KeyAction::Navigate(NavAction::Advance))
        );
        assert_eq!(
            EventHandler::handle_key_event(key(KeyCode::Up), &input),
            Some(KeyAction::Navigate(NavAction::Retreat))
        );
        assert_eq!(
            EventHandler::handle_key_event(key(KeyCode::Left), &input),
            Some(KeyAction::Navigate(NavAction::Retreat))
        );
    }

    #[test]
    fn test_mode_keys() {
        let input = InputMap::default();
        assert_eq!(
            EventHandler::handle_key_event(key(KeyCode::Char('I')), &input),
            Some(KeyAction::Navigate(NavAction::StepThrough))
        );
        assert_eq!(
            EventHandler::handle_key_event(key(KeyCode::Char('r')), &input),
            Some(KeyAction::Navigate(NavAction::ShowAll))
        );

        let input = InputMap { restart_key_resets: true, ..InputMap::default() };
        assert_eq!(
            EventHandler::handle_key_event(key(KeyCode::Char('R')), &input),
            Some(KeyAction::Navigate(NavAction::Restart))
        );
    }

    #[test]
    fn test_quit_and_scroll_keys() {
        let input = InputMap::default();
        assert_eq!(EventHandler::handle_key_event(key(KeyCode::Char('q')), &input), Some(KeyAction::Quit));
        assert_eq!(EventHandler::handle_key_event(key(KeyCode::Esc), &input), Some(KeyAction::Quit));
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(EventHandler::handle_key_event(ctrl_c, &input), Some(KeyAction::Quit));
        assert_eq!(EventHandler::handle_key_event(key(KeyCode::Char('c')), &input), None);
        assert_eq!(EventHandler::handle_key_event(key(KeyCode::PageUp), &input), Some(KeyAction::PageUp));
        assert_eq!(EventHandler::handle_key_event(key(KeyCode::PageDown), &input), Some(KeyAction::PageDown));
        assert_eq!(EventHandler::handle_key_event(key(KeyCode::Enter), &input), None);
    }

    #[test]
    fn test_release_ignored() {
        let mut event = key(KeyCode::Down);
        event.kind = KeyEventKind::Release;
        assert_eq!(EventHandler::handle_key_event(event, &InputMap::default()), None);
    }

    #[test]
    fn test_mouse() {
        let input = InputMap::default();
        assert_eq!(EventHandler::handle_mouse_event(click(MouseButton::Left), &input), None);

        let input = InputMap { mouse_advance: true, ..InputMap::default() };
        let event = Event::Mouse(click(MouseButton::Left));
        assert_eq!(EventHandler::handle_event(&event, &input), Some(KeyAction::Navigate(NavAction::Advance)));
        assert_eq!(EventHandler::handle_mouse_event(click(MouseButton::Right), &input), None);

        let wheel = MouseEvent { kind: MouseEventKind::ScrollUp, column: 0, row: 0, modifiers: KeyModifiers::NONE };
        assert_eq!(EventHandler::handle_mouse_event(wheel, &input), Some(KeyAction::ScrollUp { lines: WHEEL_LINES }));
    }

    #[test]
    fn test_dom_key_names() {
        assert_eq!(EventHandler::dom_key(KeyCode::Down).as_deref(), Some("ArrowDown"));
        assert_eq!(EventHandler::dom_key(KeyCode::Char('i')).as_deref(), Some("i"));
        assert_eq!(EventHandler::dom_key(KeyCode::Tab), None);
    }
}
