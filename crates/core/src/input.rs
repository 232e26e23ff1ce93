//! Mapping from viewer input to navigation actions.

use crate::config::PlayerConfig;

/// What a key or click asks the navigator to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavAction {
    Advance,
    Retreat,
    /// Switch to step-through, starting over from the first message
    StepThrough,
    ShowAll,
    /// Start step-through over without leaving it
    Restart,
}

impl NavAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            NavAction::Advance => "advance",
            NavAction::Retreat => "retreat",
            NavAction::StepThrough => "step-through",
            NavAction::ShowAll => "show-all",
            NavAction::Restart => "restart",
        }
    }
}

impl std::fmt::Display for NavAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// Key and pointer bindings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputMap {
    /// Primary button advances
    pub mouse_advance: bool,
    /// `r` restarts step-through instead of showing everything
    pub restart_key_resets: bool,
}

impl InputMap {
    pub fn from_config(player: &PlayerConfig) -> Self {
        Self { mouse_advance: player.mouse_advance, restart_key_resets: player.restart_key_resets }
    }

    /// Action for a key, named as DOM `KeyboardEvent.key` names it
    pub fn key(&self, key: &str) -> Option<NavAction> {
        match key {
            "ArrowDown" | "ArrowRight" => Some(NavAction::Advance),
            "ArrowUp" | "ArrowLeft" => Some(NavAction::Retreat),
            "i" | "I" => Some(NavAction::StepThrough),
            "r" | "R" if self.restart_key_resets => Some(NavAction::Restart),
            "r" | "R" => Some(NavAction::ShowAll),
            _ => None,
        }
    }

    pub fn pointer(&self, button: PointerButton) -> Option<NavAction> {
        match button {
            PointerButton::Primary if self.mouse_advance => Some(NavAction::Advance),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arrow_keys() {
        let map = InputMap::default();
        assert_eq!(map.key("ArrowDown"), Some(NavAction::Advance));
        assert_eq!(map.key("ArrowRight"), Some(NavAction::Advance));
        assert_eq!(map.key("ArrowUp"), Some(NavAction::Retreat));
        assert_eq!(map.key("ArrowLeft"), Some(NavAction::Retreat));
    }

    #[test]
    fn test_mode_keys() {
        let map = InputMap::default();
        assert_eq!(map.key("i"), Some(NavAction::StepThrough));
        assert_eq!(map.key("I"), Some(NavAction::StepThrough));
        assert_eq!(map.key("r"), Some(NavAction::ShowAll));
        assert_eq!(map.key("R"), Some(NavAction::ShowAll));
        assert_eq!(map.key("x"), None);
        assert_eq!(map.key("Enter"), None);
    }

    #[test]
    fn test_restart_binding() {
        let map = InputMap { restart_key_resets: true, ..InputMap::default() };
        assert_eq!(map.key("r"), Some(NavAction::Restart));
        assert_eq!(map.key("R"), Some(NavAction::Restart));
    }

    #[test]
    fn test_pointer() {
        let map = InputMap::default();
        assert_eq!(map.pointer(PointerButton::Primary), None);

        let map = InputMap::from_config(&PlayerConfig { mouse_advance: true, ..PlayerConfig::default() });
        assert_eq!(map.pointer(PointerButton::Primary), Some(NavAction::Advance));
        assert_eq!(map.pointer(PointerButton::Secondary), None);
        assert_eq!(map.pointer(PointerButton::Middle), None);
    }
}
