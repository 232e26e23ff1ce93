mod event_loop;
mod rendering;

use crate::event_handler::{EventHandler, KeyAction};

use chatreel_core::{Effect, InputMap, Navigator, NodeId};
use crossterm::event::Event;
use ratatui::{Frame, Terminal, backend::CrosstermBackend};
use std::io::Result;
use std::time::{Duration, Instant};
use tracing::debug;

/// Terminal player
///
/// Owns the [`Navigator`] and maps wall-clock time onto its virtual clock.
pub struct App {
    navigator: Navigator,
    input: InputMap,
    started: Instant,
    /// First transcript line in view
    scroll: usize,
    pending_scroll: Option<NodeId>,
    viewport_height: u16,
    pub should_exit: bool,
}

impl App {
    pub fn new(mut navigator: Navigator, input: InputMap) -> Self {
        let pending_scroll = last_scroll_target(navigator.take_effects());
        Self {
            navigator,
            input,
            started: Instant::now(),
            scroll: 0,
            pending_scroll,
            viewport_height: 0,
            should_exit: false,
        }
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn input(&self) -> &InputMap {
        &self.input
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }

    /// Time since the player started
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Run deferred navigator work due by `now`
    pub fn tick(&mut self, now: Duration) {
        self.navigator.tick(now);
        self.collect_effects();
    }

    pub fn handle_event(&mut self, event: &Event) {
        let now = self.elapsed();
        self.handle_event_at(event, now);
    }

    pub fn handle_event_at(&mut self, event: &Event, now: Duration) {
        if let Some(action) = EventHandler::handle_event(event, &self.input) {
            self.apply_action(action, now);
        }
    }

    pub fn apply_action(&mut self, action: KeyAction, now: Duration) {
        let page = usize::from(self.viewport_height.max(2) - 1);
        match action {
            KeyAction::Navigate(action) => {
                self.navigator.tick(now);
                self.navigator.dispatch(action);
                self.collect_effects();
            }
            KeyAction::ScrollUp { lines } => self.scroll = self.scroll.saturating_sub(lines),
            KeyAction::ScrollDown { lines } => self.scroll += lines,
            KeyAction::PageUp => self.scroll = self.scroll.saturating_sub(page),
            KeyAction::PageDown => self.scroll += page,
            KeyAction::Quit => {
                debug!("quit requested");
                self.should_exit = true;
            }
        }
    }

    fn collect_effects(&mut self) {
        if let Some(target) = last_scroll_target(self.navigator.take_effects()) {
            self.pending_scroll = Some(target);
        }
    }

    /// Render into any backend's frame
    pub fn render(&mut self, frame: &mut Frame<'_>) {
        rendering::render(self, frame);
    }

    /// Draw the UI
    pub fn draw(&mut self, terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>) -> Result<()> {
        terminal.draw(|frame| self.render(frame))?;
        Ok(())
    }

    /// Run the player until the viewer quits
    pub async fn run(&mut self) -> Result<()> {
        event_loop::run(self).await
    }
}

fn last_scroll_target(effects: Vec<Effect>) -> Option<NodeId> {
    effects.into_iter().rev().find_map(|effect| match effect {
        Effect::ScrollIntoView(node) => Some(node),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatreel_core::{Config, DisplayMode, Document, InitialMode, NavAction};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    const CHAT: &str = concat!(
        r#"<div data-testid="message-list">"#,
        r#"<div data-testid="union_message"><div data-testid="send_message">Hi</div></div>"#,
        r#"<div data-testid="union_message"><p>Hello</p></div>"#,
        r#"</div>"#,
    );

    fn create_test_app(mode: InitialMode) -> App {
        let mut config = Config::default();
        config.player.initial_mode = mode;
        let navigator = Navigator::from_config(Document::parse(CHAT), &config).unwrap();
        App::new(navigator, InputMap::from_config(&config.player))
    }

    fn press(app: &mut App, code: KeyCode, now: Duration) {
        app.handle_event_at(&Event::Key(KeyEvent::new(code, KeyModifiers::NONE)), now);
    }

    #[test]
    fn test_app_new_takes_initial_scroll() {
        let app = create_test_app(InitialMode::StepThrough);
        let first = app.navigator().transcript().get(0).unwrap().node;
        assert_eq!(app.pending_scroll, Some(first));
        assert_eq!(app.navigator().state().mode, DisplayMode::StepThrough);
        assert!(!app.should_exit);
    }

    #[test]
    fn test_keys_drive_navigator() {
        let mut app = create_test_app(InitialMode::StepThrough);
        press(&mut app, KeyCode::Down, Duration::ZERO);
        assert_eq!(app.navigator().state().current_index, Some(1));
        assert!(app.navigator().state().is_typing);

        app.tick(Duration::from_secs(1));
        assert!(!app.navigator().state().is_typing);
        let reply = app.navigator().transcript().get(1).unwrap().node;
        assert_eq!(app.pending_scroll, Some(reply));

        press(&mut app, KeyCode::Char('r'), Duration::from_secs(2));
        assert_eq!(app.navigator().state().mode, DisplayMode::ShowAll);
    }

    #[test]
    fn test_scroll_actions() {
        let mut app = create_test_app(InitialMode::ShowAll);
        app.viewport_height = 10;
        app.apply_action(KeyAction::PageDown, Duration::ZERO);
        assert_eq!(app.scroll(), 9);
        app.apply_action(KeyAction::ScrollUp { lines: 3 }, Duration::ZERO);
        assert_eq!(app.scroll(), 6);
        app.apply_action(KeyAction::PageUp, Duration::ZERO);
        assert_eq!(app.scroll(), 0);
    }

    #[test]
    fn test_quit() {
        let mut app = create_test_app(InitialMode::ShowAll);
        press(&mut app, KeyCode::Char('q'), Duration::ZERO);
        assert!(app.should_exit);
    }

    #[test]
    fn test_navigate_in_show_all_is_inert() {
        let mut app = create_test_app(InitialMode::ShowAll);
        app.apply_action(KeyAction::Navigate(NavAction::Advance), Duration::ZERO);
        assert_eq!(app.navigator().state().current_index, Some(0));
    }
}
