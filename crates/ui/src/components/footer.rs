use crate::theme::Theme;

use chatreel_core::{InputMap, NavAction, NavigatorState};
use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};
use unicode_width::UnicodeWidthStr;

/// Hint glyph and the key it stands for, as `InputMap::key` names it
const BINDINGS: &[(&str, &str)] = &[("←↑", "ArrowUp"), ("↓→", "ArrowDown"), ("i", "i"), ("r", "r")];

fn hint_label(action: NavAction) -> &'static str {
    match action {
        NavAction::Advance => "next",
        NavAction::Retreat => "back",
        NavAction::StepThrough => "step",
        NavAction::ShowAll => "all",
        NavAction::Restart => "restart",
    }
}

/// Status bar: mode, position and typing state on the left, key hints on the right
pub struct Footer {
    state: NavigatorState,
    total: usize,
    hints: Vec<(&'static str, &'static str)>,
}

impl Footer {
    pub fn new(state: NavigatorState, total: usize, input: &InputMap) -> Self {
        let mut hints: Vec<_> = BINDINGS
            .iter()
            .filter_map(|(glyph, key)| input.key(key).map(|action| (*glyph, hint_label(action))))
            .collect();
        hints.push(("q", "quit"));
        Self { state, total, hints }
    }

    /// Position label, one-based
    pub fn position(&self) -> String {
        match self.state.current_index {
            Some(index) => format!("{}/{}", index + 1, self.total),
            None => format!("-/{}", self.total),
        }
    }

    pub fn status_spans(&self) -> Vec<Span<'static>> {
        let mut spans = vec![
            Span::styled(" ", Theme::panel()),
            Theme::mode_span(self.state.mode.as_str()),
            Span::styled("  ", Theme::panel()),
            Span::styled(self.position(), Theme::panel()),
        ];
        if self.state.is_typing {
            spans.push(Span::styled("  typing…", Style::default().fg(Theme::YELLOW).bg(Theme::PANEL_BG)));
        }
        spans
    }

    fn hint_spans(&self, available: usize) -> Vec<Span<'static>> {
        let mut spans = Vec::new();
        let mut used = 0;
        for (key, label) in &self.hints {
            let width = key.width() + label.width() + 4;
            if used + width > available {
                break;
            }
            used += width;
            spans.push(Span::styled(format!("[{key}]"), Style::default().fg(Theme::BLUE).bg(Theme::PANEL_BG)));
            spans.push(Span::styled(format!(" {label} "), Style::default().fg(Theme::MUTED).bg(Theme::PANEL_BG)));
        }
        spans
    }

    pub fn render(&self, frame: &mut Frame<'_>, area: Rect) {
        let status = self.status_spans();
        let status_width: usize = status.iter().map(|span| span.content.width()).sum();
        frame.render_widget(Paragraph::new(Line::from(status)).style(Theme::panel()), area);

        let available = usize::from(area.width).saturating_sub(status_width + 1);
        let hints = self.hint_spans(available);
        if !hints.is_empty() {
            frame.render_widget(Paragraph::new(Line::from(hints)).alignment(Alignment::Right), area);
        }
    }
}
