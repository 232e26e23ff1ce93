use chatreel_core::MessageKind;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;

/// Iceberg color theme for the player
///
/// Based on iceberg.vim color scheme (https://github.com/cocopon/iceberg.vim)
#[derive(Debug, Clone, Copy)]
pub struct Theme;

impl Theme {
    /// Primary background: deep blue-black (fills terminal)
    pub const BG: Color = Color::Rgb(22, 24, 33);

    /// Foreground: light blue-gray (reply text)
    pub const FG: Color = Color::Rgb(198, 200, 209);

    /// Secondary background: footer bar
    pub const PANEL_BG: Color = Color::Rgb(30, 33, 50);

    /// Highlight pulse background
    pub const ACTIVE: Color = Color::Rgb(39, 44, 66);

    /// Primary accent: blue (sent messages)
    pub const BLUE: Color = Color::Rgb(132, 160, 198);

    /// Secondary accent: cyan (send animation)
    pub const CYAN: Color = Color::Rgb(137, 184, 194);

    pub const PURPLE: Color = Color::Rgb(160, 147, 199);

    pub const GREEN: Color = Color::Rgb(180, 190, 130);

    pub const YELLOW: Color = Color::Rgb(226, 164, 120);

    /// Muted text: dimmed foreground
    pub const MUTED: Color = Color::Rgb(107, 112, 137);

    /// Base style for all text
    pub fn base() -> Style {
        Style::default().fg(Self::FG).bg(Self::BG)
    }

    /// Muted style (for secondary text)
    pub fn muted() -> Style {
        Style::default().fg(Self::MUTED).bg(Self::BG)
    }

    /// Footer style
    pub fn panel() -> Style {
        Style::default().fg(Self::FG).bg(Self::PANEL_BG)
    }

    /// Message that carries the highlight class
    pub fn highlight() -> Style {
        Style::default().fg(Self::FG).bg(Self::ACTIVE)
    }

    /// Message that carries the send-animation class
    pub fn send_pulse() -> Style {
        Style::default().fg(Self::CYAN).bg(Self::ACTIVE).add_modifier(Modifier::BOLD)
    }

    /// Typing cursor
    pub fn cursor() -> Style {
        Style::default().fg(Self::FG).bg(Self::FG)
    }

    /// Text color for a message kind
    pub fn kind_color(kind: MessageKind) -> Color {
        match kind {
            MessageKind::Sent => Self::BLUE,
            MessageKind::Reply => Self::FG,
        }
    }

    /// Gutter shown left of a message
    pub fn kind_gutter(kind: MessageKind) -> Span<'static> {
        match kind {
            MessageKind::Sent => Span::styled("▌ ", Style::default().fg(Self::BLUE).bg(Self::BG)),
            MessageKind::Reply => Span::styled("  ", Self::base()),
        }
    }

    /// Get display mode color
    pub fn mode_color(mode: &str) -> Color {
        match mode {
            "show-all" => Self::GREEN,
            "step-through" => Self::PURPLE,
            _ => Self::MUTED,
        }
    }

    /// Get span with display mode styling
    pub fn mode_span(mode: &str) -> Span<'_> {
        Span::styled(mode, Style::default().fg(Self::mode_color(mode)).bg(Self::PANEL_BG))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_values() {
        assert!(matches!(Theme::BG, Color::Rgb(_, _, _)));
        assert!(matches!(Theme::FG, Color::Rgb(_, _, _)));
        assert!(matches!(Theme::PANEL_BG, Color::Rgb(_, _, _)));
    }

    #[test]
    fn test_mode_colors() {
        assert_eq!(Theme::mode_color("show-all"), Theme::GREEN);
        assert_eq!(Theme::mode_color("step-through"), Theme::PURPLE);
        assert_eq!(Theme::mode_color("unknown"), Theme::MUTED);
    }

    #[test]
    fn test_kind_styles() {
        assert_eq!(Theme::kind_color(MessageKind::Sent), Theme::BLUE);
        assert_eq!(Theme::kind_color(MessageKind::Reply), Theme::FG);
        assert_eq!(Theme::kind_gutter(MessageKind::Sent).content, "▌ ");
        assert_eq!(Theme::kind_gutter(MessageKind::Reply).content, "  ");
    }

    #[test]
    fn test_styles() {
        let base = Theme::base();
        assert_eq!(base.fg, Some(Theme::FG));
        assert_eq!(base.bg, Some(Theme::BG));

        let highlight = Theme::highlight();
        assert_eq!(highlight.bg, Some(Theme::ACTIVE));
    }
}
