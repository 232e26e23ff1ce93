use super::App;
use crate::components::{Footer, TranscriptLayout, TranscriptView};
use crate::theme::Theme;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    widgets::Block,
};

pub fn render(app: &mut App, frame: &mut Frame<'_>) {
    let size = frame.area();
    frame.render_widget(Block::default().style(Theme::base()), size);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(size);
    let transcript_area = inset_area(rows[0], 1, 1, 1, 0);

    let layout = TranscriptLayout::build(&app.navigator, transcript_area.width);
    app.viewport_height = transcript_area.height;
    if let Some(node) = app.pending_scroll.take()
        && let Some(offset) = layout.offset_for(node, transcript_area.height)
    {
        app.scroll = offset;
    }
    app.scroll = app.scroll.min(layout.max_offset(transcript_area.height));

    TranscriptView::new(&layout, app.scroll).render(frame, transcript_area);

    let footer = Footer::new(app.navigator.state(), app.navigator.transcript().len(), &app.input);
    footer.render(frame, rows[1]);
}

fn inset_area(area: Rect, left: u16, right: u16, top: u16, bottom: u16) -> Rect {
    let width = area.width.saturating_sub(left + right);
    let height = area.height.saturating_sub(top + bottom);
    if width == 0 || height == 0 {
        return area;
    }
    Rect { x: area.x + left, y: area.y + top, width, height }
}
