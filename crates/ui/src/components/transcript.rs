use crate::theme::Theme;

use chatreel_core::{Document, MessageKind, Namespace, Navigator, NodeData, NodeId};
use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};

/// Glyph standing in for an inline SVG drawing
pub const SVG_PLACEHOLDER: &str = "◇";

const GUTTER_WIDTH: u16 = 2;

const BLOCK_ELEMENTS: &[&str] = &[
    "address",
    "article",
    "aside",
    "blockquote",
    "dd",
    "div",
    "dl",
    "dt",
    "figure",
    "footer",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "header",
    "hr",
    "li",
    "main",
    "nav",
    "ol",
    "p",
    "pre",
    "section",
    "table",
    "tr",
    "ul",
];

const SKIPPED_ELEMENTS: &[&str] = &["head", "script", "style", "template", "title"];

/// Flatten the rendered text of `node` into paragraphs.
///
/// Block elements start new paragraphs, `<br>` breaks a line, whitespace
/// collapses outside `<pre>`, and SVG subtrees become [`SVG_PLACEHOLDER`].
pub fn message_paragraphs(document: &Document, node: NodeId) -> Vec<String> {
    let mut collector = TextCollector { document, paragraphs: Vec::new(), current: String::new(), preformatted: 0 };
    for child in document.children(node) {
        collector.visit(*child);
    }
    collector.break_line();
    collector.paragraphs
}

struct TextCollector<'a> {
    document: &'a Document,
    paragraphs: Vec<String>,
    current: String,
    preformatted: usize,
}

impl TextCollector<'_> {
    fn visit(&mut self, id: NodeId) {
        match self.document.data(id) {
            NodeData::Text(text) => self.push_text(text),
            NodeData::Element(element) => {
                if self.document.style_property(id, "display").as_deref() == Some("none") {
                    return;
                }
                if element.namespace == Namespace::Svg {
                    self.push_inline(SVG_PLACEHOLDER);
                    return;
                }
                if SKIPPED_ELEMENTS.iter().any(|name| element.is(name)) {
                    return;
                }
                if element.is("br") {
                    self.break_line();
                    return;
                }
                if element.is("img") {
                    let alt = element.attr("alt").filter(|alt| !alt.is_empty()).unwrap_or("image");
                    self.push_inline(&format!("[{alt}]"));
                    return;
                }

                let block = BLOCK_ELEMENTS.iter().any(|name| element.is(name));
                let pre = element.is("pre");
                if block {
                    self.break_line();
                }
                if element.is("li") {
                    self.current.push_str("• ");
                }
                if pre {
                    self.preformatted += 1;
                }
                for child in self.document.children(id) {
                    self.visit(*child);
                }
                if pre {
                    self.preformatted -= 1;
                }
                if block {
                    self.break_line();
                }
            }
            _ => {}
        }
    }

    fn push_text(&mut self, text: &str) {
        if self.preformatted > 0 {
            let mut lines = text.split('\n');
            if let Some(first) = lines.next() {
                self.current.push_str(first);
            }
            for line in lines {
                self.break_line();
                self.current.push_str(line);
            }
            return;
        }

        for ch in text.chars() {
            if ch.is_whitespace() {
                if !self.current.is_empty() && !self.current.ends_with(' ') {
                    self.current.push(' ');
                }
            } else {
                self.current.push(ch);
            }
        }
    }

    fn push_inline(&mut self, text: &str) {
        self.current.push_str(text);
    }

    fn break_line(&mut self) {
        let line = self.current.trim_end();
        if !line.is_empty() && line != "•" {
            self.paragraphs.push(line.to_string());
        }
        self.current.clear();
    }
}

/// Lines occupied by one message in a [`TranscriptLayout`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageSpan {
    pub index: usize,
    pub node: NodeId,
    /// First line
    pub start: usize,
    /// One past the last line
    pub end: usize,
}

/// Visible messages laid out as terminal lines
#[derive(Debug, Clone, Default)]
pub struct TranscriptLayout {
    pub lines: Vec<Line<'static>>,
    pub spans: Vec<MessageSpan>,
    /// Stick to the bottom of the viewport when the content is short
    pub anchored_bottom: bool,
}

impl TranscriptLayout {
    pub fn build(navigator: &Navigator, width: u16) -> Self {
        let document = navigator.document();
        let options = navigator.options();
        let state = navigator.state();
        let wrap_width = usize::from(width.saturating_sub(GUTTER_WIDTH).max(1));

        let mut layout = Self { anchored_bottom: navigator.is_reversed(), ..Self::default() };
        for index in navigator.visible_indices() {
            let Some(message) = navigator.transcript().get(index) else {
                continue;
            };
            if !layout.lines.is_empty() {
                layout.lines.push(Line::default());
            }

            let pulse = message.pulse_target();
            let style = if document.has_class(pulse, &options.send_animation_class) {
                Theme::send_pulse()
            } else if document.has_class(pulse, &options.highlight_class) {
                Theme::highlight()
            } else {
                Style::default().fg(Theme::kind_color(message.kind)).bg(Theme::BG)
            };

            let start = layout.lines.len();
            for paragraph in message_paragraphs(document, message.node) {
                for wrapped in textwrap::wrap(&paragraph, wrap_width) {
                    layout.lines.push(Line::from(vec![
                        Theme::kind_gutter(message.kind),
                        Span::styled(wrapped.into_owned(), style),
                    ]));
                }
            }
            if layout.lines.len() == start {
                layout.lines.push(Line::from(vec![Theme::kind_gutter(message.kind)]));
            }

            let typing = state.is_typing && state.current_index == Some(index);
            if typing
                && message.kind == MessageKind::Reply
                && let Some(last) = layout.lines.last_mut()
            {
                last.spans.push(Span::styled(" ", Theme::cursor()));
            }

            layout.spans.push(MessageSpan { index, node: message.node, start, end: layout.lines.len() });
        }
        layout
    }

    pub fn span_of(&self, node: NodeId) -> Option<&MessageSpan> {
        self.spans.iter().find(|span| span.node == node)
    }

    /// Largest useful scroll offset for a viewport of `height` lines
    pub fn max_offset(&self, height: u16) -> usize {
        self.lines.len().saturating_sub(usize::from(height))
    }

    /// Offset that puts the end of `node` at the bottom of the viewport
    pub fn offset_for(&self, node: NodeId, height: u16) -> Option<usize> {
        self.span_of(node).map(|span| span.end.saturating_sub(usize::from(height)))
    }
}

/// Scrollable view over a [`TranscriptLayout`]
pub struct TranscriptView<'a> {
    layout: &'a TranscriptLayout,
    offset: usize,
}

impl<'a> TranscriptView<'a> {
    pub fn new(layout: &'a TranscriptLayout, offset: usize) -> Self {
        Self { layout, offset }
    }

    pub fn render(&self, frame: &mut Frame<'_>, area: Rect) {
        let height = usize::from(area.height);
        let total = self.layout.lines.len();
        let offset = self.offset.min(total);
        let end = (offset + height).min(total);

        let mut lines: Vec<Line<'static>> = Vec::with_capacity(height);
        if self.layout.anchored_bottom && total < height {
            lines.resize(height - total, Line::default());
        }
        lines.extend(self.layout.lines[offset..end].iter().cloned());

        frame.render_widget(Paragraph::new(lines).style(Theme::base()), area);
    }
}
