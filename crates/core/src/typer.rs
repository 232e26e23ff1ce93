//! Character-by-character reveal of one message's markup.
//!
//! The source markup is parsed once and walked lazily by [`RevealSteps`].
//! Structural steps (opening or closing an element, comments, doctypes)
//! apply at once;
//! each text character costs one scheduled tick. A run is identified by a
//! [`RevealToken`]; ticks carrying any other token are ignored, so a tick
//! left in the queue after a fast-forward can never touch finalized content.

use std::fmt;

use tracing::trace;

use crate::markup::{Document, ElementData, Namespace, NodeData, NodeId, parse_into};

/// Generation number of one typing run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RevealToken(u64);

impl RevealToken {
    pub(crate) fn new(generation: u64) -> Self {
        Self(generation)
    }

}

impl fmt::Display for RevealToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One mutation of the target container
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevealStep {
    /// Append an empty clone of an element and descend into it
    Open(ElementData),
    /// Append one text character
    Char(char),
    /// Append a comment as a single unit
    Comment(String),
    /// Append a doctype node as a single unit
    Doctype(String),
    /// Leave the current element
    Close,
}

#[derive(Debug)]
enum Frame {
    Children { parent: NodeId, next: usize, close: bool },
    Text { node: NodeId, offset: usize },
}

/// Lazy, depth-first step sequence over parsed markup
#[derive(Debug)]
pub struct RevealSteps {
    source: Document,
    stack: Vec<Frame>,
}

impl RevealSteps {
    /// Parse `markup` for a container described by `context` (namespace and
    /// tag name), which decides whether top-level tags are SVG.
    pub fn new(markup: &str, context: Option<(Namespace, String)>) -> Self {
        let mut source = Document::new();
        let root = source.root();
        let holder = match &context {
            Some((namespace, name)) => {
                let holder = source.create_element(ElementData::new(name.clone(), *namespace));
                source.append_child(root, holder);
                holder
            }
            None => root,
        };
        parse_into(&mut source, holder, markup, context);
        Self { source, stack: vec![Frame::Children { parent: holder, next: 0, close: false }] }
    }

    /// Number of characters a full reveal of `markup` types
    pub fn char_count(markup: &str) -> usize {
        Self::new(markup, None).filter(|step| matches!(step, RevealStep::Char(_))).count()
    }
}

impl Iterator for RevealSteps {
    type Item = RevealStep;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.stack.last_mut()? {
                Frame::Text { node, offset } => {
                    let next = match self.source.data(*node) {
                        NodeData::Text(text) => text[*offset..].chars().next(),
                        _ => None,
                    };
                    match next {
                        Some(ch) => {
                            *offset += ch.len_utf8();
                            return Some(RevealStep::Char(ch));
                        }
                        None => {
                            self.stack.pop();
                        }
                    }
                }
                Frame::Children { parent, next, close } => {
                    let Some(&child) = self.source.children(*parent).get(*next) else {
                        let close = *close;
                        self.stack.pop();
                        if close {
                            return Some(RevealStep::Close);
                        }
                        continue;
                    };
                    *next += 1;

                    match self.source.data(child) {
                        NodeData::Element(element) => {
                            let step = RevealStep::Open(element.clone());
                            self.stack.push(Frame::Children { parent: child, next: 0, close: true });
                            return Some(step);
                        }
                        NodeData::Text(_) => self.stack.push(Frame::Text { node: child, offset: 0 }),
                        NodeData::Comment(text) => return Some(RevealStep::Comment(text.clone())),
                        NodeData::Doctype(name) => return Some(RevealStep::Doctype(name.clone())),
                        NodeData::Document => {}
                    }
                }
            }
        }
    }
}

/// Outcome of starting or ticking a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealProgress {
    /// More characters remain; schedule another tick for this token
    Pending(RevealToken),
    /// The target now holds the full markup
    Complete,
    /// The token does not belong to the live run; nothing was touched
    Stale,
}

#[derive(Debug)]
struct Run {
    token: RevealToken,
    target: NodeId,
    markup: String,
    steps: std::iter::Peekable<RevealSteps>,
    open: Vec<NodeId>,
}

impl Run {
    fn apply(&mut self, document: &mut Document, step: RevealStep) {
        let Some(&parent) = self.open.last() else {
            return;
        };
        match step {
            RevealStep::Open(element) => {
                let node = document.create_element(element);
                document.append_child(parent, node);
                self.open.push(node);
            }
            RevealStep::Char(ch) => {
                let mut buf = [0u8; 4];
                document.append_text(parent, ch.encode_utf8(&mut buf));
            }
            RevealStep::Comment(text) => {
                let node = document.create_comment(text);
                document.append_child(parent, node);
            }
            RevealStep::Doctype(name) => {
                let node = document.create_doctype(name);
                document.append_child(parent, node);
            }
            RevealStep::Close => {
                if self.open.len() > 1 {
                    self.open.pop();
                }
            }
        }
    }
}

/// Drives at most one reveal run at a time
#[derive(Debug, Default)]
pub struct Typer {
    generation: u64,
    run: Option<Run>,
}

impl Typer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.run.is_some()
    }

    /// Container the live run writes into
    pub fn target(&self) -> Option<NodeId> {
        self.run.as_ref().map(|run| run.target)
    }

    /// Empty `target` and begin revealing `markup` into it.
    ///
    /// Structural steps up to the first character apply immediately. Markup
    /// without any text completes here. A run already in flight is
    /// fast-forwarded first.
    pub fn start(&mut self, document: &mut Document, target: NodeId, markup: &str) -> RevealProgress {
        self.finish(document);

        self.generation += 1;
        let token = RevealToken::new(self.generation);
        let context = document.element(target).map(|e| (e.namespace, e.name.clone()));
        document.clear_children(target);

        trace!(%token, chars = markup.len(), nodes = document.node_count(), "reveal started");
        self.run = Some(Run {
            token,
            target,
            markup: markup.to_string(),
            steps: RevealSteps::new(markup, context).peekable(),
            open: vec![target],
        });
        self.advance(document, 0)
    }

    /// Reveal the next character of the run owning `token`
    pub fn tick(&mut self, document: &mut Document, token: RevealToken) -> RevealProgress {
        match &self.run {
            Some(run) if run.token == token => self.advance(document, 1),
            _ => {
                trace!(%token, "stale reveal tick ignored");
                RevealProgress::Stale
            }
        }
    }

    /// Fast-forward: replace the target's children with the full markup in
    /// one call. Returns false when no run was in flight.
    pub fn finish(&mut self, document: &mut Document) -> bool {
        let Some(run) = self.run.take() else {
            return false;
        };
        self.generation += 1;
        document.set_inner_html(run.target, &run.markup);
        trace!(token = %run.token, "reveal fast-forwarded");
        true
    }

    /// Apply steps until `chars` characters have been typed and the next
    /// step is another character, or the sequence ends.
    fn advance(&mut self, document: &mut Document, chars: usize) -> RevealProgress {
        let Some(run) = self.run.as_mut() else {
            return RevealProgress::Stale;
        };

        let mut budget = chars;
        while let Some(step) = run.steps.peek() {
            if matches!(step, RevealStep::Char(_)) {
                if budget == 0 {
                    return RevealProgress::Pending(run.token);
                }
                budget -= 1;
            }
            if let Some(step) = run.steps.next() {
                run.apply(document, step);
            }
        }

        trace!(token = %run.token, "reveal complete");
        self.run = None;
        RevealProgress::Complete
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::parse_fragment;

    fn container() -> (Document, NodeId) {
        let mut doc = Document::new();
        let div = doc.create_element(ElementData::html("div", &[("data-testid", "message_content")]));
        let root = doc.root();
        doc.append_child(root, div);
        (doc, div)
    }

    /// Run to completion, recording the target's markup after every tick
    fn reveal_all(doc: &mut Document, target: NodeId, markup: &str) -> Vec<String> {
        let mut typer = Typer::new();
        let mut frames = Vec::new();
        let mut progress = typer.start(doc, target, markup);
        frames.push(doc.inner_html(target));
        while let RevealProgress::Pending(token) = progress {
            progress = typer.tick(doc, token);
            frames.push(doc.inner_html(target));
        }
        assert_eq!(progress, RevealProgress::Complete);
        frames
    }

    #[test]
    fn test_steps_walk_in_document_order() {
        let steps: Vec<RevealStep> = RevealSteps::new("<p>Hi</p><!--c-->!", None).collect();
        assert_eq!(
            steps,
            vec![
                RevealStep::Open(ElementData::html("p", &[])),
                RevealStep::Char('H'),
                RevealStep::Char('i'),
                RevealStep::Close,
                RevealStep::Comment("c".to_string()),
                RevealStep::Char('!'),
            ]
        );
    }

    #[test]
    fn test_steps_copy_attributes_and_namespace() {
        let mut steps = RevealSteps::new(r#"<svg viewBox="0 0 2 2"><path d="M0 0"/></svg>"#, None);
        let Some(RevealStep::Open(svg)) = steps.next() else { panic!("expected svg") };
        assert_eq!(svg.namespace, Namespace::Svg);
        assert_eq!(svg.attr("viewBox"), Some("0 0 2 2"));
        let Some(RevealStep::Open(path)) = steps.next() else { panic!("expected path") };
        assert_eq!(path.namespace, Namespace::Svg);
        assert_eq!(path.attr("d"), Some("M0 0"));
    }

    #[test]
    fn test_doctype_is_a_unit_step() {
        let steps: Vec<RevealStep> = RevealSteps::new("<!DOCTYPE x>hi", None).collect();
        assert_eq!(steps, vec![RevealStep::Doctype("x".to_string()), RevealStep::Char('h'), RevealStep::Char('i')]);

        let (mut doc, target) = container();
        let frames = reveal_all(&mut doc, target, "<!DOCTYPE x>hi");
        assert_eq!(frames, vec!["<!DOCTYPE x>", "<!DOCTYPE x>h", "<!DOCTYPE x>hi"]);
    }

    #[test]
    fn test_repeated_reveals_reuse_nodes() {
        let (mut doc, target) = container();
        let source = "<ul><li>one</li><li>two</li></ul><p>end</p>";
        reveal_all(&mut doc, target, source);
        let live = doc.node_count();

        let mut typer = Typer::new();
        for _ in 0..20 {
            if let RevealProgress::Pending(token) = typer.start(&mut doc, target, source) {
                typer.tick(&mut doc, token);
            }
            typer.finish(&mut doc);
        }
        reveal_all(&mut doc, target, source);
        assert_eq!(doc.node_count(), live);
        assert_eq!(doc.inner_html(target), source);
    }

    #[test]
    fn test_char_count() {
        assert_eq!(RevealSteps::char_count("<p>Hello</p>"), 5);
        assert_eq!(RevealSteps::char_count("<br><img src=x>"), 0);
        assert_eq!(RevealSteps::char_count("é&amp;"), 2);
    }

    #[test]
    fn test_reveal_types_one_char_per_tick() {
        let (mut doc, target) = container();
        let frames = reveal_all(&mut doc, target, "<p>Hello</p>");
        assert_eq!(
            frames,
            vec!["<p></p>", "<p>H</p>", "<p>He</p>", "<p>Hel</p>", "<p>Hell</p>", "<p>Hello</p>"]
        );
    }

    #[test]
    fn test_reveal_is_faithful() {
        let sources = [
            "<p>Hello</p>",
            "plain text only",
            "<div class=\"md\">\n  <h2 id=\"t\">Title</h2>\n  <ul><li>one</li><li>two &amp; three</li></ul>\n</div>",
            r#"<span>icon <svg width="12" viewBox="0 0 12 12"><g fill="none"><path d="M1 1h10"></path><circle cx="6" cy="6" r="2"></circle></g></svg> done</span>"#,
            "<p>a<br>b<img src=\"x.png\" alt=\"&quot;q&quot;\"></p><!-- note --><pre>  keep   spacing\n</pre>",
            "<table><tbody><tr><td>1</td><td>2</td></tr></tbody></table>",
            "<p>中文 ✓ emoji 🎉</p>",
            "<!DOCTYPE x>hi",
            "<p>a</p><!DOCTYPE html><!--c--><p>b</p>",
            "",
        ];
        for source in sources {
            let canonical = {
                let doc = parse_fragment(source);
                doc.inner_html(doc.root())
            };
            let (mut doc, target) = container();
            let frames = reveal_all(&mut doc, target, &canonical);
            assert_eq!(frames.last(), Some(&canonical), "reveal differs for {source:?}");
        }
    }

    #[test]
    fn test_reveal_without_text_completes_synchronously() {
        let (mut doc, target) = container();
        let mut typer = Typer::new();
        let progress = typer.start(&mut doc, target, "<hr><svg><path d=\"M0 0\"></path></svg>");
        assert_eq!(progress, RevealProgress::Complete);
        assert!(!typer.is_running());
        assert_eq!(doc.inner_html(target), "<hr><svg><path d=\"M0 0\"></path></svg>");

        let progress = typer.start(&mut doc, target, "");
        assert_eq!(progress, RevealProgress::Complete);
        assert_eq!(doc.inner_html(target), "");
    }

    #[test]
    fn test_start_clears_target() {
        let (mut doc, target) = container();
        doc.set_inner_html(target, "<p>Hello</p>");
        let mut typer = Typer::new();
        assert!(matches!(typer.start(&mut doc, target, "<p>Hello</p>"), RevealProgress::Pending(_)));
        assert_eq!(doc.inner_html(target), "<p></p>");
        assert_eq!(typer.target(), Some(target));
    }

    #[test]
    fn test_fast_forward_at_every_point_matches_full_reveal() {
        let source = r#"<p>Hi <b>there</b></p><svg viewBox="0 0 1 1"><path d="M0 0"></path></svg><p>end</p>"#;
        let total = RevealSteps::char_count(source);

        for ticks in 0..=total {
            let (mut doc, target) = container();
            let mut typer = Typer::new();
            let mut progress = typer.start(&mut doc, target, source);
            for _ in 0..ticks {
                if let RevealProgress::Pending(token) = progress {
                    progress = typer.tick(&mut doc, token);
                }
            }
            typer.finish(&mut doc);
            assert_eq!(doc.inner_html(target), source, "fast-forward after {ticks} ticks");
            assert!(!typer.is_running());
        }
    }

    #[test]
    fn test_stale_tick_is_inert() {
        let (mut doc, target) = container();
        let mut typer = Typer::new();
        let RevealProgress::Pending(token) = typer.start(&mut doc, target, "<p>Hello</p>") else {
            panic!("expected pending run");
        };
        typer.tick(&mut doc, token);
        assert!(typer.finish(&mut doc));

        assert_eq!(typer.tick(&mut doc, token), RevealProgress::Stale);
        assert_eq!(doc.inner_html(target), "<p>Hello</p>");
        assert!(!typer.finish(&mut doc));
    }

    #[test]
    fn test_new_run_supersedes_old_token() {
        let (mut doc, target) = container();
        let mut typer = Typer::new();
        let RevealProgress::Pending(first) = typer.start(&mut doc, target, "abc") else {
            panic!("expected pending run");
        };
        let RevealProgress::Pending(second) = typer.start(&mut doc, target, "xyz") else {
            panic!("expected pending run");
        };
        assert_ne!(first, second);
        assert_eq!(typer.tick(&mut doc, first), RevealProgress::Stale);
        assert_eq!(doc.inner_html(target), "");
        assert!(matches!(typer.tick(&mut doc, second), RevealProgress::Pending(_)));
        assert_eq!(doc.inner_html(target), "x");
    }

    #[test]
    fn test_reveal_into_svg_context() {
        let mut doc = Document::parse(r#"<svg id="icon"></svg>"#);
        let svg = doc.children(doc.root())[0];
        let frames = reveal_all(&mut doc, svg, "<text x=\"1\">ok</text>");
        assert_eq!(frames.last().map(String::as_str), Some("<text x=\"1\">ok</text>"));
        let text = doc.children(svg)[0];
        assert_eq!(doc.element(text).map(|e| e.namespace), Some(Namespace::Svg));
    }
}
