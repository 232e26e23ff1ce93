//! Lenient HTML parser.
//!
//! Handles the markup found in saved chat pages: nested elements, inline SVG,
//! comments, doctype, void and raw-text elements, character references. It
//! never fails; malformed input degrades the way browsers degrade it (stray
//! end tags dropped, unclosed elements closed at end of input).

use super::document::{Attribute, Document, ElementData, Namespace, NodeId};
use super::entities;

/// Elements whose content is not parsed as markup
const RAW_TEXT_PARSE: &[&str] = &["script", "style", "xmp", "iframe", "noembed", "noframes"];

/// Raw-text elements whose content still decodes character references
const RCDATA_PARSE: &[&str] = &["textarea", "title"];

/// Start tags that implicitly close an open `<p>`
const CLOSES_PARAGRAPH: &[&str] = &[
    "address",
    "article",
    "aside",
    "blockquote",
    "div",
    "dl",
    "fieldset",
    "footer",
    "form",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "header",
    "hr",
    "main",
    "nav",
    "ol",
    "p",
    "pre",
    "section",
    "table",
    "ul",
];

/// Parse a complete document
pub fn parse_document(input: &str) -> Document {
    let mut document = Document::new();
    let root = document.root();
    parse_into(&mut document, root, input, None);
    document
}

/// Parse a fragment; the fragment's top-level nodes become children of the
/// returned document's root.
pub fn parse_fragment(input: &str) -> Document {
    parse_document(input)
}

/// Parse `input` and append the resulting nodes under `parent`.
///
/// `context` is the namespace and name of the element the markup is parsed
/// for, which decides whether top-level tags are SVG.
pub(crate) fn parse_into(document: &mut Document, parent: NodeId, input: &str, context: Option<(Namespace, String)>) {
    let base_namespace = match context {
        Some((Namespace::Svg, name)) if name != "foreignObject" => Namespace::Svg,
        _ => Namespace::Html,
    };

    let mut builder = TreeBuilder { document, base: parent, base_namespace, open: Vec::new() };
    builder.run(input);
}

struct StartTag {
    name: String,
    attrs: Vec<(String, String)>,
    self_closing: bool,
    /// Byte offset just past the closing `>`
    end: usize,
}

struct TreeBuilder<'a> {
    document: &'a mut Document,
    base: NodeId,
    base_namespace: Namespace,
    open: Vec<NodeId>,
}

impl TreeBuilder<'_> {
    fn run(&mut self, input: &str) {
        let mut pos = 0;
        while pos < input.len() {
            let rest = &input[pos..];

            if let Some(body) = rest.strip_prefix("<!--") {
                let (text, consumed) = match body.find("-->") {
                    Some(end) => (&body[..end], 4 + end + 3),
                    None => (body, rest.len()),
                };
                self.append_comment(text);
                pos += consumed;
                continue;
            }

            if rest.starts_with("<!") || rest.starts_with("<?") {
                let close = rest.find('>');
                let consumed = close.map(|c| c + 1).unwrap_or(rest.len());
                let inner_start = if rest.starts_with("<?") { 1 } else { 2 };
                let inner = &rest[inner_start..close.unwrap_or(rest.len()).max(inner_start)];
                self.append_declaration(inner);
                pos += consumed;
                continue;
            }

            if is_end_tag_open(rest) {
                let name_end = rest[2..].find(|c: char| c.is_ascii_whitespace() || c == '/' || c == '>');
                let name = &rest[2..2 + name_end.unwrap_or(rest.len() - 2)];
                let consumed = rest.find('>').map(|c| c + 1).unwrap_or(rest.len());
                self.close_element(name);
                pos += consumed;
                continue;
            }

            if is_start_tag_open(rest) {
                match read_start_tag(rest) {
                    Some(tag) => pos += self.open_element(tag, &input[pos..]),
                    None => pos = input.len(),
                }
                continue;
            }

            let end = text_end(rest);
            let text = entities::decode(&rest[..end]);
            self.append_text(&text);
            pos += end;
        }
    }

    fn current(&self) -> NodeId {
        self.open.last().copied().unwrap_or(self.base)
    }

    /// Namespace children of the current insertion point are created in
    fn context(&self) -> Namespace {
        match self.open.last() {
            Some(id) => match self.document.element(*id) {
                Some(e) if e.namespace == Namespace::Svg && e.name != "foreignObject" => Namespace::Svg,
                _ => Namespace::Html,
            },
            None => self.base_namespace,
        }
    }

    fn current_is(&self, name: &str) -> bool {
        self.open
            .last()
            .and_then(|id| self.document.element(*id))
            .is_some_and(|e| e.namespace == Namespace::Html && e.name == name)
    }

    fn append_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let parent = self.current();
        self.document.append_text(parent, text);
    }

    fn append_comment(&mut self, text: &str) {
        let parent = self.current();
        let node = self.document.create_comment(text);
        self.document.append_child(parent, node);
    }

    fn append_declaration(&mut self, inner: &str) {
        let is_doctype = inner.get(..7).is_some_and(|prefix| prefix.eq_ignore_ascii_case("doctype"));
        let parent = self.current();
        let node = match is_doctype {
            true => self.document.create_doctype(inner[7..].trim()),
            false => self.document.create_comment(inner),
        };
        self.document.append_child(parent, node);
    }

    /// Resolve the stored name and namespace for a start tag in the current context
    fn resolve_name(&self, raw: &str) -> (String, Namespace) {
        if self.context() == Namespace::Svg {
            let name = Namespace::svg_local_name(raw).map(str::to_string).unwrap_or_else(|| raw.to_string());
            return (name, Namespace::Svg);
        }

        match Namespace::svg_local_name(raw) {
            Some(svg) => (svg.to_string(), Namespace::Svg),
            None => (raw.to_ascii_lowercase(), Namespace::Html),
        }
    }

    /// Insert an element for `tag`; returns the number of bytes consumed from `rest`
    fn open_element(&mut self, tag: StartTag, rest: &str) -> usize {
        let (name, namespace) = self.resolve_name(&tag.name);

        if namespace == Namespace::Html {
            if CLOSES_PARAGRAPH.contains(&name.as_str()) && self.current_is("p") {
                self.open.pop();
            }
            if name == "li" && self.current_is("li") {
                self.open.pop();
            }
        }

        let mut data = ElementData::new(name, namespace);
        for (attr_name, value) in tag.attrs {
            let attr_name = match namespace {
                Namespace::Html => attr_name.to_ascii_lowercase(),
                Namespace::Svg => attr_name,
            };
            if data.attr(&attr_name).is_none() {
                data.attrs.push(Attribute::new(attr_name, entities::decode(&value)));
            }
        }

        let is_void = data.is_void();
        let raw_kind = match namespace {
            Namespace::Html if RAW_TEXT_PARSE.contains(&data.name.as_str()) => Some(false),
            Namespace::Html if RCDATA_PARSE.contains(&data.name.as_str()) => Some(true),
            _ => None,
        };
        let element_name = data.name.clone();

        let parent = self.current();
        let element = self.document.create_element(data);
        self.document.append_child(parent, element);

        if is_void || (tag.self_closing && namespace == Namespace::Svg) {
            return tag.end;
        }

        if let Some(decode) = raw_kind {
            let body = &rest[tag.end..];
            let (content_len, consumed) = match find_end_tag(body, &element_name) {
                Some((start, end)) => (start, end),
                None => (body.len(), body.len()),
            };
            let content = &body[..content_len];
            if !content.is_empty() {
                let text = if decode { entities::decode(content) } else { content.to_string() };
                self.document.append_text(element, &text);
            }
            return tag.end + consumed;
        }

        self.open.push(element);
        tag.end
    }

    fn close_element(&mut self, name: &str) {
        let position = self
            .open
            .iter()
            .rposition(|id| self.document.element(*id).is_some_and(|e| e.name.eq_ignore_ascii_case(name)));
        if let Some(position) = position {
            self.open.truncate(position);
        }
    }
}

fn is_start_tag_open(rest: &str) -> bool {
    let bytes = rest.as_bytes();
    bytes.len() > 1 && bytes[0] == b'<' && bytes[1].is_ascii_alphabetic()
}

fn is_end_tag_open(rest: &str) -> bool {
    let bytes = rest.as_bytes();
    bytes.len() > 2 && bytes[0] == b'<' && bytes[1] == b'/' && bytes[2].is_ascii_alphabetic()
}

/// Length of the text run at the start of `rest`
fn text_end(rest: &str) -> usize {
    let mut offset = 0;
    while let Some(found) = rest[offset..].find('<') {
        let at = offset + found;
        let candidate = &rest[at..];
        if at > 0
            && (is_start_tag_open(candidate)
                || is_end_tag_open(candidate)
                || candidate.starts_with("<!")
                || candidate.starts_with("<?"))
        {
            return at;
        }
        offset = at + 1;
    }
    rest.len()
}

/// Read a start tag at the beginning of `rest`. `None` when input ends inside the tag.
fn read_start_tag(rest: &str) -> Option<StartTag> {
    let bytes = rest.as_bytes();
    let mut i = 1;
    while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'/' && bytes[i] != b'>' {
        i += 1;
    }
    let name = rest[1..i].to_string();
    let mut attrs = Vec::new();

    loop {
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        match bytes.get(i)? {
            b'>' => return Some(StartTag { name, attrs, self_closing: false, end: i + 1 }),
            b'/' if bytes.get(i + 1) == Some(&b'>') => {
                return Some(StartTag { name, attrs, self_closing: true, end: i + 2 });
            }
            b'/' => {
                i += 1;
                continue;
            }
            _ => {}
        }

        let name_start = i;
        i += 1;
        while i < bytes.len() && !bytes[i].is_ascii_whitespace() && !matches!(bytes[i], b'/' | b'>' | b'=') {
            i += 1;
        }
        let attr_name = rest[name_start..i].to_string();

        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if bytes.get(i) != Some(&b'=') {
            attrs.push((attr_name, String::new()));
            continue;
        }
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }

        let value = match bytes.get(i)? {
            quote @ (b'"' | b'\'') => {
                let close = rest[i + 1..].find(*quote as char)?;
                let value = &rest[i + 1..i + 1 + close];
                i += close + 2;
                value
            }
            _ => {
                let start = i;
                while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>' {
                    i += 1;
                }
                &rest[start..i]
            }
        };
        attrs.push((attr_name, value.to_string()));
    }
}

/// Locate `</name` (case-insensitive) in `body`; returns the start of the end
/// tag and the offset just past its `>`.
fn find_end_tag(body: &str, name: &str) -> Option<(usize, usize)> {
    let lower = body.to_ascii_lowercase();
    let needle = format!("</{}", name.to_ascii_lowercase());
    let mut offset = 0;
    while let Some(found) = lower[offset..].find(&needle) {
        let start = offset + found;
        let after = start + needle.len();
        let terminates = lower.as_bytes().get(after).is_none_or(|b| b.is_ascii_whitespace() || matches!(b, b'>' | b'/'));
        if terminates {
            let end = body[after..].find('>').map(|c| after + c + 1).unwrap_or(body.len());
            return Some((start, end));
        }
        offset = after;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::NodeData;

    #[test]
    fn test_parse_nested_elements() {
        let doc = parse_fragment(r#"<div class="a"><p>Hello <b>world</b></p></div>"#);
        let root = doc.root();
        let div = doc.children(root)[0];
        assert_eq!(doc.element(div).map(|e| e.name.as_str()), Some("div"));
        assert_eq!(doc.attr(div, "class"), Some("a"));
        assert_eq!(doc.text_content(div), "Hello world");
    }

    #[test]
    fn test_parse_attributes_quoting() {
        let doc = parse_fragment(r#"<a href='x.html' data-id=7 hidden title="a &amp; b">x</a>"#);
        let a = doc.children(doc.root())[0];
        assert_eq!(doc.attr(a, "href"), Some("x.html"));
        assert_eq!(doc.attr(a, "data-id"), Some("7"));
        assert_eq!(doc.attr(a, "hidden"), Some(""));
        assert_eq!(doc.attr(a, "title"), Some("a & b"));
    }

    #[test]
    fn test_parse_duplicate_attribute_keeps_first() {
        let doc = parse_fragment(r#"<span id="one" id="two"></span>"#);
        let span = doc.children(doc.root())[0];
        assert_eq!(doc.attr(span, "id"), Some("one"));
    }

    #[test]
    fn test_parse_void_elements() {
        let doc = parse_fragment("a<br>b<img src=x>c");
        let root = doc.root();
        assert_eq!(doc.children(root).len(), 5);
        assert_eq!(doc.text_content(root), "abc");
    }

    #[test]
    fn test_parse_svg_namespace_and_case() {
        let doc = parse_fragment(
            r#"<svg viewBox="0 0 10 10"><linearGradient id="g"><stop/></linearGradient><path d="M0 0"/><rect/></svg>"#,
        );
        let svg = doc.children(doc.root())[0];
        let svg_data = doc.element(svg).expect("svg element");
        assert_eq!(svg_data.namespace, Namespace::Svg);
        assert_eq!(svg_data.attr("viewBox"), Some("0 0 10 10"));

        let names: Vec<_> = doc
            .children(svg)
            .iter()
            .filter_map(|id| doc.element(*id))
            .map(|e| (e.name.clone(), e.namespace))
            .collect();
        assert_eq!(
            names,
            vec![
                ("linearGradient".to_string(), Namespace::Svg),
                ("path".to_string(), Namespace::Svg),
                ("rect".to_string(), Namespace::Svg),
            ]
        );
    }

    #[test]
    fn test_parse_foreign_object_switches_back_to_html() {
        let doc = parse_fragment("<svg><foreignObject><div>x</div></foreignObject></svg>");
        let svg = doc.children(doc.root())[0];
        let foreign = doc.children(svg)[0];
        let div = doc.children(foreign)[0];
        assert_eq!(doc.element(div).map(|e| e.namespace), Some(Namespace::Html));
    }

    #[test]
    fn test_parse_unknown_element_is_html() {
        let doc = parse_fragment("<Chat-Bubble>x</Chat-Bubble>");
        let node = doc.children(doc.root())[0];
        let data = doc.element(node).expect("element");
        assert_eq!(data.name, "chat-bubble");
        assert_eq!(data.namespace, Namespace::Html);
    }

    #[test]
    fn test_parse_raw_text() {
        let doc = parse_fragment("<script>if (a < b) { x = '</div>'; }</script><p>after</p>");
        let root = doc.root();
        let script = doc.children(root)[0];
        assert_eq!(doc.text_content(script), "if (a < b) { x = '</div>'; }");
        assert_eq!(doc.children(root).len(), 2);
    }

    #[test]
    fn test_parse_title_decodes_references() {
        let doc = parse_fragment("<title>Q&amp;A <b></title>");
        let title = doc.children(doc.root())[0];
        assert_eq!(doc.text_content(title), "Q&A <b>");
    }

    #[test]
    fn test_parse_comment_and_doctype() {
        let doc = parse_document("<!DOCTYPE html><!-- note --><html></html>");
        let root = doc.root();
        assert_eq!(doc.data(doc.children(root)[0]), &NodeData::Doctype("html".to_string()));
        assert_eq!(doc.data(doc.children(root)[1]), &NodeData::Comment(" note ".to_string()));
    }

    #[test]
    fn test_parse_stray_end_tag_ignored() {
        let doc = parse_fragment("<div>a</span>b</div>");
        let div = doc.children(doc.root())[0];
        assert_eq!(doc.text_content(div), "ab");
    }

    #[test]
    fn test_parse_unclosed_elements_closed_at_end() {
        let doc = parse_fragment("<div><span>open");
        let div = doc.children(doc.root())[0];
        assert_eq!(doc.text_content(div), "open");
    }

    #[test]
    fn test_parse_lone_angle_bracket_is_text() {
        let doc = parse_fragment("1 < 2 and 3 <= 4");
        assert_eq!(doc.text_content(doc.root()), "1 < 2 and 3 <= 4");
    }

    #[test]
    fn test_parse_implied_paragraph_end() {
        let doc = parse_fragment("<p>one<p>two");
        assert_eq!(doc.children(doc.root()).len(), 2);
    }

    #[test]
    fn test_parse_truncated_tag_dropped() {
        let doc = parse_fragment("text<div class=\"x");
        assert_eq!(doc.children(doc.root()).len(), 1);
        assert_eq!(doc.text_content(doc.root()), "text");
    }
}
