//! Markup serialization with browser `innerHTML` escaping rules.

use super::document::{Document, NodeData, NodeId};

pub fn inner_html(document: &Document, id: NodeId) -> String {
    let mut out = String::new();
    let raw = document.element(id).is_some_and(|e| e.is_raw_text());
    for child in document.children(id) {
        write_node(document, *child, raw, &mut out);
    }
    out
}

pub fn outer_html(document: &Document, id: NodeId) -> String {
    let mut out = String::new();
    let raw = document
        .parent(id)
        .and_then(|parent| document.element(parent))
        .is_some_and(|e| e.is_raw_text());
    write_node(document, id, raw, &mut out);
    out
}

fn write_node(document: &Document, id: NodeId, raw_parent: bool, out: &mut String) {
    match document.data(id) {
        NodeData::Document => {
            for child in document.children(id) {
                write_node(document, *child, false, out);
            }
        }
        NodeData::Element(element) => {
            out.push('<');
            out.push_str(&element.name);
            for attr in &element.attrs {
                out.push(' ');
                out.push_str(&attr.name);
                out.push_str("=\"");
                escape_attribute(&attr.value, out);
                out.push('"');
            }
            out.push('>');
            if element.is_void() {
                return;
            }
            let raw = element.is_raw_text();
            for child in document.children(id) {
                write_node(document, *child, raw, out);
            }
            out.push_str("</");
            out.push_str(&element.name);
            out.push('>');
        }
        NodeData::Text(text) if raw_parent => out.push_str(text),
        NodeData::Text(text) => escape_text(text, out),
        NodeData::Comment(text) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
        NodeData::Doctype(name) => {
            out.push_str("<!DOCTYPE ");
            out.push_str(name);
            out.push('>');
        }
    }
}

fn escape_text(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(ch),
        }
    }
}

fn escape_attribute(value: &str, out: &mut String) {
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(ch),
        }
    }
}
