//! Clean-up of a saved chat page before publishing it with the player.
//!
//! Removes the chat application's chrome, drops the content security policy
//! meta tag so the player script can load, wraps the transcript with a banner
//! and footer, and optionally links the player's script and stylesheets.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::compile_field;
use crate::error::Result;
use crate::logging::sanitize_path;
use crate::markup::{Document, ElementData, NodeData, NodeId, Selector};

/// Chat application chrome stripped by default
pub const DEFAULT_STRIP_SELECTORS: &[&str] = &[
    r#"div[class*="header-"] > div[class="relative"]"#,
    r#"div[class*="to-bottom-button-"]"#,
    r#"div[data-message-action-bar="1"]"#,
    r#"div[data-testid="suggest_message_list"]"#,
    r#"div[data-testid="chat_footer_skill_bar"]"#,
    r#"div[data-testid="chat_input"]"#,
];

const CSP_META: &str = r#"meta[http-equiv="content-security-policy"]"#;

/// The banner goes before, and the footer after, the grandparent of this match
const ANCHOR: &str = r#"div[class*="message-list-"] > div[data-testid="scroll_view"]"#;

/// Replaced in banner text with the page title
pub const TITLE_PLACEHOLDER: &str = "__TITLE__";

/// Title used when the page has none
pub const DEFAULT_TITLE: &str = "默认标题";

pub const PLAYER_SCRIPT: &str = "../doubao_chatbot.js";
pub const PLAYER_STYLESHEET: &str = "../css/chat_styles.css";
pub const ICON_STYLESHEET: &str = "https://cdn.bootcdn.net/ajax/libs/font-awesome/6.2.1/css/all.min.css";

#[derive(Debug, Clone)]
pub struct PrepareOptions {
    pub strip_selectors: Vec<String>,
    pub banner: Option<PathBuf>,
    pub footer: Option<PathBuf>,
    pub inject_resources: bool,
}

impl Default for PrepareOptions {
    fn default() -> Self {
        Self {
            strip_selectors: DEFAULT_STRIP_SELECTORS.iter().map(|s| s.to_string()).collect(),
            banner: None,
            footer: None,
            inject_resources: false,
        }
    }
}

/// What a prepare pass changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrepareReport {
    pub removed: usize,
    pub csp_removed: bool,
    pub banner_inserted: bool,
    pub resources_injected: bool,
}

/// Detach every element matching any of `selectors`; returns how many were removed
pub fn remove_matching(document: &mut Document, selectors: &[Selector]) -> usize {
    let mut removed = 0;
    for selector in selectors {
        for node in document.select_all(selector) {
            if document.parent(node).is_some() && is_attached(document, node) {
                document.detach(node);
                removed += 1;
            }
        }
    }
    removed
}

fn is_attached(document: &Document, node: NodeId) -> bool {
    document.ancestors(node).any(|ancestor| ancestor == document.root())
}

/// Remove the first content security policy meta tag
pub fn remove_csp_meta(document: &mut Document) -> bool {
    let Ok(selector) = Selector::parse(CSP_META) else {
        return false;
    };
    match document.select(&selector) {
        Some(meta) => {
            document.detach(meta);
            true
        }
        None => false,
    }
}

/// Text of the page's `<title>`, or [`DEFAULT_TITLE`]
pub fn page_title(document: &Document) -> String {
    Selector::parse("title")
        .ok()
        .and_then(|selector| document.select(&selector))
        .map(|title| document.text_content(title))
        .filter(|title| !title.is_empty())
        .unwrap_or_else(|| DEFAULT_TITLE.to_string())
}

/// Insert `banner` before and `footer` after the transcript anchor.
///
/// Returns false when the anchor is missing; the document is left untouched.
pub fn add_banner_and_footer(document: &mut Document, banner: &str, footer: &str) -> bool {
    let Ok(selector) = Selector::parse(ANCHOR) else {
        return false;
    };
    let Some(anchor) = document
        .select(&selector)
        .and_then(|target| document.ancestor_at(target, 2))
        .filter(|anchor| document.parent(*anchor).is_some())
    else {
        warn!("banner anchor not found");
        return false;
    };

    let title = page_title(document);
    let banner_nodes = document.parse_detached(banner);
    for node in &banner_nodes {
        replace_title(document, *node, &title);
    }
    for node in banner_nodes {
        document.insert_before(anchor, node);
    }

    let mut previous = anchor;
    for node in document.parse_detached(footer) {
        document.insert_after(previous, node);
        previous = node;
    }
    true
}

fn replace_title(document: &mut Document, node: NodeId, title: &str) {
    let nodes: Vec<NodeId> = std::iter::once(node).chain(document.descendants(node)).collect();
    for id in nodes {
        if let NodeData::Text(text) = document.data(id)
            && text.contains(TITLE_PLACEHOLDER)
        {
            let replaced = text.replace(TITLE_PLACEHOLDER, title);
            document.set_text(id, replaced);
        }
    }
}

/// Link the player script and stylesheets right after `<title>`
pub fn insert_default_resources(document: &mut Document) -> bool {
    let Some(title) = Selector::parse("title").ok().and_then(|selector| document.select(&selector)) else {
        return false;
    };

    let resources = [
        ElementData::html("script", &[("src", PLAYER_SCRIPT)]),
        ElementData::html("link", &[("href", PLAYER_STYLESHEET), ("rel", "stylesheet")]),
        ElementData::html("link", &[("href", ICON_STYLESHEET), ("rel", "stylesheet")]),
    ];
    let mut previous = title;
    for resource in resources {
        let node = document.create_element(resource);
        document.insert_after(previous, node);
        previous = node;
    }
    true
}

fn read_fragment(path: &Path) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(content) => Some(content),
        Err(e) => {
            warn!(path = %sanitize_path(path), error = %e, "could not read banner or footer, skipping");
            None
        }
    }
}

/// Run every preparation step on an HTML string
pub fn prepare_html(html: &str, options: &PrepareOptions) -> Result<(String, PrepareReport)> {
    let selectors = options
        .strip_selectors
        .iter()
        .map(|s| compile_field("strip_selectors", s))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut document = Document::parse(html);
    let mut report = PrepareReport { removed: remove_matching(&mut document, &selectors), ..PrepareReport::default() };
    report.csp_removed = remove_csp_meta(&mut document);

    if options.banner.is_some() || options.footer.is_some() {
        let banner = options.banner.as_deref().map(read_fragment);
        let footer = options.footer.as_deref().map(read_fragment);
        match (banner, footer) {
            (Some(None), _) | (_, Some(None)) => {}
            (banner, footer) => {
                let banner = banner.flatten().unwrap_or_default();
                let footer = footer.flatten().unwrap_or_default();
                report.banner_inserted = add_banner_and_footer(&mut document, &banner, &footer);
            }
        }
    }

    if options.inject_resources {
        report.resources_injected = insert_default_resources(&mut document);
    }

    Ok((document.to_html(), report))
}

/// Prepare `input` and write the result to `output`
pub fn prepare_file(input: &Path, output: &Path, options: &PrepareOptions) -> Result<PrepareReport> {
    let html = std::fs::read_to_string(input)?;
    let (prepared, report) = prepare_html(&html, options)?;
    std::fs::write(output, prepared)?;
    info!(
        input = %sanitize_path(input),
        output = %sanitize_path(output),
        removed = report.removed,
        "page prepared"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const PAGE: &str = concat!(
        r#"<!DOCTYPE html><html><head>"#,
        r#"<meta http-equiv="content-security-policy" content="default-src 'self'">"#,
        r#"<title>Trip plan</title></head><body>"#,
        r#"<div class="header-x1"><div class="relative">menu</div><div class="relative wide">keep</div></div>"#,
        r#"<main><div class="shell"><div class="message-list-a9"><div data-testid="scroll_view">"#,
        r#"<div data-testid="union_message">Hi</div>"#,
        r#"<div data-message-action-bar="1">copy</div>"#,
        r#"</div></div></div></main>"#,
        r#"<div data-testid="chat_input"><textarea></textarea></div>"#,
        r#"</body></html>"#,
    );

    #[test]
    fn test_strip_chrome_and_csp() {
        let (html, report) = prepare_html(PAGE, &PrepareOptions::default()).unwrap();
        assert_eq!(report.removed, 3);
        assert!(report.csp_removed);
        assert!(!html.contains("menu"));
        assert!(html.contains("keep"));
        assert!(!html.contains("copy"));
        assert!(!html.contains("chat_input"));
        assert!(!html.contains("content-security-policy"));
        assert!(html.contains(r#"<div data-testid="union_message">Hi</div>"#));
    }

    #[test]
    fn test_banner_and_footer_wrap_anchor() {
        let dir = tempfile::tempdir().unwrap();
        let banner = dir.path().join("banner.txt");
        let footer = dir.path().join("footer.txt");
        fs::write(&banner, "<header>About __TITLE__</header>").unwrap();
        fs::write(&footer, "<footer>end</footer><p>bye</p>").unwrap();

        let options = PrepareOptions { banner: Some(banner), footer: Some(footer), ..PrepareOptions::default() };
        let (html, report) = prepare_html(PAGE, &options).unwrap();
        assert!(report.banner_inserted);
        assert!(html.contains(r#"<main><header>About Trip plan</header><div class="shell">"#));
        assert!(html.contains("</div><footer>end</footer><p>bye</p></main>"));
    }

    #[test]
    fn test_banner_default_title() {
        let mut doc = Document::parse(
            r#"<div id="a"><div class="message-list-1"><div data-testid="scroll_view"></div></div></div>"#,
        );
        assert!(add_banner_and_footer(&mut doc, "<b>__TITLE__</b>", ""));
        assert!(doc.to_html().starts_with(&format!("<b>{DEFAULT_TITLE}</b><div id=\"a\">")));
    }

    #[test]
    fn test_missing_banner_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let footer = dir.path().join("footer.txt");
        fs::write(&footer, "<footer>end</footer>").unwrap();

        let options = PrepareOptions {
            banner: Some(dir.path().join("missing.txt")),
            footer: Some(footer),
            ..PrepareOptions::default()
        };
        let (html, report) = prepare_html(PAGE, &options).unwrap();
        assert!(!report.banner_inserted);
        assert!(!html.contains("<footer>"));
    }

    #[test]
    fn test_missing_anchor_leaves_page() {
        let mut doc = Document::parse("<p>plain</p>");
        assert!(!add_banner_and_footer(&mut doc, "<b>x</b>", "<i>y</i>"));
        assert_eq!(doc.to_html(), "<p>plain</p>");
    }

    #[test]
    fn test_inject_resources_after_title() {
        let options = PrepareOptions { inject_resources: true, ..PrepareOptions::default() };
        let (html, report) = prepare_html(PAGE, &options).unwrap();
        assert!(report.resources_injected);
        let expected = format!(
            r#"<title>Trip plan</title><script src="{PLAYER_SCRIPT}"></script><link href="{PLAYER_STYLESHEET}" rel="stylesheet"><link href="{ICON_STYLESHEET}" rel="stylesheet"></head>"#
        );
        assert!(html.contains(&expected));
    }

    #[test]
    fn test_inject_resources_without_title() {
        let mut doc = Document::parse("<p>x</p>");
        assert!(!insert_default_resources(&mut doc));
    }

    #[test]
    fn test_invalid_strip_selector() {
        let options = PrepareOptions { strip_selectors: vec!["div[".to_string()], ..PrepareOptions::default() };
        assert!(prepare_html(PAGE, &options).is_err());
    }

    #[test]
    fn test_prepare_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.html");
        let output = dir.path().join("out.html");
        fs::write(&input, PAGE).unwrap();

        let report = prepare_file(&input, &output, &PrepareOptions::default()).unwrap();
        assert_eq!(report.removed, 3);
        let written = fs::read_to_string(&output).unwrap();
        assert!(written.starts_with("<!DOCTYPE html><html><head><title>Trip plan</title>"));
    }
}
