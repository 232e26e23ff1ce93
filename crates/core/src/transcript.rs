//! Capture of the ordered chat turns from a page.

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::{SelectorConfig, compile_field};
use crate::error::Result;
use crate::markup::{Document, NodeId, Selector};

/// Who wrote a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MessageKind {
    /// Written by the user; appears at once with a send pulse
    Sent,
    /// Written by the bot; typed out
    Reply,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Sent => "sent",
            MessageKind::Reply => "reply",
        }
    }
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One chat turn in the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageElement {
    /// Element that is shown and hidden
    pub node: NodeId,
    /// Typing region; `None` means there is nothing to type
    pub content: Option<NodeId>,
    pub kind: MessageKind,
    original_markup: Option<String>,
}

impl MessageElement {
    pub fn new(node: NodeId, content: Option<NodeId>, kind: MessageKind) -> Self {
        Self { node, content, kind, original_markup: None }
    }

    /// Element that receives highlight and send pulses
    pub fn pulse_target(&self) -> NodeId {
        self.content.unwrap_or(self.node)
    }

    /// Cached markup of the typing region, if it has been captured
    pub fn original_markup(&self) -> Option<&str> {
        self.original_markup.as_deref()
    }

    /// Markup of the typing region, captured from `document` on first call
    /// and reused afterwards.
    pub fn capture_markup(&mut self, document: &Document) -> Option<&str> {
        let content = self.content?;
        Some(self.original_markup.get_or_insert_with(|| document.inner_html(content)).as_str())
    }
}

/// Compiled form of [`SelectorConfig`]
#[derive(Debug, Clone)]
pub struct SelectorSet {
    pub message_list: Option<Selector>,
    pub message: Selector,
    pub wrapper_depth: usize,
    pub sent_marker: Option<Selector>,
    pub content: Option<Selector>,
}

impl SelectorSet {
    pub fn compile(config: &SelectorConfig) -> Result<Self> {
        let optional = |field, selector: &Option<String>| selector.as_deref().map(|s| compile_field(field, s)).transpose();

        Ok(Self {
            message_list: optional("selectors.message_list", &config.message_list)?,
            message: compile_field("selectors.message", &config.message)?,
            wrapper_depth: config.wrapper_depth,
            sent_marker: optional("selectors.sent_marker", &config.sent_marker)?,
            content: optional("selectors.content", &config.content)?,
        })
    }
}

/// Ordered, fixed-length list of the chat turns in a page
#[derive(Debug, Clone, Default)]
pub struct TranscriptSequence {
    messages: Vec<MessageElement>,
    list: Option<NodeId>,
}

impl TranscriptSequence {
    /// Locate every message in document order.
    ///
    /// A match whose wrapper cannot be reached, or whose wrapper was already
    /// captured, is skipped.
    pub fn capture(document: &Document, selectors: &SelectorSet) -> Self {
        let list = selectors.message_list.as_ref().and_then(|s| document.select(s));
        if let Some(selector) = &selectors.message_list
            && list.is_none()
        {
            warn!(selector = %selector, "message list container not found");
        }

        let mut messages: Vec<MessageElement> = Vec::new();
        for matched in document.select_all(&selectors.message) {
            let Some(node) = document.ancestor_at(matched, selectors.wrapper_depth).filter(|n| document.is_element(*n))
            else {
                warn!(depth = selectors.wrapper_depth, "message wrapper not reachable, skipping");
                continue;
            };
            if messages.iter().any(|m| m.node == node) {
                continue;
            }

            let sent = selectors.sent_marker.as_ref().is_some_and(|s| document.select_within(node, s).is_some());
            let kind = if sent { MessageKind::Sent } else { MessageKind::Reply };
            let content = match &selectors.content {
                Some(selector) => document.select_within(node, selector),
                None => Some(node),
            };
            if content.is_none() {
                debug!(index = messages.len(), "message has no content region");
            }

            messages.push(MessageElement::new(node, content, kind));
        }

        debug!(count = messages.len(), "transcript captured");
        Self { messages, list }
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&MessageElement> {
        self.messages.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut MessageElement> {
        self.messages.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MessageElement> {
        self.messages.iter()
    }

    /// Message list container, when one was configured and found
    pub fn list(&self) -> Option<NodeId> {
        self.list
    }
}
