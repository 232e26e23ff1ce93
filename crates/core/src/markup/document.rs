use super::parse;
use super::selector::Selector;
use super::serialize;

/// Handle to a node inside a [`Document`].
///
/// Detached nodes keep their slot and can be re-attached. Nodes dropped by
/// [`Document::clear_children`] or [`Document::set_inner_html`] are recycled,
/// so their handles must not be used afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Element namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Namespace {
    #[default]
    Html,
    Svg,
}

/// Local names that are always created in the SVG namespace, with their
/// case-sensitive spelling.
const SVG_LOCAL_NAMES: &[&str] = &[
    "svg",
    "path",
    "g",
    "rect",
    "circle",
    "line",
    "polyline",
    "polygon",
    "ellipse",
    "text",
    "tspan",
    "use",
    "defs",
    "clipPath",
    "filter",
    "mask",
    "pattern",
    "symbol",
    "linearGradient",
    "radialGradient",
    "stop",
];

impl Namespace {
    /// Canonical spelling of a known SVG local name (matched case-insensitively)
    pub fn svg_local_name(name: &str) -> Option<&'static str> {
        SVG_LOCAL_NAMES.iter().find(|known| known.eq_ignore_ascii_case(name)).copied()
    }
}

/// HTML elements that never have children or an end tag
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source", "track", "wbr",
];

/// HTML elements whose text children are serialized without escaping
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "xmp", "iframe", "noembed", "noframes", "plaintext"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { name: name.into(), value: value.into() }
    }
}

/// Tag name, namespace and attributes of an element, in source order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    pub name: String,
    pub namespace: Namespace,
    pub attrs: Vec<Attribute>,
}

impl ElementData {
    pub fn new(name: impl Into<String>, namespace: Namespace) -> Self {
        Self { name: name.into(), namespace, attrs: Vec::new() }
    }

    /// Create an HTML element with the given attributes
    pub fn html(name: impl Into<String>, attrs: &[(&str, &str)]) -> Self {
        let mut data = Self::new(name, Namespace::Html);
        for (name, value) in attrs {
            data.set_attr(*name, *value);
        }
        data
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.iter().find(|a| a.name == name).map(|a| a.value.as_str())
    }

    /// Set an attribute, replacing the value in place when it already exists
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attrs.iter_mut().find(|a| a.name == name) {
            Some(existing) => existing.value = value,
            None => self.attrs.push(Attribute { name, value }),
        }
    }

    pub fn remove_attr(&mut self, name: &str) -> bool {
        let before = self.attrs.len();
        self.attrs.retain(|a| a.name != name);
        before != self.attrs.len()
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or("").split_ascii_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    pub fn is_void(&self) -> bool {
        self.namespace == Namespace::Html && VOID_ELEMENTS.contains(&self.name.as_str())
    }

    pub fn is_raw_text(&self) -> bool {
        self.namespace == Namespace::Html && RAW_TEXT_ELEMENTS.contains(&self.name.as_str())
    }

    /// Matches the tag name the way type selectors do (ASCII case-insensitive)
    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    Document,
    Element(ElementData),
    Text(String),
    Comment(String),
    Doctype(String),
}

#[derive(Debug, Clone)]
struct Slot {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Arena-backed document tree.
///
/// This is the live page the navigator and typer mutate. Node 0 is always the
/// document root. Slots of dropped subtrees go on a free list and are handed
/// out again by the `create_*` calls, so repeated reveals of one message do
/// not grow the arena.
#[derive(Debug, Clone)]
pub struct Document {
    slots: Vec<Slot>,
    free: Vec<usize>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document
    pub fn new() -> Self {
        Self { slots: vec![Slot { data: NodeData::Document, parent: None, children: Vec::new() }], free: Vec::new() }
    }

    /// Parse a complete HTML document
    pub fn parse(html: &str) -> Self {
        parse::parse_document(html)
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of live nodes, attached or not
    pub(crate) fn node_count(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    fn alloc(&mut self, data: NodeData) -> NodeId {
        let slot = Slot { data, parent: None, children: Vec::new() };
        match self.free.pop() {
            Some(index) => {
                self.slots[index] = slot;
                NodeId(index)
            }
            None => {
                self.slots.push(slot);
                NodeId(self.slots.len() - 1)
            }
        }
    }

    /// Return `id` and its whole subtree to the free list. `id` must already
    /// be detached.
    fn release(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            let slot = &mut self.slots[next.0];
            stack.append(&mut slot.children);
            slot.data = NodeData::Text(String::new());
            slot.parent = None;
            self.free.push(next.0);
        }
    }

    pub fn create_element(&mut self, data: ElementData) -> NodeId {
        self.alloc(NodeData::Element(data))
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(NodeData::Text(text.into()))
    }

    pub fn create_comment(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(NodeData::Comment(text.into()))
    }

    pub fn create_doctype(&mut self, name: impl Into<String>) -> NodeId {
        self.alloc(NodeData::Doctype(name.into()))
    }

    pub fn data(&self, id: NodeId) -> &NodeData {
        &self.slots[id.0].data
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        match &self.slots[id.0].data {
            NodeData::Element(data) => Some(data),
            _ => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match &mut self.slots[id.0].data {
            NodeData::Element(data) => Some(data),
            _ => None,
        }
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.slots[id.0].data, NodeData::Element(_))
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.slots[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.slots[id.0].children
    }

    /// Ancestors from the parent up to the root
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors { document: self, next: self.parent(id) }
    }

    /// Climb `depth` parents; `None` when the tree is not that deep
    pub fn ancestor_at(&self, id: NodeId, depth: usize) -> Option<NodeId> {
        let mut current = id;
        for _ in 0..depth {
            current = self.parent(current)?;
        }
        Some(current)
    }

    /// All descendants in document order, excluding `id` itself
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    /// Remove a node from its parent. The node and its subtree stay allocated.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.slots[id.0].parent.take() {
            self.slots[parent.0].children.retain(|child| *child != id);
        }
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.slots[child.0].parent = Some(parent);
        self.slots[parent.0].children.push(child);
    }

    /// Insert `child` right before `reference` under the same parent.
    ///
    /// Returns false when `reference` has no parent.
    pub fn insert_before(&mut self, reference: NodeId, child: NodeId) -> bool {
        self.insert_relative(reference, child, 0)
    }

    /// Insert `child` right after `reference` under the same parent
    pub fn insert_after(&mut self, reference: NodeId, child: NodeId) -> bool {
        self.insert_relative(reference, child, 1)
    }

    fn insert_relative(&mut self, reference: NodeId, child: NodeId, offset: usize) -> bool {
        if reference == child {
            return false;
        }
        self.detach(child);
        let Some(parent) = self.parent(reference) else {
            return false;
        };
        let Some(position) = self.slots[parent.0].children.iter().position(|c| *c == reference) else {
            return false;
        };
        self.slots[child.0].parent = Some(parent);
        self.slots[parent.0].children.insert(position + offset, child);
        true
    }

    /// Drop every child of `id` and recycle their subtrees
    pub fn clear_children(&mut self, id: NodeId) {
        for child in self.take_children(id) {
            self.release(child);
        }
    }

    /// Detach every child of `id` and return them, still allocated
    fn take_children(&mut self, id: NodeId) -> Vec<NodeId> {
        let children = std::mem::take(&mut self.slots[id.0].children);
        for child in &children {
            self.slots[child.0].parent = None;
        }
        children
    }

    /// Append text, extending a trailing text child instead of creating a
    /// new node so adjacent characters stay a single text node.
    pub fn append_text(&mut self, parent: NodeId, text: &str) {
        if let Some(&last) = self.slots[parent.0].children.last()
            && let NodeData::Text(existing) = &mut self.slots[last.0].data
        {
            existing.push_str(text);
            return;
        }
        let node = self.create_text(text);
        self.append_child(parent, node);
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|e| e.attr(name))
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: impl Into<String>) {
        if let Some(element) = self.element_mut(id) {
            element.set_attr(name, value);
        }
    }

    pub fn remove_attr(&mut self, id: NodeId, name: &str) -> bool {
        self.element_mut(id).is_some_and(|e| e.remove_attr(name))
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.element(id).is_some_and(|e| e.has_class(class))
    }

    /// Add a class, normalizing the class list to single spaces like `classList.add`
    pub fn add_class(&mut self, id: NodeId, class: &str) {
        let Some(element) = self.element_mut(id) else {
            return;
        };
        let mut classes: Vec<String> = Vec::new();
        for existing in element.classes().chain(std::iter::once(class)) {
            if !classes.iter().any(|c| c == existing) {
                classes.push(existing.to_string());
            }
        }
        element.set_attr("class", classes.join(" "));
    }

    /// Remove a class. The attribute is kept (possibly empty) like `classList.remove`.
    pub fn remove_class(&mut self, id: NodeId, class: &str) {
        let Some(element) = self.element_mut(id) else {
            return;
        };
        if element.attr("class").is_none() {
            return;
        }
        let classes: Vec<&str> = element.classes().filter(|c| *c != class).collect();
        let joined = classes.join(" ");
        element.set_attr("class", joined);
    }

    /// Read one property from the inline `style` attribute
    pub fn style_property(&self, id: NodeId, property: &str) -> Option<String> {
        let style = self.attr(id, "style")?;
        parse_declarations(style)
            .into_iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(property))
            .map(|(_, value)| value)
    }

    /// Write one property of the inline `style` attribute.
    ///
    /// An empty value removes the property. Declarations are written back as
    /// `name: value;` separated by single spaces.
    pub fn set_style_property(&mut self, id: NodeId, property: &str, value: &str) {
        if !self.is_element(id) {
            return;
        }
        let mut declarations = self.attr(id, "style").map(parse_declarations).unwrap_or_default();
        let position = declarations.iter().position(|(name, _)| name.eq_ignore_ascii_case(property));
        match (position, value.is_empty()) {
            (Some(index), true) => {
                declarations.remove(index);
            }
            (Some(index), false) => declarations[index].1 = value.to_string(),
            (None, true) => {}
            (None, false) => declarations.push((property.to_ascii_lowercase(), value.to_string())),
        }

        let style = declarations
            .iter()
            .map(|(name, value)| format!("{}: {};", name, value))
            .collect::<Vec<_>>()
            .join(" ");
        self.set_attr(id, "style", style);
    }

    /// True unless the node or one of its ancestors has `display: none`
    pub fn is_rendered(&self, id: NodeId) -> bool {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .all(|node| self.style_property(node, "display").as_deref() != Some("none"))
    }

    /// Text of a text or comment node
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.slots[id.0].data {
            NodeData::Text(text) | NodeData::Comment(text) => Some(text),
            _ => None,
        }
    }

    /// Replace the text of a text or comment node
    pub fn set_text(&mut self, id: NodeId, value: impl Into<String>) {
        if let NodeData::Text(text) | NodeData::Comment(text) = &mut self.slots[id.0].data {
            *text = value.into();
        }
    }

    /// Concatenated text of all descendant text nodes
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        if let NodeData::Text(text) = self.data(id) {
            out.push_str(text);
        }
        for node in self.descendants(id) {
            if let NodeData::Text(text) = self.data(node) {
                out.push_str(text);
            }
        }
        out
    }

    /// Serialized markup of the children of `id`
    pub fn inner_html(&self, id: NodeId) -> String {
        serialize::inner_html(self, id)
    }

    /// Serialized markup of `id` including its own tag
    pub fn outer_html(&self, id: NodeId) -> String {
        serialize::outer_html(self, id)
    }

    /// Serialize the whole document
    pub fn to_html(&self) -> String {
        self.inner_html(self.root())
    }

    /// Replace the children of `id` with the parsed `markup`
    pub fn set_inner_html(&mut self, id: NodeId, markup: &str) {
        self.clear_children(id);
        let context = self.element(id).map(|e| (e.namespace, e.name.clone()));
        parse::parse_into(self, id, markup, context);
    }

    /// Parse `markup` into new nodes that are not attached anywhere yet
    pub fn parse_detached(&mut self, markup: &str) -> Vec<NodeId> {
        let holder = self.create_element(ElementData::new("template", Namespace::Html));
        parse::parse_into(self, holder, markup, None);
        let nodes = self.take_children(holder);
        self.release(holder);
        nodes
    }

    /// First element in document order matching `selector`
    pub fn select(&self, selector: &Selector) -> Option<NodeId> {
        self.select_within(self.root(), selector)
    }

    /// All elements in document order matching `selector`
    pub fn select_all(&self, selector: &Selector) -> Vec<NodeId> {
        self.select_all_within(self.root(), selector)
    }

    /// First descendant of `scope` matching `selector`, like `Element.querySelector`
    pub fn select_within(&self, scope: NodeId, selector: &Selector) -> Option<NodeId> {
        self.descendants(scope).into_iter().find(|node| selector.matches(self, *node))
    }

    pub fn select_all_within(&self, scope: NodeId, selector: &Selector) -> Vec<NodeId> {
        self.descendants(scope).into_iter().filter(|node| selector.matches(self, *node)).collect()
    }
}

pub struct Ancestors<'a> {
    document: &'a Document,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.document.parent(current);
        Some(current)
    }
}

fn parse_declarations(style: &str) -> Vec<(String, String)> {
    style
        .split(';')
        .filter_map(|declaration| {
            let (name, value) = declaration.split_once(':')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some((name.to_ascii_lowercase(), value.trim().to_string()))
        })
        .collect()
}
