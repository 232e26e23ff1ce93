//! CSS selector subset used to locate transcript elements.
//!
//! Supported: type and universal selectors, `#id`, `.class`, attribute
//! selectors (`[a]`, `=`, `*=`, `^=`, `$=`, `~=`), descendant and child
//! combinators, and comma-separated selector lists.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use super::document::{Document, ElementData, NodeId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,

    #[error("unexpected character '{ch}' at offset {offset} in selector '{selector}'")]
    UnexpectedChar { selector: String, ch: char, offset: usize },

    #[error("unterminated attribute selector in '{selector}'")]
    UnterminatedAttribute { selector: String },

    #[error("unsupported selector syntax '{syntax}' in '{selector}'")]
    Unsupported { selector: String, syntax: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttrOp {
    Exists,
    Equals,
    Contains,
    Prefix,
    Suffix,
    Includes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttrMatcher {
    name: String,
    op: AttrOp,
    value: String,
}

impl AttrMatcher {
    fn matches(&self, element: &ElementData) -> bool {
        let Some(actual) = element.attr(&self.name) else {
            return false;
        };
        match self.op {
            AttrOp::Exists => true,
            AttrOp::Equals => actual == self.value,
            AttrOp::Contains => !self.value.is_empty() && actual.contains(&self.value),
            AttrOp::Prefix => !self.value.is_empty() && actual.starts_with(&self.value),
            AttrOp::Suffix => !self.value.is_empty() && actual.ends_with(&self.value),
            AttrOp::Includes => actual.split_ascii_whitespace().any(|word| word == self.value),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    ids: Vec<String>,
    classes: Vec<String>,
    attrs: Vec<AttrMatcher>,
}

impl Compound {
    fn is_empty(&self) -> bool {
        self.tag.is_none() && self.ids.is_empty() && self.classes.is_empty() && self.attrs.is_empty()
    }

    fn matches(&self, element: &ElementData) -> bool {
        if let Some(tag) = &self.tag
            && tag != "*"
            && !element.is(tag)
        {
            return false;
        }
        self.ids.iter().all(|id| element.attr("id") == Some(id.as_str()))
            && self.classes.iter().all(|class| element.has_class(class))
            && self.attrs.iter().all(|attr| attr.matches(element))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

/// One selector of a list: compounds joined by combinators, left to right.
/// The combinator stored with a compound links it to the previous one.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Complex {
    parts: Vec<(Combinator, Compound)>,
}

impl Complex {
    fn matches(&self, document: &Document, node: NodeId) -> bool {
        self.matches_at(document, node, self.parts.len() - 1)
    }

    fn matches_at(&self, document: &Document, node: NodeId, index: usize) -> bool {
        let Some(element) = document.element(node) else {
            return false;
        };
        let (combinator, compound) = &self.parts[index];
        if !compound.matches(element) {
            return false;
        }
        if index == 0 {
            return true;
        }
        match combinator {
            Combinator::Child => document.parent(node).is_some_and(|parent| self.matches_at(document, parent, index - 1)),
            Combinator::Descendant => document
                .ancestors(node)
                .any(|ancestor| self.matches_at(document, ancestor, index - 1)),
        }
    }
}

/// A compiled selector list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    alternatives: Vec<Complex>,
}

impl Selector {
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        Parser::new(input).parse()
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn matches(&self, document: &Document, node: NodeId) -> bool {
        self.alternatives.iter().any(|complex| complex.matches(document, node))
    }
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Selector::parse(s)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}

struct Parser<'a> {
    source: &'a str,
    chars: Vec<(usize, char)>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self { source, chars: source.char_indices().collect(), pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).map(|(_, c)| *c)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_whitespace()) {
            self.pos += 1;
        }
        self.pos != start
    }

    fn offset(&self) -> usize {
        self.chars.get(self.pos).map(|(i, _)| *i).unwrap_or(self.source.len())
    }

    fn unexpected(&self, ch: char) -> SelectorError {
        SelectorError::UnexpectedChar { selector: self.source.to_string(), ch, offset: self.offset() }
    }

    fn parse(mut self) -> Result<Selector, SelectorError> {
        if self.source.trim().is_empty() {
            return Err(SelectorError::Empty);
        }

        let mut alternatives = Vec::new();
        loop {
            alternatives.push(self.parse_complex()?);
            match self.bump() {
                Some(',') => continue,
                None => break,
                Some(other) => {
                    self.pos -= 1;
                    return Err(self.unexpected(other));
                }
            }
        }

        Ok(Selector { source: self.source.trim().to_string(), alternatives })
    }

    fn parse_complex(&mut self) -> Result<Complex, SelectorError> {
        let mut parts = Vec::new();
        let mut combinator = Combinator::Descendant;
        self.skip_whitespace();

        loop {
            let compound = self.parse_compound()?;
            if compound.is_empty() {
                return match self.peek() {
                    Some(c) => Err(self.unexpected(c)),
                    None => Err(SelectorError::Empty),
                };
            }
            parts.push((combinator, compound));

            let had_space = self.skip_whitespace();
            match self.peek() {
                Some('>') => {
                    self.pos += 1;
                    self.skip_whitespace();
                    combinator = Combinator::Child;
                }
                Some(',') | None => return Ok(Complex { parts }),
                Some(c @ ('+' | '~')) => {
                    return Err(SelectorError::Unsupported {
                        selector: self.source.to_string(),
                        syntax: c.to_string(),
                    });
                }
                Some(_) if had_space => combinator = Combinator::Descendant,
                Some(c) => return Err(self.unexpected(c)),
            }
        }
    }

    fn parse_compound(&mut self) -> Result<Compound, SelectorError> {
        let mut compound = Compound::default();

        if self.peek() == Some('*') {
            self.pos += 1;
            compound.tag = Some("*".to_string());
        } else if self.peek().is_some_and(is_ident_char) {
            compound.tag = Some(self.ident());
        }

        loop {
            match self.peek() {
                Some('#') => {
                    self.pos += 1;
                    let id = self.ident();
                    if id.is_empty() {
                        return Err(self.unexpected('#'));
                    }
                    compound.ids.push(id);
                }
                Some('.') => {
                    self.pos += 1;
                    let class = self.ident();
                    if class.is_empty() {
                        return Err(self.unexpected('.'));
                    }
                    compound.classes.push(class);
                }
                Some('[') => {
                    self.pos += 1;
                    compound.attrs.push(self.attribute()?);
                }
                Some(':') => {
                    let start = self.offset();
                    while self.peek().is_some_and(|c| !c.is_whitespace() && c != ',' && c != '>') {
                        self.pos += 1;
                    }
                    return Err(SelectorError::Unsupported {
                        selector: self.source.to_string(),
                        syntax: self.source[start..self.offset()].to_string(),
                    });
                }
                _ => return Ok(compound),
            }
        }
    }

    fn ident(&mut self) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek() {
            if c == '\\' {
                self.pos += 1;
                if let Some(escaped) = self.bump() {
                    out.push(escaped);
                }
                continue;
            }
            if !is_ident_char(c) {
                break;
            }
            out.push(c);
            self.pos += 1;
        }
        out
    }

    fn attribute(&mut self) -> Result<AttrMatcher, SelectorError> {
        let source = self.source;
        let unterminated = || SelectorError::UnterminatedAttribute { selector: source.to_string() };

        self.skip_whitespace();
        let name = self.ident();
        if name.is_empty() {
            return Err(match self.peek() {
                Some(c) => self.unexpected(c),
                None => unterminated(),
            });
        }
        self.skip_whitespace();

        let op = match self.bump().ok_or_else(unterminated)? {
            ']' => return Ok(AttrMatcher { name: name.to_ascii_lowercase(), op: AttrOp::Exists, value: String::new() }),
            '=' => AttrOp::Equals,
            prefix @ ('*' | '^' | '$' | '~') => {
                if self.bump() != Some('=') {
                    self.pos -= 1;
                    return Err(self.unexpected(prefix));
                }
                match prefix {
                    '*' => AttrOp::Contains,
                    '^' => AttrOp::Prefix,
                    '$' => AttrOp::Suffix,
                    _ => AttrOp::Includes,
                }
            }
            other => {
                self.pos -= 1;
                return Err(self.unexpected(other));
            }
        };

        self.skip_whitespace();
        let value = match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.pos += 1;
                let mut value = String::new();
                loop {
                    match self.bump().ok_or_else(unterminated)? {
                        c if c == quote => break,
                        '\\' => value.push(self.bump().ok_or_else(unterminated)?),
                        c => value.push(c),
                    }
                }
                value
            }
            _ => self.ident(),
        };

        self.skip_whitespace();
        match self.bump() {
            Some(']') => Ok(AttrMatcher { name: name.to_ascii_lowercase(), op, value }),
            Some(other) => {
                self.pos -= 1;
                Err(self.unexpected(other))
            }
            None => Err(unterminated()),
        }
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_' || !c.is_ascii()
}
