//! In-memory page model: an arena document tree, a lenient HTML parser, an
//! `innerHTML`-compatible serializer and a CSS selector subset.

mod document;
mod entities;
mod parse;
mod selector;
mod serialize;

pub use document::{Ancestors, Attribute, Document, ElementData, Namespace, NodeData, NodeId};
pub(crate) use parse::parse_into;
pub use parse::{parse_document, parse_fragment};
pub use selector::{Selector, SelectorError};
