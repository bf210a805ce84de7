//! Output element tree.
//!
//! The generator produces one [`Element`] per record. The tree is format
//! neutral: the XML and JSON serializers in [`crate::serialize`] decide how
//! each [`Body`] shape is written.

use crate::values::Atom;
use indexmap::IndexMap;

/// A generated output node.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: String,
    pub attributes: IndexMap<String, Atom>,
    pub body: Body,
}

/// Content of an [`Element`].
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// Leaf or attribute-bearing value
    Value(Atom),

    /// Object children, in template order
    Children(Vec<Element>),

    /// Array of atomic values, written as repeated siblings sharing the tag
    Values(Vec<Atom>),

    /// Array of complex items or nested template records
    List(Vec<Element>),
}

impl Element {
    pub fn with_value(tag: impl Into<String>, value: Atom) -> Self {
        Self::with_body(tag, Body::Value(value))
    }

    pub fn with_body(tag: impl Into<String>, body: Body) -> Self {
        Self {
            tag: tag.into(),
            attributes: IndexMap::new(),
            body,
        }
    }

    /// Child elements of object and list bodies.
    pub fn children(&self) -> &[Element] {
        match &self.body {
            Body::Children(children) | Body::List(children) => children,
            Body::Value(_) | Body::Values(_) => &[],
        }
    }

    /// First child with the given tag.
    pub fn child(&self, tag: &str) -> Option<&Element> {
        self.children().iter().find(|child| child.tag == tag)
    }

    /// Leaf value, for value bodies.
    pub fn value(&self) -> Option<&Atom> {
        match &self.body {
            Body::Value(value) => Some(value),
            _ => None,
        }
    }

    /// Repeated values, for array-of-atomics bodies.
    pub fn values(&self) -> &[Atom] {
        match &self.body {
            Body::Values(values) => values,
            _ => &[],
        }
    }
}
