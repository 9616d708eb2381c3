//! Hypertext tree.
//!
//! A small hast-style node model: a root, elements with ordered
//! attributes, and leaf nodes for text, comments and raw HTML.

use indexmap::IndexMap;

/// Attribute name to value, in source order
pub type Properties = IndexMap<String, String>;

/// One node of a document tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Root(Vec<Node>),
    Element(Element),
    Text(String),
    Comment(String),
    /// Raw HTML carried through from markdown. Transforms never look inside.
    Raw(String),
}

/// A tagged element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag_name: String,
    /// `None` when the element was built without an attribute map
    pub properties: Option<Properties>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            properties: None,
            children: Vec::new(),
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    /// Get an attribute value
    pub fn get(&self, name: &str) -> Option<&str> {
        self.properties
            .as_ref()
            .and_then(|p| p.get(name))
            .map(String::as_str)
    }

    /// Set an attribute, creating the attribute map if needed
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.properties
            .get_or_insert_with(Properties::new)
            .insert(name.into(), value.into());
    }

    pub fn is(&self, tag_name: &str) -> bool {
        self.tag_name == tag_name
    }

    /// Heading rank for `h1`..`h6`
    pub fn heading_depth(&self) -> Option<u8> {
        match self.tag_name.as_str() {
            "h1" => Some(1),
            "h2" => Some(2),
            "h3" => Some(3),
            "h4" => Some(4),
            "h5" => Some(5),
            "h6" => Some(6),
            _ => None,
        }
    }

    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }
}

impl Node {
    pub fn root(children: Vec<Node>) -> Self {
        Node::Root(children)
    }

    pub fn element(element: Element) -> Self {
        Node::Element(element)
    }

    pub fn text(value: impl Into<String>) -> Self {
        Node::Text(value.into())
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(e) => Some(e),
            _ => None,
        }
    }

    pub fn children(&self) -> Option<&[Node]> {
        match self {
            Node::Root(children) => Some(children),
            Node::Element(e) => Some(&e.children),
            _ => None,
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Root(children) => Some(children),
            Node::Element(e) => Some(&mut e.children),
            _ => None,
        }
    }

    /// Concatenated text of this node and its descendants
    pub fn text_content(&self) -> String {
        match self {
            Node::Text(t) => t.clone(),
            _ => {
                let mut out = String::new();
                if let Some(children) = self.children() {
                    collect_text(children, &mut out);
                }
                out
            }
        }
    }
}

fn collect_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(t) => out.push_str(t),
            Node::Root(children) => collect_text(children, out),
            Node::Element(e) => collect_text(&e.children, out),
            Node::Comment(_) | Node::Raw(_) => {}
        }
    }
}
