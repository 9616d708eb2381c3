//! Heading transforms: `id` slugs and an injected table of contents.

use std::collections::HashMap;

use folio_core::github_slug;

use crate::hast::{Element, Node};
use crate::pipeline::Transform;

/// Hands out unique GitHub-style slugs within one document.
///
/// Repeats get `-1`, `-2`, ... appended.
#[derive(Debug, Default)]
pub struct Slugger {
    occurrences: HashMap<String, usize>,
}

impl Slugger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark an id as taken without generating anything
    pub fn reserve(&mut self, id: &str) {
        self.occurrences.entry(id.to_string()).or_insert(0);
    }

    pub fn slug(&mut self, text: &str) -> String {
        let base = github_slug(text);
        let mut result = base.clone();
        while self.occurrences.contains_key(&result) {
            let count = self.occurrences.entry(base.clone()).or_insert(0);
            *count += 1;
            result = format!("{}-{}", base, count);
        }
        self.occurrences.insert(result.clone(), 0);
        result
    }
}

/// Give every `h1`..`h6` without an `id` one derived from its text
#[derive(Debug, Default)]
pub struct HeadingSlugTransform;

impl HeadingSlugTransform {
    pub const NAME: &'static str = "heading-slug";

    pub fn new() -> Self {
        Self
    }
}

impl Transform for HeadingSlugTransform {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn transform(&self, tree: &mut Node) {
        let mut slugger = Slugger::new();
        reserve_existing_ids(tree, &mut slugger);
        assign_ids(tree, &mut slugger);
    }
}

fn reserve_existing_ids(node: &Node, slugger: &mut Slugger) {
    if let Some(element) = node.as_element()
        && element.heading_depth().is_some()
        && let Some(id) = element.get("id")
    {
        slugger.reserve(id);
    }
    for child in node.children().unwrap_or_default() {
        reserve_existing_ids(child, slugger);
    }
}

fn assign_ids(node: &mut Node, slugger: &mut Slugger) {
    if let Some(element) = node.as_element_mut()
        && element.heading_depth().is_some()
        && element.get("id").is_none()
    {
        let text = element.text_content();
        // Headings with no text (e.g. image-only) stay without an id
        if !github_slug(&text).is_empty() {
            let id = slugger.slug(&text);
            element.set("id", id);
        }
    }
    if let Some(children) = node.children_mut() {
        for child in children {
            assign_ids(child, slugger);
        }
    }
}

/// Fill the section under a "Table of contents" heading with links to the
/// headings that follow it.
///
/// Only top-level headings are considered. Everything between the matched
/// heading and the next heading of the same or higher rank is replaced, so
/// running the transform again regenerates the same list.
#[derive(Debug, Clone)]
pub struct TocTransform {
    heading: String,
    max_depth: u8,
}

struct TocEntry {
    depth: u8,
    id: Option<String>,
    label: String,
}

impl TocTransform {
    pub const NAME: &'static str = "toc";

    pub fn new(heading: impl Into<String>, max_depth: u8) -> Self {
        Self {
            heading: heading.into(),
            max_depth,
        }
    }

    fn is_toc_heading(&self, element: &Element) -> bool {
        element.heading_depth().is_some()
            && element.text_content().trim().to_lowercase() == self.heading.trim().to_lowercase()
    }
}

impl Transform for TocTransform {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn transform(&self, tree: &mut Node) {
        let Some(children) = tree.children_mut() else {
            return;
        };

        let Some((start, toc_depth)) = children.iter().enumerate().find_map(|(i, n)| {
            n.as_element()
                .filter(|e| self.is_toc_heading(e))
                .and_then(|e| e.heading_depth())
                .map(|d| (i, d))
        }) else {
            return;
        };

        let end = children[start + 1..]
            .iter()
            .position(|n| depth_of(n).is_some_and(|d| d <= toc_depth))
            .map_or(children.len(), |i| start + 1 + i);

        let entries: Vec<TocEntry> = children[end..]
            .iter()
            .filter_map(Node::as_element)
            .filter_map(|e| {
                let depth = e.heading_depth()?;
                let label = e.text_content().trim().to_string();
                if depth > self.max_depth || label.is_empty() {
                    return None;
                }
                Some(TocEntry {
                    depth,
                    id: e.get("id").map(str::to_string),
                    label,
                })
            })
            .collect();

        if entries.is_empty() {
            tracing::debug!(heading = %self.heading, "No headings to list in table of contents");
            return;
        }

        let list = Node::Element(build_list(&entries));
        children.splice(start + 1..end, [list]);
    }
}

fn depth_of(node: &Node) -> Option<u8> {
    node.as_element().and_then(Element::heading_depth)
}

/// Nest entries into `ul > li` by heading depth
fn build_list(entries: &[TocEntry]) -> Element {
    let mut items = Vec::new();
    let mut i = 0;
    while i < entries.len() {
        let entry = &entries[i];
        let mut j = i + 1;
        while j < entries.len() && entries[j].depth > entry.depth {
            j += 1;
        }

        let label = match &entry.id {
            Some(id) => Node::Element(
                Element::new("a")
                    .with_attr("href", format!("#{}", id))
                    .with_children(vec![Node::text(entry.label.as_str())]),
            ),
            None => Node::text(entry.label.as_str()),
        };

        let mut item = Element::new("li").with_children(vec![label]);
        if j > i + 1 {
            item.children.push(Node::Element(build_list(&entries[i + 1..j])));
        }
        items.push(Node::Element(item));
        i = j;
    }
    Element::new("ul").with_children(items)
}
