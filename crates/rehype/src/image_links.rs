//! Wrap images in links that open them in a new tab.
//!
//! Every `img` with a non-empty `src` that is not already the child of an
//! `a` is replaced, at the same position, by an `a` whose only child is the
//! untouched image. Running the transform twice is the same as running it
//! once.

use folio_core::LinkPolicy;

use crate::hast::{Element, Node};
use crate::pipeline::Transform;

/// Marker attribute left on anchors under [`LinkPolicy::Deferred`]
pub const DEFERRED_MARKER: &str = "data-img-link";

const TARGET: &str = "_blank";
const REL: &str = "noopener noreferrer";

/// Image link transform
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageLinkWrapper {
    policy: LinkPolicy,
}

impl ImageLinkWrapper {
    pub const NAME: &'static str = "image-links";

    pub fn new(policy: LinkPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> LinkPolicy {
        self.policy
    }

    /// Wrap every eligible image below `tree`, returning how many were wrapped.
    ///
    /// `tree` itself is never replaced, even if it is an image.
    pub fn wrap(&self, tree: &mut Node) -> usize {
        match tree {
            Node::Root(children) => self.wrap_children(children, false),
            Node::Element(element) => {
                let parent_is_link = element.is("a");
                self.wrap_children(&mut element.children, parent_is_link)
            }
            Node::Text(_) | Node::Comment(_) | Node::Raw(_) => 0,
        }
    }

    /// Rebuild a child sequence, descending into each child before deciding
    /// whether it gets replaced.
    fn wrap_children(&self, children: &mut Vec<Node>, parent_is_link: bool) -> usize {
        let mut wrapped = 0;
        let old = std::mem::take(children);
        *children = old
            .into_iter()
            .map(|mut child| {
                wrapped += self.wrap(&mut child);
                if !parent_is_link && is_linkable_image(&child) {
                    wrapped += 1;
                    self.anchor_for(child)
                } else {
                    child
                }
            })
            .collect();
        wrapped
    }

    /// Build the anchor that replaces `image`
    fn anchor_for(&self, image: Node) -> Node {
        let anchor = match self.policy {
            LinkPolicy::Eager => {
                let href = image
                    .as_element()
                    .and_then(|img| img.get("src"))
                    .unwrap_or_default()
                    .to_string();
                Element::new("a").with_attr("href", href)
            }
            LinkPolicy::Deferred => Element::new("a").with_attr(DEFERRED_MARKER, "true"),
        };

        Node::Element(
            anchor
                .with_attr("target", TARGET)
                .with_attr("rel", REL)
                .with_children(vec![image]),
        )
    }
}

/// An `img` element with an attribute map holding a non-empty `src`
fn is_linkable_image(node: &Node) -> bool {
    let Some(element) = node.as_element() else {
        return false;
    };
    element.is("img") && element.get("src").is_some_and(|src| !src.is_empty())
}

impl Transform for ImageLinkWrapper {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn transform(&self, tree: &mut Node) {
        let wrapped = self.wrap(tree);
        tracing::trace!(wrapped, policy = ?self.policy, "Wrapped images in links");
    }
}
