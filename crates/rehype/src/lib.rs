//! Document tree and tree transforms for rendered posts.
//!
//! Markdown is converted into a [`Node`] tree, run through a
//! [`TransformPipeline`] of named transforms, and serialized to HTML.

pub mod hast;
pub mod headings;
pub mod image_links;
pub mod markdown;
pub mod pipeline;
pub mod render;

pub use hast::{Element, Node, Properties};
pub use headings::{HeadingSlugTransform, TocTransform};
pub use image_links::ImageLinkWrapper;
pub use markdown::{MarkdownOptions, markdown_to_tree};
pub use pipeline::{Transform, TransformPipeline, TransformRegistry};
pub use render::to_html;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Unknown transform '{0}'")]
    UnknownTransform(String),
}

pub type Result<T> = std::result::Result<T, Error>;
