//! Transform pipeline.
//!
//! - [`Transform`] - implemented by every tree transform
//! - [`TransformPipeline`] - ordered transforms run against one document
//! - [`TransformRegistry`] - builds a pipeline from configured transform names
//!
//! Transforms run in a flat, ordered sequence (insertion order). Each one
//! receives the document root and mutates it in place.

use std::collections::HashMap;

use folio_core::MarkdownConfig;

use crate::hast::Node;
use crate::headings::{HeadingSlugTransform, TocTransform};
use crate::image_links::ImageLinkWrapper;
use crate::{Error, Result};

/// A tree transform.
///
/// Transforms are `Send + Sync` so one pipeline can be shared by threads
/// rendering different documents. They hold no per-document state.
pub trait Transform: Send + Sync {
    /// Name the transform is registered under
    fn name(&self) -> &str;

    /// Mutate the tree in place
    fn transform(&self, tree: &mut Node);
}

/// A pipeline of transforms to execute in order.
#[derive(Default)]
pub struct TransformPipeline {
    transforms: Vec<Box<dyn Transform>>,
}

impl TransformPipeline {
    pub fn new() -> Self {
        Self {
            transforms: Vec::new(),
        }
    }

    /// Add a transform to the end of the pipeline.
    pub fn push(&mut self, transform: Box<dyn Transform>) {
        self.transforms.push(transform);
    }

    pub fn extend(&mut self, transforms: impl IntoIterator<Item = Box<dyn Transform>>) {
        self.transforms.extend(transforms);
    }

    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    /// Execute all transforms in insertion order.
    pub fn execute(&self, tree: &mut Node) {
        for transform in &self.transforms {
            tracing::debug!(transform = transform.name(), "Running transform");
            transform.transform(tree);
        }
    }

    /// Names of all transforms in execution order.
    pub fn transform_names(&self) -> Vec<&str> {
        self.transforms.iter().map(|t| t.name()).collect()
    }
}

type Factory = Box<dyn Fn() -> Box<dyn Transform> + Send + Sync>;

/// Name to transform factory mapping
#[derive(Default)]
pub struct TransformRegistry {
    factories: HashMap<String, Factory>,
}

impl TransformRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in transforms, configured from `[markdown]`
    pub fn with_builtins(config: &MarkdownConfig) -> Self {
        let mut registry = Self::new();

        registry.register(HeadingSlugTransform::NAME, || {
            Box::new(HeadingSlugTransform::new())
        });

        let toc = config.toc.clone();
        registry.register(TocTransform::NAME, move || {
            Box::new(TocTransform::new(toc.heading.clone(), toc.max_depth))
        });

        let policy = config.image_links.policy;
        registry.register(ImageLinkWrapper::NAME, move || {
            Box::new(ImageLinkWrapper::new(policy))
        });

        registry
    }

    /// Register a factory, replacing any previous one with the same name
    pub fn register<F>(&mut self, name: &str, factory: F)
    where
        F: Fn() -> Box<dyn Transform> + Send + Sync + 'static,
    {
        self.factories.insert(name.to_string(), Box::new(factory));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Build a pipeline from transform names, in the given order
    pub fn build<S: AsRef<str>>(&self, names: &[S]) -> Result<TransformPipeline> {
        let mut pipeline = TransformPipeline::new();
        for name in names {
            let name = name.as_ref();
            let factory = self
                .factories
                .get(name)
                .ok_or_else(|| Error::UnknownTransform(name.to_string()))?;
            pipeline.push(factory());
        }
        Ok(pipeline)
    }
}
