use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::slug::github_slug;

/// Transforms run on every post when `markdown.rehype_plugins` is not set.
pub const DEFAULT_PLUGINS: &[&str] = &["heading-slug", "toc", "image-links"];

/// Complete site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    pub site: SiteInfo,
    pub markdown: MarkdownConfig,
    pub build: BuildConfig,
}

/// Site identity, used for page titles and absolute URLs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteInfo {
    /// Deployed origin, e.g. "https://example.com" (no trailing slash)
    pub url: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default)]
    pub description: String,
}

impl SiteInfo {
    /// Join a site-relative route onto the deployed origin
    pub fn absolute_url(&self, route: &str) -> String {
        format!("{}/{}", self.url, route.trim_start_matches('/'))
    }
}

/// Markdown pipeline settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkdownConfig {
    /// Tree transforms to run, by registered name, in order
    pub rehype_plugins: Vec<String>,
    pub image_links: ImageLinksConfig,
    pub toc: TocConfig,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            rehype_plugins: DEFAULT_PLUGINS.iter().map(|s| s.to_string()).collect(),
            image_links: ImageLinksConfig::default(),
            toc: TocConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImageLinksConfig {
    #[serde(default)]
    pub policy: LinkPolicy,
}

/// Where the anchor wrapped around an image points.
///
/// `Deferred` leaves the href empty and marks the anchor with
/// `data-img-link="true"`; a script on the delivered page has to fill it in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkPolicy {
    /// `href` is the image's own `src`
    #[default]
    Eager,
    Deferred,
}

/// Table-of-contents injection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TocConfig {
    /// Text of the heading the list is inserted under
    pub heading: String,
    /// Deepest heading level listed
    pub max_depth: u8,
}

impl Default for TocConfig {
    fn default() -> Self {
        Self {
            heading: "Table of contents".to_string(),
            max_depth: 3,
        }
    }
}

/// Directory layout, relative to the site root
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    pub content_dir: PathBuf,
    pub public_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Include posts marked `draft: true`
    pub drafts: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            content_dir: PathBuf::from("content/posts"),
            public_dir: PathBuf::from("public"),
            output_dir: PathBuf::from("dist"),
            drafts: false,
        }
    }
}

/// Post frontmatter, keyed the way the blog's markdown files are written
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostFrontmatter {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    pub pub_datetime: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mod_datetime: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_slug: Option<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub draft: bool,
    #[serde(default = "default_tags")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub og_image: Option<String>,
    #[serde(default)]
    pub description: String,
}

fn default_tags() -> Vec<String> {
    vec!["others".to_string()]
}

/// A markdown post: frontmatter plus the unparsed body
#[derive(Debug, Clone)]
pub struct Post {
    /// Source file the post was read from
    pub path: PathBuf,
    pub frontmatter: PostFrontmatter,
    pub body: String,
}

impl Post {
    /// URL slug: the explicit `postSlug` if given, otherwise the title
    pub fn slug(&self) -> String {
        match &self.frontmatter.post_slug {
            Some(slug) => github_slug(slug),
            None => github_slug(&self.frontmatter.title),
        }
    }

    /// Site-relative route of the rendered post page
    pub fn route(&self) -> String {
        format!("posts/{}/", self.slug())
    }

    pub fn is_draft(&self) -> bool {
        self.frontmatter.draft
    }
}

/// Parameters of a generated per-post route
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaticPathParams {
    pub slug: String,
}

/// A route that some downstream renderer has to produce a file for
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaticPath {
    pub params: StaticPathParams,
    /// Output path relative to the site root, e.g. `posts/hello/index.png`
    pub route: String,
    /// Title of the post the image is generated for
    pub title: String,
}

/// Enumerate the OG-image routes: one per published post without its own `ogImage`
pub fn og_image_paths<'a>(posts: impl IntoIterator<Item = &'a Post>) -> Vec<StaticPath> {
    posts
        .into_iter()
        .filter(|p| !p.frontmatter.draft && p.frontmatter.og_image.is_none())
        .map(|p| {
            let slug = p.slug();
            StaticPath {
                route: format!("posts/{}/index.png", slug),
                title: p.frontmatter.title.clone(),
                params: StaticPathParams { slug },
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(title: &str, slug: Option<&str>, draft: bool, og_image: Option<&str>) -> Post {
        Post {
            path: PathBuf::from("content/posts/x.md"),
            frontmatter: PostFrontmatter {
                title: title.to_string(),
                author: None,
                pub_datetime: "2024-03-01T10:00:00Z".parse().unwrap(),
                mod_datetime: None,
                post_slug: slug.map(str::to_string),
                featured: false,
                draft,
                tags: default_tags(),
                og_image: og_image.map(str::to_string),
                description: String::new(),
            },
            body: String::new(),
        }
    }

    #[test]
    fn test_slug_prefers_post_slug() {
        assert_eq!(post("Hello World", None, false, None).slug(), "hello-world");
        assert_eq!(
            post("Hello World", Some("Custom Slug"), false, None).slug(),
            "custom-slug"
        );
    }

    #[test]
    fn test_og_image_paths_skip_drafts_and_custom_images() {
        let posts = vec![
            post("First Post", None, false, None),
            post("Draft Post", None, true, None),
            post("Has Image", None, false, Some("/og/custom.png")),
            post("Second", Some("second-post"), false, None),
        ];

        let paths = og_image_paths(&posts);
        assert_eq!(paths.len(), 2);
        assert_eq!(paths[0].params.slug, "first-post");
        assert_eq!(paths[0].route, "posts/first-post/index.png");
        assert_eq!(paths[1].params.slug, "second-post");
        assert_eq!(paths[1].title, "Second");
    }

    #[test]
    fn test_absolute_url() {
        let site = SiteInfo {
            url: "https://example.com".to_string(),
            title: "Example".to_string(),
            author: None,
            description: String::new(),
        };
        assert_eq!(site.absolute_url("/posts/a/"), "https://example.com/posts/a/");
        assert_eq!(site.absolute_url(""), "https://example.com/");
    }

    #[test]
    fn test_link_policy_default_is_eager() {
        assert_eq!(LinkPolicy::default(), LinkPolicy::Eager);
    }
}
