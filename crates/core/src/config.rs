use crate::error::{Error, Result};
use crate::types::*;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Raw TOML configuration structure
/// This matches the folio.toml file structure exactly
#[derive(Debug, Deserialize)]
struct RawConfig {
    site: RawSite,
    #[serde(default)]
    markdown: RawMarkdown,
    #[serde(default)]
    build: RawBuild,
}

#[derive(Debug, Deserialize)]
struct RawSite {
    url: String,
    title: String,
    author: Option<String>,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Default, Deserialize)]
struct RawMarkdown {
    rehype_plugins: Option<Vec<String>>,
    #[serde(default)]
    image_links: ImageLinksConfig,
    #[serde(default)]
    toc: RawToc,
}

#[derive(Debug, Default, Deserialize)]
struct RawToc {
    heading: Option<String>,
    max_depth: Option<u8>,
}

#[derive(Debug, Default, Deserialize)]
struct RawBuild {
    content_dir: Option<String>, // Convert to PathBuf
    public_dir: Option<String>,
    output_dir: Option<String>,
    #[serde(default)]
    drafts: bool,
}

/// Parse folio.toml from a file path
pub fn parse_site_toml<P: AsRef<Path>>(path: P) -> Result<SiteConfig> {
    let content = fs::read_to_string(path)?;
    parse_site_toml_str(&content)
}

/// Parse folio.toml from a string (useful for testing)
pub fn parse_site_toml_str(content: &str) -> Result<SiteConfig> {
    let raw: RawConfig = toml::from_str(content)?;

    let url = raw.site.url.trim_end_matches('/').to_string();
    if !(url.starts_with("https://") || url.starts_with("http://")) {
        return Err(Error::ConfigParse(format!(
            "site.url must be an absolute http(s) URL, got '{}'",
            raw.site.url
        )));
    }

    let site = SiteInfo {
        url,
        title: raw.site.title,
        author: raw.site.author,
        description: raw.site.description,
    };

    let toc_defaults = TocConfig::default();
    let max_depth = raw.markdown.toc.max_depth.unwrap_or(toc_defaults.max_depth);
    if !(1..=6).contains(&max_depth) {
        return Err(Error::ConfigParse(format!(
            "markdown.toc.max_depth must be between 1 and 6, got {}",
            max_depth
        )));
    }

    let markdown = MarkdownConfig {
        rehype_plugins: raw
            .markdown
            .rehype_plugins
            .unwrap_or_else(|| MarkdownConfig::default().rehype_plugins),
        image_links: raw.markdown.image_links,
        toc: TocConfig {
            heading: raw.markdown.toc.heading.unwrap_or(toc_defaults.heading),
            max_depth,
        },
    };

    let build_defaults = BuildConfig::default();
    let build = BuildConfig {
        content_dir: optional_path(raw.build.content_dir, "build.content_dir")?
            .unwrap_or(build_defaults.content_dir),
        public_dir: optional_path(raw.build.public_dir, "build.public_dir")?
            .unwrap_or(build_defaults.public_dir),
        output_dir: optional_path(raw.build.output_dir, "build.output_dir")?
            .unwrap_or(build_defaults.output_dir),
        drafts: raw.build.drafts,
    };

    tracing::debug!(
        plugins = ?markdown.rehype_plugins,
        policy = ?markdown.image_links.policy,
        "Loaded site configuration"
    );

    Ok(SiteConfig {
        site,
        markdown,
        build,
    })
}

fn optional_path(path_str: Option<String>, field_name: &str) -> Result<Option<PathBuf>> {
    path_str
        .map(|p| validate_path(&p, field_name))
        .transpose()
}

/// Validate and convert a path string to PathBuf.
///
/// Rejects absolute paths and parent directory references (`..`) so a
/// folio.toml can't point the build at files outside the site directory.
fn validate_path(path_str: &str, field_name: &str) -> Result<PathBuf> {
    let path = Path::new(path_str);

    // Ensure path is not empty
    if path_str.trim().is_empty() {
        return Err(Error::ConfigParse(format!(
            "Empty path in '{}' field",
            field_name
        )));
    }

    // Reject absolute paths
    if path.is_absolute() {
        return Err(Error::ConfigParse(format!(
            "Absolute paths not allowed in '{}': '{}'. Use relative paths only.",
            field_name, path_str
        )));
    }

    for component in path.components() {
        if component == std::path::Component::ParentDir {
            return Err(Error::ConfigParse(format!(
                "Parent directory references (..) not allowed in '{}': '{}'",
                field_name, path_str
            )));
        }
    }

    Ok(path.to_path_buf())
}
