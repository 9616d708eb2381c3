use anyhow::{Context, Result};
use chrono::Utc;
use folio_validator::CONFIG_FILE;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

/// Escape a string for safe inclusion in a TOML basic string
///
/// The config is written from a commented template rather than serialized,
/// so user-provided values are escaped by hand.
fn toml_escape_string(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\x08', "\\b")
        .replace('\x0C', "\\f")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}

/// Site title guessed from the directory name
fn default_title(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty() && *n != ".")
        .map(|n| n.replace(['-', '_'], " "))
        .unwrap_or_else(|| "My Blog".to_string())
}

fn site_toml(title: &str) -> String {
    format!(
        r#"[site]
url = "https://example.com"       # Deployed origin, used for the sitemap
title = "{}"
# author = "Your Name"
description = ""

[markdown]
# Tree transforms applied to every post, in order
rehype_plugins = ["heading-slug", "toc", "image-links"]

[markdown.image_links]
# "eager": link each image to its own src
# "deferred": mark the link with data-img-link="true" and leave href to a page script
policy = "eager"

[markdown.toc]
heading = "Table of contents"
max_depth = 3

[build]
content_dir = "content/posts"
public_dir = "public"
output_dir = "dist"
drafts = false
"#,
        toml_escape_string(title)
    )
}

fn hello_post() -> String {
    format!(
        r#"---
title: Hello World
pubDatetime: {}
description: The first post.
tags:
  - meta
---

Welcome to the blog.

## Table of contents

## Writing posts

Posts live in `content/posts` as markdown with YAML frontmatter.

## Images

Images are wrapped in links that open them in a new tab:

![Placeholder](/favicon.svg)
"#,
        Utc::now().format("%Y-%m-%dT%H:%M:%SZ")
    )
}

const FAVICON: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 32 32"><rect width="32" height="32" rx="6" fill="#006cac"/></svg>
"##;

/// Initialize a new site directory
pub async fn run(path: PathBuf) -> Result<()> {
    println!("Initializing site directory: {}", path.display());

    let config_path = path.join(CONFIG_FILE);
    if config_path.exists() {
        anyhow::bail!(
            "{} already exists at {}\nHint: Delete it first or use a different directory",
            CONFIG_FILE,
            config_path.display()
        );
    }

    create_site(&path)?;

    println!("\n✓ Initialization complete!");
    println!("\nGenerated structure:");
    println!("  {}/", path.display());
    println!("  ├── {}           ← Edit this to set the site URL, title, etc.", CONFIG_FILE);
    println!("  ├── content/posts/");
    println!("  │   └── hello-world.md");
    println!("  └── public/");
    println!("      └── favicon.svg");

    println!("\nNext steps:");
    println!("  1. Edit {} (set url and title)", CONFIG_FILE);
    println!("  2. Write posts in content/posts/");
    println!("  3. Preview: folio preview {}", path.display());

    Ok(())
}

fn create_site(path: &Path) -> Result<()> {
    let posts_dir = path.join("content/posts");
    let public_dir = path.join("public");
    fs::create_dir_all(&posts_dir).context("Failed to create content directory")?;
    fs::create_dir_all(&public_dir).context("Failed to create public directory")?;

    let title = default_title(&fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf()));
    fs::write(path.join(CONFIG_FILE), site_toml(&title))
        .with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    let post_path = posts_dir.join("hello-world.md");
    if !post_path.exists() {
        fs::write(&post_path, hello_post()).context("Failed to write hello-world.md")?;
    }

    let favicon = public_dir.join("favicon.svg");
    if !favicon.exists() {
        fs::write(&favicon, FAVICON).context("Failed to write favicon.svg")?;
    }

    Ok(())
}
