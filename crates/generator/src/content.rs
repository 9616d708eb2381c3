use anyhow::{Context, Result};
use folio_core::{Post, parse_post};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extensions read as posts. `.mdx` is treated as plain markdown.
const POST_EXTENSIONS: &[&str] = &["md", "mdx", "markdown"];

/// Find post source files below `content_dir`, sorted by path
pub fn find_post_files(content_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(content_dir).follow_links(true) {
        let entry = entry.with_context(|| format!("Failed to read {}", content_dir.display()))?;
        let path = entry.path();
        let is_post = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| POST_EXTENSIONS.contains(&e.to_lowercase().as_str()));
        let hidden = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with('.') || n.starts_with('_'));
        if entry.file_type().is_file() && is_post && !hidden {
            files.push(path.to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}

/// Load and parse every post below `content_dir`
pub fn load_posts(content_dir: &Path) -> Result<Vec<Post>> {
    if !content_dir.exists() {
        anyhow::bail!("Content directory does not exist: {}", content_dir.display());
    }

    let posts = find_post_files(content_dir)?
        .into_iter()
        .map(|path| parse_post(&path).with_context(|| format!("Failed to load {}", path.display())))
        .collect::<Result<Vec<_>>>()?;

    tracing::debug!(count = posts.len(), dir = %content_dir.display(), "Loaded posts");
    Ok(posts)
}
