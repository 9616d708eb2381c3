use anyhow::{Context, Result};
use folio_core::{Post, SiteConfig, parse_site_toml};
use folio_generator::{generate_site, load_posts};
use folio_rehype::{TransformPipeline, TransformRegistry};
use folio_validator::CONFIG_FILE;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A site directory with its configuration and posts loaded
pub struct LoadedSite {
    pub root: PathBuf,
    pub config: SiteConfig,
    pub posts: Vec<Post>,
}

pub struct BuildSummary {
    pub pages: usize,
    pub assets: usize,
    pub public_files: usize,
}

/// Load folio.toml and every post of the site at `path`
pub fn load_site(path: &Path) -> Result<LoadedSite> {
    if !path.exists() {
        anyhow::bail!("Site directory does not exist: {}", path.display());
    }

    let config_path = path.join(CONFIG_FILE);
    if !config_path.exists() {
        anyhow::bail!(
            "{} not found in {}\nRun 'folio init {}' first",
            CONFIG_FILE,
            path.display(),
            path.display()
        );
    }

    let config = parse_site_toml(&config_path)
        .with_context(|| format!("Failed to parse {}", CONFIG_FILE))?;
    let posts = load_posts(&path.join(&config.build.content_dir))?;

    Ok(LoadedSite {
        root: path.to_path_buf(),
        config,
        posts,
    })
}

/// Build the transform pipeline named in `markdown.rehype_plugins`
pub fn build_pipeline(config: &SiteConfig) -> Result<TransformPipeline> {
    TransformRegistry::with_builtins(&config.markdown)
        .build(&config.markdown.rehype_plugins)
        .context("Invalid markdown.rehype_plugins")
}

/// Generate the site and write it, plus the public directory, to `output`
pub fn build_into(site: &LoadedSite, output: &Path, is_preview: bool) -> Result<BuildSummary> {
    let pipeline = build_pipeline(&site.config)?;
    tracing::debug!(transforms = ?pipeline.transform_names(), "Built transform pipeline");

    let generated = generate_site(&site.config, &site.posts, &pipeline, is_preview)?;

    fs::create_dir_all(output).context("Failed to create output directory")?;
    let public_files = copy_dir(&site.root.join(&site.config.build.public_dir), output)?;
    generated.write_to(output)?;

    Ok(BuildSummary {
        pages: generated.pages.len(),
        assets: generated.assets.len(),
        public_files,
    })
}

/// Copy a directory tree; a missing source counts as empty
fn copy_dir(src: &Path, dst: &Path) -> Result<usize> {
    if !src.exists() {
        return Ok(0);
    }

    let mut copied = 0;
    for entry in WalkDir::new(src) {
        let entry = entry?;
        let relative = entry.path().strip_prefix(src)?;
        let target = dst.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else if entry.file_type().is_file() {
            fs::copy(entry.path(), &target)
                .with_context(|| format!("Failed to copy {}", entry.path().display()))?;
            copied += 1;
        }
    }
    Ok(copied)
}
