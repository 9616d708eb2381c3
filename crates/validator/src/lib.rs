// Content validation: configuration, frontmatter, slugs, images

use folio_core::{Post, SiteConfig, parse_post, parse_site_toml};
use folio_generator::content::find_post_files;
use folio_rehype::{MarkdownOptions, Node, markdown_to_tree};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "folio.toml";

#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub info: Vec<String>,
}

impl ValidationReport {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Validate the site rooted at `root`
pub fn validate_site(root: &Path) -> ValidationReport {
    let mut report = ValidationReport::default();

    let config = match parse_site_toml(root.join(CONFIG_FILE)) {
        Ok(config) => config,
        Err(e) => {
            report.errors.push(format!("{}: {}", CONFIG_FILE, e));
            return report;
        }
    };
    report.info.push(format!("{} valid", CONFIG_FILE));

    let content_dir = root.join(&config.build.content_dir);
    let files = match find_post_files(&content_dir) {
        Ok(files) => files,
        Err(e) => {
            report.errors.push(format!("{:#}", e));
            return report;
        }
    };

    let mut posts = Vec::new();
    for path in files {
        match parse_post(&path) {
            Ok(post) => posts.push(post),
            Err(e) => report.errors.push(e.to_string()),
        }
    }

    validate_posts(root, &config, &posts, &mut report);
    report
}

/// Checks that need the parsed posts
pub fn validate_posts(
    root: &Path,
    config: &SiteConfig,
    posts: &[Post],
    report: &mut ValidationReport,
) {
    let mut slugs: HashMap<String, &PathBuf> = HashMap::new();

    for post in posts {
        let name = post.path.display();
        let fm = &post.frontmatter;

        if fm.title.trim().is_empty() {
            report.errors.push(format!("{}: title is empty", name));
        }

        if post.is_draft() {
            report.info.push(format!(
                "{}: draft{}",
                name,
                if config.build.drafts { "" } else { " (skipped)" }
            ));
        }

        let slug = post.slug();
        if slug.is_empty() {
            report
                .errors
                .push(format!("{}: title produces an empty slug", name));
        } else if let Some(other) = slugs.insert(slug.clone(), &post.path) {
            report.errors.push(format!(
                "{}: slug '{}' already used by {}",
                name,
                slug,
                other.display()
            ));
        }

        if let Some(og_image) = &fm.og_image
            && !is_remote(og_image)
        {
            let local = root
                .join(&config.build.public_dir)
                .join(og_image.trim_start_matches('/'));
            if !local.exists() {
                report.warnings.push(format!(
                    "{}: ogImage '{}' not found in {}",
                    name,
                    og_image,
                    config.build.public_dir.display()
                ));
            }
        }

        let tree = markdown_to_tree(&post.body, &MarkdownOptions::default());
        let missing = count_images_without_src(&tree);
        if missing > 0 {
            report.warnings.push(format!(
                "{}: {} image(s) without a src will not be linked",
                name, missing
            ));
        }
    }

    tracing::debug!(
        errors = report.errors.len(),
        warnings = report.warnings.len(),
        "Validated posts"
    );
}

fn is_remote(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://") || url.starts_with("//")
}

fn count_images_without_src(node: &Node) -> usize {
    let own = node
        .as_element()
        .filter(|e| e.is("img") && e.get("src").is_none_or(str::is_empty))
        .map_or(0, |_| 1);
    own + node
        .children()
        .unwrap_or_default()
        .iter()
        .map(count_images_without_src)
        .sum::<usize>()
}
