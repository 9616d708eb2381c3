// Static site generation: posts -> pages, listings, sitemap, OG-image routes

pub mod content;
pub mod sitemap;
pub mod template;

use anyhow::{Context, Result};
use folio_core::{Post, SiteConfig, github_slug, og_image_paths};
use folio_rehype::{MarkdownOptions, TransformPipeline, markdown_to_tree, to_html};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

pub use content::load_posts;

/// Number of posts shown on the home page
const HOME_POST_COUNT: usize = 4;

pub struct GeneratedSite {
    pub pages: Vec<(String, String)>,   // (path, html)
    pub assets: Vec<(String, Vec<u8>)>, // (path, data)
}

impl GeneratedSite {
    /// Write every page and asset below `output`, creating directories
    pub fn write_to(&self, output: &Path) -> Result<()> {
        let files = self
            .pages
            .iter()
            .map(|(path, html)| (path, html.as_bytes()))
            .chain(self.assets.iter().map(|(path, data)| (path, data.as_slice())));

        for (path, data) in files {
            let dst = output.join(path);
            if let Some(parent) = dst.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            fs::write(&dst, data).with_context(|| format!("Failed to write {}", dst.display()))?;
        }
        Ok(())
    }

    pub fn page(&self, path: &str) -> Option<&str> {
        self.pages
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, html)| html.as_str())
    }

    pub fn asset(&self, path: &str) -> Option<&[u8]> {
        self.assets
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, data)| data.as_slice())
    }
}

/// Render a post body: markdown -> tree -> transforms -> HTML
pub fn render_post_body(post: &Post, pipeline: &TransformPipeline) -> String {
    let mut tree = markdown_to_tree(&post.body, &MarkdownOptions::default());
    pipeline.execute(&mut tree);
    to_html(&tree)
}

/// Posts that get published with this configuration, newest first
pub fn published_posts<'a>(config: &SiteConfig, posts: &'a [Post]) -> Vec<&'a Post> {
    let mut published: Vec<&Post> = posts
        .iter()
        .filter(|p| config.build.drafts || !p.is_draft())
        .collect();
    published.sort_by(|a, b| sort_date(b).cmp(&sort_date(a)));
    published
}

fn sort_date(post: &Post) -> chrono::DateTime<chrono::Utc> {
    post.frontmatter
        .mod_datetime
        .unwrap_or(post.frontmatter.pub_datetime)
}

/// Group posts by tag slug, keeping the first spelling seen as the tag's name.
///
/// Tags that slugify to nothing get no page.
pub fn tag_index<'a>(posts: &[&'a Post]) -> BTreeMap<String, (String, Vec<&'a Post>)> {
    let mut tags: BTreeMap<String, (String, Vec<&'a Post>)> = BTreeMap::new();
    for post in posts {
        for tag in &post.frontmatter.tags {
            let slug = github_slug(tag);
            if slug.is_empty() {
                continue;
            }
            let (_, tagged) = tags.entry(slug).or_insert_with(|| (tag.clone(), Vec::new()));
            if !tagged.iter().any(|p| std::ptr::eq(*p, *post)) {
                tagged.push(*post);
            }
        }
    }
    tags
}

/// Generate the whole site in memory.
///
/// `is_preview` injects the live-reload script into every page.
pub fn generate_site(
    config: &SiteConfig,
    posts: &[Post],
    pipeline: &TransformPipeline,
    is_preview: bool,
) -> Result<GeneratedSite> {
    let published = published_posts(config, posts);

    let mut seen: HashMap<String, &Path> = HashMap::new();
    for post in &published {
        if post.slug().is_empty() {
            anyhow::bail!(
                "Post {} has an empty slug; set a postSlug with letters or digits",
                post.path.display()
            );
        }
        if let Some(previous) = seen.insert(post.slug(), post.path.as_path()) {
            anyhow::bail!(
                "Posts {} and {} both use the slug '{}'",
                previous.display(),
                post.path.display(),
                post.slug()
            );
        }
    }

    let mut pages = Vec::new();
    let mut routes = vec![String::new(), "posts/".to_string()];

    for post in &published {
        let body = render_post_body(post, pipeline);
        let html = template::post_page(&config.site, post, &body, is_preview);
        tracing::debug!(slug = %post.slug(), "Rendered post");
        pages.push((format!("posts/{}/index.html", post.slug()), html));
        routes.push(post.route());
    }

    let recent: Vec<&Post> = published.iter().take(HOME_POST_COUNT).copied().collect();
    pages.push((
        "index.html".to_string(),
        template::home_page(&config.site, &recent, is_preview),
    ));
    pages.push((
        "posts/index.html".to_string(),
        template::post_list_page(&config.site, &published, is_preview),
    ));

    let tags = tag_index(&published);
    for (slug, (name, tagged)) in &tags {
        pages.push((
            format!("tags/{}/index.html", slug),
            template::tag_page(&config.site, name, tagged, is_preview),
        ));
        routes.push(format!("tags/{}/", slug));
    }
    let tag_links: Vec<(&str, &str, usize)> = tags
        .iter()
        .map(|(slug, (name, tagged))| (slug.as_str(), name.as_str(), tagged.len()))
        .collect();
    pages.push((
        "tags/index.html".to_string(),
        template::tags_page(&config.site, &tag_links, is_preview),
    ));
    routes.push("tags/".to_string());

    let og_images = og_image_paths(published.iter().copied());
    let og_manifest =
        serde_json::to_vec_pretty(&og_images).context("Failed to serialize OG image routes")?;

    let assets = vec![
        (
            "sitemap.xml".to_string(),
            sitemap::generate_sitemap(&config.site, &routes).into_bytes(),
        ),
        ("og-images.json".to_string(), og_manifest),
    ];

    Ok(GeneratedSite { pages, assets })
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::{parse_post_str, parse_site_toml_str};
    use folio_rehype::TransformRegistry;
    use std::path::PathBuf;

    fn config(extra: &str) -> SiteConfig {
        parse_site_toml_str(&format!(
            "[site]\nurl = \"https://example.com\"\ntitle = \"Example\"\n{}",
            extra
        ))
        .unwrap()
    }

    fn post(name: &str, frontmatter: &str, body: &str) -> Post {
        let source = format!("---\n{}\n---\n{}", frontmatter, body);
        parse_post_str(&PathBuf::from(name), &source).unwrap()
    }

    fn pipeline(config: &SiteConfig) -> TransformPipeline {
        TransformRegistry::with_builtins(&config.markdown)
            .build(&config.markdown.rehype_plugins)
            .unwrap()
    }

    #[test]
    fn test_render_post_body_wraps_images_eagerly() {
        let config = config("");
        let p = post(
            "a.md",
            "title: A\npubDatetime: 2024-01-01T00:00:00Z",
            "## Photos\n\n![Sunset](/img/sunset.jpg)\n",
        );

        let html = render_post_body(&p, &pipeline(&config));
        assert!(html.contains(r#"<h2 id="photos">Photos</h2>"#));
        assert!(html.contains(
            r#"<a href="/img/sunset.jpg" target="_blank" rel="noopener noreferrer"><img src="/img/sunset.jpg" alt="Sunset"></a>"#
        ));
    }

    #[test]
    fn test_render_post_body_deferred_policy() {
        let config = config("[markdown.image_links]\npolicy = \"deferred\"\n");
        let p = post(
            "a.md",
            "title: A\npubDatetime: 2024-01-01T00:00:00Z",
            "![Sunset](/img/sunset.jpg)\n",
        );

        let html = render_post_body(&p, &pipeline(&config));
        assert!(html.contains(
            r#"<a data-img-link="true" target="_blank" rel="noopener noreferrer"><img"#
        ));
        assert!(!html.contains("href="));
    }

    #[test]
    fn test_render_post_body_toc() {
        let config = config("");
        let p = post(
            "a.md",
            "title: A\npubDatetime: 2024-01-01T00:00:00Z",
            "Intro\n\n## Table of contents\n\n## First\n\n### Nested\n\n## Second\n",
        );

        let html = render_post_body(&p, &pipeline(&config));
        assert!(html.contains(
            r##"<ul><li><a href="#first">First</a><ul><li><a href="#nested">Nested</a></li></ul></li><li><a href="#second">Second</a></li></ul>"##
        ));
    }

    #[test]
    fn test_generate_site_pages_and_assets() {
        let config = config("");
        let posts = vec![
            post(
                "old.md",
                "title: Old Post\npubDatetime: 2023-01-01T00:00:00Z",
                "old\n",
            ),
            post(
                "new.md",
                "title: New Post\npubDatetime: 2024-06-01T00:00:00Z\nogImage: /og/new.png",
                "new\n",
            ),
            post(
                "draft.md",
                "title: Draft\npubDatetime: 2024-07-01T00:00:00Z\ndraft: true",
                "wip\n",
            ),
        ];

        let site = generate_site(&config, &posts, &pipeline(&config), false).unwrap();

        assert!(site.page("posts/old-post/index.html").is_some());
        assert!(site.page("posts/new-post/index.html").is_some());
        assert!(site.page("posts/draft/index.html").is_none());

        let listing = site.page("posts/index.html").unwrap();
        let new_at = listing.find("New Post").unwrap();
        let old_at = listing.find("Old Post").unwrap();
        assert!(new_at < old_at);

        let sitemap = String::from_utf8(site.asset("sitemap.xml").unwrap().to_vec()).unwrap();
        assert!(sitemap.contains("<loc>https://example.com/posts/old-post/</loc>"));
        assert!(!sitemap.contains("draft"));

        let og: serde_json::Value =
            serde_json::from_slice(site.asset("og-images.json").unwrap()).unwrap();
        let og = og.as_array().unwrap();
        assert_eq!(og.len(), 1);
        assert_eq!(og[0]["params"]["slug"], "old-post");
        assert_eq!(og[0]["route"], "posts/old-post/index.png");
    }

    #[test]
    fn test_generate_site_includes_drafts_when_configured() {
        let config = config("[build]\ndrafts = true\n");
        let posts = vec![post(
            "draft.md",
            "title: Draft\npubDatetime: 2024-07-01T00:00:00Z\ndraft: true",
            "wip\n",
        )];

        let site = generate_site(&config, &posts, &pipeline(&config), false).unwrap();
        assert!(site.page("posts/draft/index.html").is_some());
    }

    #[test]
    fn test_generate_site_rejects_duplicate_slugs() {
        let config = config("");
        let posts = vec![
            post("a.md", "title: Same\npubDatetime: 2024-01-01T00:00:00Z", ""),
            post("b.md", "title: same\npubDatetime: 2024-01-02T00:00:00Z", ""),
        ];

        let result = generate_site(&config, &posts, &pipeline(&config), false);
        assert!(result.err().unwrap().to_string().contains("'same'"));
    }

    #[test]
    fn test_generate_site_rejects_empty_slug() {
        let config = config("");
        let posts = vec![post(
            "rocket.md",
            "title: \"🚀\"\npubDatetime: 2024-01-01T00:00:00Z",
            "body\n",
        )];

        let result = generate_site(&config, &posts, &pipeline(&config), false);
        let message = result.err().unwrap().to_string();
        assert!(message.contains("rocket.md"));
        assert!(message.contains("empty slug"));
    }

    #[test]
    fn test_generate_site_accepts_post_slug_for_symbol_title() {
        let config = config("");
        let posts = vec![post(
            "rocket.md",
            "title: \"🚀\"\npostSlug: launch\npubDatetime: 2024-01-01T00:00:00Z",
            "body\n",
        )];

        let site = generate_site(&config, &posts, &pipeline(&config), false).unwrap();
        assert!(site.page("posts/launch/index.html").unwrap().contains("body"));
    }

    #[test]
    fn test_generate_site_tag_pages() {
        let config = config("");
        let posts = vec![
            post(
                "a.md",
                "title: A\npubDatetime: 2024-01-01T00:00:00Z\ntags: [Web Dev, rust]",
                "",
            ),
            post(
                "b.md",
                "title: B\npubDatetime: 2024-02-01T00:00:00Z\ntags: [web dev]",
                "",
            ),
        ];

        let site = generate_site(&config, &posts, &pipeline(&config), false).unwrap();

        let web_dev = site.page("tags/web-dev/index.html").unwrap();
        assert!(web_dev.contains("Tag: Web Dev"));
        assert!(web_dev.contains(r#"href="/posts/a/""#));
        assert!(web_dev.contains(r#"href="/posts/b/""#));

        let rust = site.page("tags/rust/index.html").unwrap();
        assert!(!rust.contains(r#"href="/posts/b/""#));

        let index = site.page("tags/index.html").unwrap();
        assert!(index.contains("#Web Dev</a> (2)"));

        let sitemap = String::from_utf8(site.asset("sitemap.xml").unwrap().to_vec()).unwrap();
        assert!(sitemap.contains("<loc>https://example.com/tags/web-dev/</loc>"));
    }

    #[test]
    fn test_generated_internal_links_resolve() {
        let config = config("");
        let posts = vec![
            post(
                "a.md",
                "title: First Post\npubDatetime: 2024-01-01T00:00:00Z\ntags: [rust, Web Dev]",
                "See [the other one](/posts/second-post/).\n\n## Table of contents\n\n## Part\n",
            ),
            post(
                "b.md",
                "title: Second Post\npubDatetime: 2024-02-01T00:00:00Z",
                "text\n",
            ),
        ];

        let site = generate_site(&config, &posts, &pipeline(&config), false).unwrap();

        for (path, html) in &site.pages {
            for chunk in html.split("href=\"").skip(1) {
                let href = &chunk[..chunk.find('"').unwrap()];
                if !href.starts_with('/') {
                    continue;
                }
                let target = href.trim_start_matches('/');
                let resolved = if target.is_empty() || target.ends_with('/') {
                    site.page(&format!("{}index.html", target)).is_some()
                } else {
                    site.asset(target).is_some()
                };
                assert!(resolved, "{} links to missing {}", path, href);
            }
        }
    }

    #[test]
    fn test_preview_pages_get_reload_script() {
        let config = config("");
        let posts = vec![post("a.md", "title: A\npubDatetime: 2024-01-01T00:00:00Z", "")];

        let preview = generate_site(&config, &posts, &pipeline(&config), true).unwrap();
        assert!(preview.page("index.html").unwrap().contains("/_reload"));

        let build = generate_site(&config, &posts, &pipeline(&config), false).unwrap();
        assert!(!build.page("index.html").unwrap().contains("/_reload"));
    }

    #[test]
    fn test_write_to_creates_nested_directories() {
        let dir = tempfile::tempdir().unwrap();
        let site = GeneratedSite {
            pages: vec![("posts/a/index.html".to_string(), "<p>a</p>".to_string())],
            assets: vec![("sitemap.xml".to_string(), b"<urlset/>".to_vec())],
        };

        site.write_to(dir.path()).unwrap();
        assert_eq!(
            fs::read_to_string(dir.path().join("posts/a/index.html")).unwrap(),
            "<p>a</p>"
        );
        assert!(dir.path().join("sitemap.xml").exists());
    }
}
