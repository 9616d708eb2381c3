use folio_core::{Post, SiteInfo, github_slug};

/// HTML-escape a string to prevent XSS attacks
///
/// Escapes: & < > " '
pub fn html_escape(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '&' => "&amp;".to_string(),
            '<' => "&lt;".to_string(),
            '>' => "&gt;".to_string(),
            '"' => "&quot;".to_string(),
            '\'' => "&#x27;".to_string(),
            _ => c.to_string(),
        })
        .collect()
}

const STYLE: &str = r#"
        * { margin: 0; padding: 0; box-sizing: border-box; }
        body {
            font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif;
            line-height: 1.7;
            color: #282728;
            background: #fdfdfd;
        }
        header, main, footer { max-width: 48rem; margin: 0 auto; padding: 1.5rem; }
        header a.site-title { font-weight: 700; font-size: 1.25rem; color: inherit; text-decoration: none; }
        header nav a { margin-left: 1rem; color: #006cac; }
        h1 { font-size: 2rem; margin-bottom: 0.5rem; }
        article h2, article h3, article h4 { margin: 2rem 0 0.75rem; }
        article p, article ul, article ol, article pre, article blockquote, article table { margin-bottom: 1rem; }
        article ul, article ol { padding-left: 1.5rem; }
        article img { max-width: 100%; height: auto; border-radius: 4px; }
        article a[target="_blank"] img { cursor: zoom-in; }
        article pre { background: #f6f8fa; padding: 1rem; overflow-x: auto; border-radius: 4px; }
        article blockquote { border-left: 3px solid #006cac; padding-left: 1rem; color: #555; }
        .meta { color: #777; font-size: 0.9rem; margin-bottom: 2rem; }
        .tags a { margin-right: 0.5rem; color: #006cac; font-size: 0.9rem; }
        .post-list li { list-style: none; margin-bottom: 1.5rem; }
        .post-list a { font-size: 1.15rem; font-weight: 600; color: #006cac; }
        footer { color: #999; font-size: 0.85rem; text-align: center; }
"#;

const RELOAD_SCRIPT: &str = r#"
    <script>
        // Hot reload via Server-Sent Events
        const eventSource = new EventSource('/_reload');
        eventSource.onmessage = () => {
            console.log('Reloading...');
            location.reload();
        };
        eventSource.onerror = () => {
            console.log('Preview server disconnected');
            eventSource.close();
        };
    </script>"#;

/// Wrap page content in the shared document shell
fn layout(site: &SiteInfo, title: &str, description: &str, body: &str, is_preview: bool) -> String {
    let full_title = if title == site.title {
        html_escape(title)
    } else {
        format!("{} | {}", html_escape(title), html_escape(&site.title))
    };
    let author = site
        .author
        .as_deref()
        .map(|a| format!(r#"<meta name="author" content="{}">"#, html_escape(a)))
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{}</title>
    <meta name="description" content="{}">
    {}
    <link rel="sitemap" href="/sitemap.xml">
    <style>{}</style>
</head>
<body>
    <header>
        <a class="site-title" href="/">{}</a>
        <nav><a href="/posts/">Posts</a> <a href="/tags/">Tags</a></nav>
    </header>
    <main>
{}
    </main>
    <footer>&copy; {}</footer>{}
</body>
</html>
"#,
        full_title,
        html_escape(description),
        author,
        STYLE,
        html_escape(&site.title),
        body,
        html_escape(site.author.as_deref().unwrap_or(&site.title)),
        if is_preview { RELOAD_SCRIPT } else { "" }
    )
}

fn post_date(post: &Post) -> String {
    post.frontmatter.pub_datetime.format("%B %-d, %Y").to_string()
}

/// Full page for a single post; `body` is already-rendered HTML
pub fn post_page(site: &SiteInfo, post: &Post, body: &str, is_preview: bool) -> String {
    let fm = &post.frontmatter;
    let tags: String = fm
        .tags
        .iter()
        .map(|t| {
            let slug = github_slug(t);
            if slug.is_empty() {
                format!("<span>#{}</span>", html_escape(t))
            } else {
                format!(r#"<a href="/tags/{}/">#{}</a>"#, slug, html_escape(t))
            }
        })
        .collect();
    let updated = fm
        .mod_datetime
        .map(|d| format!(" (updated {})", d.format("%B %-d, %Y")))
        .unwrap_or_default();

    let content = format!(
        r#"        <article>
            <h1>{}</h1>
            <div class="meta">{}{}</div>
            {}
        </article>
        <div class="tags">{}</div>"#,
        html_escape(&fm.title),
        post_date(post),
        updated,
        body,
        tags
    );

    layout(site, &fm.title, &fm.description, &content, is_preview)
}

fn post_list(posts: &[&Post]) -> String {
    let items: String = posts
        .iter()
        .map(|p| {
            format!(
                r#"<li><a href="/{}">{}</a><div class="meta">{}</div><p>{}</p></li>"#,
                p.route(),
                html_escape(&p.frontmatter.title),
                post_date(p),
                html_escape(&p.frontmatter.description)
            )
        })
        .collect();
    format!(r#"<ul class="post-list">{}</ul>"#, items)
}

/// Home page: site description and the most recent posts
pub fn home_page(site: &SiteInfo, recent: &[&Post], is_preview: bool) -> String {
    let content = format!(
        r#"        <h1>{}</h1>
        <p>{}</p>
        <h2>Recent posts</h2>
        {}
        <p><a href="/posts/">All posts &rarr;</a></p>"#,
        html_escape(&site.title),
        html_escape(&site.description),
        post_list(recent)
    );
    layout(site, &site.title, &site.description, &content, is_preview)
}

/// Listing of every published post
pub fn post_list_page(site: &SiteInfo, posts: &[&Post], is_preview: bool) -> String {
    let content = format!("        <h1>Posts</h1>\n        {}", post_list(posts));
    layout(site, "Posts", "All the articles I've posted.", &content, is_preview)
}

/// Posts carrying one tag
pub fn tag_page(site: &SiteInfo, tag: &str, posts: &[&Post], is_preview: bool) -> String {
    let content = format!(
        "        <h1>Tag: {}</h1>\n        {}",
        html_escape(tag),
        post_list(posts)
    );
    let description = format!("All the articles with the tag \"{}\".", tag);
    layout(
        site,
        &format!("Tag: {}", tag),
        &description,
        &content,
        is_preview,
    )
}

/// Every tag with its post count; entries are `(slug, name, count)`
pub fn tags_page(site: &SiteInfo, tags: &[(&str, &str, usize)], is_preview: bool) -> String {
    let items: String = tags
        .iter()
        .map(|(slug, name, count)| {
            format!(
                r#"<li><a href="/tags/{}/">#{}</a> ({})</li>"#,
                slug,
                html_escape(name),
                count
            )
        })
        .collect();
    let content = format!(
        r#"        <h1>Tags</h1>
        <ul class="tags">{}</ul>"#,
        items
    );
    layout(site, "Tags", "All the tags used in posts.", &content, is_preview)
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::parse_post_str;
    use std::path::Path;

    fn site() -> SiteInfo {
        SiteInfo {
            url: "https://example.com".to_string(),
            title: "Example".to_string(),
            author: Some("Jane".to_string()),
            description: "A blog".to_string(),
        }
    }

    #[test]
    fn test_html_escape() {
        assert_eq!(
            html_escape(r#"<script>alert("x") & 'y'</script>"#),
            "&lt;script&gt;alert(&quot;x&quot;) &amp; &#x27;y&#x27;&lt;/script&gt;"
        );
    }

    #[test]
    fn test_post_page_escapes_title_and_keeps_body() {
        let post = parse_post_str(
            Path::new("x.md"),
            "---\ntitle: \"Tips & <Tricks>\"\npubDatetime: 2024-02-03T00:00:00Z\ntags: [rust]\n---\n",
        )
        .unwrap();

        let html = post_page(&site(), &post, "<p>body</p>", false);
        assert!(html.contains("<h1>Tips &amp; &lt;Tricks&gt;</h1>"));
        assert!(html.contains("<p>body</p>"));
        assert!(html.contains("February 3, 2024"));
        assert!(html.contains(r#"<a href="/tags/rust/">#rust</a>"#));
        assert!(html.contains("<title>Tips &amp; &lt;Tricks&gt; | Example</title>"));
    }

    #[test]
    fn test_post_page_slugifies_tag_links() {
        let post = parse_post_str(
            Path::new("x.md"),
            "---\ntitle: T\npubDatetime: 2024-02-03T00:00:00Z\ntags: [Web Dev, \"🚀\"]\n---\n",
        )
        .unwrap();

        let html = post_page(&site(), &post, "", false);
        assert!(html.contains(r#"<a href="/tags/web-dev/">#Web Dev</a>"#));
        assert!(html.contains("<span>#🚀</span>"));
        assert!(!html.contains("/tags/Web Dev/"));
    }

    #[test]
    fn test_tags_page_lists_counts() {
        let html = tags_page(&site(), &[("rust", "Rust", 2)], false);
        assert!(html.contains(r#"<li><a href="/tags/rust/">#Rust</a> (2)</li>"#));
        assert!(html.contains("<title>Tags | Example</title>"));
    }

    #[test]
    fn test_home_page_title_not_duplicated() {
        let html = home_page(&site(), &[], false);
        assert!(html.contains("<title>Example</title>"));
        assert!(html.contains(r#"<meta name="author" content="Jane">"#));
    }
}
