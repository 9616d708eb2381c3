use folio_core::SiteInfo;

/// Build sitemap.xml for site-relative routes
pub fn generate_sitemap(site: &SiteInfo, routes: &[String]) -> String {
    let urls: String = routes
        .iter()
        .map(|route| {
            format!(
                "  <url><loc>{}</loc></url>\n",
                xml_escape(&site.absolute_url(route))
            )
        })
        .collect();

    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n{}</urlset>\n",
        urls
    )
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
