use anyhow::{Context, Result};
use folio_core::og_image_paths;
use std::path::PathBuf;

use super::site::load_site;

/// Print the OG image routes for published posts
pub async fn run(path: PathBuf, json: bool) -> Result<()> {
    let site = load_site(&path)?;
    let paths = og_image_paths(&site.posts);

    if json {
        let out = serde_json::to_string_pretty(&paths).context("Failed to serialize routes")?;
        println!("{}", out);
        return Ok(());
    }

    if paths.is_empty() {
        println!("No OG image routes (every post is a draft or sets ogImage)");
        return Ok(());
    }

    for path in &paths {
        println!("/{}  ({})", path.route, path.title);
    }
    println!("\n{} route(s)", paths.len());
    Ok(())
}
