use anyhow::Result;
use std::path::PathBuf;

use super::site::{build_into, load_site};

/// Build static site for deployment
pub async fn run(path: PathBuf, output: Option<PathBuf>) -> Result<()> {
    println!("🔨 Building static site...");

    let site = load_site(&path)?;
    let output = output.unwrap_or_else(|| path.join(&site.config.build.output_dir));

    println!("   Source: {}", path.display());
    println!("   Output: {}", output.display());
    println!();

    let drafts = site.posts.iter().filter(|p| p.is_draft()).count();
    println!("✓ Loaded: {}", site.config.site.title);
    println!("  Posts: {} ({} drafts)", site.posts.len(), drafts);
    println!("  Transforms: {}", site.config.markdown.rehype_plugins.join(", "));
    println!();

    println!("📄 Generating pages...");
    let summary = build_into(&site, &output, false)?;
    println!("   ✓ Generated {} pages", summary.pages);
    println!("   ✓ Wrote {} assets", summary.assets);
    println!("   ✓ Copied {} public files", summary.public_files);

    println!();
    println!("✅ Build complete!");
    println!("   Output: {}", output.display());
    println!();
    println!("To test locally:");
    println!("   cd {} && python3 -m http.server 8000", output.display());
    println!();

    Ok(())
}
