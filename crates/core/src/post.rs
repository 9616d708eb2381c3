use crate::error::{Error, Result};
use crate::types::{Post, PostFrontmatter};
use std::fs;
use std::path::Path;

const FENCE: &str = "---";

/// Read and parse a markdown post from disk
pub fn parse_post<P: AsRef<Path>>(path: P) -> Result<Post> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    parse_post_str(path, &content)
}

/// Parse a post from its source text.
///
/// The file must open with a `---` fenced YAML block; everything after the
/// closing fence is the markdown body.
pub fn parse_post_str(path: &Path, source: &str) -> Result<Post> {
    let (yaml, body) = split_frontmatter(source).ok_or_else(|| Error::Frontmatter {
        path: path.to_path_buf(),
        message: "missing '---' delimited frontmatter".to_string(),
    })?;

    let frontmatter: PostFrontmatter =
        serde_yaml::from_str(yaml).map_err(|e| Error::Frontmatter {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    Ok(Post {
        path: path.to_path_buf(),
        frontmatter,
        body: body.to_string(),
    })
}

/// Split `---\n<yaml>\n---\n<body>` into its two halves
fn split_frontmatter(source: &str) -> Option<(&str, &str)> {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);
    let rest = source.strip_prefix(FENCE)?;
    let rest = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == FENCE {
            let yaml = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return Some((yaml, body));
        }
        offset += line.len();
    }
    None
}
