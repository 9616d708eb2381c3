pub mod config;
pub mod error;
pub mod post;
pub mod slug;
pub mod types;

pub use config::{parse_site_toml, parse_site_toml_str};
pub use error::{Error, Result};
pub use post::{parse_post, parse_post_str};
pub use slug::github_slug;
pub use types::*;
