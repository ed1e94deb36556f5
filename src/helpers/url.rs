//! URL helper functions

use std::collections::HashMap;

use crate::config::SiteConfig;
use crate::content::html_escape;

/// Generate a URL with the root path
///
/// # Examples
/// ```ignore
/// url_for(&config, "/css/style.css") // -> "/blog/css/style.css"
/// ```
pub fn url_for(config: &SiteConfig, path: &str) -> String {
    join_root(&config.root, path)
}

/// Site-relative path of a post
pub fn post_path(slug: &str) -> String {
    format!("/posts/{}/", slug)
}

/// URL segment for a category or tag name.
///
/// Names that reduce to nothing still get a usable segment.
pub fn term_slug(name: &str) -> String {
    let slug = slug::slugify(name);
    if slug.is_empty() {
        crate::content::slugify(name)
    } else {
        slug
    }
}

/// Tera function form of [`url_for`]: `{{ url_for(path="/tags/") }}`.
///
/// The result is attribute-escaped here and marked safe, so slashes survive
/// template autoescaping.
pub struct UrlFor {
    config: SiteConfig,
}

impl UrlFor {
    pub fn new(config: &SiteConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }
}

impl tera::Function for UrlFor {
    fn call(&self, args: &HashMap<String, tera::Value>) -> tera::Result<tera::Value> {
        let path = args
            .get("path")
            .and_then(|v| v.as_str())
            .ok_or_else(|| tera::Error::msg("url_for requires a `path` string argument"))?;
        Ok(tera::Value::String(html_escape(&url_for(&self.config, path))))
    }

    fn is_safe(&self) -> bool {
        true
    }
}

fn join_root(root: &str, path: &str) -> String {
    let root = root.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    if path.is_empty() {
        format!("{}/", root)
    } else {
        format!("{}/{}", root, path)
    }
}
