//! Built-in theme templates using the Tera template engine
//!
//! Templates are embedded in the binary. Autoescaping stays on for every
//! `.html` template; only markdown renderer output is emitted with `| safe`.

use anyhow::Result;
use serde::Serialize;
use tera::{Context, Tera};

use crate::config::{MenuItem, SiteConfig};
use crate::helpers::UrlFor;

/// Stylesheet written to `css/style.css`
pub const STYLESHEET: &str = include_str!("theme/style.css");

/// Template renderer with the embedded theme
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new(config: &SiteConfig) -> Result<Self> {
        let mut tera = Tera::default();

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("theme/layout.html")),
            ("macros.html", include_str!("theme/macros.html")),
            ("index.html", include_str!("theme/index.html")),
            ("post.html", include_str!("theme/post.html")),
            ("page.html", include_str!("theme/page.html")),
            ("taxonomy.html", include_str!("theme/taxonomy.html")),
            ("term.html", include_str!("theme/term.html")),
            ("not_found.html", include_str!("theme/not_found.html")),
        ])?;

        tera.register_function("url_for", UrlFor::new(config));

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub author: String,
    pub language: String,
    pub url: String,
    pub menu: Vec<MenuItem>,
    pub highlight: bool,
    pub year: String,
}

/// A post as listed on the index and taxonomy pages
#[derive(Debug, Clone, Serialize)]
pub struct PostData {
    pub slug: String,
    pub title: String,
    pub description: String,
    /// Date formatted with the configured `date_format`
    pub date: String,
    pub date_iso: String,
    pub path: String,
    pub reading_time: String,
    pub featured_image: Option<String>,
    pub author: Option<String>,
    pub categories: Vec<TermLink>,
    pub tags: Vec<TermLink>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TermLink {
    pub name: String,
    pub path: String,
}

/// One category or tag with its post count
#[derive(Debug, Clone, Serialize)]
pub struct TermData {
    pub name: String,
    pub path: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct NavPost {
    pub title: String,
    pub path: String,
}
