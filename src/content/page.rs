//! Standalone informational pages (about, contact, ...)

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::error::{ContentError, Result};
use super::frontmatter::FrontMatter;
use super::slugs::is_url_safe;

/// A standalone page
#[derive(Debug, Clone, Serialize)]
pub struct Page {
    /// URL segment, taken from the file name
    pub name: String,

    /// Page title
    pub title: String,

    pub description: Option<String>,

    /// Raw markdown content
    pub content: String,

    /// Full source file path
    #[serde(skip)]
    pub source: PathBuf,
}

impl Page {
    /// Load a single page from a file
    pub fn load(path: &Path) -> Result<Self> {
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| is_url_safe(s))
            .ok_or_else(|| {
                ContentError::FrontMatter(format!("{:?} is not a usable page name", path))
            })?
            .to_string();

        let raw = fs::read_to_string(path).map_err(|source| ContentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let (fm, body) = FrontMatter::parse(&raw)?;

        let title = fm
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| title_case(&name));

        Ok(Self {
            name,
            title,
            description: fm.description,
            content: body.to_string(),
            source: path.to_path_buf(),
        })
    }
}

/// Load all pages in `dir`; a broken page is skipped
pub fn load_pages(dir: &Path) -> Vec<Page> {
    if !dir.exists() {
        return Vec::new();
    }

    let mut pages: Vec<Page> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && is_markdown_file(e.path()))
        .filter_map(|e| match Page::load(e.path()) {
            Ok(page) => Some(page),
            Err(err) => {
                tracing::warn!("Failed to load page {:?}: {}", e.path(), err);
                None
            }
        })
        .collect();

    pages.sort_by(|a, b| a.name.cmp(&b.name));
    pages
}

/// Check if a file is a markdown file
fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "md" || e == "mdx")
        .unwrap_or(false)
}

fn title_case(name: &str) -> String {
    name.split('-')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
