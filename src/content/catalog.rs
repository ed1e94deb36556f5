//! In-memory post catalog
//!
//! The catalog is built once, during startup, from a list of entries and is
//! never modified afterwards. Share it behind an `Arc` to give any number of
//! readers access.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use super::error::{ContentError, Result};
use super::frontmatter::parse_date_string;
use super::post::{clean_list, Post, PostMetadata, PostStatus, Seo};
use super::reading::{ReadingTime, WORDS_PER_MINUTE};
use super::slugs::is_url_safe;
use super::store::PostStore;

/// Search-engine fields of a catalog entry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CatalogSeo {
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub og_image: Option<String>,
}

/// One post as written in a catalog file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    #[serde(default)]
    pub id: Option<String>,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub content: String,
    #[serde(default)]
    pub featured_image: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    pub published_date: String,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub status: PostStatus,
    #[serde(default)]
    pub seo: CatalogSeo,
}

impl CatalogEntry {
    fn into_post(self, words_per_minute: u32) -> Result<Post> {
        if !is_url_safe(&self.slug) {
            return Err(ContentError::Catalog(format!(
                "slug `{}` is not lowercase and hyphen-separated",
                self.slug
            )));
        }
        if self.title.trim().is_empty() {
            return Err(ContentError::MissingField("title"));
        }
        if self.excerpt.trim().is_empty() {
            return Err(ContentError::MissingField("excerpt"));
        }
        let date = parse_date_string(&self.published_date)
            .ok_or_else(|| ContentError::InvalidDate(self.published_date.clone()))?;

        let mut extra = HashMap::new();
        if let Some(id) = self.id {
            extra.insert("id".to_string(), serde_yaml::Value::String(id));
        }

        Ok(Post {
            reading_time: ReadingTime::with_speed(&self.content, words_per_minute),
            slug: self.slug,
            metadata: PostMetadata {
                title: self.title.trim().to_string(),
                description: self.excerpt.trim().to_string(),
                date,
                featured_image: self.featured_image.filter(|s| !s.trim().is_empty()),
                tags: clean_list(self.tags),
                categories: clean_list(self.categories),
                author: self.author,
                seo: Seo {
                    title: self.seo.meta_title,
                    description: self.seo.meta_description,
                    image: self.seo.og_image,
                },
                extra,
            },
            content: self.content,
            status: self.status,
            source: None,
        })
    }
}

/// Immutable set of posts held in memory
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    posts: Vec<Post>,
}

impl Catalog {
    /// Build a catalog at the default reading speed
    pub fn new(entries: Vec<CatalogEntry>) -> Result<Self> {
        Self::with_words_per_minute(entries, WORDS_PER_MINUTE)
    }

    /// Build a catalog, computing every reading time once.
    ///
    /// Invalid entries are skipped; a slug used twice rejects the catalog.
    pub fn with_words_per_minute(entries: Vec<CatalogEntry>, words_per_minute: u32) -> Result<Self> {
        let mut seen = HashSet::new();
        for entry in &entries {
            if !seen.insert(entry.slug.as_str()) {
                return Err(ContentError::DuplicateSlug(entry.slug.clone()));
            }
        }

        let mut posts = Vec::with_capacity(entries.len());
        for entry in entries {
            let slug = entry.slug.clone();
            match entry.into_post(words_per_minute) {
                Ok(post) => posts.push(post),
                Err(e) => tracing::warn!("Skipping catalog entry {:?}: {}", slug, e),
            }
        }

        tracing::debug!("Catalog holds {} posts", posts.len());
        Ok(Self { posts })
    }

    /// Load a YAML list of entries
    pub fn from_file<P: AsRef<Path>>(path: P, words_per_minute: u32) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ContentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content, words_per_minute)
    }

    /// Parse a YAML list of entries.
    ///
    /// Each entry is decoded on its own, so one malformed entry is skipped
    /// without losing the rest.
    pub fn from_yaml(content: &str, words_per_minute: u32) -> Result<Self> {
        let values: Vec<serde_yaml::Value> =
            serde_yaml::from_str(content).map_err(|e| ContentError::Catalog(e.to_string()))?;

        let entries: Vec<CatalogEntry> = values
            .into_iter()
            .enumerate()
            .filter_map(|(i, value)| match serde_yaml::from_value(value) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::warn!("Skipping catalog entry #{}: {}", i + 1, e);
                    None
                }
            })
            .collect();
        Self::with_words_per_minute(entries, words_per_minute)
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }
}

impl PostStore for Catalog {
    fn list_slugs(&self) -> Vec<String> {
        self.posts.iter().map(|p| p.slug.clone()).collect()
    }

    fn load(&self, slug: &str) -> Option<Post> {
        self.posts.iter().find(|p| p.slug == slug).cloned()
    }
}
