//! Site configuration (_config.yml)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::content::WORDS_PER_MINUTE;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub author: String,
    pub language: String,

    // URL
    pub url: String,
    pub root: String,

    // Directory
    pub posts_dir: String,
    pub pages_dir: String,
    pub public_dir: String,
    /// YAML post catalog; when set it replaces `posts_dir` as the post source
    pub catalog: Option<String>,

    // Writing
    pub words_per_minute: u32,
    #[serde(default)]
    pub highlight: HighlightConfig,

    // Date format (strftime)
    pub date_format: String,

    // Navigation
    #[serde(default = "default_menu")]
    pub menu: Vec<MenuItem>,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Helios Blogs".to_string(),
            subtitle: "A minimalist blog platform for focused writing".to_string(),
            description: String::new(),
            author: "John Doe".to_string(),
            language: "en".to_string(),

            url: "http://example.com".to_string(),
            root: "/".to_string(),

            posts_dir: "content/posts".to_string(),
            pages_dir: "content/pages".to_string(),
            public_dir: "public".to_string(),
            catalog: None,

            words_per_minute: WORDS_PER_MINUTE,
            highlight: HighlightConfig::default(),

            date_format: "%B %-d, %Y".to_string(),

            menu: default_menu(),
            extra: HashMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
        let config: SiteConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse {:?}", path))?;
        Ok(config)
    }
}

/// A navigation entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub name: String,
    pub path: String,
}

impl MenuItem {
    fn new(name: &str, path: &str) -> Self {
        Self {
            name: name.to_string(),
            path: path.to_string(),
        }
    }
}

fn default_menu() -> Vec<MenuItem> {
    vec![
        MenuItem::new("Home", "/"),
        MenuItem::new("About", "/about/"),
        MenuItem::new("Contact", "/contact/"),
        MenuItem::new("Categories", "/categories/"),
        MenuItem::new("Tags", "/tags/"),
    ]
}

/// Code highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub enable: bool,
    /// syntect theme used for the generated stylesheet
    pub theme: String,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            enable: true,
            theme: "InspiredGitHub".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.title, "Helios Blogs");
        assert_eq!(config.posts_dir, "content/posts");
        assert_eq!(config.words_per_minute, 200);
        assert!(config.catalog.is_none());
        assert_eq!(config.menu.len(), 5);
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
title: My Blog
author: Test User
words_per_minute: 250
catalog: data/posts.yml
highlight:
  enable: false
menu:
  - name: Home
    path: /
custom_key: 1
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.title, "My Blog");
        assert_eq!(config.author, "Test User");
        assert_eq!(config.words_per_minute, 250);
        assert_eq!(config.catalog.as_deref(), Some("data/posts.yml"));
        assert!(!config.highlight.enable);
        assert_eq!(config.highlight.theme, "InspiredGitHub");
        assert_eq!(config.menu, vec![MenuItem::new("Home", "/")]);
        assert_eq!(config.posts_dir, "content/posts");
        assert!(config.extra.contains_key("custom_key"));
    }

    #[test]
    fn test_load_reports_parse_errors() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("_config.yml");
        fs::write(&path, "title: [unclosed").unwrap();
        let err = SiteConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }
}
