//! Post model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::PathBuf;

use super::error::{ContentError, Result};
use super::frontmatter::FrontMatter;
use super::markdown::MarkdownRenderer;
use super::reading::ReadingTime;

/// Characters kept when a description is derived from the body
pub const DESCRIPTION_CHARS: usize = 160;

/// Publication state of a post
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Draft,
    #[default]
    Published,
}

/// Search-engine overrides for a post page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seo {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
}

/// Validated post metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostMetadata {
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub featured_image: Option<String>,
    pub tags: Vec<String>,
    pub categories: Vec<String>,
    pub author: Option<String>,
    pub seo: Seo,
    /// Front-matter keys without a dedicated field
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub extra: HashMap<String, serde_yaml::Value>,
}

/// A blog post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    /// Slug (URL-friendly name)
    pub slug: String,

    pub metadata: PostMetadata,

    /// Raw markdown content
    pub content: String,

    pub reading_time: ReadingTime,

    pub status: PostStatus,

    /// Full source file path, for file-backed posts
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl Post {
    /// Build a post from a raw document (front-matter plus body)
    pub fn from_document(slug: &str, raw: &str, words_per_minute: u32) -> Result<Self> {
        let (fm, body) = FrontMatter::parse(raw)?;
        Self::from_front_matter(slug, fm, body, words_per_minute)
    }

    /// Build a post from already-parsed front-matter
    pub fn from_front_matter(
        slug: &str,
        fm: FrontMatter,
        body: &str,
        words_per_minute: u32,
    ) -> Result<Self> {
        let title = non_empty(fm.title.as_deref()).ok_or(ContentError::MissingField("title"))?;
        let raw_date = non_empty(fm.date.as_deref()).ok_or(ContentError::MissingField("date"))?;
        let date = fm
            .parse_date()
            .ok_or_else(|| ContentError::InvalidDate(raw_date.to_string()))?;

        let description = non_empty(fm.description.as_deref())
            .map(str::to_string)
            .unwrap_or_else(|| derive_description(body, title));

        let status = fm.status();
        let categories = fm.all_categories();

        let metadata = PostMetadata {
            title: title.to_string(),
            description,
            date,
            featured_image: non_empty(fm.featured_image.as_deref()).map(str::to_string),
            tags: clean_list(fm.tags),
            categories,
            author: non_empty(fm.author.as_deref()).map(str::to_string),
            seo: Seo {
                title: fm.seo_title,
                description: fm.seo_description,
                image: None,
            },
            extra: fm.extra,
        };

        Ok(Self {
            slug: slug.to_string(),
            reading_time: ReadingTime::with_speed(body, words_per_minute),
            content: body.to_string(),
            metadata,
            status,
            source: None,
        })
    }

    pub fn is_published(&self) -> bool {
        self.status == PostStatus::Published
    }

    pub fn has_category(&self, category: &str) -> bool {
        self.metadata.categories.iter().any(|c| c == category)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.metadata.tags.iter().any(|t| t == tag)
    }

    /// Title shown in the page `<title>`
    pub fn page_title(&self) -> &str {
        self.metadata
            .seo
            .title
            .as_deref()
            .unwrap_or(&self.metadata.title)
    }

    /// Description used for the meta description tag
    pub fn page_description(&self) -> &str {
        self.metadata
            .seo
            .description
            .as_deref()
            .unwrap_or(&self.metadata.description)
    }

    /// Get the previous (newer) post in a sorted list
    pub fn prev<'a>(&self, posts: &'a [Post]) -> Option<&'a Post> {
        let pos = posts.iter().position(|p| p.slug == self.slug)?;
        if pos > 0 {
            Some(&posts[pos - 1])
        } else {
            None
        }
    }

    /// Get the next (older) post in a sorted list
    pub fn next<'a>(&self, posts: &'a [Post]) -> Option<&'a Post> {
        let pos = posts.iter().position(|p| p.slug == self.slug)?;
        posts.get(pos + 1)
    }
}

/// Newest first; equal dates fall back to slug order
pub fn newest_first(a: &Post, b: &Post) -> Ordering {
    b.metadata
        .date
        .cmp(&a.metadata.date)
        .then_with(|| a.slug.cmp(&b.slug))
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Trim entries and drop empties and repeats, keeping first-seen order
pub(super) fn clean_list(values: Vec<String>) -> Vec<String> {
    let mut cleaned: Vec<String> = Vec::with_capacity(values.len());
    for value in values {
        let value = value.trim();
        if !value.is_empty() && !cleaned.iter().any(|v| v == value) {
            cleaned.push(value.to_string());
        }
    }
    cleaned
}

fn derive_description(body: &str, title: &str) -> String {
    let summary = MarkdownRenderer::summarize(body, DESCRIPTION_CHARS);
    if summary.is_empty() {
        title.to_string()
    } else {
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(slug: &str, date: &str) -> Post {
        let raw = format!("---\ntitle: {slug}\ndate: {date}\ndescription: d\n---\nbody");
        Post::from_document(slug, &raw, 200).unwrap()
    }

    #[test]
    fn test_from_document() {
        let raw = r#"---
title: "Hello"
description: "First post"
date: "2024-01-01"
featuredImage: "https://example.com/hero.jpg"
tags: ["rust", " rust ", "blog"]
category: "Programming"
author: Jane
---

Some words here.
"#;
        let post = Post::from_document("hello", raw, 200).unwrap();
        assert_eq!(post.slug, "hello");
        assert_eq!(post.metadata.title, "Hello");
        assert_eq!(post.metadata.description, "First post");
        assert_eq!(post.metadata.date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(post.metadata.tags, vec!["rust", "blog"]);
        assert_eq!(post.metadata.categories, vec!["Programming"]);
        assert_eq!(post.metadata.author.as_deref(), Some("Jane"));
        assert_eq!(post.content, "Some words here.\n");
        assert_eq!(post.reading_time.words, 3);
        assert_eq!(post.reading_time.to_string(), "1 min read");
        assert!(post.is_published());
    }

    #[test]
    fn test_missing_title_or_date_is_rejected() {
        let err = Post::from_document("x", "---\ndate: 2024-01-01\n---\n", 200).unwrap_err();
        assert!(matches!(err, ContentError::MissingField("title")));

        let err = Post::from_document("x", "---\ntitle: \"  \"\n---\n", 200).unwrap_err();
        assert!(matches!(err, ContentError::MissingField("title")));

        let err = Post::from_document("x", "---\ntitle: x\n---\n", 200).unwrap_err();
        assert!(matches!(err, ContentError::MissingField("date")));

        let err = Post::from_document("x", "no front matter at all", 200).unwrap_err();
        assert!(matches!(err, ContentError::MissingField("title")));
    }

    #[test]
    fn test_invalid_date_is_rejected() {
        let err = Post::from_document("x", "---\ntitle: x\ndate: soon\n---\n", 200).unwrap_err();
        assert!(matches!(err, ContentError::InvalidDate(d) if d == "soon"));
    }

    #[test]
    fn test_description_falls_back_to_body_then_title() {
        let raw = "---\ntitle: Hello\ndate: 2024-01-01\n---\n\n# Hi\n\nOpening paragraph.\n\nMore.";
        let post = Post::from_document("hello", raw, 200).unwrap();
        assert_eq!(post.metadata.description, "Opening paragraph.");

        let raw = "---\ntitle: Hello\ndate: 2024-01-01\n---\n";
        let post = Post::from_document("hello", raw, 200).unwrap();
        assert_eq!(post.metadata.description, "Hello");
    }

    #[test]
    fn test_draft_status() {
        let raw = "---\ntitle: Soon\ndate: 2025-02-01\nstatus: draft\n---\n";
        let post = Post::from_document("soon", raw, 200).unwrap();
        assert_eq!(post.status, PostStatus::Draft);
        assert!(!post.is_published());
    }

    #[test]
    fn test_seo_overrides() {
        let raw = "---\ntitle: T\ndescription: D\ndate: 2024-01-01\nseoTitle: T | Blog\n---\n";
        let post = Post::from_document("t", raw, 200).unwrap();
        assert_eq!(post.page_title(), "T | Blog");
        assert_eq!(post.page_description(), "D");
    }

    #[test]
    fn test_newest_first_and_neighbours() {
        let mut posts = vec![
            post("a", "2024-01-01"),
            post("c", "2024-06-01"),
            post("b", "2024-06-01"),
        ];
        posts.sort_by(newest_first);
        let slugs: Vec<_> = posts.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["b", "c", "a"]);

        assert!(posts[0].prev(&posts).is_none());
        assert_eq!(posts[0].next(&posts).map(|p| p.slug.as_str()), Some("c"));
        assert_eq!(posts[2].prev(&posts).map(|p| p.slug.as_str()), Some("c"));
        assert!(posts[2].next(&posts).is_none());
    }
}
