//! New-post documents ready to drop into the posts directory

use chrono::Local;
use serde::{Deserialize, Serialize};

use super::frontmatter::DELIMITER;
use super::slugs::slugify;

/// Fields of a post being written
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewPost {
    pub title: String,
    pub description: String,
    /// `YYYY-MM-DD`; empty means today
    pub date: String,
    pub featured_image: String,
    /// Comma-separated
    pub tags: String,
    pub category: String,
    /// Markdown body
    pub content: String,
}

impl NewPost {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            date: today(),
            ..Default::default()
        }
    }

    /// Tags split on commas, trimmed, empties dropped
    pub fn tag_list(&self) -> Vec<String> {
        self.tags
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Slug derived from the title
    pub fn slug(&self) -> String {
        slugify(&self.title)
    }

    /// File name derived from the title
    pub fn file_name(&self) -> String {
        format!("{}.md", self.slug())
    }

    /// The complete document: front-matter block, blank line, content
    pub fn to_markdown(&self) -> String {
        let date = if self.date.trim().is_empty() {
            today()
        } else {
            self.date.trim().to_string()
        };

        let mut out = String::new();
        out.push_str(DELIMITER);
        out.push('\n');
        out.push_str(&format!("title: {}\n", quote(&self.title)));
        out.push_str(&format!("description: {}\n", quote(&self.description)));
        out.push_str(&format!("date: {}\n", quote(&date)));
        if !self.featured_image.trim().is_empty() {
            out.push_str(&format!(
                "featuredImage: {}\n",
                quote(self.featured_image.trim())
            ));
        }
        let tags = self.tag_list();
        if !tags.is_empty() {
            let quoted: Vec<String> = tags.iter().map(|t| quote(t)).collect();
            out.push_str(&format!("tags: [{}]\n", quoted.join(", ")));
        }
        if !self.category.trim().is_empty() {
            out.push_str(&format!("category: {}\n", quote(self.category.trim())));
        }
        out.push_str(DELIMITER);
        out.push_str("\n\n");
        out.push_str(&self.content);
        out
    }
}

fn today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

/// Double-quoted YAML scalar.
///
/// Carriage returns are dropped; other control characters and Unicode line
/// breaks are written as escapes so the scalar stays on one line.
fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => {}
            c if c.is_control() => out.push_str(&format!("\\x{:02X}", c as u32)),
            '\u{2028}' | '\u{2029}' => out.push_str(&format!("\\u{:04X}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::frontmatter::FrontMatter;
    use crate::content::post::Post;

    fn sample() -> NewPost {
        NewPost {
            title: "My First Post!!".to_string(),
            description: "A short intro".to_string(),
            date: "2024-03-05".to_string(),
            featured_image: String::new(),
            tags: " rust, , blog ".to_string(),
            category: "Programming".to_string(),
            content: "# Hello\n\nWorld.".to_string(),
        }
    }

    #[test]
    fn test_to_markdown_layout() {
        let expected = "---\n\
title: \"My First Post!!\"\n\
description: \"A short intro\"\n\
date: \"2024-03-05\"\n\
tags: [\"rust\", \"blog\"]\n\
category: \"Programming\"\n\
---\n\
\n\
# Hello\n\nWorld.";
        assert_eq!(sample().to_markdown(), expected);
    }

    #[test]
    fn test_optional_fields_omitted() {
        let mut post = sample();
        post.tags.clear();
        post.category.clear();
        let doc = post.to_markdown();
        assert!(!doc.contains("tags:"));
        assert!(!doc.contains("category:"));
        assert!(!doc.contains("featuredImage:"));

        post.featured_image = "https://example.com/a.jpg".to_string();
        assert!(post
            .to_markdown()
            .contains("featuredImage: \"https://example.com/a.jpg\"\n"));
    }

    #[test]
    fn test_file_name() {
        assert_eq!(sample().file_name(), "my-first-post.md");
        assert_eq!(NewPost::new("").file_name(), "untitled.md");
    }

    #[test]
    fn test_generated_document_loads_as_post() {
        let mut post = sample();
        post.title = "Quotes \"inside\" and back\\slash".to_string();
        let doc = post.to_markdown();

        let (fm, body) = FrontMatter::parse(&doc).unwrap();
        assert_eq!(fm.title.as_deref(), Some("Quotes \"inside\" and back\\slash"));
        assert_eq!(fm.tags, vec!["rust", "blog"]);
        assert_eq!(body, "# Hello\n\nWorld.");

        let loaded = Post::from_document("quotes", &doc, 200).unwrap();
        assert_eq!(loaded.metadata.categories, vec!["Programming"]);
    }

    #[test]
    fn test_control_characters_are_escaped() {
        assert_eq!(quote("a\u{1}b"), "\"a\\x01b\"");
        assert_eq!(quote("tab\there\r\n"), "\"tab\\there\\n\"");
        assert_eq!(quote("del\u{7f}"), "\"del\\x7F\"");

        let mut post = sample();
        post.title = "Bell\u{7} start\u{1b}[0m\u{85}\u{2028}end".to_string();
        post.description = "unit\u{1f}sep".to_string();
        post.tags = "a\u{2}b, plain".to_string();
        let doc = post.to_markdown();

        let (fm, _) = FrontMatter::parse(&doc).unwrap();
        assert_eq!(
            fm.title.as_deref(),
            Some("Bell\u{7} start\u{1b}[0m\u{85}\u{2028}end")
        );
        assert_eq!(fm.description.as_deref(), Some("unit\u{1f}sep"));
        assert_eq!(fm.tags, vec!["a\u{2}b", "plain"]);
        assert!(Post::from_document("control", &doc, 200).is_ok());
    }

    #[test]
    fn test_new_defaults_to_today() {
        let post = NewPost::new("Today");
        assert_eq!(post.date, Local::now().format("%Y-%m-%d").to_string());
    }
}
