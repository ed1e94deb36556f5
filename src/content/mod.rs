//! Content module - handles posts, pages, and content processing

pub mod catalog;
mod error;
pub mod frontmatter;
mod markdown;
mod page;
mod post;
mod reading;
mod repository;
mod scaffold;
mod slugs;
pub mod store;

pub use catalog::{Catalog, CatalogEntry, CatalogSeo};
pub use error::{ContentError, Result};
pub use frontmatter::FrontMatter;
pub use markdown::{html_escape, is_safe_url, MarkdownRenderer, HIGHLIGHT_CLASS_STYLE, MORE_MARKER};
pub use page::{load_pages, Page};
pub use post::{newest_first, Post, PostMetadata, PostStatus, Seo};
pub use reading::{word_count, ReadingTime, WORDS_PER_MINUTE};
pub use repository::{collect_terms, Repository};
pub use scaffold::NewPost;
pub use slugs::{is_url_safe, slugify};
pub use store::{FileStore, PostStore};
