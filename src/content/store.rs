//! Storage backends for posts

use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::error::{ContentError, Result};
use super::post::Post;
use super::reading::WORDS_PER_MINUTE;

/// Extensions recognized as posts, in lookup preference order
pub const POST_EXTENSIONS: [&str; 2] = ["mdx", "md"];

/// Where posts come from.
///
/// Implementations are best effort: a document that cannot be read or parsed
/// is simply absent.
pub trait PostStore: Send + Sync {
    /// Identifiers of every candidate document
    fn list_slugs(&self) -> Vec<String>;

    /// Load one post regardless of its status
    fn load(&self, slug: &str) -> Option<Post>;
}

impl<S: PostStore + ?Sized> PostStore for Box<S> {
    fn list_slugs(&self) -> Vec<String> {
        (**self).list_slugs()
    }

    fn load(&self, slug: &str) -> Option<Post> {
        (**self).load(slug)
    }
}

impl<S: PostStore + ?Sized> PostStore for std::sync::Arc<S> {
    fn list_slugs(&self) -> Vec<String> {
        (**self).list_slugs()
    }

    fn load(&self, slug: &str) -> Option<Post> {
        (**self).load(slug)
    }
}

/// Posts stored as `<slug>.md` / `<slug>.mdx` files in one directory.
///
/// Files are read anew on every call.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
    words_per_minute: u32,
}

impl FileStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            words_per_minute: WORDS_PER_MINUTE,
        }
    }

    /// Use a different reading speed for estimates
    pub fn with_words_per_minute(mut self, words_per_minute: u32) -> Self {
        self.words_per_minute = words_per_minute;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Resolve a slug to the file that backs it, `.mdx` first
    pub fn resolve(&self, slug: &str) -> Option<PathBuf> {
        let slug = normalize_slug(slug)?;
        POST_EXTENSIONS
            .iter()
            .map(|ext| self.dir.join(format!("{}.{}", slug, ext)))
            .find(|path| path.is_file())
    }

    /// Load a post, reporting why it is unavailable
    pub fn try_load(&self, slug: &str) -> Result<Post> {
        let path = self
            .resolve(slug)
            .ok_or_else(|| ContentError::NotFound(slug.to_string()))?;
        let real_slug = normalize_slug(slug).unwrap_or(slug);

        if let Some(shadowed) = self.shadowed(real_slug, &path) {
            tracing::warn!("{:?} is shadowed by {:?}", shadowed, path);
        }

        let raw = fs::read_to_string(&path).map_err(|source| ContentError::Io {
            path: path.clone(),
            source,
        })?;
        let mut post = Post::from_document(real_slug, &raw, self.words_per_minute)?;
        post.source = Some(path);
        Ok(post)
    }

    fn shadowed(&self, slug: &str, chosen: &Path) -> Option<PathBuf> {
        POST_EXTENSIONS
            .iter()
            .map(|ext| self.dir.join(format!("{}.{}", slug, ext)))
            .find(|path| path != chosen && path.is_file())
    }

    fn ensure_dir(&self) {
        if let Err(e) = fs::create_dir_all(&self.dir) {
            tracing::warn!("Failed to create posts directory {:?}: {}", self.dir, e);
        } else {
            tracing::debug!("Created posts directory {:?}", self.dir);
        }
    }
}

impl PostStore for FileStore {
    fn list_slugs(&self) -> Vec<String> {
        if !self.dir.exists() {
            self.ensure_dir();
            return Vec::new();
        }

        let mut slugs: Vec<String> = WalkDir::new(&self.dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| match e {
                Ok(entry) => Some(entry),
                Err(err) => {
                    tracing::warn!("Skipping unreadable entry in {:?}: {}", self.dir, err);
                    None
                }
            })
            .filter(|e| e.file_type().is_file())
            .filter_map(|e| post_stem(e.path()))
            .collect();

        slugs.sort();
        slugs.dedup();
        slugs
    }

    fn load(&self, slug: &str) -> Option<Post> {
        match self.try_load(slug) {
            Ok(post) => Some(post),
            Err(ContentError::NotFound(_)) => {
                tracing::debug!("No post for slug {:?}", slug);
                None
            }
            Err(e) => {
                tracing::warn!("Failed to load post {:?}: {}", slug, e);
                None
            }
        }
    }
}

/// Strip a known extension; reject anything that could escape the directory
fn normalize_slug(slug: &str) -> Option<&str> {
    let slug = slug.trim();
    let slug = strip_extension(slug).unwrap_or(slug);
    is_valid_stem(slug).then_some(slug)
}

fn strip_extension(name: &str) -> Option<&str> {
    POST_EXTENSIONS
        .iter()
        .find_map(|ext| name.strip_suffix(&format!(".{}", ext)))
}

fn is_valid_stem(stem: &str) -> bool {
    !stem.is_empty()
        && !stem.starts_with('.')
        && !stem.contains(['/', '\\', '\0'])
        && !stem.contains("..")
}

/// Slug of a post file, if it carries a recognized extension.
///
/// Only names that [`normalize_slug`] maps back to the same stem are
/// addressable, so `hello.md.md` or ` hello.md` have no slug.
fn post_stem(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    let stem = strip_extension(name)?;
    if normalize_slug(stem) != Some(stem) {
        tracing::debug!("Ignoring {:?}: its name is not a usable slug", path);
        return None;
    }
    Some(stem.to_string())
}
