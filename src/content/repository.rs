//! Post repository - listing, lookup and taxonomy over any post store

use std::collections::BTreeSet;

use super::post::{newest_first, Post};
use super::store::PostStore;

/// Read-only view over a [`PostStore`].
///
/// Public operations never expose drafts: a draft is absent from every list
/// but [`Repository::list_drafts`], and a lookup by its slug behaves exactly
/// like a missing post.
#[derive(Debug, Clone)]
pub struct Repository<S> {
    store: S,
}

impl<S: PostStore> Repository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Identifiers of every candidate document, drafts included
    pub fn list_slugs(&self) -> Vec<String> {
        self.store.list_slugs()
    }

    /// Public lookup: published posts only
    pub fn get_by_slug(&self, slug: &str) -> Option<Post> {
        let post = self.store.load(slug)?;
        if post.is_published() {
            Some(post)
        } else {
            tracing::debug!("Refusing public lookup of draft {:?}", slug);
            None
        }
    }

    /// Lookup that also returns drafts, for authoring tools
    pub fn get_any(&self, slug: &str) -> Option<Post> {
        self.store.load(slug)
    }

    /// Every loadable post regardless of status, newest first
    fn load_every(&self) -> Vec<Post> {
        let mut posts: Vec<Post> = self
            .store
            .list_slugs()
            .iter()
            .filter_map(|slug| self.store.load(slug))
            .collect();
        posts.sort_by(newest_first);
        posts
    }

    /// Every published post, newest first
    pub fn list_all(&self) -> Vec<Post> {
        let mut posts = self.load_every();
        posts.retain(Post::is_published);
        posts
    }

    /// Published posts, newest first
    pub fn list_published(&self) -> Vec<Post> {
        self.list_all()
    }

    /// Drafts only, newest first, for authoring tools
    pub fn list_drafts(&self) -> Vec<Post> {
        let mut posts = self.load_every();
        posts.retain(|p| !p.is_published());
        posts
    }

    /// Published posts filed under `category` (exact, case-sensitive)
    pub fn list_by_category(&self, category: &str) -> Vec<Post> {
        let mut posts = self.list_published();
        posts.retain(|p| p.has_category(category));
        posts
    }

    /// Published posts tagged `tag` (exact, case-sensitive)
    pub fn list_by_tag(&self, tag: &str) -> Vec<Post> {
        let mut posts = self.list_published();
        posts.retain(|p| p.has_tag(tag));
        posts
    }

    /// Distinct categories of published posts, sorted
    pub fn list_categories(&self) -> Vec<String> {
        collect_terms(&self.list_published(), |p| &p.metadata.categories)
    }

    /// Distinct tags of published posts, sorted
    pub fn list_tags(&self) -> Vec<String> {
        collect_terms(&self.list_published(), |p| &p.metadata.tags)
    }

    /// Published posts whose title or description contains `term`, ignoring case
    pub fn search(&self, term: &str) -> Vec<Post> {
        let needle = term.trim().to_lowercase();
        let mut posts = self.list_published();
        if needle.is_empty() {
            return posts;
        }
        posts.retain(|p| {
            p.metadata.title.to_lowercase().contains(&needle)
                || p.metadata.description.to_lowercase().contains(&needle)
        });
        posts
    }
}

/// Distinct values across `posts`, sorted
pub fn collect_terms<'a, F>(posts: &'a [Post], terms: F) -> Vec<String>
where
    F: Fn(&'a Post) -> &'a Vec<String>,
{
    posts
        .iter()
        .flat_map(terms)
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
