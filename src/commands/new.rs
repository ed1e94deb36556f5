//! Create a new post

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

use crate::content::NewPost;
use crate::Helios;

/// Write a new post into the posts directory.
///
/// Refuses to overwrite an existing file or to reuse the slug of a post the
/// site already has, drafts included. Returns the created path.
pub fn create_post(helios: &Helios, post: &NewPost) -> Result<PathBuf> {
    if post.title.trim().is_empty() {
        anyhow::bail!("A post needs a title");
    }
    if helios.catalog_path.is_some() {
        tracing::warn!(
            "Posts are read from a catalog; {:?} will not be published until it is added there",
            post.file_name()
        );
    }

    fs::create_dir_all(&helios.posts_dir)
        .with_context(|| format!("Failed to create {:?}", helios.posts_dir))?;

    let file_path = helios.posts_dir.join(post.file_name());

    // Check if file already exists
    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }
    let slug = post.slug();
    if let Some(existing) = helios.repository()?.get_any(&slug) {
        anyhow::bail!(
            "A post with slug {:?} already exists: {:?}",
            slug,
            existing.metadata.title
        );
    }

    fs::write(&file_path, post.to_markdown())
        .with_context(|| format!("Failed to write {:?}", file_path))?;
    tracing::info!("Created: {:?}", file_path);

    Ok(file_path)
}
