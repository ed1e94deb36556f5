//! helios: a minimalist blog engine
//!
//! Posts come from a directory of Markdown files or from an in-memory
//! catalog. Both sit behind one [`content::Repository`], are rendered to
//! sanitized HTML and written out as a static site.

pub mod commands;
pub mod config;
pub mod content;
pub mod generator;
pub mod helpers;
pub mod server;
pub mod templates;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use content::{Catalog, FileStore, PostStore, Repository};

/// Repository over whichever post source the site is configured with
pub type SiteRepository = Repository<Arc<dyn PostStore>>;

/// The main Helios application
#[derive(Clone)]
pub struct Helios {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Directory holding `<slug>.md` / `<slug>.mdx` posts
    pub posts_dir: PathBuf,
    /// Directory holding standalone pages
    pub pages_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
    /// Catalog file, when posts come from a catalog
    pub catalog_path: Option<PathBuf>,
}

impl Helios {
    /// Create a new Helios instance from a directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            tracing::debug!("No _config.yml in {:?}, using defaults", base_dir);
            config::SiteConfig::default()
        };

        Ok(Self::with_config(base_dir, config))
    }

    /// Create an instance from an already-loaded configuration
    pub fn with_config(base_dir: PathBuf, config: config::SiteConfig) -> Self {
        let posts_dir = base_dir.join(&config.posts_dir);
        let pages_dir = base_dir.join(&config.pages_dir);
        let public_dir = base_dir.join(&config.public_dir);
        let catalog_path = config.catalog.as_ref().map(|c| base_dir.join(c));

        Self {
            config,
            base_dir,
            posts_dir,
            pages_dir,
            public_dir,
            catalog_path,
        }
    }

    /// Build the post repository.
    ///
    /// A catalog is loaded once here and stays frozen for the lifetime of the
    /// returned repository; a file store reads the posts directory on demand.
    pub fn repository(&self) -> Result<SiteRepository> {
        let wpm = self.config.words_per_minute;
        let store: Arc<dyn PostStore> = match &self.catalog_path {
            Some(path) => {
                let catalog = Catalog::from_file(path, wpm)
                    .with_context(|| format!("Failed to load catalog {:?}", path))?;
                tracing::info!("Loaded {} posts from catalog {:?}", catalog.len(), path);
                Arc::new(catalog)
            }
            None => Arc::new(FileStore::new(&self.posts_dir).with_words_per_minute(wpm)),
        };
        Ok(Repository::new(store))
    }

    /// Initialize a new site
    pub fn init(&self) -> Result<()> {
        commands::init::run(self)
    }

    /// Generate the static site
    pub fn generate(&self) -> Result<generator::GenerateStats> {
        commands::generate::run(self)
    }

    /// Clean the public directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }
}
