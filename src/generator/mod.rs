//! Generator module - generates static HTML files using built-in Tera templates

use anyhow::{Context as _, Result};
use chrono::Datelike;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use syntect::highlighting::ThemeSet;
use syntect::html::css_for_theme_with_class_style;
use tera::Context;

use crate::content::{
    is_safe_url, MarkdownRenderer, Page, Post, PostStore, Repository, HIGHLIGHT_CLASS_STYLE,
};
use crate::helpers::{date_iso, format_date, post_path, term_slug};
use crate::templates::{
    NavPost, PostData, SiteData, TemplateRenderer, TermData, TermLink, STYLESHEET,
};
use crate::Helios;

/// Top-level output segments that pages may not claim
const RESERVED_SEGMENTS: [&str; 4] = ["posts", "categories", "tags", "css"];

/// What a generation run produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateStats {
    pub posts: usize,
    pub pages: usize,
    pub categories: usize,
    pub tags: usize,
}

/// Which taxonomy a term belongs to
#[derive(Debug, Clone, Copy)]
enum Taxonomy {
    Categories,
    Tags,
}

impl Taxonomy {
    fn dir(self) -> &'static str {
        match self {
            Taxonomy::Categories => "categories",
            Taxonomy::Tags => "tags",
        }
    }

    fn title(self) -> &'static str {
        match self {
            Taxonomy::Categories => "Categories",
            Taxonomy::Tags => "Tags",
        }
    }

    fn singular(self) -> &'static str {
        match self {
            Taxonomy::Categories => "Category",
            Taxonomy::Tags => "Tag",
        }
    }

    fn terms(self, post: &Post) -> &[String] {
        match self {
            Taxonomy::Categories => &post.metadata.categories,
            Taxonomy::Tags => &post.metadata.tags,
        }
    }

    fn names<S: PostStore>(self, repository: &Repository<S>) -> Vec<String> {
        match self {
            Taxonomy::Categories => repository.list_categories(),
            Taxonomy::Tags => repository.list_tags(),
        }
    }

    fn posts<S: PostStore>(self, repository: &Repository<S>, name: &str) -> Vec<Post> {
        match self {
            Taxonomy::Categories => repository.list_by_category(name),
            Taxonomy::Tags => repository.list_by_tag(name),
        }
    }
}

/// Output path of every category and tag name in use
#[derive(Debug, Default)]
struct TermIndex {
    categories: BTreeMap<String, String>,
    tags: BTreeMap<String, String>,
}

impl TermIndex {
    fn build<S: PostStore>(repository: &Repository<S>) -> Self {
        Self {
            categories: assign_paths(Taxonomy::Categories, Taxonomy::Categories.names(repository)),
            tags: assign_paths(Taxonomy::Tags, Taxonomy::Tags.names(repository)),
        }
    }

    fn paths(&self, taxonomy: Taxonomy) -> &BTreeMap<String, String> {
        match taxonomy {
            Taxonomy::Categories => &self.categories,
            Taxonomy::Tags => &self.tags,
        }
    }

    fn links(&self, taxonomy: Taxonomy, post: &Post) -> Vec<TermLink> {
        let paths = self.paths(taxonomy);
        taxonomy
            .terms(post)
            .iter()
            .filter_map(|name| {
                paths.get(name).map(|path| TermLink {
                    name: name.clone(),
                    path: path.clone(),
                })
            })
            .collect()
    }
}

/// Static site generator using Tera templates
pub struct Generator {
    helios: Helios,
    renderer: TemplateRenderer,
    markdown: MarkdownRenderer,
}

impl Generator {
    /// Create a new generator
    pub fn new(helios: &Helios) -> Result<Self> {
        let renderer = TemplateRenderer::new(&helios.config)?;
        let markdown = MarkdownRenderer::with_highlight(helios.config.highlight.enable);

        Ok(Self {
            helios: helios.clone(),
            renderer,
            markdown,
        })
    }

    /// Generate the entire site from the repository's published posts.
    ///
    /// The public directory is recreated from scratch.
    pub fn generate<S: PostStore>(
        &self,
        repository: &Repository<S>,
        pages: &[Page],
    ) -> Result<GenerateStats> {
        let public_dir = &self.helios.public_dir;
        if public_dir.exists() {
            fs::remove_dir_all(public_dir)
                .with_context(|| format!("Failed to clear {:?}", public_dir))?;
        }
        fs::create_dir_all(public_dir)?;

        let posts = repository.list_published();
        let terms = TermIndex::build(repository);
        let site_data = self.build_site_data();

        self.write_assets()?;
        self.generate_index(&posts, &terms, &site_data)?;
        self.generate_post_pages(&posts, &terms, &site_data)?;
        let categories =
            self.generate_taxonomy(Taxonomy::Categories, repository, &terms, &site_data)?;
        let tags = self.generate_taxonomy(Taxonomy::Tags, repository, &terms, &site_data)?;
        let pages = self.generate_page_pages(pages, &site_data)?;
        self.generate_not_found(&site_data)?;

        Ok(GenerateStats {
            posts: posts.len(),
            pages,
            categories,
            tags,
        })
    }

    /// Build site data for templates
    fn build_site_data(&self) -> SiteData {
        let config = &self.helios.config;
        SiteData {
            title: config.title.clone(),
            subtitle: config.subtitle.clone(),
            description: config.description.clone(),
            author: config.author.clone(),
            language: config.language.clone(),
            url: config.url.clone(),
            menu: config.menu.clone(),
            highlight: config.highlight.enable,
            year: chrono::Local::now().year().to_string(),
        }
    }

    /// Create a base context with common variables
    fn create_base_context(
        &self,
        site_data: &SiteData,
        title: &str,
        description: &str,
        current_path: &str,
    ) -> Context {
        let description = if description.is_empty() {
            site_data.subtitle.as_str()
        } else {
            description
        };

        let mut context = Context::new();
        context.insert("site", site_data);
        context.insert("page_title", title);
        context.insert("page_description", description);
        context.insert("current_path", current_path);
        context
    }

    fn post_data(&self, post: &Post, terms: &TermIndex) -> PostData {
        let meta = &post.metadata;
        PostData {
            slug: post.slug.clone(),
            title: meta.title.clone(),
            description: meta.description.clone(),
            date: format_date(&meta.date, &self.helios.config.date_format),
            date_iso: date_iso(&meta.date),
            path: post_path(&post.slug),
            reading_time: post.reading_time.to_string(),
            featured_image: meta.featured_image.clone().filter(|url| is_safe_url(url)),
            author: meta.author.clone(),
            categories: terms.links(Taxonomy::Categories, post),
            tags: terms.links(Taxonomy::Tags, post),
        }
    }

    /// Write the stylesheet and, when enabled, the highlight classes
    fn write_assets(&self) -> Result<()> {
        let css_dir = self.helios.public_dir.join("css");
        fs::create_dir_all(&css_dir)?;
        fs::write(css_dir.join("style.css"), STYLESHEET)?;

        let highlight = &self.helios.config.highlight;
        if highlight.enable {
            let themes = ThemeSet::load_defaults();
            match themes.themes.get(&highlight.theme) {
                Some(theme) => {
                    let css = css_for_theme_with_class_style(theme, HIGHLIGHT_CLASS_STYLE)
                        .map_err(|e| anyhow::anyhow!("Failed to build highlight css: {}", e))?;
                    fs::write(css_dir.join("highlight.css"), css)?;
                }
                None => tracing::warn!("Unknown highlight theme {:?}", highlight.theme),
            }
        }

        Ok(())
    }

    /// Generate the post list
    fn generate_index(
        &self,
        posts: &[Post],
        terms: &TermIndex,
        site_data: &SiteData,
    ) -> Result<()> {
        let post_data: Vec<PostData> = posts.iter().map(|p| self.post_data(p, terms)).collect();

        let config = &self.helios.config;
        let mut context =
            self.create_base_context(site_data, &config.title, &config.description, "/");
        context.insert("posts", &post_data);

        let html = self.renderer.render("index.html", &context)?;
        self.write_page("", &html)?;
        tracing::debug!("Generated index with {} posts", post_data.len());
        Ok(())
    }

    /// Generate individual post pages
    fn generate_post_pages(
        &self,
        posts: &[Post],
        terms: &TermIndex,
        site_data: &SiteData,
    ) -> Result<()> {
        for post in posts {
            let data = self.post_data(post, terms);
            let content = self.markdown.render(&post.content);

            let mut context = self.create_base_context(
                site_data,
                post.page_title(),
                post.page_description(),
                &data.path,
            );
            let image = post
                .metadata
                .seo
                .image
                .clone()
                .or_else(|| data.featured_image.clone())
                .filter(|url| is_safe_url(url));
            if let Some(image) = image {
                context.insert("page_image", &image);
            }
            context.insert("post", &data);
            context.insert("content", &content);

            // Newer post first in the list, so `prev` links to it
            if let Some(prev) = post.prev(posts) {
                context.insert("prev_post", &nav_post(prev));
            }
            if let Some(next) = post.next(posts) {
                context.insert("next_post", &nav_post(next));
            }

            let html = self.renderer.render("post.html", &context)?;
            self.write_page(&data.path, &html)?;
            tracing::debug!("Generated post: {}", data.path);
        }

        tracing::info!("Generated {} posts", posts.len());
        Ok(())
    }

    /// Generate the listing of all terms plus one page per term.
    ///
    /// Each term page holds exactly the posts the repository files under
    /// that name.
    fn generate_taxonomy<S: PostStore>(
        &self,
        taxonomy: Taxonomy,
        repository: &Repository<S>,
        terms: &TermIndex,
        site_data: &SiteData,
    ) -> Result<usize> {
        let paths = terms.paths(taxonomy);
        let mut listing = Vec::with_capacity(paths.len());

        for (name, path) in paths {
            let term_posts: Vec<PostData> = taxonomy
                .posts(repository, name)
                .iter()
                .map(|p| self.post_data(p, terms))
                .collect();
            listing.push(TermData {
                name: name.clone(),
                path: path.clone(),
                count: term_posts.len(),
            });

            let title = format!("{}: {}", taxonomy.singular(), name);
            let mut context = self.create_base_context(site_data, &title, "", path);
            context.insert("kind", taxonomy.singular());
            context.insert("term_name", name);
            context.insert("posts", &term_posts);
            let html = self.renderer.render("term.html", &context)?;
            self.write_page(path, &html)?;
        }

        let index_path = format!("/{}/", taxonomy.dir());
        let mut context = self.create_base_context(site_data, taxonomy.title(), "", &index_path);
        context.insert("terms", &listing);
        let html = self.renderer.render("taxonomy.html", &context)?;
        self.write_page(&index_path, &html)?;

        tracing::info!("Generated {} {} pages", paths.len(), taxonomy.dir());
        Ok(paths.len())
    }

    /// Generate standalone pages
    fn generate_page_pages(&self, pages: &[Page], site_data: &SiteData) -> Result<usize> {
        let mut count = 0;
        for page in pages {
            if RESERVED_SEGMENTS.contains(&page.name.as_str()) {
                tracing::warn!("Skipping page {:?}: /{}/ is reserved", page.source, page.name);
                continue;
            }

            let path = format!("/{}/", page.name);
            let content = self.markdown.render(&page.content);
            let description = page.description.as_deref().unwrap_or("");

            let mut context = self.create_base_context(site_data, &page.title, description, &path);
            context.insert("content", &content);

            let html = self.renderer.render("page.html", &context)?;
            self.write_page(&path, &html)?;
            tracing::debug!("Generated page: {}", path);
            count += 1;
        }
        Ok(count)
    }

    /// Generate the not-found page
    fn generate_not_found(&self, site_data: &SiteData) -> Result<()> {
        let context = self.create_base_context(site_data, "Post not found", "", "/404.html");
        let html = self.renderer.render("not_found.html", &context)?;
        let output_path = self.helios.public_dir.join("404.html");
        fs::write(&output_path, html)
            .with_context(|| format!("Failed to write {:?}", output_path))?;
        Ok(())
    }

    /// Write `<public>/<path>/index.html`
    fn write_page(&self, path: &str, html: &str) -> Result<()> {
        // Strip leading slash from path to avoid creating absolute paths
        let clean_path = path.trim_matches('/');
        let output_path = self.helios.public_dir.join(clean_path).join("index.html");
        write_file(&output_path, html)
    }
}

fn write_file(output_path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create dir {:?}", parent))?;
    }
    fs::write(output_path, contents)
        .with_context(|| format!("Failed to write {:?}", output_path))?;
    Ok(())
}

/// Give every name its own URL segment.
///
/// Names are taken in sorted order; a name whose slug is already taken gets
/// the first free `-2`, `-3`, ... suffix.
fn assign_paths(taxonomy: Taxonomy, names: Vec<String>) -> BTreeMap<String, String> {
    let mut taken = HashSet::new();
    let mut paths = BTreeMap::new();

    for name in names {
        let base = term_slug(&name);
        let mut segment = base.clone();
        let mut n = 2;
        while !taken.insert(segment.clone()) {
            segment = format!("{}-{}", base, n);
            n += 1;
        }
        if segment != base {
            tracing::warn!(
                "{} {:?} shares the slug {:?}; publishing it at {:?}",
                taxonomy.singular(),
                name,
                base,
                segment
            );
        }
        paths.insert(name, format!("/{}/{}/", taxonomy.dir(), segment));
    }
    paths
}

fn nav_post(post: &Post) -> NavPost {
    NavPost {
        title: post.metadata.title.clone(),
        path: post_path(&post.slug),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::load_pages;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, content: &str) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join(name), content).unwrap();
    }

    fn site() -> (TempDir, Helios) {
        let tmp = TempDir::new().unwrap();
        let posts = tmp.path().join("content/posts");
        write(
            &posts,
            "hello.md",
            "---\ntitle: \"Hello\"\ndate: \"2024-01-01\"\ncategories: [Rust]\ntags: [intro, web dev]\n---\n\nHello <script>alert(1)</script> world.\n\n[bad](javascript:alert(1))\n",
        );
        write(
            &posts,
            "june.md",
            "---\ntitle: \"June\"\ndate: \"2024-06-01\"\ncategories: [Rust]\n---\n\n```rust\nfn main() {}\n```\n",
        );
        write(
            &posts,
            "secret.md",
            "---\ntitle: \"Secret\"\ndate: \"2024-07-01\"\nstatus: draft\n---\n\nHidden.\n",
        );
        write(
            &tmp.path().join("content/pages"),
            "about.md",
            "---\ntitle: About\n---\n\nAbout this blog.\n",
        );
        write(
            &tmp.path().join("content/pages"),
            "tags.md",
            "---\ntitle: Clash\n---\n\nShould not overwrite the tag index.\n",
        );

        let helios = Helios::new(tmp.path()).unwrap();
        (tmp, helios)
    }

    fn generate(helios: &Helios) -> GenerateStats {
        let repo = helios.repository().unwrap();
        let pages = load_pages(&helios.pages_dir);
        Generator::new(helios)
            .unwrap()
            .generate(&repo, &pages)
            .unwrap()
    }

    fn read(helios: &Helios, path: &str) -> String {
        fs::read_to_string(helios.public_dir.join(path)).unwrap()
    }

    #[test]
    fn test_generates_expected_files() {
        let (_tmp, helios) = site();
        let stats = generate(&helios);

        assert_eq!(
            stats,
            GenerateStats {
                posts: 2,
                pages: 1,
                categories: 1,
                tags: 2,
            }
        );
        for path in [
            "index.html",
            "posts/hello/index.html",
            "posts/june/index.html",
            "categories/index.html",
            "categories/rust/index.html",
            "tags/index.html",
            "tags/intro/index.html",
            "tags/web-dev/index.html",
            "about/index.html",
            "404.html",
            "css/style.css",
            "css/highlight.css",
        ] {
            assert!(helios.public_dir.join(path).is_file(), "missing {}", path);
        }
    }

    #[test]
    fn test_drafts_are_not_generated() {
        let (_tmp, helios) = site();
        generate(&helios);

        assert!(!helios.public_dir.join("posts/secret").exists());
        assert!(!read(&helios, "index.html").contains("Secret"));
    }

    #[test]
    fn test_index_is_newest_first() {
        let (_tmp, helios) = site();
        generate(&helios);

        let index = read(&helios, "index.html");
        let june = index.find("June").unwrap();
        let hello = index.find("Hello").unwrap();
        assert!(june < hello);
        assert!(index.contains("January 1, 2024"));
        assert!(index.contains("1 min read"));
    }

    #[test]
    fn test_post_content_is_sanitized() {
        let (_tmp, helios) = site();
        generate(&helios);

        let html = read(&helios, "posts/hello/index.html");
        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(!html.contains("javascript:"));
        assert!(html.contains("href=\"/tags/web-dev/\""));
    }

    #[test]
    fn test_prev_next_navigation() {
        let (_tmp, helios) = site();
        generate(&helios);

        let newest = read(&helios, "posts/june/index.html");
        assert!(newest.contains("href=\"/posts/hello/\""));
        let oldest = read(&helios, "posts/hello/index.html");
        assert!(oldest.contains("href=\"/posts/june/\""));
    }

    #[test]
    fn test_reserved_page_names_are_skipped() {
        let (_tmp, helios) = site();
        generate(&helios);

        assert!(!read(&helios, "tags/index.html").contains("Should not overwrite"));
    }

    #[test]
    fn test_output_is_recreated() {
        let (_tmp, helios) = site();
        fs::create_dir_all(&helios.public_dir).unwrap();
        fs::write(helios.public_dir.join("stale.html"), "old").unwrap();

        generate(&helios);
        assert!(!helios.public_dir.join("stale.html").exists());
    }

    #[test]
    fn test_case_distinct_categories_get_their_own_pages() {
        let tmp = TempDir::new().unwrap();
        let posts = tmp.path().join("content/posts");
        write(
            &posts,
            "upper.md",
            "---\ntitle: Upper\ndate: 2024-01-01\ncategories: [Photography]\n---\n",
        );
        write(
            &posts,
            "lower.md",
            "---\ntitle: Lower\ndate: 2024-02-01\ncategories: [photography]\n---\n",
        );
        let helios = Helios::new(tmp.path()).unwrap();
        let stats = generate(&helios);
        assert_eq!(stats.categories, 2);

        let upper = read(&helios, "categories/photography/index.html");
        assert!(upper.contains("Upper"));
        assert!(!upper.contains("Lower"));
        let lower = read(&helios, "categories/photography-2/index.html");
        assert!(lower.contains("Lower"));
        assert!(!lower.contains("Upper"));

        let post = read(&helios, "posts/lower/index.html");
        assert!(post.contains("href=\"/categories/photography-2/\""));
    }

    #[test]
    fn test_assign_paths_suffixes_collisions() {
        let names = vec!["C++".to_string(), "c".to_string(), "c 2".to_string()];
        let paths = assign_paths(Taxonomy::Tags, names);
        assert_eq!(paths["C++"], "/tags/c/");
        assert_eq!(paths["c"], "/tags/c-2/");
        assert_eq!(paths["c 2"], "/tags/c-2-2/");
    }

    #[test]
    fn test_empty_site() {
        let tmp = TempDir::new().unwrap();
        let helios = Helios::new(tmp.path()).unwrap();
        let stats = generate(&helios);

        assert_eq!(stats, GenerateStats::default());
        assert!(read(&helios, "index.html").contains("No posts published yet."));
        assert!(helios.public_dir.join("404.html").is_file());
    }
}
