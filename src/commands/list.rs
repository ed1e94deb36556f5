//! List site content

use anyhow::Result;
use serde::Serialize;

use crate::content::{Post, PostStatus};
use crate::Helios;

/// A post as printed by `helios list`
#[derive(Debug, Serialize)]
struct PostRow {
    slug: String,
    title: String,
    date: String,
    status: PostStatus,
    reading_minutes: u32,
}

impl From<&Post> for PostRow {
    fn from(post: &Post) -> Self {
        Self {
            slug: post.slug.clone(),
            title: post.metadata.title.clone(),
            date: post.metadata.date.format("%Y-%m-%d").to_string(),
            status: post.status,
            reading_minutes: post.reading_time.minutes,
        }
    }
}

/// A category or tag with the number of published posts using it
#[derive(Debug, Serialize, PartialEq, Eq)]
struct TermRow {
    name: String,
    count: usize,
}

/// List site content by type.
///
/// `search` narrows published posts to those whose title or description
/// contains the term.
pub fn run(
    helios: &Helios,
    content_type: &str,
    search: Option<&str>,
    json: bool,
) -> Result<()> {
    println!("{}", render(helios, content_type, search, json)?);
    Ok(())
}

fn render(
    helios: &Helios,
    content_type: &str,
    search: Option<&str>,
    json: bool,
) -> Result<String> {
    let repository = helios.repository()?;

    if search.is_some() && !matches!(content_type, "post" | "posts") {
        anyhow::bail!("--search only applies to posts");
    }

    let output = match content_type {
        "post" | "posts" => match search {
            Some(term) => posts_output("Matching posts", &repository.search(term), json)?,
            None => posts_output("Posts", &repository.list_published(), json)?,
        },
        "draft" | "drafts" => posts_output("Drafts", &repository.list_drafts(), json)?,
        "category" | "categories" => {
            let published = repository.list_published();
            let rows = term_rows(repository.list_categories(), |name| {
                published.iter().filter(|p| p.has_category(name)).count()
            });
            terms_output("Categories", &rows, json)?
        }
        "tag" | "tags" => {
            let published = repository.list_published();
            let rows = term_rows(repository.list_tags(), |name| {
                published.iter().filter(|p| p.has_tag(name)).count()
            });
            terms_output("Tags", &rows, json)?
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: post, draft, category, tag",
                content_type
            );
        }
    };

    Ok(output)
}

fn posts_output(heading: &str, posts: &[Post], json: bool) -> Result<String> {
    let rows: Vec<PostRow> = posts.iter().map(PostRow::from).collect();
    if json {
        return Ok(serde_json::to_string_pretty(&rows)?);
    }

    let mut out = format!("{} ({}):", heading, rows.len());
    for row in rows {
        out.push_str(&format!(
            "\n  {} - {} [{}] ({} min)",
            row.date, row.title, row.slug, row.reading_minutes
        ));
    }
    Ok(out)
}

fn term_rows<F>(names: Vec<String>, count: F) -> Vec<TermRow>
where
    F: Fn(&str) -> usize,
{
    let mut rows: Vec<TermRow> = names
        .into_iter()
        .map(|name| TermRow {
            count: count(&name),
            name,
        })
        .collect();
    rows.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    rows
}

fn terms_output(heading: &str, rows: &[TermRow], json: bool) -> Result<String> {
    if json {
        return Ok(serde_json::to_string_pretty(rows)?);
    }

    let mut out = format!("{} ({}):", heading, rows.len());
    for row in rows {
        out.push_str(&format!("\n  {} ({})", row.name, row.count));
    }
    Ok(out)
}
