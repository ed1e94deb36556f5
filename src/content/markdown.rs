//! Markdown rendering with syntax highlighting
//!
//! The rendered fragment is embedded into pages without further escaping, so
//! this renderer is the sanitization boundary: raw HTML from the source is
//! emitted as text, link and image targets are restricted to a small set of
//! schemes, and highlighted code only carries `class` attributes.

use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

/// Marker separating a post's excerpt from the rest of the body
pub const MORE_MARKER: &str = "<!-- more -->";

/// Class prefix used for highlighted tokens
pub const HIGHLIGHT_CLASS_STYLE: ClassStyle = ClassStyle::SpacedPrefixed { prefix: "hl-" };

const SAFE_SCHEMES: [&str; 3] = ["http", "https", "mailto"];

/// Markdown renderer with syntax highlighting
pub struct MarkdownRenderer {
    syntax_set: SyntaxSet,
    highlight: bool,
}

struct PendingCode {
    lang: Option<String>,
    code: String,
}

impl MarkdownRenderer {
    /// Create a new markdown renderer
    pub fn new() -> Self {
        Self::with_highlight(true)
    }

    /// Create with highlighting switched on or off
    pub fn with_highlight(highlight: bool) -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            highlight,
        }
    }

    fn options() -> Options {
        // No YAML metadata blocks: front-matter is split off beforehand.
        Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_SMART_PUNCTUATION
            | Options::ENABLE_GFM
    }

    /// Render markdown to a sanitized HTML fragment
    pub fn render(&self, markdown: &str) -> String {
        let parser = Parser::new_ext(markdown, Self::options());

        let mut events: Vec<Event> = Vec::new();
        let mut code_block: Option<PendingCode> = None;
        let mut html_block: Option<String> = None;

        for event in parser {
            if let Some(mut pending) = code_block.take() {
                match event {
                    Event::End(TagEnd::CodeBlock) => {
                        let rendered = self.render_code(&pending.code, pending.lang.as_deref());
                        events.push(Event::Html(CowStr::from(rendered)));
                    }
                    Event::Text(text) => {
                        pending.code.push_str(&text);
                        code_block = Some(pending);
                    }
                    _ => code_block = Some(pending),
                }
                continue;
            }

            if let Some(mut buffer) = html_block.take() {
                match event {
                    Event::End(TagEnd::HtmlBlock) => {
                        let text = buffer.trim_end();
                        if !text.is_empty() && !is_comment(text) {
                            events.push(Event::Start(Tag::Paragraph));
                            events.push(Event::Text(CowStr::from(text.to_string())));
                            events.push(Event::End(TagEnd::Paragraph));
                        }
                    }
                    Event::Html(text) | Event::Text(text) => {
                        buffer.push_str(&text);
                        html_block = Some(buffer);
                    }
                    _ => html_block = Some(buffer),
                }
                continue;
            }

            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let lang = match kind {
                        CodeBlockKind::Fenced(info) => info
                            .split_whitespace()
                            .next()
                            .map(sanitize_lang)
                            .filter(|l| !l.is_empty()),
                        CodeBlockKind::Indented => None,
                    };
                    code_block = Some(PendingCode {
                        lang,
                        code: String::new(),
                    });
                }
                Event::Start(Tag::HtmlBlock) => html_block = Some(String::new()),
                // Raw HTML never reaches the page as markup
                Event::Html(raw) | Event::InlineHtml(raw) => {
                    if !is_comment(raw.trim()) {
                        events.push(Event::Text(raw));
                    }
                }
                Event::Start(Tag::Link {
                    link_type,
                    dest_url,
                    title,
                    id,
                }) => events.push(Event::Start(Tag::Link {
                    link_type,
                    dest_url: safe_url(dest_url),
                    title,
                    id,
                })),
                Event::Start(Tag::Image {
                    link_type,
                    dest_url,
                    title,
                    id,
                }) => events.push(Event::Start(Tag::Image {
                    link_type,
                    dest_url: safe_url(dest_url),
                    title,
                    id,
                })),
                other => events.push(other),
            }
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());
        html_output
    }

    /// Render a fenced or indented code block as literal preformatted text
    fn render_code(&self, code: &str, lang: Option<&str>) -> String {
        let class = lang
            .map(|l| format!(r#" class="language-{}""#, l))
            .unwrap_or_default();

        let body = lang
            .filter(|_| self.highlight)
            .and_then(|l| self.highlight_code(code, l))
            .unwrap_or_else(|| html_escape(code));

        format!("<pre><code{}>{}</code></pre>\n", class, body)
    }

    /// Highlight a code block, `None` when the language is unknown
    fn highlight_code(&self, code: &str, lang: &str) -> Option<String> {
        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))?;

        let mut generator = ClassedHTMLGenerator::new_with_class_style(
            syntax,
            &self.syntax_set,
            HIGHLIGHT_CLASS_STYLE,
        );
        for line in LinesWithEndings::from(code) {
            if let Err(e) = generator.parse_html_for_line_which_includes_newline(line) {
                tracing::debug!("Highlighting {} failed: {}", lang, e);
                return None;
            }
        }
        Some(generator.finalize())
    }

    /// Parse excerpt from content (split by <!-- more -->)
    pub fn split_excerpt(content: &str) -> (Option<String>, String) {
        if let Some(pos) = content.find(MORE_MARKER) {
            let excerpt = content[..pos].trim().to_string();
            let remaining = content[pos + MORE_MARKER.len()..].trim().to_string();
            let full = format!("{}\n\n{}", excerpt, remaining);
            (Some(excerpt), full)
        } else {
            (None, content.to_string())
        }
    }

    /// Plain text of the excerpt, or of the first paragraph, cut to `max_chars`
    pub fn summarize(content: &str, max_chars: usize) -> String {
        let (excerpt, _) = Self::split_excerpt(content);
        let source = excerpt.as_deref().unwrap_or(content);

        let mut text = String::new();
        let mut in_paragraph = false;
        for event in Parser::new_ext(source, Self::options()) {
            match event {
                Event::Start(Tag::Paragraph) => in_paragraph = true,
                Event::End(TagEnd::Paragraph) => {
                    in_paragraph = false;
                    if excerpt.is_none() && !text.trim().is_empty() {
                        break;
                    }
                    text.push(' ');
                }
                Event::Text(t) | Event::Code(t) if in_paragraph => text.push_str(&t),
                Event::SoftBreak | Event::HardBreak if in_paragraph => text.push(' '),
                _ => {}
            }
        }

        let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
        truncate_chars(&collapsed, max_chars)
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Keep only characters valid in a `language-*` class name
fn sanitize_lang(lang: &str) -> String {
    lang.chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '+' | '-'))
        .collect()
}

fn is_comment(html: &str) -> bool {
    html.starts_with("<!--") && html.ends_with("-->")
}

/// Whether a link target is relative or uses an allowed scheme
pub fn is_safe_url(url: &str) -> bool {
    let url = url.trim();
    match url.find([':', '/', '?', '#']) {
        Some(pos) if url[pos..].starts_with(':') => {
            let scheme = url[..pos].to_ascii_lowercase();
            SAFE_SCHEMES.contains(&scheme.as_str())
        }
        _ => true,
    }
}

fn safe_url(url: CowStr<'_>) -> CowStr<'_> {
    if is_safe_url(&url) {
        url
    } else {
        tracing::debug!("Dropping unsafe link target {:?}", url.as_ref());
        CowStr::Borrowed("#")
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    let cut = match cut.rfind(' ') {
        Some(pos) if pos > 0 => &cut[..pos],
        _ => cut.as_str(),
    };
    format!("{}…", cut.trim_end())
}

/// Simple HTML escaping
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_basic_markdown() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("# Hello World\n\nThis is a test.");
        assert!(html.contains("<h1>Hello World</h1>"));
        assert!(html.contains("<p>This is a test.</p>"));
    }

    #[test]
    fn test_render_common_blocks() {
        let renderer = MarkdownRenderer::new();
        let markdown = "## Lessons\n\n*one* and **two**\n\n> quoted\n\n1. first\n2. second\n\n- a\n- b\n\n![alt](https://example.com/a.png)\n\n[link](https://example.com)";
        let html = renderer.render(markdown);
        assert!(html.contains("<h2>Lessons</h2>"));
        assert!(html.contains("<em>one</em>"));
        assert!(html.contains("<strong>two</strong>"));
        assert!(html.contains("<blockquote>"));
        assert!(html.contains("<ol>"));
        assert!(html.contains("<ul>"));
        assert!(html.contains(r#"<img src="https://example.com/a.png" alt="alt""#));
        assert!(html.contains(r#"<a href="https://example.com">link</a>"#));
    }

    #[test]
    fn test_render_code_block_is_literal() {
        let renderer = MarkdownRenderer::with_highlight(false);
        let html = renderer.render("```javascript\nalert(\"<b>hi</b>\");\n```");
        assert!(html.contains(r#"<pre><code class="language-javascript">"#));
        assert!(html.contains("&lt;b&gt;hi&lt;/b&gt;"));
        assert!(!html.contains("<b>"));
    }

    #[test]
    fn test_render_code_block_highlighted_with_classes() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("```rust\nfn main() {}\n```");
        assert!(html.contains(r#"class="language-rust""#));
        assert!(html.contains("<span class=\"hl-"));
        assert!(!html.contains("style="));
    }

    #[test]
    fn test_unknown_language_falls_back_to_plain() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("```nosuchlang\n<x>\n```");
        assert!(html.contains(r#"class="language-nosuchlang""#));
        assert!(html.contains("&lt;x&gt;"));
    }

    #[test]
    fn test_language_token_is_sanitized() {
        let renderer = MarkdownRenderer::with_highlight(false);
        let html = renderer.render("```js\"onmouseover=alert(1)\ncode\n```");
        assert!(!html.contains("onmouseover=alert(1)\""));
        assert!(html.contains(r#"class="language-jsonmouseoveralert1""#));
    }

    #[test]
    fn test_raw_html_is_escaped() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render(
            "<script>alert(1)</script>\n\nText with <img src=x onerror=alert(1)> inline.",
        );
        assert!(!html.contains("<script>"));
        assert!(!html.contains("<img src=x"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("&lt;img src=x onerror=alert(1)&gt;"));
    }

    #[test]
    fn test_unsafe_link_targets_are_dropped() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render(
            "[a](javascript:alert(1)) [b](JaVaScRiPt:alert(1)) ![c](data:text/html;base64,xx) [d](/posts/ok) [e](#top) [f](mailto:me@example.com)",
        );
        assert!(!html.to_lowercase().contains("javascript:"));
        assert!(!html.contains("data:text"));
        assert!(html.contains(r##"<a href="#">a</a>"##));
        assert!(html.contains(r#"<a href="/posts/ok">d</a>"#));
        assert!(html.contains(r##"<a href="#top">e</a>"##));
        assert!(html.contains(r#"<a href="mailto:me@example.com">f</a>"#));
    }

    #[test]
    fn test_is_safe_url() {
        assert!(is_safe_url("https://example.com/a:b"));
        assert!(is_safe_url("relative/path:with-colon"));
        assert!(is_safe_url("?q=a:b"));
        assert!(!is_safe_url("vbscript:msgbox"));
        assert!(!is_safe_url(" javascript:alert(1)"));
    }

    #[test]
    fn test_more_marker_is_hidden() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("Intro.\n\n<!-- more -->\n\nRest.");
        assert!(!html.contains("more"));
        assert!(html.contains("<p>Intro.</p>"));
        assert!(html.contains("<p>Rest.</p>"));
    }

    #[test]
    fn test_split_excerpt() {
        let content = "This is excerpt.\n<!-- more -->\nThis is more content.";
        let (excerpt, full) = MarkdownRenderer::split_excerpt(content);
        assert_eq!(excerpt, Some("This is excerpt.".to_string()));
        assert!(full.contains("This is excerpt."));
        assert!(full.contains("This is more content."));
    }

    #[test]
    fn test_summarize_first_paragraph() {
        let content = "# Heading\n\nFirst *paragraph* with `code`.\n\nSecond paragraph.";
        assert_eq!(
            MarkdownRenderer::summarize(content, 160),
            "First paragraph with code."
        );
    }

    #[test]
    fn test_summarize_prefers_excerpt() {
        let content = "One.\n\nTwo.\n\n<!-- more -->\n\nThree.";
        assert_eq!(MarkdownRenderer::summarize(content, 160), "One. Two.");
    }

    #[test]
    fn test_summarize_truncates_on_word_boundary() {
        let summary = MarkdownRenderer::summarize("alpha beta gamma delta", 12);
        assert_eq!(summary, "alpha beta…");
        assert_eq!(MarkdownRenderer::summarize("", 10), "");
    }
}
