//! Frontmatter parsing and Markdown to HTML conversion.
//!
//! A content file is a YAML frontmatter header delimited by `---` lines,
//! followed by a Markdown body. The body is converted with fenced code
//! blocks highlighted through syntect (inline styles, no stylesheet
//! classes) and bare `http(s)://` URLs turned into links.

use crate::assets::copy_images_and_update_path;
use crate::config::SiteDirs;
use crate::error::SiteError;
use anyhow::{Context, Result};
use pulldown_cmark::{CodeBlockKind, Event, LinkType, Options, Parser, Tag, TagEnd, html};
use regex::Regex;
use serde_yaml::Mapping;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;
use syntect::highlighting::ThemeSet;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

const HIGHLIGHT_THEME: &str = "InspiredGitHub";

static SYNTAXES: OnceLock<SyntaxSet> = OnceLock::new();
static THEMES: OnceLock<ThemeSet> = OnceLock::new();
static URL_RE: OnceLock<Regex> = OnceLock::new();

fn url_re() -> &'static Regex {
    URL_RE.get_or_init(|| Regex::new(r#"https?://[^\s<>"')]+"#).unwrap())
}

// =============================================================================
// Frontmatter
// =============================================================================

/// Parsed frontmatter mapping. Key order is preserved.
#[derive(Debug, Clone, Default)]
pub struct FrontMatter(Mapping);

impl FrontMatter {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(serde_yaml::Value::as_str)
    }

    pub fn title(&self) -> Option<&str> {
        self.get_str("title")
    }

    pub fn template(&self) -> Option<&str> {
        self.get_str("template")
    }

    pub fn iter(&self) -> impl Iterator<Item = (&serde_yaml::Value, &serde_yaml::Value)> {
        self.0.iter()
    }
}

/// A content file split into frontmatter and raw Markdown body.
#[derive(Debug, Clone)]
pub struct Document {
    pub matter: FrontMatter,
    pub body: String,
}

impl Document {
    /// Split and parse the frontmatter header. A document without a header
    /// yields an empty mapping and the full text as body; validation of
    /// required keys is the caller's job.
    pub fn parse(text: &str) -> Result<Self, serde_yaml::Error> {
        let Some((header, body)) = split_frontmatter(text) else {
            return Ok(Self {
                matter: FrontMatter::default(),
                body: text.to_string(),
            });
        };

        let mapping = serde_yaml::from_str::<Option<Mapping>>(header)?.unwrap_or_default();
        Ok(Self {
            matter: FrontMatter(mapping),
            body: body.to_string(),
        })
    }
}

/// Split `---`-delimited header from body. Returns `None` when the text does
/// not start with a complete header block.
fn split_frontmatter(text: &str) -> Option<(&str, &str)> {
    let rest = text.strip_prefix("---")?;
    let rest = rest
        .strip_prefix('\n')
        .or_else(|| rest.strip_prefix("\r\n"))?;

    // Closing delimiter on the very next line: empty header.
    if let Some(body) = rest.strip_prefix("---").and_then(body_after_delimiter) {
        return Some(("", body));
    }

    for (idx, _) in rest.match_indices("\n---") {
        if let Some(body) = body_after_delimiter(&rest[idx + "\n---".len()..]) {
            return Some((&rest[..idx], body));
        }
    }
    None
}

/// The text following `---` closes the header only if the delimiter ends its
/// line; returns the body with that line ending stripped.
fn body_after_delimiter(after: &str) -> Option<&str> {
    if after.is_empty() || after.starts_with('\n') || after.starts_with("\r\n") {
        Some(
            after
                .strip_prefix("\r\n")
                .or_else(|| after.strip_prefix('\n'))
                .unwrap_or(after),
        )
    } else {
        None
    }
}

// =============================================================================
// Rendering
// =============================================================================

/// Parse a content file and convert its body to HTML.
///
/// Image references are rewritten (and the images copied into the output
/// tree) before Markdown conversion. The frontmatter is returned unvalidated.
pub fn render_markdown(file: &Path, dirs: &SiteDirs) -> Result<(FrontMatter, String)> {
    let text =
        fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))?;

    let document = Document::parse(&text).map_err(|source| SiteError::FrontmatterParse {
        file: file.to_path_buf(),
        source,
    })?;

    let corrected = copy_images_and_update_path(&dirs.content, &dirs.public, file, &document.body)?;

    Ok((document.matter, markdown_to_html(&corrected)))
}

/// Convert Markdown to HTML.
///
/// Fenced code blocks are replaced by syntect-highlighted HTML and bare
/// URLs in regular text become links. Text inside code blocks or existing
/// links is left alone.
pub fn markdown_to_html(body: &str) -> String {
    let options =
        Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_FOOTNOTES;

    let mut events: Vec<Event> = Vec::new();
    let mut code_block: Option<(String, String)> = None;
    let mut in_link = false;
    let mut in_image = false;

    for event in Parser::new_ext(body, options) {
        match event {
            Event::Start(Tag::CodeBlock(kind)) => {
                let lang = match &kind {
                    CodeBlockKind::Fenced(info) => {
                        info.split_whitespace().next().unwrap_or("").to_string()
                    }
                    CodeBlockKind::Indented => String::new(),
                };
                code_block = Some((lang, String::new()));
            }
            Event::End(TagEnd::CodeBlock) => {
                if let Some((lang, code)) = code_block.take() {
                    events.push(Event::Html(highlight_block(&lang, &code).into()));
                }
            }
            Event::Text(text) => match code_block.as_mut() {
                Some((_, code)) => code.push_str(&text),
                // Link labels and image alt text stay as written
                None if in_link || in_image => events.push(Event::Text(text)),
                None => autolink(&text, &mut events),
            },
            Event::Start(tag @ Tag::Link { .. }) => {
                in_link = true;
                events.push(Event::Start(tag));
            }
            Event::End(TagEnd::Link) => {
                in_link = false;
                events.push(Event::End(TagEnd::Link));
            }
            Event::Start(tag @ Tag::Image { .. }) => {
                in_image = true;
                events.push(Event::Start(tag));
            }
            Event::End(TagEnd::Image) => {
                in_image = false;
                events.push(Event::End(TagEnd::Image));
            }
            other => events.push(other),
        }
    }

    let mut out = String::with_capacity(body.len() * 2);
    html::push_html(&mut out, events.into_iter());
    out
}

/// Emit the text with bare URLs wrapped in link events.
fn autolink<'a>(text: &str, events: &mut Vec<Event<'a>>) {
    let mut last = 0;
    for found in url_re().find_iter(text) {
        // Trailing sentence punctuation is not part of the URL
        let url = found.as_str().trim_end_matches(['.', ',', ';', ':', '!', '?']);
        if url.is_empty() {
            continue;
        }

        if found.start() > last {
            events.push(Event::Text(text[last..found.start()].to_string().into()));
        }
        events.push(Event::Start(Tag::Link {
            link_type: LinkType::Autolink,
            dest_url: url.to_string().into(),
            title: "".into(),
            id: "".into(),
        }));
        events.push(Event::Text(url.to_string().into()));
        events.push(Event::End(TagEnd::Link));

        last = found.start() + url.len();
    }

    if last < text.len() {
        events.push(Event::Text(text[last..].to_string().into()));
    }
}

/// Highlight a code block as HTML with inline styles.
///
/// Unknown languages fall back to plain text highlighting.
fn highlight_block(lang: &str, code: &str) -> String {
    let syntaxes = SYNTAXES.get_or_init(SyntaxSet::load_defaults_newlines);
    let theme = &THEMES.get_or_init(ThemeSet::load_defaults).themes[HIGHLIGHT_THEME];

    let syntax = (!lang.is_empty())
        .then(|| syntaxes.find_syntax_by_token(lang))
        .flatten()
        .unwrap_or_else(|| syntaxes.find_syntax_plain_text());

    highlighted_html_for_string(code, syntaxes, syntax, theme)
        .unwrap_or_else(|_| format!("<pre><code>{}</code></pre>\n", escape_text(code)))
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_document_with_frontmatter() {
        let doc = Document::parse("---\ntitle: Home\ntemplate: base.html\n---\n# Hello\n").unwrap();
        assert_eq!(doc.matter.title(), Some("Home"));
        assert_eq!(doc.matter.template(), Some("base.html"));
        assert_eq!(doc.body, "# Hello\n");
    }

    #[test]
    fn test_parse_document_without_frontmatter() {
        let doc = Document::parse("# Just a heading\n").unwrap();
        assert!(doc.matter.is_empty());
        assert_eq!(doc.body, "# Just a heading\n");
    }

    #[test]
    fn test_parse_document_extra_keys_pass_through() {
        let doc = Document::parse("---\ntitle: X\ntemplate: t.html\nauthor: ada\n---\nbody").unwrap();
        assert_eq!(doc.matter.get_str("author"), Some("ada"));
    }

    #[test]
    fn test_parse_document_malformed_frontmatter() {
        assert!(Document::parse("---\ntitle: [unclosed\n---\nbody").is_err());
    }

    #[test]
    fn test_parse_document_empty_header() {
        let doc = Document::parse("---\n---\nbody").unwrap();
        assert!(doc.matter.is_empty());
        assert_eq!(doc.body, "body");
    }

    #[test]
    fn test_parse_document_empty_header_crlf() {
        let doc = Document::parse("---\r\n---\r\nbody").unwrap();
        assert!(doc.matter.is_empty());
        assert_eq!(doc.body, "body");
    }

    #[test]
    fn test_parse_document_empty_header_without_body() {
        let doc = Document::parse("---\n---").unwrap();
        assert!(doc.matter.is_empty());
        assert_eq!(doc.body, "");
    }

    #[test]
    fn test_markdown_basic() {
        let html = markdown_to_html("# Title\n\nsome *text*\n");
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<em>text</em>"));
    }

    #[test]
    fn test_markdown_fenced_code_uses_inline_styles() {
        let html = markdown_to_html("```rust\nfn main() {}\n```\n");
        assert!(html.contains("style="), "expected inline styles: {html}");
        assert!(!html.contains("class=\"language-rust\""));
    }

    #[test]
    fn test_markdown_unknown_language_falls_back() {
        let html = markdown_to_html("```klingon\nnuqneH\n```\n");
        assert!(html.contains("nuqneH"), "unexpected html: {html}");
        assert!(html.contains("<pre"));
    }

    #[test]
    fn test_markdown_autolinks_bare_urls() {
        let html = markdown_to_html("see https://example.com for more\n");
        assert!(
            html.contains(r#"<a href="https://example.com">https://example.com</a>"#),
            "unexpected html: {html}"
        );
    }

    #[test]
    fn test_markdown_autolink_strips_trailing_punctuation() {
        let html = markdown_to_html("go to https://example.com.\n");
        assert!(html.contains(r#"href="https://example.com""#));
    }

    #[test]
    fn test_markdown_no_autolink_inside_code() {
        let html = markdown_to_html("`https://example.com`\n");
        assert!(!html.contains("<a href"));
    }

    #[test]
    fn test_markdown_no_autolink_inside_image_alt() {
        let html = markdown_to_html("![see https://example.com](pic.png)\n");
        assert!(
            html.contains(r#"alt="see https://example.com""#),
            "unexpected html: {html}"
        );
        assert!(!html.contains("<a href"));
    }

    #[test]
    fn test_markdown_no_autolink_inside_existing_link() {
        let html = markdown_to_html("[https://example.com](https://other.org)\n");
        assert!(html.contains(r#"href="https://other.org""#));
        assert_eq!(html.matches("<a ").count(), 1);
    }
}
