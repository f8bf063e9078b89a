//! Page and section generation.
//!
//! Each content file becomes one HTML file: a regular page renders with the
//! top-level variable `page`, a section's `_index.md` renders with `section`
//! (which additionally carries the sorted `pages` list).

use crate::config::SiteDirs;
use crate::error::SiteError;
use crate::markdown::{FrontMatter, render_markdown};
use crate::paths::calculate_depth;
use crate::template::{build_context, get_template};
use anyhow::{Context, Result};
use minijinja::{Environment, context};
use serde_json::Value;
use std::fs;
use std::path::Path;

const REQUIRED_KEYS: &[&str] = &["title", "template"];

/// A rendered page's context, kept for aggregation into its section.
#[derive(Debug, Clone)]
pub struct PageContext {
    /// Sort key, taken from the `title` frontmatter.
    pub title: String,
    pub context: Value,
}

/// Require `title` and `template` in the frontmatter.
pub fn validate_frontmatter(matter: &FrontMatter, file: &Path) -> Result<(), SiteError> {
    if matter.is_empty() {
        return Err(SiteError::MissingFrontmatter {
            file: file.to_path_buf(),
        });
    }

    let missing: Vec<&'static str> = REQUIRED_KEYS
        .iter()
        .copied()
        .filter(|key| !matter.contains(key))
        .collect();
    if !missing.is_empty() {
        return Err(SiteError::MissingKeys {
            file: file.to_path_buf(),
            keys: missing,
        });
    }

    Ok(())
}

/// Render one leaf page to `output/<stem>.html` and return its context.
pub fn generate_page(
    file: &Path,
    env: &Environment<'static>,
    dirs: &SiteDirs,
    output: &Path,
) -> Result<PageContext> {
    let (matter, html) = render_markdown(file, dirs)?;
    validate_frontmatter(&matter, file)?;

    let stem = file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let depth = calculate_depth(file, &dirs.content);
    let context = build_context(&matter, &html, depth, &stem, None)?;

    let template = get_template(env, &matter)?;
    let rendered = template
        .render(context! { page => context })
        .with_context(|| format!("Failed to render {}", file.display()))?;
    write_html(&output.join(format!("{stem}.html")), &rendered)?;

    let title = matter.title().unwrap_or_default().to_string();
    Ok(PageContext { title, context })
}

/// Render a section's `_index.md` to `output/index.html`.
///
/// `pages` is the pre-sorted list of the section's child page contexts.
pub fn generate_section(
    file: &Path,
    env: &Environment<'static>,
    dirs: &SiteDirs,
    output: &Path,
    pages: Vec<PageContext>,
) -> Result<()> {
    let (matter, html) = render_markdown(file, dirs)?;
    validate_frontmatter(&matter, file)?;

    let depth = calculate_depth(file, &dirs.content);
    let url = section_url(output, &dirs.public);
    let page_values = pages.into_iter().map(|page| page.context).collect();
    let context = build_context(&matter, &html, depth, &url, Some(page_values))?;

    let template = get_template(env, &matter)?;
    let rendered = template
        .render(context! { section => context })
        .with_context(|| format!("Failed to render {}", file.display()))?;
    write_html(&output.join("index.html"), &rendered)
}

/// Output-relative directory path with a trailing slash; the root section
/// is `/`.
fn section_url(output: &Path, public: &Path) -> String {
    let rel = output.strip_prefix(public).unwrap_or(output);
    if rel.as_os_str().is_empty() {
        return "/".to_string();
    }

    let joined = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    format!("{joined}/")
}

/// Write rendered HTML, creating parent directories as needed. Existing
/// files are overwritten; the build always starts from a cleared output
/// tree.
fn write_html(path: &Path, html: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(path, html).with_context(|| format!("Failed to write {}", path.display()))
}
