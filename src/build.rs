//! Site building orchestration.
//!
//! `build_site` is the driver: it clears the output directory, validates the
//! project layout, copies the style and static trees verbatim into the
//! output root and then walks the content tree. `process_entries` is the
//! walker: depth-first over the content directories, one HTML file per
//! Markdown file, one `index.html` per directory that has an `_index.md`.

use crate::assets::copy_tree_into;
use crate::config::{SECTION_INDEX, SiteDirs};
use crate::error::SiteError;
use crate::generator::{PageContext, generate_page, generate_section};
use crate::log;
use crate::template::make_env;
use anyhow::{Context, Result};
use minijinja::Environment;
use std::fs;
use std::path::Path;

/// Build the entire site into the `public` directory.
///
/// Every step is fatal on failure; the output tree may be left partially
/// written, which is fine because the next build clears it first.
pub fn build_site(dirs: &SiteDirs) -> Result<()> {
    delete_and_recreate(&dirs.public)?;

    ensure_not_empty(&dirs.content, "Content")?;
    ensure_not_empty(&dirs.templates, "Templates")?;

    // Style and static contents land directly at the output root
    for tree in [&dirs.styles, &dirs.static_dir] {
        if tree.is_dir() {
            copy_tree_into(tree, &dirs.public)?;
        }
    }

    let env = make_env(&dirs.templates);
    process_entries(&dirs.content, &dirs.public, dirs, &env)?;

    log!("build"; "Site built successfully");
    Ok(())
}

/// Clear the output directory unconditionally, then recreate it.
fn delete_and_recreate(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_dir_all(path)
            .with_context(|| format!("Failed to clear {}", path.display()))?;
    }
    fs::create_dir_all(path).with_context(|| format!("Failed to create {}", path.display()))?;
    Ok(())
}

/// Fail when a directory is missing or has no entries.
fn ensure_not_empty(path: &Path, name: &'static str) -> Result<()> {
    let has_content = path.is_dir()
        && fs::read_dir(path)
            .with_context(|| format!("Failed to read {}", path.display()))?
            .next()
            .is_some();
    if !has_content {
        return Err(SiteError::EmptyDirectory { name }.into());
    }
    Ok(())
}

/// Recursively process a content directory into its mirrored output
/// directory.
///
/// Sibling order follows filesystem enumeration and is not sorted; only the
/// section's `pages` list has a deterministic order. Each directory owns its
/// own `pages` list, so subtrees stay independent. A directory without an
/// `_index.md` produces no section page and its collected pages are
/// discarded.
pub fn process_entries(
    source: &Path,
    output: &Path,
    dirs: &SiteDirs,
    env: &Environment<'static>,
) -> Result<()> {
    fs::create_dir_all(output).with_context(|| format!("Failed to create {}", output.display()))?;

    let index = source.join(SECTION_INDEX);
    let mut pages: Vec<PageContext> = Vec::new();

    for entry in
        fs::read_dir(source).with_context(|| format!("Failed to read {}", source.display()))?
    {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            process_entries(&path, &output.join(entry.file_name()), dirs, env)?;
        } else if path.extension().is_some_and(|ext| ext == "md") && path != index {
            pages.push(generate_page(&path, env, dirs, output)?);
        }
    }

    if index.is_file() {
        // Descending by title; equal titles keep their relative order
        pages.sort_by(|a, b| b.title.cmp(&a.title));
        generate_section(&index, env, dirs, output, pages)?;
    }

    Ok(())
}
