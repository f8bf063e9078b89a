//! Asset copying: image references inside content and verbatim trees.

use crate::error::SiteError;
use crate::paths::{calculate_depth, normalize};
use anyhow::{Context, Result};
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;
use walkdir::WalkDir;

static IMAGE_RE: OnceLock<Regex> = OnceLock::new();

/// Matches `![alt](target)` and `![alt](target "title")`; the target path is
/// capture group 1.
fn image_re() -> &'static Regex {
    IMAGE_RE.get_or_init(|| {
        Regex::new(r#"!\[[^\]]*\]\(\s*([^)\s]+)(?:\s+"[^"]*")?\s*\)"#).unwrap()
    })
}

/// Scan a raw Markdown body for image references, copy local images into the
/// mirrored output location and rewrite each reference so it resolves from
/// the generated HTML file. External URLs pass through untouched.
///
/// A reference to a file that does not exist aborts the build.
pub fn copy_images_and_update_path(
    content: &Path,
    public: &Path,
    file: &Path,
    body: &str,
) -> Result<String> {
    let mut out = String::with_capacity(body.len());
    let mut last = 0;

    for caps in image_re().captures_iter(body) {
        let target = caps.get(1).expect("capture group 1 always participates");
        out.push_str(&body[last..target.start()]);
        out.push_str(&copy_image(content, public, file, target.as_str())?);
        last = target.end();
    }
    out.push_str(&body[last..]);

    Ok(out)
}

fn is_external(target: &str) -> bool {
    target.contains("://")
        || target.starts_with("//")
        || target.starts_with('/')
        || target.starts_with("data:")
}

/// Copy one referenced image next to its page in the output tree and return
/// the rewritten reference.
fn copy_image(content: &Path, public: &Path, file: &Path, target: &str) -> Result<String> {
    if is_external(target) {
        return Ok(target.to_string());
    }

    let parent = file.parent().unwrap_or_else(|| Path::new(""));
    let source = normalize(&parent.join(target));

    if !source.is_file() {
        return Err(SiteError::MissingAsset {
            image: source,
            document: file.to_path_buf(),
        }
        .into());
    }

    let rel = source
        .strip_prefix(normalize(content))
        .with_context(|| {
            format!(
                "Image {} referenced by {} is outside the content directory",
                source.display(),
                file.display()
            )
        })?
        .to_path_buf();

    let dest = public.join(&rel);
    if let Some(dir) = dest.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    fs::copy(&source, &dest)
        .with_context(|| format!("Failed to copy {} to {}", source.display(), dest.display()))?;

    // Prefix with one `../` per output nesting level so the link resolves
    // from the generated HTML file's final location.
    let depth = calculate_depth(file, content);
    let rel_url = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");

    Ok(format!("{}{rel_url}", "../".repeat(depth)))
}

/// Copy the contents of `src` into `dest`, file by file. Directories are
/// merged at the destination root rather than nested under `src`'s name.
pub fn copy_tree_into(src: &Path, dest: &Path) -> Result<()> {
    for entry in WalkDir::new(src) {
        let entry = entry?;
        let rel = entry
            .path()
            .strip_prefix(src)
            .expect("walkdir yields paths under its root");
        if rel.as_os_str().is_empty() {
            continue;
        }

        let target = dest.join(rel);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)
                .with_context(|| format!("Failed to create {}", target.display()))?;
        } else {
            if let Some(dir) = target.parent() {
                fs::create_dir_all(dir)?;
            }
            fs::copy(entry.path(), &target).with_context(|| {
                format!(
                    "Failed to copy {} to {}",
                    entry.path().display(),
                    target.display()
                )
            })?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn setup() -> (TempDir, PathBuf, PathBuf) {
        let tmp = TempDir::new().unwrap();
        let content = tmp.path().join("content");
        let public = tmp.path().join("public");
        fs::create_dir_all(&content).unwrap();
        fs::create_dir_all(&public).unwrap();
        (tmp, content, public)
    }

    #[test]
    fn test_local_image_copied_and_rewritten() {
        let (_tmp, content, public) = setup();
        fs::create_dir_all(content.join("posts/img")).unwrap();
        fs::write(content.join("posts/img/photo.png"), b"png").unwrap();
        let file = content.join("posts/entry.md");
        fs::write(&file, "").unwrap();

        let body = "intro ![a photo](img/photo.png) outro";
        let out = copy_images_and_update_path(&content, &public, &file, body).unwrap();

        assert_eq!(out, "intro ![a photo](../posts/img/photo.png) outro");
        assert!(public.join("posts/img/photo.png").is_file());
    }

    #[test]
    fn test_image_at_content_root_has_no_prefix() {
        let (_tmp, content, public) = setup();
        fs::write(content.join("pic.png"), b"png").unwrap();
        let file = content.join("index.md");
        fs::write(&file, "").unwrap();

        let out =
            copy_images_and_update_path(&content, &public, &file, "![x](pic.png)").unwrap();

        assert_eq!(out, "![x](pic.png)");
        assert!(public.join("pic.png").is_file());
    }

    #[test]
    fn test_parent_relative_reference_resolves() {
        let (_tmp, content, public) = setup();
        fs::create_dir_all(content.join("shared")).unwrap();
        fs::create_dir_all(content.join("posts")).unwrap();
        fs::write(content.join("shared/logo.png"), b"png").unwrap();
        let file = content.join("posts/entry.md");
        fs::write(&file, "").unwrap();

        let out =
            copy_images_and_update_path(&content, &public, &file, "![l](../shared/logo.png)")
                .unwrap();

        assert_eq!(out, "![l](../shared/logo.png)");
        assert!(public.join("shared/logo.png").is_file());
    }

    #[test]
    fn test_external_urls_pass_through() {
        let (_tmp, content, public) = setup();
        let file = content.join("index.md");
        fs::write(&file, "").unwrap();

        let body = "![remote](https://example.com/a.png)";
        let out = copy_images_and_update_path(&content, &public, &file, body).unwrap();
        assert_eq!(out, body);
    }

    #[test]
    fn test_missing_image_is_fatal() {
        let (_tmp, content, public) = setup();
        let file = content.join("index.md");
        fs::write(&file, "").unwrap();

        let err = copy_images_and_update_path(&content, &public, &file, "![x](nope.png)")
            .unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("nope.png"));
        assert!(message.contains("index.md"));
    }

    #[test]
    fn test_copy_tree_merges_at_destination_root() {
        let (_tmp, content, public) = setup();
        let styles = content.parent().unwrap().join("styles");
        fs::create_dir_all(styles.join("fonts")).unwrap();
        fs::write(styles.join("style.css"), "body {}").unwrap();
        fs::write(styles.join("fonts/mono.woff2"), b"font").unwrap();

        copy_tree_into(&styles, &public).unwrap();

        assert!(public.join("style.css").is_file());
        assert!(public.join("fonts/mono.woff2").is_file());
        assert!(!public.join("styles").exists());
    }
}
