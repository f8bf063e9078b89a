//! Project scaffolding.
//!
//! Creates the fixed directory structure a new site starts from.

use crate::config::{CONTENT_DIR, STATIC_DIR, STYLES_DIR, TEMPLATES_DIR};
use crate::log;
use anyhow::{Context, Result, bail};
use std::fs;
use std::path::Path;

const PROJECT_DIRS: &[&str] = &[CONTENT_DIR, TEMPLATES_DIR, STATIC_DIR, STYLES_DIR];

/// Create a new project directory under `root`.
pub fn new_project(root: &Path, name: &str) -> Result<()> {
    let project = root.join(name);
    if project.exists() {
        bail!("File {name} already exists");
    }

    fs::create_dir(&project)
        .with_context(|| format!("Failed to create {}", project.display()))?;
    for dir in PROJECT_DIRS {
        fs::create_dir(project.join(dir))
            .with_context(|| format!("Failed to create {name}/{dir}"))?;
    }

    log!("init"; "Project {name} created successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_new_project_creates_structure() {
        let tmp = TempDir::new().unwrap();
        new_project(tmp.path(), "site").unwrap();

        for dir in ["content", "templates", "static", "styles"] {
            assert!(tmp.path().join("site").join(dir).is_dir(), "missing {dir}");
        }
    }

    #[test]
    fn test_new_project_existing_target_fails() {
        let tmp = TempDir::new().unwrap();
        new_project(tmp.path(), "site").unwrap();

        let err = new_project(tmp.path(), "site").unwrap_err();
        assert_eq!(format!("{err}"), "File site already exists");
    }
}
