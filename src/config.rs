//! Fixed project directory layout.
//!
//! A hipertexto project always uses the same directory names relative to the
//! project root: `content/`, `templates/`, `static/`, `styles/` as inputs
//! and `public/` as the build output. There is no configuration file.

use std::path::{Path, PathBuf};

pub const CONTENT_DIR: &str = "content";
pub const TEMPLATES_DIR: &str = "templates";
pub const STATIC_DIR: &str = "static";
pub const STYLES_DIR: &str = "styles";
pub const PUBLIC_DIR: &str = "public";

/// The section index file name inside a content directory.
pub const SECTION_INDEX: &str = "_index.md";

/// Resolved project directories.
#[derive(Debug, Clone)]
pub struct SiteDirs {
    pub content: PathBuf,
    pub templates: PathBuf,
    pub static_dir: PathBuf,
    pub styles: PathBuf,
    pub public: PathBuf,
}

impl SiteDirs {
    pub fn from_root(root: &Path) -> Self {
        Self {
            content: root.join(CONTENT_DIR),
            templates: root.join(TEMPLATES_DIR),
            static_dir: root.join(STATIC_DIR),
            styles: root.join(STYLES_DIR),
            public: root.join(PUBLIC_DIR),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_root() {
        let dirs = SiteDirs::from_root(Path::new("/project"));
        assert_eq!(dirs.content, PathBuf::from("/project/content"));
        assert_eq!(dirs.templates, PathBuf::from("/project/templates"));
        assert_eq!(dirs.static_dir, PathBuf::from("/project/static"));
        assert_eq!(dirs.styles, PathBuf::from("/project/styles"));
        assert_eq!(dirs.public, PathBuf::from("/project/public"));
    }
}
