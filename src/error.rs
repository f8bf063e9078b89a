//! Build error types.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal build errors. All of these abort the build; `main` formats them
/// with an `Error:` prefix and exits with status 1.
#[derive(Debug, Error)]
pub enum SiteError {
    #[error("{name} cannot be empty")]
    EmptyDirectory { name: &'static str },

    #[error("Missing frontmatter of file {}", file.display())]
    MissingFrontmatter { file: PathBuf },

    #[error("Frontmatter in {} missing keys: {}", file.display(), keys.join(", "))]
    MissingKeys {
        file: PathBuf,
        keys: Vec<&'static str>,
    },

    #[error("Malformed frontmatter in {}", file.display())]
    FrontmatterParse {
        file: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Template {name} not found")]
    TemplateNotFound { name: String },

    #[error("Image {} referenced by {} not found", image.display(), document.display())]
    MissingAsset { image: PathBuf, document: PathBuf },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_directory_display() {
        let err = SiteError::EmptyDirectory { name: "Content" };
        assert_eq!(format!("{err}"), "Content cannot be empty");
    }

    #[test]
    fn test_missing_keys_display() {
        let err = SiteError::MissingKeys {
            file: PathBuf::from("content/post.md"),
            keys: vec!["title", "template"],
        };
        let display = format!("{err}");
        assert!(display.contains("content/post.md"));
        assert!(display.contains("title, template"));
    }

    #[test]
    fn test_template_not_found_display() {
        let err = SiteError::TemplateNotFound {
            name: "base.html".to_string(),
        };
        assert_eq!(format!("{err}"), "Template base.html not found");
    }
}
