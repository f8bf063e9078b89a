//! Path helpers for depth calculation and lexical normalization.

use std::path::{Component, Path, PathBuf};

/// Number of directory levels between `file`'s parent and `root`.
///
/// Zero when the file sits directly under `root`. Callers pass the content
/// root, so the result equals the nesting level of the generated HTML file
/// inside the output tree and can be turned into a `../` prefix.
pub fn calculate_depth(file: &Path, root: &Path) -> usize {
    file.parent()
        .and_then(|parent| parent.strip_prefix(root).ok())
        .map(|rel| rel.components().count())
        .unwrap_or(0)
}

/// Resolve `.` and `..` components lexically, without touching the
/// filesystem. Leading `..` components that cannot be popped are kept.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_zero_directly_under_root() {
        assert_eq!(
            calculate_depth(Path::new("content/index.md"), Path::new("content")),
            0
        );
    }

    #[test]
    fn test_depth_increases_per_level() {
        assert_eq!(
            calculate_depth(Path::new("content/inner/other.md"), Path::new("content")),
            1
        );
        assert_eq!(
            calculate_depth(Path::new("content/a/b/deep.md"), Path::new("content")),
            2
        );
    }

    #[test]
    fn test_depth_outside_root_is_zero() {
        assert_eq!(
            calculate_depth(Path::new("elsewhere/file.md"), Path::new("content")),
            0
        );
    }

    #[test]
    fn test_normalize_resolves_parent_dirs() {
        assert_eq!(
            normalize(Path::new("content/inner/../img/pic.png")),
            PathBuf::from("content/img/pic.png")
        );
    }

    #[test]
    fn test_normalize_drops_cur_dirs() {
        assert_eq!(
            normalize(Path::new("./content/./index.md")),
            PathBuf::from("content/index.md")
        );
    }

    #[test]
    fn test_normalize_keeps_leading_parent_dirs() {
        assert_eq!(normalize(Path::new("../shared/x")), PathBuf::from("../shared/x"));
    }
}
