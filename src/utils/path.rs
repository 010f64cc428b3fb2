//! Filesystem path helpers.

use std::path::{Path, PathBuf};

/// Absolute form of `path`.
///
/// Canonicalizes when the path exists; otherwise an absolute path is kept
/// as-is and a relative one is joined to the current directory.
#[inline]
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        }
    })
}

/// Forward-slash form of `path` relative to `base`, as used for output keys.
pub fn relative_key(path: &Path, base: &Path) -> Option<String> {
    let relative = path.strip_prefix(base).ok()?;
    let parts: Vec<_> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect();
    (!parts.is_empty()).then(|| parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_is_absolute() {
        assert!(normalize_path(Path::new("/absolute/path/file.txt")).is_absolute());
        assert!(normalize_path(Path::new("relative/file.txt")).is_absolute());
    }

    #[test]
    fn test_normalize_missing_absolute_kept() {
        let path = Path::new("/definitely/not/here");
        assert_eq!(normalize_path(path), path);
    }

    #[test]
    fn test_relative_key() {
        let base = Path::new("/site/src");
        assert_eq!(
            relative_key(Path::new("/site/src/blog/post.md"), base).as_deref(),
            Some("blog/post.md")
        );
        assert_eq!(relative_key(Path::new("/site/src"), base), None);
        assert_eq!(relative_key(Path::new("/other/x.md"), base), None);
    }
}
