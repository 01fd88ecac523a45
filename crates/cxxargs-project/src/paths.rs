//! Path helpers and the normalization strategies used during cleanup.
//!
//! Paths are handled as strings throughout: build directories are joined to
//! relative arguments by concatenation, and inference scores compare raw
//! characters.

use std::path::Path;

/// Turns a concatenated path into its canonical spelling.
pub trait PathNormalizer: Send + Sync {
    fn normalize(&self, path: &str) -> String;
}

/// Collapses `.`, `..` and repeated separators without touching the disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lexical;

/// Resolves symlinks through the filesystem, falling back to [`Lexical`]
/// for paths that do not exist.
#[derive(Debug, Clone, Copy, Default)]
pub struct Canonical;

/// Leaves paths exactly as given.
#[derive(Debug, Clone, Copy, Default)]
pub struct Verbatim;

impl PathNormalizer for Lexical {
    fn normalize(&self, path: &str) -> String {
        normalize_lexically(path)
    }
}

impl PathNormalizer for Canonical {
    fn normalize(&self, path: &str) -> String {
        match std::fs::canonicalize(path) {
            Ok(resolved) => match resolved.to_str() {
                Some(s) => s.replace('\\', "/"),
                None => normalize_lexically(path),
            },
            Err(_) => normalize_lexically(path),
        }
    }
}

impl PathNormalizer for Verbatim {
    fn normalize(&self, path: &str) -> String {
        path.to_string()
    }
}

/// Purely textual normalization.
///
/// `..` never climbs above the root of an absolute path; leading `..`
/// segments of a relative path are kept.
pub fn normalize_lexically(path: &str) -> String {
    let absolute = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match parts.last().copied() {
                Some("..") | None if !absolute => parts.push(".."),
                Some("..") | None => {}
                Some(_) => {
                    parts.pop();
                }
            },
            other => parts.push(other),
        }
    }

    let joined = parts.join("/");
    if absolute {
        format!("/{}", joined)
    } else if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}

/// Appends a trailing `/` unless one is already present.
pub fn ensure_ends_in_slash(path: &mut String) {
    if !path.ends_with('/') {
        path.push('/');
    }
}

/// Returns true for `/...` paths and Windows drive paths like `C:/...`.
pub fn is_absolute_path(path: &str) -> bool {
    if path.starts_with('/') {
        return true;
    }
    let bytes = path.as_bytes();
    bytes.len() >= 3
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && (bytes[2] == b'/' || bytes[2] == b'\\')
}

/// Lossy `&Path` to `String` with forward slashes.
pub fn path_to_string(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_parent_segments() {
        assert_eq!(
            normalize_lexically("/work2/chrome/src/out/Release/../.."),
            "/work2/chrome/src"
        );
        assert_eq!(
            normalize_lexically("/work2/chrome/src/out/Release/../../build/x"),
            "/work2/chrome/src/build/x"
        );
        assert_eq!(normalize_lexically("/base/./gen//foo"), "/base/gen/foo");
    }

    #[test]
    fn test_parent_never_escapes_root() {
        assert_eq!(normalize_lexically("/../../a"), "/a");
        assert_eq!(normalize_lexically("/a/.."), "/");
    }

    #[test]
    fn test_relative_paths_keep_leading_parents() {
        assert_eq!(normalize_lexically("../x/../y"), "../y");
        assert_eq!(normalize_lexically("a/.."), ".");
    }

    #[test]
    fn test_absolute_detection() {
        assert!(is_absolute_path("/usr/include"));
        assert!(is_absolute_path("C:/work"));
        assert!(!is_absolute_path("../include"));
        assert!(!is_absolute_path("gen"));
        assert!(!is_absolute_path(""));
    }

    #[test]
    fn test_ensure_slash() {
        let mut dir = "/build".to_string();
        ensure_ends_in_slash(&mut dir);
        assert_eq!(dir, "/build/");
        ensure_ends_in_slash(&mut dir);
        assert_eq!(dir, "/build/");
    }

    #[cfg(unix)]
    #[test]
    fn test_canonical_resolves_symlinks() {
        let dir = tempfile::tempdir().unwrap();
        let real = dir.path().join("real");
        std::fs::create_dir(&real).unwrap();
        std::fs::write(real.join("a.cc"), "").unwrap();
        let link = dir.path().join("link");
        std::os::unix::fs::symlink(&real, &link).unwrap();

        let expected = path_to_string(&real.canonicalize().unwrap().join("a.cc"));
        let through_link = format!("{}/./a.cc", path_to_string(&link));
        assert_eq!(Canonical.normalize(&through_link), expected);
    }

    #[test]
    fn test_canonical_falls_back_for_missing_paths() {
        assert_eq!(
            Canonical.normalize("/no/such/dir/../file.cc"),
            "/no/such/file.cc"
        );
    }

    #[test]
    fn test_verbatim_is_identity() {
        assert_eq!(Verbatim.normalize("/a/../b"), "/a/../b");
    }
}
