//! Include/exclude path predicates used to pick the files to index.

use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::error::Result;

/// Decides whether a project file should be handed to the indexer.
pub trait PathPredicate {
    /// `Ok(())` to accept, `Err(reason)` to skip the path.
    fn check(&self, path: &str) -> std::result::Result<(), String>;
}

impl<F> PathPredicate for F
where
    F: Fn(&str) -> std::result::Result<(), String>,
{
    fn check(&self, path: &str) -> std::result::Result<(), String> {
        self(path)
    }
}

/// Accepts every path.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl PathPredicate for AcceptAll {
    fn check(&self, _path: &str) -> std::result::Result<(), String> {
        Ok(())
    }
}

/// Whitelist/blacklist glob matcher.
///
/// A whitelist match always accepts; otherwise a blacklist match rejects;
/// anything matching neither list is accepted.
#[derive(Debug, Clone)]
pub struct GroupMatch {
    whitelist: GlobSet,
    blacklist: GlobSet,
    blacklist_patterns: Vec<String>,
}

impl GroupMatch {
    pub fn new(whitelist: &[String], blacklist: &[String]) -> Result<Self> {
        Ok(Self {
            whitelist: build_set(whitelist)?,
            blacklist: build_set(blacklist)?,
            blacklist_patterns: blacklist.to_vec(),
        })
    }

    pub fn is_match(&self, path: &str) -> bool {
        self.check(path).is_ok()
    }
}

impl PathPredicate for GroupMatch {
    fn check(&self, path: &str) -> std::result::Result<(), String> {
        if self.whitelist.is_match(path) {
            return Ok(());
        }
        match self.blacklist.matches(path).first() {
            Some(&index) => Err(format!("blacklist \"{}\"", self.blacklist_patterns[index])),
            None => Ok(()),
        }
    }
}

fn build_set(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProjectError;

    fn patterns(p: &[&str]) -> Vec<String> {
        p.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_lists_accept_everything() {
        let matcher = GroupMatch::new(&[], &[]).unwrap();
        assert!(matcher.is_match("/src/a.cc"));
    }

    #[test]
    fn test_blacklist_rejects_with_reason() {
        let matcher = GroupMatch::new(&[], &patterns(&["**/third_party/**"])).unwrap();
        assert!(matcher.is_match("/src/base/a.cc"));
        assert_eq!(
            matcher.check("/src/third_party/zlib/z.c"),
            Err("blacklist \"**/third_party/**\"".to_string())
        );
    }

    #[test]
    fn test_whitelist_overrides_blacklist() {
        let matcher = GroupMatch::new(
            &patterns(&["**/third_party/blink/**"]),
            &patterns(&["**/third_party/**"]),
        )
        .unwrap();
        assert!(matcher.is_match("/src/third_party/blink/a.cc"));
        assert!(!matcher.is_match("/src/third_party/skia/a.cc"));
    }

    #[test]
    fn test_invalid_pattern() {
        let err = GroupMatch::new(&patterns(&["a/[b"]), &[]).unwrap_err();
        assert!(matches!(err, ProjectError::InvalidPattern(_)));
    }

    #[test]
    fn test_closure_predicate() {
        let only_cc = |path: &str| {
            if path.ends_with(".cc") {
                Ok(())
            } else {
                Err("not a .cc file".to_string())
            }
        };
        assert!(only_cc.check("a.cc").is_ok());
        assert!(only_cc.check("a.c").is_err());
    }
}
