//! Image reference matching.
//!
//! An image reference is a string of the form `repository[:tag]`. Two
//! references name the same repository when their repository portions are
//! equal, irrespective of tag.

use anyhow::{Context, Result};
use regex::Regex;

/// A target image repository and tag, with a compiled matcher for existing
/// references to the same repository.
///
/// The matcher accepts the bare repository (no tag), the repository with any
/// tag, and optional surrounding whitespace. A reference to a different
/// repository never matches, even if the target repository is a prefix of it.
#[derive(Debug, Clone)]
pub struct ImageRule {
    repository: String,
    tag: String,
    matcher: Regex,
}

impl ImageRule {
    pub fn new(repository: &str, tag: &str) -> Result<Self> {
        let pattern = format!(r"^\s*{}(:\S+)?\s*$", regex::escape(repository));
        let matcher = Regex::new(&pattern)
            .with_context(|| format!("compile image matcher for repository {repository:?}"))?;
        Ok(Self {
            repository: repository.to_string(),
            tag: tag.to_string(),
            matcher,
        })
    }

    /// The full reference this rule rewrites matches to: `repository:tag`.
    pub fn full_name(&self) -> String {
        format!("{}:{}", self.repository, self.tag)
    }

    /// Whether `candidate` references this rule's repository (any tag or none).
    pub fn matches(&self, candidate: &str) -> bool {
        self.matcher.is_match(candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule() -> ImageRule {
        ImageRule::new("gcr.io/project/app", "v2").expect("rule")
    }

    #[test]
    fn matches_bare_repository() {
        assert!(rule().matches("gcr.io/project/app"));
    }

    #[test]
    fn matches_any_tag() {
        assert!(rule().matches("gcr.io/project/app:latest"));
        assert!(rule().matches("gcr.io/project/app:v1.2.3"));
    }

    #[test]
    fn matches_with_surrounding_whitespace() {
        assert!(rule().matches("  gcr.io/project/app:old  "));
    }

    #[test]
    fn rejects_other_repository() {
        assert!(!rule().matches("gcr.io/project/other:v2"));
        assert!(!rule().matches("gcr.io/project/app-canary:v2"));
    }

    #[test]
    fn rejects_tag_with_whitespace() {
        assert!(!rule().matches("gcr.io/project/app: v2"));
    }

    #[test]
    fn repository_dots_are_literal() {
        // `gcr.io` must not match `gcrxio` through the regex dot.
        assert!(!rule().matches("gcrxio/project/app:v1"));
    }

    #[test]
    fn full_name_joins_repository_and_tag() {
        assert_eq!(rule().full_name(), "gcr.io/project/app:v2");
    }
}
