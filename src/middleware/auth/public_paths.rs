//! Public path patterns.
//!
//! - `/base/**` matches everything below `/base/` (not `/base` itself)
//! - anything else is an exact match
//!
//! Built once at startup, shared read-only by every request.

use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
enum PathPattern {
    /// Stored with its trailing `/`.
    Subtree(String),
    Exact(String),
}

impl PathPattern {
    fn parse(raw: &str) -> Self {
        match raw.strip_suffix("/**") {
            Some(base) => Self::Subtree(format!("{base}/")),
            None => Self::Exact(raw.to_string()),
        }
    }

    fn matches(&self, path: &str) -> bool {
        match self {
            Self::Exact(p) => path == p,
            Self::Subtree(base) => path.starts_with(base.as_str()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PublicPaths(Arc<[PathPattern]>);

impl PublicPaths {
    pub fn new<I, P>(patterns: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<str>,
    {
        Self(
            patterns
                .into_iter()
                .map(|p| PathPattern::parse(p.as_ref()))
                .collect(),
        )
    }

    pub fn matches(&self, path: &str) -> bool {
        self.0.iter().any(|p| p.matches(path))
    }
}
