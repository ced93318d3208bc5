//! Glob pattern matching against a file snapshot

use std::collections::BTreeSet;

use glob::{MatchOptions, Pattern};

use crate::snapshot::FileSnapshot;

/// `*` stays within one segment; wildcards may match leading dots
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// A single compiled manifest pattern
#[derive(Debug, Clone)]
pub enum PatternMatcher {
    /// `docs/`: every file nested below the directory
    Directory(String),
    Glob(Pattern),
    /// Pattern that failed to compile; matches nothing
    Invalid,
}

impl PatternMatcher {
    pub fn new(pattern: &str) -> Self {
        if let Some(dir) = pattern.strip_suffix('/') {
            let dir = dir.trim_end_matches('/');
            return Self::Directory(format!("{}/", dir));
        }

        // `dir/**` with a literal prefix is the same as `dir/`
        if let Some(dir) = pattern.strip_suffix("/**") {
            if !dir.is_empty() && !dir.contains(['*', '?', '[']) {
                return Self::Directory(format!("{}/", dir));
            }
        }

        match Pattern::new(pattern) {
            Ok(p) => Self::Glob(p),
            Err(e) => {
                tracing::debug!(pattern, error = %e, "ignoring malformed pattern");
                Self::Invalid
            }
        }
    }

    /// Test a `/`-separated relative path
    pub fn is_match(&self, path: &str) -> bool {
        match self {
            Self::Directory(prefix) => path.starts_with(prefix.as_str()),
            Self::Glob(p) => p.matches_with(path, MATCH_OPTIONS),
            Self::Invalid => false,
        }
    }

    /// Every snapshot file matching this pattern
    pub fn expand_compiled(&self, snapshot: &FileSnapshot) -> BTreeSet<String> {
        snapshot
            .files()
            .filter(|f| self.is_match(f))
            .map(str::to_string)
            .collect()
    }

    /// Expand `pattern` against `snapshot`.
    ///
    /// Malformed patterns yield an empty set.
    pub fn expand(pattern: &str, snapshot: &FileSnapshot) -> BTreeSet<String> {
        Self::new(pattern).expand_compiled(snapshot)
    }

    /// Single path query
    pub fn matches(pattern: &str, path: &str) -> bool {
        Self::new(pattern).is_match(&path.replace('\\', "/"))
    }
}
