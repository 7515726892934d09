//! Ignore rules loaded from a project-level `.twigignore` file.
//!
//! Blank lines and lines starting with `#` are skipped. A pattern ending in
//! `/` matches only as a directory prefix; any other pattern matches a path
//! exactly or as a leading path segment.

use std::path::Path;

pub const IGNORE_FILE_NAME: &str = ".twigignore";

#[derive(Debug, Clone, Default)]
pub struct IgnoreRules {
    patterns: Vec<String>,
}

impl IgnoreRules {
    /// Load patterns from `<root>/.twigignore`; a missing file means no rules.
    pub fn load(root: &Path) -> Self {
        let content = std::fs::read_to_string(root.join(IGNORE_FILE_NAME)).unwrap_or_default();
        Self::from_patterns(content.lines().map(str::to_string))
    }

    pub fn from_patterns(patterns: impl Iterator<Item = String>) -> Self {
        IgnoreRules {
            patterns: patterns
                .map(|line| line.trim().to_string())
                .filter(|line| !line.is_empty() && !line.starts_with('#'))
                .collect(),
        }
    }

    /// Check a repo-relative path against the loaded patterns.
    pub fn is_ignored(&self, relative_path: &Path) -> bool {
        let path = relative_path.to_string_lossy();

        self.patterns.iter().any(|pattern| {
            if let Some(dir_pattern) = pattern.strip_suffix('/') {
                path == dir_pattern || path.starts_with(pattern)
            } else {
                path == *pattern || path.starts_with(&format!("{pattern}/"))
            }
        })
    }
}
