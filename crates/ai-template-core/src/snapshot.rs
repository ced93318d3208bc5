//! One-shot enumeration of the files under a project root.

use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{Result, TemplateError};

/// Directories skipped while scanning
pub const DEFAULT_EXCLUDED_DIRS: &[&str] = &[".git", "node_modules"];

/// File extensions skipped while scanning
pub const DEFAULT_IGNORED_EXTENSIONS: &[&str] = &["log"];

/// Rules deciding which paths are left out of a snapshot
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IgnoreRules {
    /// Directory names to exclude (checked against every path component)
    pub excluded_dirs: Vec<String>,
    /// Directory names to include even when excluded
    pub included_dirs: Vec<String>,
    /// File extensions to exclude
    pub ignored_extensions: Vec<String>,
}

impl IgnoreRules {
    /// Version control, dependency cache and log files
    pub fn with_defaults() -> Self {
        Self {
            excluded_dirs: DEFAULT_EXCLUDED_DIRS.iter().map(|s| s.to_string()).collect(),
            included_dirs: Vec::new(),
            ignored_extensions: DEFAULT_IGNORED_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    pub fn exclude(mut self, dir: impl Into<String>) -> Self {
        self.excluded_dirs.push(dir.into());
        self
    }

    pub fn include(mut self, dir: impl Into<String>) -> Self {
        self.included_dirs.push(dir.into());
        self
    }

    /// Check a path relative to the scan root
    pub fn should_ignore(&self, relative: &Path) -> bool {
        if let Some(ext) = relative.extension() {
            let ext = ext.to_string_lossy();
            if self.ignored_extensions.iter().any(|e| e == ext.as_ref()) {
                return true;
            }
        }

        // The last component is the file itself; only its parents are dirs
        let mut components: Vec<_> = relative.components().collect();
        components.pop();

        for component in components {
            if let Component::Normal(name) = component {
                let name = name.to_string_lossy();
                if self.included_dirs.iter().any(|d| d == name.as_ref()) {
                    continue;
                }
                if self.excluded_dirs.iter().any(|d| d == name.as_ref()) {
                    return true;
                }
            }
        }

        false
    }
}

/// The regular files found under a root, as `/`-separated relative paths
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSnapshot {
    root: PathBuf,
    files: BTreeSet<String>,
}

impl FileSnapshot {
    /// Walk `root` once, collecting every regular file not ignored by `rules`
    pub fn scan(root: &Path, rules: &IgnoreRules) -> Result<Self> {
        if !root.is_dir() {
            return Err(TemplateError::RootNotFound {
                path: root.to_path_buf(),
            });
        }

        let mut files = BTreeSet::new();

        let walker = WalkDir::new(root).into_iter().filter_entry(|entry| {
            // Prune excluded directories without descending into them
            if entry.depth() == 0 || !entry.file_type().is_dir() {
                return true;
            }
            let name = entry.file_name().to_string_lossy();
            rules.included_dirs.iter().any(|d| d == name.as_ref())
                || !rules.excluded_dirs.iter().any(|d| d == name.as_ref())
        });

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("skipping unreadable entry: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let relative = match entry.path().strip_prefix(root) {
                Ok(r) => r,
                Err(_) => continue,
            };
            if rules.should_ignore(relative) {
                continue;
            }

            files.insert(normalize(relative));
        }

        tracing::debug!(root = %root.display(), files = files.len(), "scanned project");

        Ok(Self {
            root: root.to_path_buf(),
            files,
        })
    }

    /// Build a snapshot from known paths (no file-system access)
    pub fn from_paths<I, S>(root: impl Into<PathBuf>, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            root: root.into(),
            files: paths
                .into_iter()
                .map(|p| p.as_ref().replace('\\', "/"))
                .collect(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Paths in sorted order
    pub fn files(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(|s| s.as_str())
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.contains(path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

fn normalize(relative: &Path) -> String {
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
