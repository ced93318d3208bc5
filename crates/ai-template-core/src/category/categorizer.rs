//! File Categorizer
//!
//! Assigns every file under a project root to the manifest categories whose
//! patterns match it.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::error::{Result, TemplateError};
use crate::manifest::Manifest;
use crate::snapshot::{FileSnapshot, IgnoreRules};

use super::matcher::PatternMatcher;
use super::report::ValidationReport;
use super::result::{listing_from_set, CategorySummary, Categorization};

/// Where a single file landed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMatch {
    pub category: String,
    pub strategy: String,
    pub description: String,
    /// The first pattern of the category that matched
    pub pattern: String,
    pub backup: bool,
}

/// Compiled patterns of one category
#[derive(Debug, Clone)]
struct CompiledCategory {
    name: String,
    patterns: Vec<(String, PatternMatcher)>,
}

/// Categorizer over one manifest and one project root
#[derive(Debug, Clone)]
pub struct FileCategorizer {
    manifest: Manifest,
    root: PathBuf,
    rules: IgnoreRules,
    compiled: Vec<CompiledCategory>,
}

impl FileCategorizer {
    /// Create a categorizer for `root` using default ignore rules
    pub fn new(manifest: Manifest, root: impl Into<PathBuf>) -> Self {
        let compiled = manifest
            .categories()
            .map(|cat| CompiledCategory {
                name: cat.name.clone(),
                patterns: cat
                    .patterns()
                    .iter()
                    .map(|p| (p.clone(), PatternMatcher::new(p)))
                    .collect(),
            })
            .collect();

        Self {
            manifest,
            root: root.into(),
            rules: IgnoreRules::with_defaults(),
            compiled,
        }
    }

    /// Load the manifest strictly; its directory becomes the project root
    pub fn open(manifest_path: &Path) -> Result<Self> {
        let manifest = Manifest::load(manifest_path)?;
        Ok(Self::new(manifest, manifest_root(manifest_path)))
    }

    pub fn with_ignore_rules(mut self, rules: IgnoreRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Enumerate the project files
    pub fn snapshot(&self) -> Result<FileSnapshot> {
        FileSnapshot::scan(&self.root, &self.rules)
    }

    /// Categorize an already taken snapshot
    pub fn categorize_snapshot(&self, snapshot: &FileSnapshot) -> Categorization {
        let listings = self
            .compiled
            .iter()
            .map(|compiled| {
                let mut matched = BTreeSet::new();
                for (_, matcher) in &compiled.patterns {
                    matched.extend(matcher.expand_compiled(snapshot));
                }
                tracing::debug!(category = %compiled.name, files = matched.len(), "matched category");

                let category = self.manifest.category(&compiled.name);
                listing_from_set(
                    &compiled.name,
                    category.map(|c| c.strategy()).unwrap_or_default(),
                    category.map(|c| c.description.as_str()).unwrap_or_default(),
                    matched,
                )
            })
            .collect();

        Categorization::new(listings, snapshot)
    }

    pub fn categorize(&self) -> Result<Categorization> {
        Ok(self.categorize_snapshot(&self.snapshot()?))
    }

    /// Distinct matched files and strategy per category
    pub fn get_category_summary(&self) -> Result<CategorySummary> {
        Ok(self.categorize()?.summary())
    }

    /// Schema re-check, one scan, categorization and warnings
    pub fn validate_categorization(&self) -> Result<ValidationReport> {
        let snapshot = self.snapshot()?;
        Ok(self.validate_snapshot(&snapshot))
    }

    pub fn validate_snapshot(&self, snapshot: &FileSnapshot) -> ValidationReport {
        let schema_errors = self.manifest.schema_errors();
        ValidationReport::new(&schema_errors, self.categorize_snapshot(snapshot))
    }

    /// First category (in manifest order) matching `path`
    pub fn categorize_file(&self, path: &str) -> Option<FileMatch> {
        let path = path.replace('\\', "/");

        for compiled in &self.compiled {
            let hit = compiled.patterns.iter().find(|(_, m)| m.is_match(&path));
            if let Some((pattern, _)) = hit {
                let category = self.manifest.category(&compiled.name)?;
                return Some(FileMatch {
                    category: compiled.name.clone(),
                    strategy: category.strategy().to_string(),
                    description: category.description.clone(),
                    pattern: pattern.clone(),
                    backup: category.backup,
                });
            }
        }

        None
    }

    /// First pattern of `category` matching `path`
    pub fn matching_pattern(&self, category: &str, path: &str) -> Option<&str> {
        let path = path.replace('\\', "/");
        self.compiled
            .iter()
            .find(|c| c.name == category)?
            .patterns
            .iter()
            .find(|(_, m)| m.is_match(&path))
            .map(|(p, _)| p.as_str())
    }

    /// All project files in a category
    pub fn files_in_category(&self, name: &str) -> Result<Vec<String>> {
        if self.manifest.category(name).is_none() {
            return Err(TemplateError::CategoryNotFound {
                name: name.to_string(),
            });
        }

        let categorization = self.categorize()?;
        Ok(categorization
            .listing(name)
            .map(|l| l.files.clone())
            .unwrap_or_default())
    }
}

/// Directory holding the manifest (current directory for a bare file name)
pub fn manifest_root(manifest_path: &Path) -> PathBuf {
    match manifest_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
