//! Manifest validation
//!
//! Runs the schema checks and the categorization pass over a manifest that
//! may be incomplete, keeping the results around for reporting.

use std::path::{Path, PathBuf};

use crate::category::{
    manifest_root, CategoryListing, CategorySummary, FileCategorizer, ValidationReport,
    ValidationWarning,
};
use crate::error::Result;
use crate::manifest::Manifest;
use crate::snapshot::IgnoreRules;

pub struct ManifestValidator {
    manifest_path: PathBuf,
    root: Option<PathBuf>,
    rules: IgnoreRules,
    categorizer: Option<FileCategorizer>,
    report: Option<ValidationReport>,
}

impl ManifestValidator {
    pub fn new(manifest_path: impl Into<PathBuf>) -> Self {
        Self {
            manifest_path: manifest_path.into(),
            root: None,
            rules: IgnoreRules::with_defaults(),
            categorizer: None,
            report: None,
        }
    }

    /// Scan `root` instead of the manifest's directory
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    pub fn with_ignore_rules(mut self, rules: IgnoreRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn manifest_path(&self) -> &Path {
        &self.manifest_path
    }

    /// Validate the manifest and the project tree.
    ///
    /// Returns `Ok(true)` when no schema errors were found. A manifest that is
    /// missing or not valid JSON is an `Err`; missing fields are not.
    pub fn validate(&mut self) -> Result<bool> {
        let manifest = Manifest::read(&self.manifest_path)?;
        tracing::debug!(
            name = manifest.name(),
            version = manifest.template_version(),
            "loaded manifest"
        );

        let root = self
            .root
            .clone()
            .unwrap_or_else(|| manifest_root(&self.manifest_path));
        let categorizer = FileCategorizer::new(manifest, root).with_ignore_rules(self.rules.clone());
        let report = categorizer.validate_categorization()?;
        let valid = report.valid;

        self.categorizer = Some(categorizer);
        self.report = Some(report);
        Ok(valid)
    }

    pub fn manifest(&self) -> Option<&Manifest> {
        self.categorizer.as_ref().map(|c| c.manifest())
    }

    pub fn report(&self) -> Option<&ValidationReport> {
        self.report.as_ref()
    }

    pub fn errors(&self) -> &[String] {
        self.report.as_ref().map(|r| r.errors.as_slice()).unwrap_or_default()
    }

    pub fn warnings(&self) -> &[ValidationWarning] {
        self.report
            .as_ref()
            .map(|r| r.warnings.as_slice())
            .unwrap_or_default()
    }

    pub fn summary(&self) -> Option<&CategorySummary> {
        self.report.as_ref().map(|r| &r.summary)
    }

    /// Full per-category file listings in manifest order
    pub fn listings(&self) -> &[CategoryListing] {
        self.report
            .as_ref()
            .map(|r| r.categorization.listings())
            .unwrap_or_default()
    }

    pub fn uncategorized(&self) -> &[String] {
        self.report
            .as_ref()
            .map(|r| r.categorization.uncategorized())
            .unwrap_or_default()
    }
}
