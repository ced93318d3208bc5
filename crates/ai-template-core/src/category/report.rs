//! Validation report

use std::fmt;

use crate::error::SchemaError;

use super::result::{Categorization, CategorySummary};

/// A non-fatal finding
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationWarning {
    /// A file matched by two or more categories, listed in manifest order
    Overlap {
        path: String,
        categories: Vec<String>,
    },
    /// Files matched by no category (one aggregate entry)
    Uncategorized { count: usize },
}

impl ValidationWarning {
    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overlap { path, categories } => write!(
                f,
                "File '{}' matches multiple categories: {}",
                path,
                categories.join(", ")
            ),
            Self::Uncategorized { count } => write!(f, "{} files are not categorized", count),
        }
    }
}

/// Outcome of validating a manifest against a project tree
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// True iff `errors` is empty
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<ValidationWarning>,
    pub summary: CategorySummary,
    /// Underlying data, including the individual uncategorized paths
    pub categorization: Categorization,
}

impl ValidationReport {
    pub fn new(schema_errors: &[SchemaError], categorization: Categorization) -> Self {
        let errors: Vec<String> = schema_errors.iter().map(|e| e.to_string()).collect();

        let mut warnings: Vec<ValidationWarning> = categorization
            .overlaps()
            .map(|(path, categories)| ValidationWarning::Overlap {
                path: path.to_string(),
                categories: categories.to_vec(),
            })
            .collect();

        let uncategorized = categorization.uncategorized().len();
        if uncategorized > 0 {
            warnings.push(ValidationWarning::Uncategorized {
                count: uncategorized,
            });
        }

        Self {
            valid: errors.is_empty(),
            errors,
            warnings,
            summary: categorization.summary(),
            categorization,
        }
    }

    /// Overlap warnings as (path, categories)
    pub fn overlaps(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.warnings.iter().filter_map(|w| match w {
            ValidationWarning::Overlap { path, categories } => {
                Some((path.as_str(), categories.as_slice()))
            }
            ValidationWarning::Uncategorized { .. } => None,
        })
    }

    /// Count carried by the uncategorized warning, if one was emitted
    pub fn uncategorized_count(&self) -> Option<usize> {
        self.warnings.iter().find_map(|w| match w {
            ValidationWarning::Uncategorized { count } => Some(*count),
            ValidationWarning::Overlap { .. } => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::result::CategoryListing;
    use crate::snapshot::FileSnapshot;

    fn categorization(listings: &[(&str, Vec<&str>)], files: &[&str]) -> Categorization {
        let snapshot = FileSnapshot::from_paths("/p", files.iter().copied());
        let listings = listings
            .iter()
            .map(|(name, matched)| CategoryListing {
                name: name.to_string(),
                strategy: "replace".to_string(),
                description: String::new(),
                files: matched.iter().map(|s| s.to_string()).collect(),
            })
            .collect();
        Categorization::new(listings, &snapshot)
    }

    #[test]
    fn warning_messages() {
        let w = ValidationWarning::Overlap {
            path: "src/docs/readme.txt".to_string(),
            categories: vec!["core".to_string(), "reference".to_string()],
        };
        assert_eq!(
            w.message(),
            "File 'src/docs/readme.txt' matches multiple categories: core, reference"
        );
        assert_eq!(
            ValidationWarning::Uncategorized { count: 4 }.message(),
            "4 files are not categorized"
        );
    }

    #[test]
    fn warnings_never_affect_validity() {
        let report = ValidationReport::new(
            &[],
            categorization(&[("a", vec!["x"]), ("b", vec!["x"])], &["x", "y"]),
        );
        assert!(report.valid);
        assert_eq!(report.warnings.len(), 2);
        assert_eq!(report.uncategorized_count(), Some(1));
        assert_eq!(report.overlaps().count(), 1);
    }

    #[test]
    fn errors_make_report_invalid() {
        let report = ValidationReport::new(
            &[SchemaError::MissingStrategy {
                category: "a".to_string(),
            }],
            categorization(&[("a", vec!["x"])], &["x"]),
        );
        assert!(!report.valid);
        assert_eq!(report.errors, vec!["Category 'a' missing strategy"]);
        assert!(report.warnings.is_empty());
        assert_eq!(report.uncategorized_count(), None);
    }
}
