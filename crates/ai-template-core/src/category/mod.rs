//! # Category Module
//!
//! Classifies the files of a project tree into the categories declared in a
//! template manifest.
//!
//! ## Module layout
//!
//! - `matcher`: glob pattern expansion over a file snapshot
//! - `categorizer`: per-file category membership, summaries, validation
//! - `result`: categorization data (listings, per-file categories, summary)
//! - `report`: validation report and warnings
//!
//! ## Example
//!
//! ```rust
//! use ai_template_core::category::FileCategorizer;
//! use ai_template_core::{FileSnapshot, Manifest};
//!
//! let manifest = Manifest::parse(r#"{
//!     "version": "1.0.0",
//!     "name": "demo",
//!     "templateVersion": "1.0.0",
//!     "categories": {
//!         "core": { "strategy": "replace", "files": ["CLAUDE.md"] }
//!     }
//! }"#).unwrap();
//!
//! let categorizer = FileCategorizer::new(manifest, "/project");
//! let snapshot = FileSnapshot::from_paths("/project", ["CLAUDE.md", "README.md"]);
//! let report = categorizer.validate_snapshot(&snapshot);
//!
//! assert!(report.valid);
//! assert_eq!(report.summary.get("core").unwrap().count, 1);
//! assert_eq!(report.uncategorized_count(), Some(1));
//! ```

mod categorizer;
mod matcher;
mod report;
mod result;

// Re-exports
pub use categorizer::{manifest_root, FileCategorizer, FileMatch};
pub use matcher::PatternMatcher;
pub use report::{ValidationReport, ValidationWarning};
pub use result::{CategoryCount, CategoryListing, CategorySummary, Categorization};
