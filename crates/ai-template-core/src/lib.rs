pub mod category;
pub mod error;
pub mod init;
pub mod manifest;
pub mod snapshot;
pub mod validator;

pub use error::{Result, SchemaError, TemplateError};
pub use init::{InitAction, InitOptions, InitPlan, InitResult, PlannedFile, TemplateInitializer};
pub use manifest::{Category, Manifest, PatternList, DEFAULT_MANIFEST_FILE};
pub use snapshot::{FileSnapshot, IgnoreRules};
pub use validator::ManifestValidator;

// Category system
pub use category::{
    CategoryCount, CategoryListing, CategorySummary, Categorization, FileCategorizer, FileMatch,
    PatternMatcher, ValidationReport, ValidationWarning,
};
