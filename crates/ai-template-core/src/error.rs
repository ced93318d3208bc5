use std::path::PathBuf;
use thiserror::Error;

/// A manifest schema violation.
///
/// The `Display` form is the exact message placed in a validation report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("Missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("Category '{category}' missing strategy")]
    MissingStrategy { category: String },

    #[error("Category '{category}' strategy must be a string")]
    StrategyNotString { category: String },

    #[error("Category '{category}' files must be an array")]
    FilesNotSequence { category: String },

    #[error("Category '{category}' is malformed")]
    MalformedCategory { category: String },
}

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Manifest file not found: {path}")]
    ManifestNotFound { path: PathBuf },

    #[error("Failed to parse manifest {path}: {message}")]
    ManifestParse { path: PathBuf, message: String },

    #[error("Invalid manifest: {}", join_schema_errors(.errors))]
    ManifestSchema { errors: Vec<SchemaError> },

    #[error("Project root does not exist: {path}")]
    RootNotFound { path: PathBuf },

    #[error("Category not found: {name}")]
    CategoryNotFound { name: String },

    #[error("Target directory is the template itself: {path}")]
    TargetIsTemplate { path: PathBuf },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TemplateError>;

fn join_schema_errors(errors: &[SchemaError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl TemplateError {
    /// Missing fields named by a `ManifestSchema` error, empty otherwise.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        match self {
            Self::ManifestSchema { errors } => errors
                .iter()
                .filter_map(|e| match e {
                    SchemaError::MissingField { field } => Some(*field),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }
}
