//! Template manifest parsing for `.template-manifest.json`
//!
//! The manifest maps category names to a handling strategy and an ordered
//! list of glob patterns. Category names and strategies are open strings:
//! new categories are added by editing the manifest, not the code.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, SchemaError, TemplateError};

/// Default manifest file name, looked up in the project root
pub const DEFAULT_MANIFEST_FILE: &str = ".template-manifest.json";

/// Fields that must be present for a strict load to succeed
const LOAD_REQUIRED_FIELDS: &[&str] = &["name", "templateVersion", "categories"];

/// Template manifest
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// Manifest format version
    #[serde(default)]
    pub version: Option<String>,

    /// Template name
    #[serde(default)]
    pub name: Option<String>,

    /// Template release version
    #[serde(default)]
    pub template_version: Option<String>,

    /// Minimum compatible template version
    #[serde(default)]
    pub compatibility_version: Option<String>,

    /// Template description
    #[serde(default)]
    pub description: Option<String>,

    /// Categories in declaration order
    #[serde(default)]
    pub categories: Option<IndexMap<String, Category>>,

    /// Feature flags
    #[serde(default)]
    pub features: IndexMap<String, bool>,

    /// Tool dependencies (name -> version requirement)
    #[serde(default)]
    pub dependencies: IndexMap<String, String>,
}

/// A named bucket of files sharing a handling strategy.
///
/// Entries are read leniently: wrong-typed values are kept (or flagged) so
/// the schema pass can report them per category instead of the whole
/// manifest failing to parse.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct Category {
    /// Category name (the key in `categories`)
    #[serde(skip)]
    pub name: String,

    /// Handling directive, reported but not interpreted by the categorizer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<Value>,

    pub description: String,

    /// Glob patterns
    pub files: PatternList,

    /// Whether existing files should be backed up before being replaced
    pub backup: bool,

    /// The entry was not a JSON object
    #[serde(skip)]
    pub malformed: bool,
}

impl From<Value> for Category {
    fn from(value: Value) -> Self {
        let Value::Object(mut entry) = value else {
            return Self {
                malformed: true,
                ..Default::default()
            };
        };

        Self {
            name: String::new(),
            strategy: entry.remove("strategy").filter(|v| !v.is_null()),
            description: entry
                .remove("description")
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_default(),
            files: entry.remove("files").map(PatternList::from).unwrap_or_default(),
            backup: entry.get("backup").and_then(Value::as_bool).unwrap_or(false),
            malformed: false,
        }
    }
}

/// The `files` entry of a category.
///
/// Anything other than a sequence of strings is kept as `Malformed`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PatternList {
    #[default]
    Missing,
    Patterns(Vec<String>),
    Malformed(Value),
}

impl From<Value> for PatternList {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => PatternList::Missing,
            Value::Array(items) if items.iter().all(Value::is_string) => PatternList::Patterns(
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect(),
            ),
            other => PatternList::Malformed(other),
        }
    }
}

impl PatternList {
    /// Patterns usable for matching (empty unless well-formed)
    pub fn patterns(&self) -> &[String] {
        match self {
            PatternList::Patterns(p) => p,
            PatternList::Missing | PatternList::Malformed(_) => &[],
        }
    }

    /// Whether this is a well-formed sequence
    pub fn is_sequence(&self) -> bool {
        matches!(self, PatternList::Patterns(_))
    }
}

impl Category {
    /// Strategy label, empty when missing or not a string
    pub fn strategy(&self) -> &str {
        self.strategy
            .as_ref()
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    pub fn patterns(&self) -> &[String] {
        self.files.patterns()
    }

    /// Schema violations for this category
    pub fn schema_errors(&self) -> Vec<SchemaError> {
        let category = || self.name.clone();

        if self.malformed {
            return vec![SchemaError::MalformedCategory {
                category: category(),
            }];
        }

        let mut errors = Vec::new();
        match &self.strategy {
            Some(Value::String(s)) if !s.is_empty() => {}
            Some(Value::String(_)) | None => errors.push(SchemaError::MissingStrategy {
                category: category(),
            }),
            Some(_) => errors.push(SchemaError::StrategyNotString {
                category: category(),
            }),
        }
        if !self.files.is_sequence() {
            errors.push(SchemaError::FilesNotSequence {
                category: category(),
            });
        }
        errors
    }
}

impl Manifest {
    /// Load and check the required top-level fields.
    ///
    /// Fails with `ManifestSchema` listing every missing field among
    /// `name`, `templateVersion` and `categories`.
    pub fn load(path: &Path) -> Result<Self> {
        let manifest = Self::read(path)?;
        manifest.require(LOAD_REQUIRED_FIELDS)?;
        Ok(manifest)
    }

    /// Load without checking required fields
    pub fn read(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(TemplateError::ManifestNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = fs::read_to_string(path)?;
        Self::parse(&content).map_err(|e| TemplateError::ManifestParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Parse manifest JSON
    pub fn parse(content: &str) -> serde_json::Result<Self> {
        let mut manifest: Manifest = serde_json::from_str(content)?;
        if let Some(categories) = manifest.categories.as_mut() {
            for (name, category) in categories.iter_mut() {
                category.name = name.clone();
            }
        }
        Ok(manifest)
    }

    /// Default manifest location for a project root
    pub fn path(root: &Path) -> PathBuf {
        root.join(DEFAULT_MANIFEST_FILE)
    }

    /// Fail with `ManifestSchema` if any of `fields` is missing
    pub fn require(&self, fields: &[&str]) -> Result<()> {
        let errors: Vec<SchemaError> = self
            .missing_fields()
            .into_iter()
            .filter(|f| fields.contains(f))
            .map(|field| SchemaError::MissingField { field })
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(TemplateError::ManifestSchema { errors })
        }
    }

    fn missing_fields(&self) -> Vec<&'static str> {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.is_empty());

        let mut missing = Vec::new();
        if !present(&self.version) {
            missing.push("version");
        }
        if !present(&self.template_version) {
            missing.push("templateVersion");
        }
        if !present(&self.name) {
            missing.push("name");
        }
        if self.categories.is_none() {
            missing.push("categories");
        }
        missing
    }

    /// Every schema violation, top-level fields first, then categories in
    /// declaration order
    pub fn schema_errors(&self) -> Vec<SchemaError> {
        let mut errors: Vec<SchemaError> = self
            .missing_fields()
            .into_iter()
            .map(|field| SchemaError::MissingField { field })
            .collect();

        for category in self.categories() {
            errors.extend(category.schema_errors());
        }
        errors
    }

    /// Categories in declaration order
    pub fn categories(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter().flat_map(|c| c.values())
    }

    pub fn category(&self, name: &str) -> Option<&Category> {
        self.categories.as_ref().and_then(|c| c.get(name))
    }

    pub fn category_names(&self) -> Vec<&str> {
        self.categories().map(|c| c.name.as_str()).collect()
    }

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    pub fn template_version(&self) -> &str {
        self.template_version.as_deref().unwrap_or_default()
    }

    pub fn compatibility_version(&self) -> &str {
        self.compatibility_version.as_deref().unwrap_or_default()
    }

    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or_default()
    }
}
