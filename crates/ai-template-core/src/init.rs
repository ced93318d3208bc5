//! Project initialization from a categorized template tree.
//!
//! Only the installable categories are planned. Each template file is planned
//! once, under the first of them that claims it, and that category's strategy
//! decides what happens to it.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::category::Categorization;
use crate::error::{Result, TemplateError};

/// Callback type for file operation progress reporting
pub type FileCallback<'a> = Option<&'a dyn Fn(&str, &str)>;

/// Entries that may already exist in a target directory without conflict
const SAFE_EXISTING_FILES: &[&str] = &[".git", ".gitignore", "README.md", "package.json", ".env"];

pub const DEFAULT_PROJECT_TYPE: &str = "web-app";

/// Categories copied into a new project, in planning order
pub const INSTALLABLE_CATEGORIES: &[&str] = &["core", "reference", "optional", "configuration"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InitAction {
    /// Overwrite the target
    Copy,
    /// Copy only when the target is absent
    Merge,
    /// Copy only when the target is absent (needs manual configuration)
    Configure,
    Skip,
}

impl InitAction {
    pub fn for_strategy(strategy: &str) -> Self {
        match strategy {
            "replace" | "prompt" => Self::Copy,
            "merge" => Self::Merge,
            "smart-merge" => Self::Configure,
            _ => Self::Skip,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedFile {
    /// Path relative to both roots
    pub file: String,
    pub source: PathBuf,
    pub target: PathBuf,
    pub category: String,
    pub strategy: String,
    pub action: InitAction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitPlan {
    pub target_dir: PathBuf,
    pub project_type: String,
    pub files: Vec<PlannedFile>,
}

impl InitPlan {
    pub fn with_action(&self, action: InitAction) -> impl Iterator<Item = &PlannedFile> {
        self.files.iter().filter(move |f| f.action == action)
    }

    pub fn count(&self, action: InitAction) -> usize {
        self.with_action(action).count()
    }

    /// Files that will be written (everything but skips)
    pub fn total_actions(&self) -> usize {
        self.files
            .iter()
            .filter(|f| f.action != InitAction::Skip)
            .count()
    }
}

#[derive(Debug, Clone)]
pub struct InitOptions {
    pub target_dir: PathBuf,
    pub project_type: String,
    pub dry_run: bool,
    /// Categories to plan; others are left out of the new project
    pub categories: Vec<String>,
}

impl Default for InitOptions {
    fn default() -> Self {
        Self {
            target_dir: PathBuf::from("."),
            project_type: DEFAULT_PROJECT_TYPE.to_string(),
            dry_run: false,
            categories: INSTALLABLE_CATEGORIES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct InitResult {
    pub copied: usize,
    pub merged: usize,
    pub configured: usize,
    /// Targets left alone: merge/configure targets that already existed, or
    /// targets that are the template file itself
    pub skipped_existing: usize,
    pub errors: Vec<String>,
}

impl InitResult {
    pub fn total(&self) -> usize {
        self.copied + self.merged + self.configured
    }
}

pub struct TemplateInitializer {
    options: InitOptions,
}

impl TemplateInitializer {
    pub fn new(options: InitOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &InitOptions {
        &self.options
    }

    /// Create the target directory if needed and list entries that might
    /// conflict with template files.
    ///
    /// A target that resolves to `source_root` is rejected.
    pub fn prepare_target(&self, source_root: &Path) -> Result<Vec<String>> {
        let target = &self.options.target_dir;
        if same_file(target, source_root) {
            return Err(TemplateError::TargetIsTemplate {
                path: target.clone(),
            });
        }
        if !target.exists() {
            if self.options.dry_run {
                return Ok(Vec::new());
            }
            fs::create_dir_all(target)?;
            tracing::info!(target = %target.display(), "created target directory");
        }

        let mut conflicts: Vec<String> = fs::read_dir(target)?
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|name| !SAFE_EXISTING_FILES.contains(&name.as_str()))
            .collect();
        conflicts.sort();
        Ok(conflicts)
    }

    /// Plan per-file actions for the categorized template tree at `source_root`
    pub fn plan(&self, source_root: &Path, categorization: &Categorization) -> InitPlan {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut files = Vec::new();

        let listings = self
            .options
            .categories
            .iter()
            .filter_map(|name| categorization.listing(name));

        for listing in listings {
            let action = InitAction::for_strategy(&listing.strategy);

            for file in &listing.files {
                if !seen.insert(file.as_str()) {
                    continue;
                }

                let source = source_root.join(file);
                let target = self.options.target_dir.join(file);
                if !source.is_file() || same_file(&source, &target) {
                    continue;
                }

                files.push(PlannedFile {
                    file: file.clone(),
                    source,
                    target,
                    category: listing.name.clone(),
                    strategy: listing.strategy.clone(),
                    action,
                });
            }
        }

        InitPlan {
            target_dir: self.options.target_dir.clone(),
            project_type: self.options.project_type.clone(),
            files,
        }
    }

    /// Carry out a plan. Per-file failures are collected, not propagated.
    pub fn execute(&self, plan: &InitPlan, on_file: FileCallback) -> InitResult {
        let mut result = InitResult::default();
        if self.options.dry_run {
            return result;
        }

        let report = |status: &str, path: &str| {
            if let Some(cb) = on_file {
                cb(status, path);
            }
        };

        for planned in &plan.files {
            let only_if_absent = match planned.action {
                InitAction::Skip => continue,
                InitAction::Copy => false,
                InitAction::Merge | InitAction::Configure => true,
            };

            if same_file(&planned.source, &planned.target)
                || (only_if_absent && planned.target.exists())
            {
                result.skipped_existing += 1;
                report("SKIP", &planned.file);
                continue;
            }

            match copy_file(&planned.source, &planned.target) {
                Ok(()) => {
                    match planned.action {
                        InitAction::Copy => result.copied += 1,
                        InitAction::Merge => result.merged += 1,
                        InitAction::Configure => result.configured += 1,
                        InitAction::Skip => {}
                    }
                    report("OK", &planned.file);
                }
                Err(e) => {
                    result
                        .errors
                        .push(format!("Failed to copy {}: {}", planned.file, e));
                    report("FAIL", &planned.file);
                }
            }
        }

        result
    }
}

/// Both paths exist and resolve to the same file or directory
fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn copy_file(source: &Path, target: &Path) -> std::io::Result<()> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(source, target)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::FileCategorizer;
    use crate::manifest::Manifest;
    use tempfile::TempDir;

    const MANIFEST: &str = r#"{
        "version": "1.0.0", "name": "t", "templateVersion": "1.0.0",
        "categories": {
            "core": { "strategy": "replace", "files": ["CLAUDE.md", ".claude/"] },
            "reference": { "strategy": "merge", "files": ["docs/**"] },
            "configuration": { "strategy": "smart-merge", "files": ["package.json"] },
            "user": { "strategy": "preserve", "files": ["src/**", "docs/project-brief.md"] },
            "local": { "strategy": "replace", "files": ["notes/**"] }
        }
    }"#;

    fn template() -> TempDir {
        let tmp = TempDir::new().unwrap();
        for rel in [
            "CLAUDE.md",
            ".claude/commands/plan.md",
            "docs/guide.md",
            "docs/project-brief.md",
            "package.json",
            "src/app.js",
            "notes/todo.md",
        ] {
            let path = tmp.path().join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, rel).unwrap();
        }
        tmp
    }

    fn plan_for(template: &Path, target: &Path, dry_run: bool) -> (TemplateInitializer, InitPlan) {
        let categorizer = FileCategorizer::new(Manifest::parse(MANIFEST).unwrap(), template);
        let categorization = categorizer.categorize().unwrap();
        let initializer = TemplateInitializer::new(InitOptions {
            target_dir: target.to_path_buf(),
            dry_run,
            ..Default::default()
        });
        let plan = initializer.plan(template, &categorization);
        (initializer, plan)
    }

    #[test]
    fn strategy_to_action() {
        assert_eq!(InitAction::for_strategy("replace"), InitAction::Copy);
        assert_eq!(InitAction::for_strategy("prompt"), InitAction::Copy);
        assert_eq!(InitAction::for_strategy("merge"), InitAction::Merge);
        assert_eq!(InitAction::for_strategy("smart-merge"), InitAction::Configure);
        assert_eq!(InitAction::for_strategy("preserve"), InitAction::Skip);
    }

    #[test]
    fn plan_uses_first_category_for_overlaps() {
        let src = template();
        let dst = TempDir::new().unwrap();
        let (_, plan) = plan_for(src.path(), dst.path(), true);

        let brief = plan
            .files
            .iter()
            .find(|f| f.file == "docs/project-brief.md")
            .unwrap();
        assert_eq!(brief.category, "reference");
        assert_eq!(plan.files.iter().filter(|f| f.file == "docs/project-brief.md").count(), 1);

        assert_eq!(plan.count(InitAction::Copy), 2);
        assert_eq!(plan.count(InitAction::Merge), 2);
        assert_eq!(plan.count(InitAction::Configure), 1);
        assert_eq!(plan.count(InitAction::Skip), 0);
        assert_eq!(plan.total_actions(), 5);
        assert_eq!(plan.project_type, DEFAULT_PROJECT_TYPE);
    }

    #[test]
    fn dry_run_writes_nothing() {
        let src = template();
        let dst = TempDir::new().unwrap();
        let target = dst.path().join("new-project");
        let (initializer, plan) = plan_for(src.path(), &target, true);

        assert!(initializer.prepare_target(src.path()).unwrap().is_empty());
        assert_eq!(initializer.execute(&plan, None), InitResult::default());
        assert!(!target.exists());
    }

    #[test]
    fn execute_copies_and_respects_existing_files() {
        let src = template();
        let dst = TempDir::new().unwrap();
        fs::create_dir_all(dst.path().join("docs")).unwrap();
        fs::write(dst.path().join("docs/guide.md"), "mine").unwrap();
        fs::write(dst.path().join("CLAUDE.md"), "old").unwrap();

        let (initializer, plan) = plan_for(src.path(), dst.path(), false);
        let conflicts = initializer.prepare_target(src.path()).unwrap();
        assert_eq!(conflicts, vec!["CLAUDE.md", "docs"]);

        let result = initializer.execute(&plan, None);
        assert!(result.errors.is_empty());
        assert_eq!(result.copied, 2);
        assert_eq!(result.merged, 1);
        assert_eq!(result.configured, 1);
        assert_eq!(result.skipped_existing, 1);
        assert_eq!(result.total(), 4);

        // replace overwrites, merge keeps the user's copy
        assert_eq!(fs::read_to_string(dst.path().join("CLAUDE.md")).unwrap(), "CLAUDE.md");
        assert_eq!(fs::read_to_string(dst.path().join("docs/guide.md")).unwrap(), "mine");
        assert!(dst.path().join(".claude/commands/plan.md").exists());
        assert!(!dst.path().join("src/app.js").exists());
        assert!(!dst.path().join("notes/todo.md").exists());
    }

    #[test]
    fn only_installable_categories_are_planned() {
        let src = template();
        let dst = TempDir::new().unwrap();
        let (_, plan) = plan_for(src.path(), dst.path(), true);

        let categories: HashSet<&str> = plan.files.iter().map(|f| f.category.as_str()).collect();
        assert!(!categories.contains("user"));
        assert!(!categories.contains("local"));
        assert!(plan.files.iter().all(|f| f.file != "notes/todo.md"));
    }

    #[test]
    fn target_inside_template_is_rejected() {
        let src = template();
        let (initializer, _) = plan_for(src.path(), src.path(), false);
        let err = initializer.prepare_target(src.path()).unwrap_err();
        assert!(matches!(err, TemplateError::TargetIsTemplate { .. }));
    }

    #[test]
    fn template_files_are_never_copied_onto_themselves() {
        let src = template();
        fs::write(src.path().join("CLAUDE.md"), "precious contents").unwrap();

        let (initializer, plan) = plan_for(src.path(), src.path(), false);
        assert!(plan.files.is_empty());

        let result = initializer.execute(&plan, None);
        assert_eq!(result.total(), 0);
        assert_eq!(
            fs::read_to_string(src.path().join("CLAUDE.md")).unwrap(),
            "precious contents"
        );

        // a stale plan pointing a file at itself is skipped as well
        let path = src.path().join("CLAUDE.md");
        let stale = InitPlan {
            target_dir: src.path().to_path_buf(),
            project_type: DEFAULT_PROJECT_TYPE.to_string(),
            files: vec![PlannedFile {
                file: "CLAUDE.md".to_string(),
                source: path.clone(),
                target: path.clone(),
                category: "core".to_string(),
                strategy: "replace".to_string(),
                action: InitAction::Copy,
            }],
        };
        let result = initializer.execute(&stale, None);
        assert_eq!(result.copied, 0);
        assert_eq!(result.skipped_existing, 1);
        assert_eq!(fs::read_to_string(&path).unwrap(), "precious contents");
    }
}
