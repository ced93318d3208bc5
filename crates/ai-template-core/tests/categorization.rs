use std::fs;
use std::path::{Path, PathBuf};

use ai_template_core::{
    FileCategorizer, FileSnapshot, IgnoreRules, Manifest, ManifestValidator, TemplateError,
    ValidationWarning,
};
use tempfile::TempDir;

fn touch(root: &Path, rel: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, rel).unwrap();
}

/// Write a manifest outside the scanned tree so it does not show up as a file
fn project(manifest: &str, files: &[&str]) -> (TempDir, PathBuf, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("project");
    fs::create_dir_all(&root).unwrap();
    for file in files {
        touch(&root, file);
    }
    let manifest_path = tmp.path().join("manifest.json");
    fs::write(&manifest_path, manifest).unwrap();
    (tmp, root, manifest_path)
}

fn categorizer(manifest_path: &Path, root: &Path) -> FileCategorizer {
    FileCategorizer::new(Manifest::load(manifest_path).unwrap(), root)
}

const MIXED: &str = r#"{
    "version": "1.0.0",
    "name": "ai-coding-template",
    "templateVersion": "0.3.0",
    "categories": {
        "core": { "strategy": "replace", "files": ["CLAUDE.md", ".claude/", "src/**"] },
        "reference": { "strategy": "merge", "files": ["docs/**", "src/docs/**"] },
        "configuration": { "strategy": "smart-merge", "files": ["package.json", "*.json"] },
        "user": { "strategy": "preserve", "files": ["docs/project-brief.md"] }
    }
}"#;

const MIXED_FILES: &[&str] = &[
    "CLAUDE.md",
    "README.md",
    ".claude/commands/plan.md",
    "docs/guide.md",
    "docs/project-brief.md",
    "src/index.js",
    "src/docs/readme.txt",
    "package.json",
    "tsconfig.json",
    "workbench/notes.md",
    ".git/HEAD",
    "node_modules/left-pad/index.js",
    "debug.log",
];

#[test]
fn scenario_a_single_category_and_uncategorized_readme() {
    let (_tmp, root, manifest) = project(
        r#"{ "version": "1", "name": "t", "templateVersion": "1",
             "categories": { "core": { "strategy": "replace", "files": ["CLAUDE.md"] } } }"#,
        &["CLAUDE.md", "README.md"],
    );

    let report = categorizer(&manifest, &root)
        .validate_categorization()
        .unwrap();

    assert!(report.valid);
    assert_eq!(report.summary.len(), 1);
    let core = report.summary.get("core").unwrap();
    assert_eq!(core.count, 1);
    assert_eq!(core.strategy, "replace");
    assert_eq!(
        report.warnings,
        vec![ValidationWarning::Uncategorized { count: 1 }]
    );
    assert_eq!(report.categorization.uncategorized(), &["README.md"]);
}

#[test]
fn scenario_b_overlap_lists_categories_in_declared_order() {
    let (_tmp, root, manifest) = project(
        r#"{ "version": "1", "name": "t", "templateVersion": "1",
             "categories": {
                 "core": { "strategy": "replace", "files": ["src/**"] },
                 "reference": { "strategy": "merge", "files": ["src/docs/**"] }
             } }"#,
        &["src/docs/readme.txt"],
    );

    let report = categorizer(&manifest, &root)
        .validate_categorization()
        .unwrap();

    assert_eq!(
        report.warnings,
        vec![ValidationWarning::Overlap {
            path: "src/docs/readme.txt".to_string(),
            categories: vec!["core".to_string(), "reference".to_string()],
        }]
    );
    assert!(report.valid);
}

#[test]
fn scenario_c_missing_categories() {
    let (_tmp, root, manifest) = project(
        r#"{ "version": "1", "name": "t", "templateVersion": "1" }"#,
        &["CLAUDE.md"],
    );

    let err = Manifest::load(&manifest).unwrap_err();
    assert!(matches!(err, TemplateError::ManifestSchema { .. }));
    assert_eq!(err.missing_fields(), vec!["categories"]);

    let mut validator = ManifestValidator::new(&manifest).with_root(&root);
    assert!(!validator.validate().unwrap());
    assert_eq!(validator.errors(), &["Missing required field: categories"]);

    // the same through a leniently loaded categorizer
    let report = FileCategorizer::new(Manifest::read(&manifest).unwrap(), &root)
        .validate_categorization()
        .unwrap();
    assert!(!report.valid);
    assert_eq!(report.errors, vec!["Missing required field: categories"]);
}

#[test]
fn scenario_d_missing_strategy_still_processes_files() {
    let (_tmp, root, manifest) = project(
        r#"{ "version": "1", "name": "t", "templateVersion": "1",
             "categories": {
                 "X": { "files": ["docs/**"] },
                 "Y": { "strategy": "merge", "files": ["docs/**"] }
             } }"#,
        &["docs/a.md"],
    );

    let report = categorizer(&manifest, &root)
        .validate_categorization()
        .unwrap();

    assert!(!report.valid);
    assert_eq!(report.errors, vec!["Category 'X' missing strategy"]);
    assert_eq!(report.summary.get("X").unwrap().count, 1);
    assert_eq!(report.overlaps().count(), 1);
}

#[test]
fn scenario_e_empty_files_list() {
    let (_tmp, root, manifest) = project(
        r#"{ "version": "1", "name": "t", "templateVersion": "1",
             "categories": { "user": { "strategy": "preserve", "files": [] } } }"#,
        &["a.txt"],
    );

    let report = categorizer(&manifest, &root)
        .validate_categorization()
        .unwrap();

    assert!(report.errors.is_empty());
    assert!(report.valid);
    assert_eq!(report.summary.get("user").unwrap().count, 0);
}

#[test]
fn validation_is_idempotent() {
    let (_tmp, root, manifest) = project(MIXED, MIXED_FILES);
    let c = categorizer(&manifest, &root);

    let first = c.validate_categorization().unwrap();
    let second = c.validate_categorization().unwrap();
    assert_eq!(first, second);
}

#[test]
fn categorized_paths_are_snapshot_paths() {
    let (_tmp, root, manifest) = project(MIXED, MIXED_FILES);
    let c = categorizer(&manifest, &root);
    let snapshot = c.snapshot().unwrap();
    let report = c.validate_snapshot(&snapshot);

    for path in report.categorization.file_to_categories().keys() {
        assert!(snapshot.contains(path), "{} not in snapshot", path);
    }
    assert!(!snapshot.contains(".git/HEAD"));
    assert!(!snapshot.contains("node_modules/left-pad/index.js"));
    assert!(!snapshot.contains("debug.log"));
}

#[test]
fn overlap_warnings_match_multi_category_paths() {
    let (_tmp, root, manifest) = project(MIXED, MIXED_FILES);
    let report = categorizer(&manifest, &root)
        .validate_categorization()
        .unwrap();

    let multi: Vec<&str> = report
        .categorization
        .file_to_categories()
        .iter()
        .filter(|(_, cats)| cats.len() > 1)
        .map(|(p, _)| p.as_str())
        .collect();
    let warned: Vec<&str> = report.overlaps().map(|(p, _)| p).collect();

    assert_eq!(multi, warned);
    assert_eq!(
        warned,
        vec!["docs/project-brief.md", "src/docs/readme.txt"]
    );
}

#[test]
fn uncategorized_count_is_complete() {
    let (_tmp, root, manifest) = project(MIXED, MIXED_FILES);
    let c = categorizer(&manifest, &root);
    let snapshot = c.snapshot().unwrap();
    let report = c.validate_snapshot(&snapshot);

    let expected = snapshot.len() - report.categorization.file_to_categories().len();
    assert_eq!(expected, 2); // README.md, workbench/notes.md
    assert_eq!(report.uncategorized_count(), Some(expected));

    let uncategorized_warnings = report
        .warnings
        .iter()
        .filter(|w| matches!(w, ValidationWarning::Uncategorized { .. }))
        .count();
    assert_eq!(uncategorized_warnings, 1);
}

#[test]
fn no_uncategorized_warning_when_everything_matches() {
    let (_tmp, root, manifest) = project(
        r#"{ "version": "1", "name": "t", "templateVersion": "1",
             "categories": { "all": { "strategy": "replace", "files": ["**"] } } }"#,
        &["a.md", "b/c.md"],
    );
    let report = categorizer(&manifest, &root)
        .validate_categorization()
        .unwrap();
    assert_eq!(report.uncategorized_count(), None);
    assert!(report.warnings.is_empty());
}

#[test]
fn summary_is_consistent_with_categorization() {
    let (_tmp, root, manifest) = project(MIXED, MIXED_FILES);
    let c = categorizer(&manifest, &root);
    let report = c.validate_categorization().unwrap();
    let categorized = report.categorization.file_to_categories().len();

    assert!(report.summary.total() >= categorized);
    let overlaps = report.overlaps().count();
    assert_eq!(overlaps > 0, report.summary.total() > categorized);

    for (name, count) in report.summary.iter() {
        let distinct = c.files_in_category(name).unwrap();
        assert_eq!(count.count, distinct.len(), "category {}", name);
    }

    let names: Vec<&str> = report.summary.iter().map(|(n, _)| n).collect();
    assert_eq!(names, vec!["core", "reference", "configuration", "user"]);
    assert_eq!(c.get_category_summary().unwrap(), report.summary);
}

#[test]
fn malformed_patterns_match_nothing_without_errors() {
    let (_tmp, root, manifest) = project(
        r#"{ "version": "1", "name": "t", "templateVersion": "1",
             "categories": { "core": { "strategy": "replace", "files": ["src/[oops", "a**b"] } } }"#,
        &["src/index.js"],
    );
    let report = categorizer(&manifest, &root)
        .validate_categorization()
        .unwrap();
    assert!(report.valid);
    assert_eq!(report.summary.get("core").unwrap().count, 0);
}

#[test]
fn open_uses_manifest_directory_as_root() {
    let tmp = TempDir::new().unwrap();
    touch(tmp.path(), "CLAUDE.md");
    fs::write(
        Manifest::path(tmp.path()),
        r#"{ "version": "1", "name": "t", "templateVersion": "1",
             "categories": { "core": { "strategy": "replace", "files": ["CLAUDE.md", ".template-manifest.json"] } } }"#,
    )
    .unwrap();

    let c = FileCategorizer::open(&Manifest::path(tmp.path())).unwrap();
    assert_eq!(c.root(), tmp.path());
    let report = c.validate_categorization().unwrap();
    assert_eq!(report.summary.get("core").unwrap().count, 2);
    assert!(report.warnings.is_empty());
}

#[test]
fn custom_ignore_rules_shrink_the_snapshot() {
    let (_tmp, root, manifest) = project(MIXED, MIXED_FILES);
    let c = categorizer(&manifest, &root)
        .with_ignore_rules(IgnoreRules::with_defaults().exclude("workbench"));
    let report = c.validate_categorization().unwrap();
    assert_eq!(report.uncategorized_count(), Some(1));

    let snapshot = FileSnapshot::scan(&root, &IgnoreRules::default()).unwrap();
    assert!(snapshot.contains(".git/HEAD"));
}

#[test]
fn malformed_category_entries_are_reported_not_fatal() {
    let (_tmp, root, manifest) = project(
        r#"{ "version": "1", "name": "t", "templateVersion": "1",
             "categories": {
                 "core": "oops",
                 "docs": { "strategy": 5, "files": ["docs/**"] },
                 "ok": { "strategy": "replace", "files": ["CLAUDE.md"] }
             } }"#,
        &["CLAUDE.md", "docs/a.md"],
    );

    let mut validator = ManifestValidator::new(&manifest).with_root(&root);
    assert!(!validator.validate().unwrap());
    assert_eq!(
        validator.errors(),
        &[
            "Category 'core' is malformed",
            "Category 'docs' strategy must be a string",
        ]
    );

    let summary = validator.summary().unwrap();
    assert_eq!(summary.get("core").unwrap().count, 0);
    assert_eq!(summary.get("docs").unwrap().count, 1);
    assert_eq!(summary.get("ok").unwrap().count, 1);
    assert_eq!(validator.uncategorized().len(), 0);
}
