use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use clap_complete::generate;
use colored::Colorize;

use ai_template_core::category::manifest_root;
use ai_template_core::init::InitAction;
use ai_template_core::{
    FileCategorizer, IgnoreRules, InitOptions, InitPlan, Manifest, ManifestValidator, Result,
    TemplateError, TemplateInitializer, DEFAULT_MANIFEST_FILE,
};

mod args;
use args::{Cli, Commands, Shell};

/// Files shown per category by `validate`
const LISTING_LIMIT: usize = 10;
/// Files shown per category by `status --verbose`
const STATUS_EXAMPLES: usize = 3;
/// Warnings shown by `status`
const STATUS_WARNINGS: usize = 3;
const UNCATEGORIZED: &str = "uncategorized";

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    let manifest_path = resolve_manifest_path(cli.manifest.as_deref(), cli.root.as_deref());
    let root = cli
        .root
        .clone()
        .unwrap_or_else(|| manifest_root(&manifest_path));

    let result = match cli.command {
        Some(Commands::Status { category }) => handle_status(
            &manifest_path,
            &root,
            build_ignore_rules(&cli.include, &cli.exclude),
            category.as_deref(),
            cli.verbose,
        )
        .map(|()| ExitCode::SUCCESS),
        Some(Commands::Validate) => handle_validate(
            &manifest_path,
            &root,
            build_ignore_rules(&cli.include, &cli.exclude),
        ),
        Some(Commands::Info) => handle_info(&manifest_path).map(|()| ExitCode::SUCCESS),
        Some(Commands::Init {
            dir,
            dry_run,
            project_type,
        }) => handle_init(
            &manifest_path,
            &root,
            build_ignore_rules(&cli.include, &cli.exclude),
            InitOptions {
                target_dir: dir.unwrap_or_else(|| PathBuf::from(".")),
                project_type,
                dry_run,
                ..Default::default()
            },
            cli.verbose,
        ),
        Some(Commands::Completions { shell }) => {
            handle_completions(shell);
            Ok(ExitCode::SUCCESS)
        }
        None => {
            Cli::command().print_help().ok();
            Ok(ExitCode::SUCCESS)
        }
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {}", "[ERROR]".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = if cli.quiet {
        EnvFilter::new("error")
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr).with_target(false))
        .init();
}

fn handle_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let shell = match shell {
        Shell::Bash => clap_complete::Shell::Bash,
        Shell::Zsh => clap_complete::Shell::Zsh,
        Shell::Fish => clap_complete::Shell::Fish,
        Shell::PowerShell => clap_complete::Shell::PowerShell,
        Shell::Elvish => clap_complete::Shell::Elvish,
    };
    generate(shell, &mut cmd, "ai-template", &mut io::stdout());
}

/// Priority: --manifest > <--root>/.template-manifest.json > ./.template-manifest.json
fn resolve_manifest_path(cli_manifest: Option<&Path>, cli_root: Option<&Path>) -> PathBuf {
    if let Some(path) = cli_manifest {
        return path.to_path_buf();
    }
    match cli_root {
        Some(root) => Manifest::path(root),
        None => PathBuf::from(DEFAULT_MANIFEST_FILE),
    }
}

/// Default ignore rules extended by the CLI options
fn build_ignore_rules(include: &[String], exclude: &[String]) -> IgnoreRules {
    let mut rules = IgnoreRules::with_defaults();

    for dir in include {
        if !rules.included_dirs.contains(dir) {
            rules.included_dirs.push(dir.clone());
        }
    }

    for dir in exclude {
        if !rules.excluded_dirs.contains(dir) {
            rules.excluded_dirs.push(dir.clone());
        }
    }

    rules
}

/// Partial manifests are accepted as long as they declare categories
fn load_categorizer(
    manifest_path: &Path,
    root: &Path,
    rules: IgnoreRules,
) -> Result<FileCategorizer> {
    let manifest = Manifest::read(manifest_path)?;
    manifest.require(&["categories"])?;
    Ok(FileCategorizer::new(manifest, root).with_ignore_rules(rules))
}

fn category_label(name: &str) -> colored::ColoredString {
    match name {
        UNCATEGORIZED => name.yellow(),
        "ignore" => name.dimmed(),
        _ => name.cyan(),
    }
}

fn print_more(remaining: usize, indent: &str) {
    if remaining > 0 {
        println!("{}... and {} more", indent, remaining);
    }
}

fn handle_status(
    manifest_path: &Path,
    root: &Path,
    rules: IgnoreRules,
    category: Option<&str>,
    verbose: bool,
) -> Result<()> {
    let categorizer = load_categorizer(manifest_path, root, rules)?;
    let snapshot = categorizer.snapshot()?;
    let report = categorizer.validate_snapshot(&snapshot);
    let categorization = &report.categorization;

    println!();
    println!("{}", "AI Template Status".bold());
    println!();

    if let Some(name) = category {
        let (strategy, files) = if name == UNCATEGORIZED {
            ("unknown", categorization.uncategorized())
        } else {
            match categorization.listing(name) {
                Some(listing) => (listing.strategy.as_str(), listing.files.as_slice()),
                None => {
                    let mut available = categorizer.manifest().category_names();
                    available.push(UNCATEGORIZED);
                    eprintln!("Available categories: {}", available.join(", "));
                    return Err(TemplateError::CategoryNotFound {
                        name: name.to_string(),
                    });
                }
            }
        };

        println!("Category: {} ({})", category_label(name), strategy);
        println!("Files: {}", files.len());
        println!();

        if files.is_empty() {
            println!("  (no files in this category)");
        }
        for file in files {
            println!("  {}", file);
            if verbose {
                if let Some(pattern) = categorizer.matching_pattern(name, file) {
                    println!("    Pattern: {}", pattern.dimmed());
                }
            }
        }
        return Ok(());
    }

    println!("Template File Overview:");
    println!("{}", "=".repeat(50));

    for listing in categorization.listings() {
        println!(
            "  {:<15} {:>4} files  ({})",
            category_label(&listing.name),
            listing.count(),
            listing.strategy
        );
        if verbose && listing.count() > 0 {
            let (shown, remaining) = listing.truncated(STATUS_EXAMPLES);
            for file in shown {
                println!("      - {}", file);
            }
            print_more(remaining, "      ");
        }
    }

    let uncategorized = categorization.uncategorized();
    println!(
        "  {:<15} {:>4} files  (unknown)",
        category_label(UNCATEGORIZED),
        uncategorized.len()
    );
    if verbose && !uncategorized.is_empty() {
        let shown = uncategorized.len().min(STATUS_EXAMPLES);
        for file in &uncategorized[..shown] {
            println!("      - {}", file);
        }
        print_more(uncategorized.len() - shown, "      ");
    }

    println!("{}", "-".repeat(50));
    println!("Total files: {}", snapshot.len());

    if !report.warnings.is_empty() {
        println!();
        println!(
            "{} {} warnings:",
            "[WARN]".yellow().bold(),
            report.warnings.len()
        );
        for warning in report.warnings.iter().take(STATUS_WARNINGS) {
            println!("  - {}", warning);
        }
        print_more(report.warnings.len().saturating_sub(STATUS_WARNINGS), "  ");
    }

    if !verbose {
        println!();
        println!("Use --verbose for detailed file lists");
        println!("Use --category <name> to focus on a specific category");
    }

    Ok(())
}

fn handle_validate(manifest_path: &Path, root: &Path, rules: IgnoreRules) -> Result<ExitCode> {
    println!();
    println!("{}", "Validating template configuration".bold());

    let mut validator = ManifestValidator::new(manifest_path)
        .with_root(root)
        .with_ignore_rules(rules);
    let valid = validator.validate()?;

    for listing in validator.listings() {
        println!();
        println!(
            "Category: {} ({})",
            category_label(&listing.name),
            listing.strategy
        );
        if !listing.description.is_empty() {
            println!("  {}", listing.description.dimmed());
        }
        println!("  Files: {} matches", listing.count());
        let (shown, remaining) = listing.truncated(LISTING_LIMIT);
        for file in shown {
            println!("    - {}", file);
        }
        print_more(remaining, "    ");
    }

    let uncategorized = validator.uncategorized();
    if !uncategorized.is_empty() {
        println!();
        println!("Uncategorized files:");
        let shown = uncategorized.len().min(LISTING_LIMIT);
        for file in &uncategorized[..shown] {
            println!("    - {}", file);
        }
        print_more(uncategorized.len() - shown, "    ");
    }

    println!();
    if valid {
        println!("{}", "Template validation passed".green());
    } else {
        println!("{}", "Template validation failed".red());
        for error in validator.errors() {
            println!("  - {}", error);
        }
    }

    let warnings = validator.warnings();
    if !warnings.is_empty() {
        println!();
        println!("{} {} warnings:", "[WARN]".yellow().bold(), warnings.len());
        for warning in warnings {
            println!("  - {}", warning);
        }
    }

    if let Some(summary) = validator.summary() {
        println!();
        println!(
            "Summary: {} files categorized across {} categories",
            summary.total(),
            summary.len()
        );
    }

    Ok(if valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn handle_info(manifest_path: &Path) -> Result<()> {
    let manifest = Manifest::read(manifest_path)?;

    println!();
    println!("{}", "Template Information".bold());
    println!();
    println!("Name: {}", manifest.name().cyan());
    println!("Version: {}", manifest.template_version());
    println!("Description: {}", manifest.description());
    println!("Compatibility: {}", manifest.compatibility_version());

    if !manifest.features.is_empty() {
        println!();
        println!("Features:");
        for (feature, enabled) in &manifest.features {
            let status = if *enabled {
                "[x]".green()
            } else {
                "[ ]".dimmed()
            };
            println!("  {} {}", status, feature.replace('-', " "));
        }
    }

    if !manifest.dependencies.is_empty() {
        println!();
        println!("Dependencies:");
        for (dep, version) in &manifest.dependencies {
            println!("  - {}: {}", dep, version);
        }
    }

    Ok(())
}

fn handle_init(
    manifest_path: &Path,
    root: &Path,
    rules: IgnoreRules,
    options: InitOptions,
    verbose: bool,
) -> Result<ExitCode> {
    let categorizer = load_categorizer(manifest_path, root, rules)?;
    let initializer = TemplateInitializer::new(options);
    let target_dir = initializer.options().target_dir.clone();

    println!();
    println!("{}", "Initializing AI Template Project".bold());
    println!("Template: {}", root.display());
    println!("Target: {}", target_dir.display());
    println!("Project type: {}", initializer.options().project_type.cyan());
    if initializer.options().dry_run {
        println!("{}", "(dry run)".yellow());
    }

    let conflicts = initializer.prepare_target(root)?;
    if !conflicts.is_empty() {
        println!();
        println!(
            "{} Target directory contains files that might conflict:",
            "[WARN]".yellow().bold()
        );
        for name in &conflicts {
            println!("  - {}", name);
        }
    }

    let categorization = categorizer.categorize()?;
    let plan = initializer.plan(root, &categorization);
    display_plan(&plan, verbose);

    if initializer.options().dry_run {
        println!();
        println!("Dry run complete - no files were copied");
        return Ok(ExitCode::SUCCESS);
    }

    println!();
    println!("Installing...");

    let on_file = |status: &str, path: &str| {
        let status_str = match status {
            "OK" => format!("[{}]", status).green(),
            "SKIP" => format!("[{}]", status).yellow(),
            "FAIL" => format!("[{}]", status).red().bold(),
            _ => format!("[{}]", status).normal(),
        };
        if verbose || status == "FAIL" {
            println!("  {} {}", status_str, path);
        }
    };

    let result = initializer.execute(&plan, Some(&on_file));

    println!();
    println!("Results:");
    println!("  Processed: {}", result.total());
    println!("  Copied: {}", result.copied);
    println!("  Merged: {}", result.merged);
    println!("  Configured: {}", result.configured);
    println!("  Kept existing: {}", result.skipped_existing);

    if !result.errors.is_empty() {
        println!();
        println!("{} {} errors:", "[ERROR]".red().bold(), result.errors.len());
        for error in &result.errors {
            println!("  - {}", error);
        }
        return Ok(ExitCode::FAILURE);
    }

    println!();
    println!(
        "{} {}",
        "Initialization complete:".green(),
        target_dir.display()
    );
    Ok(ExitCode::SUCCESS)
}

fn display_plan(plan: &InitPlan, verbose: bool) {
    println!();
    println!("Installation Plan:");
    println!("{}", "=".repeat(50));
    println!("  Files to copy:      {}", plan.count(InitAction::Copy));
    println!("  Files to merge:     {}", plan.count(InitAction::Merge));
    println!("  Files to configure: {}", plan.count(InitAction::Configure));
    println!("  Files to skip:      {}", plan.count(InitAction::Skip));
    println!("  Total actions:      {}", plan.total_actions());

    if !verbose {
        return;
    }

    for (action, label, limit) in [
        (InitAction::Copy, "Copy (replace)", 10),
        (InitAction::Merge, "Merge", 5),
        (InitAction::Configure, "Configure", 5),
    ] {
        let files: Vec<_> = plan.with_action(action).collect();
        if files.is_empty() {
            continue;
        }
        println!();
        println!("{}:", label);
        for planned in files.iter().take(limit) {
            println!("  {} ({})", planned.file, planned.category.dimmed());
        }
        print_more(files.len().saturating_sub(limit), "  ");
    }
}
