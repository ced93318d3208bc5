use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "ai-template")]
#[command(about = "AI Coding Template management CLI")]
#[command(version)]
pub struct Cli {
    /// Verbose output (detailed file lists, debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet output (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Template manifest (default: .template-manifest.json)
    #[arg(long, global = true)]
    pub manifest: Option<PathBuf>,

    /// Project root to scan (default: the manifest's directory)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Scan directories that are excluded by default (e.g., --include=node_modules)
    #[arg(long, value_name = "DIR", global = true)]
    pub include: Vec<String>,

    /// Exclude additional directories (e.g., --exclude=dist)
    #[arg(long, value_name = "DIR", global = true)]
    pub exclude: Vec<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show template status and file categorization
    Status {
        /// Show files in a specific category
        #[arg(short, long, value_name = "NAME")]
        category: Option<String>,
    },

    /// Validate template manifest and file categorization
    Validate,

    /// Show template information
    Info,

    /// Initialize a new project with the AI template
    Init {
        /// Target directory (default: current directory)
        dir: Option<PathBuf>,

        /// Show what would be done without copying files
        #[arg(short, long)]
        dry_run: bool,

        /// Project type
        #[arg(long = "type", value_name = "PROJECT_TYPE", default_value = "web-app")]
        project_type: String,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
