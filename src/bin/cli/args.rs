//! CLI Argument Structures and Configuration
//!
//! This module contains all CLI argument definitions, command structures,
//! and configuration enums used by the covgap CLI binary.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// JaCoCo coverage gap finder
#[derive(Parser)]
#[command(name = "covgap")]
#[command(version = VERSION)]
#[command(about = "Find and rank under-tested Java classes from JaCoCo reports")]
#[command(long_about = "
Read JaCoCo XML coverage reports and list the classes whose methods fall below
a coverage threshold, ordered by how many instructions they leave untested.

Common Usage:

  # Discover reports under the current directory and rank gaps
  covgap analyze

  # Analyze one report with a stricter threshold
  covgap analyze target/site/jacoco/jacoco.xml --min-coverage 90

  # Top 10 classes as JSON, skipping getters and setters
  covgap analyze --exclude-accessors --max-classes 10 --format json

  # List the reports discovery would use
  covgap discover --base-dir ./my-service
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Rank classes and methods below the coverage threshold
    Analyze(Box<AnalyzeArgs>),

    /// List the JaCoCo reports found under a directory
    Discover(DiscoverArgs),

    /// Print default configuration in YAML format
    #[command(name = "print-default-config")]
    PrintDefaultConfig,

    /// Initialize a configuration file with defaults
    #[command(name = "init-config")]
    InitConfig(InitConfigArgs),

    /// Validate a covgap configuration file
    #[command(name = "validate-config")]
    ValidateConfig(ValidateConfigArgs),
}

/// Threshold and filter overrides layered over the file configuration
#[derive(Args, Default)]
pub struct FilterArgs {
    /// Minimum instruction coverage in percent; methods strictly below it are reported
    #[arg(long, value_name = "PERCENT")]
    pub min_coverage: Option<f64>,

    /// Skip simple getters and setters (get*/set*/is*)
    #[arg(long)]
    pub exclude_accessors: bool,

    /// Skip compiler-generated lambda bodies (lambda$*)
    #[arg(long)]
    pub exclude_lambdas: bool,

    /// Skip methods whose name matches this glob (repeatable)
    #[arg(long = "exclude-pattern", value_name = "GLOB")]
    pub exclude_patterns: Vec<String>,

    /// Only analyze packages starting with this prefix (repeatable)
    #[arg(long = "include-package", value_name = "PREFIX")]
    pub include_packages: Vec<String>,
}

#[derive(Args)]
pub struct AnalyzeArgs {
    /// JaCoCo XML reports to analyze; discovered under --base-dir when omitted
    #[arg(value_name = "REPORT")]
    pub reports: Vec<PathBuf>,

    /// Directory to search for reports
    #[arg(short, long, default_value = ".")]
    pub base_dir: PathBuf,

    /// Configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub filters: FilterArgs,

    /// Keep only the N highest-priority classes
    #[arg(short = 'n', long, value_name = "N")]
    pub max_classes: Option<usize>,

    /// Output format for results
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Write results to this file instead of stdout
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Exit with an error when no report is found
    #[arg(long)]
    pub fail_on_missing: bool,
}

#[derive(Args)]
pub struct DiscoverArgs {
    /// Directory to search for reports
    #[arg(short, long, default_value = ".")]
    pub base_dir: PathBuf,

    /// Configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format for the report list
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

#[derive(Args)]
pub struct InitConfigArgs {
    /// Output configuration file name
    #[arg(short, long, default_value = ".covgap.yml")]
    pub output: PathBuf,

    /// Overwrite existing configuration file
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args)]
pub struct ValidateConfigArgs {
    /// Path to configuration file to validate
    #[arg(short, long, required = true)]
    pub config: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable tables
    Table,
    /// JSON format output
    Json,
    /// YAML format output
    Yaml,
}
