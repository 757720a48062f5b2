//! Configuration management commands.
//!
//! This module contains commands for managing covgap configuration files,
//! including initialization, validation, and printing defaults.

use owo_colors::OwoColorize;
use tabled::{settings::Style as TableStyle, Table, Tabled};

use covgap_rs::core::config::CovgapConfig;

use crate::cli::args::{InitConfigArgs, ValidateConfigArgs};
use crate::cli::config_layer::load_configuration;

/// Print default configuration in YAML format
pub async fn print_default_config() -> anyhow::Result<()> {
    println!("{}", "# Default covgap configuration".dimmed());
    println!(
        "{}",
        "# Save this to a file and customize as needed".dimmed()
    );
    println!(
        "{}",
        "# Usage: covgap analyze --config your-config.yml".dimmed()
    );
    println!();

    let yaml_output = serde_yaml::to_string(&CovgapConfig::default())?;
    println!("{}", yaml_output);

    Ok(())
}

/// Initialize a configuration file with defaults
pub async fn init_config(args: InitConfigArgs) -> anyhow::Result<()> {
    if args.output.exists() && !args.force {
        return Err(anyhow::anyhow!(
            "Configuration file already exists: {}. Use --force to overwrite or choose a different name with --output",
            args.output.display()
        ));
    }

    let yaml_content = serde_yaml::to_string(&CovgapConfig::default())?;
    tokio::fs::write(&args.output, yaml_content).await?;

    println!(
        "{} {}",
        "Configuration saved to:".bright_green().bold(),
        args.output.display().to_string().cyan()
    );
    println!();
    println!(
        "Run analysis with: {}",
        format!("covgap analyze --config {}", args.output.display()).cyan()
    );
    println!();

    #[derive(Tabled)]
    struct CustomizationRow {
        setting: &'static str,
        description: &'static str,
    }

    let customization_rows = vec![
        CustomizationRow {
            setting: "analysis.min_coverage_percent",
            description: "Methods strictly below this are reported (default: 80)",
        },
        CustomizationRow {
            setting: "analysis.exclude_accessors",
            description: "Skip get*/set*/is* methods (default: false)",
        },
        CustomizationRow {
            setting: "analysis.exclude_name_patterns",
            description: "Method name globs to skip",
        },
        CustomizationRow {
            setting: "analysis.include_packages",
            description: "Only analyze these package prefixes",
        },
        CustomizationRow {
            setting: "discovery.missing_report",
            description: "fail or empty when no report is found (default: empty)",
        },
        CustomizationRow {
            setting: "output.max_classes",
            description: "Keep only the top N classes",
        },
    ];

    let mut table = Table::new(customization_rows);
    table.with(TableStyle::rounded());
    println!("{}", table);

    Ok(())
}

/// Validate a covgap configuration file
pub async fn validate_config(args: ValidateConfigArgs) -> anyhow::Result<()> {
    println!(
        "{} {}",
        "Validating configuration:".bright_blue().bold(),
        args.config.display().to_string().cyan()
    );
    println!();

    let config = match load_configuration(Some(&args.config)) {
        Ok(config) => {
            println!("{}", "Configuration file is valid!".bright_green().bold());
            println!();
            config
        }
        Err(e) => {
            eprintln!("{} {}", "Configuration validation failed:".red(), e);
            eprintln!(
                "{}",
                "Tip: use 'covgap print-default-config' to see the expected format".dimmed()
            );
            return Err(anyhow::anyhow!("Configuration validation failed: {}", e));
        }
    };

    #[derive(Tabled)]
    struct DetailRow {
        setting: &'static str,
        value: String,
    }

    let analysis = &config.analysis;
    let detail_rows = vec![
        DetailRow {
            setting: "Minimum coverage",
            value: format!("{:.1}%", analysis.min_coverage_percent),
        },
        DetailRow {
            setting: "Exclude accessors",
            value: analysis.exclude_accessors.to_string(),
        },
        DetailRow {
            setting: "Exclude lambdas",
            value: analysis.exclude_lambdas.to_string(),
        },
        DetailRow {
            setting: "Name patterns",
            value: analysis.exclude_name_patterns.join(", "),
        },
        DetailRow {
            setting: "Included packages",
            value: analysis.include_packages.join(", "),
        },
        DetailRow {
            setting: "Discovery patterns",
            value: config.discovery.file_patterns.len().to_string(),
        },
        DetailRow {
            setting: "Missing reports",
            value: format!("{:?}", config.discovery.missing_report).to_lowercase(),
        },
        DetailRow {
            setting: "Max classes",
            value: config
                .output
                .max_classes
                .map_or_else(|| "all".to_string(), |n| n.to_string()),
        },
    ];

    let mut table = Table::new(detail_rows);
    table.with(TableStyle::rounded());
    println!("{}", table);

    Ok(())
}
