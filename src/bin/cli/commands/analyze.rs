//! Gap analysis command.

use owo_colors::OwoColorize;
use tracing::info;

use covgap_rs::api::engine::CovgapEngine;

use crate::cli::args::{AnalyzeArgs, OutputFormat};
use crate::cli::config_layer::build_layered_config;
use crate::cli::output::{render_gaps, write_output};

/// Analyze explicit reports, or discover them under `--base-dir`, and print
/// the ranked gaps.
pub async fn analyze_command(args: Box<AnalyzeArgs>) -> anyhow::Result<()> {
    let config = build_layered_config(&args)?;
    let limit = config.output.max_classes;
    let engine = CovgapEngine::new(config)?;

    let results = if args.reports.is_empty() {
        engine.analyze_directory(&args.base_dir).await?
    } else {
        engine.analyze_reports(&args.reports).await?
    };

    let rendered = render_gaps(&results, limit, args.format)?;
    let to_terminal = args.out.is_none() && args.format == OutputFormat::Table;
    if to_terminal {
        println!("{}", "Coverage gaps".bright_blue().bold());
        println!();
    }
    write_output(&rendered, args.out.as_deref()).await?;

    if let Some(out) = &args.out {
        info!("Results written to {}", out.display());
        eprintln!(
            "{} {}",
            "Results written to".bright_green(),
            out.display().to_string().cyan()
        );
    }
    Ok(())
}
