//! Output Formatting and Display Functions
//!
//! Rendering of ranked gaps and discovered reports as tables, JSON or YAML.
//! Rendered text carries no ANSI styling so it can be written to files.

use std::path::Path;

use serde::Serialize;
use tabled::{settings::Style as TableStyle, Table, Tabled};

use covgap_rs::api::results::{AnalysisResults, AnalysisSummary};
use covgap_rs::core::coverage_discovery::DiscoveredReport;
use covgap_rs::detectors::coverage::types::CoverageGap;

use crate::cli::args::OutputFormat;

/// Serialized shape of `analyze` output
#[derive(Debug, Serialize)]
pub struct GapReport<'a> {
    pub summary: &'a AnalysisSummary,
    pub gaps: Vec<&'a CoverageGap>,
}

impl<'a> GapReport<'a> {
    pub fn new(results: &'a AnalysisResults, limit: Option<usize>) -> Self {
        Self {
            summary: &results.summary,
            gaps: results.ranked_gaps(limit),
        }
    }
}

/// Render ranked gaps in the requested format.
pub fn render_gaps(
    results: &AnalysisResults,
    limit: Option<usize>,
    format: OutputFormat,
) -> anyhow::Result<String> {
    let report = GapReport::new(results, limit);
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&report)?),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(&report)?),
        OutputFormat::Table => Ok(gap_tables(&report)),
    }
}

#[derive(Tabled)]
struct ClassRow {
    #[tabled(rename = "#")]
    rank: usize,
    #[tabled(rename = "Class")]
    class: String,
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Class Coverage")]
    coverage: String,
    #[tabled(rename = "Methods")]
    methods: String,
    #[tabled(rename = "Missed")]
    missed: u64,
}

#[derive(Tabled)]
struct MethodRow {
    #[tabled(rename = "#")]
    rank: usize,
    #[tabled(rename = "Method")]
    method: String,
    #[tabled(rename = "Line")]
    line: String,
    #[tabled(rename = "Coverage")]
    coverage: String,
    #[tabled(rename = "Missed")]
    missed: u64,
}

fn gap_tables(report: &GapReport<'_>) -> String {
    let summary = report.summary;
    let mut out = format!(
        "Reports analyzed: {}\nClasses below {:.1}%: {}\nMethods needing tests: {}\nMissed instructions: {}\n",
        summary.reports_analyzed,
        summary.min_coverage_percent,
        summary.classes_with_gaps,
        summary.qualifying_methods,
        summary.total_missed_instructions
    );

    if report.gaps.is_empty() {
        out.push_str("\nNo coverage gaps found.\n");
        return out;
    }

    let class_rows: Vec<ClassRow> = report
        .gaps
        .iter()
        .enumerate()
        .map(|(index, gap)| ClassRow {
            rank: index + 1,
            class: gap.class_name.clone(),
            source: gap.source_file.clone().unwrap_or_default(),
            coverage: format!("{:.1}%", gap.class_coverage),
            methods: format!("{}/{}", gap.methods.len(), gap.eligible_methods),
            missed: gap.priority,
        })
        .collect();
    let mut table = Table::new(class_rows);
    table.with(TableStyle::rounded());
    out.push('\n');
    out.push_str(&table.to_string());
    out.push('\n');

    let method_rows: Vec<MethodRow> = report
        .gaps
        .iter()
        .enumerate()
        .flat_map(|(index, gap)| {
            gap.methods.iter().map(move |method| MethodRow {
                rank: index + 1,
                method: format!("{}.{}", gap.simple_name(), method.name),
                line: method.line.map(|l| l.to_string()).unwrap_or_default(),
                coverage: format!("{:.1}%", method.coverage_percentage),
                missed: method.missed_instructions,
            })
        })
        .collect();
    let mut table = Table::new(method_rows);
    table.with(TableStyle::rounded());
    out.push('\n');
    out.push_str(&table.to_string());
    out.push('\n');
    out
}

#[derive(Tabled)]
struct DiscoveredRow {
    #[tabled(rename = "Report")]
    path: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Packages")]
    packages: usize,
    #[tabled(rename = "Classes")]
    classes: usize,
    #[tabled(rename = "Methods")]
    methods: usize,
    #[tabled(rename = "Coverage")]
    coverage: String,
    #[tabled(rename = "Modified")]
    modified: String,
}

/// Render discovered reports in the requested format.
pub fn render_discovered(reports: &[DiscoveredReport], format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(reports)?),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(reports)?),
        OutputFormat::Table => {
            if reports.is_empty() {
                return Ok("No JaCoCo reports found.\n".to_string());
            }
            let rows: Vec<DiscoveredRow> = reports
                .iter()
                .map(|report| DiscoveredRow {
                    path: report.path.display().to_string(),
                    name: report.name.clone().unwrap_or_default(),
                    packages: report.statistics.packages,
                    classes: report.statistics.classes,
                    methods: report.statistics.methods,
                    coverage: format!("{:.1}%", report.statistics.instruction_coverage),
                    modified: report.modified.format("%Y-%m-%d %H:%M").to_string(),
                })
                .collect();
            let mut table = Table::new(rows);
            table.with(TableStyle::rounded());
            Ok(format!("{}\n", table))
        }
    }
}

/// Write rendered output to `out`, or stdout when unset.
pub async fn write_output(content: &str, out: Option<&Path>) -> anyhow::Result<()> {
    match out {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(path, content).await?;
        }
        None => print!("{}", content),
    }
    Ok(())
}
