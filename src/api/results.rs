//! Analysis results and reporting structures.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::detectors::coverage::types::{CoverageGap, ReportStatistics};

/// Gaps found in a single JaCoCo report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportAnalysis {
    /// Path the report was read from
    pub report_path: PathBuf,

    /// `name` attribute of the `<report>` root
    pub report_name: Option<String>,

    /// Element counts for the report
    pub statistics: ReportStatistics,

    /// Ranked gaps, highest priority first
    pub gaps: Vec<CoverageGap>,
}

impl ReportAnalysis {
    /// Number of methods below the threshold across all gaps
    pub fn qualifying_methods(&self) -> usize {
        self.gaps.iter().map(|gap| gap.methods.len()).sum()
    }

    /// Missed instructions across all qualifying methods
    pub fn missed_instructions(&self) -> u64 {
        self.gaps.iter().map(|gap| gap.priority).sum()
    }
}

/// Summary of a multi-report analysis
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    /// Number of reports analyzed
    pub reports_analyzed: usize,

    /// Classes with at least one method below the threshold
    pub classes_with_gaps: usize,

    /// Methods below the threshold
    pub qualifying_methods: usize,

    /// Missed instructions across all qualifying methods
    pub total_missed_instructions: u64,

    /// Threshold the analysis ran with, in percent
    pub min_coverage_percent: f64,
}

/// High-level analysis results for public API consumption
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResults {
    /// Summary of the analysis
    pub summary: AnalysisSummary,

    /// Per-report results, in discovery order
    pub reports: Vec<ReportAnalysis>,
}

impl AnalysisResults {
    /// Build results and their summary from per-report analyses.
    pub fn from_reports(reports: Vec<ReportAnalysis>, min_coverage_percent: f64) -> Self {
        let summary = AnalysisSummary {
            reports_analyzed: reports.len(),
            classes_with_gaps: reports.iter().map(|r| r.gaps.len()).sum(),
            qualifying_methods: reports.iter().map(ReportAnalysis::qualifying_methods).sum(),
            total_missed_instructions: reports.iter().map(ReportAnalysis::missed_instructions).sum(),
            min_coverage_percent,
        };
        Self { summary, reports }
    }

    /// Empty results, used when no report was found and that is not fatal.
    pub fn empty(min_coverage_percent: f64) -> Self {
        Self::from_reports(Vec::new(), min_coverage_percent)
    }

    pub fn is_empty(&self) -> bool {
        self.reports.iter().all(|report| report.gaps.is_empty())
    }

    /// Gaps from every report merged into one ranking.
    ///
    /// Equal priorities keep report order, then in-report order. `limit`
    /// keeps only the top N classes.
    pub fn ranked_gaps(&self, limit: Option<usize>) -> Vec<&CoverageGap> {
        let mut gaps: Vec<&CoverageGap> = self.reports.iter().flat_map(|r| r.gaps.iter()).collect();
        gaps.sort_by(|a, b| b.priority.cmp(&a.priority));
        if let Some(limit) = limit {
            gaps.truncate(limit);
        }
        gaps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gap(class_name: &str, priority: u64) -> CoverageGap {
        CoverageGap {
            package: "com.example".to_string(),
            class_name: class_name.to_string(),
            source_file: Some(format!("{}.java", class_name)),
            methods: vec![crate::detectors::coverage::types::MethodGap {
                name: "run".to_string(),
                descriptor: None,
                line: None,
                coverage_percentage: 0.0,
                missed_instructions: priority,
                covered_instructions: 0,
                priority,
            }],
            class_coverage: 0.0,
            eligible_methods: 1,
            covered_methods: 0,
            priority,
        }
    }

    fn report(path: &str, gaps: Vec<CoverageGap>) -> ReportAnalysis {
        ReportAnalysis {
            report_path: PathBuf::from(path),
            report_name: None,
            statistics: ReportStatistics::default(),
            gaps,
        }
    }

    #[test]
    fn test_summary_totals() {
        let results = AnalysisResults::from_reports(
            vec![
                report("a.xml", vec![gap("A", 5), gap("B", 3)]),
                report("b.xml", vec![gap("C", 7)]),
            ],
            80.0,
        );

        assert_eq!(results.summary.reports_analyzed, 2);
        assert_eq!(results.summary.classes_with_gaps, 3);
        assert_eq!(results.summary.qualifying_methods, 3);
        assert_eq!(results.summary.total_missed_instructions, 15);
        assert!(!results.is_empty());
    }

    #[test]
    fn test_ranked_gaps_merge_and_limit() {
        let results = AnalysisResults::from_reports(
            vec![
                report("a.xml", vec![gap("A", 5), gap("B", 3)]),
                report("b.xml", vec![gap("C", 7), gap("D", 5)]),
            ],
            80.0,
        );

        let names: Vec<_> = results
            .ranked_gaps(None)
            .iter()
            .map(|g| g.class_name.as_str())
            .collect();
        assert_eq!(names, vec!["C", "A", "D", "B"]);

        let top = results.ranked_gaps(Some(2));
        assert_eq!(top.len(), 2);
        assert_eq!(top[1].class_name, "A");
    }

    #[test]
    fn test_empty_results() {
        let results = AnalysisResults::empty(70.0);
        assert!(results.is_empty());
        assert_eq!(results.summary.reports_analyzed, 0);
        assert_eq!(results.summary.min_coverage_percent, 70.0);
        assert!(results.ranked_gaps(Some(3)).is_empty());
    }
}
