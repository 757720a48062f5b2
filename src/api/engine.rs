//! Main analysis engine implementation.

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use crate::api::results::{AnalysisResults, ReportAnalysis};
use crate::core::config::{CovgapConfig, MissingReportPolicy};
use crate::core::coverage_discovery::CoverageDiscovery;
use crate::core::errors::{CovgapError, Result, ResultExt};
use crate::detectors::coverage::analyzer::CoverageGapAnalyzer;
use crate::detectors::coverage::parsers::parse_jacoco_xml;
use crate::detectors::coverage::types::CoverageReport;

/// Main covgap analysis engine
pub struct CovgapEngine {
    /// Analyzer compiled from the analysis section
    analyzer: CoverageGapAnalyzer,

    /// Engine configuration
    config: Arc<CovgapConfig>,
}

impl CovgapEngine {
    /// Create a new engine, validating the configuration and compiling its
    /// filter policy.
    pub fn new(config: CovgapConfig) -> Result<Self> {
        config.validate()?;
        let analyzer = CoverageGapAnalyzer::from_config(&config.analysis)?;
        info!(
            "Covgap engine initialized (threshold {:.1}%, {} filter rules)",
            config.analysis.min_coverage_percent,
            analyzer.policy().rules().len()
        );

        Ok(Self {
            analyzer,
            config: Arc::new(config),
        })
    }

    /// Get the current configuration
    pub fn config(&self) -> &CovgapConfig {
        &self.config
    }

    pub fn analyzer(&self) -> &CoverageGapAnalyzer {
        &self.analyzer
    }

    /// Analyze one JaCoCo report file.
    pub async fn analyze_report<P: AsRef<Path>>(&self, path: P) -> Result<ReportAnalysis> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read coverage report at {}", path.display()))?;

        let report = parse_jacoco_xml(&bytes).with_context(|| path.display().to_string())?;
        self.analyze_parsed(path, report)
    }

    fn analyze_parsed(&self, path: &Path, report: CoverageReport) -> Result<ReportAnalysis> {
        let gaps = self
            .analyzer
            .find_coverage_gaps(&report, self.config.analysis.min_coverage_percent)?;

        info!(
            "Analyzed {}: {} classes below {:.1}%",
            path.display(),
            gaps.len(),
            self.config.analysis.min_coverage_percent
        );

        Ok(ReportAnalysis {
            report_path: path.to_path_buf(),
            statistics: report.statistics(),
            report_name: report.name,
            gaps,
        })
    }

    /// Analyze an explicit list of reports. Every report must be readable
    /// and valid.
    pub async fn analyze_reports<P: AsRef<Path>>(&self, paths: &[P]) -> Result<AnalysisResults> {
        info!("Starting analysis of {} reports", paths.len());

        let mut reports = Vec::with_capacity(paths.len());
        for path in paths {
            reports.push(self.analyze_report(path).await?);
        }

        Ok(AnalysisResults::from_reports(
            reports,
            self.config.analysis.min_coverage_percent,
        ))
    }

    /// Discover reports under `base_dir` and analyze each of them.
    ///
    /// When nothing is found the configured [`MissingReportPolicy`] decides
    /// between [`CovgapError::NoReports`] and an empty result.
    pub async fn analyze_directory<P: AsRef<Path>>(&self, base_dir: P) -> Result<AnalysisResults> {
        let base_dir = base_dir.as_ref();
        info!("Starting directory analysis: {}", base_dir.display());

        if !base_dir.exists() {
            return Err(CovgapError::io(
                format!("Path does not exist: {}", base_dir.display()),
                std::io::Error::new(std::io::ErrorKind::NotFound, "Path not found"),
            ));
        }

        let discovered = CoverageDiscovery::discover(base_dir, &self.config.discovery)?;
        if discovered.is_empty() {
            return self.no_reports(base_dir);
        }

        let reports = discovered
            .into_iter()
            .map(|found| self.analyze_parsed(&found.path, found.report))
            .collect::<Result<Vec<_>>>()?;
        let results =
            AnalysisResults::from_reports(reports, self.config.analysis.min_coverage_percent);
        info!(
            "Directory analysis completed: {} reports, {} classes with gaps",
            results.summary.reports_analyzed, results.summary.classes_with_gaps
        );
        Ok(results)
    }

    fn no_reports(&self, base_dir: &Path) -> Result<AnalysisResults> {
        match self.config.discovery.missing_report {
            MissingReportPolicy::Fail => Err(CovgapError::NoReports {
                base_dir: base_dir.to_path_buf(),
            }),
            MissingReportPolicy::Empty => {
                warn!("No JaCoCo reports found under {}", base_dir.display());
                Ok(AnalysisResults::empty(
                    self.config.analysis.min_coverage_percent,
                ))
            }
        }
    }
}
