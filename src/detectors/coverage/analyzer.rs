//! Coverage gap extraction and ranking.
//!
//! The analyzer walks a parsed [`CoverageReport`] once, applies the
//! [`FilterPolicy`], and keeps every class that has at least one method whose
//! instruction coverage is strictly below the threshold. Classes are ranked by
//! the number of instructions their qualifying methods miss. The walk is a
//! pure function of its inputs, so one analyzer can be shared across threads.

use tracing::{debug, trace};

use crate::core::config::validation::validate_percentage;
use crate::core::errors::{CovgapError, Result};

use super::config::GapAnalysisConfig;
use super::filter::FilterPolicy;
use super::types::{
    coverage_percentage, ClassCoverage, CoverageGap, CoverageReport, MethodGap,
};

/// Finds classes and methods that fall below a coverage threshold.
#[derive(Debug, Clone, Default)]
pub struct CoverageGapAnalyzer {
    policy: FilterPolicy,
    sort_methods_by_priority: bool,
}

impl CoverageGapAnalyzer {
    pub fn new(policy: FilterPolicy) -> Self {
        Self {
            policy,
            sort_methods_by_priority: false,
        }
    }

    /// Build an analyzer whose policy and method ordering follow `config`.
    pub fn from_config(config: &GapAnalysisConfig) -> Result<Self> {
        Ok(Self::new(FilterPolicy::from_config(config)?)
            .with_method_sorting(config.sort_methods_by_priority))
    }

    /// Order each gap's methods by missed instructions (stable) instead of
    /// report order.
    pub fn with_method_sorting(mut self, enabled: bool) -> Self {
        self.sort_methods_by_priority = enabled;
        self
    }

    pub fn policy(&self) -> &FilterPolicy {
        &self.policy
    }

    /// Rank the classes in `report` that have methods below `min_coverage` percent.
    ///
    /// The result is ordered by priority, highest first; classes with equal
    /// priority stay in report order. An empty result means nothing fell
    /// below the threshold.
    pub fn find_coverage_gaps(
        &self,
        report: &CoverageReport,
        min_coverage: f64,
    ) -> Result<Vec<CoverageGap>> {
        validate_percentage(min_coverage, "min_coverage")?;
        if report.packages.is_empty() {
            return Err(CovgapError::malformed_element(
                "report contains no <package> elements",
                "report",
            ));
        }

        let mut gaps = Vec::new();
        for package in &report.packages {
            if self.policy.excludes_package(&package.name) {
                trace!("Skipping package {}", package.name);
                continue;
            }
            for class in &package.classes {
                if self.policy.excludes_class(class) {
                    trace!("Skipping class {}", class.name);
                    continue;
                }
                if let Some(gap) = self.class_gap(&package.name, class, min_coverage) {
                    debug!(
                        "Class {}: coverage={:.1}%, methods={}/{} need testing",
                        gap.class_name,
                        gap.class_coverage,
                        gap.methods.len(),
                        gap.eligible_methods
                    );
                    gaps.push(gap);
                }
            }
        }

        // `sort_by` is stable, so equal priorities keep report order.
        gaps.sort_by(|a, b| b.priority.cmp(&a.priority));
        debug!("Found {} classes below {:.1}% coverage", gaps.len(), min_coverage);
        Ok(gaps)
    }

    fn class_gap(
        &self,
        package: &str,
        class: &ClassCoverage,
        min_coverage: f64,
    ) -> Option<CoverageGap> {
        let mut methods = Vec::new();
        let mut eligible = 0usize;
        let mut covered = 0usize;

        for method in &class.methods {
            if self.policy.excludes_method(method) {
                continue;
            }
            eligible += 1;

            let Some(counter) = method.instruction() else {
                continue;
            };
            if counter.covered > 0 {
                covered += 1;
            }
            let percentage = counter.percentage();
            if percentage < min_coverage {
                methods.push(MethodGap {
                    name: method.name.clone(),
                    descriptor: method.descriptor.clone(),
                    line: method.line,
                    coverage_percentage: percentage,
                    missed_instructions: counter.missed,
                    covered_instructions: counter.covered,
                    priority: counter.missed,
                });
            }
        }

        if methods.is_empty() {
            return None;
        }
        if self.sort_methods_by_priority {
            methods.sort_by(|a, b| b.priority.cmp(&a.priority));
        }

        let priority = methods
            .iter()
            .fold(0u64, |acc, m| acc.saturating_add(m.missed_instructions));
        Some(CoverageGap {
            package: package.to_string(),
            class_name: class.name.clone(),
            source_file: class.source_file.clone(),
            methods,
            class_coverage: coverage_percentage(covered as u64, eligible as u64),
            eligible_methods: eligible,
            covered_methods: covered,
            priority,
        })
    }
}

/// [`CoverageGapAnalyzer::find_coverage_gaps`] with the standard policy.
pub fn find_coverage_gaps(report: &CoverageReport, min_coverage: f64) -> Result<Vec<CoverageGap>> {
    CoverageGapAnalyzer::default().find_coverage_gaps(report, min_coverage)
}
