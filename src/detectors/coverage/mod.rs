//! JaCoCo coverage gap analysis: report tree, parser, filter policy and analyzer.

pub mod analyzer;
pub mod config;
pub mod filter;
pub mod parsers;
pub mod types;

pub use analyzer::{find_coverage_gaps, CoverageGapAnalyzer};
pub use config::GapAnalysisConfig;
pub use filter::{ExclusionRule, FilterPolicy};
pub use parsers::{parse_jacoco_str, parse_jacoco_xml, parse_report};
pub use types::*;

#[cfg(test)]
mod tests;
