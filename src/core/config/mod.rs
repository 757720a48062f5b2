//! Configuration types and management for covgap-rs.
//!
//! [`CovgapConfig`] groups three sections: the gap analysis threshold and
//! filter policy, report discovery, and output limits. Every section has
//! serde defaults so a partial YAML file is enough.

pub mod validation;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core::errors::{CovgapError, Result, ResultExt};
pub use crate::detectors::coverage::config::GapAnalysisConfig;

pub use validation::{validate_non_empty_patterns, validate_percentage, validate_positive_usize};

/// Main configuration for the covgap engine
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CovgapConfig {
    /// Threshold and filter policy
    #[serde(default)]
    pub analysis: GapAnalysisConfig,

    /// JaCoCo report discovery
    #[serde(default)]
    pub discovery: DiscoveryConfig,

    /// Result limits
    #[serde(default)]
    pub output: OutputConfig,
}

/// Configuration construction and I/O methods for [`CovgapConfig`].
impl CovgapConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        serde_yaml::from_str(&content).map_err(Into::into)
    }

    /// Save configuration to a YAML file
    pub fn to_yaml_file(&self, path: impl Into<PathBuf>) -> Result<()> {
        let path = path.into();
        let content = serde_yaml::to_string(self)?;
        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<()> {
        self.analysis.validate()?;
        self.discovery.validate()?;
        self.output.validate()?;
        Ok(())
    }
}

/// What to do when discovery finds no usable report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingReportPolicy {
    /// Return an error
    Fail,
    /// Return an empty result
    #[default]
    Empty,
}

/// Configuration for JaCoCo report discovery
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Glob patterns, relative to the base directory, tried in order
    pub file_patterns: Vec<String>,

    /// When no pattern matches, inspect every `*.xml` file for a `<report>` root
    pub scan_all_xml: bool,

    /// Maximum age of reports in days (0 = no age limit)
    pub max_age_days: u32,

    /// Behaviour when nothing usable is found
    pub missing_report: MissingReportPolicy,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            file_patterns: vec![
                "**/target/site/jacoco/jacoco.xml".to_string(),
                "**/target/site/jacoco-aggregate/jacoco.xml".to_string(),
                "**/target/site/jacoco-it/jacoco.xml".to_string(),
                "**/build/reports/jacoco/test/jacocoTestReport.xml".to_string(),
                "**/jacoco.xml".to_string(),
            ],
            scan_all_xml: true,
            max_age_days: 0,
            missing_report: MissingReportPolicy::default(),
        }
    }
}

impl DiscoveryConfig {
    /// Validate discovery configuration
    pub fn validate(&self) -> Result<()> {
        if self.file_patterns.is_empty() && !self.scan_all_xml {
            return Err(CovgapError::validation_field(
                "file_patterns cannot be empty when scan_all_xml is disabled",
                "discovery.file_patterns",
            ));
        }
        validate_non_empty_patterns(&self.file_patterns, "discovery.file_patterns")
    }
}

/// Limits applied to ranked results
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Keep only the top N classes (unset = all)
    pub max_classes: Option<usize>,
}

impl OutputConfig {
    /// Validate output configuration
    pub fn validate(&self) -> Result<()> {
        if let Some(max) = self.max_classes {
            validate_positive_usize(max, "output.max_classes")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
