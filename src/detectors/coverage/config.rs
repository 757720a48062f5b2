use serde::{Deserialize, Serialize};

use crate::core::config::validation::{validate_non_empty_patterns, validate_percentage};
use crate::core::errors::Result;

/// Threshold and filtering policy for coverage gap analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GapAnalysisConfig {
    /// Methods strictly below this instruction coverage (percent) are gaps
    pub min_coverage_percent: f64,

    /// Skip `get*`, `set*`, `is*`, `toString`, `hashCode` and `equals`
    pub exclude_accessors: bool,

    /// Skip `toString`, `hashCode` and `equals` only
    pub exclude_object_methods: bool,

    /// Skip compiler-generated `lambda$` bodies
    pub exclude_lambdas: bool,

    /// Skip `<clinit>` static initializers
    pub exclude_static_initializers: bool,

    /// Additional method-name globs to skip
    pub exclude_name_patterns: Vec<String>,

    /// Class-name globs (dotted form) to skip
    pub exclude_class_patterns: Vec<String>,

    /// Package-name globs to skip, matched case-insensitively
    pub exclude_packages: Vec<String>,

    /// Only analyze packages starting with one of these prefixes (empty = all)
    pub include_packages: Vec<String>,

    /// Skip classes whose name contains `Test`
    pub skip_test_classes: bool,

    /// Skip classes the report has no source file for
    pub require_source_file: bool,

    /// Order each class's methods by missed instructions instead of report order
    pub sort_methods_by_priority: bool,
}

impl Default for GapAnalysisConfig {
    fn default() -> Self {
        Self {
            min_coverage_percent: default_min_coverage_percent(),
            exclude_accessors: false,
            exclude_object_methods: false,
            exclude_lambdas: false,
            exclude_static_initializers: false,
            exclude_name_patterns: Vec::new(),
            exclude_class_patterns: Vec::new(),
            exclude_packages: Vec::new(),
            include_packages: Vec::new(),
            skip_test_classes: true,
            require_source_file: true,
            sort_methods_by_priority: false,
        }
    }
}

impl GapAnalysisConfig {
    /// Validate gap analysis configuration
    pub fn validate(&self) -> Result<()> {
        validate_percentage(self.min_coverage_percent, "analysis.min_coverage_percent")?;
        validate_non_empty_patterns(&self.exclude_name_patterns, "analysis.exclude_name_patterns")?;
        validate_non_empty_patterns(
            &self.exclude_class_patterns,
            "analysis.exclude_class_patterns",
        )?;
        validate_non_empty_patterns(&self.exclude_packages, "analysis.exclude_packages")?;
        validate_non_empty_patterns(&self.include_packages, "analysis.include_packages")?;
        Ok(())
    }
}

pub(crate) fn default_min_coverage_percent() -> f64 {
    80.0
}
