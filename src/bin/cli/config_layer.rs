//! Configuration Layer Management
//!
//! Defaults, then a configuration file (explicit `--config` or an implicit
//! `.covgap.yml`/`.covgap.yaml` in the working directory), then CLI flags.

use std::path::{Path, PathBuf};

use covgap_rs::core::config::{CovgapConfig, MissingReportPolicy};

use crate::cli::args::{AnalyzeArgs, FilterArgs};

/// Merge CLI overrides into a configuration, the overrides taking priority
pub trait ConfigMerge<T> {
    fn merge_with(&mut self, other: &T);
}

impl ConfigMerge<FilterArgs> for CovgapConfig {
    fn merge_with(&mut self, args: &FilterArgs) {
        let analysis = &mut self.analysis;
        if let Some(min_coverage) = args.min_coverage {
            analysis.min_coverage_percent = min_coverage;
        }
        if args.exclude_accessors {
            analysis.exclude_accessors = true;
        }
        if args.exclude_lambdas {
            analysis.exclude_lambdas = true;
        }
        extend_unique(&mut analysis.exclude_name_patterns, &args.exclude_patterns);
        extend_unique(&mut analysis.include_packages, &args.include_packages);
    }
}

impl ConfigMerge<AnalyzeArgs> for CovgapConfig {
    fn merge_with(&mut self, args: &AnalyzeArgs) {
        self.merge_with(&args.filters);
        if args.max_classes.is_some() {
            self.output.max_classes = args.max_classes;
        }
        if args.fail_on_missing {
            self.discovery.missing_report = MissingReportPolicy::Fail;
        }
    }
}

fn extend_unique(target: &mut Vec<String>, extra: &[String]) {
    for value in extra {
        if !target.contains(value) {
            target.push(value.clone());
        }
    }
}

/// The explicit path, else the first implicit config file that exists.
fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    explicit.map(Path::to_path_buf).or_else(|| {
        [".covgap.yml", ".covgap.yaml"]
            .iter()
            .map(PathBuf::from)
            .find(|p| p.exists())
    })
}

/// Load and validate configuration from a file, falling back to defaults.
pub fn load_configuration(config_path: Option<&Path>) -> anyhow::Result<CovgapConfig> {
    let config = match resolve_config_path(config_path) {
        Some(path) => CovgapConfig::from_yaml_file(&path).map_err(|e| {
            anyhow::anyhow!("Failed to load configuration from {}: {}", path.display(), e)
        })?,
        None => CovgapConfig::default(),
    };

    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Configuration validation failed: {}", e))?;
    Ok(config)
}

/// Build the effective configuration for `analyze`.
pub fn build_layered_config(args: &AnalyzeArgs) -> anyhow::Result<CovgapConfig> {
    let mut config = match resolve_config_path(args.config.as_deref()) {
        Some(path) => CovgapConfig::from_yaml_file(&path).map_err(|e| {
            anyhow::anyhow!("Failed to load configuration from {}: {}", path.display(), e)
        })?,
        None => CovgapConfig::default(),
    };

    config.merge_with(args);

    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Configuration validation failed: {}", e))?;
    Ok(config)
}
