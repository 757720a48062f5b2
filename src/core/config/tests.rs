use super::*;
use tempfile::tempdir;

fn expect_validation_error<T: std::fmt::Debug>(result: Result<T>) -> CovgapError {
    result.expect_err("expected validation failure")
}

#[test]
fn default_configs_validate_successfully() {
    CovgapConfig::default().validate().expect("covgap default");
    GapAnalysisConfig::default()
        .validate()
        .expect("analysis default");
    DiscoveryConfig::default()
        .validate()
        .expect("discovery default");
}

#[test]
fn default_threshold_is_eighty_percent() {
    let config = CovgapConfig::default();
    assert_eq!(config.analysis.min_coverage_percent, 80.0);
    assert!(!config.analysis.exclude_accessors);
    assert!(config.analysis.skip_test_classes);
    assert_eq!(config.discovery.missing_report, MissingReportPolicy::Empty);
}

#[test]
fn threshold_bounds_are_enforced() {
    let mut config = CovgapConfig::default();
    config.analysis.min_coverage_percent = 120.0;
    let err = expect_validation_error(config.validate());
    assert!(matches!(err, CovgapError::Validation { .. }));
    assert!(format!("{err}").contains("min_coverage_percent"));
}

#[test]
fn discovery_requires_some_strategy() {
    let mut config = DiscoveryConfig::default();
    config.file_patterns.clear();
    config.validate().expect("xml scan alone is enough");

    config.scan_all_xml = false;
    let err = expect_validation_error(config.validate());
    assert!(format!("{err}").contains("file_patterns"));
}

#[test]
fn blank_patterns_are_rejected() {
    let mut config = CovgapConfig::default();
    config.analysis.exclude_name_patterns = vec!["  ".to_string()];
    let err = expect_validation_error(config.validate());
    assert!(format!("{err}").contains("exclude_name_patterns"));
}

#[test]
fn zero_max_classes_is_rejected() {
    let mut config = CovgapConfig::default();
    config.output.max_classes = Some(0);
    let err = expect_validation_error(config.validate());
    assert!(format!("{err}").contains("max_classes"));
}

#[test]
fn partial_yaml_fills_defaults() {
    let yaml = r#"
analysis:
  min_coverage_percent: 65.0
  exclude_accessors: true
  exclude_name_patterns:
    - "lambda$*"
discovery:
  missing_report: fail
"#;
    let config: CovgapConfig = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(config.analysis.min_coverage_percent, 65.0);
    assert!(config.analysis.exclude_accessors);
    assert!(config.analysis.require_source_file);
    assert_eq!(config.discovery.missing_report, MissingReportPolicy::Fail);
    assert_eq!(
        config.discovery.file_patterns,
        DiscoveryConfig::default().file_patterns
    );
    assert_eq!(config.output.max_classes, None);
}

#[test]
fn yaml_file_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("covgap.yml");

    let mut config = CovgapConfig::default();
    config.analysis.include_packages = vec!["org.kiwiproject".to_string()];
    config.output.max_classes = Some(5);
    config.to_yaml_file(&path).unwrap();

    let loaded = CovgapConfig::from_yaml_file(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn missing_config_file_is_io_error() {
    let err = CovgapConfig::from_yaml_file("/no/such/covgap.yml").unwrap_err();
    assert!(matches!(err, CovgapError::Io { .. }));
}
