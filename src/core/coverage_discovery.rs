//! JaCoCo report discovery.
//!
//! Reports are located by trying the configured glob patterns in order and,
//! when none of them match, by scanning every `*.xml` file under the base
//! directory for a `<report>` root. Each candidate is parsed to make sure it
//! actually holds packages before it is returned.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Utc};
use indexmap::IndexSet;
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::core::config::DiscoveryConfig;
use crate::core::errors::{CovgapError, Result, ResultExt};
use crate::detectors::coverage::parsers::parse_jacoco_xml;
use crate::detectors::coverage::types::{CoverageReport, ReportStatistics};

/// A validated JaCoCo report found on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveredReport {
    /// Path to the report
    pub path: PathBuf,
    /// `name` attribute of the `<report>` root
    pub name: Option<String>,
    /// Last modified time
    pub modified: DateTime<Utc>,
    /// File size in bytes
    pub size: u64,
    /// Element counts from the parsed report
    pub statistics: ReportStatistics,
    /// The parsed report, kept so analysis does not read the file again
    #[serde(skip)]
    pub report: CoverageReport,
}

/// JaCoCo report discovery utility
pub struct CoverageDiscovery;

impl CoverageDiscovery {
    /// Find and validate JaCoCo reports under `base_dir`, in discovery order.
    pub fn discover(base_dir: &Path, config: &DiscoveryConfig) -> Result<Vec<DiscoveredReport>> {
        if !base_dir.is_dir() {
            return Err(CovgapError::validation_field(
                format!("Base directory does not exist: {}", base_dir.display()),
                "base_dir",
            ));
        }
        info!("Searching for JaCoCo reports in {}", base_dir.display());

        let mut candidates = Self::find_by_patterns(base_dir, &config.file_patterns);
        if candidates.is_empty() && config.scan_all_xml {
            info!("No reports found in common locations, scanning all XML files");
            candidates = Self::scan_xml_files(base_dir);
        }

        let max_age = (config.max_age_days > 0)
            .then(|| Duration::from_secs(u64::from(config.max_age_days) * 24 * 60 * 60));

        let mut reports = Vec::new();
        for path in candidates {
            match Self::validate_report(&path, max_age) {
                Ok(Some(report)) => {
                    info!(
                        "Validated JaCoCo report: {} ({} packages, {} classes, {} methods)",
                        report.path.display(),
                        report.statistics.packages,
                        report.statistics.classes,
                        report.statistics.methods
                    );
                    reports.push(report);
                }
                Ok(None) => {}
                Err(err) => warn!("Not a valid JaCoCo report: {}: {}", path.display(), err),
            }
        }

        info!("Discovered {} JaCoCo reports", reports.len());
        Ok(reports)
    }

    /// Glob each pattern relative to `base_dir`, keeping first-seen order.
    pub fn find_by_patterns(base_dir: &Path, patterns: &[String]) -> Vec<PathBuf> {
        let base = glob::Pattern::escape(&base_dir.to_string_lossy());
        let mut found: IndexSet<PathBuf> = IndexSet::new();

        for pattern in patterns {
            let full_pattern = format!("{}/{}", base.trim_end_matches('/'), pattern);
            let Ok(paths) = glob::glob(&full_pattern) else {
                debug!("Glob pattern failed: {}", full_pattern);
                continue;
            };
            let before = found.len();
            for entry in paths.flatten() {
                if entry.is_file() {
                    found.insert(entry);
                }
            }
            if found.len() > before {
                debug!(
                    "Found {} reports matching pattern: {}",
                    found.len() - before,
                    pattern
                );
            }
        }

        found.into_iter().collect()
    }

    /// Walk `base_dir` for `*.xml` files whose root element is `<report>`.
    /// Hidden directories are skipped.
    pub fn scan_xml_files(base_dir: &Path) -> Vec<PathBuf> {
        WalkDir::new(base_dir)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry.file_name()))
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(walkdir::DirEntry::into_path)
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"))
            })
            .filter(|path| has_report_root(path))
            .collect()
    }

    /// Parse the candidate and collect its metadata. `Ok(None)` means the
    /// file is older than `max_age`.
    pub fn validate_report(path: &Path, max_age: Option<Duration>) -> Result<Option<DiscoveredReport>> {
        let metadata = fs::metadata(path)
            .with_context(|| format!("Failed to read metadata for {}", path.display()))?;
        let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);

        if let Some(max_age) = max_age {
            if let Ok(elapsed) = modified.elapsed() {
                if elapsed > max_age {
                    debug!("Report too old: {} (age: {:?})", path.display(), elapsed);
                    return Ok(None);
                }
            }
        }

        let bytes = fs::read(path)
            .with_context(|| format!("Failed to read coverage report at {}", path.display()))?;
        let report = parse_jacoco_xml(&bytes).with_context(|| path.display().to_string())?;

        Ok(Some(DiscoveredReport {
            path: path.to_path_buf(),
            name: report.name.clone(),
            modified: DateTime::<Utc>::from(modified),
            size: metadata.len(),
            statistics: report.statistics(),
            report,
        }))
    }
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_str().is_some_and(|s| s.starts_with('.'))
}

/// Cheap check of the first start tag, without building the tree.
fn has_report_root(path: &Path) -> bool {
    let Ok(bytes) = fs::read(path) else {
        return false;
    };
    let mut reader = Reader::from_reader(bytes.as_slice());
    reader.trim_text(true);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(tag)) | Ok(Event::Empty(tag)) => {
                return tag.name().as_ref() == b"report";
            }
            Ok(Event::Eof) | Err(_) => return false,
            _ => {}
        }
        buf.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const REPORT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<report name="module">
  <package name="com/example">
    <class name="com/example/Foo" sourcefilename="Foo.java">
      <method name="bar" desc="()V"><counter type="INSTRUCTION" missed="3" covered="1"/></method>
    </class>
  </package>
</report>"#;

    fn write(root: &Path, relative: &str, content: &str) -> PathBuf {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_finds_reports_in_maven_modules() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(root, "module-a/target/site/jacoco/jacoco.xml", REPORT);
        write(root, "module-b/target/site/jacoco/jacoco.xml", REPORT);

        let reports = CoverageDiscovery::discover(root, &DiscoveryConfig::default()).unwrap();
        assert_eq!(reports.len(), 2);
        assert!(reports[0].path.ends_with("module-a/target/site/jacoco/jacoco.xml"));
        assert_eq!(reports[0].name.as_deref(), Some("module"));
        assert_eq!(reports[0].statistics.methods, 1);
        assert_eq!(reports[0].report.statistics(), reports[0].statistics);
    }

    #[test]
    fn test_overlapping_patterns_are_deduplicated() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(root, "target/site/jacoco/jacoco.xml", REPORT);

        let found = CoverageDiscovery::find_by_patterns(
            root,
            &DiscoveryConfig::default().file_patterns,
        );
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_invalid_candidates_are_dropped() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(root, "target/site/jacoco/jacoco.xml", "<report name=\"empty\"/>");
        write(root, "other/jacoco.xml", "<report><package");

        let reports = CoverageDiscovery::discover(root, &DiscoveryConfig::default()).unwrap();
        assert!(reports.is_empty());
    }

    #[test]
    fn test_fallback_scan_checks_root_element() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(root, "reports/custom-name.xml", REPORT);
        write(root, "pom.xml", "<project><artifactId>demo</artifactId></project>");
        write(root, ".hidden/coverage.xml", REPORT);

        let reports = CoverageDiscovery::discover(root, &DiscoveryConfig::default()).unwrap();
        assert_eq!(reports.len(), 1);
        assert!(reports[0].path.ends_with("reports/custom-name.xml"));
    }

    #[test]
    fn test_fallback_scan_can_be_disabled() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(root, "reports/custom-name.xml", REPORT);

        let config = DiscoveryConfig {
            scan_all_xml: false,
            ..DiscoveryConfig::default()
        };
        assert!(CoverageDiscovery::discover(root, &config).unwrap().is_empty());
    }

    #[test]
    fn test_missing_base_dir_is_rejected() {
        let err = CoverageDiscovery::discover(
            Path::new("/definitely/not/a/dir"),
            &DiscoveryConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, CovgapError::Validation { .. }));
    }

    #[test]
    fn test_validate_report_respects_age() {
        let temp_dir = TempDir::new().unwrap();
        let path = write(temp_dir.path(), "jacoco.xml", REPORT);

        let fresh = CoverageDiscovery::validate_report(&path, Some(Duration::from_secs(3600)))
            .unwrap();
        assert!(fresh.is_some());

        std::thread::sleep(Duration::from_millis(20));
        let stale = CoverageDiscovery::validate_report(&path, Some(Duration::from_millis(1)))
            .unwrap();
        assert!(stale.is_none());
    }
}
