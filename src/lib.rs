//! # Covgap-RS: JaCoCo Coverage Gap Analysis
//!
//! Reads JaCoCo XML coverage reports and extracts the classes and methods
//! whose instruction coverage falls below a threshold, ranked by how many
//! instructions they leave untested:
//!
//! - **Parsing**: strict JaCoCo XML reader that tells ill-formed documents
//!   apart from well-formed documents with the wrong shape
//! - **Filtering**: an explicit [`FilterPolicy`] for test classes,
//!   constructors, accessors, lambdas and name patterns
//! - **Ranking**: classes ordered by missed instructions, ties kept in report order
//! - **Discovery**: locating reports in Maven and Gradle build trees
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        API Layer                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Core                    │  Detectors                       │
//! │ • Config                 │ • Coverage report parser         │
//! │ • Errors                 │ • Filter policy                  │
//! │ • Report discovery       │ • Gap analyzer                   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use covgap_rs::{CovgapConfig, CovgapEngine};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let engine = CovgapEngine::new(CovgapConfig::default())?;
//!     let results = engine.analyze_directory(".").await?;
//!
//!     for gap in results.ranked_gaps(Some(10)) {
//!         println!("{} ({} missed)", gap.class_name, gap.priority);
//!     }
//!     Ok(())
//! }
//! ```

#![warn(unsafe_code)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

// Configuration, errors and report discovery
pub mod core {
    //! Core configuration, error handling and report discovery.

    pub mod config;
    pub mod coverage_discovery;
    pub mod errors;
}

// Coverage analysis
pub mod detectors {
    //! Coverage report parsing and gap detection.

    pub mod coverage;
}

// Public API and engine interface
pub mod api {
    //! High-level API and engine interface.

    pub mod engine;
    pub mod results;
}

// Re-export primary types for convenience
pub use api::engine::CovgapEngine;
pub use api::results::{AnalysisResults, AnalysisSummary, ReportAnalysis};
pub use core::config::{CovgapConfig, DiscoveryConfig, MissingReportPolicy, OutputConfig};
pub use core::coverage_discovery::{CoverageDiscovery, DiscoveredReport};
pub use core::errors::{CovgapError, Result, ResultExt};
pub use detectors::coverage::{
    find_coverage_gaps, parse_jacoco_str, parse_jacoco_xml, parse_report, CoverageGap,
    CoverageGapAnalyzer, CoverageReport, ExclusionRule, FilterPolicy, GapAnalysisConfig,
    MethodGap,
};

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
