//! Error types for the covgap-rs library.
//!
//! Every fallible operation returns [`Result`], whose error side is the
//! structured [`CovgapError`]. Report problems are split in two: a document
//! that is not well-formed XML is a [`CovgapError::Parse`], while well-formed
//! XML with the wrong shape is a [`CovgapError::MalformedReport`]. Callers that
//! prefer to treat either as "no gaps" can test [`CovgapError::is_report_error`].

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Main result type for covgap operations.
pub type Result<T> = std::result::Result<T, CovgapError>;

/// Error type for all covgap operations.
#[derive(Error, Debug)]
pub enum CovgapError {
    /// I/O related errors (reading reports, writing output)
    #[error("I/O error: {message}")]
    Io {
        /// Human-readable error message
        message: String,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config {
        /// Error description
        message: String,
        /// Configuration field that caused the error
        field: Option<String>,
    },

    /// The input document is not well-formed
    #[error("Parse error in {format}: {message}")]
    Parse {
        /// Document format being parsed
        format: String,
        /// Error description
        message: String,
        /// Byte offset into the document (if available)
        position: Option<usize>,
    },

    /// Well-formed XML that does not have the JaCoCo report shape
    #[error("Malformed coverage report: {message}")]
    MalformedReport {
        /// Error description
        message: String,
        /// Element that violated the expected shape
        element: Option<String>,
    },

    /// Validation errors for input values
    #[error("Validation error: {message}")]
    Validation {
        /// Error description
        message: String,
        /// Field or input that failed validation
        field: Option<String>,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error description
        message: String,
        /// Data type being serialized
        data_type: Option<String>,
        /// Underlying serialization error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Discovery found no usable coverage report
    #[error("No valid JaCoCo reports found under {}", base_dir.display())]
    NoReports {
        /// Directory that was searched
        base_dir: PathBuf,
    },
}

impl CovgapError {
    /// Create a new I/O error with context
    pub fn io(message: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            field: None,
        }
    }

    /// Create a new configuration error with field context
    pub fn config_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a new parse error
    pub fn parse(format: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            format: format.into(),
            message: message.into(),
            position: None,
        }
    }

    /// Create a new parse error at a byte offset
    pub fn parse_at(format: impl Into<String>, message: impl Into<String>, position: usize) -> Self {
        Self::Parse {
            format: format.into(),
            message: message.into(),
            position: Some(position),
        }
    }

    /// Create a new malformed-report error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedReport {
            message: message.into(),
            element: None,
        }
    }

    /// Create a new malformed-report error naming the offending element
    pub fn malformed_element(message: impl Into<String>, element: impl Into<String>) -> Self {
        Self::MalformedReport {
            message: message.into(),
            element: Some(element.into()),
        }
    }

    /// Create a new validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field: None,
        }
    }

    /// Create a new validation error with field context
    pub fn validation_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// True for errors describing a bad report document.
    pub fn is_report_error(&self) -> bool {
        matches!(self, Self::Parse { .. } | Self::MalformedReport { .. })
    }

    /// Prefix the message of I/O and report errors with context, usually a path
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        match &mut self {
            Self::Io { message, .. }
            | Self::Parse { message, .. }
            | Self::MalformedReport { message, .. } => {
                *message = format!("{}: {}", context.into(), message);
            }
            _ => {}
        }
        self
    }
}

impl From<io::Error> for CovgapError {
    fn from(err: io::Error) -> Self {
        Self::io("I/O operation failed", err)
    }
}

impl From<serde_json::Error> for CovgapError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            message: format!("JSON serialization failed: {err}"),
            data_type: Some("JSON".to_string()),
            source: Some(Box::new(err)),
        }
    }
}

impl From<serde_yaml::Error> for CovgapError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Serialization {
            message: format!("YAML serialization failed: {err}"),
            data_type: Some("YAML".to_string()),
            source: Some(Box::new(err)),
        }
    }
}

impl From<quick_xml::Error> for CovgapError {
    fn from(err: quick_xml::Error) -> Self {
        Self::parse("xml", err.to_string())
    }
}

/// Result extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;

    /// Add static context to an error result
    fn context(self, msg: &'static str) -> Result<T>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<CovgapError>,
{
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.into().with_context(f()))
    }

    fn context(self, msg: &'static str) -> Result<T> {
        self.map_err(|e| e.into().with_context(msg))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = CovgapError::config("Invalid configuration");
        assert!(matches!(err, CovgapError::Config { .. }));

        let err = CovgapError::parse("xml", "unexpected end of file");
        assert!(matches!(err, CovgapError::Parse { .. }));

        let err = CovgapError::malformed("root element is not <report>");
        assert!(matches!(err, CovgapError::MalformedReport { .. }));
    }

    #[test]
    fn test_report_errors_are_classified() {
        assert!(CovgapError::parse("xml", "bad").is_report_error());
        assert!(CovgapError::malformed("bad").is_report_error());
        assert!(!CovgapError::validation("bad").is_report_error());
        assert!(!CovgapError::NoReports {
            base_dir: PathBuf::from(".")
        }
        .is_report_error());
    }

    #[test]
    fn test_malformed_element_keeps_element() {
        let err = CovgapError::malformed_element("method outside of class", "method");
        if let CovgapError::MalformedReport { message, element } = err {
            assert_eq!(message, "method outside of class");
            assert_eq!(element.as_deref(), Some("method"));
        } else {
            panic!("Expected MalformedReport error");
        }
    }

    #[test]
    fn test_parse_at_records_position() {
        let err = CovgapError::parse_at("xml", "mismatched tag", 42);
        if let CovgapError::Parse { position, format, .. } = err {
            assert_eq!(position, Some(42));
            assert_eq!(format, "xml");
        } else {
            panic!("Expected Parse error");
        }
    }

    #[test]
    fn test_with_context_leaves_other_errors_alone() {
        let err = CovgapError::config("bad threshold").with_context("covgap.yml");
        assert_eq!(err.to_string(), "Configuration error: bad threshold");
    }

    #[test]
    fn test_result_extension_keeps_report_error_kind() {
        let result: Result<()> = Err(CovgapError::parse_at("xml", "unclosed tag <class>", 7));

        let err = result
            .with_context(|| "build/jacoco.xml".to_string())
            .unwrap_err();
        if let CovgapError::Parse {
            message, position, ..
        } = err
        {
            assert_eq!(message, "build/jacoco.xml: unclosed tag <class>");
            assert_eq!(position, Some(7));
        } else {
            panic!("Expected Parse error");
        }
    }

    #[test]
    fn test_result_extension_prefixes_io_message() {
        let result: std::result::Result<i32, std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "File not found",
        ));

        let err = result.context("Failed to read report").unwrap_err();
        if let CovgapError::Io { message, source } = err {
            assert!(message.starts_with("Failed to read report"));
            assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
        } else {
            panic!("Expected Io error");
        }
    }

    #[test]
    fn test_from_yaml_error() {
        let yaml_err = serde_yaml::from_str::<i32>("invalid: yaml: content").unwrap_err();
        let err: CovgapError = yaml_err.into();

        if let CovgapError::Serialization { data_type, .. } = err {
            assert_eq!(data_type, Some("YAML".to_string()));
        } else {
            panic!("Expected Serialization error");
        }
    }

    #[test]
    fn test_no_reports_display() {
        let err = CovgapError::NoReports {
            base_dir: PathBuf::from("/tmp/project"),
        };
        assert_eq!(
            err.to_string(),
            "No valid JaCoCo reports found under /tmp/project"
        );
    }

    #[test]
    fn test_error_display_formatting() {
        let err = CovgapError::parse("xml", "ill-formed document");
        let display = format!("{}", err);
        assert!(display.contains("Parse error in xml"));
        assert!(display.contains("ill-formed document"));
    }

    #[test]
    fn test_with_context_prefixes_report_errors() {
        let err = CovgapError::malformed("no packages").with_context("build/jacoco.xml");
        assert!(err.is_report_error());
        assert_eq!(
            err.to_string(),
            "Malformed coverage report: build/jacoco.xml: no packages"
        );
    }
}
