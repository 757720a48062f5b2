use crate::core::errors::{CovgapError, Result, ResultExt};
use crate::detectors::coverage::types::{
    ClassCoverage, Counter, CounterKind, CoverageReport, MethodCoverage, Package,
};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::fs;
use std::path::Path;
use tracing::{debug, trace};

const XML: &str = "xml";

/// Read and parse a JaCoCo XML report from disk.
pub fn parse_report(path: &Path) -> Result<CoverageReport> {
    let bytes = fs::read(path)
        .with_context(|| format!("Failed to read coverage report at {}", path.display()))?;

    let report = parse_jacoco_xml(&bytes).with_context(|| path.display().to_string())?;
    debug!(
        "Parsed {}: {} packages, {} classes",
        path.display(),
        report.packages.len(),
        report.classes().count()
    );
    Ok(report)
}

/// Parse a JaCoCo XML document held in a string.
pub fn parse_jacoco_str(xml: &str) -> Result<CoverageReport> {
    parse_jacoco_xml(xml.as_bytes())
}

/// Parse a JaCoCo XML document into a [`CoverageReport`].
///
/// Syntax problems (mismatched tags, truncated input, stray text, several
/// root elements) are reported as [`CovgapError::Parse`]. A well-formed
/// document whose root is not `<report>`, or which holds no `<package>`,
/// is a [`CovgapError::MalformedReport`].
pub fn parse_jacoco_xml(bytes: &[u8]) -> Result<CoverageReport> {
    let mut reader = Reader::from_reader(bytes);
    reader.trim_text(true);
    let mut buf = Vec::new();
    let mut builder = ReportBuilder::default();

    loop {
        let event = reader.read_event_into(&mut buf).map_err(|err| {
            CovgapError::parse_at(
                XML,
                format!("Failed to parse JaCoCo XML: {}", err),
                reader.buffer_position(),
            )
        })?;

        let position = reader.buffer_position();
        match event {
            Event::Start(tag) => builder.open(&tag, position)?,
            Event::Empty(tag) => {
                builder.open(&tag, position)?;
                builder.close(tag.name().as_ref(), position)?;
            }
            Event::End(tag) => builder.close(tag.name().as_ref(), position)?,
            Event::Text(_) | Event::CData(_) => {
                if builder.stack.is_empty() {
                    return Err(CovgapError::parse_at(
                        XML,
                        "text content outside of the root element",
                        position,
                    ));
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    builder.finish(reader.buffer_position())
}

/// Incremental tree builder fed by the XML event stream.
#[derive(Default)]
struct ReportBuilder {
    stack: Vec<Vec<u8>>,
    root_closed: bool,
    /// Set when the root element is something other than `<report>`; the
    /// rest of the document is then only checked for well-formedness.
    foreign_root: Option<String>,
    report: CoverageReport,
    package: Option<Package>,
    class: Option<ClassCoverage>,
    method: Option<MethodCoverage>,
    in_sourcefile: bool,
    /// Open `<group>` elements; their counters are subtotals, not report totals.
    group_depth: usize,
}

impl ReportBuilder {
    fn open(&mut self, tag: &BytesStart<'_>, position: usize) -> Result<()> {
        let name = tag.name().as_ref().to_vec();

        if self.stack.is_empty() {
            if self.root_closed {
                return Err(CovgapError::parse_at(
                    XML,
                    "document has more than one root element",
                    position,
                ));
            }
            if name.as_slice() == b"report" {
                self.report.name = attribute_value(tag, b"name")?;
            } else {
                self.foreign_root = Some(String::from_utf8_lossy(&name).into_owned());
            }
        }
        self.stack.push(name);

        if self.foreign_root.is_some() {
            return Ok(());
        }

        match tag.name().as_ref() {
            b"package" => self.open_package(tag),
            b"class" => self.open_class(tag),
            b"method" => self.open_method(tag),
            b"sourcefile" => {
                self.in_sourcefile = true;
                Ok(())
            }
            b"group" => {
                self.group_depth += 1;
                Ok(())
            }
            b"counter" => self.record_counter(tag),
            _ => Ok(()),
        }
    }

    fn close(&mut self, name: &[u8], position: usize) -> Result<()> {
        let Some(open) = self.stack.pop() else {
            return Err(CovgapError::parse_at(
                XML,
                format!("unexpected closing tag </{}>", String::from_utf8_lossy(name)),
                position,
            ));
        };
        if open.as_slice() != name {
            return Err(CovgapError::parse_at(
                XML,
                format!(
                    "expected </{}>, found </{}>",
                    String::from_utf8_lossy(&open),
                    String::from_utf8_lossy(name)
                ),
                position,
            ));
        }
        if self.stack.is_empty() {
            self.root_closed = true;
        }
        if self.foreign_root.is_some() {
            return Ok(());
        }

        match name {
            b"method" => {
                if let (Some(method), Some(class)) = (self.method.take(), self.class.as_mut()) {
                    class.methods.push(method);
                }
            }
            b"class" => {
                if let (Some(class), Some(package)) = (self.class.take(), self.package.as_mut()) {
                    package.classes.push(class);
                }
            }
            b"package" => {
                if let Some(package) = self.package.take() {
                    self.report.packages.push(package);
                }
            }
            b"sourcefile" => self.in_sourcefile = false,
            b"group" => self.group_depth = self.group_depth.saturating_sub(1),
            _ => {}
        }
        Ok(())
    }

    fn open_package(&mut self, tag: &BytesStart<'_>) -> Result<()> {
        if self.package.is_some() {
            return Err(CovgapError::malformed_element(
                "nested <package> elements",
                "package",
            ));
        }
        let name = attribute_value(tag, b"name")?.unwrap_or_default();
        trace!("package {}", name);
        self.package = Some(Package {
            name: dotted(&name),
            ..Package::default()
        });
        Ok(())
    }

    fn open_class(&mut self, tag: &BytesStart<'_>) -> Result<()> {
        if self.package.is_none() {
            return Err(CovgapError::malformed_element(
                "<class> outside of a <package>",
                "class",
            ));
        }
        if self.class.is_some() {
            return Err(CovgapError::malformed_element("nested <class> elements", "class"));
        }
        let name = attribute_value(tag, b"name")?.unwrap_or_default();
        let source_file = attribute_value(tag, b"sourcefilename")?.filter(|s| !s.is_empty());
        self.class = Some(ClassCoverage {
            name: dotted(&name),
            source_file,
            ..ClassCoverage::default()
        });
        Ok(())
    }

    fn open_method(&mut self, tag: &BytesStart<'_>) -> Result<()> {
        if self.class.is_none() {
            return Err(CovgapError::malformed_element(
                "<method> outside of a <class>",
                "method",
            ));
        }
        if self.method.is_some() {
            return Err(CovgapError::malformed_element("nested <method> elements", "method"));
        }
        self.method = Some(MethodCoverage {
            name: attribute_value(tag, b"name")?.unwrap_or_default(),
            descriptor: attribute_value(tag, b"desc")?,
            line: attribute_value(tag, b"line")?.and_then(|v| v.trim().parse().ok()),
            counters: Vec::new(),
        });
        Ok(())
    }

    fn record_counter(&mut self, tag: &BytesStart<'_>) -> Result<()> {
        // Per-line counters under <sourcefile> duplicate the class data.
        if self.in_sourcefile {
            return Ok(());
        }
        let kind_attr = attribute_value(tag, b"type")?.ok_or_else(|| {
            CovgapError::malformed_element("<counter> without a type attribute", "counter")
        })?;
        let Some(kind) = CounterKind::from_attribute(&kind_attr) else {
            debug!("Ignoring unknown counter type {}", kind_attr);
            return Ok(());
        };
        let counter = Counter::new(
            kind,
            counter_value(tag, b"missed")?,
            counter_value(tag, b"covered")?,
        );

        let counters = if let Some(method) = self.method.as_mut() {
            &mut method.counters
        } else if let Some(class) = self.class.as_mut() {
            &mut class.counters
        } else if let Some(package) = self.package.as_mut() {
            &mut package.counters
        } else if self.group_depth > 0 {
            trace!("Skipping group counter {}", kind_attr);
            return Ok(());
        } else {
            &mut self.report.counters
        };
        counters.push(counter);
        Ok(())
    }

    fn finish(self, position: usize) -> Result<CoverageReport> {
        if let Some(open) = self.stack.last() {
            return Err(CovgapError::parse_at(
                XML,
                format!(
                    "unexpected end of document, <{}> is not closed",
                    String::from_utf8_lossy(open)
                ),
                position,
            ));
        }
        if !self.root_closed {
            return Err(CovgapError::parse(XML, "document has no root element"));
        }
        if let Some(root) = self.foreign_root {
            return Err(CovgapError::malformed_element(
                format!("expected root element <report>, found <{}>", root),
                root,
            ));
        }
        if self.report.packages.is_empty() {
            return Err(CovgapError::malformed_element(
                "report contains no <package> elements",
                "report",
            ));
        }
        Ok(self.report)
    }
}

/// JaCoCo writes VM names (`com/example/Foo`); use the dotted Java form.
fn dotted(name: &str) -> String {
    name.replace('/', ".")
}

/// JaCoCo counters are Java `int`s, so anything outside `0..=i32::MAX` is rejected.
fn counter_value(tag: &BytesStart<'_>, name: &[u8]) -> Result<u64> {
    match attribute_value(tag, name)? {
        None => Ok(0),
        Some(raw) => raw
            .trim()
            .parse::<i32>()
            .ok()
            .and_then(|value| u64::try_from(value).ok())
            .ok_or_else(|| {
                CovgapError::malformed_element(
                    format!(
                        "counter attribute '{}' is not a non-negative 32-bit integer: {}",
                        String::from_utf8_lossy(name),
                        raw
                    ),
                    "counter",
                )
            }),
    }
}

fn attribute_value(tag: &BytesStart<'_>, name: &[u8]) -> Result<Option<String>> {
    for attr in tag.attributes() {
        let attr = attr
            .map_err(|err| CovgapError::parse(XML, format!("invalid attribute: {}", err)))?;
        if attr.key.as_ref() == name {
            let value = attr.unescape_value()?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}
