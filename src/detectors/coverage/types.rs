use serde::{Deserialize, Serialize};

/// JaCoCo counter categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CounterKind {
    Instruction,
    Branch,
    Line,
    Complexity,
    Method,
    Class,
}

impl CounterKind {
    /// Map a JaCoCo `type` attribute onto a counter kind.
    pub fn from_attribute(value: &str) -> Option<Self> {
        match value {
            "INSTRUCTION" => Some(Self::Instruction),
            "BRANCH" => Some(Self::Branch),
            "LINE" => Some(Self::Line),
            "COMPLEXITY" => Some(Self::Complexity),
            "METHOD" => Some(Self::Method),
            "CLASS" => Some(Self::Class),
            _ => None,
        }
    }
}

/// A missed/covered pair for one counter kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counter {
    pub kind: CounterKind,
    pub missed: u64,
    pub covered: u64,
}

impl Counter {
    pub fn new(kind: CounterKind, missed: u64, covered: u64) -> Self {
        Self {
            kind,
            missed,
            covered,
        }
    }

    pub fn total(&self) -> u64 {
        self.missed.saturating_add(self.covered)
    }

    /// Covered share in percent; 0 when the counter is empty.
    pub fn percentage(&self) -> f64 {
        coverage_percentage(self.covered, self.total())
    }
}

/// `part / whole * 100`, defined as 0 when `whole` is 0.
pub fn coverage_percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        (part as f64 / whole as f64) * 100.0
    }
}

fn find_counter(counters: &[Counter], kind: CounterKind) -> Option<&Counter> {
    counters.iter().find(|counter| counter.kind == kind)
}

/// Parsed JaCoCo report. Immutable once built by the parser.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CoverageReport {
    pub name: Option<String>,
    pub packages: Vec<Package>,
    #[serde(default)]
    pub counters: Vec<Counter>,
}

impl CoverageReport {
    /// Report-level counter of the given kind.
    pub fn counter(&self, kind: CounterKind) -> Option<&Counter> {
        find_counter(&self.counters, kind)
    }

    pub fn classes(&self) -> impl Iterator<Item = &ClassCoverage> {
        self.packages.iter().flat_map(|package| package.classes.iter())
    }

    pub fn methods(&self) -> impl Iterator<Item = &MethodCoverage> {
        self.classes().flat_map(|class| class.methods.iter())
    }

    /// Element counts and the overall instruction counter.
    ///
    /// When the report omits its own INSTRUCTION counter the value is summed
    /// from the method counters instead.
    pub fn statistics(&self) -> ReportStatistics {
        let instructions = self
            .counter(CounterKind::Instruction)
            .copied()
            .unwrap_or_else(|| {
                self.methods()
                    .filter_map(MethodCoverage::instruction)
                    .fold(
                        Counter::new(CounterKind::Instruction, 0, 0),
                        |acc, counter| {
                            Counter::new(
                                CounterKind::Instruction,
                                acc.missed.saturating_add(counter.missed),
                                acc.covered.saturating_add(counter.covered),
                            )
                        },
                    )
            });

        ReportStatistics {
            packages: self.packages.len(),
            classes: self.classes().count(),
            methods: self.methods().count(),
            missed_instructions: instructions.missed,
            covered_instructions: instructions.covered,
            instruction_coverage: instructions.percentage(),
        }
    }
}

/// Summary counts for one report
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ReportStatistics {
    pub packages: usize,
    pub classes: usize,
    pub methods: usize,
    pub missed_instructions: u64,
    pub covered_instructions: u64,
    pub instruction_coverage: f64,
}

/// A JaCoCo package with its name in dotted form
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Package {
    pub name: String,
    pub classes: Vec<ClassCoverage>,
    #[serde(default)]
    pub counters: Vec<Counter>,
}

/// Coverage for one class, name in dotted form
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ClassCoverage {
    pub name: String,
    pub source_file: Option<String>,
    pub methods: Vec<MethodCoverage>,
    #[serde(default)]
    pub counters: Vec<Counter>,
}

impl ClassCoverage {
    /// Class name without its package qualifier.
    pub fn simple_name(&self) -> &str {
        simple_name(&self.name)
    }

    pub fn counter(&self, kind: CounterKind) -> Option<&Counter> {
        find_counter(&self.counters, kind)
    }
}

/// Last segment of a dotted or slashed class name.
pub fn simple_name(qualified: &str) -> &str {
    qualified
        .rsplit(['.', '/'])
        .next()
        .unwrap_or(qualified)
}

/// Coverage for one method
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MethodCoverage {
    pub name: String,
    pub descriptor: Option<String>,
    pub line: Option<u32>,
    pub counters: Vec<Counter>,
}

impl MethodCoverage {
    pub fn counter(&self, kind: CounterKind) -> Option<&Counter> {
        find_counter(&self.counters, kind)
    }

    /// The INSTRUCTION counter, if the report recorded one.
    pub fn instruction(&self) -> Option<&Counter> {
        self.counter(CounterKind::Instruction)
    }

    /// Instruction coverage in percent, 0 when no instructions were recorded.
    pub fn coverage_percentage(&self) -> f64 {
        self.instruction().map_or(0.0, Counter::percentage)
    }

    /// Missed-instruction count; higher means more urgent.
    pub fn priority(&self) -> u64 {
        self.instruction().map_or(0, |counter| counter.missed)
    }
}

/// A method that fell below the coverage threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodGap {
    pub name: String,
    pub descriptor: Option<String>,
    pub line: Option<u32>,
    pub coverage_percentage: f64,
    pub missed_instructions: u64,
    pub covered_instructions: u64,
    pub priority: u64,
}

/// A class with at least one method below the coverage threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageGap {
    pub package: String,
    pub class_name: String,
    pub source_file: Option<String>,
    pub methods: Vec<MethodGap>,
    /// Share of eligible methods with any covered instruction, in percent
    pub class_coverage: f64,
    pub eligible_methods: usize,
    pub covered_methods: usize,
    /// Sum of missed instructions across `methods`
    pub priority: u64,
}

impl CoverageGap {
    pub fn simple_name(&self) -> &str {
        simple_name(&self.class_name)
    }

    pub fn missed_instructions(&self) -> u64 {
        self.methods
            .iter()
            .fold(0u64, |acc, method| acc.saturating_add(method.missed_instructions))
    }
}
