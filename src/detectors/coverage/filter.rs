//! Exclusion rules applied before coverage thresholding.
//!
//! A [`FilterPolicy`] is an ordered, de-duplicated set of tagged
//! [`ExclusionRule`]s plus an optional package allow-list. Rules are checked
//! in three scopes: packages, classes, and methods. Name-pattern rules are
//! compiled into [`globset::GlobSet`]s once, when the policy is built.

use globset::{Glob, GlobBuilder, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};

use crate::core::errors::{CovgapError, Result};
use crate::detectors::coverage::config::GapAnalysisConfig;
use crate::detectors::coverage::types::{ClassCoverage, MethodCoverage};

/// Method names treated as plain object plumbing.
const OBJECT_METHODS: &[&str] = &["toString", "hashCode", "equals"];

/// Name prefixes treated as accessors.
const ACCESSOR_PREFIXES: &[&str] = &["get", "set", "is"];

/// One exclusion rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "rule", content = "pattern", rename_all = "snake_case")]
pub enum ExclusionRule {
    /// Classes whose name contains `Test` (case-sensitive).
    TestClasses,
    /// Classes without a `sourcefilename`.
    MissingSourceFile,
    /// `<init>` pseudo-methods.
    Constructors,
    /// `<clinit>` pseudo-methods.
    StaticInitializers,
    /// `get*`, `set*`, `is*`, `toString`, `hashCode`, `equals`.
    Accessors,
    /// `toString`, `hashCode`, `equals`.
    ObjectMethods,
    /// Compiler-generated `lambda$...` bodies.
    LambdaMethods,
    /// Glob on the method name.
    MethodNamePattern(String),
    /// Glob on the dotted class name.
    ClassNamePattern(String),
    /// Case-insensitive glob on the dotted package name.
    PackagePattern(String),
}

impl ExclusionRule {
    fn excludes_method_name(&self, name: &str) -> bool {
        match self {
            Self::Constructors => name == "<init>",
            Self::StaticInitializers => name == "<clinit>",
            Self::Accessors => {
                OBJECT_METHODS.contains(&name)
                    || ACCESSOR_PREFIXES.iter().any(|prefix| name.starts_with(prefix))
            }
            Self::ObjectMethods => OBJECT_METHODS.contains(&name),
            Self::LambdaMethods => name.starts_with("lambda$"),
            _ => false,
        }
    }
}

/// Compiled filter policy used by the gap analyzer.
#[derive(Debug, Clone)]
pub struct FilterPolicy {
    rules: Vec<ExclusionRule>,
    include_packages: Vec<String>,
    method_patterns: GlobSet,
    class_patterns: GlobSet,
    package_patterns: GlobSet,
}

impl Default for FilterPolicy {
    fn default() -> Self {
        Self::standard()
    }
}

impl FilterPolicy {
    /// Skip test classes, classes without sources, and constructors.
    pub fn standard() -> Self {
        Self::empty()
            .with_rule(ExclusionRule::TestClasses)
            .with_rule(ExclusionRule::MissingSourceFile)
            .with_rule(ExclusionRule::Constructors)
    }

    /// The standard rules plus accessors and lambda bodies.
    pub fn strict() -> Self {
        Self::standard()
            .with_rule(ExclusionRule::Accessors)
            .with_rule(ExclusionRule::LambdaMethods)
    }

    /// A policy that excludes nothing.
    pub fn empty() -> Self {
        Self {
            rules: Vec::new(),
            include_packages: Vec::new(),
            method_patterns: GlobSet::empty(),
            class_patterns: GlobSet::empty(),
            package_patterns: GlobSet::empty(),
        }
    }

    /// Build a policy from its rules and package allow-list.
    pub fn new(rules: impl IntoIterator<Item = ExclusionRule>, include_packages: Vec<String>) -> Result<Self> {
        let mut deduped: Vec<ExclusionRule> = Vec::new();
        for rule in rules {
            if !deduped.contains(&rule) {
                deduped.push(rule);
            }
        }

        let mut method_patterns = GlobSetBuilder::new();
        let mut class_patterns = GlobSetBuilder::new();
        let mut package_patterns = GlobSetBuilder::new();
        for rule in &deduped {
            match rule {
                ExclusionRule::MethodNamePattern(pattern) => {
                    method_patterns.add(compile_glob(pattern, false)?);
                }
                ExclusionRule::ClassNamePattern(pattern) => {
                    class_patterns.add(compile_glob(pattern, false)?);
                }
                ExclusionRule::PackagePattern(pattern) => {
                    package_patterns.add(compile_glob(pattern, true)?);
                }
                _ => {}
            }
        }

        Ok(Self {
            rules: deduped,
            include_packages,
            method_patterns: build_set(method_patterns)?,
            class_patterns: build_set(class_patterns)?,
            package_patterns: build_set(package_patterns)?,
        })
    }

    /// Translate the configuration surface into rules.
    pub fn from_config(config: &GapAnalysisConfig) -> Result<Self> {
        let mut rules = Vec::new();
        if config.skip_test_classes {
            rules.push(ExclusionRule::TestClasses);
        }
        if config.require_source_file {
            rules.push(ExclusionRule::MissingSourceFile);
        }
        rules.push(ExclusionRule::Constructors);
        if config.exclude_static_initializers {
            rules.push(ExclusionRule::StaticInitializers);
        }
        if config.exclude_accessors {
            rules.push(ExclusionRule::Accessors);
        }
        if config.exclude_object_methods {
            rules.push(ExclusionRule::ObjectMethods);
        }
        if config.exclude_lambdas {
            rules.push(ExclusionRule::LambdaMethods);
        }
        rules.extend(
            config
                .exclude_name_patterns
                .iter()
                .cloned()
                .map(ExclusionRule::MethodNamePattern),
        );
        rules.extend(
            config
                .exclude_class_patterns
                .iter()
                .cloned()
                .map(ExclusionRule::ClassNamePattern),
        );
        rules.extend(
            config
                .exclude_packages
                .iter()
                .cloned()
                .map(ExclusionRule::PackagePattern),
        );

        Self::new(rules, config.include_packages.clone())
    }

    /// Return a copy with one more rule. Pattern rules are ignored here
    /// since they need compiling; use [`FilterPolicy::new`] for those.
    pub fn with_rule(mut self, rule: ExclusionRule) -> Self {
        let needs_compile = matches!(
            rule,
            ExclusionRule::MethodNamePattern(_)
                | ExclusionRule::ClassNamePattern(_)
                | ExclusionRule::PackagePattern(_)
        );
        if !needs_compile && !self.rules.contains(&rule) {
            self.rules.push(rule);
        }
        self
    }

    pub fn rules(&self) -> &[ExclusionRule] {
        &self.rules
    }

    pub fn has_rule(&self, rule: &ExclusionRule) -> bool {
        self.rules.contains(rule)
    }

    pub fn include_packages(&self) -> &[String] {
        &self.include_packages
    }

    /// True when the package is outside the allow-list or matches an excluded pattern.
    pub fn excludes_package(&self, package: &str) -> bool {
        if !self.include_packages.is_empty()
            && !self
                .include_packages
                .iter()
                .any(|prefix| package.starts_with(prefix.as_str()))
        {
            return true;
        }
        self.package_patterns.is_match(package)
    }

    /// Class-scope rules, checked in order: test classes, then missing sources.
    pub fn excludes_class(&self, class: &ClassCoverage) -> bool {
        if self.has_rule(&ExclusionRule::TestClasses) && class.name.contains("Test") {
            return true;
        }
        if self.has_rule(&ExclusionRule::MissingSourceFile) && class.source_file.is_none() {
            return true;
        }
        self.class_patterns.is_match(&class.name)
    }

    /// Method-scope rules.
    pub fn excludes_method(&self, method: &MethodCoverage) -> bool {
        self.excludes_method_name(&method.name)
    }

    pub fn excludes_method_name(&self, name: &str) -> bool {
        self.rules.iter().any(|rule| rule.excludes_method_name(name))
            || self.method_patterns.is_match(name)
    }
}

fn compile_glob(pattern: &str, case_insensitive: bool) -> Result<Glob> {
    GlobBuilder::new(pattern)
        .case_insensitive(case_insensitive)
        .literal_separator(false)
        .build()
        .map_err(|err| {
            CovgapError::config_field(
                format!("Invalid exclusion pattern '{}': {}", pattern, err),
                "analysis.exclude_patterns",
            )
        })
}

fn build_set(builder: GlobSetBuilder) -> Result<GlobSet> {
    builder
        .build()
        .map_err(|err| CovgapError::config(format!("Failed to compile exclusion patterns: {}", err)))
}
