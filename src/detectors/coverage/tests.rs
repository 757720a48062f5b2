use super::*;
use crate::core::errors::CovgapError;
use approx::assert_relative_eq;
use proptest::prelude::*;

fn method(name: &str, missed: u64, covered: u64) -> MethodCoverage {
    MethodCoverage {
        name: name.to_string(),
        counters: vec![Counter::new(CounterKind::Instruction, missed, covered)],
        ..MethodCoverage::default()
    }
}

fn method_without_counter(name: &str) -> MethodCoverage {
    MethodCoverage {
        name: name.to_string(),
        counters: vec![Counter::new(CounterKind::Line, 1, 0)],
        ..MethodCoverage::default()
    }
}

fn class(name: &str, methods: Vec<MethodCoverage>) -> ClassCoverage {
    let simple = name.rsplit('.').next().unwrap_or(name);
    ClassCoverage {
        name: name.to_string(),
        source_file: Some(format!("{simple}.java")),
        methods,
        counters: Vec::new(),
    }
}

fn report(packages: Vec<(&str, Vec<ClassCoverage>)>) -> CoverageReport {
    CoverageReport {
        name: Some("test".to_string()),
        packages: packages
            .into_iter()
            .map(|(name, classes)| Package {
                name: name.to_string(),
                classes,
                counters: Vec::new(),
            })
            .collect(),
        counters: Vec::new(),
    }
}

fn foo_report() -> CoverageReport {
    report(vec![(
        "com.example",
        vec![class(
            "com.example.Foo",
            vec![method("bar", 8, 2), method("baz", 0, 10)],
        )],
    )])
}

#[test]
fn finds_single_gap_for_foo() {
    let gaps = find_coverage_gaps(&foo_report(), 80.0).unwrap();

    assert_eq!(gaps.len(), 1);
    let gap = &gaps[0];
    assert_eq!(gap.package, "com.example");
    assert_eq!(gap.class_name, "com.example.Foo");
    assert_eq!(gap.simple_name(), "Foo");
    assert_eq!(gap.source_file.as_deref(), Some("Foo.java"));
    assert_eq!(gap.methods.len(), 1);
    assert_eq!(gap.methods[0].name, "bar");
    assert_relative_eq!(gap.methods[0].coverage_percentage, 20.0);
    assert_eq!(gap.methods[0].missed_instructions, 8);
    assert_eq!(gap.methods[0].priority, 8);
    assert_relative_eq!(gap.class_coverage, 50.0);
    assert_eq!(gap.priority, 8);
}

#[test]
fn end_to_end_from_xml() {
    let xml = r#"
        <report name="demo">
          <package name="com/example">
            <class name="com/example/Foo" sourcefilename="Foo.java">
              <method name="bar" desc="()V" line="4">
                <counter type="INSTRUCTION" missed="8" covered="2"/>
              </method>
              <method name="baz" desc="()V" line="9">
                <counter type="INSTRUCTION" missed="0" covered="10"/>
              </method>
            </class>
            <class name="com/example/FooTest" sourcefilename="FooTest.java">
              <method name="testBar" desc="()V">
                <counter type="INSTRUCTION" missed="50" covered="0"/>
              </method>
            </class>
          </package>
        </report>
    "#;
    let report = parse_jacoco_str(xml).unwrap();
    let gaps = find_coverage_gaps(&report, 80.0).unwrap();

    assert_eq!(gaps.len(), 1);
    assert_eq!(gaps[0].class_name, "com.example.Foo");
    assert_eq!(gaps[0].methods[0].descriptor.as_deref(), Some("()V"));
    assert_eq!(gaps[0].methods[0].line, Some(4));
}

#[test]
fn test_classes_are_always_excluded() {
    let report = report(vec![(
        "com.example",
        vec![class("com.example.FooTest", vec![method("check", 100, 0)])],
    )]);
    for threshold in [0.0, 50.0, 100.0] {
        assert!(find_coverage_gaps(&report, threshold).unwrap().is_empty());
    }
}

#[test]
fn classes_without_source_file_are_excluded() {
    let mut orphan = class("com.example.Generated", vec![method("run", 10, 0)]);
    orphan.source_file = None;
    let report = report(vec![("com.example", vec![orphan])]);
    assert!(find_coverage_gaps(&report, 80.0).unwrap().is_empty());
}

#[test]
fn constructors_are_skipped_and_not_counted() {
    let report = report(vec![(
        "com.example",
        vec![class(
            "com.example.Foo",
            vec![method("<init>", 5, 0), method("bar", 4, 0), method("baz", 0, 4)],
        )],
    )]);
    let gaps = find_coverage_gaps(&report, 80.0).unwrap();
    assert_eq!(gaps[0].methods.len(), 1);
    assert_eq!(gaps[0].eligible_methods, 2);
    assert_eq!(gaps[0].priority, 4);
}

#[test]
fn zero_instruction_methods_have_zero_coverage() {
    let report = report(vec![(
        "com.example",
        vec![class("com.example.Empty", vec![method("noop", 0, 0)])],
    )]);
    let gaps = find_coverage_gaps(&report, 80.0).unwrap();
    assert_eq!(gaps.len(), 1);
    let noop = &gaps[0].methods[0];
    assert_eq!(noop.coverage_percentage, 0.0);
    assert!(!noop.coverage_percentage.is_nan());
    assert_eq!(gaps[0].priority, 0);
    assert_eq!(gaps[0].class_coverage, 0.0);
}

#[test]
fn methods_without_instruction_counter_count_as_uncovered_eligible() {
    let report = report(vec![(
        "com.example",
        vec![class(
            "com.example.Foo",
            vec![method_without_counter("abstractish"), method("bar", 3, 1)],
        )],
    )]);
    let gaps = find_coverage_gaps(&report, 80.0).unwrap();
    assert_eq!(gaps[0].methods.len(), 1);
    assert_eq!(gaps[0].eligible_methods, 2);
    assert_eq!(gaps[0].covered_methods, 1);
    assert_relative_eq!(gaps[0].class_coverage, 50.0);
}

#[test]
fn threshold_is_strict() {
    let report = report(vec![(
        "p",
        vec![class("p.Edge", vec![method("exact", 2, 8)])],
    )]);
    assert!(find_coverage_gaps(&report, 80.0).unwrap().is_empty());
    assert_eq!(find_coverage_gaps(&report, 80.1).unwrap().len(), 1);
}

#[test]
fn zero_threshold_yields_nothing() {
    assert!(find_coverage_gaps(&foo_report(), 0.0).unwrap().is_empty());
}

#[test]
fn gaps_are_ranked_by_priority() {
    let report = report(vec![
        ("a", vec![class("a.Small", vec![method("m", 2, 0)])]),
        (
            "b",
            vec![class("b.Large", vec![method("m", 30, 0), method("n", 5, 1)])],
        ),
        ("c", vec![class("c.Medium", vec![method("m", 10, 0)])]),
    ]);
    let gaps = find_coverage_gaps(&report, 80.0).unwrap();
    let order: Vec<_> = gaps.iter().map(|g| g.class_name.as_str()).collect();
    assert_eq!(order, vec!["b.Large", "c.Medium", "a.Small"]);
    assert_eq!(gaps[0].priority, 35);
}

#[test]
fn equal_priorities_keep_report_order() {
    let report = report(vec![
        ("p", vec![
            class("p.First", vec![method("m", 5, 0)]),
            class("p.Second", vec![method("m", 9, 0)]),
            class("p.Third", vec![method("m", 5, 0)]),
        ]),
        ("q", vec![class("q.Fourth", vec![method("m", 5, 0)])]),
    ]);
    let gaps = find_coverage_gaps(&report, 80.0).unwrap();
    let order: Vec<_> = gaps.iter().map(|g| g.class_name.as_str()).collect();
    assert_eq!(order, vec!["p.Second", "p.First", "p.Third", "q.Fourth"]);
}

#[test]
fn methods_keep_report_order_unless_sorting_enabled() {
    let report = report(vec![(
        "p",
        vec![class(
            "p.Foo",
            vec![method("a", 1, 0), method("b", 7, 0), method("c", 3, 0)],
        )],
    )]);

    let default_order: Vec<_> = find_coverage_gaps(&report, 80.0).unwrap()[0]
        .methods
        .iter()
        .map(|m| m.name.clone())
        .collect();
    assert_eq!(default_order, vec!["a", "b", "c"]);

    let analyzer = CoverageGapAnalyzer::default().with_method_sorting(true);
    let sorted: Vec<_> = analyzer.find_coverage_gaps(&report, 80.0).unwrap()[0]
        .methods
        .iter()
        .map(|m| m.name.clone())
        .collect();
    assert_eq!(sorted, vec!["b", "c", "a"]);
}

#[test]
fn accessor_exclusion_is_configurable() {
    let report = report(vec![(
        "p",
        vec![class(
            "p.Bean",
            vec![
                method("getName", 4, 0),
                method("setName", 4, 0),
                method("isReady", 4, 0),
                method("toString", 4, 0),
                method("compute", 6, 0),
            ],
        )],
    )]);

    let lenient = find_coverage_gaps(&report, 80.0).unwrap();
    assert_eq!(lenient[0].methods.len(), 5);

    let config = GapAnalysisConfig {
        exclude_accessors: true,
        ..GapAnalysisConfig::default()
    };
    let strict = CoverageGapAnalyzer::from_config(&config)
        .unwrap()
        .find_coverage_gaps(&report, 80.0)
        .unwrap();
    assert_eq!(strict[0].methods.len(), 1);
    assert_eq!(strict[0].methods[0].name, "compute");
    assert_eq!(strict[0].eligible_methods, 1);
}

#[test]
fn package_scoping_filters_whole_packages() {
    let report = report(vec![
        ("org.kiwiproject.app", vec![class("org.kiwiproject.app.Service", vec![method("run", 5, 0)])]),
        ("ws.example.ws.xml.jakarta.gen", vec![class("ws.example.ws.xml.jakarta.gen.Stub", vec![method("call", 50, 0)])]),
    ]);
    let config = GapAnalysisConfig {
        include_packages: vec!["org.kiwiproject".to_string()],
        ..GapAnalysisConfig::default()
    };
    let gaps = CoverageGapAnalyzer::from_config(&config)
        .unwrap()
        .find_coverage_gaps(&report, 80.0)
        .unwrap();
    assert_eq!(gaps.len(), 1);
    assert_eq!(gaps[0].class_name, "org.kiwiproject.app.Service");
}

#[test]
fn empty_report_is_malformed() {
    let err = find_coverage_gaps(&CoverageReport::default(), 80.0).unwrap_err();
    assert!(matches!(err, CovgapError::MalformedReport { .. }));
}

#[test]
fn out_of_range_threshold_is_rejected() {
    for threshold in [-1.0, 100.5, f64::NAN] {
        let err = find_coverage_gaps(&foo_report(), threshold).unwrap_err();
        assert!(matches!(err, CovgapError::Validation { .. }));
    }
}

#[test]
fn no_gaps_is_an_empty_list() {
    let report = report(vec![(
        "p",
        vec![class("p.Done", vec![method("m", 0, 10)])],
    )]);
    assert!(find_coverage_gaps(&report, 80.0).unwrap().is_empty());
}

#[test]
fn huge_counters_saturate_instead_of_overflowing() {
    let report = report(vec![(
        "com.example",
        vec![class(
            "com.example.Big",
            vec![method("a", u64::MAX, 1), method("b", u64::MAX, 0)],
        )],
    )]);

    let gaps = find_coverage_gaps(&report, 80.0).unwrap();
    assert_eq!(gaps.len(), 1);
    assert_eq!(gaps[0].methods.len(), 2);
    assert_eq!(gaps[0].priority, u64::MAX);
    assert_eq!(gaps[0].missed_instructions(), u64::MAX);
    assert!(gaps[0].methods[0].coverage_percentage < 1.0);
}

fn arb_report() -> impl Strategy<Value = CoverageReport> {
    let arb_method = (0u64..40, 0u64..40, 0usize..4).prop_map(|(missed, covered, kind)| {
        let name = ["compute", "getValue", "<init>", "lambda$run$0"][kind];
        method(name, missed, covered)
    });
    let arb_class = (prop::collection::vec(arb_method, 0..6), 0usize..3);
    prop::collection::vec(prop::collection::vec(arb_class, 0..5), 1..4).prop_map(|packages| {
        CoverageReport {
            name: None,
            packages: packages
                .into_iter()
                .enumerate()
                .map(|(p, classes)| Package {
                    name: format!("pkg{p}"),
                    classes: classes
                        .into_iter()
                        .enumerate()
                        .map(|(c, (methods, kind))| {
                            let base = ["Service", "ServiceTest", "Util"][kind];
                            class(&format!("pkg{p}.{base}{c}"), methods)
                        })
                        .collect(),
                    counters: Vec::new(),
                })
                .collect(),
            counters: Vec::new(),
        }
    })
}

proptest! {
    #[test]
    fn prop_analysis_is_idempotent(report in arb_report(), threshold in 0.0f64..=100.0) {
        let first = find_coverage_gaps(&report, threshold).unwrap();
        let second = find_coverage_gaps(&report, threshold).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_class_coverage_in_range(report in arb_report(), threshold in 0.0f64..=100.0) {
        for gap in find_coverage_gaps(&report, threshold).unwrap() {
            prop_assert!((0.0..=100.0).contains(&gap.class_coverage));
            prop_assert!(gap.eligible_methods > 0);
            let expected = 100.0 * gap.covered_methods as f64 / gap.eligible_methods as f64;
            prop_assert!((gap.class_coverage - expected).abs() < 1e-9);
            prop_assert_eq!(gap.priority, gap.missed_instructions());
        }
    }

    #[test]
    fn prop_raising_threshold_never_drops_methods(
        report in arb_report(),
        low in 0.0f64..=100.0,
        delta in 0.0f64..=100.0,
    ) {
        let high = (low + delta).min(100.0);
        let low_gaps = find_coverage_gaps(&report, low).unwrap();
        let high_gaps = find_coverage_gaps(&report, high).unwrap();
        for gap in &low_gaps {
            let wider = high_gaps
                .iter()
                .find(|g| g.package == gap.package && g.class_name == gap.class_name);
            prop_assert!(wider.is_some());
            prop_assert!(wider.map_or(0, |g| g.methods.len()) >= gap.methods.len());
        }
    }

    #[test]
    fn prop_output_sorted_by_priority(report in arb_report(), threshold in 0.0f64..=100.0) {
        let gaps = find_coverage_gaps(&report, threshold).unwrap();
        for pair in gaps.windows(2) {
            prop_assert!(pair[0].priority >= pair[1].priority);
        }
        prop_assert!(gaps.iter().all(|g| !g.class_name.contains("Test")));
    }
}
