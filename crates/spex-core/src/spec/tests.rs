use super::*;
use crate::{
    criterion::{Argument, Criterion, EvalScope},
    error::ErrorClass,
    obs::{metrics_report, metrics_reset_all},
    operation::Operation,
    step::{Match, MemorySource},
    test_fixtures::{registry, widget},
    value::{Value, ValueEnum},
};
use serde_json::json;

fn name_filter() -> Spec {
    Spec::new("Widget")
        .with_step(Step::query())
        .with_step(Step::filter(
            Match::All,
            vec![Criterion::new("Name", Operation::Containing).with("Foo")],
        ))
}

fn rich_spec() -> Spec {
    Spec::new("Widget")
        .with_step(Step::Query {
            matching: Match::Any,
            criteria: vec![Criterion::new("Enabled", Operation::EqualTo).with(true)],
        })
        .with_step(Step::filter(
            Match::All,
            vec![
                Criterion::new("Weight", Operation::Between).with(1).with(5),
                Criterion::new("Color", Operation::In)
                    .with(ValueEnum::new("Color", "Red"))
                    .with(ValueEnum::new("Color", "Blue"))
                    .inverted(),
                Criterion::new("Ports", Operation::Any).with_argument(Argument::nested(
                    Criterion::new("Pins", Operation::GreaterThan).with_argument(Argument::variable("minPins")),
                )),
            ],
        ))
        .with_step(Step::select("Ports"))
        .with_step(Step::verify(vec![
            Criterion::new("Name", Operation::Like).with("P*"),
        ]))
}

#[test]
fn validate_accepts_a_well_formed_pipeline() {
    let registry = registry();

    assert_eq!(name_filter().validate(&registry), Ok(()));
    assert_eq!(rich_spec().validate(&registry), Ok(()));
}

#[test]
fn validate_collects_every_issue() {
    let registry = registry();
    let spec = Spec::new("Widget")
        .with_step(Step::filter(
            Match::All,
            vec![
                Criterion::new("Nope", Operation::IsNull),
                Criterion::new("Weight", Operation::Between).with(1),
                Criterion::new("Enabled", Operation::Containing).with("x"),
            ],
        ))
        .with_step(Step::query())
        .with_step(Step::verify(Vec::new()))
        .with_step(Step::count());

    let err = spec.validate(&registry).expect_err("invalid spec");
    let kinds: Vec<_> = err.issues.iter().map(|issue| &issue.kind).collect();

    assert!(kinds.contains(&&IssueKind::MissingQuery));
    assert!(kinds.contains(&&IssueKind::MisplacedQuery));
    assert!(kinds.contains(&&IssueKind::AfterVerify));
    assert!(err.any(|kind| matches!(kind, IssueKind::UnknownProperty { path, .. } if path == "Nope")));
    assert!(err.any(|kind| matches!(kind, IssueKind::ArgumentCount { actual: 1, .. })));
    assert!(err.any(|kind| matches!(kind, IssueKind::UnsupportedOperation { .. })));
}

#[test]
fn validate_checks_nested_criteria_against_the_item_element() {
    let registry = registry();
    let spec = Spec::new("Widget").with_step(Step::query()).with_step(Step::filter(
        Match::All,
        vec![Criterion::new("Ports", Operation::All).with_argument(Argument::nested(
            Criterion::new("Weight", Operation::IsNull),
        ))],
    ));

    let err = spec.validate(&registry).expect_err("Weight is not a Port field");
    assert!(err.any(|kind| matches!(
        kind,
        IssueKind::UnknownProperty { path, element } if path == "Weight" && element == "Port"
    )));
}

#[test]
fn validate_rejects_unknown_element_and_bad_literals() {
    let registry = registry();

    let unknown = Spec::new("Gadget").with_step(Step::query());
    assert!(unknown.validate(&registry).is_err_and(|err| err.any(|kind| matches!(kind, IssueKind::UnknownElement(_)))));

    let bad = Spec::new("Widget").with_step(Step::query()).with_step(Step::filter(
        Match::All,
        vec![Criterion::new("Color", Operation::EqualTo).with("Purple")],
    ));
    assert!(bad.validate(&registry).is_err_and(|err| err.any(|kind| matches!(kind, IssueKind::InvalidArgument { .. }))));
}

#[test]
fn validate_threads_shape_through_select() {
    let registry = registry();
    let spec = Spec::new("Widget")
        .with_step(Step::query())
        .with_step(Step::select("Ports"))
        .with_step(Step::filter(
            Match::All,
            vec![Criterion::new("Name", Operation::IsNotNull), Criterion::new("Weight", Operation::IsNotNull)],
        ));

    let err = spec.validate(&registry).expect_err("Weight is not on Port");
    assert_eq!(err.issues.len(), 1);
    assert_eq!(err.issues[0].step, Some(2));
}

#[test]
fn run_chains_steps_and_preserves_identity() {
    let registry = registry();
    let items: Vec<Value> = ["Foo", "Bar", "FooBar", "Baz", "Qux"]
        .iter()
        .map(|name| widget(name, 1).into_value())
        .collect();
    let source = MemorySource::new(items.clone());
    let ctx = RunContext::new(EvalScope::new(&registry), &source, "Ignored");

    let spec = name_filter();
    let out: Vec<_> = spec.run(&ctx).expect("valid spec").collect();

    assert_eq!(out.len(), 2);
    assert!(out[0].same_instance(&items[0]));
    assert!(out[1].same_instance(&items[2]));
}

#[test]
fn filters_reach_through_parent_references() {
    let registry = registry();
    let root = widget("Root", 9).into_value();
    let items: Vec<Value> = vec![
        widget("A", 1).with("Parent", root.clone()).into_value(),
        widget("B", 2).into_value(),
        root,
    ];
    let source = MemorySource::new(items.clone());
    let ctx = RunContext::new(EvalScope::new(&registry), &source, "Widget");

    let spec = Spec::new("Widget")
        .with_step(Step::query())
        .with_step(Step::filter(
            Match::All,
            vec![Criterion::new("Parent.Name", Operation::EqualTo).with("Root")],
        ));
    assert!(spec.validate(&registry).is_ok());

    let out: Vec<_> = spec.run(&ctx).expect("valid spec").collect();
    assert_eq!(out.len(), 1);
    assert!(out[0].same_instance(&items[0]));
}

#[test]
fn run_refuses_invalid_specs() {
    metrics_reset_all();
    let registry = registry();
    let source = MemorySource::default();
    let ctx = RunContext::new(EvalScope::new(&registry), &source, "Widget");

    let spec = Spec::new("Widget").with_step(Step::count());
    let err = spec.run(&ctx).err().expect("missing query");

    assert_eq!(err.class, ErrorClass::Configuration);
    assert!(err.validation().is_some());

    let counters = metrics_report(None).counters.expect("counters");
    assert_eq!(counters.ops.spec_rejections, 1);
    assert_eq!(counters.ops.spec_runs, 0);
}

#[test]
fn document_shape_is_tagged_and_pascal_cased() {
    let spec = name_filter();
    let doc = spec.to_document().expect("document");

    assert_eq!(doc["SchemaVersion"], json!(SCHEMA_VERSION));
    assert_eq!(doc["Key"], json!(spec.key.to_string()));
    assert_eq!(doc["Steps"][0], json!({ "$type": "Query", "Match": "All", "Criteria": [] }));
    assert_eq!(
        doc["Steps"][1]["Criteria"][0],
        json!({
            "Property": "Name",
            "Operation": "Containing",
            "Invert": false,
            "Arguments": [{ "$type": "Literal", "Group": "Text", "Data": "Foo" }]
        })
    );
}

#[test]
fn documents_round_trip() {
    let spec = rich_spec();
    let text = spec.save().expect("save");
    let loaded = Spec::load_str(&text).expect("load");

    assert_eq!(loaded, spec);
}

#[test]
fn from_document_requires_the_current_version() {
    let mut doc = name_filter().to_document().expect("document");
    doc["SchemaVersion"] = json!(2);

    assert!(matches!(
        Spec::from_document(&doc),
        Err(DocumentError::InvalidField { field, .. }) if field == "SchemaVersion"
    ));
}

#[test]
fn from_document_reports_unknown_operations_and_keys() {
    let mut doc = name_filter().to_document().expect("document");
    doc["Steps"][1]["Criteria"][0]["Operation"] = json!("Resembling");
    assert!(matches!(
        Spec::from_document(&doc),
        Err(DocumentError::UnknownOperation(name)) if name == "Resembling"
    ));

    let mut doc = name_filter().to_document().expect("document");
    doc["Key"] = json!("not-a-ulid");
    assert!(matches!(Spec::from_document(&doc), Err(DocumentError::InvalidKey(_))));
}

#[test]
fn fingerprint_ignores_key_but_tracks_content() {
    let a = name_filter();
    let b = name_filter();
    assert_ne!(a.key, b.key);
    assert_eq!(a.fingerprint().ok(), b.fingerprint().ok());

    let c = a.clone().with_step(Step::count());
    assert_ne!(a.fingerprint().ok(), c.fingerprint().ok());

    let hex = a.fingerprint().expect("fingerprint").as_hex();
    assert_eq!(hex.len(), 64);
}
