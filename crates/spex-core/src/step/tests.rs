use super::*;
use crate::{
    criterion::Outcome,
    obs::{metrics_report, metrics_reset_all},
    operation::Operation,
    test_fixtures::{registry, widget},
};
use proptest::prelude::*;

fn widgets(names: &[&str]) -> Vec<Value> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| widget(name, i64::try_from(i).unwrap_or_default()).into_value())
        .collect()
}

fn input<'a>(items: &[Value]) -> Stream<'a> {
    Box::new(items.to_vec().into_iter())
}

#[test]
fn query_reads_only_the_target_type() {
    let registry = registry();
    let mut source: MemorySource = widgets(&["a", "b"]).into_iter().collect();
    source.push(crate::test_fixtures::port("p", 1));
    let ctx = RunContext::new(EvalScope::new(&registry), &source, "Widget");

    let step = Step::query();
    let out: Vec<_> = step.process(Box::new(iter::empty()), &ctx).collect();

    assert_eq!(out.len(), 2);
    assert!(out.iter().all(|item| item.type_expr() == TypeExpr::named("Widget")));
}

#[test]
fn query_criteria_prefilter_the_source() {
    let registry = registry();
    let source: MemorySource = widgets(&["Foo", "Bar", "FooBaz"]).into_iter().collect();
    let ctx = RunContext::new(EvalScope::new(&registry), &source, "Widget");

    let step = Step::Query {
        matching: Match::All,
        criteria: vec![Criterion::new("Name", Operation::StartingWith).with("foo")],
    };

    assert_eq!(step.process(Box::new(iter::empty()), &ctx).count(), 2);
}

#[test]
fn filter_keeps_original_instances() {
    let registry = registry();
    let source = MemorySource::default();
    let ctx = RunContext::new(EvalScope::new(&registry), &source, "Widget");
    let items = widgets(&["Foo", "Bar", "Food"]);

    let step = Step::filter(
        Match::All,
        vec![Criterion::new("Name", Operation::Containing).with("Foo")],
    );
    let out: Vec<_> = step.process(input(&items), &ctx).collect();

    assert_eq!(out.len(), 2);
    assert!(out[0].same_instance(&items[0]));
    assert!(out[1].same_instance(&items[2]));
}

#[test]
fn filter_any_is_a_union_without_duplicates() {
    let registry = registry();
    let source = MemorySource::default();
    let ctx = RunContext::new(EvalScope::new(&registry), &source, "Widget");
    let items = widgets(&["Foo", "Bar", "FooBar", "Baz"]);

    let step = Step::filter(
        Match::Any,
        vec![
            Criterion::new("Name", Operation::StartingWith).with("Foo"),
            Criterion::new("Name", Operation::EndingWith).with("Bar"),
        ],
    );

    // FooBar matches both and appears once
    assert_eq!(step.process(input(&items), &ctx).count(), 3);
}

#[test]
fn count_emits_a_single_integer() {
    let registry = registry();
    let source = MemorySource::default();
    let ctx = RunContext::new(EvalScope::new(&registry), &source, "Widget");

    let out: Vec<_> = Step::count().process(input(&widgets(&["a", "b", "c"])), &ctx).collect();
    assert_eq!(out, vec![Value::Int(3)]);

    let empty: Vec<_> = Step::count().process(input(&[]), &ctx).collect();
    assert_eq!(empty, vec![Value::Int(0)]);
}

#[test]
fn count_with_criteria_counts_passing_items() {
    let registry = registry();
    let source = MemorySource::default();
    let ctx = RunContext::new(EvalScope::new(&registry), &source, "Widget");

    let step = Step::Count {
        matching: Match::All,
        criteria: vec![Criterion::new("Weight", Operation::GreaterThanOrEqualTo).with(1)],
    };
    let out: Vec<_> = step.process(input(&widgets(&["a", "b", "c"])), &ctx).collect();

    assert_eq!(out, vec![Value::Int(2)]);
}

#[test]
fn select_flattens_collections_and_keeps_scalars() {
    let registry = registry();
    let source = MemorySource::default();
    let ctx = RunContext::new(EvalScope::new(&registry), &source, "Widget");
    let items = widgets(&["a", "b"]);

    let tags: Vec<_> = Step::select("Tags").process(input(&items), &ctx).collect();
    assert_eq!(tags.len(), 4);
    assert_eq!(tags[0], Value::from("alpha"));

    let names: Vec<_> = Step::select("Name").process(input(&items), &ctx).collect();
    assert_eq!(names, vec![Value::from("a"), Value::from("b")]);
}

#[test]
fn verify_emits_one_evaluation_per_pair() {
    let registry = registry();
    let source = MemorySource::default();
    let ctx = RunContext::new(EvalScope::new(&registry), &source, "Widget");
    let items = widgets(&["a", "b", "c"]);

    let step = Step::verify(vec![
        Criterion::new("Enabled", Operation::EqualTo).with(true),
        Criterion::new("Weight", Operation::GreaterThan).with(0),
    ]);
    let out: Vec<_> = step.process(input(&items), &ctx).collect();

    assert_eq!(out.len(), 6);
    let outcomes: Vec<_> = out
        .iter()
        .filter_map(Value::as_evaluation)
        .map(|evaluation| evaluation.outcome)
        .collect();
    assert_eq!(outcomes[0], Outcome::Passed);
    assert_eq!(outcomes[1], Outcome::Failed);
    assert!(out[2].as_evaluation().is_some_and(|e| e.candidate.same_instance(&items[1])));
}

#[test]
fn streams_are_lazy() {
    let registry = registry();
    let source = MemorySource::default();
    let ctx = RunContext::new(EvalScope::new(&registry), &source, "Widget");
    let pulled = std::cell::Cell::new(0);

    let items = widgets(&["a", "b", "c", "d"]);
    let upstream: Stream<'_> = Box::new(items.iter().cloned().inspect(|_| pulled.set(pulled.get() + 1)));
    let step = Step::filter(Match::All, Vec::new());
    let mut out = step.process(upstream, &ctx);

    assert_eq!(pulled.get(), 0);
    out.next();
    assert_eq!(pulled.get(), 1);
}

#[test]
fn metered_streams_report_rows_on_drop() {
    metrics_reset_all();
    let registry = registry();
    let source = MemorySource::default();
    let ctx = RunContext::new(EvalScope::new(&registry), &source, "Widget");

    let step = Step::select("Tags");
    let taken = step.process(input(&widgets(&["a", "b"])), &ctx).take(3).count();
    assert_eq!(taken, 3);

    let report = metrics_report(None);
    let counters = report.counters.expect("counters");
    assert_eq!(counters.steps["Select"].rows_out, 3);
}

#[test]
fn returns_tracks_shape_changes() {
    let registry = registry();
    let widget = TypeExpr::named("Widget");

    assert_eq!(Step::query().returns(&widget, &registry), Ok(widget.clone()));
    assert_eq!(Step::count().returns(&widget, &registry), Ok(TypeExpr::named("Int")));
    assert_eq!(Step::select("Ports").returns(&widget, &registry), Ok(TypeExpr::named("Port")));
    assert_eq!(
        Step::select("Ports.Count").returns(&widget, &registry),
        Ok(TypeExpr::named("Int"))
    );
    assert_eq!(
        Step::verify(Vec::new()).returns(&widget, &registry),
        Ok(TypeExpr::named("Evaluation"))
    );
}

#[test]
fn returns_rejects_unknown_paths() {
    let registry = registry();
    let err = Step::select("Nope")
        .returns(&TypeExpr::named("Widget"), &registry)
        .expect_err("unknown path");

    assert!(err.any(|kind| matches!(kind, IssueKind::UnknownProperty { .. })));
}

#[test]
fn match_parses_and_displays() {
    assert_eq!("Any".parse::<Match>().ok(), Some(Match::Any));
    assert_eq!(Match::default().to_string(), "All");
}

proptest! {
    #[test]
    fn empty_all_filter_is_identity(weights in prop::collection::vec(0i64..100, 0..20)) {
        let registry = registry();
        let source = MemorySource::default();
        let ctx = RunContext::new(EvalScope::new(&registry), &source, "Widget");
        let items: Vec<Value> = weights.iter().map(|w| widget("w", *w).into_value()).collect();

        let step = Step::filter(Match::All, Vec::new());
        let out: Vec<_> = step.process(input(&items), &ctx).collect();

        prop_assert_eq!(out.len(), items.len());
        prop_assert!(out.iter().zip(&items).all(|(a, b)| a.same_instance(b)));
    }

    #[test]
    fn verify_cardinality_is_product(m in 0usize..8, n in 0usize..4) {
        let registry = registry();
        let source = MemorySource::default();
        let ctx = RunContext::new(EvalScope::new(&registry), &source, "Widget");
        let items: Vec<Value> = (0..m).map(|_| widget("w", 1).into_value()).collect();
        let criteria = (0..n).map(|_| Criterion::new("Weight", Operation::IsNotNull)).collect();

        let step = Step::verify(criteria);
        prop_assert_eq!(step.process(input(&items), &ctx).count(), m * n);
    }
}
