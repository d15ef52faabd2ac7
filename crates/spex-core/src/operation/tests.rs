use super::*;
use crate::value::{ValueEnum, parse_date};
use proptest::prelude::*;

fn text(s: &str) -> Value {
    Value::from(s)
}

#[test]
fn catalog_is_complete_and_names_round_trip() {
    assert_eq!(Operation::ALL.len(), 20);

    for op in Operation::ALL {
        assert_eq!(op.name().parse::<Operation>(), Ok(*op));
    }
    assert_eq!("None".parse::<Operation>(), Ok(Operation::NoneOf));
    assert!("NoneOf".parse::<Operation>().is_err());
    assert!("Equal".parse::<Operation>().is_err());
}

#[test]
fn unknown_names_report_the_rejected_text() {
    let err = "Resembles".parse::<Operation>().unwrap_err();

    assert_eq!(err, UnknownOperation("Resembles".to_string()));
    assert_eq!(err.to_string(), "unknown operation 'Resembles'");
    let _: &dyn std::error::Error = &err;
}

#[test]
fn display_names_are_title_cased() {
    assert_eq!(
        Operation::GreaterThanOrEqualTo.display_name(),
        "Greater Than Or Equal To"
    );
    assert_eq!(Operation::IsNotNull.display_name(), "Is Not Null");
    assert_eq!(Operation::NoneOf.display_name(), "None");
}

#[test]
fn arity_declarations() {
    assert_eq!(Operation::IsNull.arity(), Arity::Exactly(0));
    assert_eq!(Operation::Between.arity(), Arity::Exactly(2));
    assert_eq!(Operation::In.arity(), Arity::AtLeast(1));
    assert!(Operation::In.arity().accepts(5));
    assert!(!Operation::In.arity().accepts(0));
}

#[test]
fn supports_restricts_by_group() {
    assert!(Operation::Containing.supports(TypeGroup::Collection));
    assert!(!Operation::StartingWith.supports(TypeGroup::Collection));
    assert!(!Operation::GreaterThan.supports(TypeGroup::Boolean));
    assert!(Operation::IsNull.supports(TypeGroup::Element));

    let boolean = Operation::for_group(TypeGroup::Boolean);
    assert_eq!(
        boolean,
        [
            Operation::EqualTo,
            Operation::NotEqualTo,
            Operation::In,
            Operation::IsNull,
            Operation::IsNotNull,
        ]
    );

    let collection = Operation::for_group(TypeGroup::Collection);
    assert!(collection.contains(&Operation::Any));
    assert!(collection.contains(&Operation::NoneOf));
    assert!(!collection.contains(&Operation::EqualTo));
}

#[test]
fn text_modes_are_declared_per_operation() {
    assert_eq!(Operation::EqualTo.text_mode(), Some(TextMode::Cs));
    assert_eq!(Operation::Containing.text_mode(), Some(TextMode::Ci));
    assert_eq!(Operation::Between.text_mode(), None);
}

#[test]
fn equality_is_case_sensitive_containing_is_not() {
    assert!(!Operation::EqualTo.apply(&text("Foo"), &[text("foo")]).matched);
    assert!(Operation::Containing.apply(&text("BigFoo"), &[text("foo")]).matched);
    assert!(Operation::StartingWith.apply(&text("FooBar"), &[text("foo")]).matched);
    assert!(Operation::EndingWith.apply(&text("FooBar"), &[text("BAR")]).matched);
}

#[test]
fn numeric_ops_coerce_text_arguments() {
    let actual = Value::Int(10);

    assert!(Operation::GreaterThan.apply(&actual, &[text("9.5")]).matched);
    assert!(Operation::LessThanOrEqualTo.apply(&actual, &[text("10")]).matched);
    assert!(Operation::EqualTo.apply(&actual, &[Value::Float(10.0)]).matched);

    let verdict = Operation::GreaterThan.apply(&actual, &[text("ten")]);
    assert!(!verdict.matched);
    assert!(verdict.is_mismatch());
}

#[test]
fn mismatch_is_a_recorded_non_match() {
    let verdict = Operation::StartingWith.apply(&Value::Int(1), &[text("1")]);
    assert!(!verdict.matched);
    assert!(verdict.reason.unwrap().contains("Starting With"));

    let negated = Operation::NotEqualTo.apply(&Value::Bool(true), &[Value::Int(3)]);
    assert!(!negated.matched);
    assert!(negated.is_mismatch());
}

#[test]
fn wrong_argument_count_is_a_mismatch() {
    let verdict = Operation::Between.apply(&Value::Int(1), &[Value::Int(0)]);
    assert!(!verdict.matched);
    assert!(verdict.reason.unwrap().contains("exactly 2"));
}

#[test]
fn between_is_inclusive_and_outside_is_its_complement() {
    let low = Value::Int(1);
    let high = Value::Int(5);

    for (n, inside) in [(0, false), (1, true), (3, true), (5, true), (6, false)] {
        let actual = Value::Int(n);
        let args = [low.clone(), high.clone()];
        assert_eq!(Operation::Between.apply(&actual, &args).matched, inside, "{n}");
        assert_eq!(Operation::Outside.apply(&actual, &args).matched, !inside, "{n}");
    }

    assert!(!Operation::Outside.apply(&Value::Null, &[low, high]).matched);
}

#[test]
fn between_dates() {
    let actual = Value::Date(parse_date("2024-06-01").unwrap());
    let verdict = Operation::Between.apply(&actual, &[text("2024-01-01"), text("2024-12-31")]);
    assert!(verdict.matched);
}

#[test]
fn in_matches_any_argument() {
    let color = Value::Enum(ValueEnum::new("Color", "Green"));

    assert!(Operation::In.apply(&color, &[text("red"), text("green")]).matched);
    assert!(!Operation::In.apply(&color, &[text("blue")]).matched);
    assert!(Operation::In.apply(&Value::Bool(true), &[Value::Int(1)]).is_mismatch());
}

#[test]
fn containing_on_collections_checks_members() {
    let tags = Value::from(vec!["Alpha", "Beta"]);

    assert!(Operation::Containing.apply(&tags, &[text("beta")]).matched);
    assert!(!Operation::Containing.apply(&tags, &[text("gamma")]).matched);
}

#[test]
fn like_uses_wildcards() {
    assert!(Operation::Like.apply(&text("Widget-7"), &[text("widget-?")]).matched);
    assert!(!Operation::Like.apply(&text("Widget-77"), &[text("widget-?")]).matched);
}

#[test]
fn null_and_empty_checks() {
    let empty_list = Value::List(Vec::new());

    assert!(Operation::IsNull.apply(&Value::Null, &[]).matched);
    assert!(Operation::IsNotNull.apply(&Value::Int(0), &[]).matched);
    assert!(Operation::IsEmpty.apply(&Value::Null, &[]).matched);
    assert!(Operation::IsEmpty.apply(&text(""), &[]).matched);
    assert!(Operation::IsEmpty.apply(&empty_list, &[]).matched);
    assert!(Operation::IsNotEmpty.apply(&text("x"), &[]).matched);
    assert!(Operation::IsEmpty.apply(&Value::Int(0), &[]).is_mismatch());
}

#[test]
fn quantifiers_need_collections() {
    let pins = Value::from(vec![1, 2, 3]);
    let over_one = |v: &Value| v.as_int().is_some_and(|n| n > 1);

    assert!(Operation::Any.quantify(&pins, over_one).matched);
    assert!(!Operation::All.quantify(&pins, over_one).matched);
    assert!(!Operation::NoneOf.quantify(&pins, over_one).matched);
    assert!(Operation::NoneOf.quantify(&pins, |v| v.as_int() == Some(9)).matched);

    assert!(Operation::Any.quantify(&Value::Int(1), over_one).is_mismatch());
    assert!(Operation::Any.apply(&pins, &[Value::Null]).is_mismatch());
}

#[test]
fn quantifiers_over_empty_collections() {
    let empty = Value::List(Vec::new());

    assert!(!Operation::Any.quantify(&empty, |_| true).matched);
    assert!(Operation::All.quantify(&empty, |_| false).matched);
    assert!(Operation::NoneOf.quantify(&empty, |_| true).matched);
}

proptest! {
    #[test]
    fn apply_is_total(op_index in 0usize..20, n in any::<i64>(), s in ".{0,8}", argc in 0usize..4) {
        let op = Operation::ALL[op_index];
        let args: Vec<Value> = (0..argc).map(|i| if i % 2 == 0 { Value::from(s.as_str()) } else { Value::Int(n) }).collect();

        for actual in [Value::Int(n), Value::from(s.as_str()), Value::Null, Value::Bool(true)] {
            let verdict = op.apply(&actual, &args);
            prop_assert!(!(verdict.matched && verdict.is_mismatch()));
        }
    }

    #[test]
    fn not_equal_is_complement_of_equal_for_ints(a in any::<i64>(), b in any::<i64>()) {
        let eq = Operation::EqualTo.apply(&Value::Int(a), &[Value::Int(b)]).matched;
        let ne = Operation::NotEqualTo.apply(&Value::Int(a), &[Value::Int(b)]).matched;
        prop_assert_eq!(eq, !ne);
    }
}
