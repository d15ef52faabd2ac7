use crate::{ALL_TYPE_GROUPS, Contracts, PRECEDENCE, TypeGroup};
use proptest::prelude::*;

#[test]
fn empty_contracts_classify_to_default() {
    assert_eq!(TypeGroup::classify(Contracts::EMPTY), TypeGroup::Default);
}

#[test]
fn single_contract_selects_its_own_group() {
    for group in PRECEDENCE {
        assert_eq!(TypeGroup::classify(group.contract()), group, "{group}");
    }
}

#[test]
fn every_ambiguous_pair_resolves_to_the_higher_precedence_group() {
    for (i, high) in PRECEDENCE.iter().enumerate() {
        for low in &PRECEDENCE[i + 1..] {
            let both = high.contract() | low.contract();
            assert_eq!(
                TypeGroup::classify(both),
                *high,
                "{high} must win over {low}"
            );
        }
    }
}

#[test]
fn documented_ambiguous_cases() {
    // atomic flag types are both boolean and numeric
    assert_eq!(
        TypeGroup::classify(Contracts::BOOLEAN | Contracts::NUMBER),
        TypeGroup::Boolean
    );
    // a collection of enum values is still offered enum operations
    assert_eq!(
        TypeGroup::classify(Contracts::ENUM | Contracts::COLLECTION),
        TypeGroup::Enum
    );
    // enums backed by integers
    assert_eq!(
        TypeGroup::classify(Contracts::ENUM | Contracts::NUMBER),
        TypeGroup::Enum
    );
    // packed string records: text beats collection and element
    assert_eq!(
        TypeGroup::classify(Contracts::TEXT | Contracts::COLLECTION | Contracts::ELEMENT),
        TypeGroup::Text
    );
    // timestamps stored as integers
    assert_eq!(
        TypeGroup::classify(Contracts::NUMBER | Contracts::DATE),
        TypeGroup::Number
    );
    // collection of elements
    assert_eq!(
        TypeGroup::classify(Contracts::COLLECTION | Contracts::ELEMENT),
        TypeGroup::Collection
    );
    // an element that is itself a criterion
    assert_eq!(
        TypeGroup::classify(Contracts::ELEMENT | Contracts::CRITERION),
        TypeGroup::Element
    );
}

#[test]
fn default_has_no_contract_and_sorts_last() {
    assert!(TypeGroup::Default.contract().is_empty());
    assert_eq!(TypeGroup::Default.precedence(), PRECEDENCE.len());
    assert_eq!(TypeGroup::Boolean.precedence(), 0);
}

#[test]
fn bounded_groups_are_boolean_and_enum() {
    let bounded: Vec<_> = ALL_TYPE_GROUPS
        .into_iter()
        .filter(|group| group.is_bounded())
        .collect();

    assert_eq!(bounded, vec![TypeGroup::Boolean, TypeGroup::Enum]);
}

#[test]
fn group_names_round_trip_through_display_and_parse() {
    for group in ALL_TYPE_GROUPS {
        let parsed: TypeGroup = group.to_string().parse().expect("group parses");
        assert_eq!(parsed, group);
    }
}

#[test]
fn group_serializes_as_plain_name() {
    let json = serde_json::to_string(&TypeGroup::Collection).unwrap();
    assert_eq!(json, "\"Collection\"");
}

#[test]
fn debug_lists_contracts_in_precedence_order() {
    let rendered = format!("{:?}", Contracts::TEXT | Contracts::BOOLEAN);
    assert_eq!(rendered, "Contracts(Boolean | Text)");
}

fn arb_contracts() -> impl Strategy<Value = Contracts> {
    (0u16..256).prop_map(|bits| {
        PRECEDENCE
            .iter()
            .enumerate()
            .filter(|(i, _)| bits & (1 << i) != 0)
            .fold(Contracts::EMPTY, |acc, (_, group)| acc | group.contract())
    })
}

proptest! {
    #[test]
    fn classification_is_deterministic(contracts in arb_contracts()) {
        prop_assert_eq!(TypeGroup::classify(contracts), TypeGroup::classify(contracts));
    }

    #[test]
    fn classification_picks_the_minimum_precedence_member(contracts in arb_contracts()) {
        let expected = PRECEDENCE
            .iter()
            .copied()
            .find(|group| contracts.contains(group.contract()))
            .unwrap_or(TypeGroup::Default);

        prop_assert_eq!(TypeGroup::classify(contracts), expected);
    }

    #[test]
    fn adding_a_lower_contract_never_changes_the_group(contracts in arb_contracts()) {
        let group = TypeGroup::classify(contracts);
        let widened = contracts | Contracts::CRITERION;

        if group != TypeGroup::Default {
            prop_assert_eq!(TypeGroup::classify(widened), group);
        }
    }
}
