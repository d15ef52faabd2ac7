//! Version 3: retired operations are renamed and the single free-form
//! `Argument` becomes a list of group-tagged `Arguments`.

use super::{array_field, bool_field, build, match_field, object, string_field};
use crate::{
    operation::{Arity, Operation},
    value::{Value, literal_to_json, loose_json},
};
use serde_json::{Map, Value as JsonValue};

/// Retired operation names and their replacements.
const RETIRED: &[(&str, &str)] = &[
    ("Contains", "Containing"),
    ("Empty", "IsEmpty"),
    ("EndsWith", "EndingWith"),
    ("Equal", "EqualTo"),
    ("GreaterThanOrEqual", "GreaterThanOrEqualTo"),
    ("LessThanOrEqual", "LessThanOrEqualTo"),
    ("NotEmpty", "IsNotEmpty"),
    ("NotEqual", "NotEqualTo"),
    ("NotNull", "IsNotNull"),
    ("Null", "IsNull"),
    ("StartsWith", "StartingWith"),
    ("Void", "IsEmpty"),
];

pub(super) fn migrate(doc: &JsonValue) -> Result<JsonValue, String> {
    let map = object(doc, "spec")?;

    let steps = array_field(map, "Steps")?
        .iter()
        .map(step)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(build([
        ("SchemaVersion", JsonValue::from(3)),
        ("Key", JsonValue::String(string_field(map, "Key")?)),
        ("Element", JsonValue::String(string_field(map, "Element")?)),
        ("Steps", JsonValue::Array(steps)),
    ]))
}

fn step(json: &JsonValue) -> Result<JsonValue, String> {
    let map = object(json, "step")?;
    let tag = string_field(map, "$type")?;

    match tag.as_str() {
        "Query" | "Filter" | "Count" => Ok(build([
            ("$type", JsonValue::String(tag.clone())),
            ("Match", match_field(map, "Match")?),
            ("Criteria", criteria(map)?),
        ])),
        "Select" => Ok(build([
            ("$type", JsonValue::String(tag.clone())),
            ("Property", JsonValue::String(string_field(map, "Property")?)),
        ])),
        "Verify" => Ok(build([
            ("$type", JsonValue::String(tag.clone())),
            ("Criteria", criteria(map)?),
        ])),
        other => Err(format!("unknown step type '{other}'")),
    }
}

fn criteria(map: &Map<String, JsonValue>) -> Result<JsonValue, String> {
    array_field(map, "Criteria")?
        .iter()
        .map(criterion)
        .collect::<Result<Vec<_>, _>>()
        .map(JsonValue::Array)
}

fn criterion(json: &JsonValue) -> Result<JsonValue, String> {
    let map = object(json, "criterion")?;
    let name = string_field(map, "Operation")?;
    let raw = map.get("Argument").unwrap_or(&JsonValue::Null);

    let (operation, arguments) = match name.as_str() {
        "True" => (Operation::EqualTo, vec![literal(&Value::Bool(true))]),
        "False" => (Operation::EqualTo, vec![literal(&Value::Bool(false))]),
        _ => {
            let renamed = RETIRED
                .iter()
                .find(|(retired, _)| *retired == name)
                .map_or(name.as_str(), |(_, current)| *current);
            let operation = renamed
                .parse::<Operation>()
                .map_err(|err| err.to_string())?;

            (operation, arguments(operation, raw)?)
        }
    };

    Ok(build([
        ("Property", JsonValue::String(string_field(map, "Property")?)),
        ("Operation", JsonValue::from(operation.name())),
        ("Invert", JsonValue::Bool(bool_field(map, "Invert")?)),
        ("Arguments", JsonValue::Array(arguments)),
    ]))
}

fn arguments(operation: Operation, raw: &JsonValue) -> Result<Vec<JsonValue>, String> {
    let spreads = matches!(
        operation,
        Operation::In | Operation::Between | Operation::Outside
    );

    match raw {
        JsonValue::Null if operation.arity() == Arity::Exactly(0) => Ok(Vec::new()),
        JsonValue::Array(items) if spreads => items.iter().map(argument).collect(),
        other => Ok(vec![argument(other)?]),
    }
}

fn argument(json: &JsonValue) -> Result<JsonValue, String> {
    match json {
        JsonValue::Object(map) if map.contains_key("Property") && map.contains_key("Operation") => {
            Ok(build([
                ("$type", JsonValue::from("Criterion")),
                ("Criterion", criterion(json)?),
            ]))
        }
        JsonValue::Object(_) => Err(format!("unsupported argument object {json}")),
        other => Ok(literal(&loose_json(other))),
    }
}

fn literal(value: &Value) -> JsonValue {
    let mut json = literal_to_json(value);
    if let JsonValue::Object(map) = &mut json {
        map.insert("$type".to_string(), JsonValue::from("Literal"));
    }

    json
}
