//! Version 2: flat filter/verification lists become a step pipeline.

use super::{array_field, bool_field, build, match_field, object, string_field};
use serde_json::{Value as JsonValue, json};

pub(super) fn migrate(doc: &JsonValue) -> Result<JsonValue, String> {
    let map = object(doc, "spec")?;

    let key = string_field(map, "SpecId")?;
    let element = string_field(map, "Element")?;
    let filters = array_field(map, "Filters")?;
    let verifications = array_field(map, "Verifications")?;

    let mut steps = vec![json!({ "$type": "Query", "Match": "All", "Criteria": [] })];
    if !filters.is_empty() {
        steps.push(build([
            ("$type", JsonValue::from("Filter")),
            ("Match", match_field(map, "FilterMatch")?),
            ("Criteria", criteria(filters)?),
        ]));
    }
    if !verifications.is_empty() {
        steps.push(build([
            ("$type", JsonValue::from("Verify")),
            ("Criteria", criteria(verifications)?),
        ]));
    }

    Ok(build([
        ("SchemaVersion", JsonValue::from(2)),
        ("Key", JsonValue::String(key)),
        ("Element", JsonValue::String(element)),
        ("Steps", JsonValue::Array(steps)),
    ]))
}

fn criteria(items: &[JsonValue]) -> Result<JsonValue, String> {
    items
        .iter()
        .map(criterion)
        .collect::<Result<Vec<_>, _>>()
        .map(JsonValue::Array)
}

fn criterion(json: &JsonValue) -> Result<JsonValue, String> {
    let map = object(json, "criterion")?;

    Ok(build([
        ("Property", JsonValue::String(string_field(map, "PropertyName")?)),
        ("Operation", JsonValue::String(string_field(map, "Operation")?)),
        ("Argument", argument(map.get("Argument"))?),
        ("Invert", JsonValue::Bool(bool_field(map, "Invert")?)),
    ]))
}

// Free-form values pass through; embedded criteria are renamed as well.
fn argument(json: Option<&JsonValue>) -> Result<JsonValue, String> {
    match json {
        None => Ok(JsonValue::Null),
        Some(value @ JsonValue::Object(map)) if map.contains_key("PropertyName") => criterion(value),
        Some(JsonValue::Array(items)) => items
            .iter()
            .map(|item| argument(Some(item)))
            .collect::<Result<Vec<_>, _>>()
            .map(JsonValue::Array),
        Some(other) => Ok(other.clone()),
    }
}
