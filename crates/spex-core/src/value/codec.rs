use crate::{
    error::DocumentError,
    spec::document::{criterion_from_json, criterion_to_json},
    value::{Record, Value, ValueEnum},
};
use serde_json::{Map, Number, Value as JsonValue};
use spex_primitives::TypeGroup;
use time::{
    Date, OffsetDateTime, format_description::well_known::Rfc3339, macros::format_description,
};

///
/// TypeGroupExt
///
/// Per-group text parsing and canonical document shapes. Lives beside
/// `Value` because `TypeGroup` itself is value-agnostic.
///

pub trait TypeGroupExt {
    /// Parse a textual representation into a value of this group.
    fn try_parse(self, raw: &str) -> Option<Value>;

    /// Canonical document fragment for `value` under this group.
    fn write_data(self, value: &Value) -> JsonValue;

    /// Inverse of `write_data`. `type_name` carries the declared type for
    /// enum literals.
    fn read_data(self, data: &JsonValue, type_name: Option<&str>) -> Result<Value, DocumentError>;
}

impl TypeGroupExt for TypeGroup {
    fn try_parse(self, raw: &str) -> Option<Value> {
        match self {
            Self::Boolean => parse_bool(raw).map(Value::Bool),
            Self::Collection => match serde_json::from_str::<JsonValue>(raw).ok()? {
                JsonValue::Array(items) => Some(Value::List(items.iter().map(loose_json).collect())),
                _ => None,
            },
            Self::Criterion | Self::Element => None,
            Self::Date => parse_date(raw).map(Value::Date),
            Self::Default | Self::Text => Some(Value::Text(raw.to_string())),
            Self::Enum => {
                let name = raw.trim();
                (!name.is_empty()).then(|| Value::enum_name(name))
            }
            Self::Number => parse_number(raw),
        }
    }

    fn write_data(self, value: &Value) -> JsonValue {
        match (self, value) {
            (Self::Default, _) | (_, Value::Null) => JsonValue::Null,
            (Self::Text, Value::Text(text)) => JsonValue::String(text.clone()),
            (Self::Text | Self::Enum, other) => JsonValue::String(other.to_string()),
            _ => natural_json(value),
        }
    }

    fn read_data(self, data: &JsonValue, type_name: Option<&str>) -> Result<Value, DocumentError> {
        if data.is_null() {
            return Ok(Value::Null);
        }

        let value = match self {
            Self::Boolean => match data {
                JsonValue::Bool(flag) => Some(Value::Bool(*flag)),
                JsonValue::String(text) => parse_bool(text).map(Value::Bool),
                _ => None,
            },
            Self::Collection => match data {
                JsonValue::Array(items) => Some(Value::List(
                    items
                        .iter()
                        .map(literal_from_json)
                        .collect::<Result<_, _>>()?,
                )),
                _ => None,
            },
            Self::Criterion => Some(Value::from(criterion_from_json(data)?)),
            Self::Date => data.as_str().and_then(parse_date).map(Value::Date),
            Self::Default => Some(Value::Null),
            Self::Element => Some(read_record(data)?),
            Self::Enum => data.as_str().map(|name| match type_name {
                Some(type_name) => Value::Enum(ValueEnum::new(type_name, name)),
                None => Value::enum_name(name),
            }),
            Self::Number => match data {
                JsonValue::Number(number) => number_value(number),
                JsonValue::String(text) => parse_number(text),
                _ => None,
            },
            Self::Text => match data {
                JsonValue::String(text) => Some(Value::Text(text.clone())),
                JsonValue::Bool(_) | JsonValue::Number(_) => Some(Value::Text(data.to_string())),
                _ => None,
            },
        };

        value.ok_or_else(|| {
            DocumentError::invalid("Data", format!("{data} is not valid {self} data"))
        })
    }
}

///
/// LITERALS
///

/// Group-tagged literal: `{ "Group", "Type"?, "Data" }`.
#[must_use]
pub fn literal_to_json(value: &Value) -> JsonValue {
    let group = value.type_group();
    let mut map = Map::new();

    map.insert("Group".to_string(), JsonValue::String(group.to_string()));
    if let Value::Enum(ValueEnum {
        type_name: Some(type_name),
        ..
    }) = value
    {
        map.insert("Type".to_string(), JsonValue::String(type_name.clone()));
    }
    map.insert("Data".to_string(), group.write_data(value));

    JsonValue::Object(map)
}

pub fn literal_from_json(json: &JsonValue) -> Result<Value, DocumentError> {
    let object = json
        .as_object()
        .ok_or_else(|| DocumentError::invalid("Literal", "expected an object"))?;

    let group = match object.get("Group") {
        Some(JsonValue::String(name)) => name
            .parse::<TypeGroup>()
            .map_err(|_| DocumentError::invalid("Group", format!("unknown group '{name}'")))?,
        Some(other) => return Err(DocumentError::invalid("Group", other.to_string())),
        None => {
            return Err(DocumentError::MissingField {
                field: "Group".to_string(),
            });
        }
    };
    let type_name = object.get("Type").and_then(JsonValue::as_str);
    let data = object.get("Data").unwrap_or(&JsonValue::Null);

    group.read_data(data, type_name)
}

///
/// PARSING
///

/// Accepts `true/false/1/0/yes/no`, case-insensitively.
#[must_use]
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

/// RFC 3339, or a plain `YYYY-MM-DD` read as midnight UTC.
#[must_use]
pub fn parse_date(raw: &str) -> Option<OffsetDateTime> {
    let raw = raw.trim();

    OffsetDateTime::parse(raw, &Rfc3339).ok().or_else(|| {
        Date::parse(raw, format_description!("[year]-[month]-[day]"))
            .ok()
            .map(|date| date.midnight().assume_utc())
    })
}

/// Integers first, then finite floats.
#[must_use]
pub fn parse_number(raw: &str) -> Option<Value> {
    let raw = raw.trim();

    if let Ok(int) = raw.parse::<i64>() {
        return Some(Value::Int(int));
    }

    raw.parse::<f64>()
        .ok()
        .filter(|float| float.is_finite())
        .map(Value::Float)
}

///
/// HELPERS
///

fn number_value(number: &Number) -> Option<Value> {
    number
        .as_i64()
        .map(Value::Int)
        .or_else(|| number.as_f64().map(Value::Float))
}

// Kind-driven JSON used when the group adds no shape of its own.
fn natural_json(value: &Value) -> JsonValue {
    match value {
        Value::Bool(flag) => JsonValue::Bool(*flag),
        Value::Criterion(criterion) => criterion_to_json(criterion),
        Value::Date(date) => date
            .format(&Rfc3339)
            .map_or(JsonValue::Null, JsonValue::String),
        Value::Enum(value) => JsonValue::String(value.name.clone()),
        Value::Evaluation(evaluation) => JsonValue::String(evaluation.message.clone()),
        Value::Float(float) => Number::from_f64(*float).map_or(JsonValue::Null, JsonValue::Number),
        Value::Int(int) => JsonValue::Number((*int).into()),
        Value::List(items) => JsonValue::Array(items.iter().map(literal_to_json).collect()),
        Value::Null => JsonValue::Null,
        Value::Record(record) => write_record(record),
        Value::Text(text) => JsonValue::String(text.clone()),
    }
}

fn write_record(record: &Record) -> JsonValue {
    let fields = record
        .fields()
        .iter()
        .map(|(name, value)| (name.clone(), literal_to_json(value)))
        .collect::<Map<_, _>>();

    let mut map = Map::new();
    map.insert(
        "Type".to_string(),
        JsonValue::String(record.type_name().to_string()),
    );
    map.insert("Fields".to_string(), JsonValue::Object(fields));

    JsonValue::Object(map)
}

fn read_record(data: &JsonValue) -> Result<Value, DocumentError> {
    let type_name = data
        .get("Type")
        .and_then(JsonValue::as_str)
        .ok_or_else(|| DocumentError::MissingField {
            field: "Type".to_string(),
        })?;

    let mut record = Record::new(type_name);
    if let Some(fields) = data.get("Fields").and_then(JsonValue::as_object) {
        for (name, literal) in fields {
            record.set(name.clone(), literal_from_json(literal)?);
        }
    }

    Ok(record.into_value())
}

/// Untagged JSON read by its own shape; used for collection text input
/// and legacy free-form arguments.
pub(crate) fn loose_json(json: &JsonValue) -> Value {
    match json {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(flag) => Value::Bool(*flag),
        JsonValue::Number(number) => number_value(number).unwrap_or(Value::Null),
        JsonValue::String(text) => Value::Text(text.clone()),
        JsonValue::Array(items) => Value::List(items.iter().map(loose_json).collect()),
        JsonValue::Object(_) => Value::Text(json.to_string()),
    }
}
