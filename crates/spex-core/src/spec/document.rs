//! Current-schema document shapes.
//!
//! Steps, spec envelope and criteria are serde DTOs; arguments stay as raw
//! JSON because literal payloads are group-tagged rather than kind-tagged.

use crate::{
    criterion::{Argument, Criterion},
    error::DocumentError,
    operation::Operation,
    spec::{SCHEMA_VERSION, Spec},
    step::{Match, Step},
    value::{literal_from_json, literal_to_json},
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use ulid::Ulid;

///
/// SpecDocument
///

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
struct SpecDocument {
    schema_version: u32,
    key: String,
    element: String,
    #[serde(default)]
    steps: Vec<StepDocument>,
}

///
/// StepDocument
///

#[derive(Debug, Deserialize, Serialize)]
#[serde(tag = "$type", rename_all_fields = "PascalCase")]
enum StepDocument {
    Query {
        #[serde(default)]
        r#match: Match,
        #[serde(default)]
        criteria: Vec<CriterionDocument>,
    },
    Filter {
        #[serde(default)]
        r#match: Match,
        #[serde(default)]
        criteria: Vec<CriterionDocument>,
    },
    Count {
        #[serde(default)]
        r#match: Match,
        #[serde(default)]
        criteria: Vec<CriterionDocument>,
    },
    Select {
        property: String,
    },
    Verify {
        #[serde(default)]
        criteria: Vec<CriterionDocument>,
    },
}

///
/// CriterionDocument
///

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
struct CriterionDocument {
    property: String,
    operation: String,
    #[serde(default)]
    invert: bool,
    #[serde(default)]
    arguments: Vec<JsonValue>,
}

///
/// SPEC
///

pub(crate) fn spec_to_json(spec: &Spec) -> Result<JsonValue, DocumentError> {
    let doc = SpecDocument {
        schema_version: SCHEMA_VERSION,
        key: spec.key.to_string(),
        element: spec.element.clone(),
        steps: spec.steps.iter().map(step_to_document).collect(),
    };

    Ok(serde_json::to_value(doc)?)
}

pub(crate) fn spec_from_json(json: &JsonValue) -> Result<Spec, DocumentError> {
    let doc = SpecDocument::deserialize(json)?;

    if doc.schema_version != SCHEMA_VERSION {
        return Err(DocumentError::invalid(
            "SchemaVersion",
            format!(
                "expected {SCHEMA_VERSION}, found {}; migrate the document first",
                doc.schema_version
            ),
        ));
    }

    let key = Ulid::from_string(&doc.key).map_err(|_| DocumentError::InvalidKey(doc.key.clone()))?;
    let steps = doc
        .steps
        .into_iter()
        .map(step_from_document)
        .collect::<Result<_, _>>()?;

    Ok(Spec {
        key,
        element: doc.element,
        steps,
    })
}

///
/// STEPS
///

fn step_to_document(step: &Step) -> StepDocument {
    let criteria = |list: &[Criterion]| list.iter().map(criterion_to_document).collect();

    match step {
        Step::Query { matching, criteria: list } => StepDocument::Query {
            r#match: *matching,
            criteria: criteria(list),
        },
        Step::Filter { matching, criteria: list } => StepDocument::Filter {
            r#match: *matching,
            criteria: criteria(list),
        },
        Step::Count { matching, criteria: list } => StepDocument::Count {
            r#match: *matching,
            criteria: criteria(list),
        },
        Step::Select { property } => StepDocument::Select {
            property: property.clone(),
        },
        Step::Verify { criteria: list } => StepDocument::Verify {
            criteria: criteria(list),
        },
    }
}

fn step_from_document(doc: StepDocument) -> Result<Step, DocumentError> {
    let criteria = |list: Vec<CriterionDocument>| {
        list.into_iter()
            .map(criterion_from_document)
            .collect::<Result<Vec<_>, _>>()
    };

    Ok(match doc {
        StepDocument::Query { r#match, criteria: list } => Step::Query {
            matching: r#match,
            criteria: criteria(list)?,
        },
        StepDocument::Filter { r#match, criteria: list } => Step::Filter {
            matching: r#match,
            criteria: criteria(list)?,
        },
        StepDocument::Count { r#match, criteria: list } => Step::Count {
            matching: r#match,
            criteria: criteria(list)?,
        },
        StepDocument::Select { property } => Step::Select { property },
        StepDocument::Verify { criteria: list } => Step::Verify {
            criteria: criteria(list)?,
        },
    })
}

///
/// CRITERIA
///

fn criterion_to_document(criterion: &Criterion) -> CriterionDocument {
    CriterionDocument {
        property: criterion.property.clone(),
        operation: criterion.operation.name().to_string(),
        invert: criterion.invert,
        arguments: criterion.arguments.iter().map(argument_to_json).collect(),
    }
}

fn criterion_from_document(doc: CriterionDocument) -> Result<Criterion, DocumentError> {
    let operation = doc
        .operation
        .parse::<Operation>()
        .map_err(|_| DocumentError::UnknownOperation(doc.operation.clone()))?;
    let arguments = doc
        .arguments
        .iter()
        .map(argument_from_json)
        .collect::<Result<_, _>>()?;

    Ok(Criterion {
        property: doc.property,
        operation,
        arguments,
        invert: doc.invert,
    })
}

pub(crate) fn criterion_to_json(criterion: &Criterion) -> JsonValue {
    let doc = criterion_to_document(criterion);

    let mut map = Map::new();
    map.insert("Property".to_string(), JsonValue::String(doc.property));
    map.insert("Operation".to_string(), JsonValue::String(doc.operation));
    map.insert("Invert".to_string(), JsonValue::Bool(doc.invert));
    map.insert("Arguments".to_string(), JsonValue::Array(doc.arguments));

    JsonValue::Object(map)
}

pub(crate) fn criterion_from_json(json: &JsonValue) -> Result<Criterion, DocumentError> {
    criterion_from_document(CriterionDocument::deserialize(json)?)
}

///
/// ARGUMENTS
///

fn argument_to_json(argument: &Argument) -> JsonValue {
    let (tag, mut map) = match argument {
        Argument::Literal(value) => match literal_to_json(value) {
            JsonValue::Object(map) => ("Literal", map),
            _ => ("Literal", Map::new()),
        },
        Argument::Variable { name } => {
            let mut map = Map::new();
            map.insert("Name".to_string(), JsonValue::String(name.clone()));
            ("Variable", map)
        }
        Argument::Criterion(criterion) => {
            let mut map = Map::new();
            map.insert("Criterion".to_string(), criterion_to_json(criterion));
            ("Criterion", map)
        }
    };
    map.insert("$type".to_string(), JsonValue::String(tag.to_string()));

    JsonValue::Object(map)
}

fn argument_from_json(json: &JsonValue) -> Result<Argument, DocumentError> {
    let tag = json
        .get("$type")
        .and_then(JsonValue::as_str)
        .ok_or_else(|| DocumentError::MissingField {
            field: "$type".to_string(),
        })?;

    match tag {
        "Literal" => Ok(Argument::Literal(literal_from_json(json)?)),
        "Variable" => {
            let name = json
                .get("Name")
                .and_then(JsonValue::as_str)
                .ok_or_else(|| DocumentError::MissingField {
                    field: "Name".to_string(),
                })?;

            Ok(Argument::variable(name))
        }
        "Criterion" => {
            let nested = json.get("Criterion").ok_or_else(|| DocumentError::MissingField {
                field: "Criterion".to_string(),
            })?;

            Ok(Argument::nested(criterion_from_json(nested)?))
        }
        other => Err(DocumentError::invalid(
            "$type",
            format!("unknown argument kind '{other}'"),
        )),
    }
}
