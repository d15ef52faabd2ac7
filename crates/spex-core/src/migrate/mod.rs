//! Versioned rewrites of persisted spec documents.
//!
//! Each migration lifts a document exactly one version and produces a fresh
//! document; fields it does not recognize are dropped. The chain runs on a
//! copy, so a failed load never leaves a half-rewritten document behind.

mod v2;
mod v3;


use crate::{
    obs::sink::{self, EngineEvent},
    spec::SCHEMA_VERSION,
};
use serde_json::{Map, Value as JsonValue};
use thiserror::Error as ThisError;
use tracing::debug;

/// Field carrying the document version at every schema level.
pub const VERSION_FIELD: &str = "SchemaVersion";

///
/// MigrationError
///

#[derive(Debug, ThisError)]
pub enum MigrationError {
    #[error("document is missing 'SchemaVersion'")]
    MissingVersion,

    #[error("document has an invalid 'SchemaVersion': {0}")]
    InvalidVersion(String),

    #[error("document version {found} is newer than supported version {current}")]
    VersionAhead { found: u32, current: u32 },

    #[error("migration to version {version} failed: {message}")]
    Malformed { version: u32, message: String },
}

///
/// Migration
///

struct Migration {
    version: u32,
    name: &'static str,
    apply: fn(&JsonValue) -> Result<JsonValue, String>,
}

/// Append-only; entry `n` lifts a document from `n - 1` to `n`.
const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 2,
        name: "pipeline steps",
        apply: v2::migrate,
    },
    Migration {
        version: 3,
        name: "argument lists",
        apply: v3::migrate,
    },
];

/// Read and range-check the declared document version.
pub fn document_version(doc: &JsonValue) -> Result<u32, MigrationError> {
    let raw = doc.get(VERSION_FIELD).ok_or(MigrationError::MissingVersion)?;

    let version = raw
        .as_u64()
        .and_then(|version| u32::try_from(version).ok())
        .filter(|version| *version >= 1)
        .ok_or_else(|| MigrationError::InvalidVersion(raw.to_string()))?;

    if version > SCHEMA_VERSION {
        return Err(MigrationError::VersionAhead {
            found: version,
            current: SCHEMA_VERSION,
        });
    }

    Ok(version)
}

/// Lift `doc` to `SCHEMA_VERSION`, returning the rewritten copy. A current
/// document comes back unchanged.
pub fn migrate(doc: &JsonValue) -> Result<JsonValue, MigrationError> {
    let found = document_version(doc)?;
    let mut current = doc.clone();

    for migration in MIGRATIONS.iter().filter(|m| m.version > found) {
        current = (migration.apply)(&current).map_err(|message| MigrationError::Malformed {
            version: migration.version,
            message,
        })?;

        debug!(version = migration.version, name = migration.name, "applied migration");
    }

    if found < SCHEMA_VERSION {
        sink::record(EngineEvent::DocumentMigrated {
            from: found,
            to: SCHEMA_VERSION,
        });
    }

    Ok(current)
}

/// Migrate in place; `doc` is only replaced once the whole chain succeeds.
/// Returns whether anything was rewritten.
pub fn migrate_in_place(doc: &mut JsonValue) -> Result<bool, MigrationError> {
    let found = document_version(doc)?;
    if found == SCHEMA_VERSION {
        return Ok(false);
    }

    *doc = migrate(doc)?;

    Ok(true)
}

///
/// HELPERS
///

pub(super) fn object<'a>(json: &'a JsonValue, what: &str) -> Result<&'a Map<String, JsonValue>, String> {
    json.as_object()
        .ok_or_else(|| format!("{what} must be an object, found {json}"))
}

pub(super) fn string_field(map: &Map<String, JsonValue>, field: &str) -> Result<String, String> {
    match map.get(field) {
        Some(JsonValue::String(text)) => Ok(text.clone()),
        Some(other) => Err(format!("'{field}' must be a string, found {other}")),
        None => Err(format!("'{field}' is missing")),
    }
}

pub(super) fn array_field<'a>(
    map: &'a Map<String, JsonValue>,
    field: &str,
) -> Result<&'a [JsonValue], String> {
    match map.get(field) {
        Some(JsonValue::Array(items)) => Ok(items),
        Some(JsonValue::Null) | None => Ok(&[]),
        Some(other) => Err(format!("'{field}' must be an array, found {other}")),
    }
}

pub(super) fn bool_field(map: &Map<String, JsonValue>, field: &str) -> Result<bool, String> {
    match map.get(field) {
        Some(JsonValue::Bool(flag)) => Ok(*flag),
        Some(JsonValue::Null) | None => Ok(false),
        Some(other) => Err(format!("'{field}' must be a boolean, found {other}")),
    }
}

/// `All` unless the document says otherwise; anything else is rejected.
pub(super) fn match_field(map: &Map<String, JsonValue>, field: &str) -> Result<JsonValue, String> {
    match map.get(field) {
        Some(JsonValue::Null) | None => Ok(JsonValue::from("All")),
        Some(JsonValue::String(text)) if text == "All" || text == "Any" => Ok(JsonValue::from(text.as_str())),
        Some(other) => Err(format!("'{field}' must be All or Any, found {other}")),
    }
}

/// Build an object from ordered entries.
pub(super) fn build<const N: usize>(entries: [(&str, JsonValue); N]) -> JsonValue {
    JsonValue::Object(
        entries
            .into_iter()
            .map(|(key, value)| (key.to_string(), value))
            .collect(),
    )
}
