//! Deterministic spec fingerprinting over the canonical document.
#![expect(clippy::cast_possible_truncation)]

use crate::{error::DocumentError, spec::Spec};
use serde_json::Value as JsonValue;
use sha2::{Digest, Sha256};

///
/// SpecFingerprint
///
/// Stable content hash of a spec. Two specs with equal pipelines share a
/// fingerprint regardless of key.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct SpecFingerprint([u8; 32]);

impl SpecFingerprint {
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    #[must_use]
    pub fn as_hex(&self) -> String {
        let mut out = String::with_capacity(64);
        for byte in self.0 {
            use std::fmt::Write as _;
            let _ = write!(out, "{byte:02x}");
        }
        out
    }
}

impl std::fmt::Display for SpecFingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.as_hex())
    }
}

pub(super) fn compute(spec: &Spec) -> Result<SpecFingerprint, DocumentError> {
    let mut doc = spec.to_document()?;
    if let JsonValue::Object(map) = &mut doc {
        map.remove("Key");
    }

    let mut hasher = Sha256::new();
    hasher.update(b"specfp:v3");
    hash_json(&mut hasher, &doc);

    let digest = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);

    Ok(SpecFingerprint(out))
}

// Object keys iterate in sorted order, so equal documents hash equally.
fn hash_json(hasher: &mut Sha256, json: &JsonValue) {
    match json {
        JsonValue::Null => write_tag(hasher, 0x00),
        JsonValue::Bool(flag) => {
            write_tag(hasher, 0x01);
            write_tag(hasher, u8::from(*flag));
        }
        JsonValue::Number(number) => {
            write_tag(hasher, 0x02);
            write_str(hasher, &number.to_string());
        }
        JsonValue::String(text) => {
            write_tag(hasher, 0x03);
            write_str(hasher, text);
        }
        JsonValue::Array(items) => {
            write_tag(hasher, 0x04);
            write_u32(hasher, items.len() as u32);
            for item in items {
                hash_json(hasher, item);
            }
        }
        JsonValue::Object(map) => {
            write_tag(hasher, 0x05);
            write_u32(hasher, map.len() as u32);
            for (key, value) in map {
                write_str(hasher, key);
                hash_json(hasher, value);
            }
        }
    }
}

fn write_tag(hasher: &mut Sha256, tag: u8) {
    hasher.update([tag]);
}

fn write_u32(hasher: &mut Sha256, value: u32) {
    hasher.update(value.to_be_bytes());
}

fn write_str(hasher: &mut Sha256, value: &str) {
    write_u32(hasher, value.len() as u32);
    hasher.update(value.as_bytes());
}
