use crate::value::{Value, ValueEnum, parse_bool, parse_date, parse_number};
use std::{cmp::Ordering, sync::Arc};

///
/// Value comparison semantics
///
/// Cross-kind comparisons used by the operation catalog. Every function
/// returns `None` when the comparison is undefined for the operand kinds;
/// callers turn that into a non-match with a recorded reason.
///

///
/// TextMode
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TextMode {
    Cs, // case-sensitive
    Ci, // case-insensitive
}

///
/// TextOp
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TextOp {
    Eq,
    Contains,
    StartsWith,
    EndsWith,
}

/// Equality with numeric widening and text parsing.
///
/// Null equals only Null. Enum variants compare to text by name,
/// case-insensitively. Records compare by identity first.
#[must_use]
pub fn compare_eq(left: &Value, right: &Value, mode: TextMode) -> Option<bool> {
    match (left, right) {
        (Value::Null, Value::Null) => Some(true),
        (Value::Null, _) | (_, Value::Null) => Some(false),
        (Value::Text(a), Value::Text(b)) => Some(text_matches(a, b, TextOp::Eq, mode)),
        (Value::Bool(a), Value::Bool(b)) => Some(a == b),
        (Value::Date(a), Value::Date(b)) => Some(a == b),
        (Value::Enum(a), Value::Enum(b)) => Some(enum_eq(a, b)),
        (Value::Enum(a), Value::Text(b)) | (Value::Text(b), Value::Enum(a)) => {
            Some(text_matches(&a.name, b, TextOp::Eq, TextMode::Ci))
        }
        (Value::Record(a), Value::Record(b)) => Some(Arc::ptr_eq(a, b) || a == b),
        (Value::List(a), Value::List(b)) => list_eq(a, b, mode),
        (Value::Criterion(a), Value::Criterion(b)) => Some(a == b),
        (Value::Bool(a), Value::Text(b)) | (Value::Text(b), Value::Bool(a)) => {
            parse_bool(b).map(|parsed| *a == parsed)
        }
        (Value::Date(a), Value::Text(b)) | (Value::Text(b), Value::Date(a)) => {
            parse_date(b).map(|parsed| *a == parsed)
        }
        _ => cmp_numeric(left, right).map(Ordering::is_eq),
    }
}

/// Ordering for orderable kinds: numbers (widened, text parsed), dates
/// (text parsed) and text (ordinal). Everything else is unordered.
#[must_use]
pub fn compare_order(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Text(a), Value::Text(b)) => Some(a.as_str().cmp(b.as_str())),
        (Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
        (Value::Date(a), Value::Text(b)) => parse_date(b).map(|parsed| a.cmp(&parsed)),
        (Value::Text(a), Value::Date(b)) => parse_date(a).map(|parsed| parsed.cmp(b)),
        _ => cmp_numeric(left, right),
    }
}

/// Text matching under an explicit case mode.
#[must_use]
pub fn text_matches(haystack: &str, needle: &str, op: TextOp, mode: TextMode) -> bool {
    let (haystack, needle) = match mode {
        TextMode::Cs => (haystack.to_string(), needle.to_string()),
        TextMode::Ci => (casefold(haystack), casefold(needle)),
    };

    match op {
        TextOp::Eq => haystack == needle,
        TextOp::Contains => haystack.contains(&needle),
        TextOp::StartsWith => haystack.starts_with(&needle),
        TextOp::EndsWith => haystack.ends_with(&needle),
    }
}

/// Case-insensitive wildcard match: `*` matches any run, `?` one character.
#[must_use]
pub fn like(text: &str, pattern: &str) -> bool {
    let text: Vec<char> = casefold(text).chars().collect();
    let pattern: Vec<char> = casefold(pattern).chars().collect();

    let (mut t, mut p) = (0, 0);
    let mut star: Option<usize> = None;
    let mut resume = 0;

    while t < text.len() {
        if p < pattern.len() && (pattern[p] == '?' || pattern[p] == text[t]) {
            t += 1;
            p += 1;
        } else if p < pattern.len() && pattern[p] == '*' {
            star = Some(p);
            resume = t;
            p += 1;
        } else if let Some(star_at) = star {
            p = star_at + 1;
            resume += 1;
            t = resume;
        } else {
            return false;
        }
    }

    while p < pattern.len() && pattern[p] == '*' {
        p += 1;
    }

    p == pattern.len()
}

#[must_use]
pub fn casefold(input: &str) -> String {
    if input.is_ascii() {
        return input.to_ascii_lowercase();
    }

    // Unicode fallback
    input.to_lowercase()
}

///
/// Numeric
///
/// Widened numeric operand. Integers compare exactly; any float operand
/// widens both sides to f64.
///

#[derive(Clone, Copy, Debug)]
enum Numeric {
    Int(i64),
    Float(f64),
}

impl Numeric {
    #[expect(clippy::cast_precision_loss)]
    const fn as_f64(self) -> f64 {
        match self {
            Self::Int(value) => value as f64,
            Self::Float(value) => value,
        }
    }
}

fn numeric_operand(value: &Value) -> Option<Numeric> {
    match value {
        Value::Int(value) => Some(Numeric::Int(*value)),
        Value::Float(value) => Some(Numeric::Float(*value)),
        Value::Text(text) => match parse_number(text)? {
            Value::Int(value) => Some(Numeric::Int(value)),
            Value::Float(value) => Some(Numeric::Float(value)),
            _ => None,
        },
        _ => None,
    }
}

// Only defined when at least one side is natively numeric; text-vs-text
// never reaches numeric comparison.
fn cmp_numeric(left: &Value, right: &Value) -> Option<Ordering> {
    if !left.is_numeric() && !right.is_numeric() {
        return None;
    }

    match (numeric_operand(left)?, numeric_operand(right)?) {
        (Numeric::Int(a), Numeric::Int(b)) => Some(a.cmp(&b)),
        (a, b) => a.as_f64().partial_cmp(&b.as_f64()),
    }
}

fn enum_eq(left: &ValueEnum, right: &ValueEnum) -> bool {
    if let (Some(left_type), Some(right_type)) = (&left.type_name, &right.type_name)
        && left_type != right_type
    {
        return false;
    }

    text_matches(&left.name, &right.name, TextOp::Eq, TextMode::Ci)
}

fn list_eq(left: &[Value], right: &[Value], mode: TextMode) -> Option<bool> {
    if left.len() != right.len() {
        return Some(false);
    }

    for (left, right) in left.iter().zip(right) {
        if !compare_eq(left, right, mode)? {
            return Some(false);
        }
    }

    Some(true)
}
