mod codec;
mod compare;
mod record;


use crate::{
    criterion::{Criterion, Evaluation},
    model::TypeExpr,
};
use spex_primitives::{Contracts, TypeGroup};
use std::{fmt, sync::Arc};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

// re-exports
pub use codec::{TypeGroupExt, literal_from_json, literal_to_json, parse_bool, parse_date, parse_number};
pub use compare::{TextMode, TextOp, casefold, compare_eq, compare_order, like, text_matches};
pub use record::Record;

pub(crate) use codec::loose_json;

///
/// Value
///
/// Runtime value flowing through criteria and pipelines.
///
/// Null        → the property exists but holds no value.
/// Record      → one domain object; shared by `Arc` so pipelines never copy it.
/// Evaluation  → a Verify result, only ever produced as terminal output.
///

#[derive(Clone, Debug, PartialEq)]
#[remain::sorted]
pub enum Value {
    Bool(bool),
    Criterion(Box<Criterion>),
    Date(OffsetDateTime),
    Enum(ValueEnum),
    Evaluation(Arc<Evaluation>),
    Float(f64),
    Int(i64),
    List(Vec<Self>),
    Null,
    Record(Arc<Record>),
    Text(String),
}

impl Value {
    ///
    /// CONSTRUCTION
    ///

    /// Build a `Value::List` from owned items.
    pub fn from_list<T>(items: Vec<T>) -> Self
    where
        T: Into<Self>,
    {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    /// Build an untyped enum value from a variant name.
    pub fn enum_name(name: impl Into<String>) -> Self {
        Self::Enum(ValueEnum::loose(name))
    }

    ///
    /// TYPES
    ///

    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::Bool(_) => ValueKind::Bool,
            Self::Criterion(_) => ValueKind::Criterion,
            Self::Date(_) => ValueKind::Date,
            Self::Enum(_) => ValueKind::Enum,
            Self::Evaluation(_) => ValueKind::Evaluation,
            Self::Float(_) => ValueKind::Float,
            Self::Int(_) => ValueKind::Int,
            Self::List(_) => ValueKind::List,
            Self::Null => ValueKind::Null,
            Self::Record(_) => ValueKind::Record,
            Self::Text(_) => ValueKind::Text,
        }
    }

    /// Semantic group of this value; a pure function of its kind.
    #[must_use]
    pub const fn type_group(&self) -> TypeGroup {
        self.kind().type_group()
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        matches!(self, Self::Int(_) | Self::Float(_))
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_record(&self) -> Option<&Arc<Record>> {
        match self {
            Self::Record(record) => Some(record),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_evaluation(&self) -> Option<&Arc<Evaluation>> {
        match self {
            Self::Evaluation(evaluation) => Some(evaluation),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// Runtime type expression used to find this value's element.
    #[must_use]
    pub fn type_expr(&self) -> TypeExpr {
        match self {
            Self::Record(record) => TypeExpr::named(record.type_name()),
            Self::Enum(ValueEnum {
                type_name: Some(type_name),
                ..
            }) => TypeExpr::named(type_name.as_str()),
            Self::List(items) => TypeExpr::list(
                items
                    .first()
                    .map_or_else(|| TypeExpr::named(ValueKind::Null.type_name()), Self::type_expr),
            ),
            other => TypeExpr::named(other.kind().type_name()),
        }
    }

    /// Identity comparison: records by allocation, everything else by value.
    #[must_use]
    pub fn same_instance(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Record(left), Self::Record(right)) => Arc::ptr_eq(left, right),
            (Self::Evaluation(left), Self::Evaluation(right)) => Arc::ptr_eq(left, right),
            _ => self == other,
        }
    }

    ///
    /// NAVIGATION
    ///

    /// Read one member by name.
    ///
    /// Records expose their fields (absent fields read as `Null`); lists
    /// expose `Count`. Everything else has no members.
    #[must_use]
    pub fn member(&self, name: &str) -> Option<Self> {
        match self {
            Self::Record(record) => Some(record.get(name).cloned().unwrap_or(Self::Null)),
            Self::List(items) if name == COUNT_MEMBER => {
                Some(Self::Int(i64::try_from(items.len()).unwrap_or(i64::MAX)))
            }
            Self::Evaluation(evaluation) => evaluation.member(name),
            Self::Null => Some(Self::Null),
            _ => None,
        }
    }

    /// Read the value at a dotted path. The empty path is the value itself.
    /// Nulls propagate: any segment below a null reads as `Null`.
    #[must_use]
    pub fn read_path(&self, path: &str) -> Option<Self> {
        if path.is_empty() {
            return Some(self.clone());
        }

        let mut current = self.clone();
        for segment in path.split('.') {
            current = current.member(segment)?;
        }

        Some(current)
    }

    /// Members of a collection, or `None` for non-collections.
    #[must_use]
    pub fn members(&self) -> Option<&[Self]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }
}

/// Synthetic member exposing collection length.
pub const COUNT_MEMBER: &str = "Count";

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{value}"),
            Self::Criterion(criterion) => write!(f, "{}", criterion.describe()),
            Self::Date(date) => match date.format(&Rfc3339) {
                Ok(text) => f.write_str(&text),
                Err(_) => write!(f, "{date}"),
            },
            Self::Enum(value) => f.write_str(&value.name),
            Self::Evaluation(evaluation) => f.write_str(&evaluation.message),
            Self::Float(value) => write!(f, "{value}"),
            Self::Int(value) => write!(f, "{value}"),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Null => f.write_str("<null>"),
            Self::Record(record) => write!(f, "{record}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

///
/// ValueKind
///
/// Variant tag of `Value`. Classification is keyed on the kind, never on the
/// payload, so every value of one kind lands in the same group.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ValueKind {
    Bool,
    Criterion,
    Date,
    Enum,
    Evaluation,
    Float,
    Int,
    List,
    Null,
    Record,
    Text,
}

impl ValueKind {
    /// Shape contracts implemented by values of this kind.
    #[must_use]
    pub const fn contracts(self) -> Contracts {
        match self {
            Self::Bool => Contracts::BOOLEAN,
            Self::Criterion => Contracts::CRITERION,
            Self::Date => Contracts::DATE,
            Self::Enum => Contracts::ENUM,
            Self::Evaluation | Self::Record => Contracts::ELEMENT,
            Self::Float | Self::Int => Contracts::NUMBER,
            Self::List => Contracts::COLLECTION,
            Self::Null => Contracts::EMPTY,
            Self::Text => Contracts::TEXT,
        }
    }

    #[must_use]
    pub const fn type_group(self) -> TypeGroup {
        TypeGroup::classify(self.contracts())
    }

    /// Name of the built-in schema type backing this kind.
    #[must_use]
    pub const fn type_name(self) -> &'static str {
        match self {
            Self::Bool => "Bool",
            Self::Criterion => "Criterion",
            Self::Date => "Date",
            Self::Enum => "Enum",
            Self::Evaluation => "Evaluation",
            Self::Float => "Float",
            Self::Int => "Int",
            Self::List => "List",
            Self::Null => "Null",
            Self::Record => "Record",
            Self::Text => "Text",
        }
    }
}

///
/// ValueEnum
///
/// Enum variant carried as a value. `type_name` is `None` for loose values
/// parsed from text before the owning type is known.
///

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ValueEnum {
    pub type_name: Option<String>,
    pub name: String,
}

impl ValueEnum {
    pub fn new(type_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            type_name: Some(type_name.into()),
            name: name.into(),
        }
    }

    pub fn loose(name: impl Into<String>) -> Self {
        Self {
            type_name: None,
            name: name.into(),
        }
    }
}

///
/// CONVERSIONS
///

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<OffsetDateTime> for Value {
    fn from(value: OffsetDateTime) -> Self {
        Self::Date(value)
    }
}

impl From<ValueEnum> for Value {
    fn from(value: ValueEnum) -> Self {
        Self::Enum(value)
    }
}

impl From<Record> for Value {
    fn from(value: Record) -> Self {
        Self::Record(Arc::new(value))
    }
}

impl From<Arc<Record>> for Value {
    fn from(value: Arc<Record>) -> Self {
        Self::Record(value)
    }
}

impl From<Criterion> for Value {
    fn from(value: Criterion) -> Self {
        Self::Criterion(Box::new(value))
    }
}

impl<T: Into<Self>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::from_list(items)
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}
