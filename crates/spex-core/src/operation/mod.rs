#[cfg(test)]
mod tests;

use crate::value::{TextMode, TextOp, Value, compare_eq, compare_order, like, text_matches};
use convert_case::{Case, Casing};
use spex_primitives::TypeGroup;
use std::{cmp::Ordering, fmt, str::FromStr};
use thiserror::Error as ThisError;

///
/// Arity
///
/// Number of arguments an operation consumes.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Arity {
    Exactly(usize),
    AtLeast(usize),
}

impl Arity {
    #[must_use]
    pub const fn accepts(self, count: usize) -> bool {
        match self {
            Self::Exactly(n) => count == n,
            Self::AtLeast(n) => count >= n,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exactly(n) => write!(f, "exactly {n}"),
            Self::AtLeast(n) => write!(f, "at least {n}"),
        }
    }
}

///
/// TextSemantics
///
/// How an operation treats text operands. Declared per operation.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TextSemantics {
    CaseSensitive,
    CaseInsensitive,
    Ordinal,
    NotApplicable,
}

///
/// Verdict
///
/// Result of applying an operation. A type mismatch is never a fault:
/// it is a non-match carrying the reason.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Verdict {
    pub matched: bool,
    pub reason: Option<String>,
}

impl Verdict {
    #[must_use]
    pub const fn of(matched: bool) -> Self {
        Self {
            matched,
            reason: None,
        }
    }

    pub fn mismatch(reason: impl Into<String>) -> Self {
        Self {
            matched: false,
            reason: Some(reason.into()),
        }
    }

    #[must_use]
    pub const fn is_mismatch(&self) -> bool {
        self.reason.is_some()
    }

    /// Logical negation; a mismatch stays a non-match.
    #[must_use]
    pub fn negate(self) -> Self {
        if self.is_mismatch() {
            self
        } else {
            Self::of(!self.matched)
        }
    }
}

///
/// Operation
///
/// Closed catalog of comparison operations. `NoneOf` is persisted as `None`.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[remain::sorted]
pub enum Operation {
    All,
    Any,
    Between,
    Containing,
    EndingWith,
    EqualTo,
    GreaterThan,
    GreaterThanOrEqualTo,
    In,
    IsEmpty,
    IsNotEmpty,
    IsNotNull,
    IsNull,
    LessThan,
    LessThanOrEqualTo,
    Like,
    NoneOf,
    NotEqualTo,
    Outside,
    StartingWith,
}

///
/// operation_table
///
/// One row per operation: persisted name, arity, text semantics and the
/// groups the operation is offered for.
///

macro_rules! operation_table {
    ( $( $op:ident => $name:literal, $arity:expr, $text:ident, [ $( $group:ident ),* ] ; )* ) => {
        impl Operation {
            /// Every operation, in catalog order.
            pub const ALL: &'static [Self] = &[ $( Self::$op ),* ];

            /// Persisted name.
            #[must_use]
            pub const fn name(self) -> &'static str {
                match self {
                    $( Self::$op => $name, )*
                }
            }

            #[must_use]
            pub const fn arity(self) -> Arity {
                match self {
                    $( Self::$op => $arity, )*
                }
            }

            #[must_use]
            pub const fn text_semantics(self) -> TextSemantics {
                match self {
                    $( Self::$op => TextSemantics::$text, )*
                }
            }

            /// Groups this operation is valid against.
            #[must_use]
            pub const fn groups(self) -> &'static [TypeGroup] {
                match self {
                    $( Self::$op => &[ $( TypeGroup::$group ),* ], )*
                }
            }
        }
    };
}

operation_table! {
    EqualTo => "EqualTo", Arity::Exactly(1), CaseSensitive,
        [Text, Number, Boolean, Enum, Date, Default];
    NotEqualTo => "NotEqualTo", Arity::Exactly(1), CaseSensitive,
        [Text, Number, Boolean, Enum, Date, Default];
    GreaterThan => "GreaterThan", Arity::Exactly(1), Ordinal, [Text, Number, Date];
    GreaterThanOrEqualTo => "GreaterThanOrEqualTo", Arity::Exactly(1), Ordinal, [Text, Number, Date];
    LessThan => "LessThan", Arity::Exactly(1), Ordinal, [Text, Number, Date];
    LessThanOrEqualTo => "LessThanOrEqualTo", Arity::Exactly(1), Ordinal, [Text, Number, Date];
    Between => "Between", Arity::Exactly(2), NotApplicable, [Number, Date];
    Outside => "Outside", Arity::Exactly(2), NotApplicable, [Number, Date];
    In => "In", Arity::AtLeast(1), CaseSensitive, [Text, Number, Boolean, Enum, Date];
    Containing => "Containing", Arity::Exactly(1), CaseInsensitive, [Text, Collection];
    StartingWith => "StartingWith", Arity::Exactly(1), CaseInsensitive, [Text];
    EndingWith => "EndingWith", Arity::Exactly(1), CaseInsensitive, [Text];
    Like => "Like", Arity::Exactly(1), CaseInsensitive, [Text];
    IsNull => "IsNull", Arity::Exactly(0), NotApplicable,
        [Boolean, Collection, Criterion, Date, Default, Element, Enum, Number, Text];
    IsNotNull => "IsNotNull", Arity::Exactly(0), NotApplicable,
        [Boolean, Collection, Criterion, Date, Default, Element, Enum, Number, Text];
    IsEmpty => "IsEmpty", Arity::Exactly(0), NotApplicable, [Text, Collection, Default];
    IsNotEmpty => "IsNotEmpty", Arity::Exactly(0), NotApplicable, [Text, Collection, Default];
    Any => "Any", Arity::Exactly(1), NotApplicable, [Collection];
    All => "All", Arity::Exactly(1), NotApplicable, [Collection];
    NoneOf => "None", Arity::Exactly(1), NotApplicable, [Collection];
}

impl Operation {
    #[must_use]
    pub fn supports(self, group: TypeGroup) -> bool {
        self.groups().contains(&group)
    }

    /// Operations offered for a property of `group`, in catalog order.
    #[must_use]
    pub fn for_group(group: TypeGroup) -> Vec<Self> {
        Self::ALL
            .iter()
            .copied()
            .filter(|op| op.supports(group))
            .collect()
    }

    /// Quantifiers take a nested criterion evaluated per collection member.
    #[must_use]
    pub const fn is_quantifier(self) -> bool {
        matches!(self, Self::Any | Self::All | Self::NoneOf)
    }

    /// Case mode used for text comparisons, when the operation compares text.
    #[must_use]
    pub const fn text_mode(self) -> Option<TextMode> {
        match self.text_semantics() {
            TextSemantics::CaseSensitive | TextSemantics::Ordinal => Some(TextMode::Cs),
            TextSemantics::CaseInsensitive => Some(TextMode::Ci),
            TextSemantics::NotApplicable => None,
        }
    }

    /// Human-readable name, e.g. "Greater Than Or Equal To".
    #[must_use]
    pub fn display_name(self) -> String {
        self.name().to_case(Case::Title)
    }

    ///
    /// EVALUATION
    ///

    /// Apply a non-quantifier operation to an actual value.
    ///
    /// Total: argument-count and type mismatches evaluate to a non-match
    /// with a reason.
    #[must_use]
    pub fn apply(self, actual: &Value, args: &[Value]) -> Verdict {
        if !self.arity().accepts(args.len()) {
            return Verdict::mismatch(format!(
                "{} expects {} argument(s), got {}",
                self.display_name(),
                self.arity(),
                args.len()
            ));
        }

        match self {
            Self::EqualTo => self.equality(actual, &args[0]),
            Self::NotEqualTo => self.equality(actual, &args[0]).negate(),
            Self::GreaterThan => self.ordering(actual, &args[0], Ordering::is_gt),
            Self::GreaterThanOrEqualTo => self.ordering(actual, &args[0], Ordering::is_ge),
            Self::LessThan => self.ordering(actual, &args[0], Ordering::is_lt),
            Self::LessThanOrEqualTo => self.ordering(actual, &args[0], Ordering::is_le),
            Self::Between => self.range(actual, &args[0], &args[1]),
            Self::Outside if actual.is_null() => Verdict::of(false),
            Self::Outside => self.range(actual, &args[0], &args[1]).negate(),
            Self::In => self.membership(actual, args),
            Self::Containing => self.containing(actual, &args[0]),
            Self::StartingWith => self.text(actual, &args[0], TextOp::StartsWith),
            Self::EndingWith => self.text(actual, &args[0], TextOp::EndsWith),
            Self::Like => match actual {
                Value::Text(text) => Verdict::of(like(text, &args[0].to_string())),
                Value::Null => Verdict::of(false),
                other => self.unsupported(other),
            },
            Self::IsNull => Verdict::of(actual.is_null()),
            Self::IsNotNull => Verdict::of(!actual.is_null()),
            Self::IsEmpty => self.emptiness(actual),
            Self::IsNotEmpty => self.emptiness(actual).negate(),
            Self::Any | Self::All | Self::NoneOf => {
                Verdict::mismatch(format!("{} requires a nested criterion", self.display_name()))
            }
        }
    }

    /// Apply a quantifier given a per-member test.
    pub fn quantify(self, actual: &Value, mut test: impl FnMut(&Value) -> bool) -> Verdict {
        let Some(members) = actual.members() else {
            return match actual {
                Value::Null => Verdict::of(matches!(self, Self::All | Self::NoneOf)),
                other => self.unsupported(other),
            };
        };

        match self {
            Self::Any => Verdict::of(members.iter().any(test)),
            Self::All => Verdict::of(members.iter().all(test)),
            Self::NoneOf => Verdict::of(!members.iter().any(&mut test)),
            _ => Verdict::mismatch(format!("{} is not a quantifier", self.display_name())),
        }
    }

    ///
    /// HELPERS
    ///

    fn mode(self) -> TextMode {
        self.text_mode().unwrap_or(TextMode::Cs)
    }

    fn unsupported(self, actual: &Value) -> Verdict {
        Verdict::mismatch(format!(
            "{} does not apply to {} value '{actual}'",
            self.display_name(),
            actual.type_group()
        ))
    }

    fn incomparable(self, actual: &Value, arg: &Value) -> Verdict {
        Verdict::mismatch(format!(
            "{}: cannot compare '{actual}' with '{arg}'",
            self.display_name()
        ))
    }

    fn equality(self, actual: &Value, arg: &Value) -> Verdict {
        compare_eq(actual, arg, self.mode())
            .map_or_else(|| self.incomparable(actual, arg), Verdict::of)
    }

    fn ordering(self, actual: &Value, arg: &Value, accept: fn(Ordering) -> bool) -> Verdict {
        if actual.is_null() {
            return Verdict::of(false);
        }

        compare_order(actual, arg).map_or_else(
            || self.incomparable(actual, arg),
            |ord| Verdict::of(accept(ord)),
        )
    }

    fn range(self, actual: &Value, low: &Value, high: &Value) -> Verdict {
        if actual.is_null() {
            return Verdict::of(false);
        }

        match (compare_order(actual, low), compare_order(actual, high)) {
            (Some(above), Some(below)) => Verdict::of(above.is_ge() && below.is_le()),
            (None, _) => self.incomparable(actual, low),
            (_, None) => self.incomparable(actual, high),
        }
    }

    fn membership(self, actual: &Value, args: &[Value]) -> Verdict {
        let mut comparable = false;
        for arg in args {
            match compare_eq(actual, arg, self.mode()) {
                Some(true) => return Verdict::of(true),
                Some(false) => comparable = true,
                None => {}
            }
        }

        if comparable {
            Verdict::of(false)
        } else {
            Verdict::mismatch(format!(
                "{}: '{actual}' is not comparable with any argument",
                self.display_name()
            ))
        }
    }

    fn containing(self, actual: &Value, arg: &Value) -> Verdict {
        match actual {
            Value::Text(text) => Verdict::of(text_matches(
                text,
                &arg.to_string(),
                TextOp::Contains,
                TextMode::Ci,
            )),
            Value::List(items) => Verdict::of(
                items
                    .iter()
                    .any(|item| compare_eq(item, arg, TextMode::Ci) == Some(true)),
            ),
            Value::Null => Verdict::of(false),
            other => self.unsupported(other),
        }
    }

    fn text(self, actual: &Value, arg: &Value, op: TextOp) -> Verdict {
        match actual {
            Value::Text(text) => Verdict::of(text_matches(text, &arg.to_string(), op, self.mode())),
            Value::Null => Verdict::of(false),
            other => self.unsupported(other),
        }
    }

    fn emptiness(self, actual: &Value) -> Verdict {
        match actual {
            Value::Null => Verdict::of(true),
            Value::Text(text) => Verdict::of(text.is_empty()),
            Value::List(items) => Verdict::of(items.is_empty()),
            other => self.unsupported(other),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

///
/// UnknownOperation
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("unknown operation '{0}'")]
pub struct UnknownOperation(pub String);

impl FromStr for Operation {
    type Err = UnknownOperation;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|op| op.name() == name)
            .ok_or_else(|| UnknownOperation(name.to_string()))
    }
}
