mod eval;
mod scope;


use crate::{
    model::OUTCOME_OPTIONS,
    operation::Operation,
    value::{Value, ValueEnum},
};
use derive_more::Display;
use std::{fmt::Write as _, sync::Arc};

pub(crate) use eval::coerce;

// re-exports
pub use scope::{EmptyScope, EvalScope, MapScope, VariableScope};

///
/// Argument
///
/// Operand supplied to an operation. Variables are resolved at evaluation
/// time; the criterion never owns the resolved value.
///

#[derive(Clone, Debug, PartialEq)]
pub enum Argument {
    Literal(Value),
    Variable { name: String },
    Criterion(Box<Criterion>),
}

impl Argument {
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Literal(value.into())
    }

    pub fn variable(name: impl Into<String>) -> Self {
        Self::Variable { name: name.into() }
    }

    #[must_use]
    pub fn nested(criterion: Criterion) -> Self {
        Self::Criterion(Box::new(criterion))
    }

    #[must_use]
    pub const fn as_criterion(&self) -> Option<&Criterion> {
        match self {
            Self::Criterion(criterion) => Some(criterion),
            _ => None,
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::Literal(Value::Text(text)) => format!("'{text}'"),
            Self::Literal(value) => value.to_string(),
            Self::Variable { name } => format!("${name}"),
            Self::Criterion(criterion) => format!("({})", criterion.describe()),
        }
    }
}

///
/// Criterion
///
/// A property path bound to an operation and its arguments. `invert`
/// negates pass/fail but never hides an errored result.
///

#[derive(Clone, Debug, PartialEq)]
pub struct Criterion {
    pub property: String,
    pub operation: Operation,
    pub arguments: Vec<Argument>,
    pub invert: bool,
}

impl Criterion {
    pub fn new(property: impl Into<String>, operation: Operation) -> Self {
        Self {
            property: property.into(),
            operation,
            arguments: Vec::new(),
            invert: false,
        }
    }

    #[must_use]
    pub fn with_argument(mut self, argument: Argument) -> Self {
        self.arguments.push(argument);
        self
    }

    /// Shorthand for a literal argument.
    #[must_use]
    pub fn with(self, value: impl Into<Value>) -> Self {
        self.with_argument(Argument::literal(value))
    }

    #[must_use]
    pub fn inverted(mut self) -> Self {
        self.invert = !self.invert;
        self
    }

    /// Human-readable form, e.g. `Name Containing 'Foo'`.
    #[must_use]
    pub fn describe(&self) -> String {
        let mut out = String::new();
        if self.invert {
            out.push_str("Not ");
        }

        let property = if self.property.is_empty() {
            crate::model::THIS
        } else {
            self.property.as_str()
        };
        let _ = write!(out, "{property} {}", self.operation.display_name());

        let separator = match self.operation {
            Operation::Between | Operation::Outside => " and ",
            _ => ", ",
        };
        for (i, argument) in self.arguments.iter().enumerate() {
            out.push_str(if i == 0 { " " } else { separator });
            out.push_str(&argument.describe());
        }

        out
    }
}

///
/// Outcome
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum Outcome {
    Passed,
    Failed,
    Errored,
}

impl Outcome {
    #[must_use]
    pub const fn is_passed(self) -> bool {
        matches!(self, Self::Passed)
    }

    const fn option_index(self) -> usize {
        match self {
            Self::Passed => 0,
            Self::Failed => 1,
            Self::Errored => 2,
        }
    }
}

///
/// Evaluation
///
/// Result of one criterion against one candidate, produced by Verify.
///

#[derive(Clone, Debug, PartialEq)]
pub struct Evaluation {
    pub outcome: Outcome,
    pub candidate: Value,
    pub actual: Value,
    pub message: String,
    pub criterion: Arc<Criterion>,
}

impl Evaluation {
    #[must_use]
    pub const fn passed(&self) -> bool {
        self.outcome.is_passed()
    }

    /// Members readable by later projections and nested criteria.
    #[must_use]
    pub fn member(&self, name: &str) -> Option<Value> {
        match name {
            "Outcome" => Some(Value::Enum(ValueEnum::new(
                "Outcome",
                OUTCOME_OPTIONS[self.outcome.option_index()],
            ))),
            "Passed" => Some(Value::Bool(self.passed())),
            "Message" => Some(Value::Text(self.message.clone())),
            "Actual" => Some(self.actual.clone()),
            "Candidate" => Some(self.candidate.clone()),
            "Criterion" => Some(Value::from((*self.criterion).clone())),
            _ => None,
        }
    }
}
