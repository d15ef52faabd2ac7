mod source;

#[cfg(test)]
mod tests;

use crate::{
    criterion::{Criterion, EvalScope},
    model::{ElementRegistry, TypeExpr},
    obs::sink::{StepKind, StepSpan},
    spec::{Issue, IssueKind, ValidationError, validate::check_criteria},
    value::Value,
};
use derive_more::{Display, FromStr};
use serde::{Deserialize, Serialize};
use std::{iter, sync::Arc};
use tracing::debug;

// re-exports
pub use source::{MemorySource, ObjectSource};

/// Lazy, pull-based stream of pipeline items.
pub type Stream<'a> = Box<dyn Iterator<Item = Value> + 'a>;

///
/// Match
///
/// How a step combines its criteria. An empty criteria list passes
/// everything under either policy.
///

#[derive(
    Clone, Copy, Debug, Default, Deserialize, Display, Eq, FromStr, PartialEq, Serialize,
)]
pub enum Match {
    #[default]
    All,
    Any,
}

impl Match {
    #[must_use]
    pub fn accepts(self, criteria: &[Criterion], item: &Value, scope: &EvalScope<'_>) -> bool {
        if criteria.is_empty() {
            return true;
        }

        match self {
            Self::All => criteria.iter().all(|criterion| criterion.matches(item, scope)),
            Self::Any => criteria.iter().any(|criterion| criterion.matches(item, scope)),
        }
    }
}

///
/// RunContext
///
/// Collaborators for one pipeline run.
///

#[derive(Clone)]
pub struct RunContext<'a> {
    pub scope: EvalScope<'a>,
    pub source: &'a dyn ObjectSource,
    pub element: TypeExpr,
}

impl<'a> RunContext<'a> {
    pub fn new(scope: EvalScope<'a>, source: &'a dyn ObjectSource, element: impl Into<TypeExpr>) -> Self {
        Self {
            scope,
            source,
            element: element.into(),
        }
    }
}

///
/// Step
///
/// One pipeline stage. Query opens a pipeline; Verify closes it.
///

#[derive(Clone, Debug, PartialEq)]
pub enum Step {
    Query {
        matching: Match,
        criteria: Vec<Criterion>,
    },
    Filter {
        matching: Match,
        criteria: Vec<Criterion>,
    },
    Count {
        matching: Match,
        criteria: Vec<Criterion>,
    },
    Select {
        property: String,
    },
    Verify {
        criteria: Vec<Criterion>,
    },
}

impl Step {
    ///
    /// CONSTRUCTION
    ///

    #[must_use]
    pub const fn query() -> Self {
        Self::Query {
            matching: Match::All,
            criteria: Vec::new(),
        }
    }

    #[must_use]
    pub const fn filter(matching: Match, criteria: Vec<Criterion>) -> Self {
        Self::Filter { matching, criteria }
    }

    #[must_use]
    pub const fn count() -> Self {
        Self::Count {
            matching: Match::All,
            criteria: Vec::new(),
        }
    }

    pub fn select(property: impl Into<String>) -> Self {
        Self::Select {
            property: property.into(),
        }
    }

    #[must_use]
    pub const fn verify(criteria: Vec<Criterion>) -> Self {
        Self::Verify { criteria }
    }

    ///
    /// INTROSPECTION
    ///

    #[must_use]
    pub const fn kind(&self) -> StepKind {
        match self {
            Self::Query { .. } => StepKind::Query,
            Self::Filter { .. } => StepKind::Filter,
            Self::Count { .. } => StepKind::Count,
            Self::Select { .. } => StepKind::Select,
            Self::Verify { .. } => StepKind::Verify,
        }
    }

    #[must_use]
    pub fn criteria(&self) -> &[Criterion] {
        match self {
            Self::Query { criteria, .. }
            | Self::Filter { criteria, .. }
            | Self::Count { criteria, .. }
            | Self::Verify { criteria } => criteria,
            Self::Select { .. } => &[],
        }
    }

    /// Verify cannot chain into another step.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Verify { .. })
    }

    ///
    /// SHAPE
    ///

    /// Output shape for an input shape, validating configured paths first.
    pub fn returns(
        &self,
        input: &TypeExpr,
        registry: &ElementRegistry,
    ) -> Result<TypeExpr, ValidationError> {
        let mut issues = Vec::new();
        let output = self.check(None, input, registry, &mut issues);

        match output {
            Some(output) if issues.is_empty() => Ok(output),
            _ => Err(ValidationError::new(issues)),
        }
    }

    // Records issues and returns the output shape when it can be determined.
    pub(crate) fn check(
        &self,
        index: Option<usize>,
        input: &TypeExpr,
        registry: &ElementRegistry,
        issues: &mut Vec<Issue>,
    ) -> Option<TypeExpr> {
        let Ok(element) = registry.element(input) else {
            issues.push(Issue::new(index, IssueKind::UnknownElement(input.to_string())));
            return None;
        };

        check_criteria(self.criteria(), &element, registry, index, issues);

        match self {
            Self::Query { .. } | Self::Filter { .. } => Some(input.clone()),
            Self::Count { .. } => Some(TypeExpr::named("Int")),
            Self::Select { property } => {
                let Some(selected) = element.property(property) else {
                    issues.push(Issue::new(
                        index,
                        IssueKind::UnknownProperty {
                            path: property.clone(),
                            element: element.name(),
                        },
                    ));
                    return None;
                };

                Some(match selected.ty() {
                    TypeExpr::List(item) => (**item).clone(),
                    named @ TypeExpr::Named(_) => named.clone(),
                })
            }
            Self::Verify { .. } => Some(TypeExpr::named("Evaluation")),
        }
    }

    ///
    /// PROCESSING
    ///

    /// Transform `input` lazily. Query ignores its input and reads the
    /// source instead.
    pub fn process<'a>(&'a self, input: Stream<'a>, ctx: &RunContext<'a>) -> Stream<'a> {
        let scope = ctx.scope;
        debug!(step = %self.kind(), element = %ctx.element, "processing step");

        let output: Stream<'a> = match self {
            Self::Query { matching, criteria } => {
                let matching = *matching;
                Box::new(
                    ctx.source
                        .objects(&ctx.element)
                        .filter(move |item| matching.accepts(criteria, item, &scope)),
                )
            }

            Self::Filter { matching, criteria } => {
                let matching = *matching;
                Box::new(input.filter(move |item| matching.accepts(criteria, item, &scope)))
            }

            Self::Count { matching, criteria } => {
                let matching = *matching;
                Box::new(iter::once_with(move || {
                    let count = input
                        .filter(|item| matching.accepts(criteria, item, &scope))
                        .count();

                    Value::Int(i64::try_from(count).unwrap_or(i64::MAX))
                }))
            }

            Self::Select { property } => Box::new(input.flat_map(move |item| {
                match item.read_path(property) {
                    Some(Value::List(items)) => items,
                    Some(value) => vec![value],
                    None => vec![Value::Null],
                }
            })),

            Self::Verify { criteria } => {
                let criteria: Vec<Arc<Criterion>> =
                    criteria.iter().cloned().map(Arc::new).collect();

                Box::new(input.flat_map(move |item| {
                    criteria
                        .iter()
                        .map(|criterion| Value::Evaluation(Arc::new(criterion.evaluate(&item, &scope))))
                        .collect::<Vec<_>>()
                }))
            }
        };

        Box::new(Metered {
            inner: output,
            span: StepSpan::new(self.kind()),
        })
    }
}

///
/// Metered
/// Counts rows pulled through a step; the span reports when dropped.
///

struct Metered<'a> {
    inner: Stream<'a>,
    span: StepSpan,
}

impl Iterator for Metered<'_> {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        let item = self.inner.next()?;
        self.span.add_row();

        Some(item)
    }
}
