use crate::{
    criterion::{Argument, Criterion, EvalScope, Evaluation, Outcome},
    model::Property,
    obs::sink::{self, EngineEvent},
    operation::Verdict,
    value::{TypeGroupExt, Value, ValueEnum, casefold},
};
use spex_primitives::TypeGroup;
use std::sync::Arc;
use tracing::trace;

///
/// Check
/// Outcome of the shared evaluation path before pass/fail is decided.
///

struct Check {
    actual: Value,
    verdict: Verdict,
}

impl Criterion {
    /// Filter/Query semantics: any evaluation-time failure is a non-match.
    #[must_use]
    pub fn matches(&self, candidate: &Value, scope: &EvalScope<'_>) -> bool {
        match self.check(candidate, scope) {
            Ok(check) if !check.verdict.is_mismatch() => check.verdict.matched != self.invert,
            Ok(_) | Err(_) => false,
        }
    }

    /// Verify semantics: always produces an evaluation, never fails.
    #[must_use]
    pub fn evaluate(self: &Arc<Self>, candidate: &Value, scope: &EvalScope<'_>) -> Evaluation {
        let limit = scope.config().message_value_limit;

        let (outcome, actual, message) = match self.check(candidate, scope) {
            Err(reason) => (
                Outcome::Errored,
                Value::Null,
                format!("{}: {reason}", self.describe()),
            ),
            Ok(Check {
                actual,
                verdict: Verdict {
                    reason: Some(reason),
                    ..
                },
            }) => (
                Outcome::Errored,
                actual,
                format!("{}: {reason}", self.describe()),
            ),
            Ok(Check { actual, verdict }) => {
                let outcome = if verdict.matched == self.invert {
                    Outcome::Failed
                } else {
                    Outcome::Passed
                };
                let message = format!(
                    "{}: {} (actual '{}')",
                    self.describe(),
                    outcome.to_string().to_lowercase(),
                    truncate(&actual.to_string(), limit)
                );

                (outcome, actual, message)
            }
        };

        trace!(criterion = %self.describe(), %outcome, "evaluated criterion");
        sink::record(EngineEvent::Evaluated { outcome });

        Evaluation {
            outcome,
            candidate: candidate.clone(),
            actual,
            message,
            criterion: Arc::clone(self),
        }
    }

    // Shared path: resolve the property, read the actual value, resolve and
    // coerce arguments, then apply the operation. `Err` is a soft failure.
    fn check(&self, candidate: &Value, scope: &EvalScope<'_>) -> Result<Check, String> {
        let ty = candidate.type_expr();
        let element = scope
            .registry
            .element(&ty)
            .map_err(|_| format!("no element is registered for type '{ty}'"))?;
        let property = element
            .property(&self.property)
            .ok_or_else(|| format!("property '{}' does not exist on {ty}", self.property))?;
        let actual = candidate
            .read_path(&self.property)
            .ok_or_else(|| format!("property '{}' cannot be read on {ty}", self.property))?;

        let op = self.operation;
        let verdict = if op.is_quantifier() {
            let nested = match self.arguments.as_slice() {
                [Argument::Criterion(nested)] => nested,
                _ => {
                    return Err(format!(
                        "{} requires exactly one nested criterion",
                        op.display_name()
                    ));
                }
            };

            op.quantify(&actual, |member| nested.matches(member, scope))
        } else {
            let args = self
                .arguments
                .iter()
                .map(|argument| resolve(argument, property, scope))
                .collect::<Result<Vec<_>, _>>()?;

            op.apply(&actual, &args)
        };

        Ok(Check { actual, verdict })
    }
}

fn resolve(argument: &Argument, property: &Property, scope: &EvalScope<'_>) -> Result<Value, String> {
    let value = match argument {
        Argument::Literal(value) => value.clone(),
        Argument::Variable { name } => scope
            .variable(name)
            .ok_or_else(|| format!("variable '{name}' is not defined"))?,
        Argument::Criterion(criterion) => return Ok(Value::from((**criterion).clone())),
    };

    if scope.config().coerce_text_arguments {
        coerce(value, property)
    } else {
        Ok(value)
    }
}

/// Parse textual arguments into the property's group; enum names are
/// checked against the property's options and canonicalized.
pub(crate) fn coerce(value: Value, property: &Property) -> Result<Value, String> {
    let group = property.group();

    let value = match value {
        Value::Text(raw)
            if matches!(
                group,
                TypeGroup::Number | TypeGroup::Boolean | TypeGroup::Date
            ) =>
        {
            group
                .try_parse(&raw)
                .ok_or_else(|| format!("'{raw}' is not a valid {group} value"))?
        }
        other => other,
    };

    if group != TypeGroup::Enum || property.options().is_empty() {
        return Ok(value);
    }

    let name = match &value {
        Value::Text(name) => name.as_str(),
        Value::Enum(ValueEnum { name, .. }) => name.as_str(),
        _ => return Ok(value),
    };
    let folded = casefold(name);

    property
        .options()
        .iter()
        .find(|option| casefold(option) == folded)
        .map(|option| Value::Enum(ValueEnum::new(property.ty().root_name(), option.clone())))
        .ok_or_else(|| {
            format!(
                "'{name}' is not a {} option ({})",
                property.ty(),
                property.options().join(", ")
            )
        })
}

fn truncate(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }

    let mut out: String = text.chars().take(limit).collect();
    out.push_str("...");
    out
}
