use crate::{model::ElementRegistry, value::Value};
use spex_config::EvaluationConfig;
use std::collections::BTreeMap;

///
/// VariableScope
///
/// Late-bound variable resolution. Implementations must tolerate repeated
/// and concurrent lookups of the same name.
///

pub trait VariableScope: Send + Sync {
    /// Value bound to `name`, optionally qualified by an originating context.
    fn resolve(&self, name: &str, context: Option<&str>) -> Option<Value>;
}

///
/// EmptyScope
///

#[derive(Clone, Copy, Debug, Default)]
pub struct EmptyScope;

impl VariableScope for EmptyScope {
    fn resolve(&self, _: &str, _: Option<&str>) -> Option<Value> {
        None
    }
}

static EMPTY_SCOPE: EmptyScope = EmptyScope;

///
/// MapScope
///
/// In-memory scope. Context-qualified bindings shadow global ones.
///

#[derive(Clone, Debug, Default)]
pub struct MapScope {
    global: BTreeMap<String, Value>,
    contextual: BTreeMap<(String, String), Value>,
}

impl MapScope {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.global.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_context(
        mut self,
        context: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.contextual
            .insert((context.into(), name.into()), value.into());
        self
    }
}

impl VariableScope for MapScope {
    fn resolve(&self, name: &str, context: Option<&str>) -> Option<Value> {
        context
            .and_then(|context| {
                self.contextual
                    .get(&(context.to_string(), name.to_string()))
            })
            .or_else(|| self.global.get(name))
            .cloned()
    }
}

///
/// EvalScope
///
/// Everything a criterion needs at evaluation time, passed explicitly.
///

#[derive(Clone, Copy)]
pub struct EvalScope<'a> {
    pub registry: &'a ElementRegistry,
    pub variables: &'a dyn VariableScope,
    pub context: Option<&'a str>,
}

impl<'a> EvalScope<'a> {
    #[must_use]
    pub fn new(registry: &'a ElementRegistry) -> Self {
        Self {
            registry,
            variables: &EMPTY_SCOPE,
            context: None,
        }
    }

    #[must_use]
    pub fn with_variables(mut self, variables: &'a dyn VariableScope) -> Self {
        self.variables = variables;
        self
    }

    #[must_use]
    pub const fn with_context(mut self, context: &'a str) -> Self {
        self.context = Some(context);
        self
    }

    #[must_use]
    pub const fn config(&self) -> &EvaluationConfig {
        &self.registry.config().evaluation
    }

    pub(crate) fn variable(&self, name: &str) -> Option<Value> {
        self.variables.resolve(name, self.context)
    }
}
