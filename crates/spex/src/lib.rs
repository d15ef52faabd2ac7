//! ## Crate layout
//! - `config`: engine configuration loaded from TOML.
//! - `core`: element descriptors, operations, criteria, steps, specs, and
//!   migrations.
//! - `primitives`: type contracts and the type-group classification.
//! - `error`: public error taxonomy.
//!
//! `Engine` bundles an element registry with a variable scope so callers can
//! load and run specs without assembling a `RunContext` themselves.

pub use spex_config as config;
pub use spex_core as core;
pub use spex_primitives as primitives;

pub mod error;

pub use error::Error;

use spex_core::{
    criterion::{EvalScope, Evaluation, VariableScope},
    model::ElementRegistry,
    spec::Spec,
    step::{ObjectSource, RunContext},
    value::Value,
};
use std::sync::Arc;
use tracing::debug;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

///
/// Engine
///

#[derive(Clone, Copy)]
pub struct Engine<'a> {
    scope: EvalScope<'a>,
}

impl<'a> Engine<'a> {
    #[must_use]
    pub fn new(registry: &'a ElementRegistry) -> Self {
        Self {
            scope: EvalScope::new(registry),
        }
    }

    #[must_use]
    pub fn with_variables(self, variables: &'a dyn VariableScope) -> Self {
        Self {
            scope: self.scope.with_variables(variables),
        }
    }

    #[must_use]
    pub const fn with_context(self, context: &'a str) -> Self {
        Self {
            scope: self.scope.with_context(context),
        }
    }

    #[must_use]
    pub const fn scope(&self) -> EvalScope<'a> {
        self.scope
    }

    /// Migrate, parse, and validate a persisted spec.
    pub fn load(&self, text: &str) -> Result<Spec, Error> {
        let spec = Spec::load_str(text)?;
        spec.validate(self.scope.registry)?;

        debug!(key = %spec.key, element = %spec.element, "loaded spec");

        Ok(spec)
    }

    /// Run `spec` to completion over `source`.
    pub fn run(&self, spec: &Spec, source: &dyn ObjectSource) -> Result<Vec<Value>, Error> {
        let ctx = RunContext::new(self.scope, source, spec.element.as_str());

        Ok(spec.run(&ctx)?.collect())
    }

    /// Run `spec` and keep only the evaluations it produced.
    pub fn verify(
        &self,
        spec: &Spec,
        source: &dyn ObjectSource,
    ) -> Result<Vec<Arc<Evaluation>>, Error> {
        let items = self.run(spec, source)?;

        Ok(items
            .iter()
            .filter_map(Value::as_evaluation)
            .cloned()
            .collect())
    }
}

///
/// Prelude
///

pub mod prelude {
    pub use crate::{Engine, Error};
    pub use spex_core::prelude::*;
}
