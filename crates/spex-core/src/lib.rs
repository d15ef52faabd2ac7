//! Core engine for spex: element descriptors, the operation catalog,
//! criteria, step pipelines, spec persistence, and document migrations.
#![warn(unreachable_pub)]

// public exports are one module level down
pub mod criterion;
pub mod error;
pub mod migrate;
pub mod model;
pub mod obs;
pub mod operation;
pub mod spec;
pub mod step;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod test_fixtures;

pub use spex_config as config;
pub use spex_primitives as primitives;

///
/// Prelude
///
/// Domain vocabulary for authoring and running specs. Errors, sinks, and
/// document helpers stay in their modules.
///

pub mod prelude {
    pub use crate::{
        criterion::{Argument, Criterion, EvalScope, Evaluation, MapScope, Outcome, VariableScope},
        model::{ElementRegistry, FieldDef, Schema, TypeDef, TypeExpr},
        operation::Operation,
        spec::Spec,
        step::{Match, MemorySource, ObjectSource, RunContext, Step},
        value::{Record, Value, ValueEnum},
    };
}
