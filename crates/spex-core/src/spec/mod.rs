pub(crate) mod document;
mod fingerprint;
pub(crate) mod validate;

#[cfg(test)]
mod tests;

use crate::{
    error::{DocumentError, InternalError},
    migrate,
    model::{ElementRegistry, TypeExpr},
    obs::sink::{self, EngineEvent},
    step::{RunContext, Step, Stream},
};
use serde_json::Value as JsonValue;
use std::iter;
use tracing::{debug, warn};
use ulid::Ulid;

// re-exports
pub use fingerprint::SpecFingerprint;
pub use validate::{Issue, IssueKind, ValidationError};

/// Document schema version written by this build.
pub const SCHEMA_VERSION: u32 = 3;

///
/// Spec
///
/// An ordered pipeline of steps over one target element. The unit of
/// persistence and execution.
///

#[derive(Clone, Debug, PartialEq)]
pub struct Spec {
    pub key: Ulid,
    pub element: String,
    pub steps: Vec<Step>,
}

impl Spec {
    /// New spec with a fresh key and no steps.
    pub fn new(element: impl Into<String>) -> Self {
        Self {
            key: Ulid::new(),
            element: element.into(),
            steps: Vec::new(),
        }
    }

    #[must_use]
    pub const fn with_key(mut self, key: Ulid) -> Self {
        self.key = key;
        self
    }

    #[must_use]
    pub fn with_step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    ///
    /// VALIDATION
    ///

    /// Static checks over the whole pipeline; every issue is reported.
    pub fn validate(&self, registry: &ElementRegistry) -> Result<(), ValidationError> {
        let issues = validate::validate_steps(&self.element, &self.steps, registry);

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(issues))
        }
    }

    ///
    /// EXECUTION
    ///

    /// Validate, then chain every step into one lazy stream. The context's
    /// element is replaced with this spec's element.
    pub fn run<'a>(&'a self, ctx: &RunContext<'a>) -> Result<Stream<'a>, InternalError> {
        if let Err(err) = self.validate(ctx.scope.registry) {
            warn!(key = %self.key, issues = err.issues.len(), "spec rejected");
            sink::record(EngineEvent::SpecRejected {
                issues: err.issues.len() as u64,
            });

            return Err(err.into());
        }

        debug!(key = %self.key, element = %self.element, steps = self.steps.len(), "running spec");
        sink::record(EngineEvent::SpecRun);

        let ctx = RunContext {
            element: TypeExpr::named(&self.element),
            ..ctx.clone()
        };
        let stream = self
            .steps
            .iter()
            .fold(Box::new(iter::empty()) as Stream<'a>, |input, step| {
                step.process(input, &ctx)
            });

        Ok(stream)
    }

    ///
    /// PERSISTENCE
    ///

    /// Current-schema document for this spec.
    pub fn to_document(&self) -> Result<JsonValue, DocumentError> {
        document::spec_to_json(self)
    }

    /// Parse a document that is already at `SCHEMA_VERSION`.
    pub fn from_document(doc: &JsonValue) -> Result<Self, DocumentError> {
        document::spec_from_json(doc)
    }

    /// Migrate a document of any known version, then parse it. The input
    /// is never modified.
    pub fn load(doc: &JsonValue) -> Result<Self, InternalError> {
        let current = migrate::migrate(doc)?;

        Ok(Self::from_document(&current)?)
    }

    pub fn load_str(text: &str) -> Result<Self, InternalError> {
        let doc: JsonValue = serde_json::from_str(text).map_err(DocumentError::from)?;

        Self::load(&doc)
    }

    /// Pretty-printed current-schema document.
    pub fn save(&self) -> Result<String, InternalError> {
        let doc = self.to_document()?;

        serde_json::to_string_pretty(&doc)
            .map_err(|err| InternalError::document_corruption(err.to_string()))
    }

    /// Content hash of the canonical document, ignoring the key.
    pub fn fingerprint(&self) -> Result<SpecFingerprint, DocumentError> {
        fingerprint::compute(self)
    }
}
