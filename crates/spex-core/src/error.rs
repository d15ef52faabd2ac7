use crate::{migrate::MigrationError, spec::ValidationError};
use spex_config::ConfigError;
use std::fmt;
use thiserror::Error as ThisError;

///
/// InternalError
///
/// Structured error with a stable classification, returned across the engine
/// boundary. Evaluation-time soft failures never become an `InternalError`;
/// they are recorded inline as `Errored` evaluations.
///

#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct InternalError {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,

    /// Optional structured error detail.
    /// The variant (if present) must correspond to `origin`.
    pub detail: Option<ErrorDetail>,
}

impl InternalError {
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
            detail: None,
        }
    }

    /// Construct a registry-origin not-found error for an unknown element.
    pub fn element_not_found(name: impl Into<String>) -> Self {
        let name = name.into();

        Self::new(
            ErrorClass::NotFound,
            ErrorOrigin::Registry,
            format!("element not found: '{name}'"),
        )
    }

    /// Construct a registry-origin invariant violation.
    pub(crate) fn registry_invariant(message: impl Into<String>) -> Self {
        Self::new(
            ErrorClass::InvariantViolation,
            ErrorOrigin::Registry,
            message,
        )
    }

    /// Construct a document-origin corruption error.
    pub(crate) fn document_corruption(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Corruption, ErrorOrigin::Document, message)
    }

    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self.class, ErrorClass::Configuration)
    }

    #[must_use]
    pub const fn is_version_mismatch(&self) -> bool {
        matches!(self.class, ErrorClass::VersionMismatch)
    }

    /// Borrow the validation issues when this error came from spec validation.
    #[must_use]
    pub const fn validation(&self) -> Option<&ValidationError> {
        match &self.detail {
            Some(ErrorDetail::Validation(err)) => Some(err),
            _ => None,
        }
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {}", self.origin, self.class, self.message)
    }
}

///
/// ErrorDetail
///
/// Structured, origin-specific error detail carried by [`InternalError`].
///

#[derive(Debug, ThisError)]
pub enum ErrorDetail {
    #[error("{0}")]
    Validation(ValidationError),

    #[error("{0}")]
    Migration(MigrationError),

    #[error("{0}")]
    Document(DocumentError),

    #[error("{0}")]
    Config(ConfigError),
}

impl From<ValidationError> for InternalError {
    fn from(err: ValidationError) -> Self {
        Self {
            class: ErrorClass::Configuration,
            origin: ErrorOrigin::Spec,
            message: err.to_string(),
            detail: Some(ErrorDetail::Validation(err)),
        }
    }
}

impl From<MigrationError> for InternalError {
    fn from(err: MigrationError) -> Self {
        let class = match &err {
            MigrationError::VersionAhead { .. } => ErrorClass::VersionMismatch,
            _ => ErrorClass::Corruption,
        };

        Self {
            class,
            origin: ErrorOrigin::Migration,
            message: err.to_string(),
            detail: Some(ErrorDetail::Migration(err)),
        }
    }
}

impl From<DocumentError> for InternalError {
    fn from(err: DocumentError) -> Self {
        Self {
            class: ErrorClass::Corruption,
            origin: ErrorOrigin::Document,
            message: err.to_string(),
            detail: Some(ErrorDetail::Document(err)),
        }
    }
}

impl From<ConfigError> for InternalError {
    fn from(err: ConfigError) -> Self {
        Self {
            class: ErrorClass::Configuration,
            origin: ErrorOrigin::Config,
            message: err.to_string(),
            detail: Some(ErrorDetail::Config(err)),
        }
    }
}

///
/// DocumentError
///
/// Structural failures while reading a persisted specification document
/// (after migration) into typed values.
///

#[derive(Debug, ThisError)]
pub enum DocumentError {
    #[error("document field '{field}' is missing")]
    MissingField { field: String },

    #[error("document field '{field}' is invalid: {message}")]
    InvalidField { field: String, message: String },

    #[error("unknown operation '{0}'")]
    UnknownOperation(String),

    #[error("invalid spec key '{0}'")]
    InvalidKey(String),

    #[error("document is not a current-schema spec: {0}")]
    Shape(#[from] serde_json::Error),
}

impl DocumentError {
    pub(crate) fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            message: message.into(),
        }
    }
}

///
/// ErrorClass
/// Error taxonomy for runtime classification.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    Configuration,
    Corruption,
    InvariantViolation,
    NotFound,
    VersionMismatch,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Configuration => "configuration",
            Self::Corruption => "corruption",
            Self::InvariantViolation => "invariant_violation",
            Self::NotFound => "not_found",
            Self::VersionMismatch => "version_mismatch",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
/// Origin taxonomy for runtime classification.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Config,
    Document,
    Migration,
    Registry,
    Spec,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Config => "config",
            Self::Document => "document",
            Self::Migration => "migration",
            Self::Registry => "registry",
            Self::Spec => "spec",
        };
        write!(f, "{label}")
    }
}
