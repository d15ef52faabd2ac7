use derive_more::Display;
use serde::{Deserialize, Serialize};
use spex_core::{
    error::{ErrorClass, ErrorOrigin as CoreErrorOrigin, InternalError},
    migrate::MigrationError,
    spec::ValidationError,
};
use thiserror::Error as ThisError;

///
/// Error
/// Public error type with a stable kind + origin taxonomy.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize, ThisError)]
#[error("{message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            kind,
            origin,
            message: message.into(),
        }
    }
}

impl From<InternalError> for Error {
    fn from(err: InternalError) -> Self {
        let kind = match err.class {
            ErrorClass::Configuration => ErrorKind::Spec(SpecErrorKind::Invalid),
            ErrorClass::Corruption => ErrorKind::Document(DocumentErrorKind::Malformed),
            ErrorClass::VersionMismatch => ErrorKind::Document(DocumentErrorKind::VersionAhead),
            ErrorClass::NotFound => ErrorKind::NotFound,
            ErrorClass::InvariantViolation => ErrorKind::Internal,
        };

        Self::new(kind, err.origin.into(), err.message)
    }
}

impl From<ValidationError> for Error {
    fn from(err: ValidationError) -> Self {
        InternalError::from(err).into()
    }
}

impl From<MigrationError> for Error {
    fn from(err: MigrationError) -> Self {
        InternalError::from(err).into()
    }
}

///
/// ErrorKind
/// Public error taxonomy for callers.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ErrorKind {
    Spec(SpecErrorKind),
    Document(DocumentErrorKind),

    /// A referenced element or type is not registered.
    NotFound,

    /// The caller cannot remediate this.
    Internal,
}

///
/// SpecErrorKind
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum SpecErrorKind {
    /// Spec fails static validation (paths, arity, step order).
    Invalid,
}

///
/// DocumentErrorKind
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum DocumentErrorKind {
    /// Document structure cannot be read or migrated.
    Malformed,

    /// Document was written by a newer schema.
    VersionAhead,
}

///
/// ErrorOrigin
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum ErrorOrigin {
    Config,
    Document,
    Migration,
    Registry,
    Spec,
}

impl From<CoreErrorOrigin> for ErrorOrigin {
    fn from(origin: CoreErrorOrigin) -> Self {
        match origin {
            CoreErrorOrigin::Config => Self::Config,
            CoreErrorOrigin::Document => Self::Document,
            CoreErrorOrigin::Migration => Self::Migration,
            CoreErrorOrigin::Registry => Self::Registry,
            CoreErrorOrigin::Spec => Self::Spec,
        }
    }
}
