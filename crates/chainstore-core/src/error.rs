use crate::{db::HandlerError, key::Key, value::CoercionError};
use std::fmt;
use thiserror::Error as ThisError;

///
/// InternalError
///
/// Structured runtime error with a stable internal classification.
/// The public crate maps it into its own error surface.
///

#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct InternalError {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,

    /// Optional structured error detail.
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

    /// `create` hit an identifier that already has a record.
    pub fn already_exists(entity: &str, key: &Key) -> Self {
        let detail = TableError::AlreadyExists {
            entity: entity.to_string(),
            key: key.to_string(),
        };

        Self {
            class: ErrorClass::Conflict,
            origin: ErrorOrigin::Table,
            message: detail.to_string(),
            detail: Some(ErrorDetail::Table(detail)),
        }
    }

    /// `update` hit an identifier with no record.
    pub fn not_found(entity: &str, key: &Key) -> Self {
        let detail = TableError::NotFound {
            entity: entity.to_string(),
            key: key.to_string(),
        };

        Self {
            class: ErrorClass::NotFound,
            origin: ErrorOrigin::Table,
            message: detail.to_string(),
            detail: Some(ErrorDetail::Table(detail)),
        }
    }

    /// Wrap an error raised outside this crate so it can cross a store call
    /// unchanged. `class` and `origin` drive metrics and logging; the wrapped
    /// value is what callers downcast back to.
    pub fn carried(
        class: ErrorClass,
        origin: ErrorOrigin,
        source: impl Into<HandlerError>,
    ) -> Self {
        let source = source.into();

        Self {
            class,
            origin,
            message: source.to_string(),
            detail: Some(ErrorDetail::Carried(source)),
        }
    }

    /// The wrapped error of a [`InternalError::carried`] value.
    #[must_use]
    pub fn carried_source(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match &self.detail {
            Some(ErrorDetail::Carried(source)) => Some(source.as_ref()),
            _ => None,
        }
    }

    /// Caller input does not match the entity schema.
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Validation, ErrorOrigin::Facade, message)
    }

    /// A handler-supplied update function failed.
    pub(crate) fn handler(entity: &str, key: &Key, source: impl fmt::Display) -> Self {
        Self::new(
            ErrorClass::Handler,
            ErrorOrigin::Facade,
            format!("update function failed for {entity}({key}): {source}"),
        )
    }

    /// Table-origin conflict that is not an existence conflict.
    pub(crate) fn table_conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Conflict, ErrorOrigin::Table, message)
    }

    pub(crate) fn schema_invariant(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::InvariantViolation, ErrorOrigin::Schema, message)
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self.detail,
            Some(ErrorDetail::Table(TableError::NotFound { .. }))
        )
    }

    #[must_use]
    pub const fn is_already_exists(&self) -> bool {
        matches!(
            self.detail,
            Some(ErrorDetail::Table(TableError::AlreadyExists { .. }))
        )
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {}", self.origin, self.class, self.message)
    }
}

impl From<CoercionError> for InternalError {
    fn from(err: CoercionError) -> Self {
        let class = if err.is_mismatch() {
            ErrorClass::Validation
        } else {
            ErrorClass::Codec
        };

        Self {
            class,
            origin: ErrorOrigin::Codec,
            message: err.to_string(),
            detail: Some(ErrorDetail::Codec(err)),
        }
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
    Carried(HandlerError),

    #[error("{0}")]
    Codec(CoercionError),

    #[error("{0}")]
    Table(TableError),
}

///
/// TableError
///
/// Existence failures raised by an entity table.
///

#[derive(Debug, ThisError)]
pub enum TableError {
    #[error("{entity}({key}) already exists")]
    AlreadyExists { entity: String, key: String },

    #[error("{entity}({key}) not found")]
    NotFound { entity: String, key: String },
}

///
/// ErrorClass
/// Internal error taxonomy for runtime classification.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[remain::sorted]
pub enum ErrorClass {
    Codec,
    Conflict,
    Handler,
    Internal,
    InvariantViolation,
    NotFound,
    Validation,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Codec => "codec",
            Self::Conflict => "conflict",
            Self::Handler => "handler",
            Self::Internal => "internal",
            Self::InvariantViolation => "invariant_violation",
            Self::NotFound => "not_found",
            Self::Validation => "validation",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
/// Internal origin taxonomy for runtime classification.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Codec,
    Facade,
    Registry,
    Schema,
    Table,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Codec => "codec",
            Self::Facade => "facade",
            Self::Registry => "registry",
            Self::Schema => "schema",
            Self::Table => "table",
        };
        write!(f, "{label}")
    }
}
