use crate::config::ConfigError;
use chainstore_core::error::{
    ErrorClass as CoreErrorClass, ErrorOrigin as CoreErrorOrigin, InternalError,
};
use derive_more::Display;
use serde::Serialize;
use thiserror::Error as ThisError;

///
/// Error
/// Public error type with a stable kind + origin taxonomy.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize, ThisError)]
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

    /// `update` addressed an identifier with no record.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.kind == ErrorKind::NotFound
    }

    /// `create` addressed an identifier that already has a record.
    #[must_use]
    pub fn is_already_exists(&self) -> bool {
        self.kind == ErrorKind::AlreadyExists
    }
}

impl From<InternalError> for Error {
    fn from(err: InternalError) -> Self {
        // a public error raised inside an update function comes back as-is
        if let Some(public) = err
            .carried_source()
            .and_then(|source| source.downcast_ref::<Self>())
        {
            return public.clone();
        }

        let kind = match err.class {
            CoreErrorClass::Codec => ErrorKind::Codec,
            CoreErrorClass::Conflict if err.is_already_exists() => ErrorKind::AlreadyExists,
            CoreErrorClass::Conflict => ErrorKind::Conflict,
            CoreErrorClass::Handler => ErrorKind::Handler,
            CoreErrorClass::NotFound if err.origin == CoreErrorOrigin::Registry => {
                ErrorKind::Schema
            }
            CoreErrorClass::NotFound => ErrorKind::NotFound,
            CoreErrorClass::InvariantViolation if err.origin == CoreErrorOrigin::Schema => {
                ErrorKind::Schema
            }
            CoreErrorClass::Internal | CoreErrorClass::InvariantViolation => ErrorKind::Internal,
            CoreErrorClass::Validation => ErrorKind::Validation,
        };

        Self::new(kind, err.origin.into(), err.message)
    }
}

// Lets a handler return a public error from inside an update function.
// The error travels whole; class and origin only feed metrics and logs.
impl From<Error> for InternalError {
    fn from(err: Error) -> Self {
        let origin = match err.origin {
            ErrorOrigin::Codec => CoreErrorOrigin::Codec,
            ErrorOrigin::Config | ErrorOrigin::Facade => CoreErrorOrigin::Facade,
            ErrorOrigin::Registry => CoreErrorOrigin::Registry,
            ErrorOrigin::Schema => CoreErrorOrigin::Schema,
            ErrorOrigin::Table => CoreErrorOrigin::Table,
        };
        let class = match err.kind {
            ErrorKind::AlreadyExists | ErrorKind::Conflict => CoreErrorClass::Conflict,
            ErrorKind::Codec => CoreErrorClass::Codec,
            ErrorKind::Config | ErrorKind::Internal => CoreErrorClass::Internal,
            ErrorKind::Handler => CoreErrorClass::Handler,
            ErrorKind::NotFound => CoreErrorClass::NotFound,
            ErrorKind::Schema if origin == CoreErrorOrigin::Registry => CoreErrorClass::NotFound,
            ErrorKind::Schema => CoreErrorClass::InvariantViolation,
            ErrorKind::Validation => CoreErrorClass::Validation,
        };

        Self::carried(class, origin, err)
    }
}

impl From<chainstore_schema::Error> for Error {
    fn from(err: chainstore_schema::Error) -> Self {
        Self::new(ErrorKind::Schema, ErrorOrigin::Schema, err.to_string())
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Schema(err) => err.into(),
            other => Self::new(ErrorKind::Config, ErrorOrigin::Config, other.to_string()),
        }
    }
}

///
/// ErrorKind
/// Public error taxonomy for handler code.
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq, Serialize)]
#[remain::sorted]
pub enum ErrorKind {
    /// `create` found an existing record.
    AlreadyExists,

    /// A supplied literal could not be decoded (bad number, bad hex).
    Codec,

    /// Configuration could not be read or parsed.
    Config,

    /// Concurrent or re-entrant access to the same record.
    Conflict,

    /// An update function returned an error.
    Handler,

    /// The caller cannot remediate this.
    Internal,

    /// `update` found no record.
    NotFound,

    /// Schema invalid, or an entity not declared in it.
    Schema,

    /// Input does not match the entity definition.
    Validation,
}

///
/// ErrorOrigin
/// Public origin taxonomy.
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq, Serialize)]
#[remain::sorted]
pub enum ErrorOrigin {
    Codec,
    Config,
    Facade,
    Registry,
    Schema,
    Table,
}

impl From<CoreErrorOrigin> for ErrorOrigin {
    fn from(origin: CoreErrorOrigin) -> Self {
        match origin {
            CoreErrorOrigin::Codec => Self::Codec,
            CoreErrorOrigin::Facade => Self::Facade,
            CoreErrorOrigin::Registry => Self::Registry,
            CoreErrorOrigin::Schema => Self::Schema,
            CoreErrorOrigin::Table => Self::Table,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chainstore_core::{key::Key, types::Int};

    #[test]
    fn existence_errors_keep_their_kind() {
        let key = Key::from(Int::from(7777));

        let err = Error::from(InternalError::already_exists("Token", &key));
        assert!(err.is_already_exists());
        assert_eq!(err.origin, ErrorOrigin::Table);
        assert_eq!(err.to_string(), "Token(7777) already exists");

        let err = Error::from(InternalError::not_found("Token", &key));
        assert!(err.is_not_found());
    }

    #[test]
    fn plain_conflicts_are_not_existence_errors() {
        let err = Error::from(InternalError::new(
            CoreErrorClass::Conflict,
            CoreErrorOrigin::Table,
            "re-entrant operation on Person(\"Jim\")",
        ));

        assert_eq!(err.kind, ErrorKind::Conflict);
        assert!(!err.is_already_exists());
    }

    #[test]
    fn round_trip_through_internal_keeps_the_error() {
        for (kind, origin) in [
            (ErrorKind::AlreadyExists, ErrorOrigin::Table),
            (ErrorKind::Codec, ErrorOrigin::Codec),
            (ErrorKind::Config, ErrorOrigin::Config),
            (ErrorKind::Conflict, ErrorOrigin::Table),
            (ErrorKind::Handler, ErrorOrigin::Facade),
            (ErrorKind::Internal, ErrorOrigin::Facade),
            (ErrorKind::NotFound, ErrorOrigin::Table),
            (ErrorKind::Schema, ErrorOrigin::Registry),
            (ErrorKind::Schema, ErrorOrigin::Schema),
            (ErrorKind::Validation, ErrorOrigin::Facade),
        ] {
            let err = Error::new(kind, origin, "x");
            let back = Error::from(InternalError::from(err.clone()));

            assert_eq!(back, err);
        }
    }

    #[test]
    fn carried_errors_get_matching_internal_classes() {
        let already = Error::from(InternalError::already_exists(
            "Person",
            &Key::from("Sara"),
        ));
        let internal = InternalError::from(already.clone());
        assert_eq!(internal.class, CoreErrorClass::Conflict);
        assert_eq!(internal.message, already.message);

        let missing_entity = Error::new(ErrorKind::Schema, ErrorOrigin::Registry, "Ghost");
        let internal = InternalError::from(missing_entity);
        assert_eq!(internal.class, CoreErrorClass::NotFound);
        assert_eq!(internal.origin, CoreErrorOrigin::Registry);
    }

    #[test]
    fn kinds_serialize_as_names() {
        let err = Error::new(ErrorKind::Validation, ErrorOrigin::Facade, "bad");
        let json = serde_json::to_string(&err).expect("error should serialize");

        assert_eq!(
            json,
            r#"{"kind":"Validation","origin":"Facade","message":"bad"}"#
        );
    }
}
