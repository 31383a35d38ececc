//! Schema layer for chainstore: entity definitions, field kinds, the
//! declarative schema document, and validation.
//!
//! The runtime consumes a resolved [`node::Schema`] through the
//! [`registry::SchemaRegistry`] trait; nothing here touches stored data.

pub mod build;
pub mod document;
pub mod error;
pub mod node;
pub mod registry;
pub mod types;
pub mod validate;

/// Maximum length for entity schema identifiers.
pub const MAX_ENTITY_NAME_LEN: usize = 64;

/// Maximum length for field schema identifiers.
pub const MAX_FIELD_NAME_LEN: usize = 64;

/// Maximum number of data fields on one entity (the id is not counted).
pub const MAX_ENTITY_FIELDS: usize = 256;

/// Field name reserved for the identifier slot.
pub const ID_FIELD: &str = "id";

use crate::error::ErrorTree;
use thiserror::Error as ThisError;

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        build::SchemaBuilder,
        err,
        error::ErrorTree,
        node::{EntityDef, FieldDef, Schema},
        registry::SchemaRegistry,
        types::{FieldKind, IdKind, ScalarKind},
    };
}

///
/// Error
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("schema validation failed:\n{0}")]
    Validation(ErrorTree),

    #[error("entity '{0}' not found in schema")]
    EntityNotFound(String),

    #[error("invalid field kind '{kind}': {reason}")]
    InvalidKind { kind: String, reason: &'static str },
}
