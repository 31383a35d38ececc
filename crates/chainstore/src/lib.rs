//! ## Crate layout
//! - `config`: TOML store settings and schema loading.
//! - `core`: values, the identifier codec, entity tables, and metrics.
//! - `db`: the handler-facing store, units of work, and updates.
//! - `error`: public error kinds handler code matches on.
//! - `schema`: entity definitions, validation, and the schema registry.
//!
//! The `prelude` module is what event-handler code needs: open a [`Store`],
//! begin a unit per event, then create, update, upsert, find and delete
//! records by identifier.

pub use chainstore_core as core;
pub use chainstore_schema as schema;

pub mod config;
pub mod db;
pub mod error;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use config::StoreConfig;
pub use db::{EntityStore, Store, UnitOfWork, Update};
pub use error::{Error, ErrorKind};

///
/// Handler Prelude
///

pub mod prelude {
    pub use crate::{
        config::StoreConfig,
        db::{EntityStore, Store, UnitOfWork, Update},
        error::{Error, ErrorKind},
    };
    pub use chainstore_core::{
        key::Key,
        record::{Data, Record},
        types::{Float64, Hex, Int},
        value::Value,
    };
}
