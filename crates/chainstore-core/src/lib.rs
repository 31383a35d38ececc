//! Core runtime for chainstore: values and the identifier codec, records,
//! entity tables, the per-entity store facade, units of work, and metrics.
#![warn(unreachable_pub)]

pub mod db;
pub mod error;
pub mod key;
pub mod model;
pub mod obs;
pub mod record;
pub mod types;
pub mod value;

#[cfg(test)]
pub(crate) mod test_support;

pub use chainstore_schema as schema;

///
/// Prelude
///
/// Vocabulary handler code touches; no executors or sinks.
///

pub mod prelude {
    pub use crate::{
        db::{Db, DbOptions, EntityStore, UnitOfWork, Update},
        key::Key,
        record::{Data, Record},
        types::{Float64, Hex, Int},
        value::Value,
    };
}
