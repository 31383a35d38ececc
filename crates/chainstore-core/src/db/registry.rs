use crate::{
    db::table::EntityTable,
    error::{ErrorClass, ErrorOrigin, InternalError},
};
use std::{collections::HashMap, sync::Arc};
use thiserror::Error as ThisError;

///
/// TableRegistryError
///

#[derive(Debug, ThisError)]
pub enum TableRegistryError {
    #[error("entity '{0}' is not declared in the schema")]
    TableNotFound(String),

    #[error("table for entity '{0}' already registered")]
    TableAlreadyRegistered(String),
}

impl TableRegistryError {
    pub(crate) const fn class(&self) -> ErrorClass {
        match self {
            Self::TableNotFound(_) => ErrorClass::NotFound,
            Self::TableAlreadyRegistered(_) => ErrorClass::InvariantViolation,
        }
    }
}

impl From<TableRegistryError> for InternalError {
    fn from(err: TableRegistryError) -> Self {
        Self::new(err.class(), ErrorOrigin::Registry, err.to_string())
    }
}

///
/// TableRegistry
///
/// One entity table per declared entity type, keyed by entity name.
/// Built once when the `Db` is created; never mutated afterwards.
///

#[derive(Debug, Default)]
pub struct TableRegistry {
    tables: HashMap<String, Arc<EntityTable>>,
    order: Vec<String>,
}

impl TableRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the table for its entity name.
    pub fn register(&mut self, table: EntityTable) -> Result<(), InternalError> {
        let name = table.name().to_string();
        if self.tables.contains_key(&name) {
            return Err(TableRegistryError::TableAlreadyRegistered(name).into());
        }

        self.order.push(name.clone());
        self.tables.insert(name, Arc::new(table));

        Ok(())
    }

    /// Look up a table by entity name.
    pub fn try_get(&self, entity: &str) -> Result<&Arc<EntityTable>, InternalError> {
        self.tables
            .get(entity)
            .ok_or_else(|| TableRegistryError::TableNotFound(entity.to_string()).into())
    }

    /// Registered tables in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<EntityTable>> {
        self.order.iter().filter_map(|name| self.tables.get(name))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
