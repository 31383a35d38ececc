use crate::{
    Error,
    node::{EntityDef, Schema},
};
use std::sync::Arc;

///
/// SchemaRegistry
///
/// Resolves entity names to their definitions. Resolution results are
/// immutable for the lifetime of the registry.
///

pub trait SchemaRegistry {
    fn resolve(&self, entity: &str) -> Result<&Arc<EntityDef>, Error>;

    /// Every declared entity, in declaration order.
    fn entities(&self) -> Vec<Arc<EntityDef>>;
}

impl SchemaRegistry for Schema {
    fn resolve(&self, entity: &str) -> Result<&Arc<EntityDef>, Error> {
        self.get(entity)
            .ok_or_else(|| Error::EntityNotFound(entity.to_string()))
    }

    fn entities(&self) -> Vec<Arc<EntityDef>> {
        self.iter().cloned().collect()
    }
}
