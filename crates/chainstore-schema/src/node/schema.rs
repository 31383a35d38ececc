use crate::node::EntityDef;
use std::{collections::HashMap, sync::Arc};

///
/// Schema
///
/// Validated, immutable set of entity definitions in declaration order.
/// Only [`crate::build::SchemaBuilder`] produces one.
///

#[derive(Clone, Debug, Default)]
pub struct Schema {
    entities: Vec<Arc<EntityDef>>,
    by_name: HashMap<String, usize>,
}

impl Schema {
    pub(crate) fn from_validated(entities: Vec<EntityDef>) -> Self {
        let by_name = entities
            .iter()
            .enumerate()
            .map(|(i, e)| (e.name.clone(), i))
            .collect();

        Self {
            entities: entities.into_iter().map(Arc::new).collect(),
            by_name,
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<EntityDef>> {
        self.by_name.get(name).map(|&i| &self.entities[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<EntityDef>> {
        self.entities.iter()
    }

    #[must_use]
    pub fn entity_names(&self) -> Vec<&str> {
        self.entities.iter().map(|e| e.name.as_str()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
