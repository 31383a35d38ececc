mod naming;
mod reference;

use crate::{MAX_ENTITY_FIELDS, err, error::ErrorTree, node::EntityDef};
use std::collections::HashSet;

/// Validate a full set of entity definitions, accumulating every problem.
pub fn validate_schema(entities: &[EntityDef]) -> Result<(), ErrorTree> {
    let mut errs = ErrorTree::new();
    let mut seen = HashSet::new();

    for entity in entities {
        if !seen.insert(entity.name.as_str()) {
            err!(errs, "duplicate entity '{}'", entity.name);
        }
        errs.add_child(entity.name.clone(), validate_entity(entity));
    }

    reference::validate_references(entities, &mut errs);

    errs.result()
}

/// Checks that need only the entity itself.
pub fn validate_entity(entity: &EntityDef) -> ErrorTree {
    let mut errs = ErrorTree::new();

    naming::validate_entity_name(&entity.name, &mut errs);

    if entity.fields.len() > MAX_ENTITY_FIELDS {
        err!(
            errs,
            "entity has {} fields (max {MAX_ENTITY_FIELDS})",
            entity.fields.len()
        );
    }

    let mut seen = HashSet::new();
    for field in &entity.fields {
        if !seen.insert(field.name.as_str()) {
            err!(errs, "duplicate field '{}'", field.name);
        }
        naming::validate_field_name(&field.name, &mut errs);
    }

    errs
}
