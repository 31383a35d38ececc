use crate::{err, error::ErrorTree, node::EntityDef};
use std::collections::HashSet;

/// Every `ref:` field must name an entity declared in the same schema.
pub(super) fn validate_references(entities: &[EntityDef], errs: &mut ErrorTree) {
    let declared: HashSet<&str> = entities.iter().map(|e| e.name.as_str()).collect();

    for entity in entities {
        let mut local = ErrorTree::new();

        for field in &entity.fields {
            if let Some(target) = field.kind.ref_target()
                && !declared.contains(target)
            {
                err!(
                    local,
                    "field '{}' references unknown entity '{target}'",
                    field.name
                );
            }
        }

        errs.add_child(entity.name.clone(), local);
    }
}
