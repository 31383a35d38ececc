use crate::{
    Error,
    node::{EntityDef, Schema},
    validate::validate_schema,
};

///
/// SchemaBuilder
///
/// Collects entity definitions and validates them as a whole.
///

#[derive(Debug, Default)]
pub struct SchemaBuilder {
    entities: Vec<EntityDef>,
}

impl SchemaBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn entity(mut self, entity: EntityDef) -> Self {
        self.entities.push(entity);
        self
    }

    pub fn push(&mut self, entity: EntityDef) {
        self.entities.push(entity);
    }

    /// Validate every definition and freeze the schema.
    pub fn build(self) -> Result<Schema, Error> {
        validate_schema(&self.entities).map_err(Error::Validation)?;

        Ok(Schema::from_validated(self.entities))
    }
}

impl Schema {
    #[must_use]
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        node::FieldDef,
        registry::SchemaRegistry,
        types::{FieldKind, IdKind, ScalarKind},
    };

    #[test]
    fn builder_resolves_declared_entities() {
        let schema = Schema::builder()
            .entity(
                EntityDef::new("Person", IdKind::Text)
                    .field(FieldDef::new("age", ScalarKind::Int)),
            )
            .entity(
                EntityDef::new("Pet", IdKind::BigInt)
                    .field(FieldDef::new("owner", FieldKind::reference("Person"))),
            )
            .build()
            .expect("schema should validate");

        assert_eq!(schema.entity_names(), ["Person", "Pet"]);
        assert_eq!(schema.resolve("Pet").unwrap().fields.len(), 1);
        assert!(matches!(
            schema.resolve("Missing"),
            Err(Error::EntityNotFound(name)) if name == "Missing"
        ));
    }

    #[test]
    fn build_reports_every_problem() {
        let err = Schema::builder()
            .entity(
                EntityDef::new("Token", IdKind::BigInt)
                    .field(FieldDef::new("owner", FieldKind::reference("Account")))
                    .field(FieldDef::new("owner", ScalarKind::Text)),
            )
            .build()
            .expect_err("schema should fail validation");

        let Error::Validation(tree) = err else {
            panic!("expected validation error, got {err:?}");
        };
        let lines = tree.flatten();

        assert_eq!(lines.len(), 2, "{lines:?}");
        assert!(lines.iter().any(|l| l.contains("duplicate field 'owner'")));
        assert!(lines.iter().any(|l| l.contains("unknown entity 'Account'")));
    }
}
