use crate::{
    Error, err,
    error::ErrorTree,
    node::{EntityDef, FieldDef, Schema},
    types::{FieldKind, IdKind},
};
use serde::{Deserialize, Serialize};

///
/// SchemaDocument
///
/// Declarative schema as written in a config file:
///
/// ```toml
/// [[entity]]
/// name = "Account"
/// id = "hex"
///
/// [[entity.field]]
/// name = "balance"
/// kind = "bigint"
///
/// [[entity.field]]
/// name = "label"
/// kind = "text?"
/// ```
///
/// A trailing `?` on a kind marks the field nullable.
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaDocument {
    #[serde(default, rename = "entity")]
    pub entities: Vec<EntityDocument>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EntityDocument {
    pub name: String,
    pub id: IdKind,
    #[serde(default, rename = "field")]
    pub fields: Vec<FieldDocument>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDocument {
    pub name: String,
    pub kind: String,
    #[serde(default)]
    pub nullable: bool,
}

impl FieldDocument {
    fn resolve(&self) -> Result<FieldDef, Error> {
        let (kind, optional) = match self.kind.trim().strip_suffix('?') {
            Some(kind) => (kind, true),
            None => (self.kind.trim(), false),
        };
        let kind: FieldKind = kind.parse()?;

        Ok(FieldDef {
            name: self.name.clone(),
            kind,
            nullable: self.nullable || optional,
        })
    }
}

impl SchemaDocument {
    /// Resolve kinds and build a validated [`Schema`].
    ///
    /// Kind parse failures are collected alongside structural validation
    /// problems so a bad document reports everything at once.
    pub fn into_schema(self) -> Result<Schema, Error> {
        let mut errs = ErrorTree::new();
        let mut builder = Schema::builder();

        for doc in self.entities {
            let mut entity = EntityDef::new(doc.name.clone(), doc.id);
            let mut local = ErrorTree::new();

            for field in &doc.fields {
                match field.resolve() {
                    Ok(def) => entity.fields.push(def),
                    Err(e) => err!(local, "field '{}': {e}", field.name),
                }
            }

            errs.add_child(doc.name, local);
            builder.push(entity);
        }

        match builder.build() {
            Ok(schema) if errs.is_empty() => Ok(schema),
            Ok(_) => Err(Error::Validation(errs)),
            Err(Error::Validation(tree)) => {
                errs.merge(tree);
                Err(Error::Validation(errs))
            }
            Err(other) => Err(other),
        }
    }
}
