use crate::{ID_FIELD, node::FieldDef, types::IdKind};
use serde::{Deserialize, Serialize};

///
/// EntityDef
///
/// Resolved shape of one entity type: its name, identifier domain and the
/// ordered data fields. Field order is the slot order of stored records.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct EntityDef {
    pub name: String,
    pub id: IdKind,
    pub fields: Vec<FieldDef>,
}

impl EntityDef {
    #[must_use]
    pub fn new(name: impl Into<String>, id: IdKind) -> Self {
        Self {
            name: name.into(),
            id,
            fields: Vec::new(),
        }
    }

    /// Append a field (builder style).
    #[must_use]
    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Slot position of a data field.
    #[must_use]
    pub fn slot(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    #[must_use]
    pub fn is_id(name: &str) -> bool {
        name == ID_FIELD
    }

    #[must_use]
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Names of fields `create` must supply.
    #[must_use]
    pub fn required_fields(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.iter().filter(|f| f.is_required())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FieldKind, ScalarKind};

    fn account() -> EntityDef {
        EntityDef::new("Account", IdKind::Hex)
            .field(FieldDef::new("balance", ScalarKind::BigInt))
            .field(FieldDef::new("label", ScalarKind::Text).nullable())
            .field(FieldDef::new("owner", FieldKind::reference("Person")))
    }

    #[test]
    fn slots_follow_declaration_order() {
        let entity = account();

        assert_eq!(entity.slot("balance"), Some(0));
        assert_eq!(entity.slot("owner"), Some(2));
        assert_eq!(entity.slot("id"), None);
    }

    #[test]
    fn required_fields_skip_nullable() {
        let entity = account();
        let required: Vec<_> = entity.required_fields().map(|f| f.name.as_str()).collect();

        assert_eq!(required, ["balance", "owner"]);
    }
}
