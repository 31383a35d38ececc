use crate::types::{FieldKind, ScalarKind};
use serde::{Deserialize, Serialize};

///
/// FieldDef
///
/// One declared data field. The identifier is not a `FieldDef`; it lives on
/// the entity as its id kind.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct FieldDef {
    pub name: String,
    pub kind: FieldKind,

    /// Optional column: may hold `null` and may be omitted on create.
    #[serde(default)]
    pub nullable: bool,
}

impl FieldDef {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: impl Into<FieldKind>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            nullable: false,
        }
    }

    #[must_use]
    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    #[must_use]
    pub const fn is_required(&self) -> bool {
        !self.nullable
    }

    /// Scalar kind for scalar and list fields.
    #[must_use]
    pub const fn scalar(&self) -> Option<ScalarKind> {
        match &self.kind {
            FieldKind::Scalar(kind) | FieldKind::List(kind) => Some(*kind),
            FieldKind::Ref(_) => None,
        }
    }
}
