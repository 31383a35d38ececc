use crate::{
    error::InternalError,
    key::Key,
    value::{CoercionError, Value, coerce_scalar},
};
use chainstore_schema::{
    node::EntityDef,
    registry::SchemaRegistry,
    types::{FieldKind, IdKind, ScalarKind},
};
use std::sync::Arc;

///
/// FieldCodec
///
/// Runtime coercion plan for one field slot. References are resolved to the
/// target's id kind once, when the model is built.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FieldCodec {
    Scalar(ScalarKind),
    List(ScalarKind),
    Ref(IdKind),
}

impl FieldCodec {
    /// Coerce a non-null value for this slot.
    pub fn coerce(self, value: Value) -> Result<Value, CoercionError> {
        match self {
            Self::Scalar(kind) => coerce_scalar(kind, value),
            Self::List(kind) => match value {
                Value::List(items) => items
                    .into_iter()
                    .map(|item| coerce_scalar(kind, item))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::List),
                other => Err(CoercionError::Mismatch {
                    expected: kind,
                    found: other.label(),
                }),
            },
            Self::Ref(id_kind) => Key::from_value(id_kind, value).map(|key| key.to_value(id_kind)),
        }
    }
}

///
/// EntityModel
///
/// Schema definition plus the per-slot coercion plan used by the store
/// facade and the entity table.
///

#[derive(Debug)]
pub struct EntityModel {
    def: Arc<EntityDef>,
    codecs: Vec<FieldCodec>,
}

impl EntityModel {
    /// Build the model for `def`, resolving reference targets through
    /// `registry`.
    pub fn resolve(
        def: Arc<EntityDef>,
        registry: &impl SchemaRegistry,
    ) -> Result<Self, InternalError> {
        let codecs = def
            .fields
            .iter()
            .map(|field| match &field.kind {
                FieldKind::Scalar(kind) => Ok(FieldCodec::Scalar(*kind)),
                FieldKind::List(kind) => Ok(FieldCodec::List(*kind)),
                FieldKind::Ref(target) => registry
                    .resolve(target)
                    .map(|target| FieldCodec::Ref(target.id))
                    .map_err(|e| {
                        InternalError::schema_invariant(format!(
                            "{}.{}: {e}",
                            def.name, field.name
                        ))
                    }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { def, codecs })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.def.name
    }

    #[must_use]
    pub const fn def(&self) -> &Arc<EntityDef> {
        &self.def
    }

    #[must_use]
    pub fn id_kind(&self) -> IdKind {
        self.def.id
    }

    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.codecs.len()
    }

    #[must_use]
    pub fn codec(&self, slot: usize) -> Option<FieldCodec> {
        self.codecs.get(slot).copied()
    }
}
