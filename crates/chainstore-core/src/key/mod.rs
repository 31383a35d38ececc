
use crate::{
    types::{Hex, Int},
    value::{CoercionError, Value, coerce_scalar},
};
use chainstore_schema::types::IdKind;
use derive_more::Display;
use serde::Serialize;

///
/// Key
///
/// Canonical identifier of a record within one entity table.
///
/// Both integer id kinds share `Key::Int`, so `7777`, `"7777"` and
/// `Int::from(7777)` are the same key. Keys are only compared within one
/// table; nothing relates keys of different entity types.
///

#[derive(Clone, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(untagged)]
pub enum Key {
    Hex(Hex),
    Int(Int),
    #[display("{_0:?}")]
    Text(String),
}

impl Key {
    /// Normalize a supplied identifier for an entity with id kind `kind`.
    pub fn from_value(kind: IdKind, value: Value) -> Result<Self, CoercionError> {
        let canonical = coerce_scalar(kind.scalar(), value)?;

        Ok(match canonical {
            Value::Hex(h) => Self::Hex(h),
            Value::Int(n) => Self::Int(Int::from(n)),
            Value::BigInt(n) => Self::Int(n),
            Value::Text(s) => Self::Text(s),
            // coerce_scalar only returns the four id scalar shapes above
            other => {
                return Err(CoercionError::Mismatch {
                    expected: kind.scalar(),
                    found: other.label(),
                });
            }
        })
    }

    /// Value stored in the id slot of a record with id kind `kind`.
    #[must_use]
    pub fn to_value(&self, kind: IdKind) -> Value {
        match (self, kind) {
            (Self::Int(n), IdKind::Int) => n
                .to_i64()
                .map_or_else(|| Value::BigInt(n.clone()), Value::Int),
            (Self::Int(n), _) => Value::BigInt(n.clone()),
            (Self::Hex(h), _) => Value::Hex(h.clone()),
            (Self::Text(s), _) => Value::Text(s.clone()),
        }
    }
}

macro_rules! impl_from_key {
    ( $( $ty:ty => $variant:ident ),* $(,)? ) => {
        $(
            impl From<$ty> for Key {
                fn from(v: $ty) -> Self {
                    Self::$variant(v.into())
                }
            }
        )*
    }
}

impl_from_key! {
    Hex => Hex,
    Int => Int,
    i32 => Int,
    i64 => Int,
    u32 => Int,
    u64 => Int,
    &str => Text,
    String => Text,
}
