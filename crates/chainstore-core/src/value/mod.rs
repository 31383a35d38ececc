mod coerce;

#[cfg(test)]
mod tests;

use crate::types::{Float64, Hex, Int};
use serde::{Serialize, Serializer, ser::SerializeSeq};
use std::fmt;

// re-exports
pub use coerce::{CoercionError, coerce_scalar};

///
/// Value
///
/// Field value as handler code supplies it and as records store it.
/// Records only ever hold values already coerced to their field kind.
///
/// Null → an optional field with no value; distinct from an absent record.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
#[remain::sorted]
pub enum Value {
    BigInt(Int),
    Bool(bool),
    Float(Float64),
    Hex(Hex),
    Int(i64),
    List(Vec<Self>),
    Null,
    Text(String),
}

impl Value {
    /// Build a `Value::List` from owned items.
    pub fn from_list<T>(items: impl IntoIterator<Item = T>) -> Self
    where
        T: Into<Self>,
    {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    /// Finite float, or `None` for NaN and infinities.
    #[must_use]
    pub fn float(value: f64) -> Option<Self> {
        Float64::try_new(value).map(Self::Float)
    }

    /// Short label of the variant, used in error messages.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::BigInt(_) => "bigint",
            Self::Bool(_) => "bool",
            Self::Float(_) => "float",
            Self::Hex(_) => "hex",
            Self::Int(_) => "int",
            Self::List(_) => "list",
            Self::Null => "null",
            Self::Text(_) => "text",
        }
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer view of `Int` and in-range `BigInt` values.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            Self::BigInt(v) => v.to_i64(),
            _ => None,
        }
    }

    /// Arbitrary-precision view of either integer variant.
    #[must_use]
    pub fn as_int(&self) -> Option<Int> {
        match self {
            Self::Int(v) => Some(Int::from(*v)),
            Self::BigInt(v) => Some(v.clone()),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(v.get()),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_hex(&self) -> Option<&Hex> {
        match self {
            Self::Hex(h) => Some(h),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[Self]> {
        match self {
            Self::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BigInt(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Hex(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Null => f.write_str("null"),
            Self::Text(v) => write!(f, "{v:?}"),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::BigInt(v) => v.serialize(serializer),
            Self::Bool(v) => serializer.serialize_bool(*v),
            Self::Float(v) => v.serialize(serializer),
            Self::Hex(v) => v.serialize(serializer),
            Self::Int(v) => serializer.serialize_i64(*v),
            Self::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Null => serializer.serialize_none(),
            Self::Text(v) => serializer.serialize_str(v),
        }
    }
}

///
/// Conversions
///

macro_rules! impl_from_small_int {
    ( $( $ty:ty ),* $(,)? ) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Self::Int(i64::from(v))
                }
            }
        )*
    };
}

impl_from_small_int!(i8, i16, i32, i64, u8, u16, u32);

// Wide integers stay exact by going through `Int`.
macro_rules! impl_from_wide_int {
    ( $( $ty:ty ),* $(,)? ) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Self::BigInt(Int::from(v))
                }
            }
        )*
    };
}

impl_from_wide_int!(u64, i128, u128);

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<Int> for Value {
    fn from(v: Int) -> Self {
        Self::BigInt(v)
    }
}

impl From<num_bigint::BigInt> for Value {
    fn from(v: num_bigint::BigInt) -> Self {
        Self::BigInt(Int::from_big(v))
    }
}

impl From<Float64> for Value {
    fn from(v: Float64) -> Self {
        Self::Float(v)
    }
}

impl From<Hex> for Value {
    fn from(v: Hex) -> Self {
        Self::Hex(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Self::Text(v.clone())
    }
}

impl<T: Into<Self>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::from_list(items)
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}
