use crate::Error;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

///
/// ScalarKind
///
/// Column primitives a field or list element can hold.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
#[remain::sorted]
pub enum ScalarKind {
    #[display("bigint")]
    BigInt,
    #[display("bool")]
    Bool,
    #[display("float")]
    Float,
    #[display("hex")]
    Hex,
    #[display("int")]
    Int,
    #[display("text")]
    Text,
}

impl FromStr for ScalarKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bigint" => Ok(Self::BigInt),
            "bool" | "boolean" => Ok(Self::Bool),
            "float" => Ok(Self::Float),
            "hex" => Ok(Self::Hex),
            "int" | "integer" => Ok(Self::Int),
            "text" | "string" => Ok(Self::Text),
            _ => Err(Error::InvalidKind {
                kind: s.to_string(),
                reason: "unknown scalar kind",
            }),
        }
    }
}

///
/// IdKind
///
/// Domains an entity identifier may be declared with.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
#[serde(try_from = "String", into = "String")]
#[remain::sorted]
pub enum IdKind {
    #[display("bigint")]
    BigInt,
    #[display("hex")]
    Hex,
    #[display("int")]
    Int,
    #[display("text")]
    Text,
}

impl IdKind {
    #[must_use]
    pub const fn scalar(self) -> ScalarKind {
        match self {
            Self::BigInt => ScalarKind::BigInt,
            Self::Hex => ScalarKind::Hex,
            Self::Int => ScalarKind::Int,
            Self::Text => ScalarKind::Text,
        }
    }

    /// Integer id kinds share one canonical key form.
    #[must_use]
    pub const fn is_integer(self) -> bool {
        matches!(self, Self::BigInt | Self::Int)
    }
}

impl FromStr for IdKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<ScalarKind>()? {
            ScalarKind::BigInt => Ok(Self::BigInt),
            ScalarKind::Hex => Ok(Self::Hex),
            ScalarKind::Int => Ok(Self::Int),
            ScalarKind::Text => Ok(Self::Text),
            ScalarKind::Bool | ScalarKind::Float => Err(Error::InvalidKind {
                kind: s.to_string(),
                reason: "identifiers must be text, int, bigint or hex",
            }),
        }
    }
}

impl TryFrom<String> for IdKind {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<IdKind> for String {
    fn from(kind: IdKind) -> Self {
        kind.to_string()
    }
}

///
/// FieldKind
///
/// Declared type of one data field.
///
/// Text form: a scalar name (`bigint`), a list (`text[]`), or a reference
/// to another entity (`ref:Account`).
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(try_from = "String", into = "String")]
pub enum FieldKind {
    Scalar(ScalarKind),
    List(ScalarKind),
    Ref(String),
}

impl FieldKind {
    #[must_use]
    pub const fn scalar(kind: ScalarKind) -> Self {
        Self::Scalar(kind)
    }

    #[must_use]
    pub const fn list(kind: ScalarKind) -> Self {
        Self::List(kind)
    }

    #[must_use]
    pub fn reference(entity: impl Into<String>) -> Self {
        Self::Ref(entity.into())
    }

    /// Target entity name when this field references another entity.
    #[must_use]
    pub fn ref_target(&self) -> Option<&str> {
        match self {
            Self::Ref(target) => Some(target.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(kind) => write!(f, "{kind}"),
            Self::List(kind) => write!(f, "{kind}[]"),
            Self::Ref(target) => write!(f, "ref:{target}"),
        }
    }
}

impl FromStr for FieldKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        if let Some(target) = s.strip_prefix("ref:") {
            let target = target.trim();
            if target.is_empty() {
                return Err(Error::InvalidKind {
                    kind: s.to_string(),
                    reason: "reference target is empty",
                });
            }

            return Ok(Self::Ref(target.to_string()));
        }

        if let Some(inner) = s.strip_suffix("[]") {
            if inner.ends_with("[]") {
                return Err(Error::InvalidKind {
                    kind: s.to_string(),
                    reason: "nested lists are not supported",
                });
            }

            return Ok(Self::List(inner.parse()?));
        }

        Ok(Self::Scalar(s.parse()?))
    }
}

impl TryFrom<String> for FieldKind {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FieldKind> for String {
    fn from(kind: FieldKind) -> Self {
        kind.to_string()
    }
}

impl From<ScalarKind> for FieldKind {
    fn from(kind: ScalarKind) -> Self {
        Self::Scalar(kind)
    }
}
