use crate::{
    types::{Float64, Hex, Int},
    value::Value,
};
use chainstore_schema::types::ScalarKind;
use thiserror::Error as ThisError;

///
/// CoercionError
///
/// A supplied value could not be normalized to the declared kind.
/// `Mismatch` is a caller typing error; the other variants are malformed
/// literals of an acceptable category.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum CoercionError {
    #[error("expected {expected}, found {found}")]
    Mismatch {
        expected: ScalarKind,
        found: &'static str,
    },

    #[error("malformed {expected} literal '{literal}'")]
    Malformed { expected: ScalarKind, literal: String },

    #[error("{literal} is out of range for {expected}")]
    OutOfRange { expected: ScalarKind, literal: String },
}

impl CoercionError {
    #[must_use]
    pub const fn is_mismatch(&self) -> bool {
        matches!(self, Self::Mismatch { .. })
    }

    const fn mismatch(expected: ScalarKind, found: &Value) -> Self {
        Self::Mismatch {
            expected,
            found: found.label(),
        }
    }

    fn malformed(expected: ScalarKind, literal: &str) -> Self {
        Self::Malformed {
            expected,
            literal: literal.to_string(),
        }
    }

    fn out_of_range(expected: ScalarKind, literal: impl ToString) -> Self {
        Self::OutOfRange {
            expected,
            literal: literal.to_string(),
        }
    }
}

/// Normalize `value` to the canonical representation of `kind`.
///
/// Integer kinds accept either integer variant and decimal text; `bigint`
/// always yields `Value::BigInt` and `int` always yields `Value::Int`, so two
/// spellings of the same number become the same value. `Null` is never
/// accepted here; nullability is the caller's decision.
pub fn coerce_scalar(kind: ScalarKind, value: Value) -> Result<Value, CoercionError> {
    match kind {
        ScalarKind::BigInt => coerce_big_int(value),
        ScalarKind::Bool => match value {
            Value::Bool(_) => Ok(value),
            other => Err(CoercionError::mismatch(kind, &other)),
        },
        ScalarKind::Float => coerce_float(value),
        ScalarKind::Hex => coerce_hex(value),
        ScalarKind::Int => coerce_int(value),
        ScalarKind::Text => match value {
            Value::Text(_) => Ok(value),
            other => Err(CoercionError::mismatch(kind, &other)),
        },
    }
}

fn parse_int(kind: ScalarKind, text: &str) -> Result<Int, CoercionError> {
    text.parse::<Int>()
        .map_err(|_| CoercionError::malformed(kind, text))
}

fn coerce_big_int(value: Value) -> Result<Value, CoercionError> {
    const KIND: ScalarKind = ScalarKind::BigInt;

    match value {
        Value::BigInt(_) => Ok(value),
        Value::Int(v) => Ok(Value::BigInt(Int::from(v))),
        Value::Text(text) => parse_int(KIND, &text).map(Value::BigInt),
        other => Err(CoercionError::mismatch(KIND, &other)),
    }
}

fn coerce_int(value: Value) -> Result<Value, CoercionError> {
    const KIND: ScalarKind = ScalarKind::Int;

    let big = match value {
        Value::Int(_) => return Ok(value),
        Value::BigInt(v) => v,
        Value::Text(text) => parse_int(KIND, &text)?,
        other => return Err(CoercionError::mismatch(KIND, &other)),
    };

    big.to_i64()
        .map(Value::Int)
        .ok_or_else(|| CoercionError::out_of_range(KIND, &big))
}

fn coerce_float(value: Value) -> Result<Value, CoercionError> {
    const KIND: ScalarKind = ScalarKind::Float;

    let exact_int = |n: i64| {
        if n.unsigned_abs() > Float64::SAFE_INTEGER.unsigned_abs() {
            return None;
        }

        #[allow(clippy::cast_precision_loss)]
        let f = n as f64;
        Float64::try_new(f).map(Value::Float)
    };

    match value {
        Value::Float(_) => Ok(value),
        Value::Int(n) => exact_int(n).ok_or_else(|| CoercionError::out_of_range(KIND, n)),
        Value::BigInt(big) => big
            .to_i64()
            .and_then(exact_int)
            .ok_or_else(|| CoercionError::out_of_range(KIND, &big)),
        Value::Text(text) => text
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(Value::float)
            .ok_or_else(|| CoercionError::malformed(KIND, &text)),
        other => Err(CoercionError::mismatch(KIND, &other)),
    }
}

fn coerce_hex(value: Value) -> Result<Value, CoercionError> {
    const KIND: ScalarKind = ScalarKind::Hex;

    match value {
        Value::Hex(_) => Ok(value),
        Value::Text(text) => text
            .parse::<Hex>()
            .map(Value::Hex)
            .map_err(|_| CoercionError::malformed(KIND, &text)),
        other => Err(CoercionError::mismatch(KIND, &other)),
    }
}
