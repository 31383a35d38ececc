use crate::{
    types::{Hex, Int},
    value::{CoercionError, Value, coerce_scalar},
};
use chainstore_schema::types::ScalarKind;
use proptest::prelude::*;

// ---- helpers -----------------------------------------------------------

fn coerce(kind: ScalarKind, value: impl Into<Value>) -> Result<Value, CoercionError> {
    coerce_scalar(kind, value.into())
}

fn big(n: i64) -> Value {
    Value::BigInt(Int::from(n))
}

// ---- bigint ------------------------------------------------------------

#[test]
fn bigint_accepts_every_integer_spelling() {
    assert_eq!(coerce(ScalarKind::BigInt, 10i64).unwrap(), big(10));
    assert_eq!(coerce(ScalarKind::BigInt, big(10)).unwrap(), big(10));
    assert_eq!(coerce(ScalarKind::BigInt, "10").unwrap(), big(10));
    assert_eq!(coerce(ScalarKind::BigInt, "-10").unwrap(), big(-10));
}

#[test]
fn bigint_rejects_float_and_bool() {
    assert!(coerce(ScalarKind::BigInt, true).unwrap_err().is_mismatch());
    assert!(
        coerce(ScalarKind::BigInt, Value::float(1.0).unwrap())
            .unwrap_err()
            .is_mismatch()
    );
}

// ---- int ---------------------------------------------------------------

#[test]
fn int_narrows_in_range_bigints() {
    assert_eq!(coerce(ScalarKind::Int, big(34)).unwrap(), Value::Int(34));
    assert!(matches!(
        coerce(ScalarKind::Int, Value::from(u64::MAX)),
        Err(CoercionError::OutOfRange { .. })
    ));
}

// ---- float -------------------------------------------------------------

#[test]
fn float_widens_exact_integers_only() {
    assert_eq!(
        coerce(ScalarKind::Float, 3i64).unwrap(),
        Value::float(3.0).unwrap()
    );
    assert!(matches!(
        coerce(ScalarKind::Float, i64::MAX),
        Err(CoercionError::OutOfRange { .. })
    ));
    assert!(matches!(
        coerce(ScalarKind::Float, i64::MIN),
        Err(CoercionError::OutOfRange { .. })
    ));
}

#[test]
fn float_parses_text_but_not_nan() {
    assert_eq!(
        coerce(ScalarKind::Float, "2.5").unwrap(),
        Value::float(2.5).unwrap()
    );
    assert!(matches!(
        coerce(ScalarKind::Float, "NaN"),
        Err(CoercionError::Malformed { .. })
    ));
}

// ---- hex / text / bool -------------------------------------------------

#[test]
fn hex_text_is_normalized() {
    let value = coerce(ScalarKind::Hex, "0xDEADbeef").unwrap();

    assert_eq!(
        value,
        Value::Hex(Hex::from([0xde, 0xad, 0xbe, 0xef]))
    );
    assert_eq!(value.to_string(), "0xdeadbeef");
}

#[test]
fn hex_without_prefix_is_malformed() {
    assert!(matches!(
        coerce(ScalarKind::Hex, "deadbeef"),
        Err(CoercionError::Malformed { .. })
    ));
}

#[test]
fn text_and_bool_are_strict() {
    assert!(coerce(ScalarKind::Text, 1i64).unwrap_err().is_mismatch());
    assert!(coerce(ScalarKind::Bool, "true").unwrap_err().is_mismatch());
    assert_eq!(coerce(ScalarKind::Bool, false).unwrap(), Value::Bool(false));
}

#[test]
fn null_is_not_coerced() {
    for kind in [
        ScalarKind::BigInt,
        ScalarKind::Bool,
        ScalarKind::Float,
        ScalarKind::Hex,
        ScalarKind::Int,
        ScalarKind::Text,
    ] {
        assert!(coerce(kind, Value::Null).unwrap_err().is_mismatch());
    }
}

// ---- conversions / serialization ---------------------------------------

#[test]
fn wide_rust_integers_become_bigint() {
    assert_eq!(Value::from(5u64), big(5));
    assert_eq!(Value::from(5u32), Value::Int(5));
    assert_eq!(Value::from(None::<i64>), Value::Null);
    assert_eq!(
        Value::from(vec!["a", "b"]),
        Value::List(vec![Value::from("a"), Value::from("b")])
    );
}

#[test]
fn json_keeps_bigint_precision() {
    let value = Value::from_list([Value::from(u128::MAX), Value::Null, Value::Int(1)]);
    let json = serde_json::to_string(&value).unwrap();

    assert_eq!(
        json,
        format!("[\"{}\",null,1]", u128::MAX)
    );
}

// ---- properties --------------------------------------------------------

proptest! {
    #[test]
    fn bigint_coercion_is_idempotent(n in any::<i64>()) {
        let once = coerce(ScalarKind::BigInt, n).unwrap();
        let twice = coerce_scalar(ScalarKind::BigInt, once.clone()).unwrap();

        prop_assert_eq!(once, twice);
    }

    #[test]
    fn decimal_text_and_integer_agree(n in any::<i64>()) {
        prop_assert_eq!(
            coerce(ScalarKind::BigInt, n.to_string()).unwrap(),
            coerce(ScalarKind::BigInt, n).unwrap()
        );
        prop_assert_eq!(
            coerce(ScalarKind::Int, n.to_string()).unwrap(),
            Value::Int(n)
        );
    }
}
