use crate::{
    error::{ErrorClass, ErrorOrigin, InternalError},
    key::Key,
    types::{Hex, Int},
    value::Value,
};
use chainstore_schema::{ID_FIELD, node::EntityDef};
use serde::{Serialize, Serializer, ser::SerializeMap};
use std::{collections::BTreeMap, sync::Arc};

///
/// Record
///
/// Immutable snapshot of one stored row: the canonical key, the id slot
/// value, and one value per declared field in declaration order.
/// Mutation never happens in place; the table swaps whole records.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Record {
    entity: Arc<EntityDef>,
    key: Key,
    id: Value,
    values: Vec<Value>,
}

impl Record {
    pub(crate) fn new(entity: Arc<EntityDef>, key: Key, values: Vec<Value>) -> Self {
        debug_assert_eq!(entity.fields.len(), values.len());
        let id = key.to_value(entity.id);

        Self {
            entity,
            key,
            id,
            values,
        }
    }

    #[must_use]
    pub fn entity(&self) -> &str {
        &self.entity.name
    }

    #[must_use]
    pub const fn def(&self) -> &Arc<EntityDef> {
        &self.entity
    }

    #[must_use]
    pub const fn key(&self) -> &Key {
        &self.key
    }

    /// Value of the id slot, shaped by the entity's id kind.
    #[must_use]
    pub const fn id(&self) -> &Value {
        &self.id
    }

    /// Field lookup by name; `"id"` resolves to the id slot.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        if EntityDef::is_id(name) {
            return Some(&self.id);
        }

        self.entity.slot(name).map(|slot| &self.values[slot])
    }

    #[must_use]
    pub fn slot(&self, slot: usize) -> Option<&Value> {
        self.values.get(slot)
    }

    /// Data slots in declaration order (the id slot is not included).
    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    #[must_use]
    pub fn int(&self, name: &str) -> Option<Int> {
        self.get(name).and_then(Value::as_int)
    }

    #[must_use]
    pub fn i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_i64)
    }

    #[must_use]
    pub fn f64(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_f64)
    }

    #[must_use]
    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_text)
    }

    #[must_use]
    pub fn bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_bool)
    }

    #[must_use]
    pub fn hex(&self, name: &str) -> Option<&Hex> {
        self.get(name).and_then(Value::as_hex)
    }

    /// `(name, value)` pairs, id first, then fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        std::iter::once((ID_FIELD, &self.id)).chain(
            self.entity
                .fields
                .iter()
                .zip(&self.values)
                .map(|(field, value)| (field.name.as_str(), value)),
        )
    }

    /// Name-keyed copy of the record, including the id.
    #[must_use]
    pub fn to_data(&self) -> Data {
        self.fields()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len() + 1))?;
        for (name, value) in self.fields() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

///
/// Data
///
/// Name-keyed field values as handler code writes them. Only the store
/// facade reads `Data`; tables work on slots.
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Data(BTreeMap<String, Value>);

impl Data {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field (builder style).
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    /// Set a field, returning the previous value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(name.into(), value.into())
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.0.remove(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K, V> FromIterator<(K, V)> for Data
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for Data
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl IntoIterator for Data {
    type Item = (String, Value);
    type IntoIter = std::collections::btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

///
/// RowPatch
///
/// Slot-indexed partial update. `None` leaves the slot unchanged; there is
/// no way to express "reset to default".
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RowPatch {
    slots: Vec<Option<Value>>,
}

impl RowPatch {
    #[must_use]
    pub fn empty(slot_count: usize) -> Self {
        Self {
            slots: vec![None; slot_count],
        }
    }

    /// Write `value` into `slot`; `false` when the slot is out of range.
    pub fn set(&mut self, slot: usize, value: Value) -> bool {
        match self.slots.get_mut(slot) {
            Some(target) => {
                *target = Some(value);
                true
            }
            None => false,
        }
    }

    /// Number of slots the patch covers.
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn get(&self, slot: usize) -> Option<&Value> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    /// Number of slots the patch writes.
    #[must_use]
    pub fn touched(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.touched() == 0
    }

    /// Apply the patch to `current`, producing the next record. The patch
    /// must cover exactly the record's slots.
    pub fn merge(self, current: &Record) -> Result<Record, InternalError> {
        if self.slots.len() != current.values.len() {
            return Err(InternalError::new(
                ErrorClass::InvariantViolation,
                ErrorOrigin::Table,
                format!(
                    "patch covers {} slot(s) but {} has {}",
                    self.slots.len(),
                    current.entity(),
                    current.values.len()
                ),
            ));
        }

        let values = current
            .values
            .iter()
            .zip(self.slots)
            .map(|(old, new)| new.unwrap_or_else(|| old.clone()))
            .collect();

        Ok(Record {
            entity: Arc::clone(&current.entity),
            key: current.key.clone(),
            id: current.id.clone(),
            values,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{account_def, person_def};
    use proptest::prelude::*;

    fn person(name: &str, age: i64) -> Record {
        Record::new(
            person_def(),
            Key::from(name),
            vec![Value::Int(age), Value::Null],
        )
    }

    #[test]
    fn get_resolves_id_and_named_slots() {
        let jim = person("Jim", 34);

        assert_eq!(jim.get("id"), Some(&Value::from("Jim")));
        assert_eq!(jim.i64("age"), Some(34));
        assert_eq!(jim.get("nickname"), Some(&Value::Null));
        assert_eq!(jim.get("missing"), None);
    }

    #[test]
    fn id_slot_follows_id_kind() {
        let account = Record::new(
            account_def(),
            Key::from(Hex::from([0xab, 0xcd])),
            vec![Value::BigInt(Int::from(10)), Value::Null],
        );

        assert_eq!(account.get("id"), Some(&Value::Hex(Hex::from([0xab, 0xcd]))));
        assert_eq!(account.int("balance"), Some(Int::from(10)));
    }

    #[test]
    fn merge_writes_only_patched_slots() {
        let jim = person("Jim", 34);
        let mut patch = RowPatch::empty(2);
        patch.set(1, Value::from("Jimbo"));

        let next = patch.merge(&jim).expect("full-width patch should merge");

        assert_eq!(next.i64("age"), Some(34));
        assert_eq!(next.text("nickname"), Some("Jimbo"));
        assert_eq!(next.key(), jim.key());
        assert_eq!(jim.get("nickname"), Some(&Value::Null), "snapshot must not change");
    }

    #[test]
    fn empty_patch_is_identity() {
        let jim = person("Jim", 34);

        assert!(RowPatch::empty(2).is_noop());
        assert_eq!(RowPatch::empty(2).merge(&jim).unwrap(), jim);
    }

    #[test]
    fn mismatched_patch_width_is_rejected() {
        let jim = person("Jim", 34);

        let err = RowPatch::empty(1)
            .merge(&jim)
            .expect_err("short patch should not drop fields");
        assert_eq!(err.class, ErrorClass::InvariantViolation);

        let mut patch = RowPatch::empty(2);
        assert!(!patch.set(2, Value::Int(1)));
        assert!(patch.is_noop());
        assert_eq!(patch.slot_count(), 2);
    }

    #[test]
    fn record_serializes_id_first() {
        let jim = person("Jim", 34);
        let json = serde_json::to_string(&jim).expect("record should serialize");

        assert_eq!(json, r#"{"id":"Jim","age":34,"nickname":null}"#);
    }

    #[test]
    fn data_builder_and_iteration() {
        let data = Data::new().with("age", 34).with("nickname", "J");

        assert_eq!(data.len(), 2);
        assert_eq!(data.get("age"), Some(&Value::Int(34)));
        assert_eq!(
            data.iter().map(|(k, _)| k).collect::<Vec<_>>(),
            ["age", "nickname"]
        );
        assert_eq!(Data::from([("age", 34)]), Data::new().with("age", 34));
    }

    #[test]
    fn to_data_round_trips_field_names() {
        let data = person("Sara", 20).to_data();

        assert_eq!(data.get("id"), Some(&Value::from("Sara")));
        assert_eq!(data.get("age"), Some(&Value::Int(20)));
        assert!(data.contains("nickname"));
    }

    proptest! {
        #[test]
        fn merge_preserves_untouched_slots(
            age in any::<i64>(),
            new_age in proptest::option::of(any::<i64>()),
            nick in proptest::option::of("[a-z]{1,8}"),
        ) {
            let current = person("Jim", age);
            let mut patch = RowPatch::empty(2);
            if let Some(v) = new_age {
                patch.set(0, Value::Int(v));
            }
            if let Some(v) = &nick {
                patch.set(1, Value::from(v.as_str()));
            }

            let next = patch.merge(&current).unwrap();

            prop_assert_eq!(next.i64("age"), Some(new_age.unwrap_or(age)));
            prop_assert_eq!(
                next.get("nickname").cloned(),
                Some(nick.map_or(Value::Null, Value::from))
            );
        }
    }
}
