use crate::{
    db::{
        table::EntityTable,
        unit::UnitCounters,
        update::{RowUpdate, Update},
    },
    error::InternalError,
    key::Key,
    model::EntityModel,
    obs::{ExecKind, MetricsSink, RowEffect, sink::Span},
    record::{Data, Record, RowPatch},
    value::{CoercionError, Value},
};
use chainstore_schema::{ID_FIELD, node::EntityDef};
use std::{fmt, sync::Arc};
use tracing::{debug, info};

///
/// EntityStore
///
/// Handler-facing store for one entity type within one unit of work.
///
/// Every call checks and coerces its input against the entity definition
/// before touching the table, then performs exactly one table operation.
/// Nothing is cached between calls.
///

#[derive(Clone)]
pub struct EntityStore {
    table: Arc<EntityTable>,
    unit: Arc<UnitCounters>,
    sink: Arc<dyn MetricsSink>,
    debug: bool,
}

impl EntityStore {
    pub(crate) fn new(
        table: Arc<EntityTable>,
        unit: Arc<UnitCounters>,
        sink: Arc<dyn MetricsSink>,
        debug: bool,
    ) -> Self {
        Self {
            table,
            unit,
            sink,
            debug,
        }
    }

    /// Entity type this store reads and writes.
    #[must_use]
    pub fn entity(&self) -> &str {
        self.table.name()
    }

    #[must_use]
    pub fn def(&self) -> &Arc<EntityDef> {
        self.model().def()
    }

    /// Insert a new record. Every non-nullable field must be supplied.
    pub fn create(&self, id: impl Into<Value>, data: Data) -> Result<Record, InternalError> {
        self.run(ExecKind::Create, || {
            let key = self.key(id.into())?;
            let row = self.full_row(&key, data)?;
            let record = self.table.create(key, row)?;

            Ok((record, RowEffect::Created))
        })
    }

    /// Apply `update` to the existing record for `id`.
    pub fn update<'f>(
        &self,
        id: impl Into<Value>,
        update: impl Into<Update<'f>>,
    ) -> Result<Record, InternalError> {
        self.run(ExecKind::Update, || {
            let key = self.key(id.into())?;
            let update = self.row_update(&key, update.into())?;
            let record = self.table.update(&key, update)?;

            Ok((record, RowEffect::Updated))
        })
    }

    /// Create from `create` when `id` is absent, otherwise apply `update`.
    /// Both inputs are checked up front, whichever branch runs.
    pub fn upsert<'f>(
        &self,
        id: impl Into<Value>,
        create: Data,
        update: impl Into<Update<'f>>,
    ) -> Result<Record, InternalError> {
        self.run(ExecKind::Upsert, || {
            let key = self.key(id.into())?;
            let row = self.full_row(&key, create)?;
            let update = self.row_update(&key, update.into())?;
            let (record, created) = self.table.upsert(key.clone(), row, update)?;

            let effect = if created {
                RowEffect::Created
            } else {
                RowEffect::Updated
            };

            Ok((record, effect))
        })
    }

    /// Current record for `id`, or `None`.
    pub fn find_unique(&self, id: impl Into<Value>) -> Result<Option<Record>, InternalError> {
        self.run(ExecKind::Find, || {
            let key = self.key(id.into())?;
            let record = self.table.find(&key)?;

            let effect = if record.is_some() {
                RowEffect::Read
            } else {
                RowEffect::Missing
            };

            Ok((record, effect))
        })
    }

    /// Remove the record for `id`; `false` when there was none.
    pub fn delete(&self, id: impl Into<Value>) -> Result<bool, InternalError> {
        self.run(ExecKind::Delete, || {
            let key = self.key(id.into())?;
            let deleted = self.table.delete(&key)?;

            let effect = if deleted {
                RowEffect::Deleted
            } else {
                RowEffect::Missing
            };

            Ok((deleted, effect))
        })
    }

    // ------------------------------------------------------------------
    // Call plumbing
    // ------------------------------------------------------------------

    fn run<T>(
        &self,
        kind: ExecKind,
        f: impl FnOnce() -> Result<(T, RowEffect), InternalError>,
    ) -> Result<T, InternalError> {
        let span = Span::new(self.sink.as_ref(), kind, self.entity());
        self.unit.call();

        match f() {
            Ok((value, effect)) => {
                self.log_ok(kind, effect);
                self.unit.effect(effect);
                span.finish(effect);

                Ok(value)
            }
            Err(err) => {
                self.log_err(kind, &err);
                self.unit.error();
                span.fail(err.class);

                Err(err)
            }
        }
    }

    fn log_ok(&self, kind: ExecKind, effect: RowEffect) {
        if self.debug {
            info!(entity = self.entity(), op = %kind, ?effect, "store call");
        } else {
            debug!(entity = self.entity(), op = %kind, ?effect, "store call");
        }
    }

    fn log_err(&self, kind: ExecKind, err: &InternalError) {
        let err = err.display_with_class();

        if self.debug {
            info!(entity = self.entity(), op = %kind, %err, "store call failed");
        } else {
            debug!(entity = self.entity(), op = %kind, %err, "store call failed");
        }
    }

    // ------------------------------------------------------------------
    // Input checking
    // ------------------------------------------------------------------

    fn model(&self) -> &EntityModel {
        self.table.model()
    }

    fn key(&self, id: Value) -> Result<Key, InternalError> {
        Key::from_value(self.model().id_kind(), id).map_err(|e| self.field_error(ID_FIELD, e))
    }

    fn field_error(&self, field: &str, err: CoercionError) -> InternalError {
        let mut err = InternalError::from(err);
        err.message = format!("{}.{field}: {}", self.entity(), err.message);

        err
    }

    fn invalid(&self, message: impl fmt::Display) -> InternalError {
        InternalError::validation(format!("{}: {message}", self.entity()))
    }

    /// Coerce every supplied field into its slot.
    fn slots(&self, key: &Key, data: Data) -> Result<Vec<Option<Value>>, InternalError> {
        let model = self.model();
        let def = model.def();
        let mut slots = vec![None; model.slot_count()];

        for (name, value) in data {
            if EntityDef::is_id(&name) {
                let supplied = Key::from_value(model.id_kind(), value)
                    .map_err(|e| self.field_error(ID_FIELD, e))?;
                if &supplied != key {
                    return Err(self.invalid(format_args!(
                        "id field {supplied} does not match identifier {key}"
                    )));
                }
                continue;
            }

            let Some((slot, codec)) = def
                .slot(&name)
                .and_then(|slot| model.codec(slot).map(|codec| (slot, codec)))
            else {
                return Err(self.invalid(format_args!("unknown field '{name}'")));
            };

            let value = if value.is_null() {
                if !def.fields[slot].nullable {
                    return Err(self.invalid(format_args!("field '{name}' is not nullable")));
                }
                Value::Null
            } else {
                codec.coerce(value).map_err(|e| self.field_error(&name, e))?
            };

            slots[slot] = Some(value);
        }

        Ok(slots)
    }

    /// Complete row for a create; omitted nullable fields become null.
    fn full_row(&self, key: &Key, data: Data) -> Result<Vec<Value>, InternalError> {
        let def = self.def();
        let slots = self.slots(key, data)?;

        let missing: Vec<&str> = slots
            .iter()
            .zip(&def.fields)
            .filter(|(slot, field)| slot.is_none() && field.is_required())
            .map(|(_, field)| field.name.as_str())
            .collect();
        if !missing.is_empty() {
            return Err(self.invalid(format_args!(
                "missing required field(s) {}",
                missing.join(", ")
            )));
        }

        Ok(slots
            .into_iter()
            .map(|slot| slot.unwrap_or(Value::Null))
            .collect())
    }

    fn patch(&self, key: &Key, data: Data) -> Result<RowPatch, InternalError> {
        let slots = self.slots(key, data)?;
        let mut patch = RowPatch::empty(slots.len());
        for (slot, value) in slots.into_iter().enumerate() {
            if let Some(value) = value {
                patch.set(slot, value);
            }
        }

        Ok(patch)
    }

    /// Literal updates are checked now; function results are checked when
    /// the table calls them, still under the key's lock.
    fn row_update<'a>(
        &'a self,
        key: &'a Key,
        update: Update<'a>,
    ) -> Result<RowUpdate<'a>, InternalError> {
        match update {
            Update::Literal(data) => self.patch(key, data).map(RowUpdate::Literal),
            Update::Function(f) => Ok(RowUpdate::function(move |current| {
                // store errors raised inside the function keep their class
                let data = f(current).map_err(|e| match e.downcast::<InternalError>() {
                    Ok(inner) => *inner,
                    Err(e) => InternalError::handler(self.entity(), key, e),
                })?;

                self.patch(key, data)
            })),
        }
    }
}

impl fmt::Debug for EntityStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityStore")
            .field("entity", &self.entity())
            .field("debug", &self.debug)
            .finish_non_exhaustive()
    }
}
