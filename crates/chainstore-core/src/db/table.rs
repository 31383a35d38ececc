use crate::{
    db::update::RowUpdate,
    error::{ErrorClass, ErrorOrigin, InternalError},
    key::Key,
    model::EntityModel,
    record::Record,
    value::Value,
};
use parking_lot::{Mutex, MutexGuard, RwLock};
use std::{
    cell::RefCell,
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicU64, AtomicUsize, Ordering},
    },
    time::Duration,
};
use tracing::trace;

static NEXT_TABLE_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    // (table id, key) pairs the current thread is operating on, innermost last.
    static HELD: RefCell<Vec<(u64, Key)>> = const { RefCell::new(Vec::new()) };
}

///
/// SlotState
///
/// `retired` is set by the delete that removed the slot from the map;
/// anyone who locked a retired slot must look the key up again.
///

#[derive(Debug, Default)]
struct SlotState {
    record: Option<Record>,
    retired: bool,
}

type Slot = Mutex<SlotState>;

///
/// HeldKey
///
/// Marks a key as in use by the current thread until dropped.
///

struct HeldKey;

impl HeldKey {
    fn enter(table: u64, entity: &str, key: &Key) -> Result<Self, InternalError> {
        HELD.with_borrow_mut(|held| {
            if held.iter().any(|(t, k)| *t == table && k == key) {
                return Err(InternalError::table_conflict(format!(
                    "re-entrant operation on {entity}({key})"
                )));
            }
            held.push((table, key.clone()));

            Ok(Self)
        })
    }

    // true when the thread already holds another slot
    fn nested() -> bool {
        HELD.with_borrow(|held| held.len() > 1)
    }
}

impl Drop for HeldKey {
    fn drop(&mut self) {
        HELD.with_borrow_mut(|held| {
            held.pop();
        });
    }
}

///
/// EntityTable
///
/// Rows of one entity type keyed by canonical identifier.
///
/// Every operation locks only the slot for its key, for the whole
/// read-resolve-merge-write, so operations on one key are linearizable and
/// different keys never wait on each other. A thread that already holds a
/// slot (an update function calling back into the store) waits at most
/// `lock_timeout` for another one.
///

#[derive(Debug)]
pub struct EntityTable {
    id: u64,
    model: Arc<EntityModel>,
    slots: RwLock<HashMap<Key, Arc<Slot>>>,
    rows: AtomicUsize,
    lock_timeout: Duration,
}

impl EntityTable {
    #[must_use]
    pub fn new(model: Arc<EntityModel>, lock_timeout: Duration) -> Self {
        Self {
            id: NEXT_TABLE_ID.fetch_add(1, Ordering::Relaxed),
            model,
            slots: RwLock::new(HashMap::new()),
            rows: AtomicUsize::new(0),
            lock_timeout,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.model.name()
    }

    #[must_use]
    pub const fn model(&self) -> &Arc<EntityModel> {
        &self.model
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Insert a new record; fails if one exists for `key`.
    pub fn create(&self, key: Key, row: Vec<Value>) -> Result<Record, InternalError> {
        self.check_row(&row)?;
        let _held = HeldKey::enter(self.id, self.name(), &key)?;

        loop {
            let slot = self.slot_or_insert(&key);
            let mut state = self.lock(&key, &slot)?;
            if state.retired {
                continue;
            }
            if state.record.is_some() {
                return Err(InternalError::already_exists(self.name(), &key));
            }

            let record = Record::new(Arc::clone(self.model.def()), key, row);
            self.store_new(&mut state, record.clone());
            trace!(entity = self.name(), key = %record.key(), "row created");

            return Ok(record);
        }
    }

    /// Resolve `update` against the current record and merge it.
    pub fn update(&self, key: &Key, update: RowUpdate<'_>) -> Result<Record, InternalError> {
        let _held = HeldKey::enter(self.id, self.name(), key)?;

        let Some(slot) = self.slot(key) else {
            return Err(InternalError::not_found(self.name(), key));
        };
        let mut state = self.lock(key, &slot)?;
        let Some(current) = state.record.as_ref() else {
            return Err(InternalError::not_found(self.name(), key));
        };

        let next = update.resolve(current)?.merge(current)?;
        state.record = Some(next.clone());
        trace!(entity = self.name(), %key, "row updated");

        Ok(next)
    }

    /// Create from `row` when absent, otherwise apply `update`, as one step.
    /// The boolean is `true` when the create branch ran.
    pub fn upsert(
        &self,
        key: Key,
        row: Vec<Value>,
        update: RowUpdate<'_>,
    ) -> Result<(Record, bool), InternalError> {
        self.check_row(&row)?;
        let _held = HeldKey::enter(self.id, self.name(), &key)?;

        loop {
            let slot = self.slot_or_insert(&key);
            let mut state = self.lock(&key, &slot)?;
            if state.retired {
                continue;
            }

            if let Some(current) = state.record.as_ref() {
                let next = update.resolve(current)?.merge(current)?;
                state.record = Some(next.clone());
                trace!(entity = self.name(), %key, "upsert updated row");

                return Ok((next, false));
            }

            let record = Record::new(Arc::clone(self.model.def()), key, row);
            self.store_new(&mut state, record.clone());
            trace!(entity = self.name(), key = %record.key(), "upsert created row");

            return Ok((record, true));
        }
    }

    /// Snapshot of the current record, if any.
    pub fn find(&self, key: &Key) -> Result<Option<Record>, InternalError> {
        let _held = HeldKey::enter(self.id, self.name(), key)?;

        let Some(slot) = self.slot(key) else {
            return Ok(None);
        };
        let state = self.lock(key, &slot)?;

        Ok(state.record.clone())
    }

    /// Remove the record for `key`; `false` when there was none.
    pub fn delete(&self, key: &Key) -> Result<bool, InternalError> {
        let _held = HeldKey::enter(self.id, self.name(), key)?;

        let Some(slot) = self.slot(key) else {
            return Ok(false);
        };
        let mut state = self.lock(key, &slot)?;
        if state.record.take().is_none() {
            return Ok(false);
        }
        state.retired = true;

        // slot lock is held; map writers never wait on slots
        {
            let mut slots = self.slots.write();
            if slots.get(key).is_some_and(|s| Arc::ptr_eq(s, &slot)) {
                slots.remove(key);
            }
        }
        self.rows.fetch_sub(1, Ordering::AcqRel);
        trace!(entity = self.name(), %key, "row deleted");

        Ok(true)
    }

    fn check_row(&self, row: &[Value]) -> Result<(), InternalError> {
        let expected = self.model.slot_count();
        if row.len() == expected {
            return Ok(());
        }

        Err(InternalError::new(
            ErrorClass::InvariantViolation,
            ErrorOrigin::Table,
            format!(
                "{} row has {} value(s), expected {expected}",
                self.name(),
                row.len()
            ),
        ))
    }

    fn slot(&self, key: &Key) -> Option<Arc<Slot>> {
        self.slots.read().get(key).cloned()
    }

    fn slot_or_insert(&self, key: &Key) -> Arc<Slot> {
        if let Some(slot) = self.slot(key) {
            return slot;
        }

        Arc::clone(self.slots.write().entry(key.clone()).or_default())
    }

    fn lock<'s>(
        &self,
        key: &Key,
        slot: &'s Slot,
    ) -> Result<MutexGuard<'s, SlotState>, InternalError> {
        if !HeldKey::nested() {
            return Ok(slot.lock());
        }

        slot.try_lock_for(self.lock_timeout).ok_or_else(|| {
            InternalError::table_conflict(format!(
                "timed out after {:?} waiting for {}({key}) while holding another key",
                self.lock_timeout,
                self.name()
            ))
        })
    }

    fn store_new(&self, state: &mut SlotState, record: Record) {
        state.record = Some(record);
        self.rows.fetch_add(1, Ordering::AcqRel);
    }
}
