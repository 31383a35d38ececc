use crate::{
    db::{Db, entity_store::EntityStore},
    error::InternalError,
    obs::RowEffect,
};
use serde::Serialize;
use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Instant,
};
use tracing::{debug, info};

///
/// UnitCounters
/// Shared between a unit and every `EntityStore` it hands out.
///

#[derive(Debug, Default)]
pub(crate) struct UnitCounters {
    calls: AtomicU64,
    created: AtomicU64,
    updated: AtomicU64,
    deleted: AtomicU64,
    read: AtomicU64,
    missing: AtomicU64,
    errors: AtomicU64,
}

impl UnitCounters {
    pub(crate) fn call(&self) {
        self.calls.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn effect(&self, effect: RowEffect) {
        let counter = match effect {
            RowEffect::Created => &self.created,
            RowEffect::Deleted => &self.deleted,
            RowEffect::Missing => &self.missing,
            RowEffect::Read => &self.read,
            RowEffect::Updated => &self.updated,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }
}

///
/// UnitReport
/// Summary of one finished unit of work.
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct UnitReport {
    pub label: String,
    pub sequence: u64,
    pub calls: u64,
    pub created: u64,
    pub updated: u64,
    pub deleted: u64,
    pub read: u64,
    pub missing: u64,
    pub errors: u64,
    pub elapsed_us: u64,
}

impl UnitReport {
    /// Rows written (created, updated or deleted) by the unit.
    #[must_use]
    pub const fn writes(&self) -> u64 {
        self.created + self.updated + self.deleted
    }
}

///
/// UnitOfWork
///
/// Context for one handler invocation. Units only scope reporting; every
/// write is visible to later calls as soon as it returns, in this unit and
/// all later ones.
///

#[derive(Debug)]
pub struct UnitOfWork {
    db: Db,
    label: String,
    sequence: u64,
    started: Instant,
    counters: Arc<UnitCounters>,
}

impl UnitOfWork {
    pub(crate) fn new(db: Db, label: String, sequence: u64) -> Self {
        if db.debug() {
            info!(unit = %label, sequence, "unit of work started");
        } else {
            debug!(unit = %label, sequence, "unit of work started");
        }

        Self {
            db,
            label,
            sequence,
            started: Instant::now(),
            counters: Arc::new(UnitCounters::default()),
        }
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub const fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Store facade for one declared entity type.
    pub fn entity(&self, name: &str) -> Result<EntityStore, InternalError> {
        let table = self.db.table(name)?;

        Ok(EntityStore::new(
            Arc::clone(table),
            Arc::clone(&self.counters),
            self.db.sink(),
            self.db.debug(),
        ))
    }

    /// Close the unit and report what it did.
    #[must_use]
    pub fn finish(self) -> UnitReport {
        let load = |c: &AtomicU64| c.load(Ordering::Relaxed);
        let c = &self.counters;

        let report = UnitReport {
            label: self.label,
            sequence: self.sequence,
            calls: load(&c.calls),
            created: load(&c.created),
            updated: load(&c.updated),
            deleted: load(&c.deleted),
            read: load(&c.read),
            missing: load(&c.missing),
            errors: load(&c.errors),
            elapsed_us: u64::try_from(self.started.elapsed().as_micros()).unwrap_or(u64::MAX),
        };

        if self.db.debug() {
            info!(
                unit = %report.label,
                sequence = report.sequence,
                calls = report.calls,
                writes = report.writes(),
                errors = report.errors,
                "unit of work finished"
            );
        } else {
            debug!(
                unit = %report.label,
                sequence = report.sequence,
                calls = report.calls,
                writes = report.writes(),
                errors = report.errors,
                "unit of work finished"
            );
        }

        report
    }
}
