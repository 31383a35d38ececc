use crate::{
    error::ErrorClass,
    obs::sink::{ExecKind, MetricsEvent, MetricsSink, RowEffect},
};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::BTreeMap;

///
/// EntityCounters
/// Call and row counters for one entity type (or the whole store).
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct EntityCounters {
    // entrypoints
    pub create_calls: u64,
    pub update_calls: u64,
    pub upsert_calls: u64,
    pub find_calls: u64,
    pub delete_calls: u64,

    // rows
    pub rows_created: u64,
    pub rows_updated: u64,
    pub rows_deleted: u64,
    pub rows_read: u64,
    pub misses: u64,

    // failures
    pub errors: u64,
    pub conflicts: u64,
    pub validation_errors: u64,
}

impl EntityCounters {
    fn call(&mut self, kind: ExecKind) {
        let slot = match kind {
            ExecKind::Create => &mut self.create_calls,
            ExecKind::Delete => &mut self.delete_calls,
            ExecKind::Find => &mut self.find_calls,
            ExecKind::Update => &mut self.update_calls,
            ExecKind::Upsert => &mut self.upsert_calls,
        };
        *slot = slot.saturating_add(1);
    }

    fn effect(&mut self, effect: RowEffect) {
        let slot = match effect {
            RowEffect::Created => &mut self.rows_created,
            RowEffect::Deleted => &mut self.rows_deleted,
            RowEffect::Missing => &mut self.misses,
            RowEffect::Read => &mut self.rows_read,
            RowEffect::Updated => &mut self.rows_updated,
        };
        *slot = slot.saturating_add(1);
    }

    fn error(&mut self, class: ErrorClass) {
        self.errors = self.errors.saturating_add(1);
        match class {
            ErrorClass::Conflict => self.conflicts = self.conflicts.saturating_add(1),
            ErrorClass::Validation => {
                self.validation_errors = self.validation_errors.saturating_add(1);
            }
            _ => {}
        }
    }

    /// Total store calls across all entrypoints.
    #[must_use]
    pub const fn calls(&self) -> u64 {
        self.create_calls
            .saturating_add(self.update_calls)
            .saturating_add(self.upsert_calls)
            .saturating_add(self.find_calls)
            .saturating_add(self.delete_calls)
    }
}

///
/// ExecPerf
/// Wall-clock totals per entrypoint, in microseconds.
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct ExecPerf {
    pub count: u64,
    pub total_us: u128,
    pub max_us: u64,
}

impl ExecPerf {
    fn add(&mut self, micros: u64) {
        self.count = self.count.saturating_add(1);
        self.total_us = self.total_us.saturating_add(u128::from(micros));
        if micros > self.max_us {
            self.max_us = micros;
        }
    }
}

///
/// MetricsReport
/// Point-in-time copy of the in-memory counters.
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct MetricsReport {
    pub totals: EntityCounters,
    pub perf: BTreeMap<ExecKind, ExecPerf>,
    pub entities: BTreeMap<String, EntityCounters>,
}

impl MetricsReport {
    #[must_use]
    pub fn entity(&self, name: &str) -> Option<&EntityCounters> {
        self.entities.get(name)
    }
}

///
/// MemoryMetrics
/// Process-local sink accumulating counters behind a mutex.
///

#[derive(Debug, Default)]
pub struct MemoryMetrics {
    state: Mutex<MetricsReport>,
}

impl MemoryMetrics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn report(&self) -> MetricsReport {
        self.state.lock().clone()
    }

    /// Reset all counters (useful in tests).
    pub fn reset(&self) {
        *self.state.lock() = MetricsReport::default();
    }

    fn with_entity(&self, entity: &str, f: impl Fn(&mut EntityCounters)) {
        let mut state = self.state.lock();
        f(&mut state.totals);
        f(state.entities.entry(entity.to_string()).or_default());
    }
}

impl MetricsSink for MemoryMetrics {
    fn record(&self, event: MetricsEvent<'_>) {
        match event {
            MetricsEvent::ExecStart { kind, entity } => {
                self.with_entity(entity, |c| c.call(kind));
            }

            MetricsEvent::ExecFinish {
                kind,
                entity,
                effect,
                micros,
            } => {
                self.with_entity(entity, |c| c.effect(effect));
                self.state.lock().perf.entry(kind).or_default().add(micros);
            }

            MetricsEvent::ExecError {
                kind: _,
                entity,
                class,
            } => {
                self.with_entity(entity, |c| c.error(class));
            }
        }
    }
}
