pub mod entity_store;
pub mod registry;
pub mod table;
pub mod unit;
pub mod update;


use crate::{
    error::InternalError,
    model::EntityModel,
    obs::{MemoryMetrics, MetricsReport, MetricsSink, NoopSink, StorageReport, TableSnapshot},
};
use chainstore_schema::registry::SchemaRegistry;
use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};
use tracing::debug;

// re-exports
pub use entity_store::EntityStore;
pub use registry::{TableRegistry, TableRegistryError};
pub use table::EntityTable;
pub use unit::{UnitOfWork, UnitReport};
pub use update::{HandlerError, RowUpdate, Update};

///
/// DbOptions
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct DbOptions {
    /// Log every store call at `info` instead of `debug`.
    pub debug: bool,

    /// Keep in-memory counters readable through [`Db::metrics`].
    pub metrics: bool,

    /// Longest wait for a key while the thread already holds another one.
    pub lock_timeout: Duration,
}

impl DbOptions {
    pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

    #[must_use]
    pub const fn debug(mut self) -> Self {
        self.debug = true;
        self
    }

    #[must_use]
    pub const fn without_metrics(mut self) -> Self {
        self.metrics = false;
        self
    }

    #[must_use]
    pub const fn lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }
}

impl Default for DbOptions {
    fn default() -> Self {
        Self {
            debug: false,
            metrics: true,
            lock_timeout: Self::DEFAULT_LOCK_TIMEOUT,
        }
    }
}

///
/// Db
///
/// Root handle: one entity table per declared entity type, the metrics
/// sink, and the unit sequence. Cheap to clone; clones share all tables.
///

#[derive(Clone)]
pub struct Db {
    inner: Arc<DbInner>,
}

struct DbInner {
    tables: TableRegistry,
    options: DbOptions,
    sink: Arc<dyn MetricsSink>,
    memory: Option<Arc<MemoryMetrics>>,
    units: AtomicU64,
}

impl Db {
    /// Build tables for every entity the registry declares.
    pub fn new(schema: &impl SchemaRegistry, options: DbOptions) -> Result<Self, InternalError> {
        let memory = options.metrics.then(|| Arc::new(MemoryMetrics::new()));
        let sink: Arc<dyn MetricsSink> = match &memory {
            Some(memory) => Arc::clone(memory) as Arc<dyn MetricsSink>,
            None => Arc::new(NoopSink),
        };

        Self::build(schema, options, sink, memory)
    }

    /// Build with a caller-supplied sink; [`Db::metrics`] then returns `None`.
    pub fn with_sink(
        schema: &impl SchemaRegistry,
        options: DbOptions,
        sink: Arc<dyn MetricsSink>,
    ) -> Result<Self, InternalError> {
        Self::build(schema, options, sink, None)
    }

    fn build(
        schema: &impl SchemaRegistry,
        options: DbOptions,
        sink: Arc<dyn MetricsSink>,
        memory: Option<Arc<MemoryMetrics>>,
    ) -> Result<Self, InternalError> {
        let mut tables = TableRegistry::new();
        for def in schema.entities() {
            let model = EntityModel::resolve(def, schema)?;
            tables.register(EntityTable::new(Arc::new(model), options.lock_timeout))?;
        }
        debug!(tables = tables.len(), "db ready");

        Ok(Self {
            inner: Arc::new(DbInner {
                tables,
                options,
                sink,
                memory,
                units: AtomicU64::new(0),
            }),
        })
    }

    /// Open a unit of work; `label` identifies it in logs and its report.
    #[must_use]
    pub fn begin_unit(&self, label: impl Into<String>) -> UnitOfWork {
        let sequence = self.inner.units.fetch_add(1, Ordering::Relaxed) + 1;

        UnitOfWork::new(self.clone(), label.into(), sequence)
    }

    #[must_use]
    pub fn options(&self) -> DbOptions {
        self.inner.options
    }

    #[must_use]
    pub fn debug(&self) -> bool {
        self.inner.options.debug
    }

    /// Declared entity names in schema order.
    #[must_use]
    pub fn entity_names(&self) -> Vec<&str> {
        self.inner.tables.iter().map(|t| t.name()).collect()
    }

    /// Snapshot of the in-memory counters, when enabled.
    #[must_use]
    pub fn metrics(&self) -> Option<MetricsReport> {
        self.inner.memory.as_ref().map(|m| m.report())
    }

    /// Reset the in-memory counters, when enabled.
    pub fn reset_metrics(&self) {
        if let Some(memory) = &self.inner.memory {
            memory.reset();
        }
    }

    /// Live row counts per table.
    #[must_use]
    pub fn storage_report(&self) -> StorageReport {
        let tables: Vec<_> = self
            .inner
            .tables
            .iter()
            .map(|t| TableSnapshot {
                entity: t.name().to_string(),
                rows: t.len() as u64,
            })
            .collect();
        let total_rows = tables.iter().map(|t| t.rows).sum();

        StorageReport { tables, total_rows }
    }

    pub(crate) fn table(&self, entity: &str) -> Result<&Arc<EntityTable>, InternalError> {
        self.inner.tables.try_get(entity)
    }

    pub(crate) fn sink(&self) -> Arc<dyn MetricsSink> {
        Arc::clone(&self.inner.sink)
    }
}

impl fmt::Debug for Db {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Db")
            .field("entities", &self.entity_names())
            .field("options", &self.inner.options)
            .finish_non_exhaustive()
    }
}
