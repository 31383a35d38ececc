use crate::{config::StoreConfig, error::Error};
use chainstore_core::{
    db::{self as core_db, DbOptions, HandlerError, UnitReport},
    error::InternalError,
    obs::{MetricsReport, StorageReport},
    record::{Data, Record},
    value::Value,
};
use chainstore_schema::node::{EntityDef, Schema};
use std::{fmt, sync::Arc};
use tracing::info;

/// Map a core result into the public error surface.
pub(crate) fn map_runtime<T>(res: Result<T, InternalError>) -> Result<T, Error> {
    res.map_err(Error::from)
}

///
/// Store
///
/// Public entry point: the validated schema plus its tables. Cloning is
/// cheap and clones share every table.
///

#[derive(Clone)]
pub struct Store {
    db: core_db::Db,
    schema: Arc<Schema>,
}

impl Store {
    /// Build a store from a config: load the schema, then create one table
    /// per entity.
    pub fn open(config: &StoreConfig) -> Result<Self, Error> {
        let schema = config.schema()?;
        let store = Self::from_schema(schema, config.db_options())?;
        info!(
            entities = store.schema.len(),
            debug = config.debug,
            metrics = config.metrics,
            "store opened"
        );

        Ok(store)
    }

    /// Build a store from an already validated schema.
    pub fn from_schema(schema: Schema, options: DbOptions) -> Result<Self, Error> {
        let db = map_runtime(core_db::Db::new(&schema, options))?;

        Ok(Self {
            db,
            schema: Arc::new(schema),
        })
    }

    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Open a unit of work for one handler invocation.
    #[must_use]
    pub fn begin_unit(&self, label: impl Into<String>) -> UnitOfWork {
        UnitOfWork {
            inner: self.db.begin_unit(label),
        }
    }

    /// In-memory metrics, when enabled.
    #[must_use]
    pub fn metrics(&self) -> Option<MetricsReport> {
        self.db.metrics()
    }

    pub fn reset_metrics(&self) {
        self.db.reset_metrics();
    }

    #[must_use]
    pub fn storage_report(&self) -> StorageReport {
        self.db.storage_report()
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store").field("db", &self.db).finish()
    }
}

///
/// UnitOfWork
///

#[derive(Debug)]
pub struct UnitOfWork {
    inner: core_db::UnitOfWork,
}

impl UnitOfWork {
    #[must_use]
    pub fn label(&self) -> &str {
        self.inner.label()
    }

    #[must_use]
    pub const fn sequence(&self) -> u64 {
        self.inner.sequence()
    }

    /// Store facade for one declared entity type.
    pub fn entity(&self, name: &str) -> Result<EntityStore, Error> {
        map_runtime(self.inner.entity(name)).map(|inner| EntityStore { inner })
    }

    #[must_use]
    pub fn finish(self) -> UnitReport {
        self.inner.finish()
    }
}

///
/// EntityStore
///
/// The five record operations for one entity type. See the core
/// `EntityStore` for the checking rules.
///

#[derive(Clone, Debug)]
pub struct EntityStore {
    inner: core_db::EntityStore,
}

impl EntityStore {
    #[must_use]
    pub fn entity(&self) -> &str {
        self.inner.entity()
    }

    #[must_use]
    pub fn def(&self) -> &Arc<EntityDef> {
        self.inner.def()
    }

    pub fn create(&self, id: impl Into<Value>, data: Data) -> Result<Record, Error> {
        map_runtime(self.inner.create(id, data))
    }

    pub fn update<'f>(
        &self,
        id: impl Into<Value>,
        update: impl Into<Update<'f>>,
    ) -> Result<Record, Error> {
        map_runtime(self.inner.update(id, update.into().inner))
    }

    pub fn upsert<'f>(
        &self,
        id: impl Into<Value>,
        create: Data,
        update: impl Into<Update<'f>>,
    ) -> Result<Record, Error> {
        map_runtime(self.inner.upsert(id, create, update.into().inner))
    }

    pub fn find_unique(&self, id: impl Into<Value>) -> Result<Option<Record>, Error> {
        map_runtime(self.inner.find_unique(id))
    }

    pub fn delete(&self, id: impl Into<Value>) -> Result<bool, Error> {
        map_runtime(self.inner.delete(id))
    }
}

///
/// Update
///
/// Literal field values or a function of the current record.
///

#[derive(Debug)]
pub struct Update<'f> {
    inner: core_db::Update<'f>,
}

impl<'f> Update<'f> {
    /// Update computed from the current record. Returning a store [`Error`]
    /// (from a nested store call) fails the operation with that error's
    /// kind; any other error fails it as [`crate::error::ErrorKind::Handler`].
    pub fn with<F, E>(f: F) -> Self
    where
        F: FnOnce(&Record) -> Result<Data, E> + 'f,
        E: Into<HandlerError>,
    {
        let inner = core_db::Update::with(move |current: &Record| {
            f(current).map_err(|e| {
                let err: HandlerError = e.into();
                match err.downcast::<Error>() {
                    Ok(public) => Box::new(InternalError::from(*public)) as HandlerError,
                    Err(other) => other,
                }
            })
        });

        Self { inner }
    }

    /// Infallible variant of [`Update::with`].
    pub fn map<F>(f: F) -> Self
    where
        F: FnOnce(&Record) -> Data + 'f,
    {
        Self {
            inner: core_db::Update::map(f),
        }
    }
}

impl From<Data> for Update<'_> {
    fn from(data: Data) -> Self {
        Self {
            inner: core_db::Update::Literal(data),
        }
    }
}
