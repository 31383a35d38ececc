//! Observability: runtime metrics, the sink abstraction, and table
//! snapshots.
//!
//! This module never reads table internals; snapshots are produced by `db`.

pub(crate) mod metrics;
pub(crate) mod sink;
pub(crate) mod snapshot;

// re-exports
pub use metrics::{EntityCounters, ExecPerf, MemoryMetrics, MetricsReport};
pub use sink::{ExecKind, MetricsEvent, MetricsSink, NoopSink, RowEffect};
pub use snapshot::{StorageReport, TableSnapshot};
