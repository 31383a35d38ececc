//! Metrics sink boundary.
//!
//! Store logic never touches counters directly; all instrumentation flows
//! through `MetricsEvent` into the `MetricsSink` owned by the `Db`.
use crate::error::ErrorClass;
use serde::Serialize;
use std::{fmt, time::Instant};

///
/// ExecKind
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "snake_case")]
#[remain::sorted]
pub enum ExecKind {
    Create,
    Delete,
    Find,
    Update,
    Upsert,
}

impl fmt::Display for ExecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Create => "create",
            Self::Delete => "delete",
            Self::Find => "find",
            Self::Update => "update",
            Self::Upsert => "upsert",
        };
        f.write_str(label)
    }
}

///
/// RowEffect
///
/// What a successful operation did to its row.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[remain::sorted]
pub enum RowEffect {
    Created,
    Deleted,
    Missing,
    Read,
    Updated,
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug)]
pub enum MetricsEvent<'a> {
    ExecStart {
        kind: ExecKind,
        entity: &'a str,
    },
    ExecFinish {
        kind: ExecKind,
        entity: &'a str,
        effect: RowEffect,
        micros: u64,
    },
    ExecError {
        kind: ExecKind,
        entity: &'a str,
        class: ErrorClass,
    },
}

///
/// MetricsSink
///

pub trait MetricsSink: Send + Sync {
    fn record(&self, event: MetricsEvent<'_>);
}

///
/// NoopSink
/// Sink used when metrics are disabled.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl MetricsSink for NoopSink {
    fn record(&self, _: MetricsEvent<'_>) {}
}

///
/// Span
///
/// RAII guard emitting start/finish events for one store call.
/// A span dropped without `finish` or `fail` records nothing further.
///

pub(crate) struct Span<'a> {
    sink: &'a dyn MetricsSink,
    kind: ExecKind,
    entity: &'a str,
    start: Instant,
}

impl<'a> Span<'a> {
    pub(crate) fn new(sink: &'a dyn MetricsSink, kind: ExecKind, entity: &'a str) -> Self {
        sink.record(MetricsEvent::ExecStart { kind, entity });

        Self {
            sink,
            kind,
            entity,
            start: Instant::now(),
        }
    }

    pub(crate) fn finish(self, effect: RowEffect) {
        let micros = u64::try_from(self.start.elapsed().as_micros()).unwrap_or(u64::MAX);

        self.sink.record(MetricsEvent::ExecFinish {
            kind: self.kind,
            entity: self.entity,
            effect,
            micros,
        });
    }

    pub(crate) fn fail(self, class: ErrorClass) {
        self.sink.record(MetricsEvent::ExecError {
            kind: self.kind,
            entity: self.entity,
            class,
        });
    }
}
