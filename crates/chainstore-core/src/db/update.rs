use crate::{
    error::InternalError,
    record::{Data, Record, RowPatch},
};
use std::{error::Error as StdError, fmt};

/// Error type update functions may return.
pub type HandlerError = Box<dyn StdError + Send + Sync>;

type DataFn<'f> = Box<dyn FnOnce(&Record) -> Result<Data, HandlerError> + 'f>;
type PatchFn<'f> = Box<dyn FnOnce(&Record) -> Result<RowPatch, InternalError> + 'f>;

///
/// Update
///
/// Handler-facing update: either literal field values or a function of the
/// current record. Both shapes end in the same merge.
///

pub enum Update<'f> {
    Literal(Data),
    Function(DataFn<'f>),
}

impl<'f> Update<'f> {
    /// Update computed from the current record.
    ///
    /// The function runs while the record's key is held; calling back into
    /// the store for the same key fails with a conflict.
    pub fn with<F, E>(f: F) -> Self
    where
        F: FnOnce(&Record) -> Result<Data, E> + 'f,
        E: Into<HandlerError>,
    {
        Self::Function(Box::new(move |current| f(current).map_err(Into::into)))
    }

    /// Infallible variant of [`Update::with`].
    pub fn map<F>(f: F) -> Self
    where
        F: FnOnce(&Record) -> Data + 'f,
    {
        Self::Function(Box::new(move |current| Ok(f(current))))
    }
}

impl From<Data> for Update<'_> {
    fn from(data: Data) -> Self {
        Self::Literal(data)
    }
}

impl fmt::Debug for Update<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(data) => f.debug_tuple("Literal").field(data).finish(),
            Self::Function(_) => f.write_str("Function(..)"),
        }
    }
}

///
/// RowUpdate
///
/// Slot-level update consumed by an entity table. The table resolves it
/// against the current record, then merges the patch.
///

pub enum RowUpdate<'f> {
    Literal(RowPatch),
    Function(PatchFn<'f>),
}

impl<'f> RowUpdate<'f> {
    pub fn function<F>(f: F) -> Self
    where
        F: FnOnce(&Record) -> Result<RowPatch, InternalError> + 'f,
    {
        Self::Function(Box::new(f))
    }

    pub(crate) fn resolve(self, current: &Record) -> Result<RowPatch, InternalError> {
        match self {
            Self::Literal(patch) => Ok(patch),
            Self::Function(f) => f(current),
        }
    }
}

impl From<RowPatch> for RowUpdate<'_> {
    fn from(patch: RowPatch) -> Self {
        Self::Literal(patch)
    }
}

impl fmt::Debug for RowUpdate<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(patch) => f.debug_tuple("Literal").field(patch).finish(),
            Self::Function(_) => f.write_str("Function(..)"),
        }
    }
}
