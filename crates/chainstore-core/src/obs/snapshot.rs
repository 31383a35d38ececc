use serde::Serialize;

///
/// StorageReport
/// Live row counts per entity table.
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct StorageReport {
    pub tables: Vec<TableSnapshot>,
    pub total_rows: u64,
}

impl StorageReport {
    #[must_use]
    pub fn rows(&self, entity: &str) -> Option<u64> {
        self.tables
            .iter()
            .find(|t| t.entity == entity)
            .map(|t| t.rows)
    }
}

///
/// TableSnapshot
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct TableSnapshot {
    pub entity: String,
    pub rows: u64,
}
