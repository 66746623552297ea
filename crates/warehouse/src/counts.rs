//! Row-count verification for loaded tables.

use playdwh_core::WarehouseTable;
use tracing::info;

use crate::error::WarehouseResult;
use crate::session::WarehouseSession;

/// Row counts for every warehouse table, in canonical order.
#[derive(Debug, Clone)]
pub struct TableCounts {
    entries: Vec<(WarehouseTable, i64)>,
}

impl TableCounts {
    /// Count recorded for `table`.
    pub fn get(&self, table: WarehouseTable) -> Option<i64> {
        self.entries
            .iter()
            .find(|(entry, _)| *entry == table)
            .map(|(_, count)| *count)
    }

    /// All `(table, count)` pairs in canonical order.
    pub fn entries(&self) -> &[(WarehouseTable, i64)] {
        &self.entries
    }

    /// Tables holding no rows. After a full run this usually means a load
    /// or transform was skipped or matched nothing.
    pub fn empty_tables(&self) -> Vec<WarehouseTable> {
        self.entries
            .iter()
            .filter(|(_, count)| *count == 0)
            .map(|(table, _)| *table)
            .collect()
    }

    /// Multi-line report for operator output.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        for (table, count) in &self.entries {
            out.push_str(&format!("{:>16}  {count}\n", table.name()));
        }
        out
    }
}

/// Fetches `COUNT(*)` for every table over `session`.
pub async fn collect_table_counts(session: &mut WarehouseSession) -> WarehouseResult<TableCounts> {
    let mut entries = Vec::with_capacity(WarehouseTable::ALL.len());
    for table in WarehouseTable::ALL {
        let count = session.count_rows(table).await?;
        info!(table = %table, count, "table row count");
        entries.push((table, count));
    }
    Ok(TableCounts { entries })
}
