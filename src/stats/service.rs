//! Statistics service - the owned registry the optimizer reads from.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::info;

use crate::buffer::BufferPool;
use crate::catalog::Catalog;
use crate::common::Result;
use crate::stats::table_stats::TableStats;
use crate::stats::DEFAULT_IO_COST_PER_PAGE;

/// Name-keyed registry of [`TableStats`], constructed once and handed to
/// the optimizer. Not process-global state.
///
/// [`StatsService::compute_statistics`] rebuilds the registry wholesale,
/// one table at a time: each table's entry is published as soon as it is
/// computed, so concurrent readers may briefly see a mix of old and new
/// statistics. Readers tolerate that staleness; there is no cross-table
/// atomic swap.
pub struct StatsService {
    io_cost_per_page: f64,
    stats: RwLock<HashMap<String, Arc<TableStats>>>,
}

impl StatsService {
    /// Create a service estimating with the default per-page I/O cost.
    pub fn new() -> Self {
        Self::with_io_cost(DEFAULT_IO_COST_PER_PAGE)
    }

    /// Create a service estimating with the given per-page I/O cost.
    pub fn with_io_cost(io_cost_per_page: f64) -> Self {
        Self {
            io_cost_per_page,
            stats: RwLock::new(HashMap::new()),
        }
    }

    /// The statistics for `table_name`, if computed.
    pub fn table_stats(&self, table_name: &str) -> Option<Arc<TableStats>> {
        self.stats.read().get(table_name).cloned()
    }

    /// Install statistics for `table_name`, replacing any previous entry.
    pub fn set_table_stats(&self, table_name: &str, stats: TableStats) {
        self.stats
            .write()
            .insert(table_name.to_string(), Arc::new(stats));
    }

    /// Recompute statistics for every table in the catalog.
    ///
    /// Each table costs two full scans; entries are published per table as
    /// they complete.
    pub fn compute_statistics(&self, catalog: &Catalog, pool: &Arc<BufferPool>) -> Result<()> {
        info!("computing table statistics");
        for table_id in catalog.table_ids() {
            let stats = TableStats::new(table_id, self.io_cost_per_page, catalog, pool)?;
            let name = catalog.table_name(table_id)?;
            self.stats.write().insert(name, Arc::new(stats));
        }
        info!("table statistics complete");
        Ok(())
    }
}

impl Default for StatsService {
    fn default() -> Self {
        Self::new()
    }
}
