//! Per-table statistics for cost-based planning.

use std::sync::Arc;

use crate::buffer::BufferPool;
use crate::catalog::Catalog;
use crate::common::{Result, TransactionId};
use crate::execution::DbIterator;
use crate::stats::{IntHistogram, StringHistogram, NUM_HIST_BUCKETS};
use crate::tuple::{Field, FieldType, Op};

/// Histogram over one column, tagged by the column's value kind.
#[derive(Debug, Clone)]
pub enum ColumnHistogram {
    Int(IntHistogram),
    Str(StringHistogram),
}

/// Statistics about one base table: per-column histograms, integer column
/// bounds, tuple and page counts, and the configured per-page I/O cost.
///
/// Built by exactly two full sequential scans: the first finds each
/// integer column's `(min, max)` and the tuple count, the second streams
/// every value into its column's histogram. Two passes are required
/// because bucket boundaries need the global bounds up front.
///
/// Histograms are keyed by column index: field names may repeat or be
/// absent, so they cannot key anything.
pub struct TableStats {
    table_id: u32,
    io_cost_per_page: f64,
    total_tuples: usize,
    num_pages: u32,
    histograms: Vec<ColumnHistogram>,
    /// Per-column `(min, max)`; `None` for string columns and for any
    /// column of an empty table.
    bounds: Vec<Option<(i32, i32)>>,
}

impl TableStats {
    /// Scan `table_id` twice and compute its statistics.
    ///
    /// The scans run under a fresh transaction and route through the
    /// buffer pool like any other read.
    pub fn new(
        table_id: u32,
        io_cost_per_page: f64,
        catalog: &Catalog,
        pool: &Arc<BufferPool>,
    ) -> Result<Self> {
        let file = catalog.file(table_id)?;
        let desc = file.tuple_desc().clone();
        let tid = TransactionId::new();
        let mut iter = file.iterator(tid, Arc::clone(pool));

        // Pass 1: tuple count and integer column bounds.
        let mut bounds: Vec<Option<(i32, i32)>> = vec![None; desc.num_fields()];
        let mut total_tuples = 0;
        iter.open()?;
        while let Some(t) = iter.next()? {
            total_tuples += 1;
            for (i, bound) in bounds.iter_mut().enumerate() {
                if let Field::Int(v) = t.field(i) {
                    *bound = Some(match *bound {
                        Some((min, max)) => (min.min(*v), max.max(*v)),
                        None => (*v, *v),
                    });
                }
            }
        }
        iter.close();

        // Pass 2: one histogram per column over the discovered bounds.
        let mut histograms: Vec<ColumnHistogram> = (0..desc.num_fields())
            .map(|i| match desc.field_type(i) {
                FieldType::Int => {
                    let (min, max) = bounds[i].unwrap_or((0, 0));
                    ColumnHistogram::Int(IntHistogram::new(NUM_HIST_BUCKETS, min, max))
                }
                FieldType::Str => ColumnHistogram::Str(StringHistogram::new(NUM_HIST_BUCKETS)),
            })
            .collect();

        iter.open()?;
        while let Some(t) = iter.next()? {
            for (i, hist) in histograms.iter_mut().enumerate() {
                match (hist, t.field(i)) {
                    (ColumnHistogram::Int(h), Field::Int(v)) => h.add_value(*v),
                    (ColumnHistogram::Str(h), Field::Str(s)) => h.add_value(s),
                    _ => unreachable!("histogram kind follows the column type"),
                }
            }
        }
        iter.close();

        Ok(Self {
            table_id,
            io_cost_per_page,
            total_tuples,
            num_pages: file.num_pages()?,
            histograms,
            bounds,
        })
    }

    /// The table these statistics describe.
    #[inline]
    pub fn table_id(&self) -> u32 {
        self.table_id
    }

    /// Total number of tuples in the table at build time.
    #[inline]
    pub fn total_tuples(&self) -> usize {
        self.total_tuples
    }

    /// `(min, max)` of integer column `field`, if the table had any rows.
    pub fn int_bounds(&self, field: usize) -> Option<(i32, i32)> {
        self.bounds[field]
    }

    /// Estimated cost of a full sequential scan: every page costs the
    /// same, a full page or one tuple alike, with no seek model.
    pub fn estimate_scan_cost(&self) -> f64 {
        self.num_pages as f64 * self.io_cost_per_page
    }

    /// Estimated number of tuples a scan with the given predicate
    /// selectivity produces.
    pub fn estimate_table_cardinality(&self, selectivity: f64) -> usize {
        (self.total_tuples as f64 * selectivity).round() as usize
    }

    /// Estimated selectivity of `field op constant` on this table.
    ///
    /// Dispatches on the constant's declared kind to the column's integer
    /// or string histogram.
    ///
    /// # Panics
    /// Panics if the constant's kind does not match the column's; the
    /// predicate was mistyped at plan time.
    pub fn estimate_selectivity(&self, field: usize, op: Op, constant: &Field) -> f64 {
        match (&self.histograms[field], constant) {
            (ColumnHistogram::Int(h), Field::Int(v)) => h.estimate_selectivity(op, *v),
            (ColumnHistogram::Str(h), Field::Str(s)) => h.estimate_selectivity(op, s),
            (_, constant) => panic!(
                "predicate constant {} does not match column {} type",
                constant, field
            ),
        }
    }
}
