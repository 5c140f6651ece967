//! Statistics layer - histograms and cost estimates for the optimizer.
//!
//! This module contains:
//! - [`IntHistogram`] / [`StringHistogram`] - equi-width per-column
//!   frequency histograms with O(1) updates and no raw value retention
//! - [`TableStats`] - per-table cost/selectivity/cardinality estimates
//! - [`StatsService`] - the owned name-keyed registry handed to the
//!   optimizer

mod int_histogram;
mod service;
mod string_histogram;
mod table_stats;

pub use int_histogram::IntHistogram;
pub use service::StatsService;
pub use string_histogram::StringHistogram;
pub use table_stats::{ColumnHistogram, TableStats};

/// Number of buckets in every per-column histogram.
pub const NUM_HIST_BUCKETS: usize = 100;

/// Default estimated cost of reading one page.
pub const DEFAULT_IO_COST_PER_PAGE: f64 = 1000.0;
