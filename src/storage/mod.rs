//! Storage layer - heap files and their slotted pages.
//!
//! This module handles persistent tuple storage:
//! - [`HeapPage`] - fixed-size slotted page with an occupancy bitmap
//! - [`HeapFile`] - page-granular file I/O and tuple placement
//! - [`HeapFileIterator`] - lazy per-file tuple enumeration

mod heap_file;
mod heap_page;

pub use heap_file::{HeapFile, HeapFileIterator};
pub use heap_page::HeapPage;
