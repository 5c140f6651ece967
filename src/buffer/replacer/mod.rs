//! Eviction policy implementations for the buffer pool.

mod fifo;

pub use fifo::FifoReplacer;
