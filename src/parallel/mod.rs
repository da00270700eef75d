//! Fixed-width parallel map
//!
//! Work is split into contiguous partitions, one per worker thread, and the
//! results land in disjoint slots of a single preallocated output.

mod config;
mod executor;
mod partitioner;
mod sequential;
mod worker;

pub use config::{FailurePolicy, ParallelConfig, ThreadCount, FAILURE_POLICY_ENV, THREADS_ENV};
pub use executor::{parallel_map, try_parallel_map, ParallelProcessor};
pub use partitioner::{effective_threads, partition, Partition};
pub use sequential::{sequential_map, try_sequential_map};
