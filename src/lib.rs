//! # parallel-processor - fixed-width parallel map
//!
//! Apply a transformation to every element of a slice, splitting the work
//! across a fixed number of worker threads, and compare the result against a
//! single-threaded reference.
//!
//! ## Quick Start
//!
//! ```rust
//! use parallel_processor::{sequential_map, ParallelProcessor};
//!
//! let pixels: Vec<i32> = (0..1_000).collect();
//! let processor = ParallelProcessor::new(4);
//!
//! let brighten = |p: &i32| (p + 50).clamp(0, 255);
//! let parallel = processor.parallel_map(&pixels, brighten);
//! let sequential = sequential_map(&pixels, brighten);
//!
//! assert_eq!(parallel, sequential);
//! assert_eq!(parallel[0], 50);
//! assert_eq!(parallel[999], 255);
//! ```
//!
//! ## Architecture
//!
//! ```text
//! caller → ParallelProcessor → partition(n, t) → one worker per partition → join all → Vec<Out>
//! ```
//!
//! - [`partition`] - contiguous ranges covering `[0, n)` exactly once
//! - [`ParallelProcessor`] - spawns scoped threads per call and joins them
//! - [`sequential_map`] - in-order reference on the calling thread
//! - [`timing::compare`] - wall-clock speedup of parallel over sequential
//!
//! Every worker gets an exclusive `&mut` chunk of the output, cut along
//! partition boundaries, so workers never share a slot and the output needs
//! no lock.
//!
//! ## Error Handling
//!
//! [`ParallelProcessor::try_parallel_map`] runs a fallible transformation.
//! [`FailurePolicy::FailFast`] stops the remaining workers and returns the
//! lowest failing index observed; [`FailurePolicy::CollectAll`] attempts
//! every element and returns all failures. A panicking element is caught and
//! reported alongside the errors instead of aborting the map:
//!
//! ```rust
//! use parallel_processor::{FailurePolicy, MapError, ParallelConfig, ParallelProcessor, ThreadCount};
//!
//! let input = vec!["1", "two", "3", "four"];
//! let config = ParallelConfig::with_threads(ThreadCount::new(2))
//!     .failure_policy(FailurePolicy::CollectAll);
//!
//! let err = ParallelProcessor::with_config(config)
//!     .try_parallel_map(&input, |s| s.parse::<i32>())
//!     .unwrap_err();
//! assert_eq!(err.failed_indices(), vec![1, 3]);
//! assert!(matches!(err, MapError::Aggregate { .. }));
//! ```
//!
//! ## Configuration
//!
//! [`ParallelConfig::from_env`] reads `PARMAP_THREADS` (`auto` or an
//! integer, zero or negative meaning auto) and `PARMAP_FAILURE_POLICY`
//! (`fail-fast` or `collect-all`).

pub mod error;
pub mod parallel;
pub mod timing;

pub use error::{Error, ErrorSeverity, MapError, Result};
pub use parallel::{
    parallel_map, partition, sequential_map, try_parallel_map, try_sequential_map,
    FailurePolicy, ParallelConfig, ParallelProcessor, Partition, ThreadCount,
};
