//! Parallel executor
//!
//! Spawns one scoped thread per partition, joins them all, and hands back
//! the fully populated output. Output slots are split along partition
//! boundaries with `split_at_mut`, so every worker holds an exclusive borrow
//! of its own slots and no lock guards the output.

use super::config::{FailurePolicy, ParallelConfig, ThreadCount};
use super::partitioner::{partition, Partition};
use super::worker::{self, panic_message, Failure, Slot};
use crate::error::{Error, MapError};
use std::panic;
use std::sync::atomic::AtomicBool;
use std::thread;
use tracing::{debug, trace, warn};

/// Fixed-width parallel mapper
///
/// Holds only configuration; threads are spawned per call and joined
/// before the call returns.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParallelProcessor {
    config: ParallelConfig,
}

impl ParallelProcessor {
    /// Processor with `threads` workers and fail-fast error handling
    ///
    /// Zero means one worker per hardware thread.
    pub fn new(threads: usize) -> Self {
        Self::with_config(ParallelConfig::with_threads(ThreadCount::new(threads)))
    }

    /// Processor with a full configuration
    pub fn with_config(config: ParallelConfig) -> Self {
        Self { config }
    }

    /// Active configuration
    pub fn config(&self) -> &ParallelConfig {
        &self.config
    }

    /// Resolved thread count before capping by input length
    pub fn threads(&self) -> usize {
        self.config.threads.resolve()
    }

    /// Partitions a call over `n` elements would use
    pub fn plan(&self, n: usize) -> Vec<Partition> {
        partition(n, self.threads())
    }

    /// Apply `f` to every element, spreading the work over the worker threads
    ///
    /// `output[i] == f(&input[i])` for every `i`. A panic inside `f` is
    /// resumed on the calling thread once every worker has been joined.
    ///
    /// # Example
    /// ```
    /// use parallel_processor::ParallelProcessor;
    ///
    /// let pixels: Vec<i32> = (0..1000).collect();
    /// let bright = ParallelProcessor::new(4).parallel_map(&pixels, |p| (p + 50).clamp(0, 255));
    /// assert_eq!(bright[100], 150);
    /// assert_eq!(bright[999], 255);
    /// ```
    pub fn parallel_map<T, Out, F>(&self, input: &[T], f: F) -> Vec<Out>
    where
        T: Sync,
        Out: Send,
        F: Fn(&T) -> Out + Sync,
    {
        let n = input.len();
        if n == 0 {
            return Vec::new();
        }

        let partitions = self.plan(n);
        debug!(
            elements = n,
            workers = partitions.len(),
            "dispatching parallel map"
        );

        let mut slots = empty_slots(n);
        let f = &f;

        thread::scope(|scope| {
            let handles: Vec<_> = partitions
                .iter()
                .copied()
                .zip(split_slots(&mut slots, &partitions))
                .enumerate()
                .map(|(id, (part, out))| {
                    let input = &input[part.range()];
                    scope.spawn(move || {
                        trace!(worker = id, start = part.start, end = part.end, "worker started");
                        worker::run(input, out, f);
                        trace!(worker = id, "worker finished");
                    })
                })
                .collect();

            let mut first_panic = None;
            for (id, handle) in handles.into_iter().enumerate() {
                if let Err(payload) = handle.join() {
                    warn!(worker = id, "worker panicked: {}", panic_message(&*payload));
                    first_panic.get_or_insert(payload);
                }
            }
            if let Some(payload) = first_panic {
                panic::resume_unwind(payload);
            }
        });

        collect_slots(slots)
    }

    /// Fallible parallel map
    ///
    /// Failure handling follows the configured [`FailurePolicy`]:
    ///
    /// - `FailFast`: the first failing worker signals the others to stop
    ///   before their next element. Once all have joined, the lowest failing
    ///   index observed is returned as [`MapError::Failed`], or as
    ///   [`Error::WorkerPanicked`] wrapped in [`MapError::Runtime`] when that
    ///   element panicked.
    /// - `CollectAll`: every element is attempted, including the rest of a
    ///   partition after a panic. Errors and panics come back together as
    ///   [`MapError::Aggregate`], each sorted by index.
    ///
    /// Panics are caught per element. No partial output is returned on any
    /// failure.
    pub fn try_parallel_map<T, Out, E, F>(&self, input: &[T], f: F) -> Result<Vec<Out>, MapError<E>>
    where
        T: Sync,
        Out: Send,
        E: Send,
        F: Fn(&T) -> Result<Out, E> + Sync,
    {
        let n = input.len();
        if n == 0 {
            return Ok(Vec::new());
        }

        let partitions = self.plan(n);
        let policy = self.config.failure_policy;
        debug!(
            elements = n,
            workers = partitions.len(),
            %policy,
            "dispatching fallible parallel map"
        );

        let mut slots = empty_slots(n);
        let stop = AtomicBool::new(false);
        let stop_on_error = policy == FailurePolicy::FailFast;
        let f = &f;
        let stop = &stop;

        let outcomes: Vec<WorkerOutcome<E>> = thread::scope(|scope| {
            let handles: Vec<_> = partitions
                .iter()
                .copied()
                .zip(split_slots(&mut slots, &partitions))
                .enumerate()
                .map(|(id, (part, out))| {
                    let input = &input[part.range()];
                    scope.spawn(move || -> Vec<(usize, Failure<E>)> {
                        trace!(worker = id, start = part.start, end = part.end, "worker started");
                        worker::try_run(input, out, f, stop, stop_on_error)
                            .into_iter()
                            .map(|(local, failure)| (part.start + local, failure))
                            .collect()
                    })
                })
                .collect();

            handles
                .into_iter()
                .map(|handle| handle.join().map_err(|payload| panic_message(&*payload)))
                .collect()
        });

        let mut failures = Vec::new();
        for (id, outcome) in outcomes.into_iter().enumerate() {
            match outcome {
                Ok(worker_failures) => {
                    failures.extend(worker_failures.into_iter().map(|(i, failure)| (i, id, failure)))
                }
                Err(message) => {
                    warn!(worker = id, "worker panicked: {}", message);
                    return Err(Error::WorkerPanicked { worker: id, message }.into());
                }
            }
        }

        if failures.is_empty() {
            return Ok(collect_slots(slots));
        }

        warn!(failures = failures.len(), %policy, "parallel map failed");
        match policy {
            FailurePolicy::FailFast => match failures.swap_remove(0) {
                (index, _, Failure::Error(error)) => Err(MapError::Failed { index, error }),
                (index, worker, Failure::Panic(message)) => {
                    warn!(worker, index, "worker panicked: {}", message);
                    Err(Error::WorkerPanicked { worker, message }.into())
                }
            },
            FailurePolicy::CollectAll => {
                let mut errors = Vec::new();
                let mut panics = Vec::new();
                for (index, _, failure) in failures {
                    match failure {
                        Failure::Error(error) => errors.push((index, error)),
                        Failure::Panic(message) => panics.push((index, message)),
                    }
                }
                Err(MapError::Aggregate {
                    failures: errors,
                    panics,
                })
            }
        }
    }
}

/// Map `input` through `f` on `threads` workers
///
/// Shorthand for a [`ParallelProcessor`] with default configuration and
/// the given thread count.
pub fn parallel_map<T, Out, F>(input: &[T], f: F, threads: ThreadCount) -> Vec<Out>
where
    T: Sync,
    Out: Send,
    F: Fn(&T) -> Out + Sync,
{
    ParallelProcessor::with_config(ParallelConfig::with_threads(threads)).parallel_map(input, f)
}

/// Fallible map with an explicit configuration
pub fn try_parallel_map<T, Out, E, F>(
    input: &[T],
    f: F,
    config: ParallelConfig,
) -> Result<Vec<Out>, MapError<E>>
where
    T: Sync,
    Out: Send,
    E: Send,
    F: Fn(&T) -> Result<Out, E> + Sync,
{
    ParallelProcessor::with_config(config).try_parallel_map(input, f)
}

/// Per-worker result: failures with global indices, or a panic that
/// escaped the worker
type WorkerOutcome<E> = std::result::Result<Vec<(usize, Failure<E>)>, String>;

fn empty_slots<Out>(n: usize) -> Vec<Slot<Out>> {
    let mut slots = Vec::with_capacity(n);
    slots.resize_with(n, || None);
    slots
}

/// Cut `slots` into one exclusive chunk per partition
fn split_slots<'a, Out>(
    mut slots: &'a mut [Slot<Out>],
    partitions: &[Partition],
) -> Vec<&'a mut [Slot<Out>]> {
    let mut chunks = Vec::with_capacity(partitions.len());
    for part in partitions {
        let (head, tail) = std::mem::take(&mut slots).split_at_mut(part.len());
        chunks.push(head);
        slots = tail;
    }
    debug_assert!(slots.is_empty());
    chunks
}

fn collect_slots<Out>(slots: Vec<Slot<Out>>) -> Vec<Out> {
    let n = slots.len();
    let output: Vec<Out> = slots.into_iter().flatten().collect();
    debug_assert_eq!(output.len(), n, "partition cover left a slot unwritten");
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parallel::sequential_map;
    use std::collections::HashSet;
    use std::sync::Mutex;

    #[test]
    fn test_parallel_map_basic() {
        let input: Vec<i64> = (0..10).collect();
        let out = ParallelProcessor::new(3).parallel_map(&input, |p| p * p);
        assert_eq!(out, vec![0, 1, 4, 9, 16, 25, 36, 49, 64, 81]);
    }

    #[test]
    fn test_parallel_map_empty() {
        let input: Vec<i32> = Vec::new();
        let out = parallel_map(&input, |p| *p, ThreadCount::new(4));
        assert!(out.is_empty());
    }

    #[test]
    fn test_empty_input_spawns_no_workers() {
        let input: Vec<i32> = Vec::new();
        let calls = Mutex::new(0);
        let out = ParallelProcessor::new(8).parallel_map(&input, |p| {
            *calls.lock().unwrap() += 1;
            *p
        });
        assert!(out.is_empty());
        assert_eq!(*calls.lock().unwrap(), 0);
    }

    #[test]
    fn test_more_threads_than_elements() {
        let input = vec!["a", "b"];
        let out = parallel_map(&input, |s| s.to_uppercase(), ThreadCount::new(16));
        assert_eq!(out, vec!["A", "B"]);
    }

    #[test]
    fn test_auto_threads_matches_sequential() {
        let input: Vec<u32> = (0..10_000).collect();
        let out = parallel_map(&input, |p| p.wrapping_mul(2_654_435_761), ThreadCount::Auto);
        assert_eq!(out, sequential_map(&input, |p| p.wrapping_mul(2_654_435_761)));
    }

    #[test]
    fn test_workers_run_on_distinct_threads() {
        let input: Vec<usize> = (0..4).collect();
        let seen = Mutex::new(HashSet::new());
        ParallelProcessor::new(4).parallel_map(&input, |_| {
            seen.lock().unwrap().insert(thread::current().id());
        });
        assert_eq!(seen.lock().unwrap().len(), 4);
    }

    #[test]
    fn test_non_copy_output() {
        let input: Vec<i32> = (0..101).collect();
        let out = ParallelProcessor::new(4).parallel_map(&input, |p| format!("pixel_{}", p));
        assert_eq!(out[0], "pixel_0");
        assert_eq!(out[100], "pixel_100");
    }

    #[test]
    #[should_panic(expected = "bad pixel")]
    fn test_worker_panic_resumes_on_caller() {
        let input: Vec<i32> = (0..100).collect();
        ParallelProcessor::new(4).parallel_map(&input, |p| {
            if *p == 77 {
                panic!("bad pixel");
            }
            *p
        });
    }

    #[test]
    fn test_split_slots_follows_partitions() {
        let parts = partition(10, 3);
        let mut slots: Vec<Slot<u8>> = empty_slots(10);
        let lens: Vec<usize> = split_slots(&mut slots, &parts).iter().map(|c| c.len()).collect();
        assert_eq!(lens, vec![4, 3, 3]);
    }

    #[test]
    fn test_try_parallel_map_ok() {
        let input = vec!["1", "2", "3", "4", "5"];
        let out = ParallelProcessor::new(2)
            .try_parallel_map(&input, |s| s.parse::<i32>())
            .unwrap();
        assert_eq!(out, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_try_parallel_map_fail_fast() {
        let input: Vec<i32> = (0..1000).collect();
        let err = ParallelProcessor::new(4)
            .try_parallel_map(&input, |p| if *p == 600 { Err("bad") } else { Ok(*p) })
            .unwrap_err();
        assert_eq!(err, MapError::Failed { index: 600, error: "bad" });
    }

    #[test]
    fn test_try_parallel_map_collect_all() {
        let input: Vec<i32> = (0..12).collect();
        let config =
            ParallelConfig::with_threads(ThreadCount::new(3)).failure_policy(FailurePolicy::CollectAll);
        let err = ParallelProcessor::with_config(config)
            .try_parallel_map(&input, |p| if p % 5 == 0 { Err(*p) } else { Ok(*p) })
            .unwrap_err();
        assert_eq!(
            err,
            MapError::Aggregate {
                failures: vec![(0, 0), (5, 5), (10, 10)],
                panics: vec![]
            }
        );
    }

    #[test]
    fn test_try_parallel_map_panic_becomes_error() {
        let input: Vec<i32> = (0..9).collect();
        let err = ParallelProcessor::new(3)
            .try_parallel_map(&input, |p| {
                if *p == 4 {
                    panic!("worker blew up");
                }
                Ok::<_, ()>(*p)
            })
            .unwrap_err();
        assert_eq!(
            err,
            MapError::Runtime(Error::WorkerPanicked {
                worker: 1,
                message: "worker blew up".to_string()
            })
        );
    }

    #[test]
    fn test_collect_all_keeps_errors_alongside_panics() {
        let input: Vec<i32> = (0..9).collect();
        let attempted = Mutex::new(Vec::new());
        let config =
            ParallelConfig::with_threads(ThreadCount::new(3)).failure_policy(FailurePolicy::CollectAll);

        let err = ParallelProcessor::with_config(config)
            .try_parallel_map(&input, |p| {
                attempted.lock().unwrap().push(*p);
                if *p == 3 {
                    panic!("boom");
                }
                if p % 2 == 1 {
                    Err(*p)
                } else {
                    Ok(*p)
                }
            })
            .unwrap_err();

        assert_eq!(
            err,
            MapError::Aggregate {
                failures: vec![(1, 1), (5, 5), (7, 7)],
                panics: vec![(3, "boom".to_string())]
            }
        );
        assert_eq!(err.failed_indices(), vec![1, 3, 5, 7]);

        let mut seen = attempted.into_inner().unwrap();
        seen.sort_unstable();
        assert_eq!(seen, input);
    }
}
