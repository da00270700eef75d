//! Wall-clock comparison of the sequential and parallel paths

use crate::parallel::{effective_threads, sequential_map, ParallelProcessor};
use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::time::{Duration, Instant};
use tracing::info;

/// Timings of one sequential run and one parallel run over the same input
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Comparison {
    /// Number of input elements
    pub elements: usize,
    /// Effective worker count of the parallel run
    pub threads: usize,
    /// Wall time of [`sequential_map`]
    pub sequential: Duration,
    /// Wall time of [`ParallelProcessor::parallel_map`]
    pub parallel: Duration,
    /// Whether both runs produced element-wise equal output
    pub outputs_match: bool,
}

impl Comparison {
    /// Sequential time divided by parallel time; `0.0` if the parallel run
    /// took no measurable time
    pub fn speedup(&self) -> f64 {
        let parallel = self.parallel.as_secs_f64();
        if parallel == 0.0 {
            0.0
        } else {
            self.sequential.as_secs_f64() / parallel
        }
    }
}

impl Serialize for Comparison {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Comparison", 6)?;
        s.serialize_field("elements", &self.elements)?;
        s.serialize_field("threads", &self.threads)?;
        s.serialize_field("sequential_ms", &millis(self.sequential))?;
        s.serialize_field("parallel_ms", &millis(self.parallel))?;
        s.serialize_field("speedup", &self.speedup())?;
        s.serialize_field("outputs_match", &self.outputs_match)?;
        s.end()
    }
}

fn millis(d: Duration) -> f64 {
    d.as_nanos() as f64 / 1_000_000.0
}

/// Run `f` once and return its result with the elapsed wall time
pub fn timed<R>(f: impl FnOnce() -> R) -> (R, Duration) {
    let start = Instant::now();
    let result = f();
    (result, start.elapsed())
}

/// Time the sequential reference against `processor` on the same input
///
/// Both outputs are compared element-wise before being dropped.
pub fn compare<T, Out, F>(input: &[T], f: F, processor: &ParallelProcessor) -> Comparison
where
    T: Sync,
    Out: Send + PartialEq,
    F: Fn(&T) -> Out + Sync,
{
    let (expected, sequential) = timed(|| sequential_map(input, &f));
    let (actual, parallel) = timed(|| processor.parallel_map(input, &f));

    let comparison = Comparison {
        elements: input.len(),
        threads: effective_threads(input.len(), processor.threads()),
        sequential,
        parallel,
        outputs_match: expected == actual,
    };
    info!(
        elements = comparison.elements,
        threads = comparison.threads,
        sequential_ms = millis(sequential),
        parallel_ms = millis(parallel),
        speedup = comparison.speedup(),
        "sequential vs parallel"
    );
    comparison
}
