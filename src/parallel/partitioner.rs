//! Contiguous work partitioning
//!
//! Splits `[0, n)` into at most `t` half-open ranges whose sizes differ by at
//! most one. The first `n % e` ranges carry the extra element.

use std::ops::Range;

/// Half-open index range `[start, end)` assigned to one worker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Partition {
    /// First index covered
    pub start: usize,
    /// One past the last index covered
    pub end: usize,
}

impl Partition {
    /// Number of indices in the range
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// True when the range covers nothing
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// The range as a `std::ops::Range`
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Effective thread count: `min(requested, n)`
///
/// A request of zero counts as one; the executor resolves "auto" before it
/// gets here.
pub fn effective_threads(n: usize, requested: usize) -> usize {
    requested.max(1).min(n)
}

/// Compute the partitions covering `[0, n)` for `requested` threads
///
/// Returns an empty list when `n == 0`. Otherwise returns exactly
/// `min(requested, n)` non-empty partitions in increasing order.
///
/// # Example
/// ```
/// use parallel_processor::parallel::partition;
///
/// let sizes: Vec<usize> = partition(10, 3).iter().map(|p| p.len()).collect();
/// assert_eq!(sizes, vec![4, 3, 3]);
/// ```
pub fn partition(n: usize, requested: usize) -> Vec<Partition> {
    if n == 0 {
        return Vec::new();
    }

    let workers = effective_threads(n, requested);
    let block = n / workers;
    let rem = n % workers;

    let mut partitions = Vec::with_capacity(workers);
    let mut start = 0;
    for worker in 0..workers {
        let len = block + usize::from(worker < rem);
        partitions.push(Partition {
            start,
            end: start + len,
        });
        start += len;
    }

    debug_assert_eq!(start, n);
    partitions
}
