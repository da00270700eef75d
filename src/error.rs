//! Error types for the parallel processor

use thiserror::Error;

/// Crate-level errors
///
/// These cover configuration and thread management. Failures raised by a
/// caller's transformation are reported through [`MapError`] instead, which
/// keeps the caller's own error type intact.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Thread count string was neither `auto` nor an integer
    ///
    /// **Triggered by:** `"four".parse::<ThreadCount>()`, `PARMAP_THREADS=lots`
    /// **Prevention:** Use `auto` or an integer; zero and negative values mean auto
    #[error("Invalid thread count: {value:?} (expected \"auto\" or an integer)")]
    InvalidThreadCount {
        /// Rejected input
        value: String,
    },

    /// Failure policy string was not recognized
    #[error("Invalid failure policy: {value:?} (expected \"fail-fast\" or \"collect-all\")")]
    InvalidFailurePolicy {
        /// Rejected input
        value: String,
    },

    /// Environment variable held non-unicode data
    #[error("Environment variable {name} is not valid unicode")]
    InvalidEnvironment {
        /// Variable name
        name: String,
    },

    /// A worker thread panicked while running the transformation
    #[error("Worker {worker} panicked: {message}")]
    WorkerPanicked {
        /// Partition index of the worker
        worker: usize,
        /// Panic payload, when it was a string
        message: String,
    },
}

/// Error severity classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// The call cannot produce a result
    Fatal,
    /// The call can be retried with corrected input or configuration
    Recoverable,
}

impl Error {
    /// Classify error severity
    pub fn classify(&self) -> ErrorSeverity {
        match self {
            Error::WorkerPanicked { .. } => ErrorSeverity::Fatal,
            Error::InvalidThreadCount { .. }
            | Error::InvalidFailurePolicy { .. }
            | Error::InvalidEnvironment { .. } => ErrorSeverity::Recoverable,
        }
    }
}

/// Failure of a fallible parallel map
///
/// `E` is the error type returned by the caller's transformation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MapError<E> {
    /// The transformation failed on one element
    ///
    /// Under [`FailurePolicy::FailFast`](crate::FailurePolicy::FailFast) this
    /// is the lowest failing index observed before the workers stopped. If
    /// that element panicked instead, the result is [`MapError::Runtime`].
    #[error("Transformation failed at index {index}: {error}")]
    Failed {
        /// Input index of the failing element
        index: usize,
        /// Error returned by the transformation
        error: E,
    },

    /// Every failure collected under
    /// [`FailurePolicy::CollectAll`](crate::FailurePolicy::CollectAll)
    ///
    /// Errors and panics are kept apart, each sorted by index. A panic only
    /// fails its own element; the rest of its partition is still attempted.
    #[error(
        "Transformation failed on {} element(s) ({} panicked), first at index {}",
        failure_count(.failures, .panics),
        .panics.len(),
        first_index(.failures, .panics)
    )]
    Aggregate {
        /// `(index, error)` pairs in increasing index order
        failures: Vec<(usize, E)>,
        /// `(index, panic message)` pairs in increasing index order
        panics: Vec<(usize, String)>,
    },

    /// A worker thread panicked
    #[error(transparent)]
    Runtime(#[from] Error),
}

fn failure_count<E>(failures: &[(usize, E)], panics: &[(usize, String)]) -> usize {
    failures.len() + panics.len()
}

fn first_index<E>(failures: &[(usize, E)], panics: &[(usize, String)]) -> usize {
    let first_error = failures.first().map(|(index, _)| *index);
    let first_panic = panics.first().map(|(index, _)| *index);
    match (first_error, first_panic) {
        (Some(a), Some(b)) => a.min(b),
        (a, b) => a.or(b).unwrap_or_default(),
    }
}

impl<E> MapError<E> {
    /// Input indices that failed or panicked, in increasing order
    pub fn failed_indices(&self) -> Vec<usize> {
        match self {
            MapError::Failed { index, .. } => vec![*index],
            MapError::Aggregate { failures, panics } => {
                let mut indices: Vec<usize> = failures
                    .iter()
                    .map(|(i, _)| *i)
                    .chain(panics.iter().map(|(i, _)| *i))
                    .collect();
                indices.sort_unstable();
                indices
            }
            MapError::Runtime(_) => Vec::new(),
        }
    }
}

/// Result type for parallel processor operations
pub type Result<T> = std::result::Result<T, Error>;
