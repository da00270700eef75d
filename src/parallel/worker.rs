//! Worker units
//!
//! A worker receives only the input and output slices of its own partition,
//! so it has no way to reach an index owned by another worker.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};

/// Output slot, empty until its worker fills it
pub(crate) type Slot<T> = Option<T>;

/// One failed element of a fallible map
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Failure<E> {
    /// The transformation returned an error
    Error(E),
    /// The transformation panicked with this message
    Panic(String),
}

/// Fill every slot of one partition with `f(input[i])`
pub(crate) fn run<T, Out, F>(input: &[T], output: &mut [Slot<Out>], f: &F)
where
    F: Fn(&T) -> Out,
{
    debug_assert_eq!(input.len(), output.len());
    for (slot, item) in output.iter_mut().zip(input) {
        *slot = Some(f(item));
    }
}

/// Fallible worker
///
/// Returns `(local_index, failure)` for each element that returned an error
/// or panicked. A panic is caught per element, so the rest of the range is
/// still attempted. With `stop_on_error` the worker quits at its first
/// failure and raises `stop`; it also quits before its next element once
/// any other worker has raised `stop`.
pub(crate) fn try_run<T, Out, E, F>(
    input: &[T],
    output: &mut [Slot<Out>],
    f: &F,
    stop: &AtomicBool,
    stop_on_error: bool,
) -> Vec<(usize, Failure<E>)>
where
    F: Fn(&T) -> Result<Out, E>,
{
    debug_assert_eq!(input.len(), output.len());
    let mut failures = Vec::new();

    for (local, (slot, item)) in output.iter_mut().zip(input).enumerate() {
        if stop_on_error && stop.load(Ordering::Relaxed) {
            break;
        }
        let failure = match panic::catch_unwind(AssertUnwindSafe(|| f(item))) {
            Ok(Ok(value)) => {
                *slot = Some(value);
                continue;
            }
            Ok(Err(e)) => Failure::Error(e),
            Err(payload) => Failure::Panic(panic_message(&*payload)),
        };
        failures.push((local, failure));
        if stop_on_error {
            stop.store(true, Ordering::Relaxed);
            break;
        }
    }

    failures
}

/// Text of a panic payload, when it carries one
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
