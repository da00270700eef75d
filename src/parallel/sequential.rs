//! Single-threaded reference map
//!
//! Same contract as the parallel executor, computed in index order on the
//! calling thread. Used to check the parallel path and to measure speedup.

use crate::error::MapError;

/// Apply `f` to every element in order
pub fn sequential_map<T, Out, F>(input: &[T], f: F) -> Vec<Out>
where
    F: Fn(&T) -> Out,
{
    let mut output = Vec::with_capacity(input.len());
    for item in input {
        output.push(f(item));
    }
    output
}

/// Fallible reference map; stops at the first failing element
pub fn try_sequential_map<T, Out, E, F>(input: &[T], f: F) -> Result<Vec<Out>, MapError<E>>
where
    F: Fn(&T) -> Result<Out, E>,
{
    let mut output = Vec::with_capacity(input.len());
    for (index, item) in input.iter().enumerate() {
        match f(item) {
            Ok(value) => output.push(value),
            Err(error) => return Err(MapError::Failed { index, error }),
        }
    }
    Ok(output)
}
