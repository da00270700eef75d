//! Property-based tests for partitioning and the parallel map
//!
//! These tests use proptest to generate input lengths, thread counts, and
//! element values, and verify that:
//! 1. Partitions always form an exact, ordered cover of `[0, n)`
//! 2. Partition sizes differ by at most one, larger ones first
//! 3. The parallel map is element-wise equal to the sequential reference

use parallel_processor::{
    partition, sequential_map, try_parallel_map, FailurePolicy, MapError, ParallelConfig,
    ParallelProcessor, ThreadCount,
};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn prop_partitions_cover_range_exactly(n in 0usize..5_000, t in 1usize..64) {
        let parts = partition(n, t);

        prop_assert_eq!(parts.len(), t.min(n));
        prop_assert_eq!(parts.iter().map(|p| p.len()).sum::<usize>(), n);

        let mut next = 0;
        for p in &parts {
            prop_assert_eq!(p.start, next);
            prop_assert!(!p.is_empty());
            next = p.end;
        }
        prop_assert_eq!(next, n);
    }

    #[test]
    fn prop_partition_sizes_are_balanced(n in 1usize..5_000, t in 1usize..64) {
        let sizes: Vec<usize> = partition(n, t).iter().map(|p| p.len()).collect();
        let e = t.min(n);
        let block = n / e;

        prop_assert!(sizes.iter().all(|&s| s == block || s == block + 1));
        prop_assert_eq!(sizes.iter().filter(|&&s| s == block + 1).count(), n % e);
        prop_assert!(sizes.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn prop_parallel_matches_sequential(
        input in prop::collection::vec(any::<i32>(), 0..2_000),
        t in 1usize..16,
    ) {
        let f = |p: &i32| p.wrapping_mul(31).wrapping_add(7);
        let parallel = ParallelProcessor::new(t).parallel_map(&input, f);
        prop_assert_eq!(parallel, sequential_map(&input, f));
    }

    #[test]
    fn prop_string_outputs_keep_order(
        input in prop::collection::vec("[a-z]{0,8}", 0..300),
        t in 1usize..8,
    ) {
        let parallel = ParallelProcessor::new(t).parallel_map(&input, |s| s.len());
        let expected: Vec<usize> = input.iter().map(String::len).collect();
        prop_assert_eq!(parallel, expected);
    }

    #[test]
    fn prop_collect_all_finds_every_failure(
        input in prop::collection::vec(-50i32..50, 1..500),
        t in 1usize..8,
    ) {
        let config = ParallelConfig::with_threads(ThreadCount::new(t))
            .failure_policy(FailurePolicy::CollectAll);
        let result = try_parallel_map(
            &input,
            |p| if *p < 0 { Err(*p) } else { Ok(*p) },
            config,
        );

        let expected: Vec<usize> = input
            .iter()
            .enumerate()
            .filter(|(_, p)| **p < 0)
            .map(|(i, _)| i)
            .collect();

        match result {
            Ok(out) => {
                prop_assert!(expected.is_empty());
                prop_assert_eq!(out, input);
            }
            Err(err @ MapError::Aggregate { .. }) => {
                prop_assert_eq!(err.failed_indices(), expected);
            }
            Err(other) => prop_assert!(false, "unexpected error: {:?}", other),
        }
    }
}
