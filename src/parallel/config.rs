//! Configuration for parallel execution

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::env::{self, VarError};
use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;

/// Environment variable holding the default thread count
pub const THREADS_ENV: &str = "PARMAP_THREADS";

/// Environment variable holding the default failure policy
pub const FAILURE_POLICY_ENV: &str = "PARMAP_FAILURE_POLICY";

/// Requested degree of parallelism
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ThreadCount {
    /// One worker per hardware thread reported by the host
    #[default]
    Auto,
    /// Exactly this many workers (capped by the input length)
    Fixed(NonZeroUsize),
}

impl ThreadCount {
    /// Build from a raw count; zero means [`ThreadCount::Auto`]
    pub fn new(threads: usize) -> Self {
        NonZeroUsize::new(threads).map_or(ThreadCount::Auto, ThreadCount::Fixed)
    }

    /// Resolve to a concrete, positive thread count
    pub fn resolve(self) -> usize {
        match self {
            ThreadCount::Auto => num_cpus::get().max(1),
            ThreadCount::Fixed(n) => n.get(),
        }
    }
}

impl From<usize> for ThreadCount {
    fn from(threads: usize) -> Self {
        ThreadCount::new(threads)
    }
}

impl FromStr for ThreadCount {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("auto") {
            return Ok(ThreadCount::Auto);
        }
        let invalid = || Error::InvalidThreadCount {
            value: s.to_string(),
        };
        match s.parse::<i128>().map_err(|_| invalid())? {
            n if n <= 0 => Ok(ThreadCount::Auto),
            n => usize::try_from(n).map(ThreadCount::new).map_err(|_| invalid()),
        }
    }
}

impl fmt::Display for ThreadCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThreadCount::Auto => f.write_str("auto"),
            ThreadCount::Fixed(n) => write!(f, "{}", n),
        }
    }
}

impl TryFrom<String> for ThreadCount {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<ThreadCount> for String {
    fn from(threads: ThreadCount) -> Self {
        threads.to_string()
    }
}

/// What a fallible map does when the transformation fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Stop all workers at the first failure and report the lowest failing
    /// index observed
    #[default]
    FailFast,
    /// Run every worker to completion and report every failure
    CollectAll,
}

impl FromStr for FailurePolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fail-fast" | "fail_fast" => Ok(FailurePolicy::FailFast),
            "collect-all" | "collect_all" => Ok(FailurePolicy::CollectAll),
            _ => Err(Error::InvalidFailurePolicy {
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailurePolicy::FailFast => f.write_str("fail-fast"),
            FailurePolicy::CollectAll => f.write_str("collect-all"),
        }
    }
}

/// Configuration for parallel execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParallelConfig {
    /// Number of worker threads (default: auto)
    pub threads: ThreadCount,
    /// Failure handling for fallible maps (default: fail-fast)
    pub failure_policy: FailurePolicy,
}

impl ParallelConfig {
    /// Default configuration with an explicit thread count
    pub fn with_threads(threads: ThreadCount) -> Self {
        Self {
            threads,
            ..Default::default()
        }
    }

    /// Replace the failure policy
    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Replace the thread count when one is given
    pub fn override_threads(mut self, threads: Option<ThreadCount>) -> Self {
        if let Some(threads) = threads {
            self.threads = threads;
        }
        self
    }

    /// Read `PARMAP_THREADS` and `PARMAP_FAILURE_POLICY`
    ///
    /// Unset variables keep their defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_values(read_var(THREADS_ENV)?, read_var(FAILURE_POLICY_ENV)?)
    }

    fn from_values(threads: Option<String>, policy: Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(threads) = threads {
            config.threads = threads.parse()?;
        }
        if let Some(policy) = policy {
            config.failure_policy = policy.parse()?;
        }
        Ok(config)
    }
}

fn read_var(name: &str) -> Result<Option<String>> {
    match env::var(name) {
        Ok(value) => Ok(Some(value)),
        Err(VarError::NotPresent) => Ok(None),
        Err(VarError::NotUnicode(_)) => Err(Error::InvalidEnvironment {
            name: name.to_string(),
        }),
    }
}
