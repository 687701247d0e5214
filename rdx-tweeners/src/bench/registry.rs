//! The benchmarks known to the runner.

use super::options::BenchOptions;
use super::scenarios;
use std::time::Duration;

/// What a benchmark reports once done.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BenchReport {
    /// Number of calls to the update callbacks.
    pub update_count: u64,
    /// Time spent in the update loop.
    pub elapsed: Duration,
}

pub type BenchmarkFn = fn(&BenchOptions) -> BenchReport;

const REGISTRY: &[(&str, BenchmarkFn)] = &[
    ("self-default", scenarios::self_default),
    ("self-flat", scenarios::self_flat),
];

pub fn find(name: &str) -> Option<BenchmarkFn> {
    REGISTRY
        .iter()
        .find(|(entry, _)| *entry == name)
        .map(|(_, function)| *function)
}

pub fn names() -> impl Iterator<Item = &'static str> {
    REGISTRY.iter().map(|(name, _)| *name)
}
