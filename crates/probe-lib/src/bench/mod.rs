//! Access-pattern microbenchmarks
//!
//! Straight-line timed loops over a region:
//! - sequential, random and fixed-stride reads reporting throughput and latency
//! - a multi-threaded sum over disjoint partitions

mod patterns;
mod threads;

pub use patterns::{random, sequential, stride, warm_up};
pub use threads::parallel_sum;

/// Random reads issued before any measurement
pub const WARMUP_ACCESSES: usize = 10_000;

/// Reads measured by the random and stride benchmarks, and the cap for sequential
pub const MEASURED_ACCESSES: usize = 1_000_000;

/// Element stride of the stride benchmark
pub const STRIDE: usize = 64;

/// Default worker count of the partitioned sum
pub const DEFAULT_THREADS: usize = 4;
