//! Sequential, random and stride read benchmarks
//!
//! Index generation happens before the timer starts; only the read loop is
//! measured. Every read feeds a checksum that is reported with the result.

use super::{MEASURED_ACCESSES, STRIDE, WARMUP_ACCESSES};
use crate::clock::Stopwatch;
use crate::models::AccessReport;
use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::Rng;
use std::hint::black_box;

/// Random reads to disturb caches before measuring; returns their sum
pub fn warm_up(data: &[i64], rng: &mut StdRng) -> i64 {
    let len = data.len();
    let mut sum = 0i64;
    if len == 0 {
        return sum;
    }
    for _ in 0..WARMUP_ACCESSES {
        sum = sum.wrapping_add(black_box(data[rng.gen_range(0..len)]));
    }
    sum
}

/// Read the first `min(len, 1_000_000)` elements in order
pub fn sequential(data: &[i64], rng: &mut StdRng) -> AccessReport {
    let mut sum = warm_up(data, rng);
    let accesses = data.len().min(MEASURED_ACCESSES);

    let watch = Stopwatch::start();
    for value in &data[..accesses] {
        sum = sum.wrapping_add(black_box(*value));
    }
    let secs = watch.elapsed_secs();

    AccessReport::new("sequential", accesses, secs, black_box(sum))
}

/// Read 1,000,000 uniformly random elements
pub fn random(data: &[i64], rng: &mut StdRng) -> Result<AccessReport> {
    let mut sum = warm_up(data, rng);
    let len = data.len();
    let indices = index_table(|_| rng.gen_range(0..len.max(1)))?;

    let (read, secs) = timed_reads(data, &indices);
    sum = sum.wrapping_add(read);

    Ok(AccessReport::new("random", indices.len(), secs, black_box(sum)))
}

/// Read 1,000,000 elements at a 64-element stride, wrapping at the end
pub fn stride(data: &[i64], rng: &mut StdRng) -> Result<AccessReport> {
    let mut sum = warm_up(data, rng);
    let len = data.len().max(1);
    let indices = index_table(|i| (i * STRIDE) % len)?;

    let (read, secs) = timed_reads(data, &indices);
    sum = sum.wrapping_add(read);

    Ok(AccessReport::new("stride", indices.len(), secs, black_box(sum)))
}

fn index_table(mut index: impl FnMut(usize) -> usize) -> Result<Vec<usize>> {
    let mut indices = Vec::new();
    indices
        .try_reserve_exact(MEASURED_ACCESSES)
        .context("Failed to allocate index array")?;
    indices.extend((0..MEASURED_ACCESSES).map(&mut index));
    Ok(indices)
}

fn timed_reads(data: &[i64], indices: &[usize]) -> (i64, f64) {
    let mut sum = 0i64;
    if data.is_empty() {
        return (sum, 0.0);
    }

    let watch = Stopwatch::start();
    for &idx in indices {
        sum = sum.wrapping_add(black_box(data[idx]));
    }
    (sum, watch.elapsed_secs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn data(len: usize) -> Vec<i64> {
        (0..len).map(|i| (i % 100) as i64).collect()
    }

    #[test]
    fn test_warm_up_is_reproducible() {
        let data = data(10_000);
        let a = warm_up(&data, &mut StdRng::seed_from_u64(12345));
        let b = warm_up(&data, &mut StdRng::seed_from_u64(12345));
        assert_eq!(a, b);
        assert!(a > 0);
    }

    #[test]
    fn test_sequential_caps_accesses() {
        let small = data(1_000);
        let report = sequential(&small, &mut StdRng::seed_from_u64(1));
        assert_eq!(report.accesses, 1_000);
        assert_eq!(report.pattern, "sequential");

        let large = data(MEASURED_ACCESSES + 10);
        let report = sequential(&large, &mut StdRng::seed_from_u64(1));
        assert_eq!(report.accesses, MEASURED_ACCESSES);
    }

    #[test]
    fn test_sequential_checksum_includes_reads() {
        let data = data(200);
        let mut rng = StdRng::seed_from_u64(9);
        let warm = warm_up(&data, &mut StdRng::seed_from_u64(9));
        let report = sequential(&data, &mut rng);

        // 0..99 twice
        assert_eq!(report.checksum, warm + 2 * 4950);
    }

    #[test]
    fn test_random_and_stride_access_counts() {
        let data = data(4_096);

        let report = random(&data, &mut StdRng::seed_from_u64(3)).unwrap();
        assert_eq!(report.accesses, MEASURED_ACCESSES);
        assert_eq!(report.pattern, "random");
        assert!(report.time_secs >= 0.0);

        let report = stride(&data, &mut StdRng::seed_from_u64(3)).unwrap();
        assert_eq!(report.accesses, MEASURED_ACCESSES);
        assert_eq!(report.pattern, "stride");
    }

    #[test]
    fn test_stride_checksum_is_deterministic() {
        let data = data(6_400);
        let warm = warm_up(&data, &mut StdRng::seed_from_u64(5));
        let report = stride(&data, &mut StdRng::seed_from_u64(5)).unwrap();

        // The index sequence repeats every 100 strides
        let cycle: i64 = (0..100).map(|i| ((i * 64) % 6_400 % 100) as i64).sum();
        let expected = warm + cycle * (MEASURED_ACCESSES as i64 / 100);
        assert_eq!(report.checksum, expected);
    }
}
