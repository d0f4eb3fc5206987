//! Multi-threaded partitioned sum
//!
//! Each worker reads its own disjoint slice of the region; there are no
//! writes and no synchronisation beyond spawn and join.

use crate::clock::Stopwatch;
use crate::models::ThreadReport;
use anyhow::{anyhow, bail, Result};
use std::hint::black_box;
use std::thread;

/// Sum `data` with `threads` workers, returning per-thread results and the
/// total parallel time
///
/// Worker `t` reads `[t * chunk, (t + 1) * chunk)` with
/// `chunk = len / threads`; trailing elements that do not fill a chunk are
/// not read.
pub fn parallel_sum(data: &[i64], threads: usize) -> Result<(Vec<ThreadReport>, f64)> {
    if threads == 0 {
        bail!("At least one thread is required");
    }

    let chunk = data.len() / threads;
    let watch = Stopwatch::start();

    let reports = thread::scope(|scope| {
        let handles: Vec<_> = (0..threads)
            .map(|thread_id| {
                let part = &data[thread_id * chunk..(thread_id + 1) * chunk];
                scope.spawn(move || sum_partition(thread_id, part))
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().map_err(|_| anyhow!("Worker thread panicked")))
            .collect::<Result<Vec<_>>>()
    })?;

    Ok((reports, watch.elapsed_secs()))
}

fn sum_partition(thread_id: usize, part: &[i64]) -> ThreadReport {
    let watch = Stopwatch::start();
    let mut sum = 0i64;
    for value in part {
        sum = sum.wrapping_add(black_box(*value));
    }
    ThreadReport {
        thread_id,
        sum: black_box(sum),
        time_secs: watch.elapsed_secs(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parallel_sum_partitions() {
        let data: Vec<i64> = (0..1_000).map(|i| i % 100).collect();
        let (reports, total) = parallel_sum(&data, 4).unwrap();

        assert_eq!(reports.len(), 4);
        for (t, report) in reports.iter().enumerate() {
            assert_eq!(report.thread_id, t);
            let expected: i64 = data[t * 250..(t + 1) * 250].iter().sum();
            assert_eq!(report.sum, expected);
        }
        assert!(total >= 0.0);
    }

    #[test]
    fn test_parallel_sum_drops_remainder() {
        let data = vec![1i64; 10];
        let (reports, _) = parallel_sum(&data, 3).unwrap();

        assert_eq!(reports.len(), 3);
        assert_eq!(reports.iter().map(|r| r.sum).sum::<i64>(), 9);
    }

    #[test]
    fn test_parallel_sum_more_threads_than_elements() {
        let data = vec![1i64; 2];
        let (reports, _) = parallel_sum(&data, 4).unwrap();

        // chunk is zero so nobody reads anything
        assert_eq!(reports.len(), 4);
        assert!(reports.iter().all(|r| r.sum == 0));
    }

    #[test]
    fn test_parallel_sum_zero_threads() {
        assert!(parallel_sum(&[1, 2, 3], 0).is_err());
    }
}
