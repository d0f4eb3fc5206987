//! Migration pressure
//!
//! Bursts of random read-modify-write accesses from the local CPU. Writes
//! are used rather than plain reads because the kernel's NUMA hinting
//! faults track them more reliably.

use crate::clock::Stopwatch;
use rand::rngs::StdRng;
use rand::Rng;
use std::hint::black_box;

/// Runs fixed-size access bursts over a region
#[derive(Debug, Clone, Copy)]
pub struct PressureDriver {
    accesses: usize,
}

impl PressureDriver {
    pub fn new(accesses: usize) -> Self {
        Self { accesses }
    }

    /// Run one burst and return the seconds spent in the access loop
    ///
    /// Each access reads a random element into `sum` and stores
    /// `sum % 100` back into it. `sum` carries over between bursts and is
    /// reported by the caller so the loop is observable.
    pub fn apply(&self, data: &mut [i64], rng: &mut StdRng, sum: &mut i64) -> f64 {
        let len = data.len();
        if len == 0 {
            return 0.0;
        }

        let mut acc = *sum;
        let watch = Stopwatch::start();
        for _ in 0..self.accesses {
            let idx = rng.gen_range(0..len);
            acc = acc.wrapping_add(black_box(data[idx]));
            data[idx] = acc % 100;
        }
        let elapsed = watch.elapsed_secs();

        *sum = black_box(acc);
        elapsed
    }
}
