//! Page distribution sampling

use super::{oracle::locate, MAX_SAMPLES, MIN_SAMPLES, SAMPLE_FRACTION};
use crate::models::NodeHistogram;
use crate::numa::NumaSystem;
use crate::region::MemoryRegion;
use tracing::debug;

/// Samples per distribution check for a region of `elements` words
///
/// 0.1% of the elements, clamped to `[MIN_SAMPLES, MAX_SAMPLES]`.
pub fn sample_count(elements: usize) -> usize {
    let fraction = (elements as f64 * SAMPLE_FRACTION) as usize;
    fraction.clamp(MIN_SAMPLES, MAX_SAMPLES)
}

/// Classifies evenly spaced elements of a region by backing node
pub struct DistributionSampler<'a, S: NumaSystem + ?Sized> {
    system: &'a S,
    samples: usize,
}

impl<'a, S: NumaSystem + ?Sized> DistributionSampler<'a, S> {
    pub fn new(system: &'a S, samples: usize) -> Self {
        Self { system, samples }
    }

    /// Sampler sized by `sample_count` for `region`
    pub fn for_region(system: &'a S, region: &MemoryRegion) -> Self {
        Self::new(system, sample_count(region.len()))
    }

    pub fn samples(&self) -> usize {
        self.samples
    }

    /// Element indices inspected by each pass
    pub fn indices(&self, elements: usize) -> impl Iterator<Item = usize> {
        let stride = if self.samples == 0 {
            0
        } else {
            elements / self.samples
        };
        (0..self.samples).map(move |i| stride * i)
    }

    /// Locate every sampled element and tally the result
    pub fn sample(&self, region: &MemoryRegion) -> NodeHistogram {
        let mut histogram = NodeHistogram::new(self.samples);
        for index in self.indices(region.len()) {
            histogram.record(locate(self.system, region.addr_of(index)));
        }

        if histogram.excluded > 0 {
            debug!(
                excluded = histogram.excluded,
                samples = self.samples,
                "Samples excluded from distribution"
            );
        }
        histogram
    }
}
