use std::time::Duration;

use hdrhistogram::Histogram;

use crate::error::MetricsError;

/// Significant decimal digits kept by the latency histogram.
const SIGNIFICANT_FIGURES: u8 = 4;
/// Lowest discernible latency, in microseconds.
const LOWEST_TRACKABLE_US: u64 = 1;

/// Percentiles reported for every run.
pub const REPORTED_PERCENTILES: [f64; 7] = [10.0, 50.0, 75.0, 99.0, 99.9, 99.9999, 99.99999];

/// Latency distribution in microseconds, bounded by the test duration.
#[derive(Debug, Clone)]
pub struct LatencyHistogram {
    hist: Histogram<u64>,
}

impl LatencyHistogram {
    /// Creates a histogram covering 1µs up to `duration`.
    ///
    /// # Errors
    ///
    /// Returns an error if the histogram cannot be created.
    pub fn for_duration(duration: Duration) -> Result<Self, MetricsError> {
        let highest = duration_micros(duration).max(LOWEST_TRACKABLE_US.saturating_mul(2));
        let hist = Histogram::<u64>::new_with_bounds(LOWEST_TRACKABLE_US, highest, SIGNIFICANT_FIGURES)
            .map_err(|err| MetricsError::Histogram {
                context: "create",
                source: Box::new(err),
            })?;
        Ok(Self { hist })
    }

    /// Records one latency. Values past the upper bound clamp to it.
    pub fn record(&mut self, latency: Duration) {
        let value = duration_micros(latency).max(LOWEST_TRACKABLE_US);
        self.hist.saturating_record(value);
    }

    /// Adds every bucket count of `other` into this histogram.
    ///
    /// # Errors
    ///
    /// Returns an error if `other` holds values this histogram cannot track.
    pub fn merge(&mut self, other: &LatencyHistogram) -> Result<(), MetricsError> {
        self.hist
            .add(&other.hist)
            .map_err(|err| MetricsError::Histogram {
                context: "merge",
                source: Box::new(err),
            })
    }

    #[must_use]
    pub fn count(&self) -> u64 {
        self.hist.len()
    }

    #[must_use]
    pub fn value_at_percentile(&self, percentile: f64) -> u64 {
        if self.count() == 0 {
            return 0;
        }
        self.hist.value_at_percentile(percentile)
    }

    #[must_use]
    pub fn stats(&self) -> LatencyStats {
        if self.count() == 0 {
            return LatencyStats::default();
        }
        LatencyStats {
            min_us: self.hist.min(),
            mean_us: round_to_u64(self.hist.mean()),
            max_us: self.hist.max(),
            stddev_us: round_to_u64(self.hist.stdev()),
            percentiles: REPORTED_PERCENTILES
                .iter()
                .map(|percentile| (*percentile, self.hist.value_at_percentile(*percentile)))
                .collect(),
        }
    }
}

/// Summary statistics derived from a [`LatencyHistogram`], in microseconds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LatencyStats {
    pub min_us: u64,
    pub mean_us: u64,
    pub max_us: u64,
    pub stddev_us: u64,
    pub percentiles: Vec<(f64, u64)>,
}

fn duration_micros(duration: Duration) -> u64 {
    u64::try_from(duration.as_micros()).unwrap_or(u64::MAX)
}

fn round_to_u64(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value.round() as u64
    } else {
        0
    }
}
