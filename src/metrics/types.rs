use std::collections::BTreeMap;
use std::time::Duration;

use crate::error::MetricsError;

use super::histogram::LatencyHistogram;

/// Failure counts keyed by root-cause message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorTally {
    counts: BTreeMap<String, u64>,
}

impl ErrorTally {
    pub fn record(&mut self, message: String) {
        let count = self.counts.entry(message).or_insert(0);
        *count = count.saturating_add(1);
    }

    /// Sums counts per key.
    pub fn merge(&mut self, other: &ErrorTally) {
        for (message, count) in &other.counts {
            let entry = self.counts.entry(message.clone()).or_insert(0);
            *entry = entry.saturating_add(*count);
        }
    }

    #[must_use]
    pub fn get(&self, message: &str) -> u64 {
        self.counts.get(message).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.counts
            .values()
            .fold(0_u64, |acc, count| acc.saturating_add(*count))
    }

    /// Entries ordered by count (highest first), then by message.
    #[must_use]
    pub fn by_count(&self) -> Vec<(&str, u64)> {
        let mut entries: Vec<(&str, u64)> = self
            .counts
            .iter()
            .map(|(message, count)| (message.as_str(), *count))
            .collect();
        entries.sort_by(|left, right| right.1.cmp(&left.1).then_with(|| left.0.cmp(right.0)));
        entries
    }
}

/// Request accounting for one worker, or for the whole run once merged.
///
/// `successes + failures` is the number of attempted requests. The histogram
/// holds exactly one value per success.
#[derive(Debug, Clone)]
pub struct RequestStats {
    pub successes: u64,
    pub failures: u64,
    /// Effective response bytes over successful requests.
    pub bytes: u64,
    /// Latency summed over successful requests.
    pub latency_total: Duration,
    pub errors: ErrorTally,
    pub histogram: LatencyHistogram,
}

impl RequestStats {
    /// Empty stats with a histogram bounded by the test duration.
    ///
    /// # Errors
    ///
    /// Returns an error if the histogram cannot be created.
    pub fn for_duration(duration: Duration) -> Result<Self, MetricsError> {
        Ok(Self {
            successes: 0,
            failures: 0,
            bytes: 0,
            latency_total: Duration::ZERO,
            errors: ErrorTally::default(),
            histogram: LatencyHistogram::for_duration(duration)?,
        })
    }

    #[must_use]
    pub const fn attempted(&self) -> u64 {
        self.successes.saturating_add(self.failures)
    }

    pub fn record_success(&mut self, size: u64, latency: Duration) {
        self.successes = self.successes.saturating_add(1);
        self.bytes = self.bytes.saturating_add(size);
        self.latency_total = self.latency_total.saturating_add(latency);
        self.histogram.record(latency);
    }

    /// Counts a failure under its root-cause message.
    pub fn record_error(&mut self, root_cause: String) {
        self.failures = self.failures.saturating_add(1);
        self.errors.record(root_cause);
    }

    /// Counts a failure that has no message to tally.
    pub fn record_empty(&mut self) {
        self.failures = self.failures.saturating_add(1);
    }

    /// Folds `other` in. Commutative and associative.
    ///
    /// # Errors
    ///
    /// Returns an error if the histograms cannot be merged.
    pub fn merge(&mut self, other: &RequestStats) -> Result<(), MetricsError> {
        self.histogram.merge(&other.histogram)?;
        self.successes = self.successes.saturating_add(other.successes);
        self.failures = self.failures.saturating_add(other.failures);
        self.bytes = self.bytes.saturating_add(other.bytes);
        self.latency_total = self.latency_total.saturating_add(other.latency_total);
        self.errors.merge(&other.errors);
        Ok(())
    }
}
