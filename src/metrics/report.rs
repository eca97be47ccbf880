use std::time::Duration;

use super::histogram::LatencyStats;
use super::types::{ErrorTally, RequestStats};

const NANOS_PER_SEC: u128 = 1_000_000_000;
const RATE_SCALE: u128 = 100;

/// Terminal state of a run, handed to the summary printer.
#[derive(Debug, Clone)]
pub enum RunReport {
    /// No request succeeded; only the error summary is meaningful.
    Degenerate(DegenerateReport),
    Complete(Box<CompleteReport>),
}

#[derive(Debug, Clone)]
pub struct DegenerateReport {
    pub failures: u64,
    pub elapsed: Duration,
    pub errors: ErrorTally,
}

#[derive(Debug, Clone)]
pub struct CompleteReport {
    pub workers: usize,
    pub successes: u64,
    pub failures: u64,
    pub bytes: u64,
    /// Coordinator wall-clock time from first spawn to last result.
    pub elapsed: Duration,
    /// Summed success latency divided by the worker count.
    pub avg_worker_time: Duration,
    /// Requests per second over `avg_worker_time`, scaled by 100.
    pub request_rate_x100: u64,
    /// Bytes per second over `avg_worker_time`.
    pub transfer_rate: u64,
    /// Requests per second over `elapsed`, scaled by 100.
    pub overall_request_rate_x100: u64,
    /// Bytes per second over `elapsed`.
    pub overall_transfer_rate: u64,
    pub latency: LatencyStats,
    pub errors: ErrorTally,
}

impl RunReport {
    #[must_use]
    pub fn from_stats(stats: &RequestStats, workers: usize, elapsed: Duration) -> Self {
        if stats.successes == 0 {
            return RunReport::Degenerate(DegenerateReport {
                failures: stats.failures,
                elapsed,
                errors: stats.errors.clone(),
            });
        }

        let avg_worker_time = average_per_worker(stats.latency_total, workers);
        RunReport::Complete(Box::new(CompleteReport {
            workers,
            successes: stats.successes,
            failures: stats.failures,
            bytes: stats.bytes,
            elapsed,
            avg_worker_time,
            request_rate_x100: per_second_x100(stats.successes, avg_worker_time),
            transfer_rate: per_second(stats.bytes, avg_worker_time),
            overall_request_rate_x100: per_second_x100(stats.successes, elapsed),
            overall_transfer_rate: per_second(stats.bytes, elapsed),
            latency: stats.histogram.stats(),
            errors: stats.errors.clone(),
        }))
    }

    #[must_use]
    pub const fn errors(&self) -> &ErrorTally {
        match self {
            RunReport::Degenerate(report) => &report.errors,
            RunReport::Complete(report) => &report.errors,
        }
    }

    #[must_use]
    pub const fn is_degenerate(&self) -> bool {
        matches!(self, RunReport::Degenerate(_))
    }
}

fn average_per_worker(total: Duration, workers: usize) -> Duration {
    let workers = u128::try_from(workers).unwrap_or(u128::MAX).max(1);
    let nanos = total.as_nanos().checked_div(workers).unwrap_or(0);
    Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
}

fn per_second_x100(count: u64, over: Duration) -> u64 {
    scaled_rate(count, over, RATE_SCALE)
}

fn per_second(count: u64, over: Duration) -> u64 {
    scaled_rate(count, over, 1)
}

fn scaled_rate(count: u64, over: Duration, scale: u128) -> u64 {
    let scaled = u128::from(count)
        .saturating_mul(scale)
        .saturating_mul(NANOS_PER_SEC)
        .checked_div(over.as_nanos())
        .unwrap_or(0);
    u64::try_from(scaled).unwrap_or(u64::MAX)
}
