//! Request accounting, latency histograms, and run reports.
mod histogram;
mod report;
mod types;


pub use histogram::{LatencyHistogram, LatencyStats, REPORTED_PERCENTILES};
pub use report::{CompleteReport, DegenerateReport, RunReport};
pub use types::{ErrorTally, RequestStats};
