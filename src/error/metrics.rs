use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("Histogram error during {context}: {source}")]
    Histogram {
        context: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("Collected {received} of {expected} worker results before the channel closed.")]
    MissingWorkerResults { expected: usize, received: usize },
}
