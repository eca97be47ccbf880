mod app;
mod config;
mod metrics;
mod request;
mod validation;

pub use app::{AppError, AppResult};
pub use config::ConfigError;
pub use metrics::MetricsError;
pub use request::{RequestError, root_cause_message};
pub use validation::ValidationError;
