use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid header format: '{value}'. Expected 'Key: Value'")]
    InvalidHeaderFormat { value: String },
    #[error("Invalid header name '{name}'.")]
    InvalidHeaderName { name: String },
    #[error("Invalid value for header '{name}'.")]
    InvalidHeaderValue { name: String },
    #[error("Invalid HTTP method '{value}'.")]
    InvalidMethod { value: String },
    #[error("Missing URL (pass it as an argument or set url in the config file).")]
    MissingUrl,
    #[error("Value must be >= {min}.")]
    ValueTooSmall { min: u64 },
    #[error("Invalid number '{value}': {source}")]
    InvalidNumber {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
}
