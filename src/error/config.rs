use std::path::PathBuf;
use thiserror::Error;

use super::ValidationError;

/// Fatal configuration problems, surfaced once before any worker starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config '{path}': {source}")]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse TOML config '{path}': {source}")]
    ParseToml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Failed to parse JSON config '{path}': {source}")]
    ParseJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Unsupported config extension '{ext}'. Use .toml or .json.")]
    UnsupportedExtension { ext: String },
    #[error("Config file must have .toml or .json extension.")]
    MissingExtension,
    #[error("Config '{field}' must be >= 1: {source}")]
    FieldMustBePositive {
        field: String,
        #[source]
        source: ValidationError,
    },
    #[error("Invalid header: {source}")]
    InvalidHeader {
        #[source]
        source: ValidationError,
    },
    #[error("Failed to read body file '{path}': {source}")]
    ReadBody {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("--cert requires --key.")]
    MissingClientKey,
    #[error("--key requires --cert.")]
    MissingClientCert,
    #[error("Failed to read cert '{path}': {source}")]
    ReadCert {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to read key '{path}': {source}")]
    ReadKey {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid cert/key: {source}")]
    InvalidIdentity {
        #[source]
        source: reqwest::Error,
    },
    #[error("Failed to read CA file '{path}': {source}")]
    ReadCa {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid CA file '{path}': no PEM certificate found.")]
    CaNotPem { path: PathBuf },
    #[error("Invalid CA file '{path}': {source}")]
    InvalidCa {
        path: PathBuf,
        #[source]
        source: reqwest::Error,
    },
    #[error("Failed to build HTTP client: {source}")]
    BuildClient {
        #[source]
        source: reqwest::Error,
    },
    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Unsupported URL scheme '{scheme}'. Use http or https.")]
    UnsupportedScheme { scheme: String },
}
