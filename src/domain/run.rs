use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

use bytes::Bytes;

/// Client construction settings: TLS material, protocol preference, timeout.
///
/// Paths are kept as paths; the files are only read when the client is built.
#[derive(Debug, Clone, Default)]
pub struct TransportConfig {
    /// Response header timeout, enforced on every send. Body reads are not
    /// bounded by it.
    pub timeout: Duration,
    /// Disables certificate and hostname verification. Insecure; only for
    /// testing against hosts with self-signed or mismatched certificates.
    pub insecure: bool,
    pub http2: bool,
    pub client_cert: Option<PathBuf>,
    pub client_key: Option<PathBuf>,
    pub ca_cert: Option<PathBuf>,
}

/// Everything a run needs. Frozen before the first worker starts.
#[derive(Debug, Clone)]
pub struct TestConfig {
    pub duration: Duration,
    pub workers: NonZeroUsize,
    pub url: String,
    pub method: reqwest::Method,
    pub body: Option<Bytes>,
    /// Ordered pairs; repeated names are all sent.
    pub headers: Vec<(String, String)>,
    pub host: Option<String>,
    pub transport: TransportConfig,
}
