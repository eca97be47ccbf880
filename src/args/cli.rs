use clap::Parser;

use super::defaults::{DEFAULT_CONNECTIONS, DEFAULT_DURATION_SECS, DEFAULT_TIMEOUT_MS};
use super::parsers::{parse_header, parse_positive_u64, parse_positive_usize};
use super::types::{HttpMethod, PositiveU64, PositiveUsize};

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Fixed-concurrency HTTP load generator - drives a target for a wall-clock duration and reports throughput, latency percentiles, and failure root causes."
)]
pub struct BenchArgs {
    /// Target URL
    #[arg(value_name = "URL")]
    pub url: Option<String>,

    /// Number of concurrent workers (one in-flight request each)
    #[arg(long = "connections", short = 'c', default_value = DEFAULT_CONNECTIONS, value_parser = parse_positive_usize)]
    pub connections: PositiveUsize,

    /// Duration of the test in seconds
    #[arg(long, short = 'd', default_value = DEFAULT_DURATION_SECS, value_parser = parse_positive_u64)]
    pub duration: PositiveU64,

    /// Per-request timeout in milliseconds
    #[arg(long = "timeout", short = 't', default_value = DEFAULT_TIMEOUT_MS, value_parser = parse_positive_u64)]
    pub timeout_ms: PositiveU64,

    /// HTTP method to use
    #[arg(long, short = 'M', default_value = "get", ignore_case = true)]
    pub method: HttpMethod,

    /// HTTP headers in 'Key: Value' format (repeatable)
    #[arg(long = "header", short = 'H', value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Request body string, or @filename to read it from a file
    #[arg(long, short = 'b', default_value = "")]
    pub body: String,

    /// Override the Host header
    #[arg(long = "host")]
    pub host_header: Option<String>,

    /// Skip TLS certificate and hostname verification (insecure, testing only)
    #[arg(long)]
    pub insecure: bool,

    /// Restrict the client to HTTP/1.1 instead of negotiating HTTP/2
    #[arg(long = "no-http2")]
    pub no_http2: bool,

    /// Client certificate file (PEM) for mutual TLS
    #[arg(long)]
    pub cert: Option<String>,

    /// Client private key file (PKCS#8 PEM) for mutual TLS
    #[arg(long)]
    pub key: Option<String>,

    /// CA certificate file (PEM) to verify the server against
    #[arg(long = "ca")]
    pub ca_cert: Option<String>,

    /// Runtime worker threads (0 uses the runtime default)
    #[arg(long, default_value_t = 0)]
    pub threads: usize,

    /// Path to a TOML or JSON config file
    #[arg(long)]
    pub config: Option<String>,

    /// Enable debug logging
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Disable ANSI colors in log output
    #[arg(long = "no-color")]
    pub no_color: bool,
}
