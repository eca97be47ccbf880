use serde::Deserialize;

use crate::args::HttpMethod;

/// Values accepted in `volley.toml` / `volley.json`.
///
/// Every field is optional; a field only takes effect when the matching flag
/// was not given on the command line.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub url: Option<String>,
    pub method: Option<HttpMethod>,
    pub headers: Option<Vec<String>>,
    pub body: Option<String>,
    pub host: Option<String>,
    #[serde(alias = "workers")]
    pub connections: Option<usize>,
    pub duration: Option<u64>,
    pub timeout_ms: Option<u64>,
    pub insecure: Option<bool>,
    pub http2: Option<bool>,
    pub cert: Option<String>,
    pub key: Option<String>,
    pub ca: Option<String>,
    pub threads: Option<usize>,
}
