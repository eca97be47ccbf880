pub(crate) const DEFAULT_USER_AGENT: &str = concat!("volley/", env!("CARGO_PKG_VERSION"));

pub(crate) const DEFAULT_CONNECTIONS: &str = "10";
pub(crate) const DEFAULT_DURATION_SECS: &str = "10";
pub(crate) const DEFAULT_TIMEOUT_MS: &str = "1000";

/// Config files checked in the working directory when `--config` is absent.
pub(crate) const DEFAULT_CONFIG_FILES: [&str; 2] = ["volley.toml", "volley.json"];
