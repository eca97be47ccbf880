use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

use crate::args::{BenchArgs, resolve_body};
use crate::domain::run::{TestConfig, TransportConfig};
use crate::error::{AppError, AppResult, ConfigError, ValidationError};

pub(crate) fn to_test_config(args: &BenchArgs) -> AppResult<TestConfig> {
    let Some(url) = args.url.clone() else {
        tracing::error!("Missing URL (pass it as an argument or set url in the config file).");
        return Err(AppError::validation(ValidationError::MissingUrl));
    };
    let parsed = url::Url::parse(&url).map_err(|err| {
        AppError::config(ConfigError::InvalidUrl {
            url: url.clone(),
            source: err,
        })
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(AppError::config(ConfigError::UnsupportedScheme {
            scheme: parsed.scheme().to_owned(),
        }));
    }

    let workers = NonZeroUsize::new(args.connections.get())
        .ok_or(ValidationError::ValueTooSmall { min: 1 })?;
    let body = resolve_body(&args.body)?.map(bytes::Bytes::from);

    Ok(TestConfig {
        duration: Duration::from_secs(args.duration.get()),
        workers,
        url,
        method: args.method.to_reqwest(),
        body,
        headers: args.headers.clone(),
        host: args.host_header.clone(),
        transport: TransportConfig {
            timeout: Duration::from_millis(args.timeout_ms.get()),
            insecure: args.insecure,
            http2: !args.no_http2,
            client_cert: args.cert.as_ref().map(PathBuf::from),
            client_key: args.key.as_ref().map(PathBuf::from),
            ca_cert: args.ca_cert.as_ref().map(PathBuf::from),
        },
    })
}
