use clap::ArgMatches;
use clap::parser::ValueSource;

use crate::args::{BenchArgs, PositiveU64, PositiveUsize, parse_header};
use crate::error::{AppError, AppResult, ConfigError};

use super::types::ConfigFile;

/// Applies configuration values to CLI arguments.
///
/// Flags given on the command line always win over the config file.
///
/// # Errors
///
/// Returns an error when config values are invalid.
pub fn apply_config(
    args: &mut BenchArgs,
    matches: &ArgMatches,
    config: &ConfigFile,
) -> AppResult<()> {
    if !is_cli(matches, "url")
        && let Some(url) = config.url.clone()
    {
        args.url = Some(url);
    }

    if !is_cli(matches, "method")
        && let Some(method) = config.method
    {
        args.method = method;
    }

    if !is_cli(matches, "headers")
        && let Some(headers) = config.headers.as_ref()
    {
        let mut parsed = Vec::with_capacity(headers.len());
        for header in headers {
            parsed.push(
                parse_header(header)
                    .map_err(|err| AppError::config(ConfigError::InvalidHeader { source: err }))?,
            );
        }
        args.headers = parsed;
    }

    if !is_cli(matches, "body")
        && let Some(body) = config.body.clone()
    {
        args.body = body;
    }

    if !is_cli(matches, "host_header")
        && let Some(host) = config.host.clone()
    {
        args.host_header = Some(host);
    }

    if !is_cli(matches, "connections")
        && let Some(connections) = config.connections
    {
        args.connections = ensure_positive_usize(connections, "connections")?;
    }

    if !is_cli(matches, "duration")
        && let Some(duration) = config.duration
    {
        args.duration = ensure_positive_u64(duration, "duration")?;
    }

    if !is_cli(matches, "timeout_ms")
        && let Some(timeout_ms) = config.timeout_ms
    {
        args.timeout_ms = ensure_positive_u64(timeout_ms, "timeout_ms")?;
    }

    if !is_cli(matches, "insecure")
        && let Some(insecure) = config.insecure
    {
        args.insecure = insecure;
    }

    if !is_cli(matches, "no_http2")
        && let Some(http2) = config.http2
    {
        args.no_http2 = !http2;
    }

    if !is_cli(matches, "cert")
        && let Some(cert) = config.cert.clone()
    {
        args.cert = Some(cert);
    }

    if !is_cli(matches, "key")
        && let Some(key) = config.key.clone()
    {
        args.key = Some(key);
    }

    if !is_cli(matches, "ca_cert")
        && let Some(ca) = config.ca.clone()
    {
        args.ca_cert = Some(ca);
    }

    if !is_cli(matches, "threads")
        && let Some(threads) = config.threads
    {
        args.threads = threads;
    }

    Ok(())
}

fn is_cli(matches: &ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(ValueSource::CommandLine)
}

fn ensure_positive_u64(value: u64, field: &str) -> AppResult<PositiveU64> {
    PositiveU64::try_from(value).map_err(|err| {
        AppError::config(ConfigError::FieldMustBePositive {
            field: field.to_owned(),
            source: err,
        })
    })
}

fn ensure_positive_usize(value: usize, field: &str) -> AppResult<PositiveUsize> {
    PositiveUsize::try_from(value).map_err(|err| {
        AppError::config(ConfigError::FieldMustBePositive {
            field: field.to_owned(),
            source: err,
        })
    })
}
