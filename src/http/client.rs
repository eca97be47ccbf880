use reqwest::{Client, redirect};
use tracing::{debug, error};

use crate::args::DEFAULT_USER_AGENT;
use crate::domain::run::TransportConfig;
use crate::error::ConfigError;

use super::tls::apply_tls_settings;

/// Builds the client shared by every worker.
///
/// Redirects are never followed so 301/308 reach the classifier as-is. With
/// HTTP/2 enabled the protocol is negotiated through ALPN and silently falls
/// back to HTTP/1.1; disabled, the client speaks HTTP/1.1 only.
///
/// No client-wide timeout is set. The response header timeout is applied per
/// send by the executor, so a slow body never turns a success into a failure.
///
/// # Errors
///
/// Returns an error when the TLS material is incomplete or unreadable, or the
/// client cannot be built.
pub fn build_client(config: &TransportConfig) -> Result<Client, ConfigError> {
    let mut client_builder = Client::builder()
        .user_agent(DEFAULT_USER_AGENT)
        .redirect(redirect::Policy::none());

    if !config.http2 {
        client_builder = client_builder.http1_only();
    }

    client_builder = apply_tls_settings(client_builder, config)?;

    let client = client_builder.build().map_err(|err| {
        error!("Failed to build HTTP client: {}", err);
        ConfigError::BuildClient { source: err }
    })?;
    debug!(
        http2 = config.http2,
        "HTTP client ready"
    );
    Ok(client)
}
