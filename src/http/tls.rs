use std::path::Path;

use reqwest::{Certificate, ClientBuilder, Identity};
use tracing::warn;

use crate::domain::run::TransportConfig;
use crate::error::ConfigError;

const PEM_CERT_BEGIN: &str = "-----BEGIN CERTIFICATE-----";
const PEM_CERT_END: &str = "-----END CERTIFICATE-----";

pub(super) fn apply_tls_settings(
    mut builder: ClientBuilder,
    config: &TransportConfig,
) -> Result<ClientBuilder, ConfigError> {
    if let Some(identity) = load_identity(config)? {
        builder = builder.identity(identity);
    }

    if let Some(path) = config.ca_cert.as_deref() {
        for cert in load_ca_bundle(path)? {
            builder = builder.add_root_certificate(cert);
        }
    }

    if config.insecure {
        warn!("TLS verification disabled; certificates and hostnames are not checked.");
        builder = builder
            .danger_accept_invalid_certs(true)
            .danger_accept_invalid_hostnames(true);
    }

    Ok(builder)
}

/// Loads the client key pair when mutual TLS is configured.
///
/// Certificate and key come as a pair: one without the other is rejected
/// before either file is touched.
pub(crate) fn load_identity(config: &TransportConfig) -> Result<Option<Identity>, ConfigError> {
    let (cert_path, key_path) = match (config.client_cert.as_deref(), config.client_key.as_deref())
    {
        (None, None) => return Ok(None),
        (Some(_), None) => return Err(ConfigError::MissingClientKey),
        (None, Some(_)) => return Err(ConfigError::MissingClientCert),
        (Some(cert), Some(key)) => (cert, key),
    };
    let cert_bytes = std::fs::read(cert_path).map_err(|err| ConfigError::ReadCert {
        path: cert_path.to_path_buf(),
        source: err,
    })?;
    let key_bytes = std::fs::read(key_path).map_err(|err| ConfigError::ReadKey {
        path: key_path.to_path_buf(),
        source: err,
    })?;
    let identity = Identity::from_pkcs8_pem(&cert_bytes, &key_bytes)
        .map_err(|err| ConfigError::InvalidIdentity { source: err })?;
    Ok(Some(identity))
}

/// Reads every certificate block of a PEM bundle into a trust root.
pub(crate) fn load_ca_bundle(path: &Path) -> Result<Vec<Certificate>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|err| ConfigError::ReadCa {
        path: path.to_path_buf(),
        source: err,
    })?;
    let blocks = pem_certificate_blocks(&content);
    if blocks.is_empty() {
        return Err(ConfigError::CaNotPem {
            path: path.to_path_buf(),
        });
    }
    blocks
        .into_iter()
        .map(|block| {
            Certificate::from_pem(block.as_bytes()).map_err(|err| ConfigError::InvalidCa {
                path: path.to_path_buf(),
                source: err,
            })
        })
        .collect()
}

fn pem_certificate_blocks(content: &str) -> Vec<&str> {
    let mut blocks = Vec::new();
    let mut rest = content;
    while let Some(start) = rest.find(PEM_CERT_BEGIN) {
        let Some(tail) = rest.get(start..) else {
            break;
        };
        let Some(end) = tail.find(PEM_CERT_END) else {
            break;
        };
        let block_end = end.saturating_add(PEM_CERT_END.len());
        if let Some(block) = tail.get(..block_end) {
            blocks.push(block);
        }
        rest = tail.get(block_end..).unwrap_or_default();
    }
    blocks
}
