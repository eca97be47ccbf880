use std::error::Error as StdError;

use thiserror::Error;

/// Per-request failures. These are tallied by the worker and never abort a run.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("Request failed: {source}")]
    Send {
        #[source]
        source: reqwest::Error,
    },
    #[error("Failed to read response body: {source}")]
    ReadBody {
        #[source]
        source: reqwest::Error,
    },
    #[error("Unexpected status code {status}")]
    UnexpectedStatus { status: u16 },
    #[error("response header timeout")]
    HeaderTimeout,
    #[error("Failed to clone request template.")]
    CloneRequest,
}

impl RequestError {
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            RequestError::UnexpectedStatus { status } => Some(*status),
            RequestError::Send { .. }
            | RequestError::ReadBody { .. }
            | RequestError::HeaderTimeout
            | RequestError::CloneRequest => None,
        }
    }
}

/// Walks the `source` chain to its last link and renders that error.
///
/// Wrapper layers (request context, client internals) differ between retries
/// of the same failure; the deepest cause does not, so it is the tally key.
#[must_use]
pub fn root_cause_message(error: &(dyn StdError + 'static)) -> String {
    let mut current = error;
    while let Some(next) = current.source() {
        current = next;
    }
    current.to_string()
}
