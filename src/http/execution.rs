use std::time::Duration;

use futures_util::StreamExt;
use reqwest::Client;
use reqwest::header::{CONTENT_LENGTH, HeaderMap};
use tokio::time::Instant;

use crate::error::RequestError;

use super::request::{RequestPlan, header_block_size, len_u64};

/// A classified successful exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exchange {
    pub status: u16,
    /// Body (or declared body, for redirects) plus approximate header bytes.
    pub size: u64,
    pub latency: Duration,
}

/// Sends one request and classifies the response.
///
/// Only the wait for the response headers is bounded by the plan's timeout.
/// The body is then drained in full so the connection returns to the pool.
///
/// # Errors
///
/// Returns an error on transport failure, header timeout, body read failure,
/// or a status that is neither 2xx nor a permanent redirect.
pub async fn execute(client: &Client, plan: &RequestPlan) -> Result<Exchange, RequestError> {
    let request = plan.next_request()?;
    let start = Instant::now();
    let response = tokio::time::timeout(plan.header_timeout(), client.execute(request))
        .await
        .map_err(|_elapsed| RequestError::HeaderTimeout)?
        .map_err(|err| RequestError::Send { source: err })?;

    let status = response.status().as_u16();
    let header_bytes = header_block_size(response.headers());
    let declared_length = declared_content_length(response.headers());
    let body_bytes = drain_response_body(response)
        .await
        .map_err(|err| RequestError::ReadBody { source: err })?;

    let size = effective_size(status, body_bytes, declared_length, header_bytes)?;
    Ok(Exchange {
        status,
        size,
        latency: start.elapsed(),
    })
}

/// Size accounting per status class.
///
/// 2xx counts the drained body. 301 and 308 count the declared
/// `Content-Length` instead, even when a body was actually sent.
///
/// # Errors
///
/// Returns `UnexpectedStatus` for every other status.
pub fn effective_size(
    status: u16,
    body_bytes: u64,
    declared_length: Option<u64>,
    header_bytes: u64,
) -> Result<u64, RequestError> {
    match status {
        200..=299 => Ok(body_bytes.saturating_add(header_bytes)),
        301 | 308 => Ok(declared_length.unwrap_or(0).saturating_add(header_bytes)),
        _ => Err(RequestError::UnexpectedStatus { status }),
    }
}

fn declared_content_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
}

async fn drain_response_body(response: reqwest::Response) -> Result<u64, reqwest::Error> {
    let mut stream = response.bytes_stream();
    let mut total_bytes: u64 = 0;
    while let Some(chunk) = stream.next().await {
        let bytes = chunk?;
        total_bytes = total_bytes.saturating_add(len_u64(bytes.len()));
    }
    Ok(total_bytes)
}
