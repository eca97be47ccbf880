use std::time::Duration;

use bytes::Bytes;
use reqwest::header::{HOST, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, Request, Url};

use crate::domain::run::TestConfig;
use crate::error::{ConfigError, RequestError, ValidationError};

const HEADER_LINE_OVERHEAD: &str = ": \r\n";
const HEADER_BLOCK_TERMINATOR: &str = "\r\n";

/// The request every worker sends, built once from the run config.
#[derive(Debug)]
pub struct RequestPlan {
    template: Request,
    header_timeout: Duration,
}

impl RequestPlan {
    /// Escapes the URL, validates headers, and freezes the request template.
    ///
    /// # Errors
    ///
    /// Returns an error when the URL or a header cannot be represented.
    pub fn from_config(config: &TestConfig) -> Result<Self, ConfigError> {
        let escaped = escape_query(&config.url);
        let url = Url::parse(&escaped).map_err(|err| ConfigError::InvalidUrl {
            url: escaped.clone(),
            source: err,
        })?;
        let headers = build_headers(&config.headers, config.host.as_deref())?;
        Ok(Self::new(
            config.method.clone(),
            url,
            headers,
            config.body.clone(),
            config.transport.timeout,
        ))
    }

    #[must_use]
    pub fn new(
        method: Method,
        url: Url,
        headers: HeaderMap,
        body: Option<Bytes>,
        header_timeout: Duration,
    ) -> Self {
        let mut template = Request::new(method, url);
        *template.headers_mut() = headers;
        if let Some(body) = body.filter(|body| !body.is_empty()) {
            *template.body_mut() = Some(body.into());
        }
        Self {
            template,
            header_timeout,
        }
    }

    #[must_use]
    pub fn url(&self) -> &Url {
        self.template.url()
    }

    /// Upper bound on the wait for the response status line and headers.
    #[must_use]
    pub const fn header_timeout(&self) -> Duration {
        self.header_timeout
    }

    /// Produces a fresh copy of the template for one send.
    ///
    /// # Errors
    ///
    /// Returns an error when the body cannot be cloned.
    pub fn next_request(&self) -> Result<Request, RequestError> {
        self.template
            .try_clone()
            .ok_or(RequestError::CloneRequest)
    }
}

/// Appends every configured header, then the Host override if present.
fn build_headers(pairs: &[(String, String)], host: Option<&str>) -> Result<HeaderMap, ConfigError> {
    let mut headers = HeaderMap::with_capacity(pairs.len().saturating_add(1));
    for (name, value) in pairs {
        let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|_err| {
            ConfigError::InvalidHeader {
                source: ValidationError::InvalidHeaderName { name: name.clone() },
            }
        })?;
        let header_value = HeaderValue::from_str(value).map_err(|_err| {
            ConfigError::InvalidHeader {
                source: ValidationError::InvalidHeaderValue { name: name.clone() },
            }
        })?;
        headers.append(header_name, header_value);
    }
    if let Some(host) = host {
        let value = HeaderValue::from_str(host).map_err(|_err| ConfigError::InvalidHeader {
            source: ValidationError::InvalidHeaderValue {
                name: HOST.as_str().to_owned(),
            },
        })?;
        headers.insert(HOST, value);
    }
    Ok(headers)
}

/// Percent-encodes the value of every `key=value` pair in the query string.
///
/// Keys and the `?`, `&`, `=` separators are left alone, so literal query keys
/// survive. Pairs that are not exactly `key=value` pass through verbatim.
/// Existing `%XX` escapes are kept, which makes the function idempotent.
/// A pair with several `=` (`k=a=b`) is kept whole, never truncated to its key.
#[must_use]
pub fn escape_query(url: &str) -> String {
    let Some((base, query)) = url.split_once('?') else {
        return url.to_owned();
    };
    let escaped: Vec<String> = query
        .split('&')
        .map(|pair| {
            let mut parts = pair.split('=');
            match (parts.next(), parts.next(), parts.next()) {
                (Some(key), Some(value), None) => format!("{}={}", key, escape_value(value)),
                _ => pair.to_owned(),
            }
        })
        .collect();
    format!("{}?{}", base, escaped.join("&"))
}

fn escape_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(idx) = rest.find('%') {
        let (head, tail) = rest.split_at(idx);
        out.push_str(&urlencoding::encode(head));
        if is_escape_triplet(tail)
            && let Some(triplet) = tail.get(..3)
        {
            out.push_str(triplet);
            rest = tail.get(3..).unwrap_or_default();
        } else {
            out.push_str("%25");
            rest = tail.get(1..).unwrap_or_default();
        }
    }
    out.push_str(&urlencoding::encode(rest));
    out
}

fn is_escape_triplet(candidate: &str) -> bool {
    candidate
        .as_bytes()
        .get(1..3)
        .is_some_and(|digits| digits.iter().all(u8::is_ascii_hexdigit))
}

/// Approximate serialized size of a response header block.
///
/// Each distinct name counts once with its `": \r\n"` overhead plus the length
/// of all its values; the block adds a trailing `"\r\n"`. This is not a
/// byte-exact capture of the wire.
#[must_use]
pub fn header_block_size(headers: &HeaderMap) -> u64 {
    let mut total = len_u64(HEADER_BLOCK_TERMINATOR.len());
    for name in headers.keys() {
        let values = headers
            .get_all(name)
            .iter()
            .fold(0_u64, |acc, value| acc.saturating_add(len_u64(value.len())));
        total = total
            .saturating_add(len_u64(name.as_str().len()))
            .saturating_add(len_u64(HEADER_LINE_OVERHEAD.len()))
            .saturating_add(values);
    }
    total
}

pub(super) fn len_u64(len: usize) -> u64 {
    u64::try_from(len).unwrap_or(u64::MAX)
}
