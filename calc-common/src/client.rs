//! Blocking HTTP client for the calculator API.
//!
//! Each call performs exactly one HTTP/1.1 GET on a fresh connection, bounded
//! by a single timeout that covers connect, request and body. There are no
//! retries and no caching: a transport failure is reported as-is.
//!
//! Requests go through hyper's connection-level client so the status line's
//! reason phrase survives; services report errors such as division by zero
//! there, in the body, or both.

use crate::config::VerifierConfig;
use crate::errors::CalcError;
use crate::operation::RequestDescriptor;
use http_body_util::{BodyExt, Empty};
use hyper::body::Bytes;
use hyper::client::conn::http1;
use hyper::ext::ReasonPhrase;
use hyper::header::{CONNECTION, HOST};
use hyper::{Request, StatusCode};
use hyper_util::rt::TokioIo;
use serde::{Deserialize, Serialize};
use std::io;
use std::time::{Duration, Instant};
use tokio::net::TcpStream;
use tracing::debug;
use url::Url;

/// A successful (2xx) response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub status: u16,
    pub body: String,
}

/// Blocking client bound to a single timeout.
#[derive(Debug, Clone)]
pub struct CalcClient {
    timeout: Duration,
}

/// Status line and body as received.
struct RawResponse {
    status: StatusCode,
    reason_phrase: Option<String>,
    body: String,
}

enum FetchError {
    Connect(io::Error),
    Http(hyper::Error),
    Request(hyper::http::Error),
}

impl CalcClient {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn from_config(config: &VerifierConfig) -> Self {
        Self::new(config.timeout.value)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Perform the GET described by `request`.
    ///
    /// 2xx responses return an [`Outcome`]; any other status becomes
    /// [`CalcError::Http`] carrying the status and a reason string.
    pub fn get(&self, request: &RequestDescriptor) -> Result<Outcome, CalcError> {
        let url = request.url();
        let parsed = Url::parse(&url)
            .map_err(|e| CalcError::InvalidRequest(format!("invalid URL {url}: {e}")))?;
        if parsed.scheme() != "http" {
            return Err(CalcError::InvalidRequest(format!(
                "unsupported scheme '{}' in {url} (only http is supported)",
                parsed.scheme()
            )));
        }
        let (authority, target) = split_url(&parsed)
            .ok_or_else(|| CalcError::InvalidRequest(format!("URL has no host: {url}")))?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| CalcError::Transport {
                url: url.clone(),
                message: format!("failed to start I/O runtime: {e}"),
            })?;

        let started = Instant::now();
        let response = runtime
            .block_on(async {
                tokio::time::timeout(self.timeout, fetch(&authority, &target)).await
            })
            .map_err(|_elapsed| CalcError::Timeout {
                url: url.clone(),
                timeout: self.timeout,
            })?
            .map_err(|e| self.classify_transport_error(&url, e))?;

        debug!(
            url = %url,
            status = response.status.as_u16(),
            reason = response.reason_phrase.as_deref().unwrap_or(""),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "calculator request completed"
        );

        if response.status.is_success() {
            Ok(Outcome {
                status: response.status.as_u16(),
                body: response.body,
            })
        } else {
            Err(CalcError::Http {
                status: response.status.as_u16(),
                reason: failure_reason(
                    response.status,
                    response.reason_phrase.as_deref(),
                    &response.body,
                ),
            })
        }
    }

    fn classify_transport_error(&self, url: &str, err: FetchError) -> CalcError {
        match err {
            FetchError::Connect(e) if e.kind() == io::ErrorKind::TimedOut => CalcError::Timeout {
                url: url.to_string(),
                timeout: self.timeout,
            },
            FetchError::Connect(e) => CalcError::Unreachable {
                url: url.to_string(),
                message: e.to_string(),
            },
            FetchError::Http(e) => CalcError::Transport {
                url: url.to_string(),
                message: e.to_string(),
            },
            FetchError::Request(e) => CalcError::Transport {
                url: url.to_string(),
                message: e.to_string(),
            },
        }
    }
}

impl Default for CalcClient {
    fn default() -> Self {
        Self::new(VerifierConfig::DEFAULT_TIMEOUT)
    }
}

/// `host:port` to connect to, and the origin-form request target.
fn split_url(url: &Url) -> Option<(String, String)> {
    let host = url.host_str()?;
    let port = url.port_or_known_default()?;
    let mut target = url.path().to_string();
    if let Some(query) = url.query() {
        target.push('?');
        target.push_str(query);
    }
    Some((format!("{host}:{port}"), target))
}

async fn fetch(authority: &str, target: &str) -> Result<RawResponse, FetchError> {
    let stream = TcpStream::connect(authority)
        .await
        .map_err(FetchError::Connect)?;
    let (mut sender, connection) = http1::handshake(TokioIo::new(stream))
        .await
        .map_err(FetchError::Http)?;

    let exchange = async move {
        let request = Request::get(target)
            .header(HOST, authority)
            .header(CONNECTION, "close")
            .body(Empty::<Bytes>::new())
            .map_err(FetchError::Request)?;

        let response = sender
            .send_request(request)
            .await
            .map_err(FetchError::Http)?;
        let status = response.status();
        // Only present when the phrase differs from the canonical one.
        let reason_phrase = response
            .extensions()
            .get::<ReasonPhrase>()
            .map(|phrase| String::from_utf8_lossy(phrase.as_bytes()).into_owned());
        let body = response
            .into_body()
            .collect()
            .await
            .map_err(FetchError::Http)?
            .to_bytes();

        Ok(RawResponse {
            status,
            reason_phrase,
            body: String::from_utf8_lossy(&body).into_owned(),
        })
    };

    let (result, connection_result) = tokio::join!(exchange, connection);
    if let Err(e) = connection_result {
        debug!(error = %e, "calculator connection closed with error");
    }
    result
}

/// Build the reason reported for a non-2xx response.
///
/// The status line's phrase comes first, falling back to the canonical phrase
/// for the code. A non-empty body is appended unless the phrase already
/// carries it, so `406 Division by zero` and `406 Not Acceptable` with body
/// `Division by zero` both yield a reason containing "Division by zero".
pub(crate) fn failure_reason(status: StatusCode, phrase: Option<&str>, body: &str) -> String {
    let phrase = phrase
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .or_else(|| status.canonical_reason())
        .unwrap_or("Unknown Status");
    let detail = body.trim();
    if detail.is_empty() || phrase.contains(detail) {
        phrase.to_string()
    } else {
        format!("{phrase}: {detail}")
    }
}
