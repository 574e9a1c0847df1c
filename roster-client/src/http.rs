//! HTTP implementation of the entry fetcher
//!
//! One `GET {base}/entries/{id}` per fetch, with a fixed per-request timeout.
//! Responses are classified into a [`FetchOutcome`]; no retries happen here.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use roster_core::{EntryRecord, Error, Result};

use crate::fetcher::EntryFetcher;
use crate::outcome::FetchOutcome;

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Longest server-body excerpt carried into an outcome message.
const BODY_SNIPPET_LEN: usize = 256;

/// HTTP client for the remote entry read endpoint.
#[derive(Clone)]
pub struct HttpEntryClient {
    client: Client,
    base_url: String,
}

impl fmt::Debug for HttpEntryClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpEntryClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl HttpEntryClient {
    /// Create a client against `base_url` (e.g. `https://directory.example.com`).
    ///
    /// Trailing slashes are stripped; the URL must be absolute http(s).
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base = base_url.trim_end_matches('/').to_string();
        let parsed =
            Url::parse(&base).map_err(|e| Error::client(format!("invalid base URL {base}: {e}")))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(Error::client(format!(
                "unsupported URL scheme {}: expected http or https",
                parsed.scheme()
            )));
        }

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("roster/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::client(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, base_url: base })
    }

    /// Client with the default 30-second timeout.
    pub fn with_default_timeout(base_url: &str) -> Result<Self> {
        Self::new(base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Map a non-2xx status to an outcome.
    fn classify_status(status: StatusCode, body: &str) -> FetchOutcome {
        match status {
            StatusCode::NOT_FOUND => FetchOutcome::NotFound,
            StatusCode::TOO_MANY_REQUESTS => FetchOutcome::RateLimited,
            s => FetchOutcome::TransientError(if body.is_empty() {
                format!("status {s}")
            } else {
                format!("status {s}: {}", snippet(body))
            }),
        }
    }

    /// Map a reqwest error (network/timeout) to an outcome.
    fn classify_network(e: reqwest::Error) -> FetchOutcome {
        if e.is_timeout() {
            FetchOutcome::TransientError(format!("request timed out: {e}"))
        } else if e.is_connect() {
            FetchOutcome::TransientError(format!("connection failed: {e}"))
        } else {
            FetchOutcome::TransientError(e.to_string())
        }
    }
}

/// Classify the body of a success response.
///
/// The endpoint serves a maintenance placeholder (a bare string or array)
/// with status 200 under some conditions; that is an ambiguous response, not
/// a confirmed absence, so it maps to `MalformedResponse`.
pub fn classify_success_body(body: &str) -> FetchOutcome {
    let value: serde_json::Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(e) => return FetchOutcome::MalformedResponse(format!("unparseable body: {e}")),
    };
    if !value.is_object() {
        return FetchOutcome::MalformedResponse(format!(
            "body is not a JSON object: {}",
            snippet(body)
        ));
    }
    match serde_json::from_value::<EntryRecord>(value) {
        Ok(record) => FetchOutcome::Found(record),
        Err(e) => FetchOutcome::MalformedResponse(format!("missing or invalid fields: {e}")),
    }
}

fn snippet(body: &str) -> &str {
    if body.len() <= BODY_SNIPPET_LEN {
        return body;
    }
    let mut end = BODY_SNIPPET_LEN;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}

#[async_trait]
impl EntryFetcher for HttpEntryClient {
    async fn fetch(&self, id: u64) -> FetchOutcome {
        let url = format!("{}/entries/{}", self.base_url, id);
        let resp = match self.client.get(&url).send().await {
            Ok(resp) => resp,
            Err(e) => return Self::classify_network(e),
        };

        let status = resp.status();
        let body = match resp.text().await {
            Ok(text) => text,
            Err(e) => return Self::classify_network(e),
        };

        if status.is_success() {
            classify_success_body(&body)
        } else {
            Self::classify_status(status, &body)
        }
    }
}
