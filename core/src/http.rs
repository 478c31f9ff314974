//! HTTP transport seam between the client and the network.
//!
//! # Design
//! Requests and responses cross the `Transport` trait as plain data: a verb,
//! a fully built URL, and the query pairs to attach. `TrelloClient` owns URL
//! construction, credential merging, and status interpretation; a `Transport`
//! only executes the round-trip. This keeps everything above the trait
//! deterministic and lets tests substitute a canned-response transport.
//!
//! The Trello wire convention sends every parameter — including creation and
//! mutation payloads — as query-string pairs, never as a JSON body, so
//! requests carry no body at all.

use std::time::Duration;

use crate::error::{Error, Result};

/// Default timeout applied to the whole of each request.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub body: String,
}

/// Executes a single blocking HTTP round-trip.
///
/// Implementations must return non-2xx responses as data, not as errors —
/// status interpretation belongs to `TrelloClient`. Only network-level
/// failures (connect, timeout, read) are reported as `Err`.
pub trait Transport {
    fn execute(&self, method: Method, url: &str, query: &[(String, String)]) -> Result<Response>;
}

/// Default `Transport` backed by a blocking ureq agent.
///
/// The agent is configured to hand 4xx/5xx responses back as data and to
/// abort any request that exceeds [`DEFAULT_TIMEOUT`].
#[derive(Debug)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(DEFAULT_TIMEOUT))
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn execute(&self, method: Method, url: &str, query: &[(String, String)]) -> Result<Response> {
        let pairs = query.iter().map(|(k, v)| (k.as_str(), v.as_str()));
        let result = match method {
            Method::Get => self.agent.get(url).query_pairs(pairs).call(),
            Method::Delete => self.agent.delete(url).query_pairs(pairs).call(),
            Method::Post => self.agent.post(url).query_pairs(pairs).send_empty(),
            Method::Put => self.agent.put(url).query_pairs(pairs).send_empty(),
        };
        let mut response = result.map_err(map_ureq)?;

        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(map_ureq)?;

        Ok(Response { status, body })
    }
}

fn map_ureq(err: ureq::Error) -> Error {
    match err {
        ureq::Error::Timeout(_) => Error::Timeout,
        other => Error::Transport(other.to_string()),
    }
}
