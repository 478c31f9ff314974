//! Error types for the Trello API client.
//!
//! # Design
//! Rate limiting (HTTP 429) gets a dedicated variant because callers are
//! expected to back off and retry manually — the client never retries on its
//! own. All other non-2xx responses land in `Request` with the status code,
//! request URL, and raw body for debugging.

/// Errors returned by `TrelloClient` and the entity types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required credential could not be resolved at construction time,
    /// neither from an explicit argument nor from its environment variable.
    #[error("missing {credential}: pass it explicitly or set {env_var}")]
    Authentication {
        credential: &'static str,
        env_var: &'static str,
    },

    /// The server returned HTTP 429. Not retried automatically.
    #[error("rate limit exceeded (HTTP 429)")]
    RateLimitExceeded,

    /// The server returned a non-2xx status other than 429.
    #[error("HTTP {status} on {url}: {body}")]
    Request { status: u16, url: String, body: String },

    /// The request did not complete within the transport's timeout.
    #[error("request timed out")]
    Timeout,

    /// A network-level failure below the HTTP status layer.
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body could not be decoded as the expected JSON shape.
    #[error("invalid JSON in response body: {0}")]
    Json(#[from] serde_json::Error),

    /// A field the caller asked for is absent even after a full-fields
    /// refresh of the entity.
    #[error("field `{0}` missing from server response")]
    MissingField(&'static str),

    /// A client-side precondition failed before any network call was made.
    #[error("{0}")]
    Validation(String),

    /// The operation is documented but deliberately unimplemented.
    #[error("not implemented: {0}")]
    Unimplemented(&'static str),

    /// A delete response carried a non-null `_value` sentinel. A successful
    /// delete is expected to confirm with `{"_value": null}`.
    #[error("delete response carried a value: {0}")]
    UnexpectedDeleteResponse(String),
}

/// Crate-wide result alias.
pub type Result<T, E = Error> = std::result::Result<T, E>;
