//! Synchronous client for the Trello REST API.
//!
//! # Overview
//! [`TrelloClient`] is the single entry point: it resolves credentials once
//! at construction and offers lookup/search/create/delete operations that
//! return entity wrappers ([`Board`], [`List`], [`Card`], [`Label`],
//! [`Comment`]). Entities are lazily populated: collections and
//! uncertain fields defer their fetch until first access, and single-field
//! mutations commit the local cache only when the server echoes the
//! requested value back.
//!
//! # Design
//! - Every operation is one blocking request/response; there is no retry,
//!   backoff, pagination, or session state beyond the held credentials.
//! - HTTP execution sits behind the [`Transport`] trait; the default is a
//!   ureq agent with a conservative global timeout. Tests substitute a
//!   canned-response transport through
//!   [`TrelloClient::with_transport`].
//! - HTTP 429 surfaces as [`Error::RateLimitExceeded`] and is never retried
//!   internally — backing off is the caller's job.

pub mod client;
pub mod entities;
pub mod error;
pub mod http;
pub mod types;
pub mod utils;

pub use client::{Params, TrelloClient, API_BASE, ENV_API_KEY, ENV_TOKEN};
pub use entities::{Board, Card, Comment, Label, List, MutationOutcome, Remote};
pub use error::{Error, Result};
pub use http::{Method, Response, Transport, UreqTransport};
pub use types::{
    BoardData, CardData, CommentData, CommentPayload, CreateBoard, IdRef, LabelData, ListData,
};
pub use utils::Fields;
