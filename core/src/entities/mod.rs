//! The entity model: lazily-populated wrappers over API payloads.
//!
//! # Design
//! Each entity borrows the [`TrelloClient`] that produced it and is
//! constructed only from wire data — creation always round-trips through the
//! server first. The [`Remote`] trait is the shared capability binding an
//! entity to its client's verb helpers; entities compose it rather than
//! inheriting any base type.
//!
//! Mutations follow the optimistic-cache-on-echo pattern: a PUT is issued
//! with a single-field param, and the local cache is committed only when the
//! server echoes the exact requested value. A differing echo leaves local
//! state untouched and is reported as [`MutationOutcome::Mismatched`] — not
//! an error, but observable, and logged at warn level.

mod board;
mod card;
mod comment;
mod label;
mod list;

pub use board::Board;
pub use card::Card;
pub use comment::Comment;
pub use label::Label;
pub use list::List;

use std::fmt::Write as _;

use log::warn;
use serde_json::Value;

use crate::client::{Params, TrelloClient};
use crate::error::Result;

/// Outcome of an echo-confirmed mutation.
#[must_use = "a Mismatched outcome means the local cache was not updated"]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    /// The server echoed the requested value; the local cache was updated.
    Confirmed,
    /// The server echoed something else; the local cache kept its old value.
    Mismatched,
}

impl MutationOutcome {
    pub fn is_confirmed(self) -> bool {
        matches!(self, MutationOutcome::Confirmed)
    }
}

/// Compare a mutation response's echoed value against the requested one.
pub(crate) fn echo_outcome(
    echoed: Option<&Value>,
    requested: &Value,
    target: &str,
) -> MutationOutcome {
    if echoed == Some(requested) {
        MutationOutcome::Confirmed
    } else {
        warn!("server echoed {echoed:?} for {target}, expected {requested}; keeping cached value");
        MutationOutcome::Mismatched
    }
}

/// Shared capability of every entity: access to the owning client's HTTP
/// verbs, and a human-readable summary.
pub trait Remote {
    /// The client this entity routes its requests through.
    fn client(&self) -> &TrelloClient;

    fn get(&self, path_parts: &[&str], caller_params: Params) -> Result<Value> {
        self.client().get(path_parts, caller_params)
    }

    fn post(&self, path_parts: &[&str], caller_params: Params) -> Result<Value> {
        self.client().post(path_parts, caller_params)
    }

    fn put(&self, path_parts: &[&str], caller_params: Params) -> Result<Value> {
        self.client().put(path_parts, caller_params)
    }

    fn delete(&self, path_parts: &[&str], caller_params: Params) -> Result<Value> {
        self.client().delete(path_parts, caller_params)
    }

    /// The attributes this entity type can summarize, in display order.
    /// `None` values are skipped by [`summary`](Remote::summary).
    fn summary_fields(&self) -> Vec<(&'static str, Option<String>)>;

    /// One `label: value` line per populated summary attribute.
    fn summary(&self) -> String {
        let mut out = String::new();
        for (label, value) in self.summary_fields() {
            if let Some(value) = value {
                let _ = writeln!(out, "{label}: {value}");
            }
        }
        out
    }
}
