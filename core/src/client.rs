//! The client facade: credentials, URL building, verb helpers, and every
//! lookup/search/create/delete operation.
//!
//! # Design
//! `TrelloClient` is the single entry point. It resolves both credentials
//! once at construction (explicit argument, else environment variable, else
//! an authentication error naming the missing one) and holds them as
//! immutable state. Every operation is a single synchronous request: build
//! the URL from path segments, merge credentials under the caller's params,
//! execute through the `Transport`, interpret the status, decode JSON.

use std::collections::BTreeMap;
use std::env;
use std::fmt;

use log::error;
use serde_json::Value;

use crate::entities::{Board, Card, Comment, List};
use crate::error::{Error, Result};
use crate::http::{Method, Response, Transport, UreqTransport};
use crate::types::{BoardData, CardData, CommentData, CreateBoard, ListData};
use crate::utils::{comma_join, Fields};

/// Fixed API base: host plus version path segment.
pub const API_BASE: &str = "https://api.trello.com/1";

/// Environment variable consulted when no explicit API key is given.
pub const ENV_API_KEY: &str = "TRELLO_API_KEY";

/// Environment variable consulted when no explicit token is given.
pub const ENV_TOKEN: &str = "TRELLO_TOKEN";

/// Flat key/value query parameters for a single request.
pub type Params = BTreeMap<String, String>;

/// Build a `Params` map from literal pairs.
pub(crate) fn params<I>(pairs: I) -> Params
where
    I: IntoIterator<Item = (&'static str, String)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

/// Synchronous client for the Trello REST API.
///
/// Construct with [`TrelloClient::new`] or [`TrelloClient::from_env`]; every
/// method blocks until the HTTP response arrives. Entities returned by the
/// lookup methods borrow the client and route their own refreshes and
/// mutations back through it.
pub struct TrelloClient {
    api_key: String,
    token: String,
    base_url: String,
    transport: Box<dyn Transport>,
}

impl TrelloClient {
    /// Create a client with the default HTTP transport.
    ///
    /// Each credential falls back to its environment variable
    /// ([`ENV_API_KEY`], [`ENV_TOKEN`]) when not given explicitly. Fails with
    /// [`Error::Authentication`] naming the first credential that cannot be
    /// resolved.
    pub fn new(api_key: Option<&str>, token: Option<&str>) -> Result<Self> {
        Self::with_transport(api_key, token, Box::new(UreqTransport::new()))
    }

    /// Create a client resolving both credentials from the environment.
    pub fn from_env() -> Result<Self> {
        Self::new(None, None)
    }

    /// Create a client with a custom transport. Credential resolution is the
    /// same as [`TrelloClient::new`]. This is the seam tests use to
    /// substitute canned responses.
    pub fn with_transport(
        api_key: Option<&str>,
        token: Option<&str>,
        transport: Box<dyn Transport>,
    ) -> Result<Self> {
        let api_key = resolve_credential(api_key, "api_key", ENV_API_KEY)?;
        let token = resolve_credential(token, "token", ENV_TOKEN)?;
        Ok(Self {
            api_key,
            token,
            base_url: API_BASE.to_string(),
            transport,
        })
    }

    /// Override the API base URL, e.g. to point at a local mock server.
    /// Trailing slashes are stripped.
    pub fn base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    fn define_url(&self, path_parts: &[&str]) -> String {
        debug_assert!(!path_parts.is_empty(), "path_parts must be non-empty");
        let mut url = self.base_url.clone();
        for part in path_parts {
            url.push('/');
            url.push_str(part);
        }
        url
    }

    /// Execute a request and return the raw response on any 2xx status.
    ///
    /// Credentials are merged first, so caller params win on key collision.
    /// 429 maps to [`Error::RateLimitExceeded`] before anything looks at the
    /// body; any other non-success status is logged and mapped to
    /// [`Error::Request`].
    pub(crate) fn request_raw(
        &self,
        method: Method,
        path_parts: &[&str],
        caller_params: Params,
    ) -> Result<Response> {
        let url = self.define_url(path_parts);
        let mut query: Params = params([
            ("key", self.api_key.clone()),
            ("token", self.token.clone()),
        ]);
        query.extend(caller_params);
        let pairs: Vec<(String, String)> = query.into_iter().collect();

        let response = self.transport.execute(method, &url, &pairs)?;
        if response.status == 429 {
            return Err(Error::RateLimitExceeded);
        }
        if !(200..300).contains(&response.status) {
            error!(
                "status code {}: {} on URL {}",
                response.status, response.body, url
            );
            return Err(Error::Request {
                status: response.status,
                url,
                body: response.body,
            });
        }
        Ok(response)
    }

    /// Execute a request and decode the body as JSON.
    pub(crate) fn request(
        &self,
        method: Method,
        path_parts: &[&str],
        caller_params: Params,
    ) -> Result<Value> {
        let response = self.request_raw(method, path_parts, caller_params)?;
        Ok(serde_json::from_str(&response.body)?)
    }

    pub(crate) fn get(&self, path_parts: &[&str], caller_params: Params) -> Result<Value> {
        self.request(Method::Get, path_parts, caller_params)
    }

    pub(crate) fn post(&self, path_parts: &[&str], caller_params: Params) -> Result<Value> {
        self.request(Method::Post, path_parts, caller_params)
    }

    pub(crate) fn put(&self, path_parts: &[&str], caller_params: Params) -> Result<Value> {
        self.request(Method::Put, path_parts, caller_params)
    }

    /// Issue a DELETE and assert the `_value` confirmation sentinel.
    ///
    /// A successful delete responds `{"_value": null}`; a populated `_value`
    /// means the server did something other than a plain delete and is
    /// surfaced as [`Error::UnexpectedDeleteResponse`].
    pub(crate) fn delete(&self, path_parts: &[&str], caller_params: Params) -> Result<Value> {
        let value = self.request(Method::Delete, path_parts, caller_params)?;
        match value.get("_value") {
            None | Some(Value::Null) => Ok(value),
            Some(other) => Err(Error::UnexpectedDeleteResponse(other.to_string())),
        }
    }

    // --- lookups ---

    /// All boards belonging to the authenticated member.
    pub fn get_all_boards(&self) -> Result<Vec<Board<'_>>> {
        let response = self.get(&["members", "me", "boards"], Params::new())?;
        let items: Vec<BoardData> = serde_json::from_value(response)?;
        Ok(items.into_iter().map(|d| Board::from_data(self, d)).collect())
    }

    /// The single board whose name equals `name`, case-insensitively and
    /// ignoring surrounding whitespace.
    ///
    /// Zero matches and multiple matches both fail with
    /// [`Error::Validation`]. `partial` is accepted for forward
    /// compatibility but not yet honored.
    pub fn get_board_by_name(&self, name: &str, partial: bool) -> Result<Board<'_>> {
        let _ = partial; // reserved
        let wanted = name.trim().to_lowercase();
        let mut matches: Vec<Board<'_>> = self
            .search_boards_by_name(name)?
            .into_iter()
            .filter(|board| {
                board
                    .name()
                    .map(|n| n.trim().to_lowercase() == wanted)
                    .unwrap_or(false)
            })
            .collect();
        match matches.len() {
            0 => Err(Error::Validation(format!("no board named `{name}`"))),
            1 => Ok(matches.remove(0)),
            n => Err(Error::Validation(format!(
                "{n} boards match the name `{name}`"
            ))),
        }
    }

    /// Full-text search scoped to boards. May return an empty list.
    pub fn search_boards_by_name(&self, query: &str) -> Result<Vec<Board<'_>>> {
        let result = self.search(query, Some(&["boards"]))?;
        let boards = result
            .get("boards")
            .cloned()
            .ok_or(Error::MissingField("boards"))?;
        let items: Vec<BoardData> = serde_json::from_value(boards)?;
        Ok(items.into_iter().map(|d| Board::from_data(self, d)).collect())
    }

    /// Fetch one board by id. `fields` limits the returned fields; `None`
    /// leaves the server's defaults in place.
    pub fn get_board(&self, board_id: &str, fields: Option<Fields>) -> Result<Board<'_>> {
        let raw = self.get_board_raw(board_id, fields)?;
        let data: BoardData = serde_json::from_value(raw)?;
        Ok(Board::from_data(self, data))
    }

    /// Same as [`get_board`](Self::get_board) but returns the decoded JSON
    /// untouched. Entity full-data refreshes go through here.
    pub fn get_board_raw(&self, board_id: &str, fields: Option<Fields>) -> Result<Value> {
        let caller_params = match fields {
            Some(fields) => params([("fields", fields.to_param())]),
            None => Params::new(),
        };
        self.get(&["boards", board_id], caller_params)
    }

    /// All lists on a board, with all fields. `with_cards` eagerly loads
    /// each list's card cache.
    pub fn get_board_lists(&self, board_id: &str, with_cards: bool) -> Result<Vec<List<'_>>> {
        let response = self.get(
            &["board", board_id, "lists"],
            params([("fields", Fields::All.to_param())]),
        )?;
        let items: Vec<ListData> = serde_json::from_value(response)?;
        let mut lists: Vec<List<'_>> = items
            .into_iter()
            .map(|d| List::from_data(self, d))
            .collect();
        if with_cards {
            for list in &mut lists {
                list.refresh_cards()?;
            }
        }
        Ok(lists)
    }

    /// Fetch one list by id. `None` requests all fields, matching the
    /// upstream default for lists.
    pub fn get_list(&self, list_id: &str, fields: Option<Fields>) -> Result<List<'_>> {
        let raw = self.get_list_raw(list_id, fields)?;
        let data: ListData = serde_json::from_value(raw)?;
        Ok(List::from_data(self, data))
    }

    /// Same as [`get_list`](Self::get_list) but returns the decoded JSON
    /// untouched.
    pub fn get_list_raw(&self, list_id: &str, fields: Option<Fields>) -> Result<Value> {
        let fields = fields.unwrap_or(Fields::All);
        self.get(&["lists", list_id], params([("fields", fields.to_param())]))
    }

    /// Fetch one card by id.
    pub fn get_card(&self, card_id: &str) -> Result<Card<'_>> {
        let response = self.get(&["cards", card_id], Params::new())?;
        let data: CardData = serde_json::from_value(response)?;
        Ok(Card::from_data(self, data))
    }

    /// Cards on a board or on a list — exactly one of the two ids must be
    /// given. Passing both, or neither, fails with [`Error::Validation`]
    /// before any network call.
    pub fn get_cards(
        &self,
        board_id: Option<&str>,
        list_id: Option<&str>,
    ) -> Result<Vec<Card<'_>>> {
        let response = match (board_id, list_id) {
            (Some(_), Some(_)) => {
                return Err(Error::Validation(
                    "pass only one of board_id or list_id".to_string(),
                ))
            }
            (None, None) => {
                return Err(Error::Validation(
                    "pass either board_id or list_id".to_string(),
                ))
            }
            (Some(board_id), None) => self.get(&["boards", board_id, "cards"], Params::new())?,
            (None, Some(list_id)) => self.get(&["lists", list_id, "cards"], Params::new())?,
        };
        let items: Vec<CardData> = serde_json::from_value(response)?;
        Ok(items.into_iter().map(|d| Card::from_data(self, d)).collect())
    }

    /// All cards on a board. Never cached — every call re-fetches.
    pub fn get_cards_by_board(&self, board_id: &str) -> Result<Vec<Card<'_>>> {
        let response = self.get(&["boards", board_id, "cards"], Params::new())?;
        let items: Vec<CardData> = serde_json::from_value(response)?;
        Ok(items.into_iter().map(|d| Card::from_data(self, d)).collect())
    }

    /// Comment actions on a card, newest first as the server returns them.
    pub fn get_card_comments(&self, card_id: &str) -> Result<Vec<Comment<'_>>> {
        let response = self.get(
            &["cards", card_id, "actions"],
            params([("filter", "commentCard".to_string())]),
        )?;
        let items: Vec<CommentData> = serde_json::from_value(response)?;
        Ok(items
            .into_iter()
            .map(|d| Comment::from_data(self, d))
            .collect())
    }

    /// Fetch one comment action by id.
    pub fn get_comment_by_id(&self, comment_id: &str) -> Result<Comment<'_>> {
        let response = self.get(&["actions", comment_id], Params::new())?;
        let data: CommentData = serde_json::from_value(response)?;
        Ok(Comment::from_data(self, data))
    }

    // --- creation ---

    /// Create a board. Accepts a bare name as shorthand for
    /// `{"name": ...}`, or a full parameter list.
    pub fn create_board(&self, create: impl Into<CreateBoard>) -> Result<Board<'_>> {
        let caller_params = match create.into() {
            CreateBoard::Name(name) => params([("name", name)]),
            CreateBoard::Params(pairs) => pairs.into_iter().collect(),
        };
        let response = self.post(&["boards"], caller_params)?;
        let data: BoardData = serde_json::from_value(response)?;
        Ok(Board::from_data(self, data))
    }

    /// Create a list on a board. `pos` is `"top"`, `"bottom"`, or a numeric
    /// position; `copy_from_list_id` clones an existing list.
    pub fn create_list(
        &self,
        name: &str,
        board_id: &str,
        pos: &str,
        copy_from_list_id: Option<&str>,
    ) -> Result<List<'_>> {
        let mut caller_params = params([
            ("name", name.to_string()),
            ("idBoard", board_id.to_string()),
            ("pos", pos.to_string()),
        ]);
        if let Some(source) = copy_from_list_id {
            caller_params.insert("idListSource".to_string(), source.to_string());
        }
        let response = self.post(&["lists"], caller_params)?;
        let data: ListData = serde_json::from_value(response)?;
        Ok(List::from_data(self, data))
    }

    /// Create a card on a list. `copy_from_card_id` clones an existing card.
    pub fn create_card(
        &self,
        name: &str,
        list_id: &str,
        desc: Option<&str>,
        pos: &str,
        copy_from_card_id: Option<&str>,
    ) -> Result<Card<'_>> {
        let mut caller_params = params([
            ("name", name.to_string()),
            ("idList", list_id.to_string()),
            ("pos", pos.to_string()),
        ]);
        if let Some(desc) = desc {
            caller_params.insert("desc".to_string(), desc.to_string());
        }
        if let Some(source) = copy_from_card_id {
            caller_params.insert("idCardSource".to_string(), source.to_string());
        }
        let response = self.post(&["cards"], caller_params)?;
        let data: CardData = serde_json::from_value(response)?;
        Ok(Card::from_data(self, data))
    }

    // --- deletion ---

    /// Delete a board. Irreversible — consider archiving instead. The
    /// response must carry a null `_value` confirmation sentinel.
    pub fn delete_board(&self, board_id: &str) -> Result<Value> {
        self.delete(&["boards", board_id], Params::new())
    }

    // --- search ---

    /// Raw search passthrough. `model_types` restricts the object kinds
    /// searched (`boards`, `cards`, `members`, ...); the decoded result is
    /// returned as-is.
    pub fn search(&self, query: &str, model_types: Option<&[&str]>) -> Result<Value> {
        let mut caller_params = params([("query", query.to_string())]);
        if let Some(kinds) = model_types {
            caller_params.insert("modelTypes".to_string(), comma_join(kinds));
        }
        self.get(&["search"], caller_params)
    }

    // --- reserved operations ---

    /// Reserved. Fails with [`Error::Unimplemented`].
    pub fn move_list(&self, _list_id: &str, _new_board_id: &str) -> Result<List<'_>> {
        Err(Error::Unimplemented("moving a list to another board"))
    }

    /// Reserved. Fails with [`Error::Unimplemented`].
    pub fn move_card(&self, _card_id: &str, _new_list_id: &str) -> Result<Card<'_>> {
        Err(Error::Unimplemented(
            "moving a card through the client facade; use Card::move_to_list",
        ))
    }

    /// Reserved. Fails with [`Error::Unimplemented`].
    pub fn get_shared_boards(&self) -> Result<Vec<Board<'_>>> {
        Err(Error::Unimplemented(
            "listing boards shared with other members",
        ))
    }

    /// Reserved. Fails with [`Error::Unimplemented`].
    pub fn get_private_boards(&self) -> Result<Vec<Board<'_>>> {
        Err(Error::Unimplemented("listing private boards"))
    }

    /// Reserved. Fails with [`Error::Unimplemented`].
    pub fn get_boards_by_name(&self, _name: &str, _partial: bool) -> Result<Vec<Board<'_>>> {
        Err(Error::Unimplemented("listing all boards matching a name"))
    }
}

impl fmt::Debug for TrelloClient {
    /// Credentials are redacted to their first and last characters.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrelloClient")
            .field("api_key", &redact(&self.api_key))
            .field("token", &redact(&self.token))
            .field("base_url", &self.base_url)
            .finish()
    }
}

fn resolve_credential(
    explicit: Option<&str>,
    credential: &'static str,
    env_var: &'static str,
) -> Result<String> {
    if let Some(value) = explicit {
        return Ok(value.to_string());
    }
    env::var(env_var).map_err(|_| Error::Authentication {
        credential,
        env_var,
    })
}

fn redact(secret: &str) -> String {
    let mut chars = secret.chars();
    match (chars.next(), secret.chars().next_back()) {
        (Some(first), Some(last)) if secret.chars().count() > 2 => {
            format!("{first}...{last}")
        }
        _ => "...".to_string(),
    }
}
