//! The board entity: top-level container holding lists.

use serde_json::Value;

use crate::client::{params, TrelloClient};
use crate::entities::{echo_outcome, List, MutationOutcome, Remote};
use crate::error::{Error, Result};
use crate::types::BoardData;
use crate::utils::Fields;

/// A board on the remote service.
///
/// `closed` is unknown until fetched; reading it through
/// [`closed`](Board::closed) triggers at most one full-data refresh. The
/// `lists` collection is fetched once and cached until
/// [`refresh_lists`](Board::refresh_lists); cards are never cached.
#[derive(Debug)]
pub struct Board<'a> {
    client: &'a TrelloClient,
    id: String,
    name: Option<String>,
    closed: Option<bool>,
    desc: Option<String>,
    url: Option<String>,
    lists: Option<Vec<List<'a>>>,
    full_data: Option<Value>,
}

impl<'a> Board<'a> {
    pub(crate) fn from_data(client: &'a TrelloClient, data: BoardData) -> Self {
        let mut board = Self {
            client,
            id: String::new(),
            name: None,
            closed: None,
            desc: None,
            url: None,
            lists: None,
            full_data: None,
        };
        board.populate(data);
        board
    }

    /// Re-initialize every field from wire data and drop both caches.
    fn populate(&mut self, data: BoardData) {
        self.id = data.id;
        self.name = data.name;
        self.closed = data.closed;
        self.desc = data.desc;
        self.url = data.url;
        self.lists = None;
        self.full_data = None;
    }

    /// Server-assigned id, stable for the lifetime of this handle.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn desc(&self) -> Option<&str> {
        self.desc.as_deref()
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Whether the board is archived. Unknown until fetched — the first read
    /// triggers one full-data refresh.
    pub fn closed(&mut self) -> Result<bool> {
        if self.closed.is_none() {
            self.refresh_full_data()?;
        }
        self.closed.ok_or(Error::MissingField("closed"))
    }

    /// The board's lists, fetched once and cached until
    /// [`refresh_lists`](Board::refresh_lists).
    pub fn lists(&mut self) -> Result<&[List<'a>]> {
        if self.lists.is_none() {
            self.refresh_lists()?;
        }
        Ok(self.lists.as_deref().unwrap_or(&[]))
    }

    /// The board's cards, fetched fresh on every call.
    pub fn cards(&self) -> Result<Vec<crate::entities::Card<'a>>> {
        let client = self.client;
        client.get_cards_by_board(&self.id)
    }

    /// The raw all-fields JSON snapshot, fetched once and cached until the
    /// next full refresh.
    pub fn full_data(&mut self) -> Result<&Value> {
        if self.full_data.is_none() {
            self.refresh_full_data()?;
        }
        self.full_data.as_ref().ok_or(Error::MissingField("full data"))
    }

    /// Re-fetch the lists collection.
    pub fn refresh_lists(&mut self) -> Result<()> {
        let client = self.client;
        self.lists = Some(client.get_board_lists(&self.id, false)?);
        Ok(())
    }

    /// Re-fetch the board with all fields and re-populate from the result.
    pub fn refresh_full_data(&mut self) -> Result<()> {
        let client = self.client;
        let raw = client.get_board_raw(&self.id, Some(Fields::All))?;
        let data: BoardData = serde_json::from_value(raw.clone())?;
        self.populate(data);
        self.full_data = Some(raw);
        Ok(())
    }

    /// Rename the board. The cached name is committed only when the server
    /// echoes the requested value.
    pub fn rename(&mut self, new_name: &str) -> Result<MutationOutcome> {
        let response = self.put(&["boards", &self.id], params([("name", new_name.to_string())]))?;
        let outcome = echo_outcome(response.get("name"), &Value::from(new_name), "board name");
        if outcome.is_confirmed() {
            self.name = Some(new_name.to_string());
        }
        Ok(outcome)
    }

    /// Archive the board.
    pub fn archive(&mut self) -> Result<MutationOutcome> {
        self.put_closed(true)
    }

    /// Restore an archived board.
    pub fn unarchive(&mut self) -> Result<MutationOutcome> {
        self.put_closed(false)
    }

    /// Archive or restore by value.
    pub fn set_closed(&mut self, value: bool) -> Result<MutationOutcome> {
        if value {
            self.archive()
        } else {
            self.unarchive()
        }
    }

    fn put_closed(&mut self, value: bool) -> Result<MutationOutcome> {
        let response = self.put(
            &["boards", &self.id],
            params([("closed", value.to_string())]),
        )?;
        let outcome = echo_outcome(response.get("closed"), &Value::Bool(value), "board closed");
        if outcome.is_confirmed() {
            self.closed = Some(value);
        }
        Ok(outcome)
    }

    /// Create a list on this board and refresh the cached lists collection.
    pub fn create_list(&mut self, name: &str, pos: &str) -> Result<List<'a>> {
        let client = self.client;
        let new_list = client.create_list(name, &self.id, pos, None)?;
        self.refresh_lists()?;
        Ok(new_list)
    }

    /// Delete the board on the server.
    ///
    /// Irreversible — consider [`archive`](Board::archive) instead. The
    /// local handle stays alive and goes stale.
    pub fn delete(&self) -> Result<()> {
        self.client.delete_board(&self.id)?;
        Ok(())
    }
}

impl Remote for Board<'_> {
    fn client(&self) -> &TrelloClient {
        self.client
    }

    fn summary_fields(&self) -> Vec<(&'static str, Option<String>)> {
        vec![
            ("id", Some(self.id.clone())),
            ("name", self.name.clone()),
            ("desc", self.desc.clone()),
            ("url", self.url.clone()),
            ("closed", self.closed.map(|c| c.to_string())),
        ]
    }
}
